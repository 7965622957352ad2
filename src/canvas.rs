//! Per-page extraction output. A fresh `Canvas` is created on each page
//! navigation and filled in by the content-stream interpreter as it
//! walks that page's operators.

use crate::object::Name;

/// One `BI…ID…EI` inline image.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub width: i64,
    pub height: i64,
    pub bits_per_component: i64,
    pub color_space: Option<String>,
    pub filter: Option<String>,
    pub data: Vec<u8>,
}

/// One `Do` invocation of an Image XObject: the resource name it was
/// drawn under plus the object it resolved to, in encounter order.
#[derive(Debug, Clone)]
pub struct DrawnImage {
    pub name: Name,
    pub reference: Option<crate::object::Reference>,
}

/// One `Do` invocation of a Form XObject, in encounter order. A Form's
/// own content is interleaved at the point of the invoking `Do`
/// (preorder) because the interpreter recurses into it synchronously;
/// this list just records that the invocation happened.
#[derive(Debug, Clone)]
pub struct DrawnForm {
    pub name: Name,
    pub reference: Option<crate::object::Reference>,
}

#[derive(Debug, Clone, Default)]
pub struct Canvas {
    pub strings: Vec<String>,
    pub inline_images: Vec<InlineImage>,
    pub images: Vec<DrawnImage>,
    pub forms: Vec<DrawnForm>,
    pub text_content: String,
}

impl Canvas {
    pub fn new() -> Self {
        Canvas::default()
    }
}
