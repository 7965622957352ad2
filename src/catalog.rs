//! Typed views over dictionaries, built on top of
//! [`crate::object::Dictionary`]/[`crate::object::Resolve`] rather than
//! generic runtime attribute lookup. Each type wraps the fields a caller
//! actually needs; anything else is left in the dictionary, reachable
//! through the type's `extra`/`dict` field and a plain `get(name)`.

use crate::error::{ParseError, PdfResult};
use crate::object::{Dictionary, FromObj, Name, Object, Reference, Resolve};

/// The document's root dictionary (`Type=Catalog`).
#[derive(Debug, Clone)]
pub struct Catalog {
    pub pages: Reference,
    pub page_layout: Option<Name>,
    pub page_mode: Option<Name>,
    pub outlines: Option<Reference>,
    pub names: Option<Reference>,
    pub dests: Option<Reference>,
    pub open_action: Option<Object>,
    pub metadata: Option<Reference>,
    pub lang: Option<String>,
    /// Everything not broken out above, for callers that need a key this
    /// type doesn't surface directly.
    pub extra: Dictionary,
}

impl Catalog {
    pub fn load(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        dict.expect_type("Catalog", resolver, true)?;
        let pages = dict
            .get_reference("Pages")
            .ok_or(ParseError::MissingRequiredKey { key: "Pages" })?;
        Ok(Catalog {
            pages,
            page_layout: dict.get("PageLayout").and_then(Object::as_name).cloned(),
            page_mode: dict.get("PageMode").and_then(Object::as_name).cloned(),
            outlines: dict.get_reference("Outlines"),
            names: dict.get_reference("Names"),
            dests: dict.get_reference("Dests"),
            open_action: dict.get("OpenAction").cloned(),
            metadata: dict.get_reference("Metadata"),
            lang: match dict.get("Lang").cloned() {
                Some(obj) => Some(String::from_obj(obj, resolver)?),
                None => None,
            },
            extra: dict.clone(),
        })
    }
}

/// An internal page-tree node (`Type=Pages`).
#[derive(Debug, Clone)]
pub struct Pages {
    pub kids: Vec<Reference>,
    pub count: i64,
    pub parent: Option<Reference>,
}

impl Pages {
    pub fn load(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let kids = dict
            .get("Kids")
            .cloned()
            .map(|obj| resolver.assert_array(obj))
            .transpose()?
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| obj.as_reference())
            .collect();
        let count = dict.get("Count").and_then(Object::as_integer).unwrap_or(0);
        Ok(Pages {
            kids,
            count,
            parent: dict.get_reference("Parent"),
        })
    }
}

/// A leaf of the page tree (`Type=Page`), with `Resources`/`MediaBox`/
/// `CropBox`/`Rotate` inheritance already applied: a page's effective
/// resources are the nearest ancestor's `Resources` entries merged with
/// its own, child overriding parent, and box rectangles take the first
/// value found walking from the page upward.
#[derive(Debug, Clone)]
pub struct Page {
    pub dict: Dictionary,
    pub resources: Dictionary,
    pub media_box: [f64; 4],
    pub crop_box: Option<[f64; 4]>,
    pub rotate: i64,
    pub contents: Vec<Object>,
    pub annots: Vec<Annot>,
    pub parent: Option<Reference>,
}

const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

impl Page {
    pub fn load(dict: Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let ancestry = Self::ancestry(&dict, resolver)?;

        let mut resources = Dictionary::new();
        let mut media_box = None;
        let mut crop_box = None;
        let mut rotate = None;
        // Oldest (page-tree root) first, so a closer ancestor's keys
        // override via `merge_override`, and the first MediaBox/CropBox/
        // Rotate found walking from the page upward wins.
        for node in ancestry.iter().rev() {
            if let Some(obj) = node.get("Resources").cloned() {
                let resolved = resolver.assert_dict(obj)?;
                resources = resources.merge_override(&resolved);
            }
        }
        for node in &ancestry {
            if media_box.is_none() {
                if let Some(obj) = node.get("MediaBox").cloned() {
                    media_box = Some(parse_rect(obj, resolver)?);
                }
            }
            if crop_box.is_none() {
                if let Some(obj) = node.get("CropBox").cloned() {
                    crop_box = Some(parse_rect(obj, resolver)?);
                }
            }
            if rotate.is_none() {
                if let Some(obj) = node.get("Rotate").cloned() {
                    rotate = Some(resolver.assert_int(obj)?);
                }
            }
        }

        let contents = match dict.get("Contents").cloned() {
            Some(obj) => match resolver.resolve(obj)? {
                Object::Array(items) => items,
                other @ Object::Stream(_) => vec![other],
                Object::Null => Vec::new(),
                other => anyhow::bail!(ParseError::MismatchedObjectType {
                    expected: crate::object::ObjectType::Stream,
                    found: other.object_type(),
                }),
            },
            None => Vec::new(),
        };

        let annots = match dict.get("Annots").cloned() {
            Some(obj) => resolver
                .assert_array(obj)?
                .into_iter()
                .map(|o| {
                    let annot_dict = resolver.assert_dict(o)?;
                    Annot::load(&annot_dict, resolver)
                })
                .collect::<PdfResult<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Page {
            parent: dict.get_reference("Parent"),
            resources,
            media_box: media_box.unwrap_or(DEFAULT_MEDIA_BOX),
            crop_box,
            rotate: rotate.unwrap_or(0),
            contents,
            annots,
            dict,
        })
    }

    /// Returns `[page_dict, parent_dict, grandparent_dict, ...]` up to
    /// the page-tree root, following `Parent` references. Guards against
    /// malformed cyclic trees with a depth cap rather than looping
    /// forever.
    fn ancestry(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Vec<Dictionary>> {
        let mut chain = vec![dict.clone()];
        let mut current = dict.clone();
        for _ in 0..64 {
            match current.get_reference("Parent") {
                Some(r) => {
                    let parent = resolver.assert_dict(Object::Reference(r))?;
                    chain.push(parent.clone());
                    current = parent;
                }
                None => break,
            }
        }
        Ok(chain)
    }
}

fn parse_rect(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<[f64; 4]> {
    let items = resolver.assert_array(obj)?;
    if items.len() != 4 {
        anyhow::bail!(ParseError::ArrayOfInvalidLength {
            expected: 4,
            found: items,
        });
    }
    let mut out = [0.0; 4];
    for (i, item) in items.into_iter().enumerate() {
        out[i] = resolver.assert_f64(item)?;
    }
    Ok(out)
}

/// A font's glyph-metrics dictionary. Only the fields the engine
/// actually consults are broken out; everything else (the
/// appearance-affecting entries needed only to rasterize glyphs) stays
/// in `extra`.
#[derive(Debug, Clone)]
pub struct FontDescriptor {
    pub font_name: Name,
    pub flags: i64,
    pub italic_angle: f64,
    pub ascent: f64,
    pub descent: f64,
    pub cap_height: Option<f64>,
    pub extra: Dictionary,
}

impl FontDescriptor {
    pub fn load(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        Ok(FontDescriptor {
            font_name: dict.expect_name("FontName", resolver)?,
            flags: dict.get("Flags").and_then(Object::as_integer).unwrap_or(0),
            italic_angle: dict.get("ItalicAngle").and_then(Object::as_f64).unwrap_or(0.0),
            ascent: dict.get("Ascent").and_then(Object::as_f64).unwrap_or(0.0),
            descent: dict.get("Descent").and_then(Object::as_f64).unwrap_or(0.0),
            cap_height: dict.get("CapHeight").and_then(Object::as_f64),
            extra: dict.clone(),
        })
    }
}

/// An `XObject` resource: either a reusable content stream (`Form`) or a
/// sampled image (`Image`).
#[derive(Debug, Clone)]
pub enum XObject {
    Image(ImageXObject),
    Form(FormXObject),
}

impl XObject {
    pub fn load(stream: crate::object::Stream, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let subtype = stream.dict.expect_name("Subtype", resolver)?;
        match subtype.as_str() {
            "Image" => Ok(XObject::Image(ImageXObject::load(stream)?)),
            "Form" => Ok(XObject::Form(FormXObject::load(stream, resolver)?)),
            other => anyhow::bail!(ParseError::UnrecognizedVariant {
                found: other.to_owned(),
                ty: "XObject Subtype",
            }),
        }
    }
}

/// A sampled image resource.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: i64,
    pub height: i64,
    pub bits_per_component: i64,
    pub color_space: Option<Object>,
    pub stream: crate::object::Stream,
}

impl ImageXObject {
    fn load(stream: crate::object::Stream) -> PdfResult<Self> {
        let dict = &stream.dict;
        let width = dict
            .get("Width")
            .and_then(Object::as_integer)
            .ok_or(ParseError::MissingRequiredKey { key: "Width" })?;
        let height = dict
            .get("Height")
            .and_then(Object::as_integer)
            .ok_or(ParseError::MissingRequiredKey { key: "Height" })?;
        Ok(ImageXObject {
            width,
            height,
            bits_per_component: dict.get("BitsPerComponent").and_then(Object::as_integer).unwrap_or(8),
            color_space: dict.get("ColorSpace").cloned(),
            stream,
        })
    }

    /// The image's decoded samples, or `Err` if its final filter is a
    /// pass-through image codec (DCT/JBIG2/JPX stay as opaque image
    /// payloads). Callers that only need the raw (possibly
    /// still-compressed) bytes should use `stream.raw` plus
    /// [`crate::filter::is_opaque_image_filter`] directly.
    pub fn decode_samples(&self) -> Result<Vec<u8>, ParseError> {
        crate::filter::decode_stream_raw(&self.stream.raw, &self.stream.dict)
    }
}

/// A reusable content stream resource, invoked by the `Do` operator.
#[derive(Debug, Clone)]
pub struct FormXObject {
    pub resources: Option<Dictionary>,
    pub matrix: Option<[f64; 6]>,
    pub stream: crate::object::Stream,
}

impl FormXObject {
    fn load(stream: crate::object::Stream, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let resources = match stream.dict.get("Resources").cloned() {
            Some(obj) => Some(resolver.assert_dict(obj)?),
            None => None,
        };
        let matrix = match stream.dict.get("Matrix").cloned() {
            Some(obj) => {
                let items = resolver.assert_array(obj)?;
                if items.len() == 6 {
                    let mut m = [0.0; 6];
                    for (i, item) in items.into_iter().enumerate() {
                        m[i] = resolver.assert_f64(item)?;
                    }
                    Some(m)
                } else {
                    None
                }
            }
            None => None,
        };
        Ok(FormXObject {
            resources,
            matrix,
            stream,
        })
    }

    pub fn content_bytes(&self) -> Result<Vec<u8>, ParseError> {
        crate::filter::decode_stream_raw(&self.stream.raw, &self.stream.dict)
    }
}

/// An annotation dictionary.
#[derive(Debug, Clone)]
pub struct Annot {
    pub subtype: Name,
    pub rect: Option<[f64; 4]>,
    pub contents: Option<String>,
    pub subj: Option<String>,
    pub extra: Dictionary,
}

impl Annot {
    pub fn load(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let rect = match dict.get("Rect").cloned() {
            Some(obj) => Some(parse_rect(obj, resolver)?),
            None => None,
        };
        Ok(Annot {
            subtype: dict.expect_name("Subtype", resolver)?,
            rect,
            contents: match dict.get("Contents").cloned() {
                Some(obj) => Some(String::from_obj(obj, resolver)?),
                None => None,
            },
            subj: match dict.get("Subj").cloned() {
                Some(obj) => Some(String::from_obj(obj, resolver)?),
                None => None,
            },
            extra: dict.clone(),
        })
    }
}

/// Recognized but not decrypted: callers can inspect `filter`/`v` to
/// refuse encrypted documents outright rather than attempt to parse
/// garbled streams.
#[derive(Debug, Clone)]
pub struct Encryption {
    pub filter: Name,
    pub v: Option<i64>,
}

impl Encryption {
    pub fn load(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        Ok(Encryption {
            filter: dict.expect_name("Filter", resolver)?,
            v: dict.get("V").and_then(Object::as_integer),
        })
    }
}
