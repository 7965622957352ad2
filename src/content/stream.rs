//! A page's (or Form XObject's) effective content stream: `Contents`
//! may be a single stream or an array of streams, which concatenate
//! into one token stream for the interpreter. Adjacent streams are
//! joined with a single space so a token split across a stream
//! boundary in the source PDF never fuses into one.

use std::fmt;

use crate::error::PdfResult;
use crate::filter::decode_stream_raw;
use crate::object::{Object, Resolve, Stream};

#[derive(Clone)]
pub struct ContentStream {
    pub combined_buffer: Vec<u8>,
}

impl fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentStream")
            .field("combined_buffer", &format!("[{} bytes]", self.combined_buffer.len()))
            .finish()
    }
}

impl ContentStream {
    /// Builds the combined content stream from a page's `Contents`
    /// value, which may be a single stream or an array of streams,
    /// concatenated with a single space separator. Each element may
    /// still be an indirect reference to a stream — `Page::load`
    /// resolves only the top-level `Contents` key, not the array's own
    /// elements — so this resolves one hop per item.
    pub fn from_contents(contents: &[Object], resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let mut combined_buffer = Vec::new();
        for (i, obj) in contents.iter().enumerate() {
            let stream = resolver.assert_stream(obj.clone())?;
            if i > 0 {
                combined_buffer.push(b' ');
            }
            combined_buffer.extend(decode_stream_raw(&stream.raw, &stream.dict)?);
        }
        Ok(ContentStream { combined_buffer })
    }

    /// Builds from a single stream object (e.g. a Form XObject's own
    /// content stream), resolving one indirection if needed.
    pub fn from_single(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let stream: Stream = resolver.assert_stream(obj)?;
        let combined_buffer = decode_stream_raw(&stream.raw, &stream.dict)?;
        Ok(ContentStream { combined_buffer })
    }
}
