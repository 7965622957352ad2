//! The document: owns the byte buffer, the merged xref, the trailer
//! dictionary, the lazy object cache, and the catalog handle.
//!
//! Builds on the `Resolve` contract from [`crate::object`] and the
//! xref-chain primitives in [`crate::xref`]: this module is the thing
//! that actually holds a byte buffer and an object-number → xref-entry
//! map, and implements `Resolve` by walking them.

use std::collections::{HashMap, HashSet};
use std::io::{Read, Seek};

use crate::bytes::ByteSource;
use crate::catalog::{Catalog, Encryption, Page, Pages};
use crate::error::{ParseError, PdfResult, Warning};
use crate::lexer::{Lexer, Token};
use crate::object::{Dictionary, Object, ObjectType, Reference, Resolve};
use crate::parser::ObjectParser;
use crate::xref::{self, Xref, XrefEntry};

/// Lenience toggles threaded into [`Document::open`]. Both fields
/// currently reflect the only policy this engine implements (trust the
/// `endstream` scan over a disagreeing `Length`; reject overlapping
/// CMap codespace ranges) — they exist so a caller that needs the other
/// branch of either policy has somewhere to ask for it without changing
/// this type's shape later.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    pub trust_endstream_scan: bool,
    pub reject_overlapping_cmap_ranges: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            trust_endstream_scan: true,
            reject_overlapping_cmap_ranges: true,
        }
    }
}

/// The `%PDF-1.N` header.
#[derive(Debug, Clone)]
pub struct Header {
    pub version: String,
}

fn parse_header(buf: &[u8]) -> Result<Header, ParseError> {
    const MARKER: &[u8] = b"%PDF-";
    let window = &buf[..buf.len().min(1024)];
    let at = window
        .windows(MARKER.len())
        .position(|w| w == MARKER)
        .ok_or_else(|| ParseError::MalformedHeader("missing %PDF- signature".to_owned()))?;
    let start = at + MARKER.len();
    let end = buf[start..]
        .iter()
        .position(|&b| b == b'\n' || b == b'\r' || b == b' ')
        .map(|n| start + n)
        .unwrap_or(buf.len());
    let version = std::str::from_utf8(&buf[start..end]).unwrap_or("").trim().to_owned();
    if version.is_empty() {
        return Err(ParseError::MalformedHeader("empty version after %PDF-".to_owned()));
    }
    Ok(Header { version })
}

/// Owns the whole byte buffer plus everything needed to resolve any
/// indirect object lazily.
pub struct Document {
    buf: Vec<u8>,
    xref: Xref,
    pub trailer: Dictionary,
    pub header: Header,
    cache: HashMap<u32, Object>,
    /// Memoized `(object number, object)` pairs per materialized object
    /// stream, keyed by that stream's own object number.
    obj_stream_cache: HashMap<u32, Vec<(u32, Object)>>,
    pub warnings: Vec<Warning>,
    #[allow(dead_code)]
    options: ParseOptions,
}

impl Document {
    /// Opens a document from any `Read + Seek` byte source. Reads the
    /// whole source into memory up front: every offset the xref and
    /// object parser deal in is a whole-file byte offset, and streams
    /// are re-sliced from this buffer on every resolve rather than
    /// re-read from `source`.
    pub fn open<R: Read + Seek>(source: ByteSource<R>, options: ParseOptions) -> PdfResult<Self> {
        let mut source = source;
        let buf = source.read_all()?;
        Self::from_buffer(buf, options)
    }

    /// Convenience constructor over an in-memory buffer, with default
    /// [`ParseOptions`].
    pub fn from_bytes(bytes: Vec<u8>) -> PdfResult<Self> {
        Self::from_buffer(bytes, ParseOptions::default())
    }

    fn from_buffer(buf: Vec<u8>, options: ParseOptions) -> PdfResult<Self> {
        let header = parse_header(&buf)?;
        let mut warnings = Vec::new();
        let (xref, trailer) = Self::load_xref_chain(&buf, &mut warnings)?;
        Ok(Document {
            buf,
            xref,
            trailer,
            header,
            cache: HashMap::new(),
            obj_stream_cache: HashMap::new(),
            warnings,
            options,
        })
    }

    /// Walks the `Prev` chain from the last `startxref`, merging hybrid
    /// `XRefStm` entries in along the way, and falls back to a
    /// linear-scan recovery if the chain itself won't parse.
    fn load_xref_chain(buf: &[u8], warnings: &mut Vec<Warning>) -> PdfResult<(Xref, Dictionary)> {
        match Self::try_load_xref_chain(buf) {
            Ok(result) => Ok(result),
            Err(_) => {
                let (entries, trailer) = xref::recover(buf);
                if entries.is_empty() {
                    anyhow::bail!(ParseError::XrefNotFound);
                }
                warnings.push(Warning::Recovered {
                    reason: "xref chain failed to parse; recovered via linear scan for object headers".to_owned(),
                });
                let mut xref = Xref::default();
                xref.entries = entries;
                Ok((xref, trailer.unwrap_or_default()))
            }
        }
    }

    fn try_load_xref_chain(buf: &[u8]) -> Result<(Xref, Dictionary), ParseError> {
        let start = xref::find_startxref(buf)?;
        let mut merged = Xref::default();
        let mut trailer: Option<Dictionary> = None;
        let mut offset = Some(start);
        let mut visited = HashSet::new();
        while let Some(off) = offset {
            if !visited.insert(off) {
                break;
            }
            let section = xref::load_section(buf, off)?;
            if let Some(xref_stm) = section.xref_stm {
                if let Ok(hybrid) = xref::load_section(buf, xref_stm) {
                    merged.merge_missing(hybrid.entries);
                }
            }
            // The trailer from the newest section in the chain (the one
            // `startxref` points at, visited first) is the one whose
            // `Root`/`Info`/`Encrypt` apply.
            if trailer.is_none() {
                trailer = Some(section.trailer.clone());
            }
            let prev = section.prev;
            merged.merge_missing(section.entries);
            offset = prev;
        }
        let trailer = trailer.ok_or(ParseError::XrefNotFound)?;
        Ok((merged, trailer))
    }

    fn load_object(&mut self, num: u32) -> PdfResult<Object> {
        if let Some(obj) = self.cache.get(&num) {
            return Ok(obj.clone());
        }
        let entry = match self.xref.entries.get(&num) {
            Some(e) => *e,
            None => {
                let reason = ParseError::MissingObject((num, 0)).to_string();
                tracing::warn!(num, %reason, "resolving absent object to null");
                self.warnings.push(Warning::Recovered { reason });
                return Ok(Object::Null);
            }
        };
        let obj = match entry {
            XrefEntry::Free { .. } => Object::Null,
            XrefEntry::InUse { offset, .. } => {
                let mut parser = ObjectParser::new(&self.buf, offset as usize);
                let (_reference, obj) = parser.parse_indirect_object()?;
                obj
            }
            XrefEntry::Compressed { stream_obj_num, .. } => self.load_compressed_object(stream_obj_num, num)?,
        };
        self.cache.insert(num, obj.clone());
        Ok(obj)
    }

    fn load_compressed_object(&mut self, stream_obj_num: u32, want_num: u32) -> PdfResult<Object> {
        if !self.obj_stream_cache.contains_key(&stream_obj_num) {
            let members = self.materialize_object_stream(stream_obj_num)?;
            self.obj_stream_cache.insert(stream_obj_num, members);
        }
        let members = &self.obj_stream_cache[&stream_obj_num];
        members
            .iter()
            .find(|(n, _)| *n == want_num)
            .map(|(_, o)| o.clone())
            .ok_or_else(|| ParseError::MissingObject((want_num, 0)).into())
    }

    /// Decodes an object stream's payload and parses its `N`-pair index
    /// header plus each indexed object.
    fn materialize_object_stream(&mut self, stream_obj_num: u32) -> PdfResult<Vec<(u32, Object)>> {
        let stream = match self.load_object(stream_obj_num)? {
            Object::Stream(s) => s,
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Stream,
                found: other.object_type(),
            }),
        };
        let n = stream
            .dict
            .get("N")
            .and_then(Object::as_integer)
            .ok_or(ParseError::MissingRequiredKey { key: "N" })?;
        let first = stream
            .dict
            .get("First")
            .and_then(Object::as_integer)
            .ok_or(ParseError::MissingRequiredKey { key: "First" })?;
        let decoded = crate::filter::decode_stream_raw(&stream.raw, &stream.dict)?;

        let mut header_lexer = Lexer::new(&decoded, 0);
        let mut index = Vec::with_capacity(n.max(0) as usize);
        for _ in 0..n {
            let num = match header_lexer.next_token()? {
                Token::Integer(v) if v >= 0 => v as u32,
                other => {
                    return Err(ParseError::lexical(header_lexer.pos as u64, format!("expected object number in ObjStm header, found {other:?}")).into())
                }
            };
            let off = match header_lexer.next_token()? {
                Token::Integer(v) if v >= 0 => v as usize,
                other => {
                    return Err(ParseError::lexical(header_lexer.pos as u64, format!("expected offset in ObjStm header, found {other:?}")).into())
                }
            };
            index.push((num, off));
        }

        let mut members = Vec::with_capacity(index.len());
        for (num, off) in index {
            let mut parser = ObjectParser::new(&decoded, first as usize + off);
            members.push((num, parser.parse_object()?));
        }
        Ok(members)
    }

    /// `trailer.Root` resolved and typed.
    pub fn root(&mut self) -> PdfResult<Catalog> {
        let root_ref = self
            .trailer
            .get_reference("Root")
            .ok_or(ParseError::MissingRequiredKey { key: "Root" })?;
        let dict = self.assert_dict(Object::Reference(root_ref))?;
        Catalog::load(&dict, self)
    }

    /// The `Encrypt` dictionary, recognized but never decrypted. Callers
    /// that need to refuse encrypted input check this before calling
    /// [`Document::pages`].
    pub fn encryption(&mut self) -> PdfResult<Option<Encryption>> {
        match self.trailer.get("Encrypt").cloned() {
            Some(obj) => {
                let dict = self.assert_dict(obj)?;
                Ok(Some(Encryption::load(&dict, self)?))
            }
            None => Ok(None),
        }
    }

    /// A preorder walk of the page tree, with `Resources`/`MediaBox`/
    /// `CropBox`/`Rotate` inheritance already resolved onto each `Page`.
    pub fn pages(&mut self) -> PdfResult<Vec<Page>> {
        let catalog = self.root()?;
        let mut out = Vec::new();
        self.walk_pages(catalog.pages, &mut out, 0)?;
        Ok(out)
    }

    fn walk_pages(&mut self, node_ref: Reference, out: &mut Vec<Page>, depth: usize) -> PdfResult<()> {
        if depth > 64 {
            anyhow::bail!(ParseError::MalformedXref {
                reason: "page tree exceeds maximum depth (cyclic Kids/Parent?)".to_owned(),
            });
        }
        let dict = self.assert_dict(Object::Reference(node_ref))?;
        let is_leaf = match dict.get("Type").and_then(Object::as_name).map(|name| name.as_str()) {
            Some("Pages") => false,
            Some("Page") => true,
            // Some producers omit `/Type`; a node with `Kids` is an
            // internal node, otherwise treat it as a leaf.
            _ => !dict.contains_key("Kids"),
        };
        if is_leaf {
            out.push(Page::load(dict, self)?);
        } else {
            let node = Pages::load(&dict, self)?;
            for kid in node.kids {
                self.walk_pages(kid, out, depth + 1)?;
            }
        }
        Ok(())
    }
}

impl Resolve for Document {
    fn resolve(&mut self, obj: Object) -> PdfResult<Object> {
        match obj {
            Object::Reference(r) => self.load_object(r.num),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Name;

    fn minimal_pdf() -> Vec<u8> {
        // A tiny single-page document with a classic xref table, built by
        // hand rather than via an encoder (this engine never writes PDFs).
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n");
        let mut offsets = Vec::new();

        offsets.push(buf.len());
        buf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        offsets.push(buf.len());
        buf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

        offsets.push(buf.len());
        buf.extend_from_slice(b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >>\nendobj\n");

        let xref_offset = buf.len();
        buf.extend_from_slice(b"xref\n0 4\n");
        buf.extend_from_slice(b"0000000000 65535 f \n");
        for off in &offsets {
            buf.extend_from_slice(format!("{:010} 00000 n \n", off).as_bytes());
        }
        buf.extend_from_slice(b"trailer\n<< /Size 4 /Root 1 0 R >>\n");
        buf.extend_from_slice(format!("startxref\n{xref_offset}\n%%EOF").as_bytes());
        buf
    }

    #[test]
    fn opens_header_and_trailer() {
        let doc = Document::from_bytes(minimal_pdf()).unwrap();
        assert_eq!(doc.header.version, "1.4");
        assert_eq!(doc.trailer.get_reference("Root"), Some(Reference::new(1, 0)));
    }

    #[test]
    fn resolves_catalog_and_page_tree() {
        let mut doc = Document::from_bytes(minimal_pdf()).unwrap();
        let catalog = doc.root().unwrap();
        assert_eq!(catalog.pages, Reference::new(2, 0));
        let pages = doc.pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].media_box, [0.0, 0.0, 612.0, 792.0]);
    }

    #[test]
    fn resolve_is_referentially_transparent() {
        let mut doc = Document::from_bytes(minimal_pdf()).unwrap();
        let a = doc.resolve(Object::Reference(Reference::new(2, 0))).unwrap();
        let b = doc.resolve(Object::Reference(Reference::new(2, 0))).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_object_resolves_to_null_and_warns() {
        let mut doc = Document::from_bytes(minimal_pdf()).unwrap();
        let obj = doc.resolve(Object::Reference(Reference::new(99, 0))).unwrap();
        assert!(obj.is_null());
        assert!(!doc.warnings.is_empty());
    }

    #[test]
    fn name_helper_reads_type() {
        let mut dict = Dictionary::new();
        dict.insert(Name::from("Type"), Object::Name(Name::from("Page")));
        assert_eq!(dict.get("Type").and_then(Object::as_name).map(|name| name.as_str()), Some("Page"));
    }
}
