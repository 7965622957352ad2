//! Font resources and the byte-sequence-to-Unicode decode algorithm.

pub mod cmap;
pub mod encoding;

use crate::error::{ParseError, PdfResult};
use crate::object::{Dictionary, Object, Resolve};
use cmap::CMap;
use encoding::SimpleEncoding;

enum FontKind {
    Simple { encoding: SimpleEncoding },
    Composite { encoding_cmap: CMap },
}

/// A loaded font resource, holding whatever is needed to translate the
/// raw bytes a `Tj`/`TJ` string carries into Unicode text. `BaseFont`/
/// `Subtype` are kept for diagnostics; this engine does not rasterize
/// glyphs.
pub struct Font {
    pub base_font: String,
    pub subtype: String,
    to_unicode: Option<CMap>,
    kind: FontKind,
}

fn load_cmap_stream(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<CMap> {
    let stream = resolver.assert_stream(obj)?;
    let decoded = crate::filter::decode_stream_raw(&stream.raw, &stream.dict)?;
    Ok(CMap::parse(&decoded)?)
}

impl Font {
    /// Builds a `Font` from a `/Type /Font` dictionary. A Type0
    /// (composite) font has a `DescendantFonts` array; a simple font has
    /// an `Encoding` and may also have a `ToUnicode` CMap.
    pub fn load(dict: &Dictionary, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let subtype = dict.expect_name("Subtype", resolver)?.as_str().to_owned();
        let base_font = match dict.get("BaseFont").cloned() {
            Some(obj) => resolver.assert_name(obj)?.as_str().to_owned(),
            None => String::new(),
        };
        let to_unicode = match dict.get("ToUnicode").cloned() {
            Some(obj) => Some(load_cmap_stream(obj, resolver)?),
            None => None,
        };

        if subtype == "Type0" {
            let descendants = dict.expect_array("DescendantFonts", resolver)?;
            // A Type0 font's DescendantFonts array always has exactly one
            // entry (ISO 32000-1 §9.7.4); only its CIDSystemInfo/CIDToGIDMap
            // would matter for glyph rendering, out of scope here.
            let _descendant = descendants
                .into_iter()
                .next()
                .ok_or(ParseError::MissingRequiredKey { key: "DescendantFonts" })
                .and_then(|obj| resolver.assert_dict(obj).map_err(Into::into))?;

            let encoding_cmap = match dict.get("Encoding").cloned() {
                Some(Object::Name(name)) => CMap::by_predefined_name(name.as_str())
                    .ok_or_else(|| ParseError::CMap(format!("unsupported predefined CMap {:?}", name.as_str())))?,
                Some(obj) => load_cmap_stream(obj, resolver)?,
                None => CMap::identity(0),
            };

            Ok(Font {
                base_font,
                subtype,
                to_unicode,
                kind: FontKind::Composite { encoding_cmap },
            })
        } else {
            let encoding = match dict.get("Encoding").cloned() {
                Some(obj) => {
                    let resolved = resolver.resolve(obj)?;
                    SimpleEncoding::from_object(&resolved)
                }
                None => SimpleEncoding::standard(),
            };

            Ok(Font {
                base_font,
                subtype,
                to_unicode,
                kind: FontKind::Simple { encoding },
            })
        }
    }

    /// Splits `bytes` into character codes and translates each to
    /// Unicode. `None` means no mapping was found for that code; callers
    /// substitute `U+FFFD` and record
    /// [`crate::error::Warning::UnmappedCode`].
    pub fn decode(&self, bytes: &[u8]) -> Vec<(u32, Option<String>)> {
        match &self.kind {
            FontKind::Simple { encoding } => bytes
                .iter()
                .map(|&b| {
                    let text = self
                        .to_unicode
                        .as_ref()
                        .and_then(|cm| cm.lookup_unicode(1, b as u32))
                        .map(|scalars| scalars_to_string(&scalars))
                        .or_else(|| encoding.decode_byte(b));
                    (b as u32, text)
                })
                .collect(),
            FontKind::Composite { encoding_cmap } => {
                let mut out = Vec::new();
                let mut rest = bytes;
                while !rest.is_empty() {
                    let (code, len) = encoding_cmap.next_code(rest);
                    let len = len.max(1).min(rest.len());
                    let text = self
                        .to_unicode
                        .as_ref()
                        .and_then(|cm| cm.lookup_unicode(len, code))
                        .map(|scalars| scalars_to_string(&scalars));
                    out.push((code, text));
                    rest = &rest[len..];
                }
                out
            }
        }
    }
}

fn scalars_to_string(scalars: &[u32]) -> String {
    scalars
        .iter()
        .map(|&cp| char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Name, Stream};

    struct NoopResolver;
    impl Resolve for NoopResolver {
        fn resolve(&mut self, obj: Object) -> PdfResult<Object> {
            Ok(obj)
        }
    }

    #[test]
    fn simple_font_decodes_ascii_via_standard_encoding() {
        let mut dict = Dictionary::new();
        dict.insert(Name::from("Type"), Object::Name(Name::from("Font")));
        dict.insert(Name::from("Subtype"), Object::Name(Name::from("Type1")));
        dict.insert(Name::from("BaseFont"), Object::Name(Name::from("Helvetica")));
        let font = Font::load(&dict, &mut NoopResolver).unwrap();
        let decoded = font.decode(b"AB");
        assert_eq!(decoded[0].1.as_deref(), Some("A"));
        assert_eq!(decoded[1].1.as_deref(), Some("B"));
    }

    #[test]
    fn simple_font_prefers_to_unicode_over_encoding() {
        let cmap_src = b"1 begincodespacerange\n<00> <FF>\nendcodespacerange\n1 beginbfchar\n<41> <0078>\nendbfchar\n";
        let mut stream_dict = Dictionary::new();
        let stream = Stream {
            dict: stream_dict.clone(),
            raw: cmap_src.to_vec(),
        };
        let mut dict = Dictionary::new();
        dict.insert(Name::from("Type"), Object::Name(Name::from("Font")));
        dict.insert(Name::from("Subtype"), Object::Name(Name::from("Type1")));
        dict.insert(Name::from("ToUnicode"), Object::Stream(stream));
        stream_dict.insert(Name::from("Length"), Object::Integer(cmap_src.len() as i64));
        let font = Font::load(&dict, &mut NoopResolver).unwrap();
        let decoded = font.decode(b"A");
        assert_eq!(decoded[0].1.as_deref(), Some("x"));
    }

    #[test]
    fn composite_identity_font_without_to_unicode_reports_unmapped() {
        let mut dict = Dictionary::new();
        dict.insert(Name::from("Type"), Object::Name(Name::from("Font")));
        dict.insert(Name::from("Subtype"), Object::Name(Name::from("Type0")));
        dict.insert(Name::from("Encoding"), Object::Name(Name::from("Identity-H")));
        let mut descendant = Dictionary::new();
        descendant.insert(Name::from("Type"), Object::Name(Name::from("Font")));
        descendant.insert(Name::from("Subtype"), Object::Name(Name::from("CIDFontType2")));
        dict.insert(Name::from("DescendantFonts"), Object::Array(vec![Object::Dictionary(descendant)]));
        let font = Font::load(&dict, &mut NoopResolver).unwrap();
        let decoded = font.decode(&[0x00, 0x41]);
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].0, 0x0041);
        assert_eq!(decoded[0].1, None);
    }
}
