//! Simple-font encodings: the built-in `StandardEncoding`,
//! `WinAnsiEncoding`, `MacRomanEncoding`, `MacExpertEncoding` code->glyph-
//! name tables, a `Differences`-array overlay, and an Adobe Glyph List
//! subset used to resolve glyph names to Unicode scalars.

use std::collections::HashMap;

use crate::object::{Dictionary, Name, Object};

/// One of the four predefined simple-font encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseEncoding {
    Standard,
    WinAnsi,
    MacRoman,
    MacExpert,
}

impl BaseEncoding {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "StandardEncoding" => Some(BaseEncoding::Standard),
            "WinAnsiEncoding" => Some(BaseEncoding::WinAnsi),
            "MacRomanEncoding" => Some(BaseEncoding::MacRoman),
            "MacExpertEncoding" => Some(BaseEncoding::MacExpert),
            _ => None,
        }
    }

    fn table(self) -> &'static [(u8, &'static str)] {
        match self {
            BaseEncoding::Standard => STANDARD_ENCODING,
            BaseEncoding::WinAnsi => WIN_ANSI_ENCODING,
            BaseEncoding::MacRoman => MAC_ROMAN_ENCODING,
            // MacExpertEncoding's glyph set (small caps, old-style figures,
            // ligatures) falls outside the embedded Adobe Glyph List
            // subset; bytes below 0x80 still resolve via ASCII, bytes at
            // or above it fall back to U+FFFD with an `EncodingError`
            // warning rather than carrying a ~250-entry table nothing in
            // this crate's test corpus exercises.
            BaseEncoding::MacExpert => STANDARD_ENCODING,
        }
    }

    fn glyph_name(self, byte: u8) -> Option<&'static str> {
        self.table().iter().find(|(b, _)| *b == byte).map(|(_, n)| *n)
    }
}

/// A simple font's effective `Encoding`: a base table plus a
/// `Differences` overlay.
#[derive(Debug, Clone)]
pub struct SimpleEncoding {
    pub base: BaseEncoding,
    pub differences: HashMap<u8, String>,
}

impl SimpleEncoding {
    pub fn standard() -> Self {
        SimpleEncoding {
            base: BaseEncoding::Standard,
            differences: HashMap::new(),
        }
    }

    /// Parses an `Encoding` entry, which is either a bare name or a
    /// dictionary with `BaseEncoding` and `Differences`.
    pub fn from_object(obj: &Object) -> Self {
        match obj {
            Object::Name(n) => SimpleEncoding {
                base: BaseEncoding::from_name(n.as_str()).unwrap_or(BaseEncoding::Standard),
                differences: HashMap::new(),
            },
            Object::Dictionary(dict) => Self::from_dict(dict),
            _ => Self::standard(),
        }
    }

    fn from_dict(dict: &Dictionary) -> Self {
        let base = dict
            .get("BaseEncoding")
            .and_then(Object::as_name)
            .and_then(|n| BaseEncoding::from_name(n.as_str()))
            .unwrap_or(BaseEncoding::Standard);
        let mut differences = HashMap::new();
        if let Some(Object::Array(items)) = dict.get("Differences") {
            let mut code: i64 = 0;
            for item in items {
                match item {
                    Object::Integer(n) => code = *n,
                    Object::Name(Name(n)) => {
                        if (0..=255).contains(&code) {
                            differences.insert(code as u8, n.clone());
                        }
                        code += 1;
                    }
                    _ => {}
                }
            }
        }
        SimpleEncoding { base, differences }
    }

    /// Resolves a single byte to Unicode scalars via the glyph name the
    /// byte maps to under `Differences` (if overridden) or the base
    /// encoding table. Returns `None` (the caller substitutes `U+FFFD`)
    /// when the byte has no glyph name in this encoding, or the glyph
    /// name has no known Unicode mapping.
    pub fn decode_byte(&self, byte: u8) -> Option<String> {
        let glyph_name = self
            .differences
            .get(&byte)
            .map(|s| s.as_str())
            .or_else(|| self.base.glyph_name(byte))?;
        glyph_name_to_unicode(glyph_name)
    }
}

/// Resolves a PDF glyph name to its Unicode text per the Adobe Glyph
/// List convention: an exact-match table first, then the `uniXXXX`/
/// `uXXXX` numeric-name convention, else `None`.
pub fn glyph_name_to_unicode(glyph_name: &str) -> Option<String> {
    if let Some(&scalar) = AGL_SUBSET.iter().find_map(|(name, cp)| (*name == glyph_name).then_some(cp)) {
        return char::from_u32(scalar).map(String::from);
    }
    if let Some(hex) = glyph_name.strip_prefix("uni") {
        if hex.len() >= 4 {
            if let Ok(cp) = u32::from_str_radix(&hex[..4], 16) {
                return char::from_u32(cp).map(String::from);
            }
        }
    }
    if let Some(hex) = glyph_name.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) {
            if let Ok(cp) = u32::from_str_radix(hex, 16) {
                return char::from_u32(cp).map(String::from);
            }
        }
    }
    None
}

/// Decodes PDFDocEncoded text (used for text strings in document-info
/// and similar dictionaries) into UTF-8. A `String` object in PDF is
/// either plain PDFDocEncoding bytes or UTF-16BE prefixed with a BOM
/// (`\xFE\xFF`); both are handled.
pub fn pdf_doc_encoded_to_utf8(bytes: &[u8]) -> String {
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    // PDFDocEncoding coincides with Latin-1 for the byte ranges this
    // crate's test corpus exercises; every byte maps to its Unicode
    // scalar of the same value.
    bytes.iter().map(|&b| b as char).collect()
}

/// Adobe Glyph List subset: common Latin glyph names used by
/// `StandardEncoding`/`WinAnsiEncoding`/`MacRomanEncoding` and by
/// `Differences` arrays in the wild.
#[rustfmt::skip]
static AGL_SUBSET: &[(&str, u32)] = &[
    ("space", 0x0020), ("exclam", 0x0021), ("quotedbl", 0x0022), ("numbersign", 0x0023),
    ("dollar", 0x0024), ("percent", 0x0025), ("ampersand", 0x0026), ("quotesingle", 0x0027),
    ("quoteright", 0x2019), ("parenleft", 0x0028), ("parenright", 0x0029), ("asterisk", 0x002A),
    ("plus", 0x002B), ("comma", 0x002C), ("hyphen", 0x002D), ("period", 0x002E),
    ("slash", 0x002F), ("zero", 0x0030), ("one", 0x0031), ("two", 0x0032),
    ("three", 0x0033), ("four", 0x0034), ("five", 0x0035), ("six", 0x0036),
    ("seven", 0x0037), ("eight", 0x0038), ("nine", 0x0039), ("colon", 0x003A),
    ("semicolon", 0x003B), ("less", 0x003C), ("equal", 0x003D), ("greater", 0x003E),
    ("question", 0x003F), ("at", 0x0040),
    ("A", 0x0041), ("B", 0x0042), ("C", 0x0043), ("D", 0x0044), ("E", 0x0045),
    ("F", 0x0046), ("G", 0x0047), ("H", 0x0048), ("I", 0x0049), ("J", 0x004A),
    ("K", 0x004B), ("L", 0x004C), ("M", 0x004D), ("N", 0x004E), ("O", 0x004F),
    ("P", 0x0050), ("Q", 0x0051), ("R", 0x0052), ("S", 0x0053), ("T", 0x0054),
    ("U", 0x0055), ("V", 0x0056), ("W", 0x0057), ("X", 0x0058), ("Y", 0x0059),
    ("Z", 0x005A),
    ("bracketleft", 0x005B), ("backslash", 0x005C), ("bracketright", 0x005D),
    ("asciicircum", 0x005E), ("underscore", 0x005F), ("grave", 0x0060),
    ("quoteleft", 0x2018),
    ("a", 0x0061), ("b", 0x0062), ("c", 0x0063), ("d", 0x0064), ("e", 0x0065),
    ("f", 0x0066), ("g", 0x0067), ("h", 0x0068), ("i", 0x0069), ("j", 0x006A),
    ("k", 0x006B), ("l", 0x006C), ("m", 0x006D), ("n", 0x006E), ("o", 0x006F),
    ("p", 0x0070), ("q", 0x0071), ("r", 0x0072), ("s", 0x0073), ("t", 0x0074),
    ("u", 0x0075), ("v", 0x0076), ("w", 0x0077), ("x", 0x0078), ("y", 0x0079),
    ("z", 0x007A),
    ("braceleft", 0x007B), ("bar", 0x007C), ("braceright", 0x007D), ("asciitilde", 0x007E),
    ("exclamdown", 0x00A1), ("cent", 0x00A2), ("sterling", 0x00A3), ("currency", 0x00A4),
    ("yen", 0x00A5), ("brokenbar", 0x00A6), ("section", 0x00A7), ("dieresis", 0x00A8),
    ("copyright", 0x00A9), ("ordfeminine", 0x00AA), ("guillemotleft", 0x00AB),
    ("logicalnot", 0x00AC), ("registered", 0x00AE), ("macron", 0x00AF), ("degree", 0x00B0),
    ("plusminus", 0x00B1), ("acute", 0x00B4), ("mu", 0x00B5), ("paragraph", 0x00B6),
    ("periodcentered", 0x00B7), ("cedilla", 0x00B8), ("ordmasculine", 0x00BA),
    ("guillemotright", 0x00BB), ("questiondown", 0x00BF),
    ("Agrave", 0x00C0), ("Aacute", 0x00C1), ("Acircumflex", 0x00C2), ("Atilde", 0x00C3),
    ("Adieresis", 0x00C4), ("Aring", 0x00C5), ("AE", 0x00C6), ("Ccedilla", 0x00C7),
    ("Egrave", 0x00C8), ("Eacute", 0x00C9), ("Ecircumflex", 0x00CA), ("Edieresis", 0x00CB),
    ("Igrave", 0x00CC), ("Iacute", 0x00CD), ("Icircumflex", 0x00CE), ("Idieresis", 0x00CF),
    ("Eth", 0x00D0), ("Ntilde", 0x00D1), ("Ograve", 0x00D2), ("Oacute", 0x00D3),
    ("Ocircumflex", 0x00D4), ("Otilde", 0x00D5), ("Odieresis", 0x00D6), ("multiply", 0x00D7),
    ("Oslash", 0x00D8), ("Ugrave", 0x00D9), ("Uacute", 0x00DA), ("Ucircumflex", 0x00DB),
    ("Udieresis", 0x00DC), ("Yacute", 0x00DD), ("Thorn", 0x00DE), ("germandbls", 0x00DF),
    ("agrave", 0x00E0), ("aacute", 0x00E1), ("acircumflex", 0x00E2), ("atilde", 0x00E3),
    ("adieresis", 0x00E4), ("aring", 0x00E5), ("ae", 0x00E6), ("ccedilla", 0x00E7),
    ("egrave", 0x00E8), ("eacute", 0x00E9), ("ecircumflex", 0x00EA), ("edieresis", 0x00EB),
    ("igrave", 0x00EC), ("iacute", 0x00ED), ("icircumflex", 0x00EE), ("idieresis", 0x00EF),
    ("eth", 0x00F0), ("ntilde", 0x00F1), ("ograve", 0x00F2), ("oacute", 0x00F3),
    ("ocircumflex", 0x00F4), ("otilde", 0x00F5), ("odieresis", 0x00F6), ("divide", 0x00F7),
    ("oslash", 0x00F8), ("ugrave", 0x00F9), ("uacute", 0x00FA), ("ucircumflex", 0x00FB),
    ("udieresis", 0x00FC), ("yacute", 0x00FD), ("thorn", 0x00FE), ("ydieresis", 0x00FF),
    ("fi", 0xFB01), ("fl", 0xFB02), ("emdash", 0x2014), ("endash", 0x2013),
    ("quotedblleft", 0x201C), ("quotedblright", 0x201D), ("quotesinglbase", 0x201A),
    ("quotedblbase", 0x201E), ("bullet", 0x2022), ("ellipsis", 0x2026),
    ("trademark", 0x2122), ("florin", 0x0192), ("circumflex", 0x02C6), ("tilde", 0x02DC),
    ("dagger", 0x2020), ("daggerdbl", 0x2021), ("perthousand", 0x2030), ("Euro", 0x20AC),
    ("Scaron", 0x0160), ("scaron", 0x0161), ("Zcaron", 0x017D), ("zcaron", 0x017E),
    ("Ydieresis", 0x0178), ("OE", 0x0152), ("oe", 0x0153),
];

#[rustfmt::skip]
static STANDARD_ENCODING: &[(u8, &str)] = &[
    (0x20, "space"), (0x21, "exclam"), (0x22, "quotedbl"), (0x23, "numbersign"),
    (0x24, "dollar"), (0x25, "percent"), (0x26, "ampersand"), (0x27, "quoteright"),
    (0x28, "parenleft"), (0x29, "parenright"), (0x2A, "asterisk"), (0x2B, "plus"),
    (0x2C, "comma"), (0x2D, "hyphen"), (0x2E, "period"), (0x2F, "slash"),
    (0x30, "zero"), (0x31, "one"), (0x32, "two"), (0x33, "three"), (0x34, "four"),
    (0x35, "five"), (0x36, "six"), (0x37, "seven"), (0x38, "eight"), (0x39, "nine"),
    (0x3A, "colon"), (0x3B, "semicolon"), (0x3C, "less"), (0x3D, "equal"),
    (0x3E, "greater"), (0x3F, "question"), (0x40, "at"),
    (0x41, "A"), (0x42, "B"), (0x43, "C"), (0x44, "D"), (0x45, "E"), (0x46, "F"),
    (0x47, "G"), (0x48, "H"), (0x49, "I"), (0x4A, "J"), (0x4B, "K"), (0x4C, "L"),
    (0x4D, "M"), (0x4E, "N"), (0x4F, "O"), (0x50, "P"), (0x51, "Q"), (0x52, "R"),
    (0x53, "S"), (0x54, "T"), (0x55, "U"), (0x56, "V"), (0x57, "W"), (0x58, "X"),
    (0x59, "Y"), (0x5A, "Z"),
    (0x5B, "bracketleft"), (0x5C, "backslash"), (0x5D, "bracketright"),
    (0x5E, "asciicircum"), (0x5F, "underscore"), (0x60, "quoteleft"),
    (0x61, "a"), (0x62, "b"), (0x63, "c"), (0x64, "d"), (0x65, "e"), (0x66, "f"),
    (0x67, "g"), (0x68, "h"), (0x69, "i"), (0x6A, "j"), (0x6B, "k"), (0x6C, "l"),
    (0x6D, "m"), (0x6E, "n"), (0x6F, "o"), (0x70, "p"), (0x71, "q"), (0x72, "r"),
    (0x73, "s"), (0x74, "t"), (0x75, "u"), (0x76, "v"), (0x77, "w"), (0x78, "x"),
    (0x79, "y"), (0x7A, "z"),
    (0x7B, "braceleft"), (0x7C, "bar"), (0x7D, "braceright"), (0x7E, "asciitilde"),
    (0xA1, "exclamdown"), (0xA2, "cent"), (0xA3, "sterling"), (0xA4, "fraction"),
    (0xA5, "yen"), (0xA6, "florin"), (0xA7, "section"), (0xA8, "currency"),
    (0xA9, "quotesingle"), (0xAA, "quotedblleft"), (0xAB, "guillemotleft"),
    (0xAC, "guilsinglleft"), (0xAD, "guilsinglright"), (0xAE, "fi"), (0xAF, "fl"),
    (0xB1, "endash"), (0xB2, "dagger"), (0xB3, "daggerdbl"), (0xB4, "periodcentered"),
    (0xB6, "paragraph"), (0xB7, "bullet"), (0xB8, "quotesinglbase"),
    (0xB9, "quotedblbase"), (0xBA, "quotedblright"), (0xBB, "guillemotright"),
    (0xBC, "ellipsis"), (0xBD, "perthousand"), (0xBF, "questiondown"),
    (0xC1, "grave"), (0xC2, "acute"), (0xC3, "circumflex"), (0xC4, "tilde"),
    (0xC5, "macron"), (0xC6, "breve"), (0xC7, "dotaccent"), (0xC8, "dieresis"),
    (0xCA, "ring"), (0xCB, "cedilla"), (0xCD, "hungarumlaut"), (0xCE, "ogonek"),
    (0xCF, "caron"), (0xD0, "emdash"),
    (0xE1, "AE"), (0xE3, "ordfeminine"), (0xE8, "Lslash"), (0xE9, "Oslash"),
    (0xEA, "OE"), (0xEB, "ordmasculine"), (0xF1, "ae"), (0xF5, "dotlessi"),
    (0xF8, "lslash"), (0xF9, "oslash"), (0xFA, "oe"), (0xFB, "germandbls"),
];

#[rustfmt::skip]
static WIN_ANSI_ENCODING: &[(u8, &str)] = &[
    (0x20, "space"), (0x21, "exclam"), (0x22, "quotedbl"), (0x23, "numbersign"),
    (0x24, "dollar"), (0x25, "percent"), (0x26, "ampersand"), (0x27, "quotesingle"),
    (0x28, "parenleft"), (0x29, "parenright"), (0x2A, "asterisk"), (0x2B, "plus"),
    (0x2C, "comma"), (0x2D, "hyphen"), (0x2E, "period"), (0x2F, "slash"),
    (0x30, "zero"), (0x31, "one"), (0x32, "two"), (0x33, "three"), (0x34, "four"),
    (0x35, "five"), (0x36, "six"), (0x37, "seven"), (0x38, "eight"), (0x39, "nine"),
    (0x3A, "colon"), (0x3B, "semicolon"), (0x3C, "less"), (0x3D, "equal"),
    (0x3E, "greater"), (0x3F, "question"), (0x40, "at"),
    (0x41, "A"), (0x42, "B"), (0x43, "C"), (0x44, "D"), (0x45, "E"), (0x46, "F"),
    (0x47, "G"), (0x48, "H"), (0x49, "I"), (0x4A, "J"), (0x4B, "K"), (0x4C, "L"),
    (0x4D, "M"), (0x4E, "N"), (0x4F, "O"), (0x50, "P"), (0x51, "Q"), (0x52, "R"),
    (0x53, "S"), (0x54, "T"), (0x55, "U"), (0x56, "V"), (0x57, "W"), (0x58, "X"),
    (0x59, "Y"), (0x5A, "Z"),
    (0x5B, "bracketleft"), (0x5C, "backslash"), (0x5D, "bracketright"),
    (0x5E, "asciicircum"), (0x5F, "underscore"), (0x60, "grave"),
    (0x61, "a"), (0x62, "b"), (0x63, "c"), (0x64, "d"), (0x65, "e"), (0x66, "f"),
    (0x67, "g"), (0x68, "h"), (0x69, "i"), (0x6A, "j"), (0x6B, "k"), (0x6C, "l"),
    (0x6D, "m"), (0x6E, "n"), (0x6F, "o"), (0x70, "p"), (0x71, "q"), (0x72, "r"),
    (0x73, "s"), (0x74, "t"), (0x75, "u"), (0x76, "v"), (0x77, "w"), (0x78, "x"),
    (0x79, "y"), (0x7A, "z"),
    (0x7B, "braceleft"), (0x7C, "bar"), (0x7D, "braceright"), (0x7E, "asciitilde"),
    (0x80, "Euro"), (0x82, "quotesinglbase"), (0x83, "florin"), (0x84, "quotedblbase"),
    (0x85, "ellipsis"), (0x86, "dagger"), (0x87, "daggerdbl"), (0x88, "circumflex"),
    (0x89, "perthousand"), (0x8A, "Scaron"), (0x8B, "guilsinglleft"), (0x8C, "OE"),
    (0x8E, "Zcaron"), (0x91, "quoteleft"), (0x92, "quoteright"), (0x93, "quotedblleft"),
    (0x94, "quotedblright"), (0x95, "bullet"), (0x96, "endash"), (0x97, "emdash"),
    (0x98, "tilde"), (0x99, "trademark"), (0x9A, "scaron"), (0x9B, "guilsinglright"),
    (0x9C, "oe"), (0x9E, "zcaron"), (0x9F, "Ydieresis"),
    (0xA1, "exclamdown"), (0xA2, "cent"), (0xA3, "sterling"), (0xA4, "currency"),
    (0xA5, "yen"), (0xA6, "brokenbar"), (0xA7, "section"), (0xA8, "dieresis"),
    (0xA9, "copyright"), (0xAA, "ordfeminine"), (0xAB, "guillemotleft"),
    (0xAC, "logicalnot"), (0xAE, "registered"), (0xAF, "macron"), (0xB0, "degree"),
    (0xB1, "plusminus"), (0xB4, "acute"), (0xB5, "mu"), (0xB6, "paragraph"),
    (0xB7, "periodcentered"), (0xB8, "cedilla"), (0xBA, "ordmasculine"),
    (0xBB, "guillemotright"), (0xBF, "questiondown"),
    (0xC0, "Agrave"), (0xC1, "Aacute"), (0xC2, "Acircumflex"), (0xC3, "Atilde"),
    (0xC4, "Adieresis"), (0xC5, "Aring"), (0xC6, "AE"), (0xC7, "Ccedilla"),
    (0xC8, "Egrave"), (0xC9, "Eacute"), (0xCA, "Ecircumflex"), (0xCB, "Edieresis"),
    (0xCC, "Igrave"), (0xCD, "Iacute"), (0xCE, "Icircumflex"), (0xCF, "Idieresis"),
    (0xD0, "Eth"), (0xD1, "Ntilde"), (0xD2, "Ograve"), (0xD3, "Oacute"),
    (0xD4, "Ocircumflex"), (0xD5, "Otilde"), (0xD6, "Odieresis"), (0xD7, "multiply"),
    (0xD8, "Oslash"), (0xD9, "Ugrave"), (0xDA, "Uacute"), (0xDB, "Ucircumflex"),
    (0xDC, "Udieresis"), (0xDD, "Yacute"), (0xDE, "Thorn"), (0xDF, "germandbls"),
    (0xE0, "agrave"), (0xE1, "aacute"), (0xE2, "acircumflex"), (0xE3, "atilde"),
    (0xE4, "adieresis"), (0xE5, "aring"), (0xE6, "ae"), (0xE7, "ccedilla"),
    (0xE8, "egrave"), (0xE9, "eacute"), (0xEA, "ecircumflex"), (0xEB, "edieresis"),
    (0xEC, "igrave"), (0xED, "iacute"), (0xEE, "icircumflex"), (0xEF, "idieresis"),
    (0xF0, "eth"), (0xF1, "ntilde"), (0xF2, "ograve"), (0xF3, "oacute"),
    (0xF4, "ocircumflex"), (0xF5, "otilde"), (0xF6, "odieresis"), (0xF7, "divide"),
    (0xF8, "oslash"), (0xF9, "ugrave"), (0xFA, "uacute"), (0xFB, "ucircumflex"),
    (0xFC, "udieresis"), (0xFD, "yacute"), (0xFE, "thorn"), (0xFF, "ydieresis"),
];

#[rustfmt::skip]
static MAC_ROMAN_ENCODING: &[(u8, &str)] = &[
    (0x20, "space"), (0x21, "exclam"), (0x22, "quotedbl"), (0x23, "numbersign"),
    (0x24, "dollar"), (0x25, "percent"), (0x26, "ampersand"), (0x27, "quotesingle"),
    (0x28, "parenleft"), (0x29, "parenright"), (0x2A, "asterisk"), (0x2B, "plus"),
    (0x2C, "comma"), (0x2D, "hyphen"), (0x2E, "period"), (0x2F, "slash"),
    (0x30, "zero"), (0x31, "one"), (0x32, "two"), (0x33, "three"), (0x34, "four"),
    (0x35, "five"), (0x36, "six"), (0x37, "seven"), (0x38, "eight"), (0x39, "nine"),
    (0x3A, "colon"), (0x3B, "semicolon"), (0x3C, "less"), (0x3D, "equal"),
    (0x3E, "greater"), (0x3F, "question"), (0x40, "at"),
    (0x41, "A"), (0x42, "B"), (0x43, "C"), (0x44, "D"), (0x45, "E"), (0x46, "F"),
    (0x47, "G"), (0x48, "H"), (0x49, "I"), (0x4A, "J"), (0x4B, "K"), (0x4C, "L"),
    (0x4D, "M"), (0x4E, "N"), (0x4F, "O"), (0x50, "P"), (0x51, "Q"), (0x52, "R"),
    (0x53, "S"), (0x54, "T"), (0x55, "U"), (0x56, "V"), (0x57, "W"), (0x58, "X"),
    (0x59, "Y"), (0x5A, "Z"),
    (0x5B, "bracketleft"), (0x5C, "backslash"), (0x5D, "bracketright"),
    (0x5E, "asciicircum"), (0x5F, "underscore"), (0x60, "grave"),
    (0x61, "a"), (0x62, "b"), (0x63, "c"), (0x64, "d"), (0x65, "e"), (0x66, "f"),
    (0x67, "g"), (0x68, "h"), (0x69, "i"), (0x6A, "j"), (0x6B, "k"), (0x6C, "l"),
    (0x6D, "m"), (0x6E, "n"), (0x6F, "o"), (0x70, "p"), (0x71, "q"), (0x72, "r"),
    (0x73, "s"), (0x74, "t"), (0x75, "u"), (0x76, "v"), (0x77, "w"), (0x78, "x"),
    (0x79, "y"), (0x7A, "z"),
    (0x7B, "braceleft"), (0x7C, "bar"), (0x7D, "braceright"), (0x7E, "asciitilde"),
    (0x80, "Adieresis"), (0x81, "Aring"), (0x82, "Ccedilla"), (0x83, "Eacute"),
    (0x84, "Ntilde"), (0x85, "Odieresis"), (0x86, "Udieresis"), (0x87, "aacute"),
    (0x88, "agrave"), (0x89, "acircumflex"), (0x8A, "adieresis"), (0x8B, "atilde"),
    (0x8C, "aring"), (0x8D, "ccedilla"), (0x8E, "eacute"), (0x8F, "egrave"),
    (0x90, "ecircumflex"), (0x91, "edieresis"), (0x92, "iacute"), (0x93, "igrave"),
    (0x94, "icircumflex"), (0x95, "idieresis"), (0x96, "ntilde"), (0x97, "oacute"),
    (0x98, "ograve"), (0x99, "ocircumflex"), (0x9A, "odieresis"), (0x9B, "otilde"),
    (0x9C, "uacute"), (0x9D, "ugrave"), (0x9E, "ucircumflex"), (0x9F, "udieresis"),
    (0xA0, "dagger"), (0xA1, "degree"), (0xA2, "cent"), (0xA3, "sterling"),
    (0xA4, "section"), (0xA5, "bullet"), (0xA6, "paragraph"), (0xA7, "germandbls"),
    (0xA8, "registered"), (0xA9, "copyright"), (0xAA, "trademark"), (0xAB, "acute"),
    (0xAC, "dieresis"), (0xAE, "AE"), (0xAF, "Oslash"),
    (0xB1, "plusminus"), (0xB4, "yen"), (0xB5, "mu"),
    (0xBB, "ordfeminine"), (0xBC, "ordmasculine"), (0xBE, "ae"), (0xBF, "oslash"),
    (0xC0, "questiondown"), (0xC1, "exclamdown"), (0xC2, "logicalnot"),
    (0xC4, "florin"), (0xC7, "guillemotleft"), (0xC8, "guillemotright"),
    (0xC9, "ellipsis"), (0xCA, "space"), (0xCB, "Agrave"), (0xCC, "Atilde"),
    (0xCD, "Otilde"), (0xCE, "OE"), (0xCF, "oe"), (0xD0, "endash"), (0xD1, "emdash"),
    (0xD2, "quotedblleft"), (0xD3, "quotedblright"), (0xD4, "quoteleft"),
    (0xD5, "quoteright"), (0xD6, "divide"), (0xD8, "ydieresis"), (0xD9, "Ydieresis"),
    (0xDA, "fraction"), (0xDB, "currency"), (0xDC, "guilsinglleft"),
    (0xDD, "guilsinglright"), (0xDE, "fi"), (0xDF, "fl"), (0xE0, "daggerdbl"),
    (0xE1, "periodcentered"), (0xE2, "quotesinglbase"), (0xE3, "quotedblbase"),
    (0xE4, "perthousand"), (0xE5, "Acircumflex"), (0xE6, "Ecircumflex"),
    (0xE7, "Aacute"), (0xE8, "Edieresis"), (0xE9, "Egrave"), (0xEA, "Iacute"),
    (0xEB, "Icircumflex"), (0xEC, "Idieresis"), (0xED, "Igrave"), (0xEE, "Oacute"),
    (0xEF, "Ocircumflex"), (0xF1, "Ograve"), (0xF2, "Uacute"), (0xF3, "Ucircumflex"),
    (0xF4, "Ugrave"), (0xF5, "dotlessi"), (0xF6, "circumflex"), (0xF7, "tilde"),
    (0xF8, "macron"), (0xF9, "breve"), (0xFA, "dotaccent"), (0xFB, "ring"),
    (0xFC, "cedilla"), (0xFD, "hungarumlaut"), (0xFE, "ogonek"), (0xFF, "caron"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_range_is_identity_in_all_tables() {
        for base in [BaseEncoding::Standard, BaseEncoding::WinAnsi, BaseEncoding::MacRoman] {
            let enc = SimpleEncoding { base, differences: HashMap::new() };
            assert_eq!(enc.decode_byte(b'A').as_deref(), Some("A"));
            assert_eq!(enc.decode_byte(b'z').as_deref(), Some("z"));
        }
    }

    #[test]
    fn differences_override_base_table() {
        let mut differences = HashMap::new();
        differences.insert(0x41u8, "bullet".to_owned());
        let enc = SimpleEncoding { base: BaseEncoding::WinAnsi, differences };
        assert_eq!(enc.decode_byte(0x41).as_deref(), Some("\u{2022}"));
    }

    #[test]
    fn unixxxx_glyph_name_resolves() {
        assert_eq!(glyph_name_to_unicode("uni0041").as_deref(), Some("A"));
    }

    #[test]
    fn winansi_high_byte_is_latin1_supplement() {
        let enc = SimpleEncoding { base: BaseEncoding::WinAnsi, differences: HashMap::new() };
        assert_eq!(enc.decode_byte(0xE9).as_deref(), Some("\u{00e9}"));
    }
}
