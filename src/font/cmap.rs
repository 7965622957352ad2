//! CMap parsing: a tiny dedicated parser over the PostScript-like subset
//! CMap files actually use, rather than a general PostScript engine. It
//! reuses the file-level [`crate::lexer::Lexer`] token set since CMap
//! syntax is a subset of PDF's own object syntax (hex strings, names,
//! integers, bare keywords for the `begin*`/`end*` operators).

use crate::error::ParseError;
use crate::lexer::{Lexer, Token};

/// One `bfrange`/`cidrange` destination: either a single starting value
/// that increments per code, or an explicit per-code array of Unicode
/// sequences.
#[derive(Debug, Clone)]
enum RangeDst {
    Scalar(Vec<u32>),
    PerCode(Vec<Vec<u32>>),
}

#[derive(Debug, Clone, Default)]
pub struct CMap {
    /// `(low, high)` byte sequences of equal length; code ranges must
    /// not overlap.
    codespace_ranges: Vec<(Vec<u8>, Vec<u8>)>,
    bf_char: Vec<(usize, u32, Vec<u32>)>,
    bf_range: Vec<(usize, u32, u32, RangeDst)>,
    cid_char: Vec<(usize, u32, u32)>,
    cid_range: Vec<(usize, u32, u32, u32)>,
    pub wmode: i32,
}

fn bytes_to_code(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

fn in_range(candidate: &[u8], lo: &[u8], hi: &[u8]) -> bool {
    candidate.len() == lo.len() && candidate >= lo && candidate <= hi
}

fn utf16be_to_scalars(bytes: &[u8]) -> Vec<u32> {
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER) as u32)
        .collect()
}

impl CMap {
    /// The built-in `Identity-H`/`Identity-V` predefined CMaps: a 2-byte
    /// codespace mapping every code directly to the same CID, used by
    /// composite fonts that name a predefined CMap instead of embedding
    /// a stream.
    pub fn identity(wmode: i32) -> Self {
        CMap {
            codespace_ranges: vec![(vec![0x00, 0x00], vec![0xFF, 0xFF])],
            bf_char: Vec::new(),
            bf_range: Vec::new(),
            cid_char: Vec::new(),
            cid_range: vec![(2, 0x0000, 0xFFFF, 0)],
            wmode,
        }
    }

    pub fn by_predefined_name(name: &str) -> Option<Self> {
        match name {
            "Identity-H" => Some(Self::identity(0)),
            "Identity-V" => Some(Self::identity(1)),
            _ => None,
        }
    }

    /// Parses a CMap program. Rejects overlapping codespace ranges at
    /// parse time.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let tokens = tokenize(data)?;
        let mut cmap = CMap::default();
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i] {
                Token::Keyword(k) if k == "begincodespacerange" => {
                    i += 1;
                    while !is_end(&tokens, i, "endcodespacerange") {
                        let lo = expect_string(&tokens, &mut i)?;
                        let hi = expect_string(&tokens, &mut i)?;
                        cmap.codespace_ranges.push((lo, hi));
                    }
                    i += 1;
                }
                Token::Keyword(k) if k == "beginbfchar" => {
                    i += 1;
                    while !is_end(&tokens, i, "endbfchar") {
                        let src = expect_string(&tokens, &mut i)?;
                        let dst = expect_string(&tokens, &mut i)?;
                        cmap.bf_char.push((src.len(), bytes_to_code(&src), utf16be_to_scalars(&dst)));
                    }
                    i += 1;
                }
                Token::Keyword(k) if k == "beginbfrange" => {
                    i += 1;
                    while !is_end(&tokens, i, "endbfrange") {
                        let lo = expect_string(&tokens, &mut i)?;
                        let hi = expect_string(&tokens, &mut i)?;
                        let dst = match tokens.get(i) {
                            Some(Token::String(s)) => {
                                i += 1;
                                RangeDst::Scalar(utf16be_to_scalars(s))
                            }
                            Some(Token::ArrayStart) => {
                                i += 1;
                                let mut entries = Vec::new();
                                while !matches!(tokens.get(i), Some(Token::ArrayEnd) | None) {
                                    let s = expect_string(&tokens, &mut i)?;
                                    entries.push(utf16be_to_scalars(&s));
                                }
                                i += 1;
                                RangeDst::PerCode(entries)
                            }
                            _ => return Err(ParseError::CMap("malformed bfrange destination".into())),
                        };
                        cmap.bf_range.push((lo.len(), bytes_to_code(&lo), bytes_to_code(&hi), dst));
                    }
                    i += 1;
                }
                Token::Keyword(k) if k == "begincidchar" => {
                    i += 1;
                    while !is_end(&tokens, i, "endcidchar") {
                        let src = expect_string(&tokens, &mut i)?;
                        let cid = expect_integer(&tokens, &mut i)?;
                        cmap.cid_char.push((src.len(), bytes_to_code(&src), cid as u32));
                    }
                    i += 1;
                }
                Token::Keyword(k) if k == "begincidrange" => {
                    i += 1;
                    while !is_end(&tokens, i, "endcidrange") {
                        let lo = expect_string(&tokens, &mut i)?;
                        let hi = expect_string(&tokens, &mut i)?;
                        let cid = expect_integer(&tokens, &mut i)?;
                        cmap.cid_range.push((lo.len(), bytes_to_code(&lo), bytes_to_code(&hi), cid as u32));
                    }
                    i += 1;
                }
                Token::Name(n) if n == "WMode" => {
                    if let Some(Token::Integer(v)) = tokens.get(i + 1) {
                        cmap.wmode = *v as i32;
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }
        cmap.reject_overlaps()?;
        Ok(cmap)
    }

    fn reject_overlaps(&self) -> Result<(), ParseError> {
        for i in 0..self.codespace_ranges.len() {
            for j in (i + 1)..self.codespace_ranges.len() {
                let (lo_a, hi_a) = &self.codespace_ranges[i];
                let (lo_b, hi_b) = &self.codespace_ranges[j];
                if lo_a.len() != lo_b.len() {
                    continue;
                }
                if lo_a <= hi_b && lo_b <= hi_a {
                    return Err(ParseError::CMap(format!(
                        "overlapping codespace ranges at index {i} and {j}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Greedy-longest-match of the next code at the start of `bytes`
    /// against the declared codespace ranges. Falls back to a single
    /// byte if nothing declared matches, so decoding always makes
    /// forward progress.
    pub fn next_code(&self, bytes: &[u8]) -> (u32, usize) {
        let mut lengths: Vec<usize> = self.codespace_ranges.iter().map(|(lo, _)| lo.len()).collect();
        lengths.sort_unstable_by(|a, b| b.cmp(a));
        lengths.dedup();
        for len in &lengths {
            if bytes.len() < *len {
                continue;
            }
            let candidate = &bytes[..*len];
            if self
                .codespace_ranges
                .iter()
                .any(|(lo, hi)| in_range(candidate, lo, hi))
            {
                return (bytes_to_code(candidate), *len);
            }
        }
        let len = 1.min(bytes.len()).max(1);
        (bytes_to_code(&bytes[..len.min(bytes.len())]), len)
    }

    /// Translates one code (of known byte length) to Unicode scalars via
    /// `bfchar`/`bfrange` — the `ToUnicode` path.
    pub fn lookup_unicode(&self, len: usize, code: u32) -> Option<Vec<u32>> {
        if let Some((_, _, dst)) = self.bf_char.iter().find(|(l, c, _)| *l == len && *c == code) {
            return Some(dst.clone());
        }
        for (l, lo, hi, dst) in &self.bf_range {
            if *l == len && code >= *lo && code <= *hi {
                return Some(match dst {
                    RangeDst::Scalar(start) => {
                        let offset = code - lo;
                        // A multi-scalar start (e.g. a ligature) only
                        // advances its final scalar across the range.
                        let mut out = start.clone();
                        if let Some(last) = out.last_mut() {
                            *last += offset;
                        }
                        out
                    }
                    RangeDst::PerCode(entries) => entries
                        .get((code - lo) as usize)
                        .cloned()
                        .unwrap_or_default(),
                });
            }
        }
        None
    }

    /// Translates one code to a CID via `cidchar`/`cidrange`, used for
    /// composite fonts before falling back to `ToUnicode`.
    pub fn lookup_cid(&self, len: usize, code: u32) -> Option<u32> {
        if let Some((_, _, cid)) = self.cid_char.iter().find(|(l, c, _)| *l == len && *c == code) {
            return Some(*cid);
        }
        for (l, lo, hi, base) in &self.cid_range {
            if *l == len && code >= *lo && code <= *hi {
                return Some(base + (code - lo));
            }
        }
        None
    }
}

fn tokenize(data: &[u8]) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer::new(data, 0);
    let mut out = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(Token::Eof) => break,
            Ok(tok) => out.push(tok),
            // CMap programs can carry PostScript procedure bodies (`{`/`}`)
            // and other constructs our object-syntax lexer does not
            // tokenize; skip the offending byte and resynchronize rather
            // than failing the whole CMap.
            Err(_) => lexer.pos += 1,
        }
    }
    Ok(out)
}

fn is_end(tokens: &[Token], i: usize, kw: &str) -> bool {
    match tokens.get(i) {
        Some(Token::Keyword(k)) if k == kw => true,
        None => true,
        _ => false,
    }
}

fn expect_string(tokens: &[Token], i: &mut usize) -> Result<Vec<u8>, ParseError> {
    match tokens.get(*i) {
        Some(Token::String(s)) => {
            *i += 1;
            Ok(s.clone())
        }
        other => Err(ParseError::CMap(format!("expected hex string, found {other:?}"))),
    }
}

fn expect_integer(tokens: &[Token], i: &mut usize) -> Result<i64, ParseError> {
    match tokens.get(*i) {
        Some(Token::Integer(n)) => {
            *i += 1;
            Ok(*n)
        }
        other => Err(ParseError::CMap(format!("expected integer, found {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"\
/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0041> <0041>
<0042> <0042>
endbfchar
1 beginbfrange
<0043> <0045> <0043>
endbfrange
endcmap
end
end
";

    #[test]
    fn parses_codespace_bfchar_bfrange() {
        let cmap = CMap::parse(SAMPLE).unwrap();
        let (code, len) = cmap.next_code(&[0x00, 0x41]);
        assert_eq!((code, len), (0x41, 2));
        assert_eq!(cmap.lookup_unicode(2, 0x41), Some(vec![0x41]));
        assert_eq!(cmap.lookup_unicode(2, 0x44), Some(vec![0x44]));
    }

    #[test]
    fn overlapping_codespace_ranges_rejected() {
        let data = b"1 begincodespacerange\n<00> <7F>\nendcodespacerange\n1 begincodespacerange\n<40> <FF>\nendcodespacerange\n";
        assert!(CMap::parse(data).is_err());
    }

    #[test]
    fn identity_h_maps_code_to_same_cid() {
        let cmap = CMap::identity(0);
        let (code, len) = cmap.next_code(&[0x12, 0x34]);
        assert_eq!(len, 2);
        assert_eq!(cmap.lookup_cid(2, code), Some(code));
    }
}
