//! Cross-reference table loading.

use std::collections::HashMap;

use crate::error::ParseError;
use crate::filter::decode_stream_raw;
use crate::lexer::{Lexer, Token};
use crate::object::{Dictionary, Object};
use crate::parser::ObjectParser;

/// One xref entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefEntry {
    Free { next_free: u32, gen: u16 },
    InUse { offset: u64, gen: u16 },
    Compressed { stream_obj_num: u32, index: u32 },
}

#[derive(Debug, Default)]
pub struct Xref {
    pub entries: HashMap<u32, XrefEntry>,
}

impl Xref {
    pub fn merge_missing(&mut self, older: HashMap<u32, XrefEntry>) {
        for (num, entry) in older {
            self.entries.entry(num).or_insert(entry);
        }
    }
}

/// Finds the last `startxref` in the final window of the file and
/// returns the offset it names.
pub fn find_startxref(buf: &[u8]) -> Result<u64, ParseError> {
    const WINDOW: usize = 1024;
    let window_start = buf.len().saturating_sub(WINDOW);
    let window = &buf[window_start..];
    let marker = b"startxref";
    let found = window
        .windows(marker.len())
        .rposition(|w| w == marker)
        .ok_or(ParseError::XrefNotFound)?;
    let mut lexer = Lexer::new(buf, window_start + found + marker.len());
    match lexer.next_token().map_err(|_| ParseError::XrefNotFound)? {
        Token::Integer(n) if n >= 0 => Ok(n as u64),
        _ => Err(ParseError::XrefNotFound),
    }
}

/// Loads one xref section (classic table or xref stream) and its
/// trailer dictionary, plus the `Prev` offset to chase next, if any.
pub struct XrefSection {
    pub entries: HashMap<u32, XrefEntry>,
    pub trailer: Dictionary,
    pub prev: Option<u64>,
    /// `XRefStm` hybrid-reference offset (PDF 1.5 hybrid files carry both
    /// a classic table and a stream with additional compressed entries).
    pub xref_stm: Option<u64>,
}

pub fn load_section(buf: &[u8], offset: u64) -> Result<XrefSection, ParseError> {
    let mut lexer = Lexer::new(buf, offset as usize);
    let save = lexer.pos;
    match lexer.next_token()? {
        Token::Keyword(k) if k == "xref" => load_classic_table(buf, lexer.pos),
        _ => {
            let mut parser = ObjectParser::new(buf, save);
            let (_reference, obj) = parser.parse_indirect_object()?;
            load_xref_stream(obj)
        }
    }
}

fn load_classic_table(buf: &[u8], mut pos: usize) -> Result<XrefSection, ParseError> {
    let mut entries = HashMap::new();
    loop {
        let mut lexer = Lexer::new(buf, pos);
        let save = lexer.pos;
        match lexer.next_token()? {
            Token::Integer(start) if start >= 0 => {
                let count = match lexer.next_token()? {
                    Token::Integer(c) if c >= 0 => c,
                    other => return Err(ParseError::lexical(lexer.pos as u64, format!("expected subsection count, found {other:?}"))),
                };
                // Skip the single EOL after the subsection header.
                lexer.eat_stream_eol();
                for i in 0..count {
                    // Each entry is nominally a fixed 20-byte record, but
                    // tolerate arbitrary whitespace between fields.
                    let off = match lexer.next_token()? {
                        Token::Integer(n) => n,
                        other => return Err(ParseError::lexical(lexer.pos as u64, format!("bad xref entry offset: {other:?}"))),
                    };
                    let gen = match lexer.next_token()? {
                        Token::Integer(n) => n,
                        other => return Err(ParseError::lexical(lexer.pos as u64, format!("bad xref entry generation: {other:?}"))),
                    };
                    let kind = match lexer.next_token()? {
                        Token::Keyword(k) => k,
                        other => return Err(ParseError::lexical(lexer.pos as u64, format!("bad xref entry kind: {other:?}"))),
                    };
                    let num = start as u32 + i as u32;
                    let entry = match kind.as_str() {
                        "n" => XrefEntry::InUse {
                            offset: off as u64,
                            gen: gen as u16,
                        },
                        "f" => XrefEntry::Free {
                            next_free: off as u32,
                            gen: gen as u16,
                        },
                        other => {
                            return Err(ParseError::lexical(
                                lexer.pos as u64,
                                format!("bad xref entry kind {other:?}"),
                            ))
                        }
                    };
                    entries.entry(num).or_insert(entry);
                }
                pos = lexer.pos;
            }
            Token::Keyword(k) if k == "trailer" => {
                let mut parser = ObjectParser::new(buf, lexer.pos);
                let trailer_obj = parser.parse_object()?;
                let trailer = match trailer_obj {
                    Object::Dictionary(d) => d,
                    other => {
                        return Err(ParseError::MismatchedObjectType {
                            expected: crate::object::ObjectType::Dictionary,
                            found: other.object_type(),
                        })
                    }
                };
                let prev = trailer.get("Prev").and_then(Object::as_integer).map(|n| n as u64);
                let xref_stm = trailer.get("XRefStm").and_then(Object::as_integer).map(|n| n as u64);
                return Ok(XrefSection {
                    entries,
                    trailer,
                    prev,
                    xref_stm,
                });
            }
            other => {
                return Err(ParseError::lexical(
                    save as u64,
                    format!("expected xref subsection or 'trailer', found {other:?}"),
                ))
            }
        }
    }
}

fn load_xref_stream(obj: Object) -> Result<XrefSection, ParseError> {
    let Object::Stream(stream) = obj else {
        return Err(ParseError::MismatchedObjectType {
            expected: crate::object::ObjectType::Stream,
            found: obj.object_type(),
        });
    };
    let dict = &stream.dict;
    let w = dict
        .get("W")
        .and_then(Object::as_array)
        .ok_or(ParseError::MissingRequiredKey { key: "W" })?;
    if w.len() != 3 {
        return Err(ParseError::ArrayOfInvalidLength {
            expected: 3,
            found: w.to_vec(),
        });
    }
    let widths: Vec<usize> = w.iter().map(|o| o.as_integer().unwrap_or(0) as usize).collect();
    let size = dict
        .get("Size")
        .and_then(Object::as_integer)
        .ok_or(ParseError::MissingRequiredKey { key: "Size" })?;
    let index: Vec<i64> = match dict.get("Index").and_then(Object::as_array) {
        Some(arr) => arr.iter().filter_map(Object::as_integer).collect(),
        None => vec![0, size],
    };

    let decoded = decode_stream_raw(&stream.raw, dict)?;
    let row_len = widths.iter().sum::<usize>();
    let mut entries = HashMap::new();
    let mut cursor = 0usize;
    let mut index_pairs = index.chunks(2);
    while let Some([start, count]) = index_pairs.next().map(|c| [c[0], *c.get(1).unwrap_or(&0)]) {
        for i in 0..count {
            if cursor + row_len > decoded.len() {
                break;
            }
            let row = &decoded[cursor..cursor + row_len];
            cursor += row_len;
            let mut fields = [1i64, 0, 0];
            let mut off = 0;
            for (slot, width) in fields.iter_mut().zip(widths.iter()) {
                if *width == 0 {
                    continue;
                }
                let mut val: i64 = 0;
                for b in &row[off..off + width] {
                    val = (val << 8) | *b as i64;
                }
                *slot = val;
                off += width;
            }
            let num = (start + i) as u32;
            let entry = match fields[0] {
                0 => XrefEntry::Free {
                    next_free: fields[1] as u32,
                    gen: fields[2] as u16,
                },
                1 => XrefEntry::InUse {
                    offset: fields[1] as u64,
                    gen: fields[2] as u16,
                },
                2 => XrefEntry::Compressed {
                    stream_obj_num: fields[1] as u32,
                    index: fields[2] as u32,
                },
                _ => continue,
            };
            entries.entry(num).or_insert(entry);
        }
    }

    let prev = dict.get("Prev").and_then(Object::as_integer).map(|n| n as u64);
    Ok(XrefSection {
        entries,
        trailer: dict.clone(),
        prev,
        xref_stm: None,
    })
}

/// Linear-scan recovery for damaged files: scans the whole buffer for
/// `N G obj` headers and synthesizes an xref mapping each object number
/// to its last (highest-offset) occurrence, plus locates a `trailer`
/// dictionary if one is present anywhere.
pub fn recover(buf: &[u8]) -> (HashMap<u32, XrefEntry>, Option<Dictionary>) {
    let mut entries = HashMap::new();
    let mut trailer = None;
    let mut i = 0usize;
    while i < buf.len() {
        if buf[i..].starts_with(b"obj") && (i == 0 || !buf[i - 1].is_ascii_alphanumeric()) {
            // Walk backward over "<gen> <num> " to find the start.
            if let Some((num, gen, start)) = backscan_obj_header(buf, i) {
                entries.insert(num, XrefEntry::InUse { offset: start as u64, gen });
            }
        }
        if buf[i..].starts_with(b"trailer") {
            let mut parser = ObjectParser::new(buf, i + b"trailer".len());
            if let Ok(Object::Dictionary(d)) = parser.parse_object() {
                trailer = Some(d);
            }
        }
        i += 1;
    }
    (entries, trailer)
}

fn backscan_obj_header(buf: &[u8], obj_kw_pos: usize) -> Option<(u32, u16, usize)> {
    let mut p = obj_kw_pos;
    // Skip whitespace before "obj"
    while p > 0 && buf[p - 1].is_ascii_whitespace() {
        p -= 1;
    }
    let gen_end = p;
    while p > 0 && buf[p - 1].is_ascii_digit() {
        p -= 1;
    }
    let gen_start = p;
    if gen_start == gen_end {
        return None;
    }
    while p > 0 && buf[p - 1].is_ascii_whitespace() {
        p -= 1;
    }
    let num_end = p;
    while p > 0 && buf[p - 1].is_ascii_digit() {
        p -= 1;
    }
    let num_start = p;
    if num_start == num_end {
        return None;
    }
    let num: u32 = std::str::from_utf8(&buf[num_start..num_end]).ok()?.parse().ok()?;
    let gen: u16 = std::str::from_utf8(&buf[gen_start..gen_end]).ok()?.parse().ok()?;
    Some((num, gen, num_start))
}
