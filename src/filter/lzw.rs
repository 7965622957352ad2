//! `LZWDecode`: PDF's variant of the TIFF/GIF LZW algorithm, with a
//! 256-entry clear code, a 257-entry end-of-data code, and an
//! `EarlyChange` parameter controlling whether the code width grows one
//! code early (the PDF default, `EarlyChange = 1`).

use crate::error::ParseError;

const CLEAR_CODE: u16 = 256;
const EOD_CODE: u16 = 257;
const FIRST_CODE: u16 = 258;

struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, bit_pos: 0 }
    }

    fn read(&mut self, width: u32) -> Option<u16> {
        let mut value: u32 = 0;
        for _ in 0..width {
            let byte_idx = self.bit_pos / 8;
            let bit_idx = 7 - (self.bit_pos % 8);
            let byte = *self.data.get(byte_idx)?;
            let bit = (byte >> bit_idx) & 1;
            value = (value << 1) | bit as u32;
            self.bit_pos += 1;
        }
        Some(value as u16)
    }
}

pub fn decode(input: &[u8], early_change: bool) -> Result<Vec<u8>, ParseError> {
    let early: u16 = if early_change { 1 } else { 0 };
    let mut reader = BitReader::new(input);
    let mut table: Vec<Vec<u8>> = (0..256u16).map(|i| vec![i as u8]).collect();
    let mut next_code: u16 = FIRST_CODE;
    let mut code_width: u32 = 9;
    let mut out = Vec::new();
    let mut prev: Option<Vec<u8>> = None;

    loop {
        let Some(code) = reader.read(code_width) else {
            break;
        };
        if code == CLEAR_CODE {
            table.truncate(256);
            next_code = FIRST_CODE;
            code_width = 9;
            prev = None;
            continue;
        }
        if code == EOD_CODE {
            break;
        }

        let entry: Vec<u8> = if (code as usize) < table.len() {
            table[code as usize].clone()
        } else if code == next_code {
            match &prev {
                Some(p) => {
                    let mut e = p.clone();
                    e.push(p[0]);
                    e
                }
                None => return Err(ParseError::filter("LZWDecode", "invalid code sequence at start")),
            }
        } else {
            return Err(ParseError::filter("LZWDecode", format!("invalid code {code}")));
        };

        out.extend_from_slice(&entry);

        if let Some(p) = &prev {
            let mut new_entry = p.clone();
            new_entry.push(entry[0]);
            table.push(new_entry);
            next_code += 1;
        }
        prev = Some(entry);

        if next_code + early == 512 {
            code_width = 10;
        } else if next_code + early == 1024 {
            code_width = 11;
        } else if next_code + early == 2048 {
            code_width = 12;
        }
    }

    Ok(out)
}

pub fn encode(input: &[u8]) -> Vec<u8> {
    encode_with_early_change(input, true)
}

fn encode_with_early_change(input: &[u8], early_change: bool) -> Vec<u8> {
    use std::collections::HashMap;

    struct BitWriter {
        bytes: Vec<u8>,
        cur: u32,
        nbits: u32,
    }
    impl BitWriter {
        fn push(&mut self, value: u16, width: u32) {
            self.cur = (self.cur << width) | value as u32;
            self.nbits += width;
            while self.nbits >= 8 {
                let shift = self.nbits - 8;
                self.bytes.push(((self.cur >> shift) & 0xff) as u8);
                self.nbits -= 8;
            }
        }
        fn finish(mut self) -> Vec<u8> {
            if self.nbits > 0 {
                let shift = 8 - self.nbits;
                self.bytes.push(((self.cur << shift) & 0xff) as u8);
            }
            self.bytes
        }
    }

    let early: u16 = if early_change { 1 } else { 0 };
    let mut writer = BitWriter { bytes: Vec::new(), cur: 0, nbits: 0 };
    let mut table: HashMap<Vec<u8>, u16> = (0..256u16).map(|i| (vec![i as u8], i)).collect();
    let mut next_code: u16 = FIRST_CODE;
    let mut code_width: u32 = 9;

    writer.push(CLEAR_CODE, code_width);

    let mut current: Vec<u8> = Vec::new();
    for &byte in input {
        let mut candidate = current.clone();
        candidate.push(byte);
        if table.contains_key(&candidate) {
            current = candidate;
            continue;
        }
        writer.push(*table.get(&current).unwrap(), code_width);
        table.insert(candidate, next_code);
        next_code += 1;
        if next_code + early == 512 {
            code_width = 10;
        } else if next_code + early == 1024 {
            code_width = 11;
        } else if next_code + early == 2048 {
            code_width = 12;
        } else if next_code == 4094 {
            writer.push(CLEAR_CODE, code_width);
            table = (0..256u16).map(|i| (vec![i as u8], i)).collect();
            next_code = FIRST_CODE;
            code_width = 9;
        }
        current = vec![byte];
    }
    if !current.is_empty() {
        writer.push(*table.get(&current).unwrap(), code_width);
    }
    writer.push(EOD_CODE, code_width);
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"TOBEORNOTTOBEORTOBEORNOT".to_vec();
        let encoded = encode(&data);
        let decoded = decode(&encoded, true).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn round_trip_repetitive() {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbbbbbbbbbbb".to_vec();
        let encoded = encode(&data);
        let decoded = decode(&encoded, true).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn round_trip_binary() {
        let data: Vec<u8> = (0..=255u8).cycle().take(2000).collect();
        let encoded = encode(&data);
        let decoded = decode(&encoded, true).unwrap();
        assert_eq!(decoded, data);
    }
}
