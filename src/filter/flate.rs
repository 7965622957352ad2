//! `FlateDecode`, using `flate2`'s zlib implementation.

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::error::ParseError;

pub fn decode(input: &[u8]) -> Result<Vec<u8>, ParseError> {
    let mut decoder = ZlibDecoder::new(input);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| ParseError::filter("FlateDecode", e.to_string()))?;
    Ok(out)
}

pub fn encode(input: &[u8]) -> Vec<u8> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(input).expect("in-memory write cannot fail");
    encoder.finish().expect("in-memory write cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(4);
        let encoded = encode(&data);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }
}
