//! Stream filter pipeline: each stream's decoded payload is produced by
//! applying the `Filter` array left-to-right, each stage paired with
//! its `DecodeParms` entry, with PNG/TIFF predictors applied as a
//! post-stage rather than a filter of their own.

pub mod ascii;
pub mod ccitt;
pub mod flate;
pub mod lzw;
pub mod predictor;
pub mod runlength;

use crate::error::ParseError;
use crate::object::{Dictionary, Object};
use predictor::PredictorParams;

/// A decoded filter name plus its matched `DecodeParms` dictionary
/// (possibly empty), normalized from the several shapes `Filter`/
/// `DecodeParms` can take: a bare name, an array of names, or (for
/// `DecodeParms`) a parallel array or a single dict shared by every
/// filter.
fn filter_chain(dict: &Dictionary) -> Vec<(String, Dictionary)> {
    let filters: Vec<String> = match dict.get("Filter").or_else(|| dict.get("F")) {
        Some(Object::Name(n)) => vec![n.as_str().to_owned()],
        Some(Object::Array(items)) => items
            .iter()
            .filter_map(|o| o.as_name().map(|n| n.as_str().to_owned()))
            .collect(),
        _ => Vec::new(),
    };
    let parms = dict.get("DecodeParms").or_else(|| dict.get("DP"));
    let parms_list: Vec<Dictionary> = match parms {
        Some(Object::Dictionary(d)) => vec![d.clone(); filters.len().max(1)],
        Some(Object::Array(items)) => items
            .iter()
            .map(|o| o.as_dict().cloned().unwrap_or_default())
            .collect(),
        _ => vec![Dictionary::new(); filters.len()],
    };
    filters
        .into_iter()
        .enumerate()
        .map(|(i, name)| (name, parms_list.get(i).cloned().unwrap_or_default()))
        .collect()
}

fn predictor_params(parms: &Dictionary) -> PredictorParams {
    PredictorParams {
        predictor: parms.get("Predictor").and_then(Object::as_integer).unwrap_or(1),
        columns: parms.get("Columns").and_then(Object::as_integer).unwrap_or(1) as usize,
        colors: parms.get("Colors").and_then(Object::as_integer).unwrap_or(1) as usize,
        bits_per_component: parms
            .get("BitsPerComponent")
            .and_then(Object::as_integer)
            .unwrap_or(8) as usize,
    }
}

/// Decodes one stream's raw payload using its own `dict`. Used directly
/// by xref-stream loading, which runs before the document's cache
/// exists to memoize through.
pub fn decode_stream_raw(raw: &[u8], dict: &Dictionary) -> Result<Vec<u8>, ParseError> {
    let chain = filter_chain(dict);
    let mut data = raw.to_vec();
    for (name, parms) in chain {
        data = apply_one(&name, &data, &parms)?;
    }
    Ok(data)
}

fn apply_one(name: &str, data: &[u8], parms: &Dictionary) -> Result<Vec<u8>, ParseError> {
    match name {
        "ASCIIHexDecode" | "AHx" => ascii::decode_hex(data),
        "ASCII85Decode" | "A85" => ascii::decode_85(data),
        "LZWDecode" | "LZW" => {
            let early_change = parms
                .get("EarlyChange")
                .and_then(Object::as_integer)
                .map(|v| v != 0)
                .unwrap_or(true);
            let decoded = lzw::decode(data, early_change)?;
            predictor::apply(&decoded, &predictor_params(parms))
        }
        "FlateDecode" | "Fl" => {
            let decoded = flate::decode(data)?;
            predictor::apply(&decoded, &predictor_params(parms))
        }
        "RunLengthDecode" | "RL" => runlength::decode(data),
        "CCITTFaxDecode" | "CCF" => {
            let params = ccitt::CcittParams {
                k: parms.get("K").and_then(Object::as_integer).unwrap_or(0),
                columns: parms.get("Columns").and_then(Object::as_integer).unwrap_or(1728) as usize,
                rows: parms.get("Rows").and_then(Object::as_integer).unwrap_or(0) as usize,
                black_is_1: parms.get("BlackIs1").map(is_true).unwrap_or(false),
                encoded_byte_align: parms.get("EncodedByteAlign").map(is_true).unwrap_or(false),
            };
            ccitt::decode(data, &params)
        }
        // DCTDecode (JPEG), JBIG2Decode, and JPXDecode are passed through
        // unchanged: the engine extracts them as opaque image payloads
        // rather than decoding to raw samples.
        "DCTDecode" | "DCT" | "JBIG2Decode" | "JPXDecode" => Ok(data.to_vec()),
        "Crypt" => Ok(data.to_vec()),
        other => Err(ParseError::filter(other.to_owned(), "unsupported filter")),
    }
}

fn is_true(obj: &Object) -> bool {
    matches!(obj, Object::Boolean(true))
}

/// True if the stream's final filter is one of the "opaque image" pass-
/// through filters, in which case callers should not treat the decoded
/// bytes as raw samples.
pub fn is_opaque_image_filter(dict: &Dictionary) -> Option<&'static str> {
    let chain = filter_chain(dict);
    match chain.last().map(|(n, _)| n.as_str()) {
        Some("DCTDecode") | Some("DCT") => Some("DCTDecode"),
        Some("JBIG2Decode") => Some("JBIG2Decode"),
        Some("JPXDecode") => Some("JPXDecode"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Name;

    #[test]
    fn single_name_filter_chain() {
        let mut dict = Dictionary::new();
        dict.insert(Name::from("Filter"), Object::Name(Name::from("FlateDecode")));
        let chain = filter_chain(&dict);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].0, "FlateDecode");
    }

    #[test]
    fn array_filter_chain_with_parallel_parms() {
        let mut dict = Dictionary::new();
        dict.insert(
            Name::from("Filter"),
            Object::Array(vec![
                Object::Name(Name::from("ASCII85Decode")),
                Object::Name(Name::from("FlateDecode")),
            ]),
        );
        let mut parms1 = Dictionary::new();
        parms1.insert(Name::from("Columns"), Object::Integer(4));
        dict.insert(Name::from("DecodeParms"), Object::Array(vec![Object::Null, Object::Dictionary(parms1)]));
        let chain = filter_chain(&dict);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].1.get("Columns").and_then(Object::as_integer), Some(4));
    }

    #[test]
    fn decode_stream_raw_flate_round_trip() {
        let data = b"hello hello hello hello".repeat(2);
        let encoded = flate::encode(&data);
        let mut dict = Dictionary::new();
        dict.insert(Name::from("Filter"), Object::Name(Name::from("FlateDecode")));
        let decoded = decode_stream_raw(&encoded, &dict).unwrap();
        assert_eq!(decoded, data);
    }
}
