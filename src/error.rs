//! Error taxonomy for the engine.
//!
//! Leaf parsing functions return `Result<T, ParseError>` so callers can
//! match on the kind; most of the crate threads `PdfResult<T> =
//! anyhow::Result<T>` so `?` composes across module boundaries the way
//! `anyhow::bail!` is used throughout.

use crate::object::{Object, ObjectType};

pub type PdfResult<T> = anyhow::Result<T>;

/// A PDF object's unique address, used to identify the object a
/// [`ParseError`] variant is complaining about.
pub type ObjRef = (u32, u16);

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed bytes at offset {offset}: {what}")]
    Lexical { offset: u64, what: String },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("mismatched object type: expected {expected:?}, found {found:?}")]
    MismatchedObjectType {
        expected: ObjectType,
        found: ObjectType,
    },

    #[error("missing required dictionary key {key:?}")]
    MissingRequiredKey { key: &'static str },

    #[error("array had {} elements, expected {expected}", found.len())]
    ArrayOfInvalidLength { expected: usize, found: Vec<Object> },

    #[error("unrecognized variant {found:?} for {ty}")]
    UnrecognizedVariant { found: String, ty: &'static str },

    #[error("xref table not found")]
    XrefNotFound,

    #[error("malformed cross-reference table: {reason}")]
    MalformedXref { reason: String },

    #[error("object {0:?} is not present in the cross-reference table")]
    MissingObject(ObjRef),

    #[error("filter {filter} failed to decode: {reason}")]
    Filter { filter: String, reason: String },

    #[error("CMap error: {0}")]
    CMap(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("interpreter error in operator {op:?}: {reason}")]
    Interpreter { op: String, reason: String },

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("unsupported feature: {0}")]
    UnsupportedFeature(String),
}

impl ParseError {
    pub fn lexical(offset: u64, what: impl Into<String>) -> Self {
        ParseError::Lexical {
            offset,
            what: what.into(),
        }
    }

    pub fn filter(filter: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::Filter {
            filter: filter.into(),
            reason: reason.into(),
        }
    }
}

/// A non-fatal diagnostic accumulated on the [`crate::document::Document`]
/// for post-hoc inspection. Each warning is also emitted as a
/// `tracing::warn!` event at the point it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    DuplicateKey { key: String },
    TrustedEndstreamScan { declared_length: i64 },
    UnmappedCode { code: u32 },
    UnknownOperator { op: String },
    UnbalancedGraphicsState,
    Recovered { reason: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DuplicateKey { key } => write!(f, "duplicate dictionary key {key:?}, last wins"),
            Warning::TrustedEndstreamScan { declared_length } => write!(
                f,
                "stream Length {declared_length} disagreed with scanned endstream offset, trusting the scan"
            ),
            Warning::UnmappedCode { code } => write!(f, "unmapped character code {code:#x}, using U+FFFD"),
            Warning::UnknownOperator { op } => write!(f, "unknown content-stream operator {op:?}"),
            Warning::UnbalancedGraphicsState => write!(f, "unbalanced q/Q in content stream"),
            Warning::Recovered { reason } => write!(f, "recovered from structural error: {reason}"),
        }
    }
}
