//! The PDF value model.
//!
//! Every parsed PDF value is an [`Object`]. Dictionaries and arrays hold
//! `Object`s directly rather than borrowing from the source buffer: the
//! lazy parser re-seeks and re-parses on demand (see [`crate::document`]),
//! so there is no long-lived borrow to thread through the type system.

use std::fmt;

use crate::error::{ParseError, PdfResult};

/// A name object's canonical (decoded) form: the bytes after the leading
/// `/`, with `#xx` escapes already resolved.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Name(pub String);

impl Name {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_owned())
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name(s)
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The (object number, generation number) address of an indirect object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    pub num: u32,
    pub gen: u16,
}

impl Reference {
    pub fn new(num: u32, gen: u16) -> Self {
        Reference { num, gen }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.num, self.gen)
    }
}

/// A raw stream: its dictionary plus the still-encoded payload bytes.
///
/// `raw` has exactly `Length` bytes; the filtered payload is computed on
/// demand by [`crate::filter::decode_stream_raw`] and memoized by the
/// owning [`crate::document::Document`], not here.
#[derive(Clone, PartialEq)]
pub struct Stream {
    pub dict: Dictionary,
    pub raw: Vec<u8>,
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("dict", &self.dict)
            .field("raw", &format!("[{} bytes]", self.raw.len()))
            .finish()
    }
}

/// A tagged PDF value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Name(Name),
    /// Both literal `(...)` and hex `<...>` strings decode to a byte
    /// string; the two surface syntaxes carry no further meaning once
    /// parsed.
    String(Vec<u8>),
    Array(Vec<Object>),
    Dictionary(Dictionary),
    Stream(Stream),
    Reference(Reference),
}

/// Discriminant of [`Object`], used in error messages and type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Null,
    Boolean,
    Integer,
    Real,
    Name,
    String,
    Array,
    Dictionary,
    Stream,
    Reference,
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Null => ObjectType::Null,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::Integer(_) => ObjectType::Integer,
            Object::Real(_) => ObjectType::Real,
            Object::Name(_) => ObjectType::Name,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Dictionary(_) => ObjectType::Dictionary,
            Object::Stream(_) => ObjectType::Stream,
            Object::Reference(_) => ObjectType::Reference,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Object::Integer(i) => Some(*i),
            Object::Real(r) => Some(*r as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Object::Integer(i) => Some(*i as f64),
            Object::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&Name> {
        match self {
            Object::Name(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&[u8]> {
        match self {
            Object::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Object]> {
        match self {
            Object::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<Reference> {
        match self {
            Object::Reference(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Object::Null)
    }
}

/// A PDF dictionary. Insertion order is preserved for stable iteration,
/// but carries no semantic meaning. Duplicate keys resolve last-wins;
/// [`Dictionary::insert`] returns `true` when it overwrote an existing
/// key so callers can emit [`crate::error::Warning::DuplicateKey`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(Name, Object)>,
}

impl Dictionary {
    pub fn new() -> Self {
        Dictionary::default()
    }

    /// Inserts a key/value pair. Returns `true` if `key` already existed
    /// (the old value is discarded, last-wins).
    pub fn insert(&mut self, key: Name, value: Object) -> bool {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
            true
        } else {
            self.entries.push((key, value));
            false
        }
    }

    pub fn get(&self, key: &str) -> Option<&Object> {
        self.entries.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        let idx = self.entries.iter().position(|(k, _)| k.as_str() == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Object)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merges `other` on top of `self`: keys in `other` override keys in
    /// `self`. Used for page-resource inheritance, child overriding
    /// parent.
    pub fn merge_override(&self, other: &Dictionary) -> Dictionary {
        let mut merged = self.clone();
        for (k, v) in other.iter() {
            merged.insert(k.clone(), v.clone());
        }
        merged
    }

    pub fn expect_type(&self, ty: &str, resolver: &mut dyn Resolve, optional: bool) -> PdfResult<()> {
        match self.get("Type") {
            Some(obj) => {
                let name = resolver.assert_name(obj.clone())?;
                if name.as_str() != ty {
                    anyhow::bail!(ParseError::UnrecognizedVariant {
                        found: name.0,
                        ty: "Type",
                    });
                }
                Ok(())
            }
            None if optional => Ok(()),
            None => anyhow::bail!(ParseError::MissingRequiredKey { key: "Type" }),
        }
    }

    pub fn expect_name(&self, key: &'static str, resolver: &mut dyn Resolve) -> PdfResult<Name> {
        let obj = self
            .get(key)
            .cloned()
            .ok_or(ParseError::MissingRequiredKey { key })?;
        resolver.assert_name(obj)
    }

    pub fn expect_dict(&self, key: &'static str, resolver: &mut dyn Resolve) -> PdfResult<Dictionary> {
        let obj = self
            .get(key)
            .cloned()
            .ok_or(ParseError::MissingRequiredKey { key })?;
        resolver.assert_dict(obj)
    }

    pub fn expect_array(&self, key: &'static str, resolver: &mut dyn Resolve) -> PdfResult<Vec<Object>> {
        let obj = self
            .get(key)
            .cloned()
            .ok_or(ParseError::MissingRequiredKey { key })?;
        resolver.assert_array(obj)
    }

    pub fn expect_int(&self, key: &'static str, resolver: &mut dyn Resolve) -> PdfResult<i64> {
        let obj = self
            .get(key)
            .cloned()
            .ok_or(ParseError::MissingRequiredKey { key })?;
        let resolved = resolver.resolve(obj)?;
        resolved
            .as_integer()
            .ok_or_else(|| ParseError::MismatchedObjectType {
                expected: ObjectType::Integer,
                found: resolved.object_type(),
            })
            .map_err(Into::into)
    }

    pub fn get_reference(&self, key: &str) -> Option<Reference> {
        self.get(key).and_then(Object::as_reference)
    }
}

/// Resolves indirect references to the values they point at, and
/// provides the `assert_*`/`expect_*` family of typed-extraction helpers
/// used throughout the type layer.
pub trait Resolve {
    /// Returns `obj` unchanged unless it is a [`Object::Reference`], in
    /// which case the referenced object is looked up, parsed if
    /// necessary, cached, and returned. Never recurses through more than
    /// one reference hop per call; callers that expect chains of
    /// references call `resolve` again on the result.
    fn resolve(&mut self, obj: Object) -> PdfResult<Object>;

    fn assert_dict(&mut self, obj: Object) -> PdfResult<Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(d) => Ok(d),
            Object::Stream(s) => Ok(s.dict),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Dictionary,
                found: other.object_type(),
            }),
        }
    }

    fn assert_stream(&mut self, obj: Object) -> PdfResult<Stream> {
        match self.resolve(obj)? {
            Object::Stream(s) => Ok(s),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Stream,
                found: other.object_type(),
            }),
        }
    }

    fn assert_array(&mut self, obj: Object) -> PdfResult<Vec<Object>> {
        match self.resolve(obj)? {
            Object::Array(a) => Ok(a),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Array,
                found: other.object_type(),
            }),
        }
    }

    fn assert_name(&mut self, obj: Object) -> PdfResult<Name> {
        match self.resolve(obj)? {
            Object::Name(n) => Ok(n),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Name,
                found: other.object_type(),
            }),
        }
    }

    fn assert_string(&mut self, obj: Object) -> PdfResult<Vec<u8>> {
        match self.resolve(obj)? {
            Object::String(s) => Ok(s),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::String,
                found: other.object_type(),
            }),
        }
    }

    fn assert_int(&mut self, obj: Object) -> PdfResult<i64> {
        let resolved = self.resolve(obj)?;
        resolved
            .as_integer()
            .ok_or_else(|| ParseError::MismatchedObjectType {
                expected: ObjectType::Integer,
                found: resolved.object_type(),
            })
            .map_err(Into::into)
    }

    fn assert_f64(&mut self, obj: Object) -> PdfResult<f64> {
        let resolved = self.resolve(obj)?;
        resolved
            .as_f64()
            .ok_or_else(|| ParseError::MismatchedObjectType {
                expected: ObjectType::Real,
                found: resolved.object_type(),
            })
            .map_err(Into::into)
    }
}

/// Deserializes a resolved [`Object`] into a typed value: every PDF
/// object kind gets a fixed set of accessors via a manual `FromObj` impl
/// rather than generated runtime attribute lookup.
pub trait FromObj: Sized {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self>;
}

impl FromObj for i64 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_int(obj)
    }
}

impl FromObj for u32 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        Ok(resolver.assert_int(obj)?.max(0) as u32)
    }
}

impl FromObj for f32 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        Ok(resolver.assert_f64(obj)? as f32)
    }
}

impl FromObj for f64 {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_f64(obj)
    }
}

impl FromObj for bool {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        match resolver.resolve(obj)? {
            Object::Boolean(b) => Ok(b),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Boolean,
                found: other.object_type(),
            }),
        }
    }
}

impl FromObj for Name {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_name(obj)
    }
}

impl FromObj for String {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        let bytes = resolver.assert_string(obj)?;
        Ok(crate::font::encoding::pdf_doc_encoded_to_utf8(&bytes))
    }
}

impl FromObj for Reference {
    fn from_obj(obj: Object, _resolver: &mut dyn Resolve) -> PdfResult<Self> {
        match obj {
            Object::Reference(r) => Ok(r),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Reference,
                found: other.object_type(),
            }),
        }
    }
}

impl FromObj for Dictionary {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_dict(obj)
    }
}

impl FromObj for Stream {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        resolver.assert_stream(obj)
    }
}

impl<T: FromObj> FromObj for Option<T> {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        match resolver.resolve(obj)? {
            Object::Null => Ok(None),
            other => Ok(Some(T::from_obj(other, resolver)?)),
        }
    }
}

impl<T: FromObj> FromObj for Vec<T> {
    fn from_obj(obj: Object, resolver: &mut dyn Resolve) -> PdfResult<Self> {
        match resolver.resolve(obj)? {
            Object::Array(items) => items
                .into_iter()
                .map(|item| T::from_obj(item, resolver))
                .collect(),
            // A single value where an array is expected is treated as a
            // one-element array; several PDF producers write e.g. a bare
            // `Contents` stream instead of `[stream]`.
            other => Ok(vec![T::from_obj(other, resolver)?]),
        }
    }
}

/// A [`Reference`] known (by the call site) to point at a `T`, carried
/// alongside the untyped reference so call sites can defer resolution.
/// The object graph never holds owning edges, only `Reference`s resolved
/// back through the document on access.
pub struct TypedReference<T> {
    pub reference: Reference,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> TypedReference<T> {
    pub fn new(reference: Reference) -> Self {
        TypedReference {
            reference,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T> Clone for TypedReference<T> {
    fn clone(&self) -> Self {
        TypedReference::new(self.reference)
    }
}

impl<T> fmt::Debug for TypedReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypedReference({})", self.reference)
    }
}

impl<T> PartialEq for TypedReference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.reference == other.reference
    }
}

impl<T: FromObj> FromObj for TypedReference<T> {
    fn from_obj(obj: Object, _resolver: &mut dyn Resolve) -> PdfResult<Self> {
        match obj {
            Object::Reference(r) => Ok(TypedReference::new(r)),
            other => anyhow::bail!(ParseError::MismatchedObjectType {
                expected: ObjectType::Reference,
                found: other.object_type(),
            }),
        }
    }
}
