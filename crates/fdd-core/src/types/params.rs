//! Business parameter sets.
//!
//! A [`BusinessParams`] holds the endpoint-specific fields of one call. Values
//! are scalars (text or integer) except for two file-backed kinds:
//!
//! - [`ParamValue::Image`]: a local image that is base64-encoded into the
//!   field *before* signing, so its encoding takes part in the digest.
//! - [`ParamValue::File`]: a local file sent as a multipart part; it never
//!   takes part in a canonical string.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Names of the common parameters attached to every request.
pub const COMMON_FIELDS: [&str; 4] = ["app_id", "timestamp", "v", "msg_digest"];

/// `true` if `name` is one of [`COMMON_FIELDS`].
pub fn is_common_field(name: &str) -> bool {
    COMMON_FIELDS.contains(&name)
}

/// A single business parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    /// Path of a local image, sent as its base64 encoding.
    Image(PathBuf),
    /// Path of a local file, sent as a binary multipart part.
    File(PathBuf),
}

impl ParamValue {
    /// Scalar rendering used for canonical strings and form fields.
    ///
    /// Returns `None` for file-backed values, which have no scalar form until
    /// the assembler resolves them.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(s) => Some(Cow::Borrowed(s)),
            Self::Int(n) => Some(Cow::Owned(n.to_string())),
            Self::Image(_) | Self::File(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

/// Endpoint-specific fields of a single call, keyed by wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessParams(BTreeMap<String, ParamValue>);

impl BusinessParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Option<ParamValue> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ParamValue> {
        self.0.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in byte order of their names.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for BusinessParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for BusinessParams {
    type Item = (String, ParamValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
