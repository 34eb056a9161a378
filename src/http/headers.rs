//! Header view over a legacy header store.
//!
//! # Responsibilities
//! - Present legacy multi-valued headers as `StringValues`
//! - Pass every read and write straight through to the store
//! - Convert to `http::HeaderMap` for code speaking the `http` crate
//!
//! # Design Decisions
//! - The view never copies; two views over one store always agree
//! - Setting an empty value list removes the header
//! - Enumeration takes a snapshot so the store lock is never held by callers

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use http::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};
use serde::Serialize;
use thiserror::Error;

use crate::legacy::HeaderStore;

/// A header could not be represented with `http` crate types.
#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("invalid header name {name:?}")]
    InvalidName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },

    #[error("invalid value for header {name:?}")]
    InvalidValue {
        name: String,
        #[source]
        source: InvalidHeaderValue,
    },
}

/// Zero or more values of one header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StringValues(Vec<String>);

impl StringValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for StringValues {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

/// Values joined with `,`, the way they travel on the wire.
impl fmt::Display for StringValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

impl From<String> for StringValues {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<&str> for StringValues {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<Vec<String>> for StringValues {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for StringValues {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

impl PartialEq<str> for StringValues {
    fn eq(&self, other: &str) -> bool {
        self.0.len() == 1 && self.0[0] == other
    }
}

impl PartialEq<&str> for StringValues {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl IntoIterator for StringValues {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Live view over a legacy header store.
#[derive(Debug, Clone)]
pub struct HeaderView {
    store: Arc<dyn HeaderStore>,
}

impl HeaderView {
    pub fn new(store: Arc<dyn HeaderStore>) -> Self {
        Self { store }
    }

    pub fn get(&self, name: &str) -> Option<StringValues> {
        self.store.values(name).map(StringValues)
    }

    pub fn first(&self, name: &str) -> Option<String> {
        self.store.values(name).and_then(|v| v.into_iter().next())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.store.values(name).is_some()
    }

    /// Replace all values of `name`.
    pub fn set(&self, name: &str, values: impl Into<StringValues>) {
        self.store.set_values(name, values.into().0);
    }

    pub fn append(&self, name: &str, value: impl AsRef<str>) {
        self.store.add(name, value.as_ref());
    }

    pub fn remove(&self, name: &str) -> bool {
        self.store.remove(name)
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn keys(&self) -> Vec<String> {
        self.store.names()
    }

    pub fn len(&self) -> usize {
        self.store.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every header, in store order.
    pub fn iter(&self) -> impl Iterator<Item = (String, StringValues)> {
        let entries: Vec<_> = self
            .store
            .names()
            .into_iter()
            .filter_map(|name| {
                let values = self.store.values(&name)?;
                Some((name, StringValues(values)))
            })
            .collect();
        entries.into_iter()
    }

    /// Copy the current headers into an `http::HeaderMap`.
    pub fn to_header_map(&self) -> Result<HeaderMap, HeaderError> {
        let mut map = HeaderMap::new();
        for (name, values) in self.iter() {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|source| HeaderError::InvalidName {
                    name: name.clone(),
                    source,
                })?;
            for value in values {
                let header_value =
                    HeaderValue::from_str(&value).map_err(|source| HeaderError::InvalidValue {
                        name: name.clone(),
                        source,
                    })?;
                map.append(header_name.clone(), header_value);
            }
        }
        Ok(map)
    }
}
