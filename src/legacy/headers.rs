//! Legacy name/value header store.

use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Name-keyed, multi-valued header store of the legacy model.
///
/// Names compare case-insensitively. Implementations use interior
/// mutability so that every holder of the store sees writes immediately.
pub trait HeaderStore: Send + Sync + fmt::Debug {
    /// All values stored under `name`, in insertion order.
    fn values(&self, name: &str) -> Option<Vec<String>>;

    /// Replace the values stored under `name`. An empty list removes the entry.
    fn set_values(&self, name: &str, values: Vec<String>);

    /// Append one value under `name`.
    fn add(&self, name: &str, value: &str);

    /// Returns `true` if an entry was removed.
    fn remove(&self, name: &str) -> bool;

    /// Header names in insertion order, as first written.
    fn names(&self) -> Vec<String>;

    fn clear(&self) {
        for name in self.names() {
            self.remove(&name);
        }
    }
}

/// Insertion-ordered, case-insensitive header collection.
#[derive(Debug, Default)]
pub struct NameValueCollection {
    entries: RwLock<Vec<(String, Vec<String>)>>,
}

impl NameValueCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, String)> for NameValueCollection {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let collection = Self::new();
        for (name, value) in iter {
            collection.add(&name, &value);
        }
        collection
    }
}

impl HeaderStore for NameValueCollection {
    fn values(&self, name: &str) -> Option<Vec<String>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.clone())
    }

    fn set_values(&self, name: &str, values: Vec<String>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let position = entries.iter().position(|(n, _)| n.eq_ignore_ascii_case(name));
        match (position, values.is_empty()) {
            (Some(i), true) => {
                entries.remove(i);
            }
            (Some(i), false) => entries[i].1 = values,
            (None, true) => {}
            (None, false) => entries.push((name.to_string(), values)),
        }
    }

    fn add(&self, name: &str, value: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some((_, values)) => values.push(value.to_string()),
            None => entries.push((name.to_string(), vec![value.to_string()])),
        }
    }

    fn remove(&self, name: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        entries.len() != before
    }

    fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
