//! Records: the caller-owned field maps rules are evaluated against

mod value;

pub use value::*;

use ahash::AHashMap;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Default record type
pub type FieldMap = AHashMap<String, Value>;

/// Read-only lookup of field values by name
pub trait Record {
    fn get_value(&self, field: &str) -> Option<&Value>;
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    #[inline]
    fn get_value(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }
}

impl Record for AHashMap<String, Value> {
    #[inline]
    fn get_value(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }
}

impl Record for BTreeMap<String, Value> {
    #[inline]
    fn get_value(&self, field: &str) -> Option<&Value> {
        self.get(field)
    }
}

/// Build a [`FieldMap`] from `(name, value)` pairs
pub fn field_map<K, V, I>(fields: I) -> FieldMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
