//! Typed key filters over the filterable attributes of each resource kind.
//!
//! A [`KeyFilter`] is a conjunction of per-key constraints:
//!
//! - `None` leaves the key unconstrained;
//! - `Some([])` matches nothing;
//! - `Some(values)` matches when the item's value is one of `values`.

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

/// A value an item attribute can be compared against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
}

impl FilterValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Text(_) => ValueKind::Text,
            Self::Bool(_) => ValueKind::Bool,
        }
    }

    /// Convert to `kind`; `None` when the value has no representation there.
    ///
    /// Text converts to a boolean only when it reads `true` or `false`.
    pub fn coerce(self, kind: ValueKind) -> Option<Self> {
        match (self, kind) {
            (value @ Self::Text(_), ValueKind::Text) | (value @ Self::Bool(_), ValueKind::Bool) => {
                Some(value)
            }
            (Self::Bool(value), ValueKind::Text) => Some(Self::Text(value.to_string())),
            (Self::Text(text), ValueKind::Bool) => text.trim().parse().ok().map(Self::Bool),
        }
    }
}

/// The value type stored under a filter key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bool,
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<crate::domain::types::FieldType> for FilterValue {
    fn from(value: crate::domain::types::FieldType) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

impl From<crate::domain::types::ViewType> for FilterValue {
    fn from(value: crate::domain::types::ViewType) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

/// Closed set of attribute names a resource kind may be filtered on.
pub trait FilterKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    fn as_str(self) -> &'static str;

    fn value_kind(self) -> ValueKind {
        ValueKind::Text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKey {
    Id,
    Name,
    DbTableName,
}

impl FilterKey for TableKey {
    fn as_str(self) -> &'static str {
        match self {
            TableKey::Id => "id",
            TableKey::Name => "name",
            TableKey::DbTableName => "dbTableName",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Id,
    Name,
    DbFieldName,
    Type,
    IsPrimary,
    IsComputed,
    IsLookup,
}

impl FilterKey for FieldKey {
    fn as_str(self) -> &'static str {
        match self {
            FieldKey::Id => "id",
            FieldKey::Name => "name",
            FieldKey::DbFieldName => "dbFieldName",
            FieldKey::Type => "type",
            FieldKey::IsPrimary => "isPrimary",
            FieldKey::IsComputed => "isComputed",
            FieldKey::IsLookup => "isLookup",
        }
    }

    fn value_kind(self) -> ValueKind {
        match self {
            FieldKey::IsPrimary | FieldKey::IsComputed | FieldKey::IsLookup => ValueKind::Bool,
            _ => ValueKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Id,
    Name,
    Type,
}

impl FilterKey for ViewKey {
    fn as_str(self) -> &'static str {
        match self {
            ViewKey::Id => "id",
            ViewKey::Name => "name",
            ViewKey::Type => "type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFilter<K: FilterKey> {
    constraints: Vec<(K, Option<Vec<FilterValue>>)>,
}

impl<K: FilterKey> Default for KeyFilter<K> {
    fn default() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }
}

impl<K: FilterKey> KeyFilter<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `key` to the given values. An empty iterator excludes every item.
    ///
    /// Values are converted to the key's [`ValueKind`]; values with no such
    /// representation can never match and are dropped.
    pub fn allow<I, V>(mut self, key: K, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        let kind = key.value_kind();
        let values = values
            .into_iter()
            .filter_map(|value| value.into().coerce(kind))
            .collect();
        self.set(key, Some(values));
        self
    }

    /// Mention `key` without constraining it.
    pub fn unconstrained(mut self, key: K) -> Self {
        self.set(key, None);
        self
    }

    fn set(&mut self, key: K, values: Option<Vec<FilterValue>>) {
        match self.constraints.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = values,
            None => self.constraints.push((key, values)),
        }
    }

    pub fn constraints(&self) -> impl Iterator<Item = (K, Option<&[FilterValue]>)> + '_ {
        self.constraints
            .iter()
            .map(|(key, values)| (*key, values.as_deref()))
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Evaluate the filter against one item, given a lookup of its attribute values.
    pub fn matches<F>(&self, value_of: F) -> bool
    where
        F: Fn(K) -> FilterValue,
    {
        self.constraints.iter().all(|(key, allowed)| match allowed {
            None => true,
            Some(allowed) if allowed.is_empty() => false,
            Some(allowed) => allowed.contains(&value_of(*key)),
        })
    }
}
