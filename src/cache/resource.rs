//! Binding between the schema records and the generic loader.

use crate::application::filter::{FieldKey, FilterKey, FilterValue, TableKey, ViewKey};
use crate::domain::entities::{FieldRecord, TableRecord, ViewRecord};

/// An item the loader can cache: identified by id, owned by one parent, ordered for display.
pub trait CachedResource: Clone + Send + Sync + 'static {
    type Key: FilterKey;

    fn id(&self) -> &str;

    fn parent_id(&self) -> &str;

    fn order(&self) -> f64;

    /// Value of one filterable attribute.
    fn key_value(&self, key: Self::Key) -> FilterValue;
}

impl CachedResource for TableRecord {
    type Key = TableKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.base_id
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn key_value(&self, key: TableKey) -> FilterValue {
        match key {
            TableKey::Id => self.id.as_str().into(),
            TableKey::Name => self.name.as_str().into(),
            TableKey::DbTableName => self.db_table_name.as_str().into(),
        }
    }
}

impl CachedResource for FieldRecord {
    type Key = FieldKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.table_id
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn key_value(&self, key: FieldKey) -> FilterValue {
        match key {
            FieldKey::Id => self.id.as_str().into(),
            FieldKey::Name => self.name.as_str().into(),
            FieldKey::DbFieldName => self.db_field_name.as_str().into(),
            FieldKey::Type => self.field_type.into(),
            FieldKey::IsPrimary => self.is_primary.into(),
            FieldKey::IsComputed => self.is_computed.into(),
            FieldKey::IsLookup => self.is_lookup.into(),
        }
    }
}

impl CachedResource for ViewRecord {
    type Key = ViewKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn parent_id(&self) -> &str {
        &self.table_id
    }

    fn order(&self) -> f64 {
        self.order
    }

    fn key_value(&self, key: ViewKey) -> FilterValue {
        match key {
            ViewKey::Id => self.id.as_str().into(),
            ViewKey::Name => self.name.as_str().into(),
            ViewKey::Type => self.view_type.into(),
        }
    }
}
