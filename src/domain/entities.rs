//! Schema metadata records mirrored from persistent storage.
//!
//! Rows carrying a `deleted_time` never reach these types; the repositories
//! filter soft-deleted rows out before mapping.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::{FieldType, ViewType};

/// A table owned by a base.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRecord {
    pub id: String,
    pub base_id: String,
    pub name: String,
    pub db_table_name: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order: f64,
    pub created_time: OffsetDateTime,
    pub last_modified_time: Option<OffsetDateTime>,
}

/// A field (column) owned by a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRecord {
    pub id: String,
    pub table_id: String,
    pub name: String,
    pub db_field_name: String,
    pub field_type: FieldType,
    pub options: serde_json::Value,
    pub is_primary: bool,
    pub is_computed: bool,
    pub is_lookup: bool,
    pub order: f64,
    pub created_time: OffsetDateTime,
    pub last_modified_time: Option<OffsetDateTime>,
}

/// A view owned by a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRecord {
    pub id: String,
    pub table_id: String,
    pub name: String,
    pub view_type: ViewType,
    pub options: serde_json::Value,
    pub order: f64,
    pub created_time: OffsetDateTime,
    pub last_modified_time: Option<OffsetDateTime>,
}

impl TableRecord {
    /// A freshly created table with derived physical name and no description.
    pub fn new(
        id: impl Into<String>,
        base_id: impl Into<String>,
        name: impl Into<String>,
        order: f64,
    ) -> Self {
        let id = id.into();
        let base_id = base_id.into();
        Self {
            db_table_name: format!("{base_id}.{id}"),
            id,
            base_id,
            name: name.into(),
            description: None,
            icon: None,
            order,
            created_time: OffsetDateTime::now_utc(),
            last_modified_time: None,
        }
    }
}

impl FieldRecord {
    /// A freshly created, non-computed field whose physical name matches `name`.
    pub fn new(
        id: impl Into<String>,
        table_id: impl Into<String>,
        name: impl Into<String>,
        field_type: FieldType,
        order: f64,
    ) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            table_id: table_id.into(),
            db_field_name: name.clone(),
            name,
            field_type,
            options: serde_json::Value::Null,
            is_primary: false,
            is_computed: false,
            is_lookup: false,
            order,
            created_time: OffsetDateTime::now_utc(),
            last_modified_time: None,
        }
    }
}

impl ViewRecord {
    pub fn new(
        id: impl Into<String>,
        table_id: impl Into<String>,
        name: impl Into<String>,
        view_type: ViewType,
        order: f64,
    ) -> Self {
        Self {
            id: id.into(),
            table_id: table_id.into(),
            name: name.into(),
            view_type,
            options: serde_json::Value::Null,
            order,
            created_time: OffsetDateTime::now_utc(),
            last_modified_time: None,
        }
    }
}
