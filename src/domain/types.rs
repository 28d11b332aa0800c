//! Closed enumerations persisted as text columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// The three resource kinds the loader cache understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Table,
    Field,
    View,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Table, ResourceKind::Field, ResourceKind::View];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Table => "table",
            ResourceKind::Field => "field",
            ResourceKind::View => "view",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "table" | "tables" => Ok(ResourceKind::Table),
            "field" | "fields" => Ok(ResourceKind::Field),
            "view" | "views" => Ok(ResourceKind::View),
            other => Err(DomainError::unknown_variant("resource_kind", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    SingleLineText,
    LongText,
    Number,
    Checkbox,
    SingleSelect,
    MultipleSelect,
    Date,
    Attachment,
    User,
    Rating,
    Duration,
    Link,
    Formula,
    Rollup,
    Count,
    AutoNumber,
    CreatedTime,
    LastModifiedTime,
    CreatedBy,
    LastModifiedBy,
    Button,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::SingleLineText => "singleLineText",
            FieldType::LongText => "longText",
            FieldType::Number => "number",
            FieldType::Checkbox => "checkbox",
            FieldType::SingleSelect => "singleSelect",
            FieldType::MultipleSelect => "multipleSelect",
            FieldType::Date => "date",
            FieldType::Attachment => "attachment",
            FieldType::User => "user",
            FieldType::Rating => "rating",
            FieldType::Duration => "duration",
            FieldType::Link => "link",
            FieldType::Formula => "formula",
            FieldType::Rollup => "rollup",
            FieldType::Count => "count",
            FieldType::AutoNumber => "autoNumber",
            FieldType::CreatedTime => "createdTime",
            FieldType::LastModifiedTime => "lastModifiedTime",
            FieldType::CreatedBy => "createdBy",
            FieldType::LastModifiedBy => "lastModifiedBy",
            FieldType::Button => "button",
        }
    }

    const VARIANTS: [FieldType; 21] = [
        FieldType::SingleLineText,
        FieldType::LongText,
        FieldType::Number,
        FieldType::Checkbox,
        FieldType::SingleSelect,
        FieldType::MultipleSelect,
        FieldType::Date,
        FieldType::Attachment,
        FieldType::User,
        FieldType::Rating,
        FieldType::Duration,
        FieldType::Link,
        FieldType::Formula,
        FieldType::Rollup,
        FieldType::Count,
        FieldType::AutoNumber,
        FieldType::CreatedTime,
        FieldType::LastModifiedTime,
        FieldType::CreatedBy,
        FieldType::LastModifiedBy,
        FieldType::Button,
    ];
}

impl FromStr for FieldType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::VARIANTS
            .into_iter()
            .find(|variant| variant.as_str() == value)
            .ok_or_else(|| DomainError::unknown_variant("field_type", value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewType {
    Grid,
    Kanban,
    Gallery,
    Calendar,
    Form,
    Plugin,
}

impl ViewType {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewType::Grid => "grid",
            ViewType::Kanban => "kanban",
            ViewType::Gallery => "gallery",
            ViewType::Calendar => "calendar",
            ViewType::Form => "form",
            ViewType::Plugin => "plugin",
        }
    }
}

impl FromStr for ViewType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "grid" => Ok(ViewType::Grid),
            "kanban" => Ok(ViewType::Kanban),
            "gallery" => Ok(ViewType::Gallery),
            "calendar" => Ok(ViewType::Calendar),
            "form" => Ok(ViewType::Form),
            "plugin" => Ok(ViewType::Plugin),
            other => Err(DomainError::unknown_variant("view_type", other)),
        }
    }
}
