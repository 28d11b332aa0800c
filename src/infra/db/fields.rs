use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::application::filter::{FieldKey, KeyFilter};
use crate::application::repos::{FieldsRepo, RepoError};
use crate::domain::entities::FieldRecord;
use crate::domain::error::DomainError;

use super::PostgresRepositories;
use super::filter::push_key_filter;
use super::util::map_sqlx_error;

const FIELD_COLUMNS: &str = "id, table_id, name, db_field_name, type, options, is_primary, \
     is_computed, is_lookup, \"order\", created_time, last_modified_time";

#[derive(sqlx::FromRow)]
struct FieldRow {
    id: String,
    table_id: String,
    name: String,
    db_field_name: String,
    #[sqlx(rename = "type")]
    field_type: String,
    options: serde_json::Value,
    is_primary: bool,
    is_computed: bool,
    is_lookup: bool,
    order: f64,
    created_time: OffsetDateTime,
    last_modified_time: Option<OffsetDateTime>,
}

impl TryFrom<FieldRow> for FieldRecord {
    type Error = DomainError;

    fn try_from(row: FieldRow) -> Result<Self, Self::Error> {
        Ok(Self {
            field_type: row.field_type.parse()?,
            id: row.id,
            table_id: row.table_id,
            name: row.name,
            db_field_name: row.db_field_name,
            options: row.options,
            is_primary: row.is_primary,
            is_computed: row.is_computed,
            is_lookup: row.is_lookup,
            order: row.order,
            created_time: row.created_time,
            last_modified_time: row.last_modified_time,
        })
    }
}

fn field_column(key: FieldKey) -> &'static str {
    match key {
        FieldKey::Id => "id",
        FieldKey::Name => "name",
        FieldKey::DbFieldName => "db_field_name",
        FieldKey::Type => "type",
        FieldKey::IsPrimary => "is_primary",
        FieldKey::IsComputed => "is_computed",
        FieldKey::IsLookup => "is_lookup",
    }
}

fn into_records(rows: Vec<FieldRow>) -> Result<Vec<FieldRecord>, RepoError> {
    rows.into_iter()
        .map(FieldRecord::try_from)
        .collect::<Result<_, _>>()
        .map_err(RepoError::from)
}

#[async_trait]
impl FieldsRepo for PostgresRepositories {
    async fn find_fields_by_table_id(
        &self,
        table_id: &str,
        filter: Option<&KeyFilter<FieldKey>>,
    ) -> Result<Vec<FieldRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {FIELD_COLUMNS} FROM field WHERE deleted_time IS NULL AND table_id = "
        ));
        qb.push_bind(table_id.to_string());
        push_key_filter(&mut qb, filter, field_column);
        qb.push(" ORDER BY \"order\" ASC");

        let rows = qb
            .build_query_as::<FieldRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }

    async fn find_fields_by_ids(&self, ids: &[String]) -> Result<Vec<FieldRecord>, RepoError> {
        let sql =
            format!("SELECT {FIELD_COLUMNS} FROM field WHERE deleted_time IS NULL AND id = ANY($1)");
        let rows = sqlx::query_as::<_, FieldRow>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        into_records(rows)
    }
}
