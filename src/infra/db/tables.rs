use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;

use crate::application::filter::{KeyFilter, TableKey};
use crate::application::repos::{RepoError, TablesRepo, TablesWriteRepo};
use crate::domain::entities::TableRecord;

use super::PostgresRepositories;
use super::filter::push_key_filter;
use super::util::map_sqlx_error;

const TABLE_COLUMNS: &str = "id, base_id, name, db_table_name, description, icon, \"order\", \
     created_time, last_modified_time";

#[derive(sqlx::FromRow)]
struct TableRow {
    id: String,
    base_id: String,
    name: String,
    db_table_name: String,
    description: Option<String>,
    icon: Option<String>,
    order: f64,
    created_time: OffsetDateTime,
    last_modified_time: Option<OffsetDateTime>,
}

impl From<TableRow> for TableRecord {
    fn from(row: TableRow) -> Self {
        Self {
            id: row.id,
            base_id: row.base_id,
            name: row.name,
            db_table_name: row.db_table_name,
            description: row.description,
            icon: row.icon,
            order: row.order,
            created_time: row.created_time,
            last_modified_time: row.last_modified_time,
        }
    }
}

fn table_column(key: TableKey) -> &'static str {
    match key {
        TableKey::Id => "id",
        TableKey::Name => "name",
        TableKey::DbTableName => "db_table_name",
    }
}

#[async_trait]
impl TablesRepo for PostgresRepositories {
    async fn find_tables_by_base_id(
        &self,
        base_id: &str,
        filter: Option<&KeyFilter<TableKey>>,
    ) -> Result<Vec<TableRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {TABLE_COLUMNS} FROM table_meta WHERE deleted_time IS NULL AND base_id = "
        ));
        qb.push_bind(base_id.to_string());
        push_key_filter(&mut qb, filter, table_column);
        qb.push(" ORDER BY \"order\" ASC");

        let rows = qb
            .build_query_as::<TableRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TableRecord::from).collect())
    }

    async fn find_tables_by_ids(&self, ids: &[String]) -> Result<Vec<TableRecord>, RepoError> {
        let sql = format!(
            "SELECT {TABLE_COLUMNS} FROM table_meta WHERE deleted_time IS NULL AND id = ANY($1)"
        );
        let rows = sqlx::query_as::<_, TableRow>(&sql)
            .bind(ids)
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(TableRecord::from).collect())
    }
}

#[async_trait]
impl TablesWriteRepo for PostgresRepositories {
    async fn soft_delete_table(&self, table_id: &str) -> Result<(), RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let now = OffsetDateTime::now_utc();

        let affected = sqlx::query(
            "UPDATE table_meta SET deleted_time = $2 WHERE id = $1 AND deleted_time IS NULL",
        )
        .bind(table_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?
        .rows_affected();

        if affected == 0 {
            return Err(RepoError::NotFound);
        }

        for statement in [
            "UPDATE field SET deleted_time = $2 WHERE table_id = $1 AND deleted_time IS NULL",
            "UPDATE view SET deleted_time = $2 WHERE table_id = $1 AND deleted_time IS NULL",
        ] {
            sqlx::query(statement)
                .bind(table_id)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)
    }
}
