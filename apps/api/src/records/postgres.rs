use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::record::{strip_reserved, Record, RecordRow};
use crate::records::{Collection, ListOrder, RecordPatch, RecordStore};

/// PostgreSQL-backed record store. One table per collection, the document
/// lives in a JSONB `data` column next to the envelope columns.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn order_clause(order: ListOrder) -> &'static str {
    match order {
        ListOrder::NewestFirst => "ORDER BY submitted_at DESC",
        ListOrder::TitleAscending => "ORDER BY data->>'title' ASC NULLS LAST",
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(
        &self,
        collection: Collection,
        document: Map<String, Value>,
    ) -> Result<Record, AppError> {
        let data = Value::Object(strip_reserved(document));
        // Table names come from the closed `Collection` enum, never from input.
        let query = format!(
            "INSERT INTO {} (id, data, viewed) VALUES ($1, $2, FALSE) \
             RETURNING id, data, viewed, submitted_at",
            collection.table()
        );
        let row = sqlx::query_as::<_, RecordRow>(&query)
            .bind(Uuid::new_v4())
            .bind(&data)
            .fetch_one(&self.pool)
            .await?;

        info!("Inserted {} record {}", collection.table(), row.id);
        Ok(row.into())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>, AppError> {
        let query = format!(
            "SELECT id, data, viewed, submitted_at FROM {} {}",
            collection.table(),
            order_clause(collection.list_order())
        );
        let rows = sqlx::query_as::<_, RecordRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn get(&self, collection: Collection, id: Uuid) -> Result<Option<Record>, AppError> {
        let query = format!(
            "SELECT id, data, viewed, submitted_at FROM {} WHERE id = $1",
            collection.table()
        );
        let row = sqlx::query_as::<_, RecordRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Record::from))
    }

    async fn update(
        &self,
        collection: Collection,
        id: Uuid,
        patch: RecordPatch,
    ) -> Result<bool, AppError> {
        let query = format!(
            "UPDATE {} SET data = data || $2, viewed = COALESCE($3, viewed) WHERE id = $1",
            collection.table()
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(Value::Object(patch.fields))
            .bind(patch.viewed)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool, AppError> {
        let query = format!("DELETE FROM {} WHERE id = $1", collection.table());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_viewed(&self, collection: Collection) -> Result<u64, AppError> {
        let query = format!(
            "UPDATE {} SET viewed = TRUE WHERE viewed = FALSE",
            collection.table()
        );
        let result = sqlx::query(&query).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
