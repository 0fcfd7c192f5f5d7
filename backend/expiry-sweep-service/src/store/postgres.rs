use super::{ensure_batch_size, DocumentStore};
use crate::error::Result;
use crate::models::record::ContentRecordRow;
use crate::models::{ContentRecord, SweepPredicate};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

/// `content_records` table backed by PostgreSQL
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn query(&self, predicate: &SweepPredicate) -> Result<Vec<ContentRecord>> {
        let rows = sqlx::query_as::<_, ContentRecordRow>(
            r#"
            SELECT id, type, expires_at, viewed, image_url
            FROM content_records
            WHERE type = $1
              AND expires_at <= $2
              AND ($3::BOOLEAN IS NULL OR viewed = $3)
            "#,
        )
        .bind(predicate.kind.as_str())
        .bind(predicate.expires_at_or_before)
        .bind(predicate.viewed)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                match ContentRecord::try_from(row) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(record_id = %id, error = %e, "Skipping unreadable content record");
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }

    async fn commit_delete_batch(&self, ids: Vec<String>) -> Result<usize> {
        ensure_batch_size(ids.len())?;
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM content_records WHERE id = ANY($1)")
            .bind(&ids)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        debug!(requested = ids.len(), deleted, "Delete batch committed");
        Ok(deleted as usize)
    }
}
