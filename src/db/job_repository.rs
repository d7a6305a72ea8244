use sqlx::PgConnection;
use tracing::debug;

use crate::db::models::JobRow;

/// Repository for Job database operations
///
/// Every function issues exactly one parameterized statement on a connection
/// the caller already holds. Result cursors are released when the returned
/// future completes or is dropped.
pub struct JobRepository;

impl JobRepository {
    /// Fetch every job in store order
    pub async fn fetch_all(conn: &mut PgConnection) -> Result<Vec<JobRow>, sqlx::Error> {
        let rows = sqlx::query_as::<_, JobRow>("SELECT id, name, created_at FROM job")
            .fetch_all(conn)
            .await?;

        debug!("Fetched {} jobs", rows.len());
        Ok(rows)
    }

    /// Fetch a single job, `None` when no row has this id
    pub async fn fetch_by_id(
        conn: &mut PgConnection,
        id: i64,
    ) -> Result<Option<JobRow>, sqlx::Error> {
        sqlx::query_as::<_, JobRow>("SELECT id, name, created_at FROM job WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Insert a new job and return the full record with store-assigned fields
    pub async fn create(conn: &mut PgConnection, name: &str) -> Result<JobRow, sqlx::Error> {
        debug!("Creating job: name={}", name);

        let row = sqlx::query_as::<_, JobRow>(
            r#"
            INSERT INTO job (name)
            VALUES ($1)
            RETURNING id, name, created_at
            "#,
        )
        .bind(name)
        .fetch_one(conn)
        .await?;

        debug!("Job created with id={}", row.id);
        Ok(row)
    }

    /// Rename a job. Returns the number of rows affected.
    pub async fn update_name(
        conn: &mut PgConnection,
        id: i64,
        name: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE job SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(id)
            .execute(conn)
            .await?;

        debug!("Update of job {} affected {} rows", id, result.rows_affected());
        Ok(result.rows_affected())
    }

    /// Delete a job. Returns the number of rows affected.
    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM job WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        debug!("Delete of job {} affected {} rows", id, result.rows_affected());
        Ok(result.rows_affected())
    }
}
