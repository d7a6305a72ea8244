use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database representation of a row in the `job` table
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
