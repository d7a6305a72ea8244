use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::JobRow;

/// A job as exposed by the API
///
/// `id` and `created_at` are assigned by the store on creation and never
/// change afterwards. `created_at` serializes as RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// Request body for creating or renaming a job
///
/// Any other fields in the payload (`id`, `created_at`) are ignored.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct JobInput {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,
}
