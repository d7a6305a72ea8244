use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

use super::models::{Job, JobInput};
use super::service::{JobService, ServiceError, parse_id, validate_input};

/// Test double for `JobService`, storing jobs in memory
///
/// Mirrors the store-backed contract: ids are assigned on create, missing
/// rows are `NotFound`, invalid input never touches the table.
#[derive(Default)]
pub struct InMemoryJobService {
    table: Mutex<Table>,
}

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Job>,
}

impl InMemoryJobService {
    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl JobService for InMemoryJobService {
    async fn fetch_many(&self) -> Result<Vec<Job>, ServiceError> {
        Ok(self.table.lock().unwrap().rows.values().cloned().collect())
    }

    async fn fetch_one(&self, id: &str) -> Result<Job, ServiceError> {
        let id = parse_id(id)?;
        self.table
            .lock()
            .unwrap()
            .rows
            .get(&id)
            .cloned()
            .ok_or(ServiceError::NotFound(id))
    }

    async fn create(&self, job: JobInput) -> Result<Job, ServiceError> {
        validate_input(&job)?;
        let mut table = self.table.lock().unwrap();
        table.next_id += 1;
        let job = Job {
            id: table.next_id,
            name: job.name,
            created_at: Utc::now(),
        };
        table.rows.insert(job.id, job.clone());
        Ok(job)
    }

    async fn update(&self, id: &str, job: JobInput) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        validate_input(&job)?;
        let mut table = self.table.lock().unwrap();
        let row = table.rows.get_mut(&id).ok_or(ServiceError::NotFound(id))?;
        row.name = job.name;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        self.table
            .lock()
            .unwrap()
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ServiceError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> JobInput {
        JobInput {
            name: name.to_string(),
        }
    }

    #[actix_web::test]
    async fn assigns_increasing_ids() {
        let service = InMemoryJobService::default();
        let a = service.create(input("a")).await.unwrap();
        let b = service.create(input("b")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(service.fetch_many().await.unwrap(), vec![a, b]);
    }

    #[actix_web::test]
    async fn invalid_input_leaves_table_untouched() {
        let service = InMemoryJobService::default();
        let created = service.create(input("backup")).await.unwrap();

        assert!(matches!(
            service.create(input("")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.update("1", input("")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.delete("one").await,
            Err(ServiceError::Validation(_))
        ));

        assert_eq!(service.len(), 1);
        assert_eq!(service.fetch_one("1").await.unwrap(), created);
    }
}
