use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use async_trait::async_trait;
use sqlx::{Pool, Postgres, pool::PoolConnection};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use validator::Validate;

use crate::api::validation::ErrorResponse;
use crate::db::error::StoreError;
use crate::db::job_repository::JobRepository;
use crate::db::models::JobRow;
use super::models::{Job, JobInput};

/// Service-level errors
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed identifier or invalid payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// No job with this id
    #[error("Job not found: {0}")]
    NotFound(i64),

    /// Store failed or timed out
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Store(StoreError::Query(err))
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Store(e) => {
                // Detail stays in the logs, never in the body
                error!("Store error: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to process request".to_string(),
                    fields: serde_json::json!({"message": "Internal server error"}),
                })
            }
            ServiceError::Validation(msg) => {
                warn!("Validation error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Validation failed".to_string(),
                    fields: serde_json::json!({"message": msg}),
                })
            }
            ServiceError::NotFound(id) => {
                warn!("Job not found: {}", id);
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "Not found".to_string(),
                    fields: serde_json::json!({"message": format!("Job with id {} not found", id)}),
                })
            }
        }
    }
}

/// Parse a path identifier. Only positive 64-bit integers are well-formed.
pub fn parse_id(raw: &str) -> Result<i64, ServiceError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ServiceError::Validation(format!("Invalid job id: {:?}", raw))),
    }
}

/// Check a job payload, collecting every validator message into one error
pub fn validate_input(job: &JobInput) -> Result<(), ServiceError> {
    job.validate().map_err(|validation_errors| {
        let messages: Vec<String> = validation_errors
            .field_errors()
            .values()
            .flat_map(|errors| {
                errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation error".to_string())
                })
            })
            .collect();
        ServiceError::Validation(messages.join(", "))
    })
}

/// Turn an affected-row count into `NotFound` when nothing matched
pub fn expect_affected(rows_affected: u64, id: i64) -> Result<(), ServiceError> {
    if rows_affected == 0 {
        Err(ServiceError::NotFound(id))
    } else {
        Ok(())
    }
}

/// Resource-level operations on jobs
///
/// Implementations must be safe to call concurrently from many request
/// handlers. Every operation addressing a single row by id reports a missing
/// row as `ServiceError::NotFound`.
#[async_trait]
pub trait JobService: Send + Sync + 'static {
    /// All jobs in store order. An empty store yields an empty vector.
    async fn fetch_many(&self) -> Result<Vec<Job>, ServiceError>;

    async fn fetch_one(&self, id: &str) -> Result<Job, ServiceError>;

    /// Persist a new job and return it with `id` and `created_at` populated
    async fn create(&self, job: JobInput) -> Result<Job, ServiceError>;

    /// Rename an existing job. `id` and `created_at` are left untouched.
    async fn update(&self, id: &str, job: JobInput) -> Result<(), ServiceError>;

    async fn delete(&self, id: &str) -> Result<(), ServiceError>;
}

/// Look up a fetched row, reporting its absence as `NotFound`
pub fn require_row(row: Option<JobRow>, id: i64) -> Result<Job, ServiceError> {
    row.map(Job::from).ok_or(ServiceError::NotFound(id))
}

/// Job service backed by PostgreSQL
///
/// Holds nothing but the pool handle, so it is shared freely across
/// workers. Each operation waits for a pooled connection (bounded by the
/// pool's acquire timeout), then runs one statement bounded by
/// `statement_timeout`.
pub struct PgJobService {
    pool: Pool<Postgres>,
    statement_timeout: Duration,
}

impl PgJobService {
    /// Create a new PgJobService instance
    pub fn new(pool: Pool<Postgres>, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Take a connection from the pool. Callers beyond the pool size wait
    /// here until one frees up or the acquire timeout elapses.
    async fn acquire(&self) -> Result<PoolConnection<Postgres>, ServiceError> {
        Ok(self.pool.acquire().await?)
    }

    /// Run one statement under the statement timeout. Dropping the inner
    /// future on timeout discards any open cursor; the connection goes back
    /// to the pool when the caller drops it.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.statement_timeout, call).await {
            Ok(result) => result.map_err(ServiceError::from),
            Err(_) => Err(StoreError::TimedOut {
                operation,
                after: self.statement_timeout,
            }
            .into()),
        }
    }
}

#[async_trait]
impl JobService for PgJobService {
    async fn fetch_many(&self) -> Result<Vec<Job>, ServiceError> {
        let mut conn = self.acquire().await?;
        let rows = self
            .bounded("fetch_many", JobRepository::fetch_all(&mut conn))
            .await?;
        Ok(rows.into_iter().map(Job::from).collect())
    }

    async fn fetch_one(&self, id: &str) -> Result<Job, ServiceError> {
        let id = parse_id(id)?;
        let mut conn = self.acquire().await?;
        let row = self
            .bounded("fetch_one", JobRepository::fetch_by_id(&mut conn, id))
            .await?;
        require_row(row, id)
    }

    async fn create(&self, job: JobInput) -> Result<Job, ServiceError> {
        validate_input(&job)?;
        info!("Service: Creating job with name={}", job.name);

        let mut conn = self.acquire().await?;
        let row = self
            .bounded("create", JobRepository::create(&mut conn, &job.name))
            .await?;

        info!("Service: Job created successfully with id={}", row.id);
        Ok(row.into())
    }

    async fn update(&self, id: &str, job: JobInput) -> Result<(), ServiceError> {
        let id = parse_id(id)?;
        validate_input(&job)?;

        let mut conn = self.acquire().await?;
        let rows_affected = self
            .bounded("update", JobRepository::update_name(&mut conn, id, &job.name))
            .await?;
        expect_affected(rows_affected, id)?;

        info!("Service: Job {} renamed to {}", id, job.name);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let id = parse_id(id)?;

        let mut conn = self.acquire().await?;
        let rows_affected = self
            .bounded("delete", JobRepository::delete(&mut conn, id))
            .await?;
        expect_affected(rows_affected, id)?;

        info!("Service: Job {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(err: &ServiceError) -> serde_json::Value {
        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[test]
    fn parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("9223372036854775807").unwrap(), i64::MAX);
    }

    #[test]
    fn parse_id_rejects_malformed_ids() {
        for raw in ["abc", "", "1.5", "0", "-3", " 1", "99999999999999999999"] {
            assert!(
                matches!(parse_id(raw), Err(ServiceError::Validation(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn validate_input_rejects_empty_name() {
        let err = validate_input(&JobInput { name: String::new() }).unwrap_err();
        match err {
            ServiceError::Validation(msg) => assert_eq!(msg, "Name must not be empty"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(validate_input(&JobInput { name: "backup".into() }).is_ok());
    }

    #[test]
    fn zero_affected_rows_is_not_found() {
        assert!(matches!(expect_affected(0, 7), Err(ServiceError::NotFound(7))));
        assert!(expect_affected(1, 7).is_ok());
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            ServiceError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServiceError::NotFound(1).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ServiceError::from(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn store_error_body_is_sanitized() {
        let err = ServiceError::from(sqlx::Error::Protocol(
            "relation \"job\" does not exist".to_string(),
        ));
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(&err).await;
        let text = body.to_string();
        assert!(!text.contains("relation"), "leaked detail: {text}");
        assert_eq!(body["fields"]["message"], "Internal server error");
    }

    #[actix_web::test]
    async fn timeout_is_reported_as_store_error() {
        let err: ServiceError = StoreError::TimedOut {
            operation: "fetch_many",
            after: Duration::from_secs(10),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&err).await;
        assert!(!body.to_string().contains("fetch_many"));
    }

    #[actix_web::test]
    async fn not_found_body_names_the_id() {
        let body = body_json(&ServiceError::NotFound(999)).await;
        assert_eq!(body["error"], "Not found");
        assert_eq!(body["fields"]["message"], "Job with id 999 not found");
    }

    #[test]
    fn missing_row_is_not_found() {
        assert!(matches!(require_row(None, 5), Err(ServiceError::NotFound(5))));

        let row = JobRow {
            id: 5,
            name: "backup".to_string(),
            created_at: chrono::Utc::now(),
        };
        let job = require_row(Some(row.clone()), 5).unwrap();
        assert_eq!(job.id, row.id);
        assert_eq!(job.name, row.name);
        assert_eq!(job.created_at, row.created_at);
    }

    /// Pool pointed at a socket that accepts connections but never answers
    /// the Postgres handshake.
    fn silent_pool(acquire_timeout: Duration) -> (std::net::TcpListener, Pool<Postgres>) {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(&format!("postgres://job:job@{}/jobs?sslmode=disable", addr))
            .unwrap();
        (listener, pool)
    }

    #[actix_web::test]
    async fn pool_wait_is_bounded_by_acquire_timeout_not_statement_timeout() {
        let acquire_timeout = Duration::from_millis(800);
        let (_listener, pool) = silent_pool(acquire_timeout);
        let service = PgJobService::new(pool, Duration::from_millis(100));

        let started = std::time::Instant::now();
        let err = service.fetch_many().await.unwrap_err();

        assert!(
            matches!(err, ServiceError::Store(StoreError::Query(sqlx::Error::PoolTimedOut))),
            "unexpected error: {err:?}"
        );
        assert!(started.elapsed() >= acquire_timeout);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn statement_timeout_bounds_a_single_call() {
        let (_listener, pool) = silent_pool(Duration::from_secs(5));
        let service = PgJobService::new(pool, Duration::from_millis(50));

        let err = service
            .bounded("fetch_many", std::future::pending::<Result<(), sqlx::Error>>())
            .await
            .unwrap_err();
        match err {
            ServiceError::Store(StoreError::TimedOut { operation, after }) => {
                assert_eq!(operation, "fetch_many");
                assert_eq!(after, Duration::from_millis(50));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn store_backed_service_validates_before_touching_the_store() {
        // An acquire would fail after the acquire timeout; validation must
        // answer first.
        let (_listener, pool) = silent_pool(Duration::from_secs(5));
        let service = PgJobService::new(pool, Duration::from_secs(5));

        assert!(matches!(service.fetch_one("abc").await, Err(ServiceError::Validation(_))));
        assert!(matches!(service.delete("0").await, Err(ServiceError::Validation(_))));
        assert!(matches!(
            service.update("1", JobInput { name: String::new() }).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.create(JobInput { name: String::new() }).await,
            Err(ServiceError::Validation(_))
        ));
    }

    /// Store-backed tests, run with
    /// `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`
    mod postgres {
        use super::*;
        use sqlx::postgres::PgPoolOptions;

        async fn service() -> PgJobService {
            let url = std::env::var("TEST_DATABASE_URL")
                .expect("TEST_DATABASE_URL must be set for store-backed tests");
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&url)
                .await
                .unwrap();
            sqlx::raw_sql(include_str!("../../../schema.sql"))
                .execute(&pool)
                .await
                .unwrap();
            PgJobService::new(pool, Duration::from_secs(10))
        }

        #[actix_web::test]
        #[ignore]
        async fn create_then_fetch_round_trips() {
            let service = service().await;
            let created = service
                .create(JobInput { name: "backup".into() })
                .await
                .unwrap();
            assert!(created.id > 0);

            let fetched = service.fetch_one(&created.id.to_string()).await.unwrap();
            assert_eq!(fetched, created);

            let all = service.fetch_many().await.unwrap();
            assert_eq!(all.iter().filter(|j| j.id == created.id).count(), 1);
        }

        #[actix_web::test]
        #[ignore]
        async fn update_changes_only_the_name() {
            let service = service().await;
            let created = service
                .create(JobInput { name: "backup".into() })
                .await
                .unwrap();
            let id = created.id.to_string();

            service
                .update(&id, JobInput { name: "backup2".into() })
                .await
                .unwrap();

            let fetched = service.fetch_one(&id).await.unwrap();
            assert_eq!(fetched.name, "backup2");
            assert_eq!(fetched.id, created.id);
            assert_eq!(fetched.created_at, created.created_at);
        }

        #[actix_web::test]
        #[ignore]
        async fn missing_rows_are_not_found() {
            let service = service().await;
            let created = service
                .create(JobInput { name: "temp".into() })
                .await
                .unwrap();
            let id = created.id.to_string();

            service.delete(&id).await.unwrap();

            assert!(matches!(service.fetch_one(&id).await, Err(ServiceError::NotFound(_))));
            assert!(matches!(
                service.update(&id, JobInput { name: "x".into() }).await,
                Err(ServiceError::NotFound(_))
            ));
            assert!(matches!(service.delete(&id).await, Err(ServiceError::NotFound(_))));
        }
    }
}
