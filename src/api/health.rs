use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::error;

use crate::db::connection::ping;

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
}

/// Answer a probe by pinging the pool. Error detail is logged, not returned.
async fn probe(pool: &Pool<Postgres>, up: &'static str, down: &'static str) -> HttpResponse {
    match ping(pool).await {
        Ok(()) => HttpResponse::Ok().json(HealthResponse {
            status: up,
            database: "connected",
        }),
        Err(e) => {
            error!("{} probe failed: database unavailable: {:?}", down, e);
            HttpResponse::ServiceUnavailable().json(HealthResponse {
                status: down,
                database: "disconnected",
            })
        }
    }
}

/// General health check including database connectivity.
#[get("/health")]
async fn health_check(pool: web::Data<Pool<Postgres>>) -> impl Responder {
    probe(pool.get_ref(), "healthy", "unhealthy").await
}

/// Readiness probe: 503 while the database is unreachable.
#[get("/ready")]
async fn readiness_check(pool: web::Data<Pool<Postgres>>) -> impl Responder {
    probe(pool.get_ref(), "ready", "not_ready").await
}

/// Liveness probe. Does not check dependencies.
#[get("/live")]
async fn liveness_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "alive",
        database: "not_checked",
    })
}

pub fn health_config(config: &mut web::ServiceConfig) {
    config
        .service(health_check)
        .service(readiness_check)
        .service(liveness_check);
}
