use actix_web::{
    HttpResponse,
    web::{self, Data, Path, ServiceConfig},
};
use actix_web_validator::Json;

use super::models::JobInput;
use super::service::{JobService, ServiceError};

async fn list_jobs<S: JobService>(service: Data<S>) -> Result<HttpResponse, ServiceError> {
    let jobs = service.fetch_many().await?;
    Ok(HttpResponse::Ok().json(jobs))
}

async fn get_job<S: JobService>(
    service: Data<S>,
    id: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.fetch_one(&id).await?;
    Ok(HttpResponse::Ok().json(job))
}

async fn create_job<S: JobService>(
    service: Data<S>,
    job: Json<JobInput>,
) -> Result<HttpResponse, ServiceError> {
    let job = service.create(job.into_inner()).await?;
    Ok(HttpResponse::Created().json(job))
}

async fn update_job<S: JobService>(
    service: Data<S>,
    id: Path<String>,
    job: Json<JobInput>,
) -> Result<HttpResponse, ServiceError> {
    service.update(&id, job.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

async fn delete_job<S: JobService>(
    service: Data<S>,
    id: Path<String>,
) -> Result<HttpResponse, ServiceError> {
    service.delete(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Mount the job routes under `/api/jobs` for any `JobService`.
///
/// The service itself must be registered as `Data<S>` app data.
pub fn job_config<S: JobService>(config: &mut ServiceConfig) {
    config.service(
        web::scope("/api/jobs")
            .service(
                web::resource("")
                    .route(web::get().to(list_jobs::<S>))
                    .route(web::post().to(create_job::<S>)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_job::<S>))
                    .route(web::put().to(update_job::<S>))
                    .route(web::delete().to(delete_job::<S>)),
            ),
    );
}
