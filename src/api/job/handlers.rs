use actix_web::{
    HttpResponse, delete, get, post,
    web::{Data, Path, ServiceConfig, scope},
};
use actix_web_validator::{Json, Query};

use crate::api::error::ServiceError;
use super::models::{CreateJob, JobQuery};
use super::service::JobService;

#[post("")]
async fn create_job(
    service: Data<JobService>,
    job: Json<CreateJob>,
) -> Result<HttpResponse, ServiceError> {
    let record = service.create_job(&job).await?;
    Ok(HttpResponse::Created().json(record))
}

#[get("")]
async fn list_jobs(
    service: Data<JobService>,
    query: Query<JobQuery>,
) -> Result<HttpResponse, ServiceError> {
    let jobs = service.list_jobs(&query).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

#[get("/{job_id}")]
async fn get_job(
    service: Data<JobService>,
    path: Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let record = service.get_job(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[delete("/{job_id}")]
async fn delete_job(
    service: Data<JobService>,
    path: Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    service.delete_job(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[get("/{job_id}/workers")]
async fn list_job_workers(
    service: Data<JobService>,
    path: Path<i32>,
) -> Result<HttpResponse, ServiceError> {
    let workers = service.job_workers(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(workers))
}

pub fn job_config(config: &mut ServiceConfig) {
    config.service(
        scope("jobs")
            .service(create_job)
            .service(list_jobs)
            .service(get_job)
            .service(delete_job)
            .service(list_job_workers),
    );
}
