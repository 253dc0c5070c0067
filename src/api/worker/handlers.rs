use actix_web::{
    HttpResponse, get, post, put,
    web::{Data, Path, ServiceConfig, scope},
};
use actix_web_validator::{Json, Query};

use crate::api::error::ServiceError;
use super::models::{CreateWorker, WorkerQuery};
use super::service::WorkerService;

#[post("")]
async fn create_worker(
    service: Data<WorkerService>,
    worker: Json<CreateWorker>,
) -> Result<HttpResponse, ServiceError> {
    let row = service.create_worker(&worker).await?;
    Ok(HttpResponse::Created().json(row))
}

#[get("")]
async fn list_workers(
    service: Data<WorkerService>,
    query: Query<WorkerQuery>,
) -> Result<HttpResponse, ServiceError> {
    let workers = service.list_workers(&query).await?;
    Ok(HttpResponse::Ok().json(workers))
}

#[put("/{worker_id}/assign/{job_id}")]
async fn assign_worker(
    service: Data<WorkerService>,
    path: Path<(i32, i32)>,
) -> Result<HttpResponse, ServiceError> {
    let (worker_id, job_id) = path.into_inner();
    let row = service.assign_worker(worker_id, job_id).await?;
    Ok(HttpResponse::Ok().json(row))
}

pub fn worker_config(config: &mut ServiceConfig) {
    config.service(
        scope("workers")
            .service(create_worker)
            .service(list_workers)
            .service(assign_worker),
    );
}
