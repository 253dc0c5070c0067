use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::api::error::ServiceError;
use crate::api::validation::describe;
use crate::db::models::WorkerRow;
use crate::db::Store;
use super::models::{CreateWorker, WorkerQuery};

/// Worker service containing business logic
pub struct WorkerService {
    store: Arc<dyn Store>,
}

impl WorkerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a worker, optionally assigned to an existing job
    ///
    /// # Returns
    /// - `Err(ServiceError::JobNotFound)` - `job_id` names no job
    /// - `Err(ServiceError::Validation)` - name or role out of bounds
    pub async fn create_worker(&self, worker: &CreateWorker) -> Result<WorkerRow, ServiceError> {
        info!("Service: Creating worker with name={}, job_id={:?}", worker.name, worker.job_id);

        worker.validate()
            .map_err(|errors| ServiceError::Validation(describe(&errors)))?;

        let row = self.store.create_worker(worker).await?;

        info!("Service: Worker created successfully with id={}", row.id);
        Ok(row)
    }

    pub async fn list_workers(&self, query: &WorkerQuery) -> Result<Vec<WorkerRow>, ServiceError> {
        Ok(self.store.list_workers(query).await?)
    }

    /// Point a worker at a job, replacing any previous assignment
    pub async fn assign_worker(&self, worker_id: i32, job_id: i32) -> Result<WorkerRow, ServiceError> {
        info!("Service: Assigning worker id={} to job id={}", worker_id, job_id);
        Ok(self.store.assign_worker(worker_id, job_id).await?)
    }
}
