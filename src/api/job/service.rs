use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::api::error::ServiceError;
use crate::api::validation::describe;
use crate::db::models::{JobRecord, WorkerRow};
use crate::db::Store;
use super::models::{CreateJob, JobQuery};

/// Job service containing business logic
pub struct JobService {
    store: Arc<dyn Store>,
}

impl JobService {
    /// Create a new JobService instance
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a single job
    ///
    /// # Business Logic
    /// - Validates field lengths and that end_date is not before start_date
    /// - Creates job in the store
    ///
    /// # Returns
    /// - `Ok(JobRecord)` - Job created, with an empty worker list
    /// - `Err(ServiceError)` - Validation or storage failure
    pub async fn create_job(&self, job: &CreateJob) -> Result<JobRecord, ServiceError> {
        info!("Service: Creating job with name={}", job.name);

        job.validate()
            .map_err(|errors| ServiceError::Validation(describe(&errors)))?;

        let record = self.store.create_job(job).await?;

        info!("Service: Job created successfully with id={}", record.job.id);
        Ok(record)
    }

    /// List jobs matching the filters, workers included
    ///
    /// Fails with a validation error when `start_after` is later than `end_before`.
    pub async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, ServiceError> {
        query.validate()
            .map_err(|errors| ServiceError::Validation(describe(&errors)))?;

        if let (Some(start_after), Some(end_before)) = (query.start_after, query.end_before) {
            if start_after > end_before {
                return Err(ServiceError::Validation(
                    "start_after date must be before end_before date".to_string(),
                ));
            }
        }

        let jobs = self.store.list_jobs(query).await?;
        info!("Service: Listed {} jobs", jobs.len());
        Ok(jobs)
    }

    pub async fn get_job(&self, job_id: i32) -> Result<JobRecord, ServiceError> {
        Ok(self.store.get_job(job_id).await?)
    }

    /// Delete a job; its workers are deleted with it
    pub async fn delete_job(&self, job_id: i32) -> Result<(), ServiceError> {
        info!("Service: Deleting job id={}", job_id);
        self.store.delete_job(job_id).await?;
        Ok(())
    }

    pub async fn job_workers(&self, job_id: i32) -> Result<Vec<WorkerRow>, ServiceError> {
        Ok(self.store.job_workers(job_id).await?)
    }
}
