use async_trait::async_trait;
use thiserror::Error;

use crate::api::job::models::{CreateJob, JobQuery};
use crate::api::worker::models::{CreateWorker, WorkerQuery};
use crate::db::models::{JobRecord, StoreCounts, WorkerRow};

/// Errors raised by a `Store` implementation
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Job with id {0} not found")]
    JobMissing(i32),

    #[error("Worker with id {0} not found")]
    WorkerMissing(i32),
}

/// Persistence interface for jobs and workers
///
/// Every method is a single unit of work: it either applies all of its
/// changes or none of them.
#[async_trait]
pub trait Store: Send + Sync {
    /// Apply pending schema changes
    async fn migrate(&self) -> Result<(), StoreError>;

    /// Check the backend is reachable
    async fn ping(&self) -> Result<(), StoreError>;

    /// Release held connections
    async fn close(&self);

    async fn create_job(&self, job: &CreateJob) -> Result<JobRecord, StoreError>;

    /// Jobs matching `query`, ordered as requested, workers attached
    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, StoreError>;

    async fn get_job(&self, job_id: i32) -> Result<JobRecord, StoreError>;

    /// Delete a job and every worker assigned to it
    async fn delete_job(&self, job_id: i32) -> Result<(), StoreError>;

    async fn create_worker(&self, worker: &CreateWorker) -> Result<WorkerRow, StoreError>;

    async fn list_workers(&self, query: &WorkerQuery) -> Result<Vec<WorkerRow>, StoreError>;

    async fn job_workers(&self, job_id: i32) -> Result<Vec<WorkerRow>, StoreError>;

    async fn assign_worker(&self, worker_id: i32, job_id: i32) -> Result<WorkerRow, StoreError>;

    async fn counts(&self) -> Result<StoreCounts, StoreError>;
}
