use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database representation of a job
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct JobRow {
    pub id: i32,
    pub name: String,
    pub customer: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

/// Database representation of a worker
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct WorkerRow {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub job_id: Option<i32>,
}

/// A job together with its eagerly loaded workers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(flatten)]
    pub job: JobRow,
    pub workers: Vec<WorkerRow>,
}

/// Raw aggregate counts read in one snapshot
#[derive(Debug, Default)]
pub struct StoreCounts {
    pub total_jobs: i64,
    /// `None` groups jobs without a status
    pub jobs_by_status: Vec<(Option<String>, i64)>,
    pub total_workers: i64,
    pub workers_by_role: Vec<(String, i64)>,
}

/// Pair each job with its workers, keeping the job order and worker order as given
pub fn attach_workers(jobs: Vec<JobRow>, workers: Vec<WorkerRow>) -> Vec<JobRecord> {
    let mut by_job: HashMap<i32, Vec<WorkerRow>> = HashMap::new();
    for worker in workers {
        if let Some(job_id) = worker.job_id {
            by_job.entry(job_id).or_default().push(worker);
        }
    }

    jobs.into_iter()
        .map(|job| {
            let workers = by_job.remove(&job.id).unwrap_or_default();
            JobRecord { job, workers }
        })
        .collect()
}
