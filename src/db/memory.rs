use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::api::job::models::{CreateJob, JobQuery, SortField};
use crate::api::worker::models::{CreateWorker, WorkerQuery};
use crate::db::models::{attach_workers, JobRecord, JobRow, StoreCounts, WorkerRow};
use crate::db::store::{Store, StoreError};

#[derive(Default)]
struct Tables {
    next_job_id: i32,
    next_worker_id: i32,
    jobs: BTreeMap<i32, JobRow>,
    workers: BTreeMap<i32, WorkerRow>,
}

impl Tables {
    fn workers_of(&self, job_id: i32) -> Vec<WorkerRow> {
        self.workers
            .values()
            .filter(|w| w.job_id == Some(job_id))
            .cloned()
            .collect()
    }
}

/// Non-persistent store kept in process memory
///
/// Each call holds the lock for its whole duration and only mutates after
/// every check has passed.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Ascending order with missing values last
fn nulls_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// Case-insensitive first, byte order to settle ties
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

fn compare_jobs(a: &JobRow, b: &JobRow, field: SortField) -> Ordering {
    match field {
        SortField::Name => compare_text(&a.name, &b.name),
        SortField::Customer => compare_text(&a.customer, &b.customer),
        SortField::StartDate => nulls_last(a.start_date, b.start_date),
        SortField::Status => nulls_last(a.status.as_deref(), b.status.as_deref()),
    }
}

fn job_matches(job: &JobRow, query: &JobQuery) -> bool {
    if let Some(keyword) = &query.keyword {
        if !contains_ignore_case(&job.name, keyword) && !contains_ignore_case(&job.customer, keyword) {
            return false;
        }
    }
    if let Some(status) = query.status {
        if job.status.as_deref() != Some(status.as_str()) {
            return false;
        }
    }
    if let Some(start_after) = query.start_after {
        if !job.start_date.is_some_and(|d| d >= start_after) {
            return false;
        }
    }
    if let Some(end_before) = query.end_before {
        if !job.end_date.is_some_and(|d| d <= end_before) {
            return false;
        }
    }
    true
}

fn worker_matches(worker: &WorkerRow, query: &WorkerQuery) -> bool {
    query.name.as_deref().map_or(true, |name| contains_ignore_case(&worker.name, name))
        && query.role.as_deref().map_or(true, |role| contains_ignore_case(&worker.role, role))
        && query.job_id.map_or(true, |job_id| worker.job_id == Some(job_id))
}

#[async_trait]
impl Store for MemoryStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.tables().map(|_| ())
    }

    async fn close(&self) {}

    async fn create_job(&self, job: &CreateJob) -> Result<JobRecord, StoreError> {
        let mut tables = self.tables()?;
        tables.next_job_id += 1;
        let row = JobRow {
            id: tables.next_job_id,
            name: job.name.clone(),
            customer: job.customer.clone(),
            start_date: job.start_date,
            end_date: job.end_date,
            status: job.status.map(|s| s.as_str().to_string()),
        };
        tables.jobs.insert(row.id, row.clone());

        debug!("Job created with id={}", row.id);
        Ok(JobRecord { job: row, workers: Vec::new() })
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, StoreError> {
        let tables = self.tables()?;

        let mut jobs: Vec<JobRow> = tables
            .jobs
            .values()
            .filter(|job| job_matches(job, query))
            .cloned()
            .collect();

        if let Some(field) = query.sort_by {
            jobs.sort_by(|a, b| {
                let primary = compare_jobs(a, b, field);
                let primary = if query.desc { primary.reverse() } else { primary };
                primary.then(a.id.cmp(&b.id))
            });
        }

        let workers = tables.workers.values().cloned().collect();
        Ok(attach_workers(jobs, workers))
    }

    async fn get_job(&self, job_id: i32) -> Result<JobRecord, StoreError> {
        let tables = self.tables()?;
        let job = tables
            .jobs
            .get(&job_id)
            .cloned()
            .ok_or(StoreError::JobMissing(job_id))?;

        Ok(JobRecord { workers: tables.workers_of(job_id), job })
    }

    async fn delete_job(&self, job_id: i32) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.jobs.remove(&job_id).is_none() {
            return Err(StoreError::JobMissing(job_id));
        }
        tables.workers.retain(|_, w| w.job_id != Some(job_id));

        debug!("Deleted job id={} and its workers", job_id);
        Ok(())
    }

    async fn create_worker(&self, worker: &CreateWorker) -> Result<WorkerRow, StoreError> {
        let mut tables = self.tables()?;
        if let Some(job_id) = worker.job_id {
            if !tables.jobs.contains_key(&job_id) {
                return Err(StoreError::JobMissing(job_id));
            }
        }

        tables.next_worker_id += 1;
        let row = WorkerRow {
            id: tables.next_worker_id,
            name: worker.name.clone(),
            role: worker.role.clone(),
            job_id: worker.job_id,
        };
        tables.workers.insert(row.id, row.clone());

        debug!("Worker created with id={}", row.id);
        Ok(row)
    }

    async fn list_workers(&self, query: &WorkerQuery) -> Result<Vec<WorkerRow>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .workers
            .values()
            .filter(|w| worker_matches(w, query))
            .cloned()
            .collect())
    }

    async fn job_workers(&self, job_id: i32) -> Result<Vec<WorkerRow>, StoreError> {
        let tables = self.tables()?;
        if !tables.jobs.contains_key(&job_id) {
            return Err(StoreError::JobMissing(job_id));
        }
        Ok(tables.workers_of(job_id))
    }

    async fn assign_worker(&self, worker_id: i32, job_id: i32) -> Result<WorkerRow, StoreError> {
        let mut tables = self.tables()?;
        if !tables.workers.contains_key(&worker_id) {
            return Err(StoreError::WorkerMissing(worker_id));
        }
        if !tables.jobs.contains_key(&job_id) {
            return Err(StoreError::JobMissing(job_id));
        }

        let worker = tables
            .workers
            .get_mut(&worker_id)
            .ok_or(StoreError::WorkerMissing(worker_id))?;
        worker.job_id = Some(job_id);
        Ok(worker.clone())
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let tables = self.tables()?;

        let mut by_status: BTreeMap<Option<String>, i64> = BTreeMap::new();
        for job in tables.jobs.values() {
            *by_status.entry(job.status.clone()).or_insert(0) += 1;
        }

        let mut by_role: BTreeMap<String, i64> = BTreeMap::new();
        for worker in tables.workers.values() {
            *by_role.entry(worker.role.clone()).or_insert(0) += 1;
        }

        Ok(StoreCounts {
            total_jobs: tables.jobs.len() as i64,
            jobs_by_status: by_status.into_iter().collect(),
            total_workers: tables.workers.len() as i64,
            workers_by_role: by_role.into_iter().collect(),
        })
    }
}
