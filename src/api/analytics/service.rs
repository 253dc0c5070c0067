use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::api::error::ServiceError;
use crate::db::Store;

/// Bucket for jobs that have no status
pub const UNSPECIFIED_STATUS: &str = "Unspecified";

/// Aggregate job and worker counts
#[derive(Debug, Serialize, PartialEq)]
pub struct Analytics {
    pub total_jobs: i64,
    pub jobs_by_status: BTreeMap<String, i64>,
    pub total_workers: i64,
    pub workers_by_role: BTreeMap<String, i64>,
}

pub struct AnalyticsService {
    store: Arc<dyn Store>,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_analytics(&self) -> Result<Analytics, ServiceError> {
        let counts = self.store.counts().await?;

        let mut jobs_by_status = BTreeMap::new();
        for (status, count) in counts.jobs_by_status {
            let key = status.unwrap_or_else(|| UNSPECIFIED_STATUS.to_string());
            *jobs_by_status.entry(key).or_insert(0) += count;
        }

        Ok(Analytics {
            total_jobs: counts.total_jobs,
            jobs_by_status,
            total_workers: counts.total_workers,
            workers_by_role: counts.workers_by_role.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::{CreateJob, JobStatus};
    use crate::api::worker::models::CreateWorker;
    use crate::db::memory::MemoryStore;

    #[actix_web::test]
    async fn empty_store_reports_zeroes() {
        let service = AnalyticsService::new(Arc::new(MemoryStore::new()));
        let analytics = service.get_analytics().await.unwrap();

        assert_eq!(analytics.total_jobs, 0);
        assert!(analytics.jobs_by_status.is_empty());
        assert_eq!(analytics.total_workers, 0);
        assert!(analytics.workers_by_role.is_empty());
    }

    #[actix_web::test]
    async fn totals_match_breakdowns() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let statuses = [
            Some(JobStatus::Pending),
            None,
            Some(JobStatus::Completed),
            Some(JobStatus::Pending),
            None,
        ];
        for (i, status) in statuses.into_iter().enumerate() {
            let job = store
                .create_job(&CreateJob {
                    name: format!("job {}", i),
                    customer: "Acme".to_string(),
                    start_date: None,
                    end_date: None,
                    status,
                })
                .await
                .unwrap();
            store
                .create_worker(&CreateWorker {
                    name: format!("worker {}", i),
                    role: (if i % 2 == 0 { "Painter" } else { "Roofer" }).to_string(),
                    job_id: Some(job.job.id),
                })
                .await
                .unwrap();
        }

        let analytics = AnalyticsService::new(store).get_analytics().await.unwrap();

        assert_eq!(analytics.total_jobs, analytics.jobs_by_status.values().sum::<i64>());
        assert_eq!(analytics.total_workers, analytics.workers_by_role.values().sum::<i64>());
        assert_eq!(analytics.jobs_by_status.get(UNSPECIFIED_STATUS), Some(&2));
        assert_eq!(analytics.jobs_by_status.get("Pending"), Some(&2));
        assert_eq!(analytics.workers_by_role.get("Painter"), Some(&3));
    }
}
