use async_trait::async_trait;
use sqlx::{PgConnection, Pool, Postgres};
use tracing::debug;

use crate::api::job::models::{CreateJob, JobQuery};
use crate::api::worker::models::{CreateWorker, WorkerQuery};
use crate::db::migrations::run_migrations;
use crate::db::models::{attach_workers, JobRecord, JobRow, StoreCounts, WorkerRow};
use crate::db::store::{Store, StoreError};

const JOB_COLUMNS: &str = "id, name, customer, start_date, end_date, status";
const WORKER_COLUMNS: &str = "id, name, role, job_id";

/// PostgreSQL-backed store
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Take a share lock on a job row so it cannot be deleted before the
    /// surrounding transaction commits
    async fn lock_job(conn: &mut PgConnection, job_id: i32) -> Result<(), StoreError> {
        let found: Option<i32> = sqlx::query_scalar("SELECT id FROM jobs WHERE id = $1 FOR SHARE")
            .bind(job_id)
            .fetch_optional(conn)
            .await?;

        found.map(|_| ()).ok_or(StoreError::JobMissing(job_id))
    }

    async fn workers_of_jobs(
        conn: &mut PgConnection,
        job_ids: &[i32],
    ) -> Result<Vec<WorkerRow>, sqlx::Error> {
        if job_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM workers WHERE job_id = ANY($1) ORDER BY id",
            WORKER_COLUMNS
        );
        sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(job_ids)
            .fetch_all(conn)
            .await
    }
}

/// Turn a user keyword into an ILIKE pattern that matches it literally
fn like_pattern(keyword: &str) -> String {
    let mut pattern = String::with_capacity(keyword.len() + 2);
    pattern.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn order_clause(query: &JobQuery) -> String {
    match query.sort_by {
        Some(field) => format!(
            " ORDER BY {} {}, id",
            field.column(),
            if query.desc { "DESC" } else { "ASC" }
        ),
        None => " ORDER BY id".to_string(),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn migrate(&self) -> Result<(), StoreError> {
        run_migrations(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn create_job(&self, job: &CreateJob) -> Result<JobRecord, StoreError> {
        debug!("Creating job: name={}, customer={}, status={:?}", job.name, job.customer, job.status);

        let sql = format!(
            r#"
            INSERT INTO jobs (name, customer, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            JOB_COLUMNS
        );
        let row = sqlx::query_as::<_, JobRow>(&sql)
            .bind(&job.name)
            .bind(&job.customer)
            .bind(job.start_date)
            .bind(job.end_date)
            .bind(job.status.map(|s| s.as_str()))
            .fetch_one(&self.pool)
            .await?;

        debug!("Job created with id={}", row.id);
        Ok(JobRecord { job: row, workers: Vec::new() })
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<Vec<JobRecord>, StoreError> {
        debug!("Listing jobs: {:?}", query);

        let mut sql = format!(
            r#"
            SELECT {} FROM jobs
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\' OR customer ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR status = $2)
              AND ($3::date IS NULL OR start_date >= $3)
              AND ($4::date IS NULL OR end_date <= $4)
            "#,
            JOB_COLUMNS
        );
        sql.push_str(&order_clause(query));

        let mut tx = self.pool.begin().await?;

        let jobs = sqlx::query_as::<_, JobRow>(&sql)
            .bind(query.keyword.as_deref().map(like_pattern))
            .bind(query.status.map(|s| s.as_str()))
            .bind(query.start_after)
            .bind(query.end_before)
            .fetch_all(&mut *tx)
            .await?;

        let job_ids: Vec<i32> = jobs.iter().map(|job| job.id).collect();
        let workers = Self::workers_of_jobs(&mut tx, &job_ids).await?;

        tx.commit().await?;

        debug!("Listed {} jobs", jobs.len());
        Ok(attach_workers(jobs, workers))
    }

    async fn get_job(&self, job_id: i32) -> Result<JobRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        let job = sqlx::query_as::<_, JobRow>(&sql)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::JobMissing(job_id))?;

        let workers = Self::workers_of_jobs(&mut tx, &[job_id]).await?;
        tx.commit().await?;

        Ok(JobRecord { job, workers })
    }

    async fn delete_job(&self, job_id: i32) -> Result<(), StoreError> {
        debug!("Deleting job id={}", job_id);

        // workers go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::JobMissing(job_id));
        }
        Ok(())
    }

    async fn create_worker(&self, worker: &CreateWorker) -> Result<WorkerRow, StoreError> {
        debug!("Creating worker: name={}, role={}, job_id={:?}", worker.name, worker.role, worker.job_id);

        let mut tx = self.pool.begin().await?;

        if let Some(job_id) = worker.job_id {
            Self::lock_job(&mut tx, job_id).await?;
        }

        let sql = format!(
            r#"
            INSERT INTO workers (name, role, job_id)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            WORKER_COLUMNS
        );
        let row = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(&worker.name)
            .bind(&worker.role)
            .bind(worker.job_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Worker created with id={}", row.id);
        Ok(row)
    }

    async fn list_workers(&self, query: &WorkerQuery) -> Result<Vec<WorkerRow>, StoreError> {
        debug!("Listing workers: {:?}", query);

        let sql = format!(
            r#"
            SELECT {} FROM workers
            WHERE ($1::text IS NULL OR name ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR role ILIKE $2 ESCAPE '\')
              AND ($3::int4 IS NULL OR job_id = $3)
            ORDER BY id
            "#,
            WORKER_COLUMNS
        );
        let rows = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(query.name.as_deref().map(like_pattern))
            .bind(query.role.as_deref().map(like_pattern))
            .bind(query.job_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn job_workers(&self, job_id: i32) -> Result<Vec<WorkerRow>, StoreError> {
        let mut tx = self.pool.begin().await?;

        Self::lock_job(&mut tx, job_id).await?;
        let workers = Self::workers_of_jobs(&mut tx, &[job_id]).await?;

        tx.commit().await?;
        Ok(workers)
    }

    async fn assign_worker(&self, worker_id: i32, job_id: i32) -> Result<WorkerRow, StoreError> {
        debug!("Assigning worker id={} to job id={}", worker_id, job_id);

        let mut tx = self.pool.begin().await?;

        let worker: Option<i32> = sqlx::query_scalar("SELECT id FROM workers WHERE id = $1 FOR UPDATE")
            .bind(worker_id)
            .fetch_optional(&mut *tx)
            .await?;
        if worker.is_none() {
            return Err(StoreError::WorkerMissing(worker_id));
        }

        Self::lock_job(&mut tx, job_id).await?;

        let sql = format!(
            "UPDATE workers SET job_id = $1 WHERE id = $2 RETURNING {}",
            WORKER_COLUMNS
        );
        let row = sqlx::query_as::<_, WorkerRow>(&sql)
            .bind(job_id)
            .bind(worker_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        let mut tx = self.pool.begin().await?;

        // all four reads must see the same snapshot
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let total_jobs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&mut *tx)
            .await?;
        let jobs_by_status: Vec<(Option<String>, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM jobs GROUP BY status ORDER BY status")
                .fetch_all(&mut *tx)
                .await?;
        let total_workers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM workers")
            .fetch_one(&mut *tx)
            .await?;
        let workers_by_role: Vec<(String, i64)> =
            sqlx::query_as("SELECT role, COUNT(*) FROM workers GROUP BY role ORDER BY role")
                .fetch_all(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(StoreCounts {
            total_jobs,
            jobs_by_status,
            total_workers,
            workers_by_role,
        })
    }
}
