use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use tokio_postgres::types::ToSql;
use tokio_postgres::Row;
use tracing::instrument;

use crate::db::store::{JobFilters, JobStore, StoreError};
use crate::db::PgPool;
use crate::session::{ScrapeSession, SourceResult};
use crate::{JobPosting, JobType, SalaryPeriod};

const INSERT_JOB: &str = "INSERT INTO jh.jobs (
        fingerprint, title, company, location, description, requirements,
        salary_min, salary_max, salary_currency, salary_period, job_type,
        experience_level, remote_flag, company_size, industry, technologies,
        source_name, source_url, external_id, posted_at, first_seen_at, last_seen_at
    ) VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
        $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, NOW()
    )
    ON CONFLICT (fingerprint) DO NOTHING";

const REFRESH_JOB: &str = "UPDATE jh.jobs
    SET posted_at = COALESCE($2, posted_at), last_seen_at = NOW()
    WHERE fingerprint = $1";

const SELECT_JOB_COLUMNS: &str = "SELECT title, company, location, description, requirements,
        salary_min, salary_max, salary_currency, salary_period, job_type,
        experience_level, remote_flag, company_size, industry, technologies,
        source_name, source_url, external_id, posted_at, first_seen_at
    FROM jh.jobs";

/// Postgres-backed store: one transaction per saved batch, fingerprint
/// upserts with freshness-merge on conflict.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn technologies_json(technologies: &BTreeSet<String>) -> Value {
    serde_json::to_value(technologies).unwrap_or_else(|_| Value::Array(Vec::new()))
}

fn technologies_from_json(value: Value) -> BTreeSet<String> {
    serde_json::from_value(value).unwrap_or_default()
}

fn salary_period_from_str(raw: &str) -> SalaryPeriod {
    if raw.eq_ignore_ascii_case("hourly") {
        SalaryPeriod::Hourly
    } else {
        SalaryPeriod::Annual
    }
}

fn row_to_job(row: &Row) -> Result<JobPosting, tokio_postgres::Error> {
    let salary_period: String = row.try_get("salary_period")?;
    let job_type: Option<String> = row.try_get("job_type")?;
    let technologies: Value = row.try_get("technologies")?;

    Ok(JobPosting {
        title: row.try_get("title")?,
        company: row.try_get("company")?,
        location: row.try_get("location")?,
        description: row.try_get("description")?,
        requirements: row.try_get("requirements")?,
        salary_min: row.try_get("salary_min")?,
        salary_max: row.try_get("salary_max")?,
        salary_currency: row.try_get("salary_currency")?,
        salary_period: salary_period_from_str(&salary_period),
        job_type: job_type.as_deref().and_then(JobType::from_text),
        experience_level: row.try_get("experience_level")?,
        remote_flag: row.try_get("remote_flag")?,
        company_size: row.try_get("company_size")?,
        industry: row.try_get("industry")?,
        technologies: technologies_from_json(technologies),
        source_name: row.try_get("source_name")?,
        source_url: row.try_get("source_url")?,
        external_id: row.try_get("external_id")?,
        posted_at: row.try_get("posted_at")?,
        first_seen_at: row.try_get("first_seen_at")?,
    })
}

#[async_trait]
impl JobStore for PgStore {
    #[instrument(skip(self, jobs), fields(batch = jobs.len()))]
    async fn save_jobs(&self, jobs: &[JobPosting]) -> Result<u64, StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let insert = tx.prepare(INSERT_JOB).await?;
        let refresh = tx.prepare(REFRESH_JOB).await?;

        let mut saved = 0_u64;
        for job in jobs {
            let fingerprint = job.fingerprint();
            let technologies = technologies_json(&job.technologies);
            let job_type = job.job_type.map(|t| t.as_str());

            let rows = tx
                .execute(
                    &insert,
                    &[
                        &fingerprint,
                        &job.title,
                        &job.company,
                        &job.location,
                        &job.description,
                        &job.requirements,
                        &job.salary_min,
                        &job.salary_max,
                        &job.salary_currency,
                        &job.salary_period.as_str(),
                        &job_type,
                        &job.experience_level,
                        &job.remote_flag,
                        &job.company_size,
                        &job.industry,
                        &technologies,
                        &job.source_name,
                        &job.source_url,
                        &job.external_id,
                        &job.posted_at,
                        &job.first_seen_at,
                    ],
                )
                .await?;

            if rows == 1 {
                saved += 1;
            } else {
                // Known fingerprint from an earlier run: merge freshness only.
                tx.execute(&refresh, &[&fingerprint, &job.posted_at]).await?;
            }
        }

        tx.commit().await?;
        Ok(saved)
    }

    #[instrument(skip(self))]
    async fn query_active(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, StoreError> {
        let client = self.pool.get().await?;

        let job_type = filters.job_type.map(|t| t.as_str().to_string());
        let mut clauses: Vec<String> = vec!["is_active = TRUE".to_string()];
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(source) = &filters.source_name {
            params.push(source);
            clauses.push(format!("source_name = ${}", params.len()));
        }
        if filters.remote_only {
            clauses.push("remote_flag = TRUE".to_string());
        }
        if let Some(job_type) = &job_type {
            params.push(job_type);
            clauses.push(format!("job_type = ${}", params.len()));
        }
        if let Some(posted_after) = &filters.posted_after {
            params.push(posted_after);
            clauses.push(format!("posted_at >= ${}", params.len()));
        }

        let sql = format!(
            "{SELECT_JOB_COLUMNS} WHERE {} ORDER BY first_seen_at DESC",
            clauses.join(" AND ")
        );

        let rows = client.query(sql.as_str(), &params).await?;
        let mut jobs = Vec::with_capacity(rows.len());
        for row in &rows {
            jobs.push(row_to_job(row)?);
        }
        Ok(jobs)
    }

    #[instrument(skip(self, outcome), fields(source = %outcome.source_name))]
    async fn record_source_outcome(
        &self,
        session_id: &str,
        outcome: &SourceResult,
    ) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO jh.source_outcomes (
                    session_id, source_name, category, jobs_found, jobs_saved,
                    elapsed_ms, success, error_message
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                &[
                    &session_id,
                    &outcome.source_name,
                    &outcome.category.as_str(),
                    &(outcome.jobs_found as i64),
                    &(outcome.jobs_saved as i64),
                    &(outcome.elapsed_ms as i64),
                    &outcome.success,
                    &outcome.error_message,
                ],
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self, session), fields(session_id = %session.session_id))]
    async fn record_session(&self, session: &ScrapeSession) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        let focus_areas =
            serde_json::to_value(&session.focus_areas).unwrap_or_else(|_| Value::Array(Vec::new()));

        client
            .execute(
                "INSERT INTO jh.scrape_sessions (
                    session_id, started_at, finished_at, focus_areas,
                    total_jobs_found, total_jobs_saved, success
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (session_id) DO UPDATE SET
                    finished_at = EXCLUDED.finished_at,
                    total_jobs_found = EXCLUDED.total_jobs_found,
                    total_jobs_saved = EXCLUDED.total_jobs_saved,
                    success = EXCLUDED.success",
                &[
                    &session.session_id,
                    &session.started_at,
                    &session.finished_at,
                    &focus_areas,
                    &(session.total_jobs_found as i64),
                    &(session.total_jobs_saved as i64),
                    &session.success,
                ],
            )
            .await?;
        Ok(())
    }
}
