//! The opaque store interface the coordinator persists through, plus an
//! in-memory implementation for tests and dry runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::session::{ScrapeSession, SourceResult};
use crate::{JobPosting, JobType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),
    #[error("store failure: {0}")]
    Internal(String),
}

/// Filters for `query_active`.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub source_name: Option<String>,
    pub remote_only: bool,
    pub job_type: Option<JobType>,
    pub posted_after: Option<DateTime<Utc>>,
}

impl JobFilters {
    pub fn matches(&self, job: &JobPosting) -> bool {
        if let Some(source) = &self.source_name {
            if &job.source_name != source {
                return false;
            }
        }
        if self.remote_only && !job.remote_flag {
            return false;
        }
        if let Some(job_type) = self.job_type {
            if job.job_type != Some(job_type) {
                return false;
            }
        }
        if let Some(cutoff) = self.posted_after {
            match job.posted_at {
                Some(posted_at) if posted_at >= cutoff => {}
                _ => return false,
            }
        }
        true
    }
}

/// Persistence consumed by the coordinator and the ranker. `save_jobs` is a
/// transactional batch: on error nothing from the batch is visible, which is
/// what lets the coordinator treat a phase's persistence failure as a
/// rolled-back phase.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a batch. Returns how many records were newly stored; records
    /// whose fingerprint already exists merge metadata and do not count.
    async fn save_jobs(&self, jobs: &[JobPosting]) -> Result<u64, StoreError>;

    async fn query_active(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, StoreError>;

    async fn record_source_outcome(
        &self,
        session_id: &str,
        outcome: &SourceResult,
    ) -> Result<(), StoreError>;

    async fn record_session(&self, session: &ScrapeSession) -> Result<(), StoreError>;
}

#[derive(Default)]
struct MemoryInner {
    jobs: HashMap<String, JobPosting>,
    outcomes: Vec<(String, SourceResult)>,
    sessions: HashMap<String, ScrapeSession>,
}

/// Mutex-guarded store used by tests and `--dry-run` style invocations.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn job_count(&self) -> usize {
        self.lock().jobs.len()
    }

    pub fn jobs(&self) -> Vec<JobPosting> {
        self.lock().jobs.values().cloned().collect()
    }

    pub fn outcomes(&self) -> Vec<(String, SourceResult)> {
        self.lock().outcomes.clone()
    }

    pub fn sessions(&self) -> Vec<ScrapeSession> {
        self.lock().sessions.values().cloned().collect()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn save_jobs(&self, jobs: &[JobPosting]) -> Result<u64, StoreError> {
        let mut inner = self.lock();
        let mut saved = 0;
        for job in jobs {
            let fingerprint = job.fingerprint();
            match inner.jobs.entry(fingerprint) {
                std::collections::hash_map::Entry::Vacant(slot) => {
                    slot.insert(job.clone());
                    saved += 1;
                }
                std::collections::hash_map::Entry::Occupied(mut slot) => {
                    // Duplicate from another source: merge freshness metadata
                    // only, keeping the earliest first_seen_at.
                    let existing = slot.get_mut();
                    if existing.posted_at.is_none() {
                        existing.posted_at = job.posted_at;
                    }
                    if job.first_seen_at < existing.first_seen_at {
                        existing.first_seen_at = job.first_seen_at;
                    }
                }
            }
        }
        Ok(saved)
    }

    async fn query_active(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, StoreError> {
        let inner = self.lock();
        let mut jobs: Vec<JobPosting> = inner
            .jobs
            .values()
            .filter(|job| filters.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.first_seen_at.cmp(&a.first_seen_at));
        Ok(jobs)
    }

    async fn record_source_outcome(
        &self,
        session_id: &str,
        outcome: &SourceResult,
    ) -> Result<(), StoreError> {
        self.lock()
            .outcomes
            .push((session_id.to_string(), outcome.clone()));
        Ok(())
    }

    async fn record_session(&self, session: &ScrapeSession) -> Result<(), StoreError> {
        self.lock()
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }
}
