//! End-to-end coordinator runs against stub adapters and the in-memory
//! store: phase isolation, dedup accounting, deadline skipping.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use jh_common::db::{JobFilters, JobStore, MemoryStore, StoreError};
use jh_common::session::{FocusArea, ScrapeSession, SourceCategory, SourceResult};
use jh_common::JobPosting;

use jh_harvester::adapters::company::CompanyScraper;
use jh_harvester::adapters::{AdapterError, SourceAdapter};
use jh_harvester::coordinator::{RunOptions, SourceCoordinator};
use jh_harvester::fetch::{FetchGate, Politeness};

struct StubAdapter {
    name: &'static str,
    category: SourceCategory,
    jobs: Vec<JobPosting>,
    fail: bool,
}

impl StubAdapter {
    fn ok(name: &'static str, category: SourceCategory, jobs: Vec<JobPosting>) -> Arc<Self> {
        Arc::new(Self {
            name,
            category,
            jobs,
            fail: false,
        })
    }

    fn failing(name: &'static str, category: SourceCategory) -> Arc<Self> {
        Arc::new(Self {
            name,
            category,
            jobs: Vec::new(),
            fail: true,
        })
    }
}

#[async_trait]
impl SourceAdapter for StubAdapter {
    fn name(&self) -> &str {
        self.name
    }

    fn category(&self) -> SourceCategory {
        self.category
    }

    async fn fetch(&self, _focus: &[FocusArea]) -> Result<Vec<JobPosting>, AdapterError> {
        if self.fail {
            return Err(AdapterError::Parse("stub transport failure".into()));
        }
        Ok(self.jobs.clone())
    }
}

struct DenyGate;

#[async_trait]
impl FetchGate for DenyGate {
    async fn allow(&self, _url: &str) -> bool {
        false
    }
}

/// Store whose job writes always fail; outcome records still succeed.
struct BrokenJobStore {
    inner: MemoryStore,
}

#[async_trait]
impl JobStore for BrokenJobStore {
    async fn save_jobs(&self, _jobs: &[JobPosting]) -> Result<u64, StoreError> {
        Err(StoreError::Internal("disk on fire".into()))
    }

    async fn query_active(&self, filters: &JobFilters) -> Result<Vec<JobPosting>, StoreError> {
        self.inner.query_active(filters).await
    }

    async fn record_source_outcome(
        &self,
        session_id: &str,
        outcome: &SourceResult,
    ) -> Result<(), StoreError> {
        self.inner.record_source_outcome(session_id, outcome).await
    }

    async fn record_session(&self, session: &ScrapeSession) -> Result<(), StoreError> {
        self.inner.record_session(session).await
    }
}

fn posting(title: &str, company: &str, source: &str) -> JobPosting {
    let mut job = JobPosting::new(title, company);
    job.location = Some("Austin, TX".to_string());
    job.source_name = source.to_string();
    job.source_url = format!("https://{source}.example/{title}");
    job
}

fn quiet_coordinator(store: Arc<dyn JobStore>) -> SourceCoordinator {
    SourceCoordinator::new(store).with_politeness(Politeness::bypassed())
}

#[tokio::test]
async fn duplicate_across_sources_found_twice_saved_once() {
    let store = Arc::new(MemoryStore::new());

    // Same opportunity surfacing from two different sources.
    let from_github = posting("Software Intern", "Acme", "github");
    let mut from_list = from_github.clone();
    from_list.source_name = "intern_list".to_string();
    from_list.source_url = "https://intern-list.example/1".to_string();

    let mut coordinator = quiet_coordinator(store.clone())
        .with_repo_lists(StubAdapter::ok(
            "GitHub Repositories",
            SourceCategory::RepoList,
            vec![from_github],
        ))
        .with_external_sites(StubAdapter::ok(
            "Intern-List.com",
            SourceCategory::ExternalSite,
            vec![from_list],
        ));

    let session = coordinator
        .run(&[FocusArea::Internship], &RunOptions::default())
        .await;

    assert_eq!(session.sources_processed.len(), 2);
    assert_eq!(session.total_jobs_found, 2);
    assert_eq!(session.total_jobs_saved, 1);
    assert_eq!(store.job_count(), 1);
    assert!(session.success);
    assert!(session.is_finalized());
}

#[tokio::test]
async fn failing_phase_does_not_abort_siblings() {
    let store = Arc::new(MemoryStore::new());

    let mut coordinator = quiet_coordinator(store.clone())
        .with_repo_lists(StubAdapter::ok(
            "GitHub Repositories",
            SourceCategory::RepoList,
            vec![posting("Intern A", "Acme", "github")],
        ))
        .with_external_sites(StubAdapter::ok(
            "Intern-List.com",
            SourceCategory::ExternalSite,
            vec![posting("Intern B", "Globex", "intern_list")],
        ))
        .with_board_apis(StubAdapter::failing(
            "Job Board APIs",
            SourceCategory::BoardApi,
        ))
        // Every company is refused by the gate: the phase itself still
        // completes with zero results.
        .with_company_scraper(CompanyScraper::new(
            reqwest::Client::new(),
            Arc::new(DenyGate),
        ));

    let session = coordinator.run(&[FocusArea::All], &RunOptions::default()).await;

    assert_eq!(session.sources_processed.len(), 4);
    let failed: Vec<_> = session
        .sources_processed
        .iter()
        .filter(|s| !s.success)
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].source_name, "Job Board APIs");
    assert!(failed[0].error_message.as_deref().unwrap_or("").contains("stub"));

    // Coordinator-level health is intact despite the phase failure.
    assert!(session.success);
    assert_eq!(session.total_jobs_saved, 2);

    // Every phase outcome was recorded against the session.
    assert_eq!(store.outcomes().len(), 4);
    assert_eq!(store.sessions().len(), 1);
}

#[tokio::test]
async fn store_failure_rolls_back_phase_and_reports_it() {
    let store = Arc::new(BrokenJobStore {
        inner: MemoryStore::new(),
    });

    let mut coordinator = quiet_coordinator(store)
        .with_repo_lists(StubAdapter::ok(
            "GitHub Repositories",
            SourceCategory::RepoList,
            vec![posting("Intern A", "Acme", "github")],
        ));

    let session = coordinator
        .run(&[FocusArea::Internship], &RunOptions::default())
        .await;

    assert_eq!(session.sources_processed.len(), 1);
    let outcome = &session.sources_processed[0];
    assert!(!outcome.success);
    assert_eq!(outcome.jobs_found, 1);
    assert_eq!(outcome.jobs_saved, 0);
    assert!(outcome.error_message.as_deref().unwrap_or("").contains("disk on fire"));

    // A phase's persistence failure is not a run failure.
    assert!(session.success);
}

#[tokio::test]
async fn zero_deadline_skips_every_phase() {
    let store = Arc::new(MemoryStore::new());

    let mut coordinator = quiet_coordinator(store.clone())
        .with_repo_lists(StubAdapter::ok(
            "GitHub Repositories",
            SourceCategory::RepoList,
            vec![posting("Intern A", "Acme", "github")],
        ))
        .with_company_scraper(CompanyScraper::new(
            reqwest::Client::new(),
            Arc::new(DenyGate),
        ));

    let options = RunOptions {
        deadline: Some(Duration::ZERO),
        ..RunOptions::default()
    };
    let session = coordinator.run(&[FocusArea::Internship], &options).await;

    assert!(session.sources_processed.is_empty());
    assert_eq!(store.job_count(), 0);
    assert!(session.is_finalized());
    assert!(session.success);
}

#[tokio::test]
async fn max_jobs_per_source_caps_each_phase() {
    let store = Arc::new(MemoryStore::new());

    let jobs: Vec<JobPosting> = (0..5)
        .map(|i| posting(&format!("Intern {i}"), "Acme", "github"))
        .collect();

    let mut coordinator = quiet_coordinator(store.clone()).with_repo_lists(StubAdapter::ok(
        "GitHub Repositories",
        SourceCategory::RepoList,
        jobs,
    ));

    let options = RunOptions {
        max_jobs_per_source: Some(2),
        ..RunOptions::default()
    };
    let session = coordinator.run(&[FocusArea::Internship], &options).await;

    assert_eq!(session.total_jobs_found, 2);
    assert_eq!(session.total_jobs_saved, 2);
    assert_eq!(store.job_count(), 2);
}

#[tokio::test]
async fn in_phase_duplicates_are_dropped_silently() {
    let store = Arc::new(MemoryStore::new());

    let first = posting("Software Intern", "Acme", "github");
    let mut second = first.clone();
    second.source_url = "https://github.example/other-row".to_string();

    let mut coordinator = quiet_coordinator(store.clone()).with_repo_lists(StubAdapter::ok(
        "GitHub Repositories",
        SourceCategory::RepoList,
        vec![first, second],
    ));

    let session = coordinator
        .run(&[FocusArea::Internship], &RunOptions::default())
        .await;

    let outcome = &session.sources_processed[0];
    assert_eq!(outcome.jobs_found, 2);
    assert_eq!(outcome.jobs_saved, 1);
    assert!(outcome.success);
}

#[tokio::test]
async fn remote_focus_skips_list_phases_but_runs_boards() {
    let store = Arc::new(MemoryStore::new());

    let mut coordinator = quiet_coordinator(store.clone())
        .with_repo_lists(StubAdapter::ok(
            "GitHub Repositories",
            SourceCategory::RepoList,
            vec![posting("Intern A", "Acme", "github")],
        ))
        .with_external_sites(StubAdapter::ok(
            "Intern-List.com",
            SourceCategory::ExternalSite,
            vec![posting("Intern B", "Globex", "intern_list")],
        ))
        .with_board_apis(StubAdapter::ok(
            "Job Board APIs",
            SourceCategory::BoardApi,
            vec![posting("Remote Engineer", "Initech", "boards")],
        ));

    let session = coordinator
        .run(&[FocusArea::Remote], &RunOptions::default())
        .await;

    assert_eq!(session.sources_processed.len(), 1);
    assert_eq!(session.sources_processed[0].source_name, "Job Board APIs");
    assert_eq!(store.job_count(), 1);
}

#[tokio::test]
async fn consecutive_runs_reset_the_dedup_set() {
    let store = Arc::new(MemoryStore::new());

    let job = posting("Software Intern", "Acme", "github");
    let mut coordinator = quiet_coordinator(store.clone()).with_repo_lists(StubAdapter::ok(
        "GitHub Repositories",
        SourceCategory::RepoList,
        vec![job],
    ));

    let first = coordinator
        .run(&[FocusArea::Internship], &RunOptions::default())
        .await;
    let second = coordinator
        .run(&[FocusArea::Internship], &RunOptions::default())
        .await;

    // Both runs found the posting; the store recognized the second as an
    // existing fingerprint, so nothing new was saved.
    assert_eq!(first.total_jobs_found, 1);
    assert_eq!(first.total_jobs_saved, 1);
    assert_eq!(second.total_jobs_found, 1);
    assert_eq!(second.total_jobs_saved, 0);
    assert_eq!(store.job_count(), 1);
    assert_ne!(first.session_id, second.session_id);
}
