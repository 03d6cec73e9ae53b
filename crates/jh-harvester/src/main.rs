use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use tracing::{info, warn};

use jh_common::config::Config;
use jh_common::db::{create_pool_from_url, run_migrations, DbPoolError, JobStore, MemoryStore, MigrationError, PgStore};
use jh_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use jh_common::session::FocusArea;

use jh_harvester::adapters::boards::{BoardApiAdapter, BoardEndpoint};
use jh_harvester::adapters::company::CompanyScraper;
use jh_harvester::adapters::github::GithubListAdapter;
use jh_harvester::adapters::intern_list::InternListAdapter;
use jh_harvester::coordinator::{RunOptions, SourceCoordinator};
use jh_harvester::fetch::{build_client, FetchGate, PermissiveGate, Politeness, RateLimiter};

#[derive(Debug, Parser)]
#[command(
    name = "jh-harvester",
    about = "Run one multi-source job acquisition pass"
)]
struct Cli {
    /// PostgreSQL connection string. Omitted = in-memory dry run.
    #[arg(long, env = "DATABASE_URL")]
    db_url: Option<String>,

    /// Focus areas: internship, new-grad, h1b, remote, all. Repeatable.
    #[arg(long = "focus", value_name = "AREA")]
    focus: Vec<FocusArea>,

    /// Cap on records taken from each source (smoke runs).
    #[arg(long)]
    max_jobs_per_source: Option<usize>,

    /// Only scrape high-priority companies.
    #[arg(long)]
    priority_only: bool,

    /// Soft deadline for the whole run, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JSON job-board API endpoint to query (optional).
    #[arg(long, env = "JH_BOARD_API_URL")]
    board_api_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
enum HarvestError {
    #[error("database pool error: {0}")]
    DbPool(#[from] DbPoolError),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

async fn run() -> Result<bool, HarvestError> {
    dotenv().ok();
    init_tracing_subscriber("jh-harvester");
    install_tracing_panic_hook("jh-harvester");

    let cli = Cli::parse();
    let config = Config::from_env();

    let store: Arc<dyn JobStore> = match cli.db_url.as_deref() {
        Some(db_url) => {
            let pool = create_pool_from_url(db_url)?;
            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("no DATABASE_URL configured; running against the in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let client = build_client(&config)?;
    let gate: Arc<dyn FetchGate> = Arc::new(PermissiveGate);
    let politeness = Politeness::from_config(&config);

    let board_endpoints: Vec<BoardEndpoint> = cli
        .board_api_url
        .iter()
        .map(|url| BoardEndpoint {
            name: "boards".to_string(),
            base_url: url.clone(),
        })
        .collect();

    let mut coordinator = SourceCoordinator::new(store)
        .with_politeness(politeness.clone())
        .with_repo_lists(Arc::new(GithubListAdapter::new(
            client.clone(),
            config.github_token.clone(),
            gate.clone(),
            politeness.clone(),
        )))
        .with_external_sites(Arc::new(InternListAdapter::new(
            client.clone(),
            gate.clone(),
            politeness.clone(),
        )))
        .with_board_apis(Arc::new(BoardApiAdapter::new(
            client.clone(),
            board_endpoints,
            RateLimiter::from_config(&config),
            gate.clone(),
            politeness.clone(),
        )))
        .with_company_scraper(CompanyScraper::new(client, gate));

    let options = RunOptions {
        max_jobs_per_source: cli.max_jobs_per_source,
        priority_only: cli.priority_only,
        deadline: cli.timeout_secs.map(Duration::from_secs),
    };

    let session = coordinator.run(&cli.focus, &options).await;

    for source in &session.sources_processed {
        info!(
            source = %source.source_name,
            category = source.category.as_str(),
            found = source.jobs_found,
            saved = source.jobs_saved,
            elapsed_ms = source.elapsed_ms,
            success = source.success,
            error = source.error_message.as_deref().unwrap_or(""),
            "source outcome"
        );
    }
    info!(
        session_id = %session.session_id,
        total_found = session.total_jobs_found,
        total_saved = session.total_jobs_saved,
        success = session.success,
        "session summary"
    );

    Ok(session.success)
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("jh-harvester failed: {err}");
            std::process::exit(1);
        }
    }
}
