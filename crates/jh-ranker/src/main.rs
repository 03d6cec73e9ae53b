use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tracing::info;

use jh_common::db::{create_pool_from_url, DbPoolError, JobFilters, JobStore, PgStore, StoreError};
use jh_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use jh_common::ranking::{JobRanker, RankedJob, RankingError};
use jh_common::{JobPosting, UserPreferences};

#[derive(Debug, Parser)]
#[command(
    name = "jh-ranker",
    about = "Rank stored job postings against a preference profile"
)]
struct Cli {
    /// PostgreSQL connection string. Required unless --jobs is given.
    #[arg(long, env = "DATABASE_URL")]
    db_url: Option<String>,

    /// Rank postings from a JSON file instead of the store.
    #[arg(long, value_name = "PATH", conflicts_with = "db_url")]
    jobs: Option<PathBuf>,

    /// Preferences JSON file.
    #[arg(long, value_name = "PATH")]
    prefs: Option<PathBuf>,

    /// Built-in preference profile when no file is given.
    #[arg(long, default_value = "internship", value_parser = ["internship", "fulltime"])]
    profile: String,

    /// Number of top results to print.
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Emit the full ranked list as JSON (the notification payload).
    #[arg(long)]
    json: bool,

    /// Only rank remote-flagged postings.
    #[arg(long)]
    remote_only: bool,
}

#[derive(Debug, thiserror::Error)]
enum RankerError {
    #[error("database pool error: {0}")]
    DbPool(#[from] DbPoolError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ranking error: {0}")]
    Ranking(#[from] RankingError),
    #[error("either --db-url or --jobs must be provided")]
    NoJobSource,
}

fn load_preferences(cli: &Cli) -> Result<UserPreferences, RankerError> {
    if let Some(path) = &cli.prefs {
        let raw = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }
    Ok(match cli.profile.as_str() {
        "fulltime" => UserPreferences::fulltime_profile(),
        _ => UserPreferences::internship_profile(),
    })
}

async fn load_jobs(cli: &Cli) -> Result<Vec<JobPosting>, RankerError> {
    if let Some(path) = &cli.jobs {
        let raw = std::fs::read_to_string(path)?;
        return Ok(serde_json::from_str(&raw)?);
    }

    let db_url = cli.db_url.as_deref().ok_or(RankerError::NoJobSource)?;
    let pool = create_pool_from_url(db_url)?;
    let store: Arc<dyn JobStore> = Arc::new(PgStore::new(pool));

    let filters = JobFilters {
        remote_only: cli.remote_only,
        ..JobFilters::default()
    };
    Ok(store.query_active(&filters).await?)
}

fn print_ranked(ranked: &[RankedJob], limit: usize) {
    for (index, entry) in ranked.iter().take(limit).enumerate() {
        let location = entry.job.location.as_deref().unwrap_or("unknown location");
        println!(
            "{:>2}. [{:.3}] {} @ {} ({})",
            index + 1,
            entry.result.overall_score,
            entry.job.title,
            entry.job.company,
            location,
        );
        println!(
            "      keywords {:.2} | location {:.2} | salary {:.2} | experience {:.2} | company {:.2} | freshness {:.2}",
            entry.result.keyword.score,
            entry.result.location.score,
            entry.result.salary.score,
            entry.result.experience.score,
            entry.result.company.score,
            entry.result.freshness.score,
        );
        println!("      {}", entry.result.keyword.explanation);
    }
}

async fn run() -> Result<(), RankerError> {
    dotenv().ok();
    init_tracing_subscriber("jh-ranker");
    install_tracing_panic_hook("jh-ranker");

    let cli = Cli::parse();

    let preferences = load_preferences(&cli)?;
    let jobs = load_jobs(&cli).await?;
    info!(count = jobs.len(), "loaded postings to rank");

    let ranker = JobRanker::new().with_default_preferences(preferences);
    let ranked = ranker.batch_rank(&jobs, None)?;

    if cli.json {
        let payload: Vec<&RankedJob> = ranked.iter().take(cli.limit).collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_ranked(&ranked, cli.limit);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("jh-ranker failed: {err}");
        std::process::exit(1);
    }
}
