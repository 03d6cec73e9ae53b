use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::PgPool;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "jobs, source outcomes, and scrape session tables",
    sql: r#"
CREATE SCHEMA IF NOT EXISTS jh;

CREATE TABLE IF NOT EXISTS jh.schema_migrations (
    id INTEGER PRIMARY KEY,
    description TEXT NOT NULL,
    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS jh.jobs (
    id BIGSERIAL PRIMARY KEY,
    fingerprint TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    company TEXT NOT NULL,
    location TEXT,
    description TEXT,
    requirements TEXT,
    salary_min BIGINT,
    salary_max BIGINT,
    salary_currency TEXT NOT NULL DEFAULT 'USD',
    salary_period TEXT NOT NULL DEFAULT 'annual',
    job_type TEXT,
    experience_level TEXT,
    remote_flag BOOLEAN NOT NULL DEFAULT FALSE,
    company_size TEXT,
    industry TEXT,
    technologies JSONB NOT NULL DEFAULT '[]'::jsonb,
    source_name TEXT NOT NULL,
    source_url TEXT NOT NULL,
    external_id TEXT,
    posted_at TIMESTAMPTZ,
    first_seen_at TIMESTAMPTZ NOT NULL,
    last_seen_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    is_active BOOLEAN NOT NULL DEFAULT TRUE
);

CREATE INDEX IF NOT EXISTS idx_jobs_source_name ON jh.jobs(source_name);
CREATE INDEX IF NOT EXISTS idx_jobs_posted_at ON jh.jobs(posted_at);
CREATE INDEX IF NOT EXISTS idx_jobs_active_remote ON jh.jobs(is_active, remote_flag);

CREATE TABLE IF NOT EXISTS jh.source_outcomes (
    id BIGSERIAL PRIMARY KEY,
    session_id TEXT NOT NULL,
    source_name TEXT NOT NULL,
    category TEXT NOT NULL,
    jobs_found BIGINT NOT NULL,
    jobs_saved BIGINT NOT NULL,
    elapsed_ms BIGINT NOT NULL,
    success BOOLEAN NOT NULL,
    error_message TEXT,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_source_outcomes_session ON jh.source_outcomes(session_id);

CREATE TABLE IF NOT EXISTS jh.scrape_sessions (
    session_id TEXT PRIMARY KEY,
    started_at TIMESTAMPTZ NOT NULL,
    finished_at TIMESTAMPTZ,
    focus_areas JSONB NOT NULL DEFAULT '[]'::jsonb,
    total_jobs_found BIGINT NOT NULL DEFAULT 0,
    total_jobs_saved BIGINT NOT NULL DEFAULT 0,
    success BOOLEAN NOT NULL DEFAULT FALSE
);
"#,
}];

/// Apply pending migrations. Each migration runs inside one transaction and
/// is recorded in `jh.schema_migrations`; already-applied entries are
/// skipped, so startup can call this unconditionally.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;

    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS jh;
             CREATE TABLE IF NOT EXISTS jh.schema_migrations (
                 id INTEGER PRIMARY KEY,
                 description TEXT NOT NULL,
                 applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied = client
            .query_opt(
                "SELECT 1 FROM jh.schema_migrations WHERE id = $1",
                &[&migration.id],
            )
            .await?
            .is_some();
        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO jh.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(id = migration.id, description = migration.description, "applied migration");
    }

    Ok(())
}
