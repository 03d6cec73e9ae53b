//! Multi-factor ranking engine: six independent scorers combined by
//! user-supplied weights into an explainable overall score.

mod company;
mod experience;
mod freshness;
mod keyword;
mod location;
mod salary;
pub mod weights;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::{JobPosting, UserPreferences};

pub use weights::{RankingWeights, DEFAULT_WEIGHTS};

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("no user preferences available for ranking")]
    MissingPreferences,
}

/// Tunable scoring constants. The defaults encode product judgment rather
/// than algorithmic necessity and are deliberately adjustable.
#[derive(Debug, Clone)]
pub struct RankingConfig {
    /// Weight of required-keyword coverage inside the keyword factor.
    pub required_blend: f64,
    /// Weight of preferred-keyword coverage inside the keyword factor.
    pub preferred_blend: f64,
    /// Bonus per preferred technology found in the job's declared stack.
    pub tech_stack_bonus: f64,
    /// Flat penalty per matched excluded keyword.
    pub excluded_keyword_penalty: f64,
    /// Salary bonus when the job's minimum clears the user's minimum.
    pub above_minimum_bonus: f64,
    /// Flat salary score when the job pays above the user's ceiling.
    pub overpay_score: f64,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            required_blend: 0.4,
            preferred_blend: 0.6,
            tech_stack_bonus: 0.1,
            excluded_keyword_penalty: 0.2,
            above_minimum_bonus: 0.2,
            overpay_score: 0.7,
        }
    }
}

/// One factor's contribution: a score in [0, 1] and its bucketed
/// human-readable explanation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub score: f64,
    pub explanation: String,
}

/// Result of scoring one (job, preferences) pair. Immutable once produced;
/// serializable so external consumers (notifiers, views) can index it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    pub overall_score: f64,
    pub keyword: FactorScore,
    pub location: FactorScore,
    pub salary: FactorScore,
    pub experience: FactorScore,
    pub company: FactorScore,
    pub freshness: FactorScore,
}

/// A job paired with its ranking, the unit of `batch_rank` output.
#[derive(Debug, Clone, Serialize)]
pub struct RankedJob {
    pub job: JobPosting,
    pub result: RankingResult,
}

pub struct JobRanker {
    config: RankingConfig,
    default_preferences: Option<UserPreferences>,
}

impl Default for JobRanker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRanker {
    pub fn new() -> Self {
        Self::with_config(RankingConfig::default())
    }

    pub fn with_config(config: RankingConfig) -> Self {
        Self {
            config,
            default_preferences: None,
        }
    }

    /// Install preferences used whenever a rank call passes none.
    pub fn with_default_preferences(mut self, preferences: UserPreferences) -> Self {
        self.default_preferences = Some(preferences);
        self
    }

    /// Rank one job. The freshness reference time is captured at call entry;
    /// prefer `batch_rank` when scoring a set, which freezes one reference
    /// for the whole batch.
    pub fn rank(
        &self,
        job: &JobPosting,
        preferences: Option<&UserPreferences>,
    ) -> Result<RankingResult, RankingError> {
        self.rank_at(job, preferences, Utc::now())
    }

    /// Rank one job against an explicit freshness reference time.
    pub fn rank_at(
        &self,
        job: &JobPosting,
        preferences: Option<&UserPreferences>,
        reference: DateTime<Utc>,
    ) -> Result<RankingResult, RankingError> {
        let preferences = self.resolve(preferences)?;
        Ok(self.score_resolved(job, preferences, reference))
    }

    /// Rank a set of jobs and sort by overall score, highest first. The sort
    /// is stable: exact ties keep their input order. One freshness reference
    /// time is frozen for the entire batch so results are reproducible.
    pub fn batch_rank(
        &self,
        jobs: &[JobPosting],
        preferences: Option<&UserPreferences>,
    ) -> Result<Vec<RankedJob>, RankingError> {
        let preferences = self.resolve(preferences)?;
        let reference = Utc::now();

        let mut ranked: Vec<RankedJob> = jobs
            .iter()
            .map(|job| {
                // resolve() already succeeded; per-job ranking cannot fail.
                let result = self.score_resolved(job, preferences, reference);
                RankedJob {
                    job: job.clone(),
                    result,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.result
                .overall_score
                .partial_cmp(&a.result.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked)
    }

    fn score_resolved(
        &self,
        job: &JobPosting,
        preferences: &UserPreferences,
        reference: DateTime<Utc>,
    ) -> RankingResult {
        let keyword = keyword::evaluate(job, preferences, &self.config);
        let location = location::evaluate(job, preferences);
        let salary = salary::evaluate(job, preferences, &self.config);
        let experience = experience::evaluate(job, preferences);
        let company = company::evaluate(job, preferences);
        let freshness = freshness::evaluate(job, reference);

        let weights = &preferences.ranking_weights;
        let overall_score = (keyword.score * weights.keywords
            + location.score * weights.location
            + salary.score * weights.salary
            + experience.score * weights.experience
            + company.score * weights.company
            + freshness.score * weights.freshness)
            .clamp(0.0, 1.0);

        RankingResult {
            overall_score,
            keyword,
            location,
            salary,
            experience,
            company,
            freshness,
        }
    }

    fn resolve<'a>(
        &'a self,
        preferences: Option<&'a UserPreferences>,
    ) -> Result<&'a UserPreferences, RankingError> {
        preferences
            .or(self.default_preferences.as_ref())
            .ok_or(RankingError::MissingPreferences)
    }
}
