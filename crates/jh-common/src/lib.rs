pub mod config;
pub mod db;
pub mod fuzzy;
pub mod logging;
pub mod normalize;
pub mod ranking;
pub mod run_id;
pub mod session;
pub mod terms;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ranking::RankingWeights;

/// Pay period attached to a posting's salary figures. Figures within one
/// coordination run are currency-agnostic; only the period matters for
/// scoring (hourly figures annualize at 2080 hours/year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryPeriod {
    Hourly,
    Annual,
}

impl SalaryPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalaryPeriod::Hourly => "hourly",
            SalaryPeriod::Annual => "annual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
        }
    }

    /// Lenient mapping from scraped free text ("Full-time", "Intern", ...).
    pub fn from_text(text: &str) -> Option<Self> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        if lowered.contains("intern") {
            Some(JobType::Internship)
        } else if lowered.contains("part") {
            Some(JobType::PartTime)
        } else if lowered.contains("contract") || lowered.contains("freelance") {
            Some(JobType::Contract)
        } else if lowered.contains("full") {
            Some(JobType::FullTime)
        } else {
            None
        }
    }
}

/// One normalized job opportunity. Adapters construct these; identity across
/// sources is the fingerprint over normalized title/company/location and a
/// description prefix, never the source that produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub salary_period: SalaryPeriod,
    pub job_type: Option<JobType>,
    pub experience_level: Option<String>,
    pub remote_flag: bool,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    pub technologies: BTreeSet<String>,
    pub source_name: String,
    pub source_url: String,
    pub external_id: Option<String>,
    pub posted_at: Option<DateTime<Utc>>,
    pub first_seen_at: DateTime<Utc>,
}

impl Default for JobPosting {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            location: None,
            description: None,
            requirements: None,
            salary_min: None,
            salary_max: None,
            salary_currency: "USD".to_string(),
            salary_period: SalaryPeriod::Annual,
            job_type: None,
            experience_level: None,
            remote_flag: false,
            company_size: None,
            industry: None,
            technologies: BTreeSet::new(),
            source_name: String::new(),
            source_url: String::new(),
            external_id: None,
            posted_at: None,
            first_seen_at: Utc::now(),
        }
    }
}

impl JobPosting {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Self::default()
        }
    }

    /// Deduplication fingerprint. Stable under recomputation and independent
    /// of `source_name`/`source_url`.
    pub fn fingerprint(&self) -> String {
        normalize::fingerprint(
            &self.title,
            &self.company,
            self.location.as_deref(),
            self.description.as_deref(),
        )
    }

    /// Text corpus the keyword scorer runs against.
    pub fn corpus(&self) -> String {
        let mut corpus = self.title.to_lowercase();
        if let Some(description) = &self.description {
            corpus.push(' ');
            corpus.push_str(&description.to_lowercase());
        }
        corpus
    }
}

/// A user's declared matching criteria. Weight maps need not sum to one;
/// the engine applies them directly and clamps the combined score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub required_keywords: Vec<String>,
    #[serde(default)]
    pub preferred_keywords: Vec<String>,
    #[serde(default)]
    pub excluded_keywords: Vec<String>,
    /// Per-keyword weight for preferred keywords; unlisted keywords weigh 1.0.
    #[serde(default)]
    pub keyword_weights: HashMap<String, f64>,
    #[serde(default)]
    pub preferred_locations: Vec<String>,
    #[serde(default)]
    pub remote_acceptable: bool,
    /// Annualized bounds regardless of how sources quote pay.
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub max_salary: Option<i64>,
    #[serde(default)]
    pub experience_levels: Vec<String>,
    #[serde(default)]
    pub preferred_company_types: Vec<String>,
    #[serde(default)]
    pub excluded_companies: Vec<String>,
    #[serde(default)]
    pub preferred_technologies: Vec<String>,
    #[serde(default)]
    pub job_types: Vec<JobType>,
    #[serde(default)]
    pub ranking_weights: RankingWeights,
}

impl UserPreferences {
    /// Preferences tuned for CS/IT internship searches.
    pub fn internship_profile() -> Self {
        Self {
            required_keywords: vec!["intern".into(), "internship".into(), "student".into()],
            preferred_keywords: vec![
                "software".into(),
                "developer".into(),
                "engineer".into(),
                "programming".into(),
                "python".into(),
                "java".into(),
                "javascript".into(),
            ],
            excluded_keywords: vec![
                "senior".into(),
                "lead".into(),
                "manager".into(),
                "director".into(),
            ],
            keyword_weights: HashMap::from([
                ("python".to_string(), 0.9),
                ("java".to_string(), 0.8),
                ("javascript".to_string(), 0.8),
                ("react".to_string(), 0.7),
                ("sql".to_string(), 0.6),
                ("git".to_string(), 0.5),
            ]),
            preferred_locations: vec![
                "Remote".into(),
                "New York".into(),
                "San Francisco".into(),
                "Seattle".into(),
                "Austin".into(),
            ],
            remote_acceptable: true,
            min_salary: Some(31_200),
            max_salary: Some(83_200),
            experience_levels: vec!["entry".into()],
            preferred_company_types: vec!["startup".into(), "mid-size".into(), "enterprise".into()],
            excluded_companies: Vec::new(),
            preferred_technologies: vec![
                "python".into(),
                "javascript".into(),
                "sql".into(),
                "git".into(),
            ],
            job_types: vec![JobType::Internship, JobType::PartTime],
            ranking_weights: RankingWeights {
                keywords: 0.35,
                location: 0.20,
                salary: 0.15,
                experience: 0.15,
                company: 0.10,
                freshness: 0.05,
            },
        }
    }

    /// Preferences tuned for early-career full-time searches.
    pub fn fulltime_profile() -> Self {
        Self {
            required_keywords: vec!["software".into(), "developer".into(), "engineer".into()],
            preferred_keywords: vec![
                "python".into(),
                "java".into(),
                "javascript".into(),
                "react".into(),
                "sql".into(),
                "aws".into(),
                "docker".into(),
            ],
            excluded_keywords: vec!["intern".into(), "internship".into()],
            keyword_weights: HashMap::from([
                ("python".to_string(), 1.0),
                ("javascript".to_string(), 0.9),
                ("react".to_string(), 0.8),
                ("aws".to_string(), 0.9),
                ("docker".to_string(), 0.7),
                ("kubernetes".to_string(), 0.8),
                ("sql".to_string(), 0.6),
            ]),
            preferred_locations: vec![
                "Remote".into(),
                "San Francisco".into(),
                "New York".into(),
                "Seattle".into(),
                "Austin".into(),
                "Boston".into(),
            ],
            remote_acceptable: true,
            min_salary: Some(70_000),
            max_salary: Some(180_000),
            experience_levels: vec!["entry".into(), "mid".into()],
            preferred_company_types: vec!["startup".into(), "mid-size".into(), "enterprise".into()],
            excluded_companies: Vec::new(),
            preferred_technologies: vec![
                "python".into(),
                "javascript".into(),
                "sql".into(),
                "aws".into(),
                "docker".into(),
                "git".into(),
            ],
            job_types: vec![JobType::FullTime],
            ranking_weights: RankingWeights {
                keywords: 0.30,
                location: 0.20,
                salary: 0.25,
                experience: 0.15,
                company: 0.05,
                freshness: 0.05,
            },
        }
    }
}
