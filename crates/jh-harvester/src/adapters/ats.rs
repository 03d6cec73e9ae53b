//! ATS platform clients. Greenhouse and Lever expose public JSON board
//! APIs with a stable shape; the other platforms are detected by URL so the
//! company scraper can fall back to a generic page scan.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use jh_common::JobPosting;

use super::boards::{classify_experience_level, detect_remote, extract_technologies};
use super::AdapterError;

/// Recognized applicant tracking systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtsKind {
    Workday,
    Greenhouse,
    Lever,
    Icims,
    SmartRecruiters,
    Custom,
}

impl AtsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AtsKind::Workday => "workday",
            AtsKind::Greenhouse => "greenhouse",
            AtsKind::Lever => "lever",
            AtsKind::Icims => "icims",
            AtsKind::SmartRecruiters => "smartrecruiters",
            AtsKind::Custom => "custom",
        }
    }
}

static RE_WORKDAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.wd\d+\.myworkdayjobs\.com").unwrap());
static RE_GREENHOUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"boards\.greenhouse\.io|greenhouse\.io").unwrap());
static RE_LEVER: Lazy<Regex> = Lazy::new(|| Regex::new(r"jobs\.lever\.co").unwrap());
static RE_ICIMS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.icims\.com").unwrap());
static RE_SMARTRECRUITERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"jobs\.smartrecruiters\.com").unwrap());
static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Identify the ATS behind a careers URL from its domain shape.
pub fn detect_ats(url: &str) -> Option<AtsKind> {
    if RE_WORKDAY.is_match(url) {
        Some(AtsKind::Workday)
    } else if RE_GREENHOUSE.is_match(url) {
        Some(AtsKind::Greenhouse)
    } else if RE_LEVER.is_match(url) {
        Some(AtsKind::Lever)
    } else if RE_ICIMS.is_match(url) {
        Some(AtsKind::Icims)
    } else if RE_SMARTRECRUITERS.is_match(url) {
        Some(AtsKind::SmartRecruiters)
    } else {
        None
    }
}

#[derive(Debug, Deserialize)]
struct GreenhouseBoard {
    #[serde(default)]
    jobs: Vec<GreenhouseJob>,
}

#[derive(Debug, Deserialize)]
pub struct GreenhouseJob {
    id: u64,
    title: String,
    absolute_url: String,
    #[serde(default)]
    location: Option<GreenhouseLocation>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseLocation {
    name: String,
}

#[derive(Debug, Deserialize)]
pub struct LeverPosting {
    id: String,
    text: String,
    #[serde(rename = "hostedUrl")]
    hosted_url: String,
    #[serde(default, rename = "createdAt")]
    created_at: Option<i64>,
    #[serde(default)]
    categories: LeverCategories,
    #[serde(default, rename = "descriptionPlain")]
    description_plain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LeverCategories {
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    commitment: Option<String>,
}

fn strip_html(content: &str) -> String {
    RE_HTML_TAG.replace_all(content, " ").trim().to_string()
}

fn finish_posting(mut job: JobPosting) -> JobPosting {
    let description = job.description.clone().unwrap_or_default();
    job.remote_flag = detect_remote(job.location.as_deref().unwrap_or(""), &description);
    job.technologies = extract_technologies(&format!("{} {}", job.title, description));
    job.experience_level = classify_experience_level(&format!("{} {}", job.title, description));
    job
}

fn greenhouse_to_posting(company: &str, entry: GreenhouseJob) -> JobPosting {
    let mut job = JobPosting::new(entry.title, company);
    job.source_name = "ats:greenhouse".to_string();
    job.source_url = entry.absolute_url;
    job.external_id = Some(entry.id.to_string());
    job.location = entry.location.map(|l| l.name);
    job.description = entry.content.as_deref().map(strip_html).filter(|d| !d.is_empty());
    job.posted_at = entry
        .updated_at
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));
    finish_posting(job)
}

fn lever_to_posting(company: &str, entry: LeverPosting) -> JobPosting {
    let mut job = JobPosting::new(entry.text, company);
    job.source_name = "ats:lever".to_string();
    job.source_url = entry.hosted_url;
    job.external_id = Some(entry.id);
    job.location = entry.categories.location;
    job.description = entry.description_plain.filter(|d| !d.trim().is_empty());
    job.job_type = entry
        .categories
        .commitment
        .as_deref()
        .and_then(jh_common::JobType::from_text);
    job.posted_at = entry.created_at.and_then(DateTime::from_timestamp_millis);
    finish_posting(job)
}

/// Fetch a company's Greenhouse board.
pub async fn fetch_greenhouse(
    client: &reqwest::Client,
    company: &str,
    board_token: &str,
) -> Result<Vec<JobPosting>, AdapterError> {
    let url = format!("https://boards-api.greenhouse.io/v1/boards/{board_token}/jobs?content=true");
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(AdapterError::Status {
            status: response.status().as_u16(),
            url,
        });
    }

    let board: GreenhouseBoard = response
        .json()
        .await
        .map_err(|err| AdapterError::Parse(format!("greenhouse board {board_token}: {err}")))?;

    Ok(board
        .jobs
        .into_iter()
        .map(|entry| greenhouse_to_posting(company, entry))
        .collect())
}

/// Fetch a company's Lever postings.
pub async fn fetch_lever(
    client: &reqwest::Client,
    company: &str,
    site: &str,
) -> Result<Vec<JobPosting>, AdapterError> {
    let url = format!("https://api.lever.co/v0/postings/{site}?mode=json");
    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(AdapterError::Status {
            status: response.status().as_u16(),
            url,
        });
    }

    let postings: Vec<LeverPosting> = response
        .json()
        .await
        .map_err(|err| AdapterError::Parse(format!("lever site {site}: {err}")))?;

    Ok(postings
        .into_iter()
        .map(|entry| lever_to_posting(company, entry))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ats_detection_recognizes_domain_shapes() {
        assert_eq!(
            detect_ats("https://acme.wd5.myworkdayjobs.com/en-US/careers"),
            Some(AtsKind::Workday)
        );
        assert_eq!(
            detect_ats("https://boards.greenhouse.io/acme"),
            Some(AtsKind::Greenhouse)
        );
        assert_eq!(detect_ats("https://jobs.lever.co/acme"), Some(AtsKind::Lever));
        assert_eq!(detect_ats("https://careers.acme.icims.com/jobs"), Some(AtsKind::Icims));
        assert_eq!(
            detect_ats("https://jobs.smartrecruiters.com/Acme"),
            Some(AtsKind::SmartRecruiters)
        );
        assert_eq!(detect_ats("https://careers.acme.dev"), None);
    }

    #[test]
    fn greenhouse_entries_normalize() {
        let entry: GreenhouseJob = serde_json::from_value(serde_json::json!({
            "id": 7011,
            "title": "Software Engineer, Infrastructure",
            "absolute_url": "https://boards.greenhouse.io/acme/jobs/7011",
            "location": {"name": "Remote - US"},
            "updated_at": "2025-08-01T12:00:00-04:00",
            "content": "<p>Build <b>Python</b> services on AWS.</p>"
        }))
        .expect("deserialize");

        let job = greenhouse_to_posting("Acme", entry);
        assert_eq!(job.company, "Acme");
        assert_eq!(job.external_id.as_deref(), Some("7011"));
        assert_eq!(job.location.as_deref(), Some("Remote - US"));
        assert!(job.remote_flag);
        assert!(job.technologies.contains("python"));
        assert!(job.technologies.contains("aws"));
        assert!(!job.description.as_deref().unwrap_or("").contains('<'));
        assert!(job.posted_at.is_some());
    }

    #[test]
    fn lever_entries_normalize() {
        let entry: LeverPosting = serde_json::from_value(serde_json::json!({
            "id": "abc-123",
            "text": "Backend Engineering Intern",
            "hostedUrl": "https://jobs.lever.co/acme/abc-123",
            "createdAt": 1754006400000_i64,
            "categories": {"location": "New York, NY", "commitment": "Internship"},
            "descriptionPlain": "Work on Go and Kubernetes systems."
        }))
        .expect("deserialize");

        let job = lever_to_posting("Acme", entry);
        assert_eq!(job.title, "Backend Engineering Intern");
        assert_eq!(job.job_type, Some(jh_common::JobType::Internship));
        assert_eq!(job.experience_level.as_deref(), Some("entry"));
        assert!(job.technologies.contains("kubernetes"));
        assert!(job.posted_at.is_some());
    }

    #[test]
    fn minimal_payloads_still_parse() {
        let entry: GreenhouseJob = serde_json::from_value(serde_json::json!({
            "id": 1,
            "title": "Engineer",
            "absolute_url": "https://boards.greenhouse.io/acme/jobs/1"
        }))
        .expect("deserialize");

        let job = greenhouse_to_posting("Acme", entry);
        assert_eq!(job.location, None);
        assert_eq!(job.description, None);
        assert_eq!(job.posted_at, None);
    }
}
