//! Job-board API adapter: queries JSON job APIs per focus-derived search
//! term and normalizes the loosely-shaped payloads they return.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use jh_common::session::{FocusArea, SourceCategory};
use jh_common::{JobPosting, SalaryPeriod};

use crate::fetch::{FetchGate, Politeness, RateLimiter};

use super::{AdapterError, SourceAdapter};

static RE_SALARY_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*k?\s*[-–—]\s*(\d+(?:\.\d+)?)\s*k?").unwrap());
static RE_SALARY_SINGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*k?").unwrap());

/// Technology keywords recognized in free-form description text.
static TECH_KEYWORDS: &[&str] = &[
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust", "swift",
    "react", "angular", "vue", "node.js", "express", "django", "flask", "spring",
    "sql", "mysql", "postgresql", "mongodb", "redis", "cassandra",
    "aws", "azure", "gcp", "docker", "kubernetes", "jenkins", "git", "linux",
    "machine learning", "deep learning", "tensorflow", "pytorch", "pandas", "numpy",
];

static REMOTE_KEYWORDS: &[&str] = &[
    "remote",
    "work from home",
    "wfh",
    "telecommute",
    "distributed",
    "anywhere",
    "location independent",
];

/// One JSON jobs API to query.
#[derive(Debug, Clone)]
pub struct BoardEndpoint {
    pub name: String,
    pub base_url: String,
}

pub struct BoardApiAdapter {
    client: reqwest::Client,
    endpoints: Vec<BoardEndpoint>,
    limiter: RateLimiter,
    gate: Arc<dyn FetchGate>,
    politeness: Politeness,
}

impl BoardApiAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoints: Vec<BoardEndpoint>,
        limiter: RateLimiter,
        gate: Arc<dyn FetchGate>,
        politeness: Politeness,
    ) -> Self {
        Self {
            client,
            endpoints,
            limiter,
            gate,
            politeness,
        }
    }
}

#[async_trait]
impl SourceAdapter for BoardApiAdapter {
    fn name(&self) -> &str {
        "Job Board APIs"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::BoardApi
    }

    async fn fetch(&self, focus: &[FocusArea]) -> Result<Vec<JobPosting>, AdapterError> {
        let terms = search_terms(focus);
        let mut jobs = Vec::new();

        for endpoint in &self.endpoints {
            if !self.gate.allow(&endpoint.base_url).await {
                warn!(endpoint = %endpoint.name, "compliance gate refused board endpoint");
                continue;
            }

            for term in terms.iter().copied() {
                self.limiter.acquire().await;
                self.politeness.pause().await;

                let request = self
                    .client
                    .get(&endpoint.base_url)
                    .query(&[("q", term), ("location", "United States")]);

                match request.send().await {
                    Ok(response) if response.status().is_success() => {
                        match response.json::<Value>().await {
                            Ok(payload) => {
                                let parsed = parse_board_payload(&payload, &endpoint.name);
                                debug!(endpoint = %endpoint.name, term, count = parsed.len(), "board query complete");
                                jobs.extend(parsed);
                            }
                            Err(err) => {
                                warn!(endpoint = %endpoint.name, term, error = %err, "board payload was not json");
                            }
                        }
                    }
                    Ok(response) => {
                        warn!(
                            endpoint = %endpoint.name,
                            term,
                            status = response.status().as_u16(),
                            "board query rejected"
                        );
                    }
                    Err(err) => {
                        // One term failing must not sink the sibling queries.
                        warn!(endpoint = %endpoint.name, term, error = %err, "board query failed");
                    }
                }
            }
        }

        Ok(jobs)
    }
}

/// Search terms derived from the requested focus areas.
pub fn search_terms(focus: &[FocusArea]) -> Vec<&'static str> {
    let mut terms: Vec<&'static str> = Vec::new();

    if focus.is_empty() || focus.contains(&FocusArea::All) {
        terms.extend(["software engineer", "developer", "programmer", "intern"]);
    } else {
        if focus.contains(&FocusArea::Internship) {
            terms.extend(["software intern", "engineering intern", "developer intern"]);
        }
        if focus.contains(&FocusArea::NewGrad) {
            terms.extend(["new grad software", "entry level developer", "junior engineer"]);
        }
        if focus.contains(&FocusArea::H1b) {
            terms.extend(["software engineer visa", "h1b software"]);
        }
        if focus.contains(&FocusArea::Remote) {
            terms.extend(["remote software engineer", "remote developer"]);
        }
    }

    terms.dedup();
    terms
}

fn field<'a>(item: &'a Value, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| item.get(*name).and_then(Value::as_str))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Normalize one board payload. Accepts a top-level array or an object
/// wrapping one under `jobs`/`results`/`data`.
pub fn parse_board_payload(payload: &Value, endpoint_name: &str) -> Vec<JobPosting> {
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(_) => ["jobs", "results", "data"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| parse_board_item(item, endpoint_name))
        .collect()
}

fn parse_board_item(item: &Value, endpoint_name: &str) -> Option<JobPosting> {
    let title = field(item, &["title", "job_title", "position", "name"])?;
    let company = field(item, &["company", "company_name", "employer"])?;

    let mut job = JobPosting::new(title, company);
    job.source_name = format!("boards:{endpoint_name}");
    job.location = field(item, &["location", "city"]).map(str::to_string);
    job.description = field(item, &["description", "snippet", "summary"]).map(str::to_string);
    job.source_url = field(item, &["url", "link", "job_url", "apply_url"])
        .map(str::to_string)
        .unwrap_or_default();
    job.external_id = item
        .get("id")
        .map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .filter(|id| !id.is_empty());

    if let Some(salary_text) = field(item, &["salary", "salary_text", "compensation"]) {
        let (min, max, period) = parse_salary_text(salary_text);
        job.salary_min = min;
        job.salary_max = max;
        job.salary_period = period;
    }

    if let Some(posted) = field(item, &["posted_at", "date_posted", "created_at", "date"]) {
        job.posted_at = DateTime::parse_from_rfc3339(posted)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .ok()
            .or_else(|| super::github::parse_posted_date(posted));
    }

    let description = job.description.clone().unwrap_or_default();
    job.remote_flag = detect_remote(job.location.as_deref().unwrap_or(""), &description);
    job.technologies = extract_technologies(&format!("{} {}", job.title, description));
    job.experience_level = classify_experience_level(&format!("{} {}", job.title, description));
    job.job_type = field(item, &["job_type", "employment_type"])
        .and_then(jh_common::JobType::from_text)
        .or_else(|| jh_common::JobType::from_text(&job.title));

    Some(job)
}

/// Parse salary text like `$120,000 - $150,000`, `50k-70k`, or `$35/hr`.
pub fn parse_salary_text(text: &str) -> (Option<i64>, Option<i64>, SalaryPeriod) {
    let cleaned = text.to_lowercase().replace(['$', ','], "");
    if cleaned.trim().is_empty() {
        return (None, None, SalaryPeriod::Annual);
    }

    let period = if ["hour", "hourly", "/hr"].iter().any(|w| cleaned.contains(w)) {
        SalaryPeriod::Hourly
    } else {
        SalaryPeriod::Annual
    };
    let k_multiplier = if cleaned.contains('k') { 1000.0 } else { 1.0 };

    if let Some(caps) = RE_SALARY_RANGE.captures(&cleaned) {
        let min = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|v| (v * k_multiplier) as i64);
        let max = caps
            .get(2)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|v| (v * k_multiplier) as i64);
        return (min, max, period);
    }

    if let Some(caps) = RE_SALARY_SINGLE.captures(&cleaned) {
        let value = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .map(|v| (v * k_multiplier) as i64);
        return (value, value, period);
    }

    (None, None, period)
}

/// Technology keywords present in free text, as a normalized set.
pub fn extract_technologies(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    TECH_KEYWORDS
        .iter()
        .filter(|tech| lowered.contains(**tech))
        .map(|tech| tech.to_string())
        .collect()
}

/// Classify free text onto the experience progression. Defaults to mid when
/// the text carries no signal, and None for empty text.
pub fn classify_experience_level(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    if lowered.trim().is_empty() {
        return None;
    }

    let entry = ["entry", "junior", "intern", "new grad", "recent graduate", "0-2 years"];
    let senior = ["senior", "sr.", "principal", "5+ years", "7+ years"];
    let mid = ["mid", "intermediate", "2-5 years", "3-7 years"];
    let lead = ["lead", "architect", "manager", "director"];

    if entry.iter().any(|term| lowered.contains(term)) {
        Some("entry".to_string())
    } else if senior.iter().any(|term| lowered.contains(term)) {
        Some("senior".to_string())
    } else if mid.iter().any(|term| lowered.contains(term)) {
        Some("mid".to_string())
    } else if lead.iter().any(|term| lowered.contains(term)) {
        Some("lead".to_string())
    } else {
        Some("mid".to_string())
    }
}

/// Whether the location or description signals remote work.
pub fn detect_remote(location: &str, description: &str) -> bool {
    let text = format!("{} {}", location, description).to_lowercase();
    REMOTE_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_terms_follow_focus_areas() {
        assert_eq!(search_terms(&[]).len(), 4);
        assert_eq!(search_terms(&[FocusArea::All]).len(), 4);

        let intern_terms = search_terms(&[FocusArea::Internship]);
        assert!(intern_terms.iter().all(|t| t.contains("intern")));

        let mixed = search_terms(&[FocusArea::Internship, FocusArea::Remote]);
        assert!(mixed.iter().any(|t| t.contains("remote")));
        assert!(mixed.iter().any(|t| t.contains("intern")));
    }

    #[test]
    fn salary_ranges_parse_with_k_notation() {
        assert_eq!(
            parse_salary_text("$120,000 - $150,000"),
            (Some(120_000), Some(150_000), SalaryPeriod::Annual)
        );
        assert_eq!(
            parse_salary_text("50k-70k"),
            (Some(50_000), Some(70_000), SalaryPeriod::Annual)
        );
        assert_eq!(
            parse_salary_text("$30-$40/hr"),
            (Some(30), Some(40), SalaryPeriod::Hourly)
        );
        assert_eq!(
            parse_salary_text("25 - 35 per hour"),
            (Some(25), Some(35), SalaryPeriod::Hourly)
        );
        assert_eq!(
            parse_salary_text("$95,000"),
            (Some(95_000), Some(95_000), SalaryPeriod::Annual)
        );
        assert_eq!(parse_salary_text(""), (None, None, SalaryPeriod::Annual));
        assert_eq!(parse_salary_text("competitive"), (None, None, SalaryPeriod::Annual));
    }

    #[test]
    fn technologies_are_extracted_and_deduped() {
        let techs = extract_technologies("Python, python, and PostgreSQL on AWS");
        assert!(techs.contains("python"));
        assert!(techs.contains("postgresql"));
        assert!(techs.contains("aws"));
        assert_eq!(techs.iter().filter(|t| *t == "python").count(), 1);
    }

    #[test]
    fn experience_classification_prefers_entry_signals() {
        assert_eq!(classify_experience_level("Software Intern"), Some("entry".into()));
        assert_eq!(classify_experience_level("Senior Engineer"), Some("senior".into()));
        assert_eq!(classify_experience_level("Engineer, 2-5 years"), Some("mid".into()));
        assert_eq!(classify_experience_level("Engineering Manager"), Some("lead".into()));
        assert_eq!(classify_experience_level("Software Engineer"), Some("mid".into()));
        assert_eq!(classify_experience_level("  "), None);
    }

    #[test]
    fn remote_detection_reads_both_fields() {
        assert!(detect_remote("Remote", ""));
        assert!(detect_remote("Austin, TX", "work from home friendly"));
        assert!(!detect_remote("Austin, TX", "onsite"));
    }

    #[test]
    fn payload_parsing_accepts_wrapped_and_bare_arrays() {
        let wrapped = json!({
            "jobs": [{
                "title": "Backend Engineer",
                "company": "Acme",
                "location": "Remote",
                "description": "Python and PostgreSQL services",
                "salary": "$120k-$150k",
                "url": "https://boards.example/1",
                "id": 42,
                "posted_at": "2025-08-01T00:00:00Z"
            }]
        });
        let jobs = parse_board_payload(&wrapped, "example");
        assert_eq!(jobs.len(), 1);

        let job = &jobs[0];
        assert_eq!(job.company, "Acme");
        assert_eq!(job.source_name, "boards:example");
        assert_eq!(job.salary_min, Some(120_000));
        assert!(job.remote_flag);
        assert!(job.technologies.contains("python"));
        assert_eq!(job.external_id.as_deref(), Some("42"));
        assert!(job.posted_at.is_some());

        let bare = json!([{"job_title": "Dev", "company_name": "Initech"}]);
        assert_eq!(parse_board_payload(&bare, "example").len(), 1);
    }

    #[test]
    fn items_missing_title_or_company_are_dropped() {
        let payload = json!({"jobs": [{"title": "No company"}, {"company": "No title"}]});
        assert!(parse_board_payload(&payload, "example").is_empty());
    }
}
