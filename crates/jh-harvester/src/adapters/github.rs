//! GitHub-hosted job list adapter: fetches curated repository READMEs and
//! parses their markdown job tables and bullet lists.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use jh_common::session::{FocusArea, SourceCategory};
use jh_common::{JobPosting, JobType};

use crate::fetch::{FetchGate, Politeness};

use super::{focus_applies, AdapterError, SourceAdapter};

/// One curated repository of job listings.
#[derive(Debug, Clone, Copy)]
pub struct GithubRepoSource {
    pub key: &'static str,
    pub repo: &'static str,
    pub description: &'static str,
    pub focus: FocusArea,
}

/// Curated list repositories, refreshed daily-to-weekly upstream.
pub static REPO_SOURCES: &[GithubRepoSource] = &[
    GithubRepoSource {
        key: "daily_h1b",
        repo: "jobright-ai/Daily-H1B-Jobs-In-Tech",
        description: "Daily H1B sponsorship jobs in tech",
        focus: FocusArea::H1b,
    },
    GithubRepoSource {
        key: "new_grad_2025",
        repo: "jobright-ai/2025-Software-Engineer-New-Grad",
        description: "Software engineer new grad positions",
        focus: FocusArea::NewGrad,
    },
    GithubRepoSource {
        key: "internship_2025",
        repo: "jobright-ai/2025-Engineer-Internship",
        description: "Engineering internship positions",
        focus: FocusArea::Internship,
    },
    GithubRepoSource {
        key: "simplify_internships",
        repo: "SimplifyJobs/Summer2026-Internships",
        description: "Summer internship positions",
        focus: FocusArea::Internship,
    },
    GithubRepoSource {
        key: "simplify_new_grad",
        repo: "SimplifyJobs/New-Grad-Positions",
        description: "New grad positions collection",
        focus: FocusArea::NewGrad,
    },
];

static RE_MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static RE_LINK_TARGET: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\(([^)]+)\)").unwrap());
static RE_BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static RE_ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static RE_LIST_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[-*]\s*\[(?P<company>[^\]]+)\]\((?P<url>[^)]+)\)\s*[-–]\s*(?P<title>[^-–\n]+?)(?:\s*[-–]\s*(?P<location>.+))?$")
        .unwrap()
});

pub struct GithubListAdapter {
    client: reqwest::Client,
    token: Option<String>,
    gate: Arc<dyn FetchGate>,
    politeness: Politeness,
}

impl GithubListAdapter {
    pub fn new(
        client: reqwest::Client,
        token: Option<String>,
        gate: Arc<dyn FetchGate>,
        politeness: Politeness,
    ) -> Self {
        Self {
            client,
            token,
            gate,
            politeness,
        }
    }

    async fn fetch_readme(&self, repo: &str) -> Result<String, AdapterError> {
        let api_url = format!("https://api.github.com/repos/{repo}/readme");
        let mut request = self
            .client
            .get(&api_url)
            .header("Accept", "application/vnd.github.raw");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                return Ok(response.text().await?);
            }
            Ok(response) => {
                debug!(repo, status = response.status().as_u16(), "api readme fetch failed, trying raw");
            }
            Err(err) => {
                debug!(repo, error = %err, "api readme fetch failed, trying raw");
            }
        }

        // Raw fallback: default branch is main for these repos, with master
        // as a legacy fallback.
        for branch in ["main", "master"] {
            let raw_url = format!("https://raw.githubusercontent.com/{repo}/{branch}/README.md");
            let response = self.client.get(&raw_url).send().await?;
            if response.status().is_success() {
                return Ok(response.text().await?);
            }
        }

        Err(AdapterError::Status {
            status: 404,
            url: api_url,
        })
    }
}

#[async_trait]
impl SourceAdapter for GithubListAdapter {
    fn name(&self) -> &str {
        "GitHub Repositories"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::RepoList
    }

    async fn fetch(&self, focus: &[FocusArea]) -> Result<Vec<JobPosting>, AdapterError> {
        let mut jobs = Vec::new();

        for source in REPO_SOURCES {
            if !focus_applies(focus, source.focus) {
                continue;
            }

            let repo_url = format!("https://github.com/{}", source.repo);
            if !self.gate.allow(&repo_url).await {
                warn!(repo = source.repo, "compliance gate refused repository fetch");
                continue;
            }

            self.politeness.pause().await;

            match self.fetch_readme(source.repo).await {
                Ok(content) => {
                    let parsed = parse_markdown_jobs(&content, source);
                    debug!(repo = source.repo, count = parsed.len(), "parsed repository listing");
                    jobs.extend(parsed);
                }
                Err(err) => {
                    // One repository failing never sinks the others.
                    warn!(repo = source.repo, error = %err, "failed to fetch repository listing");
                }
            }
        }

        Ok(jobs)
    }
}

/// Parse every job in a repository README: markdown tables first, then
/// bullet-list entries.
pub fn parse_markdown_jobs(content: &str, source: &GithubRepoSource) -> Vec<JobPosting> {
    let mut jobs = parse_table_rows(content, source);
    jobs.extend(parse_list_lines(content, source));
    jobs
}

fn is_separator_row(line: &str) -> bool {
    line.starts_with('|') && line.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

fn is_header_row(line: &str) -> bool {
    if !line.contains('|') {
        return false;
    }
    let lowered = line.to_lowercase();
    ["company", "position", "location", "job title", "role"]
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

fn parse_table_rows(content: &str, source: &GithubRepoSource) -> Vec<JobPosting> {
    let mut jobs = Vec::new();
    let mut in_table = false;
    let mut headers: Vec<String> = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        if !in_table && is_header_row(line) {
            headers = line
                .split('|')
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .map(|cell| cell.to_lowercase())
                .collect();
            in_table = true;
            continue;
        }

        if in_table {
            if is_separator_row(line) {
                continue;
            }
            if !line.starts_with('|') {
                in_table = false;
                headers.clear();
                continue;
            }
            if let Some(job) = parse_table_row(line, &headers, source) {
                jobs.push(job);
            }
        }
    }

    jobs
}

fn parse_table_row(
    line: &str,
    headers: &[String],
    source: &GithubRepoSource,
) -> Option<JobPosting> {
    let cells: Vec<&str> = line
        .split('|')
        .map(str::trim)
        .skip(1) // leading empty cell before the first pipe
        .collect();
    if cells.len() < headers.len() {
        return None;
    }

    let mut company = String::new();
    let mut title = String::new();
    let mut location = String::new();
    let mut link = None;
    let mut date_text = String::new();
    let mut level_text = String::new();
    let mut h1b_status = String::new();

    for (header, cell) in headers.iter().zip(&cells) {
        let cleaned = clean_markdown(cell);
        if header.contains("company") {
            company = cleaned;
        } else if ["position", "title", "job", "role"]
            .iter()
            .any(|word| header.contains(word))
        {
            title = cleaned;
            if link.is_none() {
                link = extract_link(cell);
            }
        } else if header.contains("location") {
            location = cleaned;
        } else if header.contains("link") || header.contains("apply") {
            link = extract_link(cell).or(link);
        } else if header.contains("date") || header.contains("age") {
            date_text = cleaned;
        } else if header.contains("level") {
            level_text = cleaned;
        } else if header.contains("h1b") {
            h1b_status = cleaned;
        }
    }

    if company.is_empty() || title.is_empty() {
        return None;
    }

    let mut job = JobPosting::new(title.clone(), company);
    job.source_name = format!("github:{}", source.key);
    job.source_url = link.unwrap_or_else(|| format!("https://github.com/{}", source.repo));
    if !location.is_empty() {
        job.remote_flag = location.to_lowercase().contains("remote");
        job.location = Some(location);
    }
    job.job_type = Some(match source.focus {
        FocusArea::Internship => JobType::Internship,
        _ => JobType::FullTime,
    });
    job.experience_level = map_experience_level(&level_text)
        .or_else(|| map_experience_level(&title))
        .or(Some("entry".to_string()));
    job.posted_at = parse_posted_date(&date_text);
    if !h1b_status.is_empty() {
        job.description = Some(format!("H1B status: {h1b_status}"));
    }

    Some(job)
}

fn parse_list_lines(content: &str, source: &GithubRepoSource) -> Vec<JobPosting> {
    RE_LIST_LINE
        .captures_iter(content)
        .filter_map(|caps| {
            let company = clean_markdown(caps.name("company")?.as_str());
            let title = clean_markdown(caps.name("title")?.as_str());
            if company.is_empty() || title.is_empty() {
                return None;
            }

            let mut job = JobPosting::new(title, company);
            job.source_name = format!("github:{}", source.key);
            job.source_url = caps
                .name("url")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            if let Some(location) = caps.name("location") {
                let location = clean_markdown(location.as_str());
                if !location.is_empty() {
                    job.remote_flag = location.to_lowercase().contains("remote");
                    job.location = Some(location);
                }
            }
            job.job_type = Some(match source.focus {
                FocusArea::Internship => JobType::Internship,
                _ => JobType::FullTime,
            });
            job.experience_level = Some("entry".to_string());
            Some(job)
        })
        .collect()
}

/// Strip markdown decoration, keeping link text.
pub fn clean_markdown(text: &str) -> String {
    let text = RE_MARKDOWN_LINK.replace_all(text, "$1");
    let text = RE_BOLD.replace_all(&text, "$1");
    let text = RE_ITALIC.replace_all(&text, "$1");
    text.replace(['`', '#'], "").trim().to_string()
}

/// First URL target inside a markdown table cell.
pub fn extract_link(cell: &str) -> Option<String> {
    RE_LINK_TARGET
        .captures(cell)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Map free level text onto the entry/mid/senior/lead progression.
pub fn map_experience_level(text: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if ["intern", "entry", "junior", "new grad", "graduate"]
        .iter()
        .any(|word| lowered.contains(word))
    {
        Some("entry".to_string())
    } else if ["principal", "staff", "architect", "director"]
        .iter()
        .any(|word| lowered.contains(word))
    {
        Some("lead".to_string())
    } else if ["senior", "sr.", "lead"].iter().any(|word| lowered.contains(word)) {
        Some("senior".to_string())
    } else if ["mid", "intermediate"].iter().any(|word| lowered.contains(word)) {
        Some("mid".to_string())
    } else {
        None
    }
}

/// Parse the handful of date formats these lists actually use.
pub fn parse_posted_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn internship_source() -> &'static GithubRepoSource {
        &REPO_SOURCES[3] // simplify_internships
    }

    fn h1b_source() -> &'static GithubRepoSource {
        &REPO_SOURCES[0]
    }

    const SIMPLIFY_TABLE: &str = r"
# Summer Internships

| Company | Role | Location | Application/Link | Date Posted |
| ------- | ---- | -------- | ---------------- | ----------- |
| **[Acme](https://acme.dev)** | Software Engineering Intern | Austin, TX | [Apply](https://acme.dev/jobs/1) | 2025-08-01 |
| Initech | Backend Intern | Remote | [Apply](https://initech.com/jobs/2) | 2025-07-15 |
| Hooli | | Palo Alto | | |
";

    #[test]
    fn parses_simplify_style_tables() {
        let jobs = parse_markdown_jobs(SIMPLIFY_TABLE, internship_source());
        assert_eq!(jobs.len(), 2);

        let first = &jobs[0];
        assert_eq!(first.company, "Acme");
        assert_eq!(first.title, "Software Engineering Intern");
        assert_eq!(first.location.as_deref(), Some("Austin, TX"));
        assert_eq!(first.source_url, "https://acme.dev/jobs/1");
        assert_eq!(first.job_type, Some(JobType::Internship));
        assert_eq!(first.experience_level.as_deref(), Some("entry"));
        assert!(first.posted_at.is_some());

        let second = &jobs[1];
        assert!(second.remote_flag);
    }

    #[test]
    fn parses_h1b_tables_with_status_column() {
        let content = r"
| Company | Job Title | Location | H1B status | Link | Date Posted |
| --- | --- | --- | --- | --- | --- |
| Globex | Senior Data Engineer | New York, NY | sponsors | [Apply](https://globex.com/jobs/9) | 08/01/2025 |
";
        let jobs = parse_markdown_jobs(content, h1b_source());
        assert_eq!(jobs.len(), 1);

        let job = &jobs[0];
        assert_eq!(job.company, "Globex");
        assert_eq!(job.experience_level.as_deref(), Some("senior"));
        assert_eq!(job.description.as_deref(), Some("H1B status: sponsors"));
        assert_eq!(job.job_type, Some(JobType::FullTime));
        assert!(job.posted_at.is_some());
    }

    #[test]
    fn parses_bullet_list_entries() {
        let content = "\n- [Acme](https://acme.dev/3) - Platform Intern - Seattle, WA\n* [Globex](https://globex.com/4) - Data Intern\n";
        let jobs = parse_list_lines(content, internship_source());
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].company, "Acme");
        assert_eq!(jobs[0].title, "Platform Intern");
        assert_eq!(jobs[0].location.as_deref(), Some("Seattle, WA"));
        assert_eq!(jobs[1].location, None);
    }

    #[test]
    fn short_rows_are_skipped() {
        let content = "| Company | Role | Location |\n| --- | --- | --- |\n| OnlyCompany |\n";
        assert!(parse_table_rows(content, internship_source()).is_empty());
    }

    #[test]
    fn clean_markdown_strips_decoration() {
        assert_eq!(clean_markdown("**[Acme](https://acme.dev)**"), "Acme");
        assert_eq!(clean_markdown("`code` # heading"), "code  heading");
        assert_eq!(clean_markdown("plain"), "plain");
    }

    #[test]
    fn extract_link_pulls_first_target() {
        assert_eq!(
            extract_link("[Apply](https://acme.dev/jobs/1)"),
            Some("https://acme.dev/jobs/1".to_string())
        );
        assert_eq!(extract_link("no link"), None);
    }

    #[test]
    fn experience_mapping_recognizes_families() {
        assert_eq!(map_experience_level("Intern"), Some("entry".into()));
        assert_eq!(map_experience_level("New Grad"), Some("entry".into()));
        assert_eq!(map_experience_level("Senior SWE"), Some("senior".into()));
        assert_eq!(map_experience_level("Principal Engineer"), Some("lead".into()));
        assert_eq!(map_experience_level("Mid-level"), Some("mid".into()));
        assert_eq!(map_experience_level("Wizard"), None);
        assert_eq!(map_experience_level(""), None);
    }

    #[test]
    fn date_parsing_accepts_common_formats() {
        assert!(parse_posted_date("2025-08-01").is_some());
        assert!(parse_posted_date("08/01/2025").is_some());
        assert!(parse_posted_date("August 1, 2025").is_some());
        assert!(parse_posted_date("yesterday").is_none());
        assert!(parse_posted_date("").is_none());
    }
}
