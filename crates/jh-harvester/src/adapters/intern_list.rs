//! External aggregator-site adapter (intern-list style): fetches category
//! pages and extracts "role @ company" entries. Internship-focused by
//! construction; deeper selector logic belongs to the site scrapers, not
//! the core.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use jh_common::session::{FocusArea, SourceCategory};
use jh_common::{JobPosting, JobType};

use crate::fetch::{FetchGate, Politeness};

use super::{AdapterError, SourceAdapter};

/// One category listing page.
#[derive(Debug, Clone, Copy)]
pub struct CategoryPage {
    pub name: &'static str,
    pub url: &'static str,
}

pub static CATEGORY_PAGES: &[CategoryPage] = &[
    CategoryPage {
        name: "engineering",
        url: "https://www.intern-list.com/?selectedKey=%F0%9F%9B%A0%EF%B8%8F%20Engineering%20and%20Development",
    },
    CategoryPage {
        name: "software",
        url: "https://www.intern-list.com/?selectedKey=%F0%9F%92%BB%20Software%20Engineering",
    },
];

static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]+href="(?P<href>[^"]+)"[^>]*>(?P<text>[^<]{6,160})</a>"#).unwrap()
});
static RE_ENTRY_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+(?:@|at)\s+").unwrap());

pub struct InternListAdapter {
    client: reqwest::Client,
    gate: Arc<dyn FetchGate>,
    politeness: Politeness,
}

impl InternListAdapter {
    pub fn new(client: reqwest::Client, gate: Arc<dyn FetchGate>, politeness: Politeness) -> Self {
        Self {
            client,
            gate,
            politeness,
        }
    }
}

#[async_trait]
impl SourceAdapter for InternListAdapter {
    fn name(&self) -> &str {
        "Intern-List.com"
    }

    fn category(&self) -> SourceCategory {
        SourceCategory::ExternalSite
    }

    async fn fetch(&self, _focus: &[FocusArea]) -> Result<Vec<JobPosting>, AdapterError> {
        let mut jobs = Vec::new();

        for page in CATEGORY_PAGES {
            if !self.gate.allow(page.url).await {
                warn!(category = page.name, "compliance gate refused listing page");
                continue;
            }

            self.politeness.pause().await;

            match self.client.get(page.url).send().await {
                Ok(response) if response.status().is_success() => {
                    let body = response.text().await?;
                    let parsed = parse_listing_page(&body, page.name);
                    debug!(category = page.name, count = parsed.len(), "parsed listing page");
                    jobs.extend(parsed);
                }
                Ok(response) => {
                    warn!(
                        category = page.name,
                        status = response.status().as_u16(),
                        "listing page rejected request"
                    );
                }
                Err(err) => {
                    warn!(category = page.name, error = %err, "listing page fetch failed");
                }
            }
        }

        Ok(jobs)
    }
}

/// Extract `Role @ Company` entries from a listing page.
pub fn parse_listing_page(body: &str, category: &str) -> Vec<JobPosting> {
    let mut jobs = Vec::new();

    for caps in RE_ANCHOR.captures_iter(body) {
        let text = caps
            .name("text")
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        let lowered = text.to_lowercase();
        if !lowered.contains("intern") {
            continue;
        }

        let mut parts = RE_ENTRY_SPLIT.splitn(text, 2);
        let title = parts.next().map(str::trim).unwrap_or_default();
        let company = parts.next().map(str::trim).unwrap_or_default();
        if title.is_empty() || company.is_empty() {
            continue;
        }

        let mut job = JobPosting::new(title, company);
        job.source_name = format!("intern_list:{category}");
        job.source_url = caps
            .name("href")
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        job.job_type = Some(JobType::Internship);
        job.experience_level = Some("entry".to_string());
        jobs.push(job);
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
<ul>
<li><a href="https://example.com/1">Software Engineering Intern @ Acme</a></li>
<li><a href="https://example.com/2">Data Science Intern at Globex</a></li>
<li><a href="https://example.com/3">Marketing Intern</a></li>
<li><a href="https://example.com/4">Senior Engineer @ Initech</a></li>
</ul>
"#;

    #[test]
    fn entries_with_companies_parse() {
        let jobs = parse_listing_page(LISTING, "software");
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].title, "Software Engineering Intern");
        assert_eq!(jobs[0].company, "Acme");
        assert_eq!(jobs[0].job_type, Some(JobType::Internship));
        assert_eq!(jobs[0].source_name, "intern_list:software");

        assert_eq!(jobs[1].company, "Globex");
    }

    #[test]
    fn entries_without_a_company_or_intern_marker_are_skipped() {
        let jobs = parse_listing_page(LISTING, "software");
        assert!(jobs.iter().all(|j| j.title.to_lowercase().contains("intern")));
        assert!(jobs.iter().all(|j| !j.company.is_empty()));
    }

    #[test]
    fn empty_page_yields_no_jobs() {
        assert!(parse_listing_page("<html></html>", "software").is_empty());
    }
}
