//! Direct company-site scraping: dispatches to the matching ATS client when
//! the platform has a JSON API, otherwise falls back to a shallow scan of
//! the careers page for job-shaped links.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use jh_common::session::FocusArea;
use jh_common::{JobPosting, JobType};

use crate::companies::CompanySource;
use crate::fetch::FetchGate;

use super::ats::{self, AtsKind};
use super::github::clean_markdown;
use super::{AdapterError, focus_applies};

static RE_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<a[^>]+href="(?P<href>[^"]+)"[^>]*>(?P<text>[^<]{4,120})</a>"#).unwrap()
});

pub struct CompanyScraper {
    client: reqwest::Client,
    gate: Arc<dyn FetchGate>,
}

impl CompanyScraper {
    pub fn new(client: reqwest::Client, gate: Arc<dyn FetchGate>) -> Self {
        Self { client, gate }
    }

    /// Scrape one company. Failures are isolated per company by the caller;
    /// this returns an error only for this company's fetch/parse.
    pub async fn scrape_company(
        &self,
        company: &CompanySource,
        focus: &[FocusArea],
    ) -> Result<Vec<JobPosting>, AdapterError> {
        if !self.gate.allow(company.careers_url).await {
            return Err(AdapterError::Blocked(company.careers_url.to_string()));
        }

        let mut jobs = match (company.ats, company.board_token) {
            (AtsKind::Greenhouse, Some(token)) => {
                ats::fetch_greenhouse(&self.client, company.name, token).await?
            }
            (AtsKind::Lever, Some(site)) => {
                ats::fetch_lever(&self.client, company.name, site).await?
            }
            _ => self.generic_scan(company).await?,
        };

        for job in &mut jobs {
            job.company_size = Some(company.size.to_string());
        }

        let before = jobs.len();
        let jobs = filter_by_focus(jobs, focus);
        debug!(
            company = company.key,
            ats = company.ats.as_str(),
            found = before,
            kept = jobs.len(),
            "scraped company careers"
        );
        Ok(jobs)
    }

    /// Shallow scan of a custom careers page: job-shaped anchors only.
    /// Selector-level extraction is deliberately out of scope.
    async fn generic_scan(&self, company: &CompanySource) -> Result<Vec<JobPosting>, AdapterError> {
        let response = self.client.get(company.careers_url).send().await?;
        if !response.status().is_success() {
            return Err(AdapterError::Status {
                status: response.status().as_u16(),
                url: company.careers_url.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(scan_page_for_jobs(&body, company))
    }
}

/// Pull job-shaped links out of raw careers-page HTML.
pub fn scan_page_for_jobs(body: &str, company: &CompanySource) -> Vec<JobPosting> {
    let mut jobs = Vec::new();

    for caps in RE_ANCHOR.captures_iter(body) {
        let href = caps.name("href").map(|m| m.as_str()).unwrap_or_default();
        let text = caps.name("text").map(|m| m.as_str()).unwrap_or_default();

        let href_lower = href.to_lowercase();
        if !["job", "career", "position", "opening"]
            .iter()
            .any(|hint| href_lower.contains(hint))
        {
            continue;
        }

        let title = clean_markdown(text.trim());
        if title.is_empty() || !title_matches_keywords(&title, company.search_keywords) {
            continue;
        }

        let mut job = JobPosting::new(title, company.name);
        job.source_name = format!("company:{}", company.key);
        job.source_url = absolutize(company.careers_url, href);
        job.job_type = JobType::from_text(&job.title);
        jobs.push(job);
    }

    jobs
}

fn title_matches_keywords(title: &str, keywords: &[&str]) -> bool {
    let lowered = title.to_lowercase();
    keywords
        .iter()
        .any(|keyword| lowered.contains(&keyword.to_lowercase()))
        // Single-word tokens from multi-word keywords would be too loose;
        // accept plain engineering titles as a floor instead.
        || lowered.contains("engineer")
        || lowered.contains("developer")
}

fn absolutize(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let trimmed_base = base.trim_end_matches('/');
    if let Some(root_relative) = href.strip_prefix('/') {
        // Keep scheme://host only.
        if let Some(scheme_end) = trimmed_base.find("://") {
            if let Some(host_end) = trimmed_base[scheme_end + 3..].find('/') {
                return format!(
                    "{}/{}",
                    &trimmed_base[..scheme_end + 3 + host_end],
                    root_relative
                );
            }
        }
        return format!("{trimmed_base}/{root_relative}");
    }
    format!("{trimmed_base}/{href}")
}

/// Keep only postings matching the run's focus areas. A run focused on
/// internships drops everything that is not internship-shaped; the
/// catch-all keeps the full set.
pub fn filter_by_focus(jobs: Vec<JobPosting>, focus: &[FocusArea]) -> Vec<JobPosting> {
    if focus.is_empty() || focus.contains(&FocusArea::All) {
        return jobs;
    }

    jobs.into_iter()
        .filter(|job| {
            let title = job.title.to_lowercase();
            if focus_applies(focus, FocusArea::Internship)
                && (job.job_type == Some(JobType::Internship) || title.contains("intern"))
            {
                return true;
            }
            if focus_applies(focus, FocusArea::NewGrad)
                && ["new grad", "graduate", "university", "entry level"]
                    .iter()
                    .any(|term| title.contains(term))
            {
                return true;
            }
            if focus_applies(focus, FocusArea::Remote) && job.remote_flag {
                return true;
            }
            if focus_applies(focus, FocusArea::H1b) {
                let description = job.description.as_deref().unwrap_or("").to_lowercase();
                if description.contains("h1b") || description.contains("visa") {
                    return true;
                }
            }
            false
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companies::COMPANY_SOURCES;

    fn sample_company() -> &'static CompanySource {
        &COMPANY_SOURCES[0] // google, custom ATS
    }

    const CAREERS_PAGE: &str = r#"
<html><body>
<a href="/jobs/results/123-software-engineer">Software Engineer, Backend</a>
<a href="/jobs/results/456-swe-intern">Software Engineering Intern</a>
<a href="/about">About us</a>
<a href="https://careers.google.com/jobs/results/789">Sales Associate</a>
</body></html>
"#;

    #[test]
    fn page_scan_keeps_job_shaped_keyword_anchors() {
        let jobs = scan_page_for_jobs(CAREERS_PAGE, sample_company());
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].title, "Software Engineer, Backend");
        assert!(jobs[0].source_url.starts_with("https://careers.google.com/"));
        assert_eq!(jobs[1].job_type, Some(JobType::Internship));
    }

    #[test]
    fn absolutize_handles_relative_and_absolute() {
        assert_eq!(
            absolutize("https://careers.acme.dev/", "/jobs/1"),
            "https://careers.acme.dev/jobs/1"
        );
        assert_eq!(
            absolutize("https://careers.acme.dev/search", "https://other.dev/x"),
            "https://other.dev/x"
        );
        assert_eq!(
            absolutize("https://careers.acme.dev", "jobs/2"),
            "https://careers.acme.dev/jobs/2"
        );
    }

    #[test]
    fn focus_filter_keeps_matching_titles() {
        let mut intern = JobPosting::new("Software Engineering Intern", "Acme");
        intern.job_type = Some(JobType::Internship);
        let senior = JobPosting::new("Senior Software Engineer", "Acme");
        let mut remote = JobPosting::new("Platform Engineer", "Acme");
        remote.remote_flag = true;

        let jobs = vec![intern.clone(), senior.clone(), remote.clone()];

        let intern_only = filter_by_focus(jobs.clone(), &[FocusArea::Internship]);
        assert_eq!(intern_only.len(), 1);
        assert_eq!(intern_only[0].title, intern.title);

        let remote_only = filter_by_focus(jobs.clone(), &[FocusArea::Remote]);
        assert_eq!(remote_only.len(), 1);
        assert_eq!(remote_only[0].title, remote.title);

        let all = filter_by_focus(jobs, &[FocusArea::All]);
        assert_eq!(all.len(), 3);
    }
}
