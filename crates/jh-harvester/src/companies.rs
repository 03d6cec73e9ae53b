//! Static table of directly-scraped companies: careers URL, ATS platform,
//! filter keywords, and scheduling hints for the coordinator.

use jh_common::session::FocusArea;

use crate::adapters::ats::AtsKind;

#[derive(Debug, Clone, Copy)]
pub struct CompanySource {
    pub key: &'static str,
    pub name: &'static str,
    pub careers_url: &'static str,
    pub ats: AtsKind,
    /// Board token / site slug for ATS platforms with a JSON API.
    pub board_token: Option<&'static str>,
    pub search_keywords: &'static [&'static str],
    pub locations: &'static [&'static str],
    pub size: &'static str,
    pub priority: bool,
    pub internship_focused: bool,
}

pub static COMPANY_SOURCES: &[CompanySource] = &[
    CompanySource {
        key: "google",
        name: "Google",
        careers_url: "https://careers.google.com/jobs/results/",
        ats: AtsKind::Custom,
        board_token: None,
        search_keywords: &["software engineer", "intern", "new grad", "swe", "backend", "frontend"],
        locations: &["Mountain View", "San Francisco", "Seattle", "New York", "Austin"],
        size: "enterprise",
        priority: true,
        internship_focused: true,
    },
    CompanySource {
        key: "apple",
        name: "Apple",
        careers_url: "https://jobs.apple.com/en-us/search",
        ats: AtsKind::Custom,
        board_token: None,
        search_keywords: &["software engineer", "intern", "ios", "macos", "swift"],
        locations: &["Cupertino", "Austin", "Seattle"],
        size: "enterprise",
        priority: true,
        internship_focused: false,
    },
    CompanySource {
        key: "amazon",
        name: "Amazon",
        careers_url: "https://amazon.jobs/en/",
        ats: AtsKind::Custom,
        board_token: None,
        search_keywords: &["software engineer", "intern", "sde", "aws", "backend"],
        locations: &["Seattle", "Bellevue", "Austin", "New York", "Boston"],
        size: "enterprise",
        priority: true,
        internship_focused: true,
    },
    CompanySource {
        key: "meta",
        name: "Meta",
        careers_url: "https://www.metacareers.com/jobs/",
        ats: AtsKind::Custom,
        board_token: None,
        search_keywords: &["software engineer", "intern", "frontend", "backend", "mobile"],
        locations: &["Menlo Park", "Seattle", "New York", "Austin"],
        size: "enterprise",
        priority: false,
        internship_focused: false,
    },
    CompanySource {
        key: "netflix",
        name: "Netflix",
        careers_url: "https://boards.greenhouse.io/netflix",
        ats: AtsKind::Greenhouse,
        board_token: Some("netflix"),
        search_keywords: &["software engineer", "intern", "backend", "streaming"],
        locations: &["Los Gatos", "Los Angeles"],
        size: "enterprise",
        priority: false,
        internship_focused: false,
    },
    CompanySource {
        key: "microsoft",
        name: "Microsoft",
        careers_url: "https://careers.microsoft.com/us/en/",
        ats: AtsKind::Custom,
        board_token: None,
        search_keywords: &["software engineer", "intern", "azure", "backend", "frontend"],
        locations: &["Redmond", "Seattle", "San Francisco", "Austin"],
        size: "enterprise",
        priority: true,
        internship_focused: true,
    },
    CompanySource {
        key: "stripe",
        name: "Stripe",
        careers_url: "https://boards.greenhouse.io/stripe",
        ats: AtsKind::Greenhouse,
        board_token: Some("stripe"),
        search_keywords: &["software engineer", "intern", "infrastructure", "payments"],
        locations: &["San Francisco", "Seattle", "New York"],
        size: "mid-size",
        priority: true,
        internship_focused: true,
    },
    CompanySource {
        key: "airbnb",
        name: "Airbnb",
        careers_url: "https://boards.greenhouse.io/airbnb",
        ats: AtsKind::Greenhouse,
        board_token: Some("airbnb"),
        search_keywords: &["software engineer", "intern", "backend", "data"],
        locations: &["San Francisco", "Seattle"],
        size: "mid-size",
        priority: false,
        internship_focused: false,
    },
    CompanySource {
        key: "databricks",
        name: "Databricks",
        careers_url: "https://boards.greenhouse.io/databricks",
        ats: AtsKind::Greenhouse,
        board_token: Some("databricks"),
        search_keywords: &["software engineer", "intern", "spark", "platform"],
        locations: &["San Francisco", "Seattle", "Mountain View"],
        size: "mid-size",
        priority: false,
        internship_focused: true,
    },
    CompanySource {
        key: "plaid",
        name: "Plaid",
        careers_url: "https://jobs.lever.co/plaid",
        ats: AtsKind::Lever,
        board_token: Some("plaid"),
        search_keywords: &["software engineer", "intern", "api", "infrastructure"],
        locations: &["San Francisco", "New York"],
        size: "startup",
        priority: false,
        internship_focused: false,
    },
];

pub fn all_companies() -> &'static [CompanySource] {
    COMPANY_SOURCES
}

pub fn high_priority_companies() -> Vec<&'static CompanySource> {
    COMPANY_SOURCES.iter().filter(|c| c.priority).collect()
}

pub fn internship_focused_companies() -> Vec<&'static CompanySource> {
    COMPANY_SOURCES.iter().filter(|c| c.internship_focused).collect()
}

/// The company set for one run: everything, or the priority subset widened
/// with internship-focused companies when the run targets internships.
pub fn companies_for_run(priority_only: bool, focus: &[FocusArea]) -> Vec<&'static CompanySource> {
    if !priority_only {
        return COMPANY_SOURCES.iter().collect();
    }

    let mut selected = high_priority_companies();
    if focus.contains(&FocusArea::Internship) {
        for company in internship_focused_companies() {
            if !selected.iter().any(|c| c.key == company.key) {
                selected.push(company);
            }
        }
    }
    selected
}
