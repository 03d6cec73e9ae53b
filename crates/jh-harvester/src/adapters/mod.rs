//! Source adapters: every acquisition source sits behind one interface and
//! fails independently.
//!
//! Contract: adapters return zero or more normalized `JobPosting` records;
//! an empty list is success-with-nothing-found. `AdapterError` is reserved
//! for transport and parse catastrophes, and never escapes the coordinator.

pub mod ats;
pub mod boards;
pub mod company;
pub mod github;
pub mod intern_list;

use async_trait::async_trait;
use thiserror::Error;

use jh_common::session::{FocusArea, SourceCategory};
use jh_common::JobPosting;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
    #[error("failed to parse source payload: {0}")]
    Parse(String),
    #[error("fetch blocked by compliance gate: {0}")]
    Blocked(String),
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Display name recorded in per-source outcomes.
    fn name(&self) -> &str;

    fn category(&self) -> SourceCategory;

    /// Fetch and normalize postings for the requested focus areas.
    async fn fetch(&self, focus: &[FocusArea]) -> Result<Vec<JobPosting>, AdapterError>;
}

/// Whether a focus selection includes `target` (or the catch-all).
pub(crate) fn focus_applies(focus: &[FocusArea], target: FocusArea) -> bool {
    focus.is_empty() || focus.contains(&FocusArea::All) || focus.contains(&target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_applies_honors_all_and_empty() {
        assert!(focus_applies(&[], FocusArea::Internship));
        assert!(focus_applies(&[FocusArea::All], FocusArea::H1b));
        assert!(focus_applies(&[FocusArea::Internship], FocusArea::Internship));
        assert!(!focus_applies(&[FocusArea::Remote], FocusArea::Internship));
    }
}
