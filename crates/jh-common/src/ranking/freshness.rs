use chrono::{DateTime, Utc};

use crate::JobPosting;

use super::FactorScore;

/// Freshness factor: bucketed by posting age in days relative to the
/// reference time supplied by the engine (frozen once per ranking batch).
pub(super) fn evaluate(job: &JobPosting, reference: DateTime<Utc>) -> FactorScore {
    let score = freshness_score(job, reference);
    FactorScore {
        score,
        explanation: explain(score).to_string(),
    }
}

fn freshness_score(job: &JobPosting, reference: DateTime<Utc>) -> f64 {
    let posted_at = match job.posted_at {
        Some(posted_at) => posted_at,
        None => return 0.5,
    };

    let days_old = (reference - posted_at).num_days();
    if days_old <= 1 {
        1.0
    } else if days_old <= 7 {
        0.9
    } else if days_old <= 30 {
        0.7
    } else if days_old <= 60 {
        0.5
    } else {
        0.2
    }
}

fn explain(score: f64) -> &'static str {
    if score > 0.8 {
        "Recently posted job (within a week)"
    } else if score > 0.5 {
        "Moderately fresh posting"
    } else {
        "Older job posting"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn job_posted(days_ago: Option<i64>, reference: DateTime<Utc>) -> JobPosting {
        let mut job = JobPosting::new("Engineer", "Acme");
        job.posted_at = days_ago.map(|days| reference - Duration::days(days));
        job
    }

    #[test]
    fn missing_date_is_neutral() {
        let now = Utc::now();
        assert_eq!(freshness_score(&job_posted(None, now), now), 0.5);
    }

    #[test]
    fn age_buckets_step_down() {
        let now = Utc::now();
        assert_eq!(freshness_score(&job_posted(Some(0), now), now), 1.0);
        assert_eq!(freshness_score(&job_posted(Some(1), now), now), 1.0);
        assert_eq!(freshness_score(&job_posted(Some(5), now), now), 0.9);
        assert_eq!(freshness_score(&job_posted(Some(20), now), now), 0.7);
        assert_eq!(freshness_score(&job_posted(Some(45), now), now), 0.5);
        assert_eq!(freshness_score(&job_posted(Some(90), now), now), 0.2);
    }

    #[test]
    fn score_depends_only_on_the_reference_time() {
        let reference = Utc::now();
        let job = job_posted(Some(3), reference);
        let a = freshness_score(&job, reference);
        let b = freshness_score(&job, reference);
        assert_eq!(a, b);

        // A later reference ages the posting.
        let later = reference + Duration::days(40);
        assert!(freshness_score(&job, later) < a);
    }
}
