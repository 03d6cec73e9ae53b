use crate::{JobPosting, UserPreferences};

use super::FactorScore;

const BASE_SCORE: f64 = 0.7;
const SIZE_PREFERENCE_BONUS: f64 = 0.3;

/// Company factor: exclusion list short-circuits everything, then a bonus
/// when the company-size category is among the preferred types.
pub(super) fn evaluate(job: &JobPosting, preferences: &UserPreferences) -> FactorScore {
    let score = company_score(job, preferences);
    FactorScore {
        score,
        explanation: explain(score).to_string(),
    }
}

fn company_score(job: &JobPosting, preferences: &UserPreferences) -> f64 {
    let company = job.company.to_lowercase();
    if !company.is_empty() {
        for excluded in &preferences.excluded_companies {
            let excluded = excluded.trim().to_lowercase();
            if !excluded.is_empty() && company.contains(&excluded) {
                return 0.0;
            }
        }
    }

    let mut score = BASE_SCORE;

    if let Some(size) = &job.company_size {
        let size = size.trim().to_lowercase();
        let preferred = preferences
            .preferred_company_types
            .iter()
            .any(|kind| kind.trim().to_lowercase() == size);
        if preferred {
            score += SIZE_PREFERENCE_BONUS;
        }
    }

    score.min(1.0)
}

fn explain(score: f64) -> &'static str {
    if score == 0.0 {
        "Company is in your exclusion list"
    } else if score > 0.8 {
        "Company type matches your preferences"
    } else {
        "Neutral company rating"
    }
}
