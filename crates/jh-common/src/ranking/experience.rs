use crate::terms::{experience_synonyms, EXPERIENCE_HIERARCHY};
use crate::{fuzzy, JobPosting, UserPreferences};

use super::FactorScore;

/// Similarity (0–100) above which an experience synonym counts as present.
const SYNONYM_FUZZY_THRESHOLD: f64 = 80.0;

/// Experience factor: exact label match, then synonym families, then
/// adjacency on the entry → mid → senior → lead progression.
pub(super) fn evaluate(job: &JobPosting, preferences: &UserPreferences) -> FactorScore {
    let score = experience_score(job, preferences);
    FactorScore {
        score,
        explanation: explain(score).to_string(),
    }
}

fn experience_score(job: &JobPosting, preferences: &UserPreferences) -> f64 {
    let job_exp = match &job.experience_level {
        Some(level) if !level.trim().is_empty() => level.trim().to_lowercase(),
        _ => return 0.7,
    };
    if preferences.experience_levels.is_empty() {
        return 0.7;
    }

    for user_level in &preferences.experience_levels {
        if user_level.trim().eq_ignore_ascii_case(&job_exp) {
            return 1.0;
        }
    }

    for user_level in &preferences.experience_levels {
        if let Some(synonyms) = experience_synonyms(&user_level.trim().to_lowercase()) {
            for synonym in synonyms {
                if job_exp.contains(synonym)
                    || fuzzy::partial_ratio(synonym, &job_exp) > SYNONYM_FUZZY_THRESHOLD
                {
                    return 0.9;
                }
            }
        }
    }

    let job_level_idx = EXPERIENCE_HIERARCHY
        .iter()
        .position(|level| job_exp.contains(level));

    if let Some(job_idx) = job_level_idx {
        for user_level in &preferences.experience_levels {
            let user_level = user_level.trim().to_lowercase();
            if let Some(user_idx) = EXPERIENCE_HIERARCHY
                .iter()
                .position(|level| *level == user_level)
            {
                let distance = job_idx.abs_diff(user_idx);
                if distance <= 1 {
                    return (1.0 - 0.3 * distance as f64).max(0.5);
                }
            }
        }
    }

    0.3
}

fn explain(score: f64) -> &'static str {
    if score > 0.8 {
        "Experience requirements match your level perfectly"
    } else if score > 0.6 {
        "Experience requirements are close to your level"
    } else {
        "Experience requirements don't align well"
    }
}
