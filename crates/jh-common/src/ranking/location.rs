use crate::terms::location_synonyms;
use crate::{fuzzy, JobPosting, UserPreferences};

use super::FactorScore;

/// Similarity (0–1) above which a fuzzy location match counts.
const FUZZY_LOCATION_THRESHOLD: f64 = 0.8;

/// Score granted when the job location names a known synonym of a
/// preferred location rather than the location itself.
const SYNONYM_MATCH_SCORE: f64 = 0.9;

/// Location factor: remote acceptance first, then the best match across the
/// preferred locations (exact, fuzzy partial, synonym table).
pub(super) fn evaluate(job: &JobPosting, preferences: &UserPreferences) -> FactorScore {
    let score = location_score(job, preferences);
    FactorScore {
        score,
        explanation: explain(score).to_string(),
    }
}

fn location_score(job: &JobPosting, preferences: &UserPreferences) -> f64 {
    let job_location = match &job.location {
        Some(location) if !location.trim().is_empty() => location.trim().to_lowercase(),
        _ => return 0.5,
    };

    if preferences.remote_acceptable && job.remote_flag {
        return 1.0;
    }

    let mut best = 0.0_f64;
    for preferred in &preferences.preferred_locations {
        let preferred = preferred.trim().to_lowercase();
        if preferred.is_empty() {
            continue;
        }

        if preferred == job_location {
            return 1.0;
        }

        let similarity = fuzzy::partial_ratio(&preferred, &job_location) / 100.0;
        if similarity > FUZZY_LOCATION_THRESHOLD {
            best = best.max(similarity);
        }

        if let Some(synonyms) = location_synonyms(&preferred) {
            if synonyms.iter().any(|synonym| job_location.contains(synonym)) {
                best = best.max(SYNONYM_MATCH_SCORE);
            }
        }
    }

    best
}

fn explain(score: f64) -> &'static str {
    if score > 0.9 {
        "Perfect location match or remote work available"
    } else if score > 0.6 {
        "Good location match in preferred area"
    } else if score > 0.3 {
        "Acceptable location but not ideal"
    } else {
        "Location doesn't match preferences"
    }
}
