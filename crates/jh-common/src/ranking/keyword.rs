use crate::terms::keyword_matches;
use crate::{JobPosting, UserPreferences};

use super::{FactorScore, RankingConfig};

/// Keyword factor: required-keyword coverage blended with weighted preferred
/// coverage, a technology-stack bonus, and a flat penalty per matched
/// excluded keyword.
pub(super) fn evaluate(
    job: &JobPosting,
    preferences: &UserPreferences,
    config: &RankingConfig,
) -> FactorScore {
    let corpus = job.corpus();

    let required_score = if preferences.required_keywords.is_empty() {
        1.0
    } else {
        let matches = preferences
            .required_keywords
            .iter()
            .filter(|keyword| keyword_matches(keyword, &corpus))
            .count();
        (matches as f64 / preferences.required_keywords.len() as f64).min(1.0)
    };

    let mut preferred_score = 0.0;
    let mut total_weight = 0.0;
    for keyword in &preferences.preferred_keywords {
        let weight = preferences
            .keyword_weights
            .get(&keyword.to_lowercase())
            .copied()
            .unwrap_or(1.0);
        total_weight += weight;
        if keyword_matches(keyword, &corpus) {
            preferred_score += weight;
        }
    }
    if total_weight > 0.0 {
        preferred_score /= total_weight;
    }

    let excluded_penalty = preferences
        .excluded_keywords
        .iter()
        .filter(|keyword| keyword_matches(keyword, &corpus))
        .count() as f64
        * config.excluded_keyword_penalty;

    let mut tech_bonus = 0.0;
    for tech in &preferences.preferred_technologies {
        let found = job
            .technologies
            .iter()
            .any(|declared| keyword_matches(tech, &declared.to_lowercase()));
        if found {
            tech_bonus += config.tech_stack_bonus;
        }
    }

    let blended = required_score * config.required_blend + preferred_score * config.preferred_blend;
    let score = (blended + tech_bonus - excluded_penalty).clamp(0.0, 1.0);

    FactorScore {
        score,
        explanation: explain(score).to_string(),
    }
}

fn explain(score: f64) -> &'static str {
    if score > 0.8 {
        "Excellent match for required and preferred keywords"
    } else if score > 0.6 {
        "Good keyword match with some preferred technologies"
    } else if score > 0.4 {
        "Moderate keyword match, missing some preferred skills"
    } else {
        "Poor keyword match or contains excluded terms"
    }
}
