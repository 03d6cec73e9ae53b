use crate::{JobPosting, SalaryPeriod, UserPreferences};

use super::{FactorScore, RankingConfig};

/// Hours per year used to annualize hourly pay (40 hours x 52 weeks).
const HOURS_PER_YEAR: f64 = 2080.0;

/// Salary factor: range overlap against the user's annualized bounds.
/// Preference bounds are annual by contract; only the job's figures convert
/// when quoted hourly.
pub(super) fn evaluate(
    job: &JobPosting,
    preferences: &UserPreferences,
    config: &RankingConfig,
) -> FactorScore {
    let score = salary_score(job, preferences, config);
    FactorScore {
        score,
        explanation: explain(score).to_string(),
    }
}

fn salary_score(job: &JobPosting, preferences: &UserPreferences, config: &RankingConfig) -> f64 {
    if preferences.min_salary.is_none() && preferences.max_salary.is_none() {
        return 1.0;
    }

    if job.salary_min.is_none() && job.salary_max.is_none() {
        return 0.3;
    }

    let mut job_min = job.salary_min.unwrap_or(0) as f64;
    let mut job_max = job.salary_max.map(|v| v as f64).unwrap_or(job_min);
    if job.salary_period == SalaryPeriod::Hourly {
        job_min *= HOURS_PER_YEAR;
        job_max *= HOURS_PER_YEAR;
    }

    let user_min = preferences.min_salary.unwrap_or(0) as f64;
    let user_max = preferences
        .max_salary
        .map(|v| v as f64)
        .unwrap_or(f64::INFINITY);

    let overlap_start = job_min.max(user_min);
    let overlap_end = job_max.min(user_max);

    if overlap_start <= overlap_end {
        let job_range = (job_max - job_min).max(1.0);
        let user_range = (user_max - user_min).max(1.0);
        let overlap = overlap_end - overlap_start;

        let mut score = overlap / job_range.min(user_range);
        if job_min >= user_min {
            score += config.above_minimum_bonus;
        }
        score.min(1.0)
    } else if job_max < user_min {
        // Underpaying: fall off linearly with the relative gap.
        let relative_gap = if user_min > 0.0 {
            (user_min - job_max) / user_min
        } else {
            1.0
        };
        (1.0 - relative_gap).max(0.0)
    } else {
        // Overpaying relative to the declared ceiling.
        config.overpay_score
    }
}

fn explain(score: f64) -> &'static str {
    if score > 0.8 {
        "Salary range aligns well with expectations"
    } else if score > 0.6 {
        "Salary partially meets requirements"
    } else if score > 0.3 {
        "Salary information missing or below expectations"
    } else {
        "Salary significantly below requirements"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_paying(min: Option<i64>, max: Option<i64>, period: SalaryPeriod) -> JobPosting {
        let mut job = JobPosting::new("Engineer", "Acme");
        job.salary_min = min;
        job.salary_max = max;
        job.salary_period = period;
        job
    }

    fn prefs_wanting(min: Option<i64>, max: Option<i64>) -> UserPreferences {
        UserPreferences {
            min_salary: min,
            max_salary: max,
            ..UserPreferences::default()
        }
    }

    fn score(job: &JobPosting, prefs: &UserPreferences) -> f64 {
        salary_score(job, prefs, &RankingConfig::default())
    }

    #[test]
    fn no_declared_bounds_is_perfect_regardless_of_job() {
        let job = job_paying(Some(1), Some(2), SalaryPeriod::Annual);
        assert_eq!(score(&job, &prefs_wanting(None, None)), 1.0);

        let bare = job_paying(None, None, SalaryPeriod::Annual);
        assert_eq!(score(&bare, &prefs_wanting(None, None)), 1.0);
    }

    #[test]
    fn missing_job_salary_scores_neutral_low() {
        let job = job_paying(None, None, SalaryPeriod::Annual);
        assert_eq!(score(&job, &prefs_wanting(Some(70_000), None)), 0.3);
    }

    #[test]
    fn overlapping_range_above_minimum_gets_bonus() {
        let job = job_paying(Some(80_000), Some(120_000), SalaryPeriod::Annual);
        let prefs = prefs_wanting(Some(70_000), Some(130_000));
        // Full job range overlaps, job_min >= user_min, clamped at 1.0.
        assert_eq!(score(&job, &prefs), 1.0);
    }

    #[test]
    fn underpaying_job_falls_off_with_relative_gap() {
        let job = job_paying(Some(50_000), Some(60_000), SalaryPeriod::Annual);
        let prefs = prefs_wanting(Some(70_000), None);
        let expected = 1.0 - (70_000.0 - 60_000.0) / 70_000.0;
        assert!((score(&job, &prefs) - expected).abs() < 1e-9);
    }

    #[test]
    fn severely_underpaying_job_bottoms_out_at_zero() {
        let job = job_paying(Some(1_000), Some(2_000), SalaryPeriod::Annual);
        let prefs = prefs_wanting(Some(200_000), None);
        assert!(score(&job, &prefs) < 0.01);
    }

    #[test]
    fn overpaying_job_scores_flat() {
        let job = job_paying(Some(300_000), Some(400_000), SalaryPeriod::Annual);
        let prefs = prefs_wanting(Some(70_000), Some(120_000));
        assert_eq!(score(&job, &prefs), 0.7);
    }

    #[test]
    fn hourly_figures_annualize_before_comparison() {
        // $40/hr -> $83,200/yr, inside a 70k-130k band.
        let job = job_paying(Some(35), Some(40), SalaryPeriod::Hourly);
        let prefs = prefs_wanting(Some(70_000), Some(130_000));
        assert!(score(&job, &prefs) > 0.8);
    }

    #[test]
    fn open_ended_user_maximum_counts_as_overlap() {
        let job = job_paying(Some(90_000), Some(110_000), SalaryPeriod::Annual);
        let prefs = prefs_wanting(Some(70_000), None);
        assert_eq!(score(&job, &prefs), 1.0);
    }
}
