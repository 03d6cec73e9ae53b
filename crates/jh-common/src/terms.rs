//! Fixed synonym tables and the layered keyword matcher.
//!
//! Matching runs strategies in priority order and stops at the first hit:
//! substring containment, word-boundary match, technology synonym group,
//! then fuzzy similarity against individual corpus words.

use regex::Regex;

use crate::fuzzy;

/// Minimum similarity (0–100) for a fuzzy keyword hit.
const FUZZY_MATCH_THRESHOLD: f64 = 85.0;

/// Fuzzy matching is only attempted for keywords longer than this.
const FUZZY_MIN_KEYWORD_CHARS: usize = 3;

/// Technology synonym groups keyed by category. Matching any member or the
/// category name itself counts as matching the whole group.
pub static TECH_SYNONYMS: &[(&str, &[&str])] = &[
    ("javascript", &["js", "node.js", "nodejs", "react", "vue", "angular"]),
    ("python", &["django", "flask", "fastapi", "pandas", "numpy"]),
    ("java", &["spring", "springboot", "maven", "gradle"]),
    ("database", &["sql", "mysql", "postgresql", "mongodb", "redis"]),
    ("cloud", &["aws", "azure", "gcp", "docker", "kubernetes"]),
    ("frontend", &["html", "css", "react", "vue", "angular", "typescript"]),
    ("backend", &["api", "rest", "microservices", "server"]),
];

/// Alternate spellings for preferred locations.
pub static LOCATION_SYNONYMS: &[(&str, &[&str])] = &[
    ("remote", &["work from home", "wfh", "telecommute", "distributed"]),
    ("san francisco", &["sf", "bay area", "silicon valley"]),
    ("new york", &["nyc", "manhattan", "brooklyn"]),
    ("los angeles", &["la", "hollywood", "santa monica"]),
];

/// Alternate wordings for each experience level family.
pub static EXPERIENCE_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "entry",
        &["junior", "entry-level", "new grad", "graduate", "associate", "0-2 years"],
    ),
    ("mid", &["mid-level", "intermediate", "2-5 years", "3-7 years"]),
    ("senior", &["senior", "sr", "lead", "5+ years", "7+ years"]),
    ("lead", &["lead", "principal", "architect", "manager", "director"]),
];

/// Ordered experience progression used for adjacency scoring.
pub const EXPERIENCE_HIERARCHY: [&str; 4] = ["entry", "mid", "senior", "lead"];

/// The synonym group a keyword belongs to, if any. The keyword may be the
/// category name itself or any member.
pub fn tech_synonym_group(keyword: &str) -> Option<(&'static str, &'static [&'static str])> {
    TECH_SYNONYMS
        .iter()
        .find(|(category, synonyms)| *category == keyword || synonyms.contains(&keyword))
        .copied()
}

pub fn location_synonyms(preferred: &str) -> Option<&'static [&'static str]> {
    LOCATION_SYNONYMS
        .iter()
        .find(|(name, _)| *name == preferred)
        .map(|(_, synonyms)| *synonyms)
}

pub fn experience_synonyms(level: &str) -> Option<&'static [&'static str]> {
    EXPERIENCE_SYNONYMS
        .iter()
        .find(|(name, _)| *name == level)
        .map(|(_, synonyms)| *synonyms)
}

fn word_boundary_match(term: &str, text: &str) -> bool {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
    Regex::new(&pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Layered keyword match against a lowercased corpus.
pub fn keyword_matches(keyword: &str, corpus: &str) -> bool {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() {
        return false;
    }

    if corpus.contains(&keyword) {
        return true;
    }

    if word_boundary_match(&keyword, corpus) {
        return true;
    }

    if let Some((category, synonyms)) = tech_synonym_group(&keyword) {
        for term in synonyms.iter().chain(std::iter::once(&category)) {
            if corpus.contains(term) || word_boundary_match(term, corpus) {
                return true;
            }
        }
    }

    if keyword.chars().count() > FUZZY_MIN_KEYWORD_CHARS {
        return corpus
            .split_whitespace()
            .any(|word| fuzzy::ratio(&keyword, word) >= FUZZY_MATCH_THRESHOLD);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_substring_matches() {
        assert!(keyword_matches("python", "senior python developer"));
        assert!(keyword_matches("Python", "senior python developer"));
    }

    #[test]
    fn synonym_group_matches_category_and_members() {
        // Corpus mentions react; "javascript" matches through the group.
        assert!(keyword_matches("javascript", "react frontend role"));
        // Corpus mentions the category name; a member matches through it.
        assert!(keyword_matches("js", "javascript heavy stack"));
        // Cloud family.
        assert!(keyword_matches("cloud", "kubernetes platform team"));
    }

    #[test]
    fn fuzzy_matches_typos_for_long_keywords() {
        assert!(keyword_matches("kubernetes", "we run kuberntes clusters"));
        // Three-letter keywords never fuzz.
        assert!(!keyword_matches("php", "working with pha"));
    }

    #[test]
    fn unrelated_keywords_do_not_match() {
        assert!(!keyword_matches("haskell", "senior python developer"));
        assert!(!keyword_matches("", "anything"));
    }

    #[test]
    fn lookup_tables_resolve_both_directions() {
        assert!(tech_synonym_group("react").is_some());
        assert!(tech_synonym_group("javascript").is_some());
        assert!(tech_synonym_group("cobol").is_none());

        assert_eq!(
            location_synonyms("san francisco"),
            Some(["sf", "bay area", "silicon valley"].as_slice())
        );
        assert!(location_synonyms("tokyo").is_none());

        assert!(experience_synonyms("entry").is_some());
        assert!(experience_synonyms("unknown").is_none());
    }
}
