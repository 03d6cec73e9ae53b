use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Number of description characters folded into the fingerprint. Longer
/// prefixes make near-identical boilerplate postings distinct; shorter ones
/// collapse repostings with trivially edited descriptions.
const DESCRIPTION_PREFIX_CHARS: usize = 200;

/// Fingerprint length in hex characters (64 bits of the SHA-256 digest).
const FINGERPRINT_LEN: usize = 16;

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize one fingerprint field: NFKC fold, lowercase, trim, and collapse
/// internal whitespace runs to a single space.
pub fn normalize_field(input: &str) -> String {
    let folded = input.nfkc().collect::<String>().to_lowercase();
    RE_WHITESPACE.replace_all(folded.trim(), " ").into_owned()
}

/// Deterministic posting fingerprint over normalized title, company,
/// location, and a bounded description prefix.
///
/// Two postings with equal fingerprints are the same opportunity no matter
/// which source produced them. Absent fields hash as empty segments so the
/// field layout stays fixed.
pub fn fingerprint(
    title: &str,
    company: &str,
    location: Option<&str>,
    description: Option<&str>,
) -> String {
    let description_prefix: String = description
        .map(normalize_field)
        .unwrap_or_default()
        .chars()
        .take(DESCRIPTION_PREFIX_CHARS)
        .collect();

    let input = format!(
        "{}|{}|{}|{}",
        normalize_field(title),
        normalize_field(company),
        location.map(normalize_field).unwrap_or_default(),
        description_prefix,
    );

    let digest = Sha256::digest(input.as_bytes());
    let mut hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex.truncate(FINGERPRINT_LEN);
    hex
}
