//! Process-level run ID plus fresh ULIDs for per-session identifiers.
//!
//! Every coordination run and scrape session gets a ULID: time-ordered,
//! 26 characters, URL-safe, unique across concurrent runs.

use once_cell::sync::Lazy;
use ulid::Ulid;

static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// The process-level run ID, generated once at first access. All log lines
/// and records emitted by one process share this value.
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// A fresh ULID for sub-operations (session IDs, batch IDs).
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_run_id_is_stable() {
        assert_eq!(get(), get());
        assert_eq!(get().len(), 26);
    }

    #[test]
    fn generated_ids_are_unique_and_ordered() {
        let older = generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let newer = generate();
        assert_ne!(older, newer);
        assert!(older < newer);
    }
}
