//! Human-readable correlation tokens.
//!
//! Tokens are externally visible (progress and download URLs), so they
//! are date-prefixed and readable rather than opaque UUIDs:
//! `2026-08-29-luna-x7k2pq`.

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 6;

/// Fallback middle segment when no usable name was supplied.
const DEFAULT_NAME: &str = "user";

/// Generate a fresh correlation token.
pub fn generate_job_token(name: Option<&str>, now: DateTime<Utc>) -> String {
    let date = now.format("%Y-%m-%d");
    let name = sanitize_name(name);
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{date}-{name}-{suffix}")
}

/// Lowercase and keep only ASCII alphanumerics; empty results fall
/// back to [`DEFAULT_NAME`].
fn sanitize_name(name: Option<&str>) -> String {
    let cleaned: String = name
        .unwrap_or("")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(20)
        .collect();

    if cleaned.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap()
    }

    #[test]
    fn token_shape_with_name() {
        let token = generate_job_token(Some("Luna"), fixed_now());
        assert!(token.starts_with("2026-08-29-luna-"));
        assert_eq!(token.len(), "2026-08-29-luna-".len() + SUFFIX_LEN);
    }

    #[test]
    fn name_is_sanitized() {
        let token = generate_job_token(Some("  Lu na! 9 "), fixed_now());
        assert!(token.starts_with("2026-08-29-luna9-"));
    }

    #[test]
    fn missing_name_falls_back() {
        let token = generate_job_token(None, fixed_now());
        assert!(token.starts_with("2026-08-29-user-"));
        let token = generate_job_token(Some("!!!"), fixed_now());
        assert!(token.starts_with("2026-08-29-user-"));
    }

    #[test]
    fn suffix_is_lowercase_alphanumeric() {
        let token = generate_job_token(None, fixed_now());
        let suffix = token.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric() && !c.is_ascii_uppercase()));
    }
}
