//! Story text cleanup and episode identifiers.

use chrono::{DateTime, Utc};

use crate::error::CoreError;

/// Strip bracketed stage directions and blank lines from raw model output.
///
/// Each line has `[...]` spans removed (narration models occasionally
/// emit cues like `[soft pause]`), is trimmed, and empty lines are
/// dropped. Returns [`CoreError::EmptyGeneration`] when nothing
/// survives cleanup.
pub fn clean_story(raw: &str) -> Result<String, CoreError> {
    let cleaned: Vec<String> = raw
        .lines()
        .map(strip_bracketed)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();

    if cleaned.is_empty() {
        return Err(CoreError::EmptyGeneration(
            "Text model returned empty story content".into(),
        ));
    }

    Ok(cleaned.join("\n"))
}

/// Remove every `[...]` span from a single line. An unclosed `[` is
/// not a stage direction and is left as written.
fn strip_bracketed(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        match rest[open..].find(']') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Derive an episode identifier from the current time.
///
/// Compact ISO-8601 with separators removed, e.g.
/// `20260829T211530123Z`. Collision-tolerant by design: the job token,
/// not the episode id, is the uniqueness boundary.
pub fn generate_episode_id(now: DateTime<Utc>) -> String {
    now.format("%Y%m%dT%H%M%S%3fZ").to_string()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn removes_stage_directions_and_blank_lines() {
        let raw = "Once upon a time. [soft pause]\n\n[whispered] The snow fell gently.\n   \nGood night.";
        let cleaned = clean_story(raw).unwrap();
        assert_eq!(
            cleaned,
            "Once upon a time.\nThe snow fell gently.\nGood night."
        );
    }

    #[test]
    fn keeps_text_around_multiple_brackets_on_one_line() {
        let cleaned = clean_story("A [x] calm [y] night").unwrap();
        assert_eq!(cleaned, "A  calm  night");
    }

    #[test]
    fn unclosed_bracket_is_left_intact() {
        let cleaned = clean_story("Dream of [the sea\nAnd [rest] well").unwrap();
        assert_eq!(cleaned, "Dream of [the sea\nAnd  well");
    }

    #[test]
    fn all_bracketed_input_is_empty_generation() {
        let err = clean_story("[pause]\n[breath]").unwrap_err();
        assert_matches!(err, CoreError::EmptyGeneration(_));
    }

    #[test]
    fn whitespace_only_input_is_empty_generation() {
        assert_matches!(clean_story("  \n\t\n"), Err(CoreError::EmptyGeneration(_)));
    }

    #[test]
    fn episode_id_is_compact_iso() {
        let at = Utc.with_ymd_and_hms(2026, 8, 29, 21, 15, 30).unwrap();
        assert_eq!(generate_episode_id(at), "20260829T211530000Z");
    }
}
