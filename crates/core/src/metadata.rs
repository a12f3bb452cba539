//! Title/description parsing for the metadata step.
//!
//! The metadata prompt asks the text model for JSON, but models drift.
//! Rather than failing, non-JSON output takes an explicit fallback
//! branch: first non-empty line becomes the title, the remainder the
//! description. The tag on [`ParsedMetadata`] keeps that soft-success
//! path visible to callers and tests.

use serde::{Deserialize, Serialize};

/// Title used when the model omits one.
pub const DEFAULT_TITLE: &str = "Peaceful Sleep Story";

/// Description used when the model omits one.
pub const DEFAULT_DESCRIPTION: &str =
    "A calming bedtime story to help you drift off to sleep.";

/// Episode title and description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeMetadata {
    pub title: String,
    pub description: String,
}

/// How the metadata was obtained from raw model output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMetadata {
    /// The model returned well-formed JSON.
    Structured(EpisodeMetadata),
    /// JSON parsing failed; fields were extracted line-by-line.
    Fallback(EpisodeMetadata),
}

impl ParsedMetadata {
    /// The metadata regardless of how it was parsed.
    pub fn into_inner(self) -> EpisodeMetadata {
        match self {
            Self::Structured(m) | Self::Fallback(m) => m,
        }
    }
}

/// Shape accepted from the model's JSON output; both fields optional
/// so a partially-populated object still counts as structured.
#[derive(Deserialize)]
struct RawMetadata {
    title: Option<String>,
    description: Option<String>,
}

/// Parse raw model output into metadata. Never fails: JSON errors fall
/// back to line extraction, and missing fields take the defaults.
pub fn parse_metadata(raw: &str) -> ParsedMetadata {
    if let Ok(parsed) = serde_json::from_str::<RawMetadata>(raw) {
        return ParsedMetadata::Structured(EpisodeMetadata {
            title: non_empty_or(parsed.title, DEFAULT_TITLE),
            description: non_empty_or(parsed.description, DEFAULT_DESCRIPTION),
        });
    }

    let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
    let title = lines.next().unwrap_or(DEFAULT_TITLE).to_string();
    let rest = lines.collect::<Vec<_>>().join(" ");

    ParsedMetadata::Fallback(EpisodeMetadata {
        title: if title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            title
        },
        description: if rest.is_empty() {
            DEFAULT_DESCRIPTION.to_string()
        } else {
            rest
        },
    })
}

fn non_empty_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn well_formed_json_is_structured() {
        let parsed =
            parse_metadata(r#"{"title":"The Quiet Harbor","description":"Waves and wind."}"#);
        assert_matches!(parsed, ParsedMetadata::Structured(_));
        let meta = parsed.into_inner();
        assert_eq!(meta.title, "The Quiet Harbor");
        assert_eq!(meta.description, "Waves and wind.");
    }

    #[test]
    fn json_with_missing_fields_takes_defaults() {
        let parsed = parse_metadata(r#"{"title":"Starlight"}"#);
        assert_matches!(parsed, ParsedMetadata::Structured(_));
        let meta = parsed.into_inner();
        assert_eq!(meta.title, "Starlight");
        assert_eq!(meta.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn plain_text_falls_back_to_line_extraction() {
        let parsed = parse_metadata("Moonlit Meadow\nA gentle walk through tall grass.\nStars above.");
        assert_matches!(parsed, ParsedMetadata::Fallback(_));
        let meta = parsed.into_inner();
        assert_eq!(meta.title, "Moonlit Meadow");
        assert_eq!(
            meta.description,
            "A gentle walk through tall grass. Stars above."
        );
    }

    #[test]
    fn single_line_gets_default_description() {
        let meta = parse_metadata("Just a title").into_inner();
        assert_eq!(meta.title, "Just a title");
        assert_eq!(meta.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn empty_input_gets_both_defaults() {
        let meta = parse_metadata("   \n  ").into_inner();
        assert_eq!(meta.title, DEFAULT_TITLE);
        assert_eq!(meta.description, DEFAULT_DESCRIPTION);
    }
}
