//! Image-prompt shaping for the artwork step.
//!
//! The text model writes a free-form artwork description; before it is
//! sent to the image service it is whitespace-normalized, stripped of
//! leaked reference-file paths, prefixed with the fixed poster
//! instruction, and capped at the image API's prompt limit.

/// Fixed instruction prepended to every image prompt.
pub const IMAGE_PROMPT_PREFIX: &str = "Vintage poster with characters in lower 2/3. \
    CRITICAL: \"KEY TO SLEEP\" text at top must be COMPLETELY VISIBLE with 25% margins \
    from ALL edges. NO text bleeding off. Text fully contained. Bebas Neue ALL CAPS. ";

/// Maximum prompt length accepted by the image service.
pub const MAX_IMAGE_PROMPT_CHARS: usize = 1000;

/// Path prefix the description model sometimes echoes from its own
/// prompt; such tokens are meaningless to the image service.
const REFERENCE_PATH_PREFIX: &str = "prompts/reference_artwork/";

/// Build the final image prompt from a raw artwork description.
pub fn build_image_prompt(description: &str) -> String {
    let cleaned: String = description
        .split_whitespace()
        .filter(|token| !token.starts_with(REFERENCE_PATH_PREFIX))
        .collect::<Vec<_>>()
        .join(" ");

    let full = format!("{IMAGE_PROMPT_PREFIX}{cleaned}");
    full.chars().take(MAX_IMAGE_PROMPT_CHARS).collect()
}
