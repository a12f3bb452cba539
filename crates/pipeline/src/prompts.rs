//! Prompt assembly for the generation steps.
//!
//! Prompt texts are embedded at compile time so a deployment never
//! depends on a prompts directory being present next to the binary.

use drowse_clients::ChatParams;
use drowse_core::customization::StoryCustomization;

const STORY_BASE: &str = include_str!("../prompts/story.txt");
const METADATA_BASE: &str = include_str!("../prompts/metadata.txt");
const ARTWORK_BASE: &str = include_str!("../prompts/artwork.txt");

/// Reference scripts included in the story prompt as tone examples.
const REFERENCE_SCRIPTS: [(&str, &str); 2] = [
    (
        "the_lantern_ferry.txt",
        include_str!("../prompts/reference_scripts/the_lantern_ferry.txt"),
    ),
    (
        "the_wool_shop.txt",
        include_str!("../prompts/reference_scripts/the_wool_shop.txt"),
    ),
];

pub const STORY_SYSTEM_PROMPT: &str = "You are a peaceful sleep story narrator for a podcast. \
     Create calming, imaginative stories that help listeners drift off to sleep.";

pub const METADATA_SYSTEM_PROMPT: &str = "You are a podcast metadata specialist. \
     Create compelling titles and descriptions for sleep stories.";

pub const ARTWORK_SYSTEM_PROMPT: &str = "You are a creative visual artist. Generate detailed image descriptions \
     with TWO CRITICAL requirements: 1) The main character and companion from \
     the story as central focal points in the lower 2/3 of the image. 2) Text \
     \"KEY TO SLEEP\" must be COMPLETELY VISIBLE with 25% margins from ALL \
     edges - every letter fully contained, no bleeding or cropping. Use Bebas \
     Neue ALL CAPS. Both requirements are EQUALLY important.";

pub const STORY_PARAMS: ChatParams = ChatParams {
    temperature: 0.8,
    max_tokens: 1800,
};

pub const METADATA_PARAMS: ChatParams = ChatParams {
    temperature: 0.7,
    max_tokens: 500,
};

pub const ARTWORK_PARAMS: ChatParams = ChatParams {
    temperature: 0.8,
    max_tokens: 900,
};

/// The user prompt for story generation: reference scripts for tone,
/// then the base instructions, then the customer's requirements.
pub fn build_story_prompt(customization: &StoryCustomization) -> String {
    let mut references = String::new();
    for (name, content) in REFERENCE_SCRIPTS {
        references.push_str(&format!("--- Reference Script: {name} ---\n{content}\n\n"));
    }

    format!(
        "Here are reference scripts for inspiration (do not copy directly):\n\n\
         {references}{base}{instructions}",
        base = STORY_BASE.trim(),
        instructions = customization.custom_instructions(),
    )
}

/// The user prompt for metadata generation.
pub fn build_metadata_prompt(story_text: &str) -> String {
    format!(
        "{}\n\nSTORY TO ANALYZE:\n{story_text}",
        METADATA_BASE.trim()
    )
}

/// The user prompt for the artwork description pass.
pub fn build_artwork_prompt(story_text: &str, metadata_json: &str) -> String {
    format!(
        "{}\n\nSTORY:\n{story_text}\n\nMETADATA:\n{metadata_json}",
        ARTWORK_BASE.trim()
    )
}
