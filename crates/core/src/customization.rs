//! The customization payload attached to a paid story request.
//!
//! Every field is optional: the checkout form lets customers fill in
//! as much or as little as they like, and the prompt assembly simply
//! skips whatever is absent.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Upper bound on free-text field length accepted at the boundary.
const MAX_FIELD_CHARS: usize = 100;

/// Upper bound on the number of value-words.
const MAX_VALUES: usize = 10;

/// Customer-supplied story parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoryCustomization {
    pub character_name: Option<String>,
    pub character_age: Option<u8>,
    pub character_gender: Option<String>,
    pub has_companion: Option<bool>,
    pub companion_name: Option<String>,
    pub companion_animal: Option<String>,
    pub climate: Option<String>,
    pub region: Option<String>,
    pub values: Option<Vec<String>>,
}

impl StoryCustomization {
    /// Validate boundary constraints on a payload received over HTTP.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (field, value) in [
            ("characterName", &self.character_name),
            ("characterGender", &self.character_gender),
            ("companionName", &self.companion_name),
            ("companionAnimal", &self.companion_animal),
            ("climate", &self.climate),
            ("region", &self.region),
        ] {
            if let Some(text) = value {
                if text.chars().count() > MAX_FIELD_CHARS {
                    return Err(CoreError::Validation(format!(
                        "Field '{field}' exceeds {MAX_FIELD_CHARS} characters"
                    )));
                }
            }
        }

        if let Some(values) = &self.values {
            if values.len() > MAX_VALUES {
                return Err(CoreError::Validation(format!(
                    "At most {MAX_VALUES} values may be selected"
                )));
            }
            if let Some(word) = values.iter().find(|w| w.chars().count() > MAX_FIELD_CHARS) {
                return Err(CoreError::Validation(format!(
                    "Value word '{word}' exceeds {MAX_FIELD_CHARS} characters"
                )));
            }
        }

        Ok(())
    }

    /// Render the `CUSTOMIZATION REQUIREMENTS` block appended to the
    /// story prompt. Absent fields are skipped; the companion line only
    /// appears when presence, name, and species are all provided, and
    /// the setting line only when both climate and region are present.
    pub fn custom_instructions(&self) -> String {
        let mut out = String::from("\n\nCUSTOMIZATION REQUIREMENTS:\n");

        if let Some(name) = &self.character_name {
            out.push_str(&format!("- Main character name: {name}\n"));
        }
        if let Some(age) = self.character_age {
            out.push_str(&format!("- Character age: {age} years old\n"));
        }
        if let Some(gender) = &self.character_gender {
            out.push_str(&format!("- Character gender: {gender}\n"));
        }
        if self.has_companion == Some(true) {
            if let (Some(name), Some(animal)) = (&self.companion_name, &self.companion_animal) {
                out.push_str(&format!("- Companion: {name} the {animal}\n"));
            }
        }
        if let (Some(climate), Some(region)) = (&self.climate, &self.region) {
            out.push_str(&format!("- Setting: {climate} {region}\n"));
        }
        if let Some(values) = &self.values {
            if !values.is_empty() {
                out.push_str(&format!("- Values to emphasize: {}\n", values.join(", ")));
            }
        }

        out.push_str(
            "\nPlease incorporate these elements naturally into the story \
             while maintaining the peaceful, sleep-friendly tone.\n",
        );
        out
    }
}
