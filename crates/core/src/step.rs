//! The four generation steps and their ordering rules.

/// One stage of the generation pipeline.
///
/// `Story` must complete before the other three may leave `pending`;
/// the remaining steps run concurrently with no ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationStep {
    Story,
    Metadata,
    Artwork,
    Audio,
}

impl GenerationStep {
    /// All steps in declaration order. Also the order in which progress
    /// rows are created at job creation.
    pub const ALL: [GenerationStep; 4] = [
        GenerationStep::Story,
        GenerationStep::Metadata,
        GenerationStep::Artwork,
        GenerationStep::Audio,
    ];

    /// The concurrent group that runs after the story step, in the
    /// order used to break ties when several of them fail: the
    /// job-level error message records the first failure in this order.
    pub const PARALLEL: [GenerationStep; 3] = [
        GenerationStep::Metadata,
        GenerationStep::Artwork,
        GenerationStep::Audio,
    ];

    /// Step name as persisted in `step_progress.step` and exposed to
    /// the polling client.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Story => "story_generation",
            Self::Metadata => "metadata_generation",
            Self::Artwork => "artwork_generation",
            Self::Audio => "audio_generation",
        }
    }

    /// Parse a persisted step name.
    pub fn from_str_opt(name: &str) -> Option<Self> {
        match name {
            "story_generation" => Some(Self::Story),
            "metadata_generation" => Some(Self::Metadata),
            "artwork_generation" => Some(Self::Artwork),
            "audio_generation" => Some(Self::Audio),
            _ => None,
        }
    }
}

impl std::fmt::Display for GenerationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_step_name() {
        for step in GenerationStep::ALL {
            assert_eq!(GenerationStep::from_str_opt(step.as_str()), Some(step));
        }
    }

    #[test]
    fn unknown_step_name_is_none() {
        assert_eq!(GenerationStep::from_str_opt("video_generation"), None);
    }

    #[test]
    fn parallel_order_breaks_ties_metadata_first() {
        assert_eq!(
            GenerationStep::PARALLEL,
            [
                GenerationStep::Metadata,
                GenerationStep::Artwork,
                GenerationStep::Audio
            ]
        );
    }
}
