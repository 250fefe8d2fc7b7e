//! Error types for the debate arena.

use thiserror::Error;

use crate::debate::{Speaker, Stage};
use crate::topic::Difficulty;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("No active debate for '{0}'. Start one with `start`.")]
    NoActiveDebate(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(u32),

    #[error("No topics available{}", difficulty_suffix(.difficulty))]
    NoTopicsAvailable { difficulty: Option<Difficulty> },

    #[error("It is not the {speaker} side's turn (current stage: {stage})")]
    OutOfTurn { stage: Stage, speaker: Speaker },

    #[error("Debate is not ready for judging (current stage: {stage})")]
    NotReadyForJudging { stage: Stage },

    #[error("Invalid judge count: expected {expected}, got {actual}")]
    InvalidJudgeCount { expected: usize, actual: usize },

    #[error("Debate {0} has already been recorded")]
    AlreadyRecorded(i64),

    #[error("Text generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ArenaError {
    /// Conditions caused by the participant's own request rather than a failing
    /// external system. These are reported back, never treated as crashes.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            ArenaError::NoActiveDebate(_)
                | ArenaError::TopicNotFound(_)
                | ArenaError::NoTopicsAvailable { .. }
                | ArenaError::OutOfTurn { .. }
                | ArenaError::NotReadyForJudging { .. }
                | ArenaError::InvalidJudgeCount { .. }
                | ArenaError::AlreadyRecorded(_)
        )
    }
}

fn difficulty_suffix(difficulty: &Option<Difficulty>) -> String {
    match difficulty {
        Some(d) => format!(" for difficulty '{d}'"),
        None => String::new(),
    }
}

/// Failures at the text-generation boundary.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model '{model}' returned an empty response after {attempts} attempts")]
    EmptyResponse { model: String, attempts: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(ArenaError::NoActiveDebate("alice".into()).is_user_facing());
        assert!(ArenaError::TopicNotFound(99).is_user_facing());
        assert!(
            !ArenaError::Storage(std::io::Error::other("disk full")).is_user_facing()
        );
        assert!(
            !ArenaError::Generation(GenerationError::HttpClient("timeout".into()))
                .is_user_facing()
        );
    }

    #[test]
    fn test_no_topics_message_mentions_difficulty() {
        let err = ArenaError::NoTopicsAvailable {
            difficulty: Some(Difficulty::Advanced),
        };
        assert_eq!(
            err.to_string(),
            "No topics available for difficulty 'advanced'"
        );
        let err = ArenaError::NoTopicsAvailable { difficulty: None };
        assert_eq!(err.to_string(), "No topics available");
    }
}
