//! Sides and speakers in a debate.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The side a participant argues.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    /// Arguing in favor of the topic.
    For,
    /// Arguing against the topic.
    Against,
}

impl Position {
    pub fn display_name(&self) -> &'static str {
        match self {
            Position::For => "FOR",
            Position::Against => "AGAINST",
        }
    }

    /// The side the other participant argues.
    pub fn opposite(&self) -> Position {
        match self {
            Position::For => Position::Against,
            Position::Against => Position::For,
        }
    }

    /// A coin flip, used when the participant does not pick a side.
    pub fn random() -> Position {
        if rand::rng().random_bool(0.5) {
            Position::For
        } else {
            Position::Against
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "for" | "pro" => Ok(Position::For),
            "against" | "con" => Ok(Position::Against),
            other => Err(format!("unknown position '{other}' (expected for or against)")),
        }
    }
}

/// Who spoke a round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Human,
    Ai,
}

impl Speaker {
    /// Label used when rendering the transcript for the AI opponent,
    /// which reads its own rounds as "YOU".
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Speaker::Human => "OPPONENT",
            Speaker::Ai => "YOU",
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::Human => f.write_str("human"),
            Speaker::Ai => f.write_str("AI"),
        }
    }
}
