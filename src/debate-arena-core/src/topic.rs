//! Debate topic catalog.
//!
//! A static, read-only list of debate prompts with category and difficulty
//! metadata. Loaded once at startup and never mutated.

use std::fmt;
use std::str::FromStr;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::ArenaError;

/// How demanding a topic is to argue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "unknown difficulty '{other}' (expected beginner, intermediate or advanced)"
            )),
        }
    }
}

/// A single debate prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topic {
    pub id: u32,
    pub topic: String,
    pub category: String,
    pub difficulty: Difficulty,
}

impl Topic {
    pub fn new(
        id: u32,
        topic: impl Into<String>,
        category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id,
            topic: topic.into(),
            category: category.into(),
            difficulty,
        }
    }
}

/// Read-only collection of topics.
#[derive(Debug, Clone)]
pub struct TopicCatalog {
    topics: Vec<Topic>,
}

impl TopicCatalog {
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// The catalog shipped with the arena.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_TOPICS
                .iter()
                .map(|&(id, topic, category, difficulty)| {
                    Topic::new(id, topic, category, difficulty)
                })
                .collect(),
        )
    }

    pub fn all(&self) -> &[Topic] {
        &self.topics
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn get(&self, id: u32) -> Result<&Topic, ArenaError> {
        self.topics
            .iter()
            .find(|t| t.id == id)
            .ok_or(ArenaError::TopicNotFound(id))
    }

    /// Topics matching an optional category (case-insensitive) and difficulty.
    pub fn filter(&self, category: Option<&str>, difficulty: Option<Difficulty>) -> Vec<&Topic> {
        self.topics
            .iter()
            .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
            .filter(|t| difficulty.is_none_or(|d| t.difficulty == d))
            .collect()
    }

    /// Pick a topic uniformly at random, optionally restricted to one difficulty.
    pub fn random(&self, difficulty: Option<Difficulty>) -> Result<&Topic, ArenaError> {
        let pool = self.filter(None, difficulty);
        pool.choose(&mut rand::rng())
            .copied()
            .ok_or(ArenaError::NoTopicsAvailable { difficulty })
    }
}

impl Default for TopicCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_TOPICS: &[(u32, &str, &str, Difficulty)] = &[
    (1, "AI will replace most jobs by 2030", "Technology", Difficulty::Beginner),
    (2, "Social media does more harm than good", "Society", Difficulty::Beginner),
    (3, "Universal Basic Income should be implemented globally", "Economics", Difficulty::Intermediate),
    (4, "Privacy is dead in the digital age and we should accept it", "Technology", Difficulty::Intermediate),
    (5, "Traditional education is obsolete", "Education", Difficulty::Beginner),
    (6, "Cryptocurrency will replace traditional currency within 20 years", "Economics", Difficulty::Intermediate),
    (7, "Remote work is superior to office work for most professions", "Work", Difficulty::Beginner),
    (8, "Genetic engineering of humans should be allowed", "Ethics", Difficulty::Advanced),
    (9, "Climate change requires immediate government intervention", "Environment", Difficulty::Intermediate),
    (10, "Free speech should have limits on social platforms", "Society", Difficulty::Advanced),
    (11, "Democracy is the best form of government", "Politics", Difficulty::Advanced),
    (12, "Meat consumption should be banned for environmental reasons", "Environment", Difficulty::Intermediate),
    (13, "Artificial General Intelligence poses an existential threat", "Technology", Difficulty::Advanced),
    (14, "Healthcare should be completely free for everyone", "Health", Difficulty::Intermediate),
    (15, "Standardized testing should be eliminated", "Education", Difficulty::Beginner),
];
