//! A single debate and its transcript.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::debate_format::Stage;
pub use crate::participant::{Position, Speaker};

use crate::results::DebateResults;
use crate::topic::{Difficulty, Topic};

/// Lifecycle of a debate. Moves from `Active` to `Completed` exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
    Active,
    Completed,
}

/// One turn of the debate. Never edited once appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Round {
    pub speaker: Speaker,
    /// Stage this round was spoken at.
    #[serde(rename = "type")]
    pub stage: Stage,
    pub content: String,
    /// Raw spoken or typed input, when it differs from `content`.
    #[serde(default)]
    pub transcript: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Round {
    /// The text judges and the opponent should read for this round.
    pub fn text(&self) -> &str {
        self.transcript.as_deref().unwrap_or(&self.content)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Debate {
    /// Creation time in milliseconds since the Unix epoch.
    pub id: i64,
    pub topic: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub human_position: Position,
    pub ai_position: Position,
    rounds: Vec<Round>,
    pub status: DebateStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<DebateResults>,
}

static LAST_DEBATE_ID: AtomicI64 = AtomicI64::new(0);

/// Millisecond timestamp, bumped when two debates start within the same millisecond.
fn next_debate_id(now: DateTime<Utc>) -> i64 {
    let candidate = now.timestamp_millis();
    let previous = LAST_DEBATE_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(candidate.max(last + 1))
        })
        .unwrap_or(candidate);
    candidate.max(previous + 1)
}

impl Debate {
    /// Start a debate on `topic` with the human arguing `human_position`.
    ///
    /// Topic metadata is copied so the history survives catalog changes.
    pub fn new(topic: &Topic, human_position: Position) -> Self {
        let now = Utc::now();
        Self {
            id: next_debate_id(now),
            topic: topic.topic.clone(),
            category: topic.category.clone(),
            difficulty: topic.difficulty,
            human_position,
            ai_position: human_position.opposite(),
            rounds: Vec::new(),
            status: DebateStatus::Active,
            started_at: now,
            completed_at: None,
            results: None,
        }
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    /// Current stage, derived from the number of recorded rounds.
    pub fn stage(&self) -> Stage {
        Stage::from_round_count(self.rounds.len())
    }

    pub fn is_active(&self) -> bool {
        self.status == DebateStatus::Active
    }

    /// All eight turns have been spoken.
    pub fn is_ready_for_judging(&self) -> bool {
        self.stage() == Stage::Judging
    }

    /// Append a round tagged with the current stage and return that stage.
    ///
    /// The speaker is not checked against the stage's turn owner; callers
    /// enforce turn order. Returns `None` without recording anything when the
    /// debate is no longer active.
    pub fn append_round(
        &mut self,
        speaker: Speaker,
        content: impl Into<String>,
        transcript: Option<String>,
    ) -> Option<Stage> {
        if !self.is_active() {
            return None;
        }

        let stage = self.stage();
        self.rounds.push(Round {
            speaker,
            stage,
            content: content.into(),
            transcript,
            timestamp: Utc::now(),
        });
        debug!(debate = self.id, %stage, %speaker, "recorded round");
        Some(stage)
    }

    /// Mark the debate completed and attach its results.
    pub(crate) fn complete(&mut self, results: DebateResults) {
        self.status = DebateStatus::Completed;
        self.completed_at = Some(Utc::now());
        self.results = Some(results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_topic() -> Topic {
        Topic::new(7, "Remote work is superior", "Work", Difficulty::Beginner)
    }

    #[test]
    fn test_new_debate() {
        let debate = Debate::new(&sample_topic(), Position::For);
        assert_eq!(debate.ai_position, Position::Against);
        assert_eq!(debate.category, "Work");
        assert_eq!(debate.status, DebateStatus::Active);
        assert!(debate.rounds().is_empty());
        assert_eq!(debate.stage(), Stage::Opening);
        assert!(debate.completed_at.is_none());
    }

    #[test]
    fn test_append_round_tags_current_stage() {
        let mut debate = Debate::new(&sample_topic(), Position::Against);
        let stage = debate.append_round(Speaker::Human, "cleaned", Some("um, raw".into()));
        assert_eq!(stage, Some(Stage::Opening));
        let stage = debate.append_round(Speaker::Ai, "reply", None);
        assert_eq!(stage, Some(Stage::OpponentOpening));

        assert_eq!(debate.rounds()[0].text(), "um, raw");
        assert_eq!(debate.rounds()[1].text(), "reply");
        assert_eq!(debate.stage(), Stage::Rebuttal1);
    }

    #[test]
    fn test_eight_rounds_reach_judging() {
        let mut debate = Debate::new(&sample_topic(), Position::For);
        for n in 0..8 {
            let speaker = if n % 2 == 0 { Speaker::Human } else { Speaker::Ai };
            let stage = debate.append_round(speaker, format!("turn {n}"), None).unwrap();
            assert_eq!(stage.is_ready_for_judging(), n == 7);
        }
        assert!(debate.is_ready_for_judging());
        assert_eq!(debate.stage(), Stage::Judging);
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Debate::new(&sample_topic(), Position::For);
        let b = Debate::new(&sample_topic(), Position::For);
        assert!(b.id > a.id);
    }

    #[test]
    fn test_append_is_rejected_after_completion() {
        let mut debate = Debate::new(&sample_topic(), Position::For);
        debate.status = DebateStatus::Completed;
        assert_eq!(debate.append_round(Speaker::Human, "late", None), None);
        assert!(debate.rounds().is_empty());
    }

    #[test]
    fn test_round_serializes_stage_as_type() {
        let mut debate = Debate::new(&sample_topic(), Position::For);
        debate.append_round(Speaker::Human, "hello", None);
        let json = serde_json::to_value(&debate).unwrap();
        assert_eq!(json["rounds"][0]["type"], "opening");
        assert_eq!(json["humanPosition"], "FOR");
        assert!(json.get("completedAt").is_none());
    }
}
