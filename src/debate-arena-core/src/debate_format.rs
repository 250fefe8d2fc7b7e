//! The fixed eight-turn debate format.
//!
//! A debate alternates human and AI turns through opening statements, two
//! rebuttal rounds and closing statements. The current stage is never stored;
//! it is derived from how many rounds the transcript holds, so it can never
//! disagree with the transcript.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::participant::Speaker;

/// Number of turns before judging begins.
pub const TURN_COUNT: usize = 8;

/// A stage of the debate.
///
/// Written as the machine name; older history documents that stored the
/// display label are read back too.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[serde(alias = "OPENING STATEMENT")]
    Opening,
    #[serde(alias = "OPPONENT OPENING")]
    OpponentOpening,
    #[serde(alias = "REBUTTAL 1")]
    Rebuttal1,
    #[serde(alias = "OPPONENT REBUTTAL 1")]
    OpponentRebuttal1,
    #[serde(alias = "REBUTTAL 2")]
    Rebuttal2,
    #[serde(alias = "OPPONENT REBUTTAL 2")]
    OpponentRebuttal2,
    #[serde(alias = "CLOSING STATEMENT")]
    Closing,
    #[serde(alias = "OPPONENT CLOSING")]
    OpponentClosing,
    #[serde(alias = "JUDGING")]
    Judging,
}

/// Turn stages in the order they are played.
pub const TURN_ORDER: [Stage; TURN_COUNT] = [
    Stage::Opening,
    Stage::OpponentOpening,
    Stage::Rebuttal1,
    Stage::OpponentRebuttal1,
    Stage::Rebuttal2,
    Stage::OpponentRebuttal2,
    Stage::Closing,
    Stage::OpponentClosing,
];

impl Stage {
    /// Stage reached after `round_count` rounds have been recorded.
    pub fn from_round_count(round_count: usize) -> Stage {
        TURN_ORDER
            .get(round_count)
            .copied()
            .unwrap_or(Stage::Judging)
    }

    /// Machine name, as stored in the history document.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Opening => "opening",
            Stage::OpponentOpening => "opponent_opening",
            Stage::Rebuttal1 => "rebuttal1",
            Stage::OpponentRebuttal1 => "opponent_rebuttal1",
            Stage::Rebuttal2 => "rebuttal2",
            Stage::OpponentRebuttal2 => "opponent_rebuttal2",
            Stage::Closing => "closing",
            Stage::OpponentClosing => "opponent_closing",
            Stage::Judging => "judging",
        }
    }

    /// Label shown in transcripts and announcements.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Opening => "OPENING STATEMENT",
            Stage::OpponentOpening => "OPPONENT OPENING",
            Stage::Rebuttal1 => "REBUTTAL 1",
            Stage::OpponentRebuttal1 => "OPPONENT REBUTTAL 1",
            Stage::Rebuttal2 => "REBUTTAL 2",
            Stage::OpponentRebuttal2 => "OPPONENT REBUTTAL 2",
            Stage::Closing => "CLOSING STATEMENT",
            Stage::OpponentClosing => "OPPONENT CLOSING",
            Stage::Judging => "JUDGING",
        }
    }

    /// Instructions shown to the human when their turn begins.
    pub fn description(&self) -> &'static str {
        match self {
            Stage::Opening => "Present your opening position on the topic.",
            Stage::Rebuttal1 | Stage::Rebuttal2 => {
                "Respond to your opponent's arguments and strengthen your case."
            }
            Stage::Closing => "Deliver your final appeal and summarize your case.",
            Stage::OpponentOpening
            | Stage::OpponentRebuttal1
            | Stage::OpponentRebuttal2
            | Stage::OpponentClosing => "Your opponent is responding.",
            Stage::Judging => "Four judges are evaluating the debate.",
        }
    }

    /// Who must speak at this stage. `None` once the debate is being judged.
    pub fn turn_owner(&self) -> Option<Speaker> {
        match self {
            Stage::Opening | Stage::Rebuttal1 | Stage::Rebuttal2 | Stage::Closing => {
                Some(Speaker::Human)
            }
            Stage::OpponentOpening
            | Stage::OpponentRebuttal1
            | Stage::OpponentRebuttal2
            | Stage::OpponentClosing => Some(Speaker::Ai),
            Stage::Judging => None,
        }
    }

    /// After a human turn at this stage the AI must respond next.
    ///
    /// The human's closing also needs one more AI turn; see
    /// [`Stage::requires_opponent_reply`].
    pub fn is_awaiting_opponent(&self) -> bool {
        matches!(self, Stage::Opening | Stage::Rebuttal1 | Stage::Rebuttal2)
    }

    /// True for every human stage, including the closing statement.
    pub fn requires_opponent_reply(&self) -> bool {
        self.is_awaiting_opponent() || *self == Stage::Closing
    }

    /// A round recorded at this stage completes the transcript.
    pub fn is_ready_for_judging(&self) -> bool {
        *self == Stage::OpponentClosing
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
