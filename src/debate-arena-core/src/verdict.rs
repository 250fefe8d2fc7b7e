//! Judge verdicts and the parser that extracts them from free text.
//!
//! Judges are asked to answer in this shape:
//!
//! ```text
//! SCORES:
//! Logic: 7/10
//! Evidence: 8/10
//! Rhetoric: 9/10
//!
//! WINNER: HUMAN
//!
//! FEEDBACK:
//! Strong opening, weak rebuttals.
//! ```
//!
//! Models rarely follow instructions to the letter, so extraction is tolerant:
//! labels are matched case-insensitively, missing scores default to 0, a
//! missing winner defaults to a tie and missing feedback to an empty string.

use std::fmt;
use std::num::ParseIntError;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Highest score a judge can award in one dimension.
pub const MAX_SCORE: u32 = 10;

/// Feedback used when a response could not be parsed at all.
pub const FALLBACK_FEEDBACK: &str = "Unable to parse feedback";

/// Which side a judge declared the winner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Winner {
    Human,
    Ai,
    Tie,
}

impl Winner {
    fn from_token(token: &str) -> Winner {
        match token.to_ascii_uppercase().as_str() {
            "HUMAN" => Winner::Human,
            "AI" => Winner::Ai,
            _ => Winner::Tie,
        }
    }
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Human => f.write_str("HUMAN"),
            Winner::Ai => f.write_str("AI"),
            Winner::Tie => f.write_str("TIE"),
        }
    }
}

/// One judge's scores, declared winner and feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JudgeVerdict {
    pub logic: u32,
    pub evidence: u32,
    pub rhetoric: u32,
    pub winner: Winner,
    pub feedback: String,
}

impl JudgeVerdict {
    /// Neutral verdict used when a response cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            logic: 5,
            evidence: 5,
            rhetoric: 5,
            winner: Winner::Tie,
            feedback: FALLBACK_FEEDBACK.to_string(),
        }
    }

    /// Sum of the three dimensions, 0-30.
    pub fn total(&self) -> u32 {
        self.logic + self.evidence + self.rhetoric
    }
}

impl Default for JudgeVerdict {
    fn default() -> Self {
        Self {
            logic: 0,
            evidence: 0,
            rhetoric: 0,
            winner: Winner::Tie,
            feedback: String::new(),
        }
    }
}

#[derive(Error, Debug)]
enum VerdictParseError {
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unreadable {dimension} score: {source}")]
    Score {
        dimension: &'static str,
        source: ParseIntError,
    },
}

/// Parse one judge's raw response.
///
/// Never fails: absent fields take their defaults, and if extraction itself
/// breaks the neutral [`JudgeVerdict::fallback`] is returned and the failure
/// is logged.
pub fn parse_judge_response(response: &str) -> JudgeVerdict {
    match try_parse(response) {
        Ok(verdict) => verdict,
        Err(e) => {
            warn!(error = %e, "Failed to parse judge response, using neutral verdict");
            JudgeVerdict::fallback()
        }
    }
}

fn try_parse(response: &str) -> Result<JudgeVerdict, VerdictParseError> {
    let mut verdict = JudgeVerdict {
        logic: extract_score(response, "Logic")?,
        evidence: extract_score(response, "Evidence")?,
        rhetoric: extract_score(response, "Rhetoric")?,
        ..JudgeVerdict::default()
    };

    // Tolerate decorations such as "WINNER: [HUMAN]" or "**WINNER:** AI".
    let winner_re = Regex::new(r"(?i)WINNER\W*?:[\s*\[]*(HUMAN|AI|TIE)\b")?;
    if let Some(caps) = winner_re.captures(response) {
        verdict.winner = Winner::from_token(&caps[1]);
    }

    let feedback_re = Regex::new(r"(?is)FEEDBACK\W*?:[\s*]*(.+)")?;
    if let Some(caps) = feedback_re.captures(response) {
        verdict.feedback = caps[1].trim().to_string();
    }

    Ok(verdict)
}

/// First integer after `label:`, clamped to [`MAX_SCORE`]. 0 when absent.
fn extract_score(response: &str, label: &'static str) -> Result<u32, VerdictParseError> {
    let re = Regex::new(&format!(r"(?i)\b{label}\W*?:\s*\**\s*(\d+)"))?;
    match re.captures(response) {
        Some(caps) => {
            let score: u32 = caps[1].parse().map_err(|source| VerdictParseError::Score {
                dimension: label,
                source,
            })?;
            Ok(score.min(MAX_SCORE))
        }
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "SCORES:\nLogic: 7\nEvidence: 8\nRhetoric: 9\n\nWINNER: HUMAN\n\nFEEDBACK:\nGreat job";

    #[test]
    fn test_parse_well_formed_response() {
        let verdict = parse_judge_response(WELL_FORMED);
        assert_eq!(
            verdict,
            JudgeVerdict {
                logic: 7,
                evidence: 8,
                rhetoric: 9,
                winner: Winner::Human,
                feedback: "Great job".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_out_of_ten_notation_and_case() {
        let response = "scores:\nlogic: 6/10\nEVIDENCE: 4/10\nRhetoric:5/10\nwinner: ai\nfeedback:  Needs more data.  ";
        let verdict = parse_judge_response(response);
        assert_eq!(verdict.logic, 6);
        assert_eq!(verdict.evidence, 4);
        assert_eq!(verdict.rhetoric, 5);
        assert_eq!(verdict.winner, Winner::Ai);
        assert_eq!(verdict.feedback, "Needs more data.");
    }

    #[test]
    fn test_parse_markdown_decorations() {
        let response = "**Logic:** 8/10\n**Evidence:** 7/10\n**Rhetoric:** 6/10\n\n**WINNER:** [TIE]\n\n**FEEDBACK:**\nEven match.";
        let verdict = parse_judge_response(response);
        assert_eq!((verdict.logic, verdict.evidence, verdict.rhetoric), (8, 7, 6));
        assert_eq!(verdict.winner, Winner::Tie);
        assert_eq!(verdict.feedback, "Even match.");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let verdict = parse_judge_response("Logic: 3\nI could not decide.");
        assert_eq!(verdict.logic, 3);
        assert_eq!(verdict.evidence, 0);
        assert_eq!(verdict.rhetoric, 0);
        assert_eq!(verdict.winner, Winner::Tie);
        assert_eq!(verdict.feedback, "");
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert_eq!(parse_judge_response(""), JudgeVerdict::default());
        assert_eq!(
            parse_judge_response("%%% <<>> \u{0}\u{1f600} lorem"),
            JudgeVerdict::default()
        );
    }

    #[test]
    fn test_scores_are_clamped() {
        let verdict = parse_judge_response("Logic: 12\nEvidence: 10\nRhetoric: 0");
        assert_eq!(verdict.logic, MAX_SCORE);
        assert_eq!(verdict.evidence, 10);
    }

    #[test]
    fn test_unrepresentable_score_falls_back() {
        let verdict = parse_judge_response("Logic: 99999999999999999999999\nWINNER: HUMAN");
        assert_eq!(verdict, JudgeVerdict::fallback());
    }

    #[test]
    fn test_first_winner_token_wins() {
        let verdict = parse_judge_response("WINNER: AI\nActually the WINNER: HUMAN");
        assert_eq!(verdict.winner, Winner::Ai);
    }

    #[test]
    fn test_feedback_keeps_multiple_lines() {
        let verdict = parse_judge_response("WINNER: TIE\nFEEDBACK:\nFirst point.\n\nSecond point.\n");
        assert_eq!(verdict.feedback, "First point.\n\nSecond point.");
    }
}
