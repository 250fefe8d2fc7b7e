//! Aggregation of the four judge verdicts into a single result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::verdict::{JudgeVerdict, Winner};

/// Number of judges on every panel.
pub const JUDGE_COUNT: usize = 4;

/// Outcome from the human's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    /// Score used by the rating update: 1 for a win, 0 for a loss, ½ for a tie.
    pub fn actual_score(&self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Loss => 0.0,
            Outcome::Tie => 0.5,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => f.write_str("WIN"),
            Outcome::Loss => f.write_str("LOSS"),
            Outcome::Tie => f.write_str("TIE"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VoteBreakdown {
    pub human: u32,
    pub ai: u32,
    pub tie: u32,
}

/// Per-dimension averages, each 0-10.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AverageScores {
    pub logic: u32,
    pub evidence: u32,
    pub rhetoric: u32,
}

impl AverageScores {
    /// Combined score on the 0-30 scale.
    pub fn total(&self) -> u32 {
        self.logic + self.evidence + self.rhetoric
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DebateResults {
    pub outcome: Outcome,
    pub vote_breakdown: VoteBreakdown,
    pub average_scores: AverageScores,
    /// Verdicts in the order the judges were asked.
    pub judge_details: Vec<JudgeVerdict>,
}

/// Combine a full panel of verdicts.
///
/// The human wins with more HUMAN than AI votes, loses with more AI than HUMAN
/// votes, and ties otherwise. Scores are averaged and rounded half up.
pub fn calculate_results(verdicts: [JudgeVerdict; JUDGE_COUNT]) -> DebateResults {
    let mut votes = VoteBreakdown::default();
    for verdict in &verdicts {
        match verdict.winner {
            Winner::Human => votes.human += 1,
            Winner::Ai => votes.ai += 1,
            Winner::Tie => votes.tie += 1,
        }
    }

    let outcome = if votes.human > votes.ai {
        Outcome::Win
    } else if votes.ai > votes.human {
        Outcome::Loss
    } else {
        Outcome::Tie
    };

    let average_scores = AverageScores {
        logic: rounded_mean(verdicts.iter().map(|v| v.logic)),
        evidence: rounded_mean(verdicts.iter().map(|v| v.evidence)),
        rhetoric: rounded_mean(verdicts.iter().map(|v| v.rhetoric)),
    };

    DebateResults {
        outcome,
        vote_breakdown: votes,
        average_scores,
        judge_details: verdicts.into(),
    }
}

fn rounded_mean(values: impl Iterator<Item = u32>) -> u32 {
    let (sum, count) = values.fold((0u32, 0u32), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0;
    }
    (2 * sum + count) / (2 * count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(logic: u32, evidence: u32, rhetoric: u32, winner: Winner) -> JudgeVerdict {
        JudgeVerdict {
            logic,
            evidence,
            rhetoric,
            winner,
            feedback: format!("{winner} by {logic}/{evidence}/{rhetoric}"),
        }
    }

    #[test]
    fn test_two_human_one_ai_one_tie_is_win() {
        let results = calculate_results([
            verdict(7, 7, 7, Winner::Human),
            verdict(6, 6, 6, Winner::Ai),
            verdict(8, 8, 8, Winner::Human),
            verdict(5, 5, 5, Winner::Tie),
        ]);
        assert_eq!(results.outcome, Outcome::Win);
        assert_eq!(
            results.vote_breakdown,
            VoteBreakdown { human: 2, ai: 1, tie: 1 }
        );
    }

    #[test]
    fn test_split_panel_is_tie() {
        let results = calculate_results([
            verdict(7, 7, 7, Winner::Human),
            verdict(6, 6, 6, Winner::Ai),
            verdict(8, 8, 8, Winner::Human),
            verdict(5, 5, 5, Winner::Ai),
        ]);
        assert_eq!(results.outcome, Outcome::Tie);

        let results = calculate_results([
            verdict(7, 7, 7, Winner::Human),
            verdict(6, 6, 6, Winner::Ai),
            verdict(8, 8, 8, Winner::Tie),
            verdict(5, 5, 5, Winner::Tie),
        ]);
        assert_eq!(results.outcome, Outcome::Tie);
        assert_eq!(results.vote_breakdown.tie, 2);
    }

    #[test]
    fn test_three_ai_votes_is_loss() {
        let results = calculate_results([
            verdict(4, 4, 4, Winner::Ai),
            verdict(4, 4, 4, Winner::Ai),
            verdict(9, 9, 9, Winner::Human),
            verdict(4, 4, 4, Winner::Ai),
        ]);
        assert_eq!(results.outcome, Outcome::Loss);
    }

    #[test]
    fn test_averages_round_half_up() {
        // logic 26/4 = 6.5 -> 7, evidence 25/4 = 6.25 -> 6, rhetoric 27/4 = 6.75 -> 7
        let results = calculate_results([
            verdict(8, 7, 9, Winner::Human),
            verdict(6, 6, 6, Winner::Human),
            verdict(6, 6, 6, Winner::Human),
            verdict(6, 6, 6, Winner::Human),
        ]);
        assert_eq!(
            results.average_scores,
            AverageScores { logic: 7, evidence: 6, rhetoric: 7 }
        );
        assert_eq!(results.average_scores.total(), 20);
    }

    #[test]
    fn test_permutation_only_changes_detail_order() {
        let a = verdict(9, 3, 5, Winner::Human);
        let b = verdict(2, 8, 4, Winner::Ai);
        let c = verdict(6, 6, 10, Winner::Tie);
        let d = verdict(7, 1, 0, Winner::Human);

        let forward = calculate_results([a.clone(), b.clone(), c.clone(), d.clone()]);
        let reversed = calculate_results([d.clone(), c.clone(), b.clone(), a.clone()]);

        assert_eq!(forward.outcome, reversed.outcome);
        assert_eq!(forward.vote_breakdown, reversed.vote_breakdown);
        assert_eq!(forward.average_scores, reversed.average_scores);
        assert_eq!(forward.judge_details, vec![a.clone(), b, c, d.clone()]);
        assert_eq!(reversed.judge_details[0], d);
        assert_eq!(reversed.judge_details[3], a);
    }
}
