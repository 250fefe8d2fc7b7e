//! Prompts for the AI opponent and the judging panel.
//!
//! Templates use `{placeholder}` substitution. The judge template fixes the
//! output shape that [`crate::verdict::parse_judge_response`] reads back.

use serde::{Deserialize, Serialize};

use crate::debate::Debate;
use crate::results::JUDGE_COUNT;

/// Rendered in place of the transcript before anyone has spoken.
pub const EMPTY_TRANSCRIPT: &str = "(No arguments yet - you're going first)";

/// What a judge weighs most heavily.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JudgeFocus {
    Logic,
    Evidence,
    Rhetoric,
    Overall,
}

/// The panel, in the order judges are numbered.
pub const PANEL: [JudgeFocus; JUDGE_COUNT] = [
    JudgeFocus::Logic,
    JudgeFocus::Evidence,
    JudgeFocus::Rhetoric,
    JudgeFocus::Overall,
];

impl JudgeFocus {
    pub fn display_name(&self) -> &'static str {
        match self {
            JudgeFocus::Logic => "Logic",
            JudgeFocus::Evidence => "Evidence",
            JudgeFocus::Rhetoric => "Rhetoric",
            JudgeFocus::Overall => "Overall",
        }
    }

    /// Weighting block embedded in the judge prompt.
    pub fn criteria(&self) -> &'static str {
        match self {
            JudgeFocus::Logic => {
                "**Logic (60% weight):** Argument structure, reasoning validity, logical consistency\n\
                 **Evidence (20% weight):** Use of facts and examples\n\
                 **Rhetoric (20% weight):** Persuasiveness"
            }
            JudgeFocus::Evidence => {
                "**Evidence (60% weight):** Quality and relevance of facts, examples, and data\n\
                 **Logic (20% weight):** Reasoning structure\n\
                 **Rhetoric (20% weight):** Delivery"
            }
            JudgeFocus::Rhetoric => {
                "**Rhetoric (60% weight):** Persuasiveness, emotional appeal, communication effectiveness\n\
                 **Logic (20% weight):** Reasoning quality\n\
                 **Evidence (20% weight):** Use of support"
            }
            JudgeFocus::Overall => {
                "**Overall Persuasion:** Equal weight to Logic (33%), Evidence (33%), and Rhetoric (33%)\n\
                 Consider the debate holistically"
            }
        }
    }
}

/// A prompt addressed to one judge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JudgePrompt {
    /// 1-based judge number.
    pub number: usize,
    pub focus: JudgeFocus,
    pub prompt: String,
}

impl JudgePrompt {
    /// E.g. "Judge 2 - Evidence".
    pub fn name(&self) -> String {
        format!("Judge {} - {}", self.number, self.focus.display_name())
    }
}

/// Render the rounds so far, numbered, from the AI opponent's point of view.
pub fn format_transcript(debate: &Debate) -> String {
    if debate.rounds().is_empty() {
        return EMPTY_TRANSCRIPT.to_string();
    }

    debate
        .rounds()
        .iter()
        .enumerate()
        .map(|(i, round)| {
            format!(
                "{}. {} ({}):\n{}",
                i + 1,
                round.speaker.transcript_label(),
                round.stage.label(),
                round.text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Prompt asking the AI opponent for its next turn.
pub fn opponent_prompt(debate: &Debate) -> String {
    OPPONENT_TEMPLATE
        .replace("{topic}", &debate.topic)
        .replace("{position}", debate.ai_position.display_name())
        .replace("{transcript}", &format_transcript(debate))
}

/// One prompt per judge, sharing the transcript and output format and
/// differing only in the weighting criteria.
pub fn judge_prompts(debate: &Debate) -> [JudgePrompt; JUDGE_COUNT] {
    let base = JUDGE_TEMPLATE
        .replace("{topic}", &debate.topic)
        .replace("{human_position}", debate.human_position.display_name())
        .replace("{ai_position}", debate.ai_position.display_name());
    let transcript = format_transcript(debate);

    std::array::from_fn(|i| {
        let focus = PANEL[i];
        let number = i + 1;
        JudgePrompt {
            number,
            focus,
            prompt: base
                .replace("{number}", &number.to_string())
                .replace("{criteria}", focus.criteria())
                // Last, so text inside the transcript is never substituted.
                .replace("{transcript}", &transcript),
        }
    })
}

const OPPONENT_TEMPLATE: &str = r#"You are a skilled debater in the Debate Arena.

**Topic:** {topic}
**Your Position:** {position}
**Your Goal:** Present a compelling argument for your position

**Debate History So Far:**
{transcript}

**Instructions:**
- Be persuasive but fair
- Use logic, evidence, and rhetoric
- Address the opponent's points directly
- Keep your response under 300 words
- Stay focused on the topic

CRITICAL OUTPUT RULES:
- Output ONLY your spoken argument - no stage directions or narration
- Do NOT acknowledge being an AI - stay fully in character

**Now present your argument:**"#;

const JUDGE_TEMPLATE: &str = r#"You are Judge #{number} in the Debate Arena. You will evaluate a debate and provide an impartial score.

**Topic:** {topic}
**Human Position:** {human_position}
**AI Position:** {ai_position}

**Full Debate Transcript:**
{transcript}

**Your Evaluation Criteria:**
{criteria}

**Instructions:**
- Score the HUMAN debater on each dimension from 0-10 (integers only)
- Be fair and objective
- Provide specific feedback on strengths and weaknesses
- Declare a winner: HUMAN or AI (or TIE if truly equal)

**Format your response EXACTLY as:**
```
SCORES:
Logic: X/10
Evidence: X/10
Rhetoric: X/10

WINNER: [HUMAN/AI/TIE]

FEEDBACK:
[Your detailed feedback here]
```"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::{Position, Speaker};
    use crate::topic::{Difficulty, Topic};
    use crate::verdict::{parse_judge_response, Winner};

    fn debate() -> Debate {
        let topic = Topic::new(
            2,
            "Social media does more harm than good",
            "Society",
            Difficulty::Beginner,
        );
        Debate::new(&topic, Position::For)
    }

    #[test]
    fn test_empty_transcript_placeholder() {
        let debate = debate();
        assert_eq!(format_transcript(&debate), EMPTY_TRANSCRIPT);
        let prompt = opponent_prompt(&debate);
        assert!(prompt.contains("No arguments yet"));
        assert!(!prompt.contains("{transcript}"));
    }

    #[test]
    fn test_transcript_labels_from_opponent_view() {
        let mut debate = debate();
        debate.append_round(Speaker::Human, "cleaned text", Some("raw spoken text".into()));
        debate.append_round(Speaker::Ai, "counterpoint", None);

        let transcript = format_transcript(&debate);
        assert_eq!(
            transcript,
            "1. OPPONENT (OPENING STATEMENT):\nraw spoken text\n\n2. YOU (OPPONENT OPENING):\ncounterpoint"
        );
    }

    #[test]
    fn test_opponent_prompt_uses_ai_position() {
        let prompt = opponent_prompt(&debate());
        assert!(prompt.contains("**Topic:** Social media does more harm than good"));
        assert!(prompt.contains("**Your Position:** AGAINST"));
        assert!(prompt.contains("under 300 words"));
    }

    #[test]
    fn test_four_judges_with_distinct_criteria() {
        let mut debate = debate();
        debate.append_round(Speaker::Human, "opening", None);
        let prompts = judge_prompts(&debate);

        let names: Vec<_> = prompts.iter().map(JudgePrompt::name).collect();
        assert_eq!(
            names,
            vec![
                "Judge 1 - Logic",
                "Judge 2 - Evidence",
                "Judge 3 - Rhetoric",
                "Judge 4 - Overall"
            ]
        );
        assert!(prompts[0].prompt.contains("**Logic (60% weight):**"));
        assert!(prompts[1].prompt.contains("**Evidence (60% weight):**"));
        assert!(prompts[2].prompt.contains("**Rhetoric (60% weight):**"));
        assert!(prompts[3].prompt.contains("Equal weight"));

        for prompt in &prompts {
            assert!(prompt.prompt.contains(&format!("Judge #{}", prompt.number)));
            assert!(prompt.prompt.contains("**Human Position:** FOR"));
            assert!(prompt.prompt.contains("**AI Position:** AGAINST"));
            assert!(prompt.prompt.contains("SCORES:"));
            assert!(prompt.prompt.contains("WINNER:"));
            assert!(prompt.prompt.contains("FEEDBACK:"));
            assert!(prompt.prompt.contains("1. OPPONENT (OPENING STATEMENT):\nopening"));
            assert!(!prompt.prompt.contains("{criteria}"));
        }
    }

    #[test]
    fn test_judge_prompt_contract_round_trip() {
        let prompts = judge_prompts(&debate());
        assert!(prompts[0].prompt.contains("Logic: X/10"));

        let answer = "SCORES:\nLogic: 7\nEvidence: 8\nRhetoric: 9\n\nWINNER: HUMAN\n\nFEEDBACK:\nGreat job";
        let verdict = parse_judge_response(answer);
        assert_eq!(
            (verdict.logic, verdict.evidence, verdict.rhetoric),
            (7, 8, 9)
        );
        assert_eq!(verdict.winner, Winner::Human);
        assert_eq!(verdict.feedback, "Great job");
    }
}
