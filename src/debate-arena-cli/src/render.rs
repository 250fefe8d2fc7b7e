//! Console rendering for debates, results and stats.

use colored::Colorize;
use debate_arena_core::{Debate, DebateReport, Outcome, Speaker, Stage, Stats, Topic, Winner};

const WIDTH: usize = 70;

/// Judge feedback longer than this is cut short in the results view.
const FEEDBACK_PREVIEW: usize = 200;

fn rule() -> String {
    "═".repeat(WIDTH)
}

fn banner(title: &str) {
    println!();
    println!("{}", rule().bright_blue());
    println!("{}", format!("  {title}").bright_blue().bold());
    println!("{}", rule().bright_blue());
    println!();
}

fn outcome_label(outcome: Outcome) -> colored::ColoredString {
    match outcome {
        Outcome::Win => "🏆 YOU WIN!".bright_green().bold(),
        Outcome::Loss => "💪 OPPONENT WINS".bright_red().bold(),
        Outcome::Tie => "🤝 TIE".yellow().bold(),
    }
}

fn outcome_emoji(outcome: Option<Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Win) => "🏆",
        Some(Outcome::Loss) => "💪",
        _ => "🤝",
    }
}

pub fn topics(topics: &[&Topic]) {
    if topics.is_empty() {
        println!("{}", "No topics match.".yellow());
        return;
    }
    for topic in topics {
        println!(
            "  {:>3}. {} {}",
            topic.id,
            topic.topic.bright_white(),
            format!("[{}, {}]", topic.category, topic.difficulty).dimmed()
        );
    }
}

pub fn new_debate(debate: &Debate) {
    banner("🎭 NEW DEBATE");
    println!("{} {}", "📌 Topic:".bold(), debate.topic.bright_white());
    println!("{} {}", "🏷️  Category:".bold(), debate.category);
    println!("{} {}", "⚡ Difficulty:".bold(), debate.difficulty);
    println!();
    println!(
        "{} {}",
        "🎯 Your Position:".bold(),
        debate.human_position.display_name().yellow().bold()
    );
    println!();
    println!(
        "You will argue {} this topic. Send your opening statement!",
        debate.human_position.display_name()
    );
    println!();
}

/// The participant's next move for a debate in progress.
pub fn next_turn(stage: Stage) {
    println!(
        "{} {}",
        "🎤 Your turn:".bright_cyan().bold(),
        stage.label().bright_cyan()
    );
    println!("  {}", stage.description().dimmed());
}

pub fn opponent_reply(stage: Stage, content: &str) {
    println!();
    println!(
        "{} {}",
        "▶".bright_cyan(),
        format!("🤖 {}", stage.label()).bright_cyan().bold()
    );
    for line in textwrap(content, WIDTH - 4).lines() {
        println!("  {line}");
    }
    println!();
    println!("{}", "─".repeat(WIDTH).dimmed());
}

pub fn judging() {
    banner("⚖️  JUDGING IN PROGRESS...");
    println!("Four independent judges are now evaluating the debate:");
    println!("  🧠 Judge 1: Logic specialist");
    println!("  📊 Judge 2: Evidence specialist");
    println!("  🗣️  Judge 3: Rhetoric specialist");
    println!("  🎯 Judge 4: Overall persuasion");
    println!();
}

pub fn status(debate: &Debate) {
    println!("{} {}", "📌 Topic:".bold(), debate.topic.bright_white());
    println!(
        "{} {}   {} {}",
        "You:".bold(),
        debate.human_position.display_name().yellow(),
        "Opponent:".bold(),
        debate.ai_position.display_name().yellow()
    );
    println!(
        "{} {}/8",
        "Rounds spoken:".bold(),
        debate.rounds().len()
    );
    if let Some(last) = debate.rounds().last() {
        println!();
        println!(
            "{}",
            format!("Last: {} ({})", last.stage.label(), last.speaker).dimmed()
        );
    }
    println!();
    let stage = debate.stage();
    match stage.turn_owner() {
        Some(Speaker::Human) => next_turn(stage),
        Some(Speaker::Ai) => {
            println!("{}", "Waiting for the opponent's reply.".dimmed())
        }
        None => println!("{}", "Waiting for the judges.".dimmed()),
    }
}

pub fn results(report: &DebateReport) {
    let results = &report.results;
    banner(&format!("RESULTS: {}", report.topic));
    println!("{}", outcome_label(results.outcome));
    println!();

    let votes = &results.vote_breakdown;
    println!("{}", "📊 VOTE BREAKDOWN".bold());
    println!(
        "You: {} | Opponent: {} | Tie: {}",
        votes.human, votes.ai, votes.tie
    );
    println!();

    let scores = &results.average_scores;
    println!("{}", "📈 YOUR AVERAGE SCORES".bold());
    println!("  🧠 Logic: {}/10", scores.logic);
    println!("  📊 Evidence: {}/10", scores.evidence);
    println!("  🗣️  Rhetoric: {}/10", scores.rhetoric);
    println!();
    println!("{}", "─".repeat(WIDTH).dimmed());
    println!("{}", "JUDGE FEEDBACK".bold());
    println!();

    for (i, judge) in results.judge_details.iter().enumerate() {
        let vote = match judge.winner {
            Winner::Human => "✅ YOU".bright_green(),
            Winner::Ai => "❌ OPPONENT".bright_red(),
            Winner::Tie => "🤝 TIE".yellow(),
        };
        println!("{} {}", format!("Judge {}:", i + 1).bold(), vote);
        println!(
            "  Logic: {}/10 | Evidence: {}/10 | Rhetoric: {}/10",
            judge.logic, judge.evidence, judge.rhetoric
        );
        println!("  💬 {}", truncate(&judge.feedback, FEEDBACK_PREVIEW).dimmed());
        println!();
    }

    let change = report.rating_change();
    let change = if change >= 0 {
        format!("+{change}").bright_green()
    } else {
        change.to_string().bright_red()
    };
    println!("{}", "─".repeat(WIDTH).dimmed());
    println!("{}", "📊 YOUR STATS".bold());
    println!("🎯 Elo Rating: {} ({})", report.stats.elo_rating, change);
    println!("📈 Total Debates: {}", report.stats.total_debates);
    println!(
        "🏆 Record: {}W - {}L - {}T",
        report.stats.wins, report.stats.losses, report.stats.ties
    );
    println!();
}

pub fn stats(stats: &Stats, recent: &[&Debate]) {
    banner("📊 YOUR DEBATE STATS");
    println!("{} {}", "🎯 Elo Rating:".bold(), stats.elo_rating);
    println!("{} {}", "📈 Total Debates:".bold(), stats.total_debates);
    println!(
        "{} {}W - {}L - {}T",
        "🏆 Record:".bold(),
        stats.wins,
        stats.losses,
        stats.ties
    );
    println!("{} {}%", "Win Rate:".bold(), stats.win_rate());

    let mastery = stats.mastery_by_score();
    if !mastery.is_empty() {
        println!();
        println!("{}", "📚 TOPIC MASTERY".bold());
        for (category, data) in mastery {
            println!(
                "  {}: {} debates, {}% win rate, avg score {}/30",
                category.bright_white(),
                data.debates,
                data.win_rate(),
                data.avg_score
            );
        }
    }

    if !recent.is_empty() {
        println!();
        println!("{}", "🕐 RECENT DEBATES".bold());
        history(recent);
    }
    println!();
}

pub fn history(debates: &[&Debate]) {
    if debates.is_empty() {
        println!("{}", "No debates recorded yet.".dimmed());
        return;
    }
    for debate in debates {
        let outcome = debate.results.as_ref().map(|r| r.outcome);
        let when = debate
            .completed_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "  {} {} {} {}",
            outcome_emoji(outcome),
            debate.topic,
            format!("({})", debate.category).dimmed(),
            when.dimmed()
        );
    }
}

/// Cut `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Word-wrap each paragraph to `width` columns.
fn textwrap(text: &str, width: usize) -> String {
    text.split("\n\n")
        .map(|paragraph| wrap_paragraph(paragraph, width))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn wrap_paragraph(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_line_len + word_len + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word_len;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_long_feedback() {
        let feedback = "a".repeat(250);
        let cut = truncate(&feedback, FEEDBACK_PREVIEW);
        assert_eq!(cut.len(), 203);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_truncate_short_feedback_untouched() {
        assert_eq!(truncate("Solid rebuttal.", FEEDBACK_PREVIEW), "Solid rebuttal.");
        let exact = "b".repeat(200);
        assert_eq!(truncate(&exact, FEEDBACK_PREVIEW), exact);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let feedback = "é".repeat(201);
        let cut = truncate(&feedback, FEEDBACK_PREVIEW);
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn test_textwrap_keeps_paragraphs() {
        let wrapped = textwrap("one two three\n\nfour five", 7);
        assert_eq!(wrapped, "one two\nthree\n\nfour\nfive");
    }
}
