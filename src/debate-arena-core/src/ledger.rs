//! Rating and history ledger.
//!
//! Owns every completed debate and the running statistics derived from them:
//! win/loss/tie counts, an Elo rating measured against a fixed-strength
//! reference opponent, and per-category mastery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::debate::Debate;
use crate::error::ArenaError;
use crate::results::{DebateResults, Outcome};
use crate::store::HistoryStore;

/// Rating every participant starts from, and the strength of the AI opponent.
pub const INITIAL_RATING: i32 = 1000;

/// Elo K-factor.
pub const K_FACTOR: f64 = 32.0;

/// Logistic Elo update for one game against `opponent_rating`.
pub fn update_elo(current_rating: i32, outcome: Outcome, opponent_rating: i32) -> i32 {
    let expected =
        1.0 / (1.0 + 10f64.powf(f64::from(opponent_rating - current_rating) / 400.0));
    let updated = f64::from(current_rating) + K_FACTOR * (outcome.actual_score() - expected);
    updated.round() as i32
}

/// Running performance in one topic category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopicMastery {
    pub debates: u32,
    pub wins: u32,
    /// Mean combined score, 0-30.
    pub avg_score: u32,
}

impl TopicMastery {
    fn record(&mut self, won: bool, total_score: u32) {
        self.debates += 1;
        if won {
            self.wins += 1;
        }
        let n = self.debates;
        // Incremental mean, rounded half up.
        self.avg_score = (2 * (self.avg_score * (n - 1) + total_score) + n) / (2 * n);
    }

    pub fn win_rate(&self) -> u32 {
        percent(self.wins, self.debates)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_debates: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub elo_rating: i32,
    #[serde(default)]
    pub topic_mastery: BTreeMap<String, TopicMastery>,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            total_debates: 0,
            wins: 0,
            losses: 0,
            ties: 0,
            elo_rating: INITIAL_RATING,
            topic_mastery: BTreeMap::new(),
        }
    }
}

impl Stats {
    pub fn win_rate(&self) -> u32 {
        percent(self.wins, self.total_debates)
    }

    /// Categories, strongest average score first.
    pub fn mastery_by_score(&self) -> Vec<(&str, &TopicMastery)> {
        let mut entries: Vec<_> = self
            .topic_mastery
            .iter()
            .map(|(category, mastery)| (category.as_str(), mastery))
            .collect();
        entries.sort_by(|a, b| b.1.avg_score.cmp(&a.1.avg_score));
        entries
    }
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (200 * part + whole) / (2 * whole)
}

/// The persisted ledger document.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct History {
    #[serde(default)]
    pub debates: Vec<Debate>,
    #[serde(default)]
    pub stats: Stats,
}

impl History {
    /// Apply one completed debate to the statistics and append it.
    fn record(&mut self, mut debate: Debate, results: DebateResults) {
        let outcome = results.outcome;
        let total_score = results.average_scores.total();

        self.stats.total_debates += 1;
        match outcome {
            Outcome::Win => self.stats.wins += 1,
            Outcome::Loss => self.stats.losses += 1,
            Outcome::Tie => self.stats.ties += 1,
        }
        self.stats.elo_rating = update_elo(self.stats.elo_rating, outcome, INITIAL_RATING);
        self.stats
            .topic_mastery
            .entry(debate.category.clone())
            .or_default()
            .record(outcome == Outcome::Win, total_score);

        debate.complete(results);
        self.debates.push(debate);
    }
}

/// In-memory view of the history, flushed to its store after every change.
pub struct Ledger {
    store: Box<dyn HistoryStore>,
    history: History,
}

impl Ledger {
    /// Load the ledger from `store`, starting fresh if it holds nothing.
    pub fn open(store: Box<dyn HistoryStore>) -> Result<Self, ArenaError> {
        let history = store.load()?;
        info!(
            debates = history.debates.len(),
            rating = history.stats.elo_rating,
            "loaded debate history"
        );
        Ok(Self { store, history })
    }

    pub fn stats(&self) -> &Stats {
        &self.history.stats
    }

    pub fn debates(&self) -> &[Debate] {
        &self.history.debates
    }

    pub fn is_recorded(&self, id: i64) -> bool {
        self.history.debates.iter().any(|d| d.id == id)
    }

    /// Record a finished debate.
    ///
    /// Completes the debate, updates counters, rating and mastery, and
    /// persists the result. The new state is only adopted once it has been
    /// written, so a storage failure leaves the ledger as it was.
    pub fn save_debate_result(
        &mut self,
        debate: Debate,
        results: DebateResults,
    ) -> Result<(), ArenaError> {
        if !debate.is_active() || self.is_recorded(debate.id) {
            return Err(ArenaError::AlreadyRecorded(debate.id));
        }

        let mut next = self.history.clone();
        next.record(debate, results);
        self.store.save(&next)?;
        self.history = next;

        let stats = &self.history.stats;
        info!(
            total = stats.total_debates,
            rating = stats.elo_rating,
            "recorded debate result"
        );
        Ok(())
    }

    /// The `limit` most recently completed debates, newest first.
    pub fn recent_debates(&self, limit: usize) -> Vec<&Debate> {
        // Reverse first so debates completed at the same instant list newest-recorded first.
        let mut debates: Vec<&Debate> = self.history.debates.iter().rev().collect();
        debates.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        debates.truncate(limit);
        debates
    }
}
