//! Debate Arena Core Library
//!
//! Provides the debate state machine, prompt generation for the AI opponent
//! and judging panel, verdict parsing, result aggregation and the Elo ledger.

pub mod arena;
pub mod config;
pub mod debate;
pub mod debate_format;
pub mod error;
pub mod generation;
pub mod ledger;
pub mod participant;
pub mod prompts;
pub mod results;
pub mod store;
pub mod topic;
pub mod verdict;

pub use arena::{
    ArenaCallback, ArenaEvent, ArgumentOutcome, DebateArena, DebateReport, OpponentOutcome,
    StartRequest,
};
pub use config::{Config, default_config};
pub use debate::{Debate, DebateStatus, Round};
pub use debate_format::Stage;
pub use error::{ArenaError, GenerationError};
pub use generation::{ApiSettings, OpenAiGenerator, TextGenerator, sanitize_response};
pub use ledger::{Ledger, Stats, TopicMastery, update_elo};
pub use participant::{Position, Speaker};
pub use prompts::{JudgeFocus, JudgePrompt};
pub use results::{DebateResults, Outcome, calculate_results};
pub use store::{
    HistoryStore, JsonHistoryStore, JsonSessionStore, MemoryHistoryStore, MemorySessionStore,
    SessionStore,
};
pub use topic::{Difficulty, Topic, TopicCatalog};
pub use verdict::{JudgeVerdict, Winner, parse_judge_response};
