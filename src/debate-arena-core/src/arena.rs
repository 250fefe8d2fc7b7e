//! Debate arena: the coarse operations a command shell drives.
//!
//! Ties the topic catalog, the active-session repository and the ledger
//! together. Each participant has at most one active debate; calls for the
//! same participant are expected to be serialized by the caller.

use futures::future::try_join_all;
use tracing::{info, warn};

use crate::config::Config;
use crate::debate::{Debate, Position, Speaker, Stage};
use crate::error::ArenaError;
use crate::generation::{TextGenerator, sanitize_response};
use crate::ledger::{Ledger, Stats};
use crate::prompts::{self, JudgePrompt};
use crate::results::{DebateResults, JUDGE_COUNT, Outcome, calculate_results};
use crate::store::{JsonHistoryStore, JsonSessionStore, SessionStore};
use crate::topic::{Difficulty, Topic, TopicCatalog};
use crate::verdict::{JudgeVerdict, parse_judge_response};

/// Callback for arena events.
pub type ArenaCallback = Box<dyn Fn(ArenaEvent) + Send + Sync>;

/// Events emitted as debates progress.
#[derive(Debug, Clone)]
pub enum ArenaEvent {
    /// A debate was created for a participant.
    DebateStarted {
        participant: String,
        topic: String,
        human_position: Position,
    },
    /// A round was appended to the transcript.
    RoundRecorded {
        participant: String,
        stage: Stage,
        speaker: Speaker,
    },
    /// The judge panel has been asked for verdicts.
    JudgingStarted { participant: String },
    /// Results were recorded in the ledger.
    DebateCompleted {
        participant: String,
        outcome: Outcome,
        rating: i32,
    },
    /// An active debate was abandoned.
    DebateCancelled { participant: String },
}

/// How to pick the topic and side of a new debate.
#[derive(Debug, Clone, Default)]
pub struct StartRequest {
    /// Exact topic; a random one is drawn when absent.
    pub topic_id: Option<u32>,
    /// Restricts the random draw.
    pub difficulty: Option<Difficulty>,
    /// Human's side; a coin flip when absent.
    pub position: Option<Position>,
}

/// What happens after the human speaks.
#[derive(Debug, Clone)]
pub struct ArgumentOutcome {
    /// Stage the argument was recorded at.
    pub stage: Stage,
    pub needs_opponent: bool,
    /// Prompt for the opponent's reply, when one is needed.
    pub opponent_prompt: Option<String>,
}

/// What happens after the opponent speaks.
#[derive(Debug, Clone)]
pub struct OpponentOutcome {
    /// Stage the reply was recorded at.
    pub stage: Stage,
    /// The reply as recorded.
    pub content: String,
    /// Stage the debate moved to.
    pub next_stage: Stage,
    pub needs_judging: bool,
    /// Prompts for the panel once the transcript is complete.
    pub judge_prompts: Option<[JudgePrompt; JUDGE_COUNT]>,
}

/// Final report for a judged debate.
#[derive(Debug, Clone)]
pub struct DebateReport {
    pub topic: String,
    pub category: String,
    pub results: DebateResults,
    pub rating_before: i32,
    pub stats: Stats,
}

impl DebateReport {
    pub fn rating_change(&self) -> i32 {
        self.stats.elo_rating - self.rating_before
    }
}

pub struct DebateArena {
    catalog: TopicCatalog,
    sessions: Box<dyn SessionStore>,
    ledger: Ledger,
    callback: Option<ArenaCallback>,
}

impl DebateArena {
    pub fn new(catalog: TopicCatalog, sessions: Box<dyn SessionStore>, ledger: Ledger) -> Self {
        Self {
            catalog,
            sessions,
            ledger,
            callback: None,
        }
    }

    /// Open the file-backed session store and ledger named by `config`.
    pub fn from_config(config: &Config) -> Result<Self, ArenaError> {
        let sessions = JsonSessionStore::open(config.storage.sessions_path())?;
        let ledger = Ledger::open(Box::new(JsonHistoryStore::new(
            config.storage.history_path(),
        )))?;
        Ok(Self::new(config.catalog(), Box::new(sessions), ledger))
    }

    /// Set a callback for arena events.
    pub fn with_callback(mut self, callback: ArenaCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn catalog(&self) -> &TopicCatalog {
        &self.catalog
    }

    pub fn has_active_debate(&self, participant: &str) -> bool {
        self.sessions.contains(participant)
    }

    pub fn active_debate(&self, participant: &str) -> Option<Debate> {
        self.sessions.get(participant)
    }

    /// Create a debate for `participant`, replacing any debate in progress.
    pub fn start_debate(
        &mut self,
        participant: &str,
        request: StartRequest,
    ) -> Result<Debate, ArenaError> {
        let topic: &Topic = match request.topic_id {
            Some(id) => self.catalog.get(id)?,
            None => self.catalog.random(request.difficulty)?,
        };
        let position = request.position.unwrap_or_else(Position::random);
        let debate = Debate::new(topic, position);

        if self.sessions.contains(participant) {
            warn!(participant, "replacing unfinished debate");
        }
        self.sessions.set(participant, debate.clone())?;

        info!(participant, debate = debate.id, topic = %debate.topic, %position, "debate started");
        self.emit_event(ArenaEvent::DebateStarted {
            participant: participant.to_string(),
            topic: debate.topic.clone(),
            human_position: position,
        });
        Ok(debate)
    }

    /// Record the human's argument for the current stage.
    ///
    /// `transcript` carries the raw spoken input when `content` is a cleaned-up
    /// version of it.
    pub fn submit_argument(
        &mut self,
        participant: &str,
        content: &str,
        transcript: Option<String>,
    ) -> Result<ArgumentOutcome, ArenaError> {
        let mut debate = self.expect_turn(participant, Speaker::Human)?;
        let stage = self.record(participant, &mut debate, Speaker::Human, content, transcript)?;

        let needs_opponent = stage.requires_opponent_reply();
        let opponent_prompt = needs_opponent.then(|| prompts::opponent_prompt(&debate));
        self.sessions.set(participant, debate)?;

        Ok(ArgumentOutcome {
            stage,
            needs_opponent,
            opponent_prompt,
        })
    }

    /// Prompt for the opponent's next turn.
    pub fn opponent_prompt(&self, participant: &str) -> Result<String, ArenaError> {
        let debate = self.expect_turn(participant, Speaker::Ai)?;
        Ok(prompts::opponent_prompt(&debate))
    }

    /// Record the opponent's reply for the current stage.
    pub fn submit_opponent_response(
        &mut self,
        participant: &str,
        response: &str,
    ) -> Result<OpponentOutcome, ArenaError> {
        let mut debate = self.expect_turn(participant, Speaker::Ai)?;
        let stage = self.record(participant, &mut debate, Speaker::Ai, response, None)?;

        let needs_judging = stage.is_ready_for_judging();
        let judge_prompts = needs_judging.then(|| prompts::judge_prompts(&debate));
        let next_stage = debate.stage();
        self.sessions.set(participant, debate)?;

        Ok(OpponentOutcome {
            stage,
            content: response.to_string(),
            next_stage,
            needs_judging,
            judge_prompts,
        })
    }

    /// Prompts for the four judges once all eight turns are in.
    pub fn judge_prompts(
        &self,
        participant: &str,
    ) -> Result<[JudgePrompt; JUDGE_COUNT], ArenaError> {
        let debate = self.ready_for_judging(participant)?;
        Ok(prompts::judge_prompts(&debate))
    }

    /// Parse the panel's raw responses, aggregate them and record the result.
    ///
    /// The active session is dropped once the ledger holds the debate. A
    /// session left behind for a debate the ledger already holds is dropped
    /// here as well, and the submission rejected.
    pub fn submit_judge_responses(
        &mut self,
        participant: &str,
        responses: Vec<String>,
    ) -> Result<DebateReport, ArenaError> {
        let debate = self.unrecorded_for_judging(participant)?;

        let actual = responses.len();
        let verdicts: [JudgeVerdict; JUDGE_COUNT] = responses
            .iter()
            .map(|r| parse_judge_response(r))
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| ArenaError::InvalidJudgeCount {
                expected: JUDGE_COUNT,
                actual,
            })?;
        let results = calculate_results(verdicts);

        let rating_before = self.ledger.stats().elo_rating;
        let topic = debate.topic.clone();
        let category = debate.category.clone();
        let id = debate.id;
        self.ledger.save_debate_result(debate, results.clone())?;
        if let Err(e) = self.sessions.clear(participant) {
            // The result is already durable; the stale session is dropped on the next submission.
            warn!(participant, debate = id, error = %e, "failed to clear recorded session");
        }

        let stats = self.ledger.stats().clone();
        info!(
            participant,
            outcome = %results.outcome,
            rating = stats.elo_rating,
            "debate completed"
        );
        self.emit_event(ArenaEvent::DebateCompleted {
            participant: participant.to_string(),
            outcome: results.outcome,
            rating: stats.elo_rating,
        });

        Ok(DebateReport {
            topic,
            category,
            results,
            rating_before,
            stats,
        })
    }

    /// Ask `generator` for the opponent's turn and record it.
    ///
    /// Generation failures are returned untouched; nothing is recorded.
    pub async fn run_opponent_turn(
        &mut self,
        participant: &str,
        generator: &dyn TextGenerator,
    ) -> Result<OpponentOutcome, ArenaError> {
        let prompt = self.opponent_prompt(participant)?;
        let reply = generator.generate(&prompt).await?;
        let cleaned = sanitize_response(&reply);
        let content = if cleaned.is_empty() { reply.trim() } else { cleaned.as_str() };
        self.submit_opponent_response(participant, content)
    }

    /// Ask all four judges concurrently, then aggregate and record.
    ///
    /// If any judge fails the whole panel fails; there is no partial judging.
    pub async fn run_judging(
        &mut self,
        participant: &str,
        generator: &dyn TextGenerator,
    ) -> Result<DebateReport, ArenaError> {
        let panel = prompts::judge_prompts(&self.unrecorded_for_judging(participant)?);
        self.emit_event(ArenaEvent::JudgingStarted {
            participant: participant.to_string(),
        });

        let responses = try_join_all(panel.iter().map(|judge| generator.generate(&judge.prompt)))
            .await?;
        self.submit_judge_responses(participant, responses)
    }

    pub fn stats(&self) -> &Stats {
        self.ledger.stats()
    }

    pub fn recent_debates(&self, limit: usize) -> Vec<&Debate> {
        self.ledger.recent_debates(limit)
    }

    /// Abandon the participant's debate without recording it.
    /// Returns whether there was one to abandon.
    pub fn cancel(&mut self, participant: &str) -> Result<bool, ArenaError> {
        if !self.sessions.contains(participant) {
            return Ok(false);
        }
        self.sessions.clear(participant)?;
        info!(participant, "debate cancelled");
        self.emit_event(ArenaEvent::DebateCancelled {
            participant: participant.to_string(),
        });
        Ok(true)
    }

    fn active(&self, participant: &str) -> Result<Debate, ArenaError> {
        self.sessions
            .get(participant)
            .ok_or_else(|| ArenaError::NoActiveDebate(participant.to_string()))
    }

    /// The participant's debate, provided it is `speaker`'s turn.
    fn expect_turn(&self, participant: &str, speaker: Speaker) -> Result<Debate, ArenaError> {
        let debate = self.active(participant)?;
        let stage = debate.stage();
        if stage.turn_owner() != Some(speaker) {
            return Err(ArenaError::OutOfTurn { stage, speaker });
        }
        Ok(debate)
    }

    fn ready_for_judging(&self, participant: &str) -> Result<Debate, ArenaError> {
        let debate = self.active(participant)?;
        if !debate.is_ready_for_judging() {
            return Err(ArenaError::NotReadyForJudging {
                stage: debate.stage(),
            });
        }
        Ok(debate)
    }

    /// Like [`Self::ready_for_judging`], but drops a session whose debate the
    /// ledger already holds.
    fn unrecorded_for_judging(&mut self, participant: &str) -> Result<Debate, ArenaError> {
        let debate = self.ready_for_judging(participant)?;
        if self.ledger.is_recorded(debate.id) {
            warn!(participant, debate = debate.id, "dropping session for recorded debate");
            self.sessions.clear(participant)?;
            return Err(ArenaError::AlreadyRecorded(debate.id));
        }
        Ok(debate)
    }

    fn record(
        &self,
        participant: &str,
        debate: &mut Debate,
        speaker: Speaker,
        content: &str,
        transcript: Option<String>,
    ) -> Result<Stage, ArenaError> {
        let stage = debate
            .append_round(speaker, content, transcript)
            .ok_or_else(|| ArenaError::AlreadyRecorded(debate.id))?;
        self.emit_event(ArenaEvent::RoundRecorded {
            participant: participant.to_string(),
            stage,
            speaker,
        });
        Ok(stage)
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: ArenaEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}
