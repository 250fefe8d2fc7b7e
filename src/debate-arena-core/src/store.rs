//! Durable storage for the ledger and the active-session repository.
//!
//! Both stores read one JSON document at startup and overwrite it wholesale
//! after every change. In-memory variants back the tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::debate::Debate;
use crate::error::ArenaError;
use crate::ledger::History;

/// Where the ledger document lives.
pub trait HistoryStore: Send + Sync {
    /// Load the stored history, or a fresh one if nothing was stored yet.
    fn load(&self) -> Result<History, ArenaError>;

    /// Replace the stored history.
    fn save(&self, history: &History) -> Result<(), ArenaError>;
}

/// History kept in a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonHistoryStore {
    fn load(&self) -> Result<History, ArenaError> {
        Ok(read_json(&self.path)?.unwrap_or_default())
    }

    fn save(&self, history: &History) -> Result<(), ArenaError> {
        write_json(&self.path, history)
    }
}

/// History that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    saved: std::sync::Mutex<Option<History>>,
}

impl MemoryHistoryStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<History>>, ArenaError> {
        self.saved
            .lock()
            .map_err(|e| ArenaError::Storage(std::io::Error::other(e.to_string())))
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn load(&self) -> Result<History, ArenaError> {
        Ok(self.lock()?.clone().unwrap_or_default())
    }

    fn save(&self, history: &History) -> Result<(), ArenaError> {
        *self.lock()? = Some(history.clone());
        Ok(())
    }
}

/// One active debate per participant identity.
///
/// Calls for the same participant are expected to be serialized by the
/// caller; implementations do not guard against concurrent mutation of the
/// same debate.
pub trait SessionStore: Send + Sync {
    fn get(&self, participant: &str) -> Option<Debate>;

    fn set(&mut self, participant: &str, debate: Debate) -> Result<(), ArenaError>;

    /// Drop the participant's session. Clearing a missing session is not an error.
    fn clear(&mut self, participant: &str) -> Result<(), ArenaError>;

    fn contains(&self, participant: &str) -> bool {
        self.get(participant).is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<String, Debate>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, participant: &str) -> Option<Debate> {
        self.sessions.get(participant).cloned()
    }

    fn set(&mut self, participant: &str, debate: Debate) -> Result<(), ArenaError> {
        self.sessions.insert(participant.to_string(), debate);
        Ok(())
    }

    fn clear(&mut self, participant: &str) -> Result<(), ArenaError> {
        self.sessions.remove(participant);
        Ok(())
    }
}

/// Sessions mirrored to a JSON file so a debate survives process restarts.
#[derive(Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
    sessions: HashMap<String, Debate>,
}

impl JsonSessionStore {
    /// Open the store, reading any sessions already on disk.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ArenaError> {
        let path = path.into();
        let sessions = read_json(&path)?.unwrap_or_default();
        Ok(Self { path, sessions })
    }

    fn flush(&self) -> Result<(), ArenaError> {
        write_json(&self.path, &self.sessions)
    }
}

impl SessionStore for JsonSessionStore {
    fn get(&self, participant: &str) -> Option<Debate> {
        self.sessions.get(participant).cloned()
    }

    fn set(&mut self, participant: &str, debate: Debate) -> Result<(), ArenaError> {
        let previous = self.sessions.insert(participant.to_string(), debate);
        if let Err(e) = self.flush() {
            match previous {
                Some(debate) => self.sessions.insert(participant.to_string(), debate),
                None => self.sessions.remove(participant),
            };
            return Err(e);
        }
        Ok(())
    }

    fn clear(&mut self, participant: &str) -> Result<(), ArenaError> {
        if let Some(debate) = self.sessions.remove(participant)
            && let Err(e) = self.flush()
        {
            self.sessions.insert(participant.to_string(), debate);
            return Err(e);
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ArenaError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArenaError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    fs::rename(&tmp, path)?;
    debug!(path = %path.display(), "wrote JSON document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::{Position, Speaker};
    use crate::topic::{Difficulty, Topic};

    fn debate() -> Debate {
        let topic = Topic::new(5, "Traditional education is obsolete", "Education", Difficulty::Beginner);
        let mut debate = Debate::new(&topic, Position::Against);
        debate.append_round(Speaker::Human, "Schools teach socialization.", None);
        debate
    }

    #[test]
    fn test_missing_history_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("data").join("debate-history.json"));
        let history = store.load().unwrap();
        assert!(history.debates.is_empty());
        assert_eq!(history.stats.elo_rating, 1000);
    }

    #[test]
    fn test_history_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("data").join("debate-history.json"));

        let mut history = History::default();
        history.stats.total_debates = 3;
        history.stats.elo_rating = 1031;
        store.save(&history).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"eloRating\": 1031"));
        assert!(raw.contains("\"topicMastery\""));

        let loaded = store.load().unwrap();
        assert_eq!(loaded.stats, history.stats);
    }

    #[test]
    fn test_corrupt_history_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate-history.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonHistoryStore::new(&path);
        assert!(matches!(store.load(), Err(ArenaError::Serialization(_))));
    }

    #[test]
    fn test_memory_history_store_keeps_last_save() {
        let store = MemoryHistoryStore::default();
        assert_eq!(store.load().unwrap().stats.total_debates, 0);

        let mut history = History::default();
        history.stats.total_debates = 2;
        store.save(&history).unwrap();
        assert_eq!(store.load().unwrap().stats.total_debates, 2);
    }

    #[test]
    fn test_poisoned_memory_history_store_reports_errors() {
        let store = std::sync::Arc::new(MemoryHistoryStore::default());
        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.saved.lock().unwrap();
            panic!("writer crashed while holding the lock");
        })
        .join();

        assert!(matches!(
            store.save(&History::default()),
            Err(ArenaError::Storage(_))
        ));
        assert!(matches!(store.load(), Err(ArenaError::Storage(_))));
    }

    #[test]
    fn test_memory_session_store() {
        let mut store = MemorySessionStore::new();
        assert!(!store.contains("alice"));
        store.set("alice", debate()).unwrap();
        assert!(store.contains("alice"));
        assert!(!store.contains("bob"));
        store.clear("alice").unwrap();
        assert!(store.get("alice").is_none());
        store.clear("alice").unwrap();
    }

    #[test]
    fn test_json_session_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active-debates.json");

        let mut store = JsonSessionStore::open(&path).unwrap();
        let original = debate();
        store.set("alice", original.clone()).unwrap();

        let reopened = JsonSessionStore::open(&path).unwrap();
        let restored = reopened.get("alice").unwrap();
        assert_eq!(restored.id, original.id);
        assert_eq!(restored.rounds(), original.rounds());

        let mut reopened = reopened;
        reopened.clear("alice").unwrap();
        let reopened = JsonSessionStore::open(&path).unwrap();
        assert!(reopened.get("alice").is_none());
    }

    #[test]
    fn test_json_session_store_rolls_back_failed_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active-debates.json");
        let mut store = JsonSessionStore::open(&path).unwrap();
        let first = debate();
        store.set("alice", first.clone()).unwrap();

        // A directory where the document should be makes every flush fail.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        let err = store.set("alice", debate()).unwrap_err();
        assert!(matches!(err, ArenaError::Storage(_)));
        assert_eq!(store.get("alice").unwrap().id, first.id);

        assert!(store.set("bob", debate()).is_err());
        assert!(!store.contains("bob"));
    }

    #[test]
    fn test_json_session_store_rolls_back_failed_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("active-debates.json");
        let mut store = JsonSessionStore::open(&path).unwrap();
        store.set("alice", debate()).unwrap();

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(matches!(store.clear("alice"), Err(ArenaError::Storage(_))));
        assert!(store.contains("alice"));
    }

    #[test]
    fn test_legacy_history_document_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate-history.json");
        fs::write(
            &path,
            r#"{
  "debates": [
    {
      "id": 1767225600000,
      "topic": "Remote work is superior to office work for most professions",
      "category": "Work",
      "difficulty": "beginner",
      "humanPosition": "FOR",
      "aiPosition": "AGAINST",
      "rounds": [
        {
          "speaker": "human",
          "type": "OPENING STATEMENT",
          "content": "Commutes waste hours every week.",
          "transcript": null,
          "timestamp": "2026-01-01T00:00:05.000Z"
        },
        {
          "speaker": "ai",
          "type": "OPPONENT OPENING",
          "content": "Collaboration suffers at a distance.",
          "transcript": null,
          "timestamp": "2026-01-01T00:00:20.000Z"
        }
      ],
      "status": "completed",
      "startedAt": "2026-01-01T00:00:00.000Z",
      "completedAt": "2026-01-01T00:05:00.000Z",
      "results": {
        "outcome": "WIN",
        "voteBreakdown": { "human": 3, "ai": 1, "tie": 0 },
        "averageScores": { "logic": 7, "evidence": 6, "rhetoric": 8 },
        "judgeDetails": [
          { "logic": 7, "evidence": 6, "rhetoric": 8, "winner": "HUMAN", "feedback": "Clear." }
        ]
      }
    }
  ],
  "stats": {
    "totalDebates": 1,
    "wins": 1,
    "losses": 0,
    "ties": 0,
    "eloRating": 1016,
    "topicMastery": { "Work": { "debates": 1, "wins": 1, "avgScore": 21 } }
  }
}"#,
        )
        .unwrap();

        let history = JsonHistoryStore::new(&path).load().unwrap();
        assert_eq!(history.stats.elo_rating, 1016);
        let rounds = history.debates[0].rounds();
        assert_eq!(rounds[0].stage, crate::debate::Stage::Opening);
        assert_eq!(rounds[1].stage, crate::debate::Stage::OpponentOpening);
        assert_eq!(rounds[1].speaker, Speaker::Ai);
        assert!(rounds[0].transcript.is_none());
    }
}
