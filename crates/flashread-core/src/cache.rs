//! Persistence of reading sessions.
//!
//! A record is `{title, words, progress}`. The file store keeps one record per
//! source under `<cache_dir>/<sha256 of source path>/session.json` so odd
//! characters in paths never reach the filesystem. Records are loaded when a
//! session opens and saved when it closes, never per tick.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SESSION_FILE: &str = "session.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub words: Vec<String>,
    /// Word index to resume from. Anything that is not a non-negative integer
    /// reads back as 0.
    #[serde(default, deserialize_with = "lenient_index")]
    pub progress: usize,
}

fn lenient_index<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_u64()
        .and_then(|index| usize::try_from(index).ok())
        .unwrap_or(0))
}

pub trait SessionStore {
    fn load(&mut self, session_id: &str) -> Result<Option<StoredSession>>;
    fn save(&mut self, session_id: &str, session: &StoredSession) -> Result<()>;
}

/// Stable identifier for a source document.
pub fn session_id_for(source: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_os_str().to_string_lossy().as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_path(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id).join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&mut self, session_id: &str) -> Result<Option<StoredSession>> {
        let path = self.session_path(session_id);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored session");
                return Ok(None);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read session at {}", path.display()));
            }
        };
        match serde_json::from_str::<StoredSession>(&data) {
            Ok(session) => {
                info!(
                    path = %path.display(),
                    words = session.words.len(),
                    progress = session.progress,
                    "Loaded stored session"
                );
                Ok(Some(session))
            }
            Err(err) => {
                warn!(path = %path.display(), "Ignoring unreadable session record: {err}");
                Ok(None)
            }
        }
    }

    fn save(&mut self, session_id: &str, session: &StoredSession) -> Result<()> {
        let path = self.session_path(session_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache dir {}", parent.display()))?;
        }
        let contents =
            serde_json::to_string(session).context("Failed to serialize session record")?;
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write session at {}", path.display()))?;
        info!(
            path = %path.display(),
            progress = session.progress,
            "Saved session"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: HashMap<String, StoredSession>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<&StoredSession> {
        self.sessions.get(session_id)
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&mut self, session_id: &str) -> Result<Option<StoredSession>> {
        Ok(self.sessions.get(session_id).cloned())
    }

    fn save(&mut self, session_id: &str, session: &StoredSession) -> Result<()> {
        self.sessions
            .insert(session_id.to_string(), session.clone());
        Ok(())
    }
}
