//! Durable session state: a flat key/value store plus typed accessors
//!
//! Every value is stored as a string under a fixed key, so the file stays
//! readable and tolerant of hand edits. Writes are not coordinated between
//! concurrently running players; whichever writes last wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use super::playback::{DEFAULT_VOLUME, PlaybackState};
use super::types::RepeatMode;

/// Persisted resume positions beyond a day are treated as corrupt.
pub const MAX_RESUME_SECS: f64 = 86_400.0;

pub mod keys {
    pub const VOLUME: &str = "volume";
    pub const SHUFFLE_ENABLED: &str = "shuffleEnabled";
    pub const REPEAT_MODE: &str = "repeatMode";
    pub const CURRENT_TRACK_ID: &str = "currentTrackId";
    pub const RESUME_POSITION: &str = "resumePosition";
    pub const SELECTED_ERA: &str = "selectedEra";
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

/// Session values kept as one JSON object on disk
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store, starting empty when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Session file is corrupt, starting fresh");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Could not read session file");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SessionError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        if self.values.get(key) == Some(&value) {
            return Ok(());
        }
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// In-memory store; clones share the same map
#[derive(Clone, Default)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.extend(pairs.into_iter().map(|(k, v)| (k.to_string(), v.to_string())));
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SessionError> {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key.to_string(), value);
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if let Ok(mut values) = self.values.lock() {
            values.remove(key);
        }
        Ok(())
    }
}

/// Typed access to the persisted session
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
    last_progress_second: Option<u64>,
}

impl SessionStore {
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            last_progress_second: None,
        }
    }

    /// Rebuilds the playback state, falling back to defaults for anything
    /// missing or malformed. `current_index` is left for the sequencer.
    pub fn restore(&self) -> PlaybackState {
        let defaults = PlaybackState::default();

        let volume = match self.backend.get(keys::VOLUME) {
            None => defaults.volume,
            Some(raw) => match raw.trim().parse::<f32>() {
                Ok(v) if (0.0..=1.0).contains(&v) => v,
                _ => {
                    tracing::warn!(value = %raw, "Ignoring invalid persisted volume");
                    DEFAULT_VOLUME
                }
            },
        };

        let shuffle_enabled = match self.backend.get(keys::SHUFFLE_ENABLED).as_deref().map(str::trim) {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => {
                tracing::warn!(value = %other, "Ignoring invalid persisted shuffle flag");
                false
            }
        };

        let repeat_mode = match self.backend.get(keys::REPEAT_MODE) {
            None => RepeatMode::Off,
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring invalid persisted repeat mode");
                RepeatMode::Off
            }),
        };

        PlaybackState {
            current_track_id: self.persisted_track_id(),
            current_index: None,
            shuffle_enabled,
            repeat_mode,
            volume,
            resume_position: self.persisted_resume_position().unwrap_or(0.0),
            selected_era: self.backend.get(keys::SELECTED_ERA).unwrap_or_default(),
        }
    }

    pub fn persisted_track_id(&self) -> Option<String> {
        self.backend
            .get(keys::CURRENT_TRACK_ID)
            .filter(|id| !id.trim().is_empty())
    }

    pub fn persisted_resume_position(&self) -> Option<f64> {
        self.backend
            .get(keys::RESUME_POSITION)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && (0.0..=MAX_RESUME_SECS).contains(secs))
    }

    pub fn save_volume(&mut self, volume: f32) -> Result<(), SessionError> {
        self.backend.set(keys::VOLUME, volume.clamp(0.0, 1.0).to_string())
    }

    pub fn save_shuffle(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.backend.set(keys::SHUFFLE_ENABLED, enabled.to_string())
    }

    pub fn save_repeat(&mut self, mode: RepeatMode) -> Result<(), SessionError> {
        self.backend.set(keys::REPEAT_MODE, mode.to_string())
    }

    pub fn save_current_track(&mut self, id: Option<&str>) -> Result<(), SessionError> {
        match id {
            Some(id) => self.backend.set(keys::CURRENT_TRACK_ID, id.to_string()),
            None => self.backend.remove(keys::CURRENT_TRACK_ID),
        }
    }

    pub fn save_resume_position(&mut self, secs: f64) -> Result<(), SessionError> {
        let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
        self.last_progress_second = Some(secs as u64);
        self.backend.set(keys::RESUME_POSITION, format!("{secs:.3}"))
    }

    /// Progress notification while playing; writes once per whole second.
    pub fn record_progress(&mut self, secs: f64) -> Result<bool, SessionError> {
        if !secs.is_finite() || secs < 0.0 {
            return Ok(false);
        }
        if self.last_progress_second == Some(secs as u64) {
            return Ok(false);
        }
        self.save_resume_position(secs)?;
        Ok(true)
    }

    pub fn clear_resume_position(&mut self) -> Result<(), SessionError> {
        self.last_progress_second = None;
        self.backend.remove(keys::RESUME_POSITION)
    }

    pub fn save_selected_era(&mut self, era: &str) -> Result<(), SessionError> {
        self.backend.set(keys::SELECTED_ERA, era.to_string())
    }
}
