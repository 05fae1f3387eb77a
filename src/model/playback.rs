//! Playback-related types and state management

use super::catalog::{Track, clean_title, primary_artist};
use super::types::{RepeatMode, TransportState};

pub const DEFAULT_VOLUME: f32 = 0.7;

/// The session state shared by the sequencer, the view and the session store.
///
/// `current_index` always points into the active ordering (shuffled when
/// `shuffle_enabled`, linear otherwise).
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    pub current_track_id: Option<String>,
    pub current_index: Option<usize>,
    pub shuffle_enabled: bool,
    pub repeat_mode: RepeatMode,
    pub volume: f32,
    /// Seconds into the current track to resume from.
    pub resume_position: f64,
    pub selected_era: String,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            current_track_id: None,
            current_index: None,
            shuffle_enabled: false,
            repeat_mode: RepeatMode::Off,
            volume: DEFAULT_VOLUME,
            resume_position: 0.0,
            selected_era: String::new(),
        }
    }
}

/// Metadata about the active track, as shown in the footer and published to
/// the OS media controls
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TrackMetadata {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub duration_secs: Option<f64>,
    pub artwork_url: Option<String>,
}

impl TrackMetadata {
    pub fn from_track(track: &Track, default_artist: &str) -> Self {
        Self {
            id: track.id.clone(),
            title: clean_title(&track.name),
            artist: primary_artist(&track.name, default_artist),
            album: track.era.clone(),
            duration_secs: track.length_secs(),
            artwork_url: None,
        }
    }
}

/// Artwork status of the active track
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Artwork {
    #[default]
    Pending,
    /// Cached image, referenced by `file://` URL.
    Ready(String),
    Placeholder,
}

/// Complete playback information for rendering the footer
#[derive(Clone, Debug, Default)]
pub struct PlaybackInfo {
    pub track: Option<TrackMetadata>,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub transport: TransportState,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub volume: f32,
    pub artwork: Artwork,
}

impl PlaybackInfo {
    pub fn progress_ratio(&self) -> f64 {
        match self.duration_secs {
            Some(total) if total > 0.0 => (self.position_secs / total).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }
}

/// Resume offset clamped into `[0, duration)`.
pub fn clamp_resume(position: f64, duration: Option<f64>) -> f64 {
    if !position.is_finite() || position <= 0.0 {
        return 0.0;
    }
    match duration {
        Some(total) if total.is_finite() && total > 0.0 => {
            position.min((total - 0.001).max(0.0))
        }
        Some(_) => 0.0,
        None => position,
    }
}
