//! Core type definitions for the application

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::catalog_client::ServerStatus;

/// Which pane of the UI is currently focused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActiveSection {
    Search,
    Sections,
    #[default]
    Tracks,
}

impl ActiveSection {
    pub fn next(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Sections,
            ActiveSection::Sections => ActiveSection::Tracks,
            ActiveSection::Tracks => ActiveSection::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveSection::Search => ActiveSection::Tracks,
            ActiveSection::Sections => ActiveSection::Search,
            ActiveSection::Tracks => ActiveSection::Sections,
        }
    }
}

/// UI state snapshot handed to the view each frame
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_section: ActiveSection,
    pub search_input: String,
    pub search_pending: bool,
    pub section_selected: usize,
    pub track_selected: usize,
    pub current_track_id: Option<String>,
    pub loading_track_id: Option<String>,
    pub status_message: Option<String>,
    pub server_status: Option<ServerStatus>,
    pub show_help_popup: bool,
}

/// Repeat mode state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    #[default]
    Off,
    One,
    All,
}

impl RepeatMode {
    /// Off -> All -> One -> Off, the order the repeat button cycles through.
    pub fn cycle(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RepeatMode::Off => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" => Ok(RepeatMode::Off),
            "one" => Ok(RepeatMode::One),
            "all" => Ok(RepeatMode::All),
            other => Err(format!("unknown repeat mode: {other}")),
        }
    }
}

/// Transport state as shown in the footer and published to media controls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransportState {
    #[default]
    Stopped,
    Loading,
    Playing,
    Paused,
}

/// Everything that can change playback, whichever surface it came from.
///
/// Keyboard handlers and OS media-control callbacks both produce these and
/// hand them to `AppController::dispatch`.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Play,
    Pause,
    TogglePlay,
    Next,
    Previous,
    Stop,
    Activate(String),
    SetShuffle(bool),
    ToggleShuffle,
    SetRepeat(RepeatMode),
    CycleRepeat,
    SetVolume(f32),
    /// Relative seek in seconds.
    SeekBy(f64),
}

impl Command {
    /// Commands that drive the transport and are locked out while a track loads.
    pub fn is_transport_control(&self) -> bool {
        matches!(
            self,
            Command::Play | Command::Pause | Command::TogglePlay | Command::Next | Command::Previous
        )
    }
}
