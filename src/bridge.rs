//! OS media-control integration (MPRIS on Linux, SMTC on Windows, Now
//! Playing on macOS)
//!
//! The bridge mirrors the controller's state onto a `RemoteSurface` and turns
//! remote button presses into the same `Command`s the keyboard produces.

use anyhow::{Result, anyhow};
use souvlaki::{
    MediaControlEvent, MediaControls, MediaMetadata, MediaPlayback, MediaPosition, PlatformConfig,
};
use std::time::{Duration, Instant};

use crate::model::{Command, TrackMetadata, TransportState};

const DBUS_NAME: &str = "era_player";
const DISPLAY_NAME: &str = "Era Player";
/// A repeated state is republished when the position is off by more than this.
const POSITION_JUMP_SECS: f64 = 1.5;

pub trait RemoteSurface {
    fn set_metadata(&mut self, metadata: &TrackMetadata) -> Result<()>;
    fn set_transport(&mut self, state: TransportState, position_secs: f64) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Keeps the remote surface in sync; failures are logged, never raised.
pub struct ControlBridge {
    surface: Box<dyn RemoteSurface>,
    published_track: Option<String>,
    published_state: Option<TransportState>,
    published_position: Option<(f64, Instant)>,
}

impl ControlBridge {
    /// Wraps `surface` and clears whatever a previous session left on it.
    pub fn new(surface: impl RemoteSurface + 'static) -> Self {
        let mut bridge = Self {
            surface: Box::new(surface),
            published_track: None,
            published_state: None,
            published_position: None,
        };
        bridge.clear();
        bridge
    }

    pub fn published_track(&self) -> Option<&str> {
        self.published_track.as_deref()
    }

    /// Publishes a now-playing snapshot. Called on every activation, even of
    /// the same track, so artwork and duration updates go through.
    pub fn publish_track(&mut self, metadata: &TrackMetadata) {
        tracing::debug!(id = %metadata.id, title = %metadata.title, artist = %metadata.artist, "Publishing media metadata");
        match self.surface.set_metadata(metadata) {
            Ok(()) => self.published_track = Some(metadata.id.clone()),
            Err(e) => tracing::warn!(error = %e, "Failed to publish media metadata"),
        }
    }

    /// Publishes a transport transition. A repeated state is skipped unless
    /// the position jumped (seek, restart) away from where it should be.
    pub fn publish_transport(&mut self, state: TransportState, position_secs: f64) {
        if self.published_state == Some(state) && !self.position_jumped(state, position_secs) {
            return;
        }
        if let Err(e) = self.surface.set_transport(state, position_secs) {
            tracing::warn!(error = %e, ?state, "Failed to publish transport state");
            return;
        }
        self.published_state = Some(state);
        self.published_position = Some((position_secs, Instant::now()));
    }

    fn position_jumped(&self, state: TransportState, position_secs: f64) -> bool {
        let Some((published, at)) = self.published_position else {
            return false;
        };
        let expected = match state {
            TransportState::Playing => published + at.elapsed().as_secs_f64(),
            _ => published,
        };
        (position_secs - expected).abs() > POSITION_JUMP_SECS
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.surface.clear() {
            tracing::warn!(error = %e, "Failed to clear media metadata");
        }
        self.published_track = None;
        self.published_state = Some(TransportState::Stopped);
        self.published_position = Some((0.0, Instant::now()));
    }
}

/// Maps a remote button press onto a player command.
pub fn command_for(event: &MediaControlEvent) -> Option<Command> {
    match event {
        MediaControlEvent::Play => Some(Command::Play),
        MediaControlEvent::Pause => Some(Command::Pause),
        MediaControlEvent::Toggle => Some(Command::TogglePlay),
        MediaControlEvent::Next => Some(Command::Next),
        MediaControlEvent::Previous => Some(Command::Previous),
        MediaControlEvent::Stop => Some(Command::Stop),
        _ => None,
    }
}

/// `souvlaki`-backed surface
pub struct MediaControlsSurface {
    controls: MediaControls,
}

impl MediaControlsSurface {
    /// Registers with the OS and forwards remote commands to `on_command`.
    pub fn attach<F>(on_command: F) -> Result<Self>
    where
        F: Fn(Command) + Send + 'static,
    {
        let config = PlatformConfig {
            dbus_name: DBUS_NAME,
            display_name: DISPLAY_NAME,
            hwnd: None,
        };
        let mut controls =
            MediaControls::new(config).map_err(|e| anyhow!("media controls unavailable: {e:?}"))?;
        controls
            .attach(move |event: MediaControlEvent| match command_for(&event) {
                Some(command) => {
                    tracing::debug!(?command, "Remote command received");
                    on_command(command);
                }
                None => tracing::trace!(?event, "Ignoring remote event"),
            })
            .map_err(|e| anyhow!("failed to attach media controls: {e:?}"))?;
        tracing::info!("Media controls attached");
        Ok(Self { controls })
    }
}

impl RemoteSurface for MediaControlsSurface {
    fn set_metadata(&mut self, metadata: &TrackMetadata) -> Result<()> {
        self.controls
            .set_metadata(MediaMetadata {
                title: Some(metadata.title.as_str()),
                artist: Some(metadata.artist.as_str()),
                album: Some(metadata.album.as_str()),
                cover_url: metadata.artwork_url.as_deref(),
                duration: metadata
                    .duration_secs
                    .filter(|d| *d > 0.0)
                    .and_then(media_duration),
            })
            .map_err(|e| anyhow!("{e:?}"))
    }

    fn set_transport(&mut self, state: TransportState, position_secs: f64) -> Result<()> {
        let progress = Some(MediaPosition(media_duration(position_secs.max(0.0)).unwrap_or_default()));
        let playback = match state {
            TransportState::Playing => MediaPlayback::Playing { progress },
            TransportState::Paused | TransportState::Loading => MediaPlayback::Paused { progress },
            TransportState::Stopped => MediaPlayback::Stopped,
        };
        self.controls.set_playback(playback).map_err(|e| anyhow!("{e:?}"))
    }

    fn clear(&mut self) -> Result<()> {
        self.controls
            .set_metadata(MediaMetadata::default())
            .map_err(|e| anyhow!("{e:?}"))?;
        self.controls
            .set_playback(MediaPlayback::Stopped)
            .map_err(|e| anyhow!("{e:?}"))
    }
}

fn media_duration(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}

/// Surface used when media controls are disabled or unavailable
pub struct NullSurface;

impl RemoteSurface for NullSurface {
    fn set_metadata(&mut self, _metadata: &TrackMetadata) -> Result<()> {
        Ok(())
    }

    fn set_transport(&mut self, _state: TransportState, _position_secs: f64) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}
