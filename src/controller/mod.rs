//! Controller module - Application logic and event handling
//!
//! The controller owns the single `PlaybackState` and every collaborator that
//! acts on it. It is driven synchronously by the main loop: key presses,
//! `AppEvent`s from background tasks and a periodic `tick`.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Command dispatch and transport control
//! - `navigation`: Sections, search, deep and share links
//! - `player_events`: Completions of asynchronous loads

mod input;
mod playback;
mod navigation;
mod player_events;

pub use input::key_command;

use std::time::{Duration, Instant};

use reqwest::Url;

use crate::audio::Transport;
use crate::bridge::ControlBridge;
use crate::clipboard::Clipboard;
use crate::events::Loader;
use crate::model::{
    ActiveSection, Artwork, Catalog, PlaybackInfo, PlaybackState, SearchState, SessionError,
    SessionStore, Sequencer, TrackMetadata, TransportState, UiState,
};
use crate::view::listing::{Listing, build_listing};

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Settings the controller needs from the configuration
#[derive(Clone, Debug)]
pub struct ControllerOptions {
    pub default_artist: String,
    pub search_debounce: Duration,
    /// Base of share links, normally the catalog server URL.
    pub share_base: Url,
}

/// The controller's side-effecting collaborators
pub struct Services {
    pub transport: Box<dyn Transport>,
    pub bridge: ControlBridge,
    pub loader: Box<dyn Loader>,
    pub clipboard: Box<dyn Clipboard>,
}

/// An audio request whose completion has not arrived yet
#[derive(Clone, Debug)]
struct PendingLoad {
    request: u64,
    track_id: String,
    start_secs: f64,
}

pub struct AppController {
    catalog: Catalog,
    sequencer: Sequencer,
    state: PlaybackState,
    session: SessionStore,
    search: SearchState,
    listing: Listing,
    ui: UiState,
    status_until: Option<Instant>,
    transport: Box<dyn Transport>,
    transport_state: TransportState,
    loaded_track: Option<String>,
    pending: Option<PendingLoad>,
    load_counter: u64,
    now_playing: Option<TrackMetadata>,
    artwork: Artwork,
    bridge: ControlBridge,
    loader: Box<dyn Loader>,
    clipboard: Box<dyn Clipboard>,
    options: ControllerOptions,
    should_quit: bool,
}

impl AppController {
    /// Rehydrates the session against `catalog` and prepares the first view.
    pub fn new(catalog: Catalog, session: SessionStore, services: Services, options: ControllerOptions) -> Self {
        let mut state = session.restore();

        if let Some(id) = state.current_track_id.clone() {
            if catalog.index_of(&id).is_none() {
                tracing::info!(track_id = %id, "Persisted track is not in the catalog, ignoring");
                state.current_track_id = None;
                state.resume_position = 0.0;
            }
        }
        if !catalog.has_era(&state.selected_era) {
            state.selected_era = catalog.first_era().unwrap_or_default().to_string();
        }

        let mut sequencer = Sequencer::new(catalog.len());
        sequencer.reconcile(&mut state, &catalog, true);

        let Services {
            mut transport,
            bridge,
            loader,
            clipboard,
        } = services;
        transport.set_volume(state.volume);

        let now_playing = state
            .current_track_id
            .as_deref()
            .and_then(|id| catalog.get(id))
            .map(|track| TrackMetadata::from_track(track, &options.default_artist));
        let transport_state = if now_playing.is_some() {
            TransportState::Paused
        } else {
            TransportState::Stopped
        };

        let listing = build_listing(&catalog, &state, "");
        let ui = UiState {
            active_section: ActiveSection::Tracks,
            section_selected: listing.section_position(&state.selected_era).unwrap_or(0),
            track_selected: state
                .current_track_id
                .as_deref()
                .and_then(|id| listing.position_of(id))
                .unwrap_or(0),
            ..Default::default()
        };

        tracing::info!(
            tracks = catalog.len(),
            eras = catalog.sections().len(),
            current = ?state.current_track_id,
            shuffle = state.shuffle_enabled,
            repeat = %state.repeat_mode,
            "Session restored"
        );

        loader.load_status();

        Self {
            search: SearchState::new(options.search_debounce),
            catalog,
            sequencer,
            state,
            session,
            listing,
            ui,
            status_until: None,
            transport,
            transport_state,
            loaded_track: None,
            pending: None,
            load_counter: 0,
            now_playing,
            artwork: Artwork::Pending,
            bridge,
            loader,
            clipboard,
            options,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn transport_state(&self) -> TransportState {
        self.transport_state
    }

    /// A track load is in flight; transport controls are locked.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn playback_info(&self) -> PlaybackInfo {
        let loaded = self.loaded_track.is_some();
        let position_secs = if loaded {
            self.transport.position_secs()
        } else {
            self.state.resume_position
        };
        let duration_secs = loaded
            .then(|| self.transport.duration_secs())
            .flatten()
            .or_else(|| self.now_playing.as_ref().and_then(|m| m.duration_secs));
        PlaybackInfo {
            track: self.now_playing.clone(),
            position_secs,
            duration_secs,
            transport: self.transport_state,
            shuffle: self.state.shuffle_enabled,
            repeat: self.state.repeat_mode,
            volume: self.state.volume,
            artwork: self.artwork.clone(),
        }
    }

    pub fn ui_state(&self) -> UiState {
        UiState {
            search_input: self.search.input().to_string(),
            search_pending: self.search.is_pending(),
            current_track_id: self.state.current_track_id.clone(),
            loading_track_id: self.pending.as_ref().map(|p| p.track_id.clone()),
            ..self.ui.clone()
        }
    }

    /// Periodic housekeeping: applies debounced search input, expires the
    /// status line and follows the transport while it plays.
    pub fn tick(&mut self, now: Instant) {
        if self.search.poll(now) {
            self.rebuild_listing();
        }
        if self.status_until.is_some_and(|until| now >= until) {
            self.status_until = None;
            self.ui.status_message = None;
        }
        self.follow_transport();
    }

    /// Saves the resume position if playing and releases the media controls.
    pub fn shutdown(&mut self) {
        if self.loaded_track.is_some() && self.transport_state == TransportState::Playing {
            let position = self.transport.position_secs();
            persist("resume position", self.session.save_resume_position(position));
            self.transport.pause();
        }
        self.bridge.clear();
        tracing::info!("Controller shut down");
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.ui.status_message = Some(message.into());
        self.status_until = Some(Instant::now() + STATUS_MESSAGE_TTL);
    }
}

fn persist(what: &'static str, result: Result<(), SessionError>) {
    if let Err(e) = result {
        tracing::warn!(error = %e, what, "Failed to persist session state");
    }
}
