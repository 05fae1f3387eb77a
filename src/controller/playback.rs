//! Command dispatch and transport control

use crate::model::{
    Artwork, Command, RepeatMode, Step, Track, TrackMetadata, TransportState, clamp_resume,
};

use super::{AppController, PendingLoad, persist};

const VOLUME_STEP: f32 = 0.05;
pub(super) const SEEK_STEP_SECS: f64 = 5.0;

impl AppController {
    /// Single entry point for keyboard and remote commands.
    pub fn dispatch(&mut self, command: Command) {
        if self.is_loading() && command.is_transport_control() {
            tracing::debug!(?command, "Ignoring transport control while a track loads");
            return;
        }
        tracing::debug!(?command, "Dispatching command");

        match command {
            Command::Play => self.resume(),
            Command::Pause => self.pause(),
            Command::TogglePlay => {
                if self.transport_state == TransportState::Playing {
                    self.pause();
                } else {
                    self.resume();
                }
            }
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::Stop => self.stop(),
            Command::Activate(track_id) => self.play(&track_id),
            Command::SetShuffle(enabled) => self.set_shuffle(enabled),
            Command::ToggleShuffle => self.set_shuffle(!self.state.shuffle_enabled),
            Command::SetRepeat(mode) => self.set_repeat(mode),
            Command::CycleRepeat => self.set_repeat(self.state.repeat_mode.cycle()),
            Command::SetVolume(volume) => self.set_volume(volume),
            Command::SeekBy(delta) => self.seek_by(delta),
        }
    }

    /// Starts `track_id`. The track that was current when the session was last
    /// saved resumes where it left off; any other track starts from zero.
    pub fn play(&mut self, track_id: &str) {
        let Some(index) = self.catalog.index_of(track_id) else {
            tracing::debug!(track_id, "Ignoring play for unknown track");
            return;
        };

        let resume = if self.session.persisted_track_id().as_deref() == Some(track_id) {
            self.session.persisted_resume_position().unwrap_or(0.0)
        } else {
            persist("resume position", self.session.clear_resume_position());
            0.0
        };
        let listed = self.catalog.track(index).and_then(Track::length_secs);
        self.start_track(index, clamp_resume(resume, listed));
    }

    pub fn volume_up(&mut self) {
        self.dispatch(Command::SetVolume(self.state.volume + VOLUME_STEP));
    }

    pub fn volume_down(&mut self) {
        self.dispatch(Command::SetVolume(self.state.volume - VOLUME_STEP));
    }

    fn start_track(&mut self, index: usize, start_secs: f64) {
        let Some(track) = self.catalog.track(index) else {
            return;
        };
        let track_id = track.id.clone();
        let metadata = TrackMetadata::from_track(track, &self.options.default_artist);

        self.sequencer.select(&mut self.state, &self.catalog, index);
        self.state.resume_position = start_secs;
        persist("current track", self.session.save_current_track(Some(&track_id)));

        // A newer request supersedes whatever is still in flight
        self.transport.unload();
        self.loaded_track = None;
        self.load_counter += 1;
        let request = self.load_counter;
        self.pending = Some(PendingLoad {
            request,
            track_id: track_id.clone(),
            start_secs,
        });
        self.transport_state = TransportState::Loading;
        self.artwork = Artwork::Pending;

        tracing::info!(track_id = %track_id, request, start_secs, "Loading track");
        self.bridge.publish_track(&metadata);
        self.bridge.publish_transport(TransportState::Loading, start_secs);
        self.now_playing = Some(metadata);

        self.loader.load_audio(request, &track_id);
        self.loader.load_artwork(&track_id);
    }

    fn resume(&mut self) {
        if self.loaded_track.is_some() {
            match self.transport.play() {
                Ok(()) => {
                    self.transport_state = TransportState::Playing;
                    self.bridge
                        .publish_transport(TransportState::Playing, self.transport.position_secs());
                    tracing::info!("Playback resumed");
                }
                Err(e) => self.playback_failed(&e),
            }
            return;
        }

        match self.state.current_track_id.clone() {
            Some(track_id) => self.play(&track_id),
            None => self.next(),
        }
    }

    fn pause(&mut self) {
        if self.loaded_track.is_none() || self.transport_state != TransportState::Playing {
            return;
        }
        self.transport.pause();
        let position = self.transport.position_secs();
        self.state.resume_position = position;
        persist("resume position", self.session.save_resume_position(position));
        self.transport_state = TransportState::Paused;
        self.bridge.publish_transport(TransportState::Paused, position);
        tracing::info!(position, "Playback paused");
    }

    /// Pauses and rewinds, keeping the current track selected.
    fn stop(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!(request = pending.request, "Abandoning in-flight load");
        }
        if self.loaded_track.is_some() {
            self.transport.pause();
            if self.transport.is_finished() {
                self.transport.unload();
                self.loaded_track = None;
            } else if let Err(e) = self.transport.seek(0.0) {
                tracing::warn!(error = %e, "Could not rewind on stop");
            }
        }

        self.state.resume_position = 0.0;
        if self.state.current_track_id.is_some() {
            persist("resume position", self.session.save_resume_position(0.0));
        }
        self.transport_state = TransportState::Stopped;
        self.bridge.publish_transport(TransportState::Stopped, 0.0);
        if self.state.current_track_id.is_none() {
            self.bridge.clear();
        }
        tracing::info!("Playback stopped");
    }

    fn next(&mut self) {
        let step = self.sequencer.next(&self.state);
        self.apply_step(step);
    }

    fn previous(&mut self) {
        let elapsed = if self.loaded_track.is_some() {
            self.transport.position_secs()
        } else {
            self.state.resume_position
        };
        let step = self.sequencer.previous(&self.state, elapsed);
        self.apply_step(step);
    }

    fn apply_step(&mut self, step: Step) {
        tracing::debug!(?step, "Sequencer step");
        match step {
            Step::Load(index) => {
                if let Some(track_id) = self.catalog.track(index).map(|t| t.id.clone()) {
                    self.play(&track_id);
                }
            }
            Step::Restart => self.restart(),
            Step::Stop => self.stop(),
            Step::Idle => {}
        }
    }

    /// Seeks the current track to zero, reloading it when the source has
    /// already run out.
    fn restart(&mut self) {
        self.state.resume_position = 0.0;
        persist("resume position", self.session.save_resume_position(0.0));

        if self.loaded_track.is_some() && !self.transport.is_finished() {
            match self.transport.seek(0.0) {
                Ok(()) => {
                    self.bridge.publish_transport(self.transport_state, 0.0);
                    tracing::debug!("Restarted current track");
                }
                Err(e) => tracing::warn!(error = %e, "Could not restart track"),
            }
            return;
        }

        if let Some(index) = self
            .state
            .current_track_id
            .as_deref()
            .and_then(|id| self.catalog.index_of(id))
        {
            self.start_track(index, 0.0);
        }
    }

    fn set_shuffle(&mut self, enabled: bool) {
        self.sequencer.set_shuffle(&mut self.state, &self.catalog, enabled);
        persist("shuffle", self.session.save_shuffle(enabled));
        tracing::info!(enabled, "Shuffle changed");
        self.set_status(if enabled { "Shuffle on" } else { "Shuffle off" });
    }

    fn set_repeat(&mut self, mode: RepeatMode) {
        self.sequencer.set_repeat(&mut self.state, mode);
        persist("repeat mode", self.session.save_repeat(mode));
        tracing::info!(%mode, "Repeat mode changed");
        self.set_status(format!("Repeat {mode}"));
    }

    fn set_volume(&mut self, volume: f32) {
        if !volume.is_finite() {
            return;
        }
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        self.transport.set_volume(volume);
        persist("volume", self.session.save_volume(volume));
        tracing::debug!(volume, "Volume changed");
    }

    fn seek_by(&mut self, delta: f64) {
        if self.loaded_track.is_none() || !delta.is_finite() {
            return;
        }
        let target = clamp_resume(
            self.transport.position_secs() + delta,
            self.transport.duration_secs(),
        );
        match self.transport.seek(target) {
            Ok(()) => {
                if self.transport_state == TransportState::Playing {
                    self.state.resume_position = target;
                    persist("resume position", self.session.save_resume_position(target));
                }
                self.bridge.publish_transport(self.transport_state, target);
                tracing::debug!(target, "Seeked");
            }
            Err(e) => tracing::warn!(error = %e, target, "Seek failed"),
        }
    }

    /// Follows the transport while playing: end of track and progress.
    pub(super) fn follow_transport(&mut self) {
        if self.loaded_track.is_none() || self.transport_state != TransportState::Playing {
            return;
        }
        if self.transport.is_finished() {
            tracing::debug!(track_id = ?self.loaded_track, "Track ended");
            self.next();
            return;
        }
        let position = self.transport.position_secs();
        self.state.resume_position = position;
        if let Err(e) = self.session.record_progress(position) {
            tracing::warn!(error = %e, "Failed to persist progress");
        }
    }

    pub(super) fn playback_failed(&mut self, error: &anyhow::Error) {
        tracing::error!(error = %error, track_id = ?self.state.current_track_id, "Playback failed to start");
        self.pending = None;
        self.transport_state = TransportState::Paused;
        self.bridge
            .publish_transport(TransportState::Paused, self.state.resume_position);
    }
}
