//! Completions of asynchronous loads and remote commands

use anyhow::Result;

use crate::events::AppEvent;
use crate::model::{Artwork, ServerStatus, TransportState, clamp_resume};

use super::AppController;

impl AppController {
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Remote(command) => {
                tracing::debug!(?command, "Remote command");
                self.dispatch(command);
            }
            AppEvent::AudioLoaded {
                request,
                track_id,
                result,
            } => self.on_audio_loaded(request, track_id, result),
            AppEvent::ArtworkLoaded { track_id, artwork } => self.on_artwork_loaded(&track_id, artwork),
            AppEvent::StatusLoaded(status) => self.on_status_loaded(status),
        }
    }

    fn on_audio_loaded(&mut self, request: u64, track_id: String, result: Result<Vec<u8>, String>) {
        let current = self
            .pending
            .as_ref()
            .is_some_and(|p| p.request == request && p.track_id == track_id);
        if !current {
            tracing::debug!(request, track_id = %track_id, "Dropping stale audio completion");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        let started = result
            .map_err(anyhow::Error::msg)
            .and_then(|audio| self.begin_playback(track_id, audio, pending.start_secs));
        if let Err(e) = started {
            self.playback_failed(&e);
        }
    }

    fn begin_playback(&mut self, track_id: String, audio: Vec<u8>, start_secs: f64) -> Result<()> {
        self.transport.load(audio, start_secs)?;
        self.loaded_track = Some(track_id);

        let duration = self.transport.duration_secs();
        let start = clamp_resume(start_secs, duration);
        if start != start_secs {
            if let Err(e) = self.transport.seek(start) {
                tracing::warn!(error = %e, start, "Could not clamp resume position");
            }
        }
        self.state.resume_position = start;

        self.transport.set_volume(self.state.volume);
        self.transport.play()?;
        self.transport_state = TransportState::Playing;
        tracing::info!(track_id = ?self.loaded_track, start, ?duration, "Playback started");

        if let Some(metadata) = self.now_playing.as_mut() {
            if duration.is_some() && metadata.duration_secs != duration {
                metadata.duration_secs = duration;
                let metadata = metadata.clone();
                self.bridge.publish_track(&metadata);
            }
        }
        self.bridge.publish_transport(TransportState::Playing, start);
        Ok(())
    }

    fn on_artwork_loaded(&mut self, track_id: &str, artwork: Artwork) {
        let Some(metadata) = self.now_playing.as_mut().filter(|m| m.id == track_id) else {
            tracing::debug!(track_id, "Dropping artwork for a track that is no longer current");
            return;
        };
        if let Artwork::Ready(url) = &artwork {
            metadata.artwork_url = Some(url.clone());
            let metadata = metadata.clone();
            self.bridge.publish_track(&metadata);
        }
        tracing::debug!(track_id, ?artwork, "Artwork resolved");
        self.artwork = artwork;
    }

    fn on_status_loaded(&mut self, status: ServerStatus) {
        tracing::info!(
            track_count = status.track_count,
            last_refresh = ?status.last_refresh,
            "Server status received"
        );
        self.ui.server_status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::tests::harness;
    use crate::model::Command;

    #[test]
    fn remote_commands_share_the_dispatcher() {
        let mut h = harness();
        h.play("a1");
        h.controller.handle_event(AppEvent::Remote(Command::Pause));
        assert_eq!(h.controller.transport_state(), TransportState::Paused);
        h.controller.handle_event(AppEvent::Remote(Command::Next));
        assert_eq!(h.loader.last_audio().map(|(_, id)| id).as_deref(), Some("a2"));
    }

    #[test]
    fn artwork_updates_metadata_of_the_current_track_only() {
        let mut h = harness();
        h.controller.dispatch(Command::Activate("a1".into()));
        h.controller.handle_event(AppEvent::ArtworkLoaded {
            track_id: "b1".into(),
            artwork: Artwork::Ready("file:///tmp/b1.jpg".into()),
        });
        assert_eq!(h.controller.playback_info().artwork, Artwork::Pending);

        h.controller.handle_event(AppEvent::ArtworkLoaded {
            track_id: "a1".into(),
            artwork: Artwork::Ready("file:///tmp/a1.jpg".into()),
        });
        assert_eq!(
            h.surface.last_metadata().and_then(|m| m.artwork_url).as_deref(),
            Some("file:///tmp/a1.jpg")
        );
        assert!(h.controller.is_loading());
    }

    #[test]
    fn missing_artwork_does_not_block_audio() {
        let mut h = harness();
        h.controller.dispatch(Command::Activate("a1".into()));
        h.controller.handle_event(AppEvent::ArtworkLoaded {
            track_id: "a1".into(),
            artwork: Artwork::Placeholder,
        });
        h.complete_audio();
        let info = h.controller.playback_info();
        assert_eq!(info.artwork, Artwork::Placeholder);
        assert_eq!(info.transport, TransportState::Playing);
    }

    #[test]
    fn undecodable_audio_leaves_the_track_selected_and_paused() {
        let mut h = harness();
        h.transport.state().fail_load = true;
        h.play("a2");
        assert!(!h.controller.is_loading());
        assert_eq!(h.controller.transport_state(), TransportState::Paused);
        assert_eq!(h.controller.state().current_track_id.as_deref(), Some("a2"));
        assert_eq!(h.transport.state().loads, 0);
    }

    #[test]
    fn decoded_duration_is_republished() {
        let mut h = harness();
        h.transport.state().duration = Some(201.5);
        h.play("a1");
        assert_eq!(h.surface.last_metadata().and_then(|m| m.duration_secs), Some(201.5));
        assert_eq!(h.controller.playback_info().duration_secs, Some(201.5));
    }

    #[test]
    fn server_status_reaches_the_ui() {
        let mut h = harness();
        assert_eq!(h.loader.log().status, 1);
        h.controller.handle_event(AppEvent::StatusLoaded(ServerStatus {
            track_count: 5,
            ..Default::default()
        }));
        assert_eq!(h.controller.ui_state().server_status.map(|s| s.track_count), Some(5));
    }
}
