//! Asynchronous work and the events it feeds back into the main loop
//!
//! The controller never awaits. It asks a `Loader` for audio, artwork and
//! server status; the network loader spawns tokio tasks whose results come
//! back as `AppEvent`s on an unbounded channel, next to remote-control
//! commands.

use std::path::PathBuf;

use tokio::sync::mpsc::UnboundedSender;

use crate::model::{Artwork, CatalogClient, Command, ServerStatus};

#[derive(Debug)]
pub enum AppEvent {
    /// Command from the OS media controls.
    Remote(Command),
    AudioLoaded {
        request: u64,
        track_id: String,
        result: Result<Vec<u8>, String>,
    },
    ArtworkLoaded {
        track_id: String,
        artwork: Artwork,
    },
    StatusLoaded(ServerStatus),
}

pub trait Loader {
    /// Fetches `/api/play/{id}`; answers with `AppEvent::AudioLoaded`.
    fn load_audio(&self, request: u64, track_id: &str);
    /// Fetches `/api/artwork/{id}`; answers with `AppEvent::ArtworkLoaded`.
    fn load_artwork(&self, track_id: &str);
    /// Fetches `/api/status`; answers only on success.
    fn load_status(&self);
}

pub struct NetworkLoader {
    client: CatalogClient,
    events: UnboundedSender<AppEvent>,
    artwork_dir: PathBuf,
}

impl NetworkLoader {
    pub fn new(client: CatalogClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            client,
            events,
            artwork_dir: std::env::temp_dir().join("era-player-artwork"),
        }
    }
}

impl Loader for NetworkLoader {
    fn load_audio(&self, request: u64, track_id: &str) {
        let client = self.client.clone();
        let events = self.events.clone();
        let track_id = track_id.to_string();
        tokio::spawn(async move {
            let result = client.fetch_audio(&track_id).await.map_err(|e| e.to_string());
            match &result {
                Ok(bytes) => tracing::debug!(track_id = %track_id, request, bytes = bytes.len(), "Audio fetched"),
                Err(e) => tracing::error!(track_id = %track_id, request, error = %e, "Audio fetch failed"),
            }
            let _ = events.send(AppEvent::AudioLoaded {
                request,
                track_id,
                result,
            });
        });
    }

    fn load_artwork(&self, track_id: &str) {
        let client = self.client.clone();
        let events = self.events.clone();
        let dir = self.artwork_dir.clone();
        let track_id = track_id.to_string();
        tokio::spawn(async move {
            let artwork = match client.fetch_artwork(&track_id).await {
                Ok(Some(bytes)) => match cache_artwork(&dir, &track_id, &bytes).await {
                    Ok(path) => Artwork::Ready(format!("file://{}", path.display())),
                    Err(e) => {
                        tracing::warn!(track_id = %track_id, error = %e, "Could not cache artwork");
                        Artwork::Placeholder
                    }
                },
                Ok(None) => Artwork::Placeholder,
                Err(e) => {
                    tracing::warn!(track_id = %track_id, error = %e, "Artwork fetch failed");
                    Artwork::Placeholder
                }
            };
            let _ = events.send(AppEvent::ArtworkLoaded { track_id, artwork });
        });
    }

    fn load_status(&self) {
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            match client.fetch_status().await {
                Ok(status) => {
                    let _ = events.send(AppEvent::StatusLoaded(status));
                }
                Err(e) => tracing::warn!(error = %e, "Server status unavailable"),
            }
        });
    }
}

async fn cache_artwork(dir: &std::path::Path, track_id: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.jpg", file_stem(track_id)));
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

/// Track ids are opaque; keep only characters that are safe in a file name.
fn file_stem(track_id: &str) -> String {
    track_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
