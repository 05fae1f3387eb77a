//! Audio transport: the engine that actually makes sound
//!
//! The controller only talks to the `Transport` trait. `RodioTransport`
//! decodes the bytes served by `/api/play/{id}` with rodio.

use std::io::Cursor;
use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

pub trait Transport {
    /// Replaces the current source with `audio`, positioned at `start_secs`.
    /// Playback does not start until `play` is called.
    fn load(&mut self, audio: Vec<u8>, start_secs: f64) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    fn seek(&mut self, secs: f64) -> Result<()>;
    /// Drops the loaded source, if any.
    fn unload(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn position_secs(&self) -> f64;
    fn duration_secs(&self) -> Option<f64>;
    /// The loaded source has played to its end.
    fn is_finished(&self) -> bool;
}

pub struct RodioTransport {
    stream: OutputStream,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,
}

impl RodioTransport {
    pub fn new(volume: f32) -> Result<Self> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .context("failed to open the default audio output")?;
        stream.log_on_drop(false);
        tracing::info!("Audio output opened");
        Ok(Self {
            stream,
            sink: None,
            duration: None,
            volume,
        })
    }
}

/// Converts a position in seconds, rejecting values a `Duration` cannot hold.
fn offset(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("invalid position {secs}"))
}

impl Transport for RodioTransport {
    fn load(&mut self, audio: Vec<u8>, start_secs: f64) -> Result<()> {
        self.unload();

        let source = Decoder::new(Cursor::new(audio)).context("failed to decode audio")?;
        self.duration = source.total_duration();

        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(self.volume);
        sink.pause();
        sink.append(source);
        if start_secs > 0.0 {
            match offset(start_secs) {
                Ok(start) => {
                    if let Err(e) = sink.try_seek(start) {
                        tracing::warn!(error = %e, start_secs, "Could not seek to resume position");
                    }
                }
                Err(e) => tracing::warn!(error = %e, start_secs, "Ignoring resume position"),
            }
        }
        self.sink = Some(sink);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let sink = self.sink.as_ref().context("no track loaded")?;
        sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        let sink = self.sink.as_ref().context("no track loaded")?;
        let mut target = offset(secs.max(0.0))?;
        if let Some(total) = self.duration {
            target = target.min(total);
        }
        sink.try_seek(target)
            .map_err(|e| anyhow::anyhow!("seek failed: {e}"))
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.duration = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn position_secs(&self) -> f64 {
        self.sink
            .as_ref()
            .map(|s| s.get_pos().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.duration.map(|d| d.as_secs_f64())
    }

    fn is_finished(&self) -> bool {
        self.sink.as_ref().is_some_and(|s| s.empty())
    }
}

/// Transport that plays nothing, used when no audio device is available so
/// browsing and session handling keep working.
#[derive(Default)]
pub struct SilentTransport {
    loaded: bool,
    position: f64,
}

impl Transport for SilentTransport {
    fn load(&mut self, _audio: Vec<u8>, start_secs: f64) -> Result<()> {
        self.loaded = true;
        self.position = start_secs.max(0.0);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        anyhow::ensure!(self.loaded, "no track loaded");
        Ok(())
    }

    fn pause(&mut self) {}

    fn seek(&mut self, secs: f64) -> Result<()> {
        anyhow::ensure!(self.loaded, "no track loaded");
        self.position = secs.max(0.0);
        Ok(())
    }

    fn unload(&mut self) {
        *self = Self::default();
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn position_secs(&self) -> f64 {
        self.position
    }

    fn duration_secs(&self) -> Option<f64> {
        None
    }

    fn is_finished(&self) -> bool {
        false
    }
}
