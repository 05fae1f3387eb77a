//! Test doubles shared by the unit tests

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};

use crate::audio::Transport;
use crate::bridge::RemoteSurface;
use crate::clipboard::Clipboard;
use crate::events::Loader;
use crate::model::{Catalog, SectionRecord, TrackMetadata, TrackRecord, TransportState};

#[derive(Clone, Debug, PartialEq)]
pub enum SurfaceCall {
    Clear,
    Metadata(TrackMetadata),
    Transport(TransportState),
}

#[derive(Clone, Default)]
pub struct RecordingSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_metadata(&self) -> Option<TrackMetadata> {
        self.calls().into_iter().rev().find_map(|call| match call {
            SurfaceCall::Metadata(meta) => Some(meta),
            _ => None,
        })
    }

    pub fn last_transport(&self) -> Option<TransportState> {
        self.calls().into_iter().rev().find_map(|call| match call {
            SurfaceCall::Transport(state) => Some(state),
            _ => None,
        })
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl RemoteSurface for RecordingSurface {
    fn set_metadata(&mut self, metadata: &TrackMetadata) -> Result<()> {
        self.record(SurfaceCall::Metadata(metadata.clone()));
        Ok(())
    }

    fn set_transport(&mut self, state: TransportState, _position_secs: f64) -> Result<()> {
        self.record(SurfaceCall::Transport(state));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.record(SurfaceCall::Clear);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeTransportState {
    pub loaded: Option<f64>,
    pub loads: usize,
    pub playing: bool,
    pub finished: bool,
    pub position: f64,
    pub duration: Option<f64>,
    pub volume: f32,
    pub seeks: Vec<f64>,
    pub fail_play: bool,
    pub fail_load: bool,
}

/// Transport whose state the test can inspect and steer.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Rc<RefCell<FakeTransportState>>,
}

impl FakeTransport {
    pub fn state(&self) -> std::cell::RefMut<'_, FakeTransportState> {
        self.state.borrow_mut()
    }
}

impl Transport for FakeTransport {
    fn load(&mut self, _audio: Vec<u8>, start_secs: f64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_load {
            bail!("undecodable audio");
        }
        state.loaded = Some(start_secs);
        state.loads += 1;
        state.playing = false;
        state.finished = false;
        state.position = start_secs;
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_play || state.loaded.is_none() {
            bail!("playback refused");
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn seek(&mut self, secs: f64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.loaded.is_none() {
            bail!("no track loaded");
        }
        state.position = secs;
        state.seeks.push(secs);
        Ok(())
    }

    fn unload(&mut self) {
        let mut state = self.state.borrow_mut();
        state.loaded = None;
        state.playing = false;
        state.finished = false;
        state.position = 0.0;
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.borrow_mut().volume = volume;
    }

    fn position_secs(&self) -> f64 {
        self.state.borrow().position
    }

    fn duration_secs(&self) -> Option<f64> {
        self.state.borrow().duration
    }

    fn is_finished(&self) -> bool {
        self.state.borrow().finished
    }
}

#[derive(Debug, Default)]
pub struct LoaderLog {
    pub audio: Vec<(u64, String)>,
    pub artwork: Vec<String>,
    pub status: usize,
}

/// Loader that records requests; the test answers them with events.
#[derive(Clone, Default)]
pub struct RecordingLoader {
    log: Rc<RefCell<LoaderLog>>,
}

impl RecordingLoader {
    pub fn log(&self) -> std::cell::Ref<'_, LoaderLog> {
        self.log.borrow()
    }

    pub fn last_audio(&self) -> Option<(u64, String)> {
        self.log.borrow().audio.last().cloned()
    }
}

impl Loader for RecordingLoader {
    fn load_audio(&self, request: u64, track_id: &str) {
        self.log.borrow_mut().audio.push((request, track_id.to_string()));
    }

    fn load_artwork(&self, track_id: &str) {
        self.log.borrow_mut().artwork.push(track_id.to_string());
    }

    fn load_status(&self) {
        self.log.borrow_mut().status += 1;
    }
}

#[derive(Clone, Default)]
pub struct RecordingClipboard {
    pub copied: Rc<RefCell<Vec<String>>>,
    pub fail: bool,
}

impl Clipboard for RecordingClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if self.fail {
            bail!("terminal rejected OSC 52");
        }
        self.copied.borrow_mut().push(text.to_string());
        Ok(())
    }
}

/// Two eras with three and two tracks, listed lengths of three minutes.
pub fn sample_catalog() -> Catalog {
    let records = [
        ("a1", "Artist - Opening (feat. Guest)", "First"),
        ("a2", "Second Song", "First"),
        ("a3", "Third Song [V2]", "First"),
        ("b1", "Late Night", "Second"),
        ("b2", "Closing (prod. Someone)", "Second"),
    ]
    .into_iter()
    .map(|(id, name, era)| TrackRecord {
        id: id.into(),
        name: name.into(),
        era: era.into(),
        track_length: Some("3:00".into()),
        ..Default::default()
    })
    .collect();
    Catalog::build(
        records,
        vec![
            SectionRecord { era: "First".into() },
            SectionRecord { era: "Second".into() },
        ],
    )
}
