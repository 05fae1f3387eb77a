//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (repeat mode, transport state, commands, UI state)
//! - `catalog`: Tracks, sections and the canonical linear ordering
//! - `catalog_client`: HTTP client for the read-only catalog API
//! - `playback`: Session playback state and now-playing metadata
//! - `session`: Durable key/value persistence of the playback state
//! - `search`: Catalog filtering and input debouncing
//! - `sequencer`: Next/previous/shuffle decisions over the orderings

mod types;
mod playback;
pub mod catalog;
pub mod catalog_client;
pub mod session;
pub mod search;
pub mod sequencer;

// Re-export the commonly used types for convenient access
pub use types::{ActiveSection, Command, RepeatMode, TransportState, UiState};

pub use playback::{Artwork, PlaybackInfo, PlaybackState, TrackMetadata, DEFAULT_VOLUME, clamp_resume};

pub use catalog::{Catalog, Section, SectionRecord, Track, TrackRecord};

pub use catalog_client::{CatalogClient, CatalogError, ServerStatus};

pub use session::{JsonFileStore, KeyValueStore, MemoryStore, SessionError, SessionStore};

pub use search::SearchState;

pub use sequencer::{Sequencer, Step};
