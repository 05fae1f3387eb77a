//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `listing`: What the panes show, derived from the catalog and search
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Main layout structure (top bar, era selector)
//! - `content`: Track pane rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Status line, help popup and the catalog error screen

pub mod listing;
mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{PlaybackInfo, UiState};
use listing::Listing;

pub use overlays::render_catalog_error;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, playback: &PlaybackInfo, ui_state: &UiState, listing: &Listing) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + server status
                Constraint::Min(0),    // Eras + tracks
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30), // Era selector
                Constraint::Percentage(70), // Tracks
            ])
            .split(chunks[1]);

        layout::render_sections(frame, main_chunks[0], ui_state, listing);
        content::render_tracks(frame, main_chunks[1], ui_state, listing);

        progress::render_progress_bar(frame, chunks[2], playback);

        if let Some(message) = &ui_state.status_message {
            overlays::render_status_message(frame, main_chunks[1], message);
        }

        if ui_state.show_help_popup {
            overlays::render_help_popup(frame);
        }
    }
}
