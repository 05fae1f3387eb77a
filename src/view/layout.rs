//! Layout rendering (top bar, section selector)

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, ServerStatus, UiState};
use super::listing::Listing;
use super::utils::render_scrollable_list;

fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(30), // Server status
        ])
        .split(area);

    let focused = ui_state.active_section == ActiveSection::Search;
    let search_style = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_input.is_empty() && !focused {
        "Press / to search...".to_string()
    } else if focused {
        format!("{}_", ui_state.search_input)
    } else {
        ui_state.search_input.clone()
    };

    let title = if ui_state.search_pending { " Search … " } else { " Search " };
    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(border_style(focused)),
    );
    frame.render_widget(search, chunks[0]);

    let status = Paragraph::new(server_status_text(ui_state.server_status.as_ref()))
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL).title(" Server "));
    frame.render_widget(status, chunks[1]);
}

/// Track count, how long ago the server last synced and how often it does.
pub fn server_status_text(status: Option<&ServerStatus>) -> String {
    let Some(status) = status else {
        return "connecting…".to_string();
    };
    let synced = match status.last_refresh_at() {
        Some(at) => {
            let minutes = (Local::now() - at).num_minutes().max(0);
            if minutes < 1 {
                "synced just now".to_string()
            } else if minutes < 60 {
                format!("synced {}m ago", minutes)
            } else {
                format!("synced {}h ago", minutes / 60)
            }
        }
        None => "never synced".to_string(),
    };
    match status.refresh_interval_minutes.filter(|m| *m > 0) {
        Some(every) => format!("{} tracks, {} (every {}m)", status.track_count, synced, every),
        None => format!("{} tracks, {}", status.track_count, synced),
    }
}

pub fn render_sections(frame: &mut Frame, area: Rect, ui_state: &UiState, listing: &Listing) {
    let focused = ui_state.active_section == ActiveSection::Sections;

    let items: Vec<ListItem> = listing
        .sections
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let is_cursor = i == ui_state.section_selected;
            let style = if is_cursor && focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if entry.selected && !listing.is_search() {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if entry.matches == Some(0) || entry.total == 0 {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(entry.label()).style(style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Eras ")
        .padding(Padding::horizontal(1))
        .border_style(border_style(focused));

    render_scrollable_list(frame, area, items, ui_state.section_selected, block);
}
