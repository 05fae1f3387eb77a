//! Track pane rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{ActiveSection, UiState};
use super::listing::{Listing, ListingMode, Row};
use super::utils::{calculate_track_column_widths, render_scrollable_list, truncate_string};

pub fn render_tracks(frame: &mut Frame, area: Rect, ui_state: &UiState, listing: &Listing) {
    let focused = ui_state.active_section == ActiveSection::Tracks;
    let title = match &listing.mode {
        ListingMode::Section { era } => format!(" {} ", era),
        ListingMode::Search { query } => {
            format!(" Search: \"{}\" ({} results) ", query, listing.rows.len())
        }
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if focused {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        });

    if listing.rows.is_empty() {
        let message = if listing.is_search() {
            "No tracks match your search"
        } else {
            "This era has no tracks"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .block(block.padding(Padding::uniform(1)));
        frame.render_widget(empty, area);
        return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let with_era = listing.is_search();
    let widths = calculate_track_column_widths(inner.width as usize, listing.rows.len(), with_era);

    let header = Paragraph::new(header_line(widths, with_era))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(header, chunks[0]);

    let items: Vec<ListItem> = listing
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let is_current = ui_state.current_track_id.as_deref() == Some(row.id.as_str());
            let is_loading = ui_state.loading_track_id.as_deref() == Some(row.id.as_str());
            let style = if i == ui_state.track_selected && focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if i == ui_state.track_selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(row_line(i, row, widths, is_current, is_loading)).style(style)
        })
        .collect();

    render_scrollable_list(
        frame,
        chunks[1],
        items,
        ui_state.track_selected,
        Block::default(),
    );
}

fn header_line(widths: (usize, usize, usize, usize, usize), with_era: bool) -> String {
    let (num_width, title_width, credits_width, era_width, _) = widths;
    let era = if with_era {
        format!("{:<era_width$}   ", "Era", era_width = era_width)
    } else {
        String::new()
    };
    format!(
        " {:<num_width$}   {:<title_width$}   {:<credits_width$}   {}{}",
        "#",
        "Title",
        "Credits",
        era,
        "Length",
        num_width = num_width,
        title_width = title_width,
        credits_width = credits_width,
    )
}

fn row_line(
    position: usize,
    row: &Row,
    widths: (usize, usize, usize, usize, usize),
    is_current: bool,
    is_loading: bool,
) -> String {
    let (num_width, title_width, credits_width, era_width, _) = widths;
    let marker = if is_loading {
        "…"
    } else if is_current {
        "▶"
    } else {
        " "
    };
    let track_num = format!("{}{:<width$}", marker, position + 1, width = num_width);

    let tags: Vec<&str> = [row.quality.as_deref(), row.available.as_deref()]
        .into_iter()
        .flatten()
        .filter(|tag| !tag.is_empty())
        .collect();
    let title = if tags.is_empty() {
        row.title.clone()
    } else {
        format!("{} [{}]", row.title, tags.join(", "))
    };
    let title = truncate_string(&title, title_width);
    let credits = truncate_string(&row.credits, credits_width);
    let era = match row.era_label.as_deref() {
        Some(label) => format!("{}   ", truncate_string(label, era_width)),
        None => String::new(),
    };
    let length = row.length.as_deref().unwrap_or("--:--");

    format!("{}   {}   {}   {}{}", track_num, title, credits, era, length)
}
