//! Utility functions for rendering UI components

use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, List, ListItem, ListState},
    Frame,
};

pub fn render_scrollable_list(
    frame: &mut Frame,
    area: Rect,
    items: Vec<ListItem>,
    selected_index: usize,
    block: Block,
) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(selected_index));

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// `m:ss`, or `h:mm:ss` past an hour. Negative and non-finite inputs read as zero.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 { secs as u64 } else { 0 };
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Calculate width needed for index column (log10(n) + padding)
pub fn calculate_num_width(item_count: usize) -> usize {
    if item_count == 0 {
        2
    } else {
        let digits = (item_count as f64).log10().floor() as usize + 1;
        digits + 1
    }
}

pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.chars().count() > max_width {
        let truncated: String = s.chars().take(max_width.saturating_sub(3)).collect();
        format!("{:<width$}", format!("{}...", truncated), width = max_width)
    } else {
        format!("{:<width$}", s, width = max_width)
    }
}

/// Column widths for track rows: (num, title, credits, era, length).
/// The era column is only reserved in search mode.
pub fn calculate_track_column_widths(
    content_width: usize,
    item_count: usize,
    with_era: bool,
) -> (usize, usize, usize, usize, usize) {
    // Format: " {num}   {title}   {credits}   [{era}   ]{length}"
    let num_width = calculate_num_width(item_count) + 1;
    let length_width = 7;
    let era_width = if with_era { 16 } else { 0 };
    let era_sep = if with_era { 3 } else { 0 };
    let fixed_width = 1 + num_width + 3 + 3 + 3 + era_sep + era_width + length_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 60) / 100;
    let credits_width = remaining_width.saturating_sub(title_width);

    (num_width, title_width, credits_width, era_width, length_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_format_like_a_player_clock() {
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_duration(59.9), "0:59");
        assert_eq!(format_duration(185.0), "3:05");
        assert_eq!(format_duration(3725.0), "1:02:05");
        assert_eq!(format_duration(-4.0), "0:00");
        assert_eq!(format_duration(f64::NAN), "0:00");
    }

    #[test]
    fn truncation_pads_to_width() {
        assert_eq!(truncate_string("abc", 5), "abc  ");
        assert_eq!(truncate_string("abcdefgh", 6), "abc...");
    }

    #[test]
    fn era_column_only_in_search_mode() {
        let (_, title, credits, era, _) = calculate_track_column_widths(100, 9, false);
        assert_eq!(era, 0);
        let (_, title_s, credits_s, era_s, _) = calculate_track_column_widths(100, 9, true);
        assert_eq!(era_s, 16);
        assert!(title_s + credits_s < title + credits);
    }
}
