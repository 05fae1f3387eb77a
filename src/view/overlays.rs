//! Overlay rendering (status line, help popup, catalog error screen)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}

/// Transient one-line message drawn over the bottom of the track pane.
pub fn render_status_message(frame: &mut Frame, area: Rect, message: &str) {
    let width = (message.chars().count() as u16 + 4).min(area.width);
    let status_area = Rect {
        x: area.x + area.width.saturating_sub(width + 1),
        y: area.y + area.height.saturating_sub(2),
        width,
        height: 1,
    };
    frame.render_widget(Clear, status_area);
    let widget = Paragraph::new(format!("  {}  ", message))
        .style(Style::default().fg(Color::Black).bg(Color::Green));
    frame.render_widget(widget, status_area);
}

/// Full-screen notice shown when the catalog cannot be loaded.
pub fn render_catalog_error(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let popup_area = centered(area, 64, 9);

    frame.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from(Span::styled(
            "Could not load the catalog",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            "Check the server URL and try again. Press q to quit.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let error_widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Error ")
                .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        );

    frame.render_widget(error_widget, popup_area);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle panes"),
        ("↑ / ↓", "Move selection"),
        ("Enter", "Open era / Play track"),
        ("/", "Search all eras"),
        ("Esc", "Clear search"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N", "Next track"),
        ("P", "Previous track"),
        ("X", "Stop"),
        ("← / →", "Seek 5 seconds"),
        ("S", "Toggle shuffle"),
        ("R", "Cycle repeat (off → all → one)"),
        ("+ / -", "Volume up / down"),
        ("", ""),
        ("", "── General ──"),
        ("Y", "Copy share link"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_area = centered(area, 62, keybindings.len() as u16 + 2);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}
