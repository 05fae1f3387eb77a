//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{Artwork, PlaybackInfo, RepeatMode, TransportState};
use super::utils::format_duration;

pub fn status_text(playback: &PlaybackInfo) -> String {
    let Some(track) = &playback.track else {
        return " No track selected".to_string();
    };
    let icon = match playback.transport {
        TransportState::Playing => " ▶",
        TransportState::Paused => "⏸ ",
        TransportState::Loading => " …",
        TransportState::Stopped => " ■",
    };
    format!("{} {} | {} ({})", icon, track.title, track.artist, track.album)
}

pub fn controls_text(playback: &PlaybackInfo) -> String {
    let shuffle_text = if playback.shuffle { "Shuffle: On" } else { "Shuffle: Off" };
    let repeat_text = match playback.repeat {
        RepeatMode::Off => "Repeat: Off",
        RepeatMode::All => "Repeat: All",
        RepeatMode::One => "Repeat: One",
    };
    let volume_text = format!("Vol: {}%", (playback.volume * 100.0).round() as u32);
    let artwork_text = match playback.artwork {
        Artwork::Ready(_) => " | Art ✓",
        Artwork::Placeholder => " | Art ✗",
        Artwork::Pending => "",
    };
    format!(
        " {} | {} | {}{} ",
        shuffle_text, repeat_text, volume_text, artwork_text
    )
}

pub fn render_progress_bar(frame: &mut Frame, area: Rect, playback: &PlaybackInfo) {
    let time_str = match playback.duration_secs {
        Some(total) => format!(
            "{} / {}",
            format_duration(playback.position_secs),
            format_duration(total)
        ),
        None => format_duration(playback.position_secs),
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("{} ", status_text(playback)))
                .title_bottom(Line::from(controls_text(playback)).right_aligned()),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(playback.progress_ratio())
        .label(time_str);

    frame.render_widget(gauge, area);
}
