//! Key event handling

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{ActiveSection, Command};

use super::AppController;
use super::playback::SEEK_STEP_SECS;

/// Playback keys, shared by every pane except the search box.
pub fn key_command(key: &KeyEvent) -> Option<Command> {
    match key.code {
        KeyCode::Char(' ') => Some(Command::TogglePlay),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Command::Next),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Command::Previous),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::ToggleShuffle),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Command::CycleRepeat),
        KeyCode::Char('x') | KeyCode::Char('X') => Some(Command::Stop),
        KeyCode::Left => Some(Command::SeekBy(-SEEK_STEP_SECS)),
        KeyCode::Right => Some(Command::SeekBy(SEEK_STEP_SECS)),
        _ => None,
    }
}

impl AppController {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && matches!(key.code, KeyCode::Char('c')) {
            self.quit();
            return;
        }

        // Help popup swallows everything until closed
        if self.ui.show_help_popup {
            if matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('q')
            ) {
                self.toggle_help();
            }
            return;
        }

        if self.ui.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => self.cycle_section_forward(),
                KeyCode::BackTab => self.cycle_section_backward(),
                KeyCode::Enter | KeyCode::Down => self.search_submit(),
                KeyCode::Esc => self.search_cancel(),
                KeyCode::Backspace => self.search_backspace(Instant::now()),
                KeyCode::Char(c) => self.search_push(c, Instant::now()),
                _ => {}
            }
            return;
        }

        if let Some(command) = key_command(&key) {
            self.dispatch(command);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => self.quit(),
            KeyCode::Char('/') => self.focus(ActiveSection::Search),
            KeyCode::Tab => self.cycle_section_forward(),
            KeyCode::BackTab => self.cycle_section_backward(),
            KeyCode::Up => self.move_selection_up(),
            KeyCode::Down => self.move_selection_down(),
            KeyCode::Enter => self.activate_selected(),
            KeyCode::Esc if self.has_search() => self.search_cancel(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.volume_up(),
            KeyCode::Char('-') => self.volume_down(),
            KeyCode::Char('y') | KeyCode::Char('Y') => self.copy_share_link(),
            KeyCode::Char('h') | KeyCode::Char('H') => self.toggle_help(),
            _ => {}
        }
    }
}
