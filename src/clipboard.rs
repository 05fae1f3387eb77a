//! Clipboard access for share links

use std::io;

use anyhow::Result;
use crossterm::{clipboard::CopyToClipboard, execute};

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// Copies through the terminal with an OSC 52 escape sequence, which also
/// works over SSH.
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        execute!(io::stdout(), CopyToClipboard::to_clipboard_from(text))?;
        Ok(())
    }
}
