//! Keystroke polling using crossterm
//!
//! Features:
//! - Non-blocking key polling that doubles as the frame pacing delay
//! - q / Esc / Ctrl+C end the session

use crossterm::event::{self, KeyCode, KeyEvent, KeyModifiers};
use std::io::Result as IoResult;
use std::time::Duration;

/// Handles user input from terminal
pub struct InputHandler {
    poll_timeout: Duration,
}

impl InputHandler {
    pub fn new(poll_timeout: Duration) -> Self {
        InputHandler { poll_timeout }
    }

    /// Enable raw mode for terminal input
    pub fn enable_raw_mode() -> IoResult<()> {
        crossterm::terminal::enable_raw_mode()
    }

    /// Disable raw mode and restore terminal
    pub fn disable_raw_mode() -> IoResult<()> {
        crossterm::terminal::disable_raw_mode()
    }

    /// Poll for keystroke with timeout
    /// Returns Some(KeyEvent) if key pressed, None if timeout
    pub fn read_key(&self) -> IoResult<Option<KeyEvent>> {
        if event::poll(self.poll_timeout)? {
            match event::read()? {
                event::Event::Key(key_event) => Ok(Some(key_event)),
                _ => Ok(None),
            }
        } else {
            Ok(None)
        }
    }

    /// Wait one frame; true if the user asked to stop
    pub fn should_quit(&self) -> IoResult<bool> {
        Ok(self.read_key()?.is_some_and(|key| Self::is_exit(&key)))
    }

    /// Check if key event is an exit signal (q, Ctrl+C or Escape)
    pub fn is_exit(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Char('q') | KeyCode::Esc => true,
            _ => false,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
