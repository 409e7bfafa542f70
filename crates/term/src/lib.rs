//! Terminal I/O boundary for quill.
//!
//! The editor core never parses raw terminal input or escape sequences;
//! this crate translates crossterm events into editor-domain events and
//! performs the single frame write per redraw.

use std::io::{self, Stdout, Write};

use anyhow::{Context, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{cursor, execute};

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char,
    Enter,
    Backspace,
    Tab,
    Esc,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Delete,
    Home,
    End,
}

/// One decoded key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub code: Key,
    /// Character for `Key::Char`, also set for ctrl-chords
    pub ch: Option<char>,
    pub ctrl: bool,
}

/// Input events delivered to the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyPress),
    Resize(u16, u16),
}

/// Terminal session handle. Raw mode and the alternate screen are enabled
/// on construction and restored on drop.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    /// Acquire the terminal. Failing here is unrecoverable at startup.
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide)
            .context("Failed to enter alternate screen")?;
        Ok(Self { out })
    }

    /// Current grid size as (width, height).
    pub fn size(&self) -> Result<(u16, u16)> {
        crossterm::terminal::size().context("Failed to query terminal size")
    }

    /// Block until the next event the editor cares about.
    pub fn read_event(&mut self) -> Result<InputEvent> {
        loop {
            match event::read().context("Failed to read terminal input")? {
                // Only act on Press so terminals reporting Release and
                // Repeat do not double events
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(translated) = translate_key(key.code, key.modifiers) {
                        return Ok(translated);
                    }
                }
                CrosstermEvent::Resize(width, height) => {
                    return Ok(InputEvent::Resize(width, height));
                }
                _ => {}
            }
        }
    }

    /// Write one composed frame in a single call.
    pub fn write_frame(&mut self, frame: &str) -> Result<()> {
        self.out
            .write_all(frame.as_bytes())
            .context("Failed to write frame")?;
        self.out.flush().context("Failed to flush frame")?;
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn translate_key(code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    let press = |key: Key, ch: Option<char>| Some(InputEvent::Key(KeyPress { code: key, ch, ctrl }));

    match code {
        KeyCode::Char(ch) => press(Key::Char, Some(ch)),
        KeyCode::Enter => press(Key::Enter, None),
        KeyCode::Backspace => press(Key::Backspace, None),
        KeyCode::Tab => press(Key::Tab, None),
        KeyCode::Esc => press(Key::Esc, None),
        KeyCode::Up => press(Key::Up, None),
        KeyCode::Down => press(Key::Down, None),
        KeyCode::Left => press(Key::Left, None),
        KeyCode::Right => press(Key::Right, None),
        KeyCode::PageUp => press(Key::PageUp, None),
        KeyCode::PageDown => press(Key::PageDown, None),
        KeyCode::Delete => press(Key::Delete, None),
        KeyCode::Home => press(Key::Home, None),
        KeyCode::End => press(Key::End, None),
        _ => None,
    }
}
