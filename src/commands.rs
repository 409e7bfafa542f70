//! Keyboard command handling for the editor.
//!
//! Separates key parsing from command execution: every binding is visible
//! in one match, and commands can be executed directly in tests without
//! synthesizing terminal input.

use anyhow::Result;

use quill_term::{Key, KeyPress};

use crate::session::Session;

/// An editor action triggered by keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    // Text editing
    InsertChar(char),
    InsertTab,
    InsertNewline,
    Backspace,
    DeleteForward,
    DeleteLine,

    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,

    // Undo
    Undo,

    // File and session operations
    Save,
    OpenPrompt,
    NewBuffer,
    CommandPrompt,
    Exit,

    // No operation (for unhandled keys)
    None,
}

impl EditorCommand {
    /// Parse a key press into a command.
    pub fn from_key(key: KeyPress) -> Self {
        if key.ctrl {
            return match key.ch {
                Some('q') => Self::Exit,
                Some('s') => Self::Save,
                Some('o') => Self::OpenPrompt,
                Some('n') => Self::NewBuffer,
                Some('c') => Self::CommandPrompt,
                Some('z') => Self::Undo,
                Some('x') => Self::DeleteLine,
                _ => Self::None,
            };
        }

        match key.code {
            Key::Esc => Self::Exit,
            Key::Enter => Self::InsertNewline,
            Key::Backspace => Self::Backspace,
            Key::Delete => Self::DeleteForward,
            Key::Tab => Self::InsertTab,
            Key::Up => Self::MoveUp,
            Key::Down => Self::MoveDown,
            Key::Left => Self::MoveLeft,
            Key::Right => Self::MoveRight,
            Key::Home => Self::LineStart,
            Key::End => Self::LineEnd,
            Key::PageUp => Self::PageUp,
            Key::PageDown => Self::PageDown,
            Key::Char => match key.ch {
                Some(ch) => Self::InsertChar(ch),
                Option::None => Self::None,
            },
        }
    }

    /// Execute this command on the given session.
    pub fn execute(self, session: &mut Session) -> Result<()> {
        match self {
            // Text editing
            Self::InsertChar(ch) => {
                session.insert_char(ch);
                Ok(())
            }
            Self::InsertTab => {
                session.insert_tab();
                Ok(())
            }
            Self::InsertNewline => session.insert_newline(),
            Self::Backspace => {
                session.backspace();
                Ok(())
            }
            Self::DeleteForward => {
                session.delete_forward();
                Ok(())
            }
            Self::DeleteLine => {
                session.delete_current_line();
                Ok(())
            }

            // Navigation closes the open undo group
            Self::MoveUp => {
                session.move_cursor(0, -1);
                Ok(())
            }
            Self::MoveDown => {
                session.move_cursor(0, 1);
                Ok(())
            }
            Self::MoveLeft => {
                session.move_cursor(-1, 0);
                Ok(())
            }
            Self::MoveRight => {
                session.move_cursor(1, 0);
                Ok(())
            }
            Self::LineStart => {
                session.move_to_line_edge(false);
                Ok(())
            }
            Self::LineEnd => {
                session.move_to_line_edge(true);
                Ok(())
            }
            Self::PageUp => {
                session.scroll_page(false);
                Ok(())
            }
            Self::PageDown => {
                session.scroll_page(true);
                Ok(())
            }

            Self::Undo => {
                session.undo();
                Ok(())
            }

            Self::Save => {
                session.save_requested();
                Ok(())
            }
            Self::OpenPrompt => {
                session.open_command_prompt("open ");
                Ok(())
            }
            Self::NewBuffer => {
                session.request_new();
                Ok(())
            }
            Self::CommandPrompt => {
                session.open_command_prompt("");
                Ok(())
            }
            Self::Exit => {
                session.request_exit();
                Ok(())
            }

            Self::None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: Key, ch: Option<char>, ctrl: bool) -> KeyPress {
        KeyPress { code, ch, ctrl }
    }

    #[test]
    fn test_ctrl_chords() {
        assert_eq!(
            EditorCommand::from_key(press(Key::Char, Some('s'), true)),
            EditorCommand::Save
        );
        assert_eq!(
            EditorCommand::from_key(press(Key::Char, Some('q'), true)),
            EditorCommand::Exit
        );
        assert_eq!(
            EditorCommand::from_key(press(Key::Char, Some('z'), true)),
            EditorCommand::Undo
        );
        assert_eq!(
            EditorCommand::from_key(press(Key::Char, Some('p'), true)),
            EditorCommand::None
        );
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(
            EditorCommand::from_key(press(Key::Char, Some('a'), false)),
            EditorCommand::InsertChar('a')
        );
        assert_eq!(
            EditorCommand::from_key(press(Key::Enter, None, false)),
            EditorCommand::InsertNewline
        );
        assert_eq!(
            EditorCommand::from_key(press(Key::PageDown, None, false)),
            EditorCommand::PageDown
        );
    }
}
