//! Line-array text buffer for quill.
//!
//! Provides text storage as a growable array of growable byte lines,
//! along with cursor/viewport management and grouped undo history.

mod buffer;
mod cursor;
mod history;
mod line;

pub use buffer::{Buffer, LINE_ARRAY_CHUNK};
pub use cursor::{Cursor, Viewport, SCROLL_MARGIN};
pub use history::{EditGroup, EditOp, History, UNDO_CAP};
pub use line::{Line, LINE_CHUNK};

/// Line ending type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    LF, // Unix \n
    CRLF, // Windows \r\n
}

impl LineEnding {
    /// Terminator bytes written between lines on save.
    pub fn terminator(self) -> &'static [u8] {
        match self {
            LineEnding::LF => b"\n",
            LineEnding::CRLF => b"\r\n",
        }
    }
}
