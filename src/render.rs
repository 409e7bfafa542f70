//! The render composer: turns buffer state into one linear ANSI byte
//! stream for the terminal grid.
//!
//! The frame tracks the visible column count of the current row separately
//! from its byte length, because highlight decorations add bytes with zero
//! visible width. Padding and cursor placement always use visible counts.

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Color, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::Command;

use quill_syntax::{highlight_line, HighlightPalette};

use crate::session::{Mode, Session, GUTTER_WIDTH};

/// Linear output buffer for one composed frame.
struct Frame {
    buf: String,
    width: usize,
    /// Visible columns emitted on the current row.
    visible: usize,
}

impl Frame {
    fn new(width: usize) -> Self {
        Self {
            buf: String::with_capacity(width * 64),
            width,
            visible: 0,
        }
    }

    /// Serialize a zero-width control command into the stream.
    fn cmd(&mut self, command: impl Command) {
        // Writing into a String cannot fail
        let _ = command.write_ansi(&mut self.buf);
    }

    fn colors(&mut self, bg: Color, fg: Color) {
        self.cmd(SetBackgroundColor(bg));
        self.cmd(SetForegroundColor(fg));
    }

    fn fg(&mut self, color: Color) {
        self.cmd(SetForegroundColor(color));
    }

    /// Emit text whose byte length equals its visible width.
    fn append(&mut self, text: &str) {
        self.buf.push_str(text);
        self.visible += text.len();
    }

    /// Emit decorated text, advancing the visible count by `visible_len`
    /// rather than the byte length.
    fn append_decorated(&mut self, text: &str, visible_len: usize) {
        self.buf.push_str(text);
        self.visible += visible_len;
    }

    /// Pad the row with blanks to the full frame width.
    fn next_line(&mut self) {
        while self.visible < self.width {
            self.buf.push(' ');
            self.visible += 1;
        }
        self.visible = 0;
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Compose the whole screen: text rows, filler, status line, command line,
/// and final cursor placement. The caller hands the result to the terminal
/// in a single write.
pub fn compose(session: &mut Session) -> String {
    let mut frame = Frame::new(session.width);
    frame.cmd(Hide);
    frame.cmd(MoveTo(0, 0));

    let text_w = session.text_width();
    let text_h = session.text_height();
    let cursor = session.buffer.cursor;
    let num_lines = session.buffer.num_lines();

    // Horizontal offset is derived from the cursor every frame
    let offset_x = (cursor.col + cursor.scroll_margin_x).saturating_sub(text_w);
    session.buffer.cursor.offset_x = offset_x;

    let palette = HighlightPalette {
        keyword: session.theme.yellow,
        type_name: session.theme.aqua,
        number: session.theme.purple,
        string: session.theme.green,
        text: session.theme.fg0,
    };

    for i in 0..text_h {
        let row = cursor.offset_y + i;
        if row >= num_lines {
            break;
        }

        if row == cursor.row {
            frame.colors(session.theme.bg1, session.theme.yellow);
        } else {
            frame.colors(session.theme.bg0, session.theme.bg2);
        }
        frame.append(&format!(" {:>4} ", row + 1));

        frame.fg(session.theme.fg0);
        let line = session.buffer.line(row);
        let start = offset_x.min(line.len());
        let end = (offset_x + text_w).min(line.len());
        let slice = String::from_utf8_lossy(&line.as_bytes()[start..end]);

        if session.config.editor.syntax_enabled {
            if let Some(table) = &session.syntax {
                let decorated = highlight_line(&slice, table, &palette);
                frame.append_decorated(&decorated.text, decorated.visible_len);
            } else {
                frame.append(&slice);
            }
        } else {
            frame.append(&slice);
        }
        frame.next_line();
    }

    // Fill rows past end-of-file
    frame.colors(session.theme.bg0, session.theme.bg2);
    let shown = num_lines.saturating_sub(cursor.offset_y).min(text_h);
    for _ in shown..text_h {
        frame.append("~");
        frame.next_line();
    }

    // Status line: file name and dirty marker
    frame.colors(session.theme.fg0, session.theme.bg0);
    let name = session.buffer.file_name().unwrap_or("[empty file]");
    frame.append(name);
    if session.buffer.is_dirty() && session.buffer.is_file_open() {
        frame.append("*");
    }
    frame.next_line();

    // Command line: prompt, confirmation, or status message
    frame.colors(session.theme.bg0, session.theme.fg0);
    let mut cursor_at = None;
    match &session.mode {
        Mode::CommandPrompt { input } => {
            frame.append(":");
            frame.append(input);
            cursor_at = Some((1 + input.len(), session.height.saturating_sub(1)));
        }
        Mode::ConfirmPrompt { message, .. } => {
            frame.append(message);
            cursor_at = Some((message.len() + 1, session.height.saturating_sub(1)));
        }
        Mode::Editing => {
            if let Some((message, is_error)) = &session.status {
                if *is_error {
                    frame.fg(session.theme.red);
                    frame.append("error: ");
                }
                frame.append(message);
            }
        }
    }
    frame.next_line();
    frame.cmd(ResetColor);

    // Terminal cursor lands on the logical position
    let (x, y) = cursor_at.unwrap_or((
        cursor.col - offset_x.min(cursor.col) + GUTTER_WIDTH,
        cursor.row - cursor.offset_y.min(cursor.row),
    ));
    frame.cmd(MoveTo(x as u16, y as u16));
    frame.cmd(Show);

    frame.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_buffer::Buffer;
    use quill_config::Config;
    use quill_syntax::SyntaxTable;
    use quill_theme::Theme;

    fn session_with(text: &[u8]) -> Session {
        let mut session = Session::new(Config::default(), Theme::builtin(), 40, 10);
        session.buffer = Buffer::from_bytes(text, None);
        session.resize(40, 10);
        session
    }

    fn visible_text(frame: &str) -> String {
        // Strip control sequences, keep printable payload
        let mut out = String::new();
        let mut chars = frame.chars();
        while let Some(ch) = chars.next() {
            if ch == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    #[test]
    fn test_frame_has_gutter_and_filler() {
        let mut s = session_with(b"alpha\nbeta");
        let frame = compose(&mut s);
        let visible = visible_text(&frame);

        assert!(visible.contains("    1 alpha"));
        assert!(visible.contains("    2 beta"));
        assert!(visible.contains('~'));
        assert!(visible.contains("[empty file]"));
    }

    #[test]
    fn test_every_visible_row_is_padded_to_width() {
        let mut s = session_with(b"x");
        let frame = compose(&mut s);
        let visible = visible_text(&frame);
        // 8 text rows + status + command line, each padded to 40 columns
        assert_eq!(visible.len(), 10 * 40);
    }

    #[test]
    fn test_highlight_adds_bytes_but_not_columns() {
        let mut s = session_with(b"int x;\nplain");
        s.syntax = SyntaxTable::parse(quill_syntax::BUILTIN_DEFS, "c");

        let frame = compose(&mut s);
        let visible = visible_text(&frame);
        // Visible layout is identical to the undecorated one
        assert_eq!(visible.len(), 10 * 40);
        assert!(visible.contains("    1 int x;"));
        // The decorated frame carries more bytes than its visible text
        assert!(frame.len() > visible.len());
    }

    #[test]
    fn test_long_line_clipped_by_horizontal_offset() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFGH";
        let mut s = session_with(long.as_bytes());
        s.buffer.set_cursor(44, 0, false);

        let frame = compose(&mut s);
        let visible = visible_text(&frame);
        // text width is 34; the slice ends at the cursor's window
        assert!(!visible.contains("abcdef"));
        assert!(visible.contains("ABCDEFGH"));
    }

    #[test]
    fn test_dirty_marker_only_for_open_files() {
        let mut s = session_with(b"data");
        s.buffer.write(0, 0, "!");
        let frame = compose(&mut s);
        // Scratch buffer: no marker
        assert!(!visible_text(&frame).contains("[empty file]*"));

        s.buffer.set_file_path("file.txt".into());
        let frame = compose(&mut s);
        assert!(visible_text(&frame).contains("file.txt*"));
    }

    #[test]
    fn test_command_prompt_rendered_on_last_line() {
        let mut s = session_with(b"");
        s.open_command_prompt("open ");
        let frame = compose(&mut s);
        let visible = visible_text(&frame);
        let last_row = &visible[9 * 40..];
        assert!(last_row.starts_with(":open "));
    }

    #[test]
    fn test_error_message_rendered() {
        let mut s = session_with(b"");
        s.set_error("theme not found");
        let frame = compose(&mut s);
        assert!(visible_text(&frame).contains("error: theme not found"));
    }
}
