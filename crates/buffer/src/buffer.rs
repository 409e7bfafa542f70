//! The line store: an ordered, growable sequence of [`Line`]s with an
//! embedded cursor and undo history.
//!
//! Out-of-bounds rows or columns on the editing operations are contract
//! violations and panic; only [`Buffer::insert_line`] reports a row past the
//! end as an ordinary error, since callers legitimately probe it.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::cursor::{Cursor, Viewport};
use crate::history::{EditOp, History};
use crate::line::Line;
use crate::LineEnding;

/// The line array grows in multiples of this many slots.
pub const LINE_ARRAY_CHUNK: usize = 32;

/// In-memory text of one file as an ordered sequence of lines.
///
/// Holds at least one line at all times; an empty file is one empty line.
#[derive(Debug, Clone)]
pub struct Buffer {
    lines: Vec<Line>,
    pub cursor: Cursor,
    pub view: Viewport,
    history: History,
    file_path: Option<PathBuf>,
    file_open: bool,
    dirty: bool,
    /// True while an empty history means the content equals what was loaded.
    base_is_clean: bool,
    line_ending: LineEnding,
}

impl Buffer {
    /// Create an empty buffer holding a single empty line.
    pub fn new() -> Self {
        let mut lines = Vec::with_capacity(LINE_ARRAY_CHUNK);
        lines.push(Line::new());
        Self {
            lines,
            cursor: Cursor::new(),
            view: Viewport::default(),
            history: History::new(),
            file_path: None,
            file_open: false,
            dirty: false,
            base_is_clean: true,
            line_ending: LineEnding::default(),
        }
    }

    /// Build a buffer from raw file contents. Lines split on `\n` with an
    /// optional preceding `\r` stripped; the terminator style is detected
    /// and reused on save.
    pub fn from_bytes(data: &[u8], path: Option<PathBuf>) -> Self {
        let text = String::from_utf8_lossy(data);
        let line_ending = if text.contains("\r\n") {
            LineEnding::CRLF
        } else {
            LineEnding::LF
        };

        let mut buffer = Self::new();
        buffer.lines.clear();
        for raw in text.split('\n') {
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            buffer.reserve_line_slot();
            buffer.lines.push(Line::from_text(raw));
        }
        debug_assert!(!buffer.lines.is_empty());

        buffer.file_open = path.is_some();
        buffer.file_path = path;
        buffer.line_ending = line_ending;
        buffer
    }

    /// Serialize for saving: lines joined by the configured terminator,
    /// with no terminator after the last line.
    pub fn to_bytes(&self) -> Vec<u8> {
        let terminator = self.line_ending.terminator();
        let mut out = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.extend_from_slice(terminator);
            }
            out.extend_from_slice(line.as_bytes());
        }
        out
    }

    /// Whole buffer content with `\n` separators, for tests and diffing.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| String::from_utf8_lossy(l.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn num_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> &Line {
        assert!(row < self.lines.len(), "line row {row} out of bounds");
        &self.lines[row]
    }

    pub fn line_len(&self, row: usize) -> usize {
        self.line(row).len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_file_open(&self) -> bool {
        self.file_open
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn set_file_path(&mut self, path: PathBuf) {
        self.file_path = Some(path);
        self.file_open = true;
    }

    /// File basename for the status line.
    pub fn file_name(&self) -> Option<&str> {
        self.file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn set_line_ending(&mut self, ending: LineEnding) {
        self.line_ending = ending;
    }

    /// Mark the buffer saved. The undo history is kept, but undoing back to
    /// an empty history no longer implies the loaded content.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        if self.history.mark() != 0 {
            self.base_is_clean = false;
        }
    }

    fn reserve_line_slot(&mut self) {
        if self.lines.len() >= self.lines.capacity() {
            let target = (self.lines.len() / LINE_ARRAY_CHUNK + 1) * LINE_ARRAY_CHUNK;
            self.lines.reserve_exact(target - self.lines.len());
        }
    }

    fn record(&mut self, op: EditOp) {
        let at = (self.cursor.row, self.cursor.col);
        self.history.record(op, at);
    }

    // ------------------------------------------------------------------
    // Editing operations. Every public mutation records its inverse.
    // ------------------------------------------------------------------

    /// Insert a new line at `row` (or append when `row == num_lines`),
    /// pre-populated with the cursor's indent and optional `text`.
    pub fn insert_line(&mut self, row: usize, text: Option<&str>) -> Result<()> {
        if row > self.lines.len() {
            bail!("insert_line: row {row} past end of buffer");
        }
        self.reserve_line_slot();

        let mut content = " ".repeat(self.cursor.indent);
        if let Some(text) = text {
            content.push_str(text);
        }
        self.lines.insert(row, Line::from_text(&content));
        self.record(EditOp::InsertLine { row });
        self.dirty = true;
        Ok(())
    }

    /// Remove the line at `row`, shifting later lines up. Deleting the sole
    /// remaining line clears it in place; the store never holds zero lines.
    pub fn delete_line(&mut self, row: usize) {
        assert!(row < self.lines.len(), "delete_line: row {row} out of bounds");

        if self.lines.len() == 1 {
            let text = String::from_utf8_lossy(self.lines[0].as_bytes()).into_owned();
            if !text.is_empty() {
                self.record(EditOp::DeleteText { row: 0, col: 0, text });
                self.lines[0].clear();
                self.dirty = true;
            }
            return;
        }

        let text = String::from_utf8_lossy(self.lines[row].as_bytes()).into_owned();
        self.record(EditOp::DeleteLine { row, text });
        self.lines.remove(row);
        self.dirty = true;
    }

    /// Insert `text` at (`row`, `col`), shifting the tail of the line right.
    pub fn write(&mut self, row: usize, col: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        assert!(row < self.lines.len(), "write: row {row} out of bounds");
        self.record(EditOp::InsertText {
            row,
            col,
            text: text.to_string(),
        });
        self.lines[row].insert(col, text.as_bytes());
        self.dirty = true;
    }

    /// Destructive replace: `text` lands at (`row`, `col`) and the line is
    /// truncated to end with it.
    pub fn overwrite(&mut self, row: usize, col: usize, text: &str) {
        assert!(row < self.lines.len(), "overwrite: row {row} out of bounds");
        let mark = self.history.mark();

        let old_tail =
            String::from_utf8_lossy(&self.lines[row].as_bytes()[col.min(self.line_len(row))..])
                .into_owned();
        if !old_tail.is_empty() {
            self.record(EditOp::DeleteText {
                row,
                col,
                text: old_tail,
            });
        }
        if !text.is_empty() {
            self.record(EditOp::InsertText {
                row,
                col,
                text: text.to_string(),
            });
        }
        self.lines[row].overwrite(col, text.as_bytes());
        self.dirty = true;
        self.history.join_since(mark);
    }

    /// Remove up to `count` bytes ending at `col`, clamped at column 0.
    /// Returns how many bytes were removed (zero at column 0).
    pub fn delete_backward(&mut self, row: usize, col: usize, count: usize) -> usize {
        assert!(row < self.lines.len(), "delete: row {row} out of bounds");
        if col == 0 {
            return 0;
        }
        let removed = self.lines[row].delete_backward(col, count);
        if removed.is_empty() {
            return 0;
        }
        let n = removed.len();
        self.record(EditOp::DeleteText {
            row,
            col: col - n,
            text: String::from_utf8_lossy(&removed).into_owned(),
        });
        self.dirty = true;
        n
    }

    /// Move everything at `col..` of `row` to the end of the line below.
    pub fn split_line_forward(&mut self, row: usize, col: usize) {
        assert!(row + 1 < self.lines.len(), "split: no line below {row}");
        let tail = self.lines[row].split_off(col);
        if tail.is_empty() {
            return;
        }
        let dest_col = self.lines[row + 1].len();
        let text = String::from_utf8_lossy(&tail).into_owned();
        self.record(EditOp::DeleteText {
            row,
            col,
            text: text.clone(),
        });
        self.record(EditOp::InsertText {
            row: row + 1,
            col: dest_col,
            text,
        });
        self.lines[row + 1].append(&tail);
        self.dirty = true;
    }

    /// Append the full content of `row` to the end of the line above,
    /// leaving `row` itself for the caller to delete. Returns the length of
    /// the line above before the join, which is where the cursor belongs.
    pub fn split_line_backward(&mut self, row: usize) -> usize {
        assert!(row >= 1, "split: no line above row 0");
        assert!(row < self.lines.len(), "split: row {row} out of bounds");
        let dest_col = self.lines[row - 1].len();
        if self.lines[row].is_empty() {
            return dest_col;
        }
        let moved = self.lines[row].as_bytes().to_vec();
        self.record(EditOp::InsertText {
            row: row - 1,
            col: dest_col,
            text: String::from_utf8_lossy(&moved).into_owned(),
        });
        self.lines[row - 1].append(&moved);
        self.dirty = true;
        dest_col
    }

    /// Count of consecutive spaces immediately preceding (`row`, `col`).
    pub fn leading_space_count(&self, row: usize, col: usize) -> usize {
        self.line(row).spaces_before(col)
    }

    // ------------------------------------------------------------------
    // Undo
    // ------------------------------------------------------------------

    /// Snapshot of the history depth, for joining a compound operation.
    pub fn undo_mark(&self) -> usize {
        self.history.mark()
    }

    /// Merge every undo group recorded after `mark` into one.
    pub fn join_undo_since(&mut self, mark: usize) {
        self.history.join_since(mark);
    }

    /// Close the open undo group; the next edit starts a new one.
    pub fn commit_undo(&mut self) {
        self.history.commit();
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Revert the most recent undo group and restore the cursor recorded
    /// with it. Returns false when the history is empty.
    pub fn undo(&mut self) -> bool {
        let Some(group) = self.history.take_last() else {
            return false;
        };
        for op in group.ops.iter().rev() {
            self.apply_inverse(op);
        }
        let (row, col) = group.cursor;
        self.set_cursor(col as isize, row as isize, false);
        self.dirty = !(self.history.is_empty() && self.base_is_clean && !self.history.is_lossy());
        true
    }

    fn apply_inverse(&mut self, op: &EditOp) {
        match op {
            EditOp::InsertText { row, col, text } => {
                self.lines[*row].remove_span(*col, text.len());
            }
            EditOp::DeleteText { row, col, text } => {
                self.lines[*row].insert(*col, text.as_bytes());
            }
            EditOp::InsertLine { row } => {
                assert!(self.lines.len() > 1, "undo would empty the buffer");
                self.lines.remove(*row);
            }
            EditOp::DeleteLine { row, text } => {
                self.reserve_line_slot();
                self.lines.insert(*row, Line::from_text(text));
            }
        }
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// Set the cursor to (`x`, `y`), scrolling the viewport when the move
    /// crosses a margin and clamping to buffer bounds. With `sticky`,
    /// vertical moves restore the rightmost column previously visited.
    pub fn set_cursor(&mut self, x: isize, y: isize, sticky: bool) {
        let dx = x - self.cursor.col as isize;
        let dy = y - self.cursor.row as isize;
        self.scroll_vertical(dy);
        self.place_cursor(x, y, sticky, dx, dy);
    }

    /// Move the cursor by a delta, keeping the sticky column.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        self.set_cursor(
            self.cursor.col as isize + dx,
            self.cursor.row as isize + dy,
            true,
        );
    }

    /// Move viewport and cursor together by one page, clamped to the file.
    pub fn scroll_page(&mut self, down: bool) {
        let page = self.view.height as isize;
        let delta = if down { page } else { -page };

        let offset = self.cursor.offset_y as isize + delta;
        self.cursor.offset_y = self.clamp_scroll(offset);

        let x = self.cursor.col as isize;
        let y = self.cursor.row as isize + delta;
        self.place_cursor(x, y, true, 0, delta);
    }

    fn place_cursor(&mut self, x: isize, y: isize, sticky: bool, dx: isize, dy: isize) {
        let max_row = self.lines.len() as isize - 1;
        let row = y.clamp(0, max_row) as usize;
        let max_col = self.lines[row].len() as isize;
        let col = x.clamp(0, max_col) as usize;

        self.cursor.row = row;
        self.cursor.col = col;
        self.cursor.indent = self.lines[row].leading_indent(col);

        if sticky && dy != 0 {
            if self.cursor.col > self.cursor.col_max {
                self.cursor.col_max = self.cursor.col;
            }
            self.cursor.col = self.cursor.col_max.min(self.lines[row].len());
        }
        if dx != 0 {
            self.cursor.col_max = self.cursor.col;
        }
    }

    /// Advance the vertical scroll origin when the cursor moves while within
    /// the margin of the edge it is moving toward.
    fn scroll_vertical(&mut self, dy: isize) {
        let real_y = self.cursor.row as isize - self.cursor.offset_y as isize;
        let text_h = self.view.height as isize;
        let margin = self.cursor.scroll_margin_y as isize;

        let mut offset = self.cursor.offset_y as isize;
        if (real_y > text_h - margin && dy > 0) || (real_y < margin && dy < 0) {
            offset += dy;
        }
        self.cursor.offset_y = self.clamp_scroll(offset);
    }

    /// Never scroll past end-of-file, and not at all if the file fits.
    fn clamp_scroll(&self, offset: isize) -> usize {
        let num = self.lines.len() as isize;
        let text_h = self.view.height as isize;
        let mut offset = offset;
        if offset + text_h > num {
            offset = num - text_h;
        }
        if offset < 0 || num <= text_h {
            offset = 0;
        }
        offset as usize
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}
