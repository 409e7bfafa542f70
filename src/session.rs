//! The editing session: one buffer, its configuration, and the dispatcher
//! state machine mapping input events to buffer, cursor and undo calls.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use quill_buffer::{Buffer, LineEnding};
use quill_config::Config;
use quill_syntax::{SyntaxTable, BUILTIN_DEFS};
use quill_term::{InputEvent, Key, KeyPress};
use quill_theme::Theme;

use crate::commands::EditorCommand;

/// Width of the line-number gutter.
pub const GUTTER_WIDTH: usize = 6;
/// Rows reserved below the text area: status line and command line.
pub const FOOTER_HEIGHT: usize = 2;

const PAIR_OPENERS: [char; 5] = ['"', '\'', '(', '{', '['];
const PAIR_CLOSERS: [char; 5] = ['"', '\'', ')', '}', ']'];

/// Action deferred behind the unsaved-changes confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Exit,
    OpenFile(PathBuf),
    NewBuffer,
}

/// Dispatcher state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Editing,
    CommandPrompt {
        input: String,
    },
    ConfirmPrompt {
        message: String,
        pending: PendingAction,
    },
}

/// Everything owned by one editing session. Created at startup and passed
/// by reference to every component operation; there is no ambient state.
pub struct Session {
    pub buffer: Buffer,
    pub config: Config,
    pub theme: Theme,
    pub syntax: Option<SyntaxTable>,
    pub mode: Mode,
    /// Status-line message and whether it is an error.
    pub status: Option<(String, bool)>,
    pub width: usize,
    pub height: usize,
    pub should_exit: bool,
}

impl Session {
    pub fn new(config: Config, theme: Theme, width: u16, height: u16) -> Self {
        let mut session = Self {
            buffer: Buffer::new(),
            config,
            theme,
            syntax: None,
            mode: Mode::Editing,
            status: None,
            width: width as usize,
            height: height as usize,
            should_exit: false,
        };
        session.sync_buffer();
        session
    }

    pub fn text_width(&self) -> usize {
        self.width.saturating_sub(GUTTER_WIDTH)
    }

    pub fn text_height(&self) -> usize {
        self.height.saturating_sub(FOOTER_HEIGHT)
    }

    /// A resize recomputes viewport geometry only; buffer content is
    /// never touched.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width as usize;
        self.height = height as usize;
        self.buffer.view.resize(self.text_width(), self.text_height());
    }

    /// Push session configuration into a (possibly fresh) buffer.
    fn sync_buffer(&mut self) {
        let margin = self.config.editor.scroll_margin;
        self.buffer.cursor.scroll_margin_x = margin;
        self.buffer.cursor.scroll_margin_y = margin;
        self.buffer.set_line_ending(if self.config.editor.use_crlf {
            LineEnding::CRLF
        } else {
            LineEnding::LF
        });
        self.buffer.view.resize(self.text_width(), self.text_height());
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), false));
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), true));
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    pub fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Resize(width, height) => {
                self.resize(width, height);
                Ok(())
            }
            InputEvent::Key(key) => match self.mode {
                Mode::Editing => EditorCommand::from_key(key).execute(self),
                Mode::CommandPrompt { .. } => {
                    self.handle_prompt_key(key);
                    Ok(())
                }
                Mode::ConfirmPrompt { .. } => {
                    self.handle_confirm_key(key);
                    Ok(())
                }
            },
        }
    }

    fn handle_prompt_key(&mut self, key: KeyPress) {
        let Mode::CommandPrompt { mut input } = std::mem::replace(&mut self.mode, Mode::Editing)
        else {
            return;
        };

        match key.code {
            Key::Enter => self.run_command(&input),
            Key::Esc => {}
            Key::Backspace => {
                input.pop();
                self.mode = Mode::CommandPrompt { input };
            }
            Key::Char if !key.ctrl => {
                if let Some(ch) = key.ch {
                    if ch.is_ascii_graphic() || ch == ' ' {
                        input.push(ch);
                    }
                }
                self.mode = Mode::CommandPrompt { input };
            }
            _ => self.mode = Mode::CommandPrompt { input },
        }
    }

    fn handle_confirm_key(&mut self, key: KeyPress) {
        let Mode::ConfirmPrompt { message, pending } =
            std::mem::replace(&mut self.mode, Mode::Editing)
        else {
            return;
        };

        match key.ch.map(|c| c.to_ascii_lowercase()) {
            Some('y') => {
                let path = self.buffer.file_path().map(Path::to_path_buf);
                match path {
                    Some(path) => match self.save_to(path) {
                        Ok(()) => self.perform(pending),
                        Err(e) => self.set_error(e.to_string()),
                    },
                    None => self.set_error("no file name; use :save <path>"),
                }
            }
            Some('n') => self.perform(pending),
            _ if key.code == Key::Esc => {}
            _ => {
                // Anything else keeps asking
                self.mode = Mode::ConfirmPrompt { message, pending };
            }
        }
    }

    fn perform(&mut self, pending: PendingAction) {
        match pending {
            PendingAction::Exit => self.should_exit = true,
            PendingAction::NewBuffer => {
                self.buffer = Buffer::new();
                self.syntax = None;
                self.sync_buffer();
                self.set_status("[empty file]");
            }
            PendingAction::OpenFile(path) => {
                if let Err(e) = self.load_file(&path) {
                    self.set_error(e.to_string());
                }
            }
        }
    }

    /// Route an action through the unsaved-changes confirmation when the
    /// open file has edits; scratch buffers are discarded silently.
    fn guard_dirty(&mut self, pending: PendingAction) {
        if self.buffer.is_dirty() && self.buffer.is_file_open() {
            self.mode = Mode::ConfirmPrompt {
                message: "Save changes before closing? (y/n)".to_string(),
                pending,
            };
        } else {
            self.perform(pending);
        }
    }

    pub(crate) fn request_exit(&mut self) {
        self.guard_dirty(PendingAction::Exit);
    }

    pub(crate) fn request_new(&mut self) {
        self.guard_dirty(PendingAction::NewBuffer);
    }

    pub(crate) fn request_open(&mut self, path: PathBuf) {
        self.guard_dirty(PendingAction::OpenFile(path));
    }

    pub(crate) fn open_command_prompt(&mut self, initial: &str) {
        self.status = None;
        self.mode = Mode::CommandPrompt {
            input: initial.to_string(),
        };
    }

    // ------------------------------------------------------------------
    // Command mini-language
    // ------------------------------------------------------------------

    pub(crate) fn run_command(&mut self, text: &str) {
        let args: Vec<&str> = text.split_whitespace().collect();
        match args.as_slice() {
            [] => {}
            ["exit"] => self.request_exit(),
            ["exit", ..] => self.set_error("too many args. usage: exit"),
            ["open"] => self.request_new(),
            ["open", path] => self.request_open(PathBuf::from(path)),
            ["open", ..] => self.set_error("too many args. usage: open [filepath]"),
            ["save"] => self.save_requested(),
            ["save", path] => {
                let path = PathBuf::from(path);
                match self.save_to(path) {
                    Ok(()) => self.status_saved(),
                    Err(e) => self.set_error(e.to_string()),
                }
            }
            ["save", ..] => self.set_error("too many args. usage: save [filepath]"),
            ["theme", name] => self.load_theme(name),
            ["theme", ..] => self.set_error("usage: theme <name>"),
            _ => self.set_error("unknown command"),
        }
    }

    fn load_theme(&mut self, name: &str) {
        let data = Config::theme_file_path()
            .ok()
            .and_then(|path| std::fs::read(path).ok());

        let found = match data {
            Some(data) => match quill_theme::lookup(&data, name) {
                Ok(found) => found,
                Err(e) => {
                    self.set_error(e.to_string());
                    return;
                }
            },
            None => None,
        };

        match found {
            Some(theme) => {
                self.set_status(format!("theme set to {}", theme.name));
                self.theme = theme;
            }
            None if name == Theme::builtin().name => {
                self.theme = Theme::builtin();
                self.set_status(format!("theme set to {name}"));
            }
            None => self.set_error("theme not found"),
        }
    }

    // ------------------------------------------------------------------
    // File operations
    // ------------------------------------------------------------------

    /// Load a file into a fresh buffer. The caller surfaces errors on the
    /// status line; the session keeps editing the previous buffer.
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let data = std::fs::read(path)
            .with_context(|| format!("file not found: {}", path.display()))?;

        self.buffer = Buffer::from_bytes(&data, Some(path.to_path_buf()));
        self.sync_buffer();
        self.syntax = syntax_for(path);
        self.mode = Mode::Editing;

        let name = self.buffer.file_name().unwrap_or("[empty file]").to_string();
        quill_logger::info(format!("opened {}", path.display()));
        self.set_status(name);
        Ok(())
    }

    /// Open a path named on the command line; a miss is a status message,
    /// not a startup failure.
    pub fn open_path(&mut self, path: &Path) {
        if let Err(e) = self.load_file(path) {
            self.set_error(e.to_string());
        }
    }

    fn save_to(&mut self, path: PathBuf) -> Result<()> {
        std::fs::write(&path, self.buffer.to_bytes())
            .with_context(|| format!("failed to write {}", path.display()))?;
        quill_logger::info(format!("saved {}", path.display()));
        self.buffer.set_file_path(path);
        self.buffer.mark_saved();
        Ok(())
    }

    fn status_saved(&mut self) {
        let name = self.buffer.file_name().unwrap_or("file").to_string();
        self.set_status(format!("saved {name}"));
    }

    /// Save to the known path, or prompt for one.
    pub(crate) fn save_requested(&mut self) {
        match self.buffer.file_path().map(Path::to_path_buf) {
            Some(path) => match self.save_to(path) {
                Ok(()) => self.status_saved(),
                Err(e) => self.set_error(e.to_string()),
            },
            None => self.open_command_prompt("save "),
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    pub(crate) fn insert_char(&mut self, ch: char) {
        if !(' '..='~').contains(&ch) {
            // Single-byte fixed-width model: reject everything else
            return;
        }

        let matching = self.config.editor.match_paren
            && (PAIR_OPENERS.contains(&ch) || PAIR_CLOSERS.contains(&ch));
        if matching {
            // Isolate the pair logic from any open typing run
            self.buffer.commit_undo();
        }
        let mark = self.buffer.undo_mark();

        let (row, col) = (self.buffer.cursor.row, self.buffer.cursor.col);
        self.buffer.write(row, col, ch.encode_utf8(&mut [0; 4]));
        self.buffer.set_cursor(col as isize + 1, row as isize, false);

        if matching {
            self.apply_match_paren(ch);
            self.buffer.join_undo_since(mark);
        }
    }

    /// Auto-close an opener, or type over an identical closer already
    /// under the cursor.
    fn apply_match_paren(&mut self, ch: char) {
        let (row, col) = (self.buffer.cursor.row, self.buffer.cursor.col);
        for i in 0..PAIR_OPENERS.len() {
            let closer = PAIR_CLOSERS[i];
            if ch == closer && self.buffer.line(row).byte_at(col) == Some(closer as u8) {
                self.buffer.delete_backward(row, col + 1, 1);
                return;
            }
            if ch == PAIR_OPENERS[i] {
                self.buffer
                    .write(row, col, closer.encode_utf8(&mut [0; 4]));
                return;
            }
        }
    }

    pub(crate) fn insert_tab(&mut self) {
        let tab = self.config.editor.tab_size;
        let (row, col) = (self.buffer.cursor.row, self.buffer.cursor.col);
        self.buffer.write(row, col, &" ".repeat(tab));
        self.buffer
            .set_cursor((col + tab) as isize, row as isize, false);
    }

    pub(crate) fn insert_newline(&mut self) -> Result<()> {
        let (row, col) = (self.buffer.cursor.row, self.buffer.cursor.col);
        self.buffer.commit_undo();
        let mark = self.buffer.undo_mark();

        // The new line picks up the current indent, then receives the
        // cursor's tail; the cursor lands at the end of the indent.
        self.buffer.insert_line(row + 1, None)?;
        let indent_len = self.buffer.line_len(row + 1);
        self.buffer.split_line_forward(row, col);
        self.buffer
            .set_cursor(indent_len as isize, row as isize + 1, false);

        if self.config.editor.match_paren {
            self.break_paren()?;
        }
        self.buffer.join_undo_since(mark);
        Ok(())
    }

    /// After a newline directly behind a bracket: indent one stop, and when
    /// the matching closer sits under the cursor, push it to its own line.
    fn break_paren(&mut self) -> Result<()> {
        let row = self.buffer.cursor.row;
        if row == 0 {
            return Ok(());
        }

        const BRACKETS: [(u8, u8); 3] = [(b'(', b')'), (b'{', b'}'), (b'[', b']')];
        let prev = self.buffer.line(row - 1);
        let prev_last = prev.len().checked_sub(1).and_then(|i| prev.byte_at(i));

        for (open, close) in BRACKETS {
            if prev_last != Some(open) {
                continue;
            }
            let col = self.buffer.cursor.col;
            if self.buffer.line(row).byte_at(col) == Some(close) {
                self.buffer.insert_line(row + 1, None)?;
                self.buffer.split_line_forward(row, col);
            }
            self.insert_tab();
            return Ok(());
        }
        Ok(())
    }

    pub(crate) fn backspace(&mut self) {
        let (row, col) = (self.buffer.cursor.row, self.buffer.cursor.col);

        if col == 0 {
            if row == 0 {
                return;
            }
            // Join this line onto the one above
            self.buffer.commit_undo();
            let mark = self.buffer.undo_mark();
            let join_col = self.buffer.split_line_backward(row);
            self.buffer.delete_line(row);
            self.buffer
                .set_cursor(join_col as isize, row as isize - 1, false);
            self.buffer.join_undo_since(mark);
            return;
        }

        // Smart tab delete: a full stop's worth of leading spaces goes at once
        let spaces = self.buffer.leading_space_count(row, col);
        let tab = self.config.editor.tab_size;
        let count = if spaces > 0 && spaces % tab == 0 { tab } else { 1 };

        let removed = self.buffer.delete_backward(row, col, count);
        self.buffer
            .set_cursor((col - removed) as isize, row as isize, false);
    }

    pub(crate) fn delete_forward(&mut self) {
        let (row, col) = (self.buffer.cursor.row, self.buffer.cursor.col);

        if col == self.buffer.line_len(row) {
            if row + 1 == self.buffer.num_lines() {
                return;
            }
            // Pull the line below onto this one
            self.buffer.commit_undo();
            let mark = self.buffer.undo_mark();
            self.buffer.split_line_backward(row + 1);
            self.buffer.delete_line(row + 1);
            self.buffer.join_undo_since(mark);
            return;
        }

        self.buffer.delete_backward(row, col + 1, 1);
    }

    pub(crate) fn delete_current_line(&mut self) {
        self.buffer.commit_undo();
        let row = self.buffer.cursor.row;
        self.buffer.delete_line(row);
        self.buffer.set_cursor(0, row as isize, true);
    }

    pub(crate) fn undo(&mut self) {
        self.buffer.undo();
    }

    // ------------------------------------------------------------------
    // Navigation (closes the open undo group)
    // ------------------------------------------------------------------

    pub(crate) fn move_cursor(&mut self, dx: isize, dy: isize) {
        self.buffer.commit_undo();
        self.buffer.move_cursor(dx, dy);
    }

    pub(crate) fn move_to_line_edge(&mut self, end: bool) {
        self.buffer.commit_undo();
        let row = self.buffer.cursor.row;
        let x = if end { self.buffer.line_len(row) } else { 0 };
        self.buffer.set_cursor(x as isize, row as isize, true);
    }

    pub(crate) fn scroll_page(&mut self, down: bool) {
        self.buffer.commit_undo();
        self.buffer.scroll_page(down);
    }
}

/// Syntax table for a file path: the user definition file wins, the
/// built-in table covers the rest.
fn syntax_for(path: &Path) -> Option<SyntaxTable> {
    let ext = path.extension()?.to_str()?;
    let user = Config::syntax_file_path()
        .ok()
        .and_then(|p| std::fs::read_to_string(p).ok());
    match user {
        Some(defs) => {
            SyntaxTable::parse(&defs, ext).or_else(|| SyntaxTable::parse(BUILTIN_DEFS, ext))
        }
        None => SyntaxTable::parse(BUILTIN_DEFS, ext),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn session() -> Session {
        Session::new(Config::default(), Theme::builtin(), 80, 24)
    }

    fn type_str(session: &mut Session, text: &str) {
        for ch in text.chars() {
            EditorCommand::InsertChar(ch).execute(session).unwrap();
        }
    }

    fn key(code: Key, ch: Option<char>) -> InputEvent {
        InputEvent::Key(KeyPress {
            code,
            ch,
            ctrl: false,
        })
    }

    #[test]
    fn test_typing_advances_cursor() {
        let mut s = session();
        type_str(&mut s, "hello");
        assert_eq!(s.buffer.text(), "hello");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (0, 5));
        assert!(s.buffer.is_dirty());
    }

    #[test]
    fn test_non_printable_input_rejected() {
        let mut s = session();
        s.insert_char('\u{1b}');
        s.insert_char('é');
        assert_eq!(s.buffer.text(), "");
    }

    #[test]
    fn test_open_paren_auto_closes() {
        let mut s = session();
        type_str(&mut s, "if (x");
        // The opener inserted its closer; the cursor sits before it
        assert_eq!(s.buffer.text(), "if (x)");
        assert_eq!(s.buffer.cursor.col, 5);
    }

    #[test]
    fn test_enter_never_leaves_joined_paren_line() {
        let mut s = session();
        type_str(&mut s, "if (x");
        EditorCommand::InsertNewline.execute(&mut s).unwrap();

        assert_eq!(s.buffer.num_lines(), 2);
        assert_eq!(s.buffer.line(0).as_bytes(), b"if (x");
        assert_eq!(s.buffer.line(1).as_bytes(), b")");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (1, 0));
    }

    #[test]
    fn test_closer_types_over_existing() {
        let mut s = session();
        type_str(&mut s, "()");
        assert_eq!(s.buffer.text(), "()");
        assert_eq!(s.buffer.cursor.col, 2);
    }

    #[test]
    fn test_brace_break_indents_and_moves_closer_down() {
        let mut s = session();
        type_str(&mut s, "{");
        assert_eq!(s.buffer.text(), "{}");

        EditorCommand::InsertNewline.execute(&mut s).unwrap();
        assert_eq!(s.buffer.text(), "{\n    \n}");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (1, 4));

        // The whole break is one undo step
        s.undo();
        assert_eq!(s.buffer.text(), "{}");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (0, 1));
    }

    #[test]
    fn test_newline_carries_indent() {
        let mut s = session();
        type_str(&mut s, "    x");
        EditorCommand::InsertNewline.execute(&mut s).unwrap();
        assert_eq!(s.buffer.text(), "    x\n    ");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (1, 4));
    }

    #[test]
    fn test_backspace_at_column_zero_joins_lines() {
        let mut s = session();
        s.buffer = Buffer::from_bytes(b"ab\ncd", None);
        s.sync_buffer();
        s.move_cursor(0, 1);
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (1, 0));

        s.backspace();
        assert_eq!(s.buffer.text(), "abcd");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (0, 2));

        s.undo();
        assert_eq!(s.buffer.text(), "ab\ncd");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (1, 0));
    }

    #[test]
    fn test_smart_tab_backspace() {
        let mut s = session();
        s.insert_tab();
        assert_eq!(s.buffer.text(), "    ");
        s.backspace();
        assert_eq!(s.buffer.text(), "");

        // A partial run deletes one space at a time
        type_str(&mut s, "   ");
        s.backspace();
        assert_eq!(s.buffer.text(), "  ");
    }

    #[test]
    fn test_delete_forward_joins_at_line_end() {
        let mut s = session();
        s.buffer = Buffer::from_bytes(b"ab\ncd", None);
        s.sync_buffer();
        s.move_to_line_edge(true);

        s.delete_forward();
        assert_eq!(s.buffer.text(), "abcd");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (0, 2));
    }

    #[test]
    fn test_delete_current_line() {
        let mut s = session();
        s.buffer = Buffer::from_bytes(b"a\nbb\nccc", None);
        s.sync_buffer();
        s.move_cursor(0, 1);

        s.delete_current_line();
        assert_eq!(s.buffer.text(), "a\nccc");
        assert_eq!(s.buffer.cursor.row, 1);

        s.undo();
        assert_eq!(s.buffer.text(), "a\nbb\nccc");
    }

    #[test]
    fn test_undo_after_typing_restores_everything() {
        let mut s = session();
        type_str(&mut s, "abc");
        s.undo();
        assert_eq!(s.buffer.text(), "");
        assert_eq!((s.buffer.cursor.row, s.buffer.cursor.col), (0, 0));
        assert!(!s.buffer.is_dirty());
    }

    #[test]
    fn test_navigation_splits_undo_groups() {
        let mut s = session();
        type_str(&mut s, "ab");
        s.move_cursor(-1, 0);
        s.move_cursor(1, 0);
        type_str(&mut s, "cd");
        assert_eq!(s.buffer.text(), "abcd");

        s.undo();
        assert_eq!(s.buffer.text(), "ab");
        s.undo();
        assert_eq!(s.buffer.text(), "");
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");

        let mut s = session();
        type_str(&mut s, "alpha");
        EditorCommand::InsertNewline.execute(&mut s).unwrap();
        type_str(&mut s, "beta");

        s.run_command(&format!("save {}", path.display()));
        assert!(!s.buffer.is_dirty());
        assert_eq!(std::fs::read(&path).unwrap(), b"alpha\nbeta");

        let mut s2 = session();
        s2.load_file(&path).unwrap();
        assert_eq!(s2.buffer.text(), "alpha\nbeta");
        assert!(s2.buffer.is_file_open());
    }

    #[test]
    fn test_open_sets_syntax_table_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.rs");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "fn main() {{}}").unwrap();

        let mut s = session();
        s.load_file(&path).unwrap();
        let table = s.syntax.as_ref().unwrap();
        assert!(table.is_keyword("fn"));

        let plain = dir.path().join("notes.xyz");
        std::fs::write(&plain, "text").unwrap();
        s.load_file(&plain).unwrap();
        assert!(s.syntax.is_none());
    }

    #[test]
    fn test_unknown_command_is_user_visible_error() {
        let mut s = session();
        s.run_command("frobnicate");
        assert_eq!(s.status, Some(("unknown command".to_string(), true)));

        s.run_command("open a b c");
        let (message, is_error) = s.status.clone().unwrap();
        assert!(is_error);
        assert!(message.contains("usage: open"));
    }

    #[test]
    fn test_open_missing_file_keeps_session_alive() {
        let mut s = session();
        type_str(&mut s, "kept");
        s.request_open(PathBuf::from("/no/such/file.txt"));

        assert_eq!(s.buffer.text(), "kept");
        assert_eq!(s.mode, Mode::Editing);
        let (message, is_error) = s.status.clone().unwrap();
        assert!(is_error);
        assert!(message.contains("file not found"));
    }

    #[test]
    fn test_dirty_file_exit_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        std::fs::write(&path, "data").unwrap();

        let mut s = session();
        s.load_file(&path).unwrap();
        type_str(&mut s, "x");
        s.handle_event(key(Key::Esc, None)).unwrap();

        assert!(matches!(s.mode, Mode::ConfirmPrompt { .. }));
        assert!(!s.should_exit);

        // Decline saving: exit anyway
        s.handle_event(key(Key::Char, Some('n'))).unwrap();
        assert!(s.should_exit);
    }

    #[test]
    fn test_confirm_yes_saves_before_exit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.txt");
        std::fs::write(&path, "data").unwrap();

        let mut s = session();
        s.load_file(&path).unwrap();
        s.move_to_line_edge(true);
        type_str(&mut s, "!");
        s.handle_event(key(Key::Esc, None)).unwrap();
        s.handle_event(key(Key::Char, Some('y'))).unwrap();

        assert!(s.should_exit);
        assert_eq!(std::fs::read(&path).unwrap(), b"data!");
    }

    #[test]
    fn test_command_prompt_line_editing() {
        let mut s = session();
        s.handle_event(InputEvent::Key(KeyPress {
            code: Key::Char,
            ch: Some('c'),
            ctrl: true,
        }))
        .unwrap();
        assert!(matches!(s.mode, Mode::CommandPrompt { .. }));

        for ch in "exitt".chars() {
            s.handle_event(key(Key::Char, Some(ch))).unwrap();
        }
        s.handle_event(key(Key::Backspace, None)).unwrap();
        s.handle_event(key(Key::Enter, None)).unwrap();
        assert!(s.should_exit);
    }

    #[test]
    fn test_prompt_escape_cancels() {
        let mut s = session();
        s.open_command_prompt("open ");
        s.handle_event(key(Key::Esc, None)).unwrap();
        assert_eq!(s.mode, Mode::Editing);
        assert!(!s.should_exit);
    }

    #[test]
    fn test_resize_changes_geometry_only() {
        let mut s = session();
        type_str(&mut s, "text");
        s.handle_event(InputEvent::Resize(100, 40)).unwrap();

        assert_eq!(s.width, 100);
        assert_eq!(s.text_height(), 38);
        assert_eq!(s.buffer.view.width, 94);
        assert_eq!(s.buffer.text(), "text");
    }

    #[test]
    fn test_save_without_name_prompts() {
        let mut s = session();
        type_str(&mut s, "scratch");
        s.save_requested();
        assert_eq!(
            s.mode,
            Mode::CommandPrompt {
                input: "save ".to_string()
            }
        );
    }
}
