//! Grouped undo history.
//!
//! Edits are recorded as invertible operations. Consecutive compatible
//! operations (a typing run, a backspace run) accumulate into one group so
//! a single undo reverts one user-perceived edit. Compound operations join
//! the groups they produced with [`History::join_since`].

use std::collections::VecDeque;

/// Maximum number of committed undo groups. The oldest group is evicted
/// when the bound is reached.
pub const UNDO_CAP: usize = 256;

/// One invertible buffer mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// `text` was inserted at (`row`, `col`).
    InsertText {
        row: usize,
        col: usize,
        text: String,
    },
    /// `text` was removed from (`row`, `col`) onward.
    DeleteText {
        row: usize,
        col: usize,
        text: String,
    },
    /// A line was inserted at `row`.
    InsertLine { row: usize },
    /// The line at `row` was removed; `text` is its full content.
    DeleteLine { row: usize, text: String },
}

impl EditOp {
    /// Whether `next` continues this operation within the same group:
    /// single-character insertions at advancing columns, or single-character
    /// backward deletions at retreating columns, on the same row.
    fn extends(&self, next: &EditOp) -> bool {
        match (self, next) {
            (
                EditOp::InsertText {
                    row: r1,
                    col: c1,
                    text: t1,
                },
                EditOp::InsertText {
                    row: r2,
                    col: c2,
                    text: t2,
                },
            ) => r1 == r2 && t2.len() == 1 && *c2 == c1 + t1.len(),
            (
                EditOp::DeleteText { row: r1, col: c1, .. },
                EditOp::DeleteText {
                    row: r2,
                    col: c2,
                    text: t2,
                },
            ) => r1 == r2 && t2.len() == 1 && c2 + t2.len() == *c1,
            _ => false,
        }
    }
}

/// An ordered run of operations undone together as one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditGroup {
    /// Operations in the order they were applied.
    pub ops: Vec<EditOp>,
    /// Cursor position (`row`, `col`) when the group was opened; undo
    /// restores it after replaying the inverses.
    pub cursor: (usize, usize),
}

/// Bounded stack of undo groups with one open accumulating group.
#[derive(Debug, Clone)]
pub struct History {
    groups: VecDeque<EditGroup>,
    open: Option<EditGroup>,
    cap: usize,
    lossy: bool,
}

impl History {
    pub fn new() -> Self {
        Self::with_capacity(UNDO_CAP)
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            groups: VecDeque::new(),
            open: None,
            cap,
            lossy: false,
        }
    }

    /// Record an operation. Extends the open group when adjacent-compatible,
    /// otherwise commits it and opens a new group at `cursor`.
    pub fn record(&mut self, op: EditOp, cursor: (usize, usize)) {
        if let Some(open) = &mut self.open {
            if open.ops.last().is_some_and(|last| last.extends(&op)) {
                open.ops.push(op);
                return;
            }
        }
        self.commit();
        self.open = Some(EditGroup {
            ops: vec![op],
            cursor,
        });
    }

    /// Close the open group. Called on cursor motion and mode changes so the
    /// next edit starts a fresh group.
    pub fn commit(&mut self) {
        if let Some(group) = self.open.take() {
            if self.groups.len() == self.cap {
                self.groups.pop_front();
                self.lossy = true;
            }
            self.groups.push_back(group);
        }
    }

    /// Number of groups as if the open group were committed now. Pass the
    /// result to [`History::join_since`] after a compound operation.
    pub fn mark(&self) -> usize {
        self.groups.len() + usize::from(self.open.is_some())
    }

    /// Merge every group recorded after `mark` into a single group.
    pub fn join_since(&mut self, mark: usize) {
        self.commit();
        if self.groups.len() > mark {
            self.join_last(self.groups.len() - mark);
        }
    }

    /// Merge the last `n` committed groups into one.
    pub fn join_last(&mut self, n: usize) {
        self.commit();
        let n = n.min(self.groups.len());
        if n < 2 {
            return;
        }
        let at = self.groups.len() - n;
        let mut tail: Vec<EditGroup> = self.groups.drain(at..).collect();
        let mut merged = tail.remove(0);
        for group in tail {
            merged.ops.extend(group.ops);
        }
        self.groups.push_back(merged);
    }

    /// Pop the most recent group for replay. `None` when the history is empty.
    pub fn take_last(&mut self) -> Option<EditGroup> {
        self.commit();
        self.groups.pop_back()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.open.is_none()
    }

    /// Whether groups have been evicted since the last clear; an empty
    /// history no longer implies the buffer is back at its loaded state.
    pub fn is_lossy(&self) -> bool {
        self.lossy
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.open = None;
        self.lossy = false;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
