//! Undo/redo over whole-document snapshots.
//!
//! The stack always holds the base state at index 0 and a cursor pointing
//! at the snapshot that matches the live document. `commit` truncates any
//! redo entries and appends; `undo`/`redo` move the cursor and copy the
//! snapshot back into the live document in one assignment.
//!
//! Restores happen synchronously under a `locked` flag, so a commit issued
//! while a restore is in flight is ignored instead of recorded.

use lv_core::Document;

#[derive(Debug, Clone)]
struct Entry {
    snapshot: Document,
    description: String,
}

#[derive(Debug, Clone)]
pub struct History {
    stack: Vec<Entry>,
    cursor: usize,
    /// Maximum number of snapshots kept, base state included.
    capacity: usize,
    locked: bool,
}

impl History {
    pub fn new(base: &Document, capacity: usize) -> Self {
        Self {
            stack: vec![Entry {
                snapshot: base.clone(),
                description: "initial state".to_string(),
            }],
            cursor: 0,
            capacity: capacity.max(2),
            locked: false,
        }
    }

    /// Record the current document. Returns `false` when the commit was
    /// suppressed (restore in progress) or nothing changed since the
    /// snapshot under the cursor.
    pub fn commit(&mut self, doc: &Document, description: &str) -> bool {
        if self.locked {
            log::debug!("history locked; ignoring commit {description:?}");
            return false;
        }
        if self.stack[self.cursor].snapshot == *doc {
            return false;
        }
        self.stack.truncate(self.cursor + 1);
        self.stack.push(Entry {
            snapshot: doc.clone(),
            description: description.to_string(),
        });
        if self.stack.len() > self.capacity {
            self.stack.remove(0);
        }
        self.cursor = self.stack.len() - 1;
        log::debug!("commit {description:?} ({}/{})", self.cursor, self.stack.len());
        true
    }

    /// Step back one snapshot. Returns the description of the undone change.
    pub fn undo(&mut self, doc: &mut Document) -> Option<String> {
        if !self.can_undo() {
            return None;
        }
        let undone = self.stack[self.cursor].description.clone();
        self.cursor -= 1;
        self.restore(doc);
        log::debug!("undo {undone:?}");
        Some(undone)
    }

    /// Step forward one snapshot. Returns the description of the redone change.
    pub fn redo(&mut self, doc: &mut Document) -> Option<String> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.restore(doc);
        let redone = self.stack[self.cursor].description.clone();
        log::debug!("redo {redone:?}");
        Some(redone)
    }

    fn restore(&mut self, doc: &mut Document) {
        self.locked = true;
        doc.clone_from(&self.stack[self.cursor].snapshot);
        self.locked = false;
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.stack.len()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Number of snapshots on the stack, base included.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Apply `f` to every stored snapshot. Used for edits that live
    /// outside the undo stack but are baked into document data.
    pub fn rewrite(&mut self, mut f: impl FnMut(&mut Document)) {
        for entry in &mut self.stack {
            f(&mut entry.snapshot);
        }
    }

    /// Drop all history and start over from `base`.
    pub fn reset(&mut self, base: &Document) {
        self.stack.clear();
        self.stack.push(Entry {
            snapshot: base.clone(),
            description: "initial state".to_string(),
        });
        self.cursor = 0;
        self.locked = false;
    }
}
