//! Buffer: blocks, options, change tree and syntax cache
//!
//! A buffer owns the block list, the undo tree, its local options,
//! the per-line syntax start-state cache and the file metadata. All
//! edits funnel through [`Buffer::replace_bytes`] and friends, which
//! record the change before applying it and keep the syntax cache
//! and dirty-line range up to date.

pub mod options;

use crate::block::{BlockIter, BlockList};
use crate::change::{AppliedEdit, ChangeTree, MergeKind, RedoError};
use crate::encoding::Encoding;
use crate::syntax::{LineStateCache, StateId};
use std::path::PathBuf;

use self::options::LocalOptions;

#[derive(Debug)]
pub struct Buffer {
    pub blocks: BlockList,
    pub changes: ChangeTree,
    pub options: LocalOptions,
    pub line_start_states: LineStateCache,
    /// Name of the active syntax in the editor's syntax set.
    pub syntax_name: Option<String>,
    pub encoding: Encoding,
    pub crlf_newlines: bool,
    pub path: Option<PathBuf>,
    pub display_name: String,
    pub readonly: bool,
    /// Inclusive dirty line range for the next redraw.
    changed_lines: Option<(usize, usize)>,
}

impl Buffer {
    pub fn new() -> Self {
        Buffer {
            blocks: BlockList::new(),
            changes: ChangeTree::new(),
            options: LocalOptions::default(),
            line_start_states: LineStateCache::new(),
            syntax_name: None,
            encoding: Encoding::utf8(),
            crlf_newlines: false,
            path: None,
            display_name: String::from("(No name)"),
            readonly: false,
            changed_lines: None,
        }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut b = Buffer::new();
        b.blocks = BlockList::from_bytes(data);
        b
    }

    pub fn modified(&self) -> bool {
        self.changes.modified()
    }

    pub fn mark_saved(&mut self) {
        self.changes.mark_saved();
    }

    /// Union an inclusive line range into the dirty set.
    pub fn mark_lines_changed(&mut self, min: usize, max: usize) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.changed_lines = Some(match self.changed_lines {
            Some((a, b)) => (a.min(min), b.max(max)),
            None => (min, max),
        });
    }

    pub fn take_changed_lines(&mut self) -> Option<(usize, usize)> {
        self.changed_lines.take()
    }

    pub fn mark_everything_changed(&mut self) {
        self.mark_lines_changed(0, self.blocks.line_count().saturating_sub(1));
    }

    /// Re-seed the syntax cache; call when the syntax changes.
    pub fn reset_syntax_cache(&mut self, start: Option<StateId>) {
        match start {
            Some(start) => self.line_start_states.reset(start),
            None => self.line_start_states.clear(),
        }
        self.mark_everything_changed();
    }

    pub fn begin_change(&mut self, m: MergeKind) {
        self.changes.begin_change(m);
    }

    pub fn end_change(&mut self) {
        self.changes.end_change();
    }

    pub fn begin_change_chain(&mut self) {
        self.changes.begin_change_chain();
    }

    pub fn end_change_chain(&mut self) {
        self.changes.end_change_chain();
    }

    pub fn insert_bytes(&mut self, offset: usize, ins: &[u8]) {
        self.do_replace(offset, 0, ins, false);
    }

    /// Delete forward (Del-key style; cursor stays at `offset`).
    pub fn delete_bytes(&mut self, offset: usize, len: usize) {
        self.do_replace(offset, len, b"", false);
    }

    /// Delete backward (backspace style; undo restores the cursor
    /// after the re-inserted text).
    pub fn erase_bytes(&mut self, offset: usize, len: usize) {
        self.do_replace(offset, len, b"", true);
    }

    pub fn replace_bytes(&mut self, offset: usize, del: usize, ins: &[u8]) {
        self.do_replace(offset, del, ins, false);
    }

    fn do_replace(&mut self, offset: usize, del: usize, ins: &[u8], move_after: bool) {
        if del == 0 && ins.is_empty() {
            return;
        }
        debug_assert!(offset + del <= self.blocks.len());

        let line = self.blocks.line_at_offset(offset);
        let mut it = BlockIter::bof();
        it.goto_offset(&self.blocks, offset);

        let deleted = self.blocks.delete(it, del);
        let del_nl = deleted.iter().filter(|&&b| b == b'\n').count();
        let ins_nl = self.blocks.insert(it, ins);

        self.changes.record(offset, deleted, ins.len(), move_after);
        self.update_hl(line, del, del_nl, ins.len(), ins_nl);
    }

    fn update_hl(&mut self, line: usize, del: usize, del_nl: usize, ins: usize, ins_nl: usize) {
        if del > 0 {
            self.line_start_states.hl_delete(line, del_nl);
        }
        if ins > 0 {
            self.line_start_states.hl_insert(line, ins_nl);
        }
        if del_nl > 0 || ins_nl > 0 {
            // Lines shifted; everything below is stale
            let last = self.blocks.line_count().saturating_sub(1);
            self.mark_lines_changed(line, last);
        } else {
            self.mark_lines_changed(line, line);
        }
    }

    /// Revert the current change. Returns the cursor offset to
    /// restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<usize> {
        let applied = self.changes.undo(&mut self.blocks)?;
        Some(self.finish_history_op(applied))
    }

    /// Re-apply a change. `id` picks a redo branch (1-based), `None`
    /// the most recent one.
    pub fn redo(&mut self, id: Option<usize>) -> Result<usize, RedoError> {
        let applied = self.changes.redo(&mut self.blocks, id)?;
        Ok(self.finish_history_op(applied))
    }

    fn finish_history_op(&mut self, applied: Vec<AppliedEdit>) -> usize {
        let mut cursor = 0;
        for e in &applied {
            let line = self.blocks.line_at_offset(e.offset);
            self.update_hl(line, e.del_count, e.del_nl, e.ins_count, e.ins_nl);
            cursor = e.cursor;
        }
        cursor
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
