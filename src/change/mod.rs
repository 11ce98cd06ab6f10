//! Undo/redo change tree
//!
//! Every edit is recorded with its pre-image before it is applied, as
//! a node in a tree rooted at a sentinel. The active path is tracked
//! by `cur`: undo moves towards the root reverting edits, redo picks
//! a child (most recent by default) and re-applies. Nodes off the
//! active path stay reachable, so no history is ever lost.
//!
//! Adjacent compatible edits merge into one node (a run of typed
//! characters undoes as a unit), and a change chain collapses all
//! edits recorded inside it into a single node.

use crate::block::{BlockIter, BlockList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeKind {
    #[default]
    None,
    Insert,
    Delete,
    Erase,
}

/// One recorded edit. `deleted` holds the pre-image of the removed
/// bytes; inserted bytes live in the buffer itself. Reverting an
/// edit toggles it in place, which makes undo and redo symmetric.
#[derive(Debug, Clone, Default)]
pub struct Edit {
    pub offset: usize,
    pub del_count: usize,
    pub ins_count: usize,
    pub deleted: Vec<u8>,
    /// Move after the re-inserted text when undoing a delete
    /// (backspace-style erases restore the cursor past the text).
    pub move_after: bool,
}

#[derive(Debug, Clone)]
struct ChangeNode {
    parent: usize,
    children: Vec<usize>,
    edits: Vec<Edit>,
}

/// Byte/newline delta of one applied or reverted edit, consumed by
/// the buffer to update the syntax cache and dirty lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedEdit {
    pub offset: usize,
    pub del_count: usize,
    pub del_nl: usize,
    pub ins_count: usize,
    pub ins_nl: usize,
    pub cursor: usize,
}

const ROOT: usize = 0;

#[derive(Debug, Clone)]
pub struct ChangeTree {
    nodes: Vec<ChangeNode>,
    cur: usize,
    saved: Option<usize>,
    merge: MergeKind,
    prev_merge: MergeKind,
    chaining: bool,
    chain_node: Option<usize>,
}

impl ChangeTree {
    pub fn new() -> Self {
        ChangeTree {
            nodes: vec![ChangeNode {
                parent: ROOT,
                children: Vec::new(),
                edits: Vec::new(),
            }],
            cur: ROOT,
            saved: Some(ROOT),
            merge: MergeKind::None,
            prev_merge: MergeKind::None,
            chaining: false,
            chain_node: None,
        }
    }

    /// True when the buffer differs from its last saved state.
    pub fn modified(&self) -> bool {
        self.saved != Some(self.cur)
    }

    /// Mark the current node as the saved state.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.cur);
    }

    pub fn can_undo(&self) -> bool {
        self.cur != ROOT
    }

    pub fn can_redo(&self) -> bool {
        !self.nodes[self.cur].children.is_empty()
    }

    /// Ids of the redo branches at the current node, oldest first.
    pub fn redo_branches(&self) -> &[usize] {
        &self.nodes[self.cur].children
    }

    pub fn begin_change(&mut self, m: MergeKind) {
        self.merge = m;
    }

    pub fn end_change(&mut self) {
        self.prev_merge = self.merge;
    }

    pub fn begin_change_chain(&mut self) {
        debug_assert!(!self.chaining);
        self.chaining = true;
        self.chain_node = None;
        self.merge = MergeKind::None;
    }

    pub fn end_change_chain(&mut self) {
        self.chaining = false;
        self.chain_node = None;
    }

    /// Record an edit that is about to be applied. `deleted` is the
    /// pre-image of the removed bytes.
    pub fn record(&mut self, offset: usize, deleted: Vec<u8>, ins_count: usize, move_after: bool) {
        if self.chaining {
            let node = match self.chain_node {
                Some(n) => n,
                None => {
                    let n = self.new_node();
                    self.chain_node = Some(n);
                    n
                }
            };
            if !self.try_merge_into(node, offset, &deleted, ins_count) {
                self.nodes[node].edits.push(Edit {
                    offset,
                    del_count: deleted.len(),
                    ins_count,
                    deleted,
                    move_after,
                });
            }
            return;
        }

        if self.merge != MergeKind::None
            && self.merge == self.prev_merge
            && self.cur != ROOT
            && self.saved != Some(self.cur)
            && self.nodes[self.cur].children.is_empty()
            && self.nodes[self.cur].edits.len() == 1
            && self.try_merge_into(self.cur, offset, &deleted, ins_count)
        {
            return;
        }

        let node = self.new_node();
        self.nodes[node].edits.push(Edit {
            offset,
            del_count: deleted.len(),
            ins_count,
            deleted,
            move_after,
        });
    }

    fn new_node(&mut self) -> usize {
        let id = self.nodes.len();
        self.nodes.push(ChangeNode {
            parent: self.cur,
            children: Vec::new(),
            edits: Vec::new(),
        });
        self.nodes[self.cur].children.push(id);
        self.cur = id;
        id
    }

    /// Try to extend the last edit of `node` with a compatible
    /// abutting edit.
    fn try_merge_into(
        &mut self,
        node: usize,
        offset: usize,
        deleted: &[u8],
        ins_count: usize,
    ) -> bool {
        let merge = self.merge;
        let Some(e) = self.nodes[node].edits.last_mut() else {
            return false;
        };
        match merge {
            MergeKind::Insert => {
                // Successive inserts abutting the previous tail
                if deleted.is_empty()
                    && e.del_count == 0
                    && ins_count > 0
                    && e.offset + e.ins_count == offset
                {
                    e.ins_count += ins_count;
                    return true;
                }
            }
            MergeKind::Delete => {
                // Forward deletes at the same offset
                if ins_count == 0 && e.ins_count == 0 && !deleted.is_empty() && e.offset == offset {
                    e.deleted.extend_from_slice(deleted);
                    e.del_count += deleted.len();
                    return true;
                }
            }
            MergeKind::Erase => {
                // Backward deletes ending where the previous started
                if ins_count == 0
                    && e.ins_count == 0
                    && !deleted.is_empty()
                    && offset + deleted.len() == e.offset
                {
                    let mut buf = deleted.to_vec();
                    buf.extend_from_slice(&e.deleted);
                    e.deleted = buf;
                    e.del_count += deleted.len();
                    e.offset = offset;
                    e.move_after = true;
                    return true;
                }
            }
            MergeKind::None => {}
        }
        false
    }

    /// Revert the current node and move to its parent. Returns the
    /// deltas applied, last one carrying the final cursor offset.
    pub fn undo(&mut self, blocks: &mut BlockList) -> Option<Vec<AppliedEdit>> {
        if self.cur == ROOT {
            return None;
        }
        let node = self.cur;
        let mut applied = Vec::with_capacity(self.nodes[node].edits.len());
        // Chain edits revert in reverse recording order, so the final
        // cursor target is the first (leftmost) edit's.
        let mut edits = std::mem::take(&mut self.nodes[node].edits);
        for e in edits.iter_mut().rev() {
            applied.push(reverse_edit(blocks, e));
        }
        self.nodes[node].edits = edits;
        self.cur = self.nodes[node].parent;
        self.prev_merge = MergeKind::None;
        Some(applied)
    }

    /// Apply the child selected by `id` (default: most recent).
    /// Returns the deltas, or an error when `id` names no branch.
    pub fn redo(
        &mut self,
        blocks: &mut BlockList,
        id: Option<usize>,
    ) -> Result<Vec<AppliedEdit>, RedoError> {
        let children = &self.nodes[self.cur].children;
        if children.is_empty() {
            return Err(RedoError::NothingToRedo);
        }
        let node = match id {
            Some(id) => {
                // 1-based branch ids, oldest first
                *children.get(id.wrapping_sub(1)).ok_or(RedoError::NoSuchBranch {
                    id,
                    count: children.len(),
                })?
            }
            None => *children.last().expect("checked non-empty"),
        };

        let mut edits = std::mem::take(&mut self.nodes[node].edits);
        let mut applied = Vec::with_capacity(edits.len());
        for e in edits.iter_mut() {
            applied.push(reverse_edit(blocks, e));
        }
        self.nodes[node].edits = edits;
        self.cur = node;
        self.prev_merge = MergeKind::None;
        Ok(applied)
    }
}

impl Default for ChangeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedoError {
    NothingToRedo,
    NoSuchBranch { id: usize, count: usize },
}

fn count_nl(data: &[u8]) -> usize {
    data.iter().filter(|&&b| b == b'\n').count()
}

/// Apply the inverse of `e` to the blocks and toggle it in place so
/// that the next reversal re-applies the original edit.
fn reverse_edit(blocks: &mut BlockList, e: &mut Edit) -> AppliedEdit {
    let mut it = BlockIter::bof();
    it.goto_offset(blocks, e.offset);

    if e.ins_count == 0 {
        // Revert a delete: re-insert the pre-image
        let buf = std::mem::take(&mut e.deleted);
        let ins_nl = blocks.insert(it, &buf);
        let cursor = e.offset + if e.move_after { e.del_count } else { 0 };
        let applied = AppliedEdit {
            offset: e.offset,
            del_count: 0,
            del_nl: 0,
            ins_count: buf.len(),
            ins_nl,
            cursor,
        };
        e.ins_count = e.del_count;
        e.del_count = 0;
        applied
    } else if e.del_count > 0 {
        // Revert a replace
        let removed = blocks.delete(it, e.ins_count);
        let buf = std::mem::take(&mut e.deleted);
        let ins_nl = blocks.insert(it, &buf);
        let applied = AppliedEdit {
            offset: e.offset,
            del_count: removed.len(),
            del_nl: count_nl(&removed),
            ins_count: buf.len(),
            ins_nl,
            cursor: e.offset,
        };
        std::mem::swap(&mut e.del_count, &mut e.ins_count);
        e.deleted = removed;
        applied
    } else {
        // Revert an insert: delete the inserted bytes
        let removed = blocks.delete(it, e.ins_count);
        let applied = AppliedEdit {
            offset: e.offset,
            del_count: removed.len(),
            del_nl: count_nl(&removed),
            ins_count: 0,
            ins_nl: 0,
            cursor: e.offset,
        };
        e.del_count = e.ins_count;
        e.ins_count = 0;
        e.deleted = removed;
        applied
    }
}
