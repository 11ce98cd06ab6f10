//! Line highlighting and the per-line start-state cache
//!
//! [`highlight_line`] runs the state machine over one line and
//! returns the state that begins the next line. The cache keeps that
//! start state per line so edits only re-highlight forward until the
//! computed next-state matches the cached one again.

use super::merge::merge_syntax;
use super::{CondKind, DefaultKind, StateId, StyleId, SyntaxSet};
use crate::block::{BlockIter, BlockList};

/// Emit ids interned by `SyntaxSet::new`.
pub const STYLE_DEFAULT: StyleId = 0;
pub const STYLE_COMMENT: StyleId = 1;
pub const STYLE_NOTICE: StyleId = 2;

/// Highlight `line` (newline included unless it is the last line)
/// starting in `state`. Fills `styles` with one style id per byte
/// and returns the start state of the next line.
pub fn highlight_line(
    set: &mut SyntaxSet,
    syntax_name: &str,
    mut state: StateId,
    line: &[u8],
    styles: &mut Vec<StyleId>,
) -> StateId {
    let len = line.len();
    styles.clear();
    styles.resize(len, STYLE_DEFAULT);

    let mut i = 0;
    let mut sidx: Option<usize> = None;
    // A non-consuming transition cycle in a malformed syntax would
    // spin forever; force progress after visiting more states than
    // exist.
    let mut stalled = 0usize;

    'top: loop {
        if i >= len {
            return state;
        }

        let syn = match set.syntaxes.get(syntax_name) {
            Some(syn) => syn,
            None => return state,
        };
        let st = &syn.states[state];
        let ch = line[i];

        for cond in &st.conds {
            let a = cond.action;
            match &cond.kind {
                CondKind::CharBuffer(bits) => {
                    if !bits.contains(ch) {
                        continue;
                    }
                    if sidx.is_none() {
                        sidx = Some(i);
                    }
                    styles[i] = a.emit;
                    i += 1;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::Bufis(s) | CondKind::BufisIcase(s) => {
                    let icase = matches!(cond.kind, CondKind::BufisIcase(_));
                    let Some(start) = sidx else { continue };
                    let buf = &line[start..i];
                    let eq = if icase {
                        buf.eq_ignore_ascii_case(s)
                    } else {
                        buf == s.as_slice()
                    };
                    if !eq {
                        continue;
                    }
                    styles[start..i].fill(a.emit);
                    sidx = None;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::Char(bits) => {
                    if !bits.contains(ch) {
                        continue;
                    }
                    styles[i] = a.emit;
                    i += 1;
                    sidx = None;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::Char1(c) => {
                    if *c != ch {
                        continue;
                    }
                    styles[i] = a.emit;
                    i += 1;
                    sidx = None;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::InList { list, keep_buffer } => {
                    let Some(start) = sidx else { continue };
                    if !syn.string_lists[*list].contains(&line[start..i]) {
                        continue;
                    }
                    styles[start..i].fill(a.emit);
                    if !keep_buffer {
                        sidx = None;
                    }
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::Recolor(n) => {
                    let start = i.saturating_sub(*n);
                    styles[start..i].fill(a.emit);
                    // No transition; try the next condition
                }
                CondKind::RecolorBuffer => {
                    if let Some(start) = sidx.take() {
                        styles[start..i].fill(a.emit);
                    }
                }
                CondKind::Str(s) | CondKind::StrIcase(s) => {
                    let icase = matches!(cond.kind, CondKind::StrIcase(_));
                    let end = i + s.len();
                    if end > len {
                        continue;
                    }
                    let cand = &line[i..end];
                    let eq = if icase {
                        cand.eq_ignore_ascii_case(s)
                    } else {
                        cand == s.as_slice()
                    };
                    if !eq {
                        continue;
                    }
                    styles[i..end].fill(a.emit);
                    i = end;
                    sidx = None;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::Str2(s) => {
                    if len < i + 2 || ch != s[0] || line[i + 1] != s[1] {
                        continue;
                    }
                    styles[i] = a.emit;
                    styles[i + 1] = a.emit;
                    i += 2;
                    sidx = None;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
                CondKind::HeredocEnd(delim) => {
                    let end = i + delim.len();
                    if end > len || (!delim.is_empty() && &line[i..end] != delim.as_slice()) {
                        continue;
                    }
                    styles[i..end].fill(a.emit);
                    i = end;
                    sidx = None;
                    state = a.dest.unwrap_or(state);
                    stalled = 0;
                    continue 'top;
                }
            }
        }

        let default_kind = st.default_kind;
        let default_action = st.default_action;
        match default_kind {
            DefaultKind::Eat => {
                styles[i] = default_action.emit;
                i += 1;
                sidx = None;
                state = default_action.dest.unwrap_or(state);
                stalled = 0;
            }
            DefaultKind::Noeat | DefaultKind::NoeatBuffer => {
                if default_kind == DefaultKind::Noeat {
                    sidx = None;
                }
                state = default_action.dest.unwrap_or(state);
                stalled += 1;
                if stalled > set.syntaxes[syntax_name].states.len() {
                    log::warn!(
                        "non-consuming state cycle in syntax {syntax_name:?}, forcing progress"
                    );
                    styles[i] = default_action.emit;
                    i += 1;
                    stalled = 0;
                }
            }
            DefaultKind::HeredocBegin => {
                let start = *sidx.get_or_insert(i);
                let delim = line[start..i].to_vec();
                state = handle_heredoc(set, syntax_name, state, &delim);
                stalled = 0;
            }
        }
    }
}

/// Look up or lazily create the merged sub-syntax instance for this
/// heredoc delimiter.
fn handle_heredoc(set: &mut SyntaxSet, syntax_name: &str, state: StateId, delim: &[u8]) -> StateId {
    let syn = &set.syntaxes[syntax_name];
    let st = &syn.states[state];
    if let Some(hs) = st.heredoc_states.iter().find(|h| h.delim == delim) {
        return hs.start;
    }

    let return_state = st.default_action.dest;
    let Some(sub) = st
        .heredoc_subsyntax
        .as_ref()
        .and_then(|name| set.syntaxes.get(name))
        .cloned()
    else {
        // Loader validation should make this unreachable; degrade to
        // the return state so highlighting still terminates.
        return return_state.unwrap_or(state);
    };

    let prefix = set.next_merge_prefix();
    let parent = set.syntaxes.get_mut(syntax_name).expect("checked above");
    let start = merge_syntax(parent, &sub, return_state, delim, &prefix);
    parent.states[state].heredoc_states.push(super::HeredocState {
        delim: delim.to_vec(),
        start,
    });
    start
}

/// Repaint TODO/FIXME/XXX word runs inside comment-styled bytes.
pub fn mark_comment_notices(line: &[u8], styles: &mut [StyleId]) {
    const WORDS: [&[u8]; 3] = [b"TODO", b"FIXME", b"XXX"];
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    let mut i = 0;
    while i < line.len() {
        if styles[i] != STYLE_COMMENT || !is_word(line[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < line.len() && styles[i] == STYLE_COMMENT && is_word(line[i]) {
            i += 1;
        }
        // A word run truncated by the end of the comment style is not
        // a whole word
        let word = &line[start..i];
        let boundary = i >= line.len() || !is_word(line[i]);
        if boundary && WORDS.contains(&word) {
            styles[start..i].fill(STYLE_NOTICE);
        }
    }
}

/// Cached syntax state beginning each line. Slot `i` is the state
/// that starts line `i`; an invalid slot keeps its old value for
/// equality testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    state: StateId,
    valid: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LineStateCache {
    slots: Vec<Slot>,
}

impl LineStateCache {
    pub fn new() -> Self {
        LineStateCache { slots: Vec::new() }
    }

    /// Drop everything and seed line 0 with the syntax start state.
    pub fn reset(&mut self, start: StateId) {
        self.slots.clear();
        self.slots.push(Slot { state: start, valid: true });
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn truncate(&mut self, len: usize) {
        self.slots.truncate(len);
    }

    fn invalidate(&mut self, idx: usize) {
        if let Some(slot) = self.slots.get_mut(idx) {
            slot.valid = false;
        }
    }

    /// Text was inserted: `lines` new lines appeared after `first`.
    pub fn hl_insert(&mut self, first: usize, lines: usize) {
        let count = self.slots.len();
        if self.slots.is_empty() || first >= count {
            // Nothing cached that far down
            return;
        }

        let last = first + lines;
        if last + 1 >= count {
            // The last already-highlighted lines changed; recomputing
            // beats preserving
            self.truncate(first + 1);
            return;
        }

        if lines > 0 {
            let fill = self.slots[first];
            self.slots
                .splice(first + 1..first + 1, std::iter::repeat(fill).take(lines));
        }
        for i in first + 1..=last + 1 {
            self.invalidate(i);
        }
    }

    /// Text was deleted: `deleted_nl` lines collapsed after `first`.
    pub fn hl_delete(&mut self, first: usize, deleted_nl: usize) {
        let count = self.slots.len();
        if count <= 1 || first >= count {
            return;
        }

        let last = first + deleted_nl;
        if last + 1 >= count {
            self.truncate(first + 1);
            return;
        }

        if deleted_nl > 0 {
            self.slots.drain(first + 1..last + 1);
        }
        self.invalidate(first + 1);
    }
}

/// Re-highlight from the first invalid slot, stopping early when the
/// computed next-state matches the cached one. Returns lines filled.
fn fill_hole(
    set: &mut SyntaxSet,
    syntax_name: &str,
    cache: &mut LineStateCache,
    blocks: &BlockList,
    bi: &mut BlockIter,
    sidx: usize,
    eidx: usize,
) -> usize {
    let mut scratch = Vec::new();
    let mut idx = sidx;
    while idx < eidx {
        let line = bi.line_with_nl(blocks).to_vec();
        bi.eat_line(blocks);
        let st = highlight_line(set, syntax_name, cache.slots[idx].state, &line, &mut scratch);
        idx += 1;

        let slot = cache.slots[idx];
        if slot.valid && slot.state == st {
            // Was not invalidated and didn't change
            break;
        }
        if slot.state == st {
            // Was invalidated and didn't change
            cache.slots[idx].valid = true;
        } else {
            cache.slots[idx] = Slot { state: st, valid: true };
            if idx == eidx {
                cache.invalidate(idx + 1);
            }
        }
    }
    idx - sidx
}

/// Make the cache valid for all lines up to and including `line_nr`.
pub fn hl_fill_start_states(
    set: &mut SyntaxSet,
    syntax_name: &str,
    cache: &mut LineStateCache,
    blocks: &BlockList,
    line_nr: usize,
) {
    if cache.is_empty() {
        return;
    }

    let mut bi = BlockIter::bof();
    let mut current_line = 0usize;
    let mut idx = 0usize;

    // Update invalid slots
    let mut last = line_nr.min(cache.len() - 1);
    loop {
        while idx <= last && cache.slots[idx].valid {
            idx += 1;
        }
        if idx > last {
            break;
        }

        // Go to the line before the first hole
        idx -= 1;
        move_down(&mut bi, blocks, idx - current_line);
        current_line = idx;

        // Might not fill the entire hole, which is fine
        let count = fill_hole(set, syntax_name, cache, blocks, &mut bi, idx, last);
        idx += count;
        current_line += count;
        last = last.min(cache.len() - 1);
    }

    // Extend past the cache end
    move_down(&mut bi, blocks, cache.len() - 1 - current_line);
    let mut scratch = Vec::new();
    while cache.len() - 1 < line_nr {
        let line = bi.line_with_nl(blocks).to_vec();
        let start = cache.slots[cache.len() - 1].state;
        let st = highlight_line(set, syntax_name, start, &line, &mut scratch);
        cache.slots.push(Slot { state: st, valid: true });
        bi.eat_line(blocks);
    }
}

/// Highlight a single line through the cache, returning per-byte
/// styles and whether the following line's start state changed.
pub fn hl_line(
    set: &mut SyntaxSet,
    syntax_name: &str,
    cache: &mut LineStateCache,
    line: &[u8],
    line_nr: usize,
) -> (Vec<StyleId>, bool) {
    let mut styles = Vec::new();
    debug_assert!(line_nr < cache.len());
    let start = cache.slots[line_nr].state;
    let next = highlight_line(set, syntax_name, start, line, &mut styles);
    mark_comment_notices(line, &mut styles);

    let mut next_changed = false;
    let idx = line_nr + 1;
    if idx == cache.len() {
        cache.slots.push(Slot { state: next, valid: true });
        next_changed = true;
    } else if cache.slots[idx].valid && cache.slots[idx].state == next {
        // Was not invalidated and didn't change
    } else if cache.slots[idx].state == next {
        // Was invalidated and didn't change
        cache.slots[idx].valid = true;
    } else {
        cache.slots[idx] = Slot { state: next, valid: true };
        next_changed = true;
        cache.invalidate(idx + 1);
    }
    (styles, next_changed)
}

fn move_down(bi: &mut BlockIter, blocks: &BlockList, count: usize) {
    for _ in 0..count {
        bi.eat_line(blocks);
    }
}
