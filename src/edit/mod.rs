//! Editing services: insertion, deletion, motion, indentation,
//! clipboard, case conversion and line joining
//!
//! These are the small operations commands are built from. They all
//! work on a (view, buffer) pair; any mutation goes through the
//! buffer's recording trampolines, and the cursor is re-seeked by
//! offset afterwards because edits re-chunk the block list.

use crate::block::BlockIter;
use crate::buffer::Buffer;
use crate::change::MergeKind;
use crate::unicode::CodePoint;
use crate::view::{self, SelectionKind, View};

fn is_word_byte_cp(cp: CodePoint) -> bool {
    match cp {
        CodePoint::Unicode(c) => c.is_alphanumeric() || c == '_',
        CodePoint::Invalid(_) => false,
    }
}

fn reseek(view: &mut View, buffer: &Buffer, offset: usize) {
    view.cursor = BlockIter::bof();
    view.cursor
        .goto_offset(&buffer.blocks, offset.min(buffer.blocks.len()));
}

/// Insert raw bytes at the cursor. With `move_after` the cursor ends
/// after the inserted text.
pub fn insert_text(view: &mut View, buffer: &mut Buffer, text: &[u8], move_after: bool) {
    let offset = view.cursor.get_offset(&buffer.blocks);
    buffer.insert_bytes(offset, text);
    let target = if move_after { offset + text.len() } else { offset };
    reseek(view, buffer, target);
    view.reset_preferred_x();
}

/// Leading whitespace of the line under the cursor.
fn current_indent(view: &View, buffer: &Buffer) -> Vec<u8> {
    let (line, _) = view.cursor.this_line(&buffer.blocks);
    line.iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .copied()
        .collect()
}

/// One indent level per the buffer options.
pub fn make_indent(buffer: &Buffer) -> Vec<u8> {
    if buffer.options.expand_tab {
        vec![b' '; buffer.options.indent_width as usize]
    } else {
        vec![b'\t']
    }
}

/// Expand tabs in `text` against the indent width; used by typed and
/// scripted insertion when expand-tab is on.
fn expand_tabs(buffer: &Buffer, text: &[u8], start_col: usize) -> Vec<u8> {
    let iw = buffer.options.indent_width as usize;
    let mut out = Vec::with_capacity(text.len());
    let mut col = start_col;
    for &b in text {
        match b {
            b'\t' => {
                let n = iw - (col % iw);
                out.extend(std::iter::repeat(b' ').take(n));
                col += n;
            }
            b'\n' => {
                out.push(b);
                col = 0;
            }
            _ => {
                out.push(b);
                col += 1;
            }
        }
    }
    out
}

/// Insert typed or scripted text, honoring expand-tab. A selection
/// is replaced by the insertion.
pub fn insert_text_with_options(view: &mut View, buffer: &mut Buffer, text: &[u8], move_after: bool) {
    if view.has_selection() {
        delete_selection(view, buffer);
    }
    let expanded;
    let text = if buffer.options.expand_tab && text.contains(&b'\t') {
        let col = view::display_column(&buffer.blocks, &buffer.options, &view.cursor);
        expanded = expand_tabs(buffer, text, col);
        &expanded[..]
    } else {
        text
    };
    insert_text(view, buffer, text, move_after);
}

/// Insert one typed character: newline does auto-indent, tab obeys
/// expand-tab, everything else inserts and merges with the previous
/// typed run.
pub fn insert_ch(view: &mut View, buffer: &mut Buffer, ch: char) {
    buffer.begin_change(MergeKind::Insert);
    if ch == '\n' {
        let mut text = vec![b'\n'];
        if buffer.options.auto_indent {
            text.extend(current_indent(view, buffer));
        }
        insert_text_with_options(view, buffer, &text, true);
    } else {
        let mut buf = [0u8; 4];
        let s = ch.encode_utf8(&mut buf);
        insert_text_with_options(view, buffer, s.as_bytes(), true);
    }
}

/// Delete the selection; the cursor moves to its low end.
pub fn delete_selection(view: &mut View, buffer: &mut Buffer) -> usize {
    let len = view.prepare_selection(&buffer.blocks, &buffer.options);
    let offset = view.cursor.get_offset(&buffer.blocks);
    buffer.delete_bytes(offset, len);
    view.cancel_selection();
    reseek(view, buffer, offset);
    len
}

/// Delete key: the selection if any, else one column forward.
pub fn delete_ch(view: &mut View, buffer: &mut Buffer) {
    if view.has_selection() {
        delete_selection(view, buffer);
    } else {
        buffer.begin_change(MergeKind::Delete);
        let offset = view.cursor.get_offset(&buffer.blocks);
        let mut it = view.cursor;
        let len = it.next_column(&buffer.blocks);
        if len > 0 {
            buffer.delete_bytes(offset, len);
            reseek(view, buffer, offset);
        }
    }
    view.reset_preferred_x();
}

/// Backspace: the selection if any, else one column backward.
pub fn erase_ch(view: &mut View, buffer: &mut Buffer) {
    if view.has_selection() {
        delete_selection(view, buffer);
    } else {
        buffer.begin_change(MergeKind::Erase);
        let mut it = view.cursor;
        let len = it.prev_column(&buffer.blocks);
        if len > 0 {
            let offset = it.get_offset(&buffer.blocks);
            buffer.erase_bytes(offset, len);
            reseek(view, buffer, offset);
        }
    }
    view.reset_preferred_x();
}

// ---------------------------------------------------------------
// Motion

pub fn move_left(view: &mut View, buffer: &Buffer, count: usize) {
    for _ in 0..count {
        if view.cursor.prev_column(&buffer.blocks) == 0 {
            break;
        }
    }
    view.reset_preferred_x();
}

pub fn move_right(view: &mut View, buffer: &Buffer, count: usize) {
    for _ in 0..count {
        if view.cursor.next_column(&buffer.blocks) == 0 {
            break;
        }
    }
    view.reset_preferred_x();
}

pub fn move_up(view: &mut View, buffer: &Buffer, count: usize) {
    let x = view.get_preferred_x(&buffer.blocks, &buffer.options);
    for _ in 0..count {
        if view.cursor.prev_line(&buffer.blocks) == 0 {
            break;
        }
    }
    view.cursor.bol(&buffer.blocks);
    view::move_to_column(&buffer.blocks, &buffer.options, &mut view.cursor, x);
}

pub fn move_down(view: &mut View, buffer: &Buffer, count: usize) {
    let x = view.get_preferred_x(&buffer.blocks, &buffer.options);
    for _ in 0..count {
        let mut it = view.cursor;
        it.bol(&buffer.blocks);
        if it.next_line(&buffer.blocks) == 0 {
            break;
        }
        view.cursor = it;
    }
    view::move_to_column(&buffer.blocks, &buffer.options, &mut view.cursor, x);
}

pub fn move_bol(view: &mut View, buffer: &Buffer) {
    view.cursor.bol(&buffer.blocks);
    view.reset_preferred_x();
}

pub fn move_eol(view: &mut View, buffer: &Buffer) {
    view.cursor.eol(&buffer.blocks);
    view.reset_preferred_x();
}

pub fn move_bof(view: &mut View, _buffer: &Buffer) {
    view.cursor = BlockIter::bof();
    view.reset_preferred_x();
}

pub fn move_eof(view: &mut View, buffer: &Buffer) {
    view.cursor = BlockIter::eof(&buffer.blocks);
    view.reset_preferred_x();
}

pub fn move_to_line(view: &mut View, buffer: &Buffer, line: usize) {
    view.cursor
        .goto_line(&buffer.blocks, line.saturating_sub(1));
    view.reset_preferred_x();
}

/// Forward to the start of the next word (or the end of the current
/// word when `skip_non_word` is false). Returns bytes moved.
pub fn word_fwd(view: &mut View, buffer: &Buffer, skip_non_word: bool) -> usize {
    let blocks = &buffer.blocks;
    let it = &mut view.cursor;
    let mut moved = 0;
    while let Some(cp) = it.get_char(blocks) {
        if !is_word_byte_cp(cp) {
            break;
        }
        moved += it.next_char(blocks).map_or(0, |(_, n)| n);
    }
    if skip_non_word {
        while let Some(cp) = it.get_char(blocks) {
            if is_word_byte_cp(cp) {
                break;
            }
            moved += it.next_char(blocks).map_or(0, |(_, n)| n);
        }
    }
    view.reset_preferred_x();
    moved
}

/// Backward to the start of the previous word. Returns bytes moved.
pub fn word_bwd(view: &mut View, buffer: &Buffer, skip_non_word: bool) -> usize {
    let blocks = &buffer.blocks;
    let it = &mut view.cursor;
    let mut moved = 0;
    if skip_non_word {
        loop {
            let mut peek = *it;
            match peek.prev_char(blocks) {
                Some((cp, n)) if !is_word_byte_cp(cp) => {
                    *it = peek;
                    moved += n;
                }
                _ => break,
            }
        }
    }
    loop {
        let mut peek = *it;
        match peek.prev_char(blocks) {
            Some((cp, n)) if is_word_byte_cp(cp) => {
                *it = peek;
                moved += n;
            }
            _ => break,
        }
    }
    view.reset_preferred_x();
    moved
}

/// Delete from the cursor to the start of the next word.
pub fn delete_word(view: &mut View, buffer: &mut Buffer) {
    let offset = view.cursor.get_offset(&buffer.blocks);
    let mut probe = View::new(view.buffer);
    probe.cursor = view.cursor;
    let len = word_fwd(&mut probe, buffer, true);
    if len > 0 {
        buffer.begin_change(MergeKind::Delete);
        buffer.delete_bytes(offset, len);
        reseek(view, buffer, offset);
        view.reset_preferred_x();
    }
}

/// Erase from the start of the previous word to the cursor.
pub fn erase_word(view: &mut View, buffer: &mut Buffer) {
    let mut probe = View::new(view.buffer);
    probe.cursor = view.cursor;
    let len = word_bwd(&mut probe, buffer, true);
    if len > 0 {
        let offset = probe.cursor.get_offset(&buffer.blocks);
        buffer.begin_change(MergeKind::Erase);
        buffer.erase_bytes(offset, len);
        reseek(view, buffer, offset);
        view.reset_preferred_x();
    }
}

/// Delete from the cursor to the end of line (not the newline).
pub fn delete_eol(view: &mut View, buffer: &mut Buffer) {
    let offset = view.cursor.get_offset(&buffer.blocks);
    let mut it = view.cursor;
    let len = it.eol(&buffer.blocks);
    if len > 0 {
        buffer.delete_bytes(offset, len);
        reseek(view, buffer, offset);
    }
}

/// Delete the cursor line(s), including those of a line selection.
pub fn delete_lines(view: &mut View, buffer: &mut Buffer) {
    let (so, eo) = if view.has_selection() {
        let mut info = view.init_selection(&buffer.blocks, &buffer.options);
        if view.selection != SelectionKind::Lines {
            // Expand a char selection to whole lines
            info.so -= {
                let mut it = info.si;
                it.bol(&buffer.blocks)
            };
            let mut ei = BlockIter::bof();
            ei.goto_offset(&buffer.blocks, info.eo);
            info.eo += ei.eat_line(&buffer.blocks);
        }
        (info.so, info.eo)
    } else {
        let mut it = view.cursor;
        it.bol(&buffer.blocks);
        let so = it.get_offset(&buffer.blocks);
        let len = it.eat_line(&buffer.blocks);
        (so, so + len)
    };
    view.cancel_selection();
    buffer.delete_bytes(so, eo - so);
    reseek(view, buffer, so);
    view.reset_preferred_x();
}

// ---------------------------------------------------------------
// Clipboard

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    data: Vec<u8>,
    is_lines: bool,
}

impl Clipboard {
    pub fn new() -> Self {
        Clipboard::default()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn set(&mut self, data: Vec<u8>, is_lines: bool) {
        self.data = data;
        self.is_lines = is_lines;
    }
}

/// Copy the selection (or the cursor line) into the clipboard.
/// `cut` removes the copied text.
pub fn copy(view: &mut View, buffer: &mut Buffer, clip: &mut Clipboard, cut: bool) {
    let (offset, len, is_lines) = if view.has_selection() {
        let len = view.prepare_selection(&buffer.blocks, &buffer.options);
        let offset = view.cursor.get_offset(&buffer.blocks);
        let lines = view.selection == SelectionKind::Lines;
        view.cancel_selection();
        (offset, len, lines)
    } else {
        let mut it = view.cursor;
        it.bol(&buffer.blocks);
        let offset = it.get_offset(&buffer.blocks);
        let mut end = it;
        let len = end.eat_line(&buffer.blocks);
        (offset, len, true)
    };

    let mut it = BlockIter::bof();
    it.goto_offset(&buffer.blocks, offset);
    clip.set(buffer.blocks.get_bytes(it, len), is_lines);

    if cut {
        buffer.delete_bytes(offset, len);
        reseek(view, buffer, offset);
    } else if view.cursor.get_offset(&buffer.blocks) != offset {
        reseek(view, buffer, offset);
    }
    view.reset_preferred_x();
}

/// Paste the clipboard: line-wise content goes on a new line below
/// the cursor, character content at the cursor.
pub fn paste(view: &mut View, buffer: &mut Buffer, clip: &Clipboard) {
    if clip.is_empty() {
        return;
    }
    if view.has_selection() {
        delete_selection(view, buffer);
    }

    if clip.is_lines {
        let mut it = view.cursor;
        it.bol(&buffer.blocks);
        it.eat_line(&buffer.blocks);
        let offset = it.get_offset(&buffer.blocks);

        // An unterminated last line needs the newline added first
        let mut text = clip.data.clone();
        let at_eof = offset == buffer.blocks.len();
        let last_blk = buffer.blocks.block(buffer.blocks.nr_blocks() - 1);
        let needs_nl = at_eof && last_blk.data.last().map_or(false, |&b| b != b'\n');
        if needs_nl {
            text.insert(0, b'\n');
        }
        buffer.insert_bytes(offset, &text);
        reseek(view, buffer, if needs_nl { offset + 1 } else { offset });
    } else {
        let offset = view.cursor.get_offset(&buffer.blocks);
        buffer.insert_bytes(offset, &clip.data);
        reseek(view, buffer, offset + clip.data.len());
    }
    view.reset_preferred_x();
}

// ---------------------------------------------------------------
// Indentation

/// Shift the selected lines (or the cursor line) by `count` indent
/// levels; negative counts unindent. One undo step. Shifting never
/// changes the line count, so lines are addressed by number.
pub fn shift_lines(view: &mut View, buffer: &mut Buffer, count: isize) {
    let (first, last) = if view.has_selection() {
        let info = view.init_selection(&buffer.blocks, &buffer.options);
        let first = buffer.blocks.line_at_offset(info.so);
        let last = buffer.blocks.line_at_offset(info.eo.saturating_sub(1).max(info.so));
        (first, last)
    } else {
        let line = buffer.blocks.line_at_offset(view.cursor.get_offset(&buffer.blocks));
        (line, line)
    };

    let indent = make_indent(buffer);
    let iw = buffer.options.indent_width as usize;
    let cursor_offset = view.cursor.get_offset(&buffer.blocks);
    let cursor_line = buffer.blocks.line_at_offset(cursor_offset);
    let mut cursor_target = cursor_offset as isize;

    buffer.begin_change_chain();
    for line_nr in first..=last {
        let mut it = BlockIter::bof();
        it.goto_line(&buffer.blocks, line_nr);
        let offset = it.get_offset(&buffer.blocks);
        let line = it.line(&buffer.blocks).to_vec();
        let delta: isize;

        if count > 0 {
            // Empty lines are not indented
            if line.is_empty() {
                continue;
            }
            let mut ins = Vec::new();
            for _ in 0..count {
                ins.extend_from_slice(&indent);
            }
            buffer.insert_bytes(offset, &ins);
            delta = ins.len() as isize;
        } else {
            // Remove up to -count levels of leading indentation
            let mut remove = 0;
            let mut levels = 0;
            while levels < -count && remove < line.len() {
                match line[remove] {
                    b'\t' => {
                        remove += 1;
                        levels += 1;
                    }
                    b' ' => {
                        let spaces = line[remove..]
                            .iter()
                            .take_while(|&&b| b == b' ')
                            .count()
                            .min(iw);
                        remove += spaces;
                        levels += 1;
                    }
                    _ => break,
                }
            }
            if remove == 0 {
                continue;
            }
            buffer.delete_bytes(offset, remove);
            delta = -(remove as isize);
        }

        if line_nr < cursor_line {
            cursor_target += delta;
        } else if line_nr == cursor_line {
            cursor_target = (cursor_target + delta).max(offset as isize);
        }
    }
    buffer.end_change_chain();

    reseek(view, buffer, cursor_target.max(0) as usize);
    view.reset_preferred_x();
    if view.has_selection() {
        view.sel_eo = None;
    }
}

// ---------------------------------------------------------------
// Case conversion and joining

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseMode {
    Lower,
    Upper,
    Toggle,
}

/// Change the case of the selection, or of the character under the
/// cursor.
pub fn change_case(view: &mut View, buffer: &mut Buffer, mode: CaseMode) {
    let (offset, len) = if view.has_selection() {
        let len = view.prepare_selection(&buffer.blocks, &buffer.options);
        view.cancel_selection();
        (view.cursor.get_offset(&buffer.blocks), len)
    } else {
        let mut it = view.cursor;
        let len = it.next_column(&buffer.blocks);
        (view.cursor.get_offset(&buffer.blocks), len)
    };
    if len == 0 {
        return;
    }

    let mut it = BlockIter::bof();
    it.goto_offset(&buffer.blocks, offset);
    let text = buffer.blocks.get_bytes(it, len);
    let src = String::from_utf8_lossy(&text);
    let mut out = String::with_capacity(src.len());
    for c in src.chars() {
        match mode {
            CaseMode::Lower => out.extend(c.to_lowercase()),
            CaseMode::Upper => out.extend(c.to_uppercase()),
            CaseMode::Toggle => {
                if c.is_uppercase() {
                    out.extend(c.to_lowercase())
                } else {
                    out.extend(c.to_uppercase())
                }
            }
        }
    }

    if out.as_bytes() != text.as_slice() {
        buffer.replace_bytes(offset, len, out.as_bytes());
    }
    reseek(view, buffer, offset + out.len());
    view.reset_preferred_x();
}

/// Join the selected lines (or the cursor line with the next),
/// collapsing the whitespace around each newline to one space.
pub fn join_lines(view: &mut View, buffer: &mut Buffer) {
    let (so, eo) = if view.has_selection() {
        let info = view.init_selection(&buffer.blocks, &buffer.options);
        (info.so, info.eo)
    } else {
        let mut it = view.cursor;
        it.bol(&buffer.blocks);
        let so = it.get_offset(&buffer.blocks);
        let mut end = it;
        end.eat_line(&buffer.blocks);
        end.eat_line(&buffer.blocks);
        (so, end.get_offset(&buffer.blocks))
    };

    buffer.begin_change_chain();
    let mut offset = so;
    let mut end = eo;
    loop {
        let bytes = {
            let mut it = BlockIter::bof();
            it.goto_offset(&buffer.blocks, offset);
            buffer.blocks.get_bytes(it, end.saturating_sub(offset))
        };
        // Find the next newline; the last one of the range joins
        // nothing
        let Some(nl) = bytes.iter().position(|&b| b == b'\n') else {
            break;
        };
        if offset + nl + 1 >= end {
            break;
        }

        // Stretch over the whitespace around the newline
        let mut start = nl;
        while start > 0 && (bytes[start - 1] == b' ' || bytes[start - 1] == b'\t') {
            start -= 1;
        }
        let mut stop = nl + 1;
        while stop < bytes.len() && (bytes[stop] == b' ' || bytes[stop] == b'\t') {
            stop += 1;
        }

        buffer.replace_bytes(offset + start, stop - start, b" ");
        end = (end as isize + 1 + start as isize - stop as isize) as usize;
        offset += start + 1;
    }
    buffer.end_change_chain();

    view.cancel_selection();
    reseek(view, buffer, so);
    view.reset_preferred_x();
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
