//! Search and replace over the block iterator
//!
//! Searching runs the regex one line at a time directly over buffer
//! bytes. Forward search advances to the first match at or after the
//! cursor; backward search keeps the last match strictly before it.
//! The compiled regex is cached and only rebuilt when the effective
//! case sensitivity changes (AUTO: insensitive unless the pattern
//! contains an ASCII uppercase byte).

use crate::block::{BlockIter, BlockList};
use crate::buffer::options::CaseSensitivity;
use crate::buffer::Buffer;
use crate::error::{EditorError, ErrorKind};
use crate::view::View;
use regex::bytes::{Regex, RegexBuilder};

#[derive(Debug, Default)]
pub struct SearchState {
    pattern: Option<String>,
    regex: Option<Regex>,
    compiled_icase: bool,
    pub reverse: bool,
}

impl SearchState {
    pub fn new() -> Self {
        SearchState::default()
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    pub fn set_pattern(&mut self, pattern: &str) {
        self.pattern = Some(pattern.to_string());
        self.regex = None;
    }

    fn update_regex(&mut self, cs: CaseSensitivity) -> Result<&Regex, EditorError> {
        let pattern = self
            .pattern
            .as_ref()
            .expect("caller checks for a pattern");
        let icase = match cs {
            CaseSensitivity::True => false,
            CaseSensitivity::False => true,
            CaseSensitivity::Auto => !pattern.bytes().any(|b| b.is_ascii_uppercase()),
        };
        if self.regex.is_none() || self.compiled_icase != icase {
            let re = compile(pattern, icase, false)?;
            self.regex = Some(re);
            self.compiled_icase = icase;
        }
        Ok(self.regex.as_ref().expect("just set"))
    }
}

fn compile(pattern: &str, icase: bool, basic: bool) -> Result<Regex, EditorError> {
    let translated;
    let pattern = if basic {
        translated = bre_to_ere(pattern);
        translated.as_str()
    } else {
        pattern
    };
    RegexBuilder::new(pattern)
        .case_insensitive(icase)
        .unicode(false)
        .build()
        .map_err(|e| EditorError::new(ErrorKind::Regex, e.to_string()))
}

/// Approximate POSIX BRE by inverting the escaping of the ERE
/// metacharacters `(){}|+?`.
fn bre_to_ere(pattern: &str) -> String {
    let special = |c: char| matches!(c, '(' | ')' | '{' | '}' | '|' | '+' | '?');
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(e) if special(e) => out.push(e),
                Some(e) => {
                    out.push('\\');
                    out.push(e);
                }
                None => out.push('\\'),
            }
        } else if special(c) {
            out.push('\\');
            out.push(c);
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found,
    /// Found after wrapping around the buffer edge.
    FoundWrapped,
    NotFound,
    NoPattern,
}

fn line_at<'a>(blocks: &'a BlockList, it: &BlockIter) -> (&'a [u8], usize) {
    it.this_line(blocks)
}

/// Forward search from `from`. Returns the absolute offset of the
/// first match; `skip` ignores a match exactly at the start.
fn search_fwd(blocks: &BlockList, re: &Regex, from: &BlockIter, mut skip: bool) -> Option<usize> {
    let mut it = *from;
    let mut x = it.bol(blocks);
    loop {
        let (line, _) = line_at(blocks, &it);
        let line_start = it.get_offset(blocks);
        let mut pos = x;
        while pos <= line.len() {
            let Some(m) = re.find_at(line, pos) else { break };
            if skip && m.start() == x {
                // Ignore the match at the cursor; the +1 for empty
                // matches is safe because the newline byte follows
                pos = m.end().max(m.start() + 1);
                skip = false;
                continue;
            }
            return Some(line_start + m.start());
        }

        skip = false;
        x = 0;
        if it.next_line(blocks) == 0 {
            return None;
        }
    }
}

/// Backward search: the last match strictly before column `cx` of
/// the line at `from` (cx `None` = no bound, whole line counts).
fn search_bwd(
    blocks: &BlockList,
    re: &Regex,
    from: &BlockIter,
    mut cx: Option<usize>,
    skip: bool,
) -> Option<usize> {
    let mut it = *from;
    it.bol(blocks);
    loop {
        let (line, _) = line_at(blocks, &it);
        let line_start = it.get_offset(blocks);
        let mut best: Option<usize> = None;
        let mut pos = 0;
        while pos <= line.len() {
            let Some(m) = re.find_at(line, pos) else { break };
            if let Some(cx) = cx {
                if m.start() >= cx {
                    // At or after the cursor
                    break;
                }
                if skip && m.end() > cx {
                    // A word under the cursor does not count
                    break;
                }
            }
            best = Some(m.start());
            if m.end() == m.start() {
                break;
            }
            pos = m.end();
        }

        if let Some(offset) = best {
            return Some(line_start + offset);
        }
        cx = None;
        if it.prev_line(blocks) == 0 {
            return None;
        }
    }
}

fn do_search_next(
    view: &mut View,
    blocks: &BlockList,
    search: &mut SearchState,
    cs: CaseSensitivity,
    skip_cursor_word: bool,
) -> Result<SearchOutcome, EditorError> {
    if search.pattern.is_none() {
        return Ok(SearchOutcome::NoPattern);
    }
    let reverse = search.reverse;
    let re = search.update_regex(cs)?;

    let found = if !reverse {
        if let Some(offset) = search_fwd(blocks, re, &view.cursor, true) {
            Some((offset, false))
        } else {
            search_fwd(blocks, re, &BlockIter::bof(), false).map(|o| (o, true))
        }
    } else {
        let mut bi = view.cursor;
        let cursor_x = bi.bol(blocks);
        if let Some(offset) = search_bwd(blocks, re, &bi, Some(cursor_x), skip_cursor_word) {
            Some((offset, false))
        } else {
            search_bwd(blocks, re, &BlockIter::eof(blocks), None, false).map(|o| (o, true))
        }
    };

    match found {
        Some((offset, wrapped)) => {
            view.cursor.goto_offset(blocks, offset);
            view.reset_preferred_x();
            Ok(if wrapped {
                SearchOutcome::FoundWrapped
            } else {
                SearchOutcome::Found
            })
        }
        None => Ok(SearchOutcome::NotFound),
    }
}

pub fn search_next(
    view: &mut View,
    blocks: &BlockList,
    search: &mut SearchState,
    cs: CaseSensitivity,
) -> Result<SearchOutcome, EditorError> {
    do_search_next(view, blocks, search, cs, false)
}

pub fn search_prev(
    view: &mut View,
    blocks: &BlockList,
    search: &mut SearchState,
    cs: CaseSensitivity,
) -> Result<SearchOutcome, EditorError> {
    search.reverse = !search.reverse;
    let r = do_search_next(view, blocks, search, cs, false);
    search.reverse = !search.reverse;
    r
}

/// Like [`search_next`], but a match covering the cursor position
/// does not count (used by search-word commands).
pub fn search_next_word(
    view: &mut View,
    blocks: &BlockList,
    search: &mut SearchState,
    cs: CaseSensitivity,
) -> Result<SearchOutcome, EditorError> {
    do_search_next(view, blocks, search, cs, true)
}

// ---------------------------------------------------------------
// Replace

#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceFlags {
    /// Prompt y/n/a/q per match.
    pub confirm: bool,
    /// Multiple replacements per line.
    pub global: bool,
    pub ignore_case: bool,
    /// Basic POSIX regex instead of extended.
    pub basic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAnswer {
    Yes,
    No,
    All,
    Quit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceResult {
    pub substitutions: usize,
    pub lines: usize,
    pub cancelled: bool,
}

/// Expand the replacement format: `\1`..`\9` captures, `&` whole
/// match, `\\` backslash, any other `\X` is `X`.
fn build_replacement(
    line: &[u8],
    format: &[u8],
    caps: &regex::bytes::Captures,
) -> Vec<u8> {
    let mut out = Vec::with_capacity(format.len());
    let mut i = 0;
    while i < format.len() {
        let ch = format[i];
        i += 1;
        let idx = if ch == b'\\' {
            if i >= format.len() {
                break;
            }
            let e = format[i];
            i += 1;
            if !(b'1'..=b'9').contains(&e) {
                out.push(e);
                continue;
            }
            (e - b'0') as usize
        } else if ch == b'&' {
            0
        } else {
            out.push(ch);
            continue;
        };
        if let Some(m) = caps.get(idx) {
            out.extend_from_slice(&line[m.start()..m.end()]);
        }
    }
    out
}

/// Replace over the selection or the whole buffer. The confirm
/// callback is only consulted while `flags.confirm` holds; answering
/// `a` turns the rest of the pass into a change chain, and `q`
/// cancels while keeping already-applied replacements one undo step.
pub fn reg_replace(
    view: &mut View,
    buffer: &mut Buffer,
    pattern: &str,
    format: &str,
    mut flags: ReplaceFlags,
    confirm: &mut dyn FnMut() -> ConfirmAnswer,
) -> Result<ReplaceResult, EditorError> {
    if pattern.is_empty() {
        return Err(EditorError::new(
            ErrorKind::Regex,
            "Search pattern must contain at least 1 character",
        ));
    }
    let re = compile(pattern, flags.ignore_case, flags.basic)?;

    let mut swapped = false;
    let mut nr_bytes;
    let mut line_start;
    if view.has_selection() {
        let info = view.init_selection(&buffer.blocks, &buffer.options);
        view.cursor = info.si;
        view.sel_so = info.so;
        view.sel_eo = Some(info.eo);
        swapped = info.swapped;
        nr_bytes = info.eo - info.so;
        line_start = info.so;
    } else {
        nr_bytes = buffer.blocks.len();
        line_start = 0;
        view.cursor = BlockIter::bof();
    }

    // Record everything as one chain when not confirming; an `a`
    // answer opens the chain mid-pass
    let mut chain_open = false;
    if !flags.confirm {
        buffer.begin_change_chain();
        chain_open = true;
    }

    let mut result = ReplaceResult::default();
    loop {
        let mut it = BlockIter::bof();
        it.goto_offset(&buffer.blocks, line_start);
        let (line_ref, _) = it.this_line(&buffer.blocks);
        let mut line = line_ref.to_vec();
        let count = line.len();
        if line.len() > nr_bytes {
            // End of selection is not a full line
            line.truncate(nr_bytes);
        }

        let nr = replace_on_line(
            view, buffer, &re, format.as_bytes(), &line, line_start, &mut flags,
            &mut chain_open, &mut result, confirm,
        );
        if nr > 0 {
            result.substitutions += nr;
            result.lines += 1;
        }

        if result.cancelled || count + 1 >= nr_bytes {
            break;
        }
        nr_bytes -= count + 1;

        // Re-seek: the line may have changed length
        let mut it = BlockIter::bof();
        it.goto_offset(&buffer.blocks, view.cursor.get_offset(&buffer.blocks).max(line_start));
        if it.eat_line(&buffer.blocks) == 0 {
            break;
        }
        line_start = it.get_offset(&buffer.blocks);
    }

    if chain_open {
        buffer.end_change_chain();
    }

    if view.has_selection() {
        // Undo what init_selection did
        if let Some(eo) = view.sel_eo.as_mut() {
            *eo = eo.saturating_sub(1);
        }
        if swapped {
            let eo = view.sel_eo.unwrap_or(view.sel_so);
            view.sel_eo = Some(view.sel_so);
            view.sel_so = eo;
        }
        let target = view.sel_eo.unwrap_or(view.sel_so);
        view.cursor = BlockIter::bof();
        view.cursor
            .goto_offset(&buffer.blocks, target.min(buffer.blocks.len()));
        view.sel_eo = None;
    }

    Ok(result)
}

#[allow(clippy::too_many_arguments)]
fn replace_on_line(
    view: &mut View,
    buffer: &mut Buffer,
    re: &Regex,
    format: &[u8],
    line: &[u8],
    line_start: usize,
    flags: &mut ReplaceFlags,
    chain_open: &mut bool,
    result: &mut ReplaceResult,
    confirm: &mut dyn FnMut() -> ConfirmAnswer,
) -> usize {
    let mut nr = 0;
    let mut pos = 0;
    // Replacements change byte counts; `drift` maps old-line offsets
    // to current buffer offsets
    let mut drift = 0isize;

    while pos <= line.len() {
        let Some(caps) = re.captures_at(line, pos) else { break };
        let m = caps.get(0).expect("capture 0 is the whole match");
        let match_len = m.end() - m.start();
        let match_abs = (line_start + m.start()) as isize + drift;

        // Move the cursor to the text about to be replaced
        view.cursor = BlockIter::bof();
        view.cursor.goto_offset(&buffer.blocks, match_abs as usize);

        let mut skip = false;
        if flags.confirm {
            match confirm() {
                ConfirmAnswer::Yes => {}
                ConfirmAnswer::No => skip = true,
                ConfirmAnswer::All => {
                    flags.confirm = false;
                    // Record the rest of the changes as one chain
                    buffer.begin_change_chain();
                    *chain_open = true;
                }
                ConfirmAnswer::Quit => {
                    result.cancelled = true;
                    return nr;
                }
            }
        }

        if skip {
            view.cursor.skip_bytes(&buffer.blocks, match_len);
        } else {
            let replacement = build_replacement(line, format, &caps);
            buffer.replace_bytes(match_abs as usize, match_len, &replacement);
            nr += 1;

            if view.has_selection() {
                if let Some(eo) = view.sel_eo.as_mut() {
                    *eo += replacement.len();
                    *eo -= match_len;
                }
            }

            view.cursor = BlockIter::bof();
            view.cursor
                .goto_offset(&buffer.blocks, match_abs as usize + replacement.len());
            drift += replacement.len() as isize - match_len as isize;
        }

        if match_len == 0 {
            break;
        }
        if !flags.global {
            break;
        }
        pos = m.end();
    }

    nr
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
