//! View: cursor, selection and preferred column
//!
//! A view is one presentation of a buffer: the cursor (a
//! [`BlockIter`]), the selection anchor, the display column vertical
//! motion aims for, and the viewport origin. Several views may show
//! the same buffer; each remembers its cursor offset so switching
//! buffers restores the per-view position.

use crate::block::{BlockIter, BlockList};
use crate::buffer::options::LocalOptions;
use crate::unicode::{self, CodePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionKind {
    #[default]
    None,
    Chars,
    Lines,
}

/// Normalized selection endpoints: `so <= eo`, with line selections
/// expanded to whole lines and `si` positioned at `so`.
#[derive(Debug, Clone, Copy)]
pub struct SelectionInfo {
    pub so: usize,
    pub eo: usize,
    pub si: BlockIter,
    pub swapped: bool,
}

#[derive(Debug, Clone)]
pub struct View {
    pub buffer: usize,
    pub cursor: BlockIter,
    pub selection: SelectionKind,
    /// Selection anchor as an absolute byte offset.
    pub sel_so: usize,
    /// Cached far end; `None` means "recalculate from the cursor".
    pub sel_eo: Option<usize>,
    /// Display column vertical motion restores; invalidated by any
    /// horizontal motion.
    pub preferred_x: Option<usize>,
    pub vx: usize,
    pub vy: usize,
    saved_cursor_offset: usize,
}

impl View {
    pub fn new(buffer: usize) -> Self {
        View {
            buffer,
            cursor: BlockIter::bof(),
            selection: SelectionKind::None,
            sel_so: 0,
            sel_eo: None,
            preferred_x: None,
            vx: 0,
            vy: 0,
            saved_cursor_offset: 0,
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection != SelectionKind::None
    }

    pub fn start_selection(&mut self, blocks: &BlockList, kind: SelectionKind) {
        self.selection = kind;
        self.sel_so = self.cursor.get_offset(blocks);
        self.sel_eo = None;
    }

    pub fn cancel_selection(&mut self) {
        self.selection = SelectionKind::None;
        self.sel_eo = None;
    }

    pub fn reset_preferred_x(&mut self) {
        self.preferred_x = None;
    }

    /// Stash the cursor offset before the buffer loses focus.
    pub fn save_cursor(&mut self, blocks: &BlockList) {
        self.saved_cursor_offset = self.cursor.get_offset(blocks);
    }

    /// Re-seek the stashed offset in the current block chain.
    pub fn restore_cursor(&mut self, blocks: &BlockList) {
        let offset = self.saved_cursor_offset.min(blocks.len());
        self.cursor = BlockIter::bof();
        self.cursor.goto_offset(blocks, offset);
    }

    /// Normalize the selection into ordered byte offsets. Line
    /// selections expand to whole lines including the trailing
    /// newline; char selections may take in the codepoint under the
    /// cursor.
    pub fn init_selection(&self, blocks: &BlockList, options: &LocalOptions) -> SelectionInfo {
        let mut so = self.sel_so;
        let mut eo = self
            .sel_eo
            .unwrap_or_else(|| self.cursor.get_offset(blocks));
        let mut swapped = false;
        if so > eo {
            std::mem::swap(&mut so, &mut eo);
            swapped = true;
        }

        let mut si = BlockIter::bof();
        si.goto_offset(blocks, so);

        match self.selection {
            SelectionKind::Lines => {
                so -= si.bol(blocks);
                let mut ei = BlockIter::bof();
                ei.goto_offset(blocks, eo);
                eo += ei.eat_line(blocks);
            }
            SelectionKind::Chars if options.select_cursor_char => {
                let mut ei = si;
                ei.skip_bytes(blocks, eo - so);
                eo += ei.next_column(blocks);
            }
            _ => {}
        }

        SelectionInfo { so, eo, si, swapped }
    }

    /// Move the cursor to the low end of the selection and return the
    /// selection length in bytes (the "about to delete N bytes" size).
    pub fn prepare_selection(&mut self, blocks: &BlockList, options: &LocalOptions) -> usize {
        let info = self.init_selection(blocks, options);
        self.cursor = info.si;
        info.eo - info.so
    }

    /// Display column of the cursor, computing and caching the
    /// preferred column for vertical motion.
    pub fn get_preferred_x(&mut self, blocks: &BlockList, options: &LocalOptions) -> usize {
        match self.preferred_x {
            Some(x) => x,
            None => {
                let x = display_column(blocks, options, &self.cursor);
                self.preferred_x = Some(x);
                x
            }
        }
    }
}

/// Display column of `cursor` within its line.
pub fn display_column(blocks: &BlockList, options: &LocalOptions, cursor: &BlockIter) -> usize {
    let (line, head) = cursor.this_line(blocks);
    line_width(&line[..head], options.tab_width as usize)
}

fn line_width(bytes: &[u8], tab_width: usize) -> usize {
    unicode::str_width(bytes, tab_width)
}

/// Advance `it` (at a line start) to the byte whose display column
/// range contains `target`, stopping at end of line.
pub fn move_to_column(
    blocks: &BlockList,
    options: &LocalOptions,
    it: &mut BlockIter,
    target: usize,
) {
    let tab_width = options.tab_width as usize;
    let mut col = 0;
    while col < target {
        let Some(cp) = it.get_char(blocks) else { break };
        if cp == CodePoint::Unicode('\n') {
            break;
        }
        let w = match cp {
            CodePoint::Unicode('\t') => unicode::tab_width_at(col, tab_width),
            _ => cp.width(),
        };
        if col + w > target {
            break;
        }
        it.next_column(blocks);
        col += w;
    }
}
