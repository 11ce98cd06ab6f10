//! Minimal screen writer
//!
//! Renders the visible slice of the current buffer with its syntax
//! styles plus a one-line status bar. Deliberately thin: the editor
//! core is the product, the renderer only makes it usable.

use crate::block::BlockIter;
use crate::editor::Editor;
use crate::syntax::{Style, StyleId};
use crate::unicode::{self, CodePoint};
use crate::view::display_column;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, queue, terminal};
use std::io::{self, Write};

fn apply_style(out: &mut impl Write, style: Option<&Style>) -> io::Result<()> {
    queue!(out, ResetColor, SetAttribute(Attribute::Reset))?;
    let Some(style) = style else { return Ok(()) };
    if let Some(fg) = style.fg {
        queue!(out, SetForegroundColor(fg))?;
    }
    if let Some(bg) = style.bg {
        queue!(out, SetBackgroundColor(bg))?;
    }
    if style.bold {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if style.underline {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if style.reverse {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    Ok(())
}

/// Redraw everything. Scrolls the viewport to keep the cursor
/// visible first.
pub fn draw(e: &mut Editor, width: u16, height: u16) -> io::Result<()> {
    let height = height.max(2);
    let text_rows = (height - 1) as usize;

    // Scroll to the cursor
    let (cursor_line, cursor_col) = {
        let view = e.current_view();
        let buffer = e.current_buffer();
        let offset = view.cursor.get_offset(&buffer.blocks);
        let line = buffer.blocks.line_at_offset(offset);
        let col = display_column(&buffer.blocks, &buffer.options, &view.cursor);
        (line, col)
    };
    {
        let (view, _) = e.current();
        if cursor_line < view.vy {
            view.vy = cursor_line;
        } else if cursor_line >= view.vy + text_rows {
            view.vy = cursor_line + 1 - text_rows;
        }
    }

    let vy = e.current_view().vy;
    let last = vy + text_rows - 1;
    let styles = e.highlight_lines(vy, last);

    let buffer = e.current_buffer();
    let tab_width = buffer.options.tab_width as usize;
    let mut out = io::stdout();
    queue!(out, cursor::Hide, cursor::MoveTo(0, 0))?;

    let mut it = BlockIter::bof();
    it.goto_line(&buffer.blocks, vy);
    for row in 0..text_rows {
        queue!(out, cursor::MoveTo(0, row as u16), terminal::Clear(terminal::ClearType::CurrentLine))?;
        let nr = vy + row;
        if nr >= buffer.blocks.line_count() {
            continue;
        }
        let line = it.line(&buffer.blocks).to_vec();
        it.eat_line(&buffer.blocks);
        let line_styles = styles.get(nr - vy);
        draw_line(&mut out, e, &line, line_styles.map(Vec::as_slice), tab_width, width as usize)?;
    }

    draw_status(&mut out, e, height - 1, width)?;

    let row = (cursor_line - vy) as u16;
    queue!(
        out,
        cursor::MoveTo((cursor_col.min(width as usize - 1)) as u16, row),
        cursor::Show
    )?;
    out.flush()
}

fn draw_line(
    out: &mut impl Write,
    e: &Editor,
    line: &[u8],
    styles: Option<&[StyleId]>,
    tab_width: usize,
    width: usize,
) -> io::Result<()> {
    let mut col = 0;
    let mut i = 0;
    let mut current_style: Option<StyleId> = None;
    while i < line.len() && col < width {
        let style = styles.and_then(|s| s.get(i)).copied();
        if style != current_style {
            apply_style(out, style.and_then(|id| e.syntaxes.style_for(id)))?;
            current_style = style;
        }
        let cp = unicode::get_char(line, &mut i);
        match cp {
            CodePoint::Unicode('\t') => {
                let w = unicode::tab_width_at(col, tab_width);
                queue!(out, Print(" ".repeat(w)))?;
                col += w;
            }
            CodePoint::Unicode(c) if (c as u32) < 0x20 || c == '\u{7f}' => {
                let shown = (((c as u8) + 64) & 0x7f) as char;
                queue!(out, Print(format!("^{shown}")))?;
                col += 2;
            }
            CodePoint::Unicode(c) => {
                queue!(out, Print(c))?;
                col += cp.width();
            }
            CodePoint::Invalid(b) => {
                queue!(out, Print(format!("<{b:02x}>")))?;
                col += 4;
            }
        }
    }
    apply_style(out, None)?;
    Ok(())
}

fn draw_status(out: &mut impl Write, e: &Editor, row: u16, width: u16) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, row),
        terminal::Clear(terminal::ClearType::CurrentLine),
        SetAttribute(Attribute::Reverse)
    )?;

    let text = if e.mode == "command" {
        format!(":{}", e.cmdline.buf)
    } else if e.mode == "search" {
        format!("/{}", e.cmdline.buf)
    } else if !e.err.msg.is_empty() {
        e.err.msg.clone()
    } else {
        let buffer = e.current_buffer();
        format!(
            "{}{} [{}]",
            buffer.display_name,
            if buffer.modified() { " *" } else { "" },
            buffer.encoding.name(),
        )
    };
    let mut text = text;
    text.truncate(width as usize);
    queue!(out, Print(text), SetAttribute(Attribute::Reset), ResetColor)?;
    Ok(())
}
