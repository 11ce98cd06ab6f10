//! The editor state
//!
//! One value owns everything: buffers and their views, global
//! options, the syntax set, aliases, modes, the command line, search
//! state, macro recorder, clipboard, bookmarks and compilers. It is
//! threaded explicitly through command handlers; there are no
//! globals.

use crate::buffer::options::{GlobalOptions, LocalOptions};
use crate::buffer::Buffer;
use crate::cmdline::CommandLine;
use crate::command::alias::AliasSet;
use crate::command::env::EnvSnapshot;
use crate::command::macros::MacroRecorder;
use crate::command::run;
use crate::commands::{
    CMDLINE_COMMANDS, COMMAND_MODE_COMMANDS, NORMAL_COMMANDS, SEARCH_MODE_COMMANDS,
};
use crate::compiler::{CompilerSet, Message};
use crate::edit::Clipboard;
use crate::error::ErrorBuffer;
use crate::file;
use crate::mode::ModeHandler;
use crate::search::SearchState;
use crate::syntax::loader::SyntaxLoader;
use crate::syntax::{highlight, StyleId, SyntaxSet};
use crate::view::View;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    Running,
    Quit(i32),
}

/// A position pushed by jump commands, popped to return.
#[derive(Debug, Clone)]
pub struct FileLocation {
    pub path: Option<PathBuf>,
    pub offset: usize,
}

pub struct Editor {
    pub buffers: Vec<Buffer>,
    pub views: Vec<View>,
    pub view_idx: usize,
    pub options: GlobalOptions,
    pub default_local_options: LocalOptions,
    pub syntaxes: SyntaxSet,
    pub aliases: AliasSet,
    pub modes: HashMap<String, ModeHandler>,
    pub mode: String,
    /// Mode to return to when the command line closes.
    pub prev_mode: String,
    pub cmdline: CommandLine,
    pub search: SearchState,
    pub err: ErrorBuffer,
    pub macro_rec: MacroRecorder,
    pub clipboard: Clipboard,
    pub bookmarks: Vec<FileLocation>,
    pub compilers: CompilerSet,
    pub messages: Vec<Message>,
    pub syntax_loader: Option<SyntaxLoader>,
    pub recursion_count: u32,
    pub home_dir: String,
    pub status: EditorStatus,
    /// True when a real terminal drives the editor (prompts allowed).
    pub interactive: bool,
    /// Scripted answers for the next replace confirmation prompts.
    pub pending_confirm_answers: Vec<crate::search::ConfirmAnswer>,
}

impl Editor {
    pub fn new() -> Self {
        let mut modes = HashMap::new();
        modes.insert(
            "normal".to_string(),
            ModeHandler::new("normal", &NORMAL_COMMANDS),
        );
        let mut command = ModeHandler::new("command", &COMMAND_MODE_COMMANDS);
        command.fallthrough.push("cmdline".to_string());
        modes.insert("command".to_string(), command);
        let mut search = ModeHandler::new("search", &SEARCH_MODE_COMMANDS);
        search.fallthrough.push("cmdline".to_string());
        modes.insert("search".to_string(), search);
        modes.insert(
            "cmdline".to_string(),
            ModeHandler::new("cmdline", &CMDLINE_COMMANDS),
        );

        let home_dir = std::env::var("VELLUM_HOME").unwrap_or_else(|_| {
            std::env::var("HOME")
                .map(|h| format!("{h}/.vellum"))
                .unwrap_or_else(|_| String::from(".vellum"))
        });

        Editor {
            buffers: vec![Buffer::new()],
            views: vec![View::new(0)],
            view_idx: 0,
            options: GlobalOptions::default(),
            default_local_options: LocalOptions::default(),
            syntaxes: SyntaxSet::new(),
            aliases: AliasSet::new(),
            modes,
            mode: String::from("normal"),
            prev_mode: String::from("normal"),
            cmdline: CommandLine::new(),
            search: SearchState::new(),
            err: ErrorBuffer::new(),
            macro_rec: MacroRecorder::new(),
            clipboard: Clipboard::new(),
            bookmarks: Vec::new(),
            compilers: CompilerSet::new(),
            messages: Vec::new(),
            syntax_loader: None,
            recursion_count: 0,
            home_dir,
            status: EditorStatus::Running,
            interactive: false,
            pending_confirm_answers: Vec::new(),
        }
    }

    /// A fully configured editor: built-in configs executed.
    pub fn with_defaults() -> Self {
        let mut e = Editor::new();
        crate::config::load_builtin_configs(&mut e);
        e
    }

    pub fn current(&mut self) -> (&mut View, &mut Buffer) {
        let view = &mut self.views[self.view_idx];
        let buffer = &mut self.buffers[view.buffer];
        (view, buffer)
    }

    pub fn current_view(&self) -> &View {
        &self.views[self.view_idx]
    }

    pub fn current_buffer(&self) -> &Buffer {
        &self.buffers[self.current_view().buffer]
    }

    pub fn current_buffer_mut(&mut self) -> &mut Buffer {
        let idx = self.views[self.view_idx].buffer;
        &mut self.buffers[idx]
    }

    pub fn mode_uses_normal_commands(&self, mode_name: &str) -> bool {
        self.modes
            .get(mode_name)
            .map_or(false, |m| std::ptr::eq(m.cmds, &NORMAL_COMMANDS))
    }

    /// Run a command string with the normal command set.
    pub fn handle_command(&mut self, text: &str, allow_recording: bool) {
        run::handle_command(self, &NORMAL_COMMANDS, text, allow_recording);
    }

    /// The word under (or just before) the cursor.
    pub fn word_under_cursor(&self) -> Option<String> {
        let view = self.current_view();
        let buffer = self.current_buffer();
        let (line, x) = view.cursor.this_line(&buffer.blocks);
        let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80;

        let mut start = x.min(line.len());
        if start == line.len() || !is_word(line[start]) {
            if start == 0 || !is_word(line[start - 1]) {
                return None;
            }
            start -= 1;
        }
        while start > 0 && is_word(line[start - 1]) {
            start -= 1;
        }
        let mut end = start;
        while end < line.len() && is_word(line[end]) {
            end += 1;
        }
        Some(String::from_utf8_lossy(&line[start..end]).into_owned())
    }

    pub fn env_snapshot(&self) -> EnvSnapshot {
        let buffer = self.current_buffer();
        let view = self.current_view();
        let lineno = buffer
            .blocks
            .line_at_offset(view.cursor.get_offset(&buffer.blocks))
            + 1;
        EnvSnapshot {
            home: self.home_dir.clone(),
            file: buffer
                .path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned()),
            filetype: buffer.options.filetype.clone(),
            lineno,
            word: self.word_under_cursor(),
        }
    }

    /// Switch the current view to another buffer, saving and
    /// restoring per-view cursors.
    pub fn switch_to_buffer(&mut self, idx: usize) {
        debug_assert!(idx < self.buffers.len());
        let (view, buffer) = self.current();
        view.save_cursor(&buffer.blocks);
        if let Some(view) = self.views.iter().position(|v| v.buffer == idx) {
            self.view_idx = view;
        } else {
            self.views.push(View::new(idx));
            self.view_idx = self.views.len() - 1;
        }
        let (view, buffer) = self.current();
        view.restore_cursor(&buffer.blocks);
        buffer.mark_everything_changed();
    }

    /// Open a file, reusing a buffer that already has it.
    pub fn open_file(&mut self, path: &Path) -> bool {
        if let Some(idx) = self
            .buffers
            .iter()
            .position(|b| b.path.as_deref() == Some(path))
        {
            self.switch_to_buffer(idx);
            return true;
        }

        match file::load_buffer(path) {
            Ok(mut buffer) => {
                buffer.options = LocalOptions {
                    filetype: buffer.options.filetype.clone(),
                    ..self.default_local_options.clone()
                };
                self.buffers.push(buffer);
                let idx = self.buffers.len() - 1;
                self.switch_to_buffer(idx);
                self.sync_syntax();
                true
            }
            Err(err) => self.err.report(&err),
        }
    }

    /// Drop the current buffer; the editor always keeps at least one.
    pub fn close_current_buffer(&mut self) {
        let idx = self.views[self.view_idx].buffer;
        self.buffers.remove(idx);
        self.views.retain(|v| v.buffer != idx);
        for v in &mut self.views {
            if v.buffer > idx {
                v.buffer -= 1;
            }
        }
        if self.buffers.is_empty() {
            self.buffers.push(Buffer::new());
        }
        if self.views.is_empty() {
            self.views.push(View::new(0));
        }
        self.view_idx = self.view_idx.min(self.views.len() - 1);
        self.current_buffer_mut().mark_everything_changed();
    }

    /// Attach the buffer's filetype to a loaded syntax and re-seed
    /// the per-line state cache.
    pub fn sync_syntax(&mut self) {
        let buffer = self.current_buffer();
        let want = (buffer.options.syntax && buffer.options.filetype != "none")
            .then(|| buffer.options.filetype.clone())
            .filter(|ft| self.syntaxes.find(ft).is_some());

        let start = want
            .as_ref()
            .and_then(|name| self.syntaxes.find(name))
            .map(|syn| syn.start);
        let buffer = self.current_buffer_mut();
        if buffer.syntax_name != want {
            buffer.syntax_name = want;
            buffer.reset_syntax_cache(start);
        }
    }

    /// Per-line styles for the inclusive line range, driving the
    /// renderer. Lines without syntax get empty style runs.
    pub fn highlight_lines(&mut self, first: usize, last: usize) -> Vec<Vec<StyleId>> {
        let buffer_idx = self.views[self.view_idx].buffer;
        let buffer = &mut self.buffers[buffer_idx];
        let Some(syntax_name) = buffer.syntax_name.clone() else {
            return Vec::new();
        };
        let last = last.min(buffer.blocks.line_count().saturating_sub(1));
        if first > last {
            return Vec::new();
        }

        highlight::hl_fill_start_states(
            &mut self.syntaxes,
            &syntax_name,
            &mut buffer.line_start_states,
            &buffer.blocks,
            last,
        );

        let mut out = Vec::with_capacity(last + 1 - first);
        let mut it = crate::block::BlockIter::bof();
        it.goto_line(&buffer.blocks, first);
        for nr in first..=last {
            let line = it.line_with_nl(&buffer.blocks).to_vec();
            let (styles, _) = highlight::hl_line(
                &mut self.syntaxes,
                &syntax_name,
                &mut buffer.line_start_states,
                &line,
                nr,
            );
            out.push(styles);
            it.eat_line(&buffer.blocks);
        }
        out
    }

    pub fn enter_mode(&mut self, name: &str) {
        if self.mode != name {
            self.prev_mode = self.mode.clone();
            self.mode = name.to_string();
        }
    }

    pub fn leave_cmdline_mode(&mut self) {
        self.cmdline.clear();
        self.mode = String::from("normal");
    }

    pub fn push_bookmark(&mut self) {
        let buffer = self.current_buffer();
        let view = self.current_view();
        self.bookmarks.push(FileLocation {
            path: buffer.path.clone(),
            offset: view.cursor.get_offset(&buffer.blocks),
        });
    }

    pub fn pop_bookmark(&mut self) -> bool {
        let Some(loc) = self.bookmarks.pop() else {
            return self.err.error_msg("No bookmarks");
        };
        if let Some(path) = &loc.path {
            let path = path.clone();
            if self.current_buffer().path.as_deref() != Some(path.as_path())
                && !self.open_file(&path)
            {
                return false;
            }
        }
        let (view, buffer) = self.current();
        view.cursor = crate::block::BlockIter::bof();
        view.cursor
            .goto_offset(&buffer.blocks, loc.offset.min(buffer.blocks.len()));
        view.reset_preferred_x();
        true
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
