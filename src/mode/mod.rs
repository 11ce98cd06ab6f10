//! Modal input handling
//!
//! A mode owns a command set, a key-binding table, and an ordered
//! list of fallthrough modes consulted when a key is not handled.
//! Text-insertion may be suppressed per mode; the recursive variant
//! of the flag is inherited by fallthrough lookups so they cannot
//! inject insertions either.

use crate::bind::{Binding, BindingMap, Key, KeyCode};
use crate::change::MergeKind;
use crate::command::{run, CommandSet};
use crate::edit;
use crate::editor::Editor;
use crate::view::SelectionKind;

pub const MHF_NO_TEXT_INSERTION: u8 = 1 << 0;
pub const MHF_NO_TEXT_INSERTION_RECURSIVE: u8 = 1 << 1;

pub struct ModeHandler {
    pub name: String,
    pub cmds: &'static CommandSet,
    pub bindings: BindingMap,
    pub fallthrough: Vec<String>,
    pub flags: u8,
}

impl ModeHandler {
    pub fn new(name: &str, cmds: &'static CommandSet) -> Self {
        ModeHandler {
            name: name.to_string(),
            cmds,
            bindings: BindingMap::new(),
            fallthrough: Vec::new(),
            flags: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyCode),
    /// Bracketed paste payload.
    Paste(String),
}

/// Top-level input dispatch for the current mode.
pub fn handle_input(e: &mut Editor, event: InputEvent) -> bool {
    match event {
        InputEvent::Paste(text) => {
            insert_paste(e, &text);
            true
        }
        InputEvent::Key(key) => {
            let mode = e.mode.clone();
            handle_input_recursive(e, &mode, key, 0)
        }
    }
}

fn insert_paste(e: &mut Editor, text: &str) {
    if e.mode_uses_normal_commands(&e.mode) {
        let (view, buffer) = e.current();
        buffer.begin_change(MergeKind::None);
        edit::insert_text_with_options(view, buffer, text.as_bytes(), true);
        buffer.end_change();
        e.macro_rec.record_insert_text(text);
    } else {
        // Command line: newlines would submit, flatten them
        let flat = text.replace('\n', " ");
        e.cmdline.insert_text(&flat);
    }
}

fn handle_input_single(e: &mut Editor, mode_name: &str, key: KeyCode, inherited: u8) -> bool {
    let Some(handler) = e.modes.get(mode_name) else {
        return false;
    };
    let flags = handler.flags | inherited;
    let normal = e.mode_uses_normal_commands(mode_name);
    let insertion_allowed =
        flags & (MHF_NO_TEXT_INSERTION | MHF_NO_TEXT_INSERTION_RECURSIVE) == 0;

    if insertion_allowed {
        if normal {
            // In line selections Tab and S-Tab shift instead
            if key.key == Key::Tab && !key.ctrl && !key.meta {
                let (view, buffer) = e.current();
                if view.selection == SelectionKind::Lines {
                    let dir = if key.shift { -1 } else { 1 };
                    buffer.begin_change(MergeKind::None);
                    edit::shift_lines(view, buffer, dir);
                    buffer.end_change();
                    return true;
                }
            }
            let ch = match key.key {
                Key::Enter if !key.ctrl && !key.meta && !key.shift => Some('\n'),
                Key::Tab if !key.ctrl && !key.meta && !key.shift => Some('\t'),
                _ => key.insertable_char(),
            };
            if let Some(ch) = ch {
                let (view, buffer) = e.current();
                edit::insert_ch(view, buffer, ch);
                buffer.end_change();
                e.macro_rec.record_insert_char(ch);
                return true;
            }
        } else if let Some(ch) = key.insertable_char() {
            e.cmdline.insert_char(ch);
            return true;
        }
    }

    let Some(handler) = e.modes.get(mode_name) else {
        return false;
    };
    match handler.bindings.lookup(key) {
        Some(binding) => {
            let binding = binding.clone();
            let cmds = handler.cmds;
            execute_binding(e, cmds, binding);
            true
        }
        None => false,
    }
}

/// Recursion is bounded by the depth of the fallthrough chain.
fn handle_input_recursive(e: &mut Editor, mode_name: &str, key: KeyCode, inherited: u8) -> bool {
    if handle_input_single(e, mode_name, key, inherited) {
        return true;
    }

    let Some(handler) = e.modes.get(mode_name) else {
        return false;
    };
    let inherited = inherited | (handler.flags & MHF_NO_TEXT_INSERTION_RECURSIVE);
    let fallthrough = handler.fallthrough.clone();

    for name in fallthrough {
        if handle_input_recursive(e, &name, key, inherited) {
            return true;
        }
    }
    false
}

fn execute_binding(e: &mut Editor, cmds: &'static CommandSet, binding: Binding) {
    match binding {
        Binding::Cached(cached) => run::run_cached(e, &cached),
        Binding::Raw(text) => run::handle_command(e, cmds, &text, true),
    }
}
