//! The editor command tables
//!
//! Every scriptable operation is a command: key bindings, config
//! files, the command line and macros all execute entries from these
//! tables. The tables are sorted by name for binary-search lookup.

use crate::bind::parse_key;
use crate::block::BlockIter;
use crate::buffer::options::{get_option, set_option, OPTION_NAMES};
use crate::buffer::Buffer;
use crate::command::args::CommandArgs;
use crate::command::cache::cached_command_new;
use crate::command::env::child_env;
use crate::command::{Command, CommandSet};
use crate::compiler::parse_error_format;
use crate::edit::{self, CaseMode};
use crate::editor::{Editor, EditorStatus};
use crate::search::{
    reg_replace, search_next, search_next_word, search_prev, ConfirmAnswer, ReplaceFlags,
    SearchOutcome,
};
use crate::spawn::{spawn, SpawnAction, SpawnRequest};
use crate::syntax::loader::SyntaxLoader;
use crate::syntax::Style;
use crate::view::SelectionKind;
use crossterm::style::Color;
use std::path::{Path, PathBuf};

pub static NORMAL_COMMANDS: CommandSet = CommandSet {
    commands: &[
        Command { name: "alias", flags: "", min_args: 1, max_args: 2, handler: cmd_alias },
        Command { name: "bind", flags: "T=", min_args: 1, max_args: 2, handler: cmd_bind },
        Command { name: "bof", flags: "", min_args: 0, max_args: 0, handler: cmd_bof },
        Command { name: "bol", flags: "", min_args: 0, max_args: 0, handler: cmd_bol },
        Command { name: "bookmark", flags: "p", min_args: 0, max_args: 0, handler: cmd_bookmark },
        Command { name: "bufis", flags: "i", min_args: 2, max_args: 3, handler: cmd_bufis },
        Command { name: "case", flags: "lut", min_args: 0, max_args: 0, handler: cmd_case },
        Command { name: "char", flags: "bn", min_args: 2, max_args: 3, handler: cmd_char },
        Command { name: "close", flags: "f", min_args: 0, max_args: 0, handler: cmd_close },
        Command { name: "command", flags: "", min_args: 0, max_args: 1, handler: cmd_command },
        Command { name: "compile", flags: "-", min_args: 2, max_args: usize::MAX, handler: cmd_compile },
        Command { name: "copy", flags: "", min_args: 0, max_args: 0, handler: cmd_copy },
        Command { name: "cut", flags: "", min_args: 0, max_args: 0, handler: cmd_cut },
        Command { name: "default", flags: "", min_args: 2, max_args: usize::MAX, handler: cmd_default },
        Command { name: "delete", flags: "", min_args: 0, max_args: 0, handler: cmd_delete },
        Command { name: "delete-eol", flags: "", min_args: 0, max_args: 0, handler: cmd_delete_eol },
        Command { name: "delete-line", flags: "", min_args: 0, max_args: 0, handler: cmd_delete_line },
        Command { name: "delete-word", flags: "", min_args: 0, max_args: 0, handler: cmd_delete_word },
        Command { name: "down", flags: "", min_args: 0, max_args: 0, handler: cmd_down },
        Command { name: "eat", flags: "", min_args: 1, max_args: 2, handler: cmd_eat },
        Command { name: "eof", flags: "", min_args: 0, max_args: 0, handler: cmd_eof },
        Command { name: "eol", flags: "", min_args: 0, max_args: 0, handler: cmd_eol },
        Command { name: "erase", flags: "", min_args: 0, max_args: 0, handler: cmd_erase },
        Command { name: "erase-word", flags: "", min_args: 0, max_args: 0, handler: cmd_erase_word },
        Command { name: "errorfmt", flags: "i", min_args: 2, max_args: usize::MAX, handler: cmd_errorfmt },
        Command { name: "heredocbegin", flags: "", min_args: 2, max_args: 2, handler: cmd_heredocbegin },
        Command { name: "heredocend", flags: "", min_args: 1, max_args: 2, handler: cmd_heredocend },
        Command { name: "hi", flags: "", min_args: 1, max_args: usize::MAX, handler: cmd_hi },
        Command { name: "include", flags: "b", min_args: 1, max_args: 1, handler: cmd_include },
        Command { name: "inlist", flags: "b", min_args: 2, max_args: 3, handler: cmd_inlist },
        Command { name: "insert", flags: "km", min_args: 1, max_args: 1, handler: cmd_insert },
        Command { name: "join", flags: "", min_args: 0, max_args: 0, handler: cmd_join },
        Command { name: "left", flags: "", min_args: 0, max_args: 0, handler: cmd_left },
        Command { name: "line", flags: "", min_args: 1, max_args: 1, handler: cmd_line },
        Command { name: "list", flags: "i", min_args: 2, max_args: usize::MAX, handler: cmd_list },
        Command { name: "macro", flags: "", min_args: 1, max_args: 1, handler: cmd_macro },
        Command { name: "new-line", flags: "", min_args: 0, max_args: 0, handler: cmd_new_line },
        Command { name: "noeat", flags: "b", min_args: 1, max_args: 1, handler: cmd_noeat },
        Command { name: "open", flags: "", min_args: 0, max_args: usize::MAX, handler: cmd_open },
        Command { name: "paste", flags: "", min_args: 0, max_args: 0, handler: cmd_paste },
        Command { name: "pgdown", flags: "", min_args: 0, max_args: 0, handler: cmd_pgdown },
        Command { name: "pgup", flags: "", min_args: 0, max_args: 0, handler: cmd_pgup },
        Command { name: "quit", flags: "f", min_args: 0, max_args: 1, handler: cmd_quit },
        Command { name: "recolor", flags: "", min_args: 1, max_args: 2, handler: cmd_recolor },
        Command { name: "redo", flags: "", min_args: 0, max_args: 1, handler: cmd_redo },
        Command { name: "replace", flags: "bcgi", min_args: 2, max_args: 2, handler: cmd_replace },
        Command { name: "right", flags: "", min_args: 0, max_args: 0, handler: cmd_right },
        Command { name: "run", flags: "-s", min_args: 1, max_args: usize::MAX, handler: cmd_run },
        Command { name: "save", flags: "dfu", min_args: 0, max_args: 1, handler: cmd_save },
        Command { name: "search", flags: "npruw", min_args: 0, max_args: 1, handler: cmd_search },
        Command { name: "select", flags: "l", min_args: 0, max_args: 0, handler: cmd_select },
        Command { name: "set", flags: "gl", min_args: 2, max_args: usize::MAX, handler: cmd_set },
        Command { name: "shift", flags: "", min_args: 1, max_args: 1, handler: cmd_shift },
        Command { name: "show", flags: "", min_args: 1, max_args: 2, handler: cmd_show },
        Command { name: "state", flags: "", min_args: 1, max_args: 2, handler: cmd_state },
        Command { name: "str", flags: "i", min_args: 2, max_args: 3, handler: cmd_str },
        Command { name: "syntax", flags: "", min_args: 1, max_args: 1, handler: cmd_syntax },
        Command { name: "unbind", flags: "T=", min_args: 1, max_args: 1, handler: cmd_unbind },
        Command { name: "undo", flags: "", min_args: 0, max_args: 0, handler: cmd_undo },
        Command { name: "unselect", flags: "", min_args: 0, max_args: 0, handler: cmd_unselect },
        Command { name: "up", flags: "", min_args: 0, max_args: 0, handler: cmd_up },
        Command { name: "word-bwd", flags: "", min_args: 0, max_args: 0, handler: cmd_word_bwd },
        Command { name: "word-fwd", flags: "", min_args: 0, max_args: 0, handler: cmd_word_fwd },
    ],
};

pub static COMMAND_MODE_COMMANDS: CommandSet = CommandSet {
    commands: &[
        Command { name: "command-accept", flags: "", min_args: 0, max_args: 0, handler: cmd_command_accept },
        Command { name: "command-cancel", flags: "", min_args: 0, max_args: 0, handler: cmd_command_cancel },
    ],
};

pub static SEARCH_MODE_COMMANDS: CommandSet = CommandSet {
    commands: &[
        Command { name: "search-accept", flags: "", min_args: 0, max_args: 0, handler: cmd_search_accept },
        Command { name: "search-cancel", flags: "", min_args: 0, max_args: 0, handler: cmd_search_cancel },
    ],
};

pub static CMDLINE_COMMANDS: CommandSet = CommandSet {
    commands: &[
        Command { name: "cmdline-bol", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_bol },
        Command { name: "cmdline-delete", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_delete },
        Command { name: "cmdline-delete-eol", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_delete_eol },
        Command { name: "cmdline-eol", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_eol },
        Command { name: "cmdline-erase", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_erase },
        Command { name: "cmdline-erase-bol", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_erase_bol },
        Command { name: "cmdline-erase-word", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_erase_word },
        Command { name: "cmdline-left", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_left },
        Command { name: "cmdline-right", flags: "", min_args: 0, max_args: 0, handler: cmd_cmdline_right },
    ],
};

// ---------------------------------------------------------------
// Aliases, bindings, options

fn cmd_alias(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let name = &args[0];
    match args.get(1) {
        Some(value) => match e.aliases.add(name, value) {
            Ok(()) => true,
            Err(msg) => e.err.error_msg(msg),
        },
        None => match e.aliases.find(name) {
            Some(value) => {
                let value = value.to_string();
                e.err.info_msg(format!("alias {name} {value}"));
                true
            }
            None => e.err.error_msg(format!("No such alias: {name}")),
        },
    }
}

fn cmd_bind(e: &mut Editor, a: &CommandArgs) -> bool {
    let mode_name = a.flag_arg(b'T').unwrap_or("normal").to_string();
    let args = a.positional();
    let Some(key) = parse_key(&args[0]) else {
        return e.err.error_msg(format!("Invalid key string: {}", args[0]));
    };

    let Some(mode) = e.modes.get(&mode_name) else {
        return e.err.error_msg(format!("No such mode: {mode_name}"));
    };

    match args.get(1) {
        Some(command) => {
            let binding = cached_command_new(mode.cmds, command);
            let mode = e.modes.get_mut(&mode_name).expect("checked above");
            mode.bindings.insert(key, binding);
            true
        }
        None => match mode.bindings.lookup(key) {
            Some(binding) => {
                let text = binding.text().to_string();
                e.err.info_msg(text);
                true
            }
            None => e.err.error_msg(format!("{} is not bound", args[0])),
        },
    }
}

fn cmd_unbind(e: &mut Editor, a: &CommandArgs) -> bool {
    let mode_name = a.flag_arg(b'T').unwrap_or("normal").to_string();
    let args = a.positional();
    let Some(key) = parse_key(&args[0]) else {
        return e.err.error_msg(format!("Invalid key string: {}", args[0]));
    };
    match e.modes.get_mut(&mode_name) {
        Some(mode) => {
            mode.bindings.remove(key);
            true
        }
        None => e.err.error_msg(format!("No such mode: {mode_name}")),
    }
}

fn cmd_set(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    if args.len() % 2 != 0 {
        return e
            .err
            .error_msg("set requires option/value pairs");
    }
    let global = a.has_flag(b'g');
    let local = a.has_flag(b'l');

    let mut ok = true;
    for pair in args.chunks(2) {
        let (name, value) = (&pair[0], &pair[1]);
        let buffer_idx = e.views[e.view_idx].buffer;
        let result = if global && !local {
            set_option(None, Some(&mut e.options), name, value)
        } else if local && !global {
            set_option(Some(&mut e.buffers[buffer_idx].options), None, name, value)
        } else {
            // Unscoped: buffer-local options also update the default
            // for future buffers
            let r = set_option(
                Some(&mut e.buffers[buffer_idx].options),
                Some(&mut e.options),
                name,
                value,
            );
            if r.is_ok() {
                let _ = set_option(Some(&mut e.default_local_options), None, name, value);
            }
            r
        };
        if let Err(msg) = result {
            ok = e.err.error_msg(msg);
        }
    }

    e.sync_syntax();
    e.current_buffer_mut().mark_everything_changed();
    ok
}

// ---------------------------------------------------------------
// Files and buffers

fn cmd_open(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    if args.is_empty() {
        e.buffers.push(Buffer::new());
        let idx = e.buffers.len() - 1;
        e.switch_to_buffer(idx);
        return true;
    }
    let mut ok = true;
    for path in args {
        ok &= e.open_file(Path::new(path));
    }
    ok
}

fn cmd_save(e: &mut Editor, a: &CommandArgs) -> bool {
    if a.has_flag(b'd') && a.has_flag(b'u') {
        return e.err.error_msg("Flags -d and -u can't be used together");
    }
    let crlf = if a.has_flag(b'd') {
        Some(true)
    } else if a.has_flag(b'u') {
        Some(false)
    } else {
        None
    };

    let args = a.positional();
    let path: Option<PathBuf> = args
        .first()
        .map(PathBuf::from)
        .or_else(|| e.current_buffer().path.clone());
    let Some(path) = path else {
        return e.err.error_msg("No filename");
    };

    let opts = crate::file::SaveOptions { crlf, fsync: a.has_flag(b'f') };
    let result = crate::file::save_buffer(e.current_buffer_mut(), &path, opts);
    match result {
        Ok(()) => {
            // A first save can settle the filetype
            if e.current_buffer().options.filetype == "none" {
                let first: Vec<u8> = {
                    let buffer = e.current_buffer();
                    let mut it = BlockIter::bof();
                    it.line(&buffer.blocks).to_vec()
                };
                if let Some(ft) = crate::file::detect_filetype(Some(&path), &first) {
                    e.current_buffer_mut().options.filetype = ft.to_string();
                    e.sync_syntax();
                }
            }
            e.err.info_msg(format!("Saved {}", path.display()));
            true
        }
        Err(err) => e.err.report(&err),
    }
}

fn cmd_close(e: &mut Editor, a: &CommandArgs) -> bool {
    if e.current_buffer().modified() && !a.has_flag(b'f') {
        return e
            .err
            .error_msg("The buffer is modified; save or run 'close -f'");
    }
    e.close_current_buffer();
    true
}

fn cmd_quit(e: &mut Editor, a: &CommandArgs) -> bool {
    let code = match a.positional().first() {
        Some(arg) => match arg.parse::<i32>() {
            Ok(n) if (0..=255).contains(&n) => n,
            _ => return e.err.error_msg(format!("Invalid exit code: {arg}")),
        },
        None => 0,
    };
    if !a.has_flag(b'f') && e.buffers.iter().any(Buffer::modified) {
        return e
            .err
            .error_msg("Modified buffers exist; save or run 'quit -f'");
    }
    e.status = EditorStatus::Quit(code);
    true
}

// ---------------------------------------------------------------
// Editing

fn cmd_insert(e: &mut Editor, a: &CommandArgs) -> bool {
    let text = a.positional()[0].clone();
    let (view, buffer) = e.current();
    if a.has_flag(b'k') {
        for ch in text.chars() {
            edit::insert_ch(view, buffer, ch);
            buffer.end_change();
        }
    } else {
        edit::insert_text_with_options(view, buffer, text.as_bytes(), a.has_flag(b'm'));
    }
    true
}

fn cmd_delete(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::delete_ch(view, buffer);
    true
}

fn cmd_erase(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::erase_ch(view, buffer);
    true
}

fn cmd_delete_eol(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::delete_eol(view, buffer);
    true
}

fn cmd_delete_line(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::delete_lines(view, buffer);
    true
}

fn cmd_delete_word(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::delete_word(view, buffer);
    true
}

fn cmd_erase_word(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::erase_word(view, buffer);
    true
}

fn cmd_new_line(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_eol(view, buffer);
    edit::insert_ch(view, buffer, '\n');
    true
}

fn cmd_join(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::join_lines(view, buffer);
    true
}

fn cmd_case(e: &mut Editor, a: &CommandArgs) -> bool {
    let mode = if a.has_flag(b'l') {
        CaseMode::Lower
    } else if a.has_flag(b'u') {
        CaseMode::Upper
    } else {
        CaseMode::Toggle
    };
    let (view, buffer) = e.current();
    edit::change_case(view, buffer, mode);
    true
}

fn cmd_shift(e: &mut Editor, a: &CommandArgs) -> bool {
    let arg = &a.positional()[0];
    let count: isize = match arg.parse() {
        Ok(0) | Err(_) => return e.err.error_msg(format!("Invalid number: {arg}")),
        Ok(n) => n,
    };
    let (view, buffer) = e.current();
    edit::shift_lines(view, buffer, count);
    true
}

fn cmd_copy(e: &mut Editor, _a: &CommandArgs) -> bool {
    let mut clip = std::mem::take(&mut e.clipboard);
    let (view, buffer) = e.current();
    edit::copy(view, buffer, &mut clip, false);
    e.clipboard = clip;
    true
}

fn cmd_cut(e: &mut Editor, _a: &CommandArgs) -> bool {
    let mut clip = std::mem::take(&mut e.clipboard);
    let (view, buffer) = e.current();
    edit::copy(view, buffer, &mut clip, true);
    e.clipboard = clip;
    true
}

fn cmd_paste(e: &mut Editor, _a: &CommandArgs) -> bool {
    let clip = std::mem::take(&mut e.clipboard);
    let (view, buffer) = e.current();
    edit::paste(view, buffer, &clip);
    e.clipboard = clip;
    true
}

fn cmd_undo(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    match buffer.undo() {
        Some(offset) => {
            view.cursor = BlockIter::bof();
            view.cursor.goto_offset(&buffer.blocks, offset);
            view.cancel_selection();
            view.reset_preferred_x();
            true
        }
        None => {
            e.err.info_msg("Nothing to undo");
            true
        }
    }
}

fn cmd_redo(e: &mut Editor, a: &CommandArgs) -> bool {
    let id = match a.positional().first() {
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) if n > 0 => Some(n),
            _ => return e.err.error_msg(format!("Invalid change id: {arg}")),
        },
        None => None,
    };
    let (view, buffer) = e.current();
    match buffer.redo(id) {
        Ok(offset) => {
            view.cursor = BlockIter::bof();
            view.cursor.goto_offset(&buffer.blocks, offset);
            view.cancel_selection();
            view.reset_preferred_x();
            true
        }
        Err(crate::change::RedoError::NothingToRedo) => {
            e.err.info_msg("Nothing to redo");
            true
        }
        Err(crate::change::RedoError::NoSuchBranch { id, count }) => e.err.error_msg(format!(
            "There are only {count} branches; {id} is not valid"
        )),
    }
}

// ---------------------------------------------------------------
// Motion and selection

fn cmd_left(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_left(view, buffer, 1);
    true
}

fn cmd_right(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_right(view, buffer, 1);
    true
}

fn cmd_up(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_up(view, buffer, 1);
    true
}

fn cmd_down(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_down(view, buffer, 1);
    true
}

fn cmd_pgup(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_up(view, buffer, 24);
    true
}

fn cmd_pgdown(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_down(view, buffer, 24);
    true
}

fn cmd_bol(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_bol(view, buffer);
    true
}

fn cmd_eol(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_eol(view, buffer);
    true
}

fn cmd_bof(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_bof(view, buffer);
    true
}

fn cmd_eof(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::move_eof(view, buffer);
    true
}

fn cmd_line(e: &mut Editor, a: &CommandArgs) -> bool {
    let arg = &a.positional()[0];
    let line: usize = match arg.parse() {
        Ok(n) if n > 0 => n,
        _ => return e.err.error_msg(format!("Invalid line number: {arg}")),
    };
    let (view, buffer) = e.current();
    edit::move_to_line(view, buffer, line);
    true
}

fn cmd_word_fwd(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::word_fwd(view, buffer, true);
    true
}

fn cmd_word_bwd(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, buffer) = e.current();
    edit::word_bwd(view, buffer, true);
    true
}

fn cmd_select(e: &mut Editor, a: &CommandArgs) -> bool {
    let kind = if a.has_flag(b'l') {
        SelectionKind::Lines
    } else {
        SelectionKind::Chars
    };
    let (view, buffer) = e.current();
    view.start_selection(&buffer.blocks, kind);
    true
}

fn cmd_unselect(e: &mut Editor, _a: &CommandArgs) -> bool {
    let (view, _) = e.current();
    view.cancel_selection();
    true
}

fn cmd_bookmark(e: &mut Editor, a: &CommandArgs) -> bool {
    if a.has_flag(b'p') {
        e.pop_bookmark()
    } else {
        e.push_bookmark();
        true
    }
}

// ---------------------------------------------------------------
// Search and replace

fn search_msg(e: &mut Editor, outcome: SearchOutcome) -> bool {
    match outcome {
        SearchOutcome::Found => true,
        SearchOutcome::FoundWrapped => {
            let msg = if e.search.reverse {
                "Continuing at bottom"
            } else {
                "Continuing at top"
            };
            e.err.info_msg(msg);
            true
        }
        SearchOutcome::NotFound => {
            let pattern = e.search.pattern().unwrap_or_default().to_string();
            e.err.error_msg(format!("Pattern '{pattern}' not found"))
        }
        SearchOutcome::NoPattern => e.err.error_msg("No previous search pattern"),
    }
}

fn cmd_search(e: &mut Editor, a: &CommandArgs) -> bool {
    let cs = e.options.case_sensitive_search;
    let args = a.positional();

    if a.has_flag(b'w') {
        let Some(word) = e.word_under_cursor() else {
            return e.err.error_msg("No word under cursor");
        };
        let pattern = format!(r"\b{}\b", regex::escape(&word));
        e.search.set_pattern(&pattern);
        e.search.reverse = a.has_flag(b'r');
        let buffer_idx = e.views[e.view_idx].buffer;
        let (views, buffers) = (&mut e.views, &mut e.buffers);
        let view = &mut views[e.view_idx];
        let blocks = &buffers[buffer_idx].blocks;
        let mut search = std::mem::take(&mut e.search);
        let result = search_next_word(view, blocks, &mut search, cs);
        e.search = search;
        return match result {
            Ok(outcome) => search_msg(e, outcome),
            Err(err) => e.err.report(&err),
        };
    }

    if let Some(pattern) = args.first() {
        e.search.set_pattern(pattern);
        e.search.reverse = a.has_flag(b'r');
    } else if !a.has_flag(b'n') && !a.has_flag(b'p') {
        // Enter incremental search mode
        e.search.reverse = a.has_flag(b'r');
        e.cmdline.clear();
        e.enter_mode("search");
        return true;
    }

    let prev = a.has_flag(b'p');
    let buffer_idx = e.views[e.view_idx].buffer;
    let view = &mut e.views[e.view_idx];
    let blocks = &e.buffers[buffer_idx].blocks;
    let mut search = std::mem::take(&mut e.search);
    let result = if prev {
        search_prev(view, blocks, &mut search, cs)
    } else {
        search_next(view, blocks, &mut search, cs)
    };
    e.search = search;
    match result {
        Ok(outcome) => search_msg(e, outcome),
        Err(err) => e.err.report(&err),
    }
}

fn cmd_replace(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let (pattern, format) = (args[0].clone(), args[1].clone());
    let flags = ReplaceFlags {
        confirm: a.has_flag(b'c'),
        global: a.has_flag(b'g'),
        ignore_case: a.has_flag(b'i'),
        basic: a.has_flag(b'b'),
    };

    let mut scripted = std::mem::take(&mut e.pending_confirm_answers);
    let interactive = e.interactive;
    let mut confirm = move || {
        if !scripted.is_empty() {
            scripted.remove(0)
        } else if interactive {
            crate::terminal::prompt_replace()
        } else {
            ConfirmAnswer::Quit
        }
    };

    let (view, buffer) = e.current();
    let result = reg_replace(view, buffer, &pattern, &format, flags, &mut confirm);
    match result {
        Ok(r) => {
            if r.substitutions > 0 {
                let msg = format!(
                    "{} substitution{} on {} line{}",
                    r.substitutions,
                    if r.substitutions > 1 { "s" } else { "" },
                    r.lines,
                    if r.lines > 1 { "s" } else { "" },
                );
                e.err.info_msg(msg);
                true
            } else if !r.cancelled {
                e.err.error_msg(format!("Pattern '{pattern}' not found"))
            } else {
                true
            }
        }
        Err(err) => e.err.report(&err),
    }
}

// ---------------------------------------------------------------
// Macros

fn cmd_macro(e: &mut Editor, a: &CommandArgs) -> bool {
    match a.positional()[0].as_str() {
        "record" => {
            if e.macro_rec.start() {
                e.err.info_msg("Recording macro");
                true
            } else {
                e.err.error_msg("Already recording")
            }
        }
        "stop" => {
            if e.macro_rec.stop() {
                e.err.info_msg("Macro recorded");
                true
            } else {
                e.err.error_msg("Not recording")
            }
        }
        "toggle" => {
            let msg = if e.macro_rec.toggle() && e.macro_rec.is_recording() {
                "Recording macro"
            } else {
                "Macro recorded"
            };
            e.err.info_msg(msg);
            true
        }
        "cancel" => {
            e.macro_rec.cancel();
            true
        }
        "play" => {
            let lines: Vec<String> = e.macro_rec.previous().to_vec();
            let before = e.err.nr_errors;
            for line in lines {
                e.handle_command(&line, false);
                if e.err.nr_errors != before {
                    // Abort replay on the first error
                    return false;
                }
            }
            true
        }
        arg => e.err.error_msg(format!("Unknown action: {arg}")),
    }
}

// ---------------------------------------------------------------
// External commands and compilers

fn cmd_run(e: &mut Editor, a: &CommandArgs) -> bool {
    let argv = a.positional().to_vec();
    let snapshot = e.env_snapshot();
    let action = if a.has_flag(b's') {
        SpawnAction::Null
    } else {
        SpawnAction::Tty
    };
    let req = SpawnRequest {
        argv: &argv,
        env: &child_env(&snapshot),
        actions: [action, action, action],
        input: b"",
    };
    match spawn(&req) {
        Ok(r) => {
            if let Some(sig) = r.signal() {
                e.err.error_msg(format!("Child received signal {sig}"))
            } else if r.status != 0 {
                e.err.error_msg(format!("Child returned {}", r.status))
            } else {
                true
            }
        }
        Err(err) => e.err.report(&err),
    }
}

fn cmd_compile(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let name = args[0].clone();
    if e.compilers.find(&name).is_none() {
        return e.err.error_msg(format!("No such error parser: {name}"));
    }

    let argv = args[1..].to_vec();
    let snapshot = e.env_snapshot();
    let req = SpawnRequest {
        argv: &argv,
        env: &child_env(&snapshot),
        actions: [SpawnAction::Null, SpawnAction::Null, SpawnAction::Pipe],
        input: b"",
    };
    let result = match spawn(&req) {
        Ok(r) => r,
        Err(err) => return e.err.report(&err),
    };

    let compiler = e.compilers.find(&name).expect("checked above");
    e.messages = compiler.parse_output(&result.stderr);
    e.err.info_msg(format!(
        "{} message{} (exit: {})",
        e.messages.len(),
        if e.messages.len() == 1 { "" } else { "s" },
        result.status,
    ));
    true
}

fn cmd_errorfmt(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let name = &args[0];
    let pattern = &args[1];
    let names = args[2..].to_vec();
    match parse_error_format(a.has_flag(b'i'), pattern, &names) {
        Ok(fmt) => {
            let mut source = String::from("errorfmt ");
            if a.has_flag(b'i') {
                source.push_str("-i ");
            }
            source.push_str(&crate::command::parse::escape_arg(name));
            source.push(' ');
            source.push_str(&crate::command::parse::escape_arg(pattern));
            for n in &names {
                source.push(' ');
                source.push_str(&crate::command::parse::escape_arg(n));
            }
            e.compilers.add_error_format(name, fmt, source);
            true
        }
        Err(err) => e.err.report(&err),
    }
}

// ---------------------------------------------------------------
// Config, dumps, styles

fn cmd_include(e: &mut Editor, a: &CommandArgs) -> bool {
    let name = &a.positional()[0];
    if a.has_flag(b'b') {
        crate::config::exec_builtin(e, name)
    } else {
        match std::fs::read_to_string(name) {
            Ok(text) => {
                crate::config::exec_config(e, name, &text);
                true
            }
            Err(err) => e.err.error_msg(format!("{name}: {err}")),
        }
    }
}

fn cmd_show(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let what = args[0].as_str();
    let arg = args.get(1);

    let text = match what {
        "alias" => match arg {
            Some(name) => match e.aliases.find(name) {
                Some(value) => format!("alias {} {}\n", name, crate::command::parse::escape_arg(value)),
                None => return e.err.error_msg(format!("No such alias: {name}")),
            },
            None => e.aliases.dump(),
        },
        "bind" => {
            let mut names: Vec<&String> = e.modes.keys().collect();
            names.sort();
            let mut out = String::new();
            for mode_name in names {
                let mode = &e.modes[mode_name];
                for (key, cmd) in mode.bindings.iter_sorted() {
                    if mode_name == "normal" {
                        out.push_str(&format!(
                            "bind {} {}\n",
                            key,
                            crate::command::parse::escape_arg(&cmd)
                        ));
                    } else {
                        out.push_str(&format!(
                            "bind -T {} {} {}\n",
                            mode_name,
                            key,
                            crate::command::parse::escape_arg(&cmd)
                        ));
                    }
                }
            }
            out
        }
        "set" => {
            let buffer = e.current_buffer();
            let mut out = String::new();
            for name in OPTION_NAMES {
                if let Some(value) = get_option(&buffer.options, &e.options, name) {
                    out.push_str(&format!(
                        "set {} {}\n",
                        name,
                        crate::command::parse::escape_arg(&value)
                    ));
                }
            }
            out
        }
        "errorfmt" => e.compilers.dump(),
        "errors" => {
            let mut out = String::new();
            for m in &e.messages {
                match (&m.file, m.line) {
                    (Some(file), Some(line)) => {
                        out.push_str(&format!("{file}:{line}: {}\n", m.text))
                    }
                    _ => out.push_str(&format!("{}\n", m.text)),
                }
            }
            out
        }
        "macro" => {
            let mut out = String::new();
            for line in e.macro_rec.previous() {
                out.push_str(line);
                out.push('\n');
            }
            out
        }
        _ => return e.err.error_msg(format!("Invalid argument: {what}")),
    };

    // The dump opens as a scratch buffer
    let mut buffer = Buffer::from_bytes(text.as_bytes());
    buffer.display_name = format!("(show {what})");
    e.buffers.push(buffer);
    let idx = e.buffers.len() - 1;
    e.switch_to_buffer(idx);
    true
}

fn parse_color(name: &str) -> Result<Option<Color>, ()> {
    let c = match name {
        "default" | "keep" => return Ok(None),
        "black" => Color::Black,
        "red" => Color::DarkRed,
        "green" => Color::DarkGreen,
        "yellow" => Color::DarkYellow,
        "blue" => Color::DarkBlue,
        "magenta" => Color::DarkMagenta,
        "cyan" => Color::DarkCyan,
        "gray" => Color::Grey,
        "darkgray" => Color::DarkGrey,
        "lightred" => Color::Red,
        "lightgreen" => Color::Green,
        "lightyellow" => Color::Yellow,
        "lightblue" => Color::Blue,
        "lightmagenta" => Color::Magenta,
        "lightcyan" => Color::Cyan,
        "white" => Color::White,
        other => Color::AnsiValue(other.parse::<u8>().map_err(|_| ())?),
    };
    Ok(Some(c))
}

fn cmd_hi(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let name = args[0].clone();
    let mut style = Style::default();
    let mut colors = 0;
    for arg in &args[1..] {
        match arg.as_str() {
            "bold" => style.bold = true,
            "underline" => style.underline = true,
            "reverse" => style.reverse = true,
            other => {
                let Ok(color) = parse_color(other) else {
                    return e.err.error_msg(format!("Invalid color or attribute: {other}"));
                };
                match colors {
                    0 => style.fg = color,
                    1 => style.bg = color,
                    _ => return e.err.error_msg("Too many colors"),
                }
                colors += 1;
            }
        }
    }
    e.syntaxes.intern_emit(&name);
    e.syntaxes.styles.insert(name, style);
    true
}

fn cmd_default(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional();
    let base = args[0].clone();
    for name in &args[1..] {
        e.syntaxes.intern_emit(name);
        e.syntaxes.style_aliases.insert(name.clone(), base.clone());
    }
    true
}

// ---------------------------------------------------------------
// Syntax definition commands

fn with_loader(
    e: &mut Editor,
    f: impl FnOnce(&mut SyntaxLoader, &mut crate::syntax::SyntaxSet) -> Result<(), String>,
) -> bool {
    let Some(mut loader) = e.syntax_loader.take() else {
        return e.err.error_msg("No syntax being defined");
    };
    let result = f(&mut loader, &mut e.syntaxes);
    e.syntax_loader = Some(loader);
    match result {
        Ok(()) => true,
        Err(msg) => e.err.error_msg(msg),
    }
}

/// Finalize the open syntax definition, if any.
pub fn finish_open_syntax(e: &mut Editor) -> bool {
    let Some(loader) = e.syntax_loader.take() else {
        return true;
    };
    let name = loader.name().to_string();
    match loader.finish(&mut e.syntaxes) {
        Ok(syntax) => {
            log::debug!("loaded syntax {name} ({} states)", syntax.states.len());
            e.syntaxes.syntaxes.insert(name, syntax);
            true
        }
        Err(msg) => e.err.error_msg(format!("Syntax {name}: {msg}")),
    }
}

fn cmd_syntax(e: &mut Editor, a: &CommandArgs) -> bool {
    if !finish_open_syntax(e) {
        return false;
    }
    e.syntax_loader = Some(SyntaxLoader::begin(&a.positional()[0]));
    true
}

fn cmd_state(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    with_loader(e, |l, set| {
        l.add_state(set, &args[0], args.get(1).map(String::as_str))
    })
}

fn cmd_char(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let buffer = a.has_flag(b'b');
    let negate = a.has_flag(b'n');
    with_loader(e, |l, _| {
        l.add_char(
            args[0].as_bytes(),
            buffer,
            negate,
            &args[1],
            args.get(2).map(String::as_str),
        )
    })
}

fn cmd_str(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let icase = a.has_flag(b'i');
    with_loader(e, |l, _| {
        l.add_str(
            args[0].as_bytes(),
            icase,
            &args[1],
            args.get(2).map(String::as_str),
        )
    })
}

fn cmd_bufis(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let icase = a.has_flag(b'i');
    with_loader(e, |l, _| {
        l.add_bufis(
            args[0].as_bytes(),
            icase,
            &args[1],
            args.get(2).map(String::as_str),
        )
    })
}

fn cmd_inlist(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let keep = a.has_flag(b'b');
    with_loader(e, |l, _| {
        l.add_inlist(&args[0], keep, &args[1], args.get(2).map(String::as_str))
    })
}

fn cmd_recolor(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let len = match args.get(1) {
        Some(arg) => match arg.parse::<usize>() {
            Ok(n) => Some(n),
            Err(_) => return e.err.error_msg(format!("Invalid number: {arg}")),
        },
        None => None,
    };
    with_loader(e, |l, set| l.add_recolor(set, &args[0], len))
}

fn cmd_heredocend(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    with_loader(e, |l, _| {
        l.add_heredocend(&args[0], args.get(1).map(String::as_str))
    })
}

fn cmd_eat(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    with_loader(e, |l, _| {
        l.add_eat(&args[0], args.get(1).map(String::as_str))
    })
}

fn cmd_noeat(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let keep = a.has_flag(b'b');
    with_loader(e, |l, _| l.add_noeat(&args[0], keep))
}

fn cmd_heredocbegin(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    with_loader(e, |l, _| l.add_heredocbegin(&args[0], &args[1]))
}

fn cmd_list(e: &mut Editor, a: &CommandArgs) -> bool {
    let args = a.positional().to_vec();
    let icase = a.has_flag(b'i');
    with_loader(e, |l, _| l.add_list(&args[0], &args[1..], icase))
}

// ---------------------------------------------------------------
// Command and search modes

fn cmd_command(e: &mut Editor, a: &CommandArgs) -> bool {
    e.cmdline.clear();
    if let Some(text) = a.positional().first() {
        e.cmdline.set_text(text);
    }
    e.enter_mode("command");
    true
}

fn cmd_command_accept(e: &mut Editor, _a: &CommandArgs) -> bool {
    let text = e.cmdline.buf.clone();
    e.leave_cmdline_mode();
    if !text.trim().is_empty() {
        e.handle_command(&text, true);
    }
    true
}

fn cmd_command_cancel(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.leave_cmdline_mode();
    true
}

fn cmd_search_accept(e: &mut Editor, _a: &CommandArgs) -> bool {
    let text = e.cmdline.buf.clone();
    e.leave_cmdline_mode();
    if !text.is_empty() {
        e.search.set_pattern(&text);
    }
    let cs = e.options.case_sensitive_search;
    let buffer_idx = e.views[e.view_idx].buffer;
    let view = &mut e.views[e.view_idx];
    let blocks = &e.buffers[buffer_idx].blocks;
    let mut search = std::mem::take(&mut e.search);
    let result = search_next(view, blocks, &mut search, cs);
    e.search = search;
    match result {
        Ok(outcome) => search_msg(e, outcome),
        Err(err) => e.err.report(&err),
    }
}

fn cmd_search_cancel(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.leave_cmdline_mode();
    true
}

fn cmd_cmdline_left(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.left();
    true
}

fn cmd_cmdline_right(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.right();
    true
}

fn cmd_cmdline_bol(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.bol();
    true
}

fn cmd_cmdline_eol(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.eol();
    true
}

fn cmd_cmdline_delete(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.delete();
    true
}

fn cmd_cmdline_erase(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.erase();
    true
}

fn cmd_cmdline_erase_word(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.erase_word();
    true
}

fn cmd_cmdline_delete_eol(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.delete_eol();
    true
}

fn cmd_cmdline_erase_bol(e: &mut Editor, _a: &CommandArgs) -> bool {
    e.cmdline.erase_bol();
    true
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod commands_tests;
