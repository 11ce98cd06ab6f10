//! Command dispatch
//!
//! Resolution order: the active command set, then aliases (expanded
//! and re-run with the caller's extra arguments appended). Alias
//! recursion is bounded. Every command runs between `begin_change`
//! and `end_change` so it undoes as one step unless it opens a chain
//! itself, and is offered to the macro recorder before argument
//! parsing rearranges the argv.

use super::args::{do_parse_args, CommandArgs};
use super::cache::CachedCommand;
use super::parse::{parse_commands, ParseContext};
use super::CommandSet;
use crate::change::MergeKind;
use crate::editor::Editor;

/// Alias expansion depth limit.
const MAX_RECURSION: u32 = 8;

fn should_record(name: &str) -> bool {
    // Recording the macro command would replay recursively
    name != "macro"
}

fn run_command(e: &mut Editor, cmds: &'static CommandSet, argv: Vec<String>, allow_recording: bool) {
    let name = argv[0].clone();
    let Some(cmd) = cmds.lookup(&name) else {
        let Some(alias_value) = e.aliases.find(&name).map(str::to_string) else {
            e.err.error_msg(format!("No such command or alias: {name}"));
            return;
        };

        let ctx = ParseContext::plain();
        let mut statements = match parse_commands(&ctx, &alias_value) {
            Ok(s) => s,
            Err(err) => {
                e.err.error_msg(format!("Parsing alias {name}: {err}"));
                return;
            }
        };

        // The caller's arguments go after the alias value
        if let Some(last) = statements.last_mut() {
            last.extend(argv[1..].iter().cloned());
        }
        run_commands(e, cmds, statements, allow_recording);
        return;
    };

    if allow_recording && e.macro_rec.is_recording() && should_record(cmd.name) {
        e.macro_rec.record_command(cmd.name, &argv[1..]);
    }

    // By default a change can't merge with the previous one; a
    // command overrides this by calling begin_change again
    e.current_buffer_mut().begin_change(MergeKind::None);
    e.err.command = Some(cmd.name.to_string());

    match do_parse_args(cmd, CommandArgs::new(argv[1..].to_vec())) {
        Ok(args) => {
            (cmd.handler)(e, &args);
        }
        Err(err) => {
            e.err.error_msg(err);
        }
    }

    e.err.command = None;
    e.current_buffer_mut().end_change();
}

pub fn run_commands(
    e: &mut Editor,
    cmds: &'static CommandSet,
    statements: Vec<Vec<String>>,
    allow_recording: bool,
) {
    if e.recursion_count >= MAX_RECURSION {
        e.err.error_msg("alias recursion overflow");
        return;
    }
    e.recursion_count += 1;
    for argv in statements {
        if !argv.is_empty() {
            run_command(e, cmds, argv, allow_recording);
        }
    }
    e.recursion_count -= 1;
}

/// Parse and run a command string with variable and tilde expansion.
pub fn handle_command(e: &mut Editor, cmds: &'static CommandSet, text: &str, allow_recording: bool) {
    let snapshot = e.env_snapshot();
    let expand = |name: &str| snapshot.expand(name);
    let home = std::env::var("HOME").unwrap_or_default();
    let ctx = ParseContext {
        expand_variable: Some(&expand),
        home_dir: (!home.is_empty()).then_some(home.as_str()),
    };

    match parse_commands(&ctx, text) {
        Ok(statements) => run_commands(e, cmds, statements, allow_recording),
        Err(err) => {
            e.err.error_msg(format!("Command syntax error: {err}"));
        }
    }
}

/// Run a pre-parsed binding.
pub fn run_cached(e: &mut Editor, cached: &CachedCommand) {
    if e.macro_rec.is_recording() && should_record(cached.cmd.name) {
        e.macro_rec.record_line(&cached.text);
    }

    e.current_buffer_mut().begin_change(MergeKind::None);
    e.err.command = Some(cached.cmd.name.to_string());
    (cached.cmd.handler)(e, &cached.args);
    e.err.command = None;
    e.current_buffer_mut().end_change();
}
