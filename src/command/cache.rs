//! Pre-parsed key-binding commands
//!
//! A binding whose command is a single plain statement is parsed
//! once at bind time; anything involving aliases, variables or
//! multiple statements keeps the raw source and is re-parsed on
//! every use.

use super::args::{do_parse_args, CommandArgs};
use super::parse::{parse_commands, ParseContext};
use super::{Command, CommandSet};
use crate::bind::Binding;

#[derive(Clone)]
pub struct CachedCommand {
    pub cmd: &'static Command,
    pub args: CommandArgs,
    pub text: String,
}

impl std::fmt::Debug for CachedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCommand")
            .field("cmd", &self.cmd.name)
            .field("text", &self.text)
            .finish()
    }
}

/// Parse `text` into a binding, caching when possible.
pub fn cached_command_new(cmds: &'static CommandSet, text: &str) -> Binding {
    let raw = || Binding::Raw(text.to_string());

    if text.contains('$') {
        // Commands containing variables can't be cached
        return raw();
    }

    let Ok(mut statements) = parse_commands(&ParseContext::plain(), text) else {
        return raw();
    };
    if statements.len() != 1 {
        // Only single commands can be cached
        return raw();
    }
    let mut argv = statements.remove(0);
    if argv.is_empty() {
        return raw();
    }

    let Some(cmd) = cmds.lookup(&argv[0]) else {
        // Aliases and unknown commands can't be cached
        return raw();
    };

    let args = CommandArgs::new(argv.split_off(1));
    match do_parse_args(cmd, args) {
        Ok(args) => Binding::Cached(CachedCommand {
            cmd,
            args,
            text: text.to_string(),
        }),
        Err(_) => raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NORMAL_COMMANDS;

    #[test]
    fn test_simple_command_is_cached() {
        match cached_command_new(&NORMAL_COMMANDS, "save") {
            Binding::Cached(c) => {
                assert_eq!(c.cmd.name, "save");
                assert_eq!(c.text, "save");
            }
            other => panic!("expected cached, got {other:?}"),
        }
    }

    #[test]
    fn test_command_with_flags_is_cached() {
        match cached_command_new(&NORMAL_COMMANDS, "insert -m 'hi there'") {
            Binding::Cached(c) => {
                assert_eq!(c.cmd.name, "insert");
                assert!(c.args.has_flag(b'm'));
                assert_eq!(c.args.positional(), &["hi there"]);
            }
            other => panic!("expected cached, got {other:?}"),
        }
    }

    #[test]
    fn test_multi_statement_stays_raw() {
        assert!(matches!(
            cached_command_new(&NORMAL_COMMANDS, "save; quit"),
            Binding::Raw(_)
        ));
    }

    #[test]
    fn test_variables_stay_raw() {
        assert!(matches!(
            cached_command_new(&NORMAL_COMMANDS, "open $FILE"),
            Binding::Raw(_)
        ));
    }

    #[test]
    fn test_unknown_command_stays_raw() {
        assert!(matches!(
            cached_command_new(&NORMAL_COMMANDS, "myalias -f"),
            Binding::Raw(_)
        ));
    }

    #[test]
    fn test_bad_args_stay_raw() {
        // `undo` takes no arguments
        assert!(matches!(
            cached_command_new(&NORMAL_COMMANDS, "undo extra args"),
            Binding::Raw(_)
        ));
    }
}
