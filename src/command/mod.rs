//! Command layer: parsing, argument handling, dispatch
//!
//! Commands are the editor's script language: key bindings, config
//! files and the command line all funnel through the same parser and
//! dispatcher.

pub mod alias;
pub mod args;
pub mod cache;
pub mod env;
pub mod macros;
pub mod parse;
pub mod run;

use crate::editor::Editor;

pub type CommandFn = fn(&mut Editor, &args::CommandArgs) -> bool;

/// A command table entry. `flags` is the option descriptor: each
/// byte is a flag character, a following `=` marks a flag that takes
/// a separate argument, and a leading `-` forbids flags after the
/// first positional argument.
pub struct Command {
    pub name: &'static str,
    pub flags: &'static str,
    pub min_args: usize,
    /// `usize::MAX` = unlimited.
    pub max_args: usize,
    pub handler: CommandFn,
}

/// A sorted static command table.
pub struct CommandSet {
    pub commands: &'static [Command],
}

impl CommandSet {
    pub fn lookup(&self, name: &str) -> Option<&'static Command> {
        self.commands
            .binary_search_by(|c| c.name.cmp(name))
            .ok()
            .map(|i| &self.commands[i])
    }

    #[cfg(test)]
    pub fn assert_sorted(&self) {
        for w in self.commands.windows(2) {
            assert!(w[0].name < w[1].name, "{} >= {}", w[0].name, w[1].name);
        }
    }
}
