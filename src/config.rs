//! Config execution and built-in configs
//!
//! Config files are ordinary command scripts executed line by line;
//! `#` starts a comment at the beginning of a line and errors are
//! reported with a `file:line:` prefix. A set of named configs is
//! compiled in and runnable via `include -b NAME`.

use crate::commands::{finish_open_syntax, NORMAL_COMMANDS};
use crate::command::run;
use crate::editor::Editor;

/// Built-in config blobs, addressable by `include -b`.
pub const BUILTIN_CONFIGS: &[(&str, &str)] = &[
    ("rc", BUILTIN_RC),
    ("compiler/gcc", BUILTIN_COMPILER_GCC),
    ("syntax/c", BUILTIN_SYNTAX_C),
    ("syntax/sh", BUILTIN_SYNTAX_SH),
];

pub fn find_builtin(name: &str) -> Option<&'static str> {
    BUILTIN_CONFIGS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, text)| *text)
}

/// Execute a config script. Parse and command errors carry the
/// `file:line:` prefix and do not stop execution.
pub fn exec_config(e: &mut Editor, name: &str, text: &str) {
    let prev = e.err.config_file.take();
    for (nr, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        e.err.config_file = Some((name.to_string(), nr as u32 + 1));
        run::handle_command(e, &NORMAL_COMMANDS, trimmed, false);
    }
    // A syntax definition left open by the script ends here
    finish_open_syntax(e);
    e.err.config_file = prev;
}

pub fn exec_builtin(e: &mut Editor, name: &str) -> bool {
    match find_builtin(name) {
        Some(text) => {
            exec_config(e, &format!("builtin:{name}"), text);
            true
        }
        None => e.err.error_msg(format!("No built-in config with name '{name}'")),
    }
}

pub fn load_builtin_configs(e: &mut Editor) {
    for (name, _) in BUILTIN_CONFIGS {
        exec_builtin(e, name);
    }
}

const BUILTIN_RC: &str = r#"
# Default key bindings
bind left left
bind right right
bind up up
bind down down
bind home bol
bind end eol
bind pgup pgup
bind pgdown pgdown
bind C-home bof
bind C-end eof
bind delete delete
bind backspace erase
bind C-delete delete-word
bind C-backspace erase-word
bind C-z undo
bind C-y redo
bind C-s save
bind C-q quit
bind C-c copy
bind C-x cut
bind C-v paste
bind C-k delete-eol
bind C-f search
bind F3 'search -n'
bind S-F3 'search -p'
bind C-t 'search -w'
bind M-j join
bind M-x command
bind escape unselect
bind C-b 'bookmark -p'

# Command line editing
bind -T cmdline left cmdline-left
bind -T cmdline right cmdline-right
bind -T cmdline home cmdline-bol
bind -T cmdline end cmdline-eol
bind -T cmdline delete cmdline-delete
bind -T cmdline backspace cmdline-erase
bind -T cmdline C-w cmdline-erase-word
bind -T cmdline C-k cmdline-delete-eol
bind -T cmdline C-u cmdline-erase-bol
bind -T command enter command-accept
bind -T command escape command-cancel
bind -T search enter search-accept
bind -T search escape search-cancel

# Aliases
alias q quit
alias w save
alias wq 'save; quit'
alias x 'save; quit'

# Styles
hi default
hi comment green
hi notice black yellow
hi string yellow
hi keyword lightcyan
hi type lightgreen
hi builtin lightmagenta
hi number magenta
hi op yellow
default string heredoc
"#;

const BUILTIN_COMPILER_GCC: &str = r#"
errorfmt -i gcc '^In file included from'
errorfmt gcc '^(.+?):([0-9]+):([0-9]+): (fatal error|error|warning): (.+)$' file line column _ message
errorfmt gcc '^(.+?):([0-9]+): (error|warning): (.+)$' file line _ message
"#;

const BUILTIN_SYNTAX_C: &str = r#"
syntax c

list keyword break case const continue default do else enum extern for goto if return sizeof static struct switch typedef union while
list type char double float int long short signed unsigned void

state start default
 char -b a-zA-Z_ word
 str '/*' comment
 str '//' line-comment
 char '"' string
 char -b 0-9 number
 eat this

state word default
 char -b a-zA-Z0-9_ this
 inlist keyword start keyword
 inlist type start type
 noeat start

state comment comment
 str '*/' start comment
 eat this

state line-comment comment
 char "\n" start
 eat this

state string string
 char '"' start string
 char "\\" string-escape
 char "\n" start
 eat this

state string-escape string
 eat string

state number number
 char -b 0-9 this
 noeat start
"#;

const BUILTIN_SYNTAX_SH: &str = r#"
syntax .sh-heredoc

state body heredoc
 heredocend END string
 eat this

syntax sh

list builtin cd echo exit export read set test unset

state start default
 str '<<' heredoc-delim op
 char -b a-zA-Z0-9_ word
 char '#' comment
 char "'" sq
 eat this

state word default
 char -b a-zA-Z0-9_ this
 inlist builtin start builtin
 noeat start

state comment comment
 char "\n" start
 eat this

state sq string
 char "'" start string
 eat this

state heredoc-delim op
 char -b a-zA-Z0-9_ this
 heredocbegin .sh-heredoc start
"#;

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
