//! Buffer-local and global options
//!
//! Options are addressed by name through [`set_option`] / [`get_option`]
//! so that `set` and `show set` round-trip through the command parser.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseSensitivity {
    True,
    False,
    /// Case-insensitive unless the pattern contains an ASCII
    /// uppercase byte.
    Auto,
}

impl fmt::Display for CaseSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseSensitivity::True => write!(f, "true"),
            CaseSensitivity::False => write!(f, "false"),
            CaseSensitivity::Auto => write!(f, "auto"),
        }
    }
}

/// Per-buffer options.
#[derive(Debug, Clone)]
pub struct LocalOptions {
    pub auto_indent: bool,
    pub expand_tab: bool,
    pub indent_width: u32,
    pub tab_width: u32,
    pub syntax: bool,
    pub filetype: String,
    /// Include the character under the cursor in char selections.
    pub select_cursor_char: bool,
    /// Highlight whitespace errors (bitmask, see WSE_*).
    pub ws_error: u32,
}

pub const WSE_TRAILING: u32 = 1 << 0;
pub const WSE_SPACE_INDENT: u32 = 1 << 1;
pub const WSE_TAB_INDENT: u32 = 1 << 2;

impl Default for LocalOptions {
    fn default() -> Self {
        LocalOptions {
            auto_indent: true,
            expand_tab: false,
            indent_width: 8,
            tab_width: 8,
            syntax: true,
            filetype: String::from("none"),
            select_cursor_char: false,
            ws_error: WSE_TRAILING,
        }
    }
}

/// Editor-wide options.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub case_sensitive_search: CaseSensitivity,
    pub esc_timeout: u32,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        GlobalOptions {
            case_sensitive_search: CaseSensitivity::Auto,
            esc_timeout: 100,
        }
    }
}

/// All settable option names, sorted; `show set` iterates this.
pub const OPTION_NAMES: &[&str] = &[
    "auto-indent",
    "case-sensitive-search",
    "esc-timeout",
    "expand-tab",
    "filetype",
    "indent-width",
    "select-cursor-char",
    "syntax",
    "tab-width",
    "ws-error",
];

fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("Invalid value for boolean option: {value}")),
    }
}

fn parse_width(value: &str) -> Result<u32, String> {
    match value.parse::<u32>() {
        Ok(n) if (1..=8).contains(&n) => Ok(n),
        _ => Err(format!("Width must be an integer between 1 and 8: {value}")),
    }
}

/// Set option `name`. `local`/`global` select the target scope; an
/// unscoped `set` passes both.
pub fn set_option(
    local: Option<&mut LocalOptions>,
    global: Option<&mut GlobalOptions>,
    name: &str,
    value: &str,
) -> Result<(), String> {
    match name {
        "auto-indent" | "expand-tab" | "filetype" | "indent-width" | "select-cursor-char"
        | "syntax" | "tab-width" | "ws-error" => {
            let Some(opt) = local else {
                return Err(format!("Option {name} is buffer-local"));
            };
            match name {
                "auto-indent" => opt.auto_indent = parse_bool(value)?,
                "expand-tab" => opt.expand_tab = parse_bool(value)?,
                "filetype" => opt.filetype = value.to_string(),
                "indent-width" => opt.indent_width = parse_width(value)?,
                "select-cursor-char" => opt.select_cursor_char = parse_bool(value)?,
                "syntax" => opt.syntax = parse_bool(value)?,
                "tab-width" => opt.tab_width = parse_width(value)?,
                "ws-error" => {
                    opt.ws_error = value
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid ws-error flags: {value}"))?
                }
                _ => unreachable!(),
            }
            Ok(())
        }
        "case-sensitive-search" | "esc-timeout" => {
            let Some(opt) = global else {
                return Err(format!("Option {name} is global"));
            };
            match name {
                "case-sensitive-search" => {
                    opt.case_sensitive_search = match value {
                        "true" => CaseSensitivity::True,
                        "false" => CaseSensitivity::False,
                        "auto" => CaseSensitivity::Auto,
                        _ => return Err(format!("Invalid case sensitivity: {value}")),
                    }
                }
                "esc-timeout" => {
                    opt.esc_timeout = value
                        .parse()
                        .map_err(|_| format!("Invalid timeout: {value}"))?
                }
                _ => unreachable!(),
            }
            Ok(())
        }
        _ => Err(format!("No such option: {name}")),
    }
}

pub fn get_option(local: &LocalOptions, global: &GlobalOptions, name: &str) -> Option<String> {
    let value = match name {
        "auto-indent" => local.auto_indent.to_string(),
        "case-sensitive-search" => global.case_sensitive_search.to_string(),
        "esc-timeout" => global.esc_timeout.to_string(),
        "expand-tab" => local.expand_tab.to_string(),
        "filetype" => local.filetype.clone(),
        "indent-width" => local.indent_width.to_string(),
        "select-cursor-char" => local.select_cursor_char.to_string(),
        "syntax" => local.syntax.to_string(),
        "tab-width" => local.tab_width.to_string(),
        "ws-error" => local.ws_error.to_string(),
        _ => return None,
    };
    Some(value)
}
