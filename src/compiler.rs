//! Error-format parsers for child process output
//!
//! A compiler descriptor is a named list of regex patterns with
//! capture-index hints mapping matched lines to file/line/column/
//! message fields. Running a compiler feeds the child's stderr
//! through the patterns and collects [`Message`]s.

use crate::error::{EditorError, ErrorKind};
use regex::Regex;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ErrorFormat {
    pub pattern: Regex,
    /// Lines matching this pattern are dropped entirely.
    pub ignore: bool,
    pub file_idx: Option<usize>,
    pub line_idx: Option<usize>,
    pub column_idx: Option<usize>,
    pub msg_idx: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    pub error_formats: Vec<ErrorFormat>,
}

/// Build one format from a pattern and capture-name hints
/// (`file`, `line`, `column`, `message` or `_` per capture group).
pub fn parse_error_format(
    ignore: bool,
    pattern: &str,
    capture_names: &[String],
) -> Result<ErrorFormat, EditorError> {
    let re = Regex::new(pattern).map_err(|e| EditorError::new(ErrorKind::Regex, e.to_string()))?;
    let nr_groups = re.captures_len() - 1;
    if capture_names.len() > nr_groups {
        return Err(EditorError::new(
            ErrorKind::Regex,
            format!(
                "Too many capture names ({}, pattern has {} groups)",
                capture_names.len(),
                nr_groups
            ),
        ));
    }

    let mut fmt = ErrorFormat {
        pattern: re,
        ignore,
        file_idx: None,
        line_idx: None,
        column_idx: None,
        msg_idx: None,
    };
    for (i, name) in capture_names.iter().enumerate() {
        let idx = Some(i + 1);
        match name.as_str() {
            "file" => fmt.file_idx = idx,
            "line" => fmt.line_idx = idx,
            "column" => fmt.column_idx = idx,
            "message" => fmt.msg_idx = idx,
            "_" => {}
            other => {
                return Err(EditorError::new(
                    ErrorKind::Other,
                    format!("Unknown capture name: {other}"),
                ))
            }
        }
    }
    Ok(fmt)
}

impl Compiler {
    /// Map one output line to a message. `None` means the line
    /// matched an ignore pattern or nothing at all.
    pub fn parse_line(&self, line: &str) -> Option<Message> {
        for fmt in &self.error_formats {
            let Some(caps) = fmt.pattern.captures(line) else {
                continue;
            };
            if fmt.ignore {
                return None;
            }
            let get = |idx: Option<usize>| {
                idx.and_then(|i| caps.get(i)).map(|m| m.as_str().to_string())
            };
            return Some(Message {
                file: get(fmt.file_idx),
                line: get(fmt.line_idx).and_then(|s| s.parse().ok()),
                column: get(fmt.column_idx).and_then(|s| s.parse().ok()),
                text: get(fmt.msg_idx).unwrap_or_else(|| line.to_string()),
            });
        }
        None
    }

    /// Collect messages from a whole stderr capture.
    pub fn parse_output(&self, output: &str) -> Vec<Message> {
        output.lines().filter_map(|l| self.parse_line(l)).collect()
    }
}

/// The named compiler table plus dump support.
#[derive(Debug, Clone, Default)]
pub struct CompilerSet {
    pub compilers: HashMap<String, Compiler>,
    /// Original `errorfmt` invocations per compiler, for dumps.
    sources: HashMap<String, Vec<String>>,
}

impl CompilerSet {
    pub fn new() -> Self {
        CompilerSet::default()
    }

    pub fn add_error_format(&mut self, name: &str, fmt: ErrorFormat, source: String) {
        self.compilers
            .entry(name.to_string())
            .or_default()
            .error_formats
            .push(fmt);
        self.sources.entry(name.to_string()).or_default().push(source);
    }

    pub fn find(&self, name: &str) -> Option<&Compiler> {
        self.compilers.get(name)
    }

    pub fn dump(&self) -> String {
        let mut names: Vec<&String> = self.sources.keys().collect();
        names.sort();
        let mut out = String::new();
        for name in names {
            for line in &self.sources[name] {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcc() -> Compiler {
        let mut c = Compiler::default();
        c.error_formats.push(
            parse_error_format(
                true,
                "^In file included from",
                &[],
            )
            .unwrap(),
        );
        c.error_formats.push(
            parse_error_format(
                false,
                r"^(.+?):(\d+):(\d+): (?:fatal )?(?:error|warning): (.+)$",
                &[
                    "file".to_string(),
                    "line".to_string(),
                    "column".to_string(),
                    "message".to_string(),
                ],
            )
            .unwrap(),
        );
        c
    }

    #[test]
    fn test_parse_error_line() {
        let c = gcc();
        let m = c
            .parse_line("main.c:12:5: error: expected ';' before 'return'")
            .unwrap();
        assert_eq!(m.file.as_deref(), Some("main.c"));
        assert_eq!(m.line, Some(12));
        assert_eq!(m.column, Some(5));
        assert_eq!(m.text, "expected ';' before 'return'");
    }

    #[test]
    fn test_ignore_pattern() {
        let c = gcc();
        assert!(c.parse_line("In file included from foo.h:1:").is_none());
        assert!(c.parse_line("random noise").is_none());
    }

    #[test]
    fn test_parse_output_collects() {
        let c = gcc();
        let out = "a.c:1:1: error: one\nnoise\nb.c:2:3: warning: two\n";
        let msgs = c.parse_output(out);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1].file.as_deref(), Some("b.c"));
        assert_eq!(msgs[1].line, Some(2));
    }

    #[test]
    fn test_capture_name_validation() {
        assert!(parse_error_format(false, r"(\d+)", &["bogus".to_string()]).is_err());
        assert!(parse_error_format(
            false,
            r"(\d+)",
            &["line".to_string(), "file".to_string()]
        )
        .is_err());
        assert!(parse_error_format(false, r"(", &[]).is_err());
    }

    #[test]
    fn test_compiler_set_dump() {
        let mut set = CompilerSet::new();
        let fmt = parse_error_format(false, r"^(.+):(\d+): (.*)$", &[
            "file".to_string(),
            "line".to_string(),
            "message".to_string(),
        ])
        .unwrap();
        set.add_error_format(
            "mk",
            fmt,
            "errorfmt mk '^(.+):(\\d+): (.*)$' file line message".to_string(),
        );
        let dump = set.dump();
        assert!(dump.contains("errorfmt mk"));
    }
}
