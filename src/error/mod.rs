//! Error reporting
//!
//! Non-fatal errors land in the [`ErrorBuffer`], a one-message side
//! channel rendered on the status line. `nr_errors` counts every
//! reported error so config execution and macro replay can abort on
//! the first failure. [`EditorError`] is the structured error type
//! for fallible library calls; reporting one routes it through the
//! buffer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Command or config parse errors.
    Parse,
    /// Flag/arity errors.
    Arg,
    /// Unknown command, alias or file.
    NotFound,
    Io,
    Regex,
    /// Child process failures.
    Child,
    Internal,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "Parse",
            ErrorKind::Arg => "Arg",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Io => "IO",
            ErrorKind::Regex => "Regex",
            ErrorKind::Child => "Child",
            ErrorKind::Internal => "Internal",
            ErrorKind::Other => "Other",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorError {
    pub kind: ErrorKind,
    pub message: String,
}

impl EditorError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        EditorError {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for EditorError {}

impl From<std::io::Error> for EditorError {
    fn from(err: std::io::Error) -> Self {
        EditorError::new(ErrorKind::Io, err.to_string())
    }
}

impl From<regex::Error> for EditorError {
    fn from(err: regex::Error) -> Self {
        EditorError::new(ErrorKind::Regex, err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;

/// The status-line message slot plus error bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct ErrorBuffer {
    pub msg: String,
    pub is_error: bool,
    pub nr_errors: usize,
    /// Mirror messages to stderr (headless/config runs).
    pub print_to_stderr: bool,
    /// `file:line:` prefix while executing a config script.
    pub config_file: Option<(String, u32)>,
    /// `command:` prefix while a command runs.
    pub command: Option<String>,
}

impl ErrorBuffer {
    pub fn new() -> Self {
        ErrorBuffer::default()
    }

    fn prefix(&self) -> String {
        let mut p = String::new();
        if let Some((file, line)) = &self.config_file {
            p.push_str(&format!("{file}:{line}: "));
        }
        if let Some(cmd) = &self.command {
            p.push_str(&format!("{cmd}: "));
        }
        p
    }

    /// Record an error message. Always returns `false` so command
    /// handlers can `return err.error_msg(...)`.
    pub fn error_msg(&mut self, msg: impl fmt::Display) -> bool {
        self.msg = format!("{}{}", self.prefix(), msg);
        self.is_error = true;
        self.nr_errors += 1;
        if self.print_to_stderr {
            eprintln!("{}", self.msg);
        }
        log::debug!("error_msg: {}", self.msg);
        false
    }

    pub fn report(&mut self, err: &EditorError) -> bool {
        self.error_msg(&err.message)
    }

    /// The non-error counterpart shown on the status line.
    pub fn info_msg(&mut self, msg: impl fmt::Display) {
        self.msg = msg.to_string();
        self.is_error = false;
    }

    pub fn clear_msg(&mut self) {
        self.msg.clear();
        self.is_error = false;
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
