//! Child process spawning
//!
//! Each of the child's three standard streams gets an action: piped
//! to the editor, redirected to /dev/null, or inherited from the
//! controlling terminal. Output captured through a pipe comes back
//! as a string; the exit status encodes signal deaths above the
//! normal 0..255 range so error messages can tell them apart.

use crate::error::{EditorError, ErrorKind};
use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnAction {
    /// Connect to the editor through a pipe.
    Pipe,
    /// Redirect to /dev/null.
    Null,
    /// Inherit the controlling terminal.
    Tty,
}

#[derive(Debug, Clone)]
pub struct SpawnRequest<'a> {
    pub argv: &'a [String],
    pub env: &'a [(String, String)],
    /// Actions for stdin, stdout, stderr.
    pub actions: [SpawnAction; 3],
    /// Bytes written to stdin when it is piped.
    pub input: &'a [u8],
}

#[derive(Debug, Clone, Default)]
pub struct SpawnResult {
    /// `0..=255` for normal exits, `256 + signal` for signal deaths.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl SpawnResult {
    pub fn signal(&self) -> Option<i32> {
        (self.status > 255).then(|| self.status - 256)
    }
}

fn stdio_for(action: SpawnAction) -> Stdio {
    match action {
        SpawnAction::Pipe => Stdio::piped(),
        SpawnAction::Null => Stdio::null(),
        SpawnAction::Tty => Stdio::inherit(),
    }
}

/// Run a child process synchronously, honoring the stream actions.
pub fn spawn(req: &SpawnRequest) -> Result<SpawnResult, EditorError> {
    let Some(program) = req.argv.first() else {
        return Err(EditorError::new(ErrorKind::Child, "Empty command"));
    };

    let mut cmd = Command::new(program);
    cmd.args(&req.argv[1..]);
    for (key, value) in req.env {
        cmd.env(key, value);
    }
    cmd.stdin(stdio_for(req.actions[0]));
    cmd.stdout(stdio_for(req.actions[1]));
    cmd.stderr(stdio_for(req.actions[2]));

    let mut child = cmd
        .spawn()
        .map_err(|e| EditorError::new(ErrorKind::Child, format!("{program}: {e}")))?;

    if req.actions[0] == SpawnAction::Pipe {
        if let Some(mut stdin) = child.stdin.take() {
            // A child ignoring its input must not kill the editor
            let _ = stdin.write_all(req.input);
        }
    }

    let output = child
        .wait_with_output()
        .map_err(|e| EditorError::new(ErrorKind::Child, e.to_string()))?;

    let status = match output.status.code() {
        Some(code) => code & 0xff,
        None => {
            #[cfg(unix)]
            {
                use std::os::unix::process::ExitStatusExt;
                256 + output.status.signal().unwrap_or(0)
            }
            #[cfg(not(unix))]
            {
                256
            }
        }
    };

    log::debug!("spawned {program}: status {status}");
    Ok(SpawnResult {
        status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
