//! Macro recording and replay
//!
//! The dispatcher pushes each executed command into the recorder
//! before argument parsing mutates the argv; typed characters are
//! coalesced into a single `insert -m` per run. Replay just executes
//! the recorded lines, aborting on the first error.

use super::parse::escape_arg;

#[derive(Debug, Clone, Default)]
pub struct MacroRecorder {
    recording: bool,
    commands: Vec<String>,
    prev_macro: Vec<String>,
    insert_buffer: String,
}

impl MacroRecorder {
    pub fn new() -> Self {
        MacroRecorder::default()
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Returns false when recording is already active.
    pub fn start(&mut self) -> bool {
        if self.recording {
            return false;
        }
        self.recording = true;
        self.commands.clear();
        self.insert_buffer.clear();
        true
    }

    /// Returns false when there is nothing to stop.
    pub fn stop(&mut self) -> bool {
        if !self.recording {
            return false;
        }
        self.flush_insert();
        self.recording = false;
        self.prev_macro = std::mem::take(&mut self.commands);
        true
    }

    pub fn toggle(&mut self) -> bool {
        if self.recording {
            self.stop()
        } else {
            self.start()
        }
    }

    /// Discard the current recording, keeping the previous macro.
    pub fn cancel(&mut self) -> bool {
        if !self.recording {
            return false;
        }
        self.recording = false;
        self.commands.clear();
        self.insert_buffer.clear();
        true
    }

    fn flush_insert(&mut self) {
        if !self.insert_buffer.is_empty() {
            let text = std::mem::take(&mut self.insert_buffer);
            self.commands.push(format!("insert -m {}", escape_arg(&text)));
        }
    }

    pub fn record_command(&mut self, name: &str, args: &[String]) {
        if !self.recording {
            return;
        }
        self.flush_insert();
        let mut line = name.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&escape_arg(arg));
        }
        self.commands.push(line);
    }

    /// Record an already-formatted command line (cached bindings).
    pub fn record_line(&mut self, line: &str) {
        if !self.recording {
            return;
        }
        self.flush_insert();
        self.commands.push(line.to_string());
    }

    pub fn record_insert_char(&mut self, ch: char) {
        if self.recording {
            self.insert_buffer.push(ch);
        }
    }

    pub fn record_insert_text(&mut self, text: &str) {
        if self.recording {
            // Pasted text becomes its own insert command
            self.flush_insert();
            self.commands
                .push(format!("insert -m {}", escape_arg(text)));
        }
    }

    /// The last completed macro, one command per line.
    pub fn previous(&self) -> &[String] {
        &self.prev_macro
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_commands_and_chars() {
        let mut m = MacroRecorder::new();
        assert!(m.start());
        assert!(!m.start());

        m.record_insert_char('h');
        m.record_insert_char('i');
        m.record_command("down", &[]);
        m.record_insert_char('!');
        assert!(m.stop());

        assert_eq!(
            m.previous(),
            &["insert -m hi", "down", "insert -m '!'"]
        );
    }

    #[test]
    fn test_record_command_args_escaped() {
        let mut m = MacroRecorder::new();
        m.start();
        m.record_command("replace", &["a b".to_string(), "c".to_string()]);
        m.stop();
        assert_eq!(m.previous(), &["replace 'a b' c"]);
    }

    #[test]
    fn test_cancel_keeps_previous() {
        let mut m = MacroRecorder::new();
        m.start();
        m.record_command("undo", &[]);
        m.stop();
        assert_eq!(m.previous().len(), 1);

        m.start();
        m.record_command("redo", &[]);
        assert!(m.cancel());
        assert!(!m.is_recording());
        assert_eq!(m.previous(), &["undo"]);
    }

    #[test]
    fn test_not_recording_is_noop() {
        let mut m = MacroRecorder::new();
        m.record_insert_char('x');
        m.record_command("undo", &[]);
        assert!(!m.stop());
        assert!(m.previous().is_empty());
    }

    #[test]
    fn test_paste_recorded_separately() {
        let mut m = MacroRecorder::new();
        m.start();
        m.record_insert_char('a');
        m.record_insert_text("pasted");
        m.stop();
        assert_eq!(m.previous(), &["insert -m a", "insert -m pasted"]);
    }
}
