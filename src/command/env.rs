//! Built-in command variables
//!
//! `$NAME` in a command line expands through this table first
//! (VELLUM_HOME, FILE, FILETYPE, LINENO, WORD), then through the OS
//! environment. Values are snapshotted before parsing so expansion
//! does not need the live editor during the parse.

use std::collections::HashMap;

/// Values of the built-in variables at expansion time.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    pub home: String,
    pub file: Option<String>,
    pub filetype: String,
    pub lineno: usize,
    pub word: Option<String>,
}

impl EnvSnapshot {
    pub fn expand(&self, name: &str) -> Option<String> {
        match name {
            "VELLUM_HOME" => Some(self.home.clone()),
            "FILE" => self.file.clone(),
            "FILETYPE" => Some(self.filetype.clone()),
            "LINENO" => Some(self.lineno.to_string()),
            "WORD" => self.word.clone(),
            _ => std::env::var(name).ok(),
        }
    }
}

/// Environment entries for spawned children describing the editor
/// state, in addition to the inherited environment.
pub fn child_env(snapshot: &EnvSnapshot) -> Vec<(String, String)> {
    let mut env: HashMap<String, String> = HashMap::new();
    env.insert("VELLUM_HOME".into(), snapshot.home.clone());
    if let Some(file) = &snapshot.file {
        env.insert("FILE".into(), file.clone());
    }
    env.insert("FILETYPE".into(), snapshot.filetype.clone());
    env.insert("LINENO".into(), snapshot.lineno.to_string());
    let mut out: Vec<(String, String)> = env.into_iter().collect();
    out.sort();
    out
}
