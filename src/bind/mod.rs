//! Key codes and key bindings
//!
//! A [`KeyCode`] is a key plus modifier bits. The textual forms
//! (`C-`/`M-`/`S-` prefixes, `^X` caret shorthand, special key
//! names) parse and render losslessly, so binding dumps round-trip.

use crate::command::cache::CachedCommand;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    F(u8),
    /// Bracketed or detected paste marker; the payload is delivered
    /// out of band.
    Paste,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCode {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub key: Key,
}

impl KeyCode {
    pub fn plain(key: Key) -> Self {
        KeyCode {
            ctrl: false,
            meta: false,
            shift: false,
            key,
        }
    }

    pub fn ctrl(key: Key) -> Self {
        KeyCode {
            ctrl: true,
            ..KeyCode::plain(key)
        }
    }

    /// A plain Unicode character suitable for text insertion.
    pub fn insertable_char(&self) -> Option<char> {
        if self.ctrl || self.meta || self.shift {
            return None;
        }
        match self.key {
            Key::Char(c) => Some(c),
            _ => None,
        }
    }
}

const SPECIAL_NAMES: &[(&str, Key)] = &[
    ("backspace", Key::Backspace),
    ("delete", Key::Delete),
    ("down", Key::Down),
    ("end", Key::End),
    ("enter", Key::Enter),
    ("escape", Key::Escape),
    ("home", Key::Home),
    ("insert", Key::Insert),
    ("left", Key::Left),
    ("paste", Key::Paste),
    ("pgdown", Key::PageDown),
    ("pgup", Key::PageUp),
    ("right", Key::Right),
    ("space", Key::Char(' ')),
    ("tab", Key::Tab),
    ("up", Key::Up),
];

fn key_name(key: Key) -> Option<&'static str> {
    SPECIAL_NAMES
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(name, _)| *name)
}

/// Parse the textual form of a key: modifier prefixes (`C-`, `M-`,
/// `S-`), then a special name, an `F1`..`F12` key, a `^X` caret
/// combination, or a single character.
pub fn parse_key(mut s: &str) -> Option<KeyCode> {
    let mut ctrl = false;
    let mut meta = false;
    let mut shift = false;

    loop {
        if let Some(rest) = s.strip_prefix("C-") {
            if ctrl {
                return None;
            }
            ctrl = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix("M-") {
            if meta {
                return None;
            }
            meta = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix("S-") {
            if shift {
                return None;
            }
            shift = true;
            s = rest;
        } else {
            break;
        }
    }

    let mut chars = s.chars();
    let key = match (chars.next()?, chars.as_str()) {
        (c, "") => {
            // Single character, including '-' itself
            Key::Char(c)
        }
        ('^', rest) if rest.chars().count() == 1 => {
            if ctrl {
                return None;
            }
            ctrl = true;
            Key::Char(rest.chars().next().expect("checked length"))
        }
        ('F', rest) | ('f', rest) if rest.chars().all(|c| c.is_ascii_digit()) => {
            let n: u8 = rest.parse().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            Key::F(n)
        }
        _ => {
            let lower = s.to_ascii_lowercase();
            SPECIAL_NAMES
                .iter()
                .find(|(name, _)| *name == lower)
                .map(|(_, k)| *k)?
        }
    };

    Some(KeyCode {
        ctrl,
        meta,
        shift,
        key,
    })
}

/// The canonical textual form; `parse_key(render_key(k)) == k`.
pub fn render_key(k: KeyCode) -> String {
    let mut out = String::new();
    if k.ctrl {
        out.push_str("C-");
    }
    if k.meta {
        out.push_str("M-");
    }
    if k.shift {
        out.push_str("S-");
    }
    match k.key {
        Key::Char(c) => match key_name(k.key) {
            Some(name) => out.push_str(name),
            None => out.push(c),
        },
        Key::F(n) => {
            out.push('F');
            out.push_str(&n.to_string());
        }
        key => out.push_str(key_name(key).expect("all special keys are named")),
    }
    out
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_key(*self))
    }
}

/// What a key is bound to: a pre-parsed command, or the raw source
/// string when the command resists caching (aliases, variables,
/// multiple statements).
#[derive(Debug, Clone)]
pub enum Binding {
    Cached(CachedCommand),
    Raw(String),
}

impl Binding {
    pub fn text(&self) -> &str {
        match self {
            Binding::Cached(c) => &c.text,
            Binding::Raw(s) => s,
        }
    }
}

/// Key → binding table of one mode.
#[derive(Debug, Clone, Default)]
pub struct BindingMap {
    map: HashMap<KeyCode, Binding>,
}

impl BindingMap {
    pub fn new() -> Self {
        BindingMap::default()
    }

    pub fn insert(&mut self, key: KeyCode, binding: Binding) {
        self.map.insert(key, binding);
    }

    pub fn remove(&mut self, key: KeyCode) -> bool {
        self.map.remove(&key).is_some()
    }

    pub fn lookup(&self, key: KeyCode) -> Option<&Binding> {
        self.map.get(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// `(key, command)` pairs sorted by rendered key, for dumps.
    pub fn iter_sorted(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .map
            .iter()
            .map(|(k, b)| (render_key(*k), b.text().to_string()))
            .collect();
        entries.sort();
        entries
    }
}
