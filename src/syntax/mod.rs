//! Syntax highlighting engine
//!
//! A syntax is a named state machine: each state holds an ordered
//! condition list and a default action. Highlighting runs one line at
//! a time, emitting a style id per byte and returning the state that
//! begins the next line (see [`highlight`]). Syntaxes are defined in
//! the editor's command language (see [`loader`]) and finalized into
//! index-addressed state tables.

pub mod bitset;
pub mod highlight;
pub mod loader;
pub mod merge;

use std::collections::HashMap;

pub use self::bitset::Bitset;
pub use self::highlight::LineStateCache;

pub type StateId = usize;

/// Index into the interned emit-name table of a [`SyntaxSet`].
pub type StyleId = u16;

/// Target state plus the style emitted on the way there. A `None`
/// destination is the "return to parent" placeholder, valid only in
/// sub-syntaxes; merging resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub dest: Option<StateId>,
    pub emit: StyleId,
}

#[derive(Debug, Clone)]
pub enum CondKind {
    /// Current byte is in the bitset; consume it.
    Char(Bitset),
    /// Like `Char`, but starts or extends the buffered range.
    CharBuffer(Bitset),
    /// Current byte equals a literal.
    Char1(u8),
    /// Next N bytes equal a literal.
    Str(Vec<u8>),
    StrIcase(Vec<u8>),
    /// Two-byte case-sensitive fast path.
    Str2([u8; 2]),
    /// Buffered range equals a literal.
    Bufis(Vec<u8>),
    BufisIcase(Vec<u8>),
    /// Buffered range is a member of a string list; `keep_buffer`
    /// retains the range after the match.
    InList { list: usize, keep_buffer: bool },
    /// Repaint the previous N bytes; no transition.
    Recolor(usize),
    /// Repaint the buffered range; no transition.
    RecolorBuffer,
    /// Next N bytes equal the heredoc delimiter captured at begin
    /// (N may be zero).
    HeredocEnd(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct Condition {
    pub kind: CondKind,
    pub action: Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultKind {
    /// Consume one byte, emit, transition, clear the buffer.
    Eat,
    /// Transition without consuming; clear the buffer.
    Noeat,
    /// Transition without consuming; keep the buffer.
    NoeatBuffer,
    /// Capture the buffered range as a heredoc delimiter and enter
    /// the merged sub-syntax.
    HeredocBegin,
}

#[derive(Debug, Clone)]
pub struct HeredocState {
    pub delim: Vec<u8>,
    pub start: StateId,
}

#[derive(Debug, Clone)]
pub struct State {
    pub name: String,
    pub emit: StyleId,
    pub conds: Vec<Condition>,
    pub default_kind: DefaultKind,
    pub default_action: Action,
    /// Sub-syntax name for `HeredocBegin` states.
    pub heredoc_subsyntax: Option<String>,
    /// Merged instances keyed by delimiter.
    pub heredoc_states: Vec<HeredocState>,
}

#[derive(Debug, Clone)]
pub struct StringList {
    pub name: String,
    pub strings: Vec<Vec<u8>>,
    pub icase: bool,
}

impl StringList {
    pub fn contains(&self, s: &[u8]) -> bool {
        if self.icase {
            self.strings.iter().any(|m| m.eq_ignore_ascii_case(s))
        } else {
            self.strings.iter().any(|m| m.as_slice() == s)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Syntax {
    pub name: String,
    pub states: Vec<State>,
    pub state_names: HashMap<String, StateId>,
    pub string_lists: Vec<StringList>,
    pub list_names: HashMap<String, usize>,
    pub start: StateId,
}

impl Syntax {
    /// Sub-syntaxes are named with a leading dot and only usable via
    /// heredoc merging.
    pub fn is_subsyntax(&self) -> bool {
        self.name.starts_with('.')
    }

    pub fn find_state(&self, name: &str) -> Option<StateId> {
        self.state_names.get(name).copied()
    }
}

/// A {fg, bg, attrs} triple applied to a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Option<crossterm::style::Color>,
    pub bg: Option<crossterm::style::Color>,
    pub bold: bool,
    pub underline: bool,
    pub reverse: bool,
}

/// All loaded syntaxes plus the interned emit-name table and the
/// style map resolving emit names to terminal styles.
#[derive(Debug, Clone)]
pub struct SyntaxSet {
    pub syntaxes: HashMap<String, Syntax>,
    emit_names: Vec<String>,
    emit_ids: HashMap<String, StyleId>,
    pub styles: HashMap<String, Style>,
    /// Emit name → style name fallbacks set by the `default` command.
    pub style_aliases: HashMap<String, String>,
    merge_counter: u32,
}

impl SyntaxSet {
    pub fn new() -> Self {
        let mut set = SyntaxSet {
            syntaxes: HashMap::new(),
            emit_names: Vec::new(),
            emit_ids: HashMap::new(),
            styles: HashMap::new(),
            style_aliases: HashMap::new(),
            merge_counter: 0,
        };
        // Fixed ids used by the engine itself
        set.intern_emit("default");
        set.intern_emit("comment");
        set.intern_emit("notice");
        set
    }

    pub fn intern_emit(&mut self, name: &str) -> StyleId {
        if let Some(&id) = self.emit_ids.get(name) {
            return id;
        }
        let id = self.emit_names.len() as StyleId;
        self.emit_names.push(name.to_string());
        self.emit_ids.insert(name.to_string(), id);
        id
    }

    pub fn emit_name(&self, id: StyleId) -> &str {
        &self.emit_names[id as usize]
    }

    pub fn lookup_emit(&self, name: &str) -> Option<StyleId> {
        self.emit_ids.get(name).copied()
    }

    pub fn style_for(&self, id: StyleId) -> Option<&Style> {
        let name = self.emit_name(id);
        self.styles
            .get(name)
            .or_else(|| self.style_aliases.get(name).and_then(|base| self.styles.get(base)))
    }

    pub fn find(&self, name: &str) -> Option<&Syntax> {
        self.syntaxes.get(name)
    }

    /// A fresh unique prefix for merged state names.
    pub(crate) fn next_merge_prefix(&mut self) -> String {
        let n = self.merge_counter;
        self.merge_counter += 1;
        format!("m{n}-")
    }
}

impl Default for SyntaxSet {
    fn default() -> Self {
        Self::new()
    }
}
