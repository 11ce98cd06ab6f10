//! Building syntaxes from definition commands
//!
//! Syntax files are ordinary command scripts (`syntax`, `state`,
//! `char`, `str`, `eat`, …). While a definition is open the commands
//! feed a [`SyntaxLoader`]; destinations are recorded by name and
//! resolved when the definition is finalized, so forward references
//! work. The special destination `this` is the state being defined,
//! and `END` is the sub-syntax return placeholder.

use super::{
    Action, Bitset, CondKind, Condition, DefaultKind, State, StateId, StringList, Syntax,
    SyntaxSet,
};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefSlot {
    Cond(usize),
    Default,
}

#[derive(Debug)]
struct PendingRef {
    state: StateId,
    slot: RefSlot,
    dest: String,
    emit: Option<String>,
}

#[derive(Debug)]
pub struct SyntaxLoader {
    name: String,
    states: Vec<State>,
    state_names: HashMap<String, StateId>,
    string_lists: Vec<StringList>,
    list_names: HashMap<String, usize>,
    default_set: Vec<bool>,
    refs: Vec<PendingRef>,
    current: Option<StateId>,
}

impl SyntaxLoader {
    pub fn begin(name: &str) -> Self {
        SyntaxLoader {
            name: name.to_string(),
            states: Vec::new(),
            state_names: HashMap::new(),
            string_lists: Vec::new(),
            list_names: HashMap::new(),
            default_set: Vec::new(),
            refs: Vec::new(),
            current: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn is_subsyntax(&self) -> bool {
        self.name.starts_with('.')
    }

    fn check_current(&self) -> Result<StateId, String> {
        match self.current {
            Some(id) => Ok(id),
            None => Err("No state is being defined".to_string()),
        }
    }

    pub fn add_state(
        &mut self,
        set: &mut SyntaxSet,
        name: &str,
        emit: Option<&str>,
    ) -> Result<(), String> {
        if let Some(open) = self.current {
            if !self.default_set[open] {
                return Err(format!(
                    "State {} has no default action",
                    self.states[open].name
                ));
            }
        }
        if self.state_names.contains_key(name) {
            return Err(format!("State {name} already defined"));
        }
        if name == "this" || name == "END" {
            return Err(format!("{name} is a reserved state name"));
        }

        let id = self.states.len();
        let emit_id = set.intern_emit(emit.unwrap_or(name));
        self.states.push(State {
            name: name.to_string(),
            emit: emit_id,
            conds: Vec::new(),
            default_kind: DefaultKind::Eat,
            default_action: Action { dest: None, emit: emit_id },
            heredoc_subsyntax: None,
            heredoc_states: Vec::new(),
        });
        self.default_set.push(false);
        self.state_names.insert(name.to_string(), id);
        self.current = Some(id);
        Ok(())
    }

    fn add_cond(&mut self, kind: CondKind, dest: &str, emit: Option<&str>) -> Result<(), String> {
        let state = self.check_current()?;
        let ci = self.states[state].conds.len();
        self.states[state].conds.push(Condition {
            kind,
            action: Action { dest: None, emit: 0 },
        });
        self.refs.push(PendingRef {
            state,
            slot: RefSlot::Cond(ci),
            dest: dest.to_string(),
            emit: emit.map(str::to_string),
        });
        Ok(())
    }

    pub fn add_char(
        &mut self,
        chars: &[u8],
        buffer: bool,
        negate: bool,
        dest: &str,
        emit: Option<&str>,
    ) -> Result<(), String> {
        let mut bits = Bitset::parse(chars);
        if negate {
            bits.invert();
        }
        let kind = if buffer {
            CondKind::CharBuffer(bits)
        } else if let Some(b) = bits.only_member() {
            CondKind::Char1(b)
        } else {
            CondKind::Char(bits)
        };
        self.add_cond(kind, dest, emit)
    }

    pub fn add_str(
        &mut self,
        s: &[u8],
        icase: bool,
        dest: &str,
        emit: Option<&str>,
    ) -> Result<(), String> {
        if s.is_empty() {
            return Err("Empty string".to_string());
        }
        let kind = if icase {
            CondKind::StrIcase(s.to_vec())
        } else if s.len() == 1 {
            CondKind::Char1(s[0])
        } else if s.len() == 2 {
            CondKind::Str2([s[0], s[1]])
        } else {
            CondKind::Str(s.to_vec())
        };
        self.add_cond(kind, dest, emit)
    }

    pub fn add_bufis(
        &mut self,
        s: &[u8],
        icase: bool,
        dest: &str,
        emit: Option<&str>,
    ) -> Result<(), String> {
        let kind = if icase {
            CondKind::BufisIcase(s.to_vec())
        } else {
            CondKind::Bufis(s.to_vec())
        };
        self.add_cond(kind, dest, emit)
    }

    pub fn add_inlist(
        &mut self,
        list: &str,
        keep_buffer: bool,
        dest: &str,
        emit: Option<&str>,
    ) -> Result<(), String> {
        let idx = *self
            .list_names
            .get(list)
            .ok_or_else(|| format!("No such list: {list}"))?;
        // A list match with no explicit emit colors as the list name
        let emit = emit.map(str::to_string).or_else(|| Some(list.to_string()));
        self.add_cond(
            CondKind::InList {
                list: idx,
                keep_buffer,
            },
            dest,
            emit.as_deref(),
        )
    }

    pub fn add_recolor(
        &mut self,
        set: &mut SyntaxSet,
        emit: &str,
        len: Option<usize>,
    ) -> Result<(), String> {
        let state = self.check_current()?;
        let kind = match len {
            Some(n) => CondKind::Recolor(n),
            None => CondKind::RecolorBuffer,
        };
        let emit_id = set.intern_emit(emit);
        self.states[state].conds.push(Condition {
            kind,
            action: Action {
                dest: None,
                emit: emit_id,
            },
        });
        Ok(())
    }

    pub fn add_heredocend(&mut self, dest: &str, emit: Option<&str>) -> Result<(), String> {
        // The delimiter is substituted when the sub-syntax is merged
        self.add_cond(CondKind::HeredocEnd(Vec::new()), dest, emit)
    }

    fn set_default(
        &mut self,
        kind: DefaultKind,
        dest: &str,
        emit: Option<&str>,
    ) -> Result<(), String> {
        let state = self.check_current()?;
        if self.default_set[state] {
            return Err(format!(
                "State {} already has a default action",
                self.states[state].name
            ));
        }
        self.states[state].default_kind = kind;
        self.default_set[state] = true;
        self.refs.push(PendingRef {
            state,
            slot: RefSlot::Default,
            dest: dest.to_string(),
            emit: emit.map(str::to_string),
        });
        Ok(())
    }

    pub fn add_eat(&mut self, dest: &str, emit: Option<&str>) -> Result<(), String> {
        self.set_default(DefaultKind::Eat, dest, emit)
    }

    pub fn add_noeat(&mut self, dest: &str, keep_buffer: bool) -> Result<(), String> {
        let kind = if keep_buffer {
            DefaultKind::NoeatBuffer
        } else {
            DefaultKind::Noeat
        };
        self.set_default(kind, dest, None)
    }

    pub fn add_heredocbegin(&mut self, subsyntax: &str, ret: &str) -> Result<(), String> {
        if !subsyntax.starts_with('.') {
            return Err(format!("Sub-syntax name must begin with '.': {subsyntax}"));
        }
        let state = self.check_current()?;
        self.states[state].heredoc_subsyntax = Some(subsyntax.to_string());
        self.set_default(DefaultKind::HeredocBegin, ret, None)
    }

    pub fn add_list(&mut self, name: &str, strings: &[String], icase: bool) -> Result<(), String> {
        if self.list_names.contains_key(name) {
            return Err(format!("List {name} already defined"));
        }
        self.list_names.insert(name.to_string(), self.string_lists.len());
        self.string_lists.push(StringList {
            name: name.to_string(),
            strings: strings.iter().map(|s| s.as_bytes().to_vec()).collect(),
            icase,
        });
        Ok(())
    }

    /// Resolve all destinations and produce the finished syntax.
    /// The first defined state is the start state.
    pub fn finish(mut self, set: &mut SyntaxSet) -> Result<Syntax, String> {
        if self.states.is_empty() {
            return Err(format!("Syntax {} has no states", self.name));
        }
        if let Some(open) = self.current {
            if !self.default_set[open] {
                return Err(format!(
                    "State {} has no default action",
                    self.states[open].name
                ));
            }
        }

        let is_sub = self.is_subsyntax();
        for r in std::mem::take(&mut self.refs) {
            let dest: Option<StateId> = match r.dest.as_str() {
                "this" => Some(r.state),
                "END" => {
                    if !is_sub {
                        return Err(format!(
                            "END destination is only valid in sub-syntaxes ({})",
                            self.name
                        ));
                    }
                    None
                }
                name => Some(
                    *self
                        .state_names
                        .get(name)
                        .ok_or_else(|| format!("No such state: {name}"))?,
                ),
            };

            // Emit defaults to the destination state's emit
            let emit = match &r.emit {
                Some(name) => set.intern_emit(name),
                None => match dest {
                    Some(d) => self.states[d].emit,
                    None => self.states[r.state].emit,
                },
            };

            let st = &mut self.states[r.state];
            let action = Action { dest, emit };
            match r.slot {
                RefSlot::Cond(ci) => st.conds[ci].action = action,
                RefSlot::Default => st.default_action = action,
            }
        }

        Ok(Syntax {
            name: self.name,
            states: self.states,
            state_names: self.state_names,
            string_lists: self.string_lists,
            list_names: self.list_names,
            start: 0,
        })
    }
}
