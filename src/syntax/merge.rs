//! Heredoc sub-syntax merging
//!
//! When a `heredocbegin` state captures a delimiter, the sub-syntax
//! is deep-copied into the parent syntax: state names get a unique
//! prefix, destinations are rewritten to the copied states, the
//! delimiter is substituted into every `heredocend` condition, and
//! unresolved "return" destinations are tied to the parent state's
//! default destination. The copy happens once per unique delimiter.

use super::{CondKind, StateId, Syntax};

pub fn merge_syntax(
    parent: &mut Syntax,
    sub: &Syntax,
    return_state: Option<StateId>,
    delim: &[u8],
    prefix: &str,
) -> StateId {
    let state_base = parent.states.len();
    let list_base = parent.string_lists.len();

    for list in &sub.string_lists {
        let mut copy = list.clone();
        copy.name = format!("{prefix}{}", copy.name);
        parent.list_names.insert(copy.name.clone(), parent.string_lists.len());
        parent.string_lists.push(copy);
    }

    for st in &sub.states {
        let mut copy = st.clone();
        copy.name = format!("{prefix}{}", copy.name);
        copy.heredoc_states = Vec::new();

        for cond in &mut copy.conds {
            cond.action.dest = match cond.action.dest {
                Some(d) => Some(state_base + d),
                None => return_state,
            };
            match &mut cond.kind {
                CondKind::HeredocEnd(d) => *d = delim.to_vec(),
                CondKind::InList { list, .. } => *list += list_base,
                _ => {}
            }
        }

        copy.default_action.dest = match copy.default_action.dest {
            Some(d) => Some(state_base + d),
            None => return_state,
        };

        parent.state_names.insert(copy.name.clone(), parent.states.len());
        parent.states.push(copy);
    }

    state_base + sub.start
}
