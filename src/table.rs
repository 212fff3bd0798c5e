//! The emitted parse table: `Action` per `(state, terminal ∪ eof)` and
//! `goto` per `(state, nonterminal)` (§4.6, C6).
//!
//! `ParseTable` stores these as dense, row-major arrays rather than the
//! teacher's per-state `HashMap`s: the state/terminal/nonterminal spaces are
//! all known and fixed once generation finishes, so a dense table is both
//! simpler and avoids a hash lookup on every parser step.

use crate::error::{GrammarError, Result};
use crate::symbol::Lookahead;
use std::fmt;

/// A single table cell: shift, reduce, or accept (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Shift the current token and move to the given state.
    Shift(usize),
    /// Reduce by the given production index.
    Reduce(usize),
    /// Accept: recognition of the given start production is complete.
    Accept(usize),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(s) => write!(f, "shift {s}"),
            Action::Reduce(p) => write!(f, "reduce {p}"),
            Action::Accept(p) => write!(f, "accept {p}"),
        }
    }
}

/// The generated LALR(1) action/goto table.
///
/// Owns its storage independently of the generator that built it (§3
/// "ownership & lifecycle"): the generator's arena may be freed once
/// `Generator::generate` returns a `ParseTable`.
#[derive(Debug, Clone)]
pub struct ParseTable {
    state_count: usize,
    terminal_count: usize,
    nonterminal_count: usize,
    /// `actions[state * (terminal_count + 1) + lookahead_bit]`, where
    /// `lookahead_bit` 0 is eof and `t + 1` is terminal `t` (matching
    /// `LookaheadSet`'s bit layout).
    actions: Vec<Option<Action>>,
    /// `goto[state * nonterminal_count + nonterminal]`.
    goto: Vec<Option<usize>>,
    pub start_state: usize,
}

impl ParseTable {
    pub(crate) fn new(
        state_count: usize,
        terminal_count: usize,
        nonterminal_count: usize,
        start_state: usize,
    ) -> Self {
        Self {
            state_count,
            terminal_count,
            nonterminal_count,
            actions: vec![None; state_count * (terminal_count + 1)],
            goto: vec![None; state_count * nonterminal_count],
            start_state,
        }
    }

    fn lookahead_bit(la: Lookahead) -> usize {
        match la {
            Lookahead::Eof => 0,
            Lookahead::Terminal(t) => t + 1,
        }
    }

    fn action_index(&self, state: usize, la: Lookahead) -> usize {
        state * (self.terminal_count + 1) + Self::lookahead_bit(la)
    }

    /// Records `action` for `(state, lookahead)`. Errs with
    /// [`GrammarError::Conflict`] if a different action is already present —
    /// a grammar is not LALR(1) if this ever fires (§4.5.4, §4.6).
    pub(crate) fn put_action(&mut self, state: usize, lookahead: Lookahead, action: Action) -> Result<()> {
        let idx = self.action_index(state, lookahead);
        match self.actions[idx] {
            Some(existing) if existing != action => Err(GrammarError::Conflict {
                state,
                lookahead,
                existing,
                incoming: action,
            }),
            _ => {
                self.actions[idx] = Some(action);
                Ok(())
            }
        }
    }

    pub(crate) fn put_goto(&mut self, state: usize, nonterminal: usize, target: usize) {
        self.goto[state * self.nonterminal_count + nonterminal] = Some(target);
    }

    pub fn action(&self, state: usize, lookahead: Lookahead) -> Option<Action> {
        self.actions[self.action_index(state, lookahead)]
    }

    pub fn goto(&self, state: usize, nonterminal: usize) -> Option<usize> {
        self.goto[state * self.nonterminal_count + nonterminal]
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminal_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_read_action() {
        let mut t = ParseTable::new(2, 2, 1, 0);
        t.put_action(0, Lookahead::Terminal(0), Action::Shift(1)).unwrap();
        assert_eq!(t.action(0, Lookahead::Terminal(0)), Some(Action::Shift(1)));
        assert_eq!(t.action(0, Lookahead::Eof), None);
    }

    #[test]
    fn repeated_identical_action_is_not_a_conflict() {
        let mut t = ParseTable::new(1, 1, 1, 0);
        t.put_action(0, Lookahead::Eof, Action::Accept(0)).unwrap();
        assert!(t.put_action(0, Lookahead::Eof, Action::Accept(0)).is_ok());
    }

    #[test]
    fn conflicting_actions_error() {
        let mut t = ParseTable::new(1, 1, 1, 0);
        t.put_action(0, Lookahead::Terminal(0), Action::Shift(1)).unwrap();
        let err = t.put_action(0, Lookahead::Terminal(0), Action::Reduce(0)).unwrap_err();
        assert_eq!(
            err,
            GrammarError::Conflict {
                state: 0,
                lookahead: Lookahead::Terminal(0),
                existing: Action::Shift(1),
                incoming: Action::Reduce(0),
            }
        );
    }

    #[test]
    fn goto_roundtrip() {
        let mut t = ParseTable::new(3, 1, 2, 0);
        t.put_goto(0, 1, 2);
        assert_eq!(t.goto(0, 1), Some(2));
        assert_eq!(t.goto(0, 0), None);
    }
}
