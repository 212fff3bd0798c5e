//! The shift-reduce driver over a generated [`ParseTable`] (§4.7, C7).
//!
//! Deliberately small: table generation is this crate's reason for existing
//! (§1), and this driver exists mainly so the table's correctness is
//! testable end-to-end rather than only state-by-state.

use crate::error::ParseError;
use crate::grammar::Grammar;
use crate::symbol::{Lookahead, Symbol};
use crate::table::{Action, ParseTable};

/// One step of the shift-reduce automaton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Shift,
    Reduce(usize),
    Accept(usize),
}

/// Drives a [`ParseTable`] over a stream of terminal indices.
///
/// Holds parallel state and symbol stacks. Reductions don't consume input,
/// so [`Parser::step`] must be called again with the same lookahead after a
/// `Step::Reduce` until it returns `Shift` or `Accept` — [`Parser::run`]
/// does this bookkeeping for callers who just want a yes/no answer.
pub struct Parser<'t> {
    table: &'t ParseTable,
    grammar: &'t Grammar,
    states: Vec<usize>,
    symbols: Vec<Symbol>,
}

impl<'t> Parser<'t> {
    pub fn new(table: &'t ParseTable, grammar: &'t Grammar) -> Self {
        Self {
            table,
            grammar,
            states: vec![table.start_state],
            symbols: Vec::new(),
        }
    }

    pub fn states(&self) -> &[usize] {
        &self.states
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Advances by one action on `lookahead`. On `Reduce`, the lookahead is
    /// not consumed — call again with the same lookahead.
    pub fn step(&mut self, lookahead: Lookahead) -> std::result::Result<Step, ParseError> {
        let state = *self.states.last().expect("state stack is never empty");
        match self.table.action(state, lookahead) {
            Some(Action::Shift(next)) => {
                let Lookahead::Terminal(t) = lookahead else {
                    unreachable!("a shift action is never indexed by eof")
                };
                self.states.push(next);
                self.symbols.push(Symbol::Terminal(t));
                Ok(Step::Shift)
            }
            Some(Action::Reduce(production)) => {
                let prod = self.grammar.production(production);
                let arity = prod.rhs.len();
                let new_len = self.states.len() - arity;
                self.states.truncate(new_len);
                self.symbols.truncate(self.symbols.len() - arity);

                let top_state = *self.states.last().expect("state stack is never empty");
                let target = self
                    .table
                    .goto(top_state, prod.lhs)
                    .expect("a table with no conflicts always has a goto entry here");
                self.states.push(target);
                self.symbols.push(Symbol::Nonterminal(prod.lhs));
                Ok(Step::Reduce(production))
            }
            Some(Action::Accept(production)) => Ok(Step::Accept(production)),
            None => Err(ParseError { state, lookahead }),
        }
    }

    /// Runs to completion over `tokens` (terminal indices), appending an
    /// implicit end-of-input. Returns `Ok(())` on accept.
    pub fn run(&mut self, tokens: impl IntoIterator<Item = usize>) -> std::result::Result<(), ParseError> {
        let mut tokens = tokens.into_iter();
        let mut current = tokens.next().map(Lookahead::Terminal).unwrap_or(Lookahead::Eof);
        loop {
            match self.step(current)? {
                Step::Shift => {
                    current = tokens.next().map(Lookahead::Terminal).unwrap_or(Lookahead::Eof);
                }
                Step::Reduce(_) => {}
                Step::Accept(_) => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::Symbol::{Nonterminal as N, Terminal as T};

    /// S' -> S
    /// S -> ( S ) | x
    fn parens_grammar() -> (Grammar, usize, usize, usize) {
        let mut b = GrammarBuilder::new();
        let start = b.nonterminal("S'");
        let s = b.nonterminal("S");
        let lparen = b.terminal("(");
        let rparen = b.terminal(")");
        let x = b.terminal("x");
        b.production(start, vec![N(s)], "S'->S");
        b.production(s, vec![T(lparen), N(s), T(rparen)], "S->(S)");
        b.production(s, vec![T(x)], "S->x");
        (b.build().unwrap(), lparen, rparen, x)
    }

    #[test]
    fn accepts_well_nested_input() {
        let (grammar, lparen, rparen, x) = parens_grammar();
        let table = Generator::new(&grammar).generate().unwrap();
        let mut parser = Parser::new(&table, &grammar);
        assert!(parser.run([lparen, lparen, x, rparen, rparen]).is_ok());
    }

    #[test]
    fn rejects_unbalanced_input() {
        let (grammar, lparen, _rparen, x) = parens_grammar();
        let table = Generator::new(&grammar).generate().unwrap();
        let mut parser = Parser::new(&table, &grammar);
        assert!(parser.run([lparen, x]).is_err());
    }

    #[test]
    fn rejects_trailing_garbage() {
        let (grammar, _lparen, _rparen, x) = parens_grammar();
        let table = Generator::new(&grammar).generate().unwrap();
        let mut parser = Parser::new(&table, &grammar);
        assert!(parser.run([x, x]).is_err());
    }
}
