//! Error types for grammar validation, table generation, and parsing.

use crate::symbol::{Lookahead, Symbol};
use crate::table::Action;
use thiserror::Error;

/// Errors that can occur while validating a grammar or generating its table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    EmptyProductions,

    #[error("production {production} references dangling symbol {symbol}")]
    DanglingSymbol { production: usize, symbol: Symbol },

    #[error("nonterminal {nonterminal} has no productions")]
    NoProductionsForNonterminal { nonterminal: usize },

    #[error("start nonterminal has no productions")]
    NoStartProduction,

    #[error(
        "start nonterminal must have exactly one production (augmented grammars start with \
         S' -> S); found {count}"
    )]
    StartNotAugmented { count: usize },

    #[error(
        "productions are not grouped by left-hand side: nonterminal {nonterminal} reappears \
         at production {production} after another nonterminal's group had already started"
    )]
    ProductionsNotGrouped { nonterminal: usize, production: usize },

    #[error(
        "conflict in state {state} on lookahead {lookahead}: existing action {existing:?}, \
         incoming action {incoming:?}"
    )]
    Conflict {
        state: usize,
        lookahead: Lookahead,
        existing: Action,
        incoming: Action,
    },
}

pub type Result<T> = std::result::Result<T, GrammarError>;

/// Raised by the parser driver when no action exists for `(state, lookahead)`.
///
/// The parser's stack remains inspectable after this error (§7): callers can
/// still read `Parser::stack()` to report where recognition failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no action for state {state} on lookahead {lookahead}")]
pub struct ParseError {
    pub state: usize,
    pub lookahead: Lookahead,
}
