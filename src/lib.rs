//! Deterministic LALR(1) action/goto table generation.
//!
//! Given an already-tokenized, indexed, augmented grammar, [`Generator`]
//! computes FIRST sets, the canonical collection of LR(1) item sets merged
//! by LR(0) core (LALR(1), §4.4–§4.5), and emits a [`ParseTable`] that
//! [`Parser`] can drive over a stream of terminal indices. Turning grammar
//! *source text* into a [`Grammar`] — lexing, textual parsing, diagnostics
//! formatting — is out of scope; see the module docs below for what each
//! piece actually owns.

pub mod convergent;
pub mod error;
pub mod first;
pub mod generator;
pub mod grammar;
pub mod item;
pub mod lookahead;
pub mod parser;
pub mod symbol;
pub mod table;

pub use convergent::{ConvergentProcess, Keyed};
pub use error::{GrammarError, ParseError, Result};
pub use first::FirstSets;
pub use generator::{Generator, GeneratorConfig};
pub use grammar::{Grammar, GrammarBuilder, NonterminalInfo, Production};
pub use item::{Item, ItemCore, ItemSet};
pub use lookahead::LookaheadSet;
pub use parser::{Parser, Step};
pub use symbol::{Lookahead, Symbol};
pub use table::{Action, ParseTable};
