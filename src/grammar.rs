//! The grammar data model: terminals, nonterminals, and productions.
//!
//! Grammar *source* parsing — turning a textual description into this
//! structure — is out of scope (§1): callers already hand in an indexed,
//! tokenized grammar. What this module does own is validating that
//! structure (§7 `GrammarMalformed`) and building it from loosely-ordered
//! productions (`GrammarBuilder`), since few callers assemble an
//! already-LHS-grouped production list by hand.

use crate::error::{GrammarError, Result};
use crate::symbol::Symbol;
use std::fmt;

/// A production rule `lhs -> rhs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Production {
    pub lhs: usize,
    pub rhs: Vec<Symbol>,
    pub tag: String,
}

impl Production {
    pub fn new(lhs: usize, rhs: Vec<Symbol>, tag: impl Into<String>) -> Self {
        Self {
            lhs,
            rhs,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

/// Metadata the caller supplies for a nonterminal.
#[derive(Debug, Clone)]
pub struct NonterminalInfo {
    pub name: String,
    pub first_production_index: usize,
}

/// An immutable, validated context-free grammar.
///
/// Productions are always stored grouped by LHS, so `productions_of` is a
/// contiguous slice. Nonterminal 0 is the designated (augmented) start.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: Vec<String>,
    nonterminals: Vec<NonterminalInfo>,
    productions: Vec<Production>,
    /// `nonterminal_ranges[n]` is the `[start, end)` range of `productions`
    /// belonging to nonterminal `n`.
    nonterminal_ranges: Vec<(usize, usize)>,
}

impl Grammar {
    pub const START: usize = 0;

    /// Builds a grammar from productions already grouped and sorted by LHS,
    /// validating the invariants from spec §3.
    pub fn new(
        terminals: Vec<String>,
        nonterminals: Vec<NonterminalInfo>,
        productions: Vec<Production>,
    ) -> Result<Self> {
        if productions.is_empty() {
            return Err(GrammarError::EmptyProductions);
        }

        let terminal_count = terminals.len();
        let nonterminal_count = nonterminals.len();

        for (i, prod) in productions.iter().enumerate() {
            if prod.lhs >= nonterminal_count {
                return Err(GrammarError::DanglingSymbol {
                    production: i,
                    symbol: Symbol::Nonterminal(prod.lhs),
                });
            }
            for sym in &prod.rhs {
                let dangling = match sym {
                    Symbol::Terminal(t) => *t >= terminal_count,
                    Symbol::Nonterminal(n) => *n >= nonterminal_count,
                };
                if dangling {
                    return Err(GrammarError::DanglingSymbol {
                        production: i,
                        symbol: *sym,
                    });
                }
            }
        }

        // Productions must already be grouped by LHS: once we've moved past
        // a nonterminal's run, it must never reappear.
        let mut nonterminal_ranges = vec![(0usize, 0usize); nonterminal_count];
        let mut seen_complete = vec![false; nonterminal_count];
        let mut current_lhs: Option<usize> = None;
        let mut group_start = 0usize;

        for (i, prod) in productions.iter().enumerate() {
            match current_lhs {
                Some(lhs) if lhs == prod.lhs => {}
                _ => {
                    if let Some(lhs) = current_lhs {
                        nonterminal_ranges[lhs] = (group_start, i);
                        seen_complete[lhs] = true;
                    }
                    if seen_complete[prod.lhs] {
                        return Err(GrammarError::ProductionsNotGrouped {
                            nonterminal: prod.lhs,
                            production: i,
                        });
                    }
                    current_lhs = Some(prod.lhs);
                    group_start = i;
                }
            }
        }
        if let Some(lhs) = current_lhs {
            nonterminal_ranges[lhs] = (group_start, productions.len());
        }

        for (n, range) in nonterminal_ranges.iter().enumerate() {
            if range.0 == range.1 {
                if n == Self::START {
                    return Err(GrammarError::NoStartProduction);
                }
                return Err(GrammarError::NoProductionsForNonterminal { nonterminal: n });
            }
        }

        Ok(Self {
            terminals,
            nonterminals,
            productions,
            nonterminal_ranges,
        })
    }

    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    pub fn nonterminal_count(&self) -> usize {
        self.nonterminals.len()
    }

    pub fn terminal_name(&self, t: usize) -> &str {
        &self.terminals[t]
    }

    pub fn nonterminal_name(&self, n: usize) -> &str {
        &self.nonterminals[n].name
    }

    pub fn start(&self) -> usize {
        Self::START
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// The contiguous slice of productions whose LHS is `nonterminal`.
    pub fn productions_of(&self, nonterminal: usize) -> &[Production] {
        let (start, end) = self.nonterminal_ranges[nonterminal];
        &self.productions[start..end]
    }

    /// Global production indices for `productions_of(nonterminal)`, paired
    /// with the productions themselves.
    pub fn indexed_productions_of(
        &self,
        nonterminal: usize,
    ) -> impl Iterator<Item = (usize, &Production)> {
        let (start, end) = self.nonterminal_ranges[nonterminal];
        (start..end).map(move |i| (i, &self.productions[i]))
    }
}

/// Accepts productions in any order and assembles a validated [`Grammar`].
///
/// Mirrors the staging step the teacher's grammar construction used
/// (collect, then derive the grouped structure) but groups by LHS index
/// instead of re-deriving nonterminal/terminal sets from character case.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    terminals: Vec<String>,
    nonterminals: Vec<NonterminalInfo>,
    productions: Vec<(usize, Vec<Symbol>, String)>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn terminal(&mut self, name: impl Into<String>) -> usize {
        self.terminals.push(name.into());
        self.terminals.len() - 1
    }

    pub fn nonterminal(&mut self, name: impl Into<String>) -> usize {
        self.nonterminals.push(NonterminalInfo {
            name: name.into(),
            first_production_index: 0,
        });
        self.nonterminals.len() - 1
    }

    pub fn production(&mut self, lhs: usize, rhs: Vec<Symbol>, tag: impl Into<String>) -> &mut Self {
        self.productions.push((lhs, rhs, tag.into()));
        self
    }

    pub fn build(mut self) -> Result<Grammar> {
        self.productions.sort_by_key(|(lhs, ..)| *lhs);

        let mut grouped = Vec::with_capacity(self.productions.len());
        let mut first_production_index = vec![0usize; self.nonterminals.len()];
        let mut last_lhs: Option<usize> = None;
        for (lhs, rhs, tag) in self.productions {
            if last_lhs != Some(lhs) && lhs < first_production_index.len() {
                first_production_index[lhs] = grouped.len();
                last_lhs = Some(lhs);
            }
            grouped.push(Production::new(lhs, rhs, tag));
        }
        for (info, idx) in self.nonterminals.iter_mut().zip(first_production_index) {
            info.first_production_index = idx;
        }

        Grammar::new(self.terminals, self.nonterminals, grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol::{Nonterminal as N, Terminal as T};

    #[test]
    fn builder_groups_out_of_order_productions() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let a = b.nonterminal("A");
        let tok_a = b.terminal("a");
        b.production(a, vec![T(tok_a)], "A->a");
        b.production(s, vec![N(a)], "S->A");

        let grammar = b.build().unwrap();
        assert_eq!(grammar.productions_of(s).len(), 1);
        assert_eq!(grammar.productions_of(a).len(), 1);
    }

    #[test]
    fn rejects_dangling_symbol() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        b.production(s, vec![T(0)], "S->?");
        assert_eq!(
            b.build(),
            Err(GrammarError::DanglingSymbol {
                production: 0,
                symbol: T(0)
            })
        );
    }

    #[test]
    fn rejects_nonterminal_without_productions() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let _unused = b.nonterminal("Unused");
        let tok_a = b.terminal("a");
        b.production(s, vec![T(tok_a)], "S->a");
        assert_eq!(
            b.build(),
            Err(GrammarError::NoProductionsForNonterminal { nonterminal: 1 })
        );
    }

    #[test]
    fn rejects_empty_productions() {
        let b = GrammarBuilder::new();
        assert_eq!(b.build(), Err(GrammarError::EmptyProductions));
    }

    #[test]
    fn rejects_start_without_productions() {
        let mut b = GrammarBuilder::new();
        let _s = b.nonterminal("S");
        let a = b.nonterminal("A");
        let tok_x = b.terminal("x");
        b.production(a, vec![T(tok_x)], "A->x");
        assert_eq!(b.build(), Err(GrammarError::NoStartProduction));
    }
}
