//! FIRST-set computation (§4.1, C3).
//!
//! Computed as a [`ConvergentProcess`] fixpoint over nonterminals rather than
//! the teacher's `let mut changed = true; while changed { .. }` scan over
//! every rule on every pass: each nonterminal's FIRST set is recomputed only
//! when something it (conservatively) depends on has actually changed.
//!
//! The eof bit of each nonterminal's [`LookaheadSet`] is overloaded to mean
//! "this nonterminal can derive the empty string" — see `lookahead.rs`.
//! Inside a production's right-hand side, the eof bit is never itself a
//! member of FIRST; it only controls whether scanning continues to the next
//! symbol.

use crate::convergent::{ConvergentProcess, Keyed};
use crate::grammar::Grammar;
use crate::lookahead::LookaheadSet;
use crate::symbol::{Lookahead, Symbol};

struct NonterminalFirst {
    nonterminal: usize,
    set: LookaheadSet,
}

impl Keyed for NonterminalFirst {
    type Key = usize;

    fn key(&self) -> usize {
        self.nonterminal
    }

    fn merge(&mut self, other: Self) -> bool {
        self.set.merge(&other.set)
    }
}

/// FIRST sets for every nonterminal in a grammar, indexed by nonterminal.
#[derive(Debug, Clone)]
pub struct FirstSets {
    sets: Vec<LookaheadSet>,
    terminal_count: usize,
}

impl FirstSets {
    /// Computes FIRST sets to a fixpoint (§4.1).
    #[tracing::instrument(level = "debug", skip(grammar))]
    pub fn compute(grammar: &Grammar) -> Self {
        let terminal_count = grammar.terminal_count();
        let nonterminal_count = grammar.nonterminal_count();

        // reverse_deps[a] lists nonterminals whose FIRST set mentions `a`
        // anywhere in some production's right-hand side. This is a safe
        // over-approximation of the true dependency (which only cares about
        // the nullable prefix) — a few extra, harmless recomputations in
        // exchange for not having to track nullability while building it.
        let mut reverse_deps: Vec<Vec<usize>> = vec![Vec::new(); nonterminal_count];
        for b in 0..nonterminal_count {
            for prod in grammar.productions_of(b) {
                for sym in &prod.rhs {
                    if let Symbol::Nonterminal(a) = sym {
                        reverse_deps[*a].push(b);
                    }
                }
            }
        }

        let mut process: ConvergentProcess<NonterminalFirst> = ConvergentProcess::new();
        for n in 0..nonterminal_count {
            let (idx, found) = process.enqueue(NonterminalFirst {
                nonterminal: n,
                set: LookaheadSet::empty(terminal_count),
            });
            debug_assert!(!found && idx == n, "nonterminal indices must be assigned in order");
        }

        while let Some(idx) = process.next() {
            let n = process.item(idx).nonterminal;
            let mut contribution = LookaheadSet::empty(terminal_count);
            for prod in grammar.productions_of(n) {
                contribution.merge(&sequence_first_from_process(&prod.rhs, &process, terminal_count));
            }

            let mut merged = process.item(idx).set.clone();
            let changed = merged.merge(&contribution);
            if changed {
                process.item_mut(idx).set = merged;
                for &dependent in &reverse_deps[n] {
                    if let Some(dep_idx) = process.index_of(&dependent) {
                        process.requeue(dep_idx);
                    }
                }
                tracing::trace!(nonterminal = n, "FIRST set grew, requeuing dependents");
            }
        }

        let sets = process.into_items().into_iter().map(|nf| nf.set).collect();
        Self { sets, terminal_count }
    }

    pub fn of(&self, nonterminal: usize) -> &LookaheadSet {
        &self.sets[nonterminal]
    }

    pub fn is_nullable(&self, nonterminal: usize) -> bool {
        self.sets[nonterminal].contains(Lookahead::Eof)
    }

    /// FIRST of a symbol sequence, using finalized per-nonterminal sets.
    /// The eof bit of the result means the whole sequence is nullable —
    /// exactly the overload that `generator.rs` relies on when computing
    /// lookahead propagation for `A → α·Bβ, a` items (§4.4).
    pub fn of_sequence(&self, symbols: &[Symbol]) -> LookaheadSet {
        let mut out = LookaheadSet::empty(self.terminal_count);
        let mut all_nullable = true;
        for sym in symbols {
            match sym {
                Symbol::Terminal(t) => {
                    out.insert(Lookahead::Terminal(*t));
                    all_nullable = false;
                    break;
                }
                Symbol::Nonterminal(n) => {
                    for la in self.sets[*n].iter() {
                        if let Lookahead::Terminal(t) = la {
                            out.insert(Lookahead::Terminal(t));
                        }
                    }
                    if !self.is_nullable(*n) {
                        all_nullable = false;
                        break;
                    }
                }
            }
        }
        if all_nullable {
            out.insert(Lookahead::Eof);
        }
        out
    }
}

fn sequence_first_from_process(
    symbols: &[Symbol],
    process: &ConvergentProcess<NonterminalFirst>,
    terminal_count: usize,
) -> LookaheadSet {
    let mut out = LookaheadSet::empty(terminal_count);
    let mut all_nullable = true;
    for sym in symbols {
        match sym {
            Symbol::Terminal(t) => {
                out.insert(Lookahead::Terminal(*t));
                all_nullable = false;
                break;
            }
            Symbol::Nonterminal(n) => {
                let idx = process.index_of(n).expect("nonterminal indices assigned 0..count in order");
                let set = &process.item(idx).set;
                for la in set.iter() {
                    if let Lookahead::Terminal(t) = la {
                        out.insert(Lookahead::Terminal(t));
                    }
                }
                if !set.contains(Lookahead::Eof) {
                    all_nullable = false;
                    break;
                }
            }
        }
    }
    if all_nullable {
        out.insert(Lookahead::Eof);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::Symbol::{Nonterminal as N, Terminal as T};

    /// S -> A b | c
    /// A -> a | ε
    #[test]
    fn nullable_nonterminal_propagates_into_caller_first() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let a = b.nonterminal("A");
        let tok_a = b.terminal("a");
        let tok_b = b.terminal("b");
        let tok_c = b.terminal("c");
        b.production(s, vec![N(a), T(tok_b)], "S->Ab");
        b.production(s, vec![T(tok_c)], "S->c");
        b.production(a, vec![T(tok_a)], "A->a");
        b.production(a, vec![], "A->eps");
        let grammar = b.build().unwrap();

        let first = FirstSets::compute(&grammar);
        assert!(first.is_nullable(a));
        assert!(!first.is_nullable(s));
        assert!(first.of(s).contains(Lookahead::Terminal(tok_a)));
        assert!(first.of(s).contains(Lookahead::Terminal(tok_b)));
        assert!(first.of(s).contains(Lookahead::Terminal(tok_c)));
    }

    /// Mutually-recursive nonterminals must still converge.
    /// S -> A
    /// A -> B x | y
    /// B -> A z | ε
    #[test]
    fn mutual_recursion_converges() {
        let mut b = GrammarBuilder::new();
        let s = b.nonterminal("S");
        let a = b.nonterminal("A");
        let bb = b.nonterminal("B");
        let tok_x = b.terminal("x");
        let tok_y = b.terminal("y");
        let tok_z = b.terminal("z");
        b.production(s, vec![N(a)], "S->A");
        b.production(a, vec![N(bb), T(tok_x)], "A->Bx");
        b.production(a, vec![T(tok_y)], "A->y");
        b.production(bb, vec![N(a), T(tok_z)], "B->Az");
        b.production(bb, vec![], "B->eps");
        let grammar = b.build().unwrap();

        let first = FirstSets::compute(&grammar);
        assert!(first.is_nullable(bb));
        assert!(!first.is_nullable(a));
        assert!(!first.is_nullable(s));
        assert!(first.of(s).contains(Lookahead::Terminal(tok_x)));
        assert!(first.of(s).contains(Lookahead::Terminal(tok_y)));
        assert!(first.of(a).contains(Lookahead::Terminal(tok_x)));
        assert!(first.of(a).contains(Lookahead::Terminal(tok_y)));
    }

    #[test]
    fn of_sequence_nullable_prefix() {
        let mut b = GrammarBuilder::new();
        let a = b.nonterminal("A");
        let tok_x = b.terminal("x");
        b.production(a, vec![], "A->eps");
        let grammar = b.build().unwrap();
        let first = FirstSets::compute(&grammar);

        let seq = first.of_sequence(&[N(a), T(tok_x)]);
        assert!(seq.contains(Lookahead::Terminal(tok_x)));
        assert!(!seq.contains(Lookahead::Eof));

        let empty_seq = first.of_sequence(&[]);
        assert!(empty_seq.contains(Lookahead::Eof));
    }
}
