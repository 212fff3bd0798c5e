//! The LALR(1) table generator: CLOSURE, GOTO, family construction with
//! core-merging, and table emission (§4.4–§4.6, C5).
//!
//! Family construction is a single [`ConvergentProcess<ItemSet>`]. There is
//! no separate "re-closure after merge" step: when a merge widens an
//! existing state's lookaheads, `ConvergentProcess::enqueue` requeues that
//! state automatically, and reprocessing it recomputes GOTO with the wider
//! lookaheads — which is exactly re-closure, just falling out of the
//! worklist mechanics instead of being hand-written (§9).

use crate::convergent::ConvergentProcess;
use crate::error::{GrammarError, Result};
use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::item::{Item, ItemSet};
use crate::symbol::{Lookahead, Symbol};
use crate::table::{Action, ParseTable};
use bumpalo::Bump;
use std::collections::HashMap;

/// Tunable behavior for a single generation run (§7b).
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Emit a `tracing` event for every CLOSURE expansion step. Off by
    /// default since it is one event per item per closure call — useful
    /// when diagnosing a conflict, noisy otherwise.
    pub trace_closure: bool,
}

/// Builds a [`ParseTable`] from a [`Grammar`].
///
/// Holds a `bumpalo::Bump` arena (§5) for the scratch buffers used while
/// expanding a state's outgoing transitions; the arena is reset between
/// states rather than freeing and reallocating a `Vec` per state. The
/// family of item sets itself lives in ordinary heap-allocated storage
/// (`ConvergentProcess`'s `Vec`), since it must outlive any single arena
/// generation and grows incrementally via merge-in-place.
pub struct Generator<'g> {
    grammar: &'g Grammar,
    first: FirstSets,
    arena: Bump,
    config: GeneratorConfig,
}

impl<'g> Generator<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        Self::with_config(grammar, GeneratorConfig::default())
    }

    pub fn with_config(grammar: &'g Grammar, config: GeneratorConfig) -> Self {
        let first = FirstSets::compute(grammar);
        Self {
            grammar,
            first,
            arena: Bump::new(),
            config,
        }
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first
    }

    fn start_production(&self) -> Result<usize> {
        let start = self.grammar.start();
        let productions = self.grammar.productions_of(start);
        if productions.len() != 1 {
            return Err(GrammarError::StartNotAugmented { count: productions.len() });
        }
        let (index, _) = self
            .grammar
            .indexed_productions_of(start)
            .next()
            .expect("checked above that exactly one production exists");
        Ok(index)
    }

    /// The closure of a kernel item set (§4.4): repeatedly adds, for every
    /// item `A → α·Bβ, a`, every production `B → ·γ` with lookahead
    /// `FIRST(βa)`.
    #[tracing::instrument(level = "trace", skip(self, kernel))]
    fn closure(&self, kernel: ItemSet) -> ItemSet {
        let mut process: ConvergentProcess<Item> = ConvergentProcess::new();
        for item in kernel.into_iter_items() {
            process.enqueue(item);
        }

        while let Some(idx) = process.next() {
            let item = process.item(idx).clone();
            let Some(Symbol::Nonterminal(n)) = item.symbol_at_dot(self.grammar) else {
                continue;
            };

            let beta = item.symbols_after_dot(self.grammar);
            let mut lookaheads = self.first.of_sequence(beta);
            // `of_sequence`'s eof bit means "β is nullable" here, not "eof is
            // a valid lookahead" — it must be swapped for the item's own
            // (genuine) lookahead before use, per the overload documented
            // in `lookahead.rs`.
            if lookaheads.remove(Lookahead::Eof) {
                lookaheads.merge(&item.lookahead);
            }

            for (prod_index, _) in self.grammar.indexed_productions_of(n) {
                let (_, found) = process.enqueue(Item::new(prod_index, 0, lookaheads.clone()));
                if self.config.trace_closure {
                    tracing::trace!(production = prod_index, merged_existing = found, "closure expansion");
                }
            }
        }

        process.into_items().into_iter().collect()
    }

    /// GOTO(I, X) (§4.4): the closure of every item in `I` with the dot
    /// advanced past `symbol`.
    fn goto(&self, item_set: &ItemSet, symbol: Symbol) -> ItemSet {
        let mut kernel = ItemSet::new();
        for item in item_set.iter() {
            if item.symbol_at_dot(self.grammar) == Some(symbol) {
                if let Some(shifted) = item.shift(self.grammar) {
                    kernel.insert(shifted);
                }
            }
        }
        if kernel.is_empty() {
            return kernel;
        }
        self.closure(kernel)
    }

    fn distinct_symbols_after_dot(&self, item_set: &ItemSet) -> bumpalo::collections::Vec<'_, Symbol> {
        let mut symbols = bumpalo::collections::Vec::new_in(&self.arena);
        for item in item_set.iter() {
            if let Some(sym) = item.symbol_at_dot(self.grammar) {
                if !symbols.contains(&sym) {
                    symbols.push(sym);
                }
            }
        }
        symbols
    }

    /// Builds the canonical LALR(1) family of item sets: one state per
    /// distinct LR(0) core, lookaheads merged across every LR(1) item set
    /// sharing that core (§4.4, §4.5.5).
    #[tracing::instrument(level = "info", skip(self))]
    fn build_family(&mut self, start_production: usize) -> (ConvergentProcess<ItemSet>, HashMap<(usize, Symbol), usize>) {
        let mut family: ConvergentProcess<ItemSet> = ConvergentProcess::new();
        let mut transitions: HashMap<(usize, Symbol), usize> = HashMap::new();

        let mut initial_lookahead = crate::lookahead::LookaheadSet::empty(self.grammar.terminal_count());
        initial_lookahead.insert(Lookahead::Eof);
        let initial = self.closure(ItemSet::from_iter([Item::new(start_production, 0, initial_lookahead)]));
        let (start_state, _) = family.enqueue(initial);
        debug_assert_eq!(start_state, 0, "the first state enqueued is always the start state");

        while let Some(idx) = family.next() {
            let item_set = family.item(idx).clone();
            self.arena.reset();
            let symbols = self.distinct_symbols_after_dot(&item_set);
            for &symbol in symbols.iter() {
                let target_set = self.goto(&item_set, symbol);
                if target_set.is_empty() {
                    continue;
                }
                let (target_idx, _) = family.enqueue(target_set);
                transitions.insert((idx, symbol), target_idx);
                tracing::debug!(from = idx, to = target_idx, symbol = %symbol, "transition");
            }
        }

        (family, transitions)
    }

    /// Runs CLOSURE/GOTO/family-construction and emits the action/goto
    /// table, failing with [`GrammarError::Conflict`] if the grammar is not
    /// LALR(1) (§4.5, §4.6).
    #[tracing::instrument(level = "info", skip(self))]
    pub fn generate(&mut self) -> Result<ParseTable> {
        let start_production = self.start_production()?;
        let (family, transitions) = self.build_family(start_production);

        let state_count = family.count();
        let mut table = ParseTable::new(
            state_count,
            self.grammar.terminal_count(),
            self.grammar.nonterminal_count(),
            0,
        );

        for (state, item_set) in family.items().iter().enumerate() {
            for item in item_set.iter() {
                match item.symbol_at_dot(self.grammar) {
                    Some(Symbol::Terminal(t)) => {
                        let target = transitions[&(state, Symbol::Terminal(t))];
                        table.put_action(state, Lookahead::Terminal(t), Action::Shift(target))?;
                    }
                    Some(Symbol::Nonterminal(n)) => {
                        let target = transitions[&(state, Symbol::Nonterminal(n))];
                        table.put_goto(state, n, target);
                    }
                    None => {
                        for la in item.lookahead.iter() {
                            let action = if item.core.production == start_production {
                                Action::Accept(start_production)
                            } else {
                                Action::Reduce(item.core.production)
                            };
                            table.put_action(state, la, action)?;
                        }
                    }
                }
            }
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use crate::symbol::Symbol::{Nonterminal as N, Terminal as T};
    use pretty_assertions::assert_eq;

    /// S' -> S
    /// S -> ( S ) | x
    fn parens_grammar() -> Grammar {
        let mut b = GrammarBuilder::new();
        let start = b.nonterminal("S'");
        let s = b.nonterminal("S");
        let lparen = b.terminal("(");
        let rparen = b.terminal(")");
        let x = b.terminal("x");
        b.production(start, vec![N(s)], "S'->S");
        b.production(s, vec![T(lparen), N(s), T(rparen)], "S->(S)");
        b.production(s, vec![T(x)], "S->x");
        b.build().unwrap()
    }

    #[test]
    fn accepts_well_nested_parens() {
        // harmless if another test already installed one; lets `trace_closure`
        // runs be inspected with RUST_LOG=trace when chasing a conflict down.
        let _ = tracing_subscriber::fmt::try_init();

        let grammar = parens_grammar();
        let config = GeneratorConfig { trace_closure: true };
        let mut gen = Generator::with_config(&grammar, config);
        let table = gen.generate().unwrap();
        assert!(table.state_count() > 0);
    }

    #[test]
    fn rejects_ungrouped_start_nonterminal() {
        let mut b = GrammarBuilder::new();
        let start = b.nonterminal("S'");
        let tok_x = b.terminal("x");
        b.production(start, vec![T(tok_x)], "S'->x");
        b.production(start, vec![], "S'->eps");
        let grammar = b.build().unwrap();

        let mut gen = Generator::new(&grammar);
        let err = gen.generate().unwrap_err();
        assert_eq!(err, GrammarError::StartNotAugmented { count: 2 });
    }

    /// Classic dangling-else style ambiguity: two reductions both valid on
    /// the same lookahead in the same state.
    #[test]
    fn detects_reduce_reduce_conflict() {
        let mut b = GrammarBuilder::new();
        let start = b.nonterminal("S'");
        let s = b.nonterminal("S");
        let a = b.nonterminal("A");
        let bb = b.nonterminal("B");
        let tok_x = b.terminal("x");
        b.production(start, vec![N(s)], "S'->S");
        b.production(s, vec![N(a)], "S->A");
        b.production(s, vec![N(bb)], "S->B");
        b.production(a, vec![T(tok_x)], "A->x");
        b.production(bb, vec![T(tok_x)], "B->x");
        let grammar = b.build().unwrap();

        let mut gen = Generator::new(&grammar);
        let err = gen.generate().unwrap_err();
        assert!(matches!(err, GrammarError::Conflict { .. }));
    }
}
