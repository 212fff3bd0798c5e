//! LR(1) items and item sets (§3, §4.4).
//!
//! An item's *identity* for hashing/dedup is its core `(production, dot)`;
//! its lookahead is a mutable value merged in place. Keeping these separate
//! is the load-bearing invariant of LALR merging (§9): a hash table or
//! `ItemSet` that accidentally folds the lookahead into identity collapses
//! back into plain LR(1), with one state per distinct lookahead combination
//! instead of one state per LR(0) core.

use crate::convergent::Keyed;
use crate::grammar::Grammar;
use crate::lookahead::LookaheadSet;
use crate::symbol::Symbol;
use std::hash::{Hash, Hasher};

/// An item's identity: the production it belongs to and the dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemCore {
    pub production: usize,
    pub dot: usize,
}

/// An LR(1) item: a core plus its (mutable, merged) lookahead set.
#[derive(Debug, Clone)]
pub struct Item {
    pub core: ItemCore,
    pub lookahead: LookaheadSet,
}

impl Item {
    pub fn new(production: usize, dot: usize, lookahead: LookaheadSet) -> Self {
        Self {
            core: ItemCore { production, dot },
            lookahead,
        }
    }

    /// The symbol immediately after the dot, or `None` if the dot is at the end.
    pub fn symbol_at_dot(&self, grammar: &Grammar) -> Option<Symbol> {
        grammar.production(self.core.production).rhs.get(self.core.dot).copied()
    }

    /// The nonterminal after the dot, if any.
    pub fn nonterminal_at_dot(&self, grammar: &Grammar) -> Option<usize> {
        match self.symbol_at_dot(grammar)? {
            Symbol::Nonterminal(n) => Some(n),
            Symbol::Terminal(_) => None,
        }
    }

    /// The symbols strictly after the one at the dot — β in `A → α·Bβ`.
    pub fn symbols_after_dot<'g>(&self, grammar: &'g Grammar) -> &'g [Symbol] {
        let rhs = &grammar.production(self.core.production).rhs;
        &rhs[(self.core.dot + 1).min(rhs.len())..]
    }

    pub fn is_at_end(&self, grammar: &Grammar) -> bool {
        self.core.dot >= grammar.production(self.core.production).rhs.len()
    }

    /// The item with the dot advanced by one, or `None` if already at the end.
    pub fn shift(&self, grammar: &Grammar) -> Option<Item> {
        if self.is_at_end(grammar) {
            return None;
        }
        Some(Item {
            core: ItemCore {
                production: self.core.production,
                dot: self.core.dot + 1,
            },
            lookahead: self.lookahead.clone(),
        })
    }
}

impl Keyed for Item {
    type Key = ItemCore;

    fn key(&self) -> ItemCore {
        self.core
    }

    fn merge(&mut self, other: Item) -> bool {
        self.lookahead.merge(&other.lookahead)
    }
}

/// An ordered, deduplicated collection of items, canonicalized by
/// `(production, dot)`.
///
/// Equality and hashing depend only on the cores present, never on
/// lookaheads — this is the foundation of LALR merging (§4.4): two item
/// sets that share an LR(0) core set are the *same* family entry even if
/// their lookaheads differ, and `ConvergentProcess` uses `ItemSet` itself
/// as both the interned value and its own key.
#[derive(Debug, Clone)]
pub struct ItemSet {
    items: Vec<Item>,
}

impl ItemSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Inserts `item`, merging into an existing core if present. Returns
    /// whether the set's content (lookaheads included) changed.
    pub fn insert(&mut self, item: Item) -> bool {
        match self.items.binary_search_by_key(&item.core, |i| i.core) {
            Ok(pos) => self.items[pos].lookahead.merge(&item.lookahead),
            Err(pos) => {
                self.items.insert(pos, item);
                true
            }
        }
    }

    /// Re-sorts by `(production, dot)`. Insertion already maintains this
    /// order via binary search, so this is only needed after bulk mutation
    /// that bypassed `insert` (there is none in this crate, but the
    /// operation is part of the spec'd interface).
    pub fn sort(&mut self) {
        self.items.sort_by_key(|i| i.core);
    }

    /// Both sets must have identical cores in identical order. ORs
    /// lookaheads pairwise; returns whether anything changed.
    pub fn merge_lookaheads(&mut self, other: &ItemSet) -> bool {
        debug_assert_eq!(self.items.len(), other.items.len());
        let mut changed = false;
        for (a, b) in self.items.iter_mut().zip(&other.items) {
            debug_assert_eq!(a.core, b.core);
            if a.lookahead.merge(&b.lookahead) {
                changed = true;
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn into_iter_items(self) -> impl Iterator<Item = Item> {
        self.items.into_iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn cores(&self) -> impl Iterator<Item = ItemCore> + '_ {
        self.items.iter().map(|i| i.core)
    }
}

impl Default for ItemSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Item> for ItemSet {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut set = ItemSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}

impl PartialEq for ItemSet {
    fn eq(&self, other: &Self) -> bool {
        self.items.len() == other.items.len() && self.cores().eq(other.cores())
    }
}

impl Eq for ItemSet {}

impl Hash for ItemSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for core in self.cores() {
            core.hash(state);
        }
    }
}

impl Keyed for ItemSet {
    type Key = ItemSet;

    fn key(&self) -> ItemSet {
        self.clone()
    }

    fn merge(&mut self, other: ItemSet) -> bool {
        self.merge_lookaheads(&other)
    }
}
