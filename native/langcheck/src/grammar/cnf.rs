//! Normal-form grammars and CYK membership.

use crate::automaton::{Alphabet, SymbolId};
use crate::error::{ConfigError, Result};
use fixedbitset::FixedBitSet;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Dense index of a nonterminal inside a [`Grammar`].
pub type NonterminalId = u32;

/// Right-hand side of a normal-form production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rhs {
    /// `A -> a`
    Terminal(char),
    /// `A -> B C`
    Pair(String, String),
}

impl Rhs {
    /// `A -> symbol`
    pub fn terminal(symbol: char) -> Self {
        Rhs::Terminal(symbol)
    }

    /// `A -> left right`
    pub fn pair(left: impl Into<String>, right: impl Into<String>) -> Self {
        Rhs::Pair(left.into(), right.into())
    }
}

/// A context-free grammar whose every production is `A -> a` or `A -> B C`.
///
/// The empty string is never derivable, so [`Grammar::membership`] rejects it.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: Alphabet,
    nonterminals: IndexSet<String>,
    productions: IndexMap<String, Vec<Rhs>>,
    start: NonterminalId,
    /// For each terminal symbol id, the nonterminals that produce it directly
    unit_rules: Vec<Vec<NonterminalId>>,
    /// `(A, B, C)` for every `A -> B C`
    binary_rules: Vec<(NonterminalId, NonterminalId, NonterminalId)>,
}

impl Grammar {
    /// Start an empty [`GrammarBuilder`].
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::default()
    }

    /// Decide whether `input` is derivable from the start symbol.
    ///
    /// Bottom-up CYK: `T[i][j]` holds the nonterminals deriving the half-open
    /// span `i..j`. Runs in O(n³ · |productions|).
    pub fn membership(&self, input: &str) -> Result<bool> {
        let word = self.terminals.encode(input)?;
        let n = word.len();
        if n == 0 {
            return Ok(false);
        }

        let m = self.nonterminals.len();
        let cell = |i: usize, j: usize| i * (n + 1) + j;
        let mut table = vec![FixedBitSet::with_capacity(m); (n + 1) * (n + 1)];

        for (i, &symbol) in word.iter().enumerate() {
            for &a in &self.unit_rules[symbol as usize] {
                table[cell(i, i + 1)].insert(a as usize);
            }
        }

        for len in 2..=n {
            for i in 0..=n - len {
                let j = i + len;
                let mut derived = FixedBitSet::with_capacity(m);
                for k in i + 1..j {
                    let (left, right) = (&table[cell(i, k)], &table[cell(k, j)]);
                    if left.is_clear() || right.is_clear() {
                        continue;
                    }
                    for &(a, b, c) in &self.binary_rules {
                        if left.contains(b as usize) && right.contains(c as usize) {
                            derived.insert(a as usize);
                        }
                    }
                }
                table[cell(i, j)] = derived;
            }
        }

        Ok(table[cell(0, n)].contains(self.start as usize))
    }

    /// Get the terminal alphabet.
    pub fn terminals(&self) -> &Alphabet {
        &self.terminals
    }

    /// Nonterminal names in declaration order.
    pub fn nonterminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.nonterminals.iter().map(String::as_str)
    }

    /// Get the start nonterminal.
    pub fn start(&self) -> &str {
        &self.nonterminals[self.start as usize]
    }

    /// All productions as `(lhs, rhs)` in declaration order.
    pub fn productions(&self) -> impl Iterator<Item = (&str, &Rhs)> + '_ {
        self.productions
            .iter()
            .flat_map(|(lhs, bodies)| bodies.iter().map(move |rhs| (lhs.as_str(), rhs)))
    }

    /// Get the number of distinct productions.
    pub fn num_productions(&self) -> usize {
        self.productions.values().map(Vec::len).sum()
    }
}

/// Incremental construction of a [`Grammar`]; validation happens in [`GrammarBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    terminals: Vec<char>,
    nonterminals: Vec<String>,
    rules: Vec<(String, Rhs)>,
    start: Option<String>,
}

impl GrammarBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare terminal symbols in order.
    pub fn terminals(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.terminals.extend(symbols);
        self
    }

    /// Declare nonterminals in order.
    pub fn nonterminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nonterminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add `lhs -> rhs`.
    pub fn rule(mut self, lhs: impl Into<String>, rhs: Rhs) -> Self {
        self.rules.push((lhs.into(), rhs));
        self
    }

    /// Add several alternatives for the same left-hand side.
    pub fn rules(
        mut self,
        lhs: impl Into<String>,
        alternatives: impl IntoIterator<Item = Rhs>,
    ) -> Self {
        let lhs = lhs.into();
        self.rules
            .extend(alternatives.into_iter().map(|rhs| (lhs.clone(), rhs)));
        self
    }

    /// Set the start nonterminal.
    pub fn start(mut self, name: impl Into<String>) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Validate every rule and build the grammar. Repeated rules are kept once.
    pub fn build(self) -> Result<Grammar> {
        let terminals = Alphabet::new(self.terminals)?;

        let mut nonterminals = IndexSet::with_capacity(self.nonterminals.len());
        for name in self.nonterminals {
            if nonterminals.contains(&name) {
                return Err(ConfigError::DuplicateNonterminal(name).into());
            }
            nonterminals.insert(name);
        }
        let lookup = |name: &str| -> std::result::Result<NonterminalId, ConfigError> {
            nonterminals
                .get_index_of(name)
                .map(|i| i as NonterminalId)
                .ok_or_else(|| ConfigError::UnknownNonterminal(name.to_string()))
        };

        let start = lookup(self.start.as_deref().ok_or(ConfigError::MissingStart)?)?;

        let mut productions: IndexMap<String, Vec<Rhs>> = IndexMap::new();
        let mut unit_rules: Vec<Vec<NonterminalId>> = vec![Vec::new(); terminals.len()];
        let mut binary_rules = Vec::new();

        for (lhs, rhs) in self.rules {
            let a = lookup(&lhs)?;
            let bodies = productions.entry(lhs).or_default();
            if bodies.contains(&rhs) {
                continue;
            }
            match &rhs {
                Rhs::Terminal(t) => {
                    let symbol: SymbolId = terminals.require(*t)?;
                    unit_rules[symbol as usize].push(a);
                }
                Rhs::Pair(b, c) => binary_rules.push((a, lookup(b)?, lookup(c)?)),
            }
            bodies.push(rhs);
        }

        Ok(Grammar {
            terminals,
            nonterminals,
            productions,
            start,
            unit_rules,
            binary_rules,
        })
    }
}
