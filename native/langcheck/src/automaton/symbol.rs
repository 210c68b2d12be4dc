//! Symbol identifiers and ordered alphabets.

use crate::error::ConfigError;
use indexmap::IndexSet;
use std::fmt;

/// Dense index of a symbol inside an [`Alphabet`].
pub type SymbolId = u32;

/// An ordered set of single-character symbols.
///
/// Declaration order is preserved; a symbol's [`SymbolId`] is its position.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    symbols: IndexSet<char>,
}

impl Alphabet {
    /// Build an alphabet, rejecting repeated symbols.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, ConfigError> {
        let mut set = IndexSet::new();
        for symbol in symbols {
            if !set.insert(symbol) {
                return Err(ConfigError::DuplicateSymbol(symbol));
            }
        }
        Ok(Self { symbols: set })
    }

    pub fn id(&self, symbol: char) -> Option<SymbolId> {
        self.symbols.get_index_of(&symbol).map(|i| i as SymbolId)
    }

    /// Like [`Alphabet::id`], but an unknown symbol is a configuration error.
    pub fn require(&self, symbol: char) -> Result<SymbolId, ConfigError> {
        self.id(symbol).ok_or(ConfigError::UnknownSymbol(symbol))
    }

    pub fn symbol(&self, id: SymbolId) -> Option<char> {
        self.symbols.get_index(id as usize).copied()
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    /// True if both alphabets declare the same symbols in the same order.
    ///
    /// Declaration order is part of an alphabet's identity: it fixes symbol
    /// ids and the order in which searches expand symbols.
    pub fn same_sequence(&self, other: &Alphabet) -> bool {
        self.iter().eq(other.iter())
    }

    /// Translate `input` into symbol ids.
    pub fn encode(&self, input: &str) -> Result<Vec<SymbolId>, ConfigError> {
        input.chars().map(|c| self.require(c)).collect()
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.symbols.iter()).finish()
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
