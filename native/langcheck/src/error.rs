//! Error types shared by the automaton, grammar and falsification modules.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every fallible operation.
#[derive(Debug, Error)]
pub enum Error {
    /// The automaton, grammar or rule is malformed.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Two automata (or a model pair) were compared over different alphabets.
    #[error("incompatible alphabets: {left:?} vs {right:?}")]
    IncompatibleAlphabet { left: String, right: String },
}

/// A malformed model definition or an input outside its declared symbols.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("automaton must declare at least one state")]
    NoStates,

    #[error("duplicate state label {0:?}")]
    DuplicateState(String),

    #[error("duplicate symbol {0:?}")]
    DuplicateSymbol(char),

    #[error("unknown state {0:?}")]
    UnknownState(String),

    #[error("symbol {0:?} is not in the alphabet")]
    UnknownSymbol(char),

    #[error("missing transition from state {state:?} on symbol {symbol:?}")]
    MissingTransition { state: String, symbol: char },

    #[error("transition from state {state:?} on symbol {symbol:?} declared twice")]
    DuplicateTransition { state: String, symbol: char },

    #[error("start symbol or state is not set")]
    MissingStart,

    #[error("unknown nonterminal {0:?}")]
    UnknownNonterminal(String),

    #[error("duplicate nonterminal {0:?}")]
    DuplicateNonterminal(String),

    #[error("production for {0:?} has an empty right-hand side")]
    EmptyProduction(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid definition: {0}")]
    InvalidDefinition(#[from] toml::de::Error),
}

impl Error {
    /// Returns true for malformed-model errors.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
