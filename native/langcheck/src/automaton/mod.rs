//! Deterministic finite automata.
//!
//! This module provides:
//! - A validated DFA model with a total transition table
//! - Simulation of runs over `char` input
//! - Hopcroft's DFA minimization algorithm
//! - Exact equivalence checking by product-state search

mod dfa;
mod equivalence;
mod state;
mod symbol;

pub use dfa::{AutomatonDefinition, Dfa, DfaBuilder};
pub use equivalence::{distinguishing_string, equivalence};
pub use state::{StateId, StateSet};
pub use symbol::{Alphabet, SymbolId};
