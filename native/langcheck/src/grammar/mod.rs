//! Context-free grammars.
//!
//! [`Grammar`] is the normal form (`A -> a`, `A -> B C`) decided by CYK;
//! [`ContextFreeGrammar`] accepts arbitrary non-empty bodies and converts to it.

mod cfg;
mod cnf;

pub use cfg::{ContextFreeGrammar, Symbol};
pub use cnf::{Grammar, GrammarBuilder, NonterminalId, Rhs};
