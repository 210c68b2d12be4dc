//! Check finite automata and context-free grammars against the languages they
//! are meant to accept.
//!
//! - [`automaton`]: DFAs, simulation, minimization and exact equivalence
//! - [`grammar`]: normal-form grammars with CYK membership, plus general CFGs
//! - [`falsify`]: randomized search for counterexamples with shrinking
//!
//! Results are [`Verdict`]s. Automaton equivalence is decided exactly
//! ([`Verdict::Proven`]); every other check is a bounded randomized search
//! whose success ([`Verdict::NoCounterexample`]) is evidence, not proof.

pub mod automaton;
pub mod error;
pub mod falsify;
pub mod grammar;
pub mod verdict;

pub use automaton::{Dfa, DfaBuilder};
pub use error::{ConfigError, Error, Result};
pub use falsify::{Falsifier, Language, Model, RegexRule, Rule, SearchConfig};
pub use grammar::{ContextFreeGrammar, Grammar, GrammarBuilder, Rhs};
pub use verdict::{Counterexample, Side, Verdict};

/// Check `model` against `rule` with the default search budget.
pub fn check<L, R>(model: &L, rule: &R) -> Result<Verdict>
where
    L: Language + ?Sized,
    R: Rule + ?Sized,
{
    Falsifier::default().check(model, rule)
}

/// Check `model` against a regular expression that must match whole strings.
pub fn check_regex<L>(model: &L, pattern: &str) -> Result<Verdict>
where
    L: Language + ?Sized,
{
    check(model, &RegexRule::new(pattern)?)
}

/// Compare two models with the default search budget.
///
/// Exact for two automata, randomized otherwise.
pub fn check_equivalence<'a>(
    left: impl Into<Model<'a>>,
    right: impl Into<Model<'a>>,
) -> Result<Verdict> {
    Falsifier::default().compare(left.into(), right.into())
}
