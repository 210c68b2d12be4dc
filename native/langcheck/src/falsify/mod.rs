//! Randomized falsification of models against rules.
//!
//! The engine draws candidate strings from a [`StringStrategy`], compares the
//! model's answer with the rule's, and shrinks the first disagreement to a
//! locally minimal counterexample. A clean run is reported as
//! [`Verdict::NoCounterexample`]: for grammars and arbitrary predicates this is
//! evidence that the two agree, never a proof.

mod config;
mod rule;
mod strategy;

pub use config::SearchConfig;
pub use rule::{RegexRule, Rule};
pub use strategy::{AlphabetStrategy, StringStrategy, shortlex_cmp};

use crate::automaton::{Alphabet, Dfa, equivalence};
use crate::error::{Error, Result};
use crate::grammar::{ContextFreeGrammar, Grammar};
use crate::verdict::{Counterexample, Verdict};
use std::cmp::Ordering;
use tracing::{debug, info, trace};

/// A language decided by a model.
pub trait Language {
    /// Symbols the model is defined over.
    fn alphabet(&self) -> &Alphabet;

    fn accepts(&self, input: &str) -> Result<bool>;

    /// Size of the model, used to bound the length of generated strings.
    fn complexity(&self) -> usize;

    /// Shortest input worth testing.
    fn min_len(&self) -> usize {
        0
    }
}

impl Language for Dfa {
    fn alphabet(&self) -> &Alphabet {
        Dfa::alphabet(self)
    }

    fn accepts(&self, input: &str) -> Result<bool> {
        self.run(input)
    }

    fn complexity(&self) -> usize {
        self.num_states()
    }
}

impl Language for Grammar {
    fn alphabet(&self) -> &Alphabet {
        self.terminals()
    }

    fn accepts(&self, input: &str) -> Result<bool> {
        self.membership(input)
    }

    fn complexity(&self) -> usize {
        self.num_productions()
    }

    /// The normal form never derives the empty string, so it is not sampled.
    fn min_len(&self) -> usize {
        1
    }
}

impl Language for ContextFreeGrammar {
    fn alphabet(&self) -> &Alphabet {
        self.terminals()
    }

    fn accepts(&self, input: &str) -> Result<bool> {
        self.membership(input)
    }

    fn complexity(&self) -> usize {
        self.num_productions()
    }

    fn min_len(&self) -> usize {
        1
    }
}

/// Either kind of model, for comparisons that dispatch on the pair.
#[derive(Debug, Clone, Copy)]
pub enum Model<'a> {
    Automaton(&'a Dfa),
    Grammar(&'a Grammar),
}

impl<'a> From<&'a Dfa> for Model<'a> {
    fn from(dfa: &'a Dfa) -> Self {
        Model::Automaton(dfa)
    }
}

impl<'a> From<&'a Grammar> for Model<'a> {
    fn from(grammar: &'a Grammar) -> Self {
        Model::Grammar(grammar)
    }
}

impl Language for Model<'_> {
    fn alphabet(&self) -> &Alphabet {
        match self {
            Model::Automaton(dfa) => Language::alphabet(*dfa),
            Model::Grammar(grammar) => Language::alphabet(*grammar),
        }
    }

    fn accepts(&self, input: &str) -> Result<bool> {
        match self {
            Model::Automaton(dfa) => dfa.accepts(input),
            Model::Grammar(grammar) => grammar.accepts(input),
        }
    }

    fn complexity(&self) -> usize {
        match self {
            Model::Automaton(dfa) => dfa.complexity(),
            Model::Grammar(grammar) => grammar.complexity(),
        }
    }

    fn min_len(&self) -> usize {
        match self {
            Model::Automaton(dfa) => dfa.min_len(),
            Model::Grammar(grammar) => grammar.min_len(),
        }
    }
}

/// Randomized search for disagreements between a model and a rule.
#[derive(Debug, Clone, Default)]
pub struct Falsifier {
    config: SearchConfig,
}

impl Falsifier {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Longest string generated for `model`.
    pub fn max_len<L: Language + ?Sized>(&self, model: &L) -> usize {
        model
            .complexity()
            .saturating_mul(self.config.scale_factor)
            .max(self.config.min_max_len)
            .max(model.min_len())
    }

    /// The default seeded strategy for `model`.
    pub fn strategy_for<L: Language + ?Sized>(&self, model: &L) -> AlphabetStrategy {
        let max_len = self.max_len(model);
        debug!(max_len, alphabet = %model.alphabet(), "building default strategy");
        AlphabetStrategy::new(
            model.alphabet().iter().collect(),
            model.min_len(),
            max_len,
            self.config.seed,
        )
        .with_exhaustive_budget(self.config.exhaustive_budget())
    }

    /// Check that `model` accepts exactly the strings `rule` holds for.
    ///
    /// Returns [`Verdict::NoCounterexample`] when the trial budget runs out
    /// without a disagreement; this is not a proof of agreement.
    pub fn check<L, R>(&self, model: &L, rule: &R) -> Result<Verdict>
    where
        L: Language + ?Sized,
        R: Rule + ?Sized,
    {
        let mut strategy = self.strategy_for(model);
        self.check_with(model, rule, &mut strategy)
    }

    /// Like [`Falsifier::check`], drawing candidates from a caller-supplied strategy.
    pub fn check_with<L, R, S>(&self, model: &L, rule: &R, strategy: &mut S) -> Result<Verdict>
    where
        L: Language + ?Sized,
        R: Rule + ?Sized,
        S: StringStrategy + ?Sized,
    {
        let order: Vec<char> = model.alphabet().iter().collect();
        self.search(
            &order,
            model.min_len(),
            |input| model.accepts(input),
            |input| Ok(rule.holds(input)),
            strategy,
        )
    }

    /// Check that two models accept the same language.
    ///
    /// Two automata are compared exactly by product search. Any pair involving
    /// a grammar falls back to randomized search.
    pub fn compare(&self, left: Model<'_>, right: Model<'_>) -> Result<Verdict> {
        if let (Model::Automaton(a), Model::Automaton(b)) = (left, right) {
            return equivalence(a, b);
        }

        if !left.alphabet().same_sequence(right.alphabet()) {
            return Err(Error::IncompatibleAlphabet {
                left: left.alphabet().to_string(),
                right: right.alphabet().to_string(),
            });
        }

        let min_len = left.min_len().max(right.min_len());
        let max_len = self.max_len(&left).max(self.max_len(&right));
        let order: Vec<char> = left.alphabet().iter().collect();
        debug!(max_len, alphabet = %left.alphabet(), "comparing models by search");
        let mut strategy =
            AlphabetStrategy::new(order.clone(), min_len, max_len, self.config.seed)
                .with_exhaustive_budget(self.config.exhaustive_budget());

        self.search(
            &order,
            min_len,
            |input| left.accepts(input),
            |input| right.accepts(input),
            &mut strategy,
        )
    }

    fn search<F, G, S>(
        &self,
        order: &[char],
        min_len: usize,
        left: F,
        right: G,
        strategy: &mut S,
    ) -> Result<Verdict>
    where
        F: Fn(&str) -> Result<bool>,
        G: Fn(&str) -> Result<bool>,
        S: StringStrategy + ?Sized,
    {
        debug!(
            max_trials = self.config.max_trials,
            seed = self.config.seed,
            min_len,
            "starting randomized search"
        );

        let mut trials = 0;
        for _ in 0..self.config.max_trials {
            let candidate = strategy.generate();
            if candidate.chars().count() < min_len {
                continue;
            }

            let trial = trials;
            trials += 1;
            let (l, r) = (left(&candidate)?, right(&candidate)?);
            trace!(trial, input = %candidate, left = l, right = r, "evaluated candidate");
            if l == r {
                continue;
            }

            info!(trial, input = %candidate, "disagreement found, shrinking");
            let cx = self.shrink(
                order,
                min_len,
                Counterexample::new(candidate, l, r),
                &left,
                &right,
                strategy,
            )?;
            info!(input = %cx.input, left = cx.left, right = cx.right, "reporting counterexample");
            return Ok(Verdict::Counterexample(cx));
        }

        info!(trials, drawn = self.config.max_trials, "no counterexample found");
        Ok(Verdict::NoCounterexample { trials })
    }

    /// Greedily replace the counterexample with smaller failing proposals.
    fn shrink<F, G, S>(
        &self,
        order: &[char],
        min_len: usize,
        mut current: Counterexample,
        left: &F,
        right: &G,
        strategy: &mut S,
    ) -> Result<Counterexample>
    where
        F: Fn(&str) -> Result<bool>,
        G: Fn(&str) -> Result<bool>,
        S: StringStrategy + ?Sized,
    {
        let mut steps = 0;
        'outer: while steps < self.config.max_shrinks {
            for candidate in strategy.shrink(&current.input) {
                if candidate.chars().count() < min_len
                    || shortlex_cmp(&candidate, &current.input, order) != Ordering::Less
                {
                    continue;
                }
                let (l, r) = (left(&candidate)?, right(&candidate)?);
                if l != r {
                    steps += 1;
                    debug!(step = steps, input = %candidate, "shrunk counterexample");
                    current = Counterexample::new(candidate, l, r);
                    continue 'outer;
                }
            }
            break;
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Rhs, Symbol};

    /// Accepts strings over {a,b} ending in 'b'.
    fn ends_in_b() -> Dfa {
        Dfa::builder()
            .states(["no", "yes"])
            .alphabet("ab".chars())
            .transition("no", 'a', "no")
            .transition("no", 'b', "yes")
            .transition("yes", 'a', "no")
            .transition("yes", 'b', "yes")
            .start("no")
            .accept(["yes"])
            .build()
            .unwrap()
    }

    /// a^n for n >= 1
    fn a_plus() -> Grammar {
        Grammar::builder()
            .terminals("ab".chars())
            .nonterminals(["S"])
            .rule("S", Rhs::terminal('a'))
            .rule("S", Rhs::pair("S", "S"))
            .start("S")
            .build()
            .unwrap()
    }

    #[test]
    fn test_matching_rule_passes() {
        let verdict = Falsifier::default()
            .check(&ends_in_b(), &|s: &str| s.ends_with('b'))
            .unwrap();
        assert_eq!(verdict, Verdict::NoCounterexample { trials: 1000 });
        assert!(verdict.passed());
    }

    #[test]
    fn test_counterexample_is_shrunk() {
        // Wrong rule: also demands an 'a' somewhere. "b" is the smallest disagreement.
        let rule = |s: &str| s.ends_with('b') && s.contains('a');
        let verdict = Falsifier::default().check(&ends_in_b(), &rule).unwrap();
        let cx = verdict.counterexample().unwrap();
        assert_eq!(cx.input, "b");
        assert!(cx.left);
        assert!(!cx.right);
    }

    #[test]
    fn test_same_seed_same_counterexample() {
        let rule = |s: &str| s.len() < 3;
        let config = SearchConfig::default().with_seed(1234).with_exhaustive_fraction(0.0);
        let first = Falsifier::new(config.clone()).check(&ends_in_b(), &rule).unwrap();
        let second = Falsifier::new(config).check(&ends_in_b(), &rule).unwrap();
        assert_eq!(first, second);
        assert!(!first.passed());
    }

    #[test]
    fn test_grammar_never_sampled_with_empty_string() {
        // The rule disagrees only on "", which the grammar side never sees
        let rule = |s: &str| s.is_empty() || s.chars().all(|c| c == 'a');
        let verdict = Falsifier::default().check(&a_plus(), &rule).unwrap();
        assert!(verdict.passed());
        assert!(!verdict.is_exact());
    }

    #[test]
    fn test_compare_grammar_with_automaton() {
        let grammar = a_plus();
        let dfa = ends_in_b();
        let verdict = Falsifier::default()
            .compare(Model::from(&grammar), Model::from(&dfa))
            .unwrap();
        let cx = verdict.counterexample().unwrap();
        assert_eq!(cx.input, "a");
        assert_eq!(grammar.membership(&cx.input).unwrap(), cx.left);
        assert_eq!(dfa.run(&cx.input).unwrap(), cx.right);
    }

    #[test]
    fn test_compare_two_automata_is_exact() {
        let dfa = ends_in_b();
        let verdict = Falsifier::default()
            .compare(Model::from(&dfa), Model::from(&dfa))
            .unwrap();
        assert_eq!(verdict, Verdict::Proven);
    }

    #[test]
    fn test_compare_rejects_mismatched_alphabets() {
        let grammar = Grammar::builder()
            .terminals("xy".chars())
            .nonterminals(["S"])
            .rule("S", Rhs::terminal('x'))
            .start("S")
            .build()
            .unwrap();
        let dfa = ends_in_b();
        assert!(matches!(
            Falsifier::default().compare(Model::from(&grammar), Model::from(&dfa)),
            Err(Error::IncompatibleAlphabet { .. })
        ));
    }

    fn is_balanced(s: &str) -> bool {
        let mut depth = 0i32;
        for c in s.chars() {
            depth += if c == '(' { 1 } else { -1 };
            if depth < 0 {
                return false;
            }
        }
        depth == 0 && !s.is_empty()
    }

    /// S -> ( S ) | ( ), plus S -> S S when `concatenate` is set.
    fn parens(concatenate: bool) -> ContextFreeGrammar {
        let (open, close) = (Symbol::terminal('('), Symbol::terminal(')'));
        let s = Symbol::nonterminal("S");
        let mut g = ContextFreeGrammar::new("()".chars(), ["S"], "S").unwrap();
        g.add_production("S", vec![open.clone(), s.clone(), close.clone()])
            .unwrap();
        g.add_production("S", vec![open, close]).unwrap();
        if concatenate {
            g.add_production("S", vec![s.clone(), s]).unwrap();
        }
        g
    }

    #[test]
    fn test_general_grammar_is_checked_directly() {
        let verdict = Falsifier::default()
            .check(&parens(true), &is_balanced)
            .unwrap();
        assert_eq!(verdict, Verdict::NoCounterexample { trials: 1000 });

        let nested_only = parens(false);
        let verdict = Falsifier::default()
            .check(&nested_only, &is_balanced)
            .unwrap();
        let cx = verdict.counterexample().expect("missing concatenation");
        assert!(is_balanced(&cx.input));
        assert!(!nested_only.membership(&cx.input).unwrap());
    }

    /// Alternates between the empty string and "a".
    struct EveryOtherEmpty(bool);

    impl StringStrategy for EveryOtherEmpty {
        fn generate(&mut self) -> String {
            self.0 = !self.0;
            if self.0 { String::new() } else { "a".to_string() }
        }
        fn shrink(&mut self, _failing: &str) -> Vec<String> {
            Vec::new()
        }
    }

    #[test]
    fn test_skipped_candidates_are_not_counted() {
        let falsifier = Falsifier::new(SearchConfig::default().with_max_trials(10));
        let rule = |s: &str| s == "a";
        let verdict = falsifier
            .check_with(&a_plus(), &rule, &mut EveryOtherEmpty(false))
            .unwrap();
        assert_eq!(verdict, Verdict::NoCounterexample { trials: 5 });
    }

    #[test]
    fn test_huge_scale_factor_saturates() {
        let config = SearchConfig::default().with_scale_factor(usize::MAX);
        assert_eq!(Falsifier::new(config).max_len(&ends_in_b()), usize::MAX);
    }

    #[test]
    fn test_model_errors_propagate() {
        struct Outside;
        impl StringStrategy for Outside {
            fn generate(&mut self) -> String {
                "abc".to_string()
            }
            fn shrink(&mut self, _failing: &str) -> Vec<String> {
                Vec::new()
            }
        }
        let err = Falsifier::default()
            .check_with(&ends_in_b(), &|_: &str| true, &mut Outside)
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
