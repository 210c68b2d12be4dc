//! Deterministic finite automaton with a total transition table and Hopcroft minimization.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::{Alphabet, SymbolId};
use crate::error::{ConfigError, Result};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A deterministic finite automaton over single-character symbols.
///
/// The transition function is total: every `(state, symbol)` pair has exactly
/// one successor, which [`DfaBuilder::build`] enforces. A `Dfa` never changes
/// after construction.
#[derive(Debug, Clone)]
pub struct Dfa {
    /// State labels; a state's id is its position
    labels: IndexSet<String>,
    alphabet: Alphabet,
    /// Row-major transition table: `table[state * |alphabet| + symbol]`
    table: Vec<StateId>,
    start: StateId,
    accept: StateSet,
}

impl Dfa {
    /// Start an empty [`DfaBuilder`].
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    /// Build from a serializable declaration.
    pub fn from_definition(definition: AutomatonDefinition) -> Result<Self> {
        let mut builder = DfaBuilder::default()
            .states(definition.states)
            .alphabet(definition.alphabet.chars())
            .start(definition.start)
            .accept(definition.accept);
        for (from, symbol, to) in definition.transitions {
            builder = builder.transition(from, symbol, to);
        }
        builder.build()
    }

    /// Parse a TOML declaration (see [`AutomatonDefinition`]).
    pub fn from_toml(source: &str) -> Result<Self> {
        let definition: AutomatonDefinition =
            toml::from_str(source).map_err(ConfigError::from)?;
        Self::from_definition(definition)
    }

    /// The declaration this automaton was built from, in canonical order.
    pub fn to_definition(&self) -> AutomatonDefinition {
        let mut transitions = Vec::with_capacity(self.table.len());
        for (state, from) in self.labels.iter().enumerate() {
            for (symbol, c) in self.alphabet.iter().enumerate() {
                let to = self.step(state as StateId, symbol as SymbolId);
                transitions.push((from.clone(), c, self.labels[to as usize].clone()));
            }
        }
        AutomatonDefinition {
            states: self.labels.iter().cloned().collect(),
            alphabet: self.alphabet.to_string(),
            transitions,
            start: self.labels[self.start as usize].clone(),
            accept: self
                .accept
                .iter()
                .map(|s| self.labels[s as usize].clone())
                .collect(),
        }
    }

    /// Run the automaton on `input` and report whether it ends in an accept state.
    ///
    /// A character outside the alphabet is a configuration error, not a reject.
    pub fn run(&self, input: &str) -> Result<bool> {
        let mut state = self.start;
        for c in input.chars() {
            let symbol = self.alphabet.require(c)?;
            state = self.step(state, symbol);
        }
        Ok(self.accept.contains(state))
    }

    /// Successor of `state` on `symbol`.
    #[inline]
    pub fn step(&self, state: StateId, symbol: SymbolId) -> StateId {
        self.table[state as usize * self.alphabet.len() + symbol as usize]
    }

    /// Get the number of states.
    pub fn num_states(&self) -> usize {
        self.labels.len()
    }

    /// Get the start state.
    pub fn start_state(&self) -> StateId {
        self.start
    }

    /// Get the accepting states.
    pub fn accept_states(&self) -> &StateSet {
        &self.accept
    }

    /// Check whether `state` is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accept.contains(state)
    }

    /// Get the input alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Get the label of `state`, if it exists.
    pub fn state_label(&self, state: StateId) -> Option<&str> {
        self.labels.get_index(state as usize).map(String::as_str)
    }

    /// Look up a state by label.
    pub fn state_id(&self, label: &str) -> Option<StateId> {
        self.labels.get_index_of(label).map(|i| i as StateId)
    }

    /// States reachable from the start state.
    pub fn reachable_states(&self) -> StateSet {
        let mut reachable = StateSet::with_capacity(self.num_states());
        let mut queue = VecDeque::from([self.start]);
        reachable.insert(self.start);

        while let Some(state) = queue.pop_front() {
            for symbol in 0..self.alphabet.len() as SymbolId {
                let next = self.step(state, symbol);
                if !reachable.contains(next) {
                    reachable.insert(next);
                    queue.push_back(next);
                }
            }
        }

        reachable
    }

    /// True if the automaton accepts no string at all.
    pub fn is_empty(&self) -> bool {
        !self.reachable_states().intersects(&self.accept)
    }

    /// Minimize with Hopcroft's partition refinement.
    ///
    /// Unreachable states are dropped. A state of the result that merges several
    /// original states is labelled `{a,b,...}`.
    pub fn minimize(&self) -> Dfa {
        let reachable = self.reachable_states();
        let k = self.alphabet.len();

        // (destination, symbol) -> sources
        let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); self.num_states() * k];
        for state in reachable.iter() {
            for symbol in 0..k {
                let dest = self.step(state, symbol as SymbolId);
                reverse[dest as usize * k + symbol].push(state);
            }
        }

        let (accepting, rejecting) = reachable.split(&self.accept);
        let mut partitions: Vec<StateSet> = [accepting, rejecting]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect();

        let mut worklist: VecDeque<(usize, SymbolId)> = (0..partitions.len())
            .flat_map(|idx| (0..k as SymbolId).map(move |symbol| (idx, symbol)))
            .collect();

        while let Some((splitter_idx, symbol)) = worklist.pop_front() {
            let mut predecessors = StateSet::with_capacity(self.num_states());
            for target in partitions[splitter_idx].iter() {
                for &source in &reverse[target as usize * k + symbol as usize] {
                    predecessors.insert(source);
                }
            }
            if predecessors.is_empty() {
                continue;
            }

            let mut splits = Vec::new();
            for (idx, partition) in partitions.iter().enumerate() {
                let (inside, outside) = partition.split(&predecessors);
                if inside.is_empty() || outside.is_empty() {
                    continue;
                }
                // The larger half keeps the index so pending work items stay valid
                if inside.len() <= outside.len() {
                    splits.push((idx, outside, inside));
                } else {
                    splits.push((idx, inside, outside));
                }
            }

            for (idx, keep, add) in splits {
                let new_idx = partitions.len();
                partitions[idx] = keep;
                partitions.push(add);
                worklist.extend((0..k as SymbolId).map(|sym| (new_idx, sym)));
            }
        }

        self.build_minimized(partitions)
    }

    fn build_minimized(&self, mut partitions: Vec<StateSet>) -> Dfa {
        // Order blocks by their smallest original state so the result is stable
        partitions.sort_by_key(StateSet::first);

        let mut block_of = vec![0 as StateId; self.num_states()];
        for (block, partition) in partitions.iter().enumerate() {
            for state in partition.iter() {
                block_of[state as usize] = block as StateId;
            }
        }

        let mut labels = IndexSet::with_capacity(partitions.len());
        let mut table = Vec::with_capacity(partitions.len() * self.alphabet.len());
        let mut accept = StateSet::with_capacity(partitions.len());

        for (block, partition) in partitions.iter().enumerate() {
            let members: Vec<&str> = partition
                .iter()
                .map(|s| self.labels[s as usize].as_str())
                .collect();
            let mut label = match members.as_slice() {
                [single] => (*single).to_string(),
                many => format!("{{{}}}", many.join(",")),
            };
            // A declared label may already read like a merged one
            while labels.contains(&label) {
                label.push('\'');
            }
            labels.insert(label);

            // Any member is a valid representative once refinement is stable
            if let Some(representative) = partition.first() {
                if self.accept.contains(representative) {
                    accept.insert(block as StateId);
                }
                for symbol in 0..self.alphabet.len() as SymbolId {
                    let dest = self.step(representative, symbol);
                    table.push(block_of[dest as usize]);
                }
            }
        }

        Dfa {
            labels,
            alphabet: self.alphabet.clone(),
            table,
            start: block_of[self.start as usize],
            accept,
        }
    }
}

/// Incremental construction of a [`Dfa`]; all validation happens in [`DfaBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct DfaBuilder {
    states: Vec<String>,
    alphabet: Vec<char>,
    transitions: Vec<(String, char, String)>,
    start: Option<String>,
    accept: Vec<String>,
}

impl DfaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare states; the first declared gets id 0.
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Declare one more state.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Declare symbols in order.
    pub fn alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.alphabet.extend(symbols);
        self
    }

    /// Add the transition `from --symbol--> to`.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        symbol: char,
        to: impl Into<String>,
    ) -> Self {
        self.transitions.push((from.into(), symbol, to.into()));
        self
    }

    /// Set the start state.
    pub fn start(mut self, state: impl Into<String>) -> Self {
        self.start = Some(state.into());
        self
    }

    /// Mark states as accepting.
    pub fn accept<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept.extend(states.into_iter().map(Into::into));
        self
    }

    /// Validate the declaration and build the automaton.
    pub fn build(self) -> Result<Dfa> {
        if self.states.is_empty() {
            return Err(ConfigError::NoStates.into());
        }

        let mut labels = IndexSet::with_capacity(self.states.len());
        for state in self.states {
            if labels.contains(&state) {
                return Err(ConfigError::DuplicateState(state).into());
            }
            labels.insert(state);
        }
        let lookup = |label: &str| -> std::result::Result<StateId, ConfigError> {
            labels
                .get_index_of(label)
                .map(|i| i as StateId)
                .ok_or_else(|| ConfigError::UnknownState(label.to_string()))
        };

        let alphabet = Alphabet::new(self.alphabet)?;
        let start = lookup(self.start.as_deref().ok_or(ConfigError::MissingStart)?)?;

        let mut accept = StateSet::with_capacity(labels.len());
        for state in &self.accept {
            accept.insert(lookup(state)?);
        }

        let k = alphabet.len();
        let mut table: Vec<Option<StateId>> = vec![None; labels.len() * k];
        for (from, symbol, to) in &self.transitions {
            let source = lookup(from)?;
            let sym = alphabet.require(*symbol)?;
            let dest = lookup(to)?;
            let slot = &mut table[source as usize * k + sym as usize];
            if slot.is_some() {
                return Err(ConfigError::DuplicateTransition {
                    state: from.clone(),
                    symbol: *symbol,
                }
                .into());
            }
            *slot = Some(dest);
        }

        let table = table
            .into_iter()
            .enumerate()
            .map(|(idx, dest)| {
                dest.ok_or_else(|| ConfigError::MissingTransition {
                    state: labels[idx / k].clone(),
                    symbol: alphabet.symbol((idx % k) as SymbolId).unwrap_or_default(),
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Dfa {
            labels,
            alphabet,
            table,
            start,
            accept,
        })
    }
}

/// Serializable automaton declaration.
///
/// ```toml
/// states = ["even", "odd"]
/// alphabet = "01"
/// start = "even"
/// accept = ["even"]
/// transitions = [
///     ["even", "0", "even"], ["even", "1", "odd"],
///     ["odd", "0", "odd"], ["odd", "1", "even"],
/// ]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomatonDefinition {
    pub states: Vec<String>,
    pub alphabet: String,
    pub transitions: Vec<(String, char, String)>,
    pub start: String,
    pub accept: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn parity() -> Dfa {
        Dfa::builder()
            .states(["even", "odd"])
            .alphabet("01".chars())
            .transition("even", '0', "even")
            .transition("even", '1', "odd")
            .transition("odd", '0', "odd")
            .transition("odd", '1', "even")
            .start("even")
            .accept(["even"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_counts_ones() {
        let dfa = parity();
        assert!(dfa.run("").unwrap());
        assert!(!dfa.run("1").unwrap());
        assert!(dfa.run("0110").unwrap());
        assert!(!dfa.run("0111").unwrap());
    }

    #[test]
    fn test_unknown_symbol_is_error() {
        let err = parity().run("012").unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration(ConfigError::UnknownSymbol('2'))
        ));
    }

    #[test]
    fn test_missing_transition_rejected() {
        let err = Dfa::builder()
            .states(["a", "b"])
            .alphabet("x".chars())
            .transition("a", 'x', "b")
            .start("a")
            .build()
            .unwrap_err();
        match err {
            Error::Configuration(ConfigError::MissingTransition { state, symbol }) => {
                assert_eq!(state, "b");
                assert_eq!(symbol, 'x');
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_declarations_rejected() {
        let base = || {
            Dfa::builder()
                .states(["a"])
                .alphabet("x".chars())
                .transition("a", 'x', "a")
        };

        assert!(matches!(
            base().build(),
            Err(Error::Configuration(ConfigError::MissingStart))
        ));
        assert!(matches!(
            base().start("z").build(),
            Err(Error::Configuration(ConfigError::UnknownState(_)))
        ));
        assert!(matches!(
            base().start("a").accept(["z"]).build(),
            Err(Error::Configuration(ConfigError::UnknownState(_)))
        ));
        assert!(matches!(
            base().start("a").transition("a", 'y', "a").build(),
            Err(Error::Configuration(ConfigError::UnknownSymbol('y')))
        ));
        assert!(matches!(
            base().start("a").transition("a", 'x', "a").build(),
            Err(Error::Configuration(ConfigError::DuplicateTransition { .. }))
        ));
        assert!(matches!(
            base().state("a").start("a").build(),
            Err(Error::Configuration(ConfigError::DuplicateState(_)))
        ));
        assert!(matches!(
            Dfa::builder().build(),
            Err(Error::Configuration(ConfigError::NoStates))
        ));
    }

    #[test]
    fn test_toml_definition() {
        let dfa = Dfa::from_toml(
            r#"
            states = ["even", "odd"]
            alphabet = "01"
            start = "even"
            accept = ["even"]
            transitions = [
                ["even", "0", "even"], ["even", "1", "odd"],
                ["odd", "0", "odd"], ["odd", "1", "even"],
            ]
            "#,
        )
        .unwrap();
        assert!(dfa.run("11").unwrap());
        assert!(!dfa.run("10").unwrap());
        assert_eq!(dfa.to_definition(), parity().to_definition());
    }

    #[test]
    fn test_bad_toml_is_configuration_error() {
        let err = Dfa::from_toml("states = 3").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_minimize_merges_equivalent_states() {
        // 'a' and 'b' lead to twin states that both accept exactly one more 'a'
        let dfa = Dfa::builder()
            .states(["s", "l", "r", "acc", "dead"])
            .alphabet("ab".chars())
            .transition("s", 'a', "l")
            .transition("s", 'b', "r")
            .transition("l", 'a', "acc")
            .transition("l", 'b', "dead")
            .transition("r", 'a', "acc")
            .transition("r", 'b', "dead")
            .transition("acc", 'a', "dead")
            .transition("acc", 'b', "dead")
            .transition("dead", 'a', "dead")
            .transition("dead", 'b', "dead")
            .start("s")
            .accept(["acc"])
            .build()
            .unwrap();

        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 4);
        assert!(minimized.state_id("{l,r}").is_some());
        for input in ["", "a", "aa", "ba", "ab", "bb", "aaa"] {
            assert_eq!(dfa.run(input).unwrap(), minimized.run(input).unwrap());
        }
    }

    #[test]
    fn test_minimize_keeps_labels_distinct() {
        // "a" and "b" merge into a block whose natural label is already declared
        let dfa = Dfa::builder()
            .states(["{a,b}", "a", "b"])
            .alphabet("x".chars())
            .transition("{a,b}", 'x', "a")
            .transition("a", 'x', "b")
            .transition("b", 'x', "b")
            .start("{a,b}")
            .accept(["a", "b"])
            .build()
            .unwrap();
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 2);
        assert_eq!(minimized.state_label(0), Some("{a,b}"));
        assert_eq!(minimized.state_label(1), Some("{a,b}'"));
        assert!(!minimized.run("").unwrap());
        assert!(minimized.run("xx").unwrap());
    }

    #[test]
    fn test_minimize_drops_unreachable_states() {
        let dfa = Dfa::builder()
            .states(["a", "island"])
            .alphabet("x".chars())
            .transition("a", 'x', "a")
            .transition("island", 'x', "a")
            .start("a")
            .accept(["island"])
            .build()
            .unwrap();

        assert!(dfa.is_empty());
        let minimized = dfa.minimize();
        assert_eq!(minimized.num_states(), 1);
        assert!(minimized.is_empty());
    }
}
