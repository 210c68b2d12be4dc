//! Exact language equivalence of two DFAs by breadth-first search of their product.

use crate::automaton::dfa::Dfa;
use crate::automaton::state::StateId;
use crate::automaton::symbol::SymbolId;
use crate::error::{Error, Result};
use crate::verdict::{Counterexample, Verdict};
use fixedbitset::FixedBitSet;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Decide whether `left` and `right` accept the same language.
///
/// Returns [`Verdict::Proven`] or the distinguishing string with each side's
/// answer. The product space is finite, so the result is never inconclusive.
pub fn equivalence(left: &Dfa, right: &Dfa) -> Result<Verdict> {
    Ok(match distinguishing_string(left, right)? {
        None => Verdict::Proven,
        Some(input) => {
            let cx = Counterexample::new(input.as_str(), left.run(&input)?, right.run(&input)?);
            Verdict::Counterexample(cx)
        }
    })
}

/// Find the shortest string accepted by exactly one of the automata.
///
/// Ties among equal-length strings go to the first in alphabet declaration
/// order. Both alphabets must declare the same symbols in the same order, so
/// the answer does not depend on argument order.
pub fn distinguishing_string(left: &Dfa, right: &Dfa) -> Result<Option<String>> {
    if !left.alphabet().same_sequence(right.alphabet()) {
        return Err(Error::IncompatibleAlphabet {
            left: left.alphabet().to_string(),
            right: right.alphabet().to_string(),
        });
    }

    // Identical declarations give both automata the same symbol ids
    let symbols: Vec<(SymbolId, char)> = left
        .alphabet()
        .iter()
        .enumerate()
        .map(|(id, c)| (id as SymbolId, c))
        .collect();

    let width = right.num_states();
    let index = |a: StateId, b: StateId| a as usize * width + b as usize;

    let origin = (left.start_state(), right.start_state());
    let mut visited = FixedBitSet::with_capacity(left.num_states() * width);
    let mut parent: HashMap<usize, (usize, char)> = HashMap::new();
    let mut queue = VecDeque::from([origin]);
    visited.insert(index(origin.0, origin.1));

    while let Some((a, b)) = queue.pop_front() {
        if left.is_accepting(a) != right.is_accepting(b) {
            let input = rebuild_path(&parent, index(a, b));
            debug!(
                explored = visited.count_ones(..),
                length = input.chars().count(),
                "product search found a distinguishing string"
            );
            return Ok(Some(input));
        }

        for &(symbol, c) in &symbols {
            let next = (left.step(a, symbol), right.step(b, symbol));
            let next_idx = index(next.0, next.1);
            if !visited.contains(next_idx) {
                visited.insert(next_idx);
                parent.insert(next_idx, (index(a, b), c));
                queue.push_back(next);
            }
        }
    }

    debug!(
        explored = visited.count_ones(..),
        "product search exhausted, automata are equivalent"
    );
    Ok(None)
}

fn rebuild_path(parent: &HashMap<usize, (usize, char)>, mut node: usize) -> String {
    let mut reversed = Vec::new();
    while let Some(&(prev, c)) = parent.get(&node) {
        reversed.push(c);
        node = prev;
    }
    reversed.into_iter().rev().collect()
}
