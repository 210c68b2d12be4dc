//! State identifiers and bitset-backed state sets.

use fixedbitset::FixedBitSet;
use std::fmt;

/// Dense index of a state inside a single automaton.
pub type StateId = u32;

/// A set of states of one automaton, one bit per state.
///
/// Equality compares members only, so sets built with different capacities
/// still compare equal.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl StateSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Add `state`, growing the bitset when it lies past the current capacity.
    pub fn insert(&mut self, state: StateId) {
        let idx = state as usize;
        self.bits.grow(idx + 1);
        self.bits.insert(idx);
    }

    pub fn contains(&self, state: StateId) -> bool {
        self.bits.contains(state as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|idx| idx as StateId)
    }

    /// Smallest member.
    pub fn first(&self) -> Option<StateId> {
        self.iter().next()
    }

    pub fn intersects(&self, other: &StateSet) -> bool {
        !self.bits.is_disjoint(&other.bits)
    }

    /// Partition into `(members in by, members not in by)`.
    pub fn split(&self, by: &StateSet) -> (StateSet, StateSet) {
        let mut inside = self.bits.clone();
        inside.intersect_with(&by.bits);
        let mut outside = self.bits.clone();
        outside.difference_with(&by.bits);
        (StateSet { bits: inside }, StateSet { bits: outside })
    }
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for StateSet {}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Extend<StateId> for StateSet {
    fn extend<I: IntoIterator<Item = StateId>>(&mut self, states: I) {
        states.into_iter().for_each(|state| self.insert(state));
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(states: I) -> Self {
        let mut set = StateSet::default();
        set.extend(states);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_grows_on_demand() {
        let mut set = StateSet::with_capacity(2);
        assert!(set.is_empty());
        set.extend([1, 9]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(9));
        assert!(!set.contains(2));
        assert!(!set.contains(100));
        assert_eq!(set.first(), Some(1));
    }

    #[test]
    fn test_split_partitions_members() {
        let states: StateSet = [0, 2, 4, 5].into_iter().collect();
        let by: StateSet = [2, 3, 4, 7].into_iter().collect();
        let (inside, outside) = states.split(&by);
        assert_eq!(inside.iter().collect::<Vec<_>>(), vec![2, 4]);
        assert_eq!(outside.iter().collect::<Vec<_>>(), vec![0, 5]);
        assert!(states.intersects(&by));
        assert!(!outside.intersects(&by));
    }

    #[test]
    fn test_equality_ignores_capacity() {
        let mut wide = StateSet::with_capacity(64);
        wide.insert(3);
        let narrow: StateSet = [3].into_iter().collect();
        assert_eq!(wide, narrow);
    }
}
