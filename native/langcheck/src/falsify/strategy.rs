//! Candidate generation and shrinking.

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

/// Source of candidate strings for the falsification engine.
///
/// Implementations must be deterministic for a given construction (seed,
/// alphabet, bounds) so counterexamples are reproducible.
pub trait StringStrategy {
    /// Produce the next candidate string.
    fn generate(&mut self) -> String;

    /// Propose simplifications of a failing string, most aggressive first.
    ///
    /// The engine keeps the first proposal that still fails and is strictly
    /// smaller in shortlex order; proposals that are not smaller are ignored.
    fn shrink(&mut self, failing: &str) -> Vec<String>;
}

/// Seeded generator over a fixed alphabet.
///
/// Starts by enumerating every short string in shortlex order (up to the
/// exhaustive budget), then draws random strings biased toward short lengths
/// and toward repetitive shapes: single-symbol runs, repeated motifs and
/// near-uniform strings with a few flipped positions.
#[derive(Debug, Clone)]
pub struct AlphabetStrategy {
    rng: StdRng,
    alphabet: Vec<char>,
    min_len: usize,
    max_len: usize,
    exhaustive_budget: usize,
    /// Next string of the shortlex enumeration, as alphabet indices
    odometer: Option<Vec<usize>>,
}

impl AlphabetStrategy {
    pub fn new(alphabet: Vec<char>, min_len: usize, max_len: usize, seed: u64) -> Self {
        let max_len = max_len.max(min_len);
        Self {
            rng: StdRng::seed_from_u64(seed),
            odometer: (!alphabet.is_empty() || min_len == 0).then(|| vec![0; min_len]),
            alphabet,
            min_len,
            max_len,
            exhaustive_budget: 0,
        }
    }

    /// Number of leading candidates taken from the shortlex enumeration.
    pub fn with_exhaustive_budget(mut self, budget: usize) -> Self {
        self.exhaustive_budget = budget;
        self
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn next_enumerated(&mut self) -> Option<String> {
        if self.exhaustive_budget == 0 {
            return None;
        }
        let digits = self.odometer.as_mut()?;
        if digits.len() > self.max_len {
            self.odometer = None;
            return None;
        }
        let word = digits.iter().map(|&d| self.alphabet[d]).collect();

        // Advance like an odometer; on overflow move to the next length
        let base = self.alphabet.len();
        let mut pos = digits.len();
        loop {
            if pos == 0 {
                let len = digits.len() + 1;
                *digits = vec![0; len];
                if base == 0 {
                    self.odometer = None;
                }
                break;
            }
            pos -= 1;
            digits[pos] += 1;
            if digits[pos] < base {
                break;
            }
            digits[pos] = 0;
        }

        self.exhaustive_budget -= 1;
        Some(word)
    }

    fn random_length(&mut self) -> usize {
        let span = self.max_len - self.min_len;
        // Two nested draws skew the distribution toward short strings
        let cap = self.rng.gen_range(0..=span);
        self.min_len + self.rng.gen_range(0..=cap)
    }

    fn random_symbol(&mut self) -> char {
        self.alphabet[self.rng.gen_range(0..self.alphabet.len())]
    }

    fn random_word(&mut self) -> String {
        if self.alphabet.is_empty() {
            return String::new();
        }
        let len = self.random_length();
        match self.rng.gen_range(0..6) {
            0..=2 => (0..len).map(|_| self.random_symbol()).collect(),
            3 => {
                let symbol = self.random_symbol();
                std::iter::repeat_n(symbol, len).collect()
            }
            4 => {
                let motif_len = self.rng.gen_range(1..=3);
                let motif: Vec<char> = (0..motif_len).map(|_| self.random_symbol()).collect();
                motif.iter().copied().cycle().take(len).collect()
            }
            _ => {
                let mut word = vec![self.random_symbol(); len];
                if len > 0 {
                    for _ in 0..self.rng.gen_range(1..=2) {
                        let pos = self.rng.gen_range(0..len);
                        word[pos] = self.random_symbol();
                    }
                }
                word.into_iter().collect()
            }
        }
    }

    fn rank(&self, symbol: char) -> usize {
        self.alphabet
            .iter()
            .position(|&c| c == symbol)
            .unwrap_or(self.alphabet.len())
    }
}

impl StringStrategy for AlphabetStrategy {
    fn generate(&mut self) -> String {
        match self.next_enumerated() {
            Some(word) => word,
            None => self.random_word(),
        }
    }

    fn shrink(&mut self, failing: &str) -> Vec<String> {
        let chars: Vec<char> = failing.chars().collect();
        let n = chars.len();
        let min_len = self.min_len;
        let mut candidates: IndexSet<String> = IndexSet::new();
        let mut push = |word: &[char]| {
            if word.len() >= min_len {
                candidates.insert(word.iter().collect::<String>());
            }
        };

        if n > min_len {
            // Drop whole prefixes and suffixes, biggest first
            for k in (1..n).rev() {
                push(&chars[k..]);
                push(&chars[..n - k]);
            }
            // Delete chunks of halving size at every position
            let mut size = n / 2;
            while size >= 1 {
                for start in 0..=n - size {
                    let mut word = chars[..start].to_vec();
                    word.extend_from_slice(&chars[start + size..]);
                    push(&word);
                }
                size /= 2;
            }
        }

        // Replace a symbol by an earlier one from the alphabet
        for (i, &c) in chars.iter().enumerate() {
            for &smaller in &self.alphabet[..self.rank(c).min(self.alphabet.len())] {
                let mut word = chars.clone();
                word[i] = smaller;
                push(&word);
            }
        }

        // Sort adjacent out-of-order pairs
        for i in 1..n {
            if self.rank(chars[i]) < self.rank(chars[i - 1]) {
                let mut word = chars.clone();
                word.swap(i - 1, i);
                push(&word);
            }
        }

        candidates.into_iter().collect()
    }
}

/// Compare two strings by length, then symbol by symbol in alphabet order.
///
/// Symbols outside `alphabet` sort after every alphabet symbol.
pub fn shortlex_cmp(a: &str, b: &str, alphabet: &[char]) -> Ordering {
    let rank = |c: char| alphabet.iter().position(|&s| s == c).unwrap_or(alphabet.len());
    a.chars()
        .count()
        .cmp(&b.chars().count())
        .then_with(|| a.chars().map(rank).cmp(b.chars().map(rank)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerates_shortlex_first() {
        let mut strategy =
            AlphabetStrategy::new(vec!['0', '1'], 0, 10, 7).with_exhaustive_budget(7);
        let words: Vec<String> = (0..7).map(|_| strategy.generate()).collect();
        assert_eq!(words, ["", "0", "1", "00", "01", "10", "11"]);
    }

    #[test]
    fn test_enumeration_respects_min_len() {
        let mut strategy =
            AlphabetStrategy::new(vec!['a', 'b'], 2, 10, 0).with_exhaustive_budget(3);
        let words: Vec<String> = (0..3).map(|_| strategy.generate()).collect();
        assert_eq!(words, ["aa", "ab", "ba"]);
    }

    #[test]
    fn test_random_words_within_bounds() {
        let mut strategy = AlphabetStrategy::new(vec!['x', 'y', 'z'], 1, 6, 42);
        for _ in 0..500 {
            let word = strategy.generate();
            let len = word.chars().count();
            assert!((1..=6).contains(&len), "bad length {len}");
            assert!(word.chars().all(|c| "xyz".contains(c)));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = AlphabetStrategy::new(vec!['0', '1'], 0, 20, 99);
        let mut b = AlphabetStrategy::new(vec!['0', '1'], 0, 20, 99);
        for _ in 0..100 {
            assert_eq!(a.generate(), b.generate());
        }
    }

    #[test]
    fn test_empty_alphabet_only_yields_empty_string() {
        let mut strategy = AlphabetStrategy::new(vec![], 0, 5, 1).with_exhaustive_budget(3);
        for _ in 0..5 {
            assert_eq!(strategy.generate(), "");
        }
    }

    #[test]
    fn test_shrink_candidates_are_smaller() {
        let alphabet = vec!['a', 'b'];
        let mut strategy = AlphabetStrategy::new(alphabet.clone(), 1, 10, 0);
        let candidates = strategy.shrink("babb");
        assert!(!candidates.is_empty());
        assert!(candidates.contains(&"b".to_string()));
        assert!(candidates.contains(&"aabb".to_string()));
        for candidate in &candidates {
            assert!(!candidate.is_empty());
            assert_eq!(
                shortlex_cmp(candidate, "babb", &alphabet),
                Ordering::Less,
                "{candidate:?} is not smaller"
            );
        }
    }

    #[test]
    fn test_shortlex_order() {
        let alphabet = ['b', 'a'];
        assert_eq!(shortlex_cmp("a", "bb", &alphabet), Ordering::Less);
        assert_eq!(shortlex_cmp("ba", "ab", &alphabet), Ordering::Less);
        assert_eq!(shortlex_cmp("ab", "ab", &alphabet), Ordering::Equal);
    }
}
