//! Result types shared by the equivalence and falsification engines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An input on which two sides disagree.
///
/// `left` is the model under test (or the first automaton of a pair), `right`
/// is the rule (or the second model).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    pub input: String,
    pub left: bool,
    pub right: bool,
}

/// Which side of a comparison accepted a counterexample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Counterexample {
    /// Record `input` with each side's answer.
    pub fn new(input: impl Into<String>, left: bool, right: bool) -> Self {
        Self {
            input: input.into(),
            left,
            right,
        }
    }

    /// The side that accepted the input. The other side rejected it.
    pub fn accepted_by(&self) -> Side {
        if self.left { Side::Left } else { Side::Right }
    }
}

/// Outcome of a language check.
///
/// `Proven` comes only from the exact automaton equivalence search.
/// `NoCounterexample` means a bounded randomized search found no disagreement,
/// which is evidence, not proof. Both print as `true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Proven,
    NoCounterexample { trials: usize },
    Counterexample(Counterexample),
}

impl Verdict {
    /// True unless a counterexample was found.
    pub fn passed(&self) -> bool {
        !matches!(self, Verdict::Counterexample(_))
    }

    /// True only for results backed by an exhaustive search.
    pub fn is_exact(&self) -> bool {
        !matches!(self, Verdict::NoCounterexample { .. })
    }

    /// The counterexample, if one was found.
    pub fn counterexample(&self) -> Option<&Counterexample> {
        match self {
            Verdict::Counterexample(cx) => Some(cx),
            _ => None,
        }
    }

    /// Consume the verdict, keeping only its counterexample.
    pub fn into_counterexample(self) -> Option<Counterexample> {
        match self {
            Verdict::Counterexample(cx) => Some(cx),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Proven | Verdict::NoCounterexample { .. } => f.write_str("true"),
            Verdict::Counterexample(cx) => f.write_str(&cx.input),
        }
    }
}
