//! General context-free grammars and their conversion to normal form.

use crate::automaton::Alphabet;
use crate::error::{ConfigError, Result};
use crate::grammar::cnf::{Grammar, Rhs};
use indexmap::{IndexMap, IndexSet};
use std::sync::OnceLock;

/// A grammar symbol in a production body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(char),
    Nonterminal(String),
}

impl Symbol {
    pub fn terminal(symbol: char) -> Self {
        Symbol::Terminal(symbol)
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Symbol::Nonterminal(name.into())
    }
}

/// A context-free grammar with arbitrary non-empty production bodies.
///
/// Membership goes through the normal form, converted once and reused until
/// the next production is added. Empty bodies are rejected, so the language
/// never contains the empty string.
#[derive(Debug, Clone)]
pub struct ContextFreeGrammar {
    terminals: Alphabet,
    nonterminals: IndexSet<String>,
    productions: IndexMap<String, Vec<Vec<Symbol>>>,
    start: String,
    normal_form: OnceLock<Grammar>,
}

impl ContextFreeGrammar {
    pub fn new<I, S>(
        terminals: impl IntoIterator<Item = char>,
        nonterminals: I,
        start: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let terminals = Alphabet::new(terminals)?;
        let mut names = IndexSet::new();
        for name in nonterminals.into_iter().map(Into::into) {
            if names.contains(&name) {
                return Err(ConfigError::DuplicateNonterminal(name).into());
            }
            names.insert(name);
        }
        let start = start.into();
        if !names.contains(&start) {
            return Err(ConfigError::UnknownNonterminal(start).into());
        }
        Ok(Self {
            terminals,
            nonterminals: names,
            productions: IndexMap::new(),
            start,
            normal_form: OnceLock::new(),
        })
    }

    /// Add `lhs -> body`, checking every symbol is declared.
    pub fn add_production(&mut self, lhs: impl Into<String>, body: Vec<Symbol>) -> Result<()> {
        let lhs = lhs.into();
        if !self.nonterminals.contains(&lhs) {
            return Err(ConfigError::UnknownNonterminal(lhs).into());
        }
        if body.is_empty() {
            return Err(ConfigError::EmptyProduction(lhs).into());
        }
        for symbol in &body {
            match symbol {
                Symbol::Terminal(t) if !self.terminals.contains(*t) => {
                    return Err(ConfigError::UnknownSymbol(*t).into());
                }
                Symbol::Nonterminal(name) if !self.nonterminals.contains(name) => {
                    return Err(ConfigError::UnknownNonterminal(name.clone()).into());
                }
                _ => {}
            }
        }
        let bodies = self.productions.entry(lhs).or_default();
        if !bodies.contains(&body) {
            bodies.push(body);
            self.normal_form.take();
        }
        Ok(())
    }

    /// Builder-style variant of [`ContextFreeGrammar::add_production`].
    pub fn with_production(mut self, lhs: impl Into<String>, body: Vec<Symbol>) -> Result<Self> {
        self.add_production(lhs, body)?;
        Ok(self)
    }

    /// Get the terminal alphabet.
    pub fn terminals(&self) -> &Alphabet {
        &self.terminals
    }

    /// Get the start nonterminal.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Get the number of distinct productions.
    pub fn num_productions(&self) -> usize {
        self.productions.values().map(Vec::len).sum()
    }

    /// Decide membership with CYK over the cached normal form.
    pub fn membership(&self, input: &str) -> Result<bool> {
        self.normal_form()?.membership(input)
    }

    /// The normal form, converted on first use.
    pub fn normal_form(&self) -> Result<&Grammar> {
        if let Some(grammar) = self.normal_form.get() {
            return Ok(grammar);
        }
        let grammar = self.to_normal_form()?;
        Ok(self.normal_form.get_or_init(|| grammar))
    }

    /// Convert to an equivalent grammar whose bodies are `a` or `B C`.
    ///
    /// Terminals inside long bodies are lifted into fresh nonterminals, long
    /// bodies are split into chains of pairs, and unit productions `A -> B`
    /// are replaced by the non-unit bodies reachable through them. Fresh
    /// nonterminals never collide with declared ones.
    pub fn to_normal_form(&self) -> Result<Grammar> {
        let mut names = self.nonterminals.clone();
        let mut bodies: IndexMap<String, Vec<Rhs>> = IndexMap::new();
        let mut units: IndexMap<String, Vec<String>> = IndexMap::new();
        let mut lifted: IndexMap<char, String> = IndexMap::new();

        for (lhs, alternatives) in &self.productions {
            for body in alternatives {
                match body.as_slice() {
                    [Symbol::Terminal(t)] => {
                        bodies.entry(lhs.clone()).or_default().push(Rhs::Terminal(*t));
                    }
                    [Symbol::Nonterminal(b)] => {
                        units.entry(lhs.clone()).or_default().push(b.clone());
                    }
                    long => {
                        let chain: Vec<String> = long
                            .iter()
                            .map(|symbol| match symbol {
                                Symbol::Nonterminal(name) => name.clone(),
                                Symbol::Terminal(t) => lifted
                                    .entry(*t)
                                    .or_insert_with(|| fresh_name(&mut names, format!("<{t}>")))
                                    .clone(),
                            })
                            .collect();
                        binarize(lhs, &chain, &mut names, &mut bodies);
                    }
                }
            }
        }
        for (t, name) in &lifted {
            bodies.entry(name.clone()).or_default().push(Rhs::Terminal(*t));
        }

        let mut builder = Grammar::builder()
            .terminals(self.terminals.iter())
            .nonterminals(names.iter().cloned())
            .start(self.start.clone());

        for name in &names {
            for target in unit_closure(name, &units) {
                if let Some(alternatives) = bodies.get(&target) {
                    builder = builder.rules(name.clone(), alternatives.iter().cloned());
                }
            }
        }

        builder.build()
    }
}

/// Split `lhs -> X1 X2 ... Xk` into `lhs -> X1 N1`, `N1 -> X2 N2`, ..., `N(k-2) -> X(k-1) Xk`.
fn binarize(
    lhs: &str,
    chain: &[String],
    names: &mut IndexSet<String>,
    bodies: &mut IndexMap<String, Vec<Rhs>>,
) {
    let mut head = lhs.to_string();
    let mut rest = chain;
    while rest.len() > 2 {
        let tail = fresh_name(names, format!("{lhs}.{}", chain.len() - rest.len() + 1));
        bodies
            .entry(head)
            .or_default()
            .push(Rhs::Pair(rest[0].clone(), tail.clone()));
        head = tail;
        rest = &rest[1..];
    }
    bodies
        .entry(head)
        .or_default()
        .push(Rhs::Pair(rest[0].clone(), rest[1].clone()));
}

/// Nonterminals reachable from `start` through unit productions, including itself.
fn unit_closure(start: &str, units: &IndexMap<String, Vec<String>>) -> IndexSet<String> {
    let mut seen = IndexSet::from([start.to_string()]);
    let mut stack = vec![start.to_string()];
    while let Some(current) = stack.pop() {
        for next in units.get(&current).into_iter().flatten() {
            if seen.insert(next.clone()) {
                stack.push(next.clone());
            }
        }
    }
    seen
}

fn fresh_name(names: &mut IndexSet<String>, base: String) -> String {
    let mut name = base;
    while names.contains(&name) {
        name.push('\'');
    }
    names.insert(name.clone());
    name
}
