//! Rules that models are checked against.

use crate::error::{ConfigError, Result};
use regex::Regex;

/// A reference decision over strings.
pub trait Rule {
    fn holds(&self, input: &str) -> bool;
}

impl<F> Rule for F
where
    F: Fn(&str) -> bool,
{
    fn holds(&self, input: &str) -> bool {
        self(input)
    }
}

/// A rule that holds when a regular expression matches the whole input.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: String,
    regex: Regex,
}

impl RegexRule {
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!(r"\A(?:{pattern})\z")).map_err(ConfigError::from)?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl Rule for RegexRule {
    fn holds(&self, input: &str) -> bool {
        self.regex.is_match(input)
    }
}
