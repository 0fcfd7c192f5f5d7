use crate::error::{ModerationError, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

/// One local check run before any remote classification
pub trait ContentRule: Send + Sync {
    fn name(&self) -> &str;

    fn matches(&self, text: &str) -> bool;
}

/// Rule backed by a regular expression
pub struct RegexRule {
    name: String,
    pattern: Regex,
}

impl RegexRule {
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
        })
    }

    /// Case-insensitive whole-word match of `word`
    pub fn word(word: &str) -> Result<Self> {
        let word = word.trim();
        if word.is_empty() {
            return Err(ModerationError::Config("empty word rule".to_string()));
        }
        Self::new(
            format!("word:{}", word.to_lowercase()),
            &format!(r"(?i)\b{}\b", regex::escape(word)),
        )
    }
}

impl ContentRule for RegexRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered list of rules; the first match wins
pub struct PatternFilter {
    rules: Vec<Box<dyn ContentRule>>,
}

impl PatternFilter {
    /// Filter with no rules at all
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl ContentRule + 'static) -> Self {
        self.push(rule);
        self
    }

    pub fn push(&mut self, rule: impl ContentRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Append one word rule per line of `path`.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn with_words_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ModerationError::Config(format!(
                "Failed to load words from {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        for line in content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
        {
            self.push(RegexRule::word(line)?);
        }

        Ok(self)
    }

    pub fn first_match(&self, text: &str) -> Option<&dyn ContentRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.as_ref())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for PatternFilter {
    /// Minimal built-in deny list
    fn default() -> Self {
        let builtin = [
            ("violence", r"(?i)\b(kill|murder|shoot|stab)\b"),
            ("self_harm", r"(?i)\b(suicide|self[- ]?harm)\b"),
            ("threat", r"(?i)\bi(?:'m| am)? (?:going to|gonna|will) (?:hurt|find|beat) you\b"),
        ];

        let rules = builtin
            .into_iter()
            .map(|(name, pattern)| {
                Box::new(RegexRule {
                    name: name.to_string(),
                    pattern: Regex::new(pattern).expect("Built-in moderation pattern is valid"),
                }) as Box<dyn ContentRule>
            })
            .collect();

        Self { rules }
    }
}

impl fmt::Debug for PatternFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| rule.name()))
            .finish()
    }
}
