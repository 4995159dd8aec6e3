//! Ordered (pattern, extractor) rules
//!
//! Every heuristic field extractor in the crate is a table of rules evaluated in
//! order. Rule order is the tie-break: an earlier rule's match always beats a later
//! rule's, and within one rule matches are taken in document order.

use regex::{Captures, Regex};

pub struct PatternRule<T> {
    pub name: &'static str,
    pub regex: Regex,
    pub extract: fn(&Captures<'_>) -> Option<T>,
}

impl<T> PatternRule<T> {
    /// Build a rule from a pattern that is known to compile
    pub fn new(name: &'static str, pattern: &str, extract: fn(&Captures<'_>) -> Option<T>) -> Self {
        Self {
            name,
            regex: Regex::new(pattern).unwrap(),
            extract,
        }
    }

    /// Every value this rule extracts from `text`, in document order
    pub fn candidates<'r, 't>(&'r self, text: &'t str) -> impl Iterator<Item = T> + 'r
    where
        't: 'r,
    {
        self.regex
            .captures_iter(text)
            .filter_map(move |caps| (self.extract)(&caps))
    }
}

/// Lazily walk all rules in order, yielding `(rule name, value)` pairs
pub fn candidates<'r, 't, T>(
    rules: &'r [PatternRule<T>],
    text: &'t str,
) -> impl Iterator<Item = (&'static str, T)> + 'r
where
    't: 'r,
{
    rules
        .iter()
        .flat_map(move |rule| rule.candidates(text).map(move |value| (rule.name, value)))
}

/// First value produced by any rule
pub fn first_match<T>(rules: &[PatternRule<T>], text: &str) -> Option<(&'static str, T)> {
    candidates(rules, text).next()
}

/// Extractor for the whole match
pub fn whole(caps: &Captures<'_>) -> Option<String> {
    caps.get(0).map(|m| m.as_str().trim().to_string())
}

/// Extractor for the first capture group
pub fn group1(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
