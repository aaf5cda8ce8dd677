//! The `pattern → glyph` table used to pick an icon for a name.
//!
//! An [`IconMatcher`] is built once per configuration generation from the
//! `apps` and `glyphs` tables of a [`Config`].  Lookup first tries the name
//! as an exact key, then tries every pattern as a regular expression, in
//! table order, and returns the glyph of the first one that matches.

use crate::config::Config;
use log::warn;
use regex::Regex;
use std::collections::HashMap;

/// One pattern of the table.
#[derive(Debug, Clone)]
struct Rule {
    pattern: String,
    /// `None` if `pattern` is not a valid regular expression.
    regex: Option<Regex>,
    glyph: String,
}

/// Immutable matcher for one configuration generation.
#[derive(Debug, Clone, Default)]
pub struct IconMatcher {
    rules: Vec<Rule>,
    exact: HashMap<String, usize>,
}

impl IconMatcher {
    /// Build a matcher from `(pattern, glyph)` pairs, keeping their order.
    ///
    /// Patterns that fail to compile as regular expressions are still used
    /// for exact lookups.
    pub fn new<P, G>(entries: impl IntoIterator<Item = (P, G)>) -> Self
    where
        P: Into<String>,
        G: Into<String>,
    {
        let mut rules = Vec::new();
        let mut exact = HashMap::new();
        for (pattern, glyph) in entries {
            let pattern = pattern.into();
            let regex = match Regex::new(&pattern) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("pattern {:?} is not a valid regex, using it literally: {}", pattern, e);
                    None
                }
            };
            // Names are matched lowercase, so a mixed-case key would never
            // hit exactly.  The first rule for a key wins.
            exact.entry(pattern.to_lowercase()).or_insert(rules.len());
            rules.push(Rule {
                pattern,
                regex,
                glyph: glyph.into(),
            });
        }
        Self { rules, exact }
    }

    /// Build a matcher from the configuration's icon tables.
    ///
    /// Icon keys are visited in ascending order and their patterns in the
    /// order they are listed.  Keys without a glyph are dropped.
    pub fn from_config(config: &Config) -> Self {
        let mut entries = Vec::new();
        for (key, patterns) in &config.apps {
            let Some(glyph) = config.glyphs.get(key) else {
                warn!("no glyph for icon {:?}, ignoring {} pattern(s)", key, patterns.len());
                continue;
            };
            entries.extend(patterns.iter().map(|p| (p.clone(), glyph.clone())));
        }
        Self::new(entries)
    }

    /// Find the glyph for a lowercase `name`.
    pub fn find(&self, name: &str) -> Option<&str> {
        if let Some(&idx) = self.exact.get(name) {
            return Some(&self.rules[idx].glyph);
        }
        self.rules
            .iter()
            .find(|rule| rule.regex.as_ref().is_some_and(|re| re.is_match(name)))
            .map(|rule| rule.glyph.as_str())
    }

    /// Number of patterns in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Patterns that could only be used literally.
    pub fn invalid_patterns(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|rule| rule.regex.is_none())
            .map(|rule| rule.pattern.as_str())
    }
}
