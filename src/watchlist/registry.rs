//! Include/exclude pattern rules.

use std::collections::BTreeSet;
use std::fmt;

use super::WatchlistManager;
use crate::error::WatchlistError;
use crate::pattern::PatternResolver;
use crate::Result;

/// Outcome of an include or exclude request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternChange {
    /// The pattern was new.
    Added,
    /// The pattern was moved over from the opposite set.
    Moved,
    /// The pattern was already in the requested set.
    Unchanged,
}

/// Read-only view of both pattern sets.
#[derive(Debug, Clone, Copy)]
pub struct PatternRules<'a> {
    pub included: &'a BTreeSet<String>,
    pub excluded: &'a BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Include,
    Exclude,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Include => "included",
            Self::Exclude => "excluded",
        })
    }
}

impl<R: PatternResolver> WatchlistManager<R> {
    /// Add an included pattern, moving it out of the excluded set if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or the watchlist cannot be saved.
    pub fn include(&mut self, pattern: &str) -> Result<PatternChange> {
        self.add_rule(pattern, Rule::Include)
    }

    /// Add an excluded pattern, moving it out of the included set if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is malformed or the watchlist cannot be saved.
    pub fn exclude(&mut self, pattern: &str) -> Result<PatternChange> {
        self.add_rule(pattern, Rule::Exclude)
    }

    /// Delete a pattern from whichever set holds it.
    ///
    /// # Errors
    ///
    /// Returns [`WatchlistError::NoMatchingRule`] if neither set holds the
    /// pattern, or an error if it is malformed or the save fails.
    pub fn remove(&mut self, pattern: &str) -> Result<()> {
        let pattern = self.resolver.validate(pattern)?;

        let rule = if self.data.included.remove(&pattern) {
            Rule::Include
        } else if self.data.excluded.remove(&pattern) {
            Rule::Exclude
        } else {
            tracing::warn!(pattern = %pattern, "No existing rule for pattern");
            return Err(WatchlistError::NoMatchingRule(pattern).into());
        };

        let restore = pattern.clone();
        self.persist_or_revert(|data| {
            let set = match rule {
                Rule::Include => &mut data.included,
                Rule::Exclude => &mut data.excluded,
            };
            set.insert(restore);
        })?;

        tracing::info!(pattern = %pattern, "Removed {rule} pattern");
        Ok(())
    }

    /// Both pattern sets, for display.
    #[must_use]
    pub const fn patterns(&self) -> PatternRules<'_> {
        PatternRules {
            included: &self.data.included,
            excluded: &self.data.excluded,
        }
    }

    /// Consistency self-check of the in-memory watchlist.
    #[must_use]
    pub fn validate(&self) -> bool {
        self.data.validate()
    }

    fn add_rule(&mut self, pattern: &str, rule: Rule) -> Result<PatternChange> {
        let pattern = self.resolver.validate(pattern)?;

        let (target, opposite) = match rule {
            Rule::Include => (&mut self.data.included, &mut self.data.excluded),
            Rule::Exclude => (&mut self.data.excluded, &mut self.data.included),
        };

        if target.contains(&pattern) {
            tracing::info!(pattern = %pattern, "Already {rule} pattern");
            return Ok(PatternChange::Unchanged);
        }

        let change = if opposite.remove(&pattern) {
            PatternChange::Moved
        } else {
            PatternChange::Added
        };
        target.insert(pattern.clone());

        let restore = pattern.clone();
        self.persist_or_revert(|data| {
            let (target, opposite) = match rule {
                Rule::Include => (&mut data.included, &mut data.excluded),
                Rule::Exclude => (&mut data.excluded, &mut data.included),
            };
            target.remove(&restore);
            if change == PatternChange::Moved {
                opposite.insert(restore);
            }
        })?;

        match change {
            PatternChange::Moved => {
                tracing::info!(pattern = %pattern, "{rule} previously {} pattern", rule.opposite());
            }
            _ => tracing::info!(pattern = %pattern, "New {rule} pattern"),
        }
        Ok(change)
    }
}

impl Rule {
    const fn opposite(self) -> Self {
        match self {
            Self::Include => Self::Exclude,
            Self::Exclude => Self::Include,
        }
    }
}
