use std::collections::HashSet;

/// Tunables for the matching cascade
pub struct EngineConfig {
    /// Occurrence count above which an unmatched form is promoted to a
    /// canonical item of its own
    pub promote_threshold: u64,
    /// Raw span texts that are dropped from the unresolved report instead
    /// of being listed for triage
    pub skip_terms: HashSet<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            promote_threshold: 5, // promote only forms seen more than 5 times
            skip_terms: HashSet::new(),
        }
    }
}

impl EngineConfig {
    pub fn new(promote_threshold: u64) -> Self {
        Self {
            promote_threshold,
            skip_terms: HashSet::new(),
        }
    }

    pub fn with_skip_terms(mut self, terms: impl IntoIterator<Item = String>) -> Self {
        self.skip_terms.extend(terms);
        self
    }
}
