use crate::normalize::normalize_span;
use crate::span::Annotator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One row of the taxonomy source, already string-normalized by ingestion
#[derive(Debug, Clone)]
pub struct TaxonomyRow {
    pub canonical: String,
    pub aliases: Vec<String>,
}

/// A taxonomy category keyed by its normalized canonical term
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalEntry {
    /// Raw alias strings as they appeared in the source, duplicates allowed
    pub original_aliases: Vec<String>,
    /// Normalized alias strings, grown at runtime as matching discovers
    /// new ways the item is written
    pub normed_aliases: Vec<String>,
}

/// Singular/plural alias augmentation, swappable without touching the
/// matching pipeline
pub trait PluralStrategy {
    /// Number variants of a normalized canonical term to index as aliases
    fn variants(&self, canonical: &str) -> Vec<String>;
}

/// Trailing-"s" heuristic: coarse, known to misfire on irregular plurals
pub struct SuffixPlurals;

impl PluralStrategy for SuffixPlurals {
    fn variants(&self, canonical: &str) -> Vec<String> {
        match canonical.strip_suffix('s') {
            Some(stem) => vec![stem.to_string()],
            None => vec![format!("{}s", canonical)],
        }
    }
}

/// Bidirectional index over the taxonomy: canonical term to its entry, and
/// every normalized alias back to its canonical term. The canonical key
/// resolves to itself without being duplicated into its own alias list.
/// Mutated in place while matching runs; aliases are appended, never
/// removed.
#[derive(Debug, Clone, Default)]
pub struct Taxonomy {
    canonicals: HashMap<String, CanonicalEntry>,
    alias_index: HashMap<String, String>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from source rows. Canonical terms and aliases are
    /// span-normalized; anything that normalizes to empty carries no
    /// signal and is discarded (the whole row, when the canonical itself
    /// normalizes to empty). Entries are stored first, wholesale, so a
    /// repeated canonical term replaces the earlier row's entry outright;
    /// the alias index is then derived from the surviving entries in
    /// first-seen canonical order. A later canonical silently wins a
    /// contested alias; the overwrite is logged.
    pub fn build(rows: &[TaxonomyRow], annotator: &dyn Annotator, plural: &dyn PluralStrategy) -> Self {
        let mut taxonomy = Self::new();
        let mut order: Vec<String> = Vec::new();
        for row in rows {
            let canonical = normalize_span(&annotator.annotate_phrase(&row.canonical));
            if canonical.is_empty() {
                warn!("taxonomy term '{}' normalizes to empty, row dropped", row.canonical);
                continue;
            }

            let original_aliases: Vec<String> =
                row.aliases.iter().filter(|a| !a.is_empty()).cloned().collect();
            let mut normed_aliases: Vec<String> = original_aliases
                .iter()
                .map(|a| normalize_span(&annotator.annotate_phrase(a)))
                .filter(|a| !a.is_empty())
                .collect();
            normed_aliases.extend(plural.variants(&canonical).into_iter().filter(|v| !v.is_empty()));

            let entry = CanonicalEntry {
                original_aliases,
                normed_aliases,
            };
            if taxonomy.canonicals.insert(canonical.clone(), entry).is_some() {
                warn!(
                    "taxonomy term '{}' appears in more than one row, earlier entry replaced",
                    canonical
                );
            } else {
                order.push(canonical);
            }
        }
        for canonical in &order {
            if let Some(entry) = taxonomy.canonicals.get(canonical) {
                for alias in &entry.normed_aliases {
                    Self::index_alias(&mut taxonomy.alias_index, alias, canonical);
                }
            }
        }
        debug!(
            "taxonomy built: {} canonical terms, {} aliases",
            taxonomy.canonical_count(),
            taxonomy.alias_count()
        );
        taxonomy
    }

    /// Resolve a normalized key to its canonical term: canonical keys
    /// match themselves, then the alias index is consulted
    pub fn resolve(&self, key: &str) -> Option<&str> {
        if let Some((canonical, _)) = self.canonicals.get_key_value(key) {
            return Some(canonical.as_str());
        }
        self.alias_index.get(key).map(|c| c.as_str())
    }

    pub fn is_canonical(&self, key: &str) -> bool {
        self.canonicals.contains_key(key)
    }

    pub fn get(&self, canonical: &str) -> Option<&CanonicalEntry> {
        self.canonicals.get(canonical)
    }

    pub fn canonical_count(&self) -> usize {
        self.canonicals.len()
    }

    pub fn alias_count(&self) -> usize {
        self.alias_index.len()
    }

    /// Register a canonical entry and index all of its normalized aliases
    pub fn insert_canonical(&mut self, canonical: String, entry: CanonicalEntry) {
        for alias in &entry.normed_aliases {
            Self::index_alias(&mut self.alias_index, alias, &canonical);
        }
        self.canonicals.insert(canonical, entry);
    }

    /// Append a newly discovered alias to a canonical entry and index it,
    /// so forms processed later in the same run resolve through it
    pub fn add_alias(&mut self, canonical: &str, alias: String) {
        let Some(entry) = self.canonicals.get_mut(canonical) else {
            warn!("alias '{}' targets unknown canonical '{}'", alias, canonical);
            return;
        };
        entry.normed_aliases.push(alias.clone());
        Self::index_alias(&mut self.alias_index, &alias, canonical);
    }

    fn index_alias(alias_index: &mut HashMap<String, String>, alias: &str, canonical: &str) {
        if let Some(prev) = alias_index.insert(alias.to_string(), canonical.to_string()) {
            if prev != canonical {
                warn!("alias '{}' reassigned from '{}' to '{}'", alias, prev, canonical);
            }
        }
    }
}
