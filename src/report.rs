use crate::error::Result;
use crate::matcher::MatchOutcome;
use crate::taxonomy::Taxonomy;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// One canonical item in the primary output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub count: u64,
    pub original_aliases: Vec<String>,
    /// Observed keys credited to this item with count above one, the
    /// item's own name excluded
    pub normed_and_added_aliases: Vec<(String, u64)>,
}

/// One term in the unresolved output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedRecord {
    pub name: String,
    pub count: u64,
}

/// Terminal read over a finished matching run, ranked most frequent first
#[derive(Debug, Clone)]
pub struct TallyReport {
    pub items: Vec<ItemRecord>,
    pub unresolved: Vec<UnresolvedRecord>,
}

impl TallyReport {
    pub fn build(outcome: &MatchOutcome, taxonomy: &Taxonomy) -> Self {
        let mut items = Vec::new();
        for (name, observed) in outcome.items.iter() {
            let count = observed.values().sum();

            let original_aliases: Vec<String> = taxonomy
                .get(name)
                .map(|entry| entry.original_aliases.iter().unique().cloned().collect())
                .unwrap_or_default();

            let mut pairs: Vec<(String, u64)> = Vec::new();
            for (key, &key_count) in observed {
                if key_count > 1 && key != name {
                    pairs.push((key.clone(), key_count));
                }
            }
            pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

            items.push(ItemRecord {
                name: name.clone(),
                count,
                original_aliases,
                normed_and_added_aliases: pairs,
            });
        }
        items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        let mut unresolved: Vec<UnresolvedRecord> = outcome
            .unresolved
            .iter()
            .map(|(name, &count)| UnresolvedRecord {
                name: name.clone(),
                count,
            })
            .collect();
        unresolved.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        Self { items, unresolved }
    }

    pub fn canonical_item_count(&self) -> usize {
        self.items.len()
    }

    pub fn occurrence_count(&self) -> u64 {
        self.items.iter().map(|item| item.count).sum()
    }

    pub fn unresolved_term_count(&self) -> usize {
        self.unresolved.len()
    }

    pub fn unresolved_occurrence_count(&self) -> u64 {
        self.unresolved.iter().map(|term| term.count).sum()
    }

    pub fn write_items(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, &self.items)?;
        info!("item report written to {}", path.as_ref().display());
        Ok(())
    }

    pub fn write_unresolved(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path.as_ref())?;
        serde_json::to_writer_pretty(file, &self.unresolved)?;
        info!("unresolved report written to {}", path.as_ref().display());
        Ok(())
    }
}
