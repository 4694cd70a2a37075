use crate::span::Span;
use std::collections::HashMap;

/// Tally of observed strings credited to each canonical item
#[derive(Debug, Clone, Default)]
pub struct ItemCounts {
    counts: HashMap<String, HashMap<String, u64>>,
}

impl ItemCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn credit(&mut self, canonical: &str, observed: &str, amount: u64) {
        *self
            .counts
            .entry(canonical.to_string())
            .or_default()
            .entry(observed.to_string())
            .or_insert(0) += amount;
    }

    /// Total occurrences credited to one canonical item
    pub fn total(&self, canonical: &str) -> u64 {
        self.counts
            .get(canonical)
            .map(|observed| observed.values().sum())
            .unwrap_or(0)
    }

    /// Total occurrences credited across all canonical items
    pub fn grand_total(&self) -> u64 {
        self.counts.values().flat_map(|observed| observed.values()).sum()
    }

    pub fn get(&self, canonical: &str) -> Option<&HashMap<String, u64>> {
        self.counts.get(canonical)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &HashMap<String, u64>)> {
        self.counts.iter()
    }

    /// Number of canonical items with at least one credited occurrence
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Forms the exact pass could not resolve, in first-seen order, each with
/// one representative span kept for syntactic and n-gram fallback
#[derive(Debug, Clone, Default)]
pub struct UnresolvedForms {
    order: Vec<String>,
    forms: HashMap<String, (u64, Span)>,
}

impl UnresolvedForms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of a form. The first span seen for a form
    /// stays its representative; later spans only bump the count.
    pub fn observe(&mut self, form: &str, span: &Span) {
        match self.forms.get_mut(form) {
            Some((count, _)) => *count += 1,
            None => {
                self.order.push(form.to_string());
                self.forms.insert(form.to_string(), (1, span.clone()));
            }
        }
    }

    pub fn count(&self, form: &str) -> u64 {
        self.forms.get(form).map(|(count, _)| *count).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consume in first-seen order
    pub fn into_iter(mut self) -> impl Iterator<Item = (String, u64, Span)> {
        self.order.into_iter().filter_map(move |form| {
            self.forms.remove(&form).map(|(count, span)| (form, count, span))
        })
    }
}
