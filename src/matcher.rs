use crate::config::EngineConfig;
use crate::counts::{ItemCounts, UnresolvedForms};
use crate::normalize::{normalize_span, normalize_string};
use crate::span::Span;
use crate::taxonomy::{CanonicalEntry, Taxonomy};
use std::collections::HashMap;
use tracing::{debug, info};

/// Tallies left after both matching passes
#[derive(Debug)]
pub struct MatchOutcome {
    pub items: ItemCounts,
    /// Terms never resolved, keyed by raw span text
    pub unresolved: HashMap<String, u64>,
}

/// Two-pass matching cascade over a batch of annotated lines.
///
/// The exact pass classifies every span by normalized-key equality alone.
/// The fallback pass then works through the leftover forms in first-seen
/// order, trying frequency promotion, syntactic-root lookup, and n-gram
/// lookup, and growing the taxonomy with every success, so forms processed
/// later in the same run can resolve through aliases discovered earlier.
/// The engine owns the taxonomy for the duration of a run.
pub struct MatchEngine {
    taxonomy: Taxonomy,
    config: EngineConfig,
}

impl MatchEngine {
    pub fn new(taxonomy: Taxonomy, config: EngineConfig) -> Self {
        Self { taxonomy, config }
    }

    /// Taxonomy state, including aliases discovered while matching
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Match a whole batch, one span list per input line
    pub fn run(&mut self, chunked: &[Vec<Span>]) -> MatchOutcome {
        let mut items = ItemCounts::new();
        let pending = self.exact_pass(chunked, &mut items);
        info!(
            "exact pass: {} canonical items hit, {} forms left for fallback",
            items.len(),
            pending.len()
        );
        let unresolved = self.fallback_pass(pending, &mut items);
        info!(
            "fallback pass: {} canonical items total, {} terms unresolved",
            items.len(),
            unresolved.len()
        );
        MatchOutcome { items, unresolved }
    }

    /// First pass: normalized-key equality against the taxonomy. Spans
    /// normalizing to empty carry no signal and are dropped; everything
    /// else is either credited or folded into the unresolved forms.
    fn exact_pass(&self, chunked: &[Vec<Span>], items: &mut ItemCounts) -> UnresolvedForms {
        let mut pending = UnresolvedForms::new();
        for line in chunked {
            for span in line {
                let form = normalize_span(span);
                if form.is_empty() {
                    continue;
                }
                if let Some(canonical) = self.taxonomy.resolve(&form) {
                    items.credit(canonical, &form, 1);
                } else {
                    pending.observe(&form, span);
                }
            }
        }
        pending
    }

    /// Second pass over the unresolved forms, first match wins:
    /// 1. a form seen more often than the promotion threshold becomes a
    ///    canonical item of its own,
    /// 2. a form whose span carries a syntactic root is looked up by the
    ///    root's normalized lemma,
    /// 3. a form without a root is looked up by its n-grams, longest
    ///    first,
    /// 4. anything still unmatched lands in the unresolved bucket under
    ///    its raw text, unless that text is in the skip set.
    /// Hits credit the full occurrence count of the form under the key
    /// that matched, and register the form as a new alias of the resolved
    /// canonical.
    fn fallback_pass(
        &mut self,
        pending: UnresolvedForms,
        items: &mut ItemCounts,
    ) -> HashMap<String, u64> {
        let mut still_unresolved: HashMap<String, u64> = HashMap::new();
        for (form, count, span) in pending.into_iter() {
            if count > self.config.promote_threshold {
                debug!("promoting '{}' to canonical after {} occurrences", form, count);
                self.taxonomy.insert_canonical(
                    form.clone(),
                    CanonicalEntry {
                        original_aliases: Vec::new(),
                        normed_aliases: vec![form.clone()],
                    },
                );
                items.credit(&form, &form, count);
                continue;
            }

            if let Some(root) = span.root_token() {
                let key = normalize_string(&root.lemma);
                if !key.is_empty() {
                    if let Some(canonical) = self.taxonomy.resolve(&key) {
                        let canonical = canonical.to_string();
                        debug!("root '{}' resolves '{}' to '{}'", key, form, canonical);
                        items.credit(&canonical, &key, count);
                        self.taxonomy.add_alias(&canonical, form);
                        continue;
                    }
                }
            } else if let Some((canonical, key)) = self.ngram_lookup(&span) {
                debug!("n-gram '{}' resolves '{}' to '{}'", key, form, canonical);
                items.credit(&canonical, &key, count);
                self.taxonomy.add_alias(&canonical, form);
                continue;
            }

            if !self.config.skip_terms.contains(span.text()) {
                *still_unresolved.entry(span.text().to_string()).or_insert(0) += count;
            }
        }
        still_unresolved
    }

    /// Longest matching n-gram of the span, scanning lengths from the
    /// whole span down to single tokens and windows right to left within
    /// each length
    fn ngram_lookup(&self, span: &Span) -> Option<(String, String)> {
        for n in (1..=span.len()).rev() {
            for gram in span.ngrams(n).into_iter().rev() {
                let key = normalize_span(&gram);
                if key.is_empty() {
                    continue;
                }
                if let Some(canonical) = self.taxonomy.resolve(&key) {
                    return Some((canonical.to_string(), key));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::RuleAnnotator;
    use crate::span::{DepLabel, PosTag, Token};
    use crate::taxonomy::{SuffixPlurals, TaxonomyRow};

    fn tok(text: &str, lemma: &str, dep: DepLabel) -> Token {
        Token::new(text, lemma, PosTag::Noun, dep)
    }

    fn span(pairs: &[(&str, &str, DepLabel)]) -> Span {
        Span::from_tokens(
            pairs
                .iter()
                .map(|(text, lemma, dep)| tok(text, lemma, *dep))
                .collect(),
        )
    }

    fn taxonomy(rows: &[(&str, &[&str])]) -> Taxonomy {
        let rows: Vec<TaxonomyRow> = rows
            .iter()
            .map(|(canonical, aliases)| TaxonomyRow {
                canonical: canonical.to_string(),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();
        Taxonomy::build(&rows, &RuleAnnotator::new(), &SuffixPlurals)
    }

    fn engine(rows: &[(&str, &[&str])]) -> MatchEngine {
        MatchEngine::new(taxonomy(rows), EngineConfig::default())
    }

    fn single(span: Span) -> Vec<Vec<Span>> {
        vec![vec![span]]
    }

    #[test]
    fn test_exact_pass_canonical_and_alias() {
        let mut engine = engine(&[("bread", &["loaf"])]);
        let batch = vec![vec![
            span(&[("bread", "bread", DepLabel::Root)]),
            span(&[("loaf", "loaf", DepLabel::Root)]),
            span(&[("loaves", "loaf", DepLabel::Root)]),
        ]];
        let outcome = engine.run(&batch);

        let observed = outcome.items.get("bread").unwrap();
        assert_eq!(observed.get("bread"), Some(&1));
        assert_eq!(observed.get("loaf"), Some(&2));
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_empty_normalization_dropped_entirely() {
        let mut engine = engine(&[("milk", &[])]);
        let batch = single(span(&[
            ("the", "the", DepLabel::Mod),
            ("bag", "bag", DepLabel::Root),
        ]));
        let outcome = engine.run(&batch);
        assert_eq!(outcome.items.grand_total(), 0);
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_every_nonempty_span_counted_once() {
        let mut engine = engine(&[("milk", &[])]);
        let batch = vec![vec![
            span(&[("milk", "milk", DepLabel::Root)]),
            span(&[("zzz", "zzz", DepLabel::Root)]),
            span(&[("zzz", "zzz", DepLabel::Root)]),
            span(&[("zzz", "zzz", DepLabel::Root)]),
        ]];
        let outcome = engine.run(&batch);
        let resolved: u64 = outcome.items.grand_total();
        let unresolved: u64 = outcome.unresolved.values().sum();
        assert_eq!(resolved + unresolved, 4);
        assert_eq!(outcome.unresolved.get("zzz"), Some(&3));
    }

    #[test]
    fn test_frequency_promotion() {
        let mut engine = engine(&[("milk", &[])]);
        let batch = vec![(0..6)
            .map(|_| span(&[("dragonfruit", "dragonfruit", DepLabel::Root)]))
            .collect()];
        let outcome = engine.run(&batch);

        assert_eq!(outcome.items.total("dragonfruit"), 6);
        assert!(outcome.unresolved.is_empty());
        assert!(engine.taxonomy().is_canonical("dragonfruit"));
        assert_eq!(engine.taxonomy().resolve("dragonfruit"), Some("dragonfruit"));
    }

    #[test]
    fn test_promotion_threshold_is_strict() {
        let mut engine = engine(&[("milk", &[])]);
        let batch = vec![(0..5)
            .map(|_| span(&[("dragonfruit", "dragonfruit", DepLabel::Root)]))
            .collect()];
        let outcome = engine.run(&batch);

        // five occurrences stay below the default threshold; the root
        // lookup then misses and the form lands in the unresolved bucket
        assert!(!engine.taxonomy().is_canonical("dragonfruit"));
        assert_eq!(outcome.unresolved.get("dragonfruit"), Some(&5));
    }

    #[test]
    fn test_root_lookup_credits_full_count_and_adds_alias() {
        let mut engine = engine(&[("bread", &["loaf"])]);
        let fresh_loaf = || {
            span(&[
                ("fresh", "fresh", DepLabel::Mod),
                ("loaf", "loaf", DepLabel::Root),
            ])
        };
        let outcome = engine.run(&vec![vec![fresh_loaf(), fresh_loaf()]]);

        let observed = outcome.items.get("bread").unwrap();
        assert_eq!(observed.get("loaf"), Some(&2));
        assert_eq!(engine.taxonomy().resolve("fresh loaf"), Some("bread"));
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_root_lookup_direct_canonical_hit() {
        let mut engine = engine(&[("apple", &[])]);
        let batch = single(span(&[
            ("honeycrisp", "honeycrisp", DepLabel::Mod),
            ("apples", "apple", DepLabel::Root),
        ]));
        let outcome = engine.run(&batch);

        let observed = outcome.items.get("apple").unwrap();
        assert_eq!(observed.get("apple"), Some(&1));
        assert_eq!(engine.taxonomy().resolve("honeycrisp apple"), Some("apple"));
    }

    #[test]
    fn test_root_miss_lands_in_unresolved() {
        let mut engine = engine(&[("milk", &[])]);
        let batch = single(span(&[
            ("gubbins", "gubbins", DepLabel::Root),
            ("crate", "crate", DepLabel::Mod),
        ]));
        let outcome = engine.run(&batch);

        assert_eq!(outcome.unresolved.get("gubbins crate"), Some(&1));
        assert_eq!(outcome.items.grand_total(), 0);
    }

    #[test]
    fn test_rootless_span_uses_longest_ngram() {
        let mut engine = engine(&[("milk", &["organic milk"])]);
        let batch = single(span(&[
            ("farm", "farm", DepLabel::Mod),
            ("organic", "organic", DepLabel::Mod),
            ("milk", "milk", DepLabel::Mod),
        ]));
        let outcome = engine.run(&batch);

        let observed = outcome.items.get("milk").unwrap();
        // the bigram wins over the 1-gram "milk"
        assert_eq!(observed.get("organic milk"), Some(&1));
        assert_eq!(observed.get("milk"), None);
        assert_eq!(engine.taxonomy().resolve("farm organic milk"), Some("milk"));
    }

    #[test]
    fn test_same_length_ngrams_prefer_rightmost() {
        let mut engine = engine(&[("cheese", &[]), ("cracker", &[])]);
        let batch = single(span(&[
            ("cheese", "cheese", DepLabel::Mod),
            ("crackers", "cracker", DepLabel::Mod),
        ]));
        let outcome = engine.run(&batch);

        // both 1-grams resolve, and the scan runs right to left within a
        // length, so the rightmost token wins
        let observed = outcome.items.get("cracker").unwrap();
        assert_eq!(observed.get("cracker"), Some(&1));
        assert!(outcome.items.get("cheese").is_none());
        assert_eq!(engine.taxonomy().resolve("cheese cracker"), Some("cracker"));
    }

    #[test]
    fn test_ngram_skips_empty_normalizations() {
        let mut engine = engine(&[("milk", &[])]);
        let batch = single(span(&[
            ("bag", "bag", DepLabel::Mod),
            ("zzz", "zzz", DepLabel::Mod),
        ]));
        let outcome = engine.run(&batch);
        assert_eq!(outcome.unresolved.get("bag zzz"), Some(&1));
    }

    #[test]
    fn test_growth_resolves_later_forms_in_same_run() {
        let mut engine = engine(&[("bread", &["loaf"])]);
        // the rooted span is seen first, so its added alias "fresh loaf"
        // is already indexed when the rootless span reaches the n-gram
        // scan
        let batch = vec![vec![
            span(&[
                ("fresh", "fresh", DepLabel::Mod),
                ("loaf", "loaf", DepLabel::Root),
            ]),
            span(&[
                ("sliced", "sliced", DepLabel::Mod),
                ("fresh", "fresh", DepLabel::Mod),
                ("loaf", "loaf", DepLabel::Mod),
            ]),
            span(&[
                ("sliced", "sliced", DepLabel::Mod),
                ("fresh", "fresh", DepLabel::Mod),
                ("loaf", "loaf", DepLabel::Mod),
            ]),
        ]];
        let outcome = engine.run(&batch);

        let observed = outcome.items.get("bread").unwrap();
        assert_eq!(observed.get("loaf"), Some(&1));
        assert_eq!(observed.get("fresh loaf"), Some(&2));
        assert_eq!(engine.taxonomy().resolve("sliced fresh loaf"), Some("bread"));
        assert!(outcome.unresolved.is_empty());
    }

    #[test]
    fn test_skip_set_excludes_raw_text() {
        let config = EngineConfig::default().with_skip_terms(vec!["misc".to_string()]);
        let mut engine = MatchEngine::new(taxonomy(&[("milk", &[])]), config);
        let batch = vec![vec![
            span(&[("misc", "misc", DepLabel::Root)]),
            span(&[("gubbins", "gubbins", DepLabel::Root)]),
        ]];
        let outcome = engine.run(&batch);

        assert!(!outcome.unresolved.contains_key("misc"));
        assert_eq!(outcome.unresolved.get("gubbins"), Some(&1));
    }
}
