use crate::error::{Result, TallyError};
use crate::normalize::normalize_string;
use crate::span::Annotator;
use crate::taxonomy::{PluralStrategy, Taxonomy, TaxonomyRow};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::info;

lazy_static! {
    /// Alias lists are delimited by commas or periods
    static ref ALIAS_SPLIT: Regex = Regex::new(r"[,.]").unwrap();
}

/// Parse taxonomy rows: header row skipped, first column is the canonical
/// term, third column the delimited alias list. Cell values are
/// string-normalized here; span normalization happens when the index is
/// built.
pub fn parse_taxonomy_rows(reader: impl Read) -> Result<Vec<TaxonomyRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let canonical = record
            .get(0)
            .ok_or_else(|| TallyError::Taxonomy(format!("row {}: missing term column", i + 2)))?;
        let aliases = record
            .get(2)
            .ok_or_else(|| TallyError::Taxonomy(format!("row {}: missing alias column", i + 2)))?;
        rows.push(TaxonomyRow {
            canonical: normalize_string(canonical),
            aliases: ALIAS_SPLIT.split(aliases).map(normalize_string).collect(),
        });
    }
    Ok(rows)
}

/// Load and build the taxonomy index from a CSV file
pub fn load_taxonomy(
    path: impl AsRef<Path>,
    annotator: &dyn Annotator,
    plural: &dyn PluralStrategy,
) -> Result<Taxonomy> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| TallyError::Taxonomy(format!("failed to read {}: {}", path.display(), e)))?;
    let rows = parse_taxonomy_rows(text.as_bytes())?;
    let taxonomy = Taxonomy::build(&rows, annotator, plural);
    info!(
        "loaded {} taxonomy rows from {}: {} canonical terms, {} aliases",
        rows.len(),
        path.display(),
        taxonomy.canonical_count(),
        taxonomy.alias_count()
    );
    Ok(taxonomy)
}

/// Parse grocery-list lines: header row skipped, second column is the raw
/// line. Empty lines are dropped and survivors are string-normalized
/// before annotation.
pub fn parse_grocery_lines(reader: impl Read) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut lines = Vec::new();
    for (i, record) in csv_reader.records().enumerate() {
        let record = record?;
        let raw = record
            .get(1)
            .ok_or_else(|| TallyError::GroceryList(format!("row {}: missing list column", i + 2)))?;
        if raw.is_empty() {
            continue;
        }
        let line = normalize_string(raw);
        if !line.is_empty() {
            lines.push(line);
        }
    }
    Ok(lines)
}

/// Load grocery-list lines from a CSV file
pub fn load_grocery_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| TallyError::GroceryList(format!("failed to read {}: {}", path.display(), e)))?;
    let lines = parse_grocery_lines(text.as_bytes())?;
    info!("loaded {} grocery lines from {}", lines.len(), path.display());
    Ok(lines)
}
