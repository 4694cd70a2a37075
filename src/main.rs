use anyhow::Result;
use clap::Parser;
use grocery_tally::annotate::RuleAnnotator;
use grocery_tally::config::EngineConfig;
use grocery_tally::ingest;
use grocery_tally::matcher::MatchEngine;
use grocery_tally::report::TallyReport;
use grocery_tally::span::Annotator;
use grocery_tally::taxonomy::SuffixPlurals;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "grocery-tally")]
#[command(about = "Tally grocery list entries against a canonical taxonomy")]
struct Args {
    /// Path to the taxonomy CSV (default: ./taxonomy.csv)
    #[arg(short, long, default_value = "taxonomy.csv")]
    taxonomy: PathBuf,

    /// Path to the grocery lists CSV (default: ./groceries_list.csv)
    #[arg(short, long, default_value = "groceries_list.csv")]
    groceries: PathBuf,

    /// Where to write the canonical item report
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Where to write the unresolved term report
    #[arg(short, long, default_value = "unidentified.json")]
    unidentified: PathBuf,

    /// Occurrence count above which an unmatched form becomes a canonical
    /// item of its own
    #[arg(long, default_value_t = 5)]
    promote_threshold: u64,

    /// Raw span text to leave out of the unresolved report (repeatable)
    #[arg(long)]
    skip: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let annotator = RuleAnnotator::new();
    let taxonomy = ingest::load_taxonomy(&args.taxonomy, &annotator, &SuffixPlurals)?;
    let lines = ingest::load_grocery_lines(&args.groceries)?;

    info!("annotating {} grocery lines", lines.len());
    let chunked: Vec<_> = lines.iter().map(|line| annotator.annotate(line)).collect();

    let config = EngineConfig::new(args.promote_threshold).with_skip_terms(args.skip);
    let mut engine = MatchEngine::new(taxonomy, config);
    let outcome = engine.run(&chunked);

    let report = TallyReport::build(&outcome, engine.taxonomy());
    report.write_items(&args.output)?;
    report.write_unresolved(&args.unidentified)?;

    println!("{} canonical items", report.canonical_item_count());
    println!(
        "{} occurrences of those canonical items",
        report.occurrence_count()
    );
    println!("{} unidentified items", report.unresolved_term_count());
    println!(
        "{} occurrences of those unidentified items",
        report.unresolved_occurrence_count()
    );
    println!("Output written to {}", args.output.display());
    println!("Unidentified output written to {}", args.unidentified.display());
    println!("Done.");

    Ok(())
}
