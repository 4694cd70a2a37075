pub mod annotate;
pub mod config;
pub mod counts;
pub mod error;
pub mod ingest;
pub mod matcher;
pub mod normalize;
pub mod report;
pub mod span;
pub mod taxonomy;
