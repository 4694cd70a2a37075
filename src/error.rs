use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Grocery list error: {0}")]
    GroceryList(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TallyError>;
