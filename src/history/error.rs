use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Battery data not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing column `{0}`")]
    MissingColumn(&'static str),
}
