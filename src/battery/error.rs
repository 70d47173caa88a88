use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error("expected exactly {expected} time steps, got {actual}")]
    TimeSteps { expected: usize, actual: usize },
}
