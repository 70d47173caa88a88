mod error;
mod storage;

pub use error::HistoryError;
pub use storage::{DischargeRecord, HistoryStore};
