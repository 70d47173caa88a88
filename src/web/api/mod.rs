pub mod error;
pub mod history;
pub mod predict;
pub mod status;
