pub mod api;
pub mod api_doc;
pub mod config;
pub mod metrics;
pub mod rate_limit;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::run_server;
