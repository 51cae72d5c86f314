//! CLI command implementations.

mod ask;
mod build;
mod config;
mod doctor;
mod search;
mod serve;

pub use ask::run_ask;
pub use build::run_build;
pub use config::run_config;
pub use doctor::run_doctor;
pub use search::run_search;
pub use serve::run_serve;
