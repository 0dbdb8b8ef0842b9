pub mod model;

mod api;
pub mod args;
mod backup;
pub mod chart;
pub mod commands;
mod config;
pub mod entry;
mod error;
mod mcp;
pub mod normalize;
pub mod report;
mod utils;

pub use config::Config;
pub use error::Error;
pub use error::Result;
