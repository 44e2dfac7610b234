pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod repl;

pub use config::Config;
pub use error::NodeError;
