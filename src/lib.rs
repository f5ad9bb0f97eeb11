pub mod analysis;
pub mod api;
pub mod calls;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod scanner;
pub mod utils;
pub mod validation;

pub use analysis::{AnalysisResult, TokenEvaluator};
pub use error::{Error, Result};

#[cfg(test)]
pub mod tests;
