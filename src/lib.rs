pub mod cli;
pub mod config;
pub mod contributors;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod util;

pub use error::{MetricsError, Result};
