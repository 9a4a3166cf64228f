pub mod models;
pub mod methods;
pub mod verdict;
pub mod auth;
pub mod params;
pub mod engine;
pub mod scanner;
pub mod campaign;
pub mod input;
pub mod config;
pub mod reporting;
pub mod logging;

// Re-export commonly used items
pub use models::*;
pub use methods::*;
pub use verdict::*;
pub use auth::*;
pub use engine::*;
pub use scanner::*;
pub use campaign::*;
pub use reporting::{render, write_report, OutputFormat, ReportError};
pub use config::{ConfigError, ScanConfig};
