//! Configuration module for History-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; the defaults describe the French history service.
//!
//! # Example
//!
//! ```no_run
//! use history_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Pages are fetched every {}ms", config.site.pacing_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CredentialsConfig, OutputConfig, SiteConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, read_config, read_config_with_hash};
pub use validation::validate;
