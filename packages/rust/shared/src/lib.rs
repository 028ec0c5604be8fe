//! Shared error model and configuration for contentgate.
//!
//! This crate is the foundation depended on by all other contentgate crates.
//! It provides:
//! - [`ContentGateError`] — the unified error type
//! - Configuration ([`AppConfig`], [`ExtractorConfig`], [`QualityConfig`], config loading)

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ExtractorConfig, ExtractorSection, QualityConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{ContentGateError, Result};
