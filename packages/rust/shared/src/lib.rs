//! Shared types, error model, configuration, and the language registry
//! for Polidoc.
//!
//! This crate is the foundation depended on by all other Polidoc crates.
//! It provides:
//! - [`PolidocError`] — the unified error type
//! - Domain types ([`Entry`], [`YouthLed`], [`Region`])
//! - Configuration ([`AppConfig`], config loading)
//! - The static bilingual [`languages`] registry

pub mod config;
pub mod error;
pub mod languages;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ImportConfig, SearchConfig, StorageConfig, config_dir, config_file_path,
    expand_home, init_config, load_config, load_config_from,
};
pub use error::{PolidocError, Result};
pub use types::{Entry, Region, YouthLed};
