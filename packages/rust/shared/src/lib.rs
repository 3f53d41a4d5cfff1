//! Shared types, error model, and configuration for dashtree.
//!
//! This crate is the foundation depended on by all other dashtree crates.
//! It provides:
//! - [`DashtreeError`]: the unified error type
//! - Domain types ([`ContentItem`], [`Filter`], [`LabelMap`])
//! - Configuration ([`AppConfig`], [`BuildOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, BuildOptions, RenderConfig, UnresolvedPolicy, config_dir,
    config_file_path, init_config, init_config_in, load_config, load_config_from,
};
pub use error::{DashtreeError, Result};
pub use types::{ContentItem, Filter, ItemKind, LabelMap};
