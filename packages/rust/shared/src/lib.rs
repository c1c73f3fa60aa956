//! Shared types, error model, and configuration for blogdraft.
//!
//! This crate is the foundation depended on by all other blogdraft crates.
//! It provides:
//! - [`BlogDraftError`]: the unified error type
//! - The row model ([`Row`], [`PropertyValue`], [`FieldKind`])
//! - Configuration ([`AppConfig`], config loading, secret resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ColumnsConfig, NotionConfig, OpenAiConfig, PipelineConfig, SearchConfig,
    config_dir, config_file_path, init_config, init_config_at, load_config, load_config_from,
    resolve_secret,
};
pub use error::{BlogDraftError, Result};
pub use types::{FieldKind, PropertyValue, RichText, Row, SelectOption};
