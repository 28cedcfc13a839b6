//! Shared types, error model, and configuration for DraftForge.
//!
//! This crate is the foundation depended on by all other DraftForge crates.
//! It provides:
//! - [`DraftForgeError`] — the unified error type
//! - Domain types ([`ArticleInfo`], [`ArticleContent`], [`PromptTemplates`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GenerationConfig, SerpConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_keys,
};
pub use error::{DraftForgeError, Result};
pub use types::{
    ArticleContent, ArticleId, ArticleInfo, ArticleStatus, HeadingParagraph, PromptTemplates,
    QuestionAnswer, UsecaseId, UserId,
};
