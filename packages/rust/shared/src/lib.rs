//! Shared types, error model, and configuration for the styleguide generator.
//!
//! This crate is the foundation depended on by all other styleguide crates.
//! It provides:
//! - [`StyleguideError`] — the unified error type
//! - Domain types ([`RawStyle`], [`AnnotationValue`], [`Element`])
//! - [`Diagnostics`] — the collector for non-fatal notices
//! - Configuration ([`AppConfig`], [`SubstitutionConfig`], config loading)

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CONFIG_FILE_NAME, ProjectConfig, SubstitutionConfig, SubstitutionSection,
    init_config, load_config, load_config_from, render_placeholder, validate_config,
};
pub use diagnostics::{Diagnostics, Notice, NoticeKind};
pub use error::{Result, StyleguideError};
pub use types::{AnnotationValue, Annotations, Element, RawStyle, SourcePosition};
