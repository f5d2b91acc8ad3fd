//! Core domain logic and pipeline orchestration for the styleguide generator.
//!
//! This crate turns crawled DocBlock records into typed entities, resolves
//! markup shortcodes, groups everything into a section tree and writes the
//! result to disk.

pub mod color;
pub mod entity;
pub mod export;
pub mod pipeline;
pub mod search;
pub mod transform;

pub use entity::{Entity, EntityDetails, EntityKind, Parameter};
pub use export::{ExportMeta, ExportResult, Manifest, export};
pub use pipeline::{PipelineConfig, PipelineOutput, ProgressReporter, SilentProgress, run};
pub use search::{SearchRecord, build_index};
pub use transform::{SectionNode, StyleGuide, build_entities, for_view, get_style_type, has_annotation};
