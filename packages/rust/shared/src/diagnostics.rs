//! Collector for non-fatal notices.
//!
//! Every stage receives a `&mut Diagnostics` and records recoverable problems
//! here instead of failing. Each recorded notice is also emitted as a
//! `tracing` warning.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Category of a non-fatal notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Annotation set rejected by an entity's whitelist.
    Validation,
    /// Section path had stray separators and was repaired.
    MalformedSection,
    /// Several type markers on one record.
    AmbiguousType,
    /// No type marker on a record; the record is dropped.
    UnrecognizedType,
    /// Shortcode names an unregistered method.
    InvalidSubstitution,
    /// `include` shortcode names an unknown or pseudo selector.
    UnknownSelector,
}

/// A single recorded notice.
#[derive(Debug, Clone, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

/// Ordered list of notices gathered during a run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    notices: Vec<Notice>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notice without source location.
    pub fn warn(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.push(Notice {
            kind,
            message: message.into(),
            file: None,
            line: None,
        });
    }

    /// Record a notice tied to a source file and, if known, a line.
    pub fn warn_at(
        &mut self,
        kind: NoticeKind,
        message: impl Into<String>,
        file: &Path,
        line: Option<u32>,
    ) {
        self.push(Notice {
            kind,
            message: message.into(),
            file: Some(file.to_path_buf()),
            line,
        });
    }

    fn push(&mut self, notice: Notice) {
        match (&notice.file, notice.line) {
            (Some(file), Some(line)) => tracing::warn!(
                kind = ?notice.kind,
                file = %file.display(),
                line,
                "{}",
                notice.message
            ),
            (Some(file), None) => {
                tracing::warn!(kind = ?notice.kind, file = %file.display(), "{}", notice.message)
            }
            _ => tracing::warn!(kind = ?notice.kind, "{}", notice.message),
        }
        self.notices.push(notice);
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    /// Number of notices of one kind.
    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices.iter().filter(|n| n.kind == kind).count()
    }
}
