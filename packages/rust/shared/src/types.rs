//! Core domain types shared by the crawler, the substitution engine and the
//! entity model.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AnnotationValue
// ---------------------------------------------------------------------------

/// Value of one annotation inside a DocBlock.
///
/// A key seen once holds a flag or text; repeating the key promotes the value
/// to an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Flag(bool),
    Text(String),
    List(Vec<String>),
}

impl AnnotationValue {
    /// Text content, if this is a single string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Entries of the value: none for a flag, one for text, every list item.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Flag(_) => Vec::new(),
            Self::Text(s) => vec![s.as_str()],
            Self::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the value counts as "set": a true flag or non-blank text/list.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Flag(b) => *b,
            Self::Text(s) => !s.trim().is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        Self::Flag(b)
    }
}

/// Annotation map of one DocBlock. Keys are stored without the leading `@`.
pub type Annotations = BTreeMap<String, AnnotationValue>;

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// 1-based location of a node in its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

/// The declaration a DocBlock is attached to.
///
/// Exactly which fields are set depends on the node: variables and properties
/// carry `prop` + `value`, rules carry `selector`, at-rules (mixins,
/// functions) carry `params` and a `selector` of the form `@mixin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourcePosition>,
}

impl Element {
    /// Selector without at-rule pseudo selectors (`@mixin`), if any.
    pub fn rule_selector(&self) -> Option<&str> {
        self.selector.as_deref().filter(|s| !s.starts_with('@'))
    }

    /// The most specific identifier this element has: selector, property or
    /// at-rule parameters.
    pub fn identifier(&self) -> Option<&str> {
        self.rule_selector()
            .or(self.prop.as_deref())
            .or(self.params.as_deref())
    }

    pub fn line(&self) -> Option<u32> {
        self.source.map(|s| s.line)
    }
}

// ---------------------------------------------------------------------------
// RawStyle
// ---------------------------------------------------------------------------

/// One DocBlock together with the declaration it documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStyle {
    /// Source file the record was crawled from.
    pub file: PathBuf,
    /// Attached syntax node.
    pub element: Element,
    /// Parsed annotations. `None` means the record carries no annotation map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

impl RawStyle {
    /// Look up a single annotation.
    pub fn annotation(&self, key: &str) -> Option<&AnnotationValue> {
        self.annotations.as_ref().and_then(|a| a.get(key))
    }
}
