//! DocBlock recognition and annotation parsing.
//!
//! A DocBlock is a `/** ... */` comment whose lines carry a leading `*`:
//!
//! ```text
//! /**
//!  * Primary brand color.
//!  *
//!  * @color
//!  * @section Brand
//!  */
//! ```
//!
//! Free text before the first annotation becomes the `description`; every
//! `@key value` line becomes an annotation; indented lines continue the value
//! of the previous annotation.

use std::collections::VecDeque;

use styleguide_shared::{AnnotationValue, Annotations, Result, StyleguideError};

/// Marker that starts an annotation line.
const ANNOTATION_MARKER: char = '@';

/// Marker that starts every line of a DocBlock.
const CONTINUATION_MARKER: char = '*';

/// One parsed DocBlock line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAnnotation {
    /// `@key value` (or a bare `@key`, which is a `true` flag).
    KeyValue { key: String, value: AnnotationValue },
    /// Indented continuation of the previous annotation.
    Content(String),
}

/// Whether a comment body is a DocBlock.
pub fn is_doc_block(text: Option<&str>) -> bool {
    let Some(text) = text else {
        return false;
    };

    let mut lines = text.lines();
    match lines.next() {
        Some(first) if first.trim_start().starts_with(CONTINUATION_MARKER) => {}
        _ => return false,
    }

    lines.all(|line| line.trim().is_empty() || line.trim_start().starts_with(CONTINUATION_MARKER))
}

/// Strip the per-line `*` marker and one following space, keeping line breaks.
///
/// A bare `*` opening line at column 0 is dropped together with its line break.
/// Trailing whitespace is removed from every line.
pub fn remove_comment_chars(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let body = text.strip_prefix("*\n").unwrap_or(&text);

    body.split('\n')
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix(CONTINUATION_MARKER).unwrap_or(line);
            let line = line.strip_prefix(' ').unwrap_or(line);
            line.trim_end()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// An annotation line starts with `@` at column 0.
pub fn is_annotation_line(line: &str) -> bool {
    line.starts_with(ANNOTATION_MARKER)
}

/// Consume the free-text lines in front of the first annotation.
///
/// Returns `None` without touching `lines` when the first line is already an
/// annotation. Blank lines are consumed but not part of the result; a
/// description made only of blank lines is `None`.
pub fn get_description(lines: &mut VecDeque<String>) -> Option<String> {
    if lines.front().is_none_or(|line| is_annotation_line(line)) {
        return None;
    }

    let mut parts = Vec::new();
    while let Some(line) = lines.front() {
        if is_annotation_line(line) {
            break;
        }
        if let Some(line) = lines.pop_front() {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed.to_string());
            }
        }
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}

/// Parse one DocBlock line.
///
/// Annotation lines become key/value pairs, indented lines with visible text
/// become continuation content, everything else is ignored (`None`).
pub fn get_annotation(line: &str) -> Option<ParsedAnnotation> {
    if is_annotation_line(line) {
        let body = &line[ANNOTATION_MARKER.len_utf8()..];
        let (key, rest) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], body[i..].trim()),
            None => (body, ""),
        };
        if key.is_empty() {
            return None;
        }
        let value = if rest.is_empty() {
            AnnotationValue::Flag(true)
        } else {
            AnnotationValue::Text(rest.to_string())
        };
        return Some(ParsedAnnotation::KeyValue {
            key: key.to_string(),
            value,
        });
    }

    if line.starts_with(char::is_whitespace) && !line.trim().is_empty() {
        return Some(ParsedAnnotation::Content(line.trim_start().to_string()));
    }

    None
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Builds an annotation map line by line, tracking the most recent key so
/// that continuation lines know where they belong.
#[derive(Debug, Clone, Default)]
pub struct AnnotationAccumulator {
    map: Annotations,
    last_key: Option<String>,
}

impl AnnotationAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing map, with `last_key` as the continuation target.
    pub fn with_state(map: Annotations, last_key: Option<String>) -> Self {
        Self { map, last_key }
    }

    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    pub fn annotations(&self) -> &Annotations {
        &self.map
    }

    pub fn into_annotations(self) -> Annotations {
        self.map
    }

    /// Merge one parsed line into the map.
    ///
    /// Repeated keys are promoted to lists in first-seen order. Continuation
    /// content without an addressable previous key is a structural error.
    pub fn add(&mut self, annotation: ParsedAnnotation) -> Result<()> {
        match annotation {
            ParsedAnnotation::KeyValue { key, value } => {
                match self.map.remove(&key) {
                    None => {
                        self.map.insert(key.clone(), value);
                    }
                    Some(existing) => {
                        let mut items = into_entries(existing);
                        items.extend(into_entries(value));
                        self.map.insert(key.clone(), AnnotationValue::List(items));
                    }
                }
                self.last_key = Some(key);
                Ok(())
            }
            ParsedAnnotation::Content(content) => {
                let Some(key) = self.last_key.as_deref() else {
                    return Err(StyleguideError::structural(format!(
                        "multi-line annotation content '{content}' has no preceding annotation"
                    )));
                };
                let Some(existing) = self.map.get_mut(key) else {
                    return Err(StyleguideError::structural(format!(
                        "multi-line annotation content '{content}' refers to unknown annotation '@{key}'"
                    )));
                };

                match existing {
                    AnnotationValue::Flag(_) => *existing = AnnotationValue::Text(content),
                    AnnotationValue::Text(text) => {
                        text.push('\n');
                        text.push_str(&content);
                    }
                    AnnotationValue::List(items) => match items.last_mut() {
                        Some(last) => {
                            last.push('\n');
                            last.push_str(&content);
                        }
                        None => items.push(content),
                    },
                }
                Ok(())
            }
        }
    }
}

/// Flatten a value into list entries for promotion.
fn into_entries(value: AnnotationValue) -> Vec<String> {
    match value {
        AnnotationValue::Flag(b) => vec![b.to_string()],
        AnnotationValue::Text(s) => vec![s],
        AnnotationValue::List(items) => items,
    }
}

// ---------------------------------------------------------------------------
// Block-level helpers
// ---------------------------------------------------------------------------

/// Pop the node a DocBlock attaches to.
///
/// An empty queue means the DocBlock has nothing to document, which is a
/// structural error.
pub fn next_node<T>(queue: &mut VecDeque<T>) -> Result<T> {
    queue.pop_front().ok_or_else(|| {
        StyleguideError::structural("doc comment is not followed by a declaration")
    })
}

/// Parse a full DocBlock comment body into its annotation map.
pub fn parse_doc_block(text: &str) -> Result<Annotations> {
    let cleaned = remove_comment_chars(text);
    let mut lines: VecDeque<String> = cleaned.split('\n').map(String::from).collect();

    let mut acc = AnnotationAccumulator::new();
    if let Some(description) = get_description(&mut lines) {
        acc.add(ParsedAnnotation::KeyValue {
            key: "description".into(),
            value: AnnotationValue::Text(description),
        })?;
    }

    for line in &lines {
        if let Some(annotation) = get_annotation(line) {
            acc.add(annotation)?;
        }
    }

    Ok(acc.into_annotations())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
