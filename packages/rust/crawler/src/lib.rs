//! Stylesheet crawler: finds DocBlocks and turns them into [`RawStyle`] records.
//!
//! This crate provides:
//! - [`syntax`] — a minimal SCSS scanner producing a node tree
//! - [`docblock`] — DocBlock recognition and the annotation accumulator
//! - [`process_file`] / [`process_files`] — the per-file and multi-file crawl
//! - [`discover_files`] — glob expansion for the input set

pub mod docblock;
pub mod syntax;

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use styleguide_shared::{Element, RawStyle, Result, StyleguideError};

pub use docblock::{
    AnnotationAccumulator, ParsedAnnotation, get_annotation, get_description, is_annotation_line,
    is_doc_block, next_node, parse_doc_block, remove_comment_chars,
};
pub use syntax::Node;

/// Crawl one stylesheet from disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn process_file(path: &Path) -> Result<Vec<RawStyle>> {
    let source = std::fs::read_to_string(path).map_err(|e| StyleguideError::io(path, e))?;
    process_source(path, &source)
}

/// Crawl stylesheet source that is already in memory. `path` is recorded on
/// every produced record.
pub fn process_source(path: &Path, source: &str) -> Result<Vec<RawStyle>> {
    let nodes = syntax::parse(path, source)?;
    let mut styles = Vec::new();
    walk(nodes, path, &mut styles)?;
    debug!(records = styles.len(), "file crawled");
    Ok(styles)
}

/// Sort and de-duplicate input paths. Crawl order is path order.
pub fn sort_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut sorted = paths.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted
}

/// Crawl several files sequentially, in path order.
///
/// `on_file(path, current, total)` is called after each file. The first fatal
/// error aborts the whole crawl.
#[instrument(skip_all, fields(file_count = paths.len()))]
pub fn process_files<F>(paths: &[PathBuf], mut on_file: F) -> Result<Vec<RawStyle>>
where
    F: FnMut(&Path, usize, usize),
{
    let sorted = sort_paths(paths);
    let total = sorted.len();

    let mut styles = Vec::new();
    for (i, path) in sorted.iter().enumerate() {
        styles.extend(process_file(path)?);
        on_file(path, i + 1, total);
    }

    info!(records = styles.len(), "crawl complete");
    Ok(styles)
}

/// Expand glob patterns into a sorted, de-duplicated list of files.
pub fn discover_files(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for pattern in patterns {
        let entries = glob::glob(pattern).map_err(|e| {
            StyleguideError::config(format!("invalid glob pattern '{pattern}': {e}"))
        })?;

        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => {
                    files.insert(path);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "skipping unreadable path"),
            }
        }
    }

    debug!(count = files.len(), "files discovered");
    Ok(files.into_iter().collect())
}

// ---------------------------------------------------------------------------
// Tree walk
// ---------------------------------------------------------------------------

/// Walk the children of one container as a queue, attaching every DocBlock to
/// the node that follows it.
fn walk(nodes: Vec<Node>, file: &Path, out: &mut Vec<RawStyle>) -> Result<()> {
    let mut queue: VecDeque<Node> = nodes.into();

    while let Some(node) = queue.pop_front() {
        match node {
            Node::Comment { text, position } => {
                if !is_doc_block(Some(&text)) {
                    continue;
                }

                let annotations = parse_doc_block(&text).map_err(|e| with_location(e, file, position.line))?;

                let Some(target) = attached_node(&mut queue, file, position.line)? else {
                    debug!(line = position.line, "doc comment followed by another doc comment, skipped");
                    continue;
                };

                let (element, children) = element_of(target);
                out.push(RawStyle {
                    file: file.to_path_buf(),
                    element,
                    annotations: Some(annotations),
                });
                walk(children, file, out)?;
            }
            Node::Rule { children, .. } | Node::AtRule { children, .. } => {
                walk(children, file, out)?;
            }
            Node::Declaration { .. } => {}
        }
    }

    Ok(())
}

/// Take the node a DocBlock documents, skipping plain comments in between.
///
/// Returns `None` (leaving the queue positioned on it) when the next
/// candidate is itself a DocBlock.
fn attached_node(queue: &mut VecDeque<Node>, file: &Path, line: u32) -> Result<Option<Node>> {
    loop {
        let next = next_node(queue).map_err(|e| with_location(e, file, line))?;
        match &next {
            Node::Comment { text, .. } if is_doc_block(Some(text)) => {
                queue.push_front(next);
                return Ok(None);
            }
            Node::Comment { .. } => continue,
            _ => return Ok(Some(next)),
        }
    }
}

/// Map an attached node to its element description plus nested children.
fn element_of(node: Node) -> (Element, Vec<Node>) {
    match node {
        Node::Declaration {
            prop,
            value,
            position,
        } => (
            Element {
                prop: Some(prop),
                value: Some(value),
                source: Some(position),
                ..Default::default()
            },
            Vec::new(),
        ),
        Node::Rule {
            selector,
            position,
            children,
        } => (
            Element {
                selector: Some(selector),
                source: Some(position),
                ..Default::default()
            },
            children,
        ),
        Node::AtRule {
            name,
            params,
            position,
            children,
        } => (
            Element {
                selector: Some(format!("@{name}")),
                params: Some(params),
                source: Some(position),
                ..Default::default()
            },
            children,
        ),
        Node::Comment { position, .. } => (
            Element {
                source: Some(position),
                ..Default::default()
            },
            Vec::new(),
        ),
    }
}

/// Prefix a structural error with the file and line of the offending DocBlock.
fn with_location(err: StyleguideError, file: &Path, line: u32) -> StyleguideError {
    match err {
        StyleguideError::Structural { message } => {
            StyleguideError::structural(format!("{}:{line}: {message}", file.display()))
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use styleguide_shared::AnnotationValue;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(format!("../../../fixtures/scss/{name}"))
    }

    #[test]
    fn process_colors_fixture() {
        let styles = process_file(&fixture("colors.scss")).expect("crawl colors");
        assert_eq!(styles.len(), 3);

        let first = &styles[0];
        assert_eq!(first.element.prop.as_deref(), Some("$brand-green"));
        assert_eq!(first.element.value.as_deref(), Some("#00FF00 !default"));
        assert_eq!(first.annotation("color"), Some(&AnnotationValue::Flag(true)));
        assert_eq!(
            first.annotation("description"),
            Some(&AnnotationValue::from("Primary brand green."))
        );
        assert_eq!(first.element.line(), Some(9));

        assert_eq!(
            styles[1].annotation("color"),
            Some(&AnnotationValue::from("Link blue"))
        );
        assert_eq!(styles[2].element.prop.as_deref(), Some("$overlay"));
    }

    #[test]
    fn process_component_fixture_in_discovery_order() {
        let styles = process_file(&fixture("component.scss")).expect("crawl component");
        let ids: Vec<&str> = styles
            .iter()
            .map(|s| s.element.identifier().unwrap_or(""))
            .collect();
        assert_eq!(
            ids,
            vec![
                ".btn",
                "&:hover",
                ".card",
                "size ($width, $height: auto)",
                ".icon-close",
                ".page-header"
            ]
        );

        let mixin = &styles[3];
        assert_eq!(mixin.element.selector.as_deref(), Some("@mixin"));
        assert_eq!(
            mixin.annotation("param"),
            Some(&AnnotationValue::List(vec![
                "width The target width".into(),
                "$height The target height".into()
            ]))
        );

        let card = &styles[2];
        let markup = card.annotation("markup").and_then(|v| v.as_text()).unwrap();
        assert!(markup.starts_with("<div class=\"card\">"));
        assert!(markup.contains("@{include:.btn}"));
    }

    #[test]
    fn trailing_doc_comment_is_fatal() {
        let err = process_file(&fixture("orphan.scss")).unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("orphan.scss:3"));
    }

    #[test]
    fn plain_comments_between_doc_and_declaration_are_skipped() {
        let source = "/**\n * @color\n */\n/* note */\n$a: red;";
        let styles = process_source(Path::new("inline.scss"), source).unwrap();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].element.prop.as_deref(), Some("$a"));
    }

    #[test]
    fn consecutive_doc_comments_attach_the_last_one() {
        let source = "/**\n * File header\n */\n/**\n * @color\n */\n$a: red;";
        let styles = process_source(Path::new("inline.scss"), source).unwrap();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].annotation("color"), Some(&AnnotationValue::Flag(true)));
    }

    #[test]
    fn line_comments_inside_values_do_not_abort() {
        let source = "/**\n * @color\n */\n$a: red;\n\n$map: (\n  a: 1, // don't touch\n  b: 2\n);\n";
        let styles = process_source(Path::new("map.scss"), source).unwrap();
        assert_eq!(styles.len(), 1);
        assert_eq!(styles[0].element.prop.as_deref(), Some("$a"));
    }

    #[test]
    fn files_without_doc_comments_yield_nothing() {
        let styles = process_source(Path::new("plain.scss"), "/* hi */\n.a { color: red; }").unwrap();
        assert!(styles.is_empty());
        let styles = process_source(Path::new("empty.scss"), "").unwrap();
        assert!(styles.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = process_file(Path::new("does/not/exist.scss")).unwrap_err();
        assert!(matches!(err, StyleguideError::Io { .. }));
    }

    #[test]
    fn process_files_sorts_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let b = dir.path().join("b.scss");
        let a = dir.path().join("a.scss");
        std::fs::write(&b, "/**\n * @color\n */\n$b: blue;").unwrap();
        std::fs::write(&a, "/**\n * @color\n */\n$a: red;").unwrap();

        let mut seen = Vec::new();
        let styles = process_files(&[b.clone(), a.clone(), b.clone()], |path, current, total| {
            seen.push((path.to_path_buf(), current, total));
        })
        .unwrap();
        assert_eq!(styles.len(), 2);
        assert_eq!(styles[0].file, a);
        assert_eq!(seen, vec![(a, 1, 2), (b, 2, 2)]);
    }

    #[test]
    fn discover_files_expands_globs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("one.scss"), "").unwrap();
        std::fs::write(dir.path().join("nested/two.scss"), "").unwrap();
        std::fs::write(dir.path().join("skip.css"), "").unwrap();

        let pattern = format!("{}/**/*.scss", dir.path().display());
        let files = discover_files(&[pattern.clone(), pattern]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.extension().is_some_and(|e| e == "scss")));
    }

    #[test]
    fn discover_files_rejects_bad_pattern() {
        assert!(discover_files(&["[".to_string()]).is_err());
    }
}
