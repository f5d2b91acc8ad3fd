//! Type resolution and grouping.
//!
//! Decides which [`EntityKind`] each crawled record represents, builds the
//! entities, and arranges them into a section tree that maps to
//! `styleguide.json`.

use serde::Serialize;
use tracing::{debug, instrument};

use styleguide_shared::{Diagnostics, NoticeKind, RawStyle};

use crate::entity::{DEFAULT_SECTION, Entity, EntityKind, SECTION_SEPARATOR};

/// Section tree handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StyleGuide {
    pub sections: Vec<SectionNode>,
}

/// One segment of a section path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionNode {
    /// Last path segment, e.g. `Colors`.
    pub title: String,
    /// Full path up to and including this node, e.g. `Nuclides > Colors`.
    pub path: String,
    pub entities: Vec<Entity>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectionNode>,
}

impl StyleGuide {
    /// Every entity, depth-first in section order.
    pub fn entities(&self) -> Vec<&Entity> {
        fn collect<'a>(nodes: &'a [SectionNode], out: &mut Vec<&'a Entity>) {
            for node in nodes {
                out.extend(node.entities.iter());
                collect(&node.children, out);
            }
        }

        let mut out = Vec::new();
        collect(&self.sections, &mut out);
        out
    }

    /// Find a section node by its full path.
    pub fn section(&self, path: &str) -> Option<&SectionNode> {
        fn find<'a>(nodes: &'a [SectionNode], path: &str) -> Option<&'a SectionNode> {
            nodes.iter().find_map(|node| {
                if node.path == path {
                    Some(node)
                } else {
                    find(&node.children, path)
                }
            })
        }

        find(&self.sections, path)
    }
}

/// Whether `key` is present in the record's annotations.
pub fn has_annotation(key: &str, style: &RawStyle) -> bool {
    style.annotation(key).is_some()
}

/// Resolve the kind of a record from its type markers.
///
/// No marker: one `UnrecognizedType` notice and `None`. Several markers: two
/// `AmbiguousType` notices and the highest-precedence kind
/// (see [`EntityKind::BY_PRECEDENCE`]).
pub fn get_style_type(style: &RawStyle, diagnostics: &mut Diagnostics) -> Option<EntityKind> {
    let matches: Vec<EntityKind> = EntityKind::BY_PRECEDENCE
        .into_iter()
        .filter(|kind| has_annotation(kind.marker(), style))
        .collect();

    let identifier = style.element.identifier().unwrap_or("<anonymous>");
    let line = style.element.line();

    match matches.as_slice() {
        [] => {
            diagnostics.warn_at(
                NoticeKind::UnrecognizedType,
                format!("no type annotation on '{identifier}', skipped"),
                &style.file,
                line,
            );
            None
        }
        [kind] => Some(*kind),
        [winner, ..] => {
            let markers = matches
                .iter()
                .map(|k| format!("@{k}"))
                .collect::<Vec<_>>()
                .join(", ");
            diagnostics.warn_at(
                NoticeKind::AmbiguousType,
                format!("conflicting type annotations {markers} on '{identifier}'"),
                &style.file,
                line,
            );
            diagnostics.warn_at(
                NoticeKind::AmbiguousType,
                format!("treating '{identifier}' as {winner}"),
                &style.file,
                line,
            );
            Some(*winner)
        }
    }
}

/// Type and construct every record, dropping the ones that fail.
#[instrument(skip_all, fields(record_count = styles.len()))]
pub fn build_entities(styles: &[RawStyle], diagnostics: &mut Diagnostics) -> Vec<Entity> {
    let entities: Vec<Entity> = styles
        .iter()
        .filter_map(|style| {
            let kind = get_style_type(style, diagnostics)?;
            Entity::build(kind, style, diagnostics)
        })
        .collect();

    debug!(entities = entities.len(), "entities built");
    entities
}

/// Group entities by section path.
///
/// Sections keep first-seen order, entities keep input order within their
/// section.
#[instrument(skip_all, fields(entity_count = entities.len()))]
pub fn for_view(entities: Vec<Entity>) -> StyleGuide {
    let mut guide = StyleGuide::default();

    for entity in entities {
        let segments: Vec<String> = entity
            .section
            .split(SECTION_SEPARATOR)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        insert(&mut guide.sections, &segments, "", entity);
    }

    debug!(sections = guide.sections.len(), "section tree built");
    guide
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn insert(nodes: &mut Vec<SectionNode>, segments: &[String], parent: &str, entity: Entity) {
    let Some((title, rest)) = segments.split_first() else {
        insert(nodes, &[DEFAULT_SECTION.to_string()], parent, entity);
        return;
    };

    let index = match nodes.iter().position(|n| &n.title == title) {
        Some(index) => index,
        None => {
            let path = if parent.is_empty() {
                title.clone()
            } else {
                format!("{parent} > {title}")
            };
            nodes.push(SectionNode {
                title: title.clone(),
                path,
                entities: Vec::new(),
                children: Vec::new(),
            });
            nodes.len() - 1
        }
    };

    let node = &mut nodes[index];
    if rest.is_empty() {
        node.entities.push(entity);
    } else {
        let path = node.path.clone();
        insert(&mut node.children, rest, &path, entity);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use styleguide_shared::{AnnotationValue, Annotations, Element, SourcePosition};

    fn style(keys: &[(&str, AnnotationValue)], selector: &str) -> RawStyle {
        let annotations: Annotations = keys
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        RawStyle {
            file: PathBuf::from("types.scss"),
            element: Element {
                selector: Some(selector.into()),
                source: Some(SourcePosition { line: 12, column: 1 }),
                ..Default::default()
            },
            annotations: Some(annotations),
        }
    }

    #[test]
    fn has_annotation_checks_keys() {
        let s = style(&[("atom", true.into())], ".a");
        assert!(has_annotation("atom", &s));
        assert!(!has_annotation("molecule", &s));
        assert!(!has_annotation("atom", &RawStyle::default()));
    }

    #[test]
    fn single_marker_resolves_quietly() {
        let mut diag = Diagnostics::new();
        let s = style(&[("molecule", true.into())], ".m");
        assert_eq!(get_style_type(&s, &mut diag), Some(EntityKind::Molecule));
        assert!(diag.is_empty());
    }

    #[test]
    fn missing_marker_is_reported_with_location() {
        let mut diag = Diagnostics::new();
        let s = style(&[("description", "Just words".into())], ".x");
        assert_eq!(get_style_type(&s, &mut diag), None);
        assert_eq!(diag.count(NoticeKind::UnrecognizedType), 1);
        let notice = &diag.notices()[0];
        assert_eq!(notice.file.as_deref(), Some(std::path::Path::new("types.scss")));
        assert_eq!(notice.line, Some(12));
    }

    #[test]
    fn grouping_marker_outranks_primitive_with_two_warnings() {
        let mut diag = Diagnostics::new();
        let s = style(&[("color", true.into()), ("nuclide", true.into())], ".n");
        assert_eq!(get_style_type(&s, &mut diag), Some(EntityKind::Nuclide));
        assert_eq!(diag.count(NoticeKind::AmbiguousType), 2);
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn precedence_is_total() {
        let all: Vec<(&str, AnnotationValue)> = EntityKind::BY_PRECEDENCE
            .iter()
            .map(|k| (k.marker(), AnnotationValue::Flag(true)))
            .collect();
        let mut diag = Diagnostics::new();
        assert_eq!(get_style_type(&style(&all, ".all"), &mut diag), Some(EntityKind::Structure));

        let s = style(&[("atom", true.into()), ("molecule", true.into())], ".am");
        assert_eq!(get_style_type(&s, &mut diag), Some(EntityKind::Molecule));
        let s = style(&[("mixin", true.into()), ("icon", true.into())], ".mi");
        assert_eq!(get_style_type(&s, &mut diag), Some(EntityKind::Icon));
    }

    #[test]
    fn build_entities_drops_untyped_and_invalid() {
        let mut diag = Diagnostics::new();
        let styles = vec![
            style(&[("atom", true.into())], ".a"),
            style(&[("description", "untyped".into())], ".b"),
            style(&[("atom", true.into()), ("bogus", true.into())], ".c"),
            style(&[("structure", true.into())], ".d"),
        ];
        let entities = build_entities(&styles, &mut diag);
        let names: Vec<&str> = entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".a", ".d"]);
        assert_eq!(diag.count(NoticeKind::UnrecognizedType), 1);
        assert_eq!(diag.count(NoticeKind::Validation), 1);
    }

    #[test]
    fn for_view_groups_by_section_in_first_seen_order() {
        let mut diag = Diagnostics::new();
        let styles = vec![
            style(&[("atom", true.into()), ("section", "Buttons".into())], ".btn"),
            style(&[("molecule", true.into())], ".card"),
            style(&[("atom", true.into()), ("section", "Forms".into())], ".input"),
            style(&[("atom", true.into()), ("section", "Buttons".into())], ".btn-small"),
        ];
        let guide = for_view(build_entities(&styles, &mut diag));

        let titles: Vec<&str> = guide.sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Atoms", "Molecules"]);

        let atoms = &guide.sections[0];
        assert!(atoms.entities.is_empty());
        let children: Vec<&str> = atoms.children.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(children, vec!["Atoms > Buttons", "Atoms > Forms"]);

        let buttons = guide.section("Atoms > Buttons").unwrap();
        let names: Vec<&str> = buttons.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec![".btn", ".btn-small"]);

        let all: Vec<&str> = guide.entities().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(all, vec![".btn", ".btn-small", ".input", ".card"]);
    }

    #[test]
    fn for_view_of_nothing_is_empty() {
        assert_eq!(for_view(Vec::new()), StyleGuide::default());
    }
}
