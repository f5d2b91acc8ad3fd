//! Flat search records for the client-side search UI.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::entity::{Entity, EntityKind};
use crate::transform::StyleGuide;

/// Maximum preview length, in characters.
const PREVIEW_CHARS: usize = 160;

/// One searchable entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub name: String,
    pub section: String,
    pub preview: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub descriptor: String,
    pub hash: String,
    pub location: String,
}

impl From<&Entity> for SearchRecord {
    fn from(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            section: entity.section.clone(),
            preview: preview(entity),
            kind: entity.kind,
            descriptor: entity.descriptor.clone(),
            hash: entity.hash.clone(),
            location: entity.location.clone(),
        }
    }
}

/// One record per entity, depth-first over the section tree.
#[instrument(skip_all)]
pub fn build_index(guide: &StyleGuide) -> Vec<SearchRecord> {
    let records: Vec<SearchRecord> = guide.entities().into_iter().map(SearchRecord::from).collect();
    debug!(records = records.len(), "search index built");
    records
}

/// Markup if present, else the color hex, else the description.
fn preview(entity: &Entity) -> String {
    let source = entity
        .markup
        .as_deref()
        .or(entity.hex())
        .unwrap_or(&entity.description);

    let collapsed = source.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}…", &collapsed[..cut]),
        None => collapsed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{build_entities, for_view};
    use std::path::PathBuf;
    use styleguide_shared::{AnnotationValue, Annotations, Diagnostics, Element, RawStyle};

    fn style(keys: &[(&str, AnnotationValue)], element: Element) -> RawStyle {
        let annotations: Annotations = keys
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        RawStyle {
            file: PathBuf::from("search.scss"),
            element,
            annotations: Some(annotations),
        }
    }

    fn guide() -> StyleGuide {
        let styles = vec![
            style(
                &[
                    ("atom", "Button".into()),
                    ("markup", "<button>\n  Go\n</button>".into()),
                ],
                Element {
                    selector: Some(".btn".into()),
                    ..Default::default()
                },
            ),
            style(
                &[("color", "Brand".into())],
                Element {
                    prop: Some("$brand".into()),
                    value: Some("#00ff00".into()),
                    ..Default::default()
                },
            ),
            style(
                &[("structure", true.into()), ("description", "Page frame".into())],
                Element {
                    selector: Some(".page".into()),
                    ..Default::default()
                },
            ),
        ];
        let mut diag = Diagnostics::new();
        for_view(build_entities(&styles, &mut diag))
    }

    #[test]
    fn one_record_per_entity_with_previews() {
        let index = build_index(&guide());
        assert_eq!(index.len(), 3);

        let button = index.iter().find(|r| r.name == "Button").unwrap();
        assert_eq!(button.preview, "<button> Go </button>");
        assert_eq!(button.section, "Atoms > Other");
        assert_eq!(button.kind, EntityKind::Atom);
        assert_eq!(button.location, "atoms.html");

        let color = index.iter().find(|r| r.name == "$brand").unwrap();
        assert_eq!(color.preview, "#00FF00");

        let page = index.iter().find(|r| r.name == ".page").unwrap();
        assert_eq!(page.preview, "Page frame");
        assert_eq!(page.descriptor, ".page");
    }

    #[test]
    fn records_follow_tree_order() {
        let g = guide();
        let index = build_index(&g);
        let hashes: Vec<&str> = index.iter().map(|r| r.hash.as_str()).collect();
        let expected: Vec<&str> = g.entities().iter().map(|e| e.hash.as_str()).collect();
        assert_eq!(hashes, expected);
    }

    #[test]
    fn long_previews_are_truncated() {
        let mut entity = guide().entities()[0].clone();
        entity.markup = Some("x".repeat(500));
        let record = SearchRecord::from(&entity);
        assert_eq!(record.preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(record.preview.ends_with('…'));
    }

    #[test]
    fn serializes_kind_as_type() {
        let index = build_index(&guide());
        let json = serde_json::to_value(&index[0]).unwrap();
        assert!(json.get("type").is_some());
        assert!(json.get("kind").is_none());
    }
}
