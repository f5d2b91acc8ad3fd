//! Typed style guide entities built from crawled [`RawStyle`] records.
//!
//! Every kind shares validation, section normalization and hashing; the
//! kind-specific parts (color channels, mixin parameters, icon naming) are
//! dispatched on [`EntityKind`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use styleguide_shared::{AnnotationValue, Annotations, Diagnostics, NoticeKind, RawStyle};

use crate::color::{self, ColorValues};

/// Section used when none is declared.
pub const DEFAULT_SECTION: &str = "Other";

/// Separator between section path segments.
pub const SECTION_SEPARATOR: char = '>';

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// The closed set of entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Color,
    Icon,
    Mixin,
    Nuclide,
    Atom,
    Molecule,
    Structure,
}

/// How an absent fillable annotation is defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Flag,
    Text,
}

/// One whitelisted annotation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub kind: FieldKind,
}

const fn text(key: &'static str) -> Field {
    Field {
        key,
        kind: FieldKind::Text,
    }
}

const fn flag(key: &'static str) -> Field {
    Field {
        key,
        kind: FieldKind::Flag,
    }
}

const COLOR_FIELDS: &[Field] = &[
    text("color"),
    text("section"),
    text("description"),
    flag("deprecated"),
];
const ICON_FIELDS: &[Field] = &[
    text("icon"),
    text("section"),
    text("markup"),
    text("description"),
    flag("deprecated"),
];
const MIXIN_FIELDS: &[Field] = &[
    text("mixin"),
    text("section"),
    text("description"),
    flag("deprecated"),
    text("param"),
    text("markup"),
];
const NUCLIDE_FIELDS: &[Field] = &[
    text("nuclide"),
    text("section"),
    text("description"),
    text("markup"),
    flag("deprecated"),
];
const ATOM_FIELDS: &[Field] = &[
    text("atom"),
    text("section"),
    text("description"),
    text("markup"),
    flag("deprecated"),
];
const MOLECULE_FIELDS: &[Field] = &[
    text("molecule"),
    text("section"),
    text("description"),
    text("markup"),
    flag("deprecated"),
];
const STRUCTURE_FIELDS: &[Field] = &[
    text("structure"),
    text("section"),
    text("description"),
    text("markup"),
    flag("deprecated"),
];

impl EntityKind {
    /// Every kind, highest type precedence first.
    pub const BY_PRECEDENCE: [EntityKind; 7] = [
        Self::Structure,
        Self::Molecule,
        Self::Atom,
        Self::Icon,
        Self::Nuclide,
        Self::Mixin,
        Self::Color,
    ];

    /// Annotation key that marks a record as this kind.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Icon => "icon",
            Self::Mixin => "mixin",
            Self::Nuclide => "nuclide",
            Self::Atom => "atom",
            Self::Molecule => "molecule",
            Self::Structure => "structure",
        }
    }

    pub fn fillable(self) -> &'static [Field] {
        match self {
            Self::Color => COLOR_FIELDS,
            Self::Icon => ICON_FIELDS,
            Self::Mixin => MIXIN_FIELDS,
            Self::Nuclide => NUCLIDE_FIELDS,
            Self::Atom => ATOM_FIELDS,
            Self::Molecule => MOLECULE_FIELDS,
            Self::Structure => STRUCTURE_FIELDS,
        }
    }

    /// Output page the entity is rendered on.
    pub fn location(self) -> &'static str {
        match self {
            Self::Color | Self::Mixin | Self::Nuclide => "nuclides.html",
            Self::Icon | Self::Atom => "atoms.html",
            Self::Molecule => "molecules.html",
            Self::Structure => "structures.html",
        }
    }

    /// Fixed leading section segments.
    fn section_prefix(self) -> &'static str {
        match self {
            Self::Color => "Nuclides > Colors",
            Self::Icon => "Atoms > Icons",
            Self::Mixin => "Nuclides > Mixins",
            Self::Nuclide => "Nuclides",
            Self::Atom => "Atoms",
            Self::Molecule => "Molecules",
            Self::Structure => "Structures",
        }
    }

    fn is_marker(key: &str) -> bool {
        Self::BY_PRECEDENCE.iter().any(|k| k.marker() == key)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.marker())
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One formal parameter of a mixin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub optional: bool,
    pub description: String,
}

/// Kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityDetails {
    Plain,
    Color { values: ColorValues },
    Mixin { parameters: Vec<Parameter> },
}

impl EntityDetails {
    pub fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

/// A validated, fully populated style guide entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub name: String,
    pub descriptor: String,
    pub section: String,
    pub description: String,
    pub deprecated: bool,
    pub hash: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    #[serde(skip_serializing_if = "EntityDetails::is_plain")]
    pub details: EntityDetails,
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Entity {
    /// Build an entity of `kind` from a crawled record.
    ///
    /// Returns `None` when validation fails; the reason is recorded in
    /// `diagnostics`.
    pub fn build(kind: EntityKind, raw: &RawStyle, diagnostics: &mut Diagnostics) -> Option<Entity> {
        let annotations = validate(kind, raw, diagnostics)?;
        let section = get_section(&annotations, raw, diagnostics);

        let entity = match kind {
            EntityKind::Color => build_color(raw, &annotations, &section, diagnostics),
            EntityKind::Icon => build_icon(raw, &annotations),
            EntityKind::Mixin => build_mixin(raw, &annotations, &section),
            EntityKind::Nuclide | EntityKind::Atom | EntityKind::Molecule | EntityKind::Structure => {
                build_generic(kind, raw, &annotations, &section)
            }
        }?;

        debug!(kind = %entity.kind, name = %entity.name, "entity built");
        Some(entity)
    }

    /// The color hex, for color entities.
    pub fn hex(&self) -> Option<&str> {
        match &self.details {
            EntityDetails::Color { values } => Some(&values.hex),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared behavior
// ---------------------------------------------------------------------------

/// Check a record's annotations against the whitelist of `kind`.
///
/// On success the returned map has every absent fillable field defaulted:
/// flags to `false`, text to `""`. Markers of other kinds are tolerated, an
/// ambiguous record has already been reported while resolving its type.
pub fn validate(kind: EntityKind, raw: &RawStyle, diagnostics: &mut Diagnostics) -> Option<Annotations> {
    let line = raw.element.line();

    let Some(annotations) = &raw.annotations else {
        diagnostics.warn_at(
            NoticeKind::Validation,
            format!("{kind} has no annotations"),
            &raw.file,
            line,
        );
        return None;
    };

    let fillable = kind.fillable();
    let unknown: Vec<&str> = annotations
        .keys()
        .map(String::as_str)
        .filter(|key| !fillable.iter().any(|f| f.key == *key) && !EntityKind::is_marker(key))
        .collect();
    if !unknown.is_empty() {
        let keys = unknown
            .iter()
            .map(|k| format!("@{k}"))
            .collect::<Vec<_>>()
            .join(", ");
        diagnostics.warn_at(
            NoticeKind::Validation,
            format!("{kind} does not accept {keys}"),
            &raw.file,
            line,
        );
        return None;
    }

    if let Some(section) = annotations.get("section") {
        if section.as_text().is_none() {
            diagnostics.warn_at(
                NoticeKind::Validation,
                format!("{kind} section must be a single line of text"),
                &raw.file,
                line,
            );
            return None;
        }
    }

    let mut filled = annotations.clone();
    for field in fillable {
        filled.entry(field.key.to_string()).or_insert_with(|| match field.kind {
            FieldKind::Flag => AnnotationValue::Flag(false),
            FieldKind::Text => AnnotationValue::Text(String::new()),
        });
    }
    Some(filled)
}

/// Normalize the declared section: outer separators and whitespace are
/// trimmed, segments re-joined with `" > "`, empty segments dropped.
///
/// Stray separators are repaired with a `MalformedSection` notice.
pub fn get_section(annotations: &Annotations, raw: &RawStyle, diagnostics: &mut Diagnostics) -> String {
    let declared = annotations
        .get("section")
        .and_then(AnnotationValue::as_text)
        .unwrap_or_default()
        .trim();

    let (section, repaired) = normalize_section(declared);
    if repaired {
        diagnostics.warn_at(
            NoticeKind::MalformedSection,
            format!("section '{declared}' has stray separators, using '{section}'"),
            &raw.file,
            raw.element.line(),
        );
    }

    if section.is_empty() {
        DEFAULT_SECTION.to_string()
    } else {
        section
    }
}

/// Returns the normalized path and whether any separator had to be removed.
pub fn normalize_section(declared: &str) -> (String, bool) {
    let segments: Vec<&str> = declared.split(SECTION_SEPARATOR).map(str::trim).collect();
    let repaired = declared.contains(SECTION_SEPARATOR) && segments.iter().any(|s| s.is_empty());
    let section = segments
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" > ");
    (section, repaired)
}

/// Content address over the kind, descriptor and annotations.
pub fn hash(kind: EntityKind, descriptor: &str, annotations: &Annotations) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.marker().as_bytes());
    hasher.update([0u8]);
    hasher.update(descriptor.as_bytes());
    for (key, value) in annotations {
        hasher.update([0u8]);
        hasher.update(key.as_bytes());
        hasher.update([1u8]);
        match value {
            AnnotationValue::Flag(b) => hasher.update(if *b { b"t" } else { b"f" }),
            AnnotationValue::Text(s) => hasher.update(s.as_bytes()),
            AnnotationValue::List(items) => {
                for item in items {
                    hasher.update(item.as_bytes());
                    hasher.update([2u8]);
                }
            }
        }
    }
    format!("{:x}", hasher.finalize())
}

fn text_of<'a>(annotations: &'a Annotations, key: &str) -> Option<&'a str> {
    annotations
        .get(key)
        .and_then(AnnotationValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn join_section(prefix: &str, section: &str) -> String {
    format!("{prefix} > {section}")
}

/// Fields every kind fills the same way.
struct Common {
    description: String,
    deprecated: bool,
    markup: Option<String>,
    file: PathBuf,
    line: Option<u32>,
}

impl Common {
    fn of(raw: &RawStyle, annotations: &Annotations) -> Self {
        Self {
            description: text_of(annotations, "description").unwrap_or_default().to_string(),
            deprecated: annotations.get("deprecated").is_some_and(AnnotationValue::is_truthy),
            markup: annotations
                .get("markup")
                .and_then(AnnotationValue::as_text)
                .filter(|m| !m.trim().is_empty())
                .map(str::to_string),
            file: raw.file.clone(),
            line: raw.element.line(),
        }
    }
}

// ---------------------------------------------------------------------------
// Variants
// ---------------------------------------------------------------------------

fn build_color(
    raw: &RawStyle,
    annotations: &Annotations,
    section: &str,
    diagnostics: &mut Diagnostics,
) -> Option<Entity> {
    let (Some(prop), Some(value)) = (raw.element.prop.as_deref(), raw.element.value.as_deref()) else {
        diagnostics.warn_at(
            NoticeKind::Validation,
            "color must document a variable declaration",
            &raw.file,
            raw.element.line(),
        );
        return None;
    };

    let value = strip_default(value);
    let Some(parsed) = color::parse(value) else {
        diagnostics.warn_at(
            NoticeKind::Validation,
            format!("'{value}' is not a color value"),
            &raw.file,
            raw.element.line(),
        );
        return None;
    };

    let mut common = Common::of(raw, annotations);
    if common.description.is_empty() {
        if let Some(shorthand) = text_of(annotations, "color") {
            common.description = shorthand.to_string();
        }
    }

    Some(Entity {
        kind: EntityKind::Color,
        name: prop.to_string(),
        descriptor: prop.to_string(),
        section: join_section(EntityKind::Color.section_prefix(), section),
        description: common.description,
        deprecated: common.deprecated,
        hash: hash(EntityKind::Color, prop, annotations),
        location: EntityKind::Color.location().to_string(),
        selector: None,
        markup: None,
        details: EntityDetails::Color {
            values: parsed.values(),
        },
        file: common.file,
        line: common.line,
    })
}

/// Drop a trailing `!default` flag from a variable value.
fn strip_default(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_suffix("!default")
        .map(str::trim_end)
        .unwrap_or(value)
}

fn build_icon(raw: &RawStyle, annotations: &Annotations) -> Option<Entity> {
    let common = Common::of(raw, annotations);
    let name = text_of(annotations, "icon")
        .or(raw.element.identifier())
        .unwrap_or_default()
        .to_string();

    Some(Entity {
        kind: EntityKind::Icon,
        descriptor: name.clone(),
        section: EntityKind::Icon.section_prefix().to_string(),
        hash: hash(EntityKind::Icon, &name, annotations),
        location: EntityKind::Icon.location().to_string(),
        selector: raw.element.rule_selector().map(str::to_string),
        name,
        description: common.description,
        deprecated: common.deprecated,
        markup: common.markup,
        details: EntityDetails::Plain,
        file: common.file,
        line: common.line,
    })
}

fn build_mixin(raw: &RawStyle, annotations: &Annotations, section: &str) -> Option<Entity> {
    let common = Common::of(raw, annotations);
    let params = raw.element.params.as_deref().unwrap_or_default().trim();
    let (name, arguments) = split_signature(params);

    let docs: Vec<(String, String)> = annotations
        .get("param")
        .map(AnnotationValue::entries)
        .unwrap_or_default()
        .into_iter()
        .filter_map(parse_param_doc)
        .collect();

    let parameters = arguments
        .into_iter()
        .map(|(name, optional)| {
            let description = docs
                .iter()
                .find(|(doc_name, _)| *doc_name == name)
                .map(|(_, d)| d.clone())
                .unwrap_or_default();
            Parameter {
                name,
                optional,
                description,
            }
        })
        .collect();

    let descriptor = format!("@mixin {params}");
    Some(Entity {
        kind: EntityKind::Mixin,
        name: text_of(annotations, "mixin").unwrap_or(name).to_string(),
        section: join_section(EntityKind::Mixin.section_prefix(), section),
        description: common.description,
        deprecated: common.deprecated,
        hash: hash(EntityKind::Mixin, &descriptor, annotations),
        location: EntityKind::Mixin.location().to_string(),
        descriptor,
        selector: None,
        markup: common.markup,
        details: EntityDetails::Mixin { parameters },
        file: common.file,
        line: common.line,
    })
}

/// Split `name ($a, $b: 1)` into the name and `(parameter, optional)` pairs.
pub fn split_signature(signature: &str) -> (&str, Vec<(String, bool)>) {
    let Some(open) = signature.find('(') else {
        return (signature.trim(), Vec::new());
    };
    let name = signature[..open].trim();
    let inner = signature[open + 1..]
        .trim_end()
        .strip_suffix(')')
        .unwrap_or(&signature[open + 1..]);

    let arguments = split_top_level(inner)
        .into_iter()
        .map(str::trim)
        .filter(|arg| !arg.is_empty())
        .map(|arg| {
            let (decl, optional) = match arg.split_once(':') {
                Some((decl, _default)) => (decl, true),
                None => (arg, false),
            };
            let name = decl
                .trim()
                .trim_start_matches('$')
                .trim_end_matches("...")
                .to_string();
            (name, optional)
        })
        .collect();

    (name, arguments)
}

/// Split on commas that are not nested inside parentheses.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// `"$width The target width"` → `("width", "The target width")`.
fn parse_param_doc(entry: &str) -> Option<(String, String)> {
    let entry = entry.trim();
    let (name, description) = match entry.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (entry, ""),
    };
    let name = name.trim_start_matches('$');
    (!name.is_empty()).then(|| (name.to_string(), description.to_string()))
}

fn build_generic(
    kind: EntityKind,
    raw: &RawStyle,
    annotations: &Annotations,
    section: &str,
) -> Option<Entity> {
    let common = Common::of(raw, annotations);
    let descriptor = raw.element.identifier().unwrap_or_default().to_string();
    let name = text_of(annotations, kind.marker())
        .unwrap_or(&descriptor)
        .to_string();

    Some(Entity {
        kind,
        name,
        section: join_section(kind.section_prefix(), section),
        description: common.description,
        deprecated: common.deprecated,
        hash: hash(kind, &descriptor, annotations),
        location: kind.location().to_string(),
        selector: raw.element.rule_selector().map(str::to_string),
        descriptor,
        markup: common.markup,
        details: EntityDetails::Plain,
        file: common.file,
        line: common.line,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use styleguide_shared::{Element, SourcePosition};

    fn raw(pairs: &[(&str, AnnotationValue)], element: Element) -> RawStyle {
        RawStyle {
            file: PathBuf::from("test.scss"),
            element,
            annotations: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            ),
        }
    }

    fn variable(prop: &str, value: &str) -> Element {
        Element {
            prop: Some(prop.into()),
            value: Some(value.into()),
            source: Some(SourcePosition { line: 4, column: 1 }),
            ..Default::default()
        }
    }

    fn rule(selector: &str) -> Element {
        Element {
            selector: Some(selector.into()),
            ..Default::default()
        }
    }

    #[test]
    fn builds_color_from_hex() {
        let style = raw(
            &[
                ("description", "Testcolor".into()),
                ("color", true.into()),
            ],
            variable("$c", "#00FF00"),
        );
        let mut diag = Diagnostics::new();
        let entity = Entity::build(EntityKind::Color, &style, &mut diag).unwrap();

        assert_eq!(entity.description, "Testcolor");
        assert_eq!(entity.section, "Nuclides > Colors > Other");
        assert_eq!(entity.location, "nuclides.html");
        assert_eq!(entity.name, "$c");
        let EntityDetails::Color { values } = &entity.details else {
            panic!("expected color details");
        };
        assert_eq!(values.hex, "#00FF00");
        assert_eq!(values.rgba, "rgba(0, 255, 0, 1)");
        assert_eq!(values.darker, "#00E600");
        assert!(diag.is_empty());

        let again = Entity::build(EntityKind::Color, &style, &mut diag).unwrap();
        assert_eq!(entity.hash, again.hash);
        assert_eq!(entity.hash.len(), 64);
    }

    #[test]
    fn color_shorthand_description_and_default_flag() {
        let style = raw(&[("color", "Link blue".into())], variable("$link", "#0000ff !default"));
        let mut diag = Diagnostics::new();
        let entity = Entity::build(EntityKind::Color, &style, &mut diag).unwrap();
        assert_eq!(entity.description, "Link blue");
        assert_eq!(entity.hex(), Some("#0000FF"));
        assert!(!entity.deprecated);
    }

    #[test]
    fn unparsable_color_is_rejected() {
        let style = raw(&[("color", true.into())], variable("$x", "lighten($c, 10%)"));
        let mut diag = Diagnostics::new();
        assert!(Entity::build(EntityKind::Color, &style, &mut diag).is_none());
        assert_eq!(diag.count(NoticeKind::Validation), 1);
    }

    #[test]
    fn extended_named_color_builds() {
        let style = raw(&[("color", true.into())], variable("$accent", "tomato !default"));
        let mut diag = Diagnostics::new();
        let entity = Entity::build(EntityKind::Color, &style, &mut diag).unwrap();
        assert_eq!(entity.hex(), Some("#FF6347"));
        assert!(diag.is_empty());
    }

    #[test]
    fn validation_rejects_unknown_keys() {
        let style = raw(
            &[("color", true.into()), ("markup", "<b></b>".into())],
            variable("$c", "#fff"),
        );
        let mut diag = Diagnostics::new();
        assert!(validate(EntityKind::Color, &style, &mut diag).is_none());
        assert_eq!(diag.count(NoticeKind::Validation), 1);
        assert_eq!(diag.notices()[0].line, Some(4));
    }

    #[test]
    fn validation_rejects_missing_annotations_and_list_sections() {
        let mut diag = Diagnostics::new();
        let bare = RawStyle::default();
        assert!(validate(EntityKind::Atom, &bare, &mut diag).is_none());

        let style = raw(
            &[
                ("atom", true.into()),
                ("section", AnnotationValue::List(vec!["A".into(), "B".into()])),
            ],
            rule(".a"),
        );
        assert!(validate(EntityKind::Atom, &style, &mut diag).is_none());
        assert_eq!(diag.count(NoticeKind::Validation), 2);
    }

    #[test]
    fn validation_fills_defaults() {
        let style = raw(&[("atom", true.into())], rule(".a"));
        let mut diag = Diagnostics::new();
        let filled = validate(EntityKind::Atom, &style, &mut diag).unwrap();
        assert_eq!(filled.get("deprecated"), Some(&AnnotationValue::Flag(false)));
        assert_eq!(filled.get("markup"), Some(&AnnotationValue::from("")));
        assert_eq!(filled.get("section"), Some(&AnnotationValue::from("")));
    }

    #[test]
    fn section_normalization() {
        let cases = [
            (" > Section > Sub >", "Section > Sub", true),
            ("Section>Sub", "Section > Sub", false),
            ("  Buttons  ", "Buttons", false),
            ("A >> B", "A > B", true),
            (">", "", true),
            ("", "", false),
        ];
        for (input, expected, repaired) in cases {
            assert_eq!(normalize_section(input), (expected.to_string(), repaired), "{input:?}");
        }
    }

    #[test]
    fn get_section_warns_and_defaults() {
        let mut diag = Diagnostics::new();
        let style = raw(&[("section", " > Section > Sub >".into())], rule(".a"));
        let annotations = style.annotations.clone().unwrap();
        assert_eq!(get_section(&annotations, &style, &mut diag), "Section > Sub");
        assert_eq!(diag.count(NoticeKind::MalformedSection), 1);

        let empty = Annotations::new();
        assert_eq!(get_section(&empty, &style, &mut diag), DEFAULT_SECTION);
        assert_eq!(diag.len(), 1);
    }

    #[test]
    fn hash_changes_with_identity() {
        let mut annotations = Annotations::new();
        annotations.insert("atom".into(), true.into());
        let a = hash(EntityKind::Atom, ".btn", &annotations);
        assert_eq!(a, hash(EntityKind::Atom, ".btn", &annotations));
        assert_ne!(a, hash(EntityKind::Molecule, ".btn", &annotations));
        assert_ne!(a, hash(EntityKind::Atom, ".card", &annotations));

        annotations.insert("description".into(), "changed".into());
        assert_ne!(a, hash(EntityKind::Atom, ".btn", &annotations));
    }

    #[test]
    fn builds_icon() {
        let style = raw(
            &[("icon", "close".into()), ("markup", "<i class=\"icon-close\"></i>".into())],
            rule(".icon-close"),
        );
        let mut diag = Diagnostics::new();
        let entity = Entity::build(EntityKind::Icon, &style, &mut diag).unwrap();
        assert_eq!(entity.name, "close");
        assert_eq!(entity.descriptor, "close");
        assert_eq!(entity.section, "Atoms > Icons");
        assert_eq!(entity.location, "atoms.html");
        assert_eq!(entity.selector.as_deref(), Some(".icon-close"));
    }

    #[test]
    fn builds_mixin_parameters() {
        let element = Element {
            selector: Some("@mixin".into()),
            params: Some("size ($width, $height: auto)".into()),
            ..Default::default()
        };
        let style = raw(
            &[
                ("mixin", true.into()),
                (
                    "param",
                    AnnotationValue::List(vec![
                        "width The target width".into(),
                        "$height The target height".into(),
                    ]),
                ),
            ],
            element,
        );
        let mut diag = Diagnostics::new();
        let entity = Entity::build(EntityKind::Mixin, &style, &mut diag).unwrap();

        assert_eq!(entity.name, "size");
        assert_eq!(entity.descriptor, "@mixin size ($width, $height: auto)");
        assert_eq!(entity.section, "Nuclides > Mixins > Other");
        let EntityDetails::Mixin { parameters } = &entity.details else {
            panic!("expected mixin details");
        };
        assert_eq!(
            parameters,
            &vec![
                Parameter {
                    name: "width".into(),
                    optional: false,
                    description: "The target width".into()
                },
                Parameter {
                    name: "height".into(),
                    optional: true,
                    description: "The target height".into()
                },
            ]
        );
    }

    #[test]
    fn signature_splitting() {
        assert_eq!(split_signature("clearfix"), ("clearfix", vec![]));
        assert_eq!(split_signature("clearfix()"), ("clearfix", vec![]));
        assert_eq!(
            split_signature("shadow($x, $c: rgba(0, 0, 0, 0.5), $rest...)"),
            (
                "shadow",
                vec![
                    ("x".to_string(), false),
                    ("c".to_string(), true),
                    ("rest".to_string(), false)
                ]
            )
        );
    }

    #[test]
    fn builds_generic_kinds() {
        let style = raw(
            &[
                ("molecule", "Card".into()),
                ("section", "Containers".into()),
                ("markup", "<div class=\"card\"></div>".into()),
                ("deprecated", true.into()),
            ],
            rule(".card"),
        );
        let mut diag = Diagnostics::new();
        let entity = Entity::build(EntityKind::Molecule, &style, &mut diag).unwrap();
        assert_eq!(entity.name, "Card");
        assert_eq!(entity.descriptor, ".card");
        assert_eq!(entity.section, "Molecules > Containers");
        assert_eq!(entity.location, "molecules.html");
        assert!(entity.deprecated);
        assert_eq!(entity.markup.as_deref(), Some("<div class=\"card\"></div>"));

        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["type"], "molecule");
    }

    #[test]
    fn other_type_markers_pass_validation() {
        let style = raw(&[("atom", true.into()), ("molecule", true.into())], rule(".x"));
        let mut diag = Diagnostics::new();
        assert!(Entity::build(EntityKind::Molecule, &style, &mut diag).is_some());
        assert!(diag.is_empty());
    }
}
