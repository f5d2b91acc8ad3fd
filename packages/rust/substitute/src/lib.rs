//! Shortcode substitution for markup annotations.
//!
//! Markup may embed `@{method:arg1:arg2}` placeholders. Each one is resolved
//! through a registry of methods and replaced in place:
//!
//! - `@{lipsum:3:words}` — filler text (`words`, `sentences`, `paragraphs`)
//! - `@{image:300:200}` — placeholder image URL
//! - `@{include:.btn}` — markup of another documented selector
//!
//! Substitution is two-phase: a [`SelectorIndex`] is built from the complete
//! entity set first, then every markup string is run through a [`Substitutor`]
//! holding that index.

pub mod lipsum;

use std::collections::HashMap;
use std::sync::LazyLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use tracing::debug;

use styleguide_shared::{Diagnostics, NoticeKind, SubstitutionConfig, render_placeholder};

use crate::lipsum::Unit;

/// Separates method name and arguments inside a shortcode.
const ARG_DELIMITER: char = ':';

/// Seed for deterministic filler text and images.
const STATIC_SEED: u64 = 0x5eed;

/// How deep resolved text is expanded again; bounds self-including markup.
const MAX_DEPTH: usize = 16;

/// Largest `lipsum` count honored.
const MAX_LIPSUM_COUNT: usize = 1000;

/// Default image placeholder service.
const DEFAULT_IMAGE_BASE: &str = "https://unsplash.it";

/// Image side used when `image` gets no dimensions.
const DEFAULT_IMAGE_SIZE: &str = "300";

/// Leftmost, shortest shortcode token.
static SHORTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@\{([^}]+)\}").expect("shortcode regex"));

/// Signature of a registered shortcode method.
pub type ShortcodeFn = fn(&Substitutor, &[&str], &mut Diagnostics) -> String;

// ---------------------------------------------------------------------------
// SelectorIndex
// ---------------------------------------------------------------------------

/// Plain selector → markup, collected once from all entities.
#[derive(Debug, Clone, Default)]
pub struct SelectorIndex {
    map: HashMap<String, String>,
}

impl SelectorIndex {
    /// Build the index. Pseudo selectors (containing `:`) and empty markup are
    /// skipped; for duplicate selectors the first one seen wins.
    pub fn build<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut map = HashMap::new();
        for (selector, markup) in items {
            let selector = selector.trim();
            if selector.is_empty() || selector.contains(':') || markup.trim().is_empty() {
                continue;
            }
            map.entry(selector.to_string())
                .or_insert_with(|| markup.to_string());
        }
        debug!(selectors = map.len(), "selector index built");
        Self { map }
    }

    pub fn get(&self, selector: &str) -> Option<&str> {
        self.map.get(selector).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Substitutor
// ---------------------------------------------------------------------------

/// Resolves shortcodes against a registry of methods.
pub struct Substitutor {
    config: SubstitutionConfig,
    index: SelectorIndex,
    methods: HashMap<&'static str, ShortcodeFn>,
}

impl Substitutor {
    /// Create a substitutor with the built-in methods registered.
    pub fn new(config: SubstitutionConfig, index: SelectorIndex) -> Self {
        let mut methods: HashMap<&'static str, ShortcodeFn> = HashMap::new();
        methods.insert("lipsum", lipsum_method);
        methods.insert("include", include_method);
        methods.insert("image", image_method);

        Self {
            config,
            index,
            methods,
        }
    }

    /// Register (or replace) a shortcode method.
    pub fn register(&mut self, name: &'static str, method: ShortcodeFn) {
        self.methods.insert(name, method);
    }

    pub fn index(&self) -> &SelectorIndex {
        &self.index
    }

    /// Replace every shortcode in `markup`, left to right.
    ///
    /// Resolved text is expanded again, so included markup gets its own
    /// shortcodes replaced. Past a fixed nesting depth the token is
    /// left in place and reported. Blank input and input without shortcodes
    /// are returned unchanged. Resolution failures degrade to an empty
    /// replacement plus a notice.
    pub fn substitute(&self, markup: &str, diagnostics: &mut Diagnostics) -> String {
        if markup.trim().is_empty() {
            return markup.to_string();
        }
        self.expand(markup, 0, diagnostics)
    }

    fn expand(&self, markup: &str, depth: usize, diagnostics: &mut Diagnostics) -> String {
        let mut result = String::with_capacity(markup.len());
        let mut last = 0;

        for caps in SHORTCODE_RE.captures_iter(markup) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            result.push_str(&markup[last..whole.start()]);
            last = whole.end();

            if depth == MAX_DEPTH {
                diagnostics.warn(
                    NoticeKind::InvalidSubstitution,
                    format!(
                        "'{}' nested more than {MAX_DEPTH} levels deep, markup probably includes itself",
                        whole.as_str()
                    ),
                );
                result.push_str(whole.as_str());
                continue;
            }

            let resolved = self.resolve(&caps[1], diagnostics);
            result.push_str(&self.expand(&resolved, depth + 1, diagnostics));
        }

        result.push_str(&markup[last..]);
        result
    }

    /// Resolve a single shortcode body (`method:arg:...`).
    pub fn resolve(&self, token: &str, diagnostics: &mut Diagnostics) -> String {
        let mut segments = token.split(ARG_DELIMITER);
        let name = segments.next().unwrap_or_default().trim();
        let args: Vec<&str> = segments.collect();

        match self.methods.get(name) {
            Some(method) => method(self, &args, diagnostics),
            None => {
                diagnostics.warn(
                    NoticeKind::InvalidSubstitution,
                    format!("invalid substitution '@{{{token}}}'"),
                );
                String::new()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in methods
// ---------------------------------------------------------------------------

/// `lipsum:count:unit`
fn lipsum_method(sub: &Substitutor, args: &[&str], diagnostics: &mut Diagnostics) -> String {
    let requested = args
        .first()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .max(1);
    let count = match usize::try_from(requested) {
        Ok(n) if n <= MAX_LIPSUM_COUNT => n,
        _ => {
            diagnostics.warn(
                NoticeKind::InvalidSubstitution,
                format!("lipsum count {requested} clamped to {MAX_LIPSUM_COUNT}"),
            );
            MAX_LIPSUM_COUNT
        }
    };
    let unit = Unit::parse(args.get(1).copied());

    if sub.config.static_lipsum {
        lipsum::generate(&mut StdRng::seed_from_u64(STATIC_SEED), count, unit)
    } else {
        lipsum::generate(&mut rand::thread_rng(), count, unit)
    }
}

/// `include:selector`
fn include_method(sub: &Substitutor, args: &[&str], diagnostics: &mut Diagnostics) -> String {
    let selector = args.join(":");
    let selector = selector.trim();

    if !selector.contains(':') {
        if let Some(markup) = sub.index.get(selector) {
            return markup.to_string();
        }
    }

    diagnostics.warn(
        NoticeKind::UnknownSelector,
        format!("unknown selector '{selector}' in include"),
    );
    String::new()
}

/// `image:width:height`. Missing width defaults to [`DEFAULT_IMAGE_SIZE`],
/// missing height to the width.
fn image_method(sub: &Substitutor, args: &[&str], diagnostics: &mut Diagnostics) -> String {
    let width = args
        .first()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_IMAGE_SIZE);
    let height = args
        .get(1)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(width);

    if [width, height].iter().any(|d| d.parse::<u32>().is_err()) {
        diagnostics.warn(
            NoticeKind::InvalidSubstitution,
            format!("image dimensions '{width}x{height}' are not numbers"),
        );
        return String::new();
    }

    if let Some(template) = &sub.config.placeholder_service {
        return render_placeholder(template, width, height);
    }

    let url = format!("{DEFAULT_IMAGE_BASE}/{width}/{height}");
    if sub.config.static_lipsum {
        url
    } else {
        let nonce: u32 = rand::thread_rng().r#gen();
        format!("{url}?random={nonce}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
