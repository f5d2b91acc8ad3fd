//! Filler text generation for the `lipsum` shortcode.

use rand::Rng;

/// Vocabulary the filler text is drawn from.
const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua", "enim",
    "ad", "minim", "veniam", "quis", "nostrud", "exercitation", "ullamco", "laboris", "nisi",
    "aliquip", "ex", "ea", "commodo", "consequat", "duis", "aute", "irure", "in",
    "reprehenderit", "voluptate", "velit", "esse", "cillum", "fugiat", "nulla", "pariatur",
    "excepteur", "sint", "occaecat", "cupidatat", "non", "proident", "sunt", "culpa", "qui",
    "officia", "deserunt", "mollit", "anim", "id", "est", "laborum",
];

const SENTENCE_WORDS: (usize, usize) = (5, 12);
const PARAGRAPH_SENTENCES: (usize, usize) = (3, 6);

/// Unit of generated filler text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Words,
    Sentences,
    Paragraphs,
}

impl Unit {
    /// Parse a unit name; anything unrecognized falls back to paragraphs.
    pub fn parse(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some("words") => Self::Words,
            Some("sentences") => Self::Sentences,
            _ => Self::Paragraphs,
        }
    }
}

/// Generate `count` units of filler text.
pub fn generate<R: Rng>(rng: &mut R, count: usize, unit: Unit) -> String {
    let count = count.max(1);
    match unit {
        Unit::Words => words(rng, count),
        Unit::Sentences => (0..count)
            .map(|_| sentence(rng))
            .collect::<Vec<_>>()
            .join(" "),
        Unit::Paragraphs => (0..count)
            .map(|_| paragraph(rng))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn word<R: Rng>(rng: &mut R) -> &'static str {
    WORDS[rng.gen_range(0..WORDS.len())]
}

fn words<R: Rng>(rng: &mut R, count: usize) -> String {
    (0..count).map(|_| word(rng)).collect::<Vec<_>>().join(" ")
}

fn sentence<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(SENTENCE_WORDS.0..=SENTENCE_WORDS.1);
    let text = words(rng, len);
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

fn paragraph<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(PARAGRAPH_SENTENCES.0..=PARAGRAPH_SENTENCES.1);
    (0..len).map(|_| sentence(rng)).collect::<Vec<_>>().join(" ")
}
