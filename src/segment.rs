//! HTML segmentation into translation-ready text units.
//!
//! Scraped chapter HTML is frequently malformed, so segmentation works at
//! the string level rather than through a DOM: tags are normalized to drop
//! their attributes, then the fragment is split on a fixed set of
//! line-break markers. Each span of text preceding a marker becomes one
//! [`TextUnit`] carrying the structural role implied by that marker.

use regex::Regex;
use std::sync::LazyLock;

/// Default maximum chunk size (characters) for the legacy chunker.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1000;

/// Opening tags with attributes, e.g. `<p class="x">` or `<br/>`.
static OPEN_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(\w+)[^>]*>").unwrap());

/// The seven recognized line-break markers, matched case-insensitively.
static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</p>|</h[1-4]>|</li>|<br>").unwrap());

/// Any remaining tag, stripped from the text content of a span.
static INLINE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Sentence-ending punctuation used by the legacy chunker (Chinese and
/// Latin terminators).
const SENTENCE_TERMINATORS: &[char] = &['。', '.', '!', '?', '！', '？'];

/// Structural role of a text unit, derived from the marker that ended it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitTag {
    /// Regular prose line (`</p>` or `<br>` terminated).
    Paragraph,
    /// Heading with level 1 through 4.
    Heading(u8),
    /// Item of an unordered list.
    ListItem,
    /// Synthetic line break emitted after each heading.
    Break,
}

/// One structurally-tagged span of plain text, the atomic item carried
/// through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    pub tag: UnitTag,
    /// Markup-free, trimmed content. Empty for [`UnitTag::Break`].
    pub text: String,
}

impl TextUnit {
    fn new(tag: UnitTag, text: String) -> Self {
        Self { tag, text }
    }

    fn line_break() -> Self {
        Self::new(UnitTag::Break, String::new())
    }
}

/// Splits an HTML fragment into an ordered sequence of [`TextUnit`]s.
///
/// Never fails: malformed input degrades to fewer units, tag-free input
/// becomes a single paragraph, and empty input yields an empty sequence.
/// Content after the last recognized marker is dropped.
pub fn segment(html: &str) -> Vec<TextUnit> {
    let normalized = OPEN_TAG_RE.replace_all(html, "<$1>");

    let mut units = Vec::new();
    let mut cursor = 0;

    for marker in MARKER_RE.find_iter(&normalized) {
        let text = strip_inline_tags(&normalized[cursor..marker.start()]);
        cursor = marker.end();

        let marker = marker.as_str().to_ascii_lowercase();
        match marker.as_str() {
            "</li>" => {
                if !text.is_empty() {
                    units.push(TextUnit::new(UnitTag::ListItem, text));
                }
            }
            "</p>" | "<br>" => {
                if !text.is_empty() {
                    units.push(TextUnit::new(UnitTag::Paragraph, text));
                }
            }
            // </h1> through </h4>: the heading is followed by a synthetic
            // break to preserve line spacing, even when its text is empty.
            _ => {
                let level = marker.as_bytes()[3] - b'0';
                if !text.is_empty() {
                    units.push(TextUnit::new(UnitTag::Heading(level), text));
                }
                units.push(TextUnit::line_break());
            }
        }
    }

    // No markers at all: treat the whole fragment as one paragraph.
    if cursor == 0 {
        let text = strip_inline_tags(&normalized);
        if !text.is_empty() {
            units.push(TextUnit::new(UnitTag::Paragraph, text));
        }
    }

    units
}

/// Removes every remaining tag from a span and trims whitespace.
fn strip_inline_tags(span: &str) -> String {
    INLINE_TAG_RE.replace_all(span, "").trim().to_string()
}

/// Splits HTML into size-bounded plain-text chunks for the legacy
/// one-request-per-chunk translation path.
///
/// Paragraph boundaries come first (`<p>`, `</p>`, `<br>`); paragraphs over
/// `max_size` are split on sentence terminators with pieces merged back up
/// to the cap, then on whitespace if a sentence alone is still oversized.
/// A single word longer than `max_size` becomes its own chunk.
pub fn make_chunks(html: &str, max_size: usize) -> Vec<String> {
    split_paragraphs(html)
        .into_iter()
        .flat_map(|p| split_long_paragraph(&p, max_size))
        .collect()
}

/// Flattens HTML into newline-separated paragraphs of plain text.
fn split_paragraphs(html: &str) -> Vec<String> {
    static P_BOUNDARY_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)</p\s*>|<p[^>]*>|<br\s*/?>").unwrap());

    let text = P_BOUNDARY_RE.replace_all(html, "\n");
    let text = INLINE_TAG_RE.replace_all(&text, "");
    let text = text.replace('\u{3000}', " ").replace("&nbsp;", " ");

    text.split('\n')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits one oversized paragraph into chunks of at most `max_size` chars.
fn split_long_paragraph(paragraph: &str, max_size: usize) -> Vec<String> {
    if paragraph.chars().count() <= max_size {
        return vec![paragraph.to_string()];
    }

    split_on_terminators(paragraph, max_size)
        .into_iter()
        .flat_map(|piece| {
            if piece.chars().count() <= max_size {
                vec![piece]
            } else {
                split_on_words(&piece, max_size)
            }
        })
        .collect()
}

/// Cuts text after each sentence terminator, then merges adjacent pieces
/// back together as long as the result stays within `max_size`.
fn split_on_terminators(text: &str, max_size: usize) -> Vec<String> {
    let mut pieces: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if SENTENCE_TERMINATORS.contains(&ch) {
            pieces.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }

    let mut merged: Vec<String> = Vec::new();
    for piece in pieces {
        match merged.last_mut() {
            Some(last) if last.chars().count() + piece.chars().count() <= max_size => {
                last.push_str(&piece);
            }
            _ => merged.push(piece),
        }
    }

    merged
}

/// Greedily packs whitespace-separated words into chunks of at most
/// `max_size` characters. A word exceeding the cap on its own is emitted
/// unsplit (accepted overflow).
fn split_on_words(text: &str, max_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let joined_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if joined_len > max_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current = word.to_string();
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
