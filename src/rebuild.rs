//! Reassembly of translated lines into structured HTML.
//!
//! The unit sequence and the translated-line sequence are produced
//! independently (the latter comes back from a remote service as one
//! separator-delimited string), so their lengths can disagree. Joining
//! them is therefore done through [`zip_with_default`], which substitutes
//! an empty string for any missing index instead of panicking.

use crate::segment::{TextUnit, UnitTag};
use regex::Regex;
use std::fmt::Write;

/// Pairs each item of `left` with the same-index item of `right`,
/// substituting `""` where `right` is too short. Extra items in `right`
/// are ignored.
pub fn zip_with_default<'a, T>(
    left: &'a [T],
    right: &'a [String],
) -> impl Iterator<Item = (&'a T, &'a str)> {
    left.iter()
        .enumerate()
        .map(|(i, item)| (item, right.get(i).map(String::as_str).unwrap_or("")))
}

/// Renders translated lines back onto their structural tags as HTML.
///
/// A line matching `heading_pattern` is always rendered as `<h1>`,
/// whatever the unit's original tag: translation output is allowed to
/// promote a plain paragraph that turns out to be a chapter header.
/// Each list item gets its own `<ul>` wrapper; adjacent items are not
/// merged into a shared list.
pub fn rebuild(units: &[TextUnit], translations: &[String], heading_pattern: &Regex) -> String {
    let mut html = String::new();

    for (unit, line) in zip_with_default(units, translations) {
        if heading_pattern.is_match(line) {
            let _ = write!(html, "<h1>{}</h1>", line);
            continue;
        }

        match unit.tag {
            UnitTag::Break => html.push_str("<br>"),
            UnitTag::ListItem => {
                let _ = write!(html, "<ul><li>{}</li></ul>", line);
            }
            UnitTag::Heading(level) => {
                let _ = write!(html, "<h{level}>{line}</h{level}>");
            }
            UnitTag::Paragraph => {
                let _ = write!(html, "<p>{}</p>", line);
            }
        }
    }

    html
}
