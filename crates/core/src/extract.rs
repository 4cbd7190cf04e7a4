//! Flattening a markup subtree into ordered slide content.
//!
//! One slide is produced per direct element child of the selected subtree;
//! within each slide, nested markup collapses into a flat atom sequence.
//! Sanitization (trimming, NFC normalization, vendor-conditional comment
//! stripping) happens here and only here.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::markup::MarkupNode;
use crate::types::{ContentAtom, Slide};

/// Vendor-conditional comment fragments (`[if mso | IE]...`) that mail
/// templates leave in the tree. They are markup plumbing, never content.
static CONDITIONAL_COMMENT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[if mso \| IE\]").unwrap());

/// Trim, NFC-normalize, and drop conditional-comment noise from one text
/// fragment. Returns `None` when nothing usable remains.
fn sanitize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || CONDITIONAL_COMMENT_REGEX.is_match(trimmed) {
        return None;
    }
    Some(trimmed.nfc().collect())
}

/// Extract one slide per direct element child of `root`.
///
/// Non-element content directly under `root` is ignored; text only counts
/// once it belongs to a descendant element. Degenerate slides are kept here
/// and filtered by [`Presentation::new`](crate::types::Presentation::new).
pub fn extract_slides<N: MarkupNode>(root: &N) -> Vec<Slide> {
    root.children()
        .iter()
        .filter(|child| child.is_element())
        .map(|child| Slide::from_atoms(extract_atoms(child)))
        .collect()
}

/// Flatten the element children of `node` into an ordered atom sequence.
pub fn extract_atoms<N: MarkupNode>(node: &N) -> Vec<ContentAtom> {
    let mut atoms = Vec::new();
    for child in node.children() {
        if !child.is_element() {
            continue;
        }

        if child.tag_name().as_deref() == Some("img") {
            // Terminal: capture the source reference, never recurse into it.
            match child.attribute("src") {
                Some(src) => atoms.push(ContentAtom::Image(src)),
                None => debug!("img element without src attribute, skipped"),
            }
            continue;
        }

        if let Some(text) = child.sole_text() {
            // The element's entire content is a single string.
            if let Some(clean) = sanitize(&text) {
                atoms.push(ContentAtom::Text(clean));
            }
            continue;
        }

        let direct: Vec<String> = child
            .direct_texts()
            .iter()
            .filter_map(|raw| sanitize(raw))
            .collect();
        if !direct.is_empty() {
            // Rich inline content: the element carries text of its own,
            // interleaved with child elements. Merge the whole subtree into
            // one run and stop descending.
            let merged: Vec<String> = child
                .descendant_texts()
                .iter()
                .filter_map(|raw| sanitize(raw))
                .collect();
            atoms.push(ContentAtom::Text(merged.join(" ")));
            continue;
        }

        // No text at this level: splice the child's own atoms in place.
        atoms.extend(extract_atoms(&child));
    }
    atoms
}
