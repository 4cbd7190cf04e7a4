//! HTML backend for web-to-deck extraction.
//!
//! Parses documents with kuchikikiki's HTML5 parser and exposes the
//! resulting DOM behind the markup capability interface from `deck-core`.

pub mod dom;

pub use dom::{parse_document, select_subtree, HtmlNode};
