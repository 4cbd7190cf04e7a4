//! HTML DOM access behind the markup capability interface.

use deck_core::{Error, MarkupNode, Result};
use kuchikikiki::traits::TendrilSink;
use kuchikikiki::NodeRef;
use log::debug;

/// A node in a parsed HTML document.
///
/// Cheap to clone; wraps a reference-counted DOM node.
#[derive(Clone)]
pub struct HtmlNode(NodeRef);

impl std::fmt::Debug for HtmlNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tag_name() {
            Some(tag) => write!(f, "HtmlNode(<{tag}>)"),
            None => write!(f, "HtmlNode(text)"),
        }
    }
}

/// Parse a complete HTML document.
///
/// The parser follows the HTML5 specification; implicit `<html>`, `<head>`,
/// and `<body>` elements are synthesised when missing.
pub fn parse_document(html: &str) -> HtmlNode {
    HtmlNode(kuchikikiki::parse_html().one(html))
}

/// Select the subtree to convert: the first element matching `selector`.
///
/// A selector that matches nothing (or fails to parse) surfaces as
/// [`Error::ContentNotFound`] rather than a fault further down the pipeline.
pub fn select_subtree(document: &HtmlNode, selector: &str) -> Result<HtmlNode> {
    document
        .0
        .select_first(selector)
        .map(|element| {
            debug!("selector '{selector}' matched <{}>", element.name.local);
            HtmlNode(element.as_node().clone())
        })
        .map_err(|()| Error::ContentNotFound(selector.to_string()))
}

impl MarkupNode for HtmlNode {
    fn is_element(&self) -> bool {
        self.0.as_element().is_some()
    }

    fn tag_name(&self) -> Option<String> {
        self.0.as_element().map(|el| el.name.local.to_string())
    }

    fn attribute(&self, name: &str) -> Option<String> {
        let element = self.0.as_element()?;
        let attributes = element.attributes.borrow();
        attributes.get(name).map(str::to_string)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().map(HtmlNode).collect()
    }

    fn text_value(&self) -> Option<String> {
        if let Some(text) = self.0.as_text() {
            return Some(text.borrow().clone());
        }
        // Comment payloads count as text; the extractor's sanitization is
        // what strips vendor-conditional fragments.
        self.0.as_comment().map(|comment| comment.borrow().clone())
    }
}
