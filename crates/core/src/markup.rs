//! Capability interface over a parsed markup tree.
//!
//! The extractor needs only a handful of node operations; any backend that
//! can answer them plugs in without touching extraction logic.

/// A node in a parsed markup tree.
///
/// `text_value` must surface comment payloads as well as ordinary text
/// nodes: vendor-conditional comments arrive through it, and the
/// extractor's sanitization pass is what filters them out.
pub trait MarkupNode: Clone + Sized {
    /// True for element nodes, false for text and comments.
    fn is_element(&self) -> bool;

    /// Tag name of an element node.
    fn tag_name(&self) -> Option<String>;

    /// Attribute lookup on an element node.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Direct children in document order, all node kinds included.
    fn children(&self) -> Vec<Self>;

    /// The string payload of a text or comment node.
    fn text_value(&self) -> Option<String>;

    /// The node's entire textual content when it reduces to a single
    /// string: descends through sole children until a text node is reached.
    /// Returns `None` as soon as the content branches.
    fn sole_text(&self) -> Option<String> {
        let mut node = self.clone();
        loop {
            if let Some(text) = node.text_value() {
                return Some(text);
            }
            let mut children = node.children();
            let only = children.pop()?;
            if !children.is_empty() {
                return None;
            }
            node = only;
        }
    }

    /// Payloads of text-bearing nodes that are immediate children, in
    /// document order. Not recursive.
    fn direct_texts(&self) -> Vec<String> {
        self.children()
            .into_iter()
            .filter_map(|child| child.text_value())
            .collect()
    }

    /// Payloads of all text-bearing nodes anywhere below this node, in
    /// document order.
    fn descendant_texts(&self) -> Vec<String> {
        let mut texts = Vec::new();
        for child in self.children() {
            match child.text_value() {
                Some(text) => texts.push(text),
                None => texts.extend(child.descendant_texts()),
            }
        }
        texts
    }
}
