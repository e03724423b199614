//! Tree queries: predicate search, attribute search and text flattening.
//!
//! Every search returns an owned `Vec<NodeId>` in document order so callers
//! can mutate the tree while walking the result.

use quick_xml::escape::resolve_html5_entity;

use super::{Document, NodeData, NodeId};

/// Pre-order iterator over a subtree, the start node included.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        let mut children: Vec<_> = self.doc.children(id).collect();
        children.reverse();
        self.stack.extend(children);
        Some(id)
    }
}

impl Document {
    /// Walk `root` and everything below it in document order.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        let stack = if self.get(root).is_some() {
            vec![root]
        } else {
            Vec::new()
        };
        Descendants { doc: self, stack }
    }

    /// All elements under the document root matching a predicate.
    pub fn find_all<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(self.root)
            .filter(|&id| self.is_element(id) && predicate(self, id))
            .collect()
    }

    /// First element matching a predicate.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Document, NodeId) -> bool,
    {
        self.descendants(self.root)
            .find(|&id| self.is_element(id) && predicate(self, id))
    }

    /// Elements with the given tag name (ASCII case-insensitive).
    pub fn elements_named(&self, tag: &str) -> Vec<NodeId> {
        self.find_all(|doc, id| doc.is_named(id, tag))
    }

    /// First element with the given tag name.
    pub fn first_named(&self, tag: &str) -> Option<NodeId> {
        self.find(|doc, id| doc.is_named(id, tag))
    }

    /// Elements carrying an attribute, whatever its value.
    pub fn elements_with_attr(&self, name: &str) -> Vec<NodeId> {
        self.find_all(|doc, id| doc.has_attr(id, name))
    }

    /// Elements whose attribute equals `value` exactly.
    pub fn elements_with_attr_value(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.find_all(|doc, id| doc.get_attr(id, name) == Some(value))
    }

    /// Elements whose whole `class` attribute equals `class`.
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.elements_with_attr_value("class", class)
    }

    /// Concatenated text of every text node under `node`.
    ///
    /// Entity references contribute their character; unknown ones read as
    /// `&name;`.
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        for id in self.descendants(node) {
            match self.get(id).map(|n| &n.data) {
                Some(NodeData::Text(t)) => out.push_str(t),
                Some(NodeData::EntityRef(name)) => match resolve_html5_entity(name) {
                    Some(c) => out.push_str(c),
                    None => {
                        out.push('&');
                        out.push_str(name);
                        out.push(';');
                    }
                },
                _ => {}
            }
        }
        out
    }
}
