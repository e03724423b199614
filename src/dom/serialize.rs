//! XHTML serialization.

use std::io;

use super::{Document, NodeData, NodeId};

/// HTML void elements, the only ones written in self-closing form. Any other
/// empty element gets an explicit end tag, since an HTML reader treats
/// `<code/>` as an unterminated start tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

impl Document {
    /// Serialize the reachable tree as XHTML.
    pub fn to_xhtml(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root()) {
            write_node(self, child, &mut out);
        }
        out
    }

    /// Serialize a single node and its subtree.
    pub fn node_to_xhtml(&self, node: NodeId) -> String {
        let mut out = String::new();
        write_node(self, node, &mut out);
        out
    }

    /// Write the serialized document to `w`.
    pub fn write_xhtml<W: io::Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(self.to_xhtml().as_bytes())
    }
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    let Some(node) = doc.get(id) else {
        return;
    };

    match &node.data {
        NodeData::Document => {
            for child in doc.children(id) {
                write_node(doc, child, out);
            }
        }
        NodeData::Text(text) => out.push_str(&escape_text(text)),
        NodeData::EntityRef(name) => {
            out.push('&');
            out.push_str(name);
            out.push(';');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if !public_id.is_empty() {
                out.push_str(&format!(" PUBLIC \"{public_id}\""));
                if !system_id.is_empty() {
                    out.push_str(&format!(" \"{system_id}\""));
                }
            } else if !system_id.is_empty() {
                out.push_str(&format!(" SYSTEM \"{system_id}\""));
            }
            out.push('>');
        }
        NodeData::ProcessingInstruction { target, data } => {
            out.push_str("<?");
            out.push_str(target);
            if !data.is_empty() {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>");
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs.iter() {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_xml(&attr.value));
                out.push('"');
            }

            if node.first_child.is_none() && VOID_ELEMENTS.contains(&tag) {
                out.push_str(" />");
                return;
            }

            out.push('>');
            for child in doc.children(id) {
                write_node(doc, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

/// Escape special characters for attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape special characters for text content. Quotes stay readable.
pub fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}
