//! Page metadata: title, authors, version and modification time.
//!
//! Values are read from the source document (or the run configuration) and
//! appended to the matching template slots. A template without a given slot
//! simply does not get that piece of metadata.

use std::fs;
use std::path::Path;

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::util::ctime;

/// An author as declared by `<link rel="author" title=".." href="..">`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub href: String,
}

impl Author {
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }
}

/// Children of the source's first `<title>`, or nothing when it has none.
pub fn document_title(doc: &Document) -> Vec<NodeId> {
    doc.first_named("title")
        .map(|t| doc.children(t).collect())
        .unwrap_or_default()
}

/// Authors declared in the source's `<link rel="author">` elements.
pub fn document_authors(doc: &Document) -> Vec<Author> {
    doc.elements_named("link")
        .into_iter()
        .filter(|&l| doc.get_attr(l, "rel") == Some("author"))
        .map(|l| {
            Author::new(
                doc.get_attr(l, "title").unwrap_or(""),
                doc.get_attr(l, "href").unwrap_or(""),
            )
        })
        .collect()
}

/// Stamp `mtime` slots with the modification time of `path`.
pub fn add_mtime(template: &mut Document, path: &Path) -> Result<()> {
    let slots = template.elements_with_class("mtime");
    if slots.is_empty() {
        return Ok(());
    }
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(path, e))?;
    let stamp = ctime(modified);
    for slot in slots {
        let text = template.create_text(stamp.as_str());
        template.append(slot, text);
    }
    Ok(())
}

/// Replace every `h1` with an empty `<span/>`; the template supplies the page heading.
pub fn remove_h1(doc: &mut Document) {
    for h1 in doc.elements_named("h1") {
        let empty = doc.create_element("span");
        doc.replace(h1, empty);
    }
}

/// Elements named `title` or classed `title`, each once.
fn title_slots(template: &Document) -> Vec<NodeId> {
    template.find_all(|d, id| d.is_named(id, "title") || d.get_attr(id, "class") == Some("title"))
}

/// Append copies of `title` (nodes of `source`) to every title slot.
pub fn set_title(template: &mut Document, source: &Document, title: &[NodeId]) {
    for slot in title_slots(template) {
        for &node in title {
            let copy = template.import(source, node);
            template.append(slot, copy);
        }
    }
}

/// Join author names as prose: "A", "A and B", "A, B, and C".
///
/// Returns the separators that precede each author after the first.
fn author_separators(count: usize) -> Vec<&'static str> {
    match count {
        0 | 1 => Vec::new(),
        2 => vec![" and "],
        n => {
            let mut seps = vec![", "; n - 2];
            seps.push(", and ");
            seps
        }
    }
}

/// Fill `authors` slots with linked names and add `<link rel="author">` tags to the head.
pub fn set_authors(template: &mut Document, authors: &[Author]) {
    if authors.is_empty() {
        return;
    }
    let separators = author_separators(authors.len());

    for slot in template.elements_with_class("authors") {
        for (i, author) in authors.iter().enumerate() {
            if i > 0 {
                template.append_text(slot, separators[i - 1]);
            }
            let link = template.create_element_with("a", [("href", author.href.as_str())]);
            let name = template.create_text(author.name.as_str());
            template.append(link, name);
            template.append(slot, link);
        }
    }

    if let Some(head) = template.first_named("head") {
        for author in authors {
            let link = template.create_element_with(
                "link",
                [
                    ("rel", "author"),
                    ("href", author.href.as_str()),
                    ("title", author.name.as_str()),
                ],
            );
            template.append(head, link);
        }
    }
}

/// Append `version` to every `version` slot.
pub fn set_version(template: &mut Document, version: &str) {
    for slot in template.elements_with_class("version") {
        let text = template.create_text(version);
        template.append(slot, text);
    }
}
