//! Table of contents.
//!
//! Headings at the tracked tiers are read in document order and each one is
//! given an `autoN` anchor. The resulting flat sequence of
//! [`HeadingRecord`]s is folded into nested lists: the outer list is an
//! `<ol>`, deeper levels are `<ul>`s hung off the preceding item.

use std::ops::RangeInclusive;

use crate::dom::{Document, NodeId};

/// Which heading tags take part, as `h<N>` numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLevels(pub RangeInclusive<u8>);

impl Default for TocLevels {
    /// `h2` sections with `h3` subsections.
    fn default() -> Self {
        TocLevels(2..=3)
    }
}

impl TocLevels {
    /// Normalized level of a tag name: the top tier maps to 0.
    pub fn level_of(&self, tag: &str) -> Option<usize> {
        let bytes = tag.as_bytes();
        if bytes.len() != 2 || !bytes[0].eq_ignore_ascii_case(&b'h') {
            return None;
        }
        let n = (bytes[1] as char).to_digit(10)? as u8;
        self.0
            .contains(&n)
            .then(|| (n - self.0.start()) as usize)
    }
}

/// One heading, as it appears in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingRecord {
    /// Normalized level, 0 for the top tier.
    pub level: usize,
    /// Flattened heading text.
    pub text: String,
    /// Anchor name appended to the heading.
    pub anchor: String,
}

/// Tracked headings in document order.
pub fn headings(doc: &Document, levels: &TocLevels) -> Vec<NodeId> {
    doc.find_all(|d, id| d.element_name(id).and_then(|n| levels.level_of(n)).is_some())
}

/// Record every tracked heading and append its `<a name="autoN">` anchor.
///
/// Ids are assigned in traversal order starting at 0. Running this twice on
/// the same document anchors every heading twice.
pub fn collect_headings(doc: &mut Document, levels: &TocLevels) -> Vec<HeadingRecord> {
    let nodes = headings(doc, levels);
    let mut records = Vec::with_capacity(nodes.len());

    for (id, &node) in nodes.iter().enumerate() {
        let level = doc
            .element_name(node)
            .and_then(|n| levels.level_of(n))
            .unwrap_or(0);
        let anchor = format!("auto{id}");
        records.push(HeadingRecord {
            level,
            text: doc.text(node),
            anchor: anchor.clone(),
        });

        let target = doc.create_element_with("a", [("name", anchor.as_str())]);
        doc.append(node, target);
    }

    tracing::debug!(count = records.len(), "collected headings");
    records
}

/// Build the nested list for `records` inside `target`, returning the detached `<ol>`.
pub fn build_toc(records: &[HeadingRecord], target: &mut Document) -> NodeId {
    let root = target.create_element("ol");
    let mut open = vec![root];

    for record in records {
        open.truncate(record.level + 1);
        while open.len() <= record.level {
            let list = *open.last().unwrap_or(&root);
            let holder = target
                .get(list)
                .map(|n| n.last_child)
                .filter(|&c| target.is_named(c, "li"))
                .unwrap_or(list);
            let nested = target.create_element("ul");
            target.append(holder, nested);
            open.push(nested);
        }

        let item = target.create_element("li");
        let href = format!("#{}", record.anchor);
        let link = target.create_element_with("a", [("href", href.as_str())]);
        let label = target.create_text(record.text.as_str());
        target.append(link, label);
        target.append(item, link);
        let list = *open.last().unwrap_or(&root);
        target.append(list, item);
    }

    root
}

/// Anchor the headings of `doc` and build their table of contents in `target`.
pub fn generate_toc(doc: &mut Document, target: &mut Document, levels: &TocLevels) -> NodeId {
    let records = collect_headings(doc, levels);
    build_toc(&records, target)
}

/// Make `toc` the sole child of the first `toc`-classed element.
///
/// Returns false, leaving the template alone, when there is no such slot.
pub fn put_in_toc(template: &mut Document, toc: NodeId) -> bool {
    let Some(slot) = template.elements_with_class("toc").first().copied() else {
        return false;
    };
    template.clear_children(slot);
    template.append(slot, toc);
    true
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn doc(body: &str) -> Document {
        Document::parse_xhtml(&format!("<html><body>{body}</body></html>")).unwrap()
    }

    /// Number of list elements enclosing `node`, minus the outer one.
    fn depth(doc: &Document, node: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = doc.parent(node);
        while let Some(p) = cur {
            if doc.is_named(p, "ul") || doc.is_named(p, "ol") {
                depth += 1;
            }
            cur = doc.parent(p);
        }
        depth - 1
    }

    #[test]
    fn test_level_of() {
        let levels = TocLevels::default();
        assert_eq!(levels.level_of("h2"), Some(0));
        assert_eq!(levels.level_of("H3"), Some(1));
        assert_eq!(levels.level_of("h1"), None);
        assert_eq!(levels.level_of("h4"), None);
        assert_eq!(levels.level_of("hr"), None);
    }

    #[test]
    fn test_nested_shape() {
        let mut src = doc("<h2>Intro</h2><p>x</p><h3>Details</h3><h2>Next</h2>");
        let mut out = Document::new();
        let toc = generate_toc(&mut src, &mut out, &TocLevels::default());
        out.append(out.root(), toc);

        assert_eq!(
            out.to_xhtml(),
            concat!(
                r##"<ol><li><a href="#auto0">Intro</a><ul><li><a href="#auto1">Details</a></li></ul></li>"##,
                r##"<li><a href="#auto2">Next</a></li></ol>"##,
            )
        );

        let h3 = src.first_named("h3").unwrap();
        assert_eq!(src.node_to_xhtml(h3), r#"<h3>Details<a name="auto1"></a></h3>"#);
    }

    #[test]
    fn test_starting_below_top_tier() {
        let mut src = doc("<h3>Orphan</h3><h2>Top</h2>");
        let mut out = Document::new();
        let toc = generate_toc(&mut src, &mut out, &TocLevels::default());
        out.append(out.root(), toc);
        assert_eq!(
            out.to_xhtml(),
            r##"<ol><ul><li><a href="#auto0">Orphan</a></li></ul><li><a href="#auto1">Top</a></li></ol>"##
        );
    }

    #[test]
    fn test_put_in_toc_first_slot_only() {
        let mut template = doc(r#"<div class="toc">old</div><div class="toc">second</div>"#);
        let toc = template.create_element("ol");
        assert!(put_in_toc(&mut template, toc));
        let slots = template.elements_with_class("toc");
        assert_eq!(template.children(slots[0]).collect::<Vec<_>>(), vec![toc]);
        assert_eq!(template.text(slots[1]), "second");
    }

    #[test]
    fn test_put_in_toc_without_slot() {
        let mut template = doc("<p>no slot</p>");
        let before = template.to_xhtml();
        let toc = template.create_element("ol");
        assert!(!put_in_toc(&mut template, toc));
        assert_eq!(template.to_xhtml(), before);
    }

    proptest! {
        #[test]
        fn prop_one_item_per_heading(levels in proptest::collection::vec(0usize..3, 0..24)) {
            let body: String = levels
                .iter()
                .enumerate()
                .map(|(i, l)| format!("<h{n}>H{i}</h{n}><p>text</p>", n = l + 2))
                .collect();
            let mut src = doc(&body);
            let mut out = Document::new();
            let toc = generate_toc(&mut src, &mut out, &TocLevels(2..=4));
            out.append(out.root(), toc);

            let items = out.elements_named("li");
            prop_assert_eq!(items.len(), levels.len());
            for (i, (&item, &level)) in items.iter().zip(&levels).enumerate() {
                let link = out.children(item).next().unwrap();
                prop_assert_eq!(out.text(link), format!("H{i}"));
                prop_assert_eq!(depth(&out, item), level);
            }

            for (i, h) in headings(&src, &TocLevels(2..=4)).into_iter().enumerate() {
                let anchors: Vec<_> = src
                    .children(h)
                    .filter(|&c| src.is_named(c, "a"))
                    .collect();
                prop_assert_eq!(anchors.len(), 1);
                let expected = format!("auto{i}");
                prop_assert_eq!(src.get_attr(anchors[0], "name"), Some(expected.as_str()));
            }
        }
    }
}
