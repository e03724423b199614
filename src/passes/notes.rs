//! Footnotes, notes and index anchors.

use crate::dom::Document;
use crate::error::{Error, Result};

/// Move `footnote`-classed passages to a numbered list at the end of the body.
///
/// Each passage is replaced in place by a superscript link to its entry;
/// the link's `title` carries the passage text so it reads on hover.
/// Numbering starts at 1 in document order. A document without footnotes is
/// left untouched and gets no trailing section. Returns the number of
/// footnotes moved.
pub fn footnotes(doc: &mut Document) -> Result<usize> {
    let notes = doc.elements_with_class("footnote");
    if notes.is_empty() {
        return Ok(0);
    }
    let body = doc
        .first_named("body")
        .ok_or_else(|| Error::MissingElement("body".into()))?;

    let list = doc.create_element("ol");
    for (i, &note) in notes.iter().enumerate() {
        let id = i + 1;
        let title = collapse_whitespace(&doc.text(note));

        let href = format!("#footnote-{id}");
        let reference = doc.create_element_with("a", [("href", href.as_str()), ("title", title.as_str())]);
        let sup = doc.create_element("super");
        let number = doc.create_text(id.to_string());
        doc.append(sup, number);
        doc.append(reference, sup);
        doc.replace(note, reference);

        let name = format!("footnote-{id}");
        let target = doc.create_element_with("a", [("name", name.as_str())]);
        doc.append(target, note);
        let item = doc.create_element("li");
        doc.append(item, target);
        doc.append(list, item);
    }

    let header = doc.create_element("h2");
    let header_text = doc.create_text("Footnotes");
    doc.append(header, header_text);
    doc.append(body, header);
    doc.append(body, list);

    tracing::debug!(count = notes.len(), "collected footnotes");
    Ok(notes.len())
}

/// Prefix every `note`-classed element with a bold "Note: " label.
pub fn notes(doc: &mut Document) {
    for note in doc.elements_with_class("note") {
        let label = doc.create_element("strong");
        let text = doc.create_text("Note: ");
        doc.append(label, text);
        doc.prepend(note, label);
    }
}

/// Turn `index`-classed elements into `<a name="indexNN" class="index">` anchors.
///
/// The element is rebuilt as an anchor carrying only those two attributes;
/// its content moves over unchanged. Returns the number of entries.
pub fn index(doc: &mut Document) -> usize {
    let entries = doc.elements_with_class("index");
    for (i, &entry) in entries.iter().enumerate() {
        let name = format!("index{:02}", i + 1);
        let anchor = doc.create_element_with("a", [("name", name.as_str()), ("class", "index")]);
        doc.reparent_children(entry, anchor);
        doc.replace(entry, anchor);
    }
    entries.len()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn doc(body: &str) -> Document {
        Document::parse_xhtml(&format!("<html><body>{body}</body></html>")).unwrap()
    }

    #[test]
    fn test_footnotes_numbered_and_collected() {
        let mut d = doc(concat!(
            r#"<p>First<span class="footnote">One   fn
                text</span>.</p>"#,
            r#"<p>Second<span class="footnote">Two</span>.</p>"#,
        ));
        assert_eq!(footnotes(&mut d).unwrap(), 2);

        let body = d.first_named("body").unwrap();
        let p = d.children(body).next().unwrap();
        assert_eq!(
            d.node_to_xhtml(p),
            r##"<p>First<a href="#footnote-1" title="One fn text"><super>1</super></a>.</p>"##
        );

        let children: Vec<_> = d.children(body).collect();
        let header = children[children.len() - 2];
        assert_eq!(d.node_to_xhtml(header), "<h2>Footnotes</h2>");
        let list = children[children.len() - 1];
        assert_eq!(
            d.node_to_xhtml(list),
            concat!(
                r#"<ol><li><a name="footnote-1"><span class="footnote">One   fn
                text</span></a></li>"#,
                r#"<li><a name="footnote-2"><span class="footnote">Two</span></a></li></ol>"#,
            )
        );
    }

    #[test]
    fn test_no_footnotes_no_section() {
        let mut d = doc("<p>plain</p>");
        let before = d.to_xhtml();
        assert_eq!(footnotes(&mut d).unwrap(), 0);
        assert_eq!(d.to_xhtml(), before);
    }

    #[test]
    fn test_footnotes_need_body() {
        let mut d = Document::parse_xhtml(r#"<div><span class="footnote">x</span></div>"#).unwrap();
        assert!(matches!(footnotes(&mut d), Err(Error::MissingElement(_))));
    }

    #[test]
    fn test_notes_prefixed() {
        let mut d = doc(r#"<div class="note">Careful</div><p class="note"><em>Also</em></p>"#);
        notes(&mut d);
        let n = d.elements_with_class("note");
        assert_eq!(d.node_to_xhtml(n[0]), r#"<div class="note"><strong>Note: </strong>Careful</div>"#);
        assert_eq!(d.text(n[1]), "Note: Also");
    }

    #[test]
    fn test_index_retags() {
        let mut d = doc(r#"<span class="index" id="x">reactor</span><em class="index">deferred</em>"#);
        assert_eq!(index(&mut d), 2);
        let body = d.first_named("body").unwrap();
        assert_eq!(
            d.node_to_xhtml(body),
            concat!(
                r#"<body><a name="index01" class="index">reactor</a>"#,
                r#"<a name="index02" class="index">deferred</a></body>"#,
            )
        );
    }

    #[test]
    fn test_index_without_entries() {
        let mut d = doc("<p>none</p>");
        assert_eq!(index(&mut d), 0);
    }

    proptest! {
        #[test]
        fn prop_footnote_ids_contiguous(texts in proptest::collection::vec("[a-z]{1,8}", 1..20)) {
            let body: String = texts
                .iter()
                .map(|t| format!(r#"<p>x<span class="footnote">{t}</span></p>"#))
                .collect();
            let mut d = doc(&body);
            prop_assert_eq!(footnotes(&mut d).unwrap(), texts.len());

            let refs = d.find_all(|d, id| {
                d.get_attr(id, "href").is_some_and(|h| h.starts_with("#footnote-"))
            });
            let targets = d.find_all(|d, id| {
                d.get_attr(id, "name").is_some_and(|n| n.starts_with("footnote-"))
            });
            prop_assert_eq!(refs.len(), texts.len());
            prop_assert_eq!(targets.len(), texts.len());
            for (i, (&r, &t)) in refs.iter().zip(&targets).enumerate() {
                let id = i + 1;
                let href = format!("#footnote-{id}");
                let name = format!("footnote-{id}");
                prop_assert_eq!(d.get_attr(r, "href"), Some(href.as_str()));
                prop_assert_eq!(d.text(r), id.to_string());
                prop_assert_eq!(d.get_attr(r, "title"), Some(texts[i].as_str()));
                prop_assert_eq!(d.get_attr(t, "name"), Some(name.as_str()));
            }
            prop_assert_eq!(d.elements_named("h2").len(), 1);
        }

        #[test]
        fn prop_index_names_padded_and_unique(terms in proptest::collection::vec("[a-z]{1,8}", 1..30)) {
            let body: String = terms
                .iter()
                .map(|t| format!(r#"<p>see <span class="index">{t}</span></p>"#))
                .collect();
            let mut d = doc(&body);
            prop_assert_eq!(index(&mut d), terms.len());

            let anchors = d.elements_with_class("index");
            prop_assert_eq!(anchors.len(), terms.len());
            let mut seen = std::collections::HashSet::new();
            for (i, &a) in anchors.iter().enumerate() {
                let name = d.get_attr(a, "name").unwrap_or("").to_string();
                prop_assert_eq!(&name, &format!("index{:02}", i + 1));
                prop_assert!(name.len() >= "index00".len());
                prop_assert!(d.is_named(a, "a"));
                prop_assert_eq!(d.text(a), terms[i].clone());
                prop_assert!(seen.insert(name));
            }
        }
    }

    #[test]
    fn test_index_padding_boundary() {
        let body: String = (1..=11)
            .map(|i| format!(r#"<span class="index">t{i}</span>"#))
            .collect();
        let mut d = doc(&body);
        assert_eq!(index(&mut d), 11);
        let names: Vec<_> = d
            .elements_with_class("index")
            .into_iter()
            .map(|a| d.get_attr(a, "name").unwrap().to_string())
            .collect();
        assert_eq!(names[8], "index09");
        assert_eq!(names[9], "index10");
        assert_eq!(names[10], "index11");
    }
}
