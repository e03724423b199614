//! Strict XHTML parsing with quick-xml.
//!
//! Unlike the html5ever path, this reader refuses malformed input and says
//! where it went wrong: a closing tag that does not match the open element
//! is reported with both positions and both names.

use quick_xml::Reader;
use quick_xml::escape::{resolve_html5_entity, resolve_xml_entity, unescape, unescape_with};
use quick_xml::events::Event;

use super::{Attributes, Document, NodeId, html_name};
use crate::error::{Error, Result};

/// An element that has been opened but not yet closed.
struct Open {
    id: NodeId,
    name: String,
    offset: usize,
}

impl Document {
    /// Parse well-formed XHTML.
    ///
    /// The five XML entities and character references become text. Any
    /// other named reference in content is kept as an entity node and
    /// written back unchanged; in attribute values it is resolved against
    /// the HTML5 entity set.
    pub fn parse_xhtml(src: &str) -> Result<Document> {
        let mut reader = Reader::from_str(src);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;

        let mut doc = Document::new();
        let mut stack: Vec<Open> = Vec::new();

        loop {
            let offset = reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| {
                let (line, col) = line_col(src, reader.error_position() as usize);
                Error::Parse {
                    line,
                    col,
                    message: e.to_string(),
                }
            })?;
            let parent = stack.last().map(|o| o.id).unwrap_or(doc.root());

            match event {
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = read_attributes(&e);
                    let id = doc.create_element_qual(html_name(&name), attrs);
                    doc.append(parent, id);
                    stack.push(Open { id, name, offset });
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let attrs = read_attributes(&e);
                    let id = doc.create_element_qual(html_name(&name), attrs);
                    doc.append(parent, id);
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let Some(open) = stack.pop() else {
                        let (line, col) = line_col(src, offset);
                        return Err(Error::Parse {
                            line,
                            col,
                            message: format!("unexpected closing tag </{name}>"),
                        });
                    };
                    if !open.name.eq_ignore_ascii_case(&name) {
                        let (begin_line, begin_col) = line_col(src, open.offset);
                        let (end_line, end_col) = line_col(src, offset);
                        return Err(Error::MismatchedTags {
                            begin_line,
                            begin_col,
                            end_line,
                            end_col,
                            got: name,
                            expected: open.name,
                        });
                    }
                }
                Event::Text(e) => {
                    let text = String::from_utf8_lossy(&e);
                    if !text.is_empty() {
                        doc.append_text(parent, &text);
                    }
                }
                Event::GeneralRef(r) => {
                    let name = String::from_utf8_lossy(&r).into_owned();
                    if let Some(text) = resolve_xml_entity(&name) {
                        doc.append_text(parent, text);
                    } else if name.starts_with('#') {
                        let raw = format!("&{name};");
                        let text = unescape(&raw).map(|t| t.into_owned()).unwrap_or(raw);
                        doc.append_text(parent, &text);
                    } else {
                        let id = doc.create_entity_ref(name);
                        doc.append(parent, id);
                    }
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    doc.append_text(parent, &text);
                }
                Event::Comment(e) => {
                    let id = doc.create_comment(String::from_utf8_lossy(&e).into_owned());
                    doc.append(parent, id);
                }
                Event::DocType(e) => {
                    let raw = String::from_utf8_lossy(&e).trim().to_string();
                    let id = doc.create_doctype(raw, "", "");
                    doc.append(parent, id);
                }
                Event::PI(e) => {
                    let raw = String::from_utf8_lossy(&e).into_owned();
                    let (target, data) = match raw.split_once(char::is_whitespace) {
                        Some((t, d)) => (t.to_string(), d.trim().to_string()),
                        None => (raw, String::new()),
                    };
                    let id = doc.create_pi(target, data);
                    doc.append(parent, id);
                }
                Event::Eof => break,
                // The XML declaration is not kept.
                _ => {}
            }
        }

        if let Some(open) = stack.pop() {
            let (line, col) = line_col(src, open.offset);
            return Err(Error::Parse {
                line,
                col,
                message: format!("unclosed element <{}>", open.name),
            });
        }

        Ok(doc)
    }

    /// Parse XHTML bytes, honouring an `encoding` in the XML declaration.
    pub fn parse_xhtml_bytes(bytes: &[u8]) -> Result<Document> {
        let hint_encoding = crate::util::extract_xml_encoding(bytes);
        let text = crate::util::decode_text(bytes, hint_encoding);
        Document::parse_xhtml(&text)
    }
}

fn read_attributes(e: &quick_xml::events::BytesStart<'_>) -> Attributes {
    let mut attrs = Attributes::new();
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape_with(&raw, resolve_entity)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| raw.to_string());
        attrs.set(key, value);
    }
    attrs
}

fn resolve_entity(name: &str) -> Option<&'static str> {
    resolve_xml_entity(name).or_else(|| resolve_html5_entity(name))
}

/// 1-based line and column of a byte offset.
pub(crate) fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let bytes = src.as_bytes();
    let offset = offset.min(bytes.len());
    let prefix = &bytes[..offset];
    let line = memchr::memchr_iter(b'\n', prefix).count() + 1;
    let line_start = memchr::memrchr(b'\n', prefix).map(|p| p + 1).unwrap_or(0);
    (line, offset - line_start + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_structure() {
        let doc = Document::parse_xhtml(
            "<html><head><title>T</title></head><body><p class=\"x\">Hi</p></body></html>",
        )
        .unwrap();
        let p = doc.first_named("p").unwrap();
        assert_eq!(doc.get_attr(p, "class"), Some("x"));
        assert_eq!(doc.text(p), "Hi");
        assert!(doc.is_named(doc.document_element().unwrap(), "html"));
    }

    #[test]
    fn test_entities_resolved() {
        let doc = Document::parse_xhtml(
            "<p title=\"a &amp; b\">x &lt; y&nbsp;z &#65; &bogus;</p>",
        )
        .unwrap();
        let p = doc.first_named("p").unwrap();
        assert_eq!(doc.get_attr(p, "title"), Some("a & b"));
        assert_eq!(doc.text(p), "x < y\u{a0}z A &bogus;");
    }

    #[test]
    fn test_mismatched_tags_located() {
        let err = Document::parse_xhtml("<html>\n  <div>\n  </span>\n</html>").unwrap_err();
        match err {
            Error::MismatchedTags {
                begin_line,
                begin_col,
                end_line,
                end_col,
                got,
                expected,
            } => {
                assert_eq!((begin_line, begin_col), (2, 3));
                assert_eq!((end_line, end_col), (3, 3));
                assert_eq!(got, "span");
                assert_eq!(expected, "div");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_element() {
        let err = Document::parse_xhtml("<html><body>").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, col: 7, .. }), "{err:?}");
    }

    #[test]
    fn test_stray_close() {
        let err = Document::parse_xhtml("<p/></p>").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_line_col() {
        let src = "ab\ncd\nef";
        assert_eq!(line_col(src, 0), (1, 1));
        assert_eq!(line_col(src, 4), (2, 2));
        assert_eq!(line_col(src, 6), (3, 1));
    }
}
