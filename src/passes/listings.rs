//! Source listings: inline Python highlighting and external file inclusion.
//!
//! A listing placeholder names a file relative to the source document's
//! directory in its `href`. The placeholder is swapped for a container
//! holding the file's content and a caption linking back to the file.

use std::fs;
use std::path::Path;

use crate::dom::{Document, NodeId};
use crate::error::{Error, Result};
use crate::highlight::{self, Highlighter};
use crate::util::decode_text;

/// Caption used when the placeholder's text is just the file name.
const DEFAULT_CAPTION: &str = "Source listing";

/// The three placeholder classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    /// Highlighted Python, with optional `skipLines`.
    Python,
    /// HTML shown as escaped source.
    Html,
    /// Any other text, escaped verbatim.
    Plain,
}

impl ListingKind {
    pub fn class(self) -> &'static str {
        match self {
            ListingKind::Python => "py-listing",
            ListingKind::Html => "html-listing",
            ListingKind::Plain => "listing",
        }
    }
}

/// Replace every `<pre class="python">` with its highlighted rendering.
pub fn fontify_python(doc: &mut Document, highlighter: &dyn Highlighter) {
    let blocks = doc.find_all(|d, id| d.is_named(id, "pre") && d.get_attr(id, "class") == Some("python"));
    for &pre in &blocks {
        let source = format!("{}\n", doc.text(pre).trim());
        let tokens = highlighter.highlight(&source);
        let highlighted = highlight::render(doc, &tokens, "python");
        doc.replace(pre, highlighted);
    }
    tracing::debug!(count = blocks.len(), "fontified python blocks");
}

/// Insert highlighted Python files for `py-listing` placeholders.
pub fn add_py_listings(doc: &mut Document, dir: &Path, highlighter: &dyn Highlighter) -> Result<()> {
    for node in doc.elements_with_class(ListingKind::Python.class()) {
        let filename = doc.get_attr(node, "href").unwrap_or("").to_string();
        let skip = doc
            .get_attr(node, "skipLines")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(0);

        let text = read_listing(dir, &filename)?;
        let lines: Vec<&str> = text.lines().map(str::trim_end).skip(skip).collect();
        let source = remove_leading_trailing_blanks(&lines.join("\n"));

        let tokens = highlighter.highlight(&source);
        let content = highlight::render(doc, &tokens, "python");
        replace_with_listing(doc, node, content, &filename, ListingKind::Python);
    }
    Ok(())
}

/// Insert escaped HTML source for `html-listing` placeholders.
pub fn add_html_listings(doc: &mut Document, dir: &Path) -> Result<()> {
    add_verbatim_listings(doc, dir, ListingKind::Html, Some("htmlsource"))
}

/// Insert escaped text for `listing` placeholders.
pub fn add_plain_listings(doc: &mut Document, dir: &Path) -> Result<()> {
    add_verbatim_listings(doc, dir, ListingKind::Plain, None)
}

fn add_verbatim_listings(
    doc: &mut Document,
    dir: &Path,
    kind: ListingKind,
    pre_class: Option<&str>,
) -> Result<()> {
    for node in doc.elements_with_class(kind.class()) {
        let filename = doc.get_attr(node, "href").unwrap_or("").to_string();
        let text = read_listing(dir, &filename)?;

        let pre = match pre_class {
            Some(class) => doc.create_element_with("pre", [("class", class)]),
            None => doc.create_element("pre"),
        };
        let body = doc.create_text(format!("\n{text}"));
        doc.append(pre, body);
        replace_with_listing(doc, node, pre, &filename, kind);
    }
    Ok(())
}

fn read_listing(dir: &Path, filename: &str) -> Result<String> {
    let path = dir.join(filename);
    let bytes = fs::read(&path).map_err(|e| Error::io(&path, e))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read listing");
    Ok(decode_text(&bytes, None).into_owned())
}

/// Swap `node` for a captioned listing container wrapping `content`.
fn replace_with_listing(
    doc: &mut Document,
    node: NodeId,
    content: NodeId,
    filename: &str,
    kind: ListingKind,
) {
    let mut caption_title = doc.text(node);
    if caption_title == base_name(filename) {
        caption_title = DEFAULT_CAPTION.to_string();
    }

    let container = doc.create_element_with("div", [("class", kind.class())]);
    doc.append(container, content);

    let caption = doc.create_element_with("div", [("class", "caption")]);
    let caption_text = doc.create_text(format!("{caption_title} - "));
    doc.append(caption, caption_text);
    let link = doc.create_element_with("a", [("href", filename)]);
    let name = doc.create_element_with("span", [("class", "filename")]);
    let name_text = doc.create_text(filename);
    doc.append(name, name_text);
    doc.append(link, name);
    doc.append(caption, link);
    doc.append(container, caption);

    doc.replace(node, container);
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Drop blank lines from both ends; the result ends with a newline.
fn remove_leading_trailing_blanks(s: &str) -> String {
    let lines: Vec<&str> = s.split('\n').collect();
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map(|i| i + 1)
        .unwrap_or(start);
    let mut out = lines[start..end.max(start)].join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::highlight::PlainHighlighter;

    fn doc(body: &str) -> Document {
        Document::parse_xhtml(&format!("<html><body>{body}</body></html>")).unwrap()
    }

    #[test]
    fn test_py_listing_skips_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ex.py"), "# header\n# license\n\nx = 1\nprint(x)\n").unwrap();

        let mut d = doc(r#"<a class="py-listing" href="ex.py" skipLines="2">ex.py</a>"#);
        add_py_listings(&mut d, dir.path(), &PlainHighlighter).unwrap();

        assert!(d.elements_with_class("py-listing").iter().all(|&n| d.is_named(n, "div")));
        let body = d.first_named("body").unwrap();
        assert_eq!(
            d.node_to_xhtml(d.children(body).next().unwrap()),
            concat!(
                r#"<div class="py-listing"><pre class="python">x = 1"#,
                "\nprint(x)\n",
                r#"</pre><div class="caption">Source listing - <a href="ex.py">"#,
                r#"<span class="filename">ex.py</span></a></div></div>"#,
            )
        );
    }

    #[test]
    fn test_plain_listing_keeps_custom_caption() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("out.txt"), "a < b\n").unwrap();

        let mut d = doc(r#"<a class="listing" href="out.txt">Program output</a>"#);
        add_plain_listings(&mut d, dir.path()).unwrap();

        let container = d.elements_with_class("listing")[0];
        let pre = d.children(container).next().unwrap();
        assert_eq!(d.node_to_xhtml(pre), "<pre>\na &lt; b\n</pre>");
        let caption = d.elements_with_class("caption")[0];
        assert_eq!(d.text(caption), "Program output - out.txt");
    }

    #[test]
    fn test_html_listing_escapes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("page.html"), "<p>hi</p>").unwrap();

        let mut d = doc(r#"<a class="html-listing" href="page.html">page.html</a>"#);
        add_html_listings(&mut d, dir.path()).unwrap();

        let pre = d.elements_with_class("htmlsource")[0];
        assert_eq!(d.text(pre), "\n<p>hi</p>");
        assert!(d.to_xhtml().contains("&lt;p&gt;hi&lt;/p&gt;"));
    }

    #[test]
    fn test_missing_listing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = doc(r#"<a class="listing" href="nope.txt">nope.txt</a>"#);
        let err = add_plain_listings(&mut d, dir.path()).unwrap_err();
        match err {
            Error::Io { path, .. } => assert!(path.ends_with("nope.txt")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_fontify_python_replaces_block() {
        let mut d = doc("<pre class=\"python\">\n  x = 1 &lt; 2  \n</pre><pre>other</pre>");
        fontify_python(&mut d, &PlainHighlighter);
        let pres = d.elements_named("pre");
        assert_eq!(pres.len(), 2);
        assert_eq!(d.text(pres[0]), "x = 1 < 2\n");
        assert_eq!(d.get_attr(pres[0], "class"), Some("python"));
        assert_eq!(d.text(pres[1]), "other");
    }

    #[test]
    fn test_remove_leading_trailing_blanks() {
        assert_eq!(remove_leading_trailing_blanks("\n\n a\n\nb\n  \n"), " a\n\nb\n");
        assert_eq!(remove_leading_trailing_blanks("\n \n"), "\n");
    }
}
