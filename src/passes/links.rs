//! Link rewriting: output extensions, template-relative assets, API references.

use crate::dom::Document;

/// Schemes that mark a link as pointing off-site.
const EXTERNAL_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

/// Point intra-site `.html` links at files with extension `ext`.
///
/// Links with an external scheme, class `absolute`, or a class mentioning
/// `listing` are left alone. Fragments survive the rewrite.
pub fn fix_links(doc: &mut Document, ext: &str) {
    let mut rewritten = 0usize;
    for node in doc.elements_with_attr("href") {
        let Some(href) = doc.get_attr(node, "href") else {
            continue;
        };
        if url_scheme(href).is_some_and(|s| EXTERNAL_SCHEMES.contains(&s.as_str())) {
            continue;
        }
        let class = doc.get_attr(node, "class").unwrap_or("");
        if class == "absolute" || class.contains("listing") {
            continue;
        }

        let (path, fragment) = match href.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (href, None),
        };
        if !path.ends_with("html") {
            continue;
        }

        let mut new_href = format!("{}{}", strip_extension(path), ext);
        if let Some(fragment) = fragment {
            new_href.push('#');
            new_href.push_str(fragment);
        }
        doc.set_attr(node, "href", new_href);
        rewritten += 1;
    }
    tracing::debug!(rewritten, ext, "fixed intra-site links");
}

/// Prefix relative `src` and `href` values with `prefix`.
///
/// Anything starting with `http` or `/` is taken to be absolute.
pub fn fix_relative_links(doc: &mut Document, prefix: &str) {
    if prefix.is_empty() {
        return;
    }
    for attr in ["src", "href"] {
        for node in doc.elements_with_attr(attr) {
            let Some(value) = doc.get_attr(node, attr) else {
                continue;
            };
            if value.starts_with("http") || value.starts_with('/') {
                continue;
            }
            let new_value = format!("{prefix}{value}");
            doc.set_attr(node, attr, new_value);
        }
    }
}

/// Turn `class="API"` elements into links to API documentation.
///
/// The fully qualified name is the optional `base` attribute joined to the
/// element's text with a dot. `url_template` has `%name%` replaced by that
/// name; a template without `%name%` has `%s` replaced instead.
pub fn fix_api(doc: &mut Document, url_template: &str) {
    let nodes = doc.elements_with_class("API");
    for &node in &nodes {
        let text = doc.text(node);
        let full_name = match doc.get_attr(node, "base") {
            Some(base) if !base.is_empty() => format!("{base}.{text}"),
            _ => text,
        };
        let href = if url_template.contains("%name%") {
            url_template.replace("%name%", &full_name)
        } else {
            url_template.replace("%s", &full_name)
        };

        let link = doc.create_element_with("a", [("href", href.as_str()), ("title", full_name.as_str())]);
        doc.reparent_children(node, link);
        doc.append(node, link);
        doc.remove_attr(node, "base");
    }
    tracing::debug!(count = nodes.len(), "linked API references");
}

/// The URI scheme of `href`, lower-cased, if it has one.
fn url_scheme(href: &str) -> Option<String> {
    let (scheme, _) = href.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some(scheme.to_ascii_lowercase())
}

/// Drop the extension of the last path component, if it has one.
fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &path[name_start..];
    match name.rfind('.') {
        // A leading dot names a hidden file, not an extension
        Some(dot) if name[..dot].chars().any(|c| c != '.') => &path[..name_start + dot],
        _ => path,
    }
}
