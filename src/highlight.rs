//! Syntax highlighting for Python listings.
//!
//! A [`Highlighter`] turns source text into a flat token stream; [`render`]
//! writes that stream into a document as a `<pre>` of classed spans. The
//! concatenated token text always equals the input, so highlighting never
//! changes what a listing says.

use std::sync::Arc;

use crate::dom::{Document, NodeId};

/// Token categories, rendered as `py-src-<name>` classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    String,
    Comment,
    Number,
    Identifier,
    Operator,
    Decorator,
}

impl TokenClass {
    pub fn css_class(self) -> &'static str {
        match self {
            TokenClass::Keyword => "py-src-keyword",
            TokenClass::String => "py-src-string",
            TokenClass::Comment => "py-src-comment",
            TokenClass::Number => "py-src-number",
            TokenClass::Identifier => "py-src-identifier",
            TokenClass::Operator => "py-src-op",
            TokenClass::Decorator => "py-src-decorator",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub class: Option<TokenClass>,
    pub text: String,
}

impl Token {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            class: None,
            text: text.into(),
        }
    }
}

/// A source-code highlighting service.
pub trait Highlighter {
    fn highlight(&self, source: &str) -> Vec<Token>;
}

/// Emits the whole input as one unclassified token.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, source: &str) -> Vec<Token> {
        if source.is_empty() {
            return Vec::new();
        }
        vec![Token::plain(source)]
    }
}

/// The best highlighter this build supports.
pub fn default_highlighter() -> Arc<dyn Highlighter + Send + Sync> {
    #[cfg(feature = "highlight")]
    {
        Arc::new(PythonHighlighter)
    }
    #[cfg(not(feature = "highlight"))]
    {
        Arc::new(PlainHighlighter)
    }
}

/// Write tokens into `doc` as `<pre class="{class}">`, returning the detached `pre`.
pub fn render(doc: &mut Document, tokens: &[Token], class: &str) -> NodeId {
    let pre = doc.create_element_with("pre", [("class", class)]);
    for token in tokens {
        match token.class {
            Some(c) => {
                let span = doc.create_element_with("span", [("class", c.css_class())]);
                let text = doc.create_text(token.text.as_str());
                doc.append(span, text);
                doc.append(pre, span);
            }
            None => doc.append_text(pre, &token.text),
        }
    }
    pre
}

#[cfg(feature = "highlight")]
pub use python::PythonHighlighter;

#[cfg(feature = "highlight")]
mod python {
    use arborium::tree_sitter::{Node, Parser};

    use super::{Highlighter, PlainHighlighter, Token, TokenClass};

    /// Tree-sitter based Python highlighter.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct PythonHighlighter;

    impl Highlighter for PythonHighlighter {
        fn highlight(&self, source: &str) -> Vec<Token> {
            let mut parser = Parser::new();
            if parser
                .set_language(&arborium_python::language().into())
                .is_err()
            {
                tracing::warn!("python grammar unavailable, emitting plain listing");
                return PlainHighlighter.highlight(source);
            }
            let Some(tree) = parser.parse(source, None) else {
                return PlainHighlighter.highlight(source);
            };

            let mut tokens = Vec::new();
            let mut pos = 0;
            collect_tokens(source, tree.root_node(), &mut pos, &mut tokens);
            if pos < source.len() {
                tokens.push(Token::plain(&source[pos..]));
            }
            tokens
        }
    }

    /// Nodes highlighted as a unit even though the grammar gives them children.
    fn atomic_class(kind: &str) -> Option<TokenClass> {
        match kind {
            "string" | "concatenated_string" => Some(TokenClass::String),
            "comment" => Some(TokenClass::Comment),
            "decorator" => Some(TokenClass::Decorator),
            _ => None,
        }
    }

    fn leaf_class(node: &Node<'_>) -> Option<TokenClass> {
        let kind = node.kind();
        match kind {
            "integer" | "float" => Some(TokenClass::Number),
            "identifier" => Some(TokenClass::Identifier),
            "true" | "false" | "none" => Some(TokenClass::Keyword),
            _ if !node.is_named() && kind.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(TokenClass::Keyword)
            }
            _ if !node.is_named() && !kind.trim().is_empty() => Some(TokenClass::Operator),
            _ => None,
        }
    }

    fn collect_tokens(source: &str, node: Node<'_>, pos: &mut usize, tokens: &mut Vec<Token>) {
        let atomic = atomic_class(node.kind());
        if atomic.is_none() && node.child_count() > 0 {
            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            for child in children {
                collect_tokens(source, child, pos, tokens);
            }
            return;
        }

        let (start, end) = (node.start_byte(), node.end_byte());
        if start < *pos || end <= start {
            return;
        }
        if let Some(gap) = source.get(*pos..start)
            && !gap.is_empty()
        {
            tokens.push(Token::plain(gap));
        }
        if let Some(text) = source.get(start..end) {
            tokens.push(Token {
                class: atomic.or_else(|| leaf_class(&node)),
                text: text.to_string(),
            });
            *pos = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_render() {
        let mut doc = Document::new();
        let tokens = PlainHighlighter.highlight("x = 1 < 2\n");
        let pre = render(&mut doc, &tokens, "python");
        doc.append(doc.root(), pre);
        assert_eq!(doc.to_xhtml(), "<pre class=\"python\">x = 1 &lt; 2\n</pre>");
    }

    #[test]
    fn test_render_spans() {
        let mut doc = Document::new();
        let tokens = vec![
            Token {
                class: Some(TokenClass::Keyword),
                text: "def".into(),
            },
            Token::plain(" "),
            Token {
                class: Some(TokenClass::Identifier),
                text: "f".into(),
            },
        ];
        let pre = render(&mut doc, &tokens, "python");
        doc.append(doc.root(), pre);
        assert_eq!(
            doc.to_xhtml(),
            "<pre class=\"python\"><span class=\"py-src-keyword\">def</span> \
             <span class=\"py-src-identifier\">f</span></pre>"
        );
    }

    #[cfg(feature = "highlight")]
    #[test]
    fn test_python_tokens_cover_source() {
        let src = "@deco\ndef f(x):\n    # note\n    return x + 1  # done\ns = 'hi'\n";
        let tokens = PythonHighlighter.highlight(src);
        let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(joined, src);

        let class_of = |text: &str| {
            tokens
                .iter()
                .find(|t| t.text == text)
                .and_then(|t| t.class)
        };
        assert_eq!(class_of("def"), Some(TokenClass::Keyword));
        assert_eq!(class_of("return"), Some(TokenClass::Keyword));
        assert_eq!(class_of("# note"), Some(TokenClass::Comment));
        assert_eq!(class_of("'hi'"), Some(TokenClass::String));
        assert_eq!(class_of("1"), Some(TokenClass::Number));
    }
}
