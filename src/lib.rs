//! # lore
//!
//! Merge XHTML documentation sources into a page template.
//!
//! A source document is rewritten by a fixed sequence of passes (link fixups,
//! highlighted listings, table of contents, footnotes, index anchors) and its
//! body is then spliced into a copy of the template, whose title, author,
//! version and modification-time slots are filled from the source.
//!
//! ## Quick Start
//!
//! ```
//! use lore::{Document, MungeOptions, munge};
//!
//! let template = Document::parse_xhtml(
//!     r#"<html><head><title></title></head><body><div class="body" /></body></html>"#,
//! ).unwrap();
//! let source = Document::parse_xhtml(
//!     "<html><head><title>Howto</title></head><body><p>Hello</p></body></html>",
//! ).unwrap();
//!
//! let mut page = template.clone();
//! munge(source, &mut page, &MungeOptions::new("howto.xhtml")).unwrap();
//! assert!(page.to_xhtml().contains(r#"<div class="content"><p>Hello</p></div>"#));
//! ```
//!
//! ## Converting Files
//!
//! [`Processor`] reuses one parsed template across many sources and writes
//! each result next to its source with the output extension swapped in:
//!
//! ```no_run
//! use std::path::Path;
//! use lore::{MungeOptions, Processor};
//!
//! let opts = MungeOptions::new("").with_ext(".html");
//! let processor = Processor::from_template_file(Path::new("template.tpl"), opts).unwrap();
//! let report = processor.process_all(&["howto/intro.xhtml", "howto/deferreds.xhtml"]);
//! assert!(report.is_success());
//! ```

pub mod config;
pub mod dom;
pub mod error;
pub mod highlight;
pub mod passes;
pub mod pipeline;
pub mod process;
pub(crate) mod util;

pub use config::Config;
pub use dom::{Document, NodeData, NodeId};
pub use error::{Error, Result};
pub use highlight::{Highlighter, PlainHighlighter, Token, TokenClass};
pub use pipeline::{MungeOptions, munge};
pub use process::{
    Processor, Report, SourceFormat, do_file, ensure_parent_dir, output_file_name,
    parse_file_and_report,
};

#[cfg(feature = "highlight")]
pub use highlight::PythonHighlighter;
