//! The pass pipeline: merge one source document into one template.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::highlight::{Highlighter, default_highlighter};
use crate::passes::{self, TocLevels};

/// Everything a single [`munge`] run needs besides the two documents.
#[derive(Clone)]
pub struct MungeOptions {
    /// Prefix for relative asset references in the template.
    pub linkrel: String,
    /// Directory that listing `href`s are relative to.
    pub dir: PathBuf,
    /// Path of the source file, for the modification stamp.
    pub fullpath: PathBuf,
    /// Output extension, including the dot.
    pub ext: String,
    /// API reference URL with a `%name%` placeholder.
    pub api_url: String,
    pub config: Config,
    pub toc_levels: TocLevels,
    pub highlighter: Arc<dyn Highlighter + Send + Sync>,
}

impl MungeOptions {
    /// Options for converting the file at `source`.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        let fullpath = source.into();
        let dir = fullpath
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            linkrel: String::new(),
            dir,
            fullpath,
            ext: ".html".to_string(),
            api_url: "%name%".to_string(),
            config: Config::default(),
            toc_levels: TocLevels::default(),
            highlighter: default_highlighter(),
        }
    }

    pub fn with_linkrel(mut self, linkrel: impl Into<String>) -> Self {
        self.linkrel = linkrel.into();
        self
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_toc_levels(mut self, levels: TocLevels) -> Self {
        self.toc_levels = levels;
        self
    }

    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter + Send + Sync>) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Point the options at another source file, keeping everything else.
    pub fn for_source(&self, source: impl Into<PathBuf>) -> Self {
        let fresh = MungeOptions::new(source);
        Self {
            dir: fresh.dir,
            fullpath: fresh.fullpath,
            ..self.clone()
        }
    }
}

impl fmt::Debug for MungeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MungeOptions")
            .field("linkrel", &self.linkrel)
            .field("dir", &self.dir)
            .field("fullpath", &self.fullpath)
            .field("ext", &self.ext)
            .field("api_url", &self.api_url)
            .field("config", &self.config)
            .field("toc_levels", &self.toc_levels)
            .finish_non_exhaustive()
    }
}

/// Run every pass and splice the source body into the template.
///
/// `template` should be a fresh clone: it is mutated in place and becomes
/// the output document. The source is consumed; its body content ends up
/// inside the template's `body`-classed element, which is re-classed
/// `content`.
pub fn munge(mut document: Document, template: &mut Document, opts: &MungeOptions) -> Result<()> {
    tracing::debug!(file = %opts.fullpath.display(), "munging");

    passes::fix_relative_links(template, &opts.linkrel);
    passes::add_mtime(template, &opts.fullpath)?;
    passes::remove_h1(&mut document);
    passes::fix_api(&mut document, &opts.api_url);
    passes::fontify_python(&mut document, opts.highlighter.as_ref());
    passes::fix_links(&mut document, &opts.ext);
    passes::add_py_listings(&mut document, &opts.dir, opts.highlighter.as_ref())?;
    passes::add_html_listings(&mut document, &opts.dir)?;
    passes::add_plain_listings(&mut document, &opts.dir)?;

    let toc = passes::generate_toc(&mut document, template, &opts.toc_levels);
    passes::put_in_toc(template, toc);

    passes::footnotes(&mut document)?;
    passes::notes(&mut document);
    let indexed = passes::index(&mut document);
    tracing::debug!(indexed, "indexed terms");

    passes::set_version(template, opts.config.version());

    let title = passes::document_title(&document);
    passes::set_title(template, &document, &title);

    let authors = passes::document_authors(&document);
    passes::set_authors(template, &authors);

    let body = document
        .first_named("body")
        .ok_or_else(|| Error::MissingElement("body".into()))?;
    let slot = template
        .elements_with_class("body")
        .first()
        .copied()
        .ok_or_else(|| Error::MissingElement("template element with class \"body\"".into()))?;
    template.clear_children(slot);
    template.adopt_children(slot, document, body);
    template.set_attr(slot, "class", "content");

    Ok(())
}
