//! File driver: read a source, merge it into a template clone, write the result.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dom::Document;
use crate::error::{Error, Result};
use crate::pipeline::{MungeOptions, munge};

/// How source files are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceFormat {
    /// Well-formed XHTML; malformed input is an error.
    #[default]
    Xhtml,
    /// Tag soup, parsed like a browser would.
    Html,
}

/// Read and parse `path`, turning every failure into a located [`Error`].
pub fn parse_file_and_report(path: &Path, format: SourceFormat) -> Result<Document> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    match format {
        SourceFormat::Xhtml => Document::parse_xhtml_bytes(&bytes),
        SourceFormat::Html => {
            let text = crate::util::decode_text(&bytes, None);
            Ok(Document::parse_html(&text))
        }
    }
}

/// `docs/intro.xhtml` with `.html` becomes `docs/intro.html`.
pub fn output_file_name(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path.with_extension("").into_os_string();
    name.push(ext);
    PathBuf::from(name)
}

/// Create the directory that will hold `path`, if missing.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))
        }
        _ => Ok(()),
    }
}

/// Convert one file against a clone of `template`, returning the output path.
///
/// Nothing is written unless every pass succeeds.
pub fn do_file<F>(
    path: &Path,
    template: &Document,
    opts: &MungeOptions,
    format: SourceFormat,
    outfile: F,
) -> Result<PathBuf>
where
    F: Fn(&Path, &str) -> PathBuf,
{
    let doc = parse_file_and_report(path, format)?;
    let mut page = template.clone();
    munge(doc, &mut page, opts)?;

    let out_path = outfile(path, &opts.ext);
    ensure_parent_dir(&out_path)?;
    fs::write(&out_path, page.to_xhtml()).map_err(|e| Error::io(&out_path, e))?;
    tracing::info!(source = %path.display(), output = %out_path.display(), "converted");
    Ok(out_path)
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct Report {
    pub converted: Vec<PathBuf>,
    pub failures: Vec<(PathBuf, Error)>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converts many sources against one parsed template.
#[derive(Debug)]
pub struct Processor {
    template: Document,
    options: MungeOptions,
    format: SourceFormat,
}

impl Processor {
    pub fn new(template: Document, options: MungeOptions) -> Self {
        Self {
            template,
            options,
            format: SourceFormat::default(),
        }
    }

    /// Load the template from disk. Templates are always strict XHTML.
    pub fn from_template_file(path: &Path, options: MungeOptions) -> Result<Self> {
        let template = parse_file_and_report(path, SourceFormat::Xhtml)?;
        Ok(Self::new(template, options))
    }

    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = format;
        self
    }

    pub fn template(&self) -> &Document {
        &self.template
    }

    /// Convert one file.
    pub fn process_file(&self, path: &Path) -> Result<PathBuf> {
        let opts = self.options.for_source(path);
        do_file(path, &self.template, &opts, self.format, output_file_name)
    }

    /// Convert every file, carrying on past failures.
    pub fn process_all<P: AsRef<Path>>(&self, paths: &[P]) -> Report {
        let mut report = Report::default();
        for path in paths {
            let path = path.as_ref();
            match self.process_file(path) {
                Ok(out) => report.converted.push(out),
                Err(e) => {
                    tracing::warn!(source = %path.display(), error = %e, "conversion failed");
                    report.failures.push((path.to_path_buf(), e));
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("docs/howto/intro.xhtml"), ".html"),
            PathBuf::from("docs/howto/intro.html")
        );
        assert_eq!(
            output_file_name(Path::new("README"), ".html"),
            PathBuf::from("README.html")
        );
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("a/b/out.html");
        ensure_parent_dir(&target).unwrap();
        assert!(dir.path().join("a/b").is_dir());
        ensure_parent_dir(Path::new("bare.html")).unwrap();
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_file_and_report(Path::new("/no/such/file.xhtml"), SourceFormat::Xhtml)
            .unwrap_err();
        assert!(err.to_string().ends_with("filename was '/no/such/file.xhtml'"));
    }
}
