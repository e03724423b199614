//! Error types for lore operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while parsing, transforming or writing a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{source}, filename was '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{line}:{col}:{message}")]
    Parse {
        line: usize,
        col: usize,
        message: String,
    },

    #[error(
        "{begin_line}:{begin_col}: begin mismatched tags <{got}>/</{expected}>; \
         {end_line}:{end_col}: end mismatched tags <{got}>/</{expected}>"
    )]
    MismatchedTags {
        begin_line: usize,
        begin_col: usize,
        end_line: usize,
        end_col: usize,
        /// Name of the closing tag that was found.
        got: String,
        /// Name of the element that was open.
        expected: String,
    },

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Wrap an I/O error with the file it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_message_names_file() {
        let err = Error::io(
            "docs/howto.xhtml",
            io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        );
        assert_eq!(
            err.to_string(),
            "No such file or directory, filename was 'docs/howto.xhtml'"
        );
    }

    #[test]
    fn test_mismatched_tags_message() {
        let err = Error::MismatchedTags {
            begin_line: 3,
            begin_col: 5,
            end_line: 4,
            end_col: 1,
            got: "p".into(),
            expected: "div".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("3:5: begin mismatched tags <p>/</div>"));
        assert!(msg.contains("4:1: end mismatched tags <p>/</div>"));
    }
}
