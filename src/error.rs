//! Error types for the page cache library.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The source document path does not exist.
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),

    /// A 1-indexed page number outside `[1, total]`.
    #[error("invalid page number {page}; valid range is 1 ~ {total}")]
    InvalidPageNumber { page: u32, total: u32 },

    #[error("invalid dpi {dpi}; valid range is 1 ~ {max}")]
    InvalidDpi { dpi: u32, max: u32 },

    #[error("document has no pages: {}", .0.display())]
    EmptyDocument(PathBuf),

    /// Input refused before opening (URL inputs, size limits).
    #[error("rejected input: {0}")]
    RejectedInput(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by the document library backend.
    #[error("document library: {0}")]
    Library(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Attaches a description to `std::io::Error`s, in the spirit of `anyhow::Context`.
pub trait IoContext<T> {
    fn io_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|source| Error::Io {
            context: f(),
            source,
        })
    }
}

impl From<mupdf::Error> for Error {
    fn from(e: mupdf::Error) -> Self {
        Error::Library(e.to_string())
    }
}
