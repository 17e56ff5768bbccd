//! Document ingestion
//!
//! Turns a path into an ordered, lazily produced sequence of pages:
//! - PDF via lopdf, one page per PDF page
//! - plain UTF-8 text as a single page
//!
//! Ingestion is read-only.

pub mod pdf;

use std::path::Path;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{Document, DocumentFormat, Page};

pub use pdf::PdfPages;

/// Page sequence of a document being ingested
pub enum Pages {
    Pdf(PdfPages),
    Text(std::option::IntoIter<Page>),
}

impl Iterator for Pages {
    type Item = RagResult<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Pdf(pages) => pages.next(),
            Self::Text(pages) => pages.next().map(Ok),
        }
    }
}

/// Loads documents from local storage
pub struct DocumentIngestor;

impl DocumentIngestor {
    /// Open a document and return its pages lazily.
    ///
    /// `format` overrides extension-based detection.
    pub fn pages(path: &Path, format: Option<DocumentFormat>) -> RagResult<Pages> {
        ensure_exists(path)?;

        match format.unwrap_or_else(|| DocumentFormat::detect(path)) {
            DocumentFormat::Pdf => Ok(Pages::Pdf(PdfPages::open(path)?)),
            DocumentFormat::PlainText => {
                let bytes = std::fs::read(path)?;
                let text = String::from_utf8(bytes).map_err(|e| RagError::Parse {
                    path: path.to_path_buf(),
                    reason: format!("not valid UTF-8: {e}"),
                })?;
                Ok(Pages::Text(Some(Page::new(1, text)).into_iter()))
            }
        }
    }

    /// Load every page of a document
    pub fn load(path: &Path, format: Option<DocumentFormat>) -> RagResult<Document> {
        let format = format.unwrap_or_else(|| DocumentFormat::detect(path));
        let pages = Self::pages(path, Some(format))?.collect::<RagResult<Vec<_>>>()?;

        tracing::info!(
            path = %path.display(),
            format = ?format,
            pages = pages.len(),
            "document loaded"
        );

        Ok(Document::new(path, format, pages))
    }

    /// [`DocumentIngestor::load`] on the blocking thread pool
    pub async fn load_async(
        path: impl AsRef<Path>,
        format: Option<DocumentFormat>,
    ) -> RagResult<Document> {
        let path = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || Self::load(&path, format))
            .await
            .map_err(|e| RagError::Io(std::io::Error::other(e)))?
    }
}

fn ensure_exists(path: &Path) -> RagResult<()> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(RagError::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RagError::NotFound(path.to_path_buf()))
        }
        Err(e) => Err(RagError::Io(e)),
    }
}
