//! PDF page source backed by lopdf

use lopdf::Document as PdfDocument;
use std::path::{Path, PathBuf};

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::Page;

/// Lazily extracts the text of each page of a parsed PDF, in page order.
pub struct PdfPages {
    path: PathBuf,
    document: PdfDocument,
    numbers: std::vec::IntoIter<u32>,
}

impl PdfPages {
    /// Parse the PDF structure. Page text is not decoded until iterated.
    pub fn open(path: &Path) -> RagResult<Self> {
        let document = PdfDocument::load(path).map_err(|e| RagError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let numbers: Vec<u32> = document.get_pages().keys().copied().collect();
        tracing::debug!(path = %path.display(), pages = numbers.len(), "opened pdf");

        Ok(Self {
            path: path.to_path_buf(),
            document,
            numbers: numbers.into_iter(),
        })
    }
}

impl Iterator for PdfPages {
    type Item = RagResult<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let number = self.numbers.next()?;
        let page = self
            .document
            .extract_text(&[number])
            .map(|text| Page::new(number, text.trim_end()))
            .map_err(|e| RagError::Parse {
                path: self.path.clone(),
                reason: format!("page {number}: {e}"),
            });
        Some(page)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.numbers.size_hint()
    }
}
