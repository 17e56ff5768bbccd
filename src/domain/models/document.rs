//! Document domain models
//!
//! A document is an ordered sequence of pages as produced by an ingestor.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Format of a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// Paginated PDF
    Pdf,
    /// UTF-8 text such as a source file; a single page
    PlainText,
}

impl DocumentFormat {
    /// Detect the format from the file extension (`.pdf` is PDF, anything else is text)
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Self::Pdf,
            _ => Self::PlainText,
        }
    }
}

/// A single page of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number
    pub number: u32,

    /// Extracted text of the page
    pub text: String,
}

impl Page {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// A loaded document. Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    source: PathBuf,
    format: DocumentFormat,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(source: impl Into<PathBuf>, format: DocumentFormat, pages: Vec<Page>) -> Self {
        Self {
            source: source.into(),
            format,
            pages,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Identifier used as the parent id of this document's chunks
    pub fn id(&self) -> String {
        self.source
            .file_name()
            .map_or_else(|| self.source.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Page texts joined by newlines
    pub fn text(&self) -> String {
        self.pages
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Char offset at which each page starts within [`Document::text`]
    pub fn page_offsets(&self) -> Vec<(usize, u32)> {
        let mut offsets = Vec::with_capacity(self.pages.len());
        let mut offset = 0;
        for page in &self.pages {
            offsets.push((offset, page.number));
            // +1 for the joining newline
            offset += page.text.chars().count() + 1;
        }
        offsets
    }

    /// Page containing the given char offset of [`Document::text`]
    pub fn page_at(&self, char_offset: usize) -> Option<u32> {
        self.page_offsets()
            .iter()
            .take_while(|(start, _)| *start <= char_offset)
            .last()
            .map(|(_, number)| *number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pages() -> Document {
        Document::new(
            "rules/guide.pdf",
            DocumentFormat::Pdf,
            vec![Page::new(1, "abc"), Page::new(2, "defg")],
        )
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(DocumentFormat::detect(Path::new("a/b.pdf")), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::detect(Path::new("a/b.PDF")), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::detect(Path::new("a/b.kt")), DocumentFormat::PlainText);
        assert_eq!(DocumentFormat::detect(Path::new("Makefile")), DocumentFormat::PlainText);
    }

    #[test]
    fn test_text_joins_pages_with_newline() {
        assert_eq!(two_pages().text(), "abc\ndefg");
    }

    #[test]
    fn test_page_at() {
        let doc = two_pages();
        assert_eq!(doc.page_offsets(), vec![(0, 1), (4, 2)]);
        assert_eq!(doc.page_at(0), Some(1));
        assert_eq!(doc.page_at(3), Some(1));
        assert_eq!(doc.page_at(4), Some(2));
        assert_eq!(doc.page_at(100), Some(2));
    }

    #[test]
    fn test_id_is_file_name() {
        assert_eq!(two_pages().id(), "guide.pdf");
    }
}
