//! Text chunking implementation
//!
//! Splits text into windows of at most `chunk_size` characters where each
//! window shares exactly `chunk_overlap` characters with the previous one.
//! Windows end just after the last separator match when one is available.

use regex::Regex;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{Chunk, ChunkMetadata, ChunkingConfig, Document};

enum Separator {
    Literal(String),
    Pattern(Regex),
}

impl Separator {
    /// Byte offsets (relative to `haystack`) just past each match
    fn match_ends(&self, haystack: &str) -> Vec<usize> {
        match self {
            Self::Literal(s) => haystack
                .match_indices(s.as_str())
                .map(|(i, m)| i + m.len())
                .collect(),
            Self::Pattern(re) => re.find_iter(haystack).map(|m| m.end()).collect(),
        }
    }
}

/// Character-based text chunker
///
/// Splitting is deterministic: the same text and configuration always yield
/// the same chunks.
pub struct Chunker {
    config: ChunkingConfig,
    separators: Vec<Separator>,
}

impl Chunker {
    /// Create a new chunker with default configuration
    pub fn new() -> RagResult<Self> {
        Self::with_config(ChunkingConfig::default())
    }

    /// Create a new chunker with custom configuration
    pub fn with_config(config: ChunkingConfig) -> RagResult<Self> {
        config
            .validate()
            .map_err(|e| RagError::Config(format!("invalid chunking config: {e}")))?;

        let separators = config
            .separators
            .iter()
            .filter(|s| !s.is_empty())
            .map(|s| {
                if config.is_separator_regex {
                    Regex::new(s).map(Separator::Pattern).map_err(|e| {
                        RagError::Config(format!("invalid separator pattern '{s}': {e}"))
                    })
                } else {
                    Ok(Separator::Literal(s.clone()))
                }
            })
            .collect::<RagResult<Vec<_>>>()?;

        Ok(Self { config, separators })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Split text into chunks whose parent id is `parent_id`
    pub fn split(&self, text: &str, parent_id: &str) -> Vec<Chunk> {
        self.split_impl(text, parent_id, None)
    }

    /// Split the concatenated text of a document, recording the page each
    /// chunk starts on
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let text = document.text();
        let chunks = self.split_impl(&text, &document.id(), Some(document));

        tracing::info!(
            document = %document.source().display(),
            chars = text.chars().count(),
            chunks = chunks.len(),
            "document chunked"
        );

        chunks
    }

    fn split_impl(&self, text: &str, parent_id: &str, document: Option<&Document>) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // bounds[c] is the byte offset of char c; the last entry is text.len()
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = bounds.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let hard_end = (start + self.config.chunk_size).min(total);
            let (end, at_separator) = if hard_end == total {
                (total, false)
            } else {
                self.find_cut(text, &bounds, start, hard_end)
                    .map_or((hard_end, false), |cut| (cut, true))
            };

            let mut metadata = ChunkMetadata::with_offsets(start, end)
                .with_page(document.and_then(|d| d.page_at(start)));
            if at_separator {
                metadata = metadata.mark_separator();
            }

            let content = text[bounds[start]..bounds[end]].to_string();
            chunks.push(
                Chunk::new(parent_id.to_string(), content, chunks.len()).with_metadata(metadata),
            );

            if end == total {
                break;
            }

            start = end - self.config.chunk_overlap;
        }

        chunks
    }

    /// Latest separator-aligned cut in `(start + overlap, hard_end]`, trying
    /// separators in priority order
    fn find_cut(&self, text: &str, bounds: &[usize], start: usize, hard_end: usize) -> Option<usize> {
        // The next window starts at cut - overlap and must move forward
        let min_cut = start + self.config.chunk_overlap + 1;
        let window_start = bounds[start];
        let window = &text[window_start..bounds[hard_end]];

        self.separators.iter().find_map(|separator| {
            separator
                .match_ends(window)
                .into_iter()
                .rev()
                .filter_map(|end| bounds.binary_search(&(window_start + end)).ok())
                .find(|&cut| cut >= min_cut)
        })
    }
}
