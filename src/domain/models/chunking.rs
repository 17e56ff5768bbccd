//! Text chunking domain models
//!
//! Models for splitting documents into bounded, overlapping chunks for embedding.
//! Sizes are counted in characters.

use serde::{Deserialize, Serialize};

/// Configuration for document chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChunkingConfig {
    /// Maximum size of each chunk in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Preferred split points, tried in order
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,

    /// Whether `separators` are regular expressions rather than literals
    #[serde(default)]
    pub is_separator_regex: bool,
}

const fn default_chunk_size() -> usize {
    100
}

const fn default_chunk_overlap() -> usize {
    20
}

fn default_separators() -> Vec<String> {
    vec!["\n\n".to_string(), "\n".to_string(), " ".to_string()]
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            separators: default_separators(),
            is_separator_regex: false,
        }
    }
}

impl ChunkingConfig {
    /// Validate the chunking configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be greater than 0".to_string());
        }

        if self.chunk_overlap >= self.chunk_size {
            return Err(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            ));
        }

        Ok(())
    }
}

/// A chunk of text extracted from a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique identifier for this chunk
    pub id: String,

    /// ID of the parent document
    pub parent_id: String,

    /// The text content of this chunk
    pub content: String,

    /// Index of this chunk within the parent document (0-based)
    pub chunk_index: usize,

    /// Number of characters in this chunk
    pub char_count: usize,

    /// Metadata about this chunk
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(parent_id: String, content: String, chunk_index: usize) -> Self {
        let id = format!("{parent_id}:chunk:{chunk_index}");
        let char_count = content.chars().count();

        Self {
            id,
            parent_id,
            content,
            chunk_index,
            char_count,
            metadata: ChunkMetadata::default(),
        }
    }

    /// Set metadata for this chunk
    pub fn with_metadata(mut self, metadata: ChunkMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns true if this is the first chunk
    pub fn is_first(&self) -> bool {
        self.chunk_index == 0
    }

    /// Get a preview of the content (first 100 chars)
    pub fn preview(&self) -> String {
        if self.char_count <= 100 {
            self.content.clone()
        } else {
            format!("{}...", self.content.chars().take(100).collect::<String>())
        }
    }
}

/// Metadata about a chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Start position in the source text (character offset)
    pub start_offset: Option<usize>,

    /// End position in the source text (character offset, exclusive)
    pub end_offset: Option<usize>,

    /// Page the chunk starts on, for paginated sources
    pub page: Option<u32>,

    /// Whether the chunk was cut at a separator rather than at `chunk_size`
    pub split_at_separator: bool,
}

impl ChunkMetadata {
    /// Create metadata with offsets
    pub fn with_offsets(start: usize, end: usize) -> Self {
        Self {
            start_offset: Some(start),
            end_offset: Some(end),
            ..Self::default()
        }
    }

    /// Mark as cut at a separator
    pub fn mark_separator(mut self) -> Self {
        self.split_at_separator = true;
        self
    }

    /// Set the page number
    pub fn with_page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }
}
