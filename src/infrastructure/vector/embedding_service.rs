//! Feature-hashing embedder
//!
//! Computes embeddings in-process without model artifacts. Each word
//! contributes a unigram feature and a three-character stem feature, hashed
//! into a fixed number of buckets with a signed hash, then the vector is
//! L2-normalized.
//!
//! Identifiers are split on `snake_case` and `camelCase` boundaries so code
//! and prose share tokens. Sub-words of compound identifiers carry extra
//! weight: they name the things a style guideline talks about, while prose
//! filler words are dropped.

use async_trait::async_trait;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{EmbeddingModelInfo, EmbeddingProvider};
use crate::domain::ports::Embedder;

/// Model id recorded in indices built with this embedder
pub const HASHING_MODEL_ID: &str = "feature-hash-v2";

const WORD_WEIGHT: f32 = 1.0;
const STEM_WEIGHT: f32 = 0.5;
const STEM_LEN: usize = 3;
/// Multiplier for sub-words of `snake_case` / `camelCase` identifiers
const COMPOUND_BOOST: f32 = 2.0;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "into", "is", "it",
    "its", "of", "on", "or", "that", "the", "this", "to", "use", "with",
];

/// Deterministic local embedder
pub struct HashingEmbedder {
    model: EmbeddingModelInfo,
}

impl HashingEmbedder {
    /// Create a new hashing embedder
    ///
    /// # Returns
    /// * `Err(RagError::Config)` - If `dimensions` is zero
    pub fn new(dimensions: usize) -> RagResult<Self> {
        if dimensions == 0 {
            return Err(RagError::Config(
                "embedding dimensions must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            model: EmbeddingModelInfo::new(EmbeddingProvider::Hashing, HASHING_MODEL_ID, dimensions),
        })
    }

    /// Embed text synchronously
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let dimensions = self.model.dimensions;
        let mut embedding = vec![0.0f32; dimensions];

        for parts in identifiers(text) {
            let boost = if parts.len() > 1 { COMPOUND_BOOST } else { 1.0 };

            for word in parts.iter().filter(|w| !STOP_WORDS.contains(&w.as_str())) {
                add_feature(&mut embedding, "w", word, WORD_WEIGHT * boost);

                if word.chars().count() >= STEM_LEN && !word.chars().all(char::is_numeric) {
                    let stem: String = word.chars().take(STEM_LEN).collect();
                    add_feature(&mut embedding, "p", &stem, STEM_WEIGHT);
                }
            }
        }

        // f64 accumulation keeps the norm stable for wide vectors
        let magnitude = embedding
            .iter()
            .map(|x| f64::from(*x) * f64::from(*x))
            .sum::<f64>()
            .sqrt();

        if magnitude > 1e-10 {
            #[allow(clippy::cast_possible_truncation)]
            let magnitude = magnitude as f32;
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        embedding
    }
}

/// Identifiers in `text`, each as its lowercased sub-words
fn identifiers(text: &str) -> Vec<Vec<String>> {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .map(split_identifier)
        .filter(|parts| !parts.is_empty())
        .collect()
}

/// Split on underscores and on lower-to-upper case changes, then lowercase
fn split_identifier(raw: &str) -> Vec<String> {
    let mut words = Vec::new();

    for segment in raw.split('_').filter(|s| !s.is_empty()) {
        let mut current = String::new();
        let mut prev_lower = false;

        for c in segment.chars() {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_lowercase() || c.is_numeric();
            current.extend(c.to_lowercase());
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn add_feature(embedding: &mut [f32], namespace: &str, feature: &str, weight: f32) {
    let hash = fnv1a(namespace.as_bytes(), feature.as_bytes());
    #[allow(clippy::cast_possible_truncation)]
    let bucket = (hash % embedding.len() as u64) as usize;
    let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
    embedding[bucket] += sign * weight;
}

/// 64-bit FNV-1a over `namespace:feature`; stable across runs and platforms
fn fnv1a(namespace: &[u8], feature: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0100_0000_01b3;

    namespace
        .iter()
        .chain(b":")
        .chain(feature)
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn model(&self) -> &EmbeddingModelInfo {
        &self.model
    }

    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    async fn embed_all(&self, texts: &[&str]) -> RagResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::vector::vector_store::cosine_similarity;

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(HashingEmbedder::new(0), Err(RagError::Config(_))));
    }

    #[test]
    fn test_identifiers_split_into_sub_words() {
        assert_eq!(
            identifiers("Use camelCase"),
            vec![vec!["use"], vec!["camel", "case"]]
        );
        assert_eq!(
            identifiers("snake_case_var = 42"),
            vec![vec!["snake", "case", "var"], vec!["42"]]
        );
        assert_eq!(identifiers("HTTPServer"), vec![vec!["httpserver"]]);
        assert_eq!(identifiers("__init__"), vec![vec!["init"]]);
        assert!(identifiers(" ,;! _ ").is_empty());
    }

    #[test]
    fn test_stop_words_carry_no_weight() {
        let embedder = HashingEmbedder::new(64).unwrap();
        assert!(embedder.embed_text("use it for the").iter().all(|v| *v == 0.0));
        assert_eq!(
            embedder.embed_text("Use camelCase for names"),
            embedder.embed_text("camelCase names")
        );
    }

    #[test]
    fn test_naming_rule_ranks_first_for_snake_case_code() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let code = embedder.embed_text("fun main() {\n    val snake_case_var = 42\n    println(snake_case_var)\n}\n");
        let rules = [
            "Indent with four spaces.",
            "Prefer expression bodies for one-line functions.",
            "Use camelCase for variable names.",
            "Classes use PascalCase names.",
            "Put a blank line between functions.",
            "Document public APIs with KDoc comments.",
        ];

        let best = rules
            .iter()
            .max_by(|a, b| {
                let a = cosine_similarity(&code, &embedder.embed_text(a));
                let b = cosine_similarity(&code, &embedder.embed_text(b));
                a.total_cmp(&b)
            })
            .unwrap();
        assert_eq!(*best, "Use camelCase for variable names.");
    }

    #[tokio::test]
    async fn test_embed_dimensions() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let embedding = embedder.embed("Hello world").await.unwrap();
        assert_eq!(embedding.len(), 384);
        assert_eq!(embedder.dimensions(), 384);
    }

    #[tokio::test]
    async fn test_embed_all_preserves_order() {
        let embedder = HashingEmbedder::new(64).unwrap();
        let texts = ["Hello", "World", "Test"];
        let batch = embedder.embed_all(&texts).await.unwrap();

        assert_eq!(batch.len(), 3);
        for (text, embedding) in texts.iter().zip(&batch) {
            assert_eq!(&embedder.embed_text(text), embedding);
        }
    }

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(128).unwrap();
        let a = embedder.embed_text("Test text for deterministic embedding");
        let b = embedder.embed_text("Test text for deterministic embedding");
        assert_eq!(a, b);

        let magnitude: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashingEmbedder::new(16).unwrap();
        assert!(embedder.embed_text("").iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashingEmbedder::new(384).unwrap();
        let code = embedder.embed_text("val snake_case_var = 42");
        let naming = embedder.embed_text("Use camelCase for variable names.");
        let indent = embedder.embed_text("Indent blocks with four spaces.");

        assert!(cosine_similarity(&code, &naming) > cosine_similarity(&code, &indent));
    }
}
