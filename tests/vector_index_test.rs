//! Property tests for persisted vector index retrieval
//!
//! Properties:
//! 1. query returns min(k, len) results
//! 2. results are ordered by descending cosine similarity
//! 3. equal scores keep insertion order
//! 4. a reloaded index answers exactly like the index that was built

use proptest::prelude::*;
use rag_review::domain::models::{Chunk, EmbeddingModelInfo, EmbeddingProvider, IndexEntry};
use rag_review::infrastructure::vector::{cosine_similarity, VectorIndex};

const DIMS: usize = 8;

fn model() -> EmbeddingModelInfo {
    EmbeddingModelInfo::new(EmbeddingProvider::Hashing, "test-vectors", DIMS)
}

fn entries(vectors: &[Vec<f32>]) -> Vec<IndexEntry> {
    vectors
        .iter()
        .enumerate()
        .map(|(i, v)| IndexEntry::new(Chunk::new("doc".to_string(), format!("chunk {i}"), i), v.clone()))
        .collect()
}

/// Vectors drawn from a small grid so that exact ties are common
fn vector_strategy() -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec((-2i8..=2).prop_map(f32::from), DIMS..=DIMS)
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_query_matches_brute_force(
        vectors in prop::collection::vec(vector_strategy(), 1..24),
        query in vector_strategy(),
        k in 1usize..30,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let index = runtime()
            .block_on(VectorIndex::build(dir.path(), model(), entries(&vectors)))
            .unwrap();

        let results = index.query(&query, k).unwrap();
        prop_assert_eq!(results.len(), k.min(vectors.len()));

        let mut expected: Vec<(usize, f32)> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(&query, v)))
            .collect();
        expected.sort_by(|a, b| b.1.total_cmp(&a.1));

        for (hit, (i, score)) in results.iter().zip(expected) {
            prop_assert_eq!(hit.chunk.chunk_index, i);
            prop_assert_eq!(hit.score.to_bits(), score.to_bits());
        }

        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            if pair[0].score.to_bits() == pair[1].score.to_bits() {
                prop_assert!(pair[0].chunk.chunk_index < pair[1].chunk.chunk_index);
            }
        }
    }

    #[test]
    fn prop_reloaded_index_answers_identically(
        vectors in prop::collection::vec(vector_strategy(), 1..16),
        query in vector_strategy(),
        k in 1usize..8,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let rt = runtime();
        let built = rt
            .block_on(VectorIndex::build(dir.path(), model(), entries(&vectors)))
            .unwrap();
        let loaded = rt.block_on(VectorIndex::load(dir.path())).unwrap();

        prop_assert_eq!(loaded.model(), built.model());
        prop_assert_eq!(loaded.entries(), built.entries());
        prop_assert_eq!(loaded.query(&query, k).unwrap(), built.query(&query, k).unwrap());
    }
}

#[tokio::test]
async fn test_identical_vectors_return_in_insertion_order() {
    let dir = tempfile::tempdir().unwrap();
    let same = vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
    let index = VectorIndex::build(dir.path(), model(), entries(&[same.clone(), same.clone(), same.clone()]))
        .await
        .unwrap();

    let ids: Vec<String> = index
        .query(&same, 2)
        .unwrap()
        .into_iter()
        .map(|hit| hit.chunk.id)
        .collect();
    assert_eq!(ids, vec!["doc:chunk:0", "doc:chunk:1"]);
}

#[tokio::test]
async fn test_partial_file_never_counts_as_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.db.partial"), b"half written").unwrap();

    assert!(!VectorIndex::exists(dir.path()));
    assert!(VectorIndex::load(dir.path()).await.is_err());
}
