//! Persistent vector index
//!
//! Each index lives in its own directory as a single SQLite database,
//! `index.db`, written through sqlx. Entries are loaded into memory and
//! queried with a pure-Rust cosine similarity scan.
//!
//! Layout:
//! - `index_meta(key, value)`: name, embedding model descriptor, entry count,
//!   build time and id, and the `complete` marker
//! - `entries(position, id, parent_id, chunk_index, content, metadata, embedding)`:
//!   one row per entry, `position` preserving insertion order and `embedding`
//!   stored as little-endian f32 bytes

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::domain::errors::{RagError, RagResult};
use crate::domain::models::{
    Chunk, ChunkMetadata, EmbeddingModelInfo, EmbeddingProvider, IndexEntry, ScoredChunk,
};

/// Database file inside an index directory
pub const INDEX_FILE: &str = "index.db";

/// Scratch file a build writes before it is renamed over [`INDEX_FILE`]
pub const PARTIAL_FILE: &str = "index.db.partial";

const SCHEMA: &str = r"
CREATE TABLE index_meta (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
CREATE TABLE entries (
    position INTEGER PRIMARY KEY NOT NULL,
    id TEXT NOT NULL UNIQUE,
    parent_id TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,
    embedding BLOB NOT NULL
);
";

/// A named, persisted collection of embedded chunks
#[derive(Debug, Clone)]
pub struct VectorIndex {
    name: String,
    location: PathBuf,
    model: EmbeddingModelInfo,
    built_at: DateTime<Utc>,
    build_id: Uuid,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index from entries and persist it under `location`,
    /// replacing any index already there.
    ///
    /// The database is written to [`PARTIAL_FILE`] in one transaction and
    /// renamed into place only after the transaction commits, so a crash
    /// mid-build never leaves a loadable half-written index.
    ///
    /// # Returns
    /// * `Err(RagError::DimensionMismatch)` - If any vector's length differs
    ///   from `model.dimensions`
    pub async fn build(
        location: impl AsRef<Path>,
        model: EmbeddingModelInfo,
        entries: Vec<IndexEntry>,
    ) -> RagResult<Self> {
        let location = location.as_ref().to_path_buf();

        if let Some(bad) = entries.iter().find(|e| e.dimensions() != model.dimensions) {
            return Err(RagError::dimensions(model.dimensions, bad.dimensions()));
        }

        tokio::fs::create_dir_all(&location).await?;

        let partial = location.join(PARTIAL_FILE);
        remove_if_exists(&partial).await?;

        let name = index_name(&location);
        let index = Self {
            name,
            location,
            model,
            built_at: Utc::now(),
            build_id: Uuid::new_v4(),
            entries,
        };

        let pool = open_pool(&partial, true).await?;
        let written = index.write(&pool).await;
        pool.close().await;
        written?;

        tokio::fs::rename(&partial, index.db_path()).await?;

        tracing::info!(
            index = %index.name,
            location = %index.location.display(),
            entries = index.len(),
            model = %index.model,
            "vector index built"
        );

        Ok(index)
    }

    /// Reconstruct a persisted index without re-embedding anything
    ///
    /// # Returns
    /// * `Err(RagError::NotFound)` - If `location` holds no index
    /// * `Err(RagError::CorruptIndex)` - If the build never completed or the
    ///   stored entries disagree with the recorded count
    pub async fn load(location: impl AsRef<Path>) -> RagResult<Self> {
        let location = location.as_ref().to_path_buf();
        let db_path = location.join(INDEX_FILE);

        if !tokio::fs::try_exists(&db_path).await? {
            return Err(RagError::NotFound(db_path));
        }

        let pool = open_pool(&db_path, false).await?;
        let loaded = Self::read(&pool, location).await;
        pool.close().await;
        let index = loaded?;

        tracing::info!(
            index = %index.name,
            location = %index.location.display(),
            entries = index.len(),
            built_at = %index.built_at,
            "vector index loaded"
        );

        Ok(index)
    }

    /// Whether `location` holds a persisted index
    pub fn exists(location: impl AsRef<Path>) -> bool {
        location.as_ref().join(INDEX_FILE).is_file()
    }

    /// The `k` entries most similar to `vector`, best first
    ///
    /// Scores are cosine similarities. Equal scores keep insertion order.
    pub fn query(&self, vector: &[f32], k: usize) -> RagResult<Vec<ScoredChunk>> {
        if self.entries.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if vector.len() != self.model.dimensions {
            return Err(RagError::dimensions(self.model.dimensions, vector.len()));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(vector, &entry.embedding)))
            .collect();

        // Stable sort: ties stay in insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        tracing::debug!(
            index = %self.name,
            k,
            returned = scored.len(),
            best = scored.first().map(|(_, s)| *s),
            "vector index queried"
        );

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Descriptor of the model the vectors were produced with
    pub fn model(&self) -> &EmbeddingModelInfo {
        &self.model
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn build_id(&self) -> Uuid {
        self.build_id
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn db_path(&self) -> PathBuf {
        self.location.join(INDEX_FILE)
    }

    async fn write(&self, pool: &SqlitePool) -> RagResult<()> {
        let mut tx = pool.begin().await?;

        sqlx::query(SCHEMA).execute(&mut *tx).await?;

        for (position, entry) in self.entries.iter().enumerate() {
            let chunk = &entry.chunk;
            sqlx::query(
                r"
                INSERT INTO entries (position, id, parent_id, chunk_index, content, metadata, embedding)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(to_i64(position)?)
            .bind(&chunk.id)
            .bind(&chunk.parent_id)
            .bind(to_i64(chunk.chunk_index)?)
            .bind(&chunk.content)
            .bind(serde_json::to_string(&chunk.metadata)?)
            .bind(embedding_to_bytes(&entry.embedding))
            .execute(&mut *tx)
            .await?;
        }

        let meta = [
            ("name", self.name.clone()),
            ("provider", self.model.provider.to_string()),
            ("model_id", self.model.model_id.clone()),
            ("dimensions", self.model.dimensions.to_string()),
            ("entry_count", self.entries.len().to_string()),
            ("built_at", self.built_at.to_rfc3339()),
            ("build_id", self.build_id.to_string()),
            // Written last, inside the same transaction
            ("complete", "true".to_string()),
        ];
        for (key, value) in meta {
            sqlx::query("INSERT INTO index_meta (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn read(pool: &SqlitePool, location: PathBuf) -> RagResult<Self> {
        let db_path = location.join(INDEX_FILE);
        let corrupt = |reason: String| RagError::CorruptIndex {
            path: db_path.clone(),
            reason,
        };

        let meta: HashMap<String, String> = sqlx::query("SELECT key, value FROM index_meta")
            .fetch_all(pool)
            .await
            .map_err(|e| corrupt(format!("metadata unreadable: {e}")))?
            .into_iter()
            .map(|row| (row.get("key"), row.get("value")))
            .collect();

        if meta.get("complete").map(String::as_str) != Some("true") {
            return Err(corrupt("build did not complete".to_string()));
        }

        let field = |key: &str| {
            meta.get(key)
                .cloned()
                .ok_or_else(|| corrupt(format!("missing metadata '{key}'")))
        };

        let provider: EmbeddingProvider =
            serde_json::from_value(serde_json::Value::String(field("provider")?))
                .map_err(|e| corrupt(format!("unknown provider: {e}")))?;
        let dimensions: usize = field("dimensions")?
            .parse()
            .map_err(|e| corrupt(format!("bad dimensions: {e}")))?;
        let entry_count: usize = field("entry_count")?
            .parse()
            .map_err(|e| corrupt(format!("bad entry count: {e}")))?;
        let built_at = DateTime::parse_from_rfc3339(&field("built_at")?)
            .map_err(|e| corrupt(format!("bad build time: {e}")))?
            .with_timezone(&Utc);
        let build_id = Uuid::parse_str(&field("build_id")?)
            .map_err(|e| corrupt(format!("bad build id: {e}")))?;

        let rows = sqlx::query(
            r"
            SELECT id, parent_id, chunk_index, content, metadata, embedding
            FROM entries
            ORDER BY position
            ",
        )
        .fetch_all(pool)
        .await?;

        if rows.len() != entry_count {
            return Err(corrupt(format!(
                "expected {entry_count} entries, found {}",
                rows.len()
            )));
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let id: String = row.get("id");
            let content: String = row.get("content");
            let chunk_index: i64 = row.get("chunk_index");
            let metadata_json: String = row.get("metadata");
            let metadata: ChunkMetadata = serde_json::from_str(&metadata_json)
                .map_err(|e| corrupt(format!("entry {id}: bad metadata: {e}")))?;
            let bytes: Vec<u8> = row.get("embedding");
            let embedding = bytes_to_embedding(&bytes)
                .ok_or_else(|| corrupt(format!("entry {id}: bad embedding length")))?;

            if embedding.len() != dimensions {
                return Err(corrupt(format!(
                    "entry {id}: {} dimensions, index has {dimensions}",
                    embedding.len()
                )));
            }

            let chunk = Chunk {
                id,
                parent_id: row.get("parent_id"),
                char_count: content.chars().count(),
                content,
                chunk_index: usize::try_from(chunk_index)
                    .map_err(|e| corrupt(format!("bad chunk index: {e}")))?,
                metadata,
            };
            entries.push(IndexEntry::new(chunk, embedding));
        }

        Ok(Self {
            name: field("name")?,
            location,
            model: EmbeddingModelInfo::new(provider, field("model_id")?, dimensions),
            built_at,
            build_id,
            entries,
        })
    }
}

/// Cosine similarity of two vectors of equal length
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

/// Serialize embedding vector to bytes for storage
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize embedding vector from bytes
fn bytes_to_embedding(bytes: &[u8]) -> Option<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return None;
    }

    Some(
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect(),
    )
}

/// Index name: the last component of its directory
fn index_name(location: &Path) -> String {
    location
        .file_name()
        .map_or_else(|| location.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn to_i64(value: usize) -> RagResult<i64> {
    i64::try_from(value).map_err(|e| RagError::Storage(format!("value out of range: {e}")))
}

async fn remove_if_exists(path: &Path) -> RagResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Single-connection pool on a database file. Rollback journal rather than
/// WAL: the file must be self-contained when it is renamed.
async fn open_pool(path: &Path, create: bool) -> RagResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .journal_mode(SqliteJournalMode::Delete)
        .create_if_missing(create)
        .read_only(!create);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}
