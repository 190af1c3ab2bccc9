//! Vector store backed by SQLite and sqlite-vec.
//!
//! The default path `:memory:` keeps the whole index in process memory — all
//! entries vanish when the process ends. Passing a file path instead is the
//! explicit opt-in to a persistent store; nothing else changes.
//!
//! Index entries are append-only: indexing the same file again adds new
//! entries rather than replacing the old ones. Replacement is `clear` plus
//! re-index, decided by the caller.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use sqlite_vec::sqlite3_vec_init;
use std::path::Path;
use std::sync::Once;
use tracing::info;

use crate::chunker::Chunk;
use crate::error::PipelineError;

static INIT_VEC: Once = Once::new();

/// Initialize the sqlite-vec extension. Safe to call multiple times.
fn init_sqlite_vec() {
    INIT_VEC.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite3_vec_init as *const (),
        )));
    });
}

fn schema_sql(dims: usize) -> String {
    format!(
        r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    indexed_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_filename ON documents(filename);

CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    document_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    content TEXT NOT NULL,
    FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_document_id ON chunks(document_id);

CREATE VIRTUAL TABLE IF NOT EXISTS vec_chunks USING vec0(
    embedding FLOAT[{dims}]
);
"#
    )
}

/// One search hit, ordered by descending cosine similarity.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub filename: String,
    pub content: String,
    pub position: usize,
    pub similarity: f64,
    pub embedding: Vec<f32>,
}

/// One indexing batch as recorded in the store.
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub filename: String,
    pub chunk_count: usize,
    pub indexed_at: DateTime<Utc>,
}

/// A SQLite connection initialized with sqlite-vec and the index schema.
pub struct Store {
    conn: Connection,
    dims: usize,
}

impl Store {
    /// Open a store at `path` with the given embedding dimensionality.
    /// `:memory:` opens a volatile in-memory store.
    pub fn open(path: &str, dims: usize) -> Result<Self, PipelineError> {
        init_sqlite_vec();

        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            info!("opening vector store at {}", Path::new(path).display());
            Connection::open(path)?
        };

        let vec_version: String = conn.query_row("SELECT vec_version()", [], |row| row.get(0))?;
        info!("sqlite-vec version: {vec_version}");

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(&schema_sql(dims))?;

        Ok(Self { conn, dims })
    }

    /// Open an in-memory store (test convenience).
    pub fn open_in_memory(dims: usize) -> Result<Self, PipelineError> {
        Self::open(":memory:", dims)
    }

    pub fn dimensions(&self) -> usize {
        self.dims
    }

    /// Append a document's chunks and their embeddings in one transaction.
    ///
    /// Each call creates a fresh document row even when the filename was seen
    /// before — the store never deduplicates.
    pub fn insert_document(
        &mut self,
        filename: &str,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), PipelineError> {
        assert_eq!(
            chunks.len(),
            embeddings.len(),
            "chunks and embeddings length mismatch"
        );
        for embedding in embeddings {
            self.check_dims(embedding)?;
        }

        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO documents (filename) VALUES (?)",
            params![filename],
        )?;
        let doc_id = tx.last_insert_rowid();

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            tx.execute(
                "INSERT INTO chunks (document_id, position, content) VALUES (?, ?, ?)",
                params![doc_id, chunk.position as i64, chunk.content],
            )?;
            let chunk_id = tx.last_insert_rowid();

            let vector_blob = serialize_vector(embedding);
            tx.execute(
                "INSERT INTO vec_chunks (rowid, embedding) VALUES (?, ?)",
                params![chunk_id, vector_blob],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Nearest-neighbor search by cosine distance.
    pub fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>, PipelineError> {
        self.check_dims(query_vector)?;

        let mut stmt = self.conn.prepare(
            r#"
            SELECT
                d.filename,
                c.content,
                c.position,
                vec_distance_cosine(v.embedding, ?) AS distance,
                v.embedding
            FROM vec_chunks v
            JOIN chunks c ON v.rowid = c.id
            JOIN documents d ON c.document_id = d.id
            ORDER BY distance ASC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map(
            params![serialize_vector(query_vector), top_k as i64],
            |row| {
                let distance: f64 = row.get(3)?;
                let blob: Vec<u8> = row.get(4)?;
                Ok(SearchResult {
                    filename: row.get(0)?,
                    content: row.get(1)?,
                    position: row.get::<_, i64>(2)? as usize,
                    similarity: 1.0 - (distance / 2.0),
                    embedding: deserialize_vector(&blob),
                })
            },
        )?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    /// Remove every index entry. The schema stays in place.
    pub fn clear(&mut self) -> Result<(), PipelineError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM vec_chunks", [])?;
        tx.execute("DELETE FROM chunks", [])?;
        tx.execute("DELETE FROM documents", [])?;
        tx.commit()?;
        Ok(())
    }

    /// All indexing batches, oldest first.
    pub fn list_documents(&self) -> Result<Vec<DocumentInfo>, PipelineError> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT d.filename, COUNT(c.id), d.indexed_at
            FROM documents d
            LEFT JOIN chunks c ON c.document_id = d.id
            GROUP BY d.id
            ORDER BY d.id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(DocumentInfo {
                filename: row.get(0)?,
                chunk_count: row.get::<_, i64>(1)? as usize,
                indexed_at: row.get(2)?,
            })
        })?;

        let mut docs = Vec::new();
        for row in rows {
            docs.push(row?);
        }
        Ok(docs)
    }

    pub fn count_documents(&self) -> Result<usize, PipelineError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    pub fn count_chunks(&self) -> Result<usize, PipelineError> {
        let n: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    fn check_dims(&self, vector: &[f32]) -> Result<(), PipelineError> {
        if vector.len() != self.dims {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dims,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// Serialize a float32 vector into bytes for the vec0 virtual table.
pub fn serialize_vector(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Inverse of [`serialize_vector`].
pub fn deserialize_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(position: usize, content: &str) -> Chunk {
        Chunk {
            position,
            content: content.to_string(),
        }
    }

    fn unit_vec(dims: usize, hot: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dims];
        v[hot] = 1.0;
        v
    }

    #[test]
    fn test_store_init() {
        let store = Store::open_in_memory(8).unwrap();
        assert_eq!(store.dimensions(), 8);
        assert_eq!(store.count_documents().unwrap(), 0);
        assert_eq!(store.count_chunks().unwrap(), 0);
    }

    #[test]
    fn test_serialize_vector_roundtrip() {
        let vec = vec![1.0, 2.0, -3.5];
        let bytes = serialize_vector(&vec);
        assert_eq!(bytes.len(), 12);

        // 1.0f32 in hex: 0x3f800000 -> little endian: 00 00 80 3f
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(deserialize_vector(&bytes), vec);
    }

    #[test]
    fn test_insert_and_search() {
        let mut store = Store::open_in_memory(4).unwrap();

        store
            .insert_document(
                "a.txt",
                &[chunk(0, "alpha"), chunk(1, "beta")],
                &[unit_vec(4, 0), unit_vec(4, 1)],
            )
            .unwrap();

        let results = store.search(&unit_vec(4, 0), 5).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "alpha");
        assert_eq!(results[0].filename, "a.txt");
        assert!(results[0].similarity > results[1].similarity);
        assert_eq!(results[0].embedding, unit_vec(4, 0));
    }

    #[test]
    fn test_reindex_appends_instead_of_replacing() {
        let mut store = Store::open_in_memory(4).unwrap();
        let chunks = [chunk(0, "same"), chunk(1, "content")];
        let vectors = [unit_vec(4, 0), unit_vec(4, 1)];

        store.insert_document("dup.txt", &chunks, &vectors).unwrap();
        store.insert_document("dup.txt", &chunks, &vectors).unwrap();

        assert_eq!(store.count_documents().unwrap(), 2);
        assert_eq!(store.count_chunks().unwrap(), 4);

        let docs = store.list_documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.filename == "dup.txt"));
        assert!(docs.iter().all(|d| d.chunk_count == 2));
    }

    #[test]
    fn test_clear_then_search_is_empty() {
        let mut store = Store::open_in_memory(4).unwrap();
        store
            .insert_document("a.txt", &[chunk(0, "text")], &[unit_vec(4, 2)])
            .unwrap();

        store.clear().unwrap();

        assert_eq!(store.count_documents().unwrap(), 0);
        assert_eq!(store.count_chunks().unwrap(), 0);
        let results = store.search(&unit_vec(4, 2), 10).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let mut store = Store::open_in_memory(4).unwrap();

        let err = store
            .insert_document("a.txt", &[chunk(0, "x")], &[vec![0.1; 3]])
            .unwrap_err();
        assert!(matches!(err, PipelineError::DimensionMismatch { .. }));

        let err = store.search(&[0.1; 5], 3).unwrap_err();
        assert!(matches!(err, PipelineError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_top_k_limit() {
        let mut store = Store::open_in_memory(4).unwrap();
        for i in 0..4 {
            store
                .insert_document(
                    &format!("doc{i}.txt"),
                    &[chunk(0, &format!("chunk {i}"))],
                    &[unit_vec(4, i)],
                )
                .unwrap();
        }

        let results = store.search(&unit_vec(4, 0), 2).unwrap();
        assert_eq!(results.len(), 2);
    }
}
