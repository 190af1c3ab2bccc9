/// End-to-end tests for the document Q&A pipeline.
///
/// Exercises the complete flow with mock providers:
///   load → chunk → embed → store → retrieve → generate → clear
use std::fs;
use std::sync::Arc;

use tempfile::tempdir;
use tokio::sync::Mutex as TokioMutex;

use docqa::embedder::mock::MockEmbedder;
use docqa::error::PipelineError;
use docqa::generator::mock::MockChat;
use docqa::pipeline::{Pipeline, PipelineOptions, PipelineState};
use docqa::store::Store;

fn test_pipeline() -> Pipeline {
    let store = Store::open_in_memory(384).unwrap();
    Pipeline::new(
        Arc::new(TokioMutex::new(store)),
        Arc::new(MockEmbedder::default()),
        Arc::new(MockChat),
        PipelineOptions {
            chunk_size: 300,
            chunk_overlap: 60,
            search_top_k: 5,
            fetch_k: 10,
            max_context_chars: 6000,
        },
    )
}

/// Full pipeline: create docs → index → status → query → re-index → clear.
#[tokio::test]
async fn test_full_pipeline() {
    // 1. Setup temp dir with test documents
    let dir = tempdir().unwrap();
    let hello = dir.path().join("hello.txt");
    let guide = dir.path().join("guide.md");

    fs::write(
        &hello,
        "Rust is a systems programming language focused on safety and performance. \
         It achieves memory safety without garbage collection through ownership. "
            .repeat(5),
    )
    .unwrap();

    fs::write(
        &guide,
        "# Quick Start Guide\n\nTo get started with the application:\n\n\
         1. Upload documents\n2. Index them\n3. Ask questions about the content\n",
    )
    .unwrap();

    let pipeline = test_pipeline();

    // 2. Before indexing: querying yields guidance, not a crash
    let err = pipeline.query("What is Rust?").await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyIndex), "{err}");
    assert!(err.to_string().contains("index"), "message should guide the user");

    // 3. Index both documents
    let summary = pipeline
        .index_files(&[
            ("hello.txt".to_string(), hello.clone()),
            ("guide.md".to_string(), guide.clone()),
        ])
        .await;
    assert_eq!(summary.files_indexed.len(), 2, "errors: {:?}", summary.errors);
    assert!(summary.errors.is_empty());
    assert!(summary.chunks_indexed >= 2);

    let status = pipeline.status().await.unwrap();
    assert_eq!(status.state, PipelineState::Ready);
    assert_eq!(status.documents, 2);
    let chunks_after_first = status.chunks;
    assert_eq!(chunks_after_first, summary.chunks_indexed);

    // 4. Query: answer plus citations drawn from the indexed files
    let answer = pipeline.query("What is Rust focused on?").await.unwrap();
    assert!(!answer.text.is_empty());
    assert!(!answer.sources.is_empty());
    for source in &answer.sources {
        assert!(
            source.filename == "hello.txt" || source.filename == "guide.md",
            "unexpected source: {}",
            source.filename
        );
    }

    // 5. Re-indexing the same unmodified file appends — no deduplication
    let summary2 = pipeline
        .index_files(&[("hello.txt".to_string(), hello.clone())])
        .await;
    assert!(summary2.errors.is_empty());

    let status = pipeline.status().await.unwrap();
    assert_eq!(status.documents, 3);
    assert_eq!(
        status.chunks,
        chunks_after_first + summary2.chunks_indexed,
        "second pass must add entries, not replace them"
    );

    // 6. Clear, then everything is gone
    pipeline.clear().await.unwrap();
    let status = pipeline.status().await.unwrap();
    assert_eq!(status.state, PipelineState::Empty);
    assert_eq!(status.documents, 0);
    assert_eq!(status.chunks, 0);

    let err = pipeline.query("Anything left?").await.unwrap_err();
    assert!(matches!(err, PipelineError::EmptyIndex));
}

/// Indexing the same file twice doubles that file's entries.
#[tokio::test]
async fn test_duplicate_indexing_doubles_entries() {
    let dir = tempdir().unwrap();
    let doc = dir.path().join("dup.txt");
    fs::write(&doc, "The same document indexed twice. ".repeat(30)).unwrap();

    let pipeline = test_pipeline();

    let first = pipeline
        .index_files(&[("dup.txt".to_string(), doc.clone())])
        .await;
    let second = pipeline
        .index_files(&[("dup.txt".to_string(), doc.clone())])
        .await;
    assert_eq!(first.chunks_indexed, second.chunks_indexed);

    let status = pipeline.status().await.unwrap();
    assert_eq!(status.chunks, first.chunks_indexed * 2);
}

/// Unsupported and empty files are reported per file without failing the batch.
#[tokio::test]
async fn test_validation_errors_are_collected() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("ok.txt");
    let unsupported = dir.path().join("image.png");
    let empty = dir.path().join("blank.txt");

    fs::write(&good, "real content worth indexing").unwrap();
    fs::write(&unsupported, [0x89, 0x50, 0x4e, 0x47]).unwrap();
    fs::write(&empty, "   \n").unwrap();

    let pipeline = test_pipeline();
    let summary = pipeline
        .index_files(&[
            ("ok.txt".to_string(), good),
            ("image.png".to_string(), unsupported),
            ("blank.txt".to_string(), empty),
        ])
        .await;

    assert_eq!(summary.files_indexed, vec!["ok.txt"]);
    assert_eq!(summary.errors.len(), 2);
    assert!(summary.errors.iter().any(|e| e.contains("image.png")));
    assert!(summary.errors.iter().any(|e| e.contains("blank.txt")));

    // The failed files left no partial state behind
    let status = pipeline.status().await.unwrap();
    assert_eq!(status.documents, 1);
}
