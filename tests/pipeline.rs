//! End-to-end pipeline tests against a mocked backend

mod common;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use bookqa::agent::Selection;
use bookqa::config::{Config, API_KEY_VAR};
use bookqa::error::Error;
use bookqa::ingestion::load_path;
use bookqa::BookPipeline;

use common::{EchoChat, HashEmbedder, StaticSelector, DIMS};

fn test_config(books: &Path, storage: &Path) -> Config {
    let mut config = Config {
        api_key: "test-key".to_string(),
        books_dir: books.to_path_buf(),
        storage_dir: storage.to_path_buf(),
        ..Config::default()
    };
    config.embeddings.dimensions = DIMS;
    config
}

fn pipeline_with(
    books: &Path,
    storage: &Path,
    embedder: Arc<HashEmbedder>,
) -> BookPipeline {
    BookPipeline::new(test_config(books, storage), embedder, Arc::new(EchoChat))
}

#[tokio::test]
async fn end_to_end_sky_is_blue() {
    let books = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();
    let nature = books.path().join("nature");
    fs::create_dir(&nature).unwrap();
    fs::write(nature.join("sky.txt"), "The sky is blue.").unwrap();

    let pipeline = pipeline_with(books.path(), storage.path(), Arc::new(HashEmbedder::default()));
    let engine = pipeline.open_book(&nature).await.unwrap();
    let answer = engine.answer("What color is the sky?").await.unwrap();

    assert!(answer.text.contains("blue"), "answer: {}", answer.text);
    assert!(!answer.sources.is_empty());
    assert!(answer.sources[0].source.ends_with("sky.txt"));
}

#[tokio::test]
async fn persisted_index_is_reused_without_reembedding() {
    let books = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();
    let nature = books.path().join("nature");
    fs::create_dir(&nature).unwrap();
    fs::write(nature.join("sky.txt"), "The sky is blue.").unwrap();

    let embedder = Arc::new(HashEmbedder::default());
    let pipeline = pipeline_with(books.path(), storage.path(), Arc::clone(&embedder));

    let first = pipeline.open_book(&nature).await.unwrap();
    let calls_after_build = embedder.call_count();
    assert!(calls_after_build > 0);

    // Second open loads the persisted index: no further embedding calls.
    let second = pipeline.open_book(&nature).await.unwrap();
    assert_eq!(embedder.call_count(), calls_after_build);

    // Functionally equivalent: the same question gets the same answer.
    let a = first.answer("What color is the sky?").await.unwrap();
    let b = second.answer("What color is the sky?").await.unwrap();
    assert_eq!(a.text, b.text);
}

#[tokio::test]
async fn changed_corpus_is_a_mismatch() {
    let books = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();
    let nature = books.path().join("nature");
    fs::create_dir(&nature).unwrap();
    fs::write(nature.join("sky.txt"), "The sky is blue.").unwrap();

    let pipeline = pipeline_with(books.path(), storage.path(), Arc::new(HashEmbedder::default()));
    pipeline.open_book(&nature).await.unwrap();

    // The corpus changes under the persisted index.
    fs::write(nature.join("sky.txt"), "The sky is green today.").unwrap();
    let err = pipeline
        .open_book(&nature)
        .await
        .err()
        .expect("changed corpus must not load");
    assert!(matches!(err, Error::CorpusMismatch { .. }), "got {err}");

    // Invalidate-and-rebuild is the recovery path.
    pipeline.store().invalidate("nature").unwrap();
    let engine = pipeline.open_book(&nature).await.unwrap();
    let answer = engine.answer("What color is the sky?").await.unwrap();
    assert!(answer.text.contains("green"));
}

#[tokio::test]
async fn removed_sources_are_a_mismatch() {
    let books = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();
    let nature = books.path().join("nature");
    fs::create_dir(&nature).unwrap();
    fs::write(nature.join("sky.txt"), "The sky is blue.").unwrap();

    let pipeline = pipeline_with(books.path(), storage.path(), Arc::new(HashEmbedder::default()));
    pipeline.open_book(&nature).await.unwrap();

    // Every source disappears; the stale index must not load silently.
    fs::remove_file(nature.join("sky.txt")).unwrap();
    let err = pipeline
        .open_book(&nature)
        .await
        .err()
        .expect("emptied corpus must not load");
    assert!(matches!(err, Error::CorpusMismatch { .. }), "got {err}");
}

#[tokio::test]
async fn missing_source_path_fails_before_indexing() {
    let storage = tempfile::tempdir().unwrap();
    let books = tempfile::tempdir().unwrap();
    let pipeline = pipeline_with(books.path(), storage.path(), Arc::new(HashEmbedder::default()));

    let err = pipeline
        .open_book(Path::new("/no/such/book.epub"))
        .await
        .err()
        .expect("missing path must not open");
    assert!(matches!(err, Error::SourceNotFound(_)));

    // The loader alone behaves the same.
    assert!(matches!(
        load_path(Path::new("/no/such/dir")),
        Err(Error::SourceNotFound(_))
    ));
}

#[tokio::test]
async fn library_agent_routes_across_books() {
    let books = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();

    let astronomy = books.path().join("astronomy");
    fs::create_dir(&astronomy).unwrap();
    fs::write(astronomy.join("sky.txt"), "The sky is blue.").unwrap();

    let botany = books.path().join("botany");
    fs::create_dir(&botany).unwrap();
    fs::write(botany.join("grass.txt"), "The grass is green.").unwrap();

    let pipeline = pipeline_with(books.path(), storage.path(), Arc::new(HashEmbedder::default()));

    // Route everything to the botany tool.
    let agent = pipeline
        .open_library_with(Arc::new(StaticSelector(Selection::Single(
            "botany".to_string(),
        ))))
        .await
        .unwrap();

    let catalog = agent.catalog();
    let names: Vec<_> = catalog.iter().map(|d| d.name.as_str()).collect();
    assert!(names.contains(&"astronomy"));
    assert!(names.contains(&"botany"));
    // Two corpora also expose the composed cross-book engine.
    assert!(names.contains(&"compare_books"));

    let answer = agent.chat("What color is the grass?").await.unwrap();
    assert!(answer.text.contains("green"), "answer: {}", answer.text);
}

#[tokio::test]
async fn corpus_named_compare_books_does_not_block_the_library() {
    let books = tempfile::tempdir().unwrap();
    let storage = tempfile::tempdir().unwrap();

    let compare = books.path().join("compare_books");
    fs::create_dir(&compare).unwrap();
    fs::write(compare.join("intro.txt"), "A survey of comparative reading.").unwrap();

    let botany = books.path().join("botany");
    fs::create_dir(&botany).unwrap();
    fs::write(botany.join("grass.txt"), "The grass is green.").unwrap();

    let pipeline = pipeline_with(books.path(), storage.path(), Arc::new(HashEmbedder::default()));
    let agent = pipeline
        .open_library_with(Arc::new(StaticSelector(Selection::Direct)))
        .await
        .unwrap();

    let catalog = agent.catalog();
    let names: Vec<_> = catalog.iter().map(|d| d.name.as_str()).collect();
    assert!(names.contains(&"compare_books"));
    // The composed engine takes the next free name.
    assert!(names.contains(&"compare_books_2"));
}

#[test]
fn missing_credential_fails_before_any_io() {
    // Serialized env handling inside one test; other tests build Config
    // directly and never read the environment.
    let saved = std::env::var(API_KEY_VAR).ok();

    std::env::remove_var(API_KEY_VAR);
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    std::env::set_var(API_KEY_VAR, "  ");
    let err = Config::from_env().unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    std::env::set_var(API_KEY_VAR, "sk-test");
    let config = Config::from_env().unwrap();
    assert_eq!(config.api_key, "sk-test");

    match saved {
        Some(value) => std::env::set_var(API_KEY_VAR, value),
        None => std::env::remove_var(API_KEY_VAR),
    }
}
