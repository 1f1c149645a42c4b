//! Document loading and chunking

mod chunker;
mod epub;
mod loader;

pub use chunker::TextChunker;
pub use epub::read_epub;
pub use loader::{corpus_name_for_path, load_path};
