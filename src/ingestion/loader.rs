//! Corpus loading from a file or directory

use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::ingestion::epub::read_epub;
use crate::types::Document;

/// Load a corpus from a single file or a directory.
///
/// Missing paths fail with `SourceNotFound` before any downstream step.
/// Documents that are empty after whitespace normalization are dropped.
pub fn load_path(path: &Path) -> Result<Vec<Document>> {
    if !path.exists() {
        return Err(Error::SourceNotFound(path.to_path_buf()));
    }

    let documents = if path.is_dir() {
        load_dir(path)?
    } else {
        load_file(path)?
    };

    tracing::debug!(
        path = %path.display(),
        documents = documents.len(),
        "loaded corpus"
    );
    Ok(documents)
}

/// Derive a corpus name from a source path: the directory name, or the file
/// stem for a single book file.
pub fn corpus_name_for_path(path: &Path) -> String {
    let name = if path.is_dir() {
        path.file_name()
    } else {
        path.file_stem()
    };
    name.map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "corpus".to_string())
}

fn load_dir(dir: &Path) -> Result<Vec<Document>> {
    let mut documents = Vec::new();

    // Deterministic walk order keeps the corpus fingerprint stable.
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
            continue;
        };
        match ext.as_str() {
            "epub" | "txt" | "md" | "markdown" | "text" | "html" | "htm" => {
                documents.extend(load_file(path)?);
            }
            _ => {}
        }
    }

    Ok(documents)
}

fn load_file(path: &Path) -> Result<Vec<Document>> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let source_id = path.to_string_lossy().to_string();

    match ext.as_str() {
        "epub" => read_epub(path),
        "html" | "htm" => {
            let raw = std::fs::read_to_string(path)?;
            let text = html_text(&raw);
            Ok(Document::new(source_id, &text).into_iter().collect())
        }
        _ => {
            let raw = std::fs::read_to_string(path)?;
            Ok(Document::new(source_id, &raw).into_iter().collect())
        }
    }
}

fn html_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("body").expect("static selector");
    let mut text = String::new();
    if let Some(body) = document.select(&selector).next() {
        for piece in body.text() {
            let trimmed = piece.trim();
            if !trimmed.is_empty() {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(trimmed);
            }
        }
    }
    text
}
