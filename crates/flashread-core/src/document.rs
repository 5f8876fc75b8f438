//! Document ingestion.
//!
//! Turns a file on disk into a title and a flat word list. Plain text and
//! Markdown are read as-is; EPUB chapters are walked in spine order and
//! stripped of markup before splitting.

use crate::cancellation::CancellationToken;
use crate::text_utils::split_words;
use anyhow::{Context, Result};
use epub::doc::EpubDoc;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// A document reduced to what the reader needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub words: Vec<String>,
}

impl Document {
    pub fn from_text(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            words: split_words(text),
        }
    }
}

pub fn load_document(path: &Path) -> Result<Document> {
    load_document_with_cancel(path, None)
}

pub fn load_document_with_cancel(
    path: &Path,
    cancel: Option<&CancellationToken>,
) -> Result<Document> {
    let title = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Untitled")
        .to_string();

    if let Some(token) = cancel {
        token.check_cancelled("open_document")?;
    }
    let text = if is_epub(path) {
        load_epub_text(path, cancel)?
    } else {
        if !is_text_file(path) && !is_markdown(path) {
            warn!(path = %path.display(), "Unknown extension; reading as plain text");
        }
        info!(path = %path.display(), "Loading plain text content");
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };

    let document = Document::from_text(title, &text);
    info!(
        title = %document.title,
        words = document.words.len(),
        "Finished loading document"
    );
    Ok(document)
}

fn load_epub_text(path: &Path, cancel: Option<&CancellationToken>) -> Result<String> {
    info!(path = %path.display(), "Loading EPUB content");
    let mut doc =
        EpubDoc::new(path).with_context(|| format!("Failed to open EPUB at {}", path.display()))?;

    let mut combined = String::new();
    let mut chapters = 0usize;

    loop {
        if let Some(token) = cancel {
            token.check_cancelled("epub_chapter")?;
        }
        match doc.get_current_str() {
            Some((chapter, _mime)) => {
                chapters += 1;
                // Very wide lines: only word boundaries matter here.
                let plain = match html2text::from_read(chapter.as_bytes(), 10_000) {
                    Ok(clean) => clean,
                    Err(err) => {
                        warn!(chapter = chapters, "html2text failed: {err}");
                        chapter
                    }
                };
                debug!(chapter = chapters, added_chars = plain.len(), "Parsed chapter");
                combined.push('\n');
                combined.push_str(&plain);
            }
            None => break,
        }

        if !doc.go_next() {
            break;
        }
    }

    info!(chapters, total_chars = combined.len(), "Finished loading EPUB content");
    Ok(combined)
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn is_text_file(path: &Path) -> bool {
    matches!(extension_lowercase(path), Some(ext) if ext == "txt")
}

fn is_markdown(path: &Path) -> bool {
    matches!(extension_lowercase(path), Some(ext) if ext == "md" || ext == "markdown")
}

fn is_epub(path: &Path) -> bool {
    matches!(extension_lowercase(path), Some(ext) if ext == "epub")
}
