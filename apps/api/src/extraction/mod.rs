//! Text extraction — turns uploaded PDF/DOCX bytes into plain text.
//!
//! Extraction never fails the caller: corrupt, encrypted or unsupported
//! documents come back as a named `Extraction` outcome instead of an error,
//! so "unreadable" stays distinguishable from "blank".
//!
//! Parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, warn};

pub mod docx;
pub mod pdf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Detects the kind from the file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)?;
        match extension.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }
}

/// An uploaded file. Lives only for the duration of one extraction.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub content: Bytes,
}

impl Document {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_filename(&self.filename)
    }
}

/// Result of extracting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Extraction succeeded. May still be empty for a genuinely blank file.
    Text(String),
    /// The file could not be parsed (corrupt, encrypted, wrong format).
    Unreadable { reason: String },
    /// The extension is neither `.pdf` nor `.docx`.
    Unsupported,
}

impl Extraction {
    /// The extracted text; empty for every failure outcome.
    pub fn text(&self) -> &str {
        match self {
            Extraction::Text(text) => text,
            Extraction::Unreadable { .. } | Extraction::Unsupported => "",
        }
    }

    pub fn outcome(&self) -> ExtractionOutcome {
        match self {
            Extraction::Text(text) if text.trim().is_empty() => ExtractionOutcome::Blank,
            Extraction::Text(_) => ExtractionOutcome::Text,
            Extraction::Unreadable { .. } => ExtractionOutcome::Unreadable,
            Extraction::Unsupported => ExtractionOutcome::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionOutcome {
    Text,
    Blank,
    Unreadable,
    Unsupported,
}

/// Per-document summary returned to the client alongside the results.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub filename: String,
    pub outcome: ExtractionOutcome,
    pub characters: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DocumentReport {
    pub fn new(filename: &str, extraction: &Extraction) -> Self {
        Self {
            filename: filename.to_string(),
            outcome: extraction.outcome(),
            characters: extraction.text().chars().count(),
            detail: match extraction {
                Extraction::Unreadable { reason } => Some(reason.clone()),
                _ => None,
            },
        }
    }

    pub fn with_detail(mut self, detail: Option<String>) -> Self {
        if detail.is_some() {
            self.detail = detail;
        }
        self
    }
}

/// Extracts plain text from a document synchronously.
pub fn extract(document: &Document) -> Extraction {
    let result = match document.kind() {
        Some(DocumentKind::Pdf) => pdf::extract_pdf(&document.content),
        Some(DocumentKind::Docx) => docx::extract_docx(&document.content),
        None => {
            debug!("Skipping unsupported document {}", document.filename);
            return Extraction::Unsupported;
        }
    };

    match result {
        Ok(text) => Extraction::Text(text),
        Err(reason) => {
            warn!("Could not read {}: {reason}", document.filename);
            Extraction::Unreadable { reason }
        }
    }
}

/// Runs `extract` on the blocking pool.
pub async fn extract_blocking(document: Document) -> Extraction {
    let filename = document.filename.clone();
    match tokio::task::spawn_blocking(move || extract(&document)).await {
        Ok(extraction) => extraction,
        Err(e) => {
            warn!("Extraction task for {filename} aborted: {e}");
            Extraction::Unreadable {
                reason: format!("extraction task aborted: {e}"),
            }
        }
    }
}
