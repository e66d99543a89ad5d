use crate::chunking::ChunkingConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CHUNK_SIZE: usize = 500;
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;
pub const DEFAULT_MAX_FEATURES: usize = 1_000;
pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 0.1;

/// One overlapping word window of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub filename: String,
    /// Zero-based position of the chunk inside its document.
    pub chunk_id: usize,
    pub text: String,
    /// Citation shown to users, e.g. `bylaws.pdf (part 2)`.
    pub source_label: String,
}

impl Chunk {
    pub fn new(filename: impl Into<String>, chunk_id: usize, text: impl Into<String>) -> Self {
        let filename = filename.into();
        let source_label = source_label(&filename, chunk_id);
        Self {
            filename,
            chunk_id,
            text: text.into(),
            source_label,
        }
    }
}

pub fn source_label(filename: &str, chunk_id: usize) -> String {
    format!("{filename} (part {})", chunk_id + 1)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub source_label: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalOptions {
    pub top_k: usize,
    /// Hits scoring at or below this value are dropped after top-k selection.
    pub relevance_threshold: f32,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IngestionOptions {
    pub chunking: ChunkingConfig,
    pub max_features: usize,
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionSummary {
    pub chunk_count: usize,
    pub document_count: usize,
    pub skipped_files: Vec<SkippedFile>,
}

impl IngestionSummary {
    pub fn message(&self) -> String {
        format!(
            "Processed {} chunks from {} documents",
            self.chunk_count, self.document_count
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    pub chunk_count: usize,
    pub document_count: usize,
    pub files_in_folder: Vec<String>,
    pub built_at: Option<DateTime<Utc>>,
    /// SHA-256 over the ordered chunk texts; equal digests mean equal corpora.
    pub corpus_digest: String,
}

/// Result of a question as seen by callers: never a raw error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub answer: Option<String>,
    pub sources: Vec<String>,
}

impl AnswerOutcome {
    pub fn answered(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            success: true,
            message: None,
            answer: Some(answer.into()),
            sources,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            answer: None,
            sources: Vec::new(),
        }
    }
}
