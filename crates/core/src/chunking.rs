use crate::error::{IngestError, Result};
use crate::models::{Chunk, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// Word-window settings. `overlap` words are shared by consecutive windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self {
            chunk_size,
            overlap,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.overlap >= self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

/// Collapses line breaks and whitespace runs into single spaces and trims the ends.
pub fn normalize_text(text: &str) -> String {
    // Newline runs fold into the general whitespace rule, so one pass is enough.
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits `text` into windows of `chunk_size` words starting every `stride` words.
///
/// A window is emitted for every start index inside the word sequence, so the
/// tail of a document may appear in more than one window.
pub fn chunk_words(text: &str, config: ChunkingConfig) -> Result<Vec<String>> {
    config.validate()?;

    let words: Vec<&str> = text.split_whitespace().collect();
    let chunks = (0..words.len())
        .step_by(config.stride())
        .map(|start| {
            let end = (start + config.chunk_size).min(words.len());
            words[start..end].join(" ")
        })
        .filter(|window| !window.trim().is_empty())
        .collect();

    Ok(chunks)
}

/// Normalizes and chunks one document, numbering chunks from zero.
pub fn build_chunks(
    filename: &str,
    raw_text: &str,
    config: ChunkingConfig,
) -> Result<Vec<Chunk>> {
    let normalized = normalize_text(raw_text);

    Ok(chunk_words(&normalized, config)?
        .into_iter()
        .enumerate()
        .map(|(chunk_id, text)| Chunk::new(filename, chunk_id, text))
        .collect())
}
