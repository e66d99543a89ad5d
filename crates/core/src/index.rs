use crate::error::Result;
use crate::models::Chunk;
use crate::vectorizer::{SparseVector, TfidfVectorizer};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Fitted vocabulary plus one vector per chunk, aligned by position.
#[derive(Debug, Clone)]
pub struct VectorSpace {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) vectors: Vec<SparseVector>,
}

impl VectorSpace {
    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn vectors(&self) -> &[SparseVector] {
        &self.vectors
    }
}

/// Chunks and the vector space fitted on exactly those chunks.
///
/// The value is never mutated after `build`; a new corpus means a new index.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    chunks: Vec<Chunk>,
    space: Option<VectorSpace>,
    built_at: Option<DateTime<Utc>>,
}

impl CorpusIndex {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fits a vector space over `chunks`. An empty collection yields a
    /// not-ready index rather than an error.
    pub fn build(chunks: Vec<Chunk>, max_features: usize) -> Result<Self> {
        if chunks.is_empty() {
            return Ok(Self {
                chunks,
                space: None,
                built_at: Some(Utc::now()),
            });
        }

        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let vectorizer = TfidfVectorizer::fit(&texts, max_features)?;
        let vectors = texts.iter().map(|text| vectorizer.transform(text)).collect();

        Ok(Self {
            chunks,
            space: Some(VectorSpace {
                vectorizer,
                vectors,
            }),
            built_at: Some(Utc::now()),
        })
    }

    pub fn is_ready(&self) -> bool {
        self.space.is_some() && !self.chunks.is_empty()
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vector_space(&self) -> Option<&VectorSpace> {
        self.space.as_ref()
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn document_count(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| chunk.filename.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for chunk in &self.chunks {
            hasher.update(chunk.filename.as_bytes());
            hasher.update((chunk.chunk_id as u64).to_le_bytes());
            hasher.update(chunk.text.as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}
