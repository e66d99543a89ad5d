//! Sparse TF-IDF weighting over a fixed, capped vocabulary.
//!
//! Tokens are lowercased runs of two or more word characters. No stop words are
//! removed. When the corpus has more distinct terms than `max_features`, the
//! terms with the highest total count are kept (ties go to the lexicographically
//! smaller term) and dimensions are assigned in lexicographic term order.
//!
//! Weights are raw term counts multiplied by the smoothed inverse document
//! frequency `ln((1 + n) / (1 + df)) + 1`, and every vector is L2-normalized.

use crate::error::{IngestError, Result};
use regex::Regex;
use std::collections::HashMap;

const TOKEN_PATTERN: &str = r"\b\w\w+\b";

/// Sparse vector stored as `(dimension, weight)` pairs sorted by dimension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    fn from_unsorted(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_unstable_by_key(|(dimension, _)| *dimension);
        Self { entries }
    }

    pub fn entries(&self) -> &[(u32, f32)] {
        &self.entries
    }

    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, weight)| *weight == 0.0)
    }

    pub fn norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, weight)| weight * weight)
            .sum::<f32>()
            .sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut left, mut right) = (0, 0);
        let mut total = 0.0;

        while left < self.entries.len() && right < other.entries.len() {
            let (left_dim, left_weight) = self.entries[left];
            let (right_dim, right_weight) = other.entries[right];
            match left_dim.cmp(&right_dim) {
                std::cmp::Ordering::Less => left += 1,
                std::cmp::Ordering::Greater => right += 1,
                std::cmp::Ordering::Equal => {
                    total += left_weight * right_weight;
                    left += 1;
                    right += 1;
                }
            }
        }

        total
    }

    /// Cosine similarity; zero when either side has no weight.
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let denominator = self.norm() * other.norm();
        if denominator == 0.0 {
            return 0.0;
        }
        (self.dot(other) / denominator).clamp(0.0, 1.0)
    }

    fn normalized(mut self) -> Self {
        let magnitude = self.norm();
        if magnitude > 0.0 {
            for (_, weight) in &mut self.entries {
                *weight /= magnitude;
            }
        }
        self
    }
}

/// Fitted vocabulary and IDF table. Immutable once fitted.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    token_pattern: Regex,
    vocabulary: HashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Result<Self> {
        if max_features == 0 {
            return Err(IngestError::InvalidArgument(
                "max_features must be greater than zero".to_string(),
            ));
        }

        let token_pattern = Regex::new(TOKEN_PATTERN)?;
        let mut corpus_counts: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for document in documents {
            for (term, count) in count_terms(&token_pattern, document.as_ref()) {
                *corpus_counts.entry(term.clone()).or_default() += count;
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        if corpus_counts.is_empty() {
            return Err(IngestError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|(left_term, left_count), (right_term, right_count)| {
            right_count
                .cmp(left_count)
                .then_with(|| left_term.cmp(right_term))
        });
        ranked.truncate(max_features);

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let total_documents = documents.len() as f32;
        let idf = kept
            .iter()
            .map(|term| {
                let df = document_frequency.get(term).copied().unwrap_or_default() as f32;
                ((1.0 + total_documents) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(dimension, term)| (term, dimension as u32))
            .collect();

        Ok(Self {
            token_pattern,
            vocabulary,
            idf,
        })
    }

    /// Projects `text` into the fitted space. Unknown terms are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let entries = count_terms(&self.token_pattern, text)
            .into_iter()
            .filter_map(|(term, count)| {
                self.vocabulary.get(&term).map(|&dimension| {
                    (dimension, count as f32 * self.idf[dimension as usize])
                })
            })
            .collect();

        SparseVector::from_unsorted(entries).normalized()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn dimension_of(&self, term: &str) -> Option<u32> {
        self.vocabulary.get(term).copied()
    }
}

fn count_terms(token_pattern: &Regex, text: &str) -> HashMap<String, usize> {
    let lowered = text.to_lowercase();
    let mut counts = HashMap::new();
    for token in token_pattern.find_iter(&lowered) {
        *counts.entry(token.as_str().to_string()).or_default() += 1;
    }
    counts
}
