use crate::index::CorpusIndex;
use crate::models::{RetrievalOptions, RetrievedChunk};
use tracing::debug;

impl CorpusIndex {
    /// Cosine similarity of `query` against every chunk, in chunk order.
    /// Empty when the index is not ready.
    pub fn similarities(&self, query: &str) -> Vec<f32> {
        let Some(space) = self.vector_space() else {
            return Vec::new();
        };

        let query_vector = space.vectorizer().transform(query);
        space
            .vectors()
            .iter()
            .map(|vector| query_vector.cosine(vector))
            .collect()
    }

    /// Most similar chunks first. Not-ready indexes return no results.
    pub fn find_relevant(&self, query: &str, options: RetrievalOptions) -> Vec<RetrievedChunk> {
        if !self.is_ready() {
            return Vec::new();
        }

        let similarities = self.similarities(query);
        let ranked = select_top_k_then_filter(
            &similarities,
            options.top_k,
            options.relevance_threshold,
        );

        debug!(
            query_len = query.len(),
            candidates = similarities.len(),
            returned = ranked.len(),
            "ranked chunks"
        );

        ranked
            .into_iter()
            .map(|(position, similarity)| {
                let chunk = &self.chunks()[position];
                RetrievedChunk {
                    text: chunk.text.clone(),
                    source_label: chunk.source_label.clone(),
                    similarity,
                }
            })
            .collect()
    }
}

/// Picks the `top_k` highest scores (lower position wins ties) and only then
/// drops the ones at or below `threshold`.
pub fn select_top_k_then_filter(
    similarities: &[f32],
    top_k: usize,
    threshold: f32,
) -> Vec<(usize, f32)> {
    let mut order: Vec<usize> = (0..similarities.len()).collect();
    order.sort_by(|&left, &right| similarities[right].total_cmp(&similarities[left]));

    order
        .into_iter()
        .take(top_k)
        .filter(|&position| similarities[position] > threshold)
        .map(|position| (position, similarities[position]))
        .collect()
}
