use crate::{QaError, RetrievedChunk};
use async_trait::async_trait;

/// Turns a question plus retrieved context into a free-text answer.
#[async_trait]
pub trait AnswerGenerator {
    async fn generate(&self, question: &str, context: &[RetrievedChunk])
        -> Result<String, QaError>;
}
