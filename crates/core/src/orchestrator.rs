use crate::extractor::{FileExtractor, TextExtractor};
use crate::index::CorpusIndex;
use crate::ingest::{ingest_folder, list_document_names};
use crate::store::IndexHandle;
use crate::traits::AnswerGenerator;
use crate::{
    AnswerOutcome, IndexStatus, IngestError, IngestionOptions, IngestionSummary, QaError,
    RetrievalOptions, RetrievedChunk,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

pub const NO_RELEVANT_ANSWER: &str = "Sorry, I could not find relevant information in the \
provided documents to answer your question.";

/// Owns the live index and wires ingestion, retrieval and answer generation.
pub struct QaCoordinator<G>
where
    G: AnswerGenerator,
{
    documents_dir: PathBuf,
    ingestion: IngestionOptions,
    retrieval: RetrievalOptions,
    extractor: Box<dyn TextExtractor>,
    generator: G,
    index: IndexHandle,
}

impl<G> QaCoordinator<G>
where
    G: AnswerGenerator + Send + Sync,
{
    pub fn new(
        documents_dir: impl Into<PathBuf>,
        ingestion: IngestionOptions,
        retrieval: RetrievalOptions,
        generator: G,
    ) -> Self {
        Self {
            documents_dir: documents_dir.into(),
            ingestion,
            retrieval,
            extractor: Box::new(FileExtractor),
            generator,
            index: IndexHandle::default(),
        }
    }

    pub fn with_extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    pub fn index(&self) -> Arc<CorpusIndex> {
        self.index.snapshot()
    }

    /// Rebuilds the index from the documents folder and publishes it in one swap.
    ///
    /// On error the previously published index stays in place.
    pub fn ingest(&self) -> Result<IngestionSummary, IngestError> {
        self.ingestion.chunking.validate()?;

        let _guard = self.index.rebuild_guard();
        let report = ingest_folder(
            &self.documents_dir,
            self.ingestion.chunking,
            self.extractor.as_ref(),
        )?;
        let skipped_files = report.skipped_files;

        let next = CorpusIndex::build(report.chunks, self.ingestion.max_features).inspect_err(
            |error| {
                warn!(
                    folder = %self.documents_dir.display(),
                    %error,
                    "index build failed, keeping previous index"
                );
            },
        )?;

        let summary = IngestionSummary {
            chunk_count: next.chunk_count(),
            document_count: next.document_count(),
            skipped_files,
        };

        info!(
            folder = %self.documents_dir.display(),
            chunk_count = summary.chunk_count,
            document_count = summary.document_count,
            skipped = summary.skipped_files.len(),
            ready = next.is_ready(),
            "index rebuilt"
        );

        self.index.publish(next);
        Ok(summary)
    }

    pub fn status(&self) -> IndexStatus {
        let index = self.index.snapshot();
        IndexStatus {
            ready: index.is_ready(),
            chunk_count: index.chunk_count(),
            document_count: index.document_count(),
            files_in_folder: list_document_names(&self.documents_dir),
            built_at: index.built_at(),
            corpus_digest: index.digest(),
        }
    }

    /// Ranked chunks for `query`; empty when nothing has been ingested.
    pub fn search(&self, query: &str) -> Result<Vec<RetrievedChunk>, QaError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QaError::EmptyQuery);
        }
        Ok(self.index.snapshot().find_relevant(query, self.retrieval))
    }

    /// Answers `question` from the current index. Every failure is reported
    /// through the returned outcome.
    pub async fn ask(&self, question: &str) -> AnswerOutcome {
        let question = question.trim();
        if question.is_empty() {
            return AnswerOutcome::failed(QaError::EmptyQuery.to_string());
        }

        let index = self.index.snapshot();
        if !index.is_ready() {
            return AnswerOutcome::failed(QaError::NotReady.to_string());
        }

        let context = index.find_relevant(question, self.retrieval);
        if context.is_empty() {
            return AnswerOutcome::answered(NO_RELEVANT_ANSWER, Vec::new());
        }

        match self.generator.generate(question, &context).await {
            Ok(answer) => AnswerOutcome::answered(
                answer,
                context.into_iter().map(|chunk| chunk.source_label).collect(),
            ),
            Err(error) => {
                warn!(%error, "answer generation failed");
                AnswerOutcome::failed(format!("Failed to answer question: {error}"))
            }
        }
    }
}
