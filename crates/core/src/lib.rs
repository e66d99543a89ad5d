pub mod chunking;
pub mod error;
pub mod extractor;
pub mod generation;
pub mod index;
pub mod ingest;
pub mod models;
pub mod orchestrator;
pub mod retriever;
pub mod store;
pub mod traits;
pub mod vectorizer;

pub use chunking::{build_chunks, chunk_words, normalize_text, ChunkingConfig};
pub use error::{IngestError, QaError};
pub use extractor::{DocumentKind, ExtractionOutcome, FileExtractor, TextExtractor};
pub use generation::{GeneratorConfig, OpenAiChatGenerator};
pub use index::{CorpusIndex, VectorSpace};
pub use ingest::{discover_documents, ingest_folder, list_document_names, IngestionReport};
pub use models::{
    AnswerOutcome, Chunk, IndexStatus, IngestionOptions, IngestionSummary, RetrievalOptions,
    RetrievedChunk, SkippedFile,
};
pub use orchestrator::QaCoordinator;
pub use retriever::select_top_k_then_filter;
pub use store::IndexHandle;
pub use traits::AnswerGenerator;
pub use vectorizer::{SparseVector, TfidfVectorizer};
