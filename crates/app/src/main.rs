use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use docqa_core::{
    AnswerOutcome, ChunkingConfig, GeneratorConfig, IngestionOptions, OpenAiChatGenerator,
    QaCoordinator, RetrievalOptions,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docqa", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Folder holding the PDF, DOCX, DOC and TXT documents.
    #[arg(long, env = "DOCUMENTS_DIR", default_value = "documents")]
    documents_dir: String,

    /// Words per chunk.
    #[arg(long, default_value = "500")]
    chunk_size: usize,

    /// Words shared by consecutive chunks.
    #[arg(long, default_value = "50")]
    overlap: usize,

    /// Maximum vocabulary size of the TF-IDF space.
    #[arg(long, default_value = "1000")]
    max_features: usize,

    /// Number of chunks considered per question.
    #[arg(long, default_value = "3")]
    top_k: usize,

    /// Chunks scoring at or below this similarity are dropped.
    #[arg(long, default_value = "0.1")]
    relevance_threshold: f32,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    llm_base_url: String,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    /// Chat model name
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-4.1-mini")]
    llm_model: String,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest the documents folder and report chunk and document counts.
    Ingest,
    /// Print the chunks most similar to a query.
    Search {
        #[arg(long)]
        query: String,
    },
    /// Answer one question from the documents.
    Ask {
        #[arg(long)]
        question: String,
    },
    /// Ingest, then print index status.
    Status,
    /// Ingest once, then answer questions read from stdin.
    ///
    /// `:reload` re-ingests the folder, `:status` prints the index status and
    /// `:quit` exits.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let ingestion = ingestion_options(&cli)?;
    let retrieval = RetrievalOptions {
        top_k: cli.top_k,
        relevance_threshold: cli.relevance_threshold,
    };
    let generator = OpenAiChatGenerator::new(GeneratorConfig {
        base_url: cli.llm_base_url.clone(),
        api_key: cli.llm_api_key.clone(),
        model: cli.llm_model.clone(),
        ..GeneratorConfig::default()
    });

    let coordinator = QaCoordinator::new(&cli.documents_dir, ingestion, retrieval, generator);
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        documents_dir = %cli.documents_dir,
        "docqa boot"
    );

    tokio::task::block_in_place(|| ingest(&coordinator))?;

    match cli.command {
        Command::Ingest => {}
        Command::Search { query } => {
            let hits = coordinator.search(&query)?;

            println!("query: {query}");
            if hits.is_empty() {
                println!("no chunk above the relevance threshold");
            }
            for hit in hits {
                println!("[{}] similarity={:.4}", hit.source_label, hit.similarity);
                println!("  chunk_text:\n{}", hit.text);
            }
        }
        Command::Ask { question } => {
            let outcome = coordinator.ask(&question).await;
            print_outcome(&outcome);
        }
        Command::Status => print_status(&coordinator),
        Command::Chat => {
            println!("Ask a question (:reload, :status, :quit)");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                match line.trim() {
                    ":quit" | ":exit" => break,
                    ":reload" => {
                        let reloaded = tokio::task::block_in_place(|| ingest(&coordinator));
                        if let Err(error) = reloaded {
                            println!("reload failed: {error:#}");
                        }
                    }
                    ":status" => print_status(&coordinator),
                    "" => continue,
                    question => print_outcome(&coordinator.ask(question).await),
                }
            }
        }
    }

    Ok(())
}

fn ingestion_options(cli: &Cli) -> anyhow::Result<IngestionOptions> {
    Ok(IngestionOptions {
        chunking: ChunkingConfig::new(cli.chunk_size, cli.overlap)
            .context("invalid chunking options")?,
        max_features: cli.max_features,
    })
}

/// Folder walk and index fit are blocking; call through `block_in_place`
/// from async code.
fn ingest(coordinator: &QaCoordinator<OpenAiChatGenerator>) -> anyhow::Result<()> {
    let summary = coordinator
        .ingest()
        .context("failed to process documents")?;

    if !summary.skipped_files.is_empty() {
        warn!(
            "skipped_files={} for folder={}",
            summary.skipped_files.len(),
            coordinator.documents_dir().display()
        );
        for skipped in &summary.skipped_files {
            warn!(path = %skipped.path.display(), reason = %skipped.reason, "skipped document");
        }
    }

    println!("{} at {}", summary.message(), Utc::now().to_rfc3339());
    Ok(())
}

fn print_outcome(outcome: &AnswerOutcome) {
    if !outcome.success {
        println!("error: {}", outcome.message.as_deref().unwrap_or("unknown failure"));
        return;
    }

    if let Some(answer) = &outcome.answer {
        println!("{answer}");
    }
    for source in &outcome.sources {
        println!("  source: {source}");
    }
}

fn print_status(coordinator: &QaCoordinator<OpenAiChatGenerator>) {
    let status = coordinator.status();
    println!("processed: {}", status.ready);
    println!("document_count: {}", status.document_count);
    println!("chunk_count: {}", status.chunk_count);
    println!("corpus_digest: {}", status.corpus_digest);
    if let Some(built_at) = status.built_at {
        println!("built_at: {}", built_at.to_rfc3339());
    }
    println!("files_in_folder:");
    for file in status.files_in_folder {
        println!("  {file}");
    }
}
