use crate::chunking::{build_chunks, ChunkingConfig};
use crate::extractor::{ExtractionOutcome, TextExtractor};
use crate::error::{IngestError, Result};
use crate::models::{Chunk, SkippedFile};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Regular files directly inside `folder`, sorted by file name.
///
/// A missing folder is created and yields no files.
pub fn discover_documents(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.exists() {
        fs::create_dir_all(folder)?;
        return Ok(Vec::new());
    }

    if !folder.is_dir() {
        return Err(IngestError::InvalidArgument(format!(
            "documents location is not a directory: {}",
            folder.display()
        )));
    }

    let files = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .collect();

    Ok(files)
}

/// Names of the regular files currently in `folder`, without creating it.
pub fn list_document_names(folder: &Path) -> Vec<String> {
    if !folder.is_dir() {
        return Vec::new();
    }

    WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|item| item.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect()
}

pub struct IngestionReport {
    pub chunks: Vec<Chunk>,
    pub skipped_files: Vec<SkippedFile>,
}

/// Extracts, normalizes and chunks every document in `folder`.
///
/// Files that cannot be read are recorded in `skipped_files` and never abort
/// the batch. Only an invalid chunking config or an unreadable folder fails.
pub fn ingest_folder(
    folder: &Path,
    config: ChunkingConfig,
    extractor: &dyn TextExtractor,
) -> Result<IngestionReport> {
    config.validate()?;

    let mut chunks = Vec::new();
    let mut skipped_files = Vec::new();

    for path in discover_documents(folder)? {
        let filename = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name.to_string(),
            None => {
                let reason = IngestError::MissingFileName(path.display().to_string()).to_string();
                warn!(path = %path.display(), %reason, "skipped document");
                skipped_files.push(SkippedFile { path, reason });
                continue;
            }
        };

        let text = match extractor.extract(&path) {
            ExtractionOutcome::Extracted(text) => text,
            ExtractionOutcome::Unsupported => {
                let reason = "unsupported file type".to_string();
                warn!(path = %path.display(), %reason, "skipped document");
                skipped_files.push(SkippedFile { path, reason });
                continue;
            }
            ExtractionOutcome::Failed(reason) => {
                warn!(path = %path.display(), %reason, "skipped document");
                skipped_files.push(SkippedFile { path, reason });
                continue;
            }
        };

        let document_chunks = build_chunks(&filename, &text, config)?;
        if document_chunks.is_empty() {
            debug!(path = %path.display(), "document has no text");
        }
        chunks.extend(document_chunks);
    }

    Ok(IngestionReport {
        chunks,
        skipped_files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FileExtractor;
    use crate::index::CorpusIndex;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn words(count: usize, prefix: &str) -> String {
        (0..count)
            .map(|index| format!("{prefix}{index}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn missing_folder_is_created_and_empty() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let folder = dir.path().join("documents");

        let report = ingest_folder(&folder, ChunkingConfig::default(), &FileExtractor)?;

        assert!(folder.is_dir());
        assert!(report.chunks.is_empty());
        assert!(report.skipped_files.is_empty());
        Ok(())
    }

    #[test]
    fn discovery_is_flat_and_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let nested = dir.path().join("nested");
        fs::create_dir(&nested)?;
        fs::write(dir.path().join("b.txt"), "bee")?;
        fs::write(dir.path().join("a.txt"), "ay")?;
        fs::write(nested.join("c.txt"), "sea")?;

        let files = discover_documents(dir.path())?;
        let names: Vec<_> = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(list_document_names(dir.path()), vec!["a.txt", "b.txt"]);
        assert!(list_document_names(&dir.path().join("absent")).is_empty());
        assert!(!dir.path().join("absent").exists());
        Ok(())
    }

    #[test]
    fn chunk_ids_are_contiguous_per_document() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("alpha.txt"), words(23, "alpha"))?;
        fs::write(dir.path().join("beta.txt"), words(7, "beta"))?;
        let config = ChunkingConfig::new(5, 2)?;

        let report = ingest_folder(dir.path(), config, &FileExtractor)?;

        let mut per_file: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for chunk in &report.chunks {
            per_file.entry(chunk.filename.as_str()).or_default().push(chunk.chunk_id);
        }
        for ids in per_file.values() {
            assert_eq!(ids, &(0..ids.len()).collect::<Vec<_>>());
        }
        assert_eq!(per_file.len(), 2);
        assert_eq!(report.chunks[0].filename, "alpha.txt");
        assert_eq!(CorpusIndex::build(report.chunks, 1_000)?.document_count(), 2);
        Ok(())
    }

    #[test]
    fn best_effort_skips_unreadable_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("broken.pdf"), b"%PDF-1.4\n%broken")?;
        fs::write(dir.path().join("image.png"), b"\x89PNG")?;
        fs::write(dir.path().join("rules.txt"), "pets must be on a leash")?;

        let report = ingest_folder(dir.path(), ChunkingConfig::default(), &FileExtractor)?;

        assert_eq!(report.chunks.len(), 1);
        assert_eq!(report.chunks[0].source_label, "rules.txt (part 1)");
        assert_eq!(report.skipped_files.len(), 2);
        assert_eq!(
            report.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("broken.pdf")
        );
        Ok(())
    }

    #[test]
    fn invalid_config_fails_before_reading() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let folder = dir.path().join("never-created");
        let config = ChunkingConfig {
            chunk_size: 10,
            overlap: 10,
        };

        let result = ingest_folder(&folder, config, &FileExtractor);

        assert!(matches!(result, Err(IngestError::InvalidChunkConfig(_))));
        assert!(!folder.exists());
        Ok(())
    }

    #[test]
    fn repeated_ingestion_is_identical() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        fs::write(dir.path().join("one.txt"), words(40, "w"))?;
        fs::write(dir.path().join("two.txt"), "short\n\n\n  document  ")?;
        let config = ChunkingConfig::new(8, 3)?;

        let first = ingest_folder(dir.path(), config, &FileExtractor)?;
        let second = ingest_folder(dir.path(), config, &FileExtractor)?;

        assert_eq!(first.chunks, second.chunks);
        Ok(())
    }
}
