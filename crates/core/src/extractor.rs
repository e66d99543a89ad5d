use crate::error::{IngestError, Result};
use lopdf::Document;
use std::fs;
use std::path::Path;

/// Text stored for legacy `.doc` files, which have no native reader.
pub const LEGACY_DOC_NOTICE: &str =
    "Legacy DOC file detected. Convert it to DOCX or PDF for full text support.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }
}

/// Per-file extraction result. Failures stay local to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Extracted(String),
    Unsupported,
    Failed(String),
}

pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> ExtractionOutcome;
}

/// Reads PDF, DOCX, DOC and TXT files from the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileExtractor;

impl TextExtractor for FileExtractor {
    fn extract(&self, path: &Path) -> ExtractionOutcome {
        let Some(kind) = DocumentKind::from_path(path) else {
            return ExtractionOutcome::Unsupported;
        };

        let extracted = match kind {
            DocumentKind::Pdf => extract_pdf_text(path),
            DocumentKind::Docx => extract_docx_text(path),
            DocumentKind::Doc => Ok(LEGACY_DOC_NOTICE.to_string()),
            DocumentKind::Txt => extract_plain_text(path),
        };

        match extracted {
            Ok(text) => ExtractionOutcome::Extracted(text),
            Err(error) => ExtractionOutcome::Failed(error.to_string()),
        }
    }
}

pub fn extract_pdf_text(path: &Path) -> Result<String> {
    let document = Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

    let mut text = String::new();
    for (page_no, _page_id) in document.get_pages() {
        let page_text = document
            .extract_text(&[page_no])
            .map_err(|error| IngestError::PdfParse(error.to_string()))?;
        text.push_str(&page_text);
        text.push('\n');
    }

    Ok(text)
}

pub fn extract_docx_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let document =
        docx_rs::read_docx(&bytes).map_err(|error| IngestError::DocxParse(error.to_string()))?;

    let mut text = String::new();
    for child in document.document.children {
        if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(run_text) = child {
                            text.push_str(&run_text.text);
                        }
                    }
                }
            }
            text.push('\n');
        }
    }

    Ok(text)
}

pub fn extract_plain_text(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn kind_is_detected_case_insensitively() {
        assert_eq!(DocumentKind::from_path(Path::new("a.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("b.Docx")), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_path(Path::new("c.doc")), Some(DocumentKind::Doc));
        assert_eq!(DocumentKind::from_path(Path::new("d.txt")), Some(DocumentKind::Txt));
        assert_eq!(DocumentKind::from_path(Path::new("e.md")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn plain_text_is_read_verbatim() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("notes.txt");
        fs::write(&path, "Quiet hours\n\nstart at 22:00.")?;

        assert_eq!(
            FileExtractor.extract(&path),
            ExtractionOutcome::Extracted("Quiet hours\n\nstart at 22:00.".to_string())
        );
        Ok(())
    }

    #[test]
    fn legacy_doc_yields_notice() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("old.doc");
        fs::write(&path, b"\xd0\xcf\x11\xe0")?;

        assert_eq!(
            FileExtractor.extract(&path),
            ExtractionOutcome::Extracted(LEGACY_DOC_NOTICE.to_string())
        );
        Ok(())
    }

    #[test]
    fn unsupported_extension_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("photo.png");
        fs::write(&path, b"\x89PNG")?;

        assert_eq!(FileExtractor.extract(&path), ExtractionOutcome::Unsupported);
        Ok(())
    }

    #[test]
    fn docx_paragraphs_are_joined_with_newlines() -> Result<(), Box<dyn std::error::Error>> {
        use docx_rs::{Docx, Paragraph, Run};

        let dir = tempdir()?;
        let path = dir.path().join("rules.docx");
        let file = fs::File::create(&path)?;
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Pool opens")))
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("at eight")))
            .build()
            .pack(file)?;

        assert_eq!(
            FileExtractor.extract(&path),
            ExtractionOutcome::Extracted("Pool opens\nat eight\n".to_string())
        );
        Ok(())
    }

    #[test]
    fn pdf_page_text_is_extracted() -> Result<(), Box<dyn std::error::Error>> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Object, Stream};

        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = document.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello pool world")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = document.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let dir = tempdir()?;
        let path = dir.path().join("minutes.pdf");
        document.save(&path)?;

        // lopdf ends each page's text with a newline of its own.
        assert_eq!(
            FileExtractor.extract(&path),
            ExtractionOutcome::Extracted("Hello pool world\n\n".to_string())
        );
        Ok(())
    }

    #[test]
    fn broken_files_fail_without_panicking() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let pdf = dir.path().join("broken.pdf");
        let docx = dir.path().join("broken.docx");
        let txt = dir.path().join("latin1.txt");
        fs::write(&pdf, b"%PDF-1.4\n%broken")?;
        fs::write(&docx, b"not a zip archive")?;
        fs::write(&txt, b"caf\xe9")?;

        for path in [pdf, docx, txt] {
            assert!(
                matches!(FileExtractor.extract(&path), ExtractionOutcome::Failed(_)),
                "expected failure for {}",
                path.display()
            );
        }
        Ok(())
    }
}
