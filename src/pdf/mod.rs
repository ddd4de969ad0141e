//! Per-page PDF text extraction.
//!
//! A page that fails to decode (corrupt stream, image-only content)
//! yields empty text plus an error note for that page only; the rest of
//! the document is still extracted. Only a missing or unparseable file
//! fails the whole document.

use std::path::Path;

use thiserror::Error;
use tracing::warn;

/// Errors that fail extraction for the whole document.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF file not found: {0}")]
    NotFound(String),

    #[error("failed to parse PDF: {0}")]
    Parse(String),
}

/// Text of a single physical page, in document order.
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based physical page number.
    pub page_number: u32,
    pub text: String,
    /// Set when this page failed to decode; `text` is empty in that case.
    pub error: Option<String>,
}

/// PDF page extractor backed by lopdf.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract text page by page, in physical order.
    pub fn extract_pages(&self, file_path: &Path) -> Result<Vec<PageText>, PdfError> {
        if !file_path.exists() {
            return Err(PdfError::NotFound(file_path.display().to_string()));
        }

        let doc = lopdf::Document::load(file_path)
            .map_err(|e| PdfError::Parse(e.to_string()))?;

        let mut pages = Vec::new();
        for (&page_number, _) in doc.get_pages().iter() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => pages.push(PageText {
                    page_number,
                    text,
                    error: None,
                }),
                Err(e) => {
                    warn!(
                        page = page_number,
                        file = %file_path.display(),
                        error = %e,
                        "failed to extract page text"
                    );
                    pages.push(PageText {
                        page_number,
                        text: String::new(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        Ok(pages)
    }

    /// Page count without extracting text. Returns 0 when the document
    /// cannot be opened.
    pub fn page_count(&self, file_path: &Path) -> u32 {
        match lopdf::Document::load(file_path) {
            Ok(doc) => doc.get_pages().len() as u32,
            Err(e) => {
                warn!(file = %file_path.display(), error = %e, "could not count pages");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn write_test_pdf(path: &Path, pages: &[&[&str]]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (i, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![50.into(), (750 - (i as i64) * 14).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("encode content"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).expect("save test pdf");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let extractor = PdfExtractor::new();
        let err = extractor
            .extract_pages(Path::new("/no/such/edition.pdf"))
            .unwrap_err();
        assert!(matches!(err, PdfError::NotFound(_)));
    }

    #[test]
    fn test_garbage_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not a pdf at all").unwrap();

        let extractor = PdfExtractor::new();
        let err = extractor.extract_pages(&path).unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_extracts_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edition.pdf");
        write_test_pdf(
            &path,
            &[&["primera pagina linea uno"], &["segunda pagina linea uno"]],
        );

        let extractor = PdfExtractor::new();
        let pages = extractor.extract_pages(&path).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
        assert!(pages[0].text.contains("primera pagina"));
        assert!(pages[1].text.contains("segunda pagina"));
        assert!(pages[0].error.is_none());
    }

    #[test]
    fn test_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edition.pdf");
        write_test_pdf(&path, &[&["uno"], &["dos"], &["tres"]]);

        let extractor = PdfExtractor::new();
        assert_eq!(extractor.page_count(&path), 3);
        assert_eq!(extractor.page_count(Path::new("/no/such.pdf")), 0);
    }
}
