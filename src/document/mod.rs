//! Document viewer surface backed by `lopdf`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Failed to load document: {0}")]
    Load(String),

    #[error("Document has no pages")]
    NoPages,

    #[error("Page {page} is out of range (document has {count} pages)")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("Failed to render page {page}: {reason}")]
    Extract { page: u32, reason: String },
}

#[derive(Clone)]
pub struct PdfViewer {
    path: PathBuf,
    document: Arc<lopdf::Document>,
    page_count: u32,
    current_page: u32,
    page_text: String,
}

impl fmt::Debug for PdfViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PdfViewer")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .field("current_page", &self.current_page)
            .finish_non_exhaustive()
    }
}

impl PdfViewer {
    /// Load `path` off the UI executor and render its first page.
    pub async fn open(path: PathBuf) -> Result<Self, RenderError> {
        tokio::task::spawn_blocking(move || {
            let document =
                lopdf::Document::load(&path).map_err(|e| RenderError::Load(e.to_string()))?;
            Self::from_document(path, document)
        })
        .await
        .map_err(|e| RenderError::Load(format!("load task failed: {}", e)))?
    }

    pub fn from_document(path: PathBuf, document: lopdf::Document) -> Result<Self, RenderError> {
        let page_count = document.get_pages().len() as u32;
        if page_count == 0 {
            return Err(RenderError::NoPages);
        }

        let mut viewer = Self {
            path,
            document: Arc::new(document),
            page_count,
            current_page: 0,
            page_text: String::new(),
        };
        viewer.go_to(1)?;

        tracing::info!(path = %viewer.path.display(), pages = page_count, "document opened");
        Ok(viewer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// 1-based.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn text(&self) -> &str {
        &self.page_text
    }

    pub fn go_to(&mut self, page: u32) -> Result<(), RenderError> {
        if page == 0 || page > self.page_count {
            return Err(RenderError::PageOutOfRange {
                page,
                count: self.page_count,
            });
        }

        let text = self
            .document
            .extract_text(&[page])
            .map_err(|e| RenderError::Extract {
                page,
                reason: e.to_string(),
            })?;

        self.current_page = page;
        self.page_text = text;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), RenderError> {
        if self.current_page >= self.page_count {
            return Ok(());
        }
        self.go_to(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> Result<(), RenderError> {
        if self.current_page <= 1 {
            return Ok(());
        }
        self.go_to(self.current_page - 1)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    pub(crate) fn sample_pdf(pages: u32) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for n in 1..=pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(format!("Page {}", n))]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages_dict));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[tokio::test]
    async fn test_open_saved_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf.pdf");
        sample_pdf(2).save(&path).unwrap();

        let viewer = PdfViewer::open(path.clone()).await.unwrap();
        assert_eq!(viewer.path(), path.as_path());
        assert_eq!(viewer.page_count(), 2);
        assert_eq!(viewer.current_page(), 1);
    }

    #[tokio::test]
    async fn test_open_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf.pdf");
        std::fs::write(&path, b"<html>502 Bad Gateway</html>").unwrap();

        assert!(matches!(
            PdfViewer::open(path).await,
            Err(RenderError::Load(_))
        ));
    }

    #[test]
    fn test_page_navigation_stays_in_bounds() {
        let mut viewer = PdfViewer::from_document(PathBuf::from("pdf.pdf"), sample_pdf(2)).unwrap();

        viewer.previous_page().unwrap();
        assert_eq!(viewer.current_page(), 1);
        viewer.next_page().unwrap();
        assert_eq!(viewer.current_page(), 2);
        viewer.next_page().unwrap();
        assert_eq!(viewer.current_page(), 2);
    }

    #[test]
    fn test_go_to_out_of_range_is_render_error() {
        let mut viewer = PdfViewer::from_document(PathBuf::from("pdf.pdf"), sample_pdf(1)).unwrap();
        assert_eq!(
            viewer.go_to(3),
            Err(RenderError::PageOutOfRange { page: 3, count: 1 })
        );
        assert_eq!(viewer.current_page(), 1);
    }

    #[test]
    fn test_document_without_pages() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        assert!(matches!(
            PdfViewer::from_document(PathBuf::from("empty.pdf"), doc),
            Err(RenderError::NoPages)
        ));
    }
}
