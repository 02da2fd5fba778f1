//! Document handle backed by MuPDF

use std::path::{Path, PathBuf};

use log::{debug, info};
use mupdf::{Document, MetadataName, Page};

use super::error::DocumentError;
use super::render::{self, RenderParams};
use super::search;
use super::types::{HitRect, PageImage, PageSize};

/// Everything the viewer needs from an open document
pub trait PageSource {
    /// Number of pages, always at least one
    fn page_count(&self) -> usize;

    /// Document title from the metadata, if any
    fn title(&self) -> Option<&str>;

    /// Page size in points
    fn page_size(&self, page: usize) -> Result<PageSize, DocumentError>;

    /// Rasterize a page for the given viewport and zoom
    fn render(&self, page: usize, params: &RenderParams) -> Result<PageImage, DocumentError>;

    /// Rectangles (page space) of every match of `query` on `page`
    fn search_page(&self, page: usize, query: &str) -> Result<Vec<HitRect>, DocumentError>;
}

/// Windows needs the `\\?\` prefix for paths longer than `MAX_PATH`
#[cfg(windows)]
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let raw = absolute.to_string_lossy();
    if raw.starts_with(r"\\?\") {
        absolute
    } else {
        PathBuf::from(format!(r"\\?\{raw}"))
    }
}

#[cfg(not(windows))]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.to_path_buf()
}

/// An open PDF document
pub struct MupdfDocument {
    doc: Document,
    page_count: usize,
    title: Option<String>,
}

impl MupdfDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let normalized = normalize_path(path);
        let doc = Document::open(normalized.to_string_lossy().as_ref())?;

        if doc.needs_password()? {
            return Err(DocumentError::Encrypted);
        }

        let page_count = usize::try_from(doc.page_count()?).unwrap_or(0);
        if page_count == 0 {
            return Err(DocumentError::Empty);
        }

        let title = doc
            .metadata(MetadataName::Title)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        info!("Opened {path:?}: {page_count} pages, title {title:?}");

        Ok(Self {
            doc,
            page_count,
            title,
        })
    }

    fn load_page(&self, page: usize) -> Result<Page, DocumentError> {
        if page >= self.page_count {
            return Err(DocumentError::PageOutOfRange {
                page,
                page_count: self.page_count,
            });
        }
        Ok(self.doc.load_page(page as i32)?)
    }
}

impl PageSource for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn page_size(&self, page: usize) -> Result<PageSize, DocumentError> {
        render::page_size(&self.load_page(page)?)
    }

    fn render(&self, page: usize, params: &RenderParams) -> Result<PageImage, DocumentError> {
        let loaded = self.load_page(page)?;
        render::render_page(&loaded, page, params)
    }

    fn search_page(&self, page: usize, query: &str) -> Result<Vec<HitRect>, DocumentError> {
        let loaded = self.load_page(page)?;
        let hits = search::search_page(&loaded, query)?;
        debug!("Page {page}: {} hits for {query:?}", hits.len());
        Ok(hits)
    }
}
