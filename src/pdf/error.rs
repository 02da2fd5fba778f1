/// Errors from the PDF engine seam
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("PDF engine: {0}")]
    Engine(#[from] mupdf::error::Error),

    #[error("document has no pages")]
    Empty,

    #[error("document is password protected")]
    Encrypted,

    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    #[error("{detail}")]
    Raster { detail: String },
}

impl DocumentError {
    pub fn raster(msg: impl Into<String>) -> Self {
        Self::Raster { detail: msg.into() }
    }
}
