//! PDF rendering infrastructure

mod cache;
mod document;
mod error;
mod render;
mod search;
mod state;
mod types;
mod zoom;

pub use cache::{CacheKey, PageCache};
pub use document::{MupdfDocument, PageSource, normalize_path};
pub use error::DocumentError;
pub use render::{MAX_RASTER_DIMENSION, RasterSpec, RenderParams, downsample};
pub use state::{Command, Effect, ViewState};
pub use types::*;
pub use zoom::*;

/// Rendered pages kept around for quick back-and-forth navigation
pub const DEFAULT_CACHE_SIZE: usize = 16;
