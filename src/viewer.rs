//! Document session
//!
//! Owns the open document, the view state (page, zoom, scroll), the search
//! hits and the rendered page cache. Everything runs on the UI thread:
//! pages are rendered on demand when drawn and kept in the LRU cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use ratatui::layout::Rect;

use crate::pdf::{
    CacheKey, Command, DocumentError, Effect, HitRect, MupdfDocument, PageCache, PageImage,
    PageSource, ScrollDirection, SearchHit, ViewState,
};
use crate::search::SearchState;

pub struct Viewer {
    source: Option<Box<dyn PageSource>>,
    path: Option<PathBuf>,
    state: ViewState,
    search: SearchState,
    cache: PageCache,
    current: Option<Arc<PageImage>>,
    pending_reveal: Option<HitRect>,
}

impl Viewer {
    #[must_use]
    pub fn new(cache_size: usize, zoom_rate: f32) -> Self {
        Self {
            source: None,
            path: None,
            state: ViewState::new(zoom_rate),
            search: SearchState::new(),
            cache: PageCache::new(cache_size),
            current: None,
            pending_reveal: None,
        }
    }

    /// Open a PDF from disk, replacing the current document.
    ///
    /// On failure the current document stays open.
    pub fn open(&mut self, path: &Path) -> Result<(), DocumentError> {
        let doc = MupdfDocument::open(path)?;
        self.load(Box::new(doc), path.to_path_buf());
        Ok(())
    }

    /// Start a new session on an already opened document
    pub fn load(&mut self, source: Box<dyn PageSource>, path: PathBuf) {
        let page_count = source.page_count();
        info!("Loaded {path:?} with {page_count} pages");

        self.source = Some(source);
        self.path = Some(path);
        self.search.clear();
        self.pending_reveal = None;
        self.apply_command(Command::SetDocument { page_count });
    }

    #[must_use]
    pub fn has_document(&self) -> bool {
        self.source.is_some()
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.source.as_ref().and_then(|source| source.title())
    }

    #[must_use]
    pub fn page_index(&self) -> usize {
        self.state.page_index
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.state.page_count
    }

    #[must_use]
    pub fn zoom_factor(&self) -> f32 {
        self.state.zoom.factor()
    }

    /// Scroll position as (pixels from left, rows from top)
    #[must_use]
    pub fn pan(&self) -> (u32, u32) {
        (self.state.zoom.pan_x, self.state.zoom.pan_y)
    }

    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    #[must_use]
    pub fn search(&self) -> &SearchState {
        &self.search
    }

    #[must_use]
    pub fn page_label(&self) -> String {
        if self.has_document() {
            format!("Page: {}/{}", self.state.page_index + 1, self.state.page_count)
        } else {
            "Page: 0/0".to_string()
        }
    }

    /// Apply a command to the view state, returns true if anything changed
    pub fn apply_command(&mut self, cmd: Command) -> bool {
        let effects = self.state.apply(cmd);
        let changed = !effects.is_empty();
        self.execute_effects(effects);
        changed
    }

    fn execute_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::InvalidateCache => {
                    self.cache.invalidate_all();
                    self.current = None;
                }

                Effect::RenderCurrentPage => {
                    self.current = None;
                }

                Effect::ClampPan => self.clamp_pan(),
            }
        }
    }

    fn clamp_pan(&mut self) {
        if let Some(image) = &self.current {
            let area = self.state.area;
            self.state.zoom.clamp_pan(
                (image.width_px, image.height_rows()),
                (area.width, area.height),
            );
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.apply_command(Command::NextPage)
    }

    pub fn prev_page(&mut self) -> bool {
        self.apply_command(Command::PrevPage)
    }

    pub fn first_page(&mut self) -> bool {
        self.apply_command(Command::FirstPage)
    }

    pub fn last_page(&mut self) -> bool {
        self.apply_command(Command::LastPage)
    }

    /// Jump to a 1-based page number; numbers outside `1..=page_count` are ignored
    pub fn go_to_page(&mut self, number: usize) -> bool {
        if number == 0 || number > self.state.page_count {
            debug!("Ignoring page number {number}");
            return false;
        }
        self.apply_command(Command::GoToPage(number - 1))
    }

    pub fn zoom_in(&mut self) -> bool {
        self.apply_command(Command::ZoomIn)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.apply_command(Command::ZoomOut)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.apply_command(Command::ResetZoom)
    }

    pub fn set_zoom(&mut self, factor: f32) -> bool {
        self.apply_command(Command::SetZoom(factor))
    }

    pub fn scroll(&mut self, direction: ScrollDirection) -> bool {
        self.apply_command(Command::Pan(direction))
    }

    /// Update the canvas viewport
    pub fn set_area(&mut self, area: Rect) -> bool {
        self.apply_command(Command::SetArea(area))
    }

    /// Search every page for `query` and jump to the first hit.
    ///
    /// Previous results are discarded. Returns the number of hits.
    pub fn find(&mut self, query: &str) -> usize {
        let Some(source) = self.source.as_ref() else {
            return 0;
        };
        if query.is_empty() {
            return 0;
        }

        self.search.clear();
        self.pending_reveal = None;

        let mut hits = Vec::new();
        for page in 0..source.page_count() {
            match source.search_page(page, query) {
                Ok(rects) => hits.extend(rects.into_iter().map(|rect| SearchHit { page, rect })),
                Err(e) => warn!("Search failed on page {page}: {e}"),
            }
        }

        let count = hits.len();
        info!("Found {count} hits for {query:?}");
        self.search.set_results(hits);
        if count > 0 {
            self.jump_to_current_hit();
        }
        count
    }

    pub fn next_hit(&mut self) -> bool {
        if self.search.next().is_none() {
            return false;
        }
        self.jump_to_current_hit();
        true
    }

    pub fn prev_hit(&mut self) -> bool {
        if self.search.previous().is_none() {
            return false;
        }
        self.jump_to_current_hit();
        true
    }

    pub fn clear_search(&mut self) -> bool {
        if self.search.is_empty() {
            return false;
        }
        self.search.clear();
        self.pending_reveal = None;
        true
    }

    fn jump_to_current_hit(&mut self) {
        let Some(hit) = self.search.current_hit().copied() else {
            return;
        };
        self.apply_command(Command::GoToPage(hit.page));
        self.pending_reveal = Some(hit.rect);
        if self.current.is_some() {
            self.reveal_pending();
        }
    }

    fn reveal_pending(&mut self) {
        let Some(image) = &self.current else {
            return;
        };
        if let Some(rect) = self.pending_reveal.take() {
            let area = self.state.area;
            self.state
                .zoom
                .reveal(&rect.scaled(image.scale), (area.width, area.height));
            self.clamp_pan();
        }
    }

    /// Rendered image for the current page, rendering it if needed.
    ///
    /// `Ok(None)` when no document is open or the viewport is empty.
    pub fn render_current(&mut self) -> Result<Option<Arc<PageImage>>, DocumentError> {
        let Some(source) = self.source.as_ref() else {
            return Ok(None);
        };
        let area = self.state.area;
        if area.width == 0 || area.height == 0 {
            return Ok(None);
        }

        let page = self.state.page_index;
        let params = self.state.render_params();
        let key = CacheKey::from_params(page, &params);

        let image = match self.cache.get(&key) {
            Some(image) => image,
            None => {
                let rendered = source.render(page, &params)?;
                self.cache.insert(key, rendered)
            }
        };

        self.current = Some(Arc::clone(&image));
        self.clamp_pan();
        self.reveal_pending();
        Ok(Some(image))
    }

    /// Last rendered image, if it is still valid for the current state
    #[must_use]
    pub fn current_image(&self) -> Option<&Arc<PageImage>> {
        self.current.as_ref()
    }

    /// Hits on the current page in canvas pixels, flagged when current
    #[must_use]
    pub fn highlights(&self) -> Vec<(bool, HitRect)> {
        let Some(image) = &self.current else {
            return Vec::new();
        };
        self.search
            .on_page(self.state.page_index)
            .map(|(is_current, rect)| (is_current, rect.scaled(image.scale)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::FakeDocument;

    fn viewer_with(doc: FakeDocument) -> Viewer {
        let mut viewer = Viewer::new(8, 1.25);
        viewer.set_area(Rect::new(0, 1, 80, 20));
        viewer.load(Box::new(doc), PathBuf::from("fake.pdf"));
        viewer
    }

    #[test]
    fn empty_viewer_reports_no_document() {
        let mut viewer = Viewer::new(8, 1.25);
        assert!(!viewer.has_document());
        assert_eq!(viewer.page_label(), "Page: 0/0");
        assert!(!viewer.next_page());
        assert!(!viewer.zoom_in());
        assert_eq!(viewer.find("anything"), 0);
        assert!(viewer.render_current().unwrap().is_none());
    }

    #[test]
    fn load_starts_at_first_page() {
        let viewer = viewer_with(FakeDocument::with_pages(&["one", "two", "three"]));
        assert_eq!(viewer.page_index(), 0);
        assert_eq!(viewer.page_count(), 3);
        assert_eq!(viewer.page_label(), "Page: 1/3");
        assert_eq!(viewer.path(), Some(Path::new("fake.pdf")));
    }

    #[test]
    fn go_to_page_is_one_based_and_range_checked() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["a", "b", "c"]));
        assert!(viewer.go_to_page(3));
        assert_eq!(viewer.page_index(), 2);
        assert!(!viewer.go_to_page(0));
        assert!(!viewer.go_to_page(4));
        assert_eq!(viewer.page_index(), 2);
    }

    #[test]
    fn renders_are_cached_per_page_and_zoom() {
        let doc = FakeDocument::with_pages(&["a", "b"]);
        let renders = doc.render_counter();
        let mut viewer = viewer_with(doc);

        viewer.render_current().unwrap();
        viewer.render_current().unwrap();
        assert_eq!(renders.get(), 1);

        viewer.next_page();
        viewer.render_current().unwrap();
        viewer.prev_page();
        viewer.render_current().unwrap();
        assert_eq!(renders.get(), 2);

        viewer.zoom_in();
        viewer.render_current().unwrap();
        assert_eq!(renders.get(), 3);
    }

    #[test]
    fn find_collects_hits_in_page_order_and_jumps_to_first() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&[
            "nothing here",
            "a needle and another needle",
            "one more needle",
        ]));

        assert_eq!(viewer.find("needle"), 3);
        assert_eq!(viewer.page_index(), 1);

        let pages: Vec<usize> = viewer.search().hits.iter().map(|h| h.page).collect();
        assert_eq!(pages, vec![1, 1, 2]);

        assert!(viewer.next_hit());
        assert_eq!(viewer.page_index(), 1);
        assert!(viewer.next_hit());
        assert_eq!(viewer.page_index(), 2);
        assert!(viewer.next_hit());
        assert_eq!(viewer.page_index(), 1);
    }

    #[test]
    fn find_without_matches_clears_previous_results() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["alpha", "beta"]));
        assert_eq!(viewer.find("beta"), 1);
        assert_eq!(viewer.find("gamma"), 0);
        assert!(viewer.search().is_empty());
        // Stays on the page of the last successful jump
        assert_eq!(viewer.page_index(), 1);
    }

    #[test]
    fn highlights_are_scaled_to_the_rendered_image() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["find me"]));
        viewer.find("me");
        let image = viewer.render_current().unwrap().unwrap();

        let highlights = viewer.highlights();
        assert_eq!(highlights.len(), 1);
        let (is_current, rect) = highlights[0];
        assert!(is_current);
        let original = viewer.search().hits[0].rect;
        assert!((rect.x0 - original.x0 * image.scale).abs() < 1e-4);
    }

    #[test]
    fn opening_a_new_document_clears_the_session() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["x", "y", "z"]));
        viewer.find("z");
        viewer.zoom_in();
        assert_eq!(viewer.page_index(), 2);

        viewer.load(
            Box::new(FakeDocument::with_pages(&["new"])),
            PathBuf::from("other.pdf"),
        );
        assert_eq!(viewer.page_index(), 0);
        assert_eq!(viewer.zoom_factor(), 1.0);
        assert!(viewer.search().is_empty());
        assert_eq!(viewer.page_label(), "Page: 1/1");
    }

    #[test]
    fn failed_open_keeps_current_document() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["keep", "me"]));
        viewer.next_page();

        assert!(viewer.open(Path::new("/no/such/file.pdf")).is_err());
        assert_eq!(viewer.path(), Some(Path::new("fake.pdf")));
        assert_eq!(viewer.page_index(), 1);
    }

    #[test]
    fn render_errors_propagate() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["bad"]).failing_render());
        assert!(viewer.render_current().is_err());
    }

    #[test]
    fn scrolling_is_clamped_to_rendered_page() {
        let mut viewer = viewer_with(FakeDocument::with_pages(&["tall"]));
        let image = viewer.render_current().unwrap().unwrap();
        for _ in 0..500 {
            viewer.scroll(ScrollDirection::Down);
        }
        let max_rows = image.height_rows().saturating_sub(20);
        assert_eq!(viewer.pan().1, max_rows);
    }
}
