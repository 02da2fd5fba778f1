use crate::pdf::{HitRect, SearchHit};

/// Document search results
/// Hits are collected for every page on Find and cycled with "n"/"N"
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub hits: Vec<SearchHit>,
    pub current: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the results of the previous search
    pub fn set_results(&mut self, hits: Vec<SearchHit>) {
        self.hits = hits;
        self.current = 0;
    }

    pub fn clear(&mut self) {
        self.hits.clear();
        self.current = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn current_hit(&self) -> Option<&SearchHit> {
        self.hits.get(self.current)
    }

    /// Advance to the next hit, wrapping around
    pub fn next(&mut self) -> Option<&SearchHit> {
        if self.hits.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.hits.len();
        self.current_hit()
    }

    /// Go back to the previous hit, wrapping around
    pub fn previous(&mut self) -> Option<&SearchHit> {
        if self.hits.is_empty() {
            return None;
        }
        self.current = self
            .current
            .checked_sub(1)
            .unwrap_or(self.hits.len() - 1);
        self.current_hit()
    }

    /// Hits on `page` as (is_current, rect) pairs
    pub fn on_page(&self, page: usize) -> impl Iterator<Item = (bool, &HitRect)> + '_ {
        self.hits
            .iter()
            .enumerate()
            .filter(move |(_, hit)| hit.page == page)
            .map(|(idx, hit)| (idx == self.current, &hit.rect))
    }

    /// "3/12" style position for the status bar
    pub fn position_label(&self) -> Option<String> {
        if self.hits.is_empty() {
            None
        } else {
            Some(format!("{}/{}", self.current + 1, self.hits.len()))
        }
    }
}
