//! LRU page cache for rendered PDF pages

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::render::RenderParams;
use super::types::PageImage;

/// Cache key for rendered pages
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number
    pub page: usize,
    /// Viewport width
    pub area_width: u16,
    /// Viewport height
    pub area_height: u16,
    /// Zoom factor (stored as millionths for stable hashing)
    pub scale_millionths: u32,
}

impl CacheKey {
    /// Create a cache key from render parameters
    #[must_use]
    pub fn from_params(page: usize, params: &RenderParams) -> Self {
        Self {
            page,
            area_width: params.area.width,
            area_height: params.area.height,
            scale_millionths: (params.scale * 1_000_000.0) as u32,
        }
    }
}

/// LRU cache for rendered pages
pub struct PageCache {
    cache: LruCache<CacheKey, Arc<PageImage>>,
}

impl PageCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Get a cached page, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<PageImage>> {
        self.cache.get(key).cloned()
    }

    /// Check if a key is in the cache without promoting it
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a page into the cache, returning an Arc to the data
    pub fn insert(&mut self, key: CacheKey, data: PageImage) -> Arc<PageImage> {
        let arc = Arc::new(data);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached pages
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::super::CellSize;
    use super::*;

    fn test_params() -> RenderParams {
        RenderParams {
            area: Rect::new(0, 0, 100, 50),
            scale: 1.0,
            cell_size: CellSize::HALF_BLOCK,
        }
    }

    fn test_image(page: usize) -> PageImage {
        PageImage {
            pixels: vec![0; 300],
            width_px: 10,
            height_px: 10,
            page,
            scale: 1.0,
        }
    }

    #[test]
    fn cache_insert_and_get() {
        let mut cache = PageCache::new(10);
        let key = CacheKey::from_params(0, &test_params());

        cache.insert(key.clone(), test_image(0));

        assert!(cache.contains(&key));
        assert_eq!(cache.get(&key).map(|img| img.page), Some(0));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_lru_eviction() {
        let mut cache = PageCache::new(2);
        let params = test_params();

        for i in 0..3 {
            cache.insert(CacheKey::from_params(i, &params), test_image(i));
        }

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&CacheKey::from_params(0, &params)));
        assert!(cache.contains(&CacheKey::from_params(1, &params)));
        assert!(cache.contains(&CacheKey::from_params(2, &params)));
    }

    #[test]
    fn zoom_level_is_part_of_the_key() {
        let mut cache = PageCache::new(10);
        let params = test_params();
        cache.insert(CacheKey::from_params(0, &params), test_image(0));

        let zoomed = RenderParams {
            scale: 1.25,
            ..params
        };
        assert!(!cache.contains(&CacheKey::from_params(0, &zoomed)));
    }

    #[test]
    fn cache_invalidate_all() {
        let mut cache = PageCache::new(10);
        let params = test_params();

        for i in 0..5 {
            cache.insert(CacheKey::from_params(i, &params), test_image(i));
        }

        assert_eq!(cache.len(), 5);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_still_holds_one_page() {
        let mut cache = PageCache::new(0);
        cache.insert(CacheKey::from_params(3, &test_params()), test_image(3));
        assert_eq!(cache.len(), 1);
    }
}
