//! Zoom and pan state for PDF rendering
//!
//! Manages the zoom factor and the canvas scroll position. Horizontal pan is
//! measured in canvas pixels (one per terminal column), vertical pan in
//! terminal rows.

use super::types::HitRect;

/// Scroll/pan direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Zoom and pan state for PDF viewing
#[derive(Debug, Clone, PartialEq)]
pub struct Zoom {
    /// Current zoom factor (1.0 = page fitted to the viewport)
    pub factor: f32,

    /// Multiplier applied per zoom step
    pub rate: f32,

    /// Horizontal scroll offset in canvas pixels from the left edge
    pub pan_x: u32,

    /// Vertical scroll offset in terminal rows from the top edge
    pub pan_y: u32,
}

impl Default for Zoom {
    fn default() -> Self {
        Self::with_rate(Self::DEFAULT_RATE)
    }
}

impl Zoom {
    /// Zoom rate per step - 25%
    pub const DEFAULT_RATE: f32 = 1.25;
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f32 = 0.1;
    /// Maximum allowed zoom factor
    pub const MAX_SCALE: f32 = 10.0;

    /// Pan step in pixels for horizontal movement
    pub const PAN_STEP_X: u32 = 4;
    /// Pan step in rows for vertical movement
    pub const PAN_STEP_Y: u32 = 2;

    #[must_use]
    pub fn with_rate(rate: f32) -> Self {
        let rate = if rate.is_finite() && rate > 1.0 {
            rate
        } else {
            Self::DEFAULT_RATE
        };
        Self {
            factor: 1.0,
            rate,
            pan_x: 0,
            pan_y: 0,
        }
    }

    /// Returns the current zoom factor
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Zoom in by one step
    pub fn step_in(&mut self) {
        self.factor = Self::clamp_factor(self.factor * self.rate);
    }

    /// Zoom out by one step
    pub fn step_out(&mut self) {
        self.factor = Self::clamp_factor(self.factor / self.rate);
    }

    /// Set an explicit zoom factor
    pub fn set_factor(&mut self, factor: f32) {
        self.factor = Self::clamp_factor(factor);
    }

    /// Back to 100% and top-left
    pub fn reset(&mut self) {
        self.factor = 1.0;
        self.pan_x = 0;
        self.pan_y = 0;
    }

    /// Pan one step in the given direction
    pub fn pan(&mut self, direction: ScrollDirection) {
        match direction {
            ScrollDirection::Up => self.pan_y = self.pan_y.saturating_sub(Self::PAN_STEP_Y),
            ScrollDirection::Down => self.pan_y = self.pan_y.saturating_add(Self::PAN_STEP_Y),
            ScrollDirection::Left => self.pan_x = self.pan_x.saturating_sub(Self::PAN_STEP_X),
            ScrollDirection::Right => self.pan_x = self.pan_x.saturating_add(Self::PAN_STEP_X),
        }
    }

    /// Keep the pan offsets inside the scrollable range.
    ///
    /// `content` is (width in pixels, height in rows), `viewport` is
    /// (width in columns, height in rows).
    pub fn clamp_pan(&mut self, content: (u32, u32), viewport: (u16, u16)) {
        let max_x = content.0.saturating_sub(u32::from(viewport.0));
        let max_y = content.1.saturating_sub(u32::from(viewport.1));
        self.pan_x = self.pan_x.min(max_x);
        self.pan_y = self.pan_y.min(max_y);
    }

    /// Scroll to the top of the page
    pub fn scroll_to_top(&mut self) {
        self.pan_y = 0;
    }

    /// Scroll the minimum amount needed to bring `rect` into view.
    ///
    /// `rect` is in canvas pixels; when it is larger than the viewport its
    /// top-left corner wins.
    pub fn reveal(&mut self, rect: &HitRect, viewport: (u16, u16)) {
        let (view_w, view_h) = (u32::from(viewport.0), u32::from(viewport.1));

        let left = rect.x0.max(0.0).floor() as u32;
        let right = rect.x1.max(0.0).ceil() as u32;
        if right > self.pan_x + view_w {
            self.pan_x = right.saturating_sub(view_w);
        }
        if left < self.pan_x {
            self.pan_x = left;
        }

        let top = (rect.y0.max(0.0) / 2.0).floor() as u32;
        let bottom = (rect.y1.max(0.0) / 2.0).ceil() as u32;
        if bottom > self.pan_y + view_h {
            self.pan_y = bottom.saturating_sub(view_h);
        }
        if top < self.pan_y {
            self.pan_y = top;
        }
    }

    /// Clamp factor to valid range, handling NaN/Inf
    pub fn clamp_factor(factor: f32) -> f32 {
        if !factor.is_finite() {
            1.0
        } else {
            factor.clamp(Self::MIN_SCALE, Self::MAX_SCALE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_steps_are_symmetric() {
        let mut zoom = Zoom::default();
        zoom.step_in();
        assert!((zoom.factor() - 1.25).abs() < f32::EPSILON);
        zoom.step_out();
        assert!((zoom.factor() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut zoom = Zoom::default();
        for _ in 0..100 {
            zoom.step_in();
        }
        assert_eq!(zoom.factor(), Zoom::MAX_SCALE);

        for _ in 0..200 {
            zoom.step_out();
        }
        assert_eq!(zoom.factor(), Zoom::MIN_SCALE);
    }

    #[test]
    fn clamp_factor_handles_non_finite() {
        assert_eq!(Zoom::clamp_factor(f32::NAN), 1.0);
        assert_eq!(Zoom::clamp_factor(f32::INFINITY), 1.0);
        assert_eq!(Zoom::clamp_factor(0.0), Zoom::MIN_SCALE);
    }

    #[test]
    fn invalid_rate_falls_back_to_default() {
        assert_eq!(Zoom::with_rate(0.5).rate, Zoom::DEFAULT_RATE);
        assert_eq!(Zoom::with_rate(f32::NAN).rate, Zoom::DEFAULT_RATE);
        assert_eq!(Zoom::with_rate(2.0).rate, 2.0);
    }

    #[test]
    fn pan_saturates_at_origin_and_clamps_to_content() {
        let mut zoom = Zoom::default();
        zoom.pan(ScrollDirection::Up);
        zoom.pan(ScrollDirection::Left);
        assert_eq!((zoom.pan_x, zoom.pan_y), (0, 0));

        for _ in 0..50 {
            zoom.pan(ScrollDirection::Down);
            zoom.pan(ScrollDirection::Right);
        }
        zoom.clamp_pan((120, 60), (80, 20));
        assert_eq!((zoom.pan_x, zoom.pan_y), (40, 40));

        // Content smaller than the viewport cannot scroll at all
        zoom.clamp_pan((50, 10), (80, 20));
        assert_eq!((zoom.pan_x, zoom.pan_y), (0, 0));
    }

    #[test]
    fn reveal_scrolls_down_to_rect_below_viewport() {
        let mut zoom = Zoom::default();
        // Rows 50..55 with a 20 row viewport
        zoom.reveal(&HitRect::new(10.0, 100.0, 30.0, 110.0), (80, 20));
        assert_eq!(zoom.pan_y, 35);
        assert_eq!(zoom.pan_x, 0);
    }

    #[test]
    fn reveal_scrolls_back_up_and_left() {
        let mut zoom = Zoom {
            pan_x: 100,
            pan_y: 100,
            ..Zoom::default()
        };
        zoom.reveal(&HitRect::new(10.0, 20.0, 30.0, 24.0), (80, 20));
        assert_eq!(zoom.pan_y, 10);
        assert_eq!(zoom.pan_x, 10);
    }
}
