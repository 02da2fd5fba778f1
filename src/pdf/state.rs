//! View state management

use ratatui::layout::Rect;

use super::CellSize;
use super::render::RenderParams;
use super::zoom::{ScrollDirection, Zoom};

/// Current view of a PDF document
#[derive(Clone, Debug)]
pub struct ViewState {
    /// Current canvas viewport area
    pub area: Rect,

    /// Current page (0-indexed)
    pub page_index: usize,

    /// Total page count, 0 while no document is open
    pub page_count: usize,

    /// Zoom factor and scroll position
    pub zoom: Zoom,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(Zoom::DEFAULT_RATE)
    }
}

impl ViewState {
    #[must_use]
    pub fn new(zoom_rate: f32) -> Self {
        Self {
            area: Rect::default(),
            page_index: 0,
            page_count: 0,
            zoom: Zoom::with_rate(zoom_rate),
        }
    }

    #[must_use]
    pub fn has_document(&self) -> bool {
        self.page_count > 0
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::SetDocument { page_count } => {
                self.page_count = page_count;
                self.page_index = 0;
                self.zoom.reset();
                vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
            }

            Command::SetArea(area) => {
                if self.area != area {
                    self.area = area;
                    vec![Effect::InvalidateCache, Effect::RenderCurrentPage]
                } else {
                    vec![]
                }
            }

            _ if !self.has_document() => vec![],

            Command::NextPage => self.move_to(self.page_index + 1),

            Command::PrevPage => match self.page_index.checked_sub(1) {
                Some(page) => self.move_to(page),
                None => vec![],
            },

            Command::FirstPage => self.move_to(0),

            Command::LastPage => self.move_to(self.page_count - 1),

            Command::GoToPage(page) => self.move_to(page),

            Command::ZoomIn => self.set_zoom(|zoom| zoom.step_in()),

            Command::ZoomOut => self.set_zoom(|zoom| zoom.step_out()),

            Command::ResetZoom => self.set_zoom(|zoom| zoom.set_factor(1.0)),

            Command::SetZoom(factor) => self.set_zoom(|zoom| zoom.set_factor(factor)),

            Command::Pan(direction) => {
                let before = (self.zoom.pan_x, self.zoom.pan_y);
                self.zoom.pan(direction);
                if before != (self.zoom.pan_x, self.zoom.pan_y) {
                    vec![Effect::ClampPan]
                } else {
                    vec![]
                }
            }
        }
    }

    fn move_to(&mut self, page: usize) -> Vec<Effect> {
        if page >= self.page_count || page == self.page_index {
            return vec![];
        }
        self.page_index = page;
        self.zoom.scroll_to_top();
        vec![Effect::RenderCurrentPage]
    }

    fn set_zoom(&mut self, change: impl FnOnce(&mut Zoom)) -> Vec<Effect> {
        let before = self.zoom.factor();
        change(&mut self.zoom);
        if (self.zoom.factor() - before).abs() > f32::EPSILON {
            vec![Effect::RenderCurrentPage, Effect::ClampPan]
        } else {
            vec![]
        }
    }

    /// Get render parameters from current state
    #[must_use]
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            area: self.area,
            scale: self.zoom.factor(),
            cell_size: CellSize::HALF_BLOCK,
        }
    }
}

/// Commands that modify view state
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    /// A new document was opened
    SetDocument { page_count: usize },
    /// Set the canvas viewport area
    SetArea(Rect),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Go to a 0-indexed page; out of range pages are ignored
    GoToPage(usize),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    SetZoom(f32),
    /// Scroll the canvas
    Pan(ScrollDirection),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Invalidate entire cache
    InvalidateCache,
    /// The current page must be (re)rendered
    RenderCurrentPage,
    /// Scroll position must be clamped to the rendered page
    ClampPan,
}
