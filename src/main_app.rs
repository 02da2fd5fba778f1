use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, error, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use crate::event_source::EventSource;
use crate::inputs::{Action, map_key, map_scroll};
use crate::settings;
use crate::theme::{Base16Palette, current_theme};
use crate::viewer::Viewer;
use crate::widget::file_dialog::{FileDialog, FileDialogAction};
use crate::widget::help_popup::{HelpPopup, HelpPopupAction};
use crate::widget::hud_message::{self, HudMessage};
use crate::widget::message_dialog::MessageDialog;
use crate::widget::page_canvas::{PageCanvas, render_empty, render_scrollbars};
use crate::widget::prompt::{Prompt, PromptAction, PromptKind};
use crate::widget::toolbar::{Toolbar, ToolbarButton};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

/// Modal popups; while one is open it receives all key input
pub enum Popup {
    FileDialog(FileDialog),
    Prompt(Prompt),
    Message(MessageDialog),
    Help(HelpPopup),
}

pub struct App {
    pub viewer: Viewer,
    popup: Option<Popup>,
    toolbar: Toolbar,
    hud: Option<HudMessage>,
    render_error: Option<String>,
    start_dir: PathBuf,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// App configured from the global settings
    pub fn new() -> Self {
        let start_dir = settings::get_start_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_config(
            settings::get_cache_size(),
            settings::get_zoom_step(),
            start_dir,
        )
    }

    pub fn with_config(cache_size: usize, zoom_rate: f32, start_dir: PathBuf) -> Self {
        Self {
            viewer: Viewer::new(cache_size, zoom_rate),
            popup: None,
            toolbar: Toolbar::new(),
            hud: None,
            render_error: None,
            start_dir,
        }
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn has_active_popup(&self) -> bool {
        self.popup.is_some()
    }

    pub fn hud_message(&self) -> Option<&HudMessage> {
        self.hud.as_ref()
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.hud = Some(HudMessage::info(message));
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.hud = Some(HudMessage::error(message));
    }

    /// Open a PDF, showing an error dialog on failure.
    ///
    /// The previous document stays open if the new one cannot be loaded.
    pub fn open_path(&mut self, path: &Path) -> bool {
        match self.viewer.open(path) {
            Ok(()) => {
                self.render_error = None;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                self.show_info(format!("Opened {name}"));
                true
            }
            Err(e) => {
                error!("Failed to open {path:?}: {e}");
                self.popup = Some(Popup::Message(MessageDialog::error(format!(
                    "Cannot open {}\n{e}",
                    path.display()
                ))));
                false
            }
        }
    }

    /// Open `path` and apply a starting page (1-based) and zoom factor.
    ///
    /// An out of range page leaves the document on its first page with a
    /// HUD hint.
    pub fn open_at(&mut self, path: &Path, page: Option<usize>, zoom: Option<f32>) -> bool {
        if !self.open_path(path) {
            return false;
        }
        if let Some(number) = page {
            self.go_to_page_number(number);
        }
        if let Some(factor) = zoom {
            self.viewer.set_zoom(factor);
        }
        true
    }

    /// Jump to a 1-based page, or show the valid range in the HUD
    fn go_to_page_number(&mut self, number: usize) {
        let max = self.viewer.page_count();
        if (1..=max).contains(&number) {
            self.viewer.go_to_page(number);
        } else {
            warn!("Page {number} is out of range 1..={max}");
            self.show_error(format!("Page must be between 1 and {max}"));
        }
    }

    /// Directory the Open dialog starts in
    fn dialog_dir(&self) -> PathBuf {
        self.viewer
            .path()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.start_dir.clone())
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<AppAction> {
        match event {
            Event::Key(key) => self.handle_key_event(*key),
            Event::Mouse(mouse) => {
                self.handle_mouse_event(*mouse);
                None
            }
            Event::Resize(width, height) => {
                self.handle_resize(*width, *height);
                None
            }
            _ => None,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppAction::Quit);
        }

        if self.popup.is_some() {
            self.handle_popup_key(key);
            return None;
        }

        map_key(&key).and_then(|action| self.perform(action))
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        let Some(popup) = self.popup.as_mut() else {
            return;
        };

        match popup {
            Popup::FileDialog(dialog) => match dialog.handle_key(key) {
                Some(FileDialogAction::Selected(path)) => {
                    self.popup = None;
                    self.open_path(&path);
                }
                Some(FileDialogAction::Cancel) => self.popup = None,
                None => {}
            },
            Popup::Prompt(prompt) => match prompt.handle_key(key) {
                Some(PromptAction::Submit(input)) => {
                    let kind = prompt.kind();
                    self.popup = None;
                    self.submit_prompt(kind, &input);
                }
                Some(PromptAction::Cancel) => self.popup = None,
                None => {}
            },
            Popup::Message(dialog) => {
                if dialog.handle_key(key) {
                    self.popup = None;
                }
            }
            Popup::Help(help) => {
                if let Some(HelpPopupAction::Close) = help.handle_key(key) {
                    self.popup = None;
                }
            }
        }
    }

    fn submit_prompt(&mut self, kind: PromptKind, input: &str) {
        match kind {
            PromptKind::Text => self.find(input),
            PromptKind::PageNumber { max } => match input.parse::<usize>() {
                Ok(number) => self.go_to_page_number(number),
                Err(_) => self.show_error(format!("Page must be between 1 and {max}")),
            },
        }
    }

    fn find(&mut self, query: &str) {
        let count = self.viewer.find(query);
        if count == 0 {
            self.popup = Some(Popup::Message(MessageDialog::info(
                "Find",
                "No matches found",
            )));
        } else {
            self.show_info(format!("{count} matches for \"{query}\""));
        }
    }

    fn perform(&mut self, action: Action) -> Option<AppAction> {
        debug!("Action {action:?}");
        let has_document = self.viewer.has_document();

        match action {
            Action::Quit => return Some(AppAction::Quit),
            Action::Open => {
                self.popup = Some(Popup::FileDialog(FileDialog::new(&self.dialog_dir())));
            }
            Action::Find if has_document => {
                self.popup = Some(Popup::Prompt(Prompt::find()));
            }
            Action::GoTo if has_document => {
                self.popup = Some(Popup::Prompt(Prompt::go_to_page(self.viewer.page_count())));
            }
            Action::Find | Action::GoTo => {}
            Action::NextPage => {
                self.viewer.next_page();
            }
            Action::PrevPage => {
                self.viewer.prev_page();
            }
            Action::FirstPage => {
                self.viewer.first_page();
            }
            Action::LastPage => {
                self.viewer.last_page();
            }
            Action::ZoomIn => {
                self.viewer.zoom_in();
            }
            Action::ZoomOut => {
                self.viewer.zoom_out();
            }
            Action::ResetZoom => {
                self.viewer.reset_zoom();
            }
            Action::NextHit => {
                self.viewer.next_hit();
            }
            Action::PrevHit => {
                self.viewer.prev_hit();
            }
            Action::ClearSearch => {
                self.viewer.clear_search();
            }
            Action::Scroll(direction) => {
                self.viewer.scroll(direction);
            }
            Action::Help => self.popup = Some(Popup::Help(HelpPopup::new())),
        }
        None
    }

    fn press_button(&mut self, button: ToolbarButton) {
        debug!("Toolbar button {button:?}");
        let action = match button {
            ToolbarButton::Open => Action::Open,
            ToolbarButton::Prev => Action::PrevPage,
            ToolbarButton::Next => Action::NextPage,
            ToolbarButton::ZoomIn => Action::ZoomIn,
            ToolbarButton::ZoomOut => Action::ZoomOut,
            ToolbarButton::Find => Action::Find,
            ToolbarButton::GoTo => Action::GoTo,
        };
        self.perform(action);
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.popup.is_some() {
            return;
        }

        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind {
            if let Some(button) = self.toolbar.button_at(mouse.column, mouse.row) {
                self.press_button(button);
            }
            return;
        }

        if let Some(direction) = map_scroll(&mouse) {
            let area = self.viewer.state().area;
            let position = ratatui::layout::Position::new(mouse.column, mouse.row);
            if area.contains(position) {
                self.viewer.scroll(direction);
            }
        }
    }

    /// Re-layout for the new terminal size; the page re-renders on the next draw
    pub fn handle_resize(&mut self, width: u16, height: u16) {
        debug!("Terminal resized to {width}x{height}");
        let [_, canvas_area, _] = screen_layout(Rect::new(0, 0, width, height));
        self.viewer.set_area(canvas_area);
    }

    /// Periodic housekeeping, returns true if a redraw is needed
    pub fn update(&mut self) -> bool {
        hud_message::expire(&mut self.hud)
    }

    pub fn draw(&mut self, f: &mut Frame) {
        let palette = current_theme();
        let [toolbar_area, canvas_area, status_area] = screen_layout(f.area());

        self.viewer.set_area(canvas_area);
        self.draw_canvas(f, canvas_area, palette);

        self.toolbar.render(
            f,
            toolbar_area,
            &self.viewer.page_label(),
            self.viewer.has_document(),
            palette,
        );
        self.draw_status(f, status_area, palette);

        let area = f.area();
        match self.popup.as_mut() {
            Some(Popup::FileDialog(dialog)) => dialog.render(f, area, palette),
            Some(Popup::Prompt(prompt)) => prompt.render(f, area, palette),
            Some(Popup::Message(dialog)) => dialog.render(f, area, palette),
            Some(Popup::Help(help)) => help.render(f, area, palette),
            None => {}
        }
    }

    fn draw_canvas(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        match self.viewer.render_current() {
            Ok(Some(image)) => {
                self.render_error = None;
                let pan = self.viewer.pan();
                let highlights = self.viewer.highlights();
                f.render_widget(
                    PageCanvas::new(&image, pan)
                        .highlights(&highlights)
                        .highlight_colors(
                            palette.highlight_color(true),
                            palette.highlight_color(false),
                        ),
                    area,
                );
                render_scrollbars(f, area, &image, pan);
            }
            Ok(None) => {
                render_empty(area, f.buffer_mut());
                if !self.viewer.has_document() {
                    self.draw_centered_text(f, area, "No document open, press Ctrl+O", palette);
                }
            }
            Err(e) => {
                let message = format!("Cannot render page {}: {e}", self.viewer.page_index() + 1);
                if self.render_error.as_deref() != Some(message.as_str()) {
                    error!("{message}");
                    self.render_error = Some(message.clone());
                }
                render_empty(area, f.buffer_mut());
                self.draw_centered_text(f, area, &message, palette);
            }
        }
    }

    fn draw_centered_text(&self, f: &mut Frame, area: Rect, text: &str, palette: &Base16Palette) {
        if area.height == 0 {
            return;
        }
        let row = Rect::new(area.x, area.y + area.height / 2, area.width, 1);
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                text.to_string(),
                Style::default().fg(palette.base_07).bg(palette.base_01),
            )))
            .centered(),
            row,
        );
    }

    fn draw_status(&self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let bar_style = Style::default().bg(palette.base_01).fg(palette.base_05);

        let name = match (self.viewer.title(), self.viewer.path()) {
            (Some(title), _) => title.to_string(),
            (None, Some(path)) => path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
            (None, None) => "No document".to_string(),
        };

        let mut right = Vec::new();
        if let Some(position) = self.viewer.search().position_label() {
            right.push(Span::styled(
                format!("Match {position}  "),
                Style::default().fg(palette.base_0a),
            ));
        }
        if self.viewer.has_document() {
            right.push(Span::raw(format!(
                "Zoom {:.0}% ",
                self.viewer.zoom_factor() * 100.0
            )));
        }
        right.push(Span::styled("?:Help ", Style::default().fg(palette.base_03)));

        f.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!(" {name}"),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .style(bar_style),
            area,
        );
        f.render_widget(Paragraph::new(Line::from(right)).right_aligned(), area);

        if let Some(hud) = &self.hud {
            let width = u16::try_from(hud.message.width())
                .unwrap_or(u16::MAX)
                .saturating_add(2)
                .min(area.width);
            let hud_area = Rect::new(
                area.x + (area.width - width) / 2,
                area.y,
                width,
                area.height.min(1),
            );
            f.render_widget(Paragraph::new(hud.styled_line(palette)), hud_area);
        }
    }
}

/// Toolbar row, page canvas and status row
fn screen_layout(area: Rect) -> [Rect; 3] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area)
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = std::time::Instant::now();
    let mut first_render = true;
    info!("Entering event loop");

    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while events_processed < 50 && event_source.poll(Duration::from_millis(0))? {
            let event = event_source.read()?;
            events_processed += 1;

            if app.handle_event(&event) == Some(AppAction::Quit) {
                should_quit = true;
                break;
            }
        }

        let mut needs_redraw = events_processed > 0;

        if first_render {
            needs_redraw = true;
            first_render = false;
        }

        if last_tick.elapsed() >= tick_rate {
            if app.update() {
                needs_redraw = true;
            }
            last_tick = std::time::Instant::now();
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        if should_quit {
            info!("Quit requested");
            return Ok(());
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout)?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_source::SimulatedEventSource;
    use crate::test_utils::test_helpers::{
        FakeDocument, TestScenarioBuilder, capture_terminal_state, create_test_terminal,
    };

    fn app_with(pages: &[&str]) -> App {
        let mut app = App::with_config(8, 1.25, std::env::temp_dir());
        app.viewer
            .load(Box::new(FakeDocument::with_pages(pages)), PathBuf::from("fake.pdf"));
        app
    }

    fn run(app: &mut App, events: SimulatedEventSource) -> String {
        let mut terminal = create_test_terminal(80, 24);
        let mut events = events;
        run_app_with_event_source(&mut terminal, app, &mut events).unwrap();
        capture_terminal_state(&terminal)
    }

    #[test]
    fn empty_app_shows_toolbar_and_hint() {
        let mut app = App::with_config(8, 1.25, std::env::temp_dir());
        let screen = run(&mut app, TestScenarioBuilder::new().quit().build());

        let first_line = screen.lines().next().unwrap();
        assert!(first_line.starts_with(" Open "));
        assert!(first_line.contains("Page: 0/0"));
        assert!(screen.contains("No document open"));
    }

    #[test]
    fn keys_navigate_pages() {
        let mut app = app_with(&["one", "two", "three"]);
        let screen = run(
            &mut app,
            TestScenarioBuilder::new()
                .next_page()
                .next_page()
                .next_page()
                .prev_page()
                .quit()
                .build(),
        );
        assert_eq!(app.viewer.page_index(), 1);
        assert!(screen.lines().next().unwrap().contains("Page: 2/3"));
    }

    #[test]
    fn go_to_out_of_range_shows_hint() {
        let mut app = app_with(&["a", "b"]);
        run(&mut app, TestScenarioBuilder::new().go_to_page(7).quit().build());
        assert_eq!(app.viewer.page_index(), 0);
        assert_eq!(
            app.hud_message().map(|h| h.message.as_str()),
            Some("Page must be between 1 and 2")
        );

        run(&mut app, TestScenarioBuilder::new().go_to_page(2).quit().build());
        assert_eq!(app.viewer.page_index(), 1);
    }

    #[test]
    fn find_without_matches_opens_dialog() {
        let mut app = app_with(&["lorem ipsum"]);
        let screen = run(
            &mut app,
            TestScenarioBuilder::new()
                .find("zebra")
                .press_ctrl_char('c')
                .build(),
        );
        assert!(screen.contains("No matches found"));
        assert!(matches!(app.popup(), Some(Popup::Message(_))));
    }

    #[test]
    fn find_jumps_to_match_and_n_cycles() {
        let mut app = app_with(&["intro", "the cat", "no", "another cat"]);
        run(&mut app, TestScenarioBuilder::new().find("CAT").quit().build());
        assert_eq!(app.viewer.page_index(), 1);

        run(&mut app, TestScenarioBuilder::new().press_char('n').quit().build());
        assert_eq!(app.viewer.page_index(), 3);

        let screen = run(&mut app, TestScenarioBuilder::new().press_char('N').quit().build());
        assert_eq!(app.viewer.page_index(), 1);
        assert!(screen.contains("Match 1/2"));
    }

    #[test]
    fn failed_open_shows_error_dialog() {
        let mut app = app_with(&["keep"]);
        assert!(!app.open_path(Path::new("/no/such/dir/missing.pdf")));

        let screen = run(&mut app, TestScenarioBuilder::new().press_ctrl_char('c').build());
        assert!(screen.contains("Error"));
        assert!(screen.contains("Cannot open /no/such/dir/missing.pdf"));
        assert_eq!(app.viewer.path(), Some(Path::new("fake.pdf")));

        run(&mut app, TestScenarioBuilder::new().press_enter().quit().build());
        assert!(!app.has_active_popup());
    }

    #[test]
    fn toolbar_click_changes_page_and_zoom() {
        let mut app = app_with(&["1", "2"]);
        // Draw once so the toolbar knows its button positions
        run(&mut app, TestScenarioBuilder::new().quit().build());

        // " Open " " ◀ " " ▶ " " + "
        run(&mut app, TestScenarioBuilder::new().click(12, 0).quit().build());
        assert_eq!(app.viewer.page_index(), 1);

        run(&mut app, TestScenarioBuilder::new().click(16, 0).quit().build());
        assert!((app.viewer.zoom_factor() - 1.25).abs() < 1e-6);
    }

    #[test]
    fn zoom_keys_update_status_bar() {
        let mut app = app_with(&["page"]);
        let screen = run(
            &mut app,
            TestScenarioBuilder::new().zoom_in().zoom_in().zoom_out().quit().build(),
        );
        assert!(screen.contains("Zoom 125%"));
    }

    #[test]
    fn prompts_capture_quit_key() {
        let mut app = app_with(&["page"]);
        let mut events = TestScenarioBuilder::new()
            .press_ctrl_char('f')
            .press_char('q')
            .press_esc()
            .quit()
            .build();
        let mut terminal = create_test_terminal(80, 24);
        run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();
        assert_eq!(events.remaining(), 0);
        assert!(!app.has_active_popup());
    }

    #[test]
    fn render_failure_is_drawn_on_canvas() {
        let mut app = App::with_config(8, 1.25, std::env::temp_dir());
        app.viewer.load(
            Box::new(FakeDocument::with_pages(&["broken", "pages"]).failing_render()),
            PathBuf::from("broken.pdf"),
        );

        let screen = run(&mut app, TestScenarioBuilder::new().quit().build());
        assert!(screen.contains("Cannot render page 1"));
        let first_error = app.render_error.clone();
        assert!(first_error.is_some());

        // still responsive: the next page fails the same way
        let screen = run(&mut app, TestScenarioBuilder::new().next_page().quit().build());
        assert_eq!(app.viewer.page_index(), 1);
        assert!(screen.contains("Cannot render page 2"));
        assert_ne!(app.render_error, first_error);

        run(&mut app, TestScenarioBuilder::new().quit().build());
        assert!(
            app.render_error
                .as_deref()
                .is_some_and(|message| message.starts_with("Cannot render page 2"))
        );
    }

    #[test]
    fn resize_updates_canvas_area() {
        let mut app = app_with(&["page"]);
        app.handle_event(&SimulatedEventSource::resize(100, 30));
        assert_eq!(app.viewer.state().area, Rect::new(0, 1, 100, 28));

        app.handle_resize(40, 2);
        assert_eq!(app.viewer.state().area.height, 0);
    }

    #[test]
    fn long_hud_message_fits_status_bar() {
        let mut app = app_with(&["page"]);
        app.show_info("x".repeat(70_000));
        let screen = run(&mut app, TestScenarioBuilder::new().quit().build());
        let status = screen.lines().nth(23).unwrap();
        assert!(status.contains(&"x".repeat(40)));
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut app = App::with_config(8, 1.25, std::env::temp_dir());
        let screen = run(
            &mut app,
            TestScenarioBuilder::new()
                .press_char('?')
                .press_ctrl_char('c')
                .build(),
        );
        assert!(screen.contains("Help"));
        assert!(app.has_active_popup());

        run(&mut app, TestScenarioBuilder::new().press_esc().quit().build());
        assert!(!app.has_active_popup());
    }
}
