//! Open dialog: browse directories and pick a PDF file

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent};
use log::{debug, warn};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use walkdir::WalkDir;

use crate::theme::Base16Palette;
use crate::widget::centered_rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileDialogAction {
    Selected(PathBuf),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
}

pub struct FileDialog {
    dir: PathBuf,
    entries: Vec<DirEntry>,
    state: ListState,
    error: Option<String>,
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Subdirectories and PDF files of `dir`, directories first, both sorted
/// case-insensitively. A ".." entry leads to the parent directory.
pub fn list_dir(dir: &Path) -> Vec<DirEntry> {
    let mut entries: Vec<DirEntry> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping entry in {dir:?}: {e}");
                None
            }
        })
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().is_dir();
            if is_hidden(&name) || !(is_dir || is_pdf(entry.path())) {
                return None;
            }
            Some(DirEntry {
                name,
                path: entry.into_path(),
                is_dir,
            })
        })
        .collect();

    entries.sort_by(|a, b| match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    });

    if let Some(parent) = dir.parent() {
        entries.insert(
            0,
            DirEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
            },
        );
    }
    entries
}

impl FileDialog {
    pub fn new(dir: &Path) -> Self {
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut dialog = Self {
            dir: dir.clone(),
            entries: Vec::new(),
            state: ListState::default(),
            error: None,
        };
        dialog.change_dir(dir);
        dialog
    }

    fn change_dir(&mut self, dir: PathBuf) {
        if !dir.is_dir() {
            warn!("Cannot open directory {dir:?}");
            self.error = Some(format!("Cannot open {}", dir.display()));
            return;
        }

        self.entries = list_dir(&dir);
        self.dir = dir;
        self.error = None;
        // skip ".." so the first real entry is selected
        let first = usize::from(self.entries.len() > 1 && self.entries[0].name == "..");
        self.state
            .select((!self.entries.is_empty()).then_some(first));
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Option<&DirEntry> {
        self.state.selected().and_then(|i| self.entries.get(i))
    }

    /// Move the selection to the entry called `name`
    pub fn select_name(&mut self, name: &str) -> bool {
        match self.entries.iter().position(|e| e.name == name) {
            Some(idx) => {
                self.state.select(Some(idx));
                true
            }
            None => false,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let last = self.entries.len() as isize - 1;
        self.state.select(Some((current + delta).clamp(0, last) as usize));
    }

    fn go_up(&mut self) {
        if let Some(parent) = self.dir.parent().map(Path::to_path_buf) {
            let previous = self
                .dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string());
            self.change_dir(parent);
            if let Some(name) = previous {
                self.select_name(&name);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FileDialogAction> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return Some(FileDialogAction::Cancel),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-10),
            KeyCode::PageDown => self.move_selection(10),
            KeyCode::Home => self.move_selection(isize::MIN / 2),
            KeyCode::End => self.move_selection(isize::MAX / 2),
            KeyCode::Backspace | KeyCode::Left | KeyCode::Char('h') => self.go_up(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
                let entry = self.selected()?.clone();
                if entry.name == ".." {
                    self.go_up();
                } else if entry.is_dir {
                    self.change_dir(entry.path);
                } else {
                    return Some(FileDialogAction::Selected(entry.path));
                }
            }
            _ => {}
        }
        None
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, palette: &Base16Palette) {
        let width = (area.width * 7 / 10).max(30).min(area.width);
        let height = (area.height * 7 / 10).max(8).min(area.height);
        let popup_area = centered_rect(width, height, area);

        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Open PDF ")
            .title_bottom(Line::from(" Enter open · Backspace up · Esc cancel ").centered())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.base_0c))
            .style(Style::default().bg(palette.base_00));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.height < 2 {
            return;
        }
        let header = Rect::new(inner.x, inner.y, inner.width, 1);
        let list_area = Rect::new(inner.x, inner.y + 1, inner.width, inner.height - 1);

        let header_text = match &self.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(palette.base_08)),
            None => Span::styled(
                self.dir.display().to_string(),
                Style::default().fg(palette.base_04),
            ),
        };
        f.render_widget(Paragraph::new(Line::from(header_text)), header);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let (label, color) = if entry.is_dir {
                    (format!("{}/", entry.name), palette.base_0d)
                } else {
                    (entry.name.clone(), palette.base_05)
                };
                ListItem::new(Line::from(Span::styled(label, Style::default().fg(color))))
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .bg(palette.base_02)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, list_area, &mut self.state);
    }
}
