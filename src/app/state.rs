use std::time::{Duration, Instant};

use time::OffsetDateTime;
use unicode_segmentation::UnicodeSegmentation;

use crate::api::{ApiError, Recipe, RecipeResponse, SaveKind, SaveRequest};
use crate::app::form::{FormError, FormState};
use crate::app::sidebar::{toggle_tag, SidebarState};
use crate::query::{total_pages, QueryKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Grid,
    Search,
    Sidebar,
}

/// At most one modal is ever open; the form replaces the detail view instead of stacking on it.
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    Detail { recipe: Recipe, scroll: u16 },
    Form(FormState),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Results {
    Loading,
    Ready(RecipeResponse),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Pagination {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub search_text: String,
    pub selected_tag: Option<String>,
    pub page: u32,
    pub focus: Focus,
    pub modal: Modal,
    pub sidebar: SidebarState,
    pub results: Results,
    pub selected: usize,
    pub grid_columns: usize,
    pub narrow: bool,
    pub fetching: bool,
    pub loaded_at: Option<OffsetDateTime>,
    pub toast: Option<Toast>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            search_text: String::new(),
            selected_tag: None,
            page: 1,
            focus: Focus::Grid,
            modal: Modal::None,
            sidebar: SidebarState::default(),
            results: Results::Loading,
            selected: 0,
            grid_columns: 1,
            narrow: false,
            fetching: false,
            loaded_at: None,
            toast: None,
        }
    }

    pub fn query_key(&self) -> QueryKey {
        QueryKey::new(&self.search_text, self.selected_tag.as_deref(), self.page)
    }

    pub fn search_active(&self) -> bool {
        !self.search_text.trim().is_empty()
    }

    pub fn filters_active(&self) -> bool {
        self.search_active() || self.selected_tag.is_some()
    }

    /// A non-empty search drops the tag filter; any change goes back to page one.
    pub fn set_search_text(&mut self, text: String) {
        if text == self.search_text {
            return;
        }
        self.search_text = text;
        if self.search_active() {
            self.selected_tag = None;
        }
        self.page = 1;
    }

    pub fn push_search_char(&mut self, ch: char) {
        let mut text = self.search_text.clone();
        text.push(ch);
        self.set_search_text(text);
    }

    pub fn pop_search_char(&mut self) {
        let mut text = self.search_text.clone();
        if let Some((idx, _)) = text.grapheme_indices(true).next_back() {
            text.truncate(idx);
        }
        self.set_search_text(text);
    }

    /// Applies a sidebar choice: clears the search, resets paging and closes the overlay.
    pub fn apply_tag_selection(&mut self, tag: Option<String>) {
        let changed = tag != self.selected_tag || !self.search_text.is_empty();
        self.selected_tag = tag;
        self.search_text.clear();
        if changed {
            self.page = 1;
        }
        if self.sidebar.overlay_open {
            self.sidebar.close_overlay();
            self.focus = Focus::Grid;
        }
    }

    pub fn pick_tag(&mut self, tag: &str) {
        let next = toggle_tag(self.selected_tag.as_deref(), tag);
        self.apply_tag_selection(next);
    }

    pub fn clear_filters(&mut self) {
        self.search_text.clear();
        self.selected_tag = None;
        self.page = 1;
    }

    pub fn set_results(&mut self, results: Results) {
        if matches!(results, Results::Ready(_)) {
            self.loaded_at = Some(OffsetDateTime::now_utc());
        }
        self.results = results;
        self.normalize_selection();
    }

    pub fn recipes(&self) -> &[Recipe] {
        match &self.results {
            Results::Ready(page) => &page.recipes,
            _ => &[],
        }
    }

    pub fn total(&self) -> u64 {
        match &self.results {
            Results::Ready(page) => page.total,
            _ => 0,
        }
    }

    /// Page controls exist only for the unfiltered listing and only when there is a second page.
    pub fn pagination(&self) -> Option<Pagination> {
        if self.filters_active() {
            return None;
        }
        let Results::Ready(page) = &self.results else {
            return None;
        };
        let pages = total_pages(page.total);
        if pages <= 1 {
            return None;
        }
        Some(Pagination {
            page: self.page,
            total_pages: pages,
        })
    }

    pub fn next_page(&mut self) -> bool {
        match self.pagination() {
            Some(p) if p.has_next() => {
                self.page += 1;
                self.selected = 0;
                true
            }
            _ => false,
        }
    }

    pub fn previous_page(&mut self) -> bool {
        match self.pagination() {
            Some(p) if p.has_previous() => {
                self.page -= 1;
                self.selected = 0;
                true
            }
            _ => false,
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.recipes().len();
        if len == 0 {
            return;
        }
        let next = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.selected = next as usize;
    }

    pub fn move_row(&mut self, rows: isize) {
        self.move_selection(rows * self.grid_columns.max(1) as isize);
    }

    pub fn selected_recipe(&self) -> Option<&Recipe> {
        self.recipes().get(self.selected)
    }

    pub fn open_detail(&mut self) -> bool {
        let Some(recipe) = self.selected_recipe().cloned() else {
            return false;
        };
        self.modal = Modal::Detail { recipe, scroll: 0 };
        true
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Form(FormState::create());
    }

    /// Hands the open detail view over to the form; the detail modal is closed in the same step.
    pub fn open_edit(&mut self) -> bool {
        let Modal::Detail { recipe, .. } = &self.modal else {
            return false;
        };
        self.modal = Modal::Form(FormState::edit(recipe));
        true
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    pub fn form(&self) -> Option<&FormState> {
        match &self.modal {
            Modal::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        match &mut self.modal {
            Modal::Form(form) => Some(form),
            _ => None,
        }
    }

    pub fn scroll_detail(&mut self, delta: i32) {
        if let Modal::Detail { scroll, .. } = &mut self.modal {
            let next = (i32::from(*scroll) + delta).clamp(0, i32::from(u16::MAX));
            *scroll = next as u16;
        }
    }

    /// Validates the open form. On success the form is marked as saving and the request is
    /// returned for dispatch; on failure the error is shown inside the form.
    pub fn begin_save(&mut self) -> Option<Result<SaveRequest, FormError>> {
        let form = self.form_mut()?;
        if form.saving {
            return None;
        }
        let outcome = form.submit();
        match &outcome {
            Ok(_) => {
                form.saving = true;
                form.error = None;
            }
            Err(err) => form.error = Some(err.to_string()),
        }
        Some(outcome)
    }

    /// Closes the form only when the write went through, so a failed save keeps the input.
    pub fn finish_save(&mut self, kind: SaveKind, result: &Result<Recipe, ApiError>) -> bool {
        match result {
            Ok(_) => {
                if self.form().is_some() {
                    self.close_modal();
                }
                let (title, message) = match kind {
                    SaveKind::Created => (
                        "Recipe Created",
                        "Your new recipe has been successfully created.",
                    ),
                    SaveKind::Updated => (
                        "Recipe Updated",
                        "Your recipe has been successfully updated.",
                    ),
                };
                self.show_toast(ToastKind::Success, title, message);
                true
            }
            Err(_) => {
                if let Some(form) = self.form_mut() {
                    form.saving = false;
                }
                self.show_toast(
                    ToastKind::Error,
                    "Error",
                    "There was an error saving your recipe. Please try again.",
                );
                false
            }
        }
    }

    pub fn show_toast(&mut self, kind: ToastKind, title: &str, message: &str) {
        self.toast = Some(Toast {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    pub fn expire_toast(&mut self, ttl: Duration) {
        if self
            .toast
            .as_ref()
            .map(|toast| toast.shown_at.elapsed() >= ttl)
            .unwrap_or(false)
        {
            self.toast = None;
        }
    }

    fn normalize_selection(&mut self) {
        let len = self.recipes().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}
