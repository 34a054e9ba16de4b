use crate::api::ApiError;

/// Tag list shown beside the grid. Loaded once at startup and never refreshed.
#[derive(Debug, Clone)]
pub struct SidebarState {
    pub tags: Vec<String>,
    pub loading: bool,
    pub cursor: usize,
    pub overlay_open: bool,
}

impl Default for SidebarState {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            loading: true,
            cursor: 0,
            overlay_open: false,
        }
    }
}

impl SidebarState {
    pub fn on_tags_loaded(&mut self, result: Result<Vec<String>, ApiError>) {
        self.loading = false;
        match result {
            Ok(tags) => self.tags = tags,
            Err(err) => {
                tracing::warn!(%err, "failed to load tags; sidebar stays empty");
                self.tags.clear();
            }
        }
        self.cursor = 0;
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.tags.get(self.cursor).map(String::as_str)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.tags.is_empty() {
            return;
        }
        let last = self.tags.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }

    pub fn open_overlay(&mut self) {
        self.overlay_open = true;
    }

    pub fn close_overlay(&mut self) {
        self.overlay_open = false;
    }
}

/// Single-valued selection: picking the active tag clears it, anything else replaces it.
pub fn toggle_tag(selected: Option<&str>, picked: &str) -> Option<String> {
    if selected == Some(picked) {
        None
    } else {
        Some(picked.to_string())
    }
}

pub fn is_narrow(width: u16, breakpoint: u16) -> bool {
    width < breakpoint
}
