use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::api::RecipeApi;
use crate::config::themes::Palette;
use crate::config::AppConfig;
use crate::query::{QueryClient, QueryEvent, QueryStatus};
use crate::ui;

mod actions;
pub mod form;
pub mod sidebar;
pub mod state;

use actions::{map_key, Action, KeyContext};
pub use form::{FormError, FormField, FormState, ListField};
pub use sidebar::SidebarState;
pub use state::{AppState, Focus, Modal, Results, Toast, ToastKind};

pub struct App {
    pub config: Arc<AppConfig>,
    palette: Palette,
    queries: QueryClient,
    state: AppState,
    should_quit: bool,
    tick_rate: Duration,
    toast_ttl: Duration,
}

impl App {
    pub fn new(config: Arc<AppConfig>, api: Arc<dyn RecipeApi>) -> Self {
        let queries = QueryClient::new(api, config.query.cache_capacity);
        queries.load_tags();
        let mut app = Self {
            palette: Palette::for_theme(config.theme),
            tick_rate: Duration::from_millis(config.ui.tick_ms.max(10)),
            toast_ttl: Duration::from_secs(config.ui.toast_seconds),
            config,
            queries,
            state: AppState::new(),
            should_quit: false,
        };
        app.sync_results();
        app
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            let size = terminal.size().context("reading terminal size")?;
            self.on_resize(size.width);
            terminal
                .draw(|frame| ui::draw_app(frame, &self.state, &self.palette))
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                if let Event::Key(key) = event::read().context("reading terminal event")? {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn on_resize(&mut self, width: u16) {
        let narrow = sidebar::is_narrow(width, self.config.ui.sidebar_breakpoint);
        if !narrow && self.state.sidebar.overlay_open {
            self.state.sidebar.close_overlay();
        }
        self.state.narrow = narrow;
        self.state.grid_columns = ui::grid_columns(width, !narrow);
    }

    fn on_tick(&mut self) {
        for event in self.queries.drain() {
            self.on_query_event(event);
        }
        self.state.expire_toast(self.toast_ttl);
        self.sync_results();
    }

    fn on_query_event(&mut self, event: QueryEvent) {
        match event {
            QueryEvent::RecipesLoaded { .. } => {}
            QueryEvent::TagsLoaded(result) => self.state.sidebar.on_tags_loaded(result),
            QueryEvent::SaveFinished { kind, result } => {
                match &result {
                    Ok(recipe) => {
                        tracing::info!(id = recipe.id, ?kind, "recipe saved");
                        self.queries.invalidate_all();
                        let key = self.state.query_key();
                        self.queries.refetch(&key);
                    }
                    Err(err) => tracing::error!(?err, ?kind, "failed to save recipe"),
                }
                self.state.finish_save(kind, &result);
            }
        }
    }

    /// Requests the current key if needed and mirrors its cache entry into the view state.
    fn sync_results(&mut self) {
        let key = self.state.query_key();
        self.queries.fetch(&key);
        self.state.fetching = self.queries.is_fetching(&key);
        let next = match self.queries.status(&key) {
            QueryStatus::Loading => Results::Loading,
            QueryStatus::Ready(page) => {
                if matches!(&self.state.results, Results::Ready(current) if current == page) {
                    return;
                }
                Results::Ready(page.clone())
            }
            QueryStatus::Failed(message) => Results::Failed(message.to_string()),
        };
        if next != self.state.results {
            self.state.set_results(next);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if matches!(self.state.modal, Modal::Form(_)) {
            self.handle_form_key(key);
            return;
        }

        if self.state.focus == Focus::Search && matches!(self.state.modal, Modal::None) {
            self.handle_search_key(key);
            self.sync_results();
            return;
        }

        let context = match (&self.state.modal, self.state.focus) {
            (Modal::Detail { .. }, _) => KeyContext::Detail,
            (_, Focus::Sidebar) => KeyContext::Sidebar,
            _ => KeyContext::Grid,
        };
        if let Some(action) = map_key(context, key) {
            self.apply(context, action);
        }
        self.sync_results();
    }

    fn apply(&mut self, context: KeyContext, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::MoveSelection(delta) if context == KeyContext::Sidebar => {
                self.state.sidebar.move_cursor(delta)
            }
            Action::MoveSelection(delta) => self.state.move_selection(delta),
            Action::MoveRow(rows) => self.state.move_row(rows),
            Action::OpenDetail => {
                self.state.open_detail();
            }
            Action::CreateRecipe => self.state.open_create(),
            Action::EditRecipe => {
                self.state.open_edit();
            }
            Action::NextPage => {
                self.state.next_page();
            }
            Action::PreviousPage => {
                self.state.previous_page();
            }
            Action::ClearFilters => self.state.clear_filters(),
            Action::ClearTag => {
                if self.state.selected_tag.is_some() {
                    self.state.apply_tag_selection(None);
                }
            }
            Action::Retry => {
                let key = self.state.query_key();
                if matches!(self.queries.status(&key), QueryStatus::Failed(_)) {
                    tracing::debug!(?key, "retrying failed query");
                }
                self.queries.refetch(&key);
            }
            Action::FocusSearch => {
                self.state.sidebar.close_overlay();
                self.state.focus = Focus::Search;
            }
            Action::FocusSidebar => {
                if self.state.narrow {
                    self.state.sidebar.open_overlay();
                }
                self.state.focus = Focus::Sidebar;
            }
            Action::FocusGrid => {
                self.state.sidebar.close_overlay();
                self.state.focus = Focus::Grid;
            }
            Action::PickTag => {
                if let Some(tag) = self.state.sidebar.highlighted().map(str::to_string) {
                    self.state.pick_tag(&tag);
                }
            }
            Action::ScrollDetail(delta) => self.state.scroll_detail(delta),
            Action::CloseModal => self.state.close_modal(),
            Action::DismissToast => self.state.dismiss_toast(),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Tab => self.state.focus = Focus::Grid,
            KeyCode::Backspace => self.state.pop_search_char(),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.set_search_text(String::new())
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char(ch)
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                self.state.push_search_char(ch)
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('s') {
            self.submit_form();
            return;
        }
        if self.state.form().map(|form| form.saving).unwrap_or(true) {
            return;
        }
        if key.code == KeyCode::Esc {
            self.state.close_modal();
            return;
        }
        let Some(form) = self.state.form_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
            KeyCode::Left => form.cycle_difficulty(false),
            KeyCode::Right => form.cycle_difficulty(true),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char('n') if ctrl => {
                form.add_entry_at_focus();
            }
            KeyCode::Char('d') if ctrl => {
                form.remove_entry_at_focus();
            }
            KeyCode::Char(ch) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                form.insert_char(ch)
            }
            _ => {}
        }
    }

    fn submit_form(&mut self) {
        match self.state.begin_save() {
            Some(Ok(request)) => self.queries.save(request),
            Some(Err(err)) => tracing::debug!(%err, "recipe form rejected"),
            None => {}
        }
    }

    #[cfg(test)]
    fn settle(&mut self) {
        while let Some(event) = self.queries.wait(Duration::from_millis(500)) {
            self.on_query_event(event);
            self.sync_results();
        }
        self.sync_results();
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("restoring screen state")?;
    Ok(())
}
