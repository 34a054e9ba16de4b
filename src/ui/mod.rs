use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;
use time::macros::format_description;

use crate::app::state::{AppState, Focus, Modal, Results, ToastKind};
use crate::config::themes::Palette;
use crate::highlight::query_matcher;
use crate::query::PAGE_SIZE;

pub mod card;
pub mod detail;
pub mod form;
pub mod sidebar;

use card::{CARD_HEIGHT, MIN_CARD_WIDTH};
use sidebar::SIDEBAR_WIDTH;

const MAX_COLUMNS: usize = 4;

/// How many cards fit side by side in a terminal `width` columns wide.
pub fn grid_columns(width: u16, sidebar_inline: bool) -> usize {
    let available = if sidebar_inline {
        width.saturating_sub(SIDEBAR_WIDTH)
    } else {
        width
    };
    ((available / MIN_CARD_WIDTH) as usize).clamp(1, MAX_COLUMNS)
}

pub fn draw_app(frame: &mut Frame, state: &AppState, palette: &Palette) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    draw_search_bar(frame, vertical[0], state, palette);

    let grid_area = if state.narrow {
        vertical[1]
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(MIN_CARD_WIDTH)])
            .split(vertical[1]);
        sidebar::render_sidebar(
            frame,
            columns[0],
            &state.sidebar,
            state.selected_tag.as_deref(),
            state.focus == Focus::Sidebar,
            palette,
        );
        columns[1]
    };

    draw_results(frame, grid_area, state, palette);
    draw_status_bar(frame, vertical[2], state, palette);

    if state.narrow && state.sidebar.overlay_open {
        let area = centered_rect(60, 70, frame.size());
        frame.render_widget(Clear, area);
        sidebar::render_sidebar(
            frame,
            area,
            &state.sidebar,
            state.selected_tag.as_deref(),
            true,
            palette,
        );
    }

    match &state.modal {
        Modal::None => {}
        Modal::Detail { recipe, scroll } => {
            let area = centered_rect(80, 85, frame.size());
            detail::render_detail(frame, area, recipe, *scroll, palette);
        }
        Modal::Form(form) => {
            let area = centered_rect(80, 90, frame.size());
            form::render_form(frame, area, form, palette);
        }
    }

    draw_toast(frame, state, palette);
}

fn draw_search_bar(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let focused = state.focus == Focus::Search;
    let border = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };
    let mut spans = vec![Span::styled("🔍 ", Style::default().fg(palette.muted))];
    if state.search_text.is_empty() && !focused {
        spans.push(Span::styled(
            "Search recipes… (press /)",
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC),
        ));
    } else {
        spans.push(Span::raw(state.search_text.clone()));
        if focused {
            spans.push(Span::styled("▏", Style::default().fg(palette.accent)));
        }
    }
    if let Some(tag) = &state.selected_tag {
        spans.push(Span::styled(
            format!("   tag: #{tag}"),
            Style::default().fg(palette.tag),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title(" Recipes ")
            .borders(Borders::ALL)
            .border_style(border),
    );
    frame.render_widget(paragraph, area);
}

fn draw_results(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    match &state.results {
        Results::Failed(message) => draw_message(
            frame,
            area,
            "Error loading recipes",
            &format!("{message}\n\nPress r to retry."),
            palette.error,
        ),
        Results::Loading => draw_skeleton(frame, area, state.grid_columns, palette),
        Results::Ready(page) if page.recipes.is_empty() => {
            let hint = if state.filters_active() {
                "Try adjusting your search or filters. Press c to clear them, or a to add a recipe."
            } else {
                "Get started by adding your first recipe. Press a to add one."
            };
            draw_message(frame, area, "No recipes found", hint, palette.muted);
        }
        Results::Ready(_) => draw_grid(frame, area, state, palette),
    }
}

fn draw_message(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    body: &str,
    accent: ratatui::style::Color,
) {
    let mut lines = vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(body.lines().map(|line| Line::from(line.to_string())));
    let paragraph = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn grid_cells(area: Rect, columns: usize, rows: usize) -> Vec<Rect> {
    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); rows])
        .split(area);
    let mut cells = Vec::with_capacity(rows * columns);
    for row in row_areas.iter() {
        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
            .split(*row);
        cells.extend(col_areas.iter().copied());
    }
    cells
}

fn draw_skeleton(frame: &mut Frame, area: Rect, columns: usize, palette: &Palette) {
    let columns = columns.max(1);
    let rows = ((area.height / CARD_HEIGHT) as usize)
        .clamp(1, (PAGE_SIZE as usize).div_ceil(columns));
    for cell in grid_cells(area, columns, rows) {
        card::render_skeleton(frame, cell, palette);
    }
}

fn draw_grid(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let pagination = state.pagination();
    let (cards_area, footer_area) = if pagination.is_some() {
        let split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(CARD_HEIGHT), Constraint::Length(1)])
            .split(area);
        (split[0], Some(split[1]))
    } else {
        (area, None)
    };

    let recipes = state.recipes();
    let columns = state.grid_columns.max(1);
    let visible_rows = ((cards_area.height / CARD_HEIGHT) as usize).max(1);
    let selected_row = state.selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);
    let regex = query_matcher(&state.search_text);

    let cells = grid_cells(cards_area, columns, visible_rows);
    let start = first_row * columns;
    for (cell, (idx, recipe)) in cells
        .into_iter()
        .zip(recipes.iter().enumerate().skip(start))
    {
        card::render_card(
            frame,
            cell,
            recipe,
            idx == state.selected && state.focus == Focus::Grid,
            regex.as_ref(),
            palette,
        );
    }

    if let (Some(pagination), Some(footer)) = (pagination, footer_area) {
        let enabled = Style::default().fg(palette.accent);
        let disabled = Style::default().fg(palette.muted).add_modifier(Modifier::DIM);
        let line = Line::from(vec![
            Span::styled(
                "◀ p Previous",
                if pagination.has_previous() { enabled } else { disabled },
            ),
            Span::raw(format!(
                "   Page {} of {}   ",
                pagination.page, pagination.total_pages
            )),
            Span::styled(
                "Next n ▶",
                if pagination.has_next() { enabled } else { disabled },
            ),
        ]);
        frame.render_widget(
            Paragraph::new(line).alignment(ratatui::layout::Alignment::Center),
            footer,
        );
    }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, state: &AppState, palette: &Palette) {
    let hints = match (&state.modal, state.focus) {
        (Modal::Form(_), _) => "",
        (Modal::Detail { .. }, _) => "e edit · Esc close",
        (_, Focus::Search) => "type to search · Enter/Esc back to grid · Ctrl-u clear",
        (_, Focus::Sidebar) => "j/k move · Enter select tag · x clear tag · Esc back",
        (_, Focus::Grid) if state.narrow => {
            "←↑↓→ move · Enter open · a add · / search · f tags · n/p page · c clear · q quit"
        }
        (_, Focus::Grid) => {
            "←↑↓→ move · Enter open · a add · / search · Tab tags · n/p page · c clear · q quit"
        }
    };
    let mut spans = vec![Span::styled(hints, Style::default().fg(palette.muted))];
    if state.fetching {
        spans.push(Span::styled(
            "  · loading…",
            Style::default().fg(palette.accent),
        ));
    } else if let Some(loaded) = state.loaded_at {
        let format = format_description!("[hour]:[minute]:[second]");
        if let Ok(stamp) = loaded.format(&format) {
            spans.push(Span::styled(
                format!("  · {} recipes · updated {stamp} UTC", state.total()),
                Style::default().fg(palette.muted),
            ));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_toast(frame: &mut Frame, state: &AppState, palette: &Palette) {
    let Some(toast) = &state.toast else {
        return;
    };
    let screen = frame.size();
    let width = screen.width.min(48);
    let area = Rect {
        x: screen.x + screen.width.saturating_sub(width + 1),
        y: screen.y + 1,
        width,
        height: 4.min(screen.height),
    };
    let color = match toast.kind {
        ToastKind::Success => palette.success,
        ToastKind::Error => palette.error,
    };
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(toast.message.clone())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    format!(" {} ", toast.title),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .title_bottom(Span::styled(
                    " Esc dismiss ",
                    Style::default().fg(palette.muted),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}
