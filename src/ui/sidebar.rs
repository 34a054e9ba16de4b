use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::SidebarState;
use crate::config::themes::Palette;

pub const SIDEBAR_WIDTH: u16 = 26;

pub fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    sidebar: &SidebarState,
    selected_tag: Option<&str>,
    focused: bool,
    palette: &Palette,
) {
    let border = if focused {
        Style::default().fg(palette.accent)
    } else {
        Style::default().fg(palette.muted)
    };
    let title = match selected_tag {
        Some(_) => " Tags · x clear ",
        None => " Tags ",
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border);

    if sidebar.loading || sidebar.tags.is_empty() {
        let message = if sidebar.loading {
            "Loading tags…"
        } else {
            "No tags"
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(palette.muted),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let items: Vec<ListItem> = sidebar
        .tags
        .iter()
        .map(|tag| {
            if selected_tag == Some(tag.as_str()) {
                ListItem::new(Line::from(vec![
                    Span::styled("● ", Style::default().fg(palette.tag)),
                    Span::styled(
                        tag.clone(),
                        Style::default()
                            .fg(palette.tag)
                            .add_modifier(Modifier::BOLD),
                    ),
                ]))
            } else {
                ListItem::new(Line::from(format!("  {tag}")))
            }
        })
        .collect();

    let mut list = List::new(items).block(block);
    if focused {
        list = list.highlight_style(
            Style::default()
                .fg(palette.selection_fg)
                .bg(palette.selection_bg),
        );
    }
    let mut state = ListState::default();
    state.select(Some(sidebar.cursor));
    frame.render_stateful_widget(list, area, &mut state);
}
