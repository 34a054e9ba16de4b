use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::form::{FormField, FormState, ListField};
use crate::config::themes::Palette;

fn field_value(form: &FormState, field: FormField) -> (String, bool) {
    let text = match field {
        FormField::Name => form.name.clone(),
        FormField::Cuisine => form.cuisine.clone(),
        FormField::Difficulty => format!("◀ {} ▶", form.difficulty),
        FormField::Image => form.image.clone(),
        FormField::Number(number) => form.number(number).to_string(),
        FormField::Entry(list, idx) => form.list(list).get(idx).cloned().unwrap_or_default(),
    };
    if text.is_empty() {
        let placeholder = match field {
            FormField::Entry(list, _) => list.placeholder(),
            FormField::Image => "https://...",
            _ => "",
        };
        (placeholder.to_string(), true)
    } else {
        (text, false)
    }
}

/// One line per focusable field, with list headings inserted before each list's first entry.
/// Returns the lines and the index of the focused line.
fn form_lines(form: &FormState, palette: &Palette) -> (Vec<Line<'static>>, usize) {
    let focused = form.focused();
    let label_style = Style::default().fg(palette.muted);
    let focus_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);
    let heading_style = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    let mut focus_line = 0;
    let mut current_list: Option<ListField> = None;
    for field in form.fields() {
        if let FormField::Entry(list, _) = field {
            if current_list != Some(list) {
                current_list = Some(list);
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(list.label(), heading_style)));
            }
        }
        let is_focused = field == focused;
        if is_focused {
            focus_line = lines.len();
        }
        let marker = if is_focused { "› " } else { "  " };
        let label = match field {
            FormField::Entry(_, idx) => format!("{:>3}. ", idx + 1),
            other => format!("{:<22}", other.label()),
        };
        let (value, placeholder) = field_value(form, field);
        let value_style = if placeholder {
            Style::default()
                .fg(palette.muted)
                .add_modifier(Modifier::ITALIC)
        } else if is_focused {
            focus_style
        } else {
            Style::default()
        };
        let cursor = if is_focused && field != FormField::Difficulty {
            "▏"
        } else {
            ""
        };
        lines.push(Line::from(vec![
            Span::styled(marker, focus_style),
            Span::styled(label, label_style),
            Span::styled(value, value_style),
            Span::styled(cursor, focus_style),
        ]));
    }
    (lines, focus_line)
}

pub fn render_form(frame: &mut Frame, area: Rect, form: &FormState, palette: &Palette) {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(format!(" {} ", form.title()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.accent));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let (lines, focus_line) = form_lines(form, palette);
    let visible = layout[0].height.max(1) as usize;
    let offset = focus_line.saturating_sub(visible.saturating_sub(2));
    frame.render_widget(
        Paragraph::new(lines).scroll((offset as u16, 0)),
        layout[0],
    );

    let status = if form.saving {
        Line::from(Span::styled(
            "Saving…",
            Style::default().fg(palette.accent),
        ))
    } else if let Some(error) = &form.error {
        Line::from(Span::styled(
            error.clone(),
            Style::default()
                .fg(palette.error)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from("")
    };
    frame.render_widget(Paragraph::new(status), layout[1]);

    let submit = if form.is_edit() { "update" } else { "create" };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            format!(
                "Tab/Shift-Tab move · ←/→ difficulty · Ctrl-n add entry · Ctrl-d remove · Ctrl-s {submit} · Esc cancel"
            ),
            Style::default().fg(palette.muted),
        ))),
        layout[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_list_gets_a_heading_and_placeholder() {
        let form = FormState::create();
        let (lines, focus_line) = form_lines(&form, &Palette::default());
        let text: Vec<String> = lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        for list in ListField::ALL {
            assert!(text.iter().any(|line| line == list.label()));
            assert!(text.iter().any(|line| line.contains(list.placeholder())));
        }
        assert_eq!(focus_line, 0);
    }
}
