use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::api::Recipe;
use crate::config::themes::Palette;
use crate::ui::card::star_string;

/// Instruction steps prefixed with their 1-based position.
pub fn numbered_steps(steps: &[String]) -> Vec<String> {
    steps
        .iter()
        .enumerate()
        .map(|(idx, step)| format!("{}. {step}", idx + 1))
        .collect()
}

fn heading(text: &str, palette: &Palette) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD),
    ))
}

pub fn detail_lines(recipe: &Recipe, palette: &Palette) -> Vec<Line<'static>> {
    let muted = Style::default().fg(palette.muted);
    let badge = Style::default()
        .fg(palette.selection_fg)
        .bg(palette.selection_bg);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", recipe.cuisine), badge),
            Span::raw(" "),
            Span::styled(format!(" {} ", recipe.difficulty), badge),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Total time: ", muted),
            Span::raw(format!(
                "{} min (prep {} · cook {})",
                recipe.total_minutes(),
                recipe.prep_time_minutes,
                recipe.cook_time_minutes
            )),
        ]),
        Line::from(vec![
            Span::styled("Servings: ", muted),
            Span::raw(recipe.servings.to_string()),
            Span::styled("   Calories: ", muted),
            Span::raw(format!("{} per serving", recipe.calories_per_serving)),
        ]),
        Line::from(vec![
            Span::styled(star_string(recipe.rating), Style::default().fg(palette.star)),
            Span::raw(format!(
                " {:.1} ({} reviews)",
                recipe.rating, recipe.review_count
            )),
        ]),
    ];

    if !recipe.meal_type.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Meal: ", muted),
            Span::raw(recipe.meal_type.join(", ")),
        ]));
    }
    if !recipe.tags.is_empty() {
        let mut spans = vec![Span::styled("Tags: ", muted)];
        for tag in &recipe.tags {
            spans.push(Span::styled(
                format!("#{tag} "),
                Style::default().fg(palette.tag),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(heading("Ingredients", palette));
    for ingredient in &recipe.ingredients {
        lines.push(Line::from(format!("  • {ingredient}")));
    }

    lines.push(Line::from(""));
    lines.push(heading("Instructions", palette));
    for step in numbered_steps(&recipe.instructions) {
        lines.push(Line::from(format!("  {step}")));
    }
    lines
}

pub fn render_detail(
    frame: &mut Frame,
    area: Rect,
    recipe: &Recipe,
    scroll: u16,
    palette: &Palette,
) {
    frame.render_widget(Clear, area);
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", recipe.name),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "e edit · j/k scroll · Esc close ",
            Style::default().fg(palette.muted),
        ),
    ]);
    let paragraph = Paragraph::new(detail_lines(recipe, palette))
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.accent)),
        )
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_are_numbered_from_one() {
        let steps = vec!["Boil water".to_string(), "Add pasta".to_string()];
        assert_eq!(
            numbered_steps(&steps),
            vec!["1. Boil water".to_string(), "2. Add pasta".to_string()]
        );
    }

    #[test]
    fn detail_lists_every_ingredient() {
        let recipe = Recipe {
            name: "Soup".into(),
            ingredients: vec!["Water".into(), "Salt".into(), "Leek".into()],
            ..Recipe::default()
        };
        let text: Vec<String> = detail_lines(&recipe, &Palette::default())
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        let bullets = text.iter().filter(|line| line.starts_with("  • ")).count();
        assert_eq!(bullets, 3);
        assert!(!text.iter().any(|line| line.starts_with("Meal: ")));
    }
}
