use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::api::Recipe;
use crate::config::themes::Palette;
use crate::highlight::segments;

pub const CARD_HEIGHT: u16 = 7;
pub const MIN_CARD_WIDTH: u16 = 30;
pub const MAX_VISIBLE_TAGS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Star {
    Full,
    Half,
    Empty,
}

impl Star {
    pub fn glyph(self) -> char {
        match self {
            Star::Full => '★',
            Star::Half => '⯪',
            Star::Empty => '☆',
        }
    }
}

/// Five stars for a rating: whole part full, any fraction one half star, the rest empty.
pub fn star_states(rating: f32) -> [Star; 5] {
    let rating = if rating.is_finite() {
        rating.clamp(0.0, 5.0)
    } else {
        0.0
    };
    let full = rating.floor() as usize;
    let half = rating.fract() > 0.0;
    let mut stars = [Star::Empty; 5];
    for (idx, star) in stars.iter_mut().enumerate() {
        if idx < full {
            *star = Star::Full;
        } else if idx == full && half {
            *star = Star::Half;
        }
    }
    stars
}

pub fn star_string(rating: f32) -> String {
    star_states(rating).iter().map(|star| star.glyph()).collect()
}

/// The tags a card has room for, plus how many were left out.
pub fn visible_tags(tags: &[String]) -> (&[String], usize) {
    if tags.len() <= MAX_VISIBLE_TAGS {
        (tags, 0)
    } else {
        (&tags[..MAX_VISIBLE_TAGS], tags.len() - MAX_VISIBLE_TAGS)
    }
}

/// Cuts `text` to at most `max` terminal columns, ending in an ellipsis when shortened.
pub fn fit_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for grapheme in text.graphemes(true) {
        let width = grapheme.width();
        if used + width > budget {
            break;
        }
        used += width;
        out.push_str(grapheme);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

pub fn render_card(
    frame: &mut Frame,
    area: Rect,
    recipe: &Recipe,
    selected: bool,
    highlight: Option<&Regex>,
    palette: &Palette,
) {
    let border_style = if selected {
        Style::default()
            .fg(palette.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(palette.muted)
    };

    let title_style = Style::default().add_modifier(Modifier::BOLD);
    let match_style = title_style.fg(palette.star).add_modifier(Modifier::UNDERLINED);
    let name = fit_width(&recipe.name, area.width.saturating_sub(2) as usize);
    let title = Line::from(
        segments(&name, highlight)
            .into_iter()
            .map(|(matched, text)| {
                Span::styled(
                    text.to_string(),
                    if matched { match_style } else { title_style },
                )
            })
            .collect::<Vec<_>>(),
    );

    let muted = Style::default().fg(palette.muted);
    let meta = Line::from(vec![
        Span::styled(recipe.cuisine.clone(), Style::default().fg(palette.accent)),
        Span::styled(" · ", muted),
        Span::raw(recipe.difficulty.to_string()),
    ]);
    let timing = Line::from(Span::styled(
        format!(
            "{} min · {} servings",
            recipe.total_minutes(),
            recipe.servings
        ),
        muted,
    ));
    let rating = Line::from(vec![
        Span::styled(star_string(recipe.rating), Style::default().fg(palette.star)),
        Span::styled(
            format!(" {:.1} ({})", recipe.rating, recipe.review_count),
            muted,
        ),
    ]);

    let (shown, hidden) = visible_tags(&recipe.tags);
    let mut tag_spans = Vec::new();
    for tag in shown {
        tag_spans.push(Span::styled(
            format!("#{tag} "),
            Style::default().fg(palette.tag),
        ));
    }
    if hidden > 0 {
        tag_spans.push(Span::styled(format!("+{hidden}"), muted));
    }

    let lines = vec![title, meta, timing, rating, Line::from(tag_spans)];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, area);
}

/// Placeholder card drawn while the first response for a key is pending.
pub fn render_skeleton(frame: &mut Frame, area: Rect, palette: &Palette) {
    let muted = Style::default().fg(palette.muted);
    let lines = vec![
        Line::from(Span::styled("░░░░░░░░░░░░░░░░", muted)),
        Line::from(Span::styled("░░░░░░░░", muted)),
        Line::from(Span::styled("░░░░░░░░░░░", muted)),
        Line::from(Span::styled("☆☆☆☆☆", muted)),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(muted),
    );
    frame.render_widget(paragraph, area);
}
