use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::theme;
use crate::error::AppError;

pub fn render_loading(frame: &mut Frame, area: Rect, spinner: &str) {
    let line = Line::from(vec![
        Span::styled(format!("   {spinner} "), Style::default().fg(theme::ACCENT)),
        Span::styled("Loading...", Style::default().fg(theme::TEXT_SECONDARY)),
    ]);
    let body = Paragraph::new(vec![Line::from(""), line]).style(Style::default().bg(theme::BG_SURFACE));
    frame.render_widget(body, area);
}

pub fn render_error(frame: &mut Frame, area: Rect, error: &AppError) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme::ERROR))
        .title(Span::styled(" Error ", Style::default().fg(theme::ERROR).bold()))
        .style(Style::default().bg(theme::BG_SURFACE));

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {error}"), Style::default().fg(theme::TEXT))),
        Line::from(""),
        Line::from(Span::styled(" [backspace] back  [q] quit", Style::default().fg(theme::TEXT_MUTED))),
    ];
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

/// One-line bar at the bottom: the active filter while one is edited, key hints otherwise.
pub fn render_footer(frame: &mut Frame, area: Rect, filter: Option<&str>, hints: &str) {
    let spans = match filter {
        Some(filter) => vec![
            Span::styled(" / ", Style::default().fg(theme::ACCENT)),
            Span::styled(filter.to_string(), Style::default().fg(theme::TEXT)),
            Span::styled("│", Style::default().fg(theme::ACCENT)),
            Span::styled("  [enter] keep  [esc] clear", Style::default().fg(theme::TEXT_MUTED)),
        ],
        None => vec![Span::styled(format!(" {hints}"), Style::default().fg(theme::TEXT_MUTED))],
    };
    frame.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::BG_BASE)), area);
}
