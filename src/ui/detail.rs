use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

use super::theme;
use crate::state::DetailView;

pub fn render_detail(frame: &mut Frame, area: Rect, detail: &DetailView) {
    let position = format!(" {}/{} ", (detail.scroll() + 1).min(detail.lines().len()), detail.lines().len());
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(format!(" {} ", detail.title), Style::default().fg(theme::ACCENT).bold()))
        .title(Line::from(Span::styled(position, Style::default().fg(theme::TEXT_MUTED))).right_aligned())
        .style(Style::default().bg(theme::BG_SURFACE));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = detail
        .lines()
        .iter()
        .skip(detail.scroll())
        .take(inner.height as usize)
        .map(|line| Line::from(Span::styled(format!(" {line}"), Style::default().fg(theme::TEXT))))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
