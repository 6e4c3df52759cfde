use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthChar;

use super::rows::Row;
use super::theme;
use crate::state::{Filterable, ListView};

/// Render a titled two-line-per-item list with the highlighted row padded to full width.
pub fn render_list<T: Filterable + Row>(frame: &mut Frame, area: Rect, title: &str, empty: &str, list: &ListView<T>) {
    let heading = format!(" {title} ({}) ", list.visible_len());
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(heading, Style::default().fg(theme::ACCENT).bold()))
        .style(Style::default().bg(theme::BG_SURFACE));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let width = inner.width as usize;
    let per_page = (inner.height as usize / 2).max(1);
    let selected = list.selected_index();
    let start = (selected + 1).saturating_sub(per_page);

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in list.visible().enumerate().skip(start).take(per_page) {
        let is_selected = i == selected;
        let (prefix, bg, fg) =
            if is_selected { (" > ", theme::BG_ELEVATED, theme::ACCENT) } else { ("   ", theme::BG_SURFACE, theme::TEXT) };

        let title = fit(&item.title(), width.saturating_sub(prefix.len()));
        let title_spans = vec![
            Span::styled(prefix, Style::default().fg(fg).bg(bg)),
            Span::styled(title, Style::default().fg(fg).bg(bg).bold()),
        ];
        lines.push(padded(title_spans, width, bg));

        let mut desc = vec![Span::styled("   ", Style::default().bg(bg))];
        if let Some(status) = item.status() {
            desc.push(Span::styled("● ", Style::default().fg(theme::status(status)).bg(bg)));
        }
        let used = desc.iter().map(Span::width).sum::<usize>();
        desc.push(Span::styled(
            fit(&item.description(), width.saturating_sub(used)),
            Style::default().fg(theme::TEXT_MUTED).bg(bg),
        ));
        lines.push(padded(desc, width, bg));
    }

    if lines.is_empty() {
        let message = if list.is_empty() { empty } else { "No matching items" };
        lines.push(Line::from(Span::styled(format!("   {message}"), Style::default().fg(theme::TEXT_MUTED))));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(theme::BG_SURFACE)), inner);
}

fn padded(mut spans: Vec<Span<'static>>, width: usize, bg: Color) -> Line<'static> {
    let used: usize = spans.iter().map(Span::width).sum();
    spans.push(Span::styled(" ".repeat(width.saturating_sub(used)), Style::default().bg(bg)));
    Line::from(spans)
}

/// Cut `text` to at most `width` display columns, marking the cut with `…`.
fn fit(text: &str, width: usize) -> String {
    let total: usize = text.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return text.to_string();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}
