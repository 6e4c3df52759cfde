mod detail;
mod list;
mod rows;
mod status;
mod theme;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::fetch::InstanceScope;
use crate::app::navigator::{Navigator, Screen};
use crate::constants::APP_NAME;

pub fn render(frame: &mut Frame, nav: &Navigator) {
    let area = frame.area();

    frame.render_widget(Block::default().style(Style::default().bg(theme::BG_BASE)), area);

    // Header, body, footer
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    render_header(frame, nav, layout[0]);
    render_body(frame, nav, layout[1]);
    status::render_footer(frame, layout[2], active_filter(nav), &hints(nav));
}

fn render_header(frame: &mut Frame, nav: &Navigator, area: Rect) {
    let sep = Span::styled("  │  ", Style::default().fg(theme::BORDER));
    let label = |text: &'static str| Span::styled(text, Style::default().fg(theme::TEXT_MUTED));
    let value = |text: String| Span::styled(text, Style::default().fg(theme::TEXT));

    let mut spans = vec![Span::styled(format!(" {APP_NAME}"), Style::default().fg(theme::ACCENT).bold())];
    if let Some(context) = nav.context() {
        spans.extend([sep.clone(), label("context "), value(context.to_string())]);
    }
    if let Some(path) = nav.current_path() {
        spans.extend([sep.clone(), label("workspace "), value(path.to_string())]);
    }
    if let Some(namespace) = nav.namespace() {
        spans.extend([sep, label("namespace "), value(namespace.to_string())]);
    }
    if nav.is_loading() {
        spans.push(Span::styled(format!("  {}", nav.spinner_frame()), Style::default().fg(theme::ACCENT)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(frame: &mut Frame, nav: &Navigator, area: Rect) {
    if let Some(error) = nav.error() {
        status::render_error(frame, area, error);
        return;
    }
    if nav.is_loading() {
        status::render_loading(frame, area, nav.spinner_frame());
        return;
    }

    match nav.screen() {
        Screen::SelectingContext(contexts) => {
            list::render_list(frame, area, "Select a kubeconfig context", "No contexts", contexts);
        }
        Screen::Workspaces(view) => {
            let title = format!("Workspace: {}", view.path);
            list::render_list(frame, area, &title, "No child workspaces", &view.list);
        }
        Screen::Apis { parent, view } => match &view.detail {
            Some(detail) => detail::render_detail(frame, area, detail),
            None => {
                let title = format!("API Relationships in {}", parent.path);
                list::render_list(frame, area, &title, "No APIExports or APIBindings", &view.list);
            }
        },
        Screen::SyncTargets { list: targets, .. } => {
            list::render_list(frame, area, "Sync Targets (Physical Clusters)", "No sync targets", targets);
        }
        Screen::ResourceTypes { parent, list: types } => {
            let title = format!("Resource Types in {}", parent.path);
            list::render_list(frame, area, &title, "No resource types discovered", types);
        }
        Screen::ResourceInstances { view, .. } => {
            let title = match &view.scope {
                InstanceScope::Workspace(path) => format!("{} in {path}", view.kind),
                InstanceScope::AllWorkspaces => format!("{} across all workspaces", view.kind),
            };
            list::render_list(frame, area, &title, "No instances", &view.list);
        }
    }
}

/// Filter text of the active list while it is being edited.
fn active_filter(nav: &Navigator) -> Option<&str> {
    if !nav.is_filtering() {
        return None;
    }
    let filter = match nav.screen() {
        Screen::SelectingContext(list) => list.filter(),
        Screen::Workspaces(view) => view.list.filter(),
        Screen::Apis { view, .. } => view.list.filter(),
        Screen::SyncTargets { list, .. } => list.filter(),
        Screen::ResourceTypes { list, .. } => list.filter(),
        Screen::ResourceInstances { view, .. } => view.list.filter(),
    };
    Some(filter)
}

fn hints(nav: &Navigator) -> String {
    if nav.error().is_some() {
        return "[backspace] Back  [q] Quit".to_string();
    }
    match nav.screen() {
        Screen::SelectingContext(_) => "[enter] Select  [/] Filter  [q] Quit".to_string(),
        Screen::Workspaces(view) => {
            let back = if nav.history().is_empty() { "" } else { "  [backspace] Back" };
            format!(
                "Current: {} | [a] APIs  [s] SyncTargets  [r] Resources  [enter] Navigate{back}  [q] Quit",
                view.path
            )
        }
        Screen::Apis { view, .. } if view.detail.is_some() => {
            "[j/k] Scroll  [g/G] Top/Bottom  [backspace] Close".to_string()
        }
        Screen::Apis { .. } => "[y] Raw document  [/] Filter  [backspace] Back  [q] Quit".to_string(),
        Screen::ResourceTypes { .. } => {
            "[enter] Instances  [w] All workspaces  [/] Filter  [backspace] Back  [q] Quit".to_string()
        }
        Screen::SyncTargets { .. } | Screen::ResourceInstances { .. } => {
            "[/] Filter  [backspace] Back  [q] Quit".to_string()
        }
    }
}
