use ratatui::prelude::*;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Padding, Paragraph};

use crate::app::{App, ExecutionLine, ExecutionLineKind, Pane};
use crate::theme::Theme;

const TEXT_PADDING: u16 = 1;
const STATUS_HEIGHT: u16 = 3;
const TITLE_BAR_HEIGHT: u16 = 3;
const ACTIVE_TITLE_BG: Color = Color::Rgb(90, 145, 200);
const ACTIVE_TITLE_FG: Color = Color::Black;
const STATUS_HELP_TEXT: &str =
    "Tab/Shift+Tab focus | Up/Down or wheel scroll | PgUp/PgDn page | f follow | q quit";

fn pane_areas(screen: Rect) -> (Rect, Rect, Rect) {
    let [body, status] = Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
        .areas(screen);
    let [log, execution] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(body);
    (log, execution, status)
}

fn pane_content_area(pane: Rect) -> Rect {
    let [_title_bar, content] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(pane);
    content
}

fn content_text_width(content: Rect) -> u16 {
    content.width.saturating_sub(TEXT_PADDING * 2).max(1)
}

pub fn log_max_scroll(screen: Rect, app: &App) -> u16 {
    let (log, _, _) = pane_areas(screen);
    let content = pane_content_area(log);
    if content.width < 1 || content.height < 1 {
        return 0;
    }
    let total_lines = app.log_display_lines(content_text_width(content)).len() as u16;
    let visible_lines = content.height.saturating_sub(TEXT_PADDING * 2);
    total_lines.saturating_sub(visible_lines)
}

pub fn execution_max_scroll(screen: Rect, app: &App) -> u16 {
    let (_, execution, _) = pane_areas(screen);
    let content = pane_content_area(execution);
    if content.width < 1 || content.height < 1 {
        return 0;
    }
    let total_lines = app.execution_lines(content_text_width(content)).len() as u16;
    let visible_lines = content.height.saturating_sub(TEXT_PADDING * 2);
    total_lines.saturating_sub(visible_lines)
}

pub fn active_pane_max_scroll(screen: Rect, app: &App) -> u16 {
    match app.active_pane {
        Pane::Log => log_max_scroll(screen, app),
        Pane::Execution => execution_max_scroll(screen, app),
    }
}

pub fn pane_hit_test(screen: Rect, x: u16, y: u16) -> Option<Pane> {
    let (log, execution, _) = pane_areas(screen);
    if point_in_rect(log, x, y) {
        return Some(Pane::Log);
    }
    if point_in_rect(execution, x, y) {
        return Some(Pane::Execution);
    }
    None
}

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let (log, execution, status) = pane_areas(frame.area());

    render_log_pane(frame, log, app, app.active_pane == Pane::Log, theme);
    render_execution_pane(
        frame,
        execution,
        app,
        app.active_pane == Pane::Execution,
        theme,
    );

    frame.render_widget(
        Block::default().style(Style::default().bg(theme.status_bg)),
        status,
    );
    let help = Paragraph::new(status_line_text(app))
        .style(Style::default().bg(theme.status_bg).fg(theme.muted_fg))
        .block(
            Block::default()
                .style(Style::default().bg(theme.status_bg))
                .padding(Padding::uniform(TEXT_PADDING)),
        );
    frame.render_widget(help, status);
}

fn render_log_pane(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let [title_area, content_area] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    render_title_bar(frame, title_area, "Flow Activity", active, theme.log_bg, theme);

    let width = content_text_width(content_area);
    let content = app.log_display_lines(width).join("\n");
    frame.render_widget(
        Paragraph::new(content)
            .style(Style::default().bg(theme.log_bg).fg(theme.text_fg))
            .scroll((app.log_scroll(), 0))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.log_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        content_area,
    );
}

fn render_execution_pane(frame: &mut Frame, area: Rect, app: &App, active: bool, theme: &Theme) {
    let [title_area, content_area] =
        Layout::vertical([Constraint::Length(TITLE_BAR_HEIGHT), Constraint::Min(0)]).areas(area);
    render_title_bar(
        frame,
        title_area,
        "Task Execution",
        active,
        theme.execution_bg,
        theme,
    );

    let width = content_text_width(content_area);
    let text = execution_text(&app.execution_lines(width), app.ticks, theme);
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().bg(theme.execution_bg).fg(theme.text_fg))
            .scroll((app.execution_scroll(), 0))
            .block(
                Block::default()
                    .style(Style::default().bg(theme.execution_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        content_area,
    );
}

fn render_title_bar(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    active: bool,
    base_bg: Color,
    theme: &Theme,
) {
    let title_bg = if active { ACTIVE_TITLE_BG } else { base_bg };
    let title_fg = if active { ACTIVE_TITLE_FG } else { theme.muted_fg };
    frame.render_widget(
        Block::default().style(Style::default().bg(title_bg)),
        area,
    );
    frame.render_widget(
        Paragraph::new(title)
            .style(Style::default().bg(title_bg).fg(title_fg))
            .block(
                Block::default()
                    .style(Style::default().bg(title_bg))
                    .padding(Padding::uniform(TEXT_PADDING)),
            ),
        area,
    );
}

fn execution_text(lines: &[ExecutionLine], ticks: u64, theme: &Theme) -> Text<'static> {
    let mut out: Vec<Line<'static>> = Vec::with_capacity(lines.len());
    for line in lines {
        let styled = match line.kind {
            ExecutionLineKind::Blank => Line::default(),
            ExecutionLineKind::SectionTitle => Line::from(Span::styled(
                line.text.clone(),
                Style::default()
                    .fg(theme.section_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            ExecutionLineKind::Headline => Line::from(Span::styled(
                line.text.clone(),
                Style::default().fg(theme.active_fg),
            )),
            ExecutionLineKind::Detail => Line::from(Span::styled(
                line.text.clone(),
                Style::default().fg(theme.muted_fg),
            )),
            ExecutionLineKind::ActiveDetail => Line::from(vec![
                Span::styled(
                    line.text.clone(),
                    Style::default().fg(theme.accent_fg),
                ),
                Span::styled(
                    format!(" {}", working_dots(ticks)),
                    Style::default().fg(theme.accent_fg),
                ),
            ]),
        };
        out.push(styled);
    }
    Text::from(out)
}

pub fn status_line_text(app: &App) -> String {
    let mut status = STATUS_HELP_TEXT.to_string();
    if let Some(progress) = app.progress_text() {
        status = format!("{progress} | {status}");
    }
    if app.feed_finished() {
        status = format!("Feed ended | {status}");
    } else if app.has_in_progress_entries() {
        status = format!("Working {} | {status}", working_dots(app.ticks));
    }
    status
}

fn working_dots(ticks: u64) -> &'static str {
    const FRAMES: [&str; 4] = ["", ".", "..", "..."];
    FRAMES[(ticks / 15 % 4) as usize]
}

fn point_in_rect(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

#[cfg(test)]
#[path = "../tests/unit/ui_tests.rs"]
mod tests;
