//! Rendering for the download screen

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row as TableRow, Table, Wrap},
    Frame,
};

use super::app::App;
use crate::batch::BatchState;

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header() -> Style {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default().fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default().fg(Color::Green)
    }

    pub fn info() -> Style {
        Style::default().fg(Color::Cyan)
    }

    pub fn inactive() -> Style {
        Style::default().fg(Color::Gray)
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.size());

    draw_title(f, app, chunks[0]);
    match app.state {
        BatchState::Aborted => draw_error(f, app, chunks[1]),
        BatchState::Completed => draw_summary(f, app, chunks[1]),
        BatchState::Idle | BatchState::Running => draw_preview(f, app, chunks[1]),
    }
    draw_progress(f, app, chunks[2]);
    draw_status(f, app, chunks[3]);
    draw_help(f, app, chunks[4]);
}

fn draw_title(f: &mut Frame, app: &App, area: Rect) {
    let title = Paragraph::new(Line::from(vec![
        Span::styled("PDF download from CSV  ", Styles::title()),
        Span::raw(app.input.display().to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn draw_preview(f: &mut Frame, app: &App, area: Rect) {
    let header = TableRow::new(vec![
        Cell::from("#"),
        Cell::from(app.config.columns.name.as_str()),
        Cell::from(app.config.columns.url.as_str()),
    ])
    .style(Styles::header());

    let rows = app.preview.iter().map(|row| {
        TableRow::new(vec![
            Cell::from(row.position.to_string()),
            Cell::from(row.name.clone()),
            Cell::from(row.url.clone()),
        ])
    });

    let title = format!(
        "Preview (first {} of {} rows)",
        app.preview.len(),
        app.total_rows
    );
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Percentage(35),
            Constraint::Percentage(60),
        ],
    )
    .header(header)
    .block(Block::default().title(title).borders(Borders::ALL));

    f.render_widget(table, area);
}

fn draw_summary(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if let Some(summary) = &app.summary {
        lines.push(Line::from(Span::styled(
            format!("{} PDF(s) downloaded", summary.successful),
            Styles::success(),
        )));
        lines.push(Line::from(Span::styled(
            format!("{} row(s) failed", summary.failed),
            if summary.failed > 0 { Styles::error() } else { Styles::inactive() },
        )));
        lines.push(Line::from(format!(
            "Files saved in: {}",
            summary.output_dir.display()
        )));
        for row in summary.rows.iter().filter(|r| r.reason.is_some()) {
            lines.push(Line::from(Span::styled(
                format!(
                    "  row {}: {}",
                    row.position,
                    row.reason.as_deref().unwrap_or_default()
                ),
                Styles::inactive(),
            )));
        }
    }

    let summary = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Summary").borders(Borders::ALL));
    f.render_widget(summary, area);
}

fn draw_error(f: &mut Frame, app: &App, area: Rect) {
    let message = app.error_message.as_deref().unwrap_or("Unknown error");
    let error = Paragraph::new(message)
        .style(Styles::error())
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Error").borders(Borders::ALL));
    f.render_widget(error, area);
}

fn draw_progress(f: &mut Frame, app: &App, area: Rect) {
    let ratio = match app.state {
        BatchState::Idle => 0.0,
        _ => app.progress.fraction(),
    };
    let gauge = Gauge::default()
        .block(Block::default().title("Progress").borders(Borders::ALL))
        .gauge_style(Styles::info())
        .ratio(ratio)
        .label(format!("{}/{}", app.progress.completed, app.progress.total));
    f.render_widget(gauge, area);
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let style = if app.last_failed {
        Styles::error()
    } else {
        Styles::info()
    };
    let text = app.status_message.as_deref().unwrap_or("Ready");
    let status = Paragraph::new(text)
        .style(style)
        .block(Block::default().title("Status").borders(Borders::ALL));
    f.render_widget(status, area);
}

fn draw_help(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.state {
        BatchState::Idle => "Enter/s: start download | q/Esc: quit",
        BatchState::Running => "Downloading... | q/Esc: quit",
        BatchState::Completed | BatchState::Aborted => "q/Esc: quit",
    };
    f.render_widget(Paragraph::new(text).style(Styles::inactive()), area);
}
