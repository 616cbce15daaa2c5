//! Prediction result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{MessageKind, OutcomeMessage, PatientRecord};
use crate::tui::styles::ClinicTheme;

/// What the last request produced
#[derive(Debug, Clone)]
pub struct ResultState {
    pub message: OutcomeMessage,
    /// Record sent to the model, when assembly succeeded
    pub record: Option<PatientRecord>,
}

/// Render the result of the last request
pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(7), // Message
            Constraint::Min(0),    // Record
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    render_message(f, chunks[1], &state.message);
    render_record(f, chunks[2], state.record.as_ref());
    render_result_footer(f, chunks[3]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicTheme::text()),
        Span::styled("Prediction", ClinicTheme::title()),
        Span::styled(" │ Viral suppression", ClinicTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_message(f: &mut Frame, area: Rect, message: &OutcomeMessage) {
    let style = ClinicTheme::message(message.kind);
    let heading = match message.kind {
        MessageKind::Success => "OK Suppressed",
        MessageKind::Warning => "! Needs assessment",
        MessageKind::Error | MessageKind::Fatal => "! Error",
    };

    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(heading, style.add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(message.text.as_str(), ClinicTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).border_style(style));

    f.render_widget(content, area);
}

fn render_record(f: &mut Frame, area: Rect, record: Option<&PatientRecord>) {
    let block = Block::default()
        .title(Span::styled(" Record ", ClinicTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicTheme::border());

    let lines: Vec<Line> = match record {
        Some(record) => record
            .columns()
            .iter()
            .zip(record.values())
            .map(|(column, value)| {
                Line::from(vec![
                    Span::styled(format!(" {:<26}", column.name()), ClinicTheme::text_secondary()),
                    Span::styled(value.to_string(), ClinicTheme::text()),
                ])
            })
            .collect(),
        None => vec![Line::from(Span::styled(
            " No record was sent to the model",
            ClinicTheme::text_muted(),
        ))],
    };

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[Enter] ", ClinicTheme::key_hint()),
        Span::styled("Edit & Retry ", ClinicTheme::key_desc()),
        Span::styled("[N] ", ClinicTheme::key_hint()),
        Span::styled("New Client ", ClinicTheme::key_desc()),
        Span::styled("[Esc] ", ClinicTheme::key_hint()),
        Span::styled("Quit", ClinicTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}
