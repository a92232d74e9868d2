use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::chat::{Entry, Role, Transcript};
use crate::tui::app::{ConsulApp, InputMode};
use crate::tui::scroll::ScrollState;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];
const MAX_INPUT_ROWS: usize = 5;

/// Render the main UI
pub fn render_ui(f: &mut Frame, app: &mut ConsulApp) {
    let input_rows = app.input().split('\n').count().clamp(1, MAX_INPUT_ROWS) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),              // Status bar
            Constraint::Min(5),                 // Transcript
            Constraint::Length(input_rows + 2), // Input box
        ])
        .split(f.size());

    render_status_bar(f, app, chunks[0]);
    render_transcript(f, app.transcript_mut(), chunks[1]);
    render_input_box(f, app, chunks[2], input_rows);
}

fn render_status_bar(f: &mut Frame, app: &ConsulApp, area: Rect) {
    let state = match app.pending_request() {
        Some(request) => Span::styled(
            format!("Enviando {request} {}", SPINNER[app.ticks() % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ),
        None => Span::styled("Listo", Style::default().fg(Color::Green)),
    };

    let mode = match app.input_mode() {
        InputMode::Editing => "Esc: navegar",
        InputMode::Normal => "e: escribir | q: salir | j/k: desplazar",
    };

    let status_text = Line::from(vec![
        Span::styled("Servidor: ", Style::default().fg(Color::Gray)),
        Span::styled(app.server_url(), Style::default().fg(Color::Cyan)),
        Span::styled(" | Sesión: ", Style::default().fg(Color::Gray)),
        Span::styled(short_session(app.session_id()), Style::default().fg(Color::Cyan)),
        Span::styled(" | Estado: ", Style::default().fg(Color::Gray)),
        state,
        Span::styled(format!(" | {mode}"), Style::default().fg(Color::DarkGray)),
    ]);

    let status_bar = Paragraph::new(Text::from(vec![status_text]))
        .block(Block::default().borders(Borders::ALL).title("Asistente Consular"));

    f.render_widget(status_bar, area);
}

fn short_session(session_id: &str) -> &str {
    session_id.get(..8).unwrap_or(session_id)
}

fn role_color(role: Role) -> Color {
    match role {
        Role::User => Color::Cyan,
        Role::Assistant => Color::Green,
    }
}

/// Lines for one entry, with the text already wrapped to `columns`. The header
/// is short enough to stay on one row and is clipped on very narrow panes.
fn entry_lines(entry: &Entry, columns: usize) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("[{}] ", entry.created_at.format("%H:%M")),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("{}:", entry.role.label()),
            Style::default()
                .fg(role_color(entry.role))
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    for text_line in entry.text.split('\n') {
        lines.extend(wrap_text(text_line, columns).into_iter().map(Line::from));
    }
    lines.push(Line::from(""));

    lines
}

/// Word-wrap one line of text into rows at most `columns` display columns
/// wide. A word longer than a row is split across rows. The space a row breaks
/// on is dropped; every other space is kept.
fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut rows = Vec::new();
    let mut row = String::new();
    let mut row_width = 0;
    let mut at_row_start = true;

    for word in text.split(' ') {
        let gap = usize::from(!at_row_start);
        let word_width = UnicodeWidthStr::width(word);

        if row_width + gap + word_width <= columns {
            if gap == 1 {
                row.push(' ');
            }
            row.push_str(word);
            row_width += gap + word_width;
            at_row_start = false;
            continue;
        }

        if !at_row_start {
            rows.push(std::mem::take(&mut row));
            row_width = 0;
        }

        for ch in word.chars() {
            let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
            if row_width > 0 && row_width + ch_width > columns {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            row.push(ch);
            row_width += ch_width;
        }
        at_row_start = false;
    }

    rows.push(row);
    rows
}

fn render_transcript(f: &mut Frame, transcript: &mut Transcript<ScrollState>, area: Rect) {
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let lines: Vec<Line> = if transcript.is_empty() {
        vec![Line::from(Span::styled(
            "Escribe tu pregunta sobre trámites consulares y pulsa Enter.",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        transcript
            .entries()
            .iter()
            .flat_map(|entry| entry_lines(entry, inner_width as usize))
            .collect()
    };

    // Every line is at most one row wide, so the row count is the line count.
    let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
    let scroll = transcript.surface_mut();
    scroll.fit(total, inner_height);
    let top = scroll.top_row(total, inner_height);

    let title = if scroll.follows_tail() {
        "Conversación"
    } else {
        "Conversación (desplazada, End para volver)"
    };

    let view = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((top, 0));

    f.render_widget(view, area);
}

fn render_input_box(f: &mut Frame, app: &ConsulApp, area: Rect, input_rows: u16) {
    let sending = app.is_sending();
    let title = if sending {
        "Pregunta (esperando respuesta...)"
    } else {
        "Pregunta (Enter envía, Shift+Enter nueva línea)"
    };

    let input_lines: Vec<&str> = app.input().split('\n').collect();
    let hidden = input_lines.len().saturating_sub(input_rows as usize);

    let input = Paragraph::new(app.input())
        .scroll((u16::try_from(hidden).unwrap_or(u16::MAX), 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().fg(if sending || app.input_mode() == InputMode::Normal {
                    Color::DarkGray
                } else {
                    Color::White
                })),
        );

    f.render_widget(input, area);

    // Show cursor while the field accepts a submission
    if !sending && app.input_mode() == InputMode::Editing {
        let last = input_lines.last().copied().unwrap_or("");
        let row = input_lines.len().saturating_sub(hidden).saturating_sub(1);
        let (x, y) = cursor_position(area, last, row);
        f.set_cursor(x, y);
    }
}

/// Cursor cell after `last_line`, on visible `row` of a bordered box. Stays
/// inside the border however long the line is.
fn cursor_position(area: Rect, last_line: &str, row: usize) -> (u16, u16) {
    let column = u16::try_from(UnicodeWidthStr::width(last_line)).unwrap_or(u16::MAX);
    let row = u16::try_from(row).unwrap_or(u16::MAX);

    let inner_x = area.x.saturating_add(1);
    let inner_y = area.y.saturating_add(1);
    let last_x = inner_x.saturating_add(area.width.saturating_sub(3));
    let last_y = inner_y.saturating_add(area.height.saturating_sub(3));

    (
        inner_x.saturating_add(column).min(last_x),
        inner_y.saturating_add(row).min(last_y),
    )
}
