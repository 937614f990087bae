use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, FocusArea, InputComposer};
use crate::chat::{MessageKind, SessionPhase, Speaker, is_valid_backend_url, relay_text};

mod theme;
use theme::*;

const RESPONSE_PANEL_HEIGHT: u16 = 8;

pub fn render(f: &mut Frame<'_>, app: &App) {
    let size = f.size();
    if size.width < 60 || size.height < 20 {
        let block = Paragraph::new("終端機視窗過小，請調整至至少 60x20。")
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .title("Argo CD Chat")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(FG_PRIMARY).bg(BG_PANEL)),
            )
            .style(Style::default().fg(FG_PRIMARY).bg(BG_PRIMARY));
        f.render_widget(block, size);
        return;
    }

    let base = Block::default().style(Style::default().bg(BG_PRIMARY));
    f.render_widget(base, size);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(size);

    render_top_bar(f, app, vertical[0]);

    let workspace = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(vertical[1]);
    render_applications(f, app, workspace[0]);
    render_chat(f, app, workspace[1]);

    render_status_bar(f, app, vertical[2]);
}

fn pane_block(title: impl Into<String>, focused: bool) -> Block<'static> {
    pane_frame(focused).title(Span::styled(title.into(), Style::default().fg(FG_PRIMARY)))
}

fn pane_frame(focused: bool) -> Block<'static> {
    let border = if focused {
        Style::default()
            .fg(BORDER_FOCUS)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(BORDER_IDLE)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(BG_PANEL))
}

fn render_top_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(40)])
        .split(area);

    let focused = app.focus == FocusArea::Endpoint;
    let (marker, marker_color) = if is_valid_backend_url(app.chat.endpoint_input()) {
        ("OK", VALID_FG)
    } else {
        ("INVALID", MESSAGE_ERROR)
    };
    let block = pane_frame(focused).title(Line::from(vec![
        Span::styled("Backend URL [", Style::default().fg(FG_PRIMARY)),
        Span::styled(marker, Style::default().fg(marker_color)),
        Span::styled("] (Enter apply / Ctrl+S save)", Style::default().fg(FG_PRIMARY)),
    ]));
    render_input(
        f,
        &app.endpoint_input,
        block,
        "http://localhost:5000/chat",
        focused,
        columns[0],
    );

    let session_text = match app.chat.session() {
        Some(session) => format!("{} | {}", session.resource_id(), session.phase().label()),
        None => String::from("no application selected"),
    };
    let session = Paragraph::new(Line::from(Span::styled(
        session_text,
        Style::default().fg(FG_PRIMARY),
    )))
    .block(pane_block("Session", false));
    f.render_widget(session, columns[1]);
}

fn render_applications(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = pane_block(
        format!("Applications ({})", app.chat.applications().len()),
        app.focus == FocusArea::Applications,
    );
    let selected = app.chat.session().map(|session| session.resource_id());

    if app.chat.applications().is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No applications (Ctrl+L to reload)",
            Style::default().fg(FG_DIM),
        )))
        .wrap(Wrap { trim: true })
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .chat
        .applications()
        .iter()
        .map(|name| {
            let active = selected == Some(name.as_str());
            let (prefix, style) = if active {
                (
                    "● ",
                    Style::default()
                        .fg(SPEAKER_AGENT)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default().fg(FG_PRIMARY))
            };
            ListItem::new(Line::from(Span::styled(format!("{prefix}{name}"), style)))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(app.app_cursor));

    let list = List::new(items)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .highlight_style(
            Style::default()
                .bg(LIST_HIGHLIGHT_BG)
                .fg(LIST_HIGHLIGHT_FG)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(list, area, &mut state);
}

fn render_chat(f: &mut Frame<'_>, app: &App, area: Rect) {
    let session = app.chat.session();
    let proposal = session.and_then(|session| session.pending_proposal());
    let outcome = session.and_then(|session| session.last_outcome());

    let mut constraints = vec![Constraint::Min(5)];
    if proposal.is_some() {
        constraints.push(Constraint::Length(1));
    }
    if outcome.is_some() {
        constraints.push(Constraint::Length(RESPONSE_PANEL_HEIGHT));
    }
    constraints.push(Constraint::Length(4));

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut index = 0;
    render_history(f, app, sections[index]);
    index += 1;

    if let Some(proposal) = proposal {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(
                " Suggested: ",
                Style::default()
                    .fg(SUGGESTION_FG)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(proposal.summary(), Style::default().fg(FG_PRIMARY)),
            Span::styled(" (Ctrl+R to run)", Style::default().fg(FG_DIM)),
        ]))
        .style(Style::default().bg(SUGGESTION_BG));
        f.render_widget(banner, sections[index]);
        index += 1;
    }

    if let Some(outcome) = outcome {
        let block = pane_block("API Response (Ctrl+T to send to agent)", false);
        let width = block.inner(sections[index]).width.max(1) as usize;
        let mut lines = Vec::new();
        for line in relay_text(outcome).lines() {
            push_wrapped_line(&mut lines, line, Style::default().fg(FG_PRIMARY), width);
        }
        let response = Paragraph::new(lines).block(block);
        f.render_widget(response, sections[index]);
        index += 1;
    }

    let focused = app.focus == FocusArea::Chat;
    let input_block = pane_block("Message (Enter send / Alt+Enter newline)", focused);
    render_input(
        f,
        &app.chat_input,
        input_block,
        "Ask the agent about this application…",
        focused,
        sections[index],
    );
}

fn render_history(f: &mut Frame<'_>, app: &App, area: Rect) {
    let session = app.chat.session();
    let title = match session {
        Some(session) => format!("Conversation: {}", session.resource_id()),
        None => String::from("Conversation"),
    };
    let block = pane_block(title, false);
    let wrap_width = block.inner(area).width.max(1) as usize;

    let Some(session) = session else {
        let hint = Paragraph::new(Line::from(Span::styled(
            "Select an application to start chatting.",
            Style::default().fg(FG_DIM),
        )))
        .block(block);
        f.render_widget(hint, area);
        return;
    };

    let mut items: Vec<ListItem> = session
        .messages()
        .iter()
        .map(|message| {
            let mut lines = Vec::new();
            let speaker_color = match message.speaker {
                Speaker::User => SPEAKER_USER,
                Speaker::Agent => SPEAKER_AGENT,
            };
            let mut title = format!(
                "{} · {}",
                message.speaker.label(),
                message.timestamp.format("%H:%M:%S")
            );
            if message.kind == MessageKind::RelayedResult {
                title.push_str(" · Relayed result");
            }
            lines.push(Line::from(Span::styled(
                title,
                Style::default()
                    .fg(speaker_color)
                    .add_modifier(Modifier::BOLD),
            )));
            let body_style = match message.kind {
                MessageKind::Error => Style::default().fg(MESSAGE_ERROR),
                MessageKind::RelayedResult => Style::default().fg(FG_DIM),
                MessageKind::Text => Style::default().fg(FG_PRIMARY),
            };
            for line in message.text.lines() {
                push_wrapped_line(&mut lines, line, body_style, wrap_width);
            }
            lines.push(Line::from(""));
            ListItem::new(lines)
        })
        .collect();

    match session.phase() {
        SessionPhase::ContextPending => items.push(ListItem::new(Line::from(Span::styled(
            "Loading application info...",
            Style::default().fg(FG_DIM).add_modifier(Modifier::ITALIC),
        )))),
        SessionPhase::AwaitingReply => items.push(ListItem::new(Line::from(Span::styled(
            "Agent is thinking...",
            Style::default().fg(FG_DIM).add_modifier(Modifier::ITALIC),
        )))),
        _ => {}
    }

    // Keep the newest entry in view.
    let mut state = ListState::default();
    if !items.is_empty() {
        state.select(Some(items.len() - 1));
    }

    let list = List::new(items)
        .block(block)
        .style(Style::default().bg(BG_PANEL));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_input(
    f: &mut Frame<'_>,
    input: &InputComposer,
    block: Block<'_>,
    placeholder: &str,
    focused: bool,
    area: Rect,
) {
    let inner = block.inner(area);
    let lines: Vec<Line> = if input.is_empty() {
        vec![Line::from(Span::styled(
            placeholder.to_string(),
            Style::default().fg(FG_DIM),
        ))]
    } else {
        input
            .buffer()
            .split('\n')
            .map(|line| {
                Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(FG_PRIMARY),
                ))
            })
            .collect()
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(BG_PANEL))
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Left);

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);

    if focused {
        let width = inner.width.max(1) as usize;
        let (cursor_col, cursor_row) = input.cursor_display_position(width);
        let cursor_x = inner
            .x
            .saturating_add(cursor_col.min(width.saturating_sub(1) as u16));
        let cursor_y = inner
            .y
            .saturating_add(cursor_row.min(inner.height.saturating_sub(1)));
        f.set_cursor(cursor_x, cursor_y);
    }
}

fn push_wrapped_line(lines: &mut Vec<Line>, text: &str, style: Style, width: usize) {
    for segment in wrap_to_width(text, width) {
        lines.push(Line::from(Span::styled(segment, style)));
    }
}

fn wrap_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    if text.is_empty() {
        return vec![String::new()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(1).max(1);
        if current_width + ch_width > width && !current.is_empty() {
            result.push(current);
            current = String::new();
            current_width = 0;
        }
        current.push(ch);
        current_width += ch_width;
    }
    result.push(current);
    result
}

fn render_status_bar(f: &mut Frame<'_>, app: &App, area: Rect) {
    f.render_widget(Clear, area);
    let focus = format!("[{}] ", app.focus.label());
    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled(
            focus,
            Style::default().fg(BAR_TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.status_message.clone(), Style::default().fg(BAR_TEXT)),
    ]))
    .style(Style::default().fg(BAR_TEXT).bg(BAR_BG))
    .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}
