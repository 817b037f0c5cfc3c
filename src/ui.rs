//! Terminal UI rendering for the board.
//!
//! Minimal chrome: columns are separated by whitespace, the cursor uses the
//! REVERSED modifier so it adapts to the terminal theme, and the bottom line
//! shows either the keymap or the active input prompt.
//!
//! This module renders from RenderState (immutable snapshot) - it never
//! mutates application state.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::render::{ColumnView, RenderState, TaskView};
use crate::tea::{InputKind, Mode, Notification, NotificationLevel};

const COLOR_TEXT_DIMMED: Color = Color::Gray;
const COLOR_TEXT_MUTED: Color = Color::DarkGray;
const COLOR_SEPARATOR: Color = Color::White;
const COLOR_TAG: Color = Color::Cyan;
const COLOR_DUE: Color = Color::Yellow;
const COLOR_HELD: Color = Color::Magenta;

const COLUMN_GAP: u16 = 2;
// Title + description + blank line above the task rows.
const COLUMN_HEADER_HEIGHT: u16 = 3;

// -----------------------------------------------------------------------------
// Context-sensitive keymap system
// -----------------------------------------------------------------------------

/// Context for determining which keybindings to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeymapContext {
    Browse { has_task: bool },
    Drag,
    TextInput,
    DeleteConfirm,
}

impl KeymapContext {
    pub fn from_render_state(state: &RenderState) -> Self {
        match &state.mode {
            Mode::Input(InputKind::Confirm) => KeymapContext::DeleteConfirm,
            Mode::Input(_) => KeymapContext::TextInput,
            Mode::Drag(_) => KeymapContext::Drag,
            Mode::Browse => KeymapContext::Browse {
                has_task: state.selected_task().is_some(),
            },
        }
    }
}

struct Keybinding(&'static str, &'static str);

struct KeybindingGroup(Vec<Keybinding>);

fn keybindings_for_context(ctx: KeymapContext) -> Vec<KeybindingGroup> {
    match ctx {
        KeymapContext::Browse { has_task } => {
            let task_actions = if has_task {
                vec![
                    Keybinding("e", "edit"),
                    Keybinding("E", "describe"),
                    Keybinding("x", "done"),
                    Keybinding("m", "move"),
                    Keybinding("+/-", "tag"),
                    Keybinding("s/S/X", "subtask"),
                    Keybinding("u", "due"),
                    Keybinding("d", "delete"),
                ]
            } else {
                vec![]
            };

            vec![
                KeybindingGroup(vec![Keybinding("a", "task"), Keybinding("A", "column")]),
                KeybindingGroup(task_actions),
                KeybindingGroup(vec![
                    Keybinding("r", "rename"),
                    Keybinding("c", "describe"),
                    Keybinding("M", "move"),
                    Keybinding("D", "delete"),
                ]),
                KeybindingGroup(vec![
                    Keybinding("t", "title"),
                    Keybinding("o", "export"),
                    Keybinding("i", "import"),
                    Keybinding("q", "quit"),
                ]),
            ]
        }
        KeymapContext::Drag => vec![KeybindingGroup(vec![
            Keybinding("hjkl", "move"),
            Keybinding("Enter", "drop"),
        ])],
        KeymapContext::TextInput => vec![KeybindingGroup(vec![
            Keybinding("Enter", "submit"),
            Keybinding("Esc", "cancel"),
        ])],
        KeymapContext::DeleteConfirm => vec![KeybindingGroup(vec![
            Keybinding("y/Enter", "delete"),
            Keybinding("n/Esc", "cancel"),
        ])],
    }
}

/// Main render function - entry point for all UI drawing.
pub fn draw(frame: &mut Frame, state: &RenderState) {
    render_main_layout(frame, state);

    if let Some(ref notification) = state.notification {
        render_notification(frame, notification, frame.area());
    }
}

/// Header + separator + columns + status bar.
fn render_main_layout(frame: &mut Frame, state: &RenderState) {
    let area = frame.area();

    if area.height < 4 {
        render_statusbar(frame, state, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_header(frame, state, chunks[0]);
    render_separator(frame, chunks[1]);
    render_columns(frame, state, chunks[2]);
    render_statusbar(frame, state, chunks[3]);
}

fn render_header(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = Line::from(vec![
        Span::styled(
            truncate(&state.title, area.width as usize),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  {} tasks · {} done",
                state.task_count, state.completed_count
            ),
            Style::default().fg(COLOR_TEXT_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_separator(frame: &mut Frame, area: Rect) {
    let solid = "─".repeat(area.width as usize);
    let line = Line::from(Span::styled(solid, Style::default().fg(COLOR_SEPARATOR)));
    frame.render_widget(Paragraph::new(line), area);
}

fn render_columns(frame: &mut Frame, state: &RenderState, area: Rect) {
    if state.columns.is_empty() {
        let msg = Line::from(Span::styled(
            "No columns. Press 'A' to add one.",
            Style::default().fg(COLOR_TEXT_DIMMED),
        ));
        frame.render_widget(Paragraph::new(msg), area);
        return;
    }

    let count = state.columns.len() as u32;
    let constraints: Vec<Constraint> = (0..count).map(|_| Constraint::Ratio(1, count)).collect();
    let areas = Layout::horizontal(constraints)
        .spacing(COLUMN_GAP)
        .split(area);

    for (index, (column, column_area)) in state.columns.iter().zip(areas.iter()).enumerate() {
        let selected_row = (index == state.cursor.column).then_some(state.cursor.task);
        render_column(frame, column, selected_row, index == state.cursor.column, *column_area);
    }
}

/// Render one column: title, description, then tasks with scrolloff.
fn render_column(
    frame: &mut Frame,
    column: &ColumnView,
    selected_row: Option<usize>,
    is_current: bool,
    area: Rect,
) {
    let width = area.width as usize;
    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);

    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if is_current {
        title_style = title_style.add_modifier(Modifier::UNDERLINED);
    }
    if column.held {
        title_style = title_style.fg(COLOR_HELD);
    }
    let title = format!("{} ({})", column.title, column.tasks.len());
    lines.push(Line::from(Span::styled(truncate(&title, width), title_style)));
    lines.push(Line::from(Span::styled(
        truncate(column.description.as_deref().unwrap_or(""), width),
        Style::default().fg(COLOR_TEXT_MUTED),
    )));
    lines.push(Line::default());

    let content_height = area.height.saturating_sub(COLUMN_HEADER_HEIGHT) as usize;
    let selected = selected_row.unwrap_or(0);
    let center = content_height / 2;
    let start = selected.saturating_sub(center);
    let end = (start + content_height).min(column.tasks.len());
    let start = end.saturating_sub(content_height);

    lines.extend(
        column
            .tasks
            .iter()
            .enumerate()
            .skip(start)
            .take(content_height)
            .map(|(row, task)| render_task_row(task, selected_row == Some(row), width)),
    );

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_task_row(task: &TaskView, is_selected: bool, width: usize) -> Line<'static> {
    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    let marker = if task.held { "▸ " } else { "" };

    let mut suffix: Vec<(String, Color)> = Vec::new();
    if let Some(due) = task.due_date {
        suffix.push((format!(" {}", due.format("%m-%d")), COLOR_DUE));
    }
    if task.subtasks.1 > 0 {
        suffix.push((
            format!(" {}/{}", task.subtasks.0, task.subtasks.1),
            COLOR_TEXT_DIMMED,
        ));
    }
    for tag in &task.tags {
        suffix.push((format!(" #{}", tag), COLOR_TAG));
    }
    if task.description.is_some() {
        suffix.push((" …".to_string(), COLOR_TEXT_MUTED));
    }

    let fixed = checkbox.chars().count() + marker.chars().count();
    let suffix_width: usize = suffix.iter().map(|(s, _)| s.chars().count()).sum();
    let content_width = width
        .saturating_sub(fixed)
        .saturating_sub(suffix_width)
        .max(width.saturating_sub(fixed).min(8));
    let content = truncate(&task.content, content_width);

    let mut content_style = Style::default();
    if task.completed {
        content_style = content_style
            .fg(COLOR_TEXT_DIMMED)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if task.held {
        content_style = content_style.fg(COLOR_HELD).add_modifier(Modifier::BOLD);
    }

    let mut spans = vec![
        Span::styled(marker.to_string(), Style::default().fg(COLOR_HELD)),
        Span::styled(checkbox.to_string(), Style::default().fg(COLOR_TEXT_DIMMED)),
        Span::styled(content, content_style),
    ];
    spans.extend(
        suffix
            .into_iter()
            .map(|(text, color)| Span::styled(text, Style::default().fg(color))),
    );

    if is_selected {
        let selected = Style::default().add_modifier(Modifier::REVERSED);
        spans = spans
            .into_iter()
            .map(|span| {
                let style = span.style.patch(selected);
                span.style(style)
            })
            .collect();
    }

    Line::from(spans)
}

/// Bottom line: the input prompt in input mode, otherwise the keymap toggle.
fn render_statusbar(frame: &mut Frame, state: &RenderState, area: Rect) {
    let line = match &state.mode {
        Mode::Input(kind) => render_input_line(state, *kind),
        _ => render_keymap_line(state),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Shows just "?" when collapsed, "? │ <keymap>" when expanded. Drag mode
/// always shows its short legend.
fn render_keymap_line(state: &RenderState) -> Line<'static> {
    let ctx = KeymapContext::from_render_state(state);
    let groups = keybindings_for_context(ctx);
    let expanded = state.show_keymap || ctx == KeymapContext::Drag;

    let key_style = Style::default().fg(COLOR_TEXT_DIMMED);
    let desc_style = Style::default().fg(COLOR_TEXT_MUTED);
    let sep_style = Style::default().fg(COLOR_TEXT_MUTED);

    let help_style = if expanded {
        Style::default()
    } else {
        Style::default().fg(COLOR_TEXT_MUTED)
    };
    let mut spans: Vec<Span> = vec![Span::styled("?", help_style)];

    if expanded {
        if ctx == KeymapContext::Drag {
            spans.push(Span::styled(" │ ", sep_style));
            spans.push(Span::styled("MOVING", Style::default().fg(COLOR_HELD)));
        }
        for group in groups.iter() {
            if group.0.is_empty() {
                continue;
            }
            spans.push(Span::styled(" │ ", sep_style));
            for (key_idx, keybinding) in group.0.iter().enumerate() {
                if key_idx > 0 {
                    spans.push(Span::styled(" • ", sep_style));
                }
                spans.push(Span::styled(keybinding.0, key_style));
                spans.push(Span::styled(format!(" {}", keybinding.1), desc_style));
            }
        }
    }

    Line::from(spans)
}

fn render_input_line(state: &RenderState, kind: InputKind) -> Line<'static> {
    let hint_style = Style::default().fg(COLOR_TEXT_MUTED);
    let label_style = Style::default().fg(Color::Reset);
    let input_style = Style::default().fg(Color::White);
    let cursor_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::SLOW_BLINK);

    let mut spans = vec![
        Span::styled("Enter ", hint_style),
        Span::styled("• ", hint_style),
        Span::styled("Esc ", hint_style),
        Span::styled(" ", hint_style),
    ];

    if matches!(kind, InputKind::Confirm) {
        let what = state.pending_delete.clone().unwrap_or_default();
        spans.push(Span::styled(format!("{} ", kind.label()), label_style));
        spans.push(Span::styled(what, hint_style));
    } else {
        spans.push(Span::styled(format!("{}: ", kind.label()), label_style));
        spans.push(Span::styled(state.input_buffer.clone(), input_style));
        spans.push(Span::styled("_", cursor_style));
    }

    Line::from(spans)
}

/// Render notification message on the bottom line of the screen.
fn render_notification(frame: &mut Frame, notification: &Notification, area: Rect) {
    let notification_area = Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    frame.render_widget(Clear, notification_area);

    let line = match notification.level {
        NotificationLevel::Error => Line::from(vec![
            Span::styled(
                "Error: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                notification.message.clone(),
                Style::default().fg(Color::Red),
            ),
        ]),
        NotificationLevel::Info => Line::from(Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::Green),
        )),
    };

    frame.render_widget(Paragraph::new(line), notification_area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 1).collect();
        format!("{}~", truncated)
    }
}
