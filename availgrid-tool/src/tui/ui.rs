use availgrid_core::{StatusKind, Weekday};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use super::app::{App, AppMode, Form, FormField, TimePart, TimePicker};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Status
            Constraint::Length(1), // Key help
        ])
        .split(frame.area());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(20)])
        .split(chunks[1]);

    let sidebar = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(6)])
        .split(body[0]);

    render_header(frame, app, chunks[0]);
    render_students(frame, app, sidebar[0]);
    render_settings(frame, app, sidebar[1]);
    render_grid(frame, app, body[1]);
    render_status(frame, app, chunks[2]);
    render_help(frame, app, chunks[3]);

    match app.mode {
        AppMode::AddStudent => render_add_popup(frame, app),
        AppMode::ConfirmDelete => render_confirm_popup(frame, app),
        AppMode::BusyForm => {
            let title = match app.session.roster().active() {
                Some(name) => format!("Busy block for {}", name),
                None => "Busy block".to_string(),
            };
            render_form_popup(frame, &title, &app.busy_form);
        }
        AppMode::GridForm => render_form_popup(frame, "Timetable window", &app.grid_form),
        AppMode::Browse => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("{}  ({})", app.title, app.client.base_url());
    let header =
        Paragraph::new(title).style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(header, area);
}

fn render_students(frame: &mut Frame, app: &App, area: Rect) {
    let roster = app.session.roster();
    let items: Vec<ListItem> = roster
        .students()
        .iter()
        .map(|name| {
            let checked = if roster.selection().contains(name) { "[x]" } else { "[ ]" };
            let is_active = roster.active() == Some(name.as_str());
            let marker = if is_active { "*" } else { " " };
            let style = if is_active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            ListItem::new(format!("{} {} {}", checked, marker, name)).style(style)
        })
        .collect();

    let title = format!(
        "Students ({}/{})",
        roster.selection().len(),
        roster.students().len()
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    let mut state = ListState::default();
    if !roster.students().is_empty() {
        state.select(Some(app.cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let request = app.session.request();

    let days: Vec<Span> = Weekday::ALL
        .iter()
        .enumerate()
        .map(|(i, day)| {
            let style = if request.days.contains(day) {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{}{} ", i + 1, &day.label()[..2]), style)
        })
        .collect();

    let lines = vec![
        Line::from(days),
        Line::from(format!(
            "{} - {}",
            request.start.display(),
            request.end.display()
        )),
        Line::from(format!("Slot: {} min", request.slot_minutes)),
        Line::from(Span::styled(
            format!("Export to {}", app.export_dir.display()),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("Window"))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Timetable");

    let Some(grid) = app.session.grid() else {
        let hint = Paragraph::new("Press g to load the timetable.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let mut header = vec![Cell::from("Time")];
    header.extend(grid.days().map(|d| Cell::from(d.label())));
    let header = Row::new(header).style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = grid
        .row_times()
        .into_iter()
        .enumerate()
        .skip(app.grid_scroll)
        .map(|(row, (start, _))| {
            let mut cells = vec![Cell::from(start.display())];
            for column in 0..grid.columns.len() {
                let cell = match grid.cell(column, row) {
                    Some(cell) if cell.is_free => Cell::from(cell.names.join(", "))
                        .style(Style::default().fg(Color::Green)),
                    _ => Cell::from("Busy").style(Style::default().fg(Color::Red)),
                };
                cells.push(cell);
            }
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Length(9)];
    widths.extend(grid.columns.iter().map(|_| Constraint::Fill(1)));

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.is_loading_grid() {
        Span::styled(
            "Loading timetable...",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )
    } else {
        match app.session.status() {
            Some(status) => {
                let color = match status.kind {
                    StatusKind::Success => Color::Green,
                    StatusKind::Error => Color::Red,
                };
                Span::styled(status.message.clone(), Style::default().fg(color))
            }
            None => Span::raw(""),
        }
    };
    frame.render_widget(Paragraph::new(Line::from(line)), area);
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help = match app.mode {
        AppMode::Browse => {
            "Space: Select  a/n: All/None  Enter: Active  +: Add  d: Delete  b: Busy  \
             1-7: Days  [/]: Slot  p: Window  g: Load  r: Reload  e: Export  q: Quit"
        }
        AppMode::AddStudent => "Enter: Add  Esc: Cancel",
        AppMode::ConfirmDelete => "y: Delete  n: Keep",
        AppMode::BusyForm | AppMode::GridForm => {
            "Tab: Field  ←/→: Part  ↑/↓: Change  Enter: Save  Esc: Cancel"
        }
    };
    let bar = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(bar, area);
}

fn render_add_popup(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 3, frame.area());
    frame.render_widget(Clear, area);

    let input = Paragraph::new(app.input.as_str())
        .block(Block::default().borders(Borders::ALL).title("New student"));
    frame.render_widget(input, area);

    let typed = app.input[..app.cursor_pos].chars().count() as u16;
    frame.set_cursor_position((area.x + 1 + typed, area.y + 1));
}

fn render_confirm_popup(frame: &mut Frame, app: &App) {
    let Some(pending) = &app.pending_delete else {
        return;
    };
    let area = centered_rect(50, 5, frame.area());
    frame.render_widget(Clear, area);

    let text = Text::from(vec![
        Line::from(pending.prompt()),
        Line::from(""),
        Line::from(Span::styled("y / n", Style::default().fg(Color::DarkGray))),
    ]);
    let popup = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Delete student")
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(popup, area);
}

fn render_form_popup(frame: &mut Frame, title: &str, form: &Form) {
    let area = centered_rect(40, form.fields.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, &field)| {
            let focused = i == form.focus;
            let mut spans = vec![Span::styled(
                format!("{} {:<6}", if focused { ">" } else { " " }, field.label()),
                Style::default().add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() }),
            )];
            match field {
                FormField::Day => spans.push(value_span(form.day.label().to_string(), focused)),
                FormField::Start => spans.extend(time_spans(&form.start, focused)),
                FormField::End => spans.extend(time_spans(&form.end, focused)),
                FormField::Slot => {
                    spans.push(value_span(format!("{} min", form.slot_minutes), focused))
                }
            }
            Line::from(spans)
        })
        .collect();

    let popup =
        Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(popup, area);
}

fn value_span(text: String, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    Span::styled(text, style)
}

fn time_spans(picker: &TimePicker, focused: bool) -> Vec<Span<'static>> {
    let value = picker.value;
    let part = |p: TimePart, text: String| value_span(text, focused && picker.part == p);
    vec![
        part(TimePart::Hour, format!("{:>2}", value.hour)),
        Span::raw(":"),
        part(TimePart::Minute, format!("{:02}", value.minute)),
        Span::raw(" "),
        part(TimePart::Meridiem, value.meridiem.to_string()),
    ]
}

/// A rectangle `percent_x` wide and `height` rows tall, centred in `r`.
fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
