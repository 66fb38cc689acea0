//! One-shot subcommands. Each builds a fresh [`Session`] against the service.

use std::io::{self, BufRead, Write};
use std::path::Path;

use availgrid_client::AvailabilityClient;
use availgrid_core::{
    ActionError, DisplayGrid, GridRequest, Session, SvgCapture, Weekday, parse_user_time,
};
use tracing::info;

use crate::error::ToolError;

const MAX_CELL_WIDTH: usize = 32;

pub async fn list_students(client: &AvailabilityClient) -> Result<(), ToolError> {
    let students = client.list_students().await?;
    if students.is_empty() {
        println!("No students yet.");
    }
    for name in students {
        println!("{}", name);
    }
    Ok(())
}

pub async fn add_student(client: &AvailabilityClient, name: &str) -> Result<(), ToolError> {
    let mut session = Session::default();
    session.add_student(client, name).await?;
    print_status(&session);
    Ok(())
}

/// Deletes a student after confirmation on stdin, unless `assume_yes`.
pub async fn delete_student(
    client: &AvailabilityClient,
    name: &str,
    assume_yes: bool,
) -> Result<(), ToolError> {
    let mut session = Session::default();
    session.load(client).await?;
    let pending = session.request_delete(name)?;

    if !assume_yes && !confirm(&pending.prompt())? {
        info!(student = pending.name(), "delete cancelled");
        return Err(ToolError::Cancelled);
    }

    session.confirm_delete(client, pending).await?;
    print_status(&session);
    Ok(())
}

pub async fn add_busy(
    client: &AvailabilityClient,
    name: &str,
    day: &str,
    start: &str,
    end: &str,
) -> Result<(), ToolError> {
    let day: Weekday = day.parse()?;
    let start = parse_user_time(start)?;
    let end = parse_user_time(end)?;

    let mut session = Session::default();
    session.load(client).await?;
    session.set_active(name)?;
    session.add_busy(client, day, start, end).await?;
    print_status(&session);
    Ok(())
}

pub async fn show_grid(
    client: &AvailabilityClient,
    request: GridRequest,
    only: &[String],
    json: bool,
) -> Result<(), ToolError> {
    let session = load_grid(client, request, only).await?;
    let Some(grid) = session.grid() else {
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(grid)?);
    } else {
        print!("{}", render_table(grid));
    }
    Ok(())
}

pub async fn export(
    client: &AvailabilityClient,
    request: GridRequest,
    only: &[String],
    dir: &Path,
    title: &str,
) -> Result<(), ToolError> {
    let mut session = load_grid(client, request, only).await?;
    session.export(&SvgCapture, dir, title)?;
    print_status(&session);
    Ok(())
}

/// Loads the roster, narrows the selection to `only` when given, then queries the grid.
async fn load_grid(
    client: &AvailabilityClient,
    request: GridRequest,
    only: &[String],
) -> Result<Session, ToolError> {
    let mut session = Session::new(request);
    session.load(client).await?;
    narrow_selection(&mut session, only)?;
    session.load_grid(client).await?;
    Ok(session)
}

/// Replaces the selection with exactly `only`. Empty `only` keeps it as is.
///
/// Every name must be on the roster; on error the selection is left untouched.
fn narrow_selection(session: &mut Session, only: &[String]) -> Result<(), ActionError> {
    if only.is_empty() {
        return Ok(());
    }
    if let Some(unknown) = only.iter().find(|name| !session.roster().contains(name)) {
        return Err(ActionError::UnknownStudent(unknown.clone()));
    }
    session.select_none();
    for name in only {
        session.toggle(name, true);
    }
    Ok(())
}

fn print_status(session: &Session) {
    if let Some(status) = session.status() {
        println!("{}", status.message);
    }
}

fn confirm(prompt: &str) -> Result<bool, ToolError> {
    let mut stdout = io::stdout();
    write!(stdout, "{} [y/N] ", prompt)?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Plain-text timetable: one row per slot, one column per day.
pub fn render_table(grid: &DisplayGrid) -> String {
    let mut header = vec!["Time".to_string()];
    header.extend(grid.days().map(|d| d.label().to_string()));

    let mut rows = Vec::new();
    for (row, (start, _)) in grid.row_times().into_iter().enumerate() {
        let mut line = vec![start.display()];
        for column in 0..grid.columns.len() {
            let text = match grid.cell(column, row) {
                Some(cell) if cell.is_free => cell.names.join(", "),
                _ => "Busy".to_string(),
            };
            line.push(truncate(&text, MAX_CELL_WIDTH));
        }
        rows.push(line);
    }

    let widths: Vec<usize> = (0..header.len())
        .map(|i| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(header[i].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect();
    out.push_str(padded.join(" | ").trim_end());
    out.push('\n');
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use availgrid_core::{DisplayCell, DisplayColumn, Time24};

    use super::*;

    fn cell(start: (u8, u8), end: (u8, u8), names: &[&str]) -> DisplayCell {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        DisplayCell {
            start: Time24::new(start.0, start.1).unwrap(),
            end: Time24::new(end.0, end.1).unwrap(),
            is_free: !names.is_empty(),
            names,
        }
    }

    #[test]
    fn table_has_a_row_per_slot() {
        let grid = DisplayGrid {
            columns: vec![
                DisplayColumn {
                    day: Weekday::Mon,
                    cells: vec![
                        cell((9, 0), (9, 15), &["Alice", "Bob"]),
                        cell((9, 15), (9, 30), &[]),
                    ],
                },
                DisplayColumn {
                    day: Weekday::Tue,
                    cells: vec![cell((9, 0), (9, 15), &[]), cell((9, 15), (9, 30), &["Bob"])],
                },
            ],
            selected: vec!["Alice".into(), "Bob".into()],
        };

        let table = render_table(&grid);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Time    | Mon        | Tue");
        assert_eq!(lines[2], "9:00 AM | Alice, Bob | Busy");
        assert_eq!(lines[3], "9:15 AM | Busy       | Bob");
    }

    fn roster_session() -> Session {
        let mut session = Session::default();
        session.apply_roster(vec!["Alice".into(), "Bob".into(), "Carol".into()], true);
        session
    }

    fn selected(session: &Session) -> Vec<&str> {
        session.selection().iter().collect()
    }

    #[test]
    fn only_narrows_selection_to_named_students() {
        let mut session = roster_session();
        let only = vec!["Carol".to_string(), "Alice".to_string(), "Carol".to_string()];
        narrow_selection(&mut session, &only).unwrap();
        assert_eq!(selected(&session), vec!["Alice", "Carol"]);
    }

    #[test]
    fn empty_only_keeps_everyone() {
        let mut session = roster_session();
        narrow_selection(&mut session, &[]).unwrap();
        assert_eq!(selected(&session), vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn unknown_name_in_only_is_rejected() {
        let mut session = roster_session();
        let only = vec!["Alice".to_string(), "Mallory".to_string()];
        let err = narrow_selection(&mut session, &only).unwrap_err();
        assert_eq!(err, ActionError::UnknownStudent("Mallory".into()));
        assert_eq!(err.to_string(), "Unknown student 'Mallory'.");
        assert_eq!(selected(&session), vec!["Alice", "Bob", "Carol"]);
    }

    #[tokio::test]
    async fn busy_input_is_checked_before_any_request() {
        // Port 9 is never contacted: parsing fails first.
        let client = AvailabilityClient::new("http://127.0.0.1:9");
        let err = add_busy(&client, "Alice", "Funday", "09:00", "10:00")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Day(_)));

        let err = add_busy(&client, "Alice", "Mon", "9am", "10:00")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Time(_)));
    }

    #[test]
    fn long_cells_are_truncated() {
        let text = "a".repeat(40);
        let cut = truncate(&text, 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn only_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }
}
