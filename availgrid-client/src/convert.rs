use std::collections::HashMap;

use availgrid_core::{GridRequest, GridShapeError, RawCell, RawGrid, Time24, Weekday};
use serde_json::Value;
use tracing::debug;

use crate::types::{ErrorBody, GridRequestBody, GridResponse, WireCell};

/// Builds the `/availability-grid` request body.
pub fn build_grid_body(request: &GridRequest) -> GridRequestBody {
    GridRequestBody {
        days: request.days.clone(),
        start_time: request.start,
        end_time: request.end,
        slot_minutes: request.slot_minutes,
        mode: request.mode,
    }
}

/// Converts a grid response into a checked [`RawGrid`].
pub fn parse_grid(response: GridResponse) -> Result<RawGrid, GridShapeError> {
    let GridResponse { days: labels, mut grid } = response;

    let mut days = Vec::with_capacity(labels.len());
    let mut columns = HashMap::with_capacity(labels.len());
    for label in labels {
        let day: Weekday = label
            .parse()
            .map_err(|_| GridShapeError::UnknownDay(label.clone()))?;
        if days.contains(&day) {
            return Err(GridShapeError::DuplicateDay(day));
        }
        let cells = grid.remove(&label).ok_or(GridShapeError::MissingDay(day))?;
        columns.insert(day, parse_cells(day, cells)?);
        days.push(day);
    }

    if !grid.is_empty() {
        let mut unlisted: Vec<&str> = grid.keys().map(String::as_str).collect();
        unlisted.sort_unstable();
        debug!(?unlisted, "ignoring unlisted grid columns");
    }

    RawGrid::new(days, columns)
}

fn parse_cells(day: Weekday, cells: Vec<WireCell>) -> Result<Vec<RawCell>, GridShapeError> {
    cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            let time = |text: &str| {
                text.parse::<Time24>()
                    .map_err(|source| GridShapeError::InvalidTime { day, row, source })
            };
            Ok(RawCell {
                start: time(&cell.start)?,
                end: time(&cell.end)?,
                names: cell.names,
            })
        })
        .collect()
}

/// Message to show for a failed request: the body's `detail`, or `fallback`.
pub fn error_message(body: &str, fallback: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    match parsed.detail {
        Some(Value::String(detail)) if !detail.is_empty() => detail,
        Some(Value::Null) | None => fallback.to_string(),
        Some(Value::String(_)) => fallback.to_string(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GridResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn body_uses_wire_field_names() {
        let request = GridRequest::new(
            [Weekday::Mon, Weekday::Wed],
            "09:00".parse().unwrap(),
            "17:30".parse().unwrap(),
            30,
        )
        .unwrap();
        let body = serde_json::to_value(build_grid_body(&request)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "days": ["Mon", "Wed"],
                "start_time": "09:00",
                "end_time": "17:30",
                "slot_minutes": 30,
                "mode": "free"
            })
        );
    }

    #[test]
    fn parses_grid_in_listed_day_order() {
        let raw = parse_grid(response(
            r#"{
                "days": ["Wed", "Mon"],
                "grid": {
                    "Mon": [{"start": "09:00", "end": "10:00", "names": ["Ann"]}],
                    "Wed": [{"start": "09:00", "end": "10:00", "names": ["Bob", "Ann"]}]
                }
            }"#,
        ))
        .unwrap();
        assert_eq!(raw.days().collect::<Vec<_>>(), [Weekday::Wed, Weekday::Mon]);
        assert_eq!(raw.column(Weekday::Wed).unwrap()[0].names, ["Bob", "Ann"]);
        assert_eq!(raw.row_count(), 1);
    }

    #[test]
    fn unlisted_columns_are_skipped_unparsed() {
        let raw = parse_grid(response(
            r#"{"days": ["Wed"],
                "grid": {
                    "Wed": [{"start": "10:00", "end": "11:00", "names": ["Ann"]}],
                    "Sat": [{"start": "bogus", "end": "11:00", "names": []}],
                    "Holiday": []
                }}"#,
        ))
        .unwrap();
        assert_eq!(raw.days().collect::<Vec<_>>(), vec![Weekday::Wed]);
        assert_eq!(raw.row_count(), 1);
    }

    #[test]
    fn missing_names_mean_nobody_free() {
        let raw = parse_grid(response(
            r#"{"days": ["Fri"], "grid": {"Fri": [{"start": "09:00", "end": "09:15"}]}}"#,
        ))
        .unwrap();
        assert!(raw.column(Weekday::Fri).unwrap()[0].names.is_empty());
    }

    #[test]
    fn shape_errors() {
        let missing = parse_grid(response(r#"{"days": ["Mon"], "grid": {}}"#)).unwrap_err();
        assert_eq!(missing, GridShapeError::MissingDay(Weekday::Mon));

        let unknown =
            parse_grid(response(r#"{"days": ["Funday"], "grid": {"Funday": []}}"#)).unwrap_err();
        assert_eq!(unknown, GridShapeError::UnknownDay("Funday".to_string()));

        let bad_time = parse_grid(response(
            r#"{"days": ["Mon"], "grid": {"Mon": [{"start": "9am", "end": "10:00"}]}}"#,
        ))
        .unwrap_err();
        assert!(matches!(bad_time, GridShapeError::InvalidTime { row: 0, .. }));

        let misaligned = parse_grid(response(
            r#"{"days": ["Mon", "Tue"], "grid": {
                "Mon": [{"start": "09:00", "end": "10:00"}],
                "Tue": [{"start": "10:00", "end": "11:00"}]
            }}"#,
        ))
        .unwrap_err();
        assert!(matches!(misaligned, GridShapeError::MisalignedSlot { .. }));

        let empty = parse_grid(response(r#"{"days": [], "grid": {}}"#)).unwrap_err();
        assert_eq!(empty, GridShapeError::NoDays);
    }

    #[test]
    fn error_detail_or_fallback() {
        assert_eq!(
            error_message(r#"{"detail": "Name cannot be empty."}"#, "Request failed"),
            "Name cannot be empty."
        );
        assert_eq!(error_message(r#"{}"#, "Delete failed"), "Delete failed");
        assert_eq!(error_message("<html>502</html>", "Request failed"), "Request failed");
        assert_eq!(error_message(r#"{"detail": ""}"#, "Request failed"), "Request failed");
        assert_eq!(
            error_message(r#"{"detail": [{"msg": "field required"}]}"#, "Request failed"),
            r#"[{"msg":"field required"}]"#
        );
    }
}
