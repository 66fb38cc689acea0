//! Grid request parameters, the raw grid returned by the availability
//! service, and the compositor that filters it into a display grid.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::day::Weekday;
use crate::error::{GridShapeError, RequestError};
use crate::roster::Selection;
use crate::time::{Time24, cycle};

/// Slot durations, in minutes, a caller may ask for.
pub const SLOT_CHOICES: [u16; 6] = [5, 10, 15, 20, 30, 60];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridMode {
    #[default]
    Free,
}

/// Parameters of one availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRequest {
    pub days: Vec<Weekday>,
    pub start: Time24,
    pub end: Time24,
    pub slot_minutes: u16,
    pub mode: GridMode,
}

impl Default for GridRequest {
    fn default() -> Self {
        Self {
            days: Weekday::workweek(),
            start: Time24::from_hm(8, 0),
            end: Time24::from_hm(20, 0),
            slot_minutes: 15,
            mode: GridMode::Free,
        }
    }
}

impl GridRequest {
    /// Builds a validated request. Repeated days keep their first position.
    pub fn new(
        days: impl IntoIterator<Item = Weekday>,
        start: Time24,
        end: Time24,
        slot_minutes: u16,
    ) -> Result<Self, RequestError> {
        let mut unique = Vec::new();
        for day in days {
            if !unique.contains(&day) {
                unique.push(day);
            }
        }
        let request = Self {
            days: unique,
            start,
            end,
            slot_minutes,
            mode: GridMode::Free,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        if self.days.is_empty() {
            return Err(RequestError::NoDays);
        }
        if self.start >= self.end {
            return Err(RequestError::EmptyWindow {
                start: self.start.display(),
                end: self.end.display(),
            });
        }
        if !SLOT_CHOICES.contains(&self.slot_minutes) {
            return Err(RequestError::UnsupportedSlot(self.slot_minutes));
        }
        Ok(())
    }

    /// Shows or hides a day. Newly shown days go to the end.
    pub fn toggle_day(&mut self, day: Weekday) {
        if let Some(at) = self.days.iter().position(|&d| d == day) {
            self.days.remove(at);
        } else {
            self.days.push(day);
        }
    }

    /// Moves to the next (or previous) entry of [`SLOT_CHOICES`].
    pub fn cycle_slot(&mut self, forward: bool) {
        self.slot_minutes = step_slot(self.slot_minutes, forward);
    }
}

/// The slot length after `current` in [`SLOT_CHOICES`], wrapping at both ends.
/// An unsupported length steps from the first choice.
pub fn step_slot(current: u16, forward: bool) -> u16 {
    let at = SLOT_CHOICES
        .iter()
        .position(|&m| m == current)
        .unwrap_or(0);
    SLOT_CHOICES[cycle(at, SLOT_CHOICES.len(), forward)]
}

/// One slot of one day as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub start: Time24,
    pub end: Time24,
    /// Students free for the whole slot, in service order.
    pub names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub day: Weekday,
    pub cells: Vec<RawCell>,
}

/// Per-day slot sequences with identical boundaries across all days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGrid {
    columns: Vec<RawColumn>,
}

impl RawGrid {
    /// Checks the service response and orders columns as listed in `days`.
    ///
    /// Columns present in `cells` but not listed in `days` are ignored.
    pub fn new(
        days: Vec<Weekday>,
        mut cells: HashMap<Weekday, Vec<RawCell>>,
    ) -> Result<Self, GridShapeError> {
        if days.is_empty() {
            return Err(GridShapeError::NoDays);
        }

        let mut columns: Vec<RawColumn> = Vec::with_capacity(days.len());
        for day in days {
            if columns.iter().any(|c| c.day == day) {
                return Err(GridShapeError::DuplicateDay(day));
            }
            let column = cells.remove(&day).ok_or(GridShapeError::MissingDay(day))?;
            if let Some(first) = columns.first() {
                check_alignment(&first.cells, day, &column)?;
            }
            columns.push(RawColumn {
                day,
                cells: column,
            });
        }

        if !cells.is_empty() {
            debug!(extra = ?cells.keys().collect::<Vec<_>>(), "ignoring unlisted grid columns");
        }

        Ok(Self { columns })
    }

    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.columns.iter().map(|c| c.day)
    }

    pub fn columns(&self) -> &[RawColumn] {
        &self.columns
    }

    pub fn column(&self, day: Weekday) -> Option<&[RawCell]> {
        self.columns
            .iter()
            .find(|c| c.day == day)
            .map(|c| c.cells.as_slice())
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }
}

fn check_alignment(
    reference: &[RawCell],
    day: Weekday,
    column: &[RawCell],
) -> Result<(), GridShapeError> {
    if reference.len() != column.len() {
        return Err(GridShapeError::RowCountMismatch {
            day,
            expected: reference.len(),
            found: column.len(),
        });
    }
    for (row, (a, b)) in reference.iter().zip(column).enumerate() {
        if a.start != b.start || a.end != b.end {
            return Err(GridShapeError::MisalignedSlot { day, row });
        }
    }
    Ok(())
}

/// One slot after filtering by the selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayCell {
    pub start: Time24,
    pub end: Time24,
    pub names: Vec<String>,
    pub is_free: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayColumn {
    pub day: Weekday,
    pub cells: Vec<DisplayCell>,
}

/// The filtered timetable: rows are time slots, columns are days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayGrid {
    pub columns: Vec<DisplayColumn>,
    /// Selection the grid was composed with.
    pub selected: Vec<String>,
}

impl DisplayGrid {
    pub fn days(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.columns.iter().map(|c| c.day)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.cells.len())
    }

    /// Slot boundaries of each row, taken from the first day.
    pub fn row_times(&self) -> Vec<(Time24, Time24)> {
        self.columns
            .first()
            .map(|c| c.cells.iter().map(|cell| (cell.start, cell.end)).collect())
            .unwrap_or_default()
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&DisplayCell> {
        self.columns.get(column)?.cells.get(row)
    }
}

/// Filters every cell of `raw` down to the selected students.
///
/// Names keep the service's order. With an empty selection every cell is busy.
pub fn compose(raw: &RawGrid, selection: &Selection) -> DisplayGrid {
    let columns = raw
        .columns()
        .iter()
        .map(|column| DisplayColumn {
            day: column.day,
            cells: column
                .cells
                .iter()
                .map(|cell| {
                    let names: Vec<String> = cell
                        .names
                        .iter()
                        .filter(|n| selection.contains(n))
                        .cloned()
                        .collect();
                    DisplayCell {
                        start: cell.start,
                        end: cell.end,
                        is_free: !names.is_empty(),
                        names,
                    }
                })
                .collect(),
        })
        .collect();

    DisplayGrid {
        columns,
        selected: selection.iter().map(String::from).collect(),
    }
}
