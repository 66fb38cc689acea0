use std::path::PathBuf;

use thiserror::Error;

use crate::day::Weekday;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    #[error("Time must be HH:MM, got '{0}'")]
    Malformed(String),

    #[error("Invalid hour: {0}")]
    HourOutOfRange(u8),

    #[error("Invalid minute: {0}")]
    MinuteOutOfRange(u8),

    #[error("Invalid 12-hour clock hour: {0}")]
    Hour12OutOfRange(u8),

    #[error("Invalid meridiem '{0}', expected AM or PM")]
    Meridiem(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid day '{0}'")]
pub struct DayError(pub String);

/// A grid returned by the availability service that violates the shape the
/// compositor relies on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridShapeError {
    #[error("grid contains no days")]
    NoDays,

    #[error("day {0} is listed more than once")]
    DuplicateDay(Weekday),

    #[error("grid has no column for listed day {0}")]
    MissingDay(Weekday),

    #[error("grid uses unknown day label '{0}'")]
    UnknownDay(String),

    #[error("{day} has {found} slots, expected {expected}")]
    RowCountMismatch {
        day: Weekday,
        expected: usize,
        found: usize,
    },

    #[error("slot {row} of {day} does not line up with the first day")]
    MisalignedSlot { day: Weekday, row: usize },

    #[error("slot {row} of {day} has an invalid time: {source}")]
    InvalidTime {
        day: Weekday,
        row: usize,
        source: TimeError,
    },
}

/// Grid request parameters the caller must not send.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Select at least one day.")]
    NoDays,

    #[error("Grid start {start} must be before end {end}.")]
    EmptyWindow { start: String, end: String },

    #[error("Slot duration must be one of 5, 10, 15, 20, 30 or 60 minutes, got {0}.")]
    UnsupportedSlot(u16),
}

/// Local guards that reject an action before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Select a student first.")]
    NoActiveStudent,

    #[error("Select at least one student.")]
    EmptySelection,

    #[error("Unknown student '{0}'.")]
    UnknownStudent(String),

    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Failure of a session operation.
///
/// Service errors are displayed verbatim so that the collaborator's own
/// message reaches the user unchanged.
#[derive(Debug, Error)]
pub enum SessionError<E> {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("{0}")]
    Service(E),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Load a timetable before exporting.")]
    NothingToExport,

    #[error("Capture failed: surface has no area")]
    EmptySurface,

    #[error("Capture failed: {0}")]
    Encode(#[from] std::fmt::Error),

    #[error("Could not save {path}: {source}")]
    Save {
        path: PathBuf,
        source: std::io::Error,
    },
}
