//! Availability grid compositor for part-time shift planning.
//!
//! Students report the weekly blocks in which they are busy. An external
//! service turns those blocks into a per-day, per-slot grid of who is free.
//! This crate keeps the roster and the "selected students" set consistent
//! with that service, filters the grid by the selection, and lays the
//! result out as an exportable timetable.
//!
//! # Example
//!
//! ```ignore
//! use availgrid_core::{GridRequest, Session};
//!
//! async fn timetable<S: availgrid_core::AvailabilityService>(service: &S) {
//!     let mut session = Session::new(GridRequest::default());
//!     session.load(service).await.unwrap();
//!     session.load_grid(service).await.unwrap();
//!
//!     for (row, (start, _end)) in session.grid().unwrap().row_times().into_iter().enumerate() {
//!         println!("{row}: {}", start.display());
//!     }
//! }
//! ```

pub mod day;
pub mod error;
pub mod export;
pub mod grid;
pub mod roster;
pub mod sequence;
pub mod service;
pub mod session;
pub mod surface;
pub mod time;

pub use day::Weekday;
pub use error::{ActionError, DayError, ExportError, GridShapeError, RequestError, SessionError, TimeError};
pub use export::{export_image, Capture, CaptureOptions, SvgCapture, EXPORT_FILE_STEM};
pub use grid::{
    compose, step_slot, DisplayCell, DisplayColumn, DisplayGrid, GridMode, GridRequest, RawCell, RawColumn,
    RawGrid, SLOT_CHOICES,
};
pub use roster::{reconcile_selection, Roster, Selection};
pub use sequence::{RequestSequence, Ticket};
pub use service::{AvailabilityService, BusyBlock};
pub use session::{GridLoad, GridQuery, PendingDelete, Session, Status, StatusKind};
pub use surface::{Node, NodeKind, Rect, Rgb, Surface};
pub use time::{
    decode24, display_string, encode24, parse_user_time, Meridiem, Time12, Time24, HOUR_STEPS,
    MINUTE_STEPS,
};
