//! The single state object behind the timetable screen.
//!
//! Roster, active student, selection, grid parameters, the current display
//! grid and the status banner all live here and change only through the
//! operations below. Network results replace state wholesale; a failed call
//! leaves everything but the status banner untouched.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::day::Weekday;
use crate::error::{ActionError, ExportError, SessionError};
use crate::export::{export_image, Capture};
use crate::grid::{compose, DisplayGrid, GridRequest, RawGrid};
use crate::roster::{Roster, Selection};
use crate::sequence::{RequestSequence, Ticket};
use crate::service::{AvailabilityService, BusyBlock};
use crate::surface;
use crate::time::Time24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Transient banner shown after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }
}

/// A deletion waiting for the user to confirm it.
///
/// Only [`Session::request_delete`] creates one and only
/// [`Session::confirm_delete`] acts on it; dropping it cancels.
#[must_use = "nothing is deleted until the request is confirmed"]
#[derive(Debug, PartialEq, Eq)]
pub struct PendingDelete {
    name: String,
}

impl PendingDelete {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> String {
        format!("Are you sure you want to delete {}?", self.name)
    }
}

/// An issued grid query: its ticket, parameters and the selection to filter with.
#[derive(Debug, Clone)]
pub struct GridQuery {
    pub ticket: Ticket,
    pub request: GridRequest,
    selection: Selection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLoad {
    Applied,
    /// A newer query was issued; this response was dropped.
    Superseded,
}

#[derive(Debug, Default)]
pub struct Session {
    roster: Roster,
    request: GridRequest,
    grid: Option<DisplayGrid>,
    status: Option<Status>,
    sequence: RequestSequence,
}

impl Session {
    pub fn new(request: GridRequest) -> Self {
        Self {
            request,
            ..Self::default()
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn selection(&self) -> &Selection {
        self.roster.selection()
    }

    pub fn request(&self) -> &GridRequest {
        &self.request
    }

    /// Grid parameters as edited by the user; checked when a query is issued.
    pub fn request_mut(&mut self) -> &mut GridRequest {
        &mut self.request
    }

    /// Last composed grid. It is not recomputed when the roster or selection
    /// changes, only on the next query.
    pub fn grid(&self) -> Option<&DisplayGrid> {
        self.grid.as_ref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), ActionError> {
        if self.roster.set_active(name) {
            Ok(())
        } else {
            Err(ActionError::UnknownStudent(name.to_string()))
        }
    }

    pub fn select_all(&mut self) {
        self.roster.select_all();
    }

    pub fn select_none(&mut self) {
        self.roster.select_none();
    }

    pub fn toggle(&mut self, name: &str, included: bool) -> bool {
        self.roster.toggle(name, included)
    }

    /// Initial load: fetches the roster and selects everyone if nothing is selected.
    pub async fn load<S: AvailabilityService>(
        &mut self,
        service: &S,
    ) -> Result<(), SessionError<S::Error>> {
        let result = self.refresh(service, true).await;
        if let Err(e) = &result {
            self.status = Some(Status::error(format!("Backend error: {}", e)));
        }
        result
    }

    /// Replaces the roster with the service's current list.
    ///
    /// Pass `auto_select_all = true` only for the initial load; it refills an
    /// empty selection on every call where it is set.
    pub async fn refresh<S: AvailabilityService>(
        &mut self,
        service: &S,
        auto_select_all: bool,
    ) -> Result<(), SessionError<S::Error>> {
        let students = service
            .list_students()
            .await
            .map_err(SessionError::Service)?;
        debug!(count = students.len(), auto_select_all, "roster refreshed");
        self.apply_roster(students, auto_select_all);
        Ok(())
    }

    /// Applies a roster fetched elsewhere.
    pub fn apply_roster(&mut self, students: Vec<String>, auto_select_all: bool) {
        self.roster.apply_refresh(students, auto_select_all);
    }

    /// Creates a student and selects them.
    pub async fn add_student<S: AvailabilityService>(
        &mut self,
        service: &S,
        name: &str,
    ) -> Result<(), SessionError<S::Error>> {
        self.status = None;
        let result = self.try_add_student(service, name).await;
        self.report(result, || format!("Student \"{}\" added successfully.", name))
    }

    async fn try_add_student<S: AvailabilityService>(
        &mut self,
        service: &S,
        name: &str,
    ) -> Result<(), SessionError<S::Error>> {
        service
            .add_student(name)
            .await
            .map_err(SessionError::Service)?;
        self.refresh(service, false).await?;
        match self.roster.include_created(name) {
            Some(created) => info!(student = created, "student added"),
            None => debug!(typed = name, "created student not present after refresh"),
        }
        Ok(())
    }

    /// First half of a deletion; the caller must get the user's confirmation
    /// before passing the result to [`Session::confirm_delete`].
    pub fn request_delete(&self, name: &str) -> Result<PendingDelete, ActionError> {
        if !self.roster.contains(name) {
            return Err(ActionError::UnknownStudent(name.to_string()));
        }
        Ok(PendingDelete {
            name: name.to_string(),
        })
    }

    pub async fn confirm_delete<S: AvailabilityService>(
        &mut self,
        service: &S,
        pending: PendingDelete,
    ) -> Result<(), SessionError<S::Error>> {
        self.status = None;
        let name = pending.name;
        let result = self.try_delete(service, &name).await;
        self.report(result, || format!("Student \"{}\" deleted.", name))
    }

    async fn try_delete<S: AvailabilityService>(
        &mut self,
        service: &S,
        name: &str,
    ) -> Result<(), SessionError<S::Error>> {
        service
            .delete_student(name)
            .await
            .map_err(SessionError::Service)?;
        info!(student = name, "student deleted");
        self.roster.clear_active_if(name);
        self.refresh(service, false).await
    }

    /// Records a busy block for the active student.
    pub async fn add_busy<S: AvailabilityService>(
        &mut self,
        service: &S,
        day: Weekday,
        start: Time24,
        end: Time24,
    ) -> Result<(), SessionError<S::Error>> {
        self.status = None;
        let result = match self.roster.active() {
            None => Err(SessionError::Action(ActionError::NoActiveStudent)),
            Some(name) => {
                let block = BusyBlock {
                    name: name.to_string(),
                    day,
                    start,
                    end,
                };
                service
                    .add_busy(&block)
                    .await
                    .map_err(SessionError::Service)
            }
        };
        self.report(result, || "Busy schedule added.".to_string())
    }

    /// Issues a grid query for the current parameters and selection.
    ///
    /// Refuses when nothing is selected or the parameters are invalid.
    pub fn begin_grid_load(&mut self) -> Result<GridQuery, ActionError> {
        self.status = None;
        let checked = if self.roster.selection().is_empty() {
            Err(ActionError::EmptySelection)
        } else {
            self.request.validate().map_err(ActionError::from)
        };
        if let Err(e) = checked {
            self.status = Some(Status::error(e.to_string()));
            return Err(e);
        }

        let ticket = self.sequence.issue();
        debug!(ticket = ticket.number(), "grid query issued");
        Ok(GridQuery {
            ticket,
            request: self.request.clone(),
            selection: self.roster.selection().clone(),
        })
    }

    /// Applies the response to `query` unless a newer query has been issued.
    pub fn finish_grid_load<E: fmt::Display>(
        &mut self,
        query: GridQuery,
        result: Result<RawGrid, E>,
    ) -> Result<GridLoad, SessionError<E>> {
        if !self.sequence.is_current(query.ticket) {
            debug!(ticket = query.ticket.number(), "discarding superseded grid response");
            return Ok(GridLoad::Superseded);
        }
        match result {
            Ok(raw) => {
                let grid = compose(&raw, &query.selection);
                info!(days = grid.columns.len(), rows = grid.row_count(), "timetable updated");
                self.grid = Some(grid);
                self.status = Some(Status::success("Timetable updated."));
                Ok(GridLoad::Applied)
            }
            Err(e) => {
                self.status = Some(Status::error(e.to_string()));
                Err(SessionError::Service(e))
            }
        }
    }

    pub async fn load_grid<S: AvailabilityService>(
        &mut self,
        service: &S,
    ) -> Result<GridLoad, SessionError<S::Error>> {
        let query = self.begin_grid_load()?;
        let result = service.fetch_grid(&query.request).await;
        self.finish_grid_load(query, result)
    }

    /// Saves the current grid as an image in `dir`.
    ///
    /// The outcome is reported in the status banner; the grid itself is untouched.
    pub fn export(
        &mut self,
        capture: &dyn Capture,
        dir: &Path,
        title: &str,
    ) -> Result<PathBuf, ExportError> {
        let result = match &self.grid {
            None => Err(ExportError::NothingToExport),
            Some(grid) => export_image(&surface::render(grid, title), capture, dir),
        };
        match &result {
            Ok(path) => self.status = Some(Status::success(format!("Saved {}", path.display()))),
            Err(e) => self.status = Some(Status::error(e.to_string())),
        }
        result
    }

    fn report<T, E: fmt::Display>(
        &mut self,
        result: Result<T, E>,
        success: impl FnOnce() -> String,
    ) -> Result<T, E> {
        self.status = Some(match &result {
            Ok(_) => Status::success(success()),
            Err(e) => Status::error(e.to_string()),
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::grid::RawCell;

    fn session_with(students: &[&str]) -> Session {
        let mut session = Session::new(GridRequest::default());
        session.apply_roster(students.iter().map(|s| s.to_string()).collect(), true);
        session
    }

    fn raw_grid(names: &[&str]) -> RawGrid {
        let mut cells = HashMap::new();
        cells.insert(
            Weekday::Mon,
            vec![RawCell {
                start: Time24::from_hm(9, 0),
                end: Time24::from_hm(10, 0),
                names: names.iter().map(|s| s.to_string()).collect(),
            }],
        );
        RawGrid::new(vec![Weekday::Mon], cells).unwrap()
    }

    #[test]
    fn superseded_response_is_dropped() {
        let mut session = session_with(&["A", "B"]);
        let stale = session.begin_grid_load().unwrap();
        let fresh = session.begin_grid_load().unwrap();

        let outcome = session
            .finish_grid_load::<String>(fresh, Ok(raw_grid(&["B"])))
            .unwrap();
        assert_eq!(outcome, GridLoad::Applied);

        let outcome = session
            .finish_grid_load::<String>(stale, Ok(raw_grid(&["A"])))
            .unwrap();
        assert_eq!(outcome, GridLoad::Superseded);
        assert_eq!(session.grid().unwrap().cell(0, 0).unwrap().names, ["B"]);
    }

    #[test]
    fn stale_error_does_not_touch_status() {
        let mut session = session_with(&["A"]);
        let stale = session.begin_grid_load().unwrap();
        let fresh = session.begin_grid_load().unwrap();
        session
            .finish_grid_load::<String>(fresh, Ok(raw_grid(&["A"])))
            .unwrap();

        let outcome = session
            .finish_grid_load(stale, Err("Request failed".to_string()))
            .unwrap();
        assert_eq!(outcome, GridLoad::Superseded);
        assert_eq!(session.status().unwrap().message, "Timetable updated.");
    }

    #[test]
    fn grid_filters_with_selection_at_issue_time() {
        let mut session = session_with(&["A", "B"]);
        let query = session.begin_grid_load().unwrap();
        session.toggle("B", false);

        session
            .finish_grid_load::<String>(query, Ok(raw_grid(&["A", "B"])))
            .unwrap();
        let grid = session.grid().unwrap();
        assert_eq!(grid.cell(0, 0).unwrap().names, ["A", "B"]);
        assert_eq!(grid.selected, ["A", "B"]);
    }

    #[test]
    fn failed_load_keeps_previous_grid() {
        let mut session = session_with(&["A"]);
        let query = session.begin_grid_load().unwrap();
        session
            .finish_grid_load::<String>(query, Ok(raw_grid(&["A"])))
            .unwrap();
        let before = session.grid().cloned();

        let query = session.begin_grid_load().unwrap();
        let err = session
            .finish_grid_load(query, Err("boom".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(session.grid().cloned(), before);
        assert_eq!(session.status().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn empty_selection_blocks_query() {
        let mut session = session_with(&["A"]);
        session.select_none();
        assert_eq!(
            session.begin_grid_load().unwrap_err(),
            ActionError::EmptySelection
        );
        assert_eq!(
            session.status().unwrap().message,
            "Select at least one student."
        );
    }

    #[test]
    fn invalid_parameters_block_query() {
        let mut session = session_with(&["A"]);
        session.request_mut().days.clear();
        assert!(matches!(
            session.begin_grid_load(),
            Err(ActionError::Request(_))
        ));
    }

    #[test]
    fn delete_requires_known_student() {
        let session = session_with(&["A"]);
        let pending = session.request_delete("A").unwrap();
        assert_eq!(pending.prompt(), "Are you sure you want to delete A?");
        assert!(session.request_delete("Z").is_err());
    }

    #[test]
    fn export_without_grid_reports_error() {
        let mut session = session_with(&["A"]);
        let dir = tempfile::tempdir().unwrap();
        let err = session
            .export(&crate::export::SvgCapture, dir.path(), "Schedule")
            .unwrap_err();
        assert!(matches!(err, ExportError::NothingToExport));
        assert_eq!(session.status().unwrap().kind, StatusKind::Error);
    }
}
