use std::path::PathBuf;
use std::sync::Arc;

use availgrid_client::{AvailabilityClient, ClientError};
use availgrid_core::{
    GridQuery, GridRequest, PendingDelete, RawGrid, Session, Status, SvgCapture, Time12, Time24,
    Weekday, step_slot,
};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Browse,
    AddStudent,
    ConfirmDelete,
    BusyForm,
    GridForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Day,
    Start,
    End,
    Slot,
}

impl FormField {
    pub fn label(self) -> &'static str {
        match self {
            FormField::Day => "Day",
            FormField::Start => "Start",
            FormField::End => "End",
            FormField::Slot => "Slot",
        }
    }
}

const BUSY_FIELDS: &[FormField] = &[FormField::Day, FormField::Start, FormField::End];
const GRID_FIELDS: &[FormField] = &[FormField::Start, FormField::End, FormField::Slot];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePart {
    Hour,
    Minute,
    Meridiem,
}

/// A 12-hour time edited one part at a time.
#[derive(Debug, Clone, Copy)]
pub struct TimePicker {
    pub value: Time12,
    pub part: TimePart,
}

impl TimePicker {
    fn new(time: Time24) -> Self {
        Self {
            value: time.to_12h(),
            part: TimePart::Hour,
        }
    }

    fn adjust(&mut self, forward: bool) {
        self.value = match self.part {
            TimePart::Hour => self.value.step_hour(forward),
            TimePart::Minute => self.value.step_minute(forward),
            TimePart::Meridiem => self.value.toggle_meridiem(),
        };
    }

    fn move_part(&mut self, forward: bool) {
        self.part = match (self.part, forward) {
            (TimePart::Hour, true) => TimePart::Minute,
            (TimePart::Minute, true) => TimePart::Meridiem,
            (TimePart::Meridiem, true) => TimePart::Meridiem,
            (TimePart::Meridiem, false) => TimePart::Minute,
            (TimePart::Minute, false) => TimePart::Hour,
            (TimePart::Hour, false) => TimePart::Hour,
        };
    }
}

/// Popup form state, shared by the busy-block form and the grid settings.
#[derive(Debug, Clone)]
pub struct Form {
    pub fields: &'static [FormField],
    pub focus: usize,
    pub day: Weekday,
    pub start: TimePicker,
    pub end: TimePicker,
    pub slot_minutes: u16,
}

impl Form {
    fn busy() -> Self {
        Self {
            fields: BUSY_FIELDS,
            focus: 0,
            day: Weekday::Tue,
            start: TimePicker::new(Time24::from_hm(10, 0)),
            end: TimePicker::new(Time24::from_hm(11, 15)),
            slot_minutes: 15,
        }
    }

    fn grid(request: &GridRequest) -> Self {
        Self {
            fields: GRID_FIELDS,
            focus: 0,
            day: Weekday::Mon,
            start: TimePicker::new(request.start),
            end: TimePicker::new(request.end),
            slot_minutes: request.slot_minutes,
        }
    }

    pub fn focused(&self) -> FormField {
        self.fields[self.focus]
    }

    pub fn next_field(&mut self, forward: bool) {
        let len = self.fields.len();
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    pub fn adjust(&mut self, forward: bool) {
        match self.focused() {
            FormField::Day => self.day = self.day.step(forward),
            FormField::Start => self.start.adjust(forward),
            FormField::End => self.end.adjust(forward),
            FormField::Slot => self.slot_minutes = step_slot(self.slot_minutes, forward),
        }
    }

    /// Left/right: moves between the parts of a time, or steps the other fields.
    pub fn sideways(&mut self, forward: bool) {
        match self.focused() {
            FormField::Start => self.start.move_part(forward),
            FormField::End => self.end.move_part(forward),
            FormField::Day | FormField::Slot => self.adjust(forward),
        }
    }
}

type GridReply = oneshot::Receiver<Result<RawGrid, ClientError>>;

pub struct App {
    pub mode: AppMode,
    pub should_quit: bool,
    pub session: Session,
    pub client: Arc<AvailabilityClient>,
    pub cursor: usize,
    pub input: String,
    pub cursor_pos: usize,
    pub pending_delete: Option<PendingDelete>,
    pub busy_form: Form,
    pub grid_form: Form,
    pub grid_scroll: usize,
    pub export_dir: PathBuf,
    pub title: String,
    pending_grids: Vec<(GridQuery, GridReply)>,
}

impl App {
    pub fn new(
        client: AvailabilityClient,
        request: GridRequest,
        export_dir: PathBuf,
        title: String,
    ) -> Self {
        let grid_form = Form::grid(&request);
        Self {
            mode: AppMode::Browse,
            should_quit: false,
            session: Session::new(request),
            client: Arc::new(client),
            cursor: 0,
            input: String::new(),
            cursor_pos: 0,
            pending_delete: None,
            busy_form: Form::busy(),
            grid_form,
            grid_scroll: 0,
            export_dir,
            title,
            pending_grids: Vec::new(),
        }
    }

    pub async fn load(&mut self) {
        // Failures land in the status banner.
        let _ = self.session.load(&*self.client).await;
        self.clamp_cursor();
    }

    /// Re-reads the roster without touching an empty selection.
    pub async fn reload(&mut self) {
        if let Err(e) = self.session.refresh(&*self.client, false).await {
            self.session
                .set_status(Status::error(format!("Backend error: {}", e)));
        }
        self.clamp_cursor();
    }

    pub fn students(&self) -> &[String] {
        self.session.roster().students()
    }

    pub fn current_student(&self) -> Option<&str> {
        self.students().get(self.cursor).map(String::as_str)
    }

    pub fn is_loading_grid(&self) -> bool {
        !self.pending_grids.is_empty()
    }

    fn clamp_cursor(&mut self) {
        let len = self.students().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.students().len() {
            self.cursor += 1;
        }
    }

    pub fn toggle_current(&mut self) {
        let Some(name) = self.current_student().map(str::to_string) else {
            return;
        };
        let included = !self.session.selection().contains(&name);
        self.session.toggle(&name, included);
    }

    pub fn activate_current(&mut self) {
        if let Some(name) = self.current_student().map(str::to_string) {
            let _ = self.session.set_active(&name);
        }
    }

    pub fn open_add_student(&mut self) {
        self.input.clear();
        self.cursor_pos = 0;
        self.mode = AppMode::AddStudent;
    }

    pub async fn submit_student(&mut self) {
        let name = self.input.trim().to_string();
        self.mode = AppMode::Browse;
        if name.is_empty() {
            return;
        }
        if self.session.add_student(&*self.client, &name).await.is_ok() {
            self.input.clear();
            self.cursor_pos = 0;
        }
        self.clamp_cursor();
    }

    pub fn ask_delete(&mut self) {
        let Some(name) = self.current_student().map(str::to_string) else {
            return;
        };
        match self.session.request_delete(&name) {
            Ok(pending) => {
                self.pending_delete = Some(pending);
                self.mode = AppMode::ConfirmDelete;
            }
            Err(e) => warn!(error = %e, "cannot delete"),
        }
    }

    pub async fn answer_delete(&mut self, confirmed: bool) {
        self.mode = AppMode::Browse;
        let Some(pending) = self.pending_delete.take() else {
            return;
        };
        if !confirmed {
            debug!(student = pending.name(), "delete declined");
            return;
        }
        let _ = self.session.confirm_delete(&*self.client, pending).await;
        self.clamp_cursor();
    }

    pub fn open_busy_form(&mut self) {
        self.busy_form.focus = 0;
        self.mode = AppMode::BusyForm;
    }

    pub async fn submit_busy(&mut self) {
        self.mode = AppMode::Browse;
        let form = &self.busy_form;
        let times = form.start.value.to_24h().and_then(|start| {
            form.end.value.to_24h().map(|end| (start, end))
        });
        match times {
            Ok((start, end)) => {
                let day = form.day;
                let _ = self.session.add_busy(&*self.client, day, start, end).await;
            }
            Err(e) => self
                .session
                .set_status(Status::error(e.to_string())),
        }
    }

    pub fn open_grid_form(&mut self) {
        self.grid_form = Form::grid(self.session.request());
        self.mode = AppMode::GridForm;
    }

    /// Applies the settings form and re-queries the grid.
    pub fn submit_grid_form(&mut self) {
        self.mode = AppMode::Browse;
        let form = &self.grid_form;
        let times = form.start.value.to_24h().and_then(|start| {
            form.end.value.to_24h().map(|end| (start, end))
        });
        match times {
            Ok((start, end)) => {
                let slot = form.slot_minutes;
                let request = self.session.request_mut();
                request.start = start;
                request.end = end;
                request.slot_minutes = slot;
                self.request_grid();
            }
            Err(e) => self
                .session
                .set_status(Status::error(e.to_string())),
        }
    }

    pub fn close_popup(&mut self) {
        self.mode = AppMode::Browse;
    }

    pub fn toggle_day(&mut self, day: Weekday) {
        self.session.request_mut().toggle_day(day);
    }

    pub fn cycle_slot(&mut self, forward: bool) {
        self.session.request_mut().cycle_slot(forward);
    }

    /// Sends a grid query in the background. Replies to older queries are
    /// discarded when they arrive.
    pub fn request_grid(&mut self) {
        let Ok(query) = self.session.begin_grid_load() else {
            return;
        };
        let (tx, rx) = oneshot::channel();
        let client = Arc::clone(&self.client);
        let request = query.request.clone();

        tokio::spawn(async move {
            let result = client.fetch_grid(&request).await;
            let _ = tx.send(result);
        });

        self.pending_grids.push((query, rx));
        self.grid_scroll = 0;
    }

    pub fn poll_grids(&mut self) {
        let mut waiting = Vec::new();
        for (query, mut rx) in self.pending_grids.drain(..) {
            match rx.try_recv() {
                Ok(result) => {
                    if let Err(e) = self.session.finish_grid_load(query, result) {
                        warn!(error = %e, "grid load failed");
                    }
                }
                Err(TryRecvError::Empty) => waiting.push((query, rx)),
                Err(TryRecvError::Closed) => {
                    debug!(ticket = query.ticket.number(), "grid task ended without a reply");
                }
            }
        }
        self.pending_grids = waiting;
    }

    pub fn export(&mut self) {
        // Success and failure are both reported through the status banner.
        let _ = self
            .session
            .export(&SvgCapture, &self.export_dir, &self.title);
    }

    pub fn scroll_grid(&mut self, down: bool) {
        let rows = self.session.grid().map_or(0, |g| g.row_count());
        self.grid_scroll = if down {
            (self.grid_scroll + 1).min(rows.saturating_sub(1))
        } else {
            self.grid_scroll.saturating_sub(1)
        };
    }

    pub fn input_char(&mut self, c: char) {
        self.input.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    pub fn input_backspace(&mut self) {
        if let Some((at, _)) = self.input[..self.cursor_pos].char_indices().next_back() {
            self.input.remove(at);
            self.cursor_pos = at;
        }
    }

    pub fn input_left(&mut self) {
        if let Some((at, _)) = self.input[..self.cursor_pos].char_indices().next_back() {
            self.cursor_pos = at;
        }
    }

    pub fn input_right(&mut self) {
        if let Some(c) = self.input[self.cursor_pos..].chars().next() {
            self.cursor_pos += c.len_utf8();
        }
    }
}

#[cfg(test)]
mod tests {
    use availgrid_core::Meridiem;

    use super::*;

    #[test]
    fn busy_form_starts_with_a_morning_block() {
        let form = Form::busy();
        assert_eq!(form.day, Weekday::Tue);
        assert_eq!(form.start.value.to_string(), "10:00 AM");
        assert_eq!(form.end.value.to_string(), "11:15 AM");
        assert_eq!(form.focused(), FormField::Day);
    }

    #[test]
    fn form_fields_cycle() {
        let mut form = Form::busy();
        form.next_field(false);
        assert_eq!(form.focused(), FormField::End);
        form.next_field(true);
        form.next_field(true);
        assert_eq!(form.focused(), FormField::Start);
    }

    #[test]
    fn day_field_wraps_around_the_week() {
        let mut form = Form::busy();
        form.day = Weekday::Sun;
        form.adjust(true);
        assert_eq!(form.day, Weekday::Mon);
        form.sideways(false);
        assert_eq!(form.day, Weekday::Sun);
    }

    #[test]
    fn time_parts_step_independently() {
        let mut form = Form::busy();
        form.next_field(true);
        form.adjust(true);
        assert_eq!(form.start.value.to_string(), "11:00 AM");
        form.sideways(true);
        form.adjust(false);
        assert_eq!(form.start.value.to_string(), "11:55 AM");
        form.sideways(true);
        form.adjust(true);
        assert_eq!(form.start.value.meridiem, Meridiem::Pm);
        assert_eq!(form.start.value.to_24h().unwrap().to_string(), "23:55");
    }

    #[test]
    fn grid_form_mirrors_request_and_cycles_slots() {
        let mut form = Form::grid(&GridRequest::default());
        assert_eq!(form.start.value.to_string(), "8:00 AM");
        assert_eq!(form.end.value.to_string(), "8:00 PM");
        form.next_field(false);
        assert_eq!(form.focused(), FormField::Slot);
        form.adjust(true);
        assert_eq!(form.slot_minutes, 20);
        form.sideways(false);
        form.sideways(false);
        assert_eq!(form.slot_minutes, 10);
    }

    #[test]
    fn text_input_respects_char_boundaries() {
        let mut app = App::new(
            AvailabilityClient::default(),
            GridRequest::default(),
            PathBuf::from("."),
            "Title".into(),
        );
        for c in "Zoë".chars() {
            app.input_char(c);
        }
        app.input_left();
        app.input_backspace();
        assert_eq!(app.input, "Zë");
        app.input_right();
        app.input_char('!');
        assert_eq!(app.input, "Zë!");
    }
}
