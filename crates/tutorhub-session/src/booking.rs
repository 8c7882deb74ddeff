//! Booking view-state controller.
//!
//! Drives the student's appointment screen: the tutor's free-slot calendar,
//! the booking form, and the meeting list with its cancel flow. Every user
//! facing failure is recorded on the controller as a message; nothing here
//! returns `Err` for a backend failure.

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};
use tutorhub_gateway::{
    AppointmentRequest, DailyAvailability, Meeting, MyTutor, SchedulingApi, TimeRange,
};

use crate::config::DataMode;
use crate::context::Session;
use crate::failure::failure_reason;
use crate::seed;

/// Shown when the tutor's free-slot calendar cannot be fetched.
pub const SLOT_LOAD_ERROR: &str = "Could not load the tutor's free slots.";

/// Shown when a meeting cancellation fails.
pub const CANCEL_FAILED: &str = "Failed to cancel the meeting.";

/// Shown after a booking was accepted.
pub const BOOKING_CONFIRMED: &str = "Booking submitted! Please wait for the tutor to approve it.";

const NO_TUTOR: &str = "Error: You do not have an approved tutor yet.";
const INCOMPLETE_FORM: &str = "Please fill in all the information.";
const SIGN_IN_REQUIRED: &str = "Please sign in to book an appointment.";

/// Which meeting list to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MeetingListMode {
    /// All official meetings.
    #[default]
    Official,
    /// Only meetings that can still be cancelled.
    Cancelable,
}

/// Student input of the booking form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingForm {
    /// Preferred start, `HH:MM`.
    pub preferred_start: Option<String>,
    /// Preferred end, `HH:MM`.
    pub preferred_end: Option<String>,
    /// Topic of the appointment.
    pub topic: String,
    /// Optional note for the tutor.
    pub message: Option<String>,
}

/// Result of [`BookingController::submit_booking`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    /// Rejected locally; no request was sent.
    Rejected(String),
    /// The backend accepted the booking.
    Booked,
    /// The backend refused or could not be reached.
    Failed(String),
}

/// Result of [`BookingController::cancel_meeting`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The reason was blank; ask again. No request was sent.
    ReasonRequired,
    /// Cancelled and the list was reloaded.
    Cancelled,
    /// The backend refused or could not be reached.
    Failed(String),
}

/// View state of the booking screen.
#[derive(Debug)]
pub struct BookingController<A> {
    api: A,
    session: Session,
    data_mode: DataMode,
    using_seed_data: bool,

    selected_date: NaiveDate,
    calendar: Vec<DailyAvailability>,
    ranges: Vec<TimeRange>,
    chosen_slot: Option<String>,
    slot_error: Option<String>,

    my_tutor: Option<MyTutor>,

    meetings: Vec<Meeting>,
    list_mode: MeetingListMode,
    cancel_mode: bool,
    cancel_target: Option<i64>,

    status_message: Option<String>,
    error_message: Option<String>,
}

impl<A: SchedulingApi> BookingController<A> {
    /// Creates a controller with `today` as the selected date.
    pub fn new(api: A, session: Session, data_mode: DataMode, today: NaiveDate) -> Self {
        Self {
            api,
            session,
            data_mode,
            using_seed_data: false,
            selected_date: today,
            calendar: Vec::new(),
            ranges: Vec::new(),
            chosen_slot: None,
            slot_error: None,
            my_tutor: None,
            meetings: Vec::new(),
            list_mode: MeetingListMode::default(),
            cancel_mode: false,
            cancel_target: None,
            status_message: None,
            error_message: None,
        }
    }

    // ========================================================================
    // Tutor and free slots
    // ========================================================================

    /// Resolves the student's approved tutor. Any failure clears it.
    #[instrument(skip(self))]
    pub async fn load_my_tutor(&mut self, student_id: i64) -> Option<&MyTutor> {
        self.my_tutor = match self.api.my_tutor(student_id).await {
            Ok(tutor) => tutor,
            Err(e) => {
                warn!(error = %e, "could not load the student's tutor");
                None
            }
        };
        self.my_tutor.as_ref()
    }

    /// Fetches the tutor's free-slot calendar and re-applies the selected date.
    #[instrument(skip(self))]
    pub async fn load_free_slots(&mut self, tutor_id: i64) {
        self.slot_error = None;
        self.calendar.clear();
        self.ranges.clear();
        self.chosen_slot = None;

        match self.api.tutor_free_slots(tutor_id, None).await {
            Ok(calendar) => {
                debug!(days = calendar.len(), "free slots loaded");
                self.calendar = calendar;
                self.using_seed_data = false;
            }
            Err(e) if self.data_mode == DataMode::Seeded => {
                warn!(error = %e, "free slots unavailable, using seeded calendar");
                self.calendar = seed::seeded_calendar(self.selected_date);
                self.using_seed_data = true;
            }
            Err(e) => {
                warn!(error = %e, "free slots unavailable");
                self.slot_error = Some(SLOT_LOAD_ERROR.to_string());
                return;
            }
        }

        self.select_date(self.selected_date);
    }

    /// Makes `date` active and shows its ranges from the fetched calendar.
    ///
    /// The first range becomes the chosen slot. A date without ranges clears
    /// both. No request is made.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        match self
            .calendar
            .iter()
            .find(|day| day.date == date && !day.time_ranges.is_empty())
        {
            Some(day) => {
                self.ranges.clone_from(&day.time_ranges);
                self.chosen_slot = self.ranges.first().map(TimeRange::label);
            }
            None => {
                self.ranges.clear();
                self.chosen_slot = None;
            }
        }
    }

    /// Picks one of the selectable ranges by index.
    pub fn choose_slot(&mut self, index: usize) -> bool {
        match self.ranges.get(index) {
            Some(range) => {
                self.chosen_slot = Some(range.label());
                true
            }
            None => false,
        }
    }

    // ========================================================================
    // Booking
    // ========================================================================

    /// Validates the form and books an appointment on the selected date.
    #[instrument(skip(self, form))]
    pub async fn submit_booking(&mut self, form: &mut BookingForm) -> BookingOutcome {
        self.status_message = None;
        self.error_message = None;

        let Some(tutor_id) = self.my_tutor.as_ref().and_then(|t| t.tutor_id) else {
            return self.reject(NO_TUTOR);
        };

        let topic = form.topic.trim();
        let (Some(start), Some(end)) = (
            non_blank(form.preferred_start.as_deref()),
            non_blank(form.preferred_end.as_deref()),
        ) else {
            return self.reject(INCOMPLETE_FORM);
        };
        if self.chosen_slot.is_none() || topic.is_empty() {
            return self.reject(INCOMPLETE_FORM);
        }

        let Some(student_id) = self.session.user_id() else {
            return self.reject(SIGN_IN_REQUIRED);
        };

        let request = AppointmentRequest {
            student_id,
            tutor_id,
            date: self.selected_date,
            start_time: start.to_string(),
            end_time: end.to_string(),
            topic: topic.to_string(),
            message: non_blank(form.message.as_deref()).map(str::to_string),
        };

        match self.api.book_appointment(&request).await {
            Ok(_) => {
                info!(tutor_id, date = %self.selected_date, "appointment booked");
                self.status_message = Some(BOOKING_CONFIRMED.to_string());
                form.topic.clear();
                BookingOutcome::Booked
            }
            Err(e) => {
                let reason = failure_reason(&e);
                warn!(error = %e, "booking failed");
                let message = format!("Error: {reason}");
                self.error_message = Some(message.clone());
                BookingOutcome::Failed(message)
            }
        }
    }

    fn reject(&mut self, message: &str) -> BookingOutcome {
        self.error_message = Some(message.to_string());
        BookingOutcome::Rejected(message.to_string())
    }

    // ========================================================================
    // Meetings
    // ========================================================================

    /// Fetches the meeting list in `mode`, dropping cancelled meetings.
    ///
    /// A failure shows an empty list (or the seeded meetings in seeded mode).
    #[instrument(skip(self))]
    pub async fn load_meetings(&mut self, student_id: i64, mode: MeetingListMode) -> &[Meeting] {
        self.list_mode = mode;
        let result = match mode {
            MeetingListMode::Official => self.api.official_meetings(student_id).await,
            MeetingListMode::Cancelable => self.api.cancelable_meetings(student_id).await,
        };

        let meetings = match result {
            Ok(meetings) => {
                self.using_seed_data = false;
                meetings
            }
            Err(e) if self.data_mode == DataMode::Seeded => {
                warn!(error = %e, "meetings unavailable, using seeded meetings");
                self.using_seed_data = true;
                seed::seeded_meetings(student_id, self.selected_date)
            }
            Err(e) => {
                warn!(error = %e, "meetings unavailable");
                Vec::new()
            }
        };

        self.meetings = filter_active_meetings(meetings);
        &self.meetings
    }

    /// Flips between the official and the cancelable list.
    pub fn toggle_cancel_mode(&mut self) -> MeetingListMode {
        self.cancel_mode = !self.cancel_mode;
        if self.cancel_mode {
            MeetingListMode::Cancelable
        } else {
            MeetingListMode::Official
        }
    }

    /// Opens the cancel dialog for a meeting.
    pub fn open_cancel_modal(&mut self, meeting_id: i64) {
        self.cancel_target = Some(meeting_id);
    }

    /// Closes the cancel dialog.
    pub fn close_cancel_modal(&mut self) {
        self.cancel_target = None;
    }

    /// Cancels a meeting with a reason, then reloads the current list.
    #[instrument(skip(self, reason))]
    pub async fn cancel_meeting(&mut self, meeting_id: i64, reason: &str) -> CancelOutcome {
        if reason.trim().is_empty() {
            return CancelOutcome::ReasonRequired;
        }

        if let Err(e) = self.api.cancel_meeting(meeting_id, reason).await {
            warn!(error = %e, "meeting cancellation failed");
            return CancelOutcome::Failed(CANCEL_FAILED.to_string());
        }

        info!(meeting_id, "meeting cancelled");
        if let Some(student_id) = self.session.user_id() {
            let mode = self.list_mode;
            self.load_meetings(student_id, mode).await;
        }
        self.close_cancel_modal();
        CancelOutcome::Cancelled
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The backend client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The active date.
    pub const fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Ranges offered for the active date.
    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// The chosen slot label, `"HH:MM - HH:MM"`.
    pub fn chosen_slot(&self) -> Option<&str> {
        self.chosen_slot.as_deref()
    }

    /// Dates present in the fetched calendar.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        self.calendar.iter().map(|day| day.date).collect()
    }

    /// Error from the last free-slot fetch.
    pub fn slot_error(&self) -> Option<&str> {
        self.slot_error.as_deref()
    }

    /// The student's approved tutor.
    pub const fn my_tutor(&self) -> Option<&MyTutor> {
        self.my_tutor.as_ref()
    }

    /// Meetings currently shown.
    pub fn meetings(&self) -> &[Meeting] {
        &self.meetings
    }

    /// Whether the cancelable list is selected.
    pub const fn is_cancel_mode(&self) -> bool {
        self.cancel_mode
    }

    /// Meeting targeted by the open cancel dialog.
    pub const fn cancel_target(&self) -> Option<i64> {
        self.cancel_target
    }

    /// Confirmation from the last booking.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Error from the last booking attempt.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether the shown data came from the seeded fallback.
    pub const fn is_using_seed_data(&self) -> bool {
        self.using_seed_data
    }
}

/// Drops meetings whose status is `CANCELLED`, ignoring case.
#[must_use]
pub fn filter_active_meetings(meetings: Vec<Meeting>) -> Vec<Meeting> {
    meetings.into_iter().filter(|m| !m.is_cancelled()).collect()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
