//! Tutor's daily availability editor.
//!
//! The editor shows the saved ranges for one day (`View`) and lets the tutor
//! edit a working copy (`Setup`). Saving replaces the whole day on the
//! backend.

use std::fmt;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};
use tutorhub_gateway::{AvailabilityApi, DailyAvailability, TimeRange};

use crate::error::{Result, SessionError};
use crate::failure::failure_reason;

/// Start and end of a newly added range.
const NEW_RANGE: (&str, &str) = ("07:00:00", "09:00:00");

/// Minutes between selectable times.
const STEP_MINUTES: u32 = 15;

/// Editor mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorMode {
    /// Read-only list of saved ranges.
    #[default]
    View,
    /// Editing the working copy.
    Setup,
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View => f.write_str("View"),
            Self::Setup => f.write_str("Setup"),
        }
    }
}

/// Which end of a range to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    /// The start time.
    Start,
    /// The end time.
    End,
}

/// Result of [`AvailabilityEditor::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Saved; the backend may have attached warnings.
    Saved {
        /// Warnings reported by the backend.
        warnings: Vec<String>,
    },
    /// The backend refused the day; stays in setup mode.
    Failed(String),
}

/// Every selectable time of day, `00:00` to `23:45`.
#[must_use]
pub fn time_options() -> Vec<String> {
    (0..24 * 60)
        .step_by(STEP_MINUTES as usize)
        .map(|minutes| format!("{:02}:{:02}", minutes / 60, minutes % 60))
        .collect()
}

fn is_time_option(value: &str) -> bool {
    let Some((hours, minutes)) = value.split_once(':') else {
        return false;
    };
    if hours.len() != 2 || minutes.len() != 2 {
        return false;
    }
    match (hours.parse::<u32>(), minutes.parse::<u32>()) {
        (Ok(h), Ok(m)) => h < 24 && m < 60 && m % STEP_MINUTES == 0,
        _ => false,
    }
}

/// Editor state for one tutor's daily availability.
#[derive(Debug)]
pub struct AvailabilityEditor<A> {
    api: A,
    mode: EditorMode,
    date: NaiveDate,
    saved: Vec<TimeRange>,
    form: Vec<TimeRange>,
}

impl<A: AvailabilityApi> AvailabilityEditor<A> {
    /// Creates an editor showing `date`. Nothing is fetched until [`load`](Self::load).
    pub const fn new(api: A, date: NaiveDate) -> Self {
        Self {
            api,
            mode: EditorMode::View,
            date,
            saved: Vec::new(),
            form: Vec::new(),
        }
    }

    /// Fetches `date` and replaces both the saved list and the working copy.
    ///
    /// On failure the previous lists are kept.
    #[instrument(skip(self))]
    pub async fn load(&mut self, date: NaiveDate) {
        self.date = date;
        match self.api.daily_availability(date).await {
            Ok(day) => {
                self.saved.clone_from(&day.time_ranges);
                self.form = day.time_ranges;
            }
            Err(e) => warn!(error = %e, "failed to load availability"),
        }
    }

    /// Switches to setup mode.
    pub fn enter_setup(&mut self) {
        self.mode = EditorMode::Setup;
    }

    /// Drops the working copy and returns to view mode.
    pub fn discard_changes(&mut self) {
        self.form.clone_from(&self.saved);
        self.mode = EditorMode::View;
    }

    /// Appends a 07:00 to 09:00 range to the working copy.
    pub fn add_range(&mut self) {
        self.form.push(TimeRange::new(NEW_RANGE.0, NEW_RANGE.1));
    }

    /// Removes the range at `index`; returns `false` if there is none.
    pub fn remove_range(&mut self, index: usize) -> bool {
        if index < self.form.len() {
            self.form.remove(index);
            true
        } else {
            false
        }
    }

    /// Sets one bound of a range to `value` (`HH:MM`), stored as `HH:MM:00`.
    ///
    /// Returns `false` for an unknown range or a value that is not one of
    /// [`time_options`].
    pub fn change_time(&mut self, index: usize, bound: TimeBound, value: &str) -> bool {
        if !is_time_option(value) {
            return false;
        }
        let Some(range) = self.form.get_mut(index) else {
            return false;
        };
        let stored = format!("{value}:00");
        match bound {
            TimeBound::Start => range.start_time = stored,
            TimeBound::End => range.end_time = stored,
        }
        true
    }

    /// Posts the working copy as the whole day.
    ///
    /// On success returns to view mode and reloads the day.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` outside setup mode.
    #[instrument(skip(self), fields(date = %self.date, ranges = self.form.len()))]
    pub async fn save(&mut self) -> Result<SaveOutcome> {
        if self.mode != EditorMode::Setup {
            return Err(SessionError::invalid_transition(self.mode, "save"));
        }

        let day = DailyAvailability::new(self.date, self.form.clone());
        match self.api.save_daily_availability(&day).await {
            Ok(warnings) => {
                info!(warnings = warnings.len(), "availability saved");
                self.mode = EditorMode::View;
                self.load(self.date).await;
                Ok(SaveOutcome::Saved { warnings })
            }
            Err(e) => {
                warn!(error = %e, "availability save failed");
                Ok(SaveOutcome::Failed(failure_reason(&e)))
            }
        }
    }

    /// The backend client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Current mode.
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    /// The day being edited.
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Ranges as last loaded.
    pub fn saved_ranges(&self) -> &[TimeRange] {
        &self.saved
    }

    /// The working copy.
    pub fn form_ranges(&self) -> &[TimeRange] {
        &self.form
    }
}
