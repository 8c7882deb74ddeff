//! Where a meeting sits relative to the current time.

use std::fmt;

use chrono::NaiveDateTime;

/// Position of a meeting relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    /// Has not started yet.
    Upcoming,
    /// Between start and end, both inclusive.
    Ongoing,
    /// Ended.
    Past,
}

impl TimeStatus {
    /// Short label for listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Past => "past",
        }
    }
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a meeting window against `now`.
///
/// Both bounds count as ongoing.
#[must_use]
pub fn classify(now: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> TimeStatus {
    if now > end {
        TimeStatus::Past
    } else if now >= start {
        TimeStatus::Ongoing
    } else {
        TimeStatus::Upcoming
    }
}

/// Classifies against the local wall clock; never cached.
#[must_use]
pub fn classify_now(start: NaiveDateTime, end: NaiveDateTime) -> TimeStatus {
    classify(chrono::Local::now().naive_local(), start, end)
}

/// Renders `"HH:MM - HH:MM, DD/MM/YYYY"`, or `"N/A"` when a bound is missing.
#[must_use]
pub fn format_meeting_window(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!(
            "{} - {}, {}",
            start.format("%H:%M"),
            end.format("%H:%M"),
            start.format("%d/%m/%Y")
        ),
        _ => "N/A".to_string(),
    }
}
