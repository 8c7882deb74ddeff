//! Wire types shared with the scheduling backend.
//!
//! Field names follow the backend's camelCase JSON. Optional fields are kept
//! optional because the backend omits them freely.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Availability
// ============================================================================

/// A start–end time-of-day pair of tutor availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    /// Start time, `HH:MM` or `HH:MM:SS`.
    pub start_time: String,
    /// End time, `HH:MM` or `HH:MM:SS`.
    pub end_time: String,
}

impl TimeRange {
    /// Creates a new time range.
    #[must_use]
    pub fn new(start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }

    /// Returns the `"HH:MM - HH:MM"` label of this range.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutorhub_gateway::TimeRange;
    ///
    /// let range = TimeRange::new("08:00:00", "09:30:00");
    /// assert_eq!(range.label(), "08:00 - 09:30");
    /// ```
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            hour_minute(&self.start_time),
            hour_minute(&self.end_time)
        )
    }
}

/// Truncates `HH:MM:SS` to `HH:MM`; shorter strings are returned unchanged.
fn hour_minute(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

/// One tutor's availability for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAvailability {
    /// The calendar day.
    pub date: NaiveDate,
    /// Available ranges on that day.
    #[serde(default)]
    pub time_ranges: Vec<TimeRange>,
}

impl DailyAvailability {
    /// Creates a day with the given ranges.
    #[must_use]
    pub const fn new(date: NaiveDate, time_ranges: Vec<TimeRange>) -> Self {
        Self { date, time_ranges }
    }
}

// ============================================================================
// Meetings
// ============================================================================

/// Kind of meeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeetingType {
    /// One-to-one appointment booked by a student.
    Appointment,
    /// Group consultation published by a tutor.
    Consultation,
    /// Any value this client does not know about.
    Other(String),
}

impl MeetingType {
    fn from_wire(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "APPOINTMENT" => Self::Appointment,
            "CONSULTATION" => Self::Consultation,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Returns the backend spelling of this type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Appointment => "APPOINTMENT",
            Self::Consultation => "CONSULTATION",
            Self::Other(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for MeetingType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&s))
    }
}

impl Serialize for MeetingType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// A scheduled appointment or consultation, as projected by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    /// Backend identifier.
    pub meeting_id: i64,
    /// Topic entered at booking time.
    pub topic: Option<String>,
    /// Start timestamp.
    pub start_time: Option<NaiveDateTime>,
    /// End timestamp.
    pub end_time: Option<NaiveDateTime>,
    /// Appointment or consultation.
    #[serde(rename = "type")]
    pub meeting_type: Option<MeetingType>,
    /// Raw status string (`SCHEDULED`, `CANCELLED`, ...).
    pub status: Option<String>,
    /// Link for online meetings.
    pub online_link: Option<String>,
    /// Student attending, for appointments.
    pub student_id: Option<i64>,
    /// Tutor running the meeting.
    pub tutor_id: Option<i64>,
    /// Reason recorded when the meeting was cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl Meeting {
    /// Returns `true` if the status reads `CANCELLED`, ignoring case.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("CANCELLED"))
    }

    /// Returns `true` for appointments.
    #[must_use]
    pub fn is_appointment(&self) -> bool {
        self.meeting_type == Some(MeetingType::Appointment)
    }
}

/// Body of `POST /scheduling/appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    /// Student booking the appointment.
    pub student_id: i64,
    /// Tutor being booked.
    pub tutor_id: i64,
    /// Day of the appointment.
    pub date: NaiveDate,
    /// Preferred start, `HH:MM`.
    pub start_time: String,
    /// Preferred end, `HH:MM`.
    pub end_time: String,
    /// What the appointment is about.
    pub topic: String,
    /// Optional note for the tutor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ============================================================================
// Registrations
// ============================================================================

/// Lifecycle status of a tutor registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStatus {
    /// Created, waiting for approval.
    Pending,
    /// Approved by the tutor.
    Approved,
    /// Cancelled by the student.
    Cancelled,
    /// Rejected by the tutor.
    Rejected,
    /// Any other backend value.
    Other(String),
}

impl RegistrationStatus {
    fn from_wire(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "APPROVED" => Self::Approved,
            "CANCELLED" => Self::Cancelled,
            "REJECTED" => Self::Rejected,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Returns the backend spelling of this status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Cancelled => "CANCELLED",
            Self::Rejected => "REJECTED",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RegistrationStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_wire(&s))
    }
}

impl Serialize for RegistrationStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Response of `POST /api/tutor-registration/register-tutor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    /// Identifier of the created registration.
    pub registration_id: Option<i64>,
    /// Status reported at creation, normally `PENDING`.
    pub status: Option<RegistrationStatus>,
}

/// A registration as listed for a tutor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Registration identifier.
    pub id: i64,
    /// Student who registered.
    pub student_id: i64,
    /// Tutor requested.
    pub tutor_id: Option<i64>,
    /// Subject of the registration.
    pub subject_id: Option<i64>,
    /// Current status.
    pub registration_status: RegistrationStatus,
    /// Creation timestamp as sent by the backend.
    pub created_at: Option<String>,
    /// Approval timestamp as sent by the backend.
    pub approved_at: Option<String>,
    /// Reason given on rejection.
    pub reason_for_rejection: Option<String>,
}

/// Result of the per-student "my tutor" lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MyTutor {
    /// The approved tutor.
    pub tutor_id: Option<i64>,
    /// Tutor name as reported by the registration service.
    pub tutor_name: Option<String>,
    /// Tutor name as reported by the user service.
    pub full_name: Option<String>,
    /// Tutor's faculty.
    pub faculty: Option<String>,
    /// Status of the registration linking student and tutor.
    pub status: Option<RegistrationStatus>,
    /// Registration identifier.
    pub registration_id: Option<i64>,
}

impl MyTutor {
    /// Returns the best available display name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.tutor_name.as_deref().or(self.full_name.as_deref())
    }

    /// Returns `true` if the registration is approved.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == Some(RegistrationStatus::Approved)
    }
}

// ============================================================================
// Catalog and suggestions
// ============================================================================

/// A subject from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    /// Catalog identifier.
    pub subject_id: i64,
    /// Display name, also the search key for tutor suggestions.
    pub subject_name: String,
}

fn default_tutor_name() -> String {
    "Tutor".to_string()
}

const fn default_rating() -> f64 {
    4.5
}

/// A tutor suggested for a subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorSuggestion {
    /// Tutor identifier; the backend sends it as a number or a numeric string.
    #[serde(default, alias = "tutor_id", deserialize_with = "lenient_id")]
    pub tutor_id: Option<i64>,
    /// Tutor name.
    #[serde(default = "default_tutor_name")]
    pub name: String,
    /// Average feedback rating.
    #[serde(default = "default_rating")]
    pub rating: f64,
    /// Number of open slots.
    #[serde(default)]
    pub available_slots: u32,
    /// Optional picture URL.
    #[serde(default)]
    pub image: Option<String>,
}

/// Accepts an id given as a JSON number or a numeric string. Anything else,
/// including a string that does not parse, reads as no id.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse().ok(),
        Some(Raw::Other(_)) | None => None,
    })
}

/// The suggestion endpoint answers with a bare list, a `{data: [...]}`
/// wrapper, or a `{message}` object when nothing matched. Any other shape is
/// a decode error.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum SuggestResponse {
    List(Vec<TutorSuggestion>),
    Wrapped { data: Vec<TutorSuggestion> },
    Other(serde_json::Map<String, serde_json::Value>),
}

impl SuggestResponse {
    pub(crate) fn into_suggestions(self) -> Vec<TutorSuggestion> {
        match self {
            Self::List(list) | Self::Wrapped { data: list } => list,
            Self::Other(_) => Vec::new(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
