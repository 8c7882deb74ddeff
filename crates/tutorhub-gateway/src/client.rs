//! HTTP client for the TutorHub backend.
//!
//! This module provides [`TutoringClient`], a thin reqwest wrapper with one
//! async method per backend endpoint, and [`ClientOptions`] to configure it.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::types::{
    AppointmentRequest, DailyAvailability, Meeting, MyTutor, Registration, RegistrationReceipt,
    Subject, SuggestResponse, TutorSuggestion,
};
use crate::{parse_error_body, GatewayError, Result};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8081";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the acting user on registration mutations.
const USER_ID_HEADER: &str = "X-User-Id";

/// Basic-auth credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account name.
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a username and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Options for building a [`TutoringClient`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tutorhub_gateway::{ClientOptions, Credentials};
///
/// let options = ClientOptions::new("http://localhost:8081")
///     .with_timeout(Duration::from_secs(10))
///     .with_credentials(Credentials::new("tutor", "secret"));
/// assert_eq!(options.base_url, "http://localhost:8081");
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Optional basic-auth credentials.
    pub credentials: Option<Credentials>,
}

impl ClientOptions {
    /// Creates options for the given base URL with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            credentials: None,
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attaches basic-auth credentials to every request.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Typed client for the TutorHub backend.
///
/// Every method issues exactly one request. A 2xx response is decoded into
/// the method's return type; anything else becomes a [`GatewayError`].
///
/// # Example
///
/// ```no_run
/// use tutorhub_gateway::{ClientOptions, TutoringClient};
///
/// # async fn example() -> Result<(), tutorhub_gateway::GatewayError> {
/// let client = TutoringClient::new(ClientOptions::default())?;
/// for subject in client.subjects().await? {
///     println!("{}", subject.subject_name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TutoringClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl TutoringClient {
    /// Builds a client from options.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBaseUrl` if the base URL is not an absolute http(s)
    /// URL, or `ClientBuild` if reqwest cannot build its client.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url).map_err(|e| GatewayError::InvalidBaseUrl {
            url: options.base_url.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidBaseUrl {
                url: options.base_url,
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| GatewayError::ClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            credentials: options.credentials,
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ========================================================================
    // Availability
    // ========================================================================

    /// Fetches the signed-in tutor's availability for one day.
    #[instrument(skip(self))]
    pub async fn daily_availability(&self, date: NaiveDate) -> Result<DailyAvailability> {
        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire {
            date: Option<NaiveDate>,
            #[serde(default)]
            time_ranges: Vec<crate::types::TimeRange>,
        }

        let endpoint = "GET /freeslots/daily";
        let request = self
            .request(Method::GET, "/freeslots/daily")
            .query(&[("date", date.to_string())]);
        let wire: Wire = self.fetch_json(endpoint, request).await?;
        Ok(DailyAvailability::new(
            wire.date.unwrap_or(date),
            wire.time_ranges,
        ))
    }

    /// Replaces the signed-in tutor's availability for one day.
    ///
    /// Returns the warnings reported by the backend (possibly empty).
    #[instrument(skip(self, day), fields(date = %day.date, ranges = day.time_ranges.len()))]
    pub async fn save_daily_availability(&self, day: &DailyAvailability) -> Result<Vec<String>> {
        let endpoint = "POST /freeslots/daily";
        let request = self.request(Method::POST, "/freeslots/daily").json(day);
        let body = self.execute(endpoint, request).await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        decode_body(endpoint, &body)
    }

    // ========================================================================
    // Scheduling
    // ========================================================================

    /// Fetches a tutor's free-slot calendar, optionally for a single day.
    ///
    /// A 2xx body that is not a list is treated as an empty calendar.
    #[instrument(skip(self))]
    pub async fn tutor_free_slots(
        &self,
        tutor_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyAvailability>> {
        let endpoint = "GET /scheduling/tutors/{tutorId}/available-slots";
        let mut request = self.request(
            Method::GET,
            &format!("/scheduling/tutors/{tutor_id}/available-slots"),
        );
        if let Some(date) = date {
            request = request.query(&[("date", date.to_string())]);
        }
        let value: Value = self.fetch_json(endpoint, request).await?;
        if !value.is_array() {
            debug!("free-slot response is not a list, treating as empty");
            return Ok(Vec::new());
        }
        serde_json::from_value(value).map_err(|e| GatewayError::decode(endpoint, e.to_string()))
    }

    /// Books an appointment. Returns the backend's response body.
    #[instrument(skip(self, request), fields(tutor_id = request.tutor_id, date = %request.date))]
    pub async fn book_appointment(&self, request: &AppointmentRequest) -> Result<Value> {
        let endpoint = "POST /scheduling/appointments";
        let builder = self
            .request(Method::POST, "/scheduling/appointments")
            .json(request);
        let body = self.execute(endpoint, builder).await?;
        Ok(parse_error_body(&body).unwrap_or(Value::Null))
    }

    /// Lists a student's official meetings.
    #[instrument(skip(self))]
    pub async fn official_meetings(&self, student_id: i64) -> Result<Vec<Meeting>> {
        let request = self.request(
            Method::GET,
            &format!("/scheduling/students/{student_id}/meetings"),
        );
        self.fetch_json("GET /scheduling/students/{studentId}/meetings", request)
            .await
    }

    /// Lists a student's meetings that can still be cancelled.
    #[instrument(skip(self))]
    pub async fn cancelable_meetings(&self, student_id: i64) -> Result<Vec<Meeting>> {
        let request = self.request(
            Method::GET,
            &format!("/scheduling/students/{student_id}/meetings/cancelable"),
        );
        self.fetch_json(
            "GET /scheduling/students/{studentId}/meetings/cancelable",
            request,
        )
        .await
    }

    /// Cancels a meeting with a reason.
    #[instrument(skip(self, reason))]
    pub async fn cancel_meeting(&self, meeting_id: i64, reason: &str) -> Result<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/scheduling/meetings/{meeting_id}/cancel"),
            )
            .json(&json!({ "reason": reason }));
        self.execute("POST /scheduling/meetings/{meetingId}/cancel", request)
            .await
            .map(drop)
    }

    // ========================================================================
    // Catalog and registration
    // ========================================================================

    /// Fetches the subject catalog.
    #[instrument(skip(self))]
    pub async fn subjects(&self) -> Result<Vec<Subject>> {
        let request = self.request(Method::GET, "/api/subjects");
        self.fetch_json("GET /api/subjects", request).await
    }

    /// Suggests tutors for a subject name.
    ///
    /// The backend's "no match" notice decodes as an empty list.
    #[instrument(skip(self))]
    pub async fn suggest_tutors(&self, subject: &str) -> Result<Vec<TutorSuggestion>> {
        let request = self
            .request(Method::GET, "/api/tutor-registration/suggest")
            .query(&[("subject", subject)]);
        let response: SuggestResponse = self
            .fetch_json("GET /api/tutor-registration/suggest", request)
            .await?;
        Ok(response.into_suggestions())
    }

    /// Creates a PENDING registration of a student with a tutor.
    #[instrument(skip(self))]
    pub async fn register_tutor(
        &self,
        student_id: i64,
        subject_id: i64,
        tutor_id: i64,
    ) -> Result<RegistrationReceipt> {
        let request = self
            .request(Method::POST, "/api/tutor-registration/register-tutor")
            .header(USER_ID_HEADER, student_id.to_string())
            .json(&json!({
                "studentId": student_id,
                "subjectId": subject_id,
                "tutorId": tutor_id,
            }));
        self.fetch_json("POST /api/tutor-registration/register-tutor", request)
            .await
    }

    /// Cancels a registration on behalf of a student.
    #[instrument(skip(self))]
    pub async fn cancel_registration(&self, registration_id: i64, student_id: i64) -> Result<()> {
        let request = self
            .request(Method::POST, "/api/tutor-registration/cancel-registration")
            .header(USER_ID_HEADER, student_id.to_string())
            .json(&json!({
                "registrationId": registration_id,
                "studentId": student_id,
            }));
        self.execute("POST /api/tutor-registration/cancel-registration", request)
            .await
            .map(drop)
    }

    /// Approves a registration as the given tutor.
    #[instrument(skip(self))]
    pub async fn approve_registration(&self, registration_id: i64, tutor_id: i64) -> Result<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/api/tutor-registration/{registration_id}/approve"),
            )
            .json(&json!({ "tutorId": tutor_id }));
        self.execute("POST /api/tutor-registration/{id}/approve", request)
            .await
            .map(drop)
    }

    /// Rejects a registration as the given tutor.
    #[instrument(skip(self, reason))]
    pub async fn reject_registration(
        &self,
        registration_id: i64,
        tutor_id: i64,
        reason: &str,
    ) -> Result<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/api/tutor-registration/{registration_id}/reject"),
            )
            .json(&json!({ "tutorId": tutor_id, "reason": reason }));
        self.execute("POST /api/tutor-registration/{id}/reject", request)
            .await
            .map(drop)
    }

    /// Lists a tutor's pending registrations.
    #[instrument(skip(self))]
    pub async fn pending_registrations(&self, tutor_id: i64) -> Result<Vec<Registration>> {
        let request = self
            .request(Method::GET, "/api/tutor-registration/pending-registrations")
            .query(&[("tutorId", tutor_id)]);
        self.fetch_json("GET /api/tutor-registration/pending-registrations", request)
            .await
    }

    /// Lists a tutor's approved students.
    #[instrument(skip(self))]
    pub async fn approved_students(&self, tutor_id: i64) -> Result<Vec<Registration>> {
        let request = self
            .request(Method::GET, "/api/tutor-registration/approved-students")
            .query(&[("tutorId", tutor_id)]);
        self.fetch_json("GET /api/tutor-registration/approved-students", request)
            .await
    }

    /// Looks up the student's tutor. HTTP 404 means "no tutor".
    #[instrument(skip(self))]
    pub async fn my_tutor(&self, student_id: i64) -> Result<Option<MyTutor>> {
        let request = self.request(
            Method::GET,
            &format!("/api/tutor-registration/student/{student_id}/my-tutor"),
        );
        match self
            .fetch_json("GET /api/tutor-registration/student/{id}/my-tutor", request)
            .await
        {
            Ok(tutor) => Ok(Some(tutor)),
            Err(e) if e.is_not_found() => {
                debug!("student has no tutor");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Tutor appointment review
    // ========================================================================

    /// Lists appointments waiting for the tutor's decision.
    #[instrument(skip(self))]
    pub async fn pending_appointments(&self, tutor_id: i64) -> Result<Vec<Meeting>> {
        let request = self
            .request(Method::GET, "/api/tutor/scheduling/appointments/pending")
            .query(&[("tutorId", tutor_id)]);
        self.fetch_json("GET /api/tutor/scheduling/appointments/pending", request)
            .await
    }

    /// Approves a pending appointment.
    #[instrument(skip(self))]
    pub async fn approve_appointment(&self, appointment_id: i64, tutor_id: i64) -> Result<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/api/tutor/scheduling/appointments/{appointment_id}/approve"),
            )
            .json(&json!({ "tutorId": tutor_id }));
        self.execute(
            "POST /api/tutor/scheduling/appointments/{id}/approve",
            request,
        )
        .await
        .map(drop)
    }

    /// Rejects a pending appointment with a reason.
    #[instrument(skip(self, reason))]
    pub async fn reject_appointment(
        &self,
        appointment_id: i64,
        tutor_id: i64,
        reason: &str,
    ) -> Result<()> {
        let request = self
            .request(
                Method::POST,
                &format!("/api/tutor/scheduling/appointments/{appointment_id}/reject"),
            )
            .json(&json!({ "tutorId": tutor_id, "reason": reason }));
        self.execute(
            "POST /api/tutor/scheduling/appointments/{id}/reject",
            request,
        )
        .await
        .map(drop)
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.password))
            }
            None => builder,
        }
    }

    /// Sends the request and returns the raw 2xx body.
    async fn execute(&self, endpoint: &str, request: RequestBuilder) -> Result<String> {
        debug!(endpoint, "sending request");
        let response = request.send().await.map_err(|source| GatewayError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if !status.is_success() {
            debug!(endpoint, status = status.as_u16(), "request failed");
            return Err(GatewayError::status_error(
                endpoint,
                status.as_u16(),
                parse_error_body(&body),
            ));
        }

        Ok(body)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let body = self.execute(endpoint, request).await?;
        decode_body(endpoint, &body)
    }
}

fn decode_body<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| GatewayError::decode(endpoint, e.to_string()))
}
