//! Tutor registration wizard.
//!
//! Four numbered steps: choose a subject, choose a tutor, confirm, done.
//! Selecting a tutor starts an auto-submit countdown; when it runs out the
//! wizard registers the student with the tutor (PENDING) and immediately
//! approves the registration. A cancel sub-flow hangs off the confirm step.
//!
//! ```text
//! SubjectSelect -> TutorList -> PendingConfirm -> Success -> Exited
//!                                   |    ^
//!                                   v    | no
//!                           ConfirmCancelPrompt
//!                                   | yes
//!                                   v
//!                             CancelSuccess -> SubjectSelect | Exited
//! ```

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};
use tutorhub_gateway::{RegistrationApi, RegistrationStatus, Subject, TutorSuggestion};

use crate::config::Config;
use crate::context::Session;
use crate::countdown::{Countdown, Tick};
use crate::error::{Result, SessionError};
use crate::failure::failure_reason;

const CHOOSE_SUBJECT: &str = "Please choose a subject.";
const SEARCH_FAILED: &str =
    "Error while searching for tutors. Please check your connection and try again.";
const ALREADY_HAS_TUTOR: &str = "You already have a tutor and cannot register another one.";
const SUBMIT_IN_PROGRESS: &str = "Processing, please wait.";
const SIGN_IN_REQUIRED: &str =
    "You are not signed in. Please sign in to complete the registration.";
const MISSING_SELECTION: &str = "Please choose a subject and a tutor before registering.";
const NO_REGISTRATION_ID: &str = "No registration id returned";
const DEFAULT_TUTOR_NAME: &str = "Tutor";

// ============================================================================
// WizardStep
// ============================================================================

/// Where the wizard is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Step 1: choose a subject.
    #[default]
    SubjectSelect,
    /// Step 2: choose a tutor from the suggestions.
    TutorList,
    /// Step 3: countdown to automatic submission.
    PendingConfirm,
    /// Step 3 with the "really cancel?" prompt open; countdown paused.
    ConfirmCancelPrompt,
    /// Step 3 after a confirmed cancel.
    CancelSuccess,
    /// Step 4: registered and approved.
    Success,
    /// The user navigated away.
    Exited,
}

impl WizardStep {
    /// The step number shown to the user, if the wizard is still open.
    ///
    /// # Examples
    ///
    /// ```
    /// use tutorhub_session::wizard::WizardStep;
    ///
    /// assert_eq!(WizardStep::TutorList.number(), Some(2));
    /// assert_eq!(WizardStep::ConfirmCancelPrompt.number(), Some(3));
    /// assert_eq!(WizardStep::Exited.number(), None);
    /// ```
    #[must_use]
    pub const fn number(self) -> Option<u8> {
        match self {
            Self::SubjectSelect => Some(1),
            Self::TutorList => Some(2),
            Self::PendingConfirm | Self::ConfirmCancelPrompt | Self::CancelSuccess => Some(3),
            Self::Success => Some(4),
            Self::Exited => None,
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SubjectSelect => "SubjectSelect",
            Self::TutorList => "TutorList",
            Self::PendingConfirm => "PendingConfirm",
            Self::ConfirmCancelPrompt => "ConfirmCancelPrompt",
            Self::CancelSuccess => "CancelSuccess",
            Self::Success => "Success",
            Self::Exited => "Exited",
        };
        f.write_str(name)
    }
}

/// What one countdown tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickResult {
    /// Not counting (wrong step or countdown stopped).
    Ignored,
    /// Counting down; seconds left.
    Counting(u32),
    /// The countdown ran out and registration plus approval succeeded.
    Registered,
    /// The countdown ran out and submission failed with this message.
    SubmitFailed(String),
}

// ============================================================================
// RegistrationWizard
// ============================================================================

/// State machine of the registration wizard.
#[derive(Debug)]
pub struct RegistrationWizard<A> {
    api: A,
    session: Session,
    step: WizardStep,

    subjects: Vec<Subject>,
    selected_subject: Option<Subject>,
    existing_tutor: Option<String>,

    tutors: Vec<TutorSuggestion>,
    page: usize,
    page_size: usize,
    selected_tutor: Option<TutorSuggestion>,

    countdown: Countdown,
    submitting: bool,
    submission_error: Option<String>,
    registration_id: Option<i64>,
    registration_status: Option<RegistrationStatus>,

    alert: Option<String>,
}

impl<A: RegistrationApi> RegistrationWizard<A> {
    /// Creates a wizard at step 1.
    pub fn new(api: A, session: Session, countdown_seconds: u32, page_size: usize) -> Self {
        Self {
            api,
            session,
            step: WizardStep::SubjectSelect,
            subjects: Vec::new(),
            selected_subject: None,
            existing_tutor: None,
            tutors: Vec::new(),
            page: 1,
            page_size: page_size.max(1),
            selected_tutor: None,
            countdown: Countdown::new(countdown_seconds),
            submitting: false,
            submission_error: None,
            registration_id: None,
            registration_status: None,
            alert: None,
        }
    }

    /// Creates a wizard using the configured countdown and page size.
    pub fn from_config(api: A, session: Session, config: &Config) -> Self {
        Self::new(api, session, config.countdown_seconds, config.tutor_page_size)
    }

    // ------------------------------------------------------------------------
    // Step 1
    // ------------------------------------------------------------------------

    /// Loads the subject catalog and checks for an existing approved tutor.
    #[instrument(skip(self))]
    pub async fn activate(&mut self) {
        self.subjects = match self.api.subjects().await {
            Ok(subjects) => subjects,
            Err(e) => {
                warn!(error = %e, "failed to load subjects");
                Vec::new()
            }
        };
        debug!(count = self.subjects.len(), "subjects loaded");

        self.existing_tutor = None;
        if let Some(student_id) = self.session.user_id() {
            match self.api.my_tutor(student_id).await {
                Ok(Some(tutor)) if tutor.is_approved() => {
                    let name = tutor.display_name().unwrap_or(DEFAULT_TUTOR_NAME);
                    info!(tutor = name, "student already has an approved tutor");
                    self.existing_tutor = Some(name.to_string());
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "failed to check for an approved tutor"),
            }
        }
    }

    /// Picks a subject from the catalog.
    ///
    /// Returns `Ok(false)` with an alert when selection is disabled or the
    /// subject is unknown.
    pub fn select_subject(&mut self, subject_id: i64) -> Result<bool> {
        self.expect_step(WizardStep::SubjectSelect, "select_subject")?;
        if self.existing_tutor.is_some() {
            self.alert = Some(ALREADY_HAS_TUTOR.to_string());
            return Ok(false);
        }
        match self.subjects.iter().find(|s| s.subject_id == subject_id) {
            Some(subject) => {
                self.selected_subject = Some(subject.clone());
                Ok(true)
            }
            None => {
                self.alert = Some(CHOOSE_SUBJECT.to_string());
                Ok(false)
            }
        }
    }

    /// Searches tutors for the selected subject and moves to step 2.
    ///
    /// Returns `Ok(false)` with an alert when nothing was found or the
    /// search failed; the wizard then stays at step 1.
    #[instrument(skip(self))]
    pub async fn find_tutors(&mut self) -> Result<bool> {
        self.expect_step(WizardStep::SubjectSelect, "find_tutors")?;
        if self.existing_tutor.is_some() {
            self.alert = Some(ALREADY_HAS_TUTOR.to_string());
            return Ok(false);
        }
        let Some(subject) = self.selected_subject.clone() else {
            self.alert = Some(CHOOSE_SUBJECT.to_string());
            return Ok(false);
        };

        let tutors = match self.api.suggest_tutors(&subject.subject_name).await {
            Ok(tutors) => tutors,
            Err(e) => {
                warn!(error = %e, "tutor search failed");
                self.alert = Some(SEARCH_FAILED.to_string());
                return Ok(false);
            }
        };

        if tutors.is_empty() {
            self.alert = Some(format!(
                "No tutors found for {}. Please try again or choose another subject.",
                subject.subject_name
            ));
            return Ok(false);
        }

        info!(subject = %subject.subject_name, count = tutors.len(), "tutors found");
        self.tutors = tutors;
        self.page = 1;
        self.step = WizardStep::TutorList;
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Step 2
    // ------------------------------------------------------------------------

    /// Number of tutor pages, at least one.
    pub fn total_pages(&self) -> usize {
        self.tutors.len().div_ceil(self.page_size).max(1)
    }

    /// Moves to page `page` (1-based). Out-of-range pages are refused.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.page = page;
        true
    }

    /// Tutors on the current page.
    pub fn visible_tutors(&self) -> &[TutorSuggestion] {
        let start = (self.page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.tutors.len());
        self.tutors.get(start..end).unwrap_or_default()
    }

    /// Selects the `index`-th visible tutor, moves to step 3 and starts the
    /// countdown. Returns `Ok(false)` for an index outside the page.
    pub fn select_tutor(&mut self, index: usize) -> Result<bool> {
        self.expect_step(WizardStep::TutorList, "select_tutor")?;
        let Some(tutor) = self.visible_tutors().get(index).cloned() else {
            return Ok(false);
        };
        info!(tutor = %tutor.name, "tutor selected, countdown started");
        self.selected_tutor = Some(tutor);
        self.submission_error = None;
        self.step = WizardStep::PendingConfirm;
        self.countdown.start();
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Step 3: countdown and submission
    // ------------------------------------------------------------------------

    /// Advances the countdown by one second, submitting when it runs out.
    ///
    /// Outside step 3 (including while the cancel prompt is open) nothing
    /// happens.
    pub async fn tick(&mut self) -> TickResult {
        if self.step != WizardStep::PendingConfirm {
            return TickResult::Ignored;
        }
        match self.countdown.tick() {
            Tick::Idle => TickResult::Ignored,
            Tick::Remaining(left) => TickResult::Counting(left),
            Tick::Finished => match self.submit_and_approve().await {
                Ok(()) => TickResult::Registered,
                Err(message) => TickResult::SubmitFailed(message),
            },
        }
    }

    /// Ticks every `period` until the countdown stops or the wizard leaves
    /// step 3. Returns the last tick's result.
    pub async fn run_countdown(&mut self, period: Duration) -> TickResult {
        self.run_countdown_with(period, |_| {}).await
    }

    /// Like [`run_countdown`](Self::run_countdown), reporting every tick.
    pub async fn run_countdown_with<F>(&mut self, period: Duration, mut on_tick: F) -> TickResult
    where
        F: FnMut(&TickResult),
    {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await;

        let mut last = TickResult::Ignored;
        while self.step == WizardStep::PendingConfirm && self.countdown.is_running() {
            interval.tick().await;
            last = self.tick().await;
            on_tick(&last);
        }
        last
    }

    async fn submit_and_approve(&mut self) -> std::result::Result<(), String> {
        if self.submitting {
            return Err(self.fail(SUBMIT_IN_PROGRESS));
        }
        let Some(student_id) = self.session.user_id() else {
            return Err(self.fail(SIGN_IN_REQUIRED));
        };
        let (Some(subject_id), Some(tutor_id)) = (
            self.selected_subject.as_ref().map(|s| s.subject_id),
            self.selected_tutor.as_ref().and_then(|t| t.tutor_id),
        ) else {
            return Err(self.fail(MISSING_SELECTION));
        };

        self.submitting = true;
        self.submission_error = None;
        let result = self.register_and_approve(student_id, subject_id, tutor_id).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                info!(student_id, tutor_id, subject_id, "registration approved");
                self.registration_status = Some(RegistrationStatus::Approved);
                self.step = WizardStep::Success;
                Ok(())
            }
            Err(message) => Err(self.fail(&message)),
        }
    }

    async fn register_and_approve(
        &mut self,
        student_id: i64,
        subject_id: i64,
        tutor_id: i64,
    ) -> std::result::Result<(), String> {
        let receipt = self
            .api
            .register_tutor(student_id, subject_id, tutor_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "registration failed");
                failure_reason(&e)
            })?;

        self.registration_id = receipt.registration_id;
        self.registration_status = Some(receipt.status.unwrap_or(RegistrationStatus::Pending));
        let Some(registration_id) = receipt.registration_id else {
            return Err(NO_REGISTRATION_ID.to_string());
        };

        debug!(registration_id, "registration pending, approving");
        self.api
            .approve_registration(registration_id, tutor_id)
            .await
            .map_err(|e| {
                warn!(error = %e, registration_id, "approval failed");
                failure_reason(&e)
            })
    }

    fn fail(&mut self, message: &str) -> String {
        self.submission_error = Some(message.to_string());
        message.to_string()
    }

    // ------------------------------------------------------------------------
    // Cancel sub-flow
    // ------------------------------------------------------------------------

    /// Opens the "really cancel?" prompt.
    pub fn request_cancel(&mut self) -> Result<()> {
        self.expect_step(WizardStep::PendingConfirm, "request_cancel")?;
        self.step = WizardStep::ConfirmCancelPrompt;
        Ok(())
    }

    /// Answers the cancel prompt.
    ///
    /// On "yes" a known registration is cancelled best-effort, the countdown
    /// stops and the wizard shows the cancel confirmation. On "no" step 3
    /// resumes where it was.
    #[instrument(skip(self))]
    pub async fn confirm_cancel(&mut self, confirmed: bool) -> Result<()> {
        self.expect_step(WizardStep::ConfirmCancelPrompt, "confirm_cancel")?;
        if !confirmed {
            self.step = WizardStep::PendingConfirm;
            return Ok(());
        }

        self.countdown.cancel();
        if let (Some(registration_id), Some(student_id)) =
            (self.registration_id, self.session.user_id())
        {
            match self.api.cancel_registration(registration_id, student_id).await {
                Ok(()) => {
                    info!(registration_id, "registration cancelled");
                    self.registration_id = None;
                    self.registration_status = Some(RegistrationStatus::Cancelled);
                }
                Err(e) => warn!(error = %e, registration_id, "cancel-registration failed"),
            }
        }
        self.step = WizardStep::CancelSuccess;
        Ok(())
    }

    /// Starts over at step 1 after a cancel, clearing every selection.
    pub fn restart(&mut self) -> Result<()> {
        self.expect_step(WizardStep::CancelSuccess, "restart")?;
        self.selected_subject = None;
        self.tutors.clear();
        self.page = 1;
        self.selected_tutor = None;
        self.countdown.reset();
        self.submitting = false;
        self.submission_error = None;
        self.registration_id = None;
        self.registration_status = None;
        self.alert = None;
        self.step = WizardStep::SubjectSelect;
        Ok(())
    }

    /// Leaves the wizard from a terminal screen.
    pub fn leave(&mut self) -> Result<()> {
        if !matches!(self.step, WizardStep::CancelSuccess | WizardStep::Success) {
            return Err(SessionError::invalid_transition(self.step, WizardStep::Exited));
        }
        self.countdown.cancel();
        self.step = WizardStep::Exited;
        Ok(())
    }

    /// Goes back one step: tutor list to subjects, or confirm to tutor list.
    pub fn back(&mut self) -> Result<()> {
        match self.step {
            WizardStep::TutorList => {
                self.step = WizardStep::SubjectSelect;
                Ok(())
            }
            WizardStep::PendingConfirm => {
                self.countdown.cancel();
                self.selected_tutor = None;
                self.submission_error = None;
                self.step = WizardStep::TutorList;
                Ok(())
            }
            other => Err(SessionError::invalid_transition(other, "previous step")),
        }
    }

    fn expect_step(&self, expected: WizardStep, action: &str) -> Result<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(SessionError::invalid_transition(self.step, action))
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// The backend client.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Current step.
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// The subject catalog.
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Selected subject.
    pub const fn selected_subject(&self) -> Option<&Subject> {
        self.selected_subject.as_ref()
    }

    /// Selected tutor.
    pub const fn selected_tutor(&self) -> Option<&TutorSuggestion> {
        self.selected_tutor.as_ref()
    }

    /// All tutor suggestions.
    pub fn tutors(&self) -> &[TutorSuggestion] {
        &self.tutors
    }

    /// Current page, 1-based.
    pub const fn page(&self) -> usize {
        self.page
    }

    /// Seconds left on the countdown.
    pub const fn countdown_remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    /// Whether the countdown is running.
    pub const fn is_countdown_running(&self) -> bool {
        self.countdown.is_running()
    }

    /// Inline error shown at step 3.
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    /// Registration created by the last submission.
    pub const fn registration_id(&self) -> Option<i64> {
        self.registration_id
    }

    /// Last known registration status.
    pub const fn registration_status(&self) -> Option<&RegistrationStatus> {
        self.registration_status.as_ref()
    }

    /// Whether subject selection and search are enabled.
    pub const fn can_select_subject(&self) -> bool {
        self.existing_tutor.is_none()
    }

    /// Banner naming the student's existing tutor, if there is one.
    pub fn existing_tutor_banner(&self) -> Option<String> {
        self.existing_tutor.as_ref().map(|name| {
            format!("You already have a tutor ({name}) and cannot register another one.")
        })
    }

    /// Takes the pending alert, if any.
    pub fn take_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}

// ============================================================================
// Tests
// ============================================================================
