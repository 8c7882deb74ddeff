//! TutorHub Session
//!
//! View-state controllers for the TutorHub client: appointment booking, the
//! tutor registration wizard and the tutor's availability editor, together
//! with configuration and the signed-in user context.

pub mod availability;
pub mod booking;
pub mod config;
pub mod context;
pub mod countdown;
pub mod error;
pub mod failure;
pub mod seed;
pub mod time_status;
pub mod wizard;


pub use availability::{time_options, AvailabilityEditor, EditorMode, SaveOutcome, TimeBound};
pub use booking::{
    filter_active_meetings, BookingController, BookingForm, BookingOutcome, CancelOutcome,
    MeetingListMode,
};
pub use config::{AuthConfig, Config, DataMode};
pub use context::{Role, Session, User};
pub use countdown::{Countdown, Tick};
pub use error::{Result, SessionError};
pub use failure::{failure_reason, normalize_failure};
pub use time_status::{classify, format_meeting_window, TimeStatus};
pub use wizard::{RegistrationWizard, TickResult, WizardStep};
