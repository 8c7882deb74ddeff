//! TutorHub CLI
//!
//! Command-line client for the TutorHub tutoring backend: browse subjects,
//! book and cancel appointments, register with a tutor and manage a tutor's
//! availability and review queues.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tutorhub_gateway::{
    Meeting, Registration, RegistrationApi, SchedulingApi, TimeRange, TutoringClient,
};
use tutorhub_session::time_status::classify_now;
use tutorhub_session::{
    format_meeting_window, AvailabilityEditor, BookingController, BookingForm, BookingOutcome,
    CancelOutcome, Config, MeetingListMode, RegistrationWizard, SaveOutcome, Session, TickResult,
    TimeBound, WizardStep,
};

/// Period of one wizard countdown tick.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// TutorHub - tutoring appointments from the terminal
#[derive(Parser, Debug)]
#[command(name = "tutorhub")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: tutorhub.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Backend base URL, overriding the config file and TUTORHUB_API_URL
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Id of the signed-in user; omit to act anonymously
    #[arg(short = 'u', long, value_name = "ID", global = true)]
    user_id: Option<i64>,

    /// Role of the signed-in user
    #[arg(long, value_enum, default_value_t = RoleArg::Student, global = true)]
    role: RoleArg,

    /// Print records as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum RoleArg {
    Student,
    Tutor,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the subject catalog
    Subjects,

    /// List the student's meetings, cancelled ones excluded
    Meetings {
        /// Only meetings that can still be cancelled
        #[arg(long)]
        cancelable: bool,
    },

    /// Show the free slots of the student's tutor on a day
    Slots {
        /// Day to show (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Book an appointment with the student's tutor
    Book {
        /// Day of the appointment (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Index of the free slot on that day (see `slots`)
        #[arg(long, default_value_t = 0)]
        slot: usize,

        /// Preferred start, HH:MM
        #[arg(long)]
        start: String,

        /// Preferred end, HH:MM
        #[arg(long)]
        end: String,

        /// Topic of the appointment
        #[arg(long)]
        topic: String,

        /// Optional note for the tutor
        #[arg(long)]
        message: Option<String>,
    },

    /// Cancel one of the student's meetings
    Cancel {
        /// Meeting id
        meeting_id: i64,

        /// Why the meeting is cancelled
        #[arg(long)]
        reason: String,
    },

    /// Register with a tutor for a subject (auto-submits after a countdown)
    Register {
        /// Subject id (see `subjects`)
        #[arg(long)]
        subject: i64,

        /// Position of the tutor in the suggestion list, starting at 0
        #[arg(long, default_value_t = 0)]
        tutor: usize,
    },

    /// Show or replace the tutor's availability for a day
    Availability {
        #[command(subcommand)]
        action: AvailabilityAction,
    },

    /// Review registrations addressed to the tutor
    Registrations {
        #[command(subcommand)]
        action: ReviewAction,
    },

    /// Review appointment requests addressed to the tutor
    Appointments {
        #[command(subcommand)]
        action: ReviewAction,
    },
}

#[derive(Subcommand, Debug)]
enum AvailabilityAction {
    /// Show the saved ranges of a day
    Show {
        /// Day to show (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Replace every range of a day
    Set {
        /// Day to edit (YYYY-MM-DD, default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Range as HH:MM-HH:MM on the 15-minute grid; repeat for more
        #[arg(short, long = "range", value_name = "RANGE", value_parser = parse_range)]
        ranges: Vec<(String, String)>,
    },
}

#[derive(Subcommand, Debug)]
enum ReviewAction {
    /// List pending requests
    Pending,
    /// List approved students (registrations only)
    Approved,
    /// Approve a request
    Approve {
        /// Request id
        id: i64,
    },
    /// Reject a request
    Reject {
        /// Request id
        id: i64,

        /// Reason shown to the student
        #[arg(long)]
        reason: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(config = ?args.config, user_id = ?args.user_id, "TutorHub starting");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, builds the client and dispatches the subcommand.
async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?
        .with_env_overrides()
        .with_api_url_override(args.api_url.clone());
    config.validate().map_err(|e| anyhow::anyhow!("{e}"))?;

    let options = config
        .client_options()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let client = TutoringClient::new(options).map_err(|e| anyhow::anyhow!("{e}"))?;
    tracing::debug!(api_url = client.base_url(), "client ready");

    let session = session_for(args.user_id, args.role);
    let out = Output { json: args.json };
    let today = chrono::Local::now().date_naive();

    match args.command {
        Command::Subjects => {
            let subjects = client.subjects().await?;
            out.list(&subjects, |s| format!("{:>4}  {}", s.subject_id, s.subject_name))
        }
        Command::Meetings { cancelable } => {
            let student_id = require_user(&session, "list meetings")?;
            let mode = if cancelable {
                MeetingListMode::Cancelable
            } else {
                MeetingListMode::Official
            };
            let mut booking = BookingController::new(client, session, config.data_mode, today);
            let meetings = booking.load_meetings(student_id, mode).await;
            out.list(meetings, format_meeting)?;
            if booking.is_using_seed_data() {
                println!("(showing sample meetings, the backend is unavailable)");
            }
            Ok(())
        }
        Command::Slots { date } => {
            let student_id = require_user(&session, "view free slots")?;
            let mut booking = BookingController::new(client, session, config.data_mode, today);
            let tutor_id = resolve_tutor(&mut booking, student_id).await?;
            booking.load_free_slots(tutor_id).await;
            if let Some(error) = booking.slot_error() {
                anyhow::bail!("{error}");
            }
            booking.select_date(date.unwrap_or(today));
            print_slots(&booking, &out)
        }
        Command::Book {
            date,
            slot,
            start,
            end,
            topic,
            message,
        } => {
            let student_id = require_user(&session, "book an appointment")?;
            let mut booking = BookingController::new(client, session, config.data_mode, today);
            let tutor_id = resolve_tutor(&mut booking, student_id).await?;
            booking.load_free_slots(tutor_id).await;
            booking.select_date(date.unwrap_or(today));
            if !booking.ranges().is_empty() && !booking.choose_slot(slot) {
                anyhow::bail!(
                    "No free slot #{slot} on {}\n\nSuggestion: Run `tutorhub slots` to list the slots of that day",
                    booking.selected_date()
                );
            }

            let mut form = BookingForm {
                preferred_start: Some(start),
                preferred_end: Some(end),
                topic,
                message,
            };
            match booking.submit_booking(&mut form).await {
                BookingOutcome::Booked => {
                    println!("{}", booking.status_message().unwrap_or_default());
                    Ok(())
                }
                BookingOutcome::Rejected(message) | BookingOutcome::Failed(message) => {
                    anyhow::bail!("{message}")
                }
            }
        }
        Command::Cancel { meeting_id, reason } => {
            require_user(&session, "cancel a meeting")?;
            let mut booking = BookingController::new(client, session, config.data_mode, today);
            booking.open_cancel_modal(meeting_id);
            match booking.cancel_meeting(meeting_id, &reason).await {
                CancelOutcome::Cancelled => {
                    println!("Meeting {meeting_id} cancelled.");
                    Ok(())
                }
                CancelOutcome::ReasonRequired => anyhow::bail!(
                    "A cancellation reason is required\n\nSuggestion: Pass --reason \"...\""
                ),
                CancelOutcome::Failed(message) => anyhow::bail!("{message}"),
            }
        }
        Command::Register { subject, tutor } => {
            let wizard = RegistrationWizard::from_config(client, session, &config);
            run_registration(wizard, subject, tutor, &out).await
        }
        Command::Availability { action } => {
            require_tutor(&session, "manage availability")?;
            run_availability(client, action, today, &out).await
        }
        Command::Registrations { action } => {
            let tutor_id = require_tutor(&session, "review registrations")?;
            run_registration_review(&client, tutor_id, action, &out).await
        }
        Command::Appointments { action } => {
            let tutor_id = require_tutor(&session, "review appointments")?;
            run_appointment_review(&client, tutor_id, action, &out).await
        }
    }
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

fn session_for(user_id: Option<i64>, role: RoleArg) -> Session {
    let username = std::env::var("USER").unwrap_or_else(|_| "tutorhub".to_string());
    match (user_id, role) {
        (None, _) => Session::Anonymous,
        (Some(id), RoleArg::Student) => Session::student(id, username),
        (Some(id), RoleArg::Tutor) => Session::tutor(id, username),
    }
}

fn require_user(session: &Session, action: &str) -> anyhow::Result<i64> {
    session.user_id().ok_or_else(|| {
        anyhow::anyhow!("You must be signed in to {action}\n\nSuggestion: Pass --user-id <ID>")
    })
}

fn require_tutor(session: &Session, action: &str) -> anyhow::Result<i64> {
    match session.user() {
        Some(user) if user.role == tutorhub_session::Role::Tutor => Ok(user.id),
        _ => anyhow::bail!(
            "Only a tutor can {action}\n\nSuggestion: Pass --user-id <ID> --role tutor"
        ),
    }
}

async fn resolve_tutor(
    booking: &mut BookingController<TutoringClient>,
    student_id: i64,
) -> anyhow::Result<i64> {
    booking
        .load_my_tutor(student_id)
        .await
        .and_then(|tutor| tutor.tutor_id)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "You do not have an approved tutor yet\n\nSuggestion: Run `tutorhub register --subject <ID>` first"
            )
        })
}

// ============================================================================
// Registration wizard
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RegistrationSummary<'a> {
    step: WizardStep,
    subject: Option<&'a str>,
    tutor: Option<&'a str>,
    registration_id: Option<i64>,
    status: Option<String>,
}

/// Walks the wizard: subject, tutor, countdown. Ctrl+C during the countdown
/// answers the cancel prompt with "yes".
async fn run_registration(
    mut wizard: RegistrationWizard<TutoringClient>,
    subject_id: i64,
    tutor_index: usize,
    out: &Output,
) -> anyhow::Result<()> {
    wizard.activate().await;
    if let Some(banner) = wizard.existing_tutor_banner() {
        anyhow::bail!("{banner}");
    }

    if !wizard.select_subject(subject_id)? || !wizard.find_tutors().await? {
        let alert = wizard.take_alert().unwrap_or_default();
        anyhow::bail!("{alert}\n\nSuggestion: Run `tutorhub subjects` to list valid subject ids");
    }

    let page_size = wizard.visible_tutors().len().max(1);
    let page = tutor_index / page_size + 1;
    if !wizard.set_page(page) || !wizard.select_tutor(tutor_index % page_size)? {
        anyhow::bail!(
            "No tutor at position {tutor_index}; {} suggested",
            wizard.tutors().len()
        );
    }

    if let Some(tutor) = wizard.selected_tutor() {
        println!(
            "Selected {} (rating {:.1}, {} free slots).",
            tutor.name, tutor.rating, tutor.available_slots
        );
    }
    println!(
        "Registering in {}s. Press Ctrl+C to cancel.",
        wizard.countdown_remaining()
    );

    let interrupted = tokio::select! {
        result = wizard.run_countdown_with(TICK_PERIOD, |tick| {
            if let TickResult::Counting(left) = tick {
                println!("  {left}...");
            }
        }) => {
            tracing::debug!(?result, "countdown finished");
            false
        }
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, cancelling registration");
            true
        }
    };

    if interrupted {
        wizard.request_cancel()?;
        wizard.confirm_cancel(true).await?;
        println!("Registration cancelled.");
        wizard.leave()?;
        return Ok(());
    }

    let summary = RegistrationSummary {
        step: wizard.step(),
        subject: wizard.selected_subject().map(|s| s.subject_name.as_str()),
        tutor: wizard.selected_tutor().map(|t| t.name.as_str()),
        registration_id: wizard.registration_id(),
        status: wizard.registration_status().map(ToString::to_string),
    };

    if wizard.step() != WizardStep::Success {
        let error = wizard.submission_error().unwrap_or("Registration failed");
        anyhow::bail!("{error}");
    }
    if out.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Registered with {} for {}.",
            summary.tutor.unwrap_or("your tutor"),
            summary.subject.unwrap_or("the subject")
        );
    }
    wizard.leave()?;
    Ok(())
}

// ============================================================================
// Tutor commands
// ============================================================================

async fn run_availability(
    client: TutoringClient,
    action: AvailabilityAction,
    today: NaiveDate,
    out: &Output,
) -> anyhow::Result<()> {
    match action {
        AvailabilityAction::Show { date } => {
            let date = date.unwrap_or(today);
            let mut editor = AvailabilityEditor::new(client, date);
            editor.load(date).await;
            println!("Availability on {date}:");
            out.list(editor.saved_ranges(), TimeRange::label)
        }
        AvailabilityAction::Set { date, ranges } => {
            let date = date.unwrap_or(today);
            let mut editor = AvailabilityEditor::new(client, date);
            editor.load(date).await;
            editor.enter_setup();
            while editor.remove_range(0) {}
            for (index, (start, end)) in ranges.iter().enumerate() {
                editor.add_range();
                if !editor.change_time(index, TimeBound::Start, start)
                    || !editor.change_time(index, TimeBound::End, end)
                {
                    anyhow::bail!(
                        "Invalid range {start}-{end}\n\nSuggestion: Use HH:MM times on the 15-minute grid"
                    );
                }
            }

            match editor.save().await? {
                SaveOutcome::Saved { warnings } => {
                    println!(
                        "Saved {} range(s) for {date}.",
                        editor.saved_ranges().len()
                    );
                    for warning in warnings {
                        println!("  warning: {warning}");
                    }
                    Ok(())
                }
                SaveOutcome::Failed(message) => anyhow::bail!("{message}"),
            }
        }
    }
}

async fn run_registration_review(
    client: &TutoringClient,
    tutor_id: i64,
    action: ReviewAction,
    out: &Output,
) -> anyhow::Result<()> {
    match action {
        ReviewAction::Pending => {
            let registrations = RegistrationApi::pending_registrations(client, tutor_id).await?;
            out.list(&registrations, format_registration)
        }
        ReviewAction::Approved => {
            let registrations = RegistrationApi::approved_students(client, tutor_id).await?;
            out.list(&registrations, format_registration)
        }
        ReviewAction::Approve { id } => {
            RegistrationApi::approve_registration(client, id, tutor_id)
                .await
                .map_err(failure)?;
            println!("Registration {id} approved.");
            Ok(())
        }
        ReviewAction::Reject { id, reason } => {
            RegistrationApi::reject_registration(client, id, tutor_id, &reason)
                .await
                .map_err(failure)?;
            println!("Registration {id} rejected.");
            Ok(())
        }
    }
}

async fn run_appointment_review(
    client: &TutoringClient,
    tutor_id: i64,
    action: ReviewAction,
    out: &Output,
) -> anyhow::Result<()> {
    match action {
        ReviewAction::Pending => {
            let meetings = SchedulingApi::pending_appointments(client, tutor_id).await?;
            out.list(&meetings, format_meeting)
        }
        ReviewAction::Approved => anyhow::bail!(
            "Appointments have no approved list\n\nSuggestion: Run `tutorhub meetings` as the student"
        ),
        ReviewAction::Approve { id } => {
            SchedulingApi::approve_appointment(client, id, tutor_id)
                .await
                .map_err(failure)?;
            println!("Appointment {id} approved.");
            Ok(())
        }
        ReviewAction::Reject { id, reason } => {
            SchedulingApi::reject_appointment(client, id, tutor_id, &reason)
                .await
                .map_err(failure)?;
            println!("Appointment {id} rejected.");
            Ok(())
        }
    }
}

fn failure(e: tutorhub_gateway::GatewayError) -> anyhow::Error {
    anyhow::anyhow!("{}", tutorhub_session::failure_reason(&e))
}

// ============================================================================
// Output
// ============================================================================

/// Renders records as text lines or as a JSON array.
struct Output {
    json: bool,
}

impl Output {
    fn list<T: Serialize>(&self, items: &[T], line: impl Fn(&T) -> String) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
        } else if items.is_empty() {
            println!("(none)");
        } else {
            for item in items {
                println!("{}", line(item));
            }
        }
        Ok(())
    }
}

fn print_slots(booking: &BookingController<TutoringClient>, out: &Output) -> anyhow::Result<()> {
    let dates: Vec<String> = booking
        .available_dates()
        .iter()
        .map(ToString::to_string)
        .collect();
    if !out.json {
        println!("Days in the tutor's calendar: {}", dates.join(", "));
        println!("Free slots on {}:", booking.selected_date());
    }
    let ranges = booking.ranges();
    if out.json {
        println!("{}", serde_json::to_string_pretty(ranges)?);
    } else if ranges.is_empty() {
        println!("(none)");
    } else {
        for (index, range) in ranges.iter().enumerate() {
            println!("{index:>3}  {}", range.label());
        }
    }
    if booking.is_using_seed_data() {
        println!("(showing sample slots, the backend is unavailable)");
    }
    Ok(())
}

fn format_meeting(meeting: &Meeting) -> String {
    let status = match (meeting.start_time, meeting.end_time) {
        (Some(start), Some(end)) => classify_now(start, end).label(),
        _ => "",
    };
    format!(
        "{:>6}  {:<28}  {:<10}  {:<10}  {}",
        meeting.meeting_id,
        format_meeting_window(meeting.start_time, meeting.end_time),
        status,
        meeting.status.as_deref().unwrap_or("-"),
        meeting.topic.as_deref().unwrap_or("")
    )
}

fn format_registration(registration: &Registration) -> String {
    format!(
        "{:>6}  student {:<6}  subject {:<6}  {}",
        registration.id,
        registration.student_id,
        registration
            .subject_id
            .map_or_else(|| "-".to_string(), |id| id.to_string()),
        registration.registration_status
    )
}

/// Parses `HH:MM-HH:MM`.
fn parse_range(value: &str) -> Result<(String, String), String> {
    let (start, end) = value
        .split_once('-')
        .ok_or_else(|| format!("expected HH:MM-HH:MM, got '{value}'"))?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return Err(format!("expected HH:MM-HH:MM, got '{value}'"));
    }
    Ok((start.to_string(), end.to_string()))
}
