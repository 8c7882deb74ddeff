//! End-to-end tests of the view-state controllers over real HTTP.
//!
//! Each test drives a controller against a scripted backend and checks
//! both the resulting view state and the requests that reached the wire.

mod mock_backend;

use std::time::Duration;

use chrono::NaiveDate;
use mock_backend::{client, MockBackend};
use serde_json::json;
use tutorhub_session::{
    AvailabilityEditor, BookingController, BookingForm, BookingOutcome, CancelOutcome, DataMode,
    EditorMode, MeetingListMode, RegistrationWizard, SaveOutcome, Session, TickResult, TimeBound,
    WizardStep,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn script_tutor(mock: &MockBackend) {
    mock.on_json(
        "GET /api/tutor-registration/student/5/my-tutor",
        200,
        &json!({ "tutorId": 2, "tutorName": "Tran B", "status": "APPROVED", "registrationId": 1 }),
    );
}

// ============================================================================
// Booking
// ============================================================================

/// Tests the full booking path: tutor, calendar, slot, submit.
#[tokio::test]
async fn test_booking_flow() {
    let mock = MockBackend::default();
    script_tutor(&mock);
    mock.on_json(
        "GET /scheduling/tutors/2/available-slots",
        200,
        &json!([
            { "date": "2025-12-01", "timeRanges": [
                { "startTime": "08:00:00", "endTime": "09:00:00" },
                { "startTime": "13:30:00", "endTime": "15:00:00" }
            ]},
            { "date": "2025-12-02", "timeRanges": [] }
        ]),
    );
    mock.on_json("POST /scheduling/appointments", 200, &json!({ "appointmentId": 30 }));

    let api = client(&mock.spawn().await);
    let mut booking = BookingController::new(
        api,
        Session::student(5, "sv05"),
        DataMode::Live,
        date(2025, 12, 1),
    );

    let tutor_id = booking
        .load_my_tutor(5)
        .await
        .and_then(|t| t.tutor_id)
        .expect("tutor");
    booking.load_free_slots(tutor_id).await;
    assert_eq!(booking.chosen_slot(), Some("08:00 - 09:00"));
    assert_eq!(
        booking.available_dates(),
        vec![date(2025, 12, 1), date(2025, 12, 2)]
    );

    booking.select_date(date(2025, 12, 2));
    assert!(booking.ranges().is_empty());
    assert!(booking.chosen_slot().is_none());

    booking.select_date(date(2025, 12, 1));
    assert!(booking.choose_slot(1));
    assert_eq!(booking.chosen_slot(), Some("13:30 - 15:00"));

    let mut form = BookingForm {
        preferred_start: Some("13:30".to_string()),
        preferred_end: Some("14:30".to_string()),
        topic: "Integrals".to_string(),
        message: Some("Chapter 3".to_string()),
    };
    assert_eq!(booking.submit_booking(&mut form).await, BookingOutcome::Booked);
    assert!(form.topic.is_empty());

    let sent = mock.requests_to("POST /scheduling/appointments");
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body,
        Some(json!({
            "studentId": 5,
            "tutorId": 2,
            "date": "2025-12-01",
            "startTime": "13:30",
            "endTime": "14:30",
            "topic": "Integrals",
            "message": "Chapter 3"
        }))
    );
}

/// Tests that a refused booking shows the server's reason and an
/// incomplete form never reaches the wire.
#[tokio::test]
async fn test_booking_rejections() {
    let mock = MockBackend::default();
    script_tutor(&mock);
    mock.on_json(
        "GET /scheduling/tutors/2/available-slots",
        200,
        &json!([{ "date": "2025-12-01", "timeRanges": [
            { "startTime": "08:00:00", "endTime": "09:00:00" }
        ]}]),
    );
    mock.on_json(
        "POST /scheduling/appointments",
        400,
        &json!({ "error": "The tutor is busy at that time" }),
    );

    let api = client(&mock.spawn().await);
    let mut booking = BookingController::new(
        api,
        Session::student(5, "sv05"),
        DataMode::Live,
        date(2025, 12, 1),
    );
    booking.load_my_tutor(5).await;
    booking.load_free_slots(2).await;

    let mut blank_topic = BookingForm {
        preferred_start: Some("08:00".to_string()),
        preferred_end: Some("09:00".to_string()),
        topic: "   ".to_string(),
        message: None,
    };
    assert!(matches!(
        booking.submit_booking(&mut blank_topic).await,
        BookingOutcome::Rejected(_)
    ));
    assert!(mock.requests_to("POST /scheduling/appointments").is_empty());

    let mut form = BookingForm {
        topic: "Limits".to_string(),
        ..blank_topic
    };
    assert_eq!(
        booking.submit_booking(&mut form).await,
        BookingOutcome::Failed("Error: The tutor is busy at that time".to_string())
    );
    assert_eq!(form.topic, "Limits");
}

/// Tests that the seeded calendar replaces a failed fetch only in seeded mode.
#[tokio::test]
async fn test_seeded_mode_fallback() {
    let mock = MockBackend::default();
    mock.on_text("GET /scheduling/tutors/2/available-slots", 503, "");
    let base_url = mock.spawn().await;

    let mut live = BookingController::new(
        client(&base_url),
        Session::student(5, "sv05"),
        DataMode::Live,
        date(2025, 12, 1),
    );
    live.load_free_slots(2).await;
    assert!(live.slot_error().is_some());
    assert!(live.ranges().is_empty());

    let mut seeded = BookingController::new(
        client(&base_url),
        Session::student(5, "sv05"),
        DataMode::Seeded,
        date(2025, 12, 1),
    );
    seeded.load_free_slots(2).await;
    assert!(seeded.slot_error().is_none());
    assert!(seeded.is_using_seed_data());
    assert_eq!(seeded.chosen_slot(), Some("08:00 - 09:00"));
}

// ============================================================================
// Meetings
// ============================================================================

/// Tests that cancelled meetings are hidden and cancelling reloads the list.
#[tokio::test]
async fn test_meetings_and_cancel() {
    let mock = MockBackend::default();
    let meetings = json!([
        { "meetingId": 1, "topic": "Limits", "startTime": "2025-12-01T08:00:00",
          "endTime": "2025-12-01T09:00:00", "type": "APPOINTMENT", "status": "SCHEDULED" },
        { "meetingId": 2, "topic": "Series", "startTime": "2025-12-02T08:00:00",
          "endTime": "2025-12-02T09:00:00", "type": "appointment", "status": "Cancelled" },
        { "meetingId": 3, "topic": "Vectors", "status": "SCHEDULED" }
    ]);
    mock.on_json("GET /scheduling/students/5/meetings", 200, &meetings);
    mock.on_json("GET /scheduling/students/5/meetings/cancelable", 200, &meetings);
    mock.on_json("POST /scheduling/meetings/1/cancel", 200, &json!({ "result": "ok" }));

    let api = client(&mock.spawn().await);
    let mut booking = BookingController::new(
        api,
        Session::student(5, "sv05"),
        DataMode::Live,
        date(2025, 12, 1),
    );

    let ids: Vec<i64> = booking
        .load_meetings(5, MeetingListMode::Official)
        .await
        .iter()
        .map(|m| m.meeting_id)
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let mode = booking.toggle_cancel_mode();
    assert_eq!(mode, MeetingListMode::Cancelable);
    booking.load_meetings(5, mode).await;

    booking.open_cancel_modal(1);
    assert_eq!(booking.cancel_meeting(1, "  ").await, CancelOutcome::ReasonRequired);
    assert!(mock.requests_to("POST /scheduling/meetings/1/cancel").is_empty());

    assert_eq!(
        booking.cancel_meeting(1, "Feeling sick").await,
        CancelOutcome::Cancelled
    );
    assert!(booking.cancel_target().is_none());

    let sent = mock.requests_to("POST /scheduling/meetings/1/cancel");
    assert_eq!(sent[0].body, Some(json!({ "reason": "Feeling sick" })));
    assert_eq!(
        mock.requests_to("GET /scheduling/students/5/meetings/cancelable")
            .len(),
        2
    );
}

// ============================================================================
// Registration wizard
// ============================================================================

fn script_catalog(mock: &MockBackend) {
    mock.on_json(
        "GET /api/subjects",
        200,
        &json!([{ "subjectId": 1, "subjectName": "Calculus 1" }]),
    );
    mock.on_json(
        "GET /api/tutor-registration/suggest",
        200,
        &json!([
            { "tutorId": 2, "name": "Tran B" },
            { "tutorId": 3, "name": "Le C" },
            { "tutorId": 4, "name": "Pham D" },
            { "tutorId": 6, "name": "Vo E" }
        ]),
    );
}

/// Tests subject, tutor, countdown, register and auto-approve.
#[tokio::test]
async fn test_wizard_registers_and_approves() {
    let mock = MockBackend::default();
    script_catalog(&mock);
    mock.on_json(
        "POST /api/tutor-registration/register-tutor",
        200,
        &json!({ "registrationId": 41, "status": "PENDING" }),
    );
    mock.on_json(
        "POST /api/tutor-registration/41/approve",
        200,
        &json!({ "result": "Registration approved" }),
    );

    let api = client(&mock.spawn().await);
    let mut wizard = RegistrationWizard::new(api, Session::student(5, "sv05"), 2, 3);
    wizard.activate().await;
    assert!(wizard.existing_tutor_banner().is_none());

    assert!(wizard.select_subject(1).expect("select subject"));
    assert!(wizard.find_tutors().await.expect("find tutors"));
    assert_eq!(wizard.step(), WizardStep::TutorList);
    assert_eq!(wizard.total_pages(), 2);
    assert!(wizard.set_page(2));
    assert_eq!(wizard.visible_tutors().len(), 1);

    assert!(wizard.select_tutor(0).expect("select tutor"));
    assert_eq!(wizard.step(), WizardStep::PendingConfirm);

    let mut ticks = Vec::new();
    let last = wizard
        .run_countdown_with(Duration::from_millis(5), |tick| ticks.push(tick.clone()))
        .await;
    assert_eq!(last, TickResult::Registered);
    assert_eq!(ticks, vec![TickResult::Counting(1), TickResult::Registered]);
    assert_eq!(wizard.step(), WizardStep::Success);
    assert_eq!(wizard.registration_id(), Some(41));

    let register = mock.requests_to("POST /api/tutor-registration/register-tutor");
    assert_eq!(
        register[0].body,
        Some(json!({ "studentId": 5, "subjectId": 1, "tutorId": 6 }))
    );
    let approve = mock.requests_to("POST /api/tutor-registration/41/approve");
    assert_eq!(approve[0].body, Some(json!({ "tutorId": 6 })));

    wizard.leave().expect("leave");
    assert_eq!(wizard.step(), WizardStep::Exited);
}

/// Tests that a failed approval keeps the wizard on the confirm step.
#[tokio::test]
async fn test_wizard_approve_failure_is_reported() {
    let mock = MockBackend::default();
    script_catalog(&mock);
    mock.on_json(
        "POST /api/tutor-registration/register-tutor",
        200,
        &json!({ "registrationId": 41, "status": "PENDING" }),
    );
    mock.on_json(
        "POST /api/tutor-registration/41/approve",
        400,
        &json!({ "error": "Tutor is full" }),
    );

    let api = client(&mock.spawn().await);
    let mut wizard = RegistrationWizard::new(api, Session::student(5, "sv05"), 1, 3);
    wizard.activate().await;
    wizard.select_subject(1).expect("select subject");
    wizard.find_tutors().await.expect("find tutors");
    wizard.select_tutor(0).expect("select tutor");

    let last = wizard.run_countdown(Duration::from_millis(5)).await;
    assert_eq!(last, TickResult::SubmitFailed("Tutor is full".to_string()));
    assert_eq!(wizard.step(), WizardStep::PendingConfirm);
    assert_eq!(wizard.submission_error(), Some("Tutor is full"));

    // Cancelling now withdraws the pending registration.
    mock.on_json(
        "POST /api/tutor-registration/cancel-registration",
        200,
        &json!({ "result": "Registration cancelled" }),
    );
    wizard.request_cancel().expect("request cancel");
    wizard.confirm_cancel(true).await.expect("confirm cancel");
    assert_eq!(wizard.step(), WizardStep::CancelSuccess);

    let sent = mock.requests_to("POST /api/tutor-registration/cancel-registration");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id.as_deref(), Some("5"));
    assert_eq!(
        sent[0].body,
        Some(json!({ "registrationId": 41, "studentId": 5 }))
    );

    wizard.restart().expect("restart");
    assert_eq!(wizard.step(), WizardStep::SubjectSelect);
    assert!(wizard.selected_subject().is_none());
}

/// Tests that a student with an approved tutor cannot start the wizard.
#[tokio::test]
async fn test_wizard_blocks_existing_tutor() {
    let mock = MockBackend::default();
    script_catalog(&mock);
    script_tutor(&mock);

    let api = client(&mock.spawn().await);
    let mut wizard = RegistrationWizard::new(api, Session::student(5, "sv05"), 10, 3);
    wizard.activate().await;

    assert_eq!(
        wizard.existing_tutor_banner().as_deref(),
        Some("You already have a tutor (Tran B) and cannot register another one.")
    );
    assert!(!wizard.select_subject(1).expect("select subject"));
    assert!(wizard.take_alert().is_some());
    assert!(mock
        .requests_to("GET /api/tutor-registration/suggest")
        .is_empty());
}

// ============================================================================
// Availability editor
// ============================================================================

/// Tests load, edit, save and reload of one day.
#[tokio::test]
async fn test_availability_edit_and_save() {
    let mock = MockBackend::default();
    mock.on_json(
        "GET /freeslots/daily",
        200,
        &json!({ "date": "2025-10-15", "timeRanges": [
            { "startTime": "08:00:00", "endTime": "10:00:00" }
        ]}),
    );
    mock.on_json(
        "POST /freeslots/daily",
        200,
        &json!(["Range 13:00-14:00 overlaps a booked appointment"]),
    );

    let api = client(&mock.spawn().await);
    let mut editor = AvailabilityEditor::new(api, date(2025, 10, 15));
    editor.load(date(2025, 10, 15)).await;
    assert_eq!(editor.saved_ranges().len(), 1);

    editor.enter_setup();
    editor.add_range();
    assert!(editor.change_time(1, TimeBound::Start, "13:00"));
    assert!(editor.change_time(1, TimeBound::End, "14:00"));

    let outcome = editor.save().await.expect("save");
    assert_eq!(
        outcome,
        SaveOutcome::Saved {
            warnings: vec!["Range 13:00-14:00 overlaps a booked appointment".to_string()]
        }
    );
    assert_eq!(editor.mode(), EditorMode::View);

    let gets = mock.requests_to("GET /freeslots/daily");
    assert_eq!(gets.len(), 2);
    assert_eq!(gets[0].query.as_deref(), Some("date=2025-10-15"));

    let posts = mock.requests_to("POST /freeslots/daily");
    assert_eq!(
        posts[0].body,
        Some(json!({
            "date": "2025-10-15",
            "timeRanges": [
                { "startTime": "08:00:00", "endTime": "10:00:00" },
                { "startTime": "13:00:00", "endTime": "14:00:00" }
            ]
        }))
    );
}
