//! Integration tests for the HTTP gateway against a scripted backend.
//!
//! These tests exercise the real reqwest client over loopback: request
//! shapes, headers, and how each response shape is decoded.

mod mock_backend;

use chrono::NaiveDate;
use mock_backend::{client, MockBackend};
use serde_json::json;
use tutorhub_gateway::{
    AppointmentRequest, DailyAvailability, GatewayError, RegistrationApi, RegistrationStatus,
    SchedulingApi, TimeRange,
};
use tutorhub_session::failure_reason;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

// ============================================================================
// Catalog and headers
// ============================================================================

/// Tests that the subject catalog decodes and basic auth is attached.
#[tokio::test]
async fn test_subjects_sends_basic_auth() {
    let mock = MockBackend::default();
    mock.on_json(
        "GET /api/subjects",
        200,
        &json!([
            { "subjectId": 1, "subjectName": "Calculus 1" },
            { "subjectId": 2, "subjectName": "Physics" }
        ]),
    );
    let api = client(&mock.spawn().await);

    let subjects = api.subjects().await.expect("subjects");
    assert_eq!(subjects.len(), 2);
    assert_eq!(subjects[1].subject_name, "Physics");

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic YWxpY2U6czNjcmV0")
    );
}

/// Tests that registration carries the student id header and body.
#[tokio::test]
async fn test_register_tutor_sends_user_id_header() {
    let mock = MockBackend::default();
    mock.on_json(
        "POST /api/tutor-registration/register-tutor",
        200,
        &json!({ "registrationId": 41, "status": "PENDING" }),
    );
    let api = client(&mock.spawn().await);

    let receipt = api.register_tutor(5, 1, 2).await.expect("register");
    assert_eq!(receipt.registration_id, Some(41));
    assert_eq!(receipt.status, Some(RegistrationStatus::Pending));

    let sent = mock.requests_to("POST /api/tutor-registration/register-tutor");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].user_id.as_deref(), Some("5"));
    assert_eq!(
        sent[0].body,
        Some(json!({ "studentId": 5, "subjectId": 1, "tutorId": 2 }))
    );
}

// ============================================================================
// Response shapes
// ============================================================================

/// Tests that a 404 from the my-tutor lookup means "no tutor".
#[tokio::test]
async fn test_my_tutor_not_found_is_none() {
    let mock = MockBackend::default();
    let api = client(&mock.spawn().await);

    let tutor = SchedulingApi::my_tutor(&api, 5).await.expect("lookup");
    assert!(tutor.is_none());
    assert_eq!(
        mock.requests_to("GET /api/tutor-registration/student/5/my-tutor")
            .len(),
        1
    );
}

/// Tests that other my-tutor failures stay errors.
#[tokio::test]
async fn test_my_tutor_server_error_is_err() {
    let mock = MockBackend::default();
    mock.on_text("GET /api/tutor-registration/student/5/my-tutor", 500, "");
    let api = client(&mock.spawn().await);

    let err = RegistrationApi::my_tutor(&api, 5).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.response_body().is_none());
}

/// Tests that an approved tutor decodes with its display name.
#[tokio::test]
async fn test_my_tutor_found() {
    let mock = MockBackend::default();
    mock.on_json(
        "GET /api/tutor-registration/student/5/my-tutor",
        200,
        &json!({ "tutorId": 2, "fullName": "Nguyen Van A", "status": "approved" }),
    );
    let api = client(&mock.spawn().await);

    let tutor = api.my_tutor(5).await.expect("lookup").expect("tutor");
    assert_eq!(tutor.tutor_id, Some(2));
    assert_eq!(tutor.display_name(), Some("Nguyen Van A"));
    assert!(tutor.is_approved());
}

/// Tests the three shapes of the tutor suggestion response.
#[tokio::test]
async fn test_suggest_tutors_shapes() {
    let mock = MockBackend::default();
    let api = client(&mock.spawn().await);

    mock.on_json(
        "GET /api/tutor-registration/suggest",
        200,
        &json!({ "message": "No tutors found for this subject" }),
    );
    assert!(api.suggest_tutors("Chemistry").await.expect("suggest").is_empty());

    mock.on_json(
        "GET /api/tutor-registration/suggest",
        200,
        &json!([{ "tutorId": "7", "name": "Tran B" }, { "tutor_id": 8 }]),
    );
    let tutors = api.suggest_tutors("Calculus 1").await.expect("suggest");
    assert_eq!(tutors.len(), 2);
    assert_eq!(tutors[0].tutor_id, Some(7));
    assert_eq!(tutors[1].tutor_id, Some(8));
    assert_eq!(tutors[1].name, "Tutor");
    assert!((tutors[1].rating - 4.5).abs() < f64::EPSILON);

    mock.on_json(
        "GET /api/tutor-registration/suggest",
        200,
        &json!({ "data": [{ "tutorId": 9, "name": "Le C", "availableSlots": 4 }] }),
    );
    let tutors = api.suggest_tutors("Calculus 1").await.expect("suggest");
    assert_eq!(tutors[0].available_slots, 4);

    let sent = mock.requests_to("GET /api/tutor-registration/suggest");
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].query.as_deref(), Some("subject=Calculus+1"));
}

/// Tests that one bad tutor id does not discard the other suggestions, and
/// that an unknown shape is a decode error rather than an empty list.
#[tokio::test]
async fn test_suggest_tutors_malformed_entries() {
    let mock = MockBackend::default();
    let api = client(&mock.spawn().await);

    mock.on_json(
        "GET /api/tutor-registration/suggest",
        200,
        &json!([{ "tutorId": "abc", "name": "A" }, { "tutorId": 2, "name": "B" }]),
    );
    let tutors = api.suggest_tutors("Calculus 1").await.expect("suggest");
    assert_eq!(tutors.len(), 2);
    assert_eq!(tutors[0].tutor_id, None);
    assert_eq!(tutors[1].tutor_id, Some(2));

    mock.on_json("GET /api/tutor-registration/suggest", 200, &json!([1, 2]));
    let err = api.suggest_tutors("Calculus 1").await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
}

/// Tests that a free-slot body that is not a list reads as empty.
#[tokio::test]
async fn test_free_slots_non_list_is_empty() {
    let mock = MockBackend::default();
    mock.on_json(
        "GET /scheduling/tutors/2/available-slots",
        200,
        &json!({ "message": "No slots" }),
    );
    let api = client(&mock.spawn().await);

    let calendar = api.tutor_free_slots(2, None).await.expect("slots");
    assert!(calendar.is_empty());
}

/// Tests that the day is posted whole and an empty reply means no warnings.
#[tokio::test]
async fn test_save_daily_availability_posts_whole_day() {
    let mock = MockBackend::default();
    mock.on_text("POST /freeslots/daily", 200, "");
    let api = client(&mock.spawn().await);

    let day = DailyAvailability::new(
        date(2025, 10, 15),
        vec![TimeRange::new("08:00:00", "10:00:00")],
    );
    let warnings = api.save_daily_availability(&day).await.expect("save");
    assert!(warnings.is_empty());

    let sent = mock.requests_to("POST /freeslots/daily");
    assert_eq!(
        sent[0].body,
        Some(json!({
            "date": "2025-10-15",
            "timeRanges": [{ "startTime": "08:00:00", "endTime": "10:00:00" }]
        }))
    );
}

/// Tests that booking sends camelCase fields and omits a missing message.
#[tokio::test]
async fn test_book_appointment_request_body() {
    let mock = MockBackend::default();
    mock.on_json("POST /scheduling/appointments", 201, &json!({ "appointmentId": 12 }));
    let api = client(&mock.spawn().await);

    let request = AppointmentRequest {
        student_id: 5,
        tutor_id: 2,
        date: date(2025, 12, 1),
        start_time: "08:00".to_string(),
        end_time: "09:00".to_string(),
        topic: "Limits".to_string(),
        message: None,
    };
    let reply = api.book_appointment(&request).await.expect("book");
    assert_eq!(reply, json!({ "appointmentId": 12 }));

    let sent = mock.requests_to("POST /scheduling/appointments");
    assert_eq!(
        sent[0].body,
        Some(json!({
            "studentId": 5,
            "tutorId": 2,
            "date": "2025-12-01",
            "startTime": "08:00",
            "endTime": "09:00",
            "topic": "Limits"
        }))
    );
}

// ============================================================================
// Errors
// ============================================================================

/// Tests that server error bodies normalize to their message.
#[tokio::test]
async fn test_error_bodies_normalize() {
    let mock = MockBackend::default();
    mock.on_json(
        "POST /api/tutor-registration/41/approve",
        400,
        &json!({ "error": "Registration is not pending" }),
    );
    mock.on_text(
        "POST /scheduling/meetings/3/cancel",
        400,
        "Meeting starts in less than 24 hours",
    );
    mock.on_json(
        "POST /api/tutor/scheduling/appointments/12/reject",
        409,
        &json!({ "message": "Already handled", "error": null }),
    );
    let api = client(&mock.spawn().await);

    let err = api.approve_registration(41, 2).await.unwrap_err();
    assert_eq!(failure_reason(&err), "Registration is not pending");

    let err = api.cancel_meeting(3, "sick").await.unwrap_err();
    assert_eq!(failure_reason(&err), "Meeting starts in less than 24 hours");

    let err = api.reject_appointment(12, 2, "busy").await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(failure_reason(&err), "Already handled");
}

/// Tests that an undecodable 2xx body is a decode error.
#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock = MockBackend::default();
    mock.on_text("GET /api/subjects", 200, "<html>oops</html>");
    let api = client(&mock.spawn().await);

    let err = api.subjects().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode { .. }));
    assert_eq!(failure_reason(&err), "Server error");
}

/// Tests that an unreachable backend is a transport error.
#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    drop(listener);

    let api = client(&format!("http://{addr}"));
    let err = api.subjects().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport { .. }));
    assert!(err.status().is_none());
}
