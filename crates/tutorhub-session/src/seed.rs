//! Built-in sample data for [`DataMode::Seeded`](crate::config::DataMode).
//!
//! Only substituted after a failed fetch, and only in seeded mode.

use chrono::{Days, NaiveDate, NaiveTime};
use tutorhub_gateway::{DailyAvailability, Meeting, MeetingType, TimeRange};

/// Sample free-slot calendar covering `today` and the two following days.
#[must_use]
pub fn seeded_calendar(today: NaiveDate) -> Vec<DailyAvailability> {
    let ranges: [&[(&str, &str)]; 3] = [
        &[("08:00:00", "09:00:00"), ("13:30:00", "15:00:00")],
        &[("09:00:00", "10:30:00")],
        &[("07:00:00", "09:00:00"), ("10:00:00", "11:00:00"), ("15:00:00", "16:00:00")],
    ];

    (0u64..)
        .zip(ranges)
        .filter_map(|(offset, day)| {
            let date = today.checked_add_days(Days::new(offset))?;
            let time_ranges = day
                .iter()
                .map(|(start, end)| TimeRange::new(*start, *end))
                .collect();
            Some(DailyAvailability::new(date, time_ranges))
        })
        .collect()
}

/// Sample meetings for a student around `today`, one of them cancelled.
#[must_use]
pub fn seeded_meetings(student_id: i64, today: NaiveDate) -> Vec<Meeting> {
    let meeting = |id: i64, day_offset: u64, start: (u32, u32), end: (u32, u32), topic: &str, status: &str| {
        let date = today.checked_add_days(Days::new(day_offset))?;
        let start = NaiveTime::from_hms_opt(start.0, start.1, 0)?;
        let end = NaiveTime::from_hms_opt(end.0, end.1, 0)?;
        Some(Meeting {
            meeting_id: id,
            topic: Some(topic.to_string()),
            start_time: Some(date.and_time(start)),
            end_time: Some(date.and_time(end)),
            meeting_type: Some(MeetingType::Appointment),
            status: Some(status.to_string()),
            online_link: None,
            student_id: Some(student_id),
            tutor_id: Some(2),
            cancellation_reason: None,
        })
    };

    [
        meeting(9001, 1, (8, 0), (9, 0), "Calculus review", "SCHEDULED"),
        meeting(9002, 2, (13, 30), (15, 0), "Linear algebra exercises", "SCHEDULED"),
        meeting(9003, 3, (9, 0), (10, 0), "Exam preparation", "CANCELLED"),
    ]
    .into_iter()
    .flatten()
    .collect()
}
