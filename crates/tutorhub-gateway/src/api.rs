//! Backend capabilities consumed by the controllers.
//!
//! Controllers are generic over these traits so they can be driven by the
//! real [`TutoringClient`] or by scripted fakes.

use std::future::Future;

use chrono::NaiveDate;
use serde_json::Value;

use crate::client::TutoringClient;
use crate::types::{
    AppointmentRequest, DailyAvailability, Meeting, MyTutor, Registration, RegistrationReceipt,
    Subject, TutorSuggestion,
};
use crate::Result;

/// A tutor's own daily availability.
pub trait AvailabilityApi {
    /// Fetches the availability for one day.
    fn daily_availability(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<DailyAvailability>> + Send;

    /// Replaces the availability for one day, returning backend warnings.
    fn save_daily_availability(
        &self,
        day: &DailyAvailability,
    ) -> impl Future<Output = Result<Vec<String>>> + Send;
}

/// Free slots, appointments and meetings.
pub trait SchedulingApi {
    /// Fetches a tutor's free-slot calendar.
    fn tutor_free_slots(
        &self,
        tutor_id: i64,
        date: Option<NaiveDate>,
    ) -> impl Future<Output = Result<Vec<DailyAvailability>>> + Send;

    /// Books an appointment.
    fn book_appointment(
        &self,
        request: &AppointmentRequest,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Lists a student's official meetings.
    fn official_meetings(&self, student_id: i64)
        -> impl Future<Output = Result<Vec<Meeting>>> + Send;

    /// Lists a student's cancelable meetings.
    fn cancelable_meetings(
        &self,
        student_id: i64,
    ) -> impl Future<Output = Result<Vec<Meeting>>> + Send;

    /// Cancels a meeting.
    fn cancel_meeting(
        &self,
        meeting_id: i64,
        reason: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Looks up the student's approved tutor; `None` when there is none.
    fn my_tutor(&self, student_id: i64) -> impl Future<Output = Result<Option<MyTutor>>> + Send;

    /// Lists appointments waiting for a tutor's decision.
    fn pending_appointments(
        &self,
        tutor_id: i64,
    ) -> impl Future<Output = Result<Vec<Meeting>>> + Send;

    /// Approves a pending appointment.
    fn approve_appointment(
        &self,
        appointment_id: i64,
        tutor_id: i64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Rejects a pending appointment.
    fn reject_appointment(
        &self,
        appointment_id: i64,
        tutor_id: i64,
        reason: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Subject catalog and tutor registrations.
pub trait RegistrationApi {
    /// Fetches the subject catalog.
    fn subjects(&self) -> impl Future<Output = Result<Vec<Subject>>> + Send;

    /// Suggests tutors for a subject name.
    fn suggest_tutors(
        &self,
        subject: &str,
    ) -> impl Future<Output = Result<Vec<TutorSuggestion>>> + Send;

    /// Creates a PENDING registration.
    fn register_tutor(
        &self,
        student_id: i64,
        subject_id: i64,
        tutor_id: i64,
    ) -> impl Future<Output = Result<RegistrationReceipt>> + Send;

    /// Cancels a registration.
    fn cancel_registration(
        &self,
        registration_id: i64,
        student_id: i64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Approves a registration.
    fn approve_registration(
        &self,
        registration_id: i64,
        tutor_id: i64,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Rejects a registration.
    fn reject_registration(
        &self,
        registration_id: i64,
        tutor_id: i64,
        reason: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Lists a tutor's pending registrations.
    fn pending_registrations(
        &self,
        tutor_id: i64,
    ) -> impl Future<Output = Result<Vec<Registration>>> + Send;

    /// Lists a tutor's approved students.
    fn approved_students(
        &self,
        tutor_id: i64,
    ) -> impl Future<Output = Result<Vec<Registration>>> + Send;

    /// Looks up the student's tutor; `None` when there is none.
    fn my_tutor(&self, student_id: i64) -> impl Future<Output = Result<Option<MyTutor>>> + Send;
}

impl AvailabilityApi for TutoringClient {
    async fn daily_availability(&self, date: NaiveDate) -> Result<DailyAvailability> {
        Self::daily_availability(self, date).await
    }

    async fn save_daily_availability(&self, day: &DailyAvailability) -> Result<Vec<String>> {
        Self::save_daily_availability(self, day).await
    }
}

impl SchedulingApi for TutoringClient {
    async fn tutor_free_slots(
        &self,
        tutor_id: i64,
        date: Option<NaiveDate>,
    ) -> Result<Vec<DailyAvailability>> {
        Self::tutor_free_slots(self, tutor_id, date).await
    }

    async fn book_appointment(&self, request: &AppointmentRequest) -> Result<Value> {
        Self::book_appointment(self, request).await
    }

    async fn official_meetings(&self, student_id: i64) -> Result<Vec<Meeting>> {
        Self::official_meetings(self, student_id).await
    }

    async fn cancelable_meetings(&self, student_id: i64) -> Result<Vec<Meeting>> {
        Self::cancelable_meetings(self, student_id).await
    }

    async fn cancel_meeting(&self, meeting_id: i64, reason: &str) -> Result<()> {
        Self::cancel_meeting(self, meeting_id, reason).await
    }

    async fn my_tutor(&self, student_id: i64) -> Result<Option<MyTutor>> {
        Self::my_tutor(self, student_id).await
    }

    async fn pending_appointments(&self, tutor_id: i64) -> Result<Vec<Meeting>> {
        Self::pending_appointments(self, tutor_id).await
    }

    async fn approve_appointment(&self, appointment_id: i64, tutor_id: i64) -> Result<()> {
        Self::approve_appointment(self, appointment_id, tutor_id).await
    }

    async fn reject_appointment(
        &self,
        appointment_id: i64,
        tutor_id: i64,
        reason: &str,
    ) -> Result<()> {
        Self::reject_appointment(self, appointment_id, tutor_id, reason).await
    }
}

impl RegistrationApi for TutoringClient {
    async fn subjects(&self) -> Result<Vec<Subject>> {
        Self::subjects(self).await
    }

    async fn suggest_tutors(&self, subject: &str) -> Result<Vec<TutorSuggestion>> {
        Self::suggest_tutors(self, subject).await
    }

    async fn register_tutor(
        &self,
        student_id: i64,
        subject_id: i64,
        tutor_id: i64,
    ) -> Result<RegistrationReceipt> {
        Self::register_tutor(self, student_id, subject_id, tutor_id).await
    }

    async fn cancel_registration(&self, registration_id: i64, student_id: i64) -> Result<()> {
        Self::cancel_registration(self, registration_id, student_id).await
    }

    async fn approve_registration(&self, registration_id: i64, tutor_id: i64) -> Result<()> {
        Self::approve_registration(self, registration_id, tutor_id).await
    }

    async fn reject_registration(
        &self,
        registration_id: i64,
        tutor_id: i64,
        reason: &str,
    ) -> Result<()> {
        Self::reject_registration(self, registration_id, tutor_id, reason).await
    }

    async fn pending_registrations(&self, tutor_id: i64) -> Result<Vec<Registration>> {
        Self::pending_registrations(self, tutor_id).await
    }

    async fn approved_students(&self, tutor_id: i64) -> Result<Vec<Registration>> {
        Self::approved_students(self, tutor_id).await
    }

    async fn my_tutor(&self, student_id: i64) -> Result<Option<MyTutor>> {
        Self::my_tutor(self, student_id).await
    }
}
