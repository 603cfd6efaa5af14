//! Appointments and their status lifecycle

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::{AppointmentId, DoctorId, PatientId};
use crate::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!(
                "Invalid status: '{}'. Must be one of: pending, confirmed, cancelled",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub doctor_name: String,
    pub patient_name: String,
    pub date: NaiveDate,
    /// Slot label as published by the doctor, e.g. "10:00 AM"
    pub time: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub notes: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub completed: bool,
}

impl Appointment {
    /// Still ahead of both parties: pending or confirmed, not yet completed
    pub fn is_upcoming(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        ) && !self.completed
    }

    /// Describes the current state for transition errors
    fn state_label(&self) -> String {
        if self.completed {
            format!("{} and completed", self.status)
        } else {
            self.status.to_string()
        }
    }
}

/// Input to `add_appointment`. Names are filled from the registries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub date: NaiveDate,
    pub time: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub notes: String,
}

/// What a logged-in patient submits from the booking form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub doctor_id: DoctorId,
    pub date: Option<NaiveDate>,
    pub time: String,
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub notes: String,
}

/// How strictly status changes are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePolicy {
    /// `cancelled` and completed are terminal; completion needs `confirmed`
    #[default]
    Enforced,
    /// Any status may follow any other and completion is unconditional
    Permissive,
}

impl LifecyclePolicy {
    /// Check that `appointment` may move to `requested`
    pub fn check_status_change(
        &self,
        appointment: &Appointment,
        requested: AppointmentStatus,
    ) -> Result<()> {
        use AppointmentStatus::*;

        if *self == LifecyclePolicy::Permissive || appointment.status == requested {
            return Ok(());
        }

        let allowed = !appointment.completed
            && matches!(
                (appointment.status, requested),
                (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Cancelled)
            );

        if allowed {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                appointment_id: appointment.id.to_string(),
                current: appointment.state_label(),
                requested: requested.to_string(),
            })
        }
    }

    /// Check that `appointment` may be marked completed
    pub fn check_completion(&self, appointment: &Appointment) -> Result<()> {
        match self {
            LifecyclePolicy::Permissive => Ok(()),
            LifecyclePolicy::Enforced
                if appointment.status == AppointmentStatus::Confirmed =>
            {
                Ok(())
            }
            LifecyclePolicy::Enforced => Err(CoreError::InvalidTransition {
                appointment_id: appointment.id.to_string(),
                current: appointment.state_label(),
                requested: "completed".to_string(),
            }),
        }
    }

    /// Whether follow-up records (prescriptions, reviews) need a completed visit
    pub fn requires_completed_visit(&self) -> bool {
        matches!(self, LifecyclePolicy::Enforced)
    }
}

/// Appointments split the way the management views show them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppointmentBuckets {
    pub upcoming: Vec<Appointment>,
    pub past: Vec<Appointment>,
}

/// Split into upcoming (pending/confirmed, not completed) and past
/// (cancelled or completed), preserving order
pub fn partition_appointments(appointments: &[Appointment]) -> AppointmentBuckets {
    let (upcoming, past): (Vec<_>, Vec<_>) = appointments
        .iter()
        .cloned()
        .partition(Appointment::is_upcoming);
    AppointmentBuckets { upcoming, past }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn appointment(status: AppointmentStatus, completed: bool) -> Appointment {
        Appointment {
            id: AppointmentId::from_static("app1"),
            doctor_id: DoctorId::from_static("d1"),
            patient_id: PatientId::from_static("p1"),
            doctor_name: "Dr. Sarah Johnson".to_string(),
            patient_name: "John Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 7, 15).unwrap(),
            time: "10:00 AM".to_string(),
            symptoms: String::new(),
            notes: String::new(),
            status,
            completed,
        }
    }

    #[test]
    fn enforced_allows_forward_transitions() {
        use AppointmentStatus::*;
        let policy = LifecyclePolicy::Enforced;

        assert!(policy.check_status_change(&appointment(Pending, false), Confirmed).is_ok());
        assert!(policy.check_status_change(&appointment(Pending, false), Cancelled).is_ok());
        assert!(policy.check_status_change(&appointment(Confirmed, false), Cancelled).is_ok());
        assert!(policy.check_status_change(&appointment(Confirmed, false), Confirmed).is_ok());
    }

    #[test]
    fn enforced_cancelled_is_terminal() {
        use AppointmentStatus::*;
        let policy = LifecyclePolicy::Enforced;

        for next in [Pending, Confirmed] {
            let err = policy
                .check_status_change(&appointment(Cancelled, false), next)
                .unwrap_err();
            assert!(matches!(err, CoreError::InvalidTransition { .. }));
        }
        assert!(policy.check_status_change(&appointment(Confirmed, false), Pending).is_err());
    }

    #[test]
    fn enforced_completed_is_frozen() {
        let policy = LifecyclePolicy::Enforced;
        let done = appointment(AppointmentStatus::Confirmed, true);
        match policy.check_status_change(&done, AppointmentStatus::Cancelled) {
            Err(CoreError::InvalidTransition { current, .. }) => {
                assert_eq!(current, "confirmed and completed");
            }
            other => panic!("expected invalid transition, got {:?}", other),
        }
    }

    #[test]
    fn completion_requires_confirmed_when_enforced() {
        use AppointmentStatus::*;
        let policy = LifecyclePolicy::Enforced;

        assert!(policy.check_completion(&appointment(Confirmed, false)).is_ok());
        assert!(policy.check_completion(&appointment(Pending, false)).is_err());
        assert!(policy.check_completion(&appointment(Cancelled, false)).is_err());
    }

    #[test]
    fn permissive_allows_everything() {
        use AppointmentStatus::*;
        let policy = LifecyclePolicy::Permissive;

        assert!(policy.check_status_change(&appointment(Cancelled, false), Confirmed).is_ok());
        assert!(policy.check_status_change(&appointment(Confirmed, true), Pending).is_ok());
        assert!(policy.check_completion(&appointment(Pending, false)).is_ok());
        assert!(!policy.requires_completed_visit());
    }

    #[test]
    fn partition_splits_upcoming_and_past() {
        use AppointmentStatus::*;
        let list = vec![
            appointment(Pending, false),
            appointment(Confirmed, true),
            appointment(Cancelled, false),
            appointment(Confirmed, false),
        ];
        let buckets = partition_appointments(&list);

        assert_eq!(buckets.upcoming.len(), 2);
        assert_eq!(buckets.past.len(), 2);
        assert!(buckets.upcoming.iter().all(Appointment::is_upcoming));
    }

    #[test]
    fn status_parsing_accepts_us_spelling() {
        assert_eq!(
            "Canceled".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Cancelled
        );
        assert!("done".parse::<AppointmentStatus>().is_err());
    }
}
