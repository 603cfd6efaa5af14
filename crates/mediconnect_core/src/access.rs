//! Role-scoped accessors and permission gates
//!
//! Everything here is a pure function of the caller's principal and the data
//! it is looking at. Each function matches exhaustively on the role, so a new
//! role can't slip through unhandled.

use crate::appointment::{Appointment, AppointmentStatus};
use crate::prescription::Prescription;
use crate::profile::{Account, Principal, Role};

/// Appointments visible to `viewer`
///
/// - doctor: the ones they are booked for
/// - patient: the ones they booked
/// - admin: all of them
/// - no session: none
pub fn appointments_for(viewer: Option<&Principal>, all: &[Appointment]) -> Vec<Appointment> {
    let Some(viewer) = viewer else {
        return Vec::new();
    };

    all.iter()
        .filter(|app| match viewer {
            Principal::Doctor(id) => &app.doctor_id == id,
            Principal::Patient(id) => &app.patient_id == id,
            Principal::Admin(_) => true,
        })
        .cloned()
        .collect()
}

/// Prescriptions visible to `viewer`, with the same scoping as appointments
pub fn prescriptions_for(viewer: Option<&Principal>, all: &[Prescription]) -> Vec<Prescription> {
    let Some(viewer) = viewer else {
        return Vec::new();
    };

    all.iter()
        .filter(|rx| match viewer {
            Principal::Doctor(id) => &rx.doctor_id == id,
            Principal::Patient(id) => &rx.patient_id == id,
            Principal::Admin(_) => true,
        })
        .cloned()
        .collect()
}

/// Appointment mutations we gate by role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentOp {
    SetStatus(AppointmentStatus),
    Complete,
}

/// Result of a permission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessGate {
    Allow,
    Deny { reason: String },
}

impl AccessGate {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessGate::Allow)
    }
}

/// Check whether `viewer` may apply `op` to `appointment`.
/// Policy:
/// - Admin: anything.
/// - Doctor: anything on appointments booked with them.
/// - Patient: may cancel their own appointments, nothing else.
pub fn check_appointment_op(
    viewer: &Principal,
    appointment: &Appointment,
    op: AppointmentOp,
) -> AccessGate {
    use AccessGate::*;

    match viewer {
        Principal::Admin(_) => Allow,
        Principal::Doctor(id) if &appointment.doctor_id == id => Allow,
        Principal::Doctor(_) => Deny {
            reason: "manage another doctor's appointments".into(),
        },
        Principal::Patient(id) if &appointment.patient_id != id => Deny {
            reason: "manage another patient's appointments".into(),
        },
        Principal::Patient(_) => match op {
            AppointmentOp::SetStatus(AppointmentStatus::Cancelled) => Allow,
            AppointmentOp::SetStatus(status) => Deny {
                reason: format!("mark an appointment {}", status),
            },
            AppointmentOp::Complete => Deny {
                reason: "mark an appointment completed".into(),
            },
        },
    }
}

/// Check whether `viewer` may delete `prescription`: the prescribing doctor or an admin
pub fn check_prescription_delete(viewer: &Principal, prescription: &Prescription) -> AccessGate {
    match viewer {
        Principal::Admin(_) => AccessGate::Allow,
        Principal::Doctor(id) if &prescription.doctor_id == id => AccessGate::Allow,
        Principal::Doctor(_) => AccessGate::Deny {
            reason: "delete another doctor's prescriptions".into(),
        },
        Principal::Patient(_) => AccessGate::Deny {
            reason: "delete prescriptions".into(),
        },
    }
}

/// Outcome of guarding a dashboard route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    RedirectToLogin,
    /// Signed in with another role; send them to their own dashboard
    Redirect(&'static str),
}

impl RouteDecision {
    pub const LOGIN_PATH: &'static str = "/login";

    /// The path to navigate to, if any
    pub fn target(&self) -> Option<&'static str> {
        match self {
            RouteDecision::Allow => None,
            RouteDecision::RedirectToLogin => Some(Self::LOGIN_PATH),
            RouteDecision::Redirect(path) => Some(*path),
        }
    }
}

/// Guard a route that needs a session and, optionally, a specific role
pub fn gate(session: Option<&Account>, required: Option<Role>) -> RouteDecision {
    match (session, required) {
        (None, _) => RouteDecision::RedirectToLogin,
        (Some(_), None) => RouteDecision::Allow,
        (Some(account), Some(role)) if account.role() == role => RouteDecision::Allow,
        (Some(account), Some(_)) => RouteDecision::Redirect(account.role().dashboard_path()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{AdminId, AppointmentId, DoctorId, PatientId};
    use crate::profile::AdminProfile;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn appointment(id: &'static str, doctor: &'static str, patient: &'static str) -> Appointment {
        Appointment {
            id: AppointmentId::from_static(id),
            doctor_id: DoctorId::from_static(doctor),
            patient_id: PatientId::from_static(patient),
            doctor_name: String::new(),
            patient_name: String::new(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            time: "10:00 AM".to_string(),
            symptoms: String::new(),
            notes: String::new(),
            status: AppointmentStatus::Pending,
            completed: false,
        }
    }

    fn sample() -> Vec<Appointment> {
        vec![
            appointment("app1", "d1", "p1"),
            appointment("app2", "d1", "p2"),
            appointment("app3", "d2", "p1"),
        ]
    }

    fn ids(list: &[Appointment]) -> Vec<&str> {
        list.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn doctor_sees_own_bookings() {
        let doctor = Principal::Doctor(DoctorId::from_static("d1"));
        assert_eq!(ids(&appointments_for(Some(&doctor), &sample())), vec!["app1", "app2"]);
    }

    #[test]
    fn patient_sees_own_bookings() {
        let patient = Principal::Patient(PatientId::from_static("p1"));
        assert_eq!(ids(&appointments_for(Some(&patient), &sample())), vec!["app1", "app3"]);
    }

    #[test]
    fn admin_sees_everything_and_anonymous_nothing() {
        let admin = Principal::Admin(AdminId::from_static("a1"));
        assert_eq!(appointments_for(Some(&admin), &sample()).len(), 3);
        assert!(appointments_for(None, &sample()).is_empty());
    }

    #[test]
    fn patient_may_only_cancel_own() {
        let own = appointment("app1", "d1", "p1");
        let patient = Principal::Patient(PatientId::from_static("p1"));
        let other = Principal::Patient(PatientId::from_static("p2"));

        assert!(
            check_appointment_op(&patient, &own, AppointmentOp::SetStatus(AppointmentStatus::Cancelled))
                .is_allowed()
        );
        assert!(
            !check_appointment_op(&patient, &own, AppointmentOp::SetStatus(AppointmentStatus::Confirmed))
                .is_allowed()
        );
        assert!(!check_appointment_op(&patient, &own, AppointmentOp::Complete).is_allowed());
        assert!(
            !check_appointment_op(&other, &own, AppointmentOp::SetStatus(AppointmentStatus::Cancelled))
                .is_allowed()
        );
    }

    #[test]
    fn doctor_limited_to_own_appointments() {
        let own = appointment("app1", "d1", "p1");
        let d1 = Principal::Doctor(DoctorId::from_static("d1"));
        let d2 = Principal::Doctor(DoctorId::from_static("d2"));

        assert!(check_appointment_op(&d1, &own, AppointmentOp::Complete).is_allowed());
        assert_eq!(
            check_appointment_op(&d2, &own, AppointmentOp::Complete),
            AccessGate::Deny {
                reason: "manage another doctor's appointments".to_string()
            }
        );
    }

    #[test]
    fn route_gate() {
        let admin = Account::Admin(AdminProfile {
            id: AdminId::from_static("a1"),
            email: "admin@example.com".to_string(),
            name: "Admin User".to_string(),
        });

        assert_eq!(gate(None, Some(Role::Patient)), RouteDecision::RedirectToLogin);
        assert_eq!(gate(None, None).target(), Some("/login"));
        assert_eq!(gate(Some(&admin), None), RouteDecision::Allow);
        assert_eq!(gate(Some(&admin), Some(Role::Admin)), RouteDecision::Allow);
        assert_eq!(
            gate(Some(&admin), Some(Role::Doctor)),
            RouteDecision::Redirect("/admin-dashboard")
        );
    }
}
