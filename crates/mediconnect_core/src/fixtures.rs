//! Seed data loaded when a store opens
//!
//! Just enough accounts and records for every role to have something to log
//! in to. Passwords are hashed here, at seed time, with the store's hasher.

use chrono::{NaiveDate, Weekday};

use crate::Result;
use crate::appointment::{Appointment, AppointmentStatus};
use crate::credentials::PasswordHasher;
use crate::id::{AdminId, AppointmentId, DoctorId, PatientId, PrescriptionId, ReviewId};
use crate::prescription::Prescription;
use crate::profile::{
    AdminProfile, ApprovalStatus, Credentialed, DoctorProfile, Gender, PatientProfile,
};
use crate::review::{Review, ReviewStatus};

#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub patients: Vec<Credentialed<PatientProfile>>,
    pub doctors: Vec<Credentialed<DoctorProfile>>,
    pub admins: Vec<Credentialed<AdminProfile>>,
    pub appointments: Vec<Appointment>,
    pub prescriptions: Vec<Prescription>,
    pub reviews: Vec<Review>,
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn slots(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

impl Fixtures {
    /// An empty seed. Stores opened with this have no accounts at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn demo(hasher: &PasswordHasher) -> Result<Self> {
        let patients = vec![
            Credentialed::new(
                PatientProfile {
                    id: PatientId::from_static("p1"),
                    email: "patient@example.com".to_string(),
                    name: "John Doe".to_string(),
                    phone: Some("555-123-4567".to_string()),
                    date_of_birth: Some(date(1985, 5, 15)),
                    gender: Some(Gender::Male),
                    medical_history: "Hypertension, Type 2 Diabetes".to_string(),
                    allergies: "Penicillin".to_string(),
                },
                hasher.hash("patient123")?,
            ),
            Credentialed::new(
                PatientProfile {
                    id: PatientId::from_static("p2"),
                    email: "patient2@example.com".to_string(),
                    name: "Jane Smith".to_string(),
                    phone: Some("555-987-6543".to_string()),
                    date_of_birth: Some(date(1990, 8, 22)),
                    gender: Some(Gender::Female),
                    medical_history: "Asthma".to_string(),
                    allergies: "None".to_string(),
                },
                hasher.hash("patient123")?,
            ),
        ];

        let doctors = vec![
            Credentialed::new(
                DoctorProfile {
                    id: DoctorId::from_static("d1"),
                    email: "doctor@example.com".to_string(),
                    name: "Dr. Sarah Johnson".to_string(),
                    specialization: "Cardiologist".to_string(),
                    location: "New York".to_string(),
                    rating: 4.9,
                    available_days: vec![],
                    available_time_slots: slots(&[
                        "09:00 AM", "10:00 AM", "11:30 AM", "02:00 PM", "03:30 PM",
                    ]),
                    fee: 150,
                    bio: "Board-certified cardiologist with 15 years of experience."
                        .to_string(),
                    available: true,
                    approval: ApprovalStatus::Approved,
                },
                hasher.hash("doctor123")?,
            ),
            Credentialed::new(
                DoctorProfile {
                    id: DoctorId::from_static("d2"),
                    email: "doctor2@example.com".to_string(),
                    name: "Dr. Michael Chen".to_string(),
                    specialization: "Dermatologist".to_string(),
                    location: "Los Angeles".to_string(),
                    rating: 4.8,
                    available_days: vec![Weekday::Tue, Weekday::Thu, Weekday::Sat],
                    available_time_slots: slots(&["10:00 AM", "01:00 PM", "04:00 PM"]),
                    fee: 120,
                    bio: "Specialist in medical and cosmetic dermatology.".to_string(),
                    available: true,
                    approval: ApprovalStatus::Approved,
                },
                hasher.hash("doctor123")?,
            ),
        ];

        let admins = vec![Credentialed::new(
            AdminProfile {
                id: AdminId::from_static("a1"),
                email: "admin@example.com".to_string(),
                name: "Admin User".to_string(),
            },
            hasher.hash("admin123")?,
        )];

        let appointments = vec![
            Appointment {
                id: AppointmentId::from_static("app1"),
                doctor_id: DoctorId::from_static("d1"),
                patient_id: PatientId::from_static("p1"),
                doctor_name: "Dr. Sarah Johnson".to_string(),
                patient_name: "John Doe".to_string(),
                date: date(2023, 7, 15),
                time: "10:00 AM".to_string(),
                symptoms: "Chest pain, shortness of breath".to_string(),
                notes: "Patient has a history of hypertension".to_string(),
                status: AppointmentStatus::Confirmed,
                completed: true,
            },
            Appointment {
                id: AppointmentId::from_static("app2"),
                doctor_id: DoctorId::from_static("d1"),
                patient_id: PatientId::from_static("p2"),
                doctor_name: "Dr. Sarah Johnson".to_string(),
                patient_name: "Jane Smith".to_string(),
                date: date(2023, 7, 16),
                time: "11:30 AM".to_string(),
                symptoms: "Heart palpitations".to_string(),
                notes: String::new(),
                status: AppointmentStatus::Pending,
                completed: false,
            },
        ];

        let prescriptions = vec![Prescription {
            id: PrescriptionId::from_static("rx1"),
            appointment_id: AppointmentId::from_static("app1"),
            doctor_id: DoctorId::from_static("d1"),
            patient_id: PatientId::from_static("p1"),
            title: "Blood pressure management".to_string(),
            medication: "Lisinopril".to_string(),
            dosage: "10mg".to_string(),
            instructions: "Take once daily in the morning".to_string(),
            date: date(2023, 7, 15),
        }];

        let reviews = vec![Review {
            id: ReviewId::from_static("rev1"),
            appointment_id: AppointmentId::from_static("app1"),
            doctor_id: DoctorId::from_static("d1"),
            patient_id: PatientId::from_static("p1"),
            doctor_name: "Dr. Sarah Johnson".to_string(),
            patient_name: "John Doe".to_string(),
            rating: 5,
            comment: "Thorough and kind. Explained everything clearly.".to_string(),
            date: date(2023, 7, 16),
            status: ReviewStatus::Approved,
        }];

        Ok(Self {
            patients,
            doctors,
            admins,
            appointments,
            prescriptions,
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::HashingConfig;
    use std::collections::HashSet;

    #[test]
    fn demo_emails_are_unique_and_hashed() {
        let hasher = PasswordHasher::new(HashingConfig::low_cost()).unwrap();
        let fixtures = Fixtures::demo(&hasher).unwrap();

        let emails: Vec<&str> = fixtures
            .patients
            .iter()
            .map(|p| p.profile.email.as_str())
            .chain(fixtures.doctors.iter().map(|d| d.profile.email.as_str()))
            .chain(fixtures.admins.iter().map(|a| a.profile.email.as_str()))
            .collect();
        let unique: HashSet<&str> = emails.iter().copied().collect();
        assert_eq!(emails.len(), unique.len());

        let d1 = &fixtures.doctors[0];
        assert!(d1.password_hash.starts_with("$argon2id$"));
        assert!(hasher.verify("doctor123", &d1.password_hash).unwrap());
    }

    #[test]
    fn demo_records_reference_seeded_accounts() {
        let hasher = PasswordHasher::new(HashingConfig::low_cost()).unwrap();
        let fixtures = Fixtures::demo(&hasher).unwrap();

        for app in &fixtures.appointments {
            assert!(fixtures.doctors.iter().any(|d| d.profile.id == app.doctor_id));
            assert!(fixtures.patients.iter().any(|p| p.profile.id == app.patient_id));
            assert!(!(app.completed && app.status != AppointmentStatus::Confirmed));
        }
    }
}
