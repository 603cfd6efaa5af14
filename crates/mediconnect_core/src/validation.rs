//! Form validation
//!
//! Each validator collects every problem it finds rather than stopping at
//! the first one, so a form can show all of its errors at once.

use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::appointment::BookingRequest;
use crate::error::FieldError;
use crate::prescription::NewPrescription;
use crate::profile::{DoctorProfile, Gender, ProfileUpdate, Role};
use crate::review::{MAX_RATING, MIN_RATING};
use crate::{CoreError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern is valid"));

/// Self-registration form. Admin accounts can't be self-registered.
#[derive(Clone, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub details: RegistrationDetails,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("details", &self.details)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RegistrationDetails {
    Patient(PatientDetails),
    Doctor(DoctorDetails),
}

impl RegistrationDetails {
    pub fn role(&self) -> Role {
        match self {
            RegistrationDetails::Patient(_) => Role::Patient,
            RegistrationDetails::Doctor(_) => Role::Doctor,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientDetails {
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub allergies: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorDetails {
    pub specialization: String,
    pub location: String,
    pub available_days: Vec<Weekday>,
    pub available_time_slots: Vec<String>,
    #[serde(default)]
    pub fee: u32,
    #[serde(default)]
    pub bio: String,
}

/// Canonical form used for storage and uniqueness checks
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(email) {
        errors.push(FieldError::new("email", "Email is invalid"));
    }
}

fn require(field: &str, value: &str, message: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, message));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::validation(errors))
    }
}

pub fn validate_registration(form: &Registration) -> Result<()> {
    let mut errors = Vec::new();

    require("name", &form.name, "Full name is required", &mut errors);
    check_email(&form.email, &mut errors);

    if form.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    if form.password != form.confirm_password {
        errors.push(FieldError::new("confirm_password", "Passwords do not match"));
    }

    match &form.details {
        RegistrationDetails::Patient(details) => {
            if details.date_of_birth.is_none() {
                errors.push(FieldError::new("date_of_birth", "Date of birth is required"));
            }
            if details.gender.is_none() {
                errors.push(FieldError::new("gender", "Gender is required"));
            }
        }
        RegistrationDetails::Doctor(details) => {
            check_doctor_practice(
                Some(&details.specialization),
                Some(&details.location),
                Some(&details.available_days),
                Some(&details.available_time_slots),
                &mut errors,
            );
        }
    }

    finish(errors)
}

fn check_doctor_practice(
    specialization: Option<&String>,
    location: Option<&String>,
    days: Option<&Vec<Weekday>>,
    slots: Option<&Vec<String>>,
    errors: &mut Vec<FieldError>,
) {
    if let Some(specialization) = specialization {
        require("specialization", specialization, "Specialization is required", errors);
    }
    if let Some(location) = location {
        require("location", location, "Location is required", errors);
    }
    if days.is_some_and(|d| d.is_empty()) {
        errors.push(FieldError::new(
            "available_days",
            "Please select at least one available day",
        ));
    }
    if slots.is_some_and(|s| s.iter().all(|slot| slot.trim().is_empty())) {
        errors.push(FieldError::new(
            "available_time_slots",
            "Please select at least one available time slot",
        ));
    }
}

pub fn validate_profile_update(update: &ProfileUpdate) -> Result<()> {
    let mut errors = Vec::new();

    if let Some(name) = update.name() {
        require("name", name, "Full name is required", &mut errors);
    }
    if let Some(email) = update.email() {
        check_email(email, &mut errors);
    }
    if let ProfileUpdate::Doctor(doctor) = update {
        check_doctor_practice(
            doctor.specialization.as_ref(),
            doctor.location.as_ref(),
            doctor.available_days.as_ref(),
            doctor.available_time_slots.as_ref(),
            &mut errors,
        );
    }

    finish(errors)
}

/// Check a booking against the form rules and the doctor's published days
/// and slots. An empty day or slot list accepts anything.
pub fn validate_booking(request: &BookingRequest, doctor: &DoctorProfile) -> Result<NaiveDate> {
    let mut errors = Vec::new();

    match request.date {
        None => errors.push(FieldError::new("date", "Please select a date for the appointment")),
        Some(date)
            if !doctor.available_days.is_empty()
                && !doctor.available_days.contains(&date.weekday()) =>
        {
            let days: Vec<String> = doctor.available_days.iter().map(|d| d.to_string()).collect();
            errors.push(FieldError::new(
                "date",
                format!(
                    "{} does not see patients on {}. Available: {}",
                    doctor.name,
                    date.weekday(),
                    days.join(", ")
                ),
            ));
        }
        Some(_) => {}
    }
    let time = request.time.trim();
    if time.is_empty() {
        errors.push(FieldError::new("time", "Please select a time for the appointment"));
    } else if !doctor.available_time_slots.is_empty()
        && !doctor
            .available_time_slots
            .iter()
            .any(|slot| slot.trim().eq_ignore_ascii_case(time))
    {
        errors.push(FieldError::new(
            "time",
            format!(
                "{} has no {} slot. Available: {}",
                doctor.name,
                time,
                doctor.available_time_slots.join(", ")
            ),
        ));
    }

    finish(errors)?;
    // date presence was checked above
    request
        .date
        .ok_or_else(|| CoreError::validation(vec![FieldError::new("date", "Date is required")]))
}

pub fn validate_prescription(form: &NewPrescription) -> Result<()> {
    let mut errors = Vec::new();

    if form.appointment_id.is_none() {
        errors.push(FieldError::new("appointment_id", "Please select an appointment"));
    }
    require("medication", &form.medication, "Medication is required", &mut errors);
    require("dosage", &form.dosage, "Dosage is required", &mut errors);

    finish(errors)
}

pub fn validate_review(rating: u8, comment: &str) -> Result<()> {
    let mut errors = Vec::new();

    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        errors.push(FieldError::new(
            "rating",
            format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
        ));
    }
    require("comment", comment, "Please write a few words about the visit", &mut errors);

    finish(errors)
}
