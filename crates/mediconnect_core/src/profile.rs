//! Account model
//!
//! An [`Account`] is the authenticated identity: a closed union over the
//! three roles, each carrying its role-specific profile. Credentials are
//! kept apart in [`Credentialed`] so that nothing handed to a caller or
//! written to session storage ever holds a password hash.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::{AdminId, DoctorId, PatientId};

/// The role an account was created with. Immutable for the account's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Patient,
    Doctor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }

    /// Landing page for this role
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::Patient => "/patient-dashboard",
            Role::Doctor => "/doctor-dashboard",
            Role::Admin => "/admin-dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Ok(Role::Patient),
            "doctor" => Ok(Role::Doctor),
            "admin" => Ok(Role::Admin),
            other => Err(format!(
                "Invalid role: '{}'. Must be one of: patient, doctor, admin",
                other
            )),
        }
    }
}

/// The (role, id) pair naming an account
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Principal {
    Patient(PatientId),
    Doctor(DoctorId),
    Admin(AdminId),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Patient(_) => Role::Patient,
            Principal::Doctor(_) => Role::Doctor,
            Principal::Admin(_) => Role::Admin,
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Patient(id) => write!(f, "patient:{}", id),
            Principal::Doctor(id) => write!(f, "doctor:{}", id),
            Principal::Admin(id) => write!(f, "admin:{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            other => Err(format!("Invalid gender: '{}'", other)),
        }
    }
}

/// Admin review state of a doctor's registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub id: PatientId,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub medical_history: String,
    #[serde(default)]
    pub allergies: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: DoctorId,
    pub email: String,
    pub name: String,
    pub specialization: String,
    pub location: String,
    /// Average rating, 0 to 5
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub available_days: Vec<Weekday>,
    /// Bookable slots in display order, e.g. "10:00 AM"
    #[serde(default)]
    pub available_time_slots: Vec<String>,
    /// Consultation fee in whole currency units
    #[serde(default)]
    pub fee: u32,
    #[serde(default)]
    pub bio: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub approval: ApprovalStatus,
}

fn default_available() -> bool {
    true
}

impl DoctorProfile {
    /// Whether patients can book this doctor right now
    pub fn is_bookable(&self) -> bool {
        self.available && self.approval == ApprovalStatus::Approved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: AdminId,
    pub email: String,
    pub name: String,
}

/// The authenticated identity, as held by the session and persisted to storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Account {
    Patient(PatientProfile),
    Doctor(DoctorProfile),
    Admin(AdminProfile),
}

impl Account {
    pub fn role(&self) -> Role {
        match self {
            Account::Patient(_) => Role::Patient,
            Account::Doctor(_) => Role::Doctor,
            Account::Admin(_) => Role::Admin,
        }
    }

    pub fn principal(&self) -> Principal {
        match self {
            Account::Patient(p) => Principal::Patient(p.id.clone()),
            Account::Doctor(d) => Principal::Doctor(d.id.clone()),
            Account::Admin(a) => Principal::Admin(a.id.clone()),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Account::Patient(p) => p.id.as_str(),
            Account::Doctor(d) => d.id.as_str(),
            Account::Admin(a) => a.id.as_str(),
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Account::Patient(p) => &p.email,
            Account::Doctor(d) => &d.email,
            Account::Admin(a) => &a.email,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Account::Patient(p) => &p.name,
            Account::Doctor(d) => &d.name,
            Account::Admin(a) => &a.name,
        }
    }
}

/// Common surface of the three profile kinds
pub trait Profile: Clone {
    fn email(&self) -> &str;
    fn principal(&self) -> Principal;
}

impl Profile for PatientProfile {
    fn email(&self) -> &str {
        &self.email
    }
    fn principal(&self) -> Principal {
        Principal::Patient(self.id.clone())
    }
}

impl Profile for DoctorProfile {
    fn email(&self) -> &str {
        &self.email
    }
    fn principal(&self) -> Principal {
        Principal::Doctor(self.id.clone())
    }
}

impl Profile for AdminProfile {
    fn email(&self) -> &str {
        &self.email
    }
    fn principal(&self) -> Principal {
        Principal::Admin(self.id.clone())
    }
}

/// A registry entry: a profile plus its argon2 PHC password hash
#[derive(Debug, Clone)]
pub struct Credentialed<P> {
    pub profile: P,
    pub(crate) password_hash: String,
}

impl<P: Profile> Credentialed<P> {
    pub(crate) fn new(profile: P, password_hash: String) -> Self {
        Self {
            profile,
            password_hash,
        }
    }
}

/// Partial update of a patient profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub medical_history: Option<String>,
    pub allergies: Option<String>,
}

impl PatientUpdate {
    pub fn apply(&self, profile: &mut PatientProfile) {
        if let Some(name) = &self.name {
            profile.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(phone) = &self.phone {
            profile.phone = clean_phone(phone);
        }
        if let Some(dob) = self.date_of_birth {
            profile.date_of_birth = Some(dob);
        }
        if let Some(gender) = self.gender {
            profile.gender = Some(gender);
        }
        if let Some(history) = &self.medical_history {
            profile.medical_history = history.clone();
        }
        if let Some(allergies) = &self.allergies {
            profile.allergies = allergies.clone();
        }
    }
}

/// Partial update of a doctor profile. Rating and approval are not
/// self-editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub available_days: Option<Vec<Weekday>>,
    pub available_time_slots: Option<Vec<String>>,
    pub fee: Option<u32>,
    pub bio: Option<String>,
    pub available: Option<bool>,
}

impl DoctorUpdate {
    pub fn apply(&self, profile: &mut DoctorProfile) {
        if let Some(name) = &self.name {
            profile.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
        if let Some(specialization) = &self.specialization {
            profile.specialization = specialization.trim().to_string();
        }
        if let Some(location) = &self.location {
            profile.location = location.trim().to_string();
        }
        if let Some(days) = &self.available_days {
            profile.available_days = dedup_days(days);
        }
        if let Some(slots) = &self.available_time_slots {
            profile.available_time_slots = clean_slots(slots);
        }
        if let Some(fee) = self.fee {
            profile.fee = fee;
        }
        if let Some(bio) = &self.bio {
            profile.bio = bio.clone();
        }
        if let Some(available) = self.available {
            profile.available = available;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AdminUpdate {
    pub fn apply(&self, profile: &mut AdminProfile) {
        if let Some(name) = &self.name {
            profile.name = name.trim().to_string();
        }
        if let Some(email) = &self.email {
            profile.email = email.clone();
        }
    }
}

/// A partial profile update; the variant must match the session's role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ProfileUpdate {
    Patient(PatientUpdate),
    Doctor(DoctorUpdate),
    Admin(AdminUpdate),
}

impl ProfileUpdate {
    pub fn role(&self) -> Role {
        match self {
            ProfileUpdate::Patient(_) => Role::Patient,
            ProfileUpdate::Doctor(_) => Role::Doctor,
            ProfileUpdate::Admin(_) => Role::Admin,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ProfileUpdate::Patient(u) => u.name.as_deref(),
            ProfileUpdate::Doctor(u) => u.name.as_deref(),
            ProfileUpdate::Admin(u) => u.name.as_deref(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            ProfileUpdate::Patient(u) => u.email.as_deref(),
            ProfileUpdate::Doctor(u) => u.email.as_deref(),
            ProfileUpdate::Admin(u) => u.email.as_deref(),
        }
    }

    pub(crate) fn set_email(&mut self, email: String) {
        match self {
            ProfileUpdate::Patient(u) => u.email = Some(email),
            ProfileUpdate::Doctor(u) => u.email = Some(email),
            ProfileUpdate::Admin(u) => u.email = Some(email),
        }
    }
}

/// Keep first occurrence of each weekday, in the given order
pub(crate) fn dedup_days(days: &[Weekday]) -> Vec<Weekday> {
    let mut out: Vec<Weekday> = Vec::with_capacity(days.len());
    for day in days {
        if !out.contains(day) {
            out.push(*day);
        }
    }
    out
}

/// Trim each slot label and drop the blank ones
pub(crate) fn clean_slots<S: AsRef<str>>(slots: &[S]) -> Vec<String> {
    slots
        .iter()
        .map(|slot| slot.as_ref().trim().to_string())
        .filter(|slot| !slot.is_empty())
        .collect()
}

/// A blank phone number means none
pub(crate) fn clean_phone(phone: &str) -> Option<String> {
    let phone = phone.trim();
    (!phone.is_empty()).then(|| phone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patient() -> PatientProfile {
        PatientProfile {
            id: PatientId::from_static("p1"),
            email: "patient@example.com".to_string(),
            name: "John Doe".to_string(),
            phone: None,
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12),
            gender: Some(Gender::Male),
            medical_history: String::new(),
            allergies: "Penicillin".to_string(),
        }
    }

    #[test]
    fn account_serializes_flat_with_role_tag() {
        let account = Account::Patient(patient());
        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["role"], "patient");
        assert_eq!(json["id"], "p1");
        assert_eq!(json["email"], "patient@example.com");
        assert_eq!(json["allergies"], "Penicillin");
        assert!(json.get("password_hash").is_none());

        let back: Account = serde_json::from_value(json).unwrap();
        assert_eq!(back, account);
    }

    #[test]
    fn principal_matches_role() {
        let account = Account::Patient(patient());
        assert_eq!(account.role(), Role::Patient);
        assert_eq!(account.principal().role(), Role::Patient);
        assert_eq!(account.principal().to_string(), "patient:p1");
    }

    #[test]
    fn patient_update_merges_only_given_fields() {
        let mut profile = patient();
        PatientUpdate {
            phone: Some("555-0100".to_string()),
            allergies: Some("None".to_string()),
            ..Default::default()
        }
        .apply(&mut profile);

        assert_eq!(profile.phone.as_deref(), Some("555-0100"));
        assert_eq!(profile.allergies, "None");
        assert_eq!(profile.name, "John Doe");
        assert_eq!(profile.gender, Some(Gender::Male));
    }

    #[test]
    fn doctor_update_dedups_days() {
        let mut doctor = DoctorProfile {
            id: DoctorId::from_static("d9"),
            email: "d9@example.com".to_string(),
            name: "Dr. Nine".to_string(),
            specialization: "Cardiologist".to_string(),
            location: "New York".to_string(),
            rating: 4.0,
            available_days: vec![],
            available_time_slots: vec![],
            fee: 100,
            bio: String::new(),
            available: true,
            approval: ApprovalStatus::Approved,
        };
        DoctorUpdate {
            available_days: Some(vec![Weekday::Mon, Weekday::Wed, Weekday::Mon]),
            ..Default::default()
        }
        .apply(&mut doctor);

        assert_eq!(doctor.available_days, vec![Weekday::Mon, Weekday::Wed]);
    }

    #[test]
    fn role_parsing() {
        assert_eq!("Doctor".parse::<Role>().unwrap(), Role::Doctor);
        assert!("nurse".parse::<Role>().is_err());
        assert_eq!(Role::Admin.dashboard_path(), "/admin-dashboard");
    }

    #[test]
    fn gender_parsing() {
        assert_eq!(
            "prefer not to say".parse::<Gender>().unwrap(),
            Gender::PreferNotToSay
        );
        assert!("unknown".parse::<Gender>().is_err());
    }
}
