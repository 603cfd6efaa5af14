//! The session store
//!
//! [`CareStore`] owns every registry plus the current session. All mutation
//! goes through its named methods; readers get cloned records or registry
//! snapshots. Methods that change the session identity are async because
//! they persist it before returning.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::access::{self, AccessGate, AppointmentOp};
use crate::appointment::{
    Appointment, AppointmentStatus, BookingRequest, LifecyclePolicy, NewAppointment,
};
use crate::config::StoreConfig;
use crate::credentials::PasswordHasher;
use crate::directory::{self, DoctorFilter};
use crate::error::FieldError;
use crate::fixtures::Fixtures;
use crate::id::{AppointmentId, DoctorId, PatientId, PrescriptionId, ReviewId};
use crate::prescription::{NewPrescription, Prescription};
use crate::profile::{
    Account, AdminProfile, ApprovalStatus, Credentialed, DoctorProfile, PatientProfile,
    Principal, Profile, ProfileUpdate, Role, clean_phone, clean_slots, dedup_days,
};
use crate::registry::Registry;
use crate::review::{Review, ReviewStatus};
use crate::session::{FileSessionStorage, SessionStorage};
use crate::utils::ErrorLogging;
use crate::validation::{
    Registration, RegistrationDetails, normalize_email, validate_booking, validate_prescription,
    validate_profile_update, validate_registration, validate_review,
};
use crate::{CoreError, Result};

/// Headline numbers for the admin dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub doctors: usize,
    pub patients: usize,
    pub appointments: usize,
    pub pending_approvals: usize,
    pub pending_reviews: usize,
}

pub struct CareStore {
    policy: LifecyclePolicy,
    session_key: String,
    storage: Arc<dyn SessionStorage>,
    hasher: PasswordHasher,
    session: Option<Account>,

    patients: Registry<Credentialed<PatientProfile>>,
    doctors: Registry<Credentialed<DoctorProfile>>,
    admins: Registry<Credentialed<AdminProfile>>,
    appointments: Registry<Appointment>,
    prescriptions: Registry<Prescription>,
    reviews: Registry<Review>,
}

impl std::fmt::Debug for CareStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CareStore")
            .field("policy", &self.policy)
            .field("session_key", &self.session_key)
            .field("storage", &self.storage)
            .field("session", &self.session.as_ref().map(Account::principal))
            .field("patients", &self.patients.len())
            .field("doctors", &self.doctors.len())
            .field("admins", &self.admins.len())
            .field("appointments", &self.appointments.len())
            .field("prescriptions", &self.prescriptions.len())
            .field("reviews", &self.reviews.len())
            .finish()
    }
}

/// Look up `email` in one role's registry and check the password
fn authenticate<P: Profile>(
    registry: &Registry<Credentialed<P>>,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<Option<P>> {
    let Some(entry) = registry.find(|entry| normalize_email(entry.profile.email()) == email)
    else {
        return Ok(None);
    };

    if hasher.verify(password, &entry.password_hash)? {
        Ok(Some(entry.profile.clone()))
    } else {
        Ok(None)
    }
}

fn find_by_email<P: Profile>(
    registry: &Registry<Credentialed<P>>,
    email: &str,
) -> Option<Principal> {
    registry
        .find(|entry| normalize_email(entry.profile.email()) == email)
        .map(|entry| entry.profile.principal())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn enforce(role: Role, gate: AccessGate) -> Result<()> {
    match gate {
        AccessGate::Allow => Ok(()),
        AccessGate::Deny { reason } => Err(CoreError::permission_denied(role, reason)),
    }
}

impl CareStore {
    fn from_parts(
        config: &StoreConfig,
        storage: Arc<dyn SessionStorage>,
        hasher: PasswordHasher,
        fixtures: Fixtures,
    ) -> Self {
        Self {
            policy: config.lifecycle.policy,
            session_key: config.session.key.clone(),
            storage,
            hasher,
            session: None,
            patients: Registry::new(fixtures.patients),
            doctors: Registry::new(fixtures.doctors),
            admins: Registry::new(fixtures.admins),
            appointments: Registry::new(fixtures.appointments),
            prescriptions: Registry::new(fixtures.prescriptions),
            reviews: Registry::new(fixtures.reviews),
        }
    }

    /// Seed the registries per `config` and restore any persisted session
    pub async fn open(config: &StoreConfig, storage: Arc<dyn SessionStorage>) -> Result<Self> {
        let hasher = PasswordHasher::new(config.hashing)?;
        let fixtures = if config.seed_fixtures {
            Fixtures::demo(&hasher)?
        } else {
            Fixtures::empty()
        };

        let mut store = Self::from_parts(config, storage, hasher, fixtures);
        // an unreachable session store shouldn't stop the app; start logged out
        if let Err(e) = store.restore_session().await {
            warn!("Could not restore session: {}", e.log_format());
        }

        info!(
            "Opened store: {} patients, {} doctors, {} appointments, policy {:?}",
            store.patients.len(),
            store.doctors.len(),
            store.appointments.len(),
            store.policy
        );
        Ok(store)
    }

    /// Open with file-backed session storage in the configured directory
    pub async fn open_with_files(config: &StoreConfig) -> Result<Self> {
        let storage = FileSessionStorage::new(config.session.resolved_directory());
        Self::open(config, Arc::new(storage)).await
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.policy
    }

    /// The logged-in account, if any
    pub fn current(&self) -> Option<&Account> {
        self.session.as_ref()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.session.as_ref().map(Account::principal)
    }

    pub fn appointments(&self) -> Arc<Vec<Appointment>> {
        self.appointments.snapshot()
    }

    pub fn prescriptions(&self) -> Arc<Vec<Prescription>> {
        self.prescriptions.snapshot()
    }

    pub fn reviews(&self) -> Arc<Vec<Review>> {
        self.reviews.snapshot()
    }

    pub fn patients(&self) -> Vec<PatientProfile> {
        self.patients.iter().map(|c| c.profile.clone()).collect()
    }

    pub fn doctors(&self) -> Vec<DoctorProfile> {
        self.doctors.iter().map(|c| c.profile.clone()).collect()
    }

    pub fn admins(&self) -> Vec<AdminProfile> {
        self.admins.iter().map(|c| c.profile.clone()).collect()
    }

    fn require_session(&self, action: &str) -> Result<&Account> {
        self.session
            .as_ref()
            .ok_or_else(|| CoreError::not_authenticated(action))
    }

    fn require_role(&self, role: Role, action: &str) -> Result<&Account> {
        let account = self.require_session(action)?;
        if account.role() != role {
            return Err(CoreError::permission_denied(account.role(), action));
        }
        Ok(account)
    }

    fn email_owner(&self, email: &str) -> Option<Principal> {
        find_by_email(&self.patients, email)
            .or_else(|| find_by_email(&self.doctors, email))
            .or_else(|| find_by_email(&self.admins, email))
    }

    fn lookup_account(&self, principal: &Principal) -> Option<Account> {
        match principal {
            Principal::Patient(id) => self
                .patients
                .get(id)
                .map(|c| Account::Patient(c.profile.clone())),
            Principal::Doctor(id) => self
                .doctors
                .get(id)
                .map(|c| Account::Doctor(c.profile.clone())),
            Principal::Admin(id) => self
                .admins
                .get(id)
                .map(|c| Account::Admin(c.profile.clone())),
        }
    }

    async fn persist(&self, account: &Account) -> Result<()> {
        let json =
            serde_json::to_string(account).map_err(|e| CoreError::SerializationError {
                data_type: "session account".to_string(),
                cause: e,
            })?;
        self.storage.save(&self.session_key, &json).await
    }

    // Session

    /// Log in to `role`'s registry. State is untouched on failure.
    pub async fn login(&mut self, email: &str, password: &str, role: Role) -> Result<Account> {
        let email = normalize_email(email);

        let found = match role {
            Role::Patient => {
                authenticate(&self.patients, &self.hasher, &email, password)?.map(Account::Patient)
            }
            Role::Doctor => {
                authenticate(&self.doctors, &self.hasher, &email, password)?.map(Account::Doctor)
            }
            Role::Admin => {
                authenticate(&self.admins, &self.hasher, &email, password)?.map(Account::Admin)
            }
        };

        let Some(account) = found else {
            warn!("Failed {} login for {}", role, email);
            return Err(CoreError::AuthenticationFailed { role });
        };

        self.persist(&account).await?;
        info!("Logged in as {}", account.principal());
        self.session = Some(account.clone());
        Ok(account)
    }

    /// Clear the session and its persisted copy. A no-op without a session.
    pub async fn logout(&mut self) -> Result<()> {
        let Some(account) = self.session.as_ref() else {
            return Ok(());
        };
        let principal = account.principal();

        self.storage.clear(&self.session_key).await?;
        self.session = None;
        info!("Logged out {}", principal);
        Ok(())
    }

    /// Create a patient or doctor account and log it in
    pub async fn register(&mut self, form: Registration) -> Result<Account> {
        validate_registration(&form)?;

        let email = normalize_email(&form.email);
        if self.email_owner(&email).is_some() {
            return Err(CoreError::EmailTaken { email });
        }

        let password_hash = self.hasher.hash(&form.password)?;
        let name = form.name.trim().to_string();

        let account = match form.details {
            RegistrationDetails::Patient(details) => Account::Patient(PatientProfile {
                id: PatientId::generate(),
                email,
                name,
                phone: details.phone.as_deref().and_then(clean_phone),
                date_of_birth: details.date_of_birth,
                gender: details.gender,
                medical_history: details.medical_history,
                allergies: details.allergies,
            }),
            RegistrationDetails::Doctor(details) => Account::Doctor(DoctorProfile {
                id: DoctorId::generate(),
                email,
                name,
                specialization: details.specialization.trim().to_string(),
                location: details.location.trim().to_string(),
                rating: 0.0,
                available_days: dedup_days(&details.available_days),
                available_time_slots: clean_slots(&details.available_time_slots),
                fee: details.fee,
                bio: details.bio,
                available: true,
                approval: ApprovalStatus::Pending,
            }),
        };

        self.persist(&account).await?;
        match &account {
            Account::Patient(profile) => self
                .patients
                .append(Credentialed::new(profile.clone(), password_hash)),
            Account::Doctor(profile) => self
                .doctors
                .append(Credentialed::new(profile.clone(), password_hash)),
            // no self-registration path produces an admin
            Account::Admin(profile) => self
                .admins
                .append(Credentialed::new(profile.clone(), password_hash)),
        }

        info!("Registered {} account {}", account.role(), account.principal());
        self.session = Some(account.clone());
        Ok(account)
    }

    /// Merge a partial update into the logged-in profile
    pub async fn update_profile(&mut self, mut update: ProfileUpdate) -> Result<Account> {
        let current = self.require_session("update your profile")?.clone();
        if update.role() != current.role() {
            return Err(CoreError::permission_denied(
                current.role(),
                format!("edit a {} profile", update.role()),
            ));
        }

        validate_profile_update(&update)?;

        if let Some(email) = update.email().map(normalize_email) {
            match self.email_owner(&email) {
                Some(owner) if owner != current.principal() => {
                    return Err(CoreError::EmailTaken { email });
                }
                _ => update.set_email(email),
            }
        }

        let updated = match (current, &update) {
            (Account::Patient(mut p), ProfileUpdate::Patient(u)) => {
                u.apply(&mut p);
                Account::Patient(p)
            }
            (Account::Doctor(mut d), ProfileUpdate::Doctor(u)) => {
                u.apply(&mut d);
                Account::Doctor(d)
            }
            (Account::Admin(mut a), ProfileUpdate::Admin(u)) => {
                u.apply(&mut a);
                Account::Admin(a)
            }
            (account, _) => account,
        };

        self.persist(&updated).await?;
        match &updated {
            Account::Patient(p) => {
                self.patients.update(&p.id, |entry| entry.profile = p.clone());
            }
            Account::Doctor(d) => {
                self.doctors.update(&d.id, |entry| entry.profile = d.clone());
            }
            Account::Admin(a) => {
                self.admins.update(&a.id, |entry| entry.profile = a.clone());
            }
        }

        debug!("Updated profile of {}", updated.principal());
        self.session = Some(updated.clone());
        Ok(updated)
    }

    /// Rehydrate the session from storage
    ///
    /// The persisted identity is only trusted if its principal still exists;
    /// the registry's copy of the profile wins over the stored one. Stale or
    /// unreadable values are removed.
    pub async fn restore_session(&mut self) -> Result<Option<Account>> {
        let Some(raw) = self.storage.load(&self.session_key).await? else {
            return Ok(None);
        };

        let stored: Account = match serde_json::from_str(&raw) {
            Ok(account) => account,
            Err(e) => {
                warn!("Discarding unreadable session {}: {}", self.session_key, e);
                self.storage.clear(&self.session_key).await?;
                return Ok(None);
            }
        };

        let principal = stored.principal();
        let Some(account) = self.lookup_account(&principal) else {
            warn!("Discarding stale session for unknown account {}", principal);
            self.storage.clear(&self.session_key).await?;
            return Ok(None);
        };

        if account != stored {
            self.persist(&account).await?;
        }

        info!("Restored session for {}", principal);
        self.session = Some(account.clone());
        Ok(Some(account))
    }

    // Appointments

    /// Appointments visible to the logged-in account
    pub fn user_appointments(&self) -> Vec<Appointment> {
        access::appointments_for(self.principal().as_ref(), &self.appointments.snapshot())
    }

    /// A single appointment, if the logged-in account can see it
    pub fn appointment(&self, id: &AppointmentId) -> Result<Appointment> {
        self.user_appointments()
            .into_iter()
            .find(|app| &app.id == id)
            .ok_or_else(|| CoreError::not_found("appointment", id))
    }

    /// Insert a pending appointment between two existing accounts
    pub fn add_appointment(&mut self, new: NewAppointment) -> Result<Appointment> {
        let doctor = self
            .doctors
            .get(&new.doctor_id)
            .ok_or_else(|| CoreError::not_found("doctor", &new.doctor_id))?;
        let patient = self
            .patients
            .get(&new.patient_id)
            .ok_or_else(|| CoreError::not_found("patient", &new.patient_id))?;

        let appointment = Appointment {
            id: AppointmentId::generate(),
            doctor_name: doctor.profile.name.clone(),
            patient_name: patient.profile.name.clone(),
            doctor_id: new.doctor_id,
            patient_id: new.patient_id,
            date: new.date,
            time: new.time,
            symptoms: new.symptoms,
            notes: new.notes,
            status: AppointmentStatus::Pending,
            completed: false,
        };

        self.appointments.append(appointment.clone());
        debug!(
            "Added appointment {} ({} with {})",
            appointment.id, appointment.patient_id, appointment.doctor_id
        );
        Ok(appointment)
    }

    /// Book the logged-in patient with an approved, available doctor
    pub fn book_appointment(&mut self, request: BookingRequest) -> Result<Appointment> {
        let Account::Patient(patient) = self.require_role(Role::Patient, "book appointments")?
        else {
            return Err(CoreError::permission_denied(Role::Patient, "book appointments"));
        };
        let patient_id = patient.id.clone();

        let doctor = self
            .doctors
            .get(&request.doctor_id)
            .map(|c| &c.profile)
            .ok_or_else(|| CoreError::not_found("doctor", &request.doctor_id))?;

        match doctor.approval {
            ApprovalStatus::Approved => {}
            ApprovalStatus::Pending => {
                return Err(CoreError::DoctorUnavailable {
                    doctor_name: doctor.name.clone(),
                    reason: "awaiting approval".to_string(),
                });
            }
            ApprovalStatus::Rejected => {
                return Err(CoreError::DoctorUnavailable {
                    doctor_name: doctor.name.clone(),
                    reason: "not approved to practice here".to_string(),
                });
            }
        }
        if !doctor.available {
            return Err(CoreError::DoctorUnavailable {
                doctor_name: doctor.name.clone(),
                reason: "not accepting new appointments".to_string(),
            });
        }

        let date = validate_booking(&request, doctor)?;
        let requested = request.time.trim();
        // store the doctor's own label for the slot
        let time = doctor
            .available_time_slots
            .iter()
            .find(|slot| slot.trim().eq_ignore_ascii_case(requested))
            .cloned()
            .unwrap_or_else(|| requested.to_string());

        let appointment = self.add_appointment(NewAppointment {
            doctor_id: request.doctor_id,
            patient_id,
            date,
            time,
            symptoms: request.symptoms,
            notes: request.notes,
        })?;

        info!(
            "Booked appointment {} with {} on {} at {}",
            appointment.id, appointment.doctor_name, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Load an appointment and check the caller may apply `op` to it
    fn authorize_appointment_op(
        &self,
        id: &AppointmentId,
        op: AppointmentOp,
        action: &str,
    ) -> Result<Appointment> {
        let viewer = self.require_session(action)?.principal();
        let appointment = self
            .appointments
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("appointment", id))?;

        enforce(
            viewer.role(),
            access::check_appointment_op(&viewer, &appointment, op),
        )?;
        Ok(appointment)
    }

    pub fn update_appointment_status(
        &mut self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Appointment> {
        let appointment = self.authorize_appointment_op(
            id,
            AppointmentOp::SetStatus(status),
            "change appointment status",
        )?;
        self.policy.check_status_change(&appointment, status)?;

        if appointment.status == status {
            return Ok(appointment);
        }

        let updated = self
            .appointments
            .update(id, |app| app.status = status)
            .ok_or_else(|| CoreError::not_found("appointment", id))?;

        info!(
            "Appointment {} moved from {} to {}",
            id, appointment.status, updated.status
        );
        Ok(updated)
    }

    pub fn complete_appointment(&mut self, id: &AppointmentId) -> Result<Appointment> {
        let appointment =
            self.authorize_appointment_op(id, AppointmentOp::Complete, "complete appointments")?;
        self.policy.check_completion(&appointment)?;

        if appointment.completed {
            return Ok(appointment);
        }

        let updated = self
            .appointments
            .update(id, |app| app.completed = true)
            .ok_or_else(|| CoreError::not_found("appointment", id))?;

        info!("Appointment {} completed", id);
        Ok(updated)
    }

    // Prescriptions

    /// Prescriptions visible to the logged-in account
    pub fn user_prescriptions(&self) -> Vec<Prescription> {
        access::prescriptions_for(self.principal().as_ref(), &self.prescriptions.snapshot())
    }

    pub fn appointment_prescriptions(&self, appointment_id: &AppointmentId) -> Vec<Prescription> {
        self.user_prescriptions()
            .into_iter()
            .filter(|rx| &rx.appointment_id == appointment_id)
            .collect()
    }

    /// Issue a prescription for one of the logged-in doctor's appointments
    pub fn issue_prescription(&mut self, form: NewPrescription) -> Result<Prescription> {
        let doctor_id = match self.require_role(Role::Doctor, "issue prescriptions")? {
            Account::Doctor(doctor) => doctor.id.clone(),
            other => return Err(CoreError::permission_denied(other.role(), "issue prescriptions")),
        };

        validate_prescription(&form)?;
        let Some(appointment_id) = form.appointment_id else {
            return Err(CoreError::validation(vec![FieldError::new(
                "appointment_id",
                "Please select an appointment",
            )]));
        };

        let appointment = self
            .appointments
            .get(&appointment_id)
            .ok_or_else(|| CoreError::not_found("appointment", &appointment_id))?;
        if appointment.doctor_id != doctor_id {
            return Err(CoreError::permission_denied(
                Role::Doctor,
                "prescribe for another doctor's appointments",
            ));
        }
        if self.policy.requires_completed_visit() && !appointment.completed {
            return Err(CoreError::validation(vec![FieldError::new(
                "appointment_id",
                "Prescriptions can only be issued for completed appointments",
            )]));
        }

        let prescription = Prescription {
            id: PrescriptionId::generate(),
            appointment_id,
            doctor_id,
            patient_id: appointment.patient_id.clone(),
            title: form.title.trim().to_string(),
            medication: form.medication.trim().to_string(),
            dosage: form.dosage.trim().to_string(),
            instructions: form.instructions,
            date: form.date.unwrap_or_else(today),
        };

        self.prescriptions.append(prescription.clone());
        info!(
            "Issued prescription {} for appointment {}",
            prescription.id, prescription.appointment_id
        );
        Ok(prescription)
    }

    pub fn delete_prescription(&mut self, id: &PrescriptionId) -> Result<Prescription> {
        let viewer = self.require_session("delete prescriptions")?.principal();
        let prescription = self
            .prescriptions
            .get(id)
            .ok_or_else(|| CoreError::not_found("prescription", id))?;
        enforce(
            viewer.role(),
            access::check_prescription_delete(&viewer, prescription),
        )?;

        let removed = self
            .prescriptions
            .remove(id)
            .ok_or_else(|| CoreError::not_found("prescription", id))?;
        info!("Deleted prescription {}", id);
        Ok(removed)
    }

    // Directory

    pub fn search_doctors(&self, filter: &DoctorFilter) -> Vec<DoctorProfile> {
        directory::search_doctors(self.doctors.iter().map(|c| &c.profile), filter)
    }

    pub fn specializations(&self) -> Vec<String> {
        directory::distinct(self.doctors.iter().map(|c| &c.profile), |d| {
            d.specialization.as_str()
        })
    }

    pub fn locations(&self) -> Vec<String> {
        directory::distinct(self.doctors.iter().map(|c| &c.profile), |d| d.location.as_str())
    }

    pub fn doctor(&self, id: &DoctorId) -> Result<DoctorProfile> {
        self.doctors
            .get(id)
            .map(|c| c.profile.clone())
            .ok_or_else(|| CoreError::not_found("doctor", id))
    }

    pub fn patient(&self, id: &PatientId) -> Result<PatientProfile> {
        self.patients
            .get(id)
            .map(|c| c.profile.clone())
            .ok_or_else(|| CoreError::not_found("patient", id))
    }

    // Reviews

    /// Review the logged-in patient's visit. Starts out pending moderation.
    pub fn submit_review(
        &mut self,
        appointment_id: &AppointmentId,
        rating: u8,
        comment: &str,
    ) -> Result<Review> {
        let patient_id = match self.require_role(Role::Patient, "review doctors")? {
            Account::Patient(patient) => patient.id.clone(),
            other => return Err(CoreError::permission_denied(other.role(), "review doctors")),
        };

        validate_review(rating, comment)?;

        let appointment = self
            .appointments
            .get(appointment_id)
            .ok_or_else(|| CoreError::not_found("appointment", appointment_id))?;
        if appointment.patient_id != patient_id {
            return Err(CoreError::permission_denied(
                Role::Patient,
                "review another patient's appointment",
            ));
        }
        if self.policy.requires_completed_visit() && !appointment.completed {
            return Err(CoreError::validation(vec![FieldError::new(
                "appointment_id",
                "Only completed appointments can be reviewed",
            )]));
        }
        if self
            .reviews
            .any(|review| &review.appointment_id == appointment_id)
        {
            return Err(CoreError::DuplicateReview {
                appointment_id: appointment_id.to_string(),
            });
        }

        let review = Review {
            id: ReviewId::generate(),
            appointment_id: appointment_id.clone(),
            doctor_id: appointment.doctor_id.clone(),
            patient_id,
            doctor_name: appointment.doctor_name.clone(),
            patient_name: appointment.patient_name.clone(),
            rating,
            comment: comment.trim().to_string(),
            date: today(),
            status: ReviewStatus::Pending,
        };

        self.reviews.append(review.clone());
        info!("Review {} submitted for {}", review.id, review.doctor_id);
        Ok(review)
    }

    /// Published reviews of a doctor
    pub fn doctor_reviews(&self, doctor_id: &DoctorId) -> Vec<Review> {
        self.reviews.filter(|review| {
            &review.doctor_id == doctor_id && review.status == ReviewStatus::Approved
        })
    }

    // Administration

    fn require_admin(&self, action: &str) -> Result<()> {
        self.require_role(Role::Admin, action).map(|_| ())
    }

    /// Doctors waiting for an approval decision
    pub fn pending_doctors(&self) -> Result<Vec<DoctorProfile>> {
        self.require_admin("review doctor registrations")?;
        Ok(self
            .doctors
            .iter()
            .filter(|c| c.profile.approval == ApprovalStatus::Pending)
            .map(|c| c.profile.clone())
            .collect())
    }

    /// Reviews not yet published
    pub fn review_queue(&self) -> Result<Vec<Review>> {
        self.require_admin("moderate reviews")?;
        Ok(self
            .reviews
            .filter(|review| review.status != ReviewStatus::Approved))
    }

    fn set_approval(&mut self, id: &DoctorId, approval: ApprovalStatus) -> Result<DoctorProfile> {
        self.require_admin("approve doctors")?;
        let updated = self
            .doctors
            .update(id, |entry| entry.profile.approval = approval)
            .ok_or_else(|| CoreError::not_found("doctor", id))?;

        info!("Doctor {} is now {}", id, approval);
        Ok(updated.profile)
    }

    pub fn approve_doctor(&mut self, id: &DoctorId) -> Result<DoctorProfile> {
        self.set_approval(id, ApprovalStatus::Approved)
    }

    pub fn reject_doctor(&mut self, id: &DoctorId) -> Result<DoctorProfile> {
        self.set_approval(id, ApprovalStatus::Rejected)
    }

    pub fn moderate_review(&mut self, id: &ReviewId, status: ReviewStatus) -> Result<Review> {
        self.require_admin("moderate reviews")?;
        let updated = self
            .reviews
            .update(id, |review| review.status = status)
            .ok_or_else(|| CoreError::not_found("review", id))?;

        info!("Review {} marked {}", id, status);
        Ok(updated)
    }

    pub fn delete_review(&mut self, id: &ReviewId) -> Result<Review> {
        self.require_admin("delete reviews")?;
        let removed = self
            .reviews
            .remove(id)
            .ok_or_else(|| CoreError::not_found("review", id))?;

        info!("Deleted review {}", id);
        Ok(removed)
    }

    pub fn platform_stats(&self) -> Result<PlatformStats> {
        self.require_admin("view platform statistics")?;
        Ok(PlatformStats {
            doctors: self.doctors.len(),
            patients: self.patients.len(),
            appointments: self.appointments.len(),
            pending_approvals: self
                .doctors
                .iter()
                .filter(|c| c.profile.approval == ApprovalStatus::Pending)
                .count(),
            pending_reviews: self
                .reviews
                .iter()
                .filter(|r| r.status == ReviewStatus::Pending)
                .count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::HashingConfig;
    use crate::session::MemorySessionStorage;
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn config() -> StoreConfig {
        StoreConfig {
            hashing: HashingConfig::low_cost(),
            ..Default::default()
        }
    }

    async fn open() -> (CareStore, Arc<MemorySessionStorage>) {
        let storage = Arc::new(MemorySessionStorage::new());
        let store = CareStore::open(&config(), storage.clone()).await.unwrap();
        (store, storage)
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_login_is_logged_and_changes_nothing() {
        let (mut store, storage) = open().await;

        let err = store
            .login("patient@example.com", "wrong", Role::Patient)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(store.current().is_none());
        assert!(storage.peek("mediConnectUser").is_none());
        assert!(logs_contain("Failed patient login for patient@example.com"));
    }

    #[tokio::test]
    async fn login_checks_the_requested_role_only() {
        let (mut store, _) = open().await;

        assert!(matches!(
            store
                .login("doctor@example.com", "doctor123", Role::Patient)
                .await,
            Err(CoreError::AuthenticationFailed { role: Role::Patient })
        ));

        let account = store
            .login(" Doctor@Example.com ", "doctor123", Role::Doctor)
            .await
            .unwrap();
        assert_eq!(account.principal(), Principal::Doctor(DoctorId::from_static("d1")));
    }

    #[tokio::test]
    async fn logout_without_session_is_noop() {
        let (mut store, _) = open().await;
        store.logout().await.unwrap();
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn update_profile_requires_matching_role() {
        let (mut store, _) = open().await;
        store
            .login("patient@example.com", "patient123", Role::Patient)
            .await
            .unwrap();

        let err = store
            .update_profile(ProfileUpdate::Doctor(Default::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PermissionDenied { role: Role::Patient, .. }));
    }

    #[tokio::test]
    async fn update_profile_rejects_taken_email() {
        let (mut store, _) = open().await;
        store
            .login("patient@example.com", "patient123", Role::Patient)
            .await
            .unwrap();

        let err = store
            .update_profile(ProfileUpdate::Patient(crate::profile::PatientUpdate {
                email: Some("ADMIN@example.com".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmailTaken { ref email } if email == "admin@example.com"));

        // keeping your own address is fine
        let account = store
            .update_profile(ProfileUpdate::Patient(crate::profile::PatientUpdate {
                email: Some("Patient@example.com".to_string()),
                phone: Some("555-0000".to_string()),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(account.email(), "patient@example.com");
        assert_eq!(
            store.patient(&PatientId::from_static("p1")).unwrap().phone.as_deref(),
            Some("555-0000")
        );
    }

    #[tokio::test]
    async fn unknown_appointment_is_not_found_and_registry_unchanged() {
        let (mut store, _) = open().await;
        store
            .login("admin@example.com", "admin123", Role::Admin)
            .await
            .unwrap();
        let before = store.appointments();

        let err = store
            .update_appointment_status(
                &AppointmentId::from_static("app-missing"),
                AppointmentStatus::Confirmed,
            )
            .unwrap_err();

        assert!(matches!(err, CoreError::NotFound { entity: "appointment", .. }));
        assert!(Arc::ptr_eq(&before, &store.appointments()));
    }

    #[tokio::test]
    async fn mutations_require_a_session() {
        let (mut store, _) = open().await;
        let err = store
            .complete_appointment(&AppointmentId::from_static("app2"))
            .unwrap_err();
        assert!(matches!(err, CoreError::NotAuthenticated { .. }));
    }

    #[tokio::test]
    async fn completion_is_idempotent() {
        let (mut store, _) = open().await;
        store
            .login("doctor@example.com", "doctor123", Role::Doctor)
            .await
            .unwrap();
        let id = AppointmentId::from_static("app2");

        store
            .update_appointment_status(&id, AppointmentStatus::Confirmed)
            .unwrap();
        let first = store.complete_appointment(&id).unwrap();
        let second = store.complete_appointment(&id).unwrap();

        assert!(first.completed);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn admin_moderation_and_stats() {
        let (mut store, _) = open().await;
        store
            .login("admin@example.com", "admin123", Role::Admin)
            .await
            .unwrap();

        let stats = store.platform_stats().unwrap();
        assert_eq!(
            stats,
            PlatformStats {
                doctors: 2,
                patients: 2,
                appointments: 2,
                pending_approvals: 0,
                pending_reviews: 0,
            }
        );

        let review = store
            .moderate_review(&ReviewId::from_static("rev1"), ReviewStatus::Flagged)
            .unwrap();
        assert_eq!(review.status, ReviewStatus::Flagged);
        assert!(store.doctor_reviews(&DoctorId::from_static("d1")).is_empty());
        assert_eq!(store.review_queue().unwrap().len(), 1);

        store.delete_review(&ReviewId::from_static("rev1")).unwrap();
        assert!(store.reviews().is_empty());
    }

    #[tokio::test]
    async fn admin_operations_reject_other_roles() {
        let (mut store, _) = open().await;
        store
            .login("doctor@example.com", "doctor123", Role::Doctor)
            .await
            .unwrap();

        assert!(matches!(
            store.approve_doctor(&DoctorId::from_static("d2")),
            Err(CoreError::PermissionDenied { role: Role::Doctor, .. })
        ));
        assert!(store.platform_stats().is_err());
    }
}
