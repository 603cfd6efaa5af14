//! MediConnect Core - session store and domain logic
//!
//! This crate holds everything behind a MediConnect front-end: the account
//! model, in-memory registries, role-scoped accessors, the appointment
//! lifecycle, prescriptions, reviews and session persistence.

pub mod access;
pub mod appointment;
pub mod config;
pub mod credentials;
pub mod directory;
pub mod error;
pub mod fixtures;
pub mod id;
pub mod prescription;
pub mod profile;
pub mod registry;
pub mod review;
pub mod session;
pub mod store;
pub mod utils;
pub mod validation;

// Macros are automatically available at crate root due to #[macro_export]

pub use access::{RouteDecision, appointments_for, gate, prescriptions_for};
pub use appointment::{
    Appointment, AppointmentBuckets, AppointmentStatus, BookingRequest, LifecyclePolicy,
    NewAppointment, partition_appointments,
};
pub use config::StoreConfig;
pub use directory::DoctorFilter;
pub use error::{CoreError, FieldError, Result};
pub use id::{
    AdminId, AppointmentId, DoctorId, Id, IdType, PatientId, PrescriptionId, ReviewId,
};
pub use prescription::{NewPrescription, Prescription};
pub use profile::{
    Account, AdminProfile, ApprovalStatus, DoctorProfile, Gender, PatientProfile, Principal,
    ProfileUpdate, Role,
};
pub use review::{Review, ReviewStatus};
pub use session::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::{CareStore, PlatformStats};
pub use validation::{DoctorDetails, PatientDetails, Registration, RegistrationDetails};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        Account, Appointment, AppointmentId, AppointmentStatus, BookingRequest, CareStore,
        CoreError, DoctorFilter, DoctorId, LifecyclePolicy, PatientId, Prescription, Principal,
        ProfileUpdate, Registration, RegistrationDetails, Result, Review, ReviewStatus, Role,
        StoreConfig,
    };
}
