use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::{AppointmentId, DoctorId, PatientId, PrescriptionId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: PrescriptionId,
    pub appointment_id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    #[serde(default)]
    pub title: String,
    pub medication: String,
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
    pub date: NaiveDate,
}

/// Prescription form contents. Doctor and patient come from the appointment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPrescription {
    pub appointment_id: Option<AppointmentId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub medication: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub instructions: String,
    /// Defaults to today
    pub date: Option<NaiveDate>,
}
