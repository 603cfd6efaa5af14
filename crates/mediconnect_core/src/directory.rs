//! Doctor directory search

use serde::{Deserialize, Serialize};

use crate::profile::{ApprovalStatus, DoctorProfile};

/// Criteria for `search_doctors`. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoctorFilter {
    /// Case-insensitive substring of the doctor's name or specialization
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub available_only: bool,
    #[serde(default)]
    pub min_rating: Option<f32>,
}

impl DoctorFilter {
    pub fn matches(&self, doctor: &DoctorProfile) -> bool {
        if doctor.approval != ApprovalStatus::Approved {
            return false;
        }

        if let Some(term) = non_empty(&self.search) {
            let term = term.to_lowercase();
            if !doctor.name.to_lowercase().contains(&term)
                && !doctor.specialization.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        if let Some(specialization) = non_empty(&self.specialization) {
            if !doctor.specialization.eq_ignore_ascii_case(specialization) {
                return false;
            }
        }

        if let Some(location) = non_empty(&self.location) {
            if !doctor.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }

        if self.available_only && !doctor.available {
            return false;
        }

        self.min_rating.is_none_or(|min| doctor.rating >= min)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Approved doctors matching `filter`, in registry order
pub fn search_doctors<'a>(
    doctors: impl IntoIterator<Item = &'a DoctorProfile>,
    filter: &DoctorFilter,
) -> Vec<DoctorProfile> {
    doctors
        .into_iter()
        .filter(|doctor| filter.matches(doctor))
        .cloned()
        .collect()
}

/// Distinct non-empty values of `field` across approved doctors, sorted
pub(crate) fn distinct<'a>(
    doctors: impl IntoIterator<Item = &'a DoctorProfile>,
    field: impl Fn(&DoctorProfile) -> &str,
) -> Vec<String> {
    let mut values: Vec<String> = doctors
        .into_iter()
        .filter(|doctor| doctor.approval == ApprovalStatus::Approved)
        .map(|doctor| field(doctor).trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}
