use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::id::{AppointmentId, DoctorId, PatientId, ReviewId};

/// Moderation state of a review. Only approved reviews are public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Approved,
    Flagged,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Flagged => "flagged",
        })
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReviewStatus::Pending),
            "approved" | "approve" => Ok(ReviewStatus::Approved),
            "flagged" | "flag" => Ok(ReviewStatus::Flagged),
            other => Err(format!(
                "Invalid review status: '{}'. Must be one of: pending, approved, flagged",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub appointment_id: AppointmentId,
    pub doctor_id: DoctorId,
    pub patient_id: PatientId,
    pub doctor_name: String,
    pub patient_name: String,
    /// 1 to 5 stars
    pub rating: u8,
    pub comment: String,
    pub date: NaiveDate,
    pub status: ReviewStatus,
}

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
