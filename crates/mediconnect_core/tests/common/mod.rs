#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, Weekday};
use mediconnect_core::appointment::LifecyclePolicy;
use mediconnect_core::config::{LifecycleConfig, StoreConfig};
use mediconnect_core::credentials::HashingConfig;
use mediconnect_core::session::MemorySessionStorage;
use mediconnect_core::{CareStore, DoctorDetails, PatientDetails, Registration, RegistrationDetails};
use mediconnect_core::profile::Gender;

pub fn config(policy: LifecyclePolicy) -> StoreConfig {
    StoreConfig {
        lifecycle: LifecycleConfig { policy },
        hashing: HashingConfig::low_cost(),
        ..Default::default()
    }
}

pub async fn open(policy: LifecyclePolicy) -> (CareStore, Arc<MemorySessionStorage>) {
    let storage = Arc::new(MemorySessionStorage::new());
    let store = CareStore::open(&config(policy), storage.clone())
        .await
        .expect("store opens");
    (store, storage)
}

pub fn patient_registration(email: &str, password: &str) -> Registration {
    Registration {
        name: "Ada Patient".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        details: RegistrationDetails::Patient(PatientDetails {
            date_of_birth: NaiveDate::from_ymd_opt(1991, 3, 2),
            gender: Some(Gender::Female),
            ..Default::default()
        }),
    }
}

pub fn doctor_registration(email: &str) -> Registration {
    Registration {
        name: "Dr. New Hire".to_string(),
        email: email.to_string(),
        password: "newdoc123".to_string(),
        confirm_password: "newdoc123".to_string(),
        details: RegistrationDetails::Doctor(DoctorDetails {
            specialization: "Pediatrician".to_string(),
            location: "Chicago".to_string(),
            available_days: vec![Weekday::Mon, Weekday::Tue],
            available_time_slots: vec!["09:00 AM".to_string()],
            fee: 90,
            bio: String::new(),
        }),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
