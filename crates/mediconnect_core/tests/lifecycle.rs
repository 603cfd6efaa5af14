mod common;

use common::open;
use mediconnect_core::prelude::*;
use mediconnect_core::{NewPrescription, partition_appointments};
use pretty_assertions::assert_eq;

async fn as_doctor(policy: LifecyclePolicy) -> CareStore {
    let (mut store, _) = open(policy).await;
    store
        .login("doctor@example.com", "doctor123", Role::Doctor)
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn permissive_policy_allows_reopening_cancelled() {
    let mut store = as_doctor(LifecyclePolicy::Permissive).await;
    let id = AppointmentId::from_static("app2");

    store
        .update_appointment_status(&id, AppointmentStatus::Cancelled)
        .unwrap();
    let reopened = store
        .update_appointment_status(&id, AppointmentStatus::Confirmed)
        .unwrap();

    assert_eq!(reopened.status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn enforced_policy_keeps_cancelled_terminal() {
    let mut store = as_doctor(LifecyclePolicy::Enforced).await;
    let id = AppointmentId::from_static("app2");

    store
        .update_appointment_status(&id, AppointmentStatus::Cancelled)
        .unwrap();
    let err = store
        .update_appointment_status(&id, AppointmentStatus::Confirmed)
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidTransition { .. }));
    let still = store.appointment(&id).unwrap();
    assert_eq!(still.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn completion_needs_confirmation_when_enforced() {
    let mut store = as_doctor(LifecyclePolicy::Enforced).await;
    let id = AppointmentId::from_static("app2");

    assert!(matches!(
        store.complete_appointment(&id),
        Err(CoreError::InvalidTransition { .. })
    ));

    store
        .update_appointment_status(&id, AppointmentStatus::Confirmed)
        .unwrap();
    let done = store.complete_appointment(&id).unwrap();
    assert!(done.completed);

    // completed appointments are frozen
    assert!(
        store
            .update_appointment_status(&id, AppointmentStatus::Cancelled)
            .is_err()
    );

    let buckets = partition_appointments(&store.user_appointments());
    assert!(buckets.upcoming.is_empty());
    assert_eq!(buckets.past.len(), 2);
}

#[tokio::test]
async fn patients_may_only_cancel_their_own() {
    let (mut store, _) = open(LifecyclePolicy::Enforced).await;
    store
        .login("patient2@example.com", "patient123", Role::Patient)
        .await
        .unwrap();

    let own = AppointmentId::from_static("app2");
    let other = AppointmentId::from_static("app1");

    assert!(matches!(
        store.update_appointment_status(&own, AppointmentStatus::Confirmed),
        Err(CoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        store.update_appointment_status(&other, AppointmentStatus::Cancelled),
        Err(CoreError::PermissionDenied { .. })
    ));

    let cancelled = store
        .update_appointment_status(&own, AppointmentStatus::Cancelled)
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn prescriptions_follow_the_visit() {
    let mut store = as_doctor(LifecyclePolicy::Enforced).await;
    let open_visit = AppointmentId::from_static("app2");

    let form = NewPrescription {
        appointment_id: Some(open_visit.clone()),
        title: "Palpitations".to_string(),
        medication: "Metoprolol".to_string(),
        dosage: "25mg".to_string(),
        instructions: "Twice daily".to_string(),
        date: None,
    };

    // not completed yet
    assert!(matches!(
        store.issue_prescription(form.clone()),
        Err(CoreError::ValidationFailed { .. })
    ));

    store
        .update_appointment_status(&open_visit, AppointmentStatus::Confirmed)
        .unwrap();
    store.complete_appointment(&open_visit).unwrap();
    let rx = store.issue_prescription(form).unwrap();

    assert_eq!(rx.patient_id, PatientId::from_static("p2"));
    assert!(rx.id.as_str().starts_with("rx-"));
    assert_eq!(store.appointment_prescriptions(&open_visit), vec![rx.clone()]);
    assert_eq!(store.user_prescriptions().len(), 2);

    // the patient sees only their own
    store.logout().await.unwrap();
    store
        .login("patient2@example.com", "patient123", Role::Patient)
        .await
        .unwrap();
    assert_eq!(store.user_prescriptions(), vec![rx.clone()]);
    assert!(matches!(
        store.delete_prescription(&rx.id),
        Err(CoreError::PermissionDenied { .. })
    ));

    store.logout().await.unwrap();
    store
        .login("admin@example.com", "admin123", Role::Admin)
        .await
        .unwrap();
    store.delete_prescription(&rx.id).unwrap();
    assert!(matches!(
        store.delete_prescription(&rx.id),
        Err(CoreError::NotFound { .. })
    ));
}

#[tokio::test]
async fn reviews_need_a_completed_visit_and_moderation() {
    let (mut store, _) = open(LifecyclePolicy::Enforced).await;
    store
        .login("patient2@example.com", "patient123", Role::Patient)
        .await
        .unwrap();
    let app2 = AppointmentId::from_static("app2");

    assert!(matches!(
        store.submit_review(&app2, 5, "Great"),
        Err(CoreError::ValidationFailed { .. })
    ));

    store.logout().await.unwrap();
    store
        .login("doctor@example.com", "doctor123", Role::Doctor)
        .await
        .unwrap();
    store
        .update_appointment_status(&app2, AppointmentStatus::Confirmed)
        .unwrap();
    store.complete_appointment(&app2).unwrap();
    store.logout().await.unwrap();

    store
        .login("patient2@example.com", "patient123", Role::Patient)
        .await
        .unwrap();
    let review = store.submit_review(&app2, 4, "Helpful and calm").unwrap();
    assert_eq!(review.status, ReviewStatus::Pending);
    assert!(matches!(
        store.submit_review(&app2, 3, "Again"),
        Err(CoreError::DuplicateReview { .. })
    ));

    let d1 = DoctorId::from_static("d1");
    // only the seeded, approved review is public
    assert_eq!(store.doctor_reviews(&d1).len(), 1);

    store.logout().await.unwrap();
    store
        .login("admin@example.com", "admin123", Role::Admin)
        .await
        .unwrap();
    store
        .moderate_review(&review.id, ReviewStatus::Approved)
        .unwrap();
    assert_eq!(store.doctor_reviews(&d1).len(), 2);
}
