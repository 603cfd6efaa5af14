mod common;

use std::sync::Arc;

use common::{config, patient_registration};
use mediconnect_core::prelude::*;
use mediconnect_core::session::{DEFAULT_SESSION_KEY, FileSessionStorage, SessionStorage};
use pretty_assertions::assert_eq;

fn file_config(dir: &std::path::Path) -> StoreConfig {
    let mut config = config(LifecyclePolicy::Enforced);
    config.session.directory = Some(dir.to_path_buf());
    config
}

#[tokio::test]
async fn login_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    let mut store = CareStore::open_with_files(&config).await.unwrap();
    let account = store
        .login("doctor@example.com", "doctor123", Role::Doctor)
        .await
        .unwrap();

    let raw = std::fs::read_to_string(dir.path().join("mediConnectUser.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["role"], "doctor");
    assert_eq!(json["id"], "d1");
    assert_eq!(json["email"], "doctor@example.com");
    assert!(!raw.contains("argon2"));

    let reopened = CareStore::open_with_files(&config).await.unwrap();
    assert_eq!(reopened.current(), Some(&account));
}

#[tokio::test]
async fn logout_removes_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    let mut store = CareStore::open_with_files(&config).await.unwrap();
    store
        .login("admin@example.com", "admin123", Role::Admin)
        .await
        .unwrap();
    store.logout().await.unwrap();

    assert!(!dir.path().join("mediConnectUser.json").exists());
    let reopened = CareStore::open_with_files(&config).await.unwrap();
    assert!(reopened.current().is_none());
}

#[tokio::test]
async fn registered_accounts_do_not_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());

    let mut store = CareStore::open_with_files(&config).await.unwrap();
    store
        .register(patient_registration("a@x.com", "pw123456"))
        .await
        .unwrap();
    assert!(dir.path().join("mediConnectUser.json").exists());

    // registries are rebuilt from fixtures, so the stored identity is stale
    let reopened = CareStore::open_with_files(&config).await.unwrap();
    assert!(reopened.current().is_none());
    assert!(!dir.path().join("mediConnectUser.json").exists());
}

#[tokio::test]
async fn corrupt_session_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    let storage = Arc::new(FileSessionStorage::new(dir.path()));
    storage
        .save(DEFAULT_SESSION_KEY, "{not json")
        .await
        .unwrap();

    let store = CareStore::open(&config, storage.clone()).await.unwrap();
    assert!(store.current().is_none());
    assert_eq!(storage.load(DEFAULT_SESSION_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn restore_prefers_the_registry_profile() {
    let dir = tempfile::tempdir().unwrap();
    let config = file_config(dir.path());
    let storage = Arc::new(FileSessionStorage::new(dir.path()));

    // a stored identity whose name no longer matches the registry
    let stale = serde_json::json!({
        "role": "patient",
        "id": "p1",
        "email": "patient@example.com",
        "name": "Johnny Doe",
    });
    storage
        .save(DEFAULT_SESSION_KEY, &stale.to_string())
        .await
        .unwrap();

    let store = CareStore::open(&config, storage.clone()).await.unwrap();
    let current = store.current().unwrap();
    assert_eq!(current.name(), "John Doe");

    let rewritten: Account =
        serde_json::from_str(&storage.load(DEFAULT_SESSION_KEY).await.unwrap().unwrap()).unwrap();
    assert_eq!(&rewritten, current);
}

#[tokio::test]
async fn custom_session_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = file_config(dir.path());
    config.session.key = "clinicSession".to_string();

    let mut store = CareStore::open_with_files(&config).await.unwrap();
    store
        .login("patient@example.com", "patient123", Role::Patient)
        .await
        .unwrap();

    assert!(dir.path().join("clinicSession.json").exists());
    assert!(!dir.path().join("mediConnectUser.json").exists());
}
