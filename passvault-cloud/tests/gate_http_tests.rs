//! The vault gate running against the HTTP metadata store.

mod support;

use passvault_crypto::KdfParams;
use passvault_vault::{GateFeedback, GateState, KeyManager, VaultError, VaultGate, VaultMetaRecord};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{client_for, unlocked_keys};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cheap_keys() -> KeyManager {
    KeyManager::new().with_kdf_params(KdfParams::new(256, 1, 1))
}

#[tokio::test]
async fn first_run_setup_posts_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vault/entries/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "access": false })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vault/entries/meta"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let keys = cheap_keys();
    let mut gate = VaultGate::new(Arc::new(client_for(&server)), keys.clone());
    gate.open().await.unwrap();
    assert_eq!(gate.state(), &GateState::Setup { feedback: None });

    gate.set_password("Tr0ub4dor&3");
    gate.set_confirmation("Tr0ub4dor&3");
    gate.submit().await.unwrap();
    assert_eq!(gate.state(), &GateState::Unlocked);

    let posted = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .find(|r| r.method.as_str() == "POST")
        .unwrap();
    let record: VaultMetaRecord = serde_json::from_slice(&posted.body).unwrap();
    assert!(record.access);

    let other = cheap_keys();
    let dek = other.unlock("Tr0ub4dor&3", &record).unwrap();
    assert_eq!(dek.as_bytes(), keys.session().dek().unwrap().as_bytes());
}

#[tokio::test]
async fn returning_user_unlocks() {
    let server = MockServer::start().await;
    let (writer, record) = unlocked_keys("Tr0ub4dor&3");
    Mock::given(method("GET"))
        .and(path("/vault/entries/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&record))
        .expect(3)
        .mount(&server)
        .await;

    let keys = cheap_keys();
    let mut gate = VaultGate::new(Arc::new(client_for(&server)), keys.clone());
    gate.open().await.unwrap();
    assert_eq!(gate.state(), &GateState::Unlock { feedback: None });

    gate.set_password("wrong-password");
    assert!(matches!(gate.submit().await, Err(VaultError::InvalidPassword)));
    assert_eq!(gate.state().feedback(), Some(GateFeedback::WrongPassword));

    // Every submit re-fetches the metadata.
    gate.set_password("Tr0ub4dor&3");
    gate.submit().await.unwrap();

    assert!(keys.is_unlocked());
    assert_eq!(
        keys.session().dek().unwrap().as_bytes(),
        writer.session().dek().unwrap().as_bytes()
    );
}

#[tokio::test]
async fn signed_out_user_is_told_to_sign_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/vault/entries/meta"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let mut gate = VaultGate::new(Arc::new(client_for(&server)), cheap_keys());
    assert!(matches!(gate.open().await, Err(VaultError::NotAuthenticated)));
    assert_eq!(
        gate.state(),
        &GateState::Error {
            feedback: GateFeedback::SignInRequired
        }
    );
}
