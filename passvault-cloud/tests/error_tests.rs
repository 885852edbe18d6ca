use passvault_cloud::CloudError;
use passvault_vault::VaultError;

#[test]
fn not_authenticated_display() {
    assert_eq!(CloudError::NotAuthenticated.to_string(), "not authenticated");
}

#[test]
fn api_error_display() {
    let err = CloudError::Api("GET /vault/entries/all: 500 Internal Server Error".into());
    assert_eq!(
        err.to_string(),
        "API request failed: GET /vault/entries/all: 500 Internal Server Error"
    );
}

#[test]
fn malformed_entry_display() {
    let err = CloudError::MalformedEntry {
        id: "12".into(),
        reason: "missing password cipher".into(),
    };
    assert_eq!(err.to_string(), "malformed entry 12: missing password cipher");
}

#[test]
fn from_vault_error() {
    let err: CloudError = VaultError::Locked.into();
    assert!(matches!(err, CloudError::Vault(VaultError::Locked)));
    assert_eq!(err.to_string(), "vault error: vault is locked");
}

#[test]
fn from_serde_json_error() {
    let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
    let err: CloudError = json_err.into();
    assert!(err.to_string().contains("serialization error"));
}
