use passvault_cloud::ApiConfig;
use pretty_assertions::assert_eq;

#[test]
fn default_api_base_url() {
    assert_eq!(ApiConfig::default().api_base_url, "http://localhost:8080");
}

#[test]
fn default_request_timeout() {
    assert_eq!(ApiConfig::default().request_timeout_secs, 30);
}

#[test]
fn with_base_url_keeps_other_defaults() {
    let config = ApiConfig::with_base_url("https://vault.example");
    assert_eq!(config.api_base_url, "https://vault.example");
    assert_eq!(config.request_timeout_secs, 30);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let config: ApiConfig =
        serde_json::from_str(r#"{ "api_base_url": "https://vault.example" }"#).unwrap();
    assert_eq!(config.request_timeout_secs, 30);
}

#[test]
fn serialization_roundtrip() {
    let config = ApiConfig {
        api_base_url: "https://vault.example".into(),
        request_timeout_secs: 5,
    };
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<ApiConfig>(&json).unwrap(), config);
}
