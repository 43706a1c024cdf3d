//! Loading configuration files and building a client from them.

use std::io::Write;

use wa_gateway_client::config::loader::{load_config, ConfigError};
use wa_gateway_client::config::{BackoffStrategy, LimitConfig, OnLimitReached};
use wa_gateway_client::{GatewayError, ResilientClient};

const FULL: &str = r#"
default_connection = "primary"

[[connections]]
name = "primary"
base_url = "https://gw-1.example.com"
credential = "secret-1"

[[connections]]
name = "backup"
base_url = "https://gw-2.example.com/evolution"
credential = "secret-2"

[http]
timeout_seconds = 15

[retry]
max_attempts = 5
backoff_strategy = "linear"
base_delay_ms = 200

[rate_limiting]
on_limit_reached = "skip"

[rate_limiting.limits.messages]
max_attempts = 10
window_seconds = 30
"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn test_client_from_config_file() {
    let file = write_config(FULL);
    let config = load_config(file.path()).unwrap();

    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.backoff_strategy, BackoffStrategy::Linear);
    assert_eq!(config.rate_limiting.on_limit_reached, OnLimitReached::Skip);
    // A limits table in the file replaces the built-in one.
    assert_eq!(config.rate_limiting.limits["messages"].max_attempts, 10);
    assert!(!config.rate_limiting.limits.contains_key("media"));

    let client = ResilientClient::new(config).unwrap();
    assert_eq!(client.active_connection(), "primary");
    assert_eq!(client.registry().names(), vec!["backup".to_string(), "primary".to_string()]);
    assert_eq!(client.limiter().limit_for("messages").window_seconds, 30);
    assert_eq!(client.limiter().limit_for("media"), LimitConfig::new(60, 60));

    let backup = client.registry().resolve(Some("backup")).unwrap();
    assert_eq!(
        backup.endpoint_url("/instance/fetchInstances").unwrap().as_str(),
        "https://gw-2.example.com/evolution/instance/fetchInstances"
    );
}

#[test]
fn test_invalid_file_reports_every_problem() {
    let file = write_config(
        r#"
default_connection = "missing"

[[connections]]
name = "a"
base_url = "not a url"
credential = "k"

[retry]
max_attempts = 0
"#,
    );

    match load_config(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
            assert!(fields.iter().any(|f| f.contains("base_url")));
            assert!(fields.iter().any(|f| f.contains("default_connection")));
            assert!(fields.iter().any(|f| f.contains("max_attempts")));
        }
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn test_config_errors_convert_to_gateway_errors() {
    let file = write_config("retry = [");
    let err: GatewayError = load_config(file.path()).unwrap_err().into();
    assert!(matches!(err, GatewayError::Configuration(_)));
}
