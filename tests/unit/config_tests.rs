use bug_desk::{config::GlobalConfig, AppError};

fn full_toml() -> &'static str {
    r#"
http_host = "0.0.0.0"
http_port = 8080
db_path = "data/issues.db"
seed_sample_data = false

[chat]
max_message_chars = 200
max_issues = 3
list_preview = 2

[llm]
enabled = true
api_base = "http://localhost:9999/v1/"
model = "test-model"
temperature = 0.2
max_tokens = 64
timeout_seconds = 5
"#
}

#[test]
fn parses_full_config() {
    let config = GlobalConfig::from_toml_str(full_toml()).expect("valid config");
    assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    assert_eq!(config.db_path.to_str(), Some("data/issues.db"));
    assert!(!config.seed_sample_data);
    assert_eq!(config.chat.max_message_chars, 200);
    assert_eq!(config.chat.max_issues, 3);
    assert_eq!(config.chat.list_preview, 2);
    assert_eq!(config.llm.model, "test-model");
    assert_eq!(config.llm.max_tokens, 64);
    assert_eq!(config.llm.timeout_seconds, 5);
}

#[test]
fn empty_file_yields_defaults() {
    let config = GlobalConfig::from_toml_str("").expect("valid config");
    assert_eq!(config, GlobalConfig::default());
    assert_eq!(config.bind_addr(), "127.0.0.1:5000");
    assert_eq!(config.db_path.to_str(), Some("bug_tracker.db"));
    assert!(config.seed_sample_data);
    assert_eq!(config.chat.max_message_chars, 500);
    assert_eq!(config.chat.max_issues, 10);
    assert_eq!(config.chat.list_preview, 5);
    assert!(config.llm.enabled);
    assert_eq!(config.llm.model, "gpt-3.5-turbo");
    assert_eq!(config.llm.max_tokens, 500);
}

#[test]
fn api_key_is_never_read_from_file() {
    let config = GlobalConfig::from_toml_str(
        r#"
[llm]
api_key = "sk-should-not-load"
"#,
    )
    .expect("unknown keys are ignored");
    assert!(config.llm.api_key.is_none());
}

#[test]
fn zero_message_limit_is_rejected() {
    let result = GlobalConfig::from_toml_str("[chat]\nmax_message_chars = 0\n");
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("max_message_chars")));
}

#[test]
fn zero_issue_cap_is_rejected() {
    let result = GlobalConfig::from_toml_str("[chat]\nmax_issues = 0\n");
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("max_issues")));
}

#[test]
fn zero_max_tokens_is_rejected() {
    let result = GlobalConfig::from_toml_str("[llm]\nmax_tokens = 0\n");
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("max_tokens")));
}

#[test]
fn malformed_toml_is_a_config_error() {
    let result = GlobalConfig::from_toml_str("http_port = \"not a number\"");
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.starts_with("invalid config")));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, full_toml()).expect("write config");

    let config = GlobalConfig::load_from_path(&path).expect("load");
    assert_eq!(config.http_port, 8080);
}

#[test]
fn missing_file_is_a_config_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = GlobalConfig::load_from_path(dir.path().join("absent.toml"));
    assert!(matches!(result, Err(AppError::Config(msg)) if msg.contains("failed to read config")));
}

#[tokio::test]
async fn disabled_llm_skips_credential_lookup() {
    let mut config = GlobalConfig::from_toml_str("[llm]\nenabled = false\n").expect("config");
    config.load_credentials().await.expect("no lookup");
    assert!(config.llm.api_key.is_none());
}
