use canned_chat::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("CHAT_SERVER__PORT");
        env::remove_var("CHAT_WIDGET__RESPONSE_DELAY_MS");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("HOST");
    }
}

fn load(args: &[&str]) -> AppConfig {
    let mut argv = vec!["canned-chat"];
    argv.extend_from_slice(args);
    AppConfig::load_from_args(argv).expect("Failed to load config")
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = load(&[]);
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.widget.response_delay_ms, 1000);
    assert_eq!(config.widget.scroll_settle_ms, 10);
    assert!(config.widget.canned_response.starts_with("I'm currently running in a local mode"));
    assert!(!config.logging.json);
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("CHAT_SERVER__PORT", "9090");
        env::set_var("CHAT_WIDGET__RESPONSE_DELAY_MS", "250");
    }

    let config = load(&[]);
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.widget.response_delay_ms, 250);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("chat.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
widget:
  canned_response: "Offline, sorry."
    "#,
    )
    .expect("Failed to write temp config");

    let path = file_path.to_string_lossy().to_string();
    let config = load(&["--config", &path]);
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.widget.canned_response, "Offline, sorry.");
}

#[test]
#[serial]
fn test_cli_beats_env() {
    clear_env_vars();
    unsafe {
        env::set_var("CHAT_SERVER__PORT", "9090");
    }

    let config = load(&["--port", "8181", "--log-json", "true"]);
    assert_eq!(config.server.port, 8181);
    assert!(config.logging.json);

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_config_file_is_an_error() {
    clear_env_vars();
    let result = AppConfig::load_from_args(["canned-chat", "--config", "does/not/exist.yaml"]);
    assert!(result.is_err());
}
