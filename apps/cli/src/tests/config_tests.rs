use super::*;

use std::{
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.to_string())
    }
}

#[test]
fn defaults_point_at_local_api() {
    let settings = Settings::default();
    assert_eq!(settings.api_url, "http://127.0.0.1:3000/api");
    assert_eq!(settings.api_token, None);
    assert_eq!(settings.request_timeout(), Duration::from_secs(15));
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
api_url = "https://events.example.com/api"
api_token = "abc123"
request_timeout_secs = 30
"#,
    )
    .expect("parse");

    assert_eq!(settings.api_url, "https://events.example.com/api");
    assert_eq!(settings.api_token.as_deref(), Some("abc123"));
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn timeout_given_as_text_is_accepted_and_garbage_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "request_timeout_secs = \"45\"").expect("parse");
    assert_eq!(settings.request_timeout_secs, 45);

    apply_file(&mut settings, "request_timeout_secs = \"soon\"").expect("parse");
    assert_eq!(settings.request_timeout_secs, 45);
}

#[test]
fn malformed_file_is_an_error() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "api_url = ").is_err());
}

#[test]
fn app_prefixed_env_wins_over_short_names() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("EVENTFLOW_API_URL", "http://short.example"),
            ("APP__API_URL", "http://app.example"),
            ("EVENTFLOW_TOKEN", "tok"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    );

    assert_eq!(settings.api_url, "http://app.example");
    assert_eq!(settings.api_token.as_deref(), Some("tok"));
    assert_eq!(settings.request_timeout_secs, 15);
}

#[test]
fn blank_token_means_anonymous() {
    let mut settings = Settings {
        api_token: Some("old".to_string()),
        ..Settings::default()
    };
    apply_env(&mut settings, env_from(&[("APP__API_TOKEN", "   ")]));
    assert_eq!(settings.api_token, None);
}

#[test]
fn explicit_config_path_must_exist() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let missing = env::temp_dir().join(format!("eventflow_missing_{suffix}.toml"));
    assert!(load_settings(Some(&missing)).is_err());
}

#[test]
fn explicit_config_file_is_loaded() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("eventflow_config_test_{suffix}.toml"));
    fs::write(&path, "request_timeout_secs = 7\n").expect("write config");

    let settings = load_settings(Some(&path)).expect("load");
    assert_eq!(settings.request_timeout_secs, 7);

    fs::remove_file(path).expect("cleanup");
}
