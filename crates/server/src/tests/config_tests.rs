use super::*;

#[test]
fn defaults_cover_every_setting() {
    let settings = Settings::default();
    assert_eq!(settings.server_bind, "0.0.0.0:8000");
    assert_eq!(settings.auth_secret, "devsecret");
    assert!(settings.gemini_api_key.is_empty());
    assert_eq!(settings.gemini_model, "gemini-2.5-flash");
}

#[test]
fn file_config_overrides_defaults() {
    let mut settings = Settings::default();
    apply_file_config(
        &mut settings,
        r#"
bind_addr = "127.0.0.1:9000"
auth_secret = "file-secret"
gemini_api_key = "file-key"
"#,
    );
    assert_eq!(settings.server_bind, "127.0.0.1:9000");
    assert_eq!(settings.auth_secret, "file-secret");
    assert_eq!(settings.gemini_api_key, "file-key");
    assert_eq!(settings.gemini_model, "gemini-2.5-flash");
}

#[test]
fn unknown_keys_are_ignored() {
    let mut settings = Settings::default();
    apply_file_config(&mut settings, "unrelated = \"value\"\n");
    assert_eq!(settings.server_bind, "0.0.0.0:8000");
}

#[test]
fn invalid_toml_leaves_defaults_intact() {
    let mut settings = Settings::default();
    apply_file_config(&mut settings, "not valid toml [");
    assert_eq!(settings.server_bind, "0.0.0.0:8000");
    assert_eq!(settings.auth_secret, "devsecret");
}
