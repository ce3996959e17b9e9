use std::{collections::HashMap, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub auth_secret: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "0.0.0.0:8000".into(),
            auth_secret: "devsecret".into(),
            gemini_api_key: String::new(),
            gemini_model: "gemini-2.5-flash".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("relay.toml") {
        apply_file_config(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings);

    settings
}

fn apply_file_config(settings: &mut Settings, raw: &str) {
    if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
        if let Some(v) = file_cfg.get("bind_addr") {
            settings.server_bind = v.clone();
        }
        if let Some(v) = file_cfg.get("auth_secret") {
            settings.auth_secret = v.clone();
        }
        if let Some(v) = file_cfg.get("gemini_api_key") {
            settings.gemini_api_key = v.clone();
        }
        if let Some(v) = file_cfg.get("gemini_model") {
            settings.gemini_model = v.clone();
        }
    }
}

fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("AUTH_SECRET") {
        settings.auth_secret = v;
    }
    if let Ok(v) = std::env::var("GEMINI_API_KEY") {
        settings.gemini_api_key = v;
    }
    if let Ok(v) = std::env::var("API_GEMINI_KEY") {
        settings.gemini_api_key = v;
    }
    if let Ok(v) = std::env::var("GEMINI_MODEL") {
        settings.gemini_model = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
