use std::{collections::HashMap, fs};

use anyhow::{bail, Context};
use serde::Deserialize;
use shared::domain::{DEFAULT_CASE_CATEGORY, DEFAULT_JURISDICTION};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server_url: String,
    pub jurisdiction: String,
    pub category: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".into(),
            jurisdiction: DEFAULT_JURISDICTION.into(),
            category: DEFAULT_CASE_CATEGORY.into(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("courtroom.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("jurisdiction") {
                settings.jurisdiction = v.clone();
            }
            if let Some(v) = file_cfg.get("category") {
                settings.category = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("COURTROOM_SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("COURTROOM_JURISDICTION") {
        settings.jurisdiction = v;
    }
    if let Ok(v) = std::env::var("COURTROOM_CATEGORY") {
        settings.category = v;
    }

    settings
}

/// Validates the backend URL and strips any trailing slash so endpoint
/// paths can be appended directly.
pub fn prepare_server_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid server url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("server url '{raw}' must use http or https");
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_the_local_backend() {
        let settings = Settings::default();
        assert_eq!(settings.server_url, "http://localhost:8000");
        assert_eq!(settings.jurisdiction, "Supreme Court");
        assert_eq!(settings.category, "Civil");
    }

    #[test]
    fn server_urls_are_validated_and_normalized() {
        assert_eq!(
            prepare_server_url("http://localhost:8000/").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            prepare_server_url(" https://court.example.org ").unwrap(),
            "https://court.example.org"
        );
        assert!(prepare_server_url("ftp://court.example.org").is_err());
        assert!(prepare_server_url("not a url").is_err());
    }
}
