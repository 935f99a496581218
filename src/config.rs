use anyhow::{Context, Result};
use std::time::Duration;

/// Default debounce window between the last answer change and the autosave.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    // Backend
    pub api_base_url: String,

    // Presentation
    pub logo_path: Option<String>,

    // Autosave
    pub autosave_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL").context("API_BASE_URL not set")?;

        let autosave_delay_ms = match std::env::var("AUTOSAVE_DELAY_MS") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .with_context(|| format!("AUTOSAVE_DELAY_MS is not a number: '{}'", value))?,
            Err(_) => DEFAULT_AUTOSAVE_DELAY_MS,
        };

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url),
            logo_path: std::env::var("LOGO_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
            autosave_delay: Duration::from_millis(autosave_delay_ms),
        })
    }

    /// Config pointing at `api_base_url` with every other setting defaulted.
    pub fn with_base_url(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
            logo_path: None,
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        std::env::remove_var("API_BASE_URL");
        std::env::remove_var("LOGO_PATH");
        std::env::remove_var("AUTOSAVE_DELAY_MS");
    }

    #[test]
    #[serial]
    fn test_from_env_requires_base_url() {
        clear_env();
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("API_BASE_URL"));
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        std::env::set_var("API_BASE_URL", "https://api.example.com/");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.logo_path, None);
        assert_eq!(config.autosave_delay, Duration::from_millis(2000));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        std::env::set_var("API_BASE_URL", "http://localhost:3000/api");
        std::env::set_var("LOGO_PATH", "/assets/logo.svg");
        std::env::set_var("AUTOSAVE_DELAY_MS", " 500 ");

        let config = Config::from_env().expect("Should load");
        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.logo_path.as_deref(), Some("/assets/logo.svg"));
        assert_eq!(config.autosave_delay, Duration::from_millis(500));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_delay() {
        clear_env();
        std::env::set_var("API_BASE_URL", "http://localhost");
        std::env::set_var("AUTOSAVE_DELAY_MS", "soon");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("AUTOSAVE_DELAY_MS"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_blank_logo_path_is_ignored() {
        clear_env();
        std::env::set_var("API_BASE_URL", "http://localhost");
        std::env::set_var("LOGO_PATH", "  ");

        assert_eq!(Config::from_env().unwrap().logo_path, None);

        clear_env();
    }

    #[test]
    fn test_with_base_url_trims_slashes() {
        let config = Config::with_base_url("http://localhost:8080//");
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.autosave_delay, Duration::from_millis(2000));
    }
}
