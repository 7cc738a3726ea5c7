use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use automarket_core::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_STATE_DIR: &str = ".automarket";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: String,
    pub state_dir: PathBuf,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub log_level: String,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("AUTOMARKET_API_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let state_dir = std::env::var("AUTOMARKET_STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR));
        let timeout_secs = parse_timeout_secs(std::env::var("AUTOMARKET_TIMEOUT_SECS").ok())?;
        let page_size = parse_page_size(std::env::var("AUTOMARKET_PAGE_SIZE").ok())?;
        let log_level = std::env::var("LOG_LEVEL")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            api_url,
            state_dir,
            request_timeout: Duration::from_secs(timeout_secs),
            page_size,
            log_level,
        })
    }
}

fn parse_timeout_secs(raw: Option<String>) -> Result<u64> {
    let value = raw
        .unwrap_or_else(|| DEFAULT_TIMEOUT_SECS.to_string())
        .trim()
        .parse::<u64>()
        .context("Failed to parse AUTOMARKET_TIMEOUT_SECS, expecting positive integer")?;

    if value == 0 {
        return Err(anyhow!("AUTOMARKET_TIMEOUT_SECS must be > 0"));
    }
    Ok(value)
}

fn parse_page_size(raw: Option<String>) -> Result<u32> {
    let value = raw
        .unwrap_or_else(|| DEFAULT_PAGE_SIZE.to_string())
        .trim()
        .parse::<u32>()
        .context("Failed to parse AUTOMARKET_PAGE_SIZE, expecting positive integer")?;

    if !(1..=MAX_PAGE_SIZE).contains(&value) {
        return Err(anyhow!("AUTOMARKET_PAGE_SIZE must be in 1..={MAX_PAGE_SIZE}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_and_rejects_zero() {
        assert_eq!(parse_timeout_secs(None).expect("default"), DEFAULT_TIMEOUT_SECS);
        assert_eq!(parse_timeout_secs(Some(" 30 ".into())).expect("valid"), 30);
        assert!(parse_timeout_secs(Some("0".into())).is_err());
        assert!(parse_timeout_secs(Some("soon".into())).is_err());
    }

    #[test]
    fn page_size_must_fit_backend_limit() {
        assert_eq!(parse_page_size(None).expect("default"), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("100".into())).expect("max"), 100);
        assert!(parse_page_size(Some("101".into())).is_err());
        assert!(parse_page_size(Some("0".into())).is_err());
    }
}
