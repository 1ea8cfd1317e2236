use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 仮想スクロールで前後に余分に描画する行数の上限
pub const MAX_OVERSCAN: usize = 100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API base URL must start with http:// or https://: {0}")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than 0")]
    NotPositive(&'static str),

    #[error("{0} must be at most {1}")]
    TooLarge(&'static str, usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub list: ListConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// インライン編集の書き込み遅延
    pub debounce_ms: u64,
    /// 検索入力の遅延
    pub search_debounce_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    pub page_size: usize,
    pub row_height: u32,
    pub overscan: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:5000".to_string(),
                request_timeout_secs: 30,
                access_token: None,
            },
            sync: SyncConfig {
                debounce_ms: 500,
                search_debounce_ms: 300,
            },
            list: ListConfig {
                page_size: 20,
                row_height: 70,
                overscan: 3,
            },
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        // 既定値
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("APPTRACK_API_URL") {
            let trimmed = v.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                cfg.api.base_url = trimmed.to_string();
            }
        }
        if let Ok(v) = std::env::var("APPTRACK_ACCESS_TOKEN") {
            let token = v.trim();
            cfg.api.access_token = if token.is_empty() {
                None
            } else {
                Some(token.to_string())
            };
        }
        if let Some(value) = env_u64("APPTRACK_REQUEST_TIMEOUT_SECS") {
            cfg.api.request_timeout_secs = value.max(1);
        }
        if let Some(value) = env_u64("APPTRACK_DEBOUNCE_MS") {
            cfg.sync.debounce_ms = value;
        }
        if let Some(value) = env_u64("APPTRACK_SEARCH_DEBOUNCE_MS") {
            cfg.sync.search_debounce_ms = value;
        }
        if let Some(value) = env_u64("APPTRACK_PAGE_SIZE") {
            cfg.list.page_size = (value as usize).max(1);
        }
        if let Some(value) = env_u64("APPTRACK_ROW_HEIGHT") {
            cfg.list.row_height = (value as u32).max(1);
        }
        if let Some(value) = env_u64("APPTRACK_OVERSCAN") {
            cfg.list.overscan = value as usize;
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.api.base_url.starts_with("http://") || self.api.base_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidBaseUrl(self.api.base_url.clone()));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ConfigError::NotPositive("api.request_timeout_secs"));
        }
        if self.list.page_size == 0 {
            return Err(ConfigError::NotPositive("list.page_size"));
        }
        if self.list.row_height == 0 {
            return Err(ConfigError::NotPositive("list.row_height"));
        }
        if self.list.overscan > MAX_OVERSCAN {
            return Err(ConfigError::TooLarge("list.overscan", MAX_OVERSCAN));
        }
        Ok(())
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| parse_u64(&v))
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
