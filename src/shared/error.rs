use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// フィールド単位のバリデーション失敗。ネットワークには到達しない。
    ValidationError {
        field: String,
        message: String,
    },
    /// 送信前後のトランスポート失敗
    Network(String),
    /// 2xx 以外のレスポンス
    Server {
        status: u16,
        message: String,
        details: Option<Value>,
    },
    /// 再取得で楽観的更新の前提が崩れた
    Conflict(String),
    Unauthorized(String),
    NotFound(String),
    ConfigurationError(String),
    SerializationError(String),
    Internal(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        AppError::Server {
            status,
            message: message.into(),
            details,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError { .. } => "validation_error",
            AppError::Network(_) => "network_error",
            AppError::Server { .. } => "server_error",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::ConfigurationError(_) => "configuration_error",
            AppError::SerializationError(_) => "serialization_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// 通知に表示するメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AppError::ValidationError { message, .. } => message.clone(),
            AppError::Network(_) => "Could not reach the server. Please try again.".to_string(),
            AppError::Server { message, .. } => message.clone(),
            AppError::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            other => other.to_string(),
        }
    }

    /// フォームやセルの境界で処理されるエラーか
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::ValidationError { .. })
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            AppError::ValidationError { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError { field, message } => {
                write!(f, "Validation error on {}: {}", field, message)
            }
            AppError::Network(msg) => write!(f, "Network error: {}", msg),
            AppError::Server {
                status, message, ..
            } => write!(f, "Server error ({}): {}", status, message),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::SerializationError(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Internal(err)
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
