use crate::application::ports::CredentialProvider;
use crate::shared::config::ApiConfig;
use crate::shared::error::AppError;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const MAX_ERROR_BODY_LEN: usize = 200;

/// `/api/*` への JSON リクエストを送るクライアント
#[derive(Clone)]
pub struct RestClient {
    base_url: String,
    client: reqwest::Client,
    credentials: Arc<dyn CredentialProvider>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RestClient")
            .field("base_url", &self.base_url)
            .field("credentials", &"<redacted>")
            .finish()
    }
}

/// サーバーのエラーボディ。`{error, details}` と `{message, errors}` の両方を受け付ける。
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<Value>,
    #[serde(default)]
    errors: Option<Value>,
}

impl RestClient {
    pub fn new(config: &ApiConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("apptrack/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|err| {
                AppError::ConfigurationError(format!("failed to initialize HTTP client: {err}"))
            })?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, AppError> {
        // トークンが無ければ送信しない
        let token = self.credentials.bearer_token().await.ok_or_else(|| {
            AppError::Unauthorized("no active session; sign in first".to_string())
        })?;
        Ok(self.client.request(method, self.url(path)).bearer_auth(token))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let request = self.request(Method::GET, path).await?;
        let body = self.send(request, "GET", path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn post_json<B, T>(&self, path: &str, payload: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path).await?.json(payload);
        let body = self.send(request, "POST", path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn put_json<B, T>(&self, path: &str, payload: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path).await?.json(payload);
        let body = self.send(request, "PUT", path).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// 成功時のボディ（204 を含む）は読み捨てる
    pub async fn delete(&self, path: &str) -> Result<(), AppError> {
        let request = self.request(Method::DELETE, path).await?;
        self.send(request, "DELETE", path).await?;
        Ok(())
    }

    async fn send(&self, request: RequestBuilder, method: &str, path: &str) -> Result<String, AppError> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::Network(format!("{method} {path} failed: {err}")))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            AppError::Network(format!("failed to read response from {method} {path}: {err}"))
        })?;
        debug!("{} {} -> {}", method, path, status);

        if !status.is_success() {
            return Err(map_error_response(status, &body));
        }
        Ok(body)
    }
}

/// 2xx 以外のレスポンスを `AppError` に変換する
pub fn map_error_response(status: StatusCode, body: &str) -> AppError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let details = parsed.details.or(parsed.errors);
    let message = parsed
        .error
        .or(parsed.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            } else {
                truncate_for_error(body)
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Unauthorized(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::server(status.as_u16(), message, details),
    }
}

fn truncate_for_error(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_LEN {
        body.to_owned()
    } else {
        format!("{}...", body.chars().take(MAX_ERROR_BODY_LEN).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_details_shape() {
        let body = json!({"error": "Invalid application data", "details": [{"path": ["companyName"]}]});
        let err = map_error_response(StatusCode::BAD_REQUEST, &body.to_string());
        match err {
            AppError::Server {
                status,
                message,
                details,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid application data");
                assert!(details.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_message_errors_shape() {
        let body = json!({"message": "Validation failed", "errors": ["bad date"]});
        let err = map_error_response(StatusCode::UNPROCESSABLE_ENTITY, &body.to_string());
        assert_eq!(
            err,
            AppError::server(422, "Validation failed", Some(json!(["bad date"])))
        );
    }

    #[test]
    fn test_status_specific_variants() {
        assert_eq!(
            map_error_response(StatusCode::NOT_FOUND, r#"{"error":"Application not found"}"#),
            AppError::NotFound("Application not found".into())
        );
        assert_eq!(map_error_response(StatusCode::UNAUTHORIZED, "").code(), "unauthorized");
    }

    #[test]
    fn test_plain_text_body_is_truncated() {
        let body = "x".repeat(500);
        match map_error_response(StatusCode::BAD_GATEWAY, &body) {
            AppError::Server { message, .. } => assert_eq!(message.len(), MAX_ERROR_BODY_LEN + 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_url_joins_paths() {
        struct NoCredentials;

        #[async_trait::async_trait]
        impl CredentialProvider for NoCredentials {
            async fn bearer_token(&self) -> Option<String> {
                None
            }
        }

        let config = ApiConfig {
            base_url: "http://localhost:5000/".into(),
            request_timeout_secs: 5,
            access_token: None,
        };
        let client = RestClient::new(&config, Arc::new(NoCredentials)).unwrap();
        assert_eq!(client.url("/api/applications"), "http://localhost:5000/api/applications");
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_dispatch() {
        struct NoCredentials;

        #[async_trait::async_trait]
        impl CredentialProvider for NoCredentials {
            async fn bearer_token(&self) -> Option<String> {
                None
            }
        }

        let config = ApiConfig {
            // 到達不能なアドレス。送信されればネットワークエラーになる。
            base_url: "http://127.0.0.1:9".into(),
            request_timeout_secs: 1,
            access_token: None,
        };
        let client = RestClient::new(&config, Arc::new(NoCredentials)).unwrap();
        let err = client.get_json::<Value>("/api/applications").await.unwrap_err();
        assert_eq!(err.code(), "unauthorized");
    }
}
