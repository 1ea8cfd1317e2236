use crate::application::ports::CredentialProvider;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

/// ID プロバイダーから受け取ったトークンをメモリに保持する
#[derive(Default)]
pub struct SessionCredentialStore {
    token: RwLock<Option<String>>,
}

impl SessionCredentialStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    pub async fn set_token(&self, token: impl Into<String>) {
        let token = token.into();
        *self.token.write().await = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    pub async fn clear(&self) {
        if self.token.write().await.take().is_some() {
            info!("Session credentials cleared");
        }
    }

    pub async fn is_signed_in(&self) -> bool {
        self.token.read().await.is_some()
    }
}

#[async_trait]
impl CredentialProvider for SessionCredentialStore {
    async fn bearer_token(&self) -> Option<String> {
        self.token.read().await.clone()
    }
}
