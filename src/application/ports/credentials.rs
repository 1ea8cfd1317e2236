use async_trait::async_trait;

/// 外部 ID プロバイダーから取得したベアラートークンを提供するポート
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// 有効なトークンが無い場合は `None`
    async fn bearer_token(&self) -> Option<String>;
}
