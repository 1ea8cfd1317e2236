use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// キャッシュエントリを識別するクエリ ID（例: あるユーザーの全応募）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    resource: String,
    user_id: UserId,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>, user_id: UserId) -> Result<Self, String> {
        let resource = resource.into();
        if resource.trim().is_empty() {
            return Err("Query resource cannot be empty".to_string());
        }
        Ok(Self { resource, user_id })
    }

    /// 静的なリソース名から作る（空文字は渡さないこと）
    pub fn for_resource(resource: &'static str, user_id: UserId) -> Self {
        debug_assert!(!resource.is_empty());
        Self {
            resource: resource.to_string(),
            user_id,
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource, self.user_id)
    }
}
