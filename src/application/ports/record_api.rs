use crate::domain::entities::{FieldPatch, Record};
use crate::domain::value_objects::{QueryKey, RecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;

/// レコード種別ごとの REST リソースへのポート
#[async_trait]
pub trait RecordApi<T: Record>: Send + Sync {
    /// クエリキーに対応する一覧を取得
    async fn list(&self, key: &QueryKey) -> Result<Vec<T>, AppError>;

    async fn create(&self, draft: &T::Draft) -> Result<T, AppError>;

    /// 部分更新。成功時は更新後のレコード全体を返す。
    async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<T, AppError>;

    async fn delete(&self, id: RecordId) -> Result<(), AppError>;
}
