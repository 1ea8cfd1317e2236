use super::query_cache::{CacheRead, QueryCache};
use crate::application::ports::{Notification, Notifier, RecordApi};
use crate::domain::entities::{FieldPatch, Record};
use crate::domain::value_objects::{QueryKey, RecordId, RollbackToken};
use crate::shared::error::AppError;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 1 種類のレコードについて、キャッシュ・API・通知をまとめて扱うサービス。
///
/// 書き込みは「楽観的パッチ → 送信 → 失敗ならロールバック → 再取得」の順で進む。
/// 成否に関わらず最後にキーを無効化して再取得する。
pub struct RecordSyncService<T: Record> {
    api: Arc<dyn RecordApi<T>>,
    cache: Arc<QueryCache<T>>,
    notifier: Arc<dyn Notifier>,
}

impl<T: Record> Clone for RecordSyncService<T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<T: Record> RecordSyncService<T> {
    pub fn new(
        api: Arc<dyn RecordApi<T>>,
        cache: Arc<QueryCache<T>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache<T>> {
        &self.cache
    }

    /// キャッシュが新しければそれを返し、古ければ取得し直す
    pub async fn load(&self, key: &QueryKey) -> Result<Arc<Vec<T>>, AppError> {
        if !self.cache.is_stale(key).await {
            if let CacheRead::Ready(rows) = self.cache.read(key).await {
                return Ok(rows);
            }
        }
        self.refresh(key).await
    }

    pub async fn refresh(&self, key: &QueryKey) -> Result<Arc<Vec<T>>, AppError> {
        let fresh = self.api.list(key).await?;
        let report = self.cache.reconcile(key, fresh).await;
        for conflict in &report.conflicts {
            debug!(
                "Server value wins for {} row {} field {}: wrote {}, now {}",
                T::RESOURCE,
                conflict.row_id,
                conflict.field,
                conflict.expected,
                conflict.actual
            );
        }

        self.cache
            .read(key)
            .await
            .ready()
            .ok_or_else(|| AppError::Internal(format!("{key} is still loading after refresh")))
    }

    /// デバウンスなしの単一フィールド更新
    pub async fn update_field(
        &self,
        key: &QueryKey,
        id: RecordId,
        field: &str,
        value: Value,
    ) -> Result<T, AppError> {
        let patch = FieldPatch::single(field, value);
        T::validate_patch(&patch)?;

        let token = self.cache.patch_row(key, id, patch.clone()).await;
        self.write(key, id, token, patch).await
    }

    /// 適用済みの楽観的パッチ `token` をサーバーへ送る
    pub async fn write(
        &self,
        key: &QueryKey,
        id: RecordId,
        token: RollbackToken,
        patch: FieldPatch,
    ) -> Result<T, AppError> {
        let fields = patch.fields().collect::<Vec<_>>().join(", ");
        let result = self.api.update(id, &patch).await;

        let outcome = match result {
            Ok(row) => {
                if let Err(err) = self.cache.confirm(&token, Some(row.clone())).await {
                    // 既に再取得で置き換わっている
                    debug!("Confirm skipped for {} {}: {}", T::RESOURCE, id, err);
                }
                info!("Updated {} {} ({})", T::RESOURCE, id, fields);
                Ok(row)
            }
            Err(err) => {
                self.cache.rollback(&token).await;
                error!("Failed to update {} {} ({}): {}", T::RESOURCE, id, fields, err);
                self.notifier.notify(Notification::error(
                    "Update failed",
                    format!("Could not save {fields}: {}", err.user_message()),
                ));
                Err(err)
            }
        };

        self.settle(key).await;
        outcome
    }

    pub async fn delete(&self, key: &QueryKey, id: RecordId) -> Result<(), AppError> {
        let token = self.cache.remove_row(key, id).await;

        let outcome = match self.api.delete(id).await {
            Ok(()) => {
                if let Err(err) = self.cache.confirm(&token, None).await {
                    debug!("Confirm skipped for {} {}: {}", T::RESOURCE, id, err);
                }
                info!("Deleted {} {}", T::RESOURCE, id);
                self.notifier.notify(Notification::success(
                    "Deleted",
                    "The record was removed.",
                ));
                Ok(())
            }
            Err(err) => {
                self.cache.rollback(&token).await;
                error!("Failed to delete {} {}: {}", T::RESOURCE, id, err);
                self.notifier
                    .notify(Notification::error("Delete failed", err.user_message()));
                Err(err)
            }
        };

        self.settle(key).await;
        outcome
    }

    pub async fn create(&self, key: &QueryKey, draft: &T::Draft) -> Result<T, AppError> {
        let outcome = match self.api.create(draft).await {
            Ok(row) => {
                self.cache.insert_row(key, row.clone()).await;
                info!("Created {} {}", T::RESOURCE, row.id());
                self.notifier
                    .notify(Notification::success("Saved", "The record was created."));
                Ok(row)
            }
            Err(err) => {
                error!("Failed to create {}: {}", T::RESOURCE, err);
                self.notifier
                    .notify(Notification::error("Create failed", err.user_message()));
                Err(err)
            }
        };

        self.settle(key).await;
        outcome
    }

    /// 書き込み完了後の再取得。失敗してもキャッシュは古いまま残る。
    async fn settle(&self, key: &QueryKey) {
        self.cache.invalidate(key).await;
        if let Err(err) = self.refresh(key).await {
            warn!("Re-fetch of {} after write failed: {}", key, err);
        }
    }
}
