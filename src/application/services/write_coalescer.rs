use super::record_sync_service::RecordSyncService;
use crate::domain::entities::{FieldPatch, Record};
use crate::domain::value_objects::{QueryKey, RecordId, RollbackToken};
use crate::shared::error::AppError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex};
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, error, warn};

type WriteKey = (RecordId, String);

struct PendingWrite {
    generation: u64,
    token: RollbackToken,
    abort: AbortHandle,
    fire: Option<oneshot::Sender<()>>,
}

struct Inner<T: Record> {
    sync: RecordSyncService<T>,
    default_delay: Duration,
    pending: Mutex<HashMap<WriteKey, PendingWrite>>,
    /// 同じ (行, フィールド) への書き込みを直列化するゲート
    gates: Mutex<HashMap<WriteKey, Arc<Mutex<()>>>>,
    tasks: Mutex<JoinSet<()>>,
    generation: AtomicU64,
}

/// インライン編集の書き込みをデバウンスしてまとめる。
///
/// タイマーはビューではなくこの構造体が所有するので、一覧を閉じても保留中の書き込みは残る。
pub struct WriteCoalescer<T: Record> {
    inner: Arc<Inner<T>>,
}

impl<T: Record> Clone for WriteCoalescer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> WriteCoalescer<T> {
    pub fn new(sync: RecordSyncService<T>, default_delay: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                sync,
                default_delay,
                pending: Mutex::new(HashMap::new()),
                gates: Mutex::new(HashMap::new()),
                tasks: Mutex::new(JoinSet::new()),
                generation: AtomicU64::new(0),
            }),
        }
    }

    pub async fn schedule(
        &self,
        key: &QueryKey,
        id: RecordId,
        field: &str,
        value: Value,
    ) -> Result<RollbackToken, AppError> {
        self.schedule_after(key, id, field, value, self.inner.default_delay)
            .await
    }

    /// パッチを即座にキャッシュへ反映し、`delay` 後に 1 回だけ送信する。
    ///
    /// 同じ (行, フィールド) に未送信の書き込みがあれば置き換える。
    pub async fn schedule_after(
        &self,
        key: &QueryKey,
        id: RecordId,
        field: &str,
        value: Value,
        delay: Duration,
    ) -> Result<RollbackToken, AppError> {
        let patch = FieldPatch::single(field, value);
        T::validate_patch(&patch)?;

        let write_key: WriteKey = (id, field.to_string());
        let generation = self.inner.generation.fetch_add(1, Ordering::Relaxed);
        let cache = self.inner.sync.cache();
        let token = cache.patch_row(key, id, patch.clone()).await;

        let mut pending = self.inner.pending.lock().await;
        if let Some(previous) = pending.remove(&write_key) {
            previous.abort.abort();
            cache.discard(&previous.token).await;
            debug!(
                "Superseded pending write for {} {}.{}",
                T::RESOURCE,
                id,
                field
            );
        }

        let (fire_tx, fire_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let task_write_key = write_key.clone();
        let abort = {
            let mut tasks = self.inner.tasks.lock().await;
            // 終了済みタスクを回収
            while tasks.try_join_next().is_some() {}
            tasks.spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    Ok(()) = fire_rx => {}
                }
                inner
                    .fire(task_key, task_write_key, generation, token, patch)
                    .await;
            })
        };

        pending.insert(
            write_key,
            PendingWrite {
                generation,
                token,
                abort,
                fire: Some(fire_tx),
            },
        );
        debug!(
            "Scheduled write for {} {}.{} in {:?}",
            T::RESOURCE,
            id,
            field,
            delay
        );
        Ok(token)
    }

    /// 保留中の書き込みをすべて即時送信し、完了を待つ
    pub async fn flush(&self) {
        {
            let mut pending = self.inner.pending.lock().await;
            for entry in pending.values_mut() {
                if let Some(fire) = entry.fire.take() {
                    let _ = fire.send(());
                }
            }
        }

        let mut tasks = std::mem::take(&mut *self.inner.tasks.lock().await);
        while let Some(result) = tasks.join_next().await {
            if let Err(err) = result {
                if err.is_panic() {
                    error!("Pending write task panicked: {}", err);
                }
            }
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.inner.pending.lock().await.len()
    }
}

impl<T: Record> Inner<T> {
    async fn fire(
        &self,
        key: QueryKey,
        write_key: WriteKey,
        generation: u64,
        token: RollbackToken,
        patch: FieldPatch,
    ) {
        {
            let mut pending = self.pending.lock().await;
            match pending.get(&write_key) {
                Some(entry) if entry.generation == generation => {
                    pending.remove(&write_key);
                }
                _ => return,
            }
        }

        let gate = {
            let mut gates = self.gates.lock().await;
            Arc::clone(gates.entry(write_key.clone()).or_default())
        };

        {
            let _guard = gate.lock().await;
            debug!(
                "Sending write for {} {}.{}",
                T::RESOURCE,
                write_key.0,
                write_key.1
            );
            if let Err(err) = self.sync.write(&key, write_key.0, token, patch).await {
                // ロールバックと通知は同期サービス側で済んでいる
                warn!(
                    "Debounced write for {} {}.{} failed: {}",
                    T::RESOURCE,
                    write_key.0,
                    write_key.1,
                    err
                );
            }
        }

        let mut gates = self.gates.lock().await;
        if let Some(existing) = gates.get(&write_key) {
            // マップと自分以外に待機者がいなければ片付ける
            if Arc::strong_count(existing) == 2 {
                gates.remove(&write_key);
            }
        }
    }
}
