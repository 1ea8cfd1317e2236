use crate::domain::entities::{FieldPatch, Record};
use crate::domain::value_objects::{QueryKey, RecordId, RollbackToken};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, warn};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

pub type RowPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// `read` の結果
#[derive(Debug, Clone)]
pub enum CacheRead<T> {
    Loading,
    Ready(Arc<Vec<T>>),
}

impl<T> CacheRead<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, CacheRead::Loading)
    }

    pub fn ready(self) -> Option<Arc<Vec<T>>> {
        match self {
            CacheRead::Ready(rows) => Some(rows),
            CacheRead::Loading => None,
        }
    }
}

/// 再取得で判明した、クライアントが最後に書いた値と権威ある値の食い違い
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub row_id: RecordId,
    pub field: String,
    pub expected: Value,
    pub actual: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub conflicts: Vec<Conflict>,
    /// 再取得後も保留中のパッチ数
    pub pending: usize,
}

enum Mutation {
    Merge(FieldPatch),
    Remove,
}

struct PendingPatch<T> {
    token: RollbackToken,
    predicate: RowPredicate<T>,
    mutation: Mutation,
}

impl<T: Record> PendingPatch<T> {
    fn apply(&self, rows: &mut Vec<T>) {
        match &self.mutation {
            Mutation::Merge(patch) => {
                for row in rows.iter_mut() {
                    if !(self.predicate)(row) {
                        continue;
                    }
                    match row.apply_patch(patch) {
                        Ok(patched) => *row = patched,
                        Err(err) => warn!(
                            "Skipping optimistic patch {} on row {}: {}",
                            self.token,
                            row.id(),
                            err
                        ),
                    }
                }
            }
            Mutation::Remove => rows.retain(|row| !(self.predicate)(row)),
        }
    }
}

struct CacheEntry<T> {
    /// サーバーで確定した最新の一覧。`None` はロード中。
    confirmed: Option<Arc<Vec<T>>>,
    /// `confirmed` に保留中パッチを重ねた一覧
    view: Option<Arc<Vec<T>>>,
    /// キーごとに 1 つの楽観的オーバーレイ（到着順）
    pending: Vec<PendingPatch<T>>,
    stale: bool,
    /// 確定済みの書き込み値（再取得時の競合検出用）
    written: HashMap<(RecordId, String), Value>,
    fetched_at: Option<DateTime<Utc>>,
}

impl<T: Record> CacheEntry<T> {
    fn loading() -> Self {
        Self {
            confirmed: None,
            view: None,
            pending: Vec::new(),
            stale: true,
            written: HashMap::new(),
            fetched_at: None,
        }
    }

    fn position(&self, token: &RollbackToken) -> Option<usize> {
        self.pending.iter().position(|p| &p.token == token)
    }

    fn rebuild(&mut self) {
        let Some(confirmed) = &self.confirmed else {
            self.view = None;
            return;
        };

        if self.pending.is_empty() {
            // パッチが無ければ確定済みの一覧そのもの（同一の Arc）を返す
            self.view = Some(Arc::clone(confirmed));
            return;
        }

        let mut rows: Vec<T> = confirmed.as_ref().clone();
        for pending in &self.pending {
            pending.apply(&mut rows);
        }
        self.view = Some(Arc::new(rows));
    }
}

/// サーバー問い合わせ結果のキー付きキャッシュ。
///
/// 一覧はこのストアだけが所有し、UI は `read` で得た `Arc` を参照するだけにする。
/// 変更は `optimistic_patch` / `rollback` / `confirm` / `reconcile` / `invalidate` を通してのみ行う。
pub struct QueryCache<T: Record> {
    entries: RwLock<HashMap<QueryKey, CacheEntry<T>>>,
    changes: broadcast::Sender<QueryKey>,
}

impl<T: Record> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> QueryCache<T> {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// 変更されたキーの通知を購読する。受信側を drop すれば通知は止まる。
    pub fn subscribe(&self) -> broadcast::Receiver<QueryKey> {
        self.changes.subscribe()
    }

    fn publish(&self, key: &QueryKey) {
        // 購読者がいない場合の送信エラーは無視
        let _ = self.changes.send(key.clone());
    }

    pub async fn read(&self, key: &QueryKey) -> CacheRead<T> {
        let entries = self.entries.read().await;
        match entries.get(key).and_then(|entry| entry.view.clone()) {
            Some(rows) => CacheRead::Ready(rows),
            None => CacheRead::Loading,
        }
    }

    /// エントリが無い、または無効化済みなら true
    pub async fn is_stale(&self, key: &QueryKey) -> bool {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.stale).unwrap_or(true)
    }

    pub async fn fetched_at(&self, key: &QueryKey) -> Option<DateTime<Utc>> {
        let entries = self.entries.read().await;
        entries.get(key).and_then(|entry| entry.fetched_at)
    }

    pub async fn pending_count(&self, key: &QueryKey) -> usize {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.pending.len()).unwrap_or(0)
    }

    /// `predicate` に一致する行へ `patch` をマージし、即座に `read` へ反映する
    pub async fn optimistic_patch<F>(
        &self,
        key: &QueryKey,
        predicate: F,
        patch: FieldPatch,
    ) -> RollbackToken
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.push_pending(key, Arc::new(predicate), Mutation::Merge(patch))
            .await
    }

    pub async fn patch_row(&self, key: &QueryKey, id: RecordId, patch: FieldPatch) -> RollbackToken {
        self.optimistic_patch(key, move |row: &T| row.id() == id, patch)
            .await
    }

    /// 削除を楽観的に反映する
    pub async fn remove_row(&self, key: &QueryKey, id: RecordId) -> RollbackToken {
        self.push_pending(key, Arc::new(move |row: &T| row.id() == id), Mutation::Remove)
            .await
    }

    async fn push_pending(
        &self,
        key: &QueryKey,
        predicate: RowPredicate<T>,
        mutation: Mutation,
    ) -> RollbackToken {
        let token = RollbackToken::generate();
        {
            let mut entries = self.entries.write().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::loading);
            entry.pending.push(PendingPatch {
                token,
                predicate,
                mutation,
            });
            entry.rebuild();
            debug!(
                "Optimistic patch {} applied to {} ({} pending)",
                token,
                key,
                entry.pending.len()
            );
        }
        self.publish(key);
        token
    }

    /// 書き込み失敗時にパッチ適用前の状態へ戻す。
    ///
    /// 他に保留中のパッチが無ければ、`read` はパッチ前と同一の `Arc` を返す。
    pub async fn rollback(&self, token: &RollbackToken) -> bool {
        match self.take_pending(token).await {
            Some(key) => {
                warn!("Rolled back optimistic patch {} on {}", token, key);
                true
            }
            None => false,
        }
    }

    /// 新しい編集に置き換えられたパッチを破棄する
    pub async fn discard(&self, token: &RollbackToken) -> bool {
        match self.take_pending(token).await {
            Some(key) => {
                debug!("Discarded superseded patch {} on {}", token, key);
                true
            }
            None => false,
        }
    }

    async fn take_pending(&self, token: &RollbackToken) -> Option<QueryKey> {
        let key = {
            let mut entries = self.entries.write().await;
            let (key, entry, idx) = entries.iter_mut().find_map(|(key, entry)| {
                let idx = entry.position(token)?;
                Some((key.clone(), entry, idx))
            })?;
            entry.pending.remove(idx);
            entry.rebuild();
            key
        };
        self.publish(&key);
        Some(key)
    }

    /// サーバーが受理した書き込みを確定一覧へ取り込み、パッチを外す。
    ///
    /// トークンが既に保留中でない場合は `Conflict` を返す。
    pub async fn confirm(
        &self,
        token: &RollbackToken,
        server_row: Option<T>,
    ) -> Result<(), AppError> {
        let key = {
            let mut entries = self.entries.write().await;
            let found = entries.iter_mut().find_map(|(key, entry)| {
                let idx = entry.position(token)?;
                Some((key.clone(), entry, idx))
            });
            let Some((key, entry, idx)) = found else {
                return Err(AppError::Conflict(format!(
                    "optimistic update {token} is no longer pending"
                )));
            };

            let pending = entry.pending.remove(idx);
            match (&pending.mutation, server_row) {
                (Mutation::Merge(patch), Some(row)) => {
                    let id = row.id();
                    if let Some(confirmed) = &entry.confirmed {
                        let mut rows = confirmed.as_ref().clone();
                        if let Some(slot) = rows.iter_mut().find(|r| r.id() == id) {
                            *slot = row;
                        }
                        entry.confirmed = Some(Arc::new(rows));
                    }
                    for (field, value) in patch.iter() {
                        entry.written.insert((id, field.clone()), value.clone());
                    }
                }
                (Mutation::Merge(_), None) => {}
                (Mutation::Remove, _) => {
                    if let Some(confirmed) = &entry.confirmed {
                        let mut rows = confirmed.as_ref().clone();
                        rows.retain(|r| !(pending.predicate)(r));
                        entry.confirmed = Some(Arc::new(rows));
                    }
                }
            }
            entry.rebuild();
            key
        };
        self.publish(&key);
        Ok(())
    }

    /// 作成に成功したレコードを一覧の先頭へ追加する（ロード中なら何もしない）
    pub async fn insert_row(&self, key: &QueryKey, row: T) -> bool {
        let inserted = {
            let mut entries = self.entries.write().await;
            match entries.get_mut(key) {
                Some(entry) => match &entry.confirmed {
                    Some(confirmed) if !confirmed.iter().any(|r| r.id() == row.id()) => {
                        let mut rows = Vec::with_capacity(confirmed.len() + 1);
                        rows.push(row);
                        rows.extend(confirmed.iter().cloned());
                        entry.confirmed = Some(Arc::new(rows));
                        entry.rebuild();
                        true
                    }
                    _ => false,
                },
                None => false,
            }
        };
        if inserted {
            self.publish(key);
        }
        inserted
    }

    /// エントリを古いものとしてマークする。再取得は呼び出し側が行う。
    pub async fn invalidate(&self, key: &QueryKey) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(key) {
            Some(entry) => {
                entry.stale = true;
                debug!("Invalidated {}", key);
                true
            }
            None => false,
        }
    }

    /// 権威ある一覧で確定状態を置き換え、保留中パッチを重ね直す
    pub async fn reconcile(&self, key: &QueryKey, fresh: Vec<T>) -> ReconcileReport {
        let report = {
            let mut entries = self.entries.write().await;
            let entry = entries
                .entry(key.clone())
                .or_insert_with(CacheEntry::loading);

            let mut conflicts: Vec<Conflict> = entry
                .written
                .drain()
                .filter_map(|((row_id, field), expected)| {
                    let row = fresh.iter().find(|r| r.id() == row_id)?;
                    let actual = row.field_value(&field).unwrap_or(Value::Null);
                    (actual != expected).then(|| Conflict {
                        row_id,
                        field,
                        expected,
                        actual,
                    })
                })
                .collect();
            conflicts.sort_by(|a, b| (a.row_id, &a.field).cmp(&(b.row_id, &b.field)));

            // 内容が同じなら既存の Arc を保つ
            if entry.confirmed.as_deref() != Some(&fresh) {
                entry.confirmed = Some(Arc::new(fresh));
            }
            entry.stale = false;
            entry.fetched_at = Some(Utc::now());
            entry.rebuild();

            ReconcileReport {
                conflicts,
                pending: entry.pending.len(),
            }
        };

        if !report.conflicts.is_empty() {
            debug!(
                "Reconciled {} with {} conflicting field(s); server values win",
                key,
                report.conflicts.len()
            );
        }
        self.publish(key);
        report
    }

    /// ログアウト時に全エントリを破棄
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }
}
