use super::record_sync_service::RecordSyncService;
use crate::domain::entities::Record;
use crate::domain::value_objects::QueryKey;
use crate::shared::error::AppError;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// フィールド名 → エラーメッセージ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    /// バリデーションエラーならフィールドに記録し、それ以外はそのまま返す
    pub fn record(&mut self, err: AppError) -> Result<(), AppError> {
        match err {
            AppError::ValidationError { field, message } => {
                self.insert(field, message);
                Ok(())
            }
            other => Err(other),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

/// 文字列入力を保持し、送信用ドラフトへ変換できるフォーム
pub trait DraftForm {
    type Draft;

    fn validate(&self) -> Result<Self::Draft, FieldErrors>;
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid form: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Failed(#[from] AppError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T> {
    Created(T),
    /// 送信前にダイアログが閉じられた
    Cancelled,
}

/// 作成ダイアログ 1 つ分のコントローラー。
///
/// 閉じるとまだネットワーク I/O を始めていない送信だけが中止される。
pub struct DialogController<T: Record> {
    sync: RecordSyncService<T>,
    key: QueryKey,
    cancel: CancellationToken,
    submit_gate: Mutex<()>,
}

impl<T: Record> DialogController<T> {
    pub fn open(sync: RecordSyncService<T>, key: QueryKey) -> Self {
        Self {
            sync,
            key,
            cancel: CancellationToken::new(),
            submit_gate: Mutex::new(()),
        }
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_open(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    pub async fn submit<F>(&self, form: &F) -> Result<SubmitOutcome<T>, SubmitError>
    where
        F: DraftForm<Draft = T::Draft>,
    {
        let draft = form.validate().map_err(SubmitError::Invalid)?;

        // 二重送信を防ぐ。待機中に閉じられたら中止。
        let _gate = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!("{} dialog closed before submit", T::RESOURCE);
                return Ok(SubmitOutcome::Cancelled);
            }
            guard = self.submit_gate.lock() => guard,
        };

        // ここから先は I/O 開始済み。呼び出し側が future を捨てても送信は完了させる。
        let sync = self.sync.clone();
        let key = self.key.clone();
        let request = tokio::spawn(async move { sync.create(&key, &draft).await });
        let row = request
            .await
            .map_err(|err| AppError::Internal(format!("create task failed: {err}")))??;

        Ok(SubmitOutcome::Created(row))
    }
}
