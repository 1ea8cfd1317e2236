use super::FieldPatch;
use crate::domain::value_objects::{FieldDomain, QueryKey, RecordId, Score, UserId};
use crate::shared::error::AppError;
use chrono::{DateTime, NaiveDate};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;

/// 編集可能フィールドの型情報
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Text { required: bool },
    /// `YYYY-MM-DD`
    Date { required: bool },
    /// RFC 3339 のタイムスタンプ（任意）
    Timestamp,
    Enum {
        domain: &'static FieldDomain,
        required: bool,
    },
    Score,
    Flag,
    /// 他レコードへの参照 ID
    Reference,
}

impl FieldKind {
    pub fn check(&self, field: &str, value: &Value) -> Result<(), AppError> {
        match (self, value) {
            (FieldKind::Text { required: false }, Value::Null)
            | (FieldKind::Date { required: false }, Value::Null)
            | (FieldKind::Timestamp, Value::Null)
            | (FieldKind::Enum { required: false, .. }, Value::Null)
            | (FieldKind::Score, Value::Null) => Ok(()),
            (FieldKind::Text { required }, Value::String(text)) => {
                if *required && text.trim().is_empty() {
                    Err(AppError::validation(field, format!("{field} is required")))
                } else {
                    Ok(())
                }
            }
            (FieldKind::Date { .. }, Value::String(text)) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| AppError::validation(field, format!("'{text}' is not a YYYY-MM-DD date"))),
            (FieldKind::Timestamp, Value::String(text)) => DateTime::parse_from_rfc3339(text)
                .map(|_| ())
                .map_err(|_| AppError::validation(field, format!("'{text}' is not an RFC 3339 timestamp"))),
            (FieldKind::Enum { domain, .. }, Value::String(text)) => domain.validate(text),
            (FieldKind::Score, Value::Number(number)) => number
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| format!("{number} is not a whole number"))
                .and_then(Score::new)
                .map(|_| ())
                .map_err(|msg| AppError::validation(field, msg)),
            (FieldKind::Flag, Value::Bool(_)) => Ok(()),
            (FieldKind::Reference, Value::Number(number)) => match number.as_i64() {
                Some(id) if id > 0 => Ok(()),
                _ => Err(AppError::validation(field, format!("{number} is not a valid id"))),
            },
            (_, Value::Null) => Err(AppError::validation(field, format!("{field} is required"))),
            (kind, other) => Err(AppError::validation(
                field,
                format!("unexpected value {other} for {kind:?} field"),
            )),
        }
    }
}

/// 同期レイヤーが扱うレコードの共通インターフェース
pub trait Record:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// 作成ダイアログから送るペイロード
    type Draft: Clone + fmt::Debug + Serialize + Send + Sync + 'static;

    /// REST リソース名（`/api/{RESOURCE}`）
    const RESOURCE: &'static str;

    fn id(&self) -> RecordId;

    fn user_id(&self) -> &UserId;

    /// ユーザーの全件一覧を指すキー
    fn query_key(user_id: &UserId) -> QueryKey {
        QueryKey::for_resource(Self::RESOURCE, user_id.clone())
    }

    /// 編集可能なフィールドの型。読み取り専用・未知のフィールドは `None`。
    fn field_kind(field: &str) -> Option<FieldKind>;

    fn validate_patch(patch: &FieldPatch) -> Result<(), AppError> {
        if patch.is_empty() {
            return Err(AppError::validation("patch", "patch has no fields"));
        }
        for (field, value) in patch.iter() {
            let kind = Self::field_kind(field).ok_or_else(|| {
                AppError::validation(field.as_str(), format!("{field} is not an editable field"))
            })?;
            kind.check(field, value)?;
        }
        Ok(())
    }

    /// パッチをマージした新しいレコードを返す
    fn apply_patch(&self, patch: &FieldPatch) -> Result<Self, AppError> {
        let mut value = serde_json::to_value(self)?;
        let object = value.as_object_mut().ok_or_else(|| {
            AppError::SerializationError(format!("{} did not serialize to an object", Self::RESOURCE))
        })?;
        for (field, field_value) in patch.iter() {
            object.insert(field.clone(), field_value.clone());
        }
        Ok(serde_json::from_value(value)?)
    }

    fn field_value(&self, field: &str) -> Option<Value> {
        let value = serde_json::to_value(self).ok()?;
        Some(value.get(field).cloned().unwrap_or(Value::Null))
    }
}
