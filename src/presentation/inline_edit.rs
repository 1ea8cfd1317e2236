use crate::application::services::WriteCoalescer;
use crate::domain::entities::{FieldKind, Record};
use crate::domain::value_objects::{QueryKey, RecordId};
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    Viewing,
    Editing { draft: String },
    /// 保存を発行し、完了を待っている
    Committing { pending: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEvent {
    Activate,
    Input(String),
    ConfirmKey,
    Blur,
    CancelKey,
    SaveSettled,
    /// 保存がバリデーションで拒否された
    SaveRejected(String),
    /// キャッシュ側で値が変わった
    ExternalValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellEffect {
    RequestFocus,
    Save(String),
}

/// 一覧の 1 セル分のインライン編集状態。UI フレームワークには依存しない。
///
/// `Save` は 1 回のコミットにつき高々 1 回、編集中には決して出さない。
#[derive(Debug, Clone)]
pub struct InlineEditCell {
    row_id: RecordId,
    field: String,
    multiline: bool,
    value: String,
    state: CellState,
    error: Option<String>,
}

impl InlineEditCell {
    pub fn new(row_id: RecordId, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            row_id,
            field: field.into(),
            multiline: false,
            value: value.into(),
            state: CellState::Viewing,
            error: None,
        }
    }

    /// 確定キーで改行を入れる複数行セル
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn row_id(&self) -> RecordId {
        self.row_id
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn state(&self) -> &CellState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, CellState::Editing { .. })
    }

    /// 表示すべき文字列
    pub fn display(&self) -> &str {
        match &self.state {
            CellState::Viewing => &self.value,
            CellState::Editing { draft } => draft,
            CellState::Committing { pending } => pending,
        }
    }

    pub fn handle(&mut self, event: CellEvent) -> Option<CellEffect> {
        let state = std::mem::replace(&mut self.state, CellState::Viewing);
        let (next, effect) = match (state, event) {
            (CellState::Viewing, CellEvent::Activate) => {
                self.error = None;
                (
                    CellState::Editing {
                        draft: self.value.clone(),
                    },
                    Some(CellEffect::RequestFocus),
                )
            }
            (CellState::Editing { .. }, CellEvent::Input(text)) => {
                (CellState::Editing { draft: text }, None)
            }
            (CellState::Editing { draft }, CellEvent::ConfirmKey) if self.multiline => {
                (CellState::Editing { draft }, None)
            }
            (CellState::Editing { draft }, CellEvent::ConfirmKey | CellEvent::Blur) => {
                if draft == self.value {
                    (CellState::Viewing, None)
                } else {
                    (
                        CellState::Committing {
                            pending: draft.clone(),
                        },
                        Some(CellEffect::Save(draft)),
                    )
                }
            }
            (CellState::Editing { .. }, CellEvent::CancelKey) => (CellState::Viewing, None),
            (CellState::Committing { pending }, CellEvent::SaveSettled) => {
                // 確定値を新しい基準値にする。ロールバックは ExternalValue で届く。
                self.value = pending;
                (CellState::Viewing, None)
            }
            (CellState::Committing { pending }, CellEvent::SaveRejected(message)) => {
                self.error = Some(message);
                (CellState::Editing { draft: pending }, Some(CellEffect::RequestFocus))
            }
            (state, CellEvent::ExternalValue(value)) => {
                // 編集中のセッションは上書きしない
                if !matches!(state, CellState::Editing { .. }) {
                    self.value = value;
                }
                (state, None)
            }
            (state, event) => {
                debug!(
                    "Ignoring {:?} for row {} field {} in {:?}",
                    event, self.row_id, self.field, state
                );
                (state, None)
            }
        };
        self.state = next;
        effect
    }
}

/// セル入力をフィールド種別に応じた JSON 値へ変換する
pub fn input_to_value(kind: FieldKind, input: &str) -> Value {
    let trimmed = input.trim();
    match kind {
        FieldKind::Text { required: false }
        | FieldKind::Date { required: false }
        | FieldKind::Timestamp
        | FieldKind::Enum {
            required: false, ..
        }
        | FieldKind::Score
            if trimmed.is_empty() =>
        {
            Value::Null
        }
        FieldKind::Score | FieldKind::Reference => trimmed
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(input.to_string())),
        FieldKind::Flag => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Value::Bool(true),
            "false" | "no" | "0" => Value::Bool(false),
            _ => Value::String(input.to_string()),
        },
        FieldKind::Text { .. } => Value::String(input.to_string()),
        _ => Value::String(trimmed.to_string()),
    }
}

/// `Save` エフェクトをデバウンス書き込みに流し、セルへ返すイベントを得る
pub async fn dispatch_save<T: Record>(
    coalescer: &WriteCoalescer<T>,
    key: &QueryKey,
    cell: &InlineEditCell,
    input: &str,
) -> CellEvent {
    let Some(kind) = T::field_kind(cell.field()) else {
        return CellEvent::SaveRejected(format!("{} is not editable", cell.field()));
    };

    match coalescer
        .schedule(key, cell.row_id(), cell.field(), input_to_value(kind, input))
        .await
    {
        Ok(_) => CellEvent::SaveSettled,
        Err(err) if err.is_validation() => CellEvent::SaveRejected(err.user_message()),
        Err(err) => {
            debug!("Save for {} failed: {}", cell.field(), err);
            CellEvent::SaveRejected(err.user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cell(value: &str) -> InlineEditCell {
        InlineEditCell::new(RecordId::from(1), "companyName", value)
    }

    #[test]
    fn test_unchanged_commit_emits_nothing() {
        let mut cell = cell("Google");
        assert_eq!(cell.handle(CellEvent::Activate), Some(CellEffect::RequestFocus));
        cell.handle(CellEvent::Input("Google".into()));
        assert_eq!(cell.handle(CellEvent::ConfirmKey), None);
        assert_eq!(cell.state(), &CellState::Viewing);
    }

    #[test]
    fn test_changed_commit_emits_one_save() {
        let mut cell = cell("Google");
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("Meta".into()));
        assert_eq!(
            cell.handle(CellEvent::Blur),
            Some(CellEffect::Save("Meta".into()))
        );
        assert_eq!(cell.display(), "Meta");

        // 保存待ちの間の blur / 確定は無視
        assert_eq!(cell.handle(CellEvent::Blur), None);
        assert_eq!(cell.handle(CellEvent::ConfirmKey), None);
        assert_eq!(cell.handle(CellEvent::Activate), None);

        cell.handle(CellEvent::ExternalValue("Meta".into()));
        cell.handle(CellEvent::SaveSettled);
        assert_eq!(cell.state(), &CellState::Viewing);
        assert_eq!(cell.display(), "Meta");
    }

    #[test]
    fn test_cancel_restores_baseline() {
        let mut cell = cell("Google");
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("Meta".into()));
        assert_eq!(cell.handle(CellEvent::CancelKey), None);
        assert_eq!(cell.state(), &CellState::Viewing);
        assert_eq!(cell.display(), "Google");
    }

    #[test]
    fn test_confirm_key_commit_becomes_new_baseline() {
        let mut cell = cell("Google");
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("Meta".into()));
        assert_eq!(
            cell.handle(CellEvent::ConfirmKey),
            Some(CellEffect::Save("Meta".into()))
        );
        assert_eq!(cell.handle(CellEvent::SaveSettled), None);
        assert_eq!(cell.state(), &CellState::Viewing);
        assert_eq!(cell.display(), "Meta");

        // 元の値へ戻す編集も保存される
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("Google".into()));
        assert_eq!(
            cell.handle(CellEvent::ConfirmKey),
            Some(CellEffect::Save("Google".into()))
        );
    }

    #[test]
    fn test_rollback_after_settle_arrives_as_external_value() {
        let mut cell = cell("Google");
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("Meta".into()));
        cell.handle(CellEvent::ConfirmKey);
        cell.handle(CellEvent::SaveSettled);

        cell.handle(CellEvent::ExternalValue("Google".into()));
        assert_eq!(cell.display(), "Google");
        cell.handle(CellEvent::Activate);
        assert_eq!(cell.handle(CellEvent::ConfirmKey), None);
    }

    #[test]
    fn test_multiline_confirm_key_keeps_editing() {
        let mut cell = InlineEditCell::new(RecordId::from(1), "feedbackNotes", "").multiline();
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("line one".into()));
        assert_eq!(cell.handle(CellEvent::ConfirmKey), None);
        assert!(cell.is_editing());
        assert_eq!(
            cell.handle(CellEvent::Blur),
            Some(CellEffect::Save("line one".into()))
        );
    }

    #[test]
    fn test_external_value_does_not_clobber_open_edit() {
        let mut cell = cell("Google");
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("Alpha".into()));
        cell.handle(CellEvent::ExternalValue("Alphabet".into()));
        assert_eq!(cell.display(), "Alpha");

        cell.handle(CellEvent::CancelKey);
        // 取り消し後は元の値（編集中の外部変更は反映されていない）
        assert_eq!(cell.display(), "Google");

        cell.handle(CellEvent::ExternalValue("Alphabet".into()));
        assert_eq!(cell.display(), "Alphabet");
    }

    #[test]
    fn test_rejected_save_returns_to_editing() {
        let mut cell = cell("Google");
        cell.handle(CellEvent::Activate);
        cell.handle(CellEvent::Input("  ".into()));
        assert!(matches!(cell.handle(CellEvent::ConfirmKey), Some(CellEffect::Save(_))));

        let effect = cell.handle(CellEvent::SaveRejected("companyName is required".into()));
        assert_eq!(effect, Some(CellEffect::RequestFocus));
        assert!(cell.is_editing());
        assert_eq!(cell.error(), Some("companyName is required"));
    }

    #[test]
    fn test_input_to_value_by_kind() {
        assert_eq!(input_to_value(FieldKind::Score, "4"), json!(4));
        assert_eq!(input_to_value(FieldKind::Score, ""), Value::Null);
        assert_eq!(input_to_value(FieldKind::Flag, "Yes"), json!(true));
        assert_eq!(
            input_to_value(FieldKind::Text { required: false }, ""),
            Value::Null
        );
        assert_eq!(
            input_to_value(FieldKind::Text { required: true }, ""),
            json!("")
        );
        assert_eq!(
            input_to_value(FieldKind::Date { required: true }, " 2024-05-01 "),
            json!("2024-05-01")
        );
    }
}
