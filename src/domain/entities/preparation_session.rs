use super::record::{FieldKind, Record};
use crate::domain::value_objects::{PreparationTopic, RecordId, Score, UserId, PREPARATION_TOPIC};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 面接対策の記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationSession {
    pub id: RecordId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub topic: PreparationTopic,
    #[serde(default)]
    pub resource_link: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<Score>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationSessionDraft {
    pub date: NaiveDate,
    pub topic: PreparationTopic,
    pub resource_link: Option<String>,
    pub confidence_score: Option<Score>,
    pub notes: Option<String>,
}

impl Record for PreparationSession {
    type Draft = PreparationSessionDraft;

    const RESOURCE: &'static str = "preparation-sessions";

    fn id(&self) -> RecordId {
        self.id
    }

    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn field_kind(field: &str) -> Option<FieldKind> {
        let kind = match field {
            "date" => FieldKind::Date { required: true },
            "topic" => FieldKind::Enum {
                domain: &PREPARATION_TOPIC,
                required: true,
            },
            "resourceLink" | "notes" => FieldKind::Text { required: false },
            "confidenceScore" => FieldKind::Score,
            _ => return None,
        };
        Some(kind)
    }
}
