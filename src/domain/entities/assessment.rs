use super::record::{FieldKind, Record};
use crate::domain::value_objects::{DifficultyLevel, RecordId, Score, UserId, DIFFICULTY_LEVEL};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 面接後の振り返り
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: RecordId,
    pub user_id: UserId,
    pub interview_id: RecordId,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub difficulty_level: Option<DifficultyLevel>,
    #[serde(default)]
    pub what_went_well: Option<String>,
    #[serde(default)]
    pub what_fell_short: Option<String>,
    #[serde(default)]
    pub questions_asked: Option<String>,
    #[serde(default)]
    pub your_questions: Option<String>,
    #[serde(default)]
    pub follow_up_needed: bool,
    #[serde(default)]
    pub time_to_next_round: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDraft {
    pub interview_id: RecordId,
    pub score: Option<Score>,
    pub difficulty_level: Option<DifficultyLevel>,
    pub what_went_well: Option<String>,
    pub what_fell_short: Option<String>,
    pub questions_asked: Option<String>,
    pub your_questions: Option<String>,
    pub follow_up_needed: bool,
    pub time_to_next_round: Option<String>,
}

impl Record for Assessment {
    type Draft = AssessmentDraft;

    const RESOURCE: &'static str = "assessments";

    fn id(&self) -> RecordId {
        self.id
    }

    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn field_kind(field: &str) -> Option<FieldKind> {
        let kind = match field {
            "interviewId" => FieldKind::Reference,
            "score" => FieldKind::Score,
            "difficultyLevel" => FieldKind::Enum {
                domain: &DIFFICULTY_LEVEL,
                required: false,
            },
            "whatWentWell" | "whatFellShort" | "questionsAsked" | "yourQuestions"
            | "timeToNextRound" => FieldKind::Text { required: false },
            "followUpNeeded" => FieldKind::Flag,
            _ => return None,
        };
        Some(kind)
    }
}
