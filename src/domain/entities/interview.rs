use super::record::{FieldKind, Record};
use crate::domain::value_objects::{
    InterviewStage, InterviewStatus, RecordId, Score, UserId, INTERVIEW_STAGE, INTERVIEW_STATUS,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: RecordId,
    pub user_id: UserId,
    pub application_id: RecordId,
    pub interview_stage: InterviewStage,
    #[serde(default)]
    pub interview_date: Option<DateTime<Utc>>,
    pub status: InterviewStatus,
    #[serde(default)]
    pub prep_resources: Option<String>,
    #[serde(default)]
    pub assigned_tasks: Option<String>,
    #[serde(default)]
    pub feedback_notes: Option<String>,
    #[serde(default)]
    pub interview_score: Option<Score>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDraft {
    pub application_id: RecordId,
    pub interview_stage: InterviewStage,
    pub interview_date: Option<DateTime<Utc>>,
    pub status: InterviewStatus,
    pub prep_resources: Option<String>,
    pub assigned_tasks: Option<String>,
    pub feedback_notes: Option<String>,
    pub interview_score: Option<Score>,
}

impl Record for Interview {
    type Draft = InterviewDraft;

    const RESOURCE: &'static str = "interviews";

    fn id(&self) -> RecordId {
        self.id
    }

    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn field_kind(field: &str) -> Option<FieldKind> {
        let kind = match field {
            "applicationId" => FieldKind::Reference,
            "interviewStage" => FieldKind::Enum {
                domain: &INTERVIEW_STAGE,
                required: true,
            },
            "interviewDate" => FieldKind::Timestamp,
            "status" => FieldKind::Enum {
                domain: &INTERVIEW_STATUS,
                required: true,
            },
            "prepResources" | "assignedTasks" | "feedbackNotes" => {
                FieldKind::Text { required: false }
            }
            "interviewScore" => FieldKind::Score,
            _ => return None,
        };
        Some(kind)
    }
}
