use super::record::{FieldKind, Record};
use crate::domain::value_objects::{
    ApplicationStage, JobStatus, ModeOfApplication, RecordId, UserId, APPLICATION_STAGE,
    JOB_STATUS, MODE_OF_APPLICATION,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 求人への応募
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: RecordId,
    pub user_id: UserId,
    pub date_applied: NaiveDate,
    pub company_name: String,
    pub role_title: String,
    #[serde(default)]
    pub role_url: Option<String>,
    pub job_status: JobStatus,
    pub application_stage: ApplicationStage,
    #[serde(default)]
    pub resume_version: Option<String>,
    #[serde(default)]
    pub mode_of_application: Option<ModeOfApplication>,
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDraft {
    pub date_applied: NaiveDate,
    pub company_name: String,
    pub role_title: String,
    pub role_url: Option<String>,
    pub job_status: JobStatus,
    pub application_stage: ApplicationStage,
    pub resume_version: Option<String>,
    pub mode_of_application: Option<ModeOfApplication>,
    pub follow_up_date: Option<NaiveDate>,
}

impl Application {
    /// 面接中とみなすステージか（一覧の "interviewing" フィルタ用）
    pub fn is_interviewing(&self) -> bool {
        self.job_status == JobStatus::Interviewing
            || matches!(
                self.application_stage,
                ApplicationStage::HrRound
                    | ApplicationStage::HiringManagerRound
                    | ApplicationStage::CaseStudy
                    | ApplicationStage::PanelInterview
                    | ApplicationStage::FinalRound
            )
    }
}

impl Record for Application {
    type Draft = ApplicationDraft;

    const RESOURCE: &'static str = "applications";

    fn id(&self) -> RecordId {
        self.id
    }

    fn user_id(&self) -> &UserId {
        &self.user_id
    }

    fn field_kind(field: &str) -> Option<FieldKind> {
        let kind = match field {
            "dateApplied" => FieldKind::Date { required: true },
            "companyName" | "roleTitle" => FieldKind::Text { required: true },
            "roleUrl" | "resumeVersion" => FieldKind::Text { required: false },
            "jobStatus" => FieldKind::Enum {
                domain: &JOB_STATUS,
                required: true,
            },
            "applicationStage" => FieldKind::Enum {
                domain: &APPLICATION_STAGE,
                required: true,
            },
            "modeOfApplication" => FieldKind::Enum {
                domain: &MODE_OF_APPLICATION,
                required: false,
            },
            "followUpDate" => FieldKind::Date { required: false },
            _ => return None,
        };
        Some(kind)
    }
}
