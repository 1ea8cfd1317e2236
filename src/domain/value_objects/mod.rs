pub mod field_domain;
pub mod query_key;
pub mod record_id;
pub mod rollback_token;
pub mod score;
pub mod user_id;

pub use field_domain::{
    all_domains, ApplicationStage, DifficultyLevel, FieldDomain, InterviewStage, InterviewStatus,
    JobStatus, ModeOfApplication, PreparationTopic, APPLICATION_STAGE, DIFFICULTY_LEVEL,
    INTERVIEW_STAGE, INTERVIEW_STATUS, JOB_STATUS, MODE_OF_APPLICATION, PREPARATION_TOPIC,
};
pub use query_key::QueryKey;
pub use record_id::RecordId;
pub use rollback_token::RollbackToken;
pub use score::Score;
pub use user_id::UserId;
