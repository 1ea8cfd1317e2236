pub mod application;
pub mod assessment;
pub mod dashboard_stats;
pub mod field_patch;
pub mod interview;
pub mod preparation_session;
pub mod record;

pub use application::{Application, ApplicationDraft};
pub use assessment::{Assessment, AssessmentDraft};
pub use dashboard_stats::{confidence_trends, ConfidenceTrend, DashboardStats};
pub use field_patch::FieldPatch;
pub use interview::{Interview, InterviewDraft};
pub use preparation_session::{PreparationSession, PreparationSessionDraft};
pub use record::{FieldKind, Record};
