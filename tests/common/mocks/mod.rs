use apptrack_lib::application::ports::{CredentialProvider, Notification, Notifier, RecordApi};
use apptrack_lib::domain::entities::{
    Application, ApplicationDraft, Assessment, AssessmentDraft, FieldPatch, Interview,
    InterviewDraft, PreparationSession, PreparationSessionDraft,
};
use apptrack_lib::domain::value_objects::{QueryKey, RecordId};
use apptrack_lib::shared::error::AppError;
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub ApplicationApi {}

    #[async_trait]
    impl RecordApi<Application> for ApplicationApi {
        async fn list(&self, key: &QueryKey) -> Result<Vec<Application>, AppError>;
        async fn create(&self, draft: &ApplicationDraft) -> Result<Application, AppError>;
        async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<Application, AppError>;
        async fn delete(&self, id: RecordId) -> Result<(), AppError>;
    }
}

mock! {
    pub InterviewApi {}

    #[async_trait]
    impl RecordApi<Interview> for InterviewApi {
        async fn list(&self, key: &QueryKey) -> Result<Vec<Interview>, AppError>;
        async fn create(&self, draft: &InterviewDraft) -> Result<Interview, AppError>;
        async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<Interview, AppError>;
        async fn delete(&self, id: RecordId) -> Result<(), AppError>;
    }
}

mock! {
    pub PreparationApi {}

    #[async_trait]
    impl RecordApi<PreparationSession> for PreparationApi {
        async fn list(&self, key: &QueryKey) -> Result<Vec<PreparationSession>, AppError>;
        async fn create(&self, draft: &PreparationSessionDraft) -> Result<PreparationSession, AppError>;
        async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<PreparationSession, AppError>;
        async fn delete(&self, id: RecordId) -> Result<(), AppError>;
    }
}

mock! {
    pub AssessmentApi {}

    #[async_trait]
    impl RecordApi<Assessment> for AssessmentApi {
        async fn list(&self, key: &QueryKey) -> Result<Vec<Assessment>, AppError>;
        async fn create(&self, draft: &AssessmentDraft) -> Result<Assessment, AppError>;
        async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<Assessment, AppError>;
        async fn delete(&self, id: RecordId) -> Result<(), AppError>;
    }
}

mock! {
    pub Credentials {}

    #[async_trait]
    impl CredentialProvider for Credentials {
        async fn bearer_token(&self) -> Option<String>;
    }
}

mock! {
    pub Notifier {}

    impl Notifier for Notifier {
        fn notify(&self, notification: Notification);
    }
}
