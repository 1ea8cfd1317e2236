#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use apptrack_lib::application::ports::RecordApi;
use apptrack_lib::domain::entities::{Application, Assessment, Interview, PreparationSession};
use apptrack_lib::infrastructure::auth::SessionCredentialStore;
use apptrack_lib::state::{AppState, RecordApis};
use apptrack_lib::AppConfig;
use mocks::{MockApplicationApi, MockAssessmentApi, MockInterviewApi, MockPreparationApi};
use std::sync::Arc;
use std::time::Duration;

pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// 一時停止した時計の下で、実行可能なタスクをすべて走らせる
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

fn empty_applications() -> Arc<dyn RecordApi<Application>> {
    let mut api = MockApplicationApi::new();
    api.expect_list().returning(|_| Ok(Vec::new()));
    Arc::new(api)
}

fn empty_interviews() -> Arc<dyn RecordApi<Interview>> {
    let mut api = MockInterviewApi::new();
    api.expect_list().returning(|_| Ok(Vec::new()));
    Arc::new(api)
}

fn empty_preparation() -> Arc<dyn RecordApi<PreparationSession>> {
    let mut api = MockPreparationApi::new();
    api.expect_list().returning(|_| Ok(Vec::new()));
    Arc::new(api)
}

fn empty_assessments() -> Arc<dyn RecordApi<Assessment>> {
    let mut api = MockAssessmentApi::new();
    api.expect_list().returning(|_| Ok(Vec::new()));
    Arc::new(api)
}

pub struct StateBuilder {
    applications: Option<Arc<dyn RecordApi<Application>>>,
    interviews: Option<Arc<dyn RecordApi<Interview>>>,
    preparation_sessions: Option<Arc<dyn RecordApi<PreparationSession>>>,
    assessments: Option<Arc<dyn RecordApi<Assessment>>>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            applications: None,
            interviews: None,
            preparation_sessions: None,
            assessments: None,
        }
    }

    pub fn applications(mut self, api: impl RecordApi<Application> + 'static) -> Self {
        let api: Arc<dyn RecordApi<Application>> = Arc::new(api);
        self.applications = Some(api);
        self
    }

    pub fn interviews(mut self, api: impl RecordApi<Interview> + 'static) -> Self {
        let api: Arc<dyn RecordApi<Interview>> = Arc::new(api);
        self.interviews = Some(api);
        self
    }

    pub fn preparation_sessions(mut self, api: impl RecordApi<PreparationSession> + 'static) -> Self {
        let api: Arc<dyn RecordApi<PreparationSession>> = Arc::new(api);
        self.preparation_sessions = Some(api);
        self
    }

    pub fn build(self) -> AppState {
        let mut config = AppConfig::default();
        config.sync.debounce_ms = DEBOUNCE.as_millis() as u64;

        let apis = RecordApis {
            applications: self.applications.unwrap_or_else(empty_applications),
            interviews: self.interviews.unwrap_or_else(empty_interviews),
            preparation_sessions: self
                .preparation_sessions
                .unwrap_or_else(empty_preparation),
            assessments: self.assessments.unwrap_or_else(empty_assessments),
        };
        let credentials = Arc::new(SessionCredentialStore::new(Some("token".into())));
        AppState::from_parts(config, credentials, apis)
    }
}
