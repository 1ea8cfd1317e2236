//! ユニットテスト用のインメモリ実装
use crate::application::ports::{Notification, Notifier, RecordApi};
use crate::domain::entities::{Application, ApplicationDraft, FieldPatch, Record};
use crate::domain::value_objects::{QueryKey, RecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn application(id: i64, company: &str) -> Application {
    serde_json::from_value(json!({
        "id": id,
        "userId": "user-1",
        "dateApplied": "2024-05-01",
        "companyName": company,
        "roleTitle": "Product Manager",
        "jobStatus": "Applied",
        "applicationStage": "In Review",
        "createdAt": "2024-05-01T09:00:00Z",
        "updatedAt": "2024-05-01T09:00:00Z"
    }))
    .unwrap()
}

pub fn application_draft(company: &str) -> ApplicationDraft {
    let app = application(1, company);
    ApplicationDraft {
        date_applied: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
        company_name: app.company_name,
        role_title: app.role_title,
        role_url: None,
        job_status: app.job_status,
        application_stage: app.application_stage,
        resume_version: None,
        mode_of_application: None,
        follow_up_date: None,
    }
}

/// 一時停止した時計の下で、実行可能なタスクをすべて走らせる
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

#[derive(Default)]
struct ApiState {
    rows: Vec<Application>,
    updates: Vec<(RecordId, FieldPatch)>,
    fail_update: Option<AppError>,
    fail_delete: Option<AppError>,
}

#[derive(Default)]
pub struct InMemoryApplicationApi {
    state: Mutex<ApiState>,
    latency: Option<Duration>,
    list_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl InMemoryApplicationApi {
    pub fn with_rows(rows: Vec<Application>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().rows = rows;
        api
    }

    /// 更新リクエストに遅延を入れる
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next_update(&self, err: AppError) {
        self.state.lock().unwrap().fail_update = Some(err);
    }

    pub fn fail_next_delete(&self, err: AppError) {
        self.state.lock().unwrap().fail_delete = Some(err);
    }

    pub fn updates(&self) -> Vec<(RecordId, FieldPatch)> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordApi<Application> for InMemoryApplicationApi {
    async fn list(&self, _key: &QueryKey) -> Result<Vec<Application>, AppError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().rows.clone())
    }

    async fn create(&self, draft: &ApplicationDraft) -> Result<Application, AppError> {
        let mut state = self.state.lock().unwrap();
        let next_id = state.rows.iter().map(|row| row.id.value()).max().unwrap_or(0) + 1;
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap();
        let row = Application {
            id: RecordId::from(next_id),
            user_id: crate::domain::value_objects::UserId::new("user-1".into()).unwrap(),
            date_applied: draft.date_applied,
            company_name: draft.company_name.clone(),
            role_title: draft.role_title.clone(),
            role_url: draft.role_url.clone(),
            job_status: draft.job_status,
            application_stage: draft.application_stage,
            resume_version: draft.resume_version.clone(),
            mode_of_application: draft.mode_of_application,
            follow_up_date: draft.follow_up_date,
            created_at: now,
            updated_at: now,
        };
        state.rows.insert(0, row.clone());
        Ok(row)
    }

    async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<Application, AppError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.state.lock().unwrap().updates.push((id, patch.clone()));

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = {
            let mut state = self.state.lock().unwrap();
            match state.fail_update.take() {
                Some(err) => Err(err),
                None => match state.rows.iter_mut().find(|row| row.id == id) {
                    Some(row) => row.apply_patch(patch).map(|patched| {
                        *row = patched.clone();
                        patched
                    }),
                    None => Err(AppError::NotFound(format!("application {id}"))),
                },
            }
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.fail_delete.take() {
            return Err(err);
        }
        state.rows.retain(|row| row.id != id);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().unwrap())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}
