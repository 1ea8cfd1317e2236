use apptrack_lib::domain::entities::{Application, FieldPatch, Interview, PreparationSession, Record};
use apptrack_lib::domain::value_objects::{RecordId, UserId};
use serde_json::json;
use std::sync::{Arc, Mutex};

pub fn user() -> UserId {
    UserId::new("user-1".to_string()).unwrap()
}

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

pub fn interview(id: i64, application_id: i64, status: &str) -> Interview {
    serde_json::from_value(json!({
        "id": id,
        "userId": "user-1",
        "applicationId": application_id,
        "interviewStage": "HR Round",
        "status": status,
        "createdAt": "2024-05-01T09:00:00Z",
        "updatedAt": "2024-05-01T09:00:00Z"
    }))
    .unwrap()
}

pub fn preparation(id: i64, date: &str, score: u8) -> PreparationSession {
    serde_json::from_value(json!({
        "id": id,
        "userId": "user-1",
        "date": date,
        "topic": "Behavioral",
        "confidenceScore": score,
        "createdAt": "2024-05-01T09:00:00Z"
    }))
    .unwrap()
}

/// モックのクロージャ間で共有するサーバー側の行
#[derive(Clone)]
pub struct ServerRows<T>(Arc<Mutex<Vec<T>>>);

impl<T: Record> ServerRows<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self(Arc::new(Mutex::new(rows)))
    }

    pub fn snapshot(&self) -> Vec<T> {
        self.0.lock().unwrap().clone()
    }

    pub fn apply(&self, id: RecordId, patch: &FieldPatch) -> T {
        let mut rows = self.0.lock().unwrap();
        let row = rows.iter_mut().find(|row| row.id() == id).unwrap();
        *row = row.apply_patch(patch).unwrap();
        row.clone()
    }
}
