mod common;

use apptrack_lib::application::ports::NotificationLevel;
use apptrack_lib::application::services::{QueryCache, RecordSyncService};
use apptrack_lib::domain::entities::{Application, FieldPatch, Record};
use apptrack_lib::domain::value_objects::{all_domains, JobStatus, RecordId};
use apptrack_lib::shared::error::AppError;
use common::fixtures::{application, interview, preparation, user, ServerRows};
use common::mocks::{MockApplicationApi, MockInterviewApi, MockNotifier, MockPreparationApi};
use common::{settle, StateBuilder};
use chrono::NaiveDate;
use mockall::predicate::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn server_backed_api(server: &ServerRows<Application>) -> MockApplicationApi {
    let mut api = MockApplicationApi::new();
    let rows = server.clone();
    api.expect_list().returning(move |_| Ok(rows.snapshot()));
    api
}

#[tokio::test]
async fn failed_write_restores_identical_snapshot() {
    let server = ServerRows::new(vec![application(1, "Google")]);
    let mut api = server_backed_api(&server);
    api.expect_update()
        .times(1)
        .returning(|_, _| Err(AppError::server(500, "database unavailable", None)));

    let state = StateBuilder::new().applications(api).build();
    let mut notifications = state.notifier.subscribe();
    let store = &state.applications;
    let key = store.key(&user());

    let before = store.sync.load(&key).await.unwrap();
    let err = store
        .sync
        .update_field(&key, RecordId::from(1), "jobStatus", json!("Interviewing"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "server_error");

    let after = store.read(&user()).await.ready().unwrap();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after[0].job_status, JobStatus::Applied);

    let notification = notifications.recv().await.unwrap();
    assert_eq!(notification.level, NotificationLevel::Error);
    assert!(notification.description.contains("database unavailable"));
}

#[tokio::test(start_paused = true)]
async fn failure_on_one_row_leaves_the_other_row_patched() {
    let server = ServerRows::new(vec![application(1, "Google"), application(2, "Meta")]);
    let mut api = server_backed_api(&server);
    api.expect_update()
        .with(eq(RecordId::from(1)), always())
        .times(1)
        .returning(|_, _| Err(AppError::Network("connection reset".into())));
    let rows = server.clone();
    api.expect_update()
        .with(eq(RecordId::from(2)), always())
        .times(1)
        .returning(move |id, patch| Ok(rows.apply(id, patch)));

    let state = StateBuilder::new().applications(api).build();
    let store = &state.applications;
    let key = store.key(&user());
    store.sync.load(&key).await.unwrap();

    store
        .writes
        .schedule(&key, RecordId::from(1), "jobStatus", json!("Offer"))
        .await
        .unwrap();
    store
        .writes
        .schedule(&key, RecordId::from(2), "companyName", json!("Meta Platforms"))
        .await
        .unwrap();

    let optimistic = store.read(&user()).await.ready().unwrap();
    assert_eq!(optimistic[0].job_status, JobStatus::Offer);
    assert_eq!(optimistic[1].company_name, "Meta Platforms");

    tokio::time::sleep(Duration::from_millis(600)).await;
    settle().await;

    let settled = store.read(&user()).await.ready().unwrap();
    assert_eq!(settled[0].job_status, JobStatus::Applied);
    assert_eq!(settled[1].company_name, "Meta Platforms");
    assert_eq!(store.cache.pending_count(&key).await, 0);
}

#[tokio::test]
async fn every_domain_value_round_trips_and_outsiders_never_reach_the_network() {
    for domain in all_domains() {
        for value in domain.options() {
            assert!(domain.validate(value).is_ok(), "{} rejected {value}", domain.field);
        }
        let err = domain.validate("Not A Real Option").unwrap_err();
        assert_eq!(err.field(), Some(domain.field));
    }

    for status in JobStatus::ALL {
        let parsed: JobStatus = status.as_str().parse().unwrap();
        assert_eq!(&parsed, status);
        assert!(Application::validate_patch(&FieldPatch::single("jobStatus", json!(status.as_str()))).is_ok());
    }

    let mut api = MockApplicationApi::new();
    api.expect_list()
        .returning(|_| Ok(vec![application(1, "Google")]));
    api.expect_update().times(0);

    let state = StateBuilder::new().applications(api).build();
    let store = &state.applications;
    let key = store.key(&user());
    store.sync.load(&key).await.unwrap();

    let err = store
        .writes
        .schedule(&key, RecordId::from(1), "applicationStage", json!("Ghosted"))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.field(), Some("applicationStage"));
    assert_eq!(store.writes.pending_count().await, 0);
}

#[tokio::test]
async fn failed_delete_notifies_through_the_notifier_port() {
    let mut api = MockApplicationApi::new();
    api.expect_list()
        .returning(|_| Ok(vec![application(1, "Google")]));
    api.expect_delete()
        .with(eq(RecordId::from(1)))
        .times(1)
        .returning(|_| Err(AppError::NotFound("Application not found".into())));

    let mut notifier = MockNotifier::new();
    notifier
        .expect_notify()
        .withf(|notification| notification.level == NotificationLevel::Error)
        .times(1)
        .return_const(());

    let sync: RecordSyncService<Application> = RecordSyncService::new(
        Arc::new(api),
        Arc::new(QueryCache::new()),
        Arc::new(notifier),
    );
    let key = Application::query_key(&user());
    sync.load(&key).await.unwrap();

    assert!(sync.delete(&key, RecordId::from(1)).await.is_err());
    assert_eq!(sync.cache().read(&key).await.ready().unwrap().len(), 1);
}

#[tokio::test]
async fn dashboard_counts_come_from_cached_lists() {
    let mut offer = application(1, "Google");
    offer.job_status = JobStatus::Offer;
    let applications = vec![offer, application(2, "Meta"), application(3, "Stripe"), application(4, "Figma")];

    let mut application_api = MockApplicationApi::new();
    application_api
        .expect_list()
        .times(1)
        .returning(move |_| Ok(applications.clone()));

    let mut interview_api = MockInterviewApi::new();
    interview_api.expect_list().times(1).returning(|_| {
        Ok(vec![
            interview(1, 1, "Scheduled"),
            interview(2, 2, "Completed"),
            interview(3, 3, "Scheduled"),
        ])
    });

    let mut preparation_api = MockPreparationApi::new();
    preparation_api.expect_list().times(1).returning(|_| {
        Ok(vec![
            preparation(1, "2024-05-10", 3),
            preparation(2, "2024-05-09", 5),
            preparation(3, "2024-05-06", 4),
        ])
    });

    let state = StateBuilder::new()
        .applications(application_api)
        .interviews(interview_api)
        .preparation_sessions(preparation_api)
        .build();

    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
    let stats = state.dashboard(&user(), today).await.unwrap();
    assert_eq!(stats.total_applications, 4);
    assert_eq!(stats.active_interviews, 2);
    assert_eq!(stats.prep_streak, 2);
    assert_eq!(stats.success_rate, 25);

    // 2 回目はキャッシュから
    let again = state.dashboard(&user(), today).await.unwrap();
    assert_eq!(again, stats);
}
