use crate::application::ports::{Notifier, RecordApi};
use crate::application::services::{
    CacheRead, DialogController, QueryCache, RecordSyncService, WriteCoalescer,
};
use crate::domain::entities::{
    Application, Assessment, DashboardStats, Interview, PreparationSession, Record,
};
use crate::domain::value_objects::{QueryKey, UserId};
use crate::infrastructure::auth::SessionCredentialStore;
use crate::infrastructure::http::{HttpRecordApi, RestClient};
use crate::infrastructure::notification::BroadcastNotifier;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// レコード種別ごとのキャッシュ・同期サービス・書き込みキュー
pub struct RecordStore<T: Record> {
    pub cache: Arc<QueryCache<T>>,
    pub sync: RecordSyncService<T>,
    pub writes: WriteCoalescer<T>,
}

impl<T: Record> RecordStore<T> {
    pub fn new(api: Arc<dyn RecordApi<T>>, notifier: Arc<dyn Notifier>, debounce: Duration) -> Self {
        let cache = Arc::new(QueryCache::new());
        let sync = RecordSyncService::new(api, Arc::clone(&cache), notifier);
        let writes = WriteCoalescer::new(sync.clone(), debounce);
        Self {
            cache,
            sync,
            writes,
        }
    }

    pub fn key(&self, user_id: &UserId) -> QueryKey {
        T::query_key(user_id)
    }

    pub async fn read(&self, user_id: &UserId) -> CacheRead<T> {
        self.cache.read(&self.key(user_id)).await
    }

    /// 作成ダイアログを開く
    pub fn open_dialog(&self, user_id: &UserId) -> DialogController<T> {
        DialogController::open(self.sync.clone(), self.key(user_id))
    }

    async fn teardown(&self) {
        self.writes.flush().await;
        self.cache.clear().await;
    }
}

/// 外部 API の実装一式
pub struct RecordApis {
    pub applications: Arc<dyn RecordApi<Application>>,
    pub interviews: Arc<dyn RecordApi<Interview>>,
    pub preparation_sessions: Arc<dyn RecordApi<PreparationSession>>,
    pub assessments: Arc<dyn RecordApi<Assessment>>,
}

impl RecordApis {
    pub fn http(client: &RestClient) -> Self {
        Self {
            applications: Arc::new(HttpRecordApi::<Application>::new(client.clone())),
            interviews: Arc::new(HttpRecordApi::<Interview>::new(client.clone())),
            preparation_sessions: Arc::new(HttpRecordApi::<PreparationSession>::new(client.clone())),
            assessments: Arc::new(HttpRecordApi::<Assessment>::new(client.clone())),
        }
    }
}

/// アプリケーション全体の状態を管理する構造体
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub credentials: Arc<SessionCredentialStore>,
    pub notifier: Arc<BroadcastNotifier>,
    pub applications: Arc<RecordStore<Application>>,
    pub interviews: Arc<RecordStore<Interview>>,
    pub preparation_sessions: Arc<RecordStore<PreparationSession>>,
    pub assessments: Arc<RecordStore<Assessment>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let credentials = Arc::new(SessionCredentialStore::new(config.api.access_token.clone()));
        let client = RestClient::new(&config.api, credentials.clone())?;
        let apis = RecordApis::http(&client);

        info!("API base URL: {}", client.base_url());
        Ok(Self::from_parts(config, credentials, apis))
    }

    pub fn from_parts(
        config: AppConfig,
        credentials: Arc<SessionCredentialStore>,
        apis: RecordApis,
    ) -> Self {
        let notifier = Arc::new(BroadcastNotifier::new());
        let debounce = Duration::from_millis(config.sync.debounce_ms);
        let shared: Arc<dyn Notifier> = notifier.clone();

        Self {
            config: Arc::new(config),
            credentials,
            applications: Arc::new(RecordStore::new(apis.applications, shared.clone(), debounce)),
            interviews: Arc::new(RecordStore::new(apis.interviews, shared.clone(), debounce)),
            preparation_sessions: Arc::new(RecordStore::new(
                apis.preparation_sessions,
                shared.clone(),
                debounce,
            )),
            assessments: Arc::new(RecordStore::new(apis.assessments, shared, debounce)),
            notifier,
        }
    }

    /// ダッシュボード用の集計。必要な一覧を並行して読み込む。
    pub async fn dashboard(&self, user_id: &UserId, today: NaiveDate) -> Result<DashboardStats, AppError> {
        let application_key = self.applications.key(user_id);
        let interview_key = self.interviews.key(user_id);
        let session_key = self.preparation_sessions.key(user_id);

        let (applications, interviews, sessions) = futures::try_join!(
            self.applications.sync.load(&application_key),
            self.interviews.sync.load(&interview_key),
            self.preparation_sessions.sync.load(&session_key),
        )?;

        Ok(DashboardStats::compute(
            &applications,
            &interviews,
            &sessions,
            today,
        ))
    }

    /// 保留中の書き込みを送り切ってからキャッシュと認証情報を破棄する
    pub async fn logout(&self) {
        futures::join!(
            self.applications.teardown(),
            self.interviews.teardown(),
            self.preparation_sessions.teardown(),
            self.assessments.teardown(),
        );
        self.credentials.clear().await;
        info!("Logged out; caches cleared");
    }
}
