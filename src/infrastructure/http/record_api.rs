use super::rest_client::RestClient;
use crate::application::ports::RecordApi;
use crate::domain::entities::{FieldPatch, Record};
use crate::domain::value_objects::{QueryKey, RecordId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use std::marker::PhantomData;
use tracing::warn;

/// 一覧レスポンス。配列そのものか、ページング付きのオブジェクト。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Rows(Vec<T>),
    Page {
        #[serde(alias = "applications", alias = "data")]
        items: Vec<T>,
    },
}

impl<T> ListBody<T> {
    fn into_rows(self) -> Vec<T> {
        match self {
            ListBody::Rows(rows) | ListBody::Page { items: rows } => rows,
        }
    }
}

/// `/api/{resource}` を叩く `RecordApi` 実装
pub struct HttpRecordApi<T> {
    client: RestClient,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> HttpRecordApi<T> {
    pub fn new(client: RestClient) -> Self {
        Self {
            client,
            _record: PhantomData,
        }
    }

    fn collection_path() -> String {
        format!("/api/{}", T::RESOURCE)
    }

    fn item_path(id: RecordId) -> String {
        format!("/api/{}/{}", T::RESOURCE, id)
    }
}

#[async_trait]
impl<T: Record> RecordApi<T> for HttpRecordApi<T> {
    async fn list(&self, key: &QueryKey) -> Result<Vec<T>, AppError> {
        let body: ListBody<T> = self.client.get_json(&Self::collection_path()).await?;
        let rows = body.into_rows();
        let total = rows.len();
        // サーバーはセッションのユーザー分だけ返すが、キー外の行は念のため除く
        let rows: Vec<T> = rows
            .into_iter()
            .filter(|row| row.user_id() == key.user_id())
            .collect();
        if rows.len() != total {
            warn!(
                "Dropped {} {} row(s) not owned by {}",
                total - rows.len(),
                T::RESOURCE,
                key.user_id()
            );
        }
        Ok(rows)
    }

    async fn create(&self, draft: &T::Draft) -> Result<T, AppError> {
        self.client.post_json(&Self::collection_path(), draft).await
    }

    async fn update(&self, id: RecordId, patch: &FieldPatch) -> Result<T, AppError> {
        self.client.put_json(&Self::item_path(id), patch).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), AppError> {
        self.client.delete(&Self::item_path(id)).await
    }
}
