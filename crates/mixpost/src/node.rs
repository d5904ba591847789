//! Operation dispatcher
//!
//! Runs one [`Operation`] over a batch of host input records. Records are processed
//! strictly in order, one request at a time, and every record contributes zero or more
//! output records. The only exception is account listing, which runs once per batch.

use std::collections::BTreeMap;

use mixpost_core::operation::Operation;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::binary::BinaryData;
use crate::client::MixpostClient;
use crate::params::ItemParams;
use crate::prelude::*;

/// One host input record: resolved field values plus named binary attachments
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputItem {
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub binary: BTreeMap<String, BinaryData>,
}

impl InputItem {
    pub fn with_params(params: Value) -> Self {
        Self {
            params: match params {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            binary: BTreeMap::new(),
        }
    }
}

/// Failure of one record, tagged with its position in the batch
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct ExecutionError {
    pub item_index: usize,
    #[source]
    pub error: Error,
}

pub struct Dispatcher<'a> {
    client: &'a MixpostClient,
    continue_on_fail: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(client: &'a MixpostClient) -> Self {
        Self {
            client,
            continue_on_fail: false,
        }
    }

    /// Turn record failures into `{"error": ...}` output records instead of stopping
    pub fn continue_on_fail(mut self, enabled: bool) -> Self {
        self.continue_on_fail = enabled;
        self
    }

    pub async fn execute(
        &self,
        operation: Operation,
        items: &[InputItem],
    ) -> std::result::Result<Vec<Value>, ExecutionError> {
        log::debug!("executing {operation} over {} item(s)", items.len());

        if operation.runs_once() {
            return match crate::accounts::list_accounts_data(self.client).await {
                Ok(records) => Ok(records),
                Err(error) => self.recover(0, error).map(|record| vec![record]),
            };
        }

        let mut output = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.execute_item(operation, item).await {
                Ok(records) => output.extend(records),
                Err(error) => output.push(self.recover(index, error)?),
            }
        }

        Ok(output)
    }

    fn recover(&self, item_index: usize, error: Error) -> std::result::Result<Value, ExecutionError> {
        if !self.continue_on_fail {
            return Err(ExecutionError { item_index, error });
        }

        log::warn!("item {item_index} failed, continuing: {error}");
        Ok(error_record(&error))
    }

    async fn execute_item(&self, operation: Operation, item: &InputItem) -> ApiResult<Vec<Value>> {
        use crate::{accounts, media, posts};

        let params = ItemParams::new(item.params.clone());
        let client = self.client;

        match operation {
            Operation::CreatePost => posts::create_post_data(client, &params).await.map(single),
            Operation::ListPosts => posts::list_posts_data(client, &params).await,
            Operation::GetPost => posts::get_post_data(client, &params).await.map(single),
            Operation::UpdatePost => posts::update_post_data(client, &params).await.map(single),
            Operation::DeletePost => posts::delete_post_data(client, &params).await.map(single),
            Operation::PublishPost => posts::publish_post_data(client, &params).await.map(single),
            Operation::UploadMedia => media::upload_media_data(client, &params, &item.binary)
                .await
                .map(single),
            Operation::DownloadMediaUrl => media::download_media_url_data(client, &params)
                .await
                .map(single),
            Operation::ListMedia => media::list_media_data(client, &params).await,
            Operation::ListAccounts => accounts::list_accounts_data(client).await,
        }
    }
}

/// A response that carries no body still yields one (empty) output record
fn single(response: Value) -> Vec<Value> {
    match response {
        Value::Null => vec![json!({})],
        other => vec![other],
    }
}

/// Output record emitted for a failed item under continue-on-fail
pub fn error_record(error: &Error) -> Value {
    let mut record = json!({ "error": error.to_string() });
    if let Some(description) = error.description() {
        record["description"] = Value::String(description.to_string());
    }
    record
}
