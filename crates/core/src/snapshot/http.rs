//! HTTP snapshot source.
//!
//! Posts the [`SnapshotQuery`] as a JSON body and expects a JSON array of
//! task records in return.

use super::SnapshotSource;
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use tw_protocol::task_models::{SnapshotQuery, Task};
use url::Url;

pub struct HttpSnapshotSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpSnapshotSource {
    /// Create a source posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns an error if `endpoint` is not a valid URL or the HTTP client
    /// cannot be built.
    pub fn new(endpoint: &str, timeout: Duration) -> SyncResult<Self> {
        let endpoint = Url::parse(endpoint).map_err(|source| SyncError::InvalidUrl {
            url: endpoint.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self, query: &SnapshotQuery) -> SyncResult<Vec<Task>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                url: self.endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let records: Vec<Value> =
            serde_json::from_slice(&body).map_err(|e| SyncError::Decode {
                what: "snapshot response".to_string(),
                reason: e.to_string(),
            })?;

        Ok(decode_tasks(records))
    }
}

/// Records that do not decode as tasks are dropped one by one, so a single
/// odd record cannot hide the rest of the batch.
fn decode_tasks(records: Vec<Value>) -> Vec<Task> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                debug!(error = %e, "dropping undecodable snapshot record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let result = HttpSnapshotSource::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(SyncError::InvalidUrl { .. })));
    }

    #[test]
    fn test_decode_tasks_drops_bad_records_only() {
        let records = vec![
            serde_json::json!({ "id": "t1", "created": "2013-01-23T13:42:42.000+0200" }),
            serde_json::json!({ "id": "t2", "created": "last tuesday" }),
            serde_json::json!({ "name": "no id", "created": 0 }),
            serde_json::json!({ "id": "t3", "created": 0 }),
        ];

        let tasks = decode_tasks(records);

        let ids: Vec<_> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t3"]);
    }

    #[test]
    fn test_keeps_endpoint() {
        let source =
            HttpSnapshotSource::new("http://localhost:8080/tasks", Duration::from_secs(1)).unwrap();
        assert_eq!(source.endpoint().path(), "/tasks");
    }
}
