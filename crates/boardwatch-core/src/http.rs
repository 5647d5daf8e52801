//! HTTP fetch port against the caching backend

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::models::{ActivityResponse, BoardId, BoardsResponse, CacheInfoMap};
use crate::sync::FetchPort;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct BoardsRequest<'a> {
    board_ids: &'a [BoardId],
    force_refresh: bool,
}

#[derive(Debug, Serialize)]
struct ActivityRequest<'a> {
    board_ids: &'a [BoardId],
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClearCacheRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    board_id: Option<&'a BoardId>,
}

/// [`FetchPort`] over `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetchPort {
    client: Client,
    base_url: String,
}

impl HttpFetchPort {
    pub fn new(config: &DashboardConfig) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CoreError::invalid_config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn decode<T: DeserializeOwned>(operation: &str, response: Response) -> Result<T, CoreError> {
        let response = Self::check_status(operation, response)?;
        response
            .json::<T>()
            .await
            .map_err(|e| CoreError::from_transport(operation, e))
    }

    fn check_status(operation: &str, response: Response) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(CoreError::network(operation, format!("HTTP {status}")))
        }
    }
}

fn format_since(since: DateTime<Utc>) -> String {
    since.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl FetchPort for HttpFetchPort {
    async fn fetch_boards(
        &self,
        ids: &[BoardId],
        force_refresh: bool,
    ) -> Result<BoardsResponse, CoreError> {
        const OP: &str = "Fetch boards";
        tracing::debug!(boards = ids.len(), force_refresh, "POST /boards");

        let response = self
            .client
            .post(self.url("boards"))
            .json(&BoardsRequest {
                board_ids: ids,
                force_refresh,
            })
            .send()
            .await
            .map_err(|e| CoreError::from_transport(OP, e))?;
        Self::decode(OP, response).await
    }

    async fn fetch_activities(
        &self,
        ids: &[BoardId],
        since: Option<DateTime<Utc>>,
    ) -> Result<ActivityResponse, CoreError> {
        const OP: &str = "Fetch activities";
        tracing::debug!(boards = ids.len(), since = ?since, "POST /boards/activity");

        let response = self
            .client
            .post(self.url("boards/activity"))
            .json(&ActivityRequest {
                board_ids: ids,
                since: since.map(format_since),
            })
            .send()
            .await
            .map_err(|e| CoreError::from_transport(OP, e))?;
        Self::decode(OP, response).await
    }

    async fn clear_cache(&self, board_id: Option<&BoardId>) -> Result<(), CoreError> {
        const OP: &str = "Clear cache";

        let response = self
            .client
            .post(self.url("cache/clear"))
            .json(&ClearCacheRequest { board_id })
            .send()
            .await
            .map_err(|e| CoreError::from_transport(OP, e))?;
        Self::check_status(OP, response).map(|_| ())
    }

    async fn get_cache_info(&self) -> Result<CacheInfoMap, CoreError> {
        const OP: &str = "Get cache info";

        let response = self
            .client
            .get(self.url("cache/info"))
            .send()
            .await
            .map_err(|e| CoreError::from_transport(OP, e))?;
        Self::decode(OP, response).await
    }

    async fn health_check(&self) -> Result<(), CoreError> {
        const OP: &str = "Health check";

        let response = self
            .client
            .get(self.url("health"))
            .send()
            .await
            .map_err(|e| CoreError::from_transport(OP, e))?;
        Self::check_status(OP, response).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_url_joining() {
        let config = DashboardConfig {
            api_base_url: "http://localhost:5000/api/".to_string(),
            ..DashboardConfig::default()
        };
        let port = HttpFetchPort::new(&config).unwrap();
        assert_eq!(port.base_url(), "http://localhost:5000/api");
        assert_eq!(port.url("boards/activity"), "http://localhost:5000/api/boards/activity");
        assert_eq!(port.url("/health"), "http://localhost:5000/api/health");
    }

    #[test]
    fn test_request_bodies() {
        let ids = vec![BoardId::from("b1"), BoardId::from("b2")];

        let boards = serde_json::to_value(BoardsRequest {
            board_ids: &ids,
            force_refresh: true,
        })
        .unwrap();
        assert_eq!(boards, json!({"board_ids": ["b1", "b2"], "force_refresh": true}));

        let activity = serde_json::to_value(ActivityRequest {
            board_ids: &ids,
            since: None,
        })
        .unwrap();
        assert_eq!(activity, json!({"board_ids": ["b1", "b2"]}));

        let clear_all = serde_json::to_value(ClearCacheRequest { board_id: None }).unwrap();
        assert_eq!(clear_all, json!({}));
    }

    #[test]
    fn test_since_format() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(format_since(since), "2024-03-01T12:30:00.000Z");
    }
}
