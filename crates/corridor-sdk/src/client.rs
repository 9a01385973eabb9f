//! HTTP client for the corridor mission relay.

use anyhow::Result;
use chrono::{DateTime, Utc};
use corridor_core::{FinalRoute, MissionDescriptor, OffsetRouteResult, RouteVertex};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Client for a corridor server.
pub struct MissionClient {
    pub(crate) base_url: String,
    pub(crate) client: reqwest::Client,
}

/// Reply to `/update-mission`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionUpdate {
    pub status: String,
    pub message: String,
    pub updated_route_points: Vec<RouteVertex>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Reply to a successful `/compute-route`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeSummary {
    pub success: bool,
    pub points: usize,
    pub degraded_points: usize,
    pub run_id: String,
}

/// Reply to a successful `/process-route`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedRoute {
    #[serde(flatten)]
    pub summary: ComputeSummary,
    pub route_points: FinalRoute,
}

#[derive(Debug, Serialize)]
struct ComputeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

impl MissionClient {
    /// Create a new client. A trailing slash on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Check the server is up.
    pub async fn health(&self) -> Result<bool> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(response.status().is_success())
    }

    /// Store a mission on the relay.
    pub async fn update_mission(&self, mission: &MissionDescriptor) -> Result<MissionUpdate> {
        let response = self
            .client
            .post(self.url("/update-mission"))
            .json(mission)
            .send()
            .await?;
        let response = check(response, "update mission").await?;
        let update: MissionUpdate = response.json().await?;
        tracing::debug!("Relay stored {} route points", update.updated_route_points.len());
        Ok(update)
    }

    /// Fetch the mission currently stored on the relay.
    pub async fn get_mission(&self) -> Result<MissionDescriptor> {
        let response = self.client.get(self.url("/get-mission")).send().await?;
        let response = check(response, "get mission").await?;
        Ok(response.json().await?)
    }

    /// Replace the stored mission and return it as normalized by the relay.
    pub async fn replace_mission(&self, mission: &MissionDescriptor) -> Result<MissionDescriptor> {
        let response = self
            .client
            .post(self.url("/get-mission"))
            .json(mission)
            .send()
            .await?;
        let response = check(response, "replace mission").await?;
        Ok(response.json().await?)
    }

    /// Compute and publish the offset route for the stored mission.
    ///
    /// `None` uses the server's default offset.
    pub async fn compute_route(&self, offset: Option<f64>) -> Result<ComputeSummary> {
        let response = self
            .client
            .post(self.url("/compute-route"))
            .json(&ComputeRequest { offset })
            .send()
            .await?;
        let response = check(response, "compute route").await?;
        let summary: ComputeSummary = response.json().await?;
        tracing::info!(
            "Run {} produced {} points ({} degraded)",
            summary.run_id,
            summary.points,
            summary.degraded_points
        );
        Ok(summary)
    }

    /// Compute and publish the offset route and return its points in one call.
    pub async fn process_route(&self, offset: Option<f64>) -> Result<ProcessedRoute> {
        let response = self
            .client
            .post(self.url("/process-route"))
            .json(&ComputeRequest { offset })
            .send()
            .await?;
        let response = check(response, "process route").await?;
        let processed: ProcessedRoute = response.json().await?;
        tracing::info!(
            "Run {} returned {} points",
            processed.summary.run_id,
            processed.route_points.len()
        );
        Ok(processed)
    }

    /// Last published offset route, if any.
    pub async fn offset_route(&self) -> Result<Option<FinalRoute>> {
        self.artifact("/offset_route.json").await
    }

    /// Last published full result, if any.
    pub async fn overlay(&self) -> Result<Option<OffsetRouteResult>> {
        self.artifact("/mission_overlay.json").await
    }

    async fn artifact<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check(response, "fetch artifact").await?;
        Ok(Some(response.json().await?))
    }
}

/// Turn a non-success response into an error carrying the server's message.
async fn check(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(err) => anyhow::bail!("Failed to {}: {} ({})", action, err.error, status),
        Err(_) => anyhow::bail!("Failed to {}: {}", action, status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = MissionClient::new("http://localhost:5006//");
        assert_eq!(client.base_url(), "http://localhost:5006");
        assert_eq!(client.url("/compute-route"), "http://localhost:5006/compute-route");
        assert_eq!(client.url("get-mission"), "http://localhost:5006/get-mission");
    }

    #[test]
    fn compute_request_omits_missing_offset() {
        let body = serde_json::to_value(ComputeRequest { offset: None }).unwrap();
        assert_eq!(body, serde_json::json!({}));
        let body = serde_json::to_value(ComputeRequest { offset: Some(4.0) }).unwrap();
        assert_eq!(body, serde_json::json!({"offset": 4.0}));
    }

    #[test]
    fn server_replies_deserialize() {
        let summary: ComputeSummary = serde_json::from_value(serde_json::json!({
            "success": true,
            "points": 120,
            "degradedPoints": 2,
            "runId": "abc"
        }))
        .unwrap();
        assert_eq!(summary.points, 120);
        assert_eq!(summary.degraded_points, 2);

        let update: MissionUpdate = serde_json::from_value(serde_json::json!({
            "status": "ok",
            "message": "Mission updated",
            "updatedRoutePoints": [{"lat": 55.75, "lng": 37.6, "altitude": 40.0}],
            "updatedAt": "2026-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(update.updated_route_points.len(), 1);
        assert_eq!(update.updated_route_points[0].altitude, Some(40.0));
        assert!(update.updated_at.is_some());

        let processed: ProcessedRoute = serde_json::from_value(serde_json::json!({
            "success": true,
            "points": 1,
            "degradedPoints": 0,
            "runId": "abc",
            "routePoints": [{"lat": 55.75, "lng": 37.6, "altitude": 40.0}]
        }))
        .unwrap();
        assert_eq!(processed.summary.run_id, "abc");
        assert_eq!(processed.route_points.len(), 1);

        let err: ErrorBody =
            serde_json::from_str(r#"{"success": false, "error": "invalid offset"}"#).unwrap();
        assert_eq!(err.error, "invalid offset");
        let err: ErrorBody =
            serde_json::from_str(r#"{"status": "error", "message": "bad mission"}"#).unwrap();
        assert_eq!(err.error, "bad mission");
    }
}
