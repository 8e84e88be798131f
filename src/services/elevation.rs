use crate::error::{AppError, Result};
use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const DEFAULT_ELEVATION_BASE_URL: &str = "https://api.open-elevation.com";

/// Abstraction over the external elevation service.
#[async_trait]
pub trait ElevationService: Send + Sync {
    /// Elevations in meters, aligned by index with the request points.
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>>;
}

/// HTTP client for an open-elevation-compatible lookup API.
#[derive(Clone)]
pub struct OpenElevationClient {
    client: Client,
    base_url: String,
}

impl OpenElevationClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ELEVATION_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        OpenElevationClient {
            client: Client::new(),
            base_url,
        }
    }
}

impl Default for OpenElevationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ElevationService for OpenElevationClient {
    async fn elevations(&self, points: &[Coordinates]) -> Result<Vec<f64>> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let request = LookupRequest {
            locations: points
                .iter()
                .map(|p| LookupLocation {
                    latitude: p.lat,
                    longitude: p.lng,
                })
                .collect(),
        };

        let url = format!("{}/api/v1/lookup", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ElevationApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ElevationApi(format!("HTTP {}", status)));
        }

        let parsed: LookupResponse = response
            .json()
            .await
            .map_err(|e| AppError::ElevationApi(format!("Failed to parse response: {}", e)))?;

        if parsed.results.len() != points.len() {
            return Err(AppError::ElevationApi(format!(
                "Expected {} elevations, got {}",
                points.len(),
                parsed.results.len()
            )));
        }

        Ok(parsed.results.into_iter().map(|r| r.elevation).collect())
    }
}

#[derive(Debug, Serialize)]
struct LookupRequest {
    locations: Vec<LookupLocation>,
}

#[derive(Debug, Serialize)]
struct LookupLocation {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    results: Vec<LookupResult>,
}

#[derive(Debug, Deserialize)]
struct LookupResult {
    elevation: f64,
}
