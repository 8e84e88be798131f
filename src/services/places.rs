use crate::error::{AppError, Result};
use crate::models::Coordinates;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const OVERPASS_ENDPOINT: &str = "https://overpass-api.de/api/interpreter";

/// A named map feature near the start point, fed into the language-model
/// prompt so proposed circuits pass interesting places.
#[derive(Debug, Clone)]
pub struct PlaceFeature {
    pub name: String,
    pub coordinates: Coordinates,
    pub category: String,
}

/// Abstraction over the feature-discovery service.
#[async_trait]
pub trait PlacesService: Send + Sync {
    async fn find_features(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        categories: &[&str],
    ) -> Result<Vec<PlaceFeature>>;
}

/// Overpass API client querying OpenStreetMap features around a point.
#[derive(Clone)]
pub struct OverpassClient {
    client: Client,
    endpoint: String,
}

impl OverpassClient {
    pub fn new() -> Self {
        Self::with_endpoint(OVERPASS_ENDPOINT.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        OverpassClient {
            client: Client::new(),
            endpoint,
        }
    }

    /// Map requested categories to OSM tag filters. Unknown categories fall
    /// back to leisure tags, the most park-like default for runners.
    fn category_filter(category: &str) -> &'static str {
        match category {
            "park" => "[\"leisure\"=\"park\"]",
            "water" => "[\"natural\"=\"water\"]",
            "monument" => "[\"historic\"~\"monument|memorial\"]",
            "viewpoint" => "[\"tourism\"=\"viewpoint\"]",
            _ => "[\"leisure\"]",
        }
    }

    fn build_query(center: &Coordinates, radius_meters: f64, categories: &[&str]) -> String {
        let clauses: String = categories
            .iter()
            .map(|category| {
                format!(
                    "node{}(around:{:.0},{},{});",
                    Self::category_filter(category),
                    radius_meters,
                    center.lat,
                    center.lng
                )
            })
            .collect();
        format!("[out:json][timeout:10];({});out body 50;", clauses)
    }
}

impl Default for OverpassClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlacesService for OverpassClient {
    async fn find_features(
        &self,
        center: &Coordinates,
        radius_meters: f64,
        categories: &[&str],
    ) -> Result<Vec<PlaceFeature>> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let query = Self::build_query(center, radius_meters, categories);
        tracing::debug!(
            radius_m = radius_meters,
            categories = categories.len(),
            "Overpass feature query within {:.0}m",
            radius_meters
        );

        let response = self
            .client
            .post(&self.endpoint)
            .body(query)
            .send()
            .await
            .map_err(|e| AppError::PlacesApi(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::PlacesApi(format!("HTTP {}", response.status())));
        }

        let parsed: OverpassResponse = response
            .json()
            .await
            .map_err(|e| AppError::PlacesApi(format!("Failed to parse response: {}", e)))?;

        let features = parsed
            .elements
            .into_iter()
            .filter_map(|element| {
                let name = element.tags.name?;
                let coordinates = Coordinates::new(element.lat, element.lon).ok()?;
                Some(PlaceFeature {
                    name,
                    coordinates,
                    category: element
                        .tags
                        .leisure
                        .or(element.tags.natural)
                        .or(element.tags.historic)
                        .or(element.tags.tourism)
                        .unwrap_or_else(|| "feature".to_string()),
                })
            })
            .collect();

        Ok(features)
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    lat: f64,
    lon: f64,
    #[serde(default)]
    tags: OverpassTags,
}

#[derive(Debug, Default, Deserialize)]
struct OverpassTags {
    name: Option<String>,
    leisure: Option<String>,
    natural: Option<String>,
    historic: Option<String>,
    tourism: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_includes_all_categories() {
        let center = Coordinates::new(51.5007, -0.1246).unwrap();
        let query = OverpassClient::build_query(&center, 2000.0, &["park", "water"]);
        assert!(query.contains("leisure"));
        assert!(query.contains("natural"));
        assert!(query.contains("around:2000"));
    }

    #[test]
    fn test_parse_elements_skips_unnamed() {
        let raw = serde_json::json!({
            "elements": [
                {"lat": 51.5, "lon": -0.12, "tags": {"name": "Hyde Park", "leisure": "park"}},
                {"lat": 51.6, "lon": -0.10, "tags": {"leisure": "park"}}
            ]
        });
        let parsed: OverpassResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.elements.len(), 2);
        assert_eq!(parsed.elements[0].tags.name.as_deref(), Some("Hyde Park"));
        assert!(parsed.elements[1].tags.name.is_none());
    }
}
