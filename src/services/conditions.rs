// SPDX-License-Identifier: MIT

//! Weather and traffic condition passthrough with in-process caching.
//!
//! The upstream APIs (OpenWeatherMap, TomTom incidents) are rate limited on
//! free tiers, so responses are cached per rounded coordinate for a few
//! minutes. The dashboard polls these endpoints on every page load.

use crate::error::AppError;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const WEATHER_TTL: Duration = Duration::from_secs(600);
const TRAFFIC_TTL: Duration = Duration::from_secs(300);

/// Client for current weather and traffic conditions.
#[derive(Clone)]
pub struct ConditionsService {
    http: reqwest::Client,
    weather_base_url: String,
    traffic_base_url: String,
    weather_key: Option<String>,
    traffic_key: Option<String>,
    cache: Arc<DashMap<String, (Instant, serde_json::Value)>>,
}

impl ConditionsService {
    pub fn new(weather_key: Option<String>, traffic_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            weather_base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            traffic_base_url: "https://api.tomtom.com/traffic/services/4/incidentDetails"
                .to_string(),
            weather_key,
            traffic_key,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Override the upstream base URLs (tests).
    #[doc(hidden)]
    pub fn with_base_urls(mut self, weather: String, traffic: String) -> Self {
        self.weather_base_url = weather;
        self.traffic_base_url = traffic;
        self
    }

    /// Current weather at a point (metric units), cached for 10 minutes.
    pub async fn weather(&self, lat: f64, lon: f64) -> Result<serde_json::Value, AppError> {
        let key = self
            .weather_key
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Weather API key not configured".to_string()))?;

        let cache_key = format!("weather:{}", cache_coords(lat, lon));
        if let Some(cached) = self.cache_get(&cache_key, WEATHER_TTL) {
            return Ok(cached);
        }

        let response = self
            .http
            .get(&self.weather_base_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("appid", key.to_string()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Weather request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamApi(format!(
                "Weather API returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Invalid weather response: {}", e)))?;

        self.cache.insert(cache_key, (Instant::now(), body.clone()));
        Ok(body)
    }

    /// Traffic incidents in a ~0.1 degree bounding box, cached for 5 minutes.
    pub async fn traffic(&self, lat: f64, lon: f64) -> Result<serde_json::Value, AppError> {
        let key = self
            .traffic_key
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Traffic API key not configured".to_string()))?;

        let cache_key = format!("traffic:{}", cache_coords(lat, lon));
        if let Some(cached) = self.cache_get(&cache_key, TRAFFIC_TTL) {
            return Ok(cached);
        }

        let bbox = format!(
            "{},{},{},{}",
            lat - 0.1,
            lon - 0.1,
            lat + 0.1,
            lon + 0.1
        );

        let response = self
            .http
            .get(&self.traffic_base_url)
            .query(&[
                ("key", key),
                ("bbox", bbox.as_str()),
                (
                    "fields",
                    "{incidents{type,geometry{type,coordinates},properties{id,iconCategory,\
                     magnitudeOfDelay,events{description,code},startTime,endTime,delay}}}",
                ),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Traffic request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamApi(format!(
                "Traffic API returned {}",
                response.status()
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Invalid traffic response: {}", e)))?;

        self.cache.insert(cache_key, (Instant::now(), body.clone()));
        Ok(body)
    }

    fn cache_get(&self, key: &str, ttl: Duration) -> Option<serde_json::Value> {
        let entry = self.cache.get(key)?;
        let (stored_at, value) = entry.value();
        if stored_at.elapsed() < ttl {
            tracing::debug!(key, "Conditions cache hit");
            Some(value.clone())
        } else {
            drop(entry);
            self.cache.remove(key);
            None
        }
    }
}

/// Coordinates rounded to ~1 km so close requests share a cache entry.
fn cache_coords(lat: f64, lon: f64) -> String {
    format!("{:.2},{:.2}", lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_coords_rounding() {
        assert_eq!(cache_coords(51.5074, -0.1278), "51.51,-0.13");
        assert_eq!(cache_coords(51.5081, -0.1251), "51.51,-0.13");
        assert_ne!(cache_coords(51.5074, -0.1278), cache_coords(52.0, -0.13));
    }

    #[tokio::test]
    async fn test_weather_without_key_is_bad_request() {
        let service = ConditionsService::new(None, None);
        let err = service.weather(51.5, -0.1).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_traffic_without_key_is_bad_request() {
        let service = ConditionsService::new(None, None);
        let err = service.traffic(51.5, -0.1).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_cache_returns_fresh_entries_only() {
        let service = ConditionsService::new(None, None);
        let value = serde_json::json!({"temp": 18.5});
        service
            .cache
            .insert("weather:51.51,-0.13".to_string(), (Instant::now(), value));

        assert!(service
            .cache_get("weather:51.51,-0.13", WEATHER_TTL)
            .is_some());
        assert!(service.cache_get("weather:0.00,0.00", WEATHER_TTL).is_none());
    }
}
