// SPDX-License-Identifier: MIT

//! Mapbox Directions API client.
//!
//! Handles:
//! - Driving-route distance between two GPS points
//! - Route geometry decoding (encoded polyline, precision 5)
//! - Straight-line fallback when no route is available

use crate::error::AppError;
use geo::{Distance, Haversine, Point};
use serde::Deserialize;

/// Directions API client.
#[derive(Clone)]
pub struct DirectionsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

/// A computed route between two points.
#[derive(Debug, Clone)]
pub struct RouteDistance {
    /// Driving distance in kilometers
    pub distance_km: f64,
    /// True when the straight-line fallback was used instead of a route
    pub estimated: bool,
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    /// Route distance in meters
    distance: f64,
    /// Encoded polyline geometry
    #[serde(default)]
    geometry: Option<String>,
}

impl DirectionsClient {
    /// Create a new directions client with a Mapbox access token.
    pub fn new(access_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.mapbox.com/directions/v5/mapbox/driving".to_string(),
            access_token,
        }
    }

    /// Override the API base URL (tests).
    #[doc(hidden)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Driving distance between two points in kilometers.
    ///
    /// Coordinates are (latitude, longitude) pairs. The API takes them
    /// longitude-first.
    pub async fn route_distance(
        &self,
        from: (f64, f64),
        to: (f64, f64),
    ) -> Result<RouteDistance, AppError> {
        let url = format!(
            "{}/{},{};{},{}",
            self.base_url, from.1, from.0, to.1, to.0
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("geometries", "polyline"),
                ("overview", "full"),
            ])
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Directions request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::UpstreamApi(format!(
                "Directions API returned {}",
                status
            )));
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Invalid directions response: {}", e)))?;

        let route = body
            .routes
            .first()
            .ok_or_else(|| AppError::UpstreamApi("No route found".to_string()))?;

        let distance_km = route.distance / 1000.0;

        // Cross-check the reported distance against the decoded geometry;
        // a large mismatch means a truncated or bogus route.
        if let Some(encoded) = &route.geometry {
            if let Some(geometry_km) = decoded_length_km(encoded) {
                if distance_km > 0.1 && (geometry_km - distance_km).abs() / distance_km > 0.5 {
                    tracing::warn!(
                        distance_km,
                        geometry_km,
                        "Directions distance disagrees with route geometry"
                    );
                }
            }
        }

        Ok(RouteDistance {
            distance_km,
            estimated: false,
        })
    }

    /// Straight-line (haversine) distance in kilometers, used as a fallback
    /// when the directions API fails.
    pub fn straight_line_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let a = Point::new(from.1, from.0);
        let b = Point::new(to.1, to.0);
        Haversine.distance(a, b) / 1000.0
    }
}

/// Length of an encoded polyline (precision 5) in kilometers.
fn decoded_length_km(encoded: &str) -> Option<f64> {
    let line = polyline::decode_polyline(encoded, 5).ok()?;
    let mut meters = 0.0;
    for pair in line.points().collect::<Vec<_>>().windows(2) {
        meters += Haversine.distance(pair[0], pair[1]);
    }
    Some(meters / 1000.0)
}
