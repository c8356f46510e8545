// SPDX-License-Identifier: MIT

//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup and held in memory; nothing re-reads
//! the environment afterwards.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Non-sensitive ---
    /// Frontend URL for CORS and redirects
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// SHA-256 digest of the operator password (lowercase hex)
    pub operator_password_sha256: String,
    /// Mapbox access token for the directions API
    pub mapbox_token: String,
    /// OpenWeatherMap API key; weather endpoint is disabled when absent
    pub openweathermap_key: Option<String>,
    /// TomTom API key; traffic endpoint is disabled when absent
    pub tomtom_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            operator_password_sha256: env::var("OPERATOR_PASSWORD_SHA256")
                .map(|v| v.trim().to_ascii_lowercase())
                .map_err(|_| ConfigError::Missing("OPERATOR_PASSWORD_SHA256"))?,
            mapbox_token: env::var("MAPBOX_ACCESS_TOKEN")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("MAPBOX_ACCESS_TOKEN"))?,
            openweathermap_key: env::var("OPENWEATHERMAP_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            tomtom_key: env::var("TOMTOM_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Fixed config for tests. The password is "hunter2".
    pub fn test_default() -> Self {
        use sha2::{Digest, Sha256};

        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            operator_password_sha256: hex::encode(Sha256::digest(b"hunter2")),
            mapbox_token: "test_mapbox_token".to_string(),
            openweathermap_key: Some("test_weather_key".to_string()),
            tomtom_key: Some("test_traffic_key".to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var(
            "OPERATOR_PASSWORD_SHA256",
            "F52FBD32B2B3B86FF88EF6C490628285F482AF15DDCB29541F94BCF526A3F6C7",
        );
        env::set_var("MAPBOX_ACCESS_TOKEN", "pk.test");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.mapbox_token, "pk.test");
        // Digest is normalized to lowercase hex
        assert_eq!(
            config.operator_password_sha256,
            "f52fbd32b2b3b86ff88ef6c490628285f482af15ddcb29541f94bcf526a3f6c7"
        );
    }

    #[test]
    fn test_default_password_digest_matches() {
        use sha2::{Digest, Sha256};
        let config = Config::test_default();
        assert_eq!(
            config.operator_password_sha256,
            hex::encode(Sha256::digest(b"hunter2"))
        );
    }
}
