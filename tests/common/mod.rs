// SPDX-License-Identifier: MIT

use courier_ledger::config::Config;
use courier_ledger::db::FirestoreDb;
use courier_ledger::middleware::auth::create_jwt;
use courier_ledger::routes::create_router;
use courier_ledger::services::{ConditionsService, DirectionsClient};
use courier_ledger::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_db(test_db_offline())
}

/// Create a test app around an existing database connection.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: FirestoreDb) -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let directions = DirectionsClient::new(config.mapbox_token.clone());
    let conditions = ConditionsService::new(
        config.openweathermap_key.clone(),
        config.tomtom_key.clone(),
    );

    let state = Arc::new(AppState {
        config,
        db,
        directions,
        conditions,
    });

    (create_router(state.clone()), state)
}

/// Create a session token for test requests.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: u64, signing_key: &[u8]) -> String {
    create_jwt(user_id, signing_key).expect("JWT creation should not fail in tests")
}
