// SPDX-License-Identifier: MIT

//! Manifest routes.
//!
//! A manifest is one round's paperwork for one delivery day, with a line
//! per parcel type. The paperwork reference is unique across all manifests
//! and a repeated submission of the same reference is rejected with 409.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::db::firestore::ManifestQueryCursor;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Manifest, ManifestSummary};
use crate::time_utils::timestamp_id;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/manifests", get(list_manifests).post(create_manifest))
        .route(
            "/api/manifests/{id}",
            get(get_manifest)
                .put(update_manifest)
                .delete(delete_manifest),
        )
}

// ─── Pagination cursor ───────────────────────────────────────

const CURSOR_PARTS: usize = 2;

fn parse_cursor(cursor: Option<&str>) -> Result<Option<ManifestQueryCursor>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;

            let parts: Vec<&str> = decoded_str.split(':').collect();
            if parts.len() != CURSOR_PARTS {
                return Err(invalid_cursor());
            }

            let delivery_date = parts[0]
                .parse::<NaiveDate>()
                .map_err(|_| invalid_cursor())?;
            let manifest_id = parts[1].parse::<u64>().map_err(|_| invalid_cursor())?;

            Ok(ManifestQueryCursor {
                delivery_date,
                manifest_id,
            })
        })
        .transpose()
}

fn encode_cursor(cursor: ManifestQueryCursor) -> String {
    let payload = format!("{}:{}", cursor.delivery_date, cursor.manifest_id);
    URL_SAFE_NO_PAD.encode(payload)
}

// ─── Listing ─────────────────────────────────────────────────

#[derive(Deserialize)]
struct ManifestsQuery {
    cursor: Option<String>,
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    25
}

const MAX_PER_PAGE: u32 = 100;

#[derive(Serialize)]
pub struct ManifestWithLines {
    #[serde(flatten)]
    pub manifest: Manifest,
    pub lines: Vec<ManifestSummary>,
}

#[derive(Serialize)]
pub struct ManifestsResponse {
    pub manifests: Vec<ManifestWithLines>,
    pub next_cursor: Option<String>,
}

/// List manifests, newest delivery date first, with cursor pagination.
async fn list_manifests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ManifestsQuery>,
) -> Result<Json<ManifestsResponse>> {
    let limit = params.per_page.clamp(1, MAX_PER_PAGE);
    let cursor = parse_cursor(params.cursor.as_deref())?;

    let mut page = state
        .db
        .list_manifests_page(user.user_id, cursor, limit)
        .await?;

    // One extra row signals another page.
    let next_cursor = if page.len() > limit as usize {
        page.truncate(limit as usize);
        page.last().map(|m| {
            encode_cursor(ManifestQueryCursor {
                delivery_date: m.delivery_date,
                manifest_id: m.id,
            })
        })
    } else {
        None
    };

    let mut manifests = Vec::with_capacity(page.len());
    for manifest in page {
        let lines = state.db.list_manifest_summaries(manifest.id).await?;
        manifests.push(ManifestWithLines { manifest, lines });
    }

    Ok(Json(ManifestsResponse {
        manifests,
        next_cursor,
    }))
}

// ─── Create / update ─────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ManifestLinePayload {
    pub parcel_type_id: u64,
    #[validate(range(max = 100000))]
    pub manifested: u32,
    #[validate(range(max = 100000))]
    pub re_manifested: u32,
    #[validate(range(max = 100000))]
    pub carried_forward: u32,
}

#[derive(Deserialize, Validate)]
pub struct ManifestPayload {
    pub round_id: u64,
    pub delivery_date: NaiveDate,
    #[validate(length(min = 1, max = 100))]
    pub reference: String,
    #[validate(nested)]
    pub lines: Vec<ManifestLinePayload>,
}

async fn ensure_owned_round(state: &AppState, user_id: u64, round_id: u64) -> Result<()> {
    state
        .db
        .get_round(round_id)
        .await?
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Round {} not found", round_id)))?;
    Ok(())
}

fn build_lines(manifest_id: u64, lines: &[ManifestLinePayload]) -> Vec<ManifestSummary> {
    lines
        .iter()
        .map(|line| ManifestSummary {
            manifest_id,
            parcel_type_id: line.parcel_type_id,
            manifested: line.manifested,
            re_manifested: line.re_manifested,
            carried_forward: line.carried_forward,
        })
        .collect()
}

/// Record a new manifest with its parcel counts.
async fn create_manifest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ManifestPayload>,
) -> Result<(StatusCode, Json<ManifestWithLines>)> {
    payload.validate()?;
    ensure_owned_round(&state, user.user_id, payload.round_id).await?;

    if state
        .db
        .find_manifest_by_reference(&payload.reference)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "A manifest with reference '{}' already exists",
            payload.reference
        )));
    }

    let manifest = Manifest {
        id: timestamp_id(),
        user_id: user.user_id,
        round_id: payload.round_id,
        delivery_date: payload.delivery_date,
        reference: payload.reference,
    };
    let lines = build_lines(manifest.id, &payload.lines);

    state.db.create_manifest_atomic(&manifest, &lines).await?;

    tracing::info!(
        manifest_id = manifest.id,
        reference = %manifest.reference,
        "Created manifest"
    );

    Ok((StatusCode::CREATED, Json(ManifestWithLines { manifest, lines })))
}

async fn get_manifest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<ManifestWithLines>> {
    let manifest = state
        .db
        .get_manifest(id)
        .await?
        .filter(|m| m.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Manifest {} not found", id)))?;

    let lines = state.db.list_manifest_summaries(id).await?;
    Ok(Json(ManifestWithLines { manifest, lines }))
}

/// Replace a manifest and its lines.
async fn update_manifest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<ManifestPayload>,
) -> Result<Json<ManifestWithLines>> {
    payload.validate()?;

    let existing = state
        .db
        .get_manifest(id)
        .await?
        .filter(|m| m.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Manifest {} not found", id)))?;

    ensure_owned_round(&state, user.user_id, payload.round_id).await?;

    // The reference stays unique; another manifest holding it is a conflict.
    if payload.reference != existing.reference {
        if let Some(other) = state
            .db
            .find_manifest_by_reference(&payload.reference)
            .await?
        {
            if other.id != id {
                return Err(AppError::Conflict(format!(
                    "A manifest with reference '{}' already exists",
                    payload.reference
                )));
            }
        }
    }

    let old_lines = state.db.list_manifest_summaries(id).await?;

    let manifest = Manifest {
        id,
        user_id: existing.user_id,
        round_id: payload.round_id,
        delivery_date: payload.delivery_date,
        reference: payload.reference,
    };
    let lines = build_lines(id, &payload.lines);

    state
        .db
        .update_manifest_atomic(&manifest, &old_lines, &lines)
        .await?;

    Ok(Json(ManifestWithLines { manifest, lines }))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

async fn delete_manifest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_manifest(id)
        .await?
        .filter(|m| m.user_id == user.user_id)
        .ok_or_else(|| AppError::NotFound(format!("Manifest {} not found", id)))?;

    let lines = state.db.list_manifest_summaries(id).await?;
    state.db.delete_manifest_atomic(id, &lines).await?;

    Ok(Json(DeleteResponse { success: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_round_trip() {
        let cursor = ManifestQueryCursor {
            delivery_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            manifest_id: 42,
        };
        let encoded = encode_cursor(cursor);
        let decoded = parse_cursor(Some(&encoded)).unwrap().unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_cursor_rejects_garbage() {
        assert!(parse_cursor(Some("not-base64!!")).is_err());
        let bad = URL_SAFE_NO_PAD.encode("too:many:parts");
        assert!(parse_cursor(Some(&bad)).is_err());
    }

    #[test]
    fn test_no_cursor_is_none() {
        assert!(parse_cursor(None).unwrap().is_none());
    }
}
