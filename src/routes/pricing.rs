// SPDX-License-Identifier: MIT

//! Round, parcel type and price list routes.

use axum::{
    extract::{Path, State},
    routing::{get, patch, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ParcelType, Round, RoundPricing};
use crate::time_utils::timestamp_id;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/rounds", get(list_rounds).post(create_round))
        .route("/api/rounds/{id}", put(update_round).delete(delete_round))
        .route(
            "/api/parcel-types",
            get(list_parcel_types).post(create_parcel_type),
        )
        .route(
            "/api/parcel-types/{id}",
            put(update_parcel_type).delete(delete_parcel_type),
        )
        .route("/api/parcel-types/sort", patch(sort_parcel_types))
        .route("/api/prices", get(list_prices).post(upsert_price))
        .route("/api/prices/{id}", put(update_price).delete(delete_price))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

// ─── Rounds ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RoundsResponse {
    pub rounds: Vec<Round>,
}

async fn list_rounds(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RoundsResponse>> {
    let rounds = state.db.list_rounds(user.user_id).await?;
    Ok(Json(RoundsResponse { rounds }))
}

#[derive(Deserialize, Validate)]
pub struct RoundPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

async fn create_round(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<RoundPayload>,
) -> Result<Json<Round>> {
    payload.validate()?;

    let round = Round {
        id: timestamp_id(),
        user_id: user.user_id,
        name: payload.name,
    };

    state.db.set_round(&round).await?;
    Ok(Json(round))
}

async fn owned_round(state: &AppState, user_id: u64, round_id: u64) -> Result<Round> {
    state
        .db
        .get_round(round_id)
        .await?
        .filter(|r| r.user_id == user_id)
        .ok_or_else(|| AppError::NotFound(format!("Round {} not found", round_id)))
}

async fn update_round(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<RoundPayload>,
) -> Result<Json<Round>> {
    payload.validate()?;
    let mut round = owned_round(&state, user.user_id, id).await?;

    round.name = payload.name;
    state.db.set_round(&round).await?;
    Ok(Json(round))
}

/// Remove a round. Refused while manifests still reference it.
async fn delete_round(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    owned_round(&state, user.user_id, id).await?;

    let manifests = state.db.list_manifests(user.user_id).await?;
    if manifests.iter().any(|m| m.round_id == id) {
        return Err(AppError::BadRequest(format!(
            "Round {} still has manifests recorded against it",
            id
        )));
    }

    // Drop the round's parcel types and prices with it.
    for parcel_type in state.db.list_parcel_types().await? {
        if parcel_type.round_id == id {
            state.db.delete_parcel_type(parcel_type.id).await?;
        }
    }
    for pricing in state.db.list_pricings().await? {
        if pricing.round_id == id {
            state.db.delete_pricing(pricing.id).await?;
        }
    }

    state.db.delete_round(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

// ─── Parcel Types ────────────────────────────────────────────

#[derive(Serialize)]
pub struct ParcelTypesResponse {
    pub parcel_types: Vec<ParcelType>,
}

/// All parcel types, in display order.
async fn list_parcel_types(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ParcelTypesResponse>> {
    let parcel_types = state.db.list_parcel_types().await?;
    Ok(Json(ParcelTypesResponse { parcel_types }))
}

#[derive(Deserialize, Validate)]
pub struct ParcelTypePayload {
    pub round_id: u64,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

async fn create_parcel_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ParcelTypePayload>,
) -> Result<Json<ParcelType>> {
    payload.validate()?;
    owned_round(&state, user.user_id, payload.round_id).await?;

    // New types sort to the end of the list.
    let next_order = state
        .db
        .list_parcel_types()
        .await?
        .iter()
        .map(|t| t.sort_order)
        .max()
        .map_or(0, |n| n + 1);

    let parcel_type = ParcelType {
        id: timestamp_id(),
        round_id: payload.round_id,
        name: payload.name,
        sort_order: next_order,
    };

    state.db.set_parcel_type(&parcel_type).await?;
    Ok(Json(parcel_type))
}

async fn update_parcel_type(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<ParcelTypePayload>,
) -> Result<Json<ParcelType>> {
    payload.validate()?;
    owned_round(&state, user.user_id, payload.round_id).await?;

    let mut parcel_type = state
        .db
        .get_parcel_type(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Parcel type {} not found", id)))?;

    parcel_type.round_id = payload.round_id;
    parcel_type.name = payload.name;

    state.db.set_parcel_type(&parcel_type).await?;
    Ok(Json(parcel_type))
}

/// Remove a parcel type, unless manifest lines still reference it.
/// Its price entries go with it.
async fn delete_parcel_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    state
        .db
        .get_parcel_type(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Parcel type {} not found", id)))?;

    let lines = state.db.list_all_summaries().await?;
    if lines.iter().any(|l| l.parcel_type_id == id) {
        return Err(AppError::BadRequest(format!(
            "Parcel type {} is still used by manifest lines",
            id
        )));
    }

    for pricing in state.db.list_pricings().await? {
        if pricing.parcel_type_id == id {
            state.db.delete_pricing(pricing.id).await?;
        }
    }

    state.db.delete_parcel_type(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}

#[derive(Deserialize)]
pub struct SortPayload {
    /// Parcel type IDs in the desired display order.
    pub ids: Vec<u64>,
}

/// Reassign sort order from an ordered ID list.
async fn sort_parcel_types(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SortPayload>,
) -> Result<Json<ParcelTypesResponse>> {
    for (index, id) in payload.ids.iter().enumerate() {
        let mut parcel_type = state
            .db
            .get_parcel_type(*id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Parcel type {} not found", id)))?;

        parcel_type.sort_order = index as u32;
        state.db.set_parcel_type(&parcel_type).await?;
    }

    let parcel_types = state.db.list_parcel_types().await?;
    Ok(Json(ParcelTypesResponse { parcel_types }))
}

// ─── Prices ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PricesResponse {
    pub prices: Vec<RoundPricing>,
}

async fn list_prices(State(state): State<Arc<AppState>>) -> Result<Json<PricesResponse>> {
    let prices = state.db.list_pricings().await?;
    Ok(Json(PricesResponse { prices }))
}

#[derive(Deserialize, Validate)]
pub struct PricePayload {
    pub round_id: u64,
    pub parcel_type_id: u64,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

/// Set the price for a (round, parcel type) pair, replacing any existing
/// entry for the pair.
async fn upsert_price(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PricePayload>,
) -> Result<Json<RoundPricing>> {
    payload.validate()?;
    owned_round(&state, user.user_id, payload.round_id).await?;

    state
        .db
        .get_parcel_type(payload.parcel_type_id)
        .await?
        .filter(|t| t.round_id == payload.round_id)
        .ok_or_else(|| {
            AppError::BadRequest(format!(
                "Parcel type {} does not belong to round {}",
                payload.parcel_type_id, payload.round_id
            ))
        })?;

    let pricing = match state
        .db
        .find_pricing(payload.round_id, payload.parcel_type_id)
        .await?
    {
        Some(mut existing) => {
            existing.price = payload.price;
            existing
        }
        None => RoundPricing {
            id: timestamp_id(),
            round_id: payload.round_id,
            parcel_type_id: payload.parcel_type_id,
            price: payload.price,
        },
    };

    state.db.set_pricing(&pricing).await?;
    Ok(Json(pricing))
}

#[derive(Deserialize, Validate)]
pub struct PriceUpdatePayload {
    #[validate(range(min = 0.0))]
    pub price: f64,
}

async fn update_price(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
    Json(payload): Json<PriceUpdatePayload>,
) -> Result<Json<RoundPricing>> {
    payload.validate()?;

    let mut pricing = state
        .db
        .get_pricing(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Price {} not found", id)))?;
    owned_round(&state, user.user_id, pricing.round_id).await?;

    pricing.price = payload.price;
    state.db.set_pricing(&pricing).await?;
    Ok(Json(pricing))
}

async fn delete_price(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>> {
    let pricing = state
        .db
        .get_pricing(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Price {} not found", id)))?;
    owned_round(&state, user.user_id, pricing.round_id).await?;

    state.db.delete_pricing(id).await?;
    Ok(Json(DeleteResponse { success: true }))
}
