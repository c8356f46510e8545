// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for the ledger's collections: activities
//! and activity types, rounds with parcel types and pricing, manifests with
//! their line items, periods, holidays, service profiles, locations, keyed
//! settings, and computed day distances.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Activity, ActivityType, DayDistance, DeliverySetting, Holiday, Location, Manifest,
    ManifestSummary, ParcelType, Period, Round, RoundPricing, ServiceProfile,
};
use chrono::NaiveDate;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Cursor for paginated manifest listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestQueryCursor {
    pub delivery_date: NaiveDate,
    pub manifest_id: u64,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic helpers ─────────────────────────────────────────

    async fn get_by_id<T>(&self, collection: &str, doc_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert<T>(&self, collection: &str, doc_id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(doc_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_by_id(&self, collection: &str, doc_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Activity Operations ─────────────────────────────────────

    pub async fn get_activity(&self, activity_id: u64) -> Result<Option<Activity>, AppError> {
        self.get_by_id(collections::ACTIVITIES, &activity_id.to_string())
            .await
    }

    /// Get activities for the operator, newest first, optionally limited to
    /// one calendar day.
    pub async fn list_activities(
        &self,
        user_id: u64,
        on_date: Option<NaiveDate>,
    ) -> Result<Vec<Activity>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES);

        let query = if let Some(date) = on_date {
            let day_start = format!("{}T00:00:00Z", date);
            let day_end = format!("{}T00:00:00Z", date.succ_opt().unwrap_or(date));
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("timestamp").greater_than_or_equal(day_start.clone()),
                    q.field("timestamp").less_than(day_end.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(user_id))
        };

        query
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether any activity references the named activity type.
    pub async fn activity_type_in_use(
        &self,
        user_id: u64,
        type_name: &str,
    ) -> Result<bool, AppError> {
        let type_name = type_name.to_string();
        let matches: Vec<Activity> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITIES)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("activity_type").eq(type_name.clone()),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(!matches.is_empty())
    }

    pub async fn set_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.upsert(collections::ACTIVITIES, &activity.id.to_string(), activity)
            .await
    }

    pub async fn delete_activity(&self, activity_id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::ACTIVITIES, &activity_id.to_string())
            .await
    }

    // ─── Activity Type Operations ────────────────────────────────

    pub async fn get_activity_type(&self, name: &str) -> Result<Option<ActivityType>, AppError> {
        let doc_id = urlencoding::encode(name).into_owned();
        self.get_by_id(collections::ACTIVITY_TYPES, &doc_id).await
    }

    pub async fn list_activity_types(&self) -> Result<Vec<ActivityType>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_TYPES)
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_activity_type(&self, activity_type: &ActivityType) -> Result<(), AppError> {
        let doc_id = urlencoding::encode(&activity_type.name).into_owned();
        self.upsert(collections::ACTIVITY_TYPES, &doc_id, activity_type)
            .await
    }

    pub async fn delete_activity_type(&self, name: &str) -> Result<(), AppError> {
        let doc_id = urlencoding::encode(name).into_owned();
        self.delete_by_id(collections::ACTIVITY_TYPES, &doc_id).await
    }

    // ─── Round / Parcel Type / Pricing Operations ────────────────

    pub async fn get_round(&self, round_id: u64) -> Result<Option<Round>, AppError> {
        self.get_by_id(collections::ROUNDS, &round_id.to_string())
            .await
    }

    pub async fn list_rounds(&self, user_id: u64) -> Result<Vec<Round>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROUNDS)
            .filter(move |q| q.field("user_id").eq(user_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_round(&self, round: &Round) -> Result<(), AppError> {
        self.upsert(collections::ROUNDS, &round.id.to_string(), round)
            .await
    }

    pub async fn delete_round(&self, round_id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::ROUNDS, &round_id.to_string())
            .await
    }

    pub async fn get_parcel_type(&self, id: u64) -> Result<Option<ParcelType>, AppError> {
        self.get_by_id(collections::PARCEL_TYPES, &id.to_string())
            .await
    }

    pub async fn list_parcel_types(&self) -> Result<Vec<ParcelType>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PARCEL_TYPES)
            .order_by([("sort_order", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_parcel_type(&self, parcel_type: &ParcelType) -> Result<(), AppError> {
        self.upsert(
            collections::PARCEL_TYPES,
            &parcel_type.id.to_string(),
            parcel_type,
        )
        .await
    }

    pub async fn delete_parcel_type(&self, id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::PARCEL_TYPES, &id.to_string())
            .await
    }

    pub async fn get_pricing(&self, id: u64) -> Result<Option<RoundPricing>, AppError> {
        self.get_by_id(collections::ROUND_PRICINGS, &id.to_string())
            .await
    }

    /// Find the pricing for a (round, parcel type) pair, if any.
    pub async fn find_pricing(
        &self,
        round_id: u64,
        parcel_type_id: u64,
    ) -> Result<Option<RoundPricing>, AppError> {
        let mut matches: Vec<RoundPricing> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ROUND_PRICINGS)
            .filter(move |q| {
                q.for_all([
                    q.field("round_id").eq(round_id),
                    q.field("parcel_type_id").eq(parcel_type_id),
                ])
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(matches.pop())
    }

    pub async fn list_pricings(&self) -> Result<Vec<RoundPricing>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::ROUND_PRICINGS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_pricing(&self, pricing: &RoundPricing) -> Result<(), AppError> {
        self.upsert(
            collections::ROUND_PRICINGS,
            &pricing.id.to_string(),
            pricing,
        )
        .await
    }

    pub async fn delete_pricing(&self, id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::ROUND_PRICINGS, &id.to_string())
            .await
    }

    // ─── Manifest Operations ─────────────────────────────────────

    pub async fn get_manifest(&self, manifest_id: u64) -> Result<Option<Manifest>, AppError> {
        self.get_by_id(collections::MANIFESTS, &manifest_id.to_string())
            .await
    }

    /// Look up a manifest by its paperwork reference (unique).
    pub async fn find_manifest_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Manifest>, AppError> {
        let reference = reference.to_string();
        let mut matches: Vec<Manifest> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MANIFESTS)
            .filter(move |q| q.field("reference").eq(reference.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(matches.pop())
    }

    /// List all of the operator's manifests, newest delivery date first.
    pub async fn list_manifests(&self, user_id: u64) -> Result<Vec<Manifest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MANIFESTS)
            .filter(move |q| q.field("user_id").eq(user_id))
            .order_by([
                (
                    "delivery_date",
                    firestore::FirestoreQueryDirection::Descending,
                ),
                ("round_id", firestore::FirestoreQueryDirection::Ascending),
            ])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List manifests with cursor pagination (delivery date descending).
    pub async fn list_manifests_page(
        &self,
        user_id: u64,
        cursor: Option<ManifestQueryCursor>,
        limit: u32,
    ) -> Result<Vec<Manifest>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MANIFESTS);

        let query = if let Some(cursor) = cursor {
            let cursor_date = cursor.delivery_date.to_string();
            query.filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("delivery_date").less_than_or_equal(cursor_date.clone()),
                ])
            })
        } else {
            query.filter(move |q| q.field("user_id").eq(user_id))
        };

        let mut page: Vec<Manifest> = query
            .order_by([
                (
                    "delivery_date",
                    firestore::FirestoreQueryDirection::Descending,
                ),
                ("round_id", firestore::FirestoreQueryDirection::Ascending),
            ])
            .limit(limit + 1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // The date-only cursor re-fetches rows of the boundary date; drop
        // everything up to and including the cursor manifest itself.
        if let Some(cursor) = cursor {
            if let Some(pos) = page.iter().position(|m| m.id == cursor.manifest_id) {
                page.drain(..=pos);
            }
        }
        page.truncate(limit as usize + 1);

        Ok(page)
    }

    /// Line items of one manifest.
    pub async fn list_manifest_summaries(
        &self,
        manifest_id: u64,
    ) -> Result<Vec<ManifestSummary>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MANIFEST_SUMMARIES)
            .filter(move |q| q.field("manifest_id").eq(manifest_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Line items of all of the operator's manifests.
    pub async fn list_all_summaries(&self) -> Result<Vec<ManifestSummary>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::MANIFEST_SUMMARIES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn summary_doc_id(line: &ManifestSummary) -> String {
        format!("{}_{}", line.manifest_id, line.parcel_type_id)
    }

    /// Atomically store a manifest and its line items.
    ///
    /// All writes go through one Firestore transaction so a failed write
    /// never leaves a manifest without its lines.
    pub async fn create_manifest_atomic(
        &self,
        manifest: &Manifest,
        lines: &[ManifestSummary],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::MANIFESTS)
            .document_id(manifest.id.to_string())
            .object(manifest)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add manifest to transaction: {}", e))
            })?;

        for line in lines {
            client
                .fluent()
                .update()
                .in_col(collections::MANIFEST_SUMMARIES)
                .document_id(Self::summary_doc_id(line))
                .object(line)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add line to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            manifest_id = manifest.id,
            lines = lines.len(),
            "Manifest stored atomically"
        );

        Ok(())
    }

    /// Atomically replace a manifest and its line items.
    pub async fn update_manifest_atomic(
        &self,
        manifest: &Manifest,
        old_lines: &[ManifestSummary],
        new_lines: &[ManifestSummary],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::MANIFESTS)
            .document_id(manifest.id.to_string())
            .object(manifest)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add manifest to transaction: {}", e))
            })?;

        // Firestore rejects two writes to one document in a transaction, so
        // only delete lines that the new set no longer contains.
        let stale = old_lines.iter().filter(|old| {
            !new_lines
                .iter()
                .any(|new| Self::summary_doc_id(new) == Self::summary_doc_id(old))
        });
        for line in stale {
            client
                .fluent()
                .delete()
                .from(collections::MANIFEST_SUMMARIES)
                .document_id(Self::summary_doc_id(line))
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add line delete to transaction: {}", e))
                })?;
        }

        for line in new_lines {
            client
                .fluent()
                .update()
                .in_col(collections::MANIFEST_SUMMARIES)
                .document_id(Self::summary_doc_id(line))
                .object(line)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add line to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        Ok(())
    }

    /// Atomically delete a manifest and its line items.
    pub async fn delete_manifest_atomic(
        &self,
        manifest_id: u64,
        lines: &[ManifestSummary],
    ) -> Result<(), AppError> {
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .delete()
            .from(collections::MANIFESTS)
            .document_id(manifest_id.to_string())
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add manifest delete to transaction: {}", e))
            })?;

        for line in lines {
            client
                .fluent()
                .delete()
                .from(collections::MANIFEST_SUMMARIES)
                .document_id(Self::summary_doc_id(line))
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!("Failed to add line delete to transaction: {}", e))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(manifest_id, lines = lines.len(), "Manifest deleted");

        Ok(())
    }

    // ─── Period / Holiday Operations ─────────────────────────────

    pub async fn get_period(&self, id: u64) -> Result<Option<Period>, AppError> {
        self.get_by_id(collections::PERIODS, &id.to_string()).await
    }

    pub async fn list_periods(&self) -> Result<Vec<Period>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PERIODS)
            .order_by([(
                "start_date",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_period(&self, period: &Period) -> Result<(), AppError> {
        self.upsert(collections::PERIODS, &period.id.to_string(), period)
            .await
    }

    pub async fn delete_period(&self, id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::PERIODS, &id.to_string())
            .await
    }

    pub async fn get_holiday(&self, id: u64) -> Result<Option<Holiday>, AppError> {
        self.get_by_id(collections::HOLIDAYS, &id.to_string()).await
    }

    pub async fn list_holidays(&self) -> Result<Vec<Holiday>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::HOLIDAYS)
            .order_by([(
                "start_date",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_holiday(&self, holiday: &Holiday) -> Result<(), AppError> {
        self.upsert(collections::HOLIDAYS, &holiday.id.to_string(), holiday)
            .await
    }

    pub async fn delete_holiday(&self, id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::HOLIDAYS, &id.to_string())
            .await
    }

    // ─── Service Profile / Location / Settings Operations ────────

    pub async fn get_service_profile(&self, id: u64) -> Result<Option<ServiceProfile>, AppError> {
        self.get_by_id(collections::SERVICE_PROFILES, &id.to_string())
            .await
    }

    pub async fn list_service_profiles(
        &self,
        user_id: u64,
    ) -> Result<Vec<ServiceProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SERVICE_PROFILES)
            .filter(move |q| q.field("user_id").eq(user_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_service_profile(&self, profile: &ServiceProfile) -> Result<(), AppError> {
        self.upsert(
            collections::SERVICE_PROFILES,
            &profile.id.to_string(),
            profile,
        )
        .await
    }

    pub async fn delete_service_profile(&self, id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::SERVICE_PROFILES, &id.to_string())
            .await
    }

    pub async fn list_locations(&self, user_id: u64) -> Result<Vec<Location>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::LOCATIONS)
            .filter(move |q| q.field("user_id").eq(user_id))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_location(&self, id: u64) -> Result<Option<Location>, AppError> {
        self.get_by_id(collections::LOCATIONS, &id.to_string())
            .await
    }

    pub async fn set_location(&self, location: &Location) -> Result<(), AppError> {
        self.upsert(collections::LOCATIONS, &location.id.to_string(), location)
            .await
    }

    pub async fn delete_location(&self, id: u64) -> Result<(), AppError> {
        self.delete_by_id(collections::LOCATIONS, &id.to_string())
            .await
    }

    pub async fn list_delivery_settings(&self) -> Result<Vec<DeliverySetting>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DELIVERY_SETTINGS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_delivery_setting(&self, setting: &DeliverySetting) -> Result<(), AppError> {
        self.upsert(collections::DELIVERY_SETTINGS, &setting.key, setting)
            .await
    }

    // ─── Day Distance Operations ─────────────────────────────────

    pub async fn list_day_distances(&self, date: NaiveDate) -> Result<Vec<DayDistance>, AppError> {
        let date_str = date.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::DAY_DISTANCES)
            .filter(move |q| q.field("date").eq(date_str.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_day_distance(&self, distance: &DayDistance) -> Result<(), AppError> {
        let doc_id = format!("{}_{}", distance.date, distance.segment);
        self.upsert(collections::DAY_DISTANCES, &doc_id, distance)
            .await
    }
}
