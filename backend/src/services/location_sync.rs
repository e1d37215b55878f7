//! Seller location synchronization engine
//!
//! Products carry a denormalized copy of their seller's coordinates so the
//! search path never joins against the profile tables. This engine is the
//! only writer of that snapshot: profile-management flows must invoke it
//! (directly or through [`SellerLocationChanged`]) after every coordinate
//! write, and `sync_all` exists for migrations, backfills, and drift repair.
//!
//! Concurrent syncs for the same seller are last-write-wins: every sync
//! copies the seller's current canonical state, so the snapshot always equals
//! some valid historical state of the profile.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared::models::{SellerLocationChanged, SellerProfile, SellerType};

use crate::config::SyncConfig;
use crate::error::AppResult;
use crate::repositories::{ProductCatalog, SellerDirectory};

/// Batching knobs for `sync_all`
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// Sellers synced concurrently; bounded so a full resync cannot saturate
    /// the catalog store
    pub parallelism: usize,
    /// A checkpoint line is logged after every N sellers
    pub checkpoint_interval: usize,
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self {
            parallelism: config.parallelism,
            checkpoint_interval: config.checkpoint_interval,
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            parallelism: 8,
            checkpoint_interval: 100,
        }
    }
}

/// Aggregate outcome of a full resync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncAllReport {
    pub farmers_updated: u64,
    pub retailers_updated: u64,
    pub total: u64,
    /// Sellers skipped after an error; never aborts the batch
    pub failed_sellers: u64,
}

/// Position in a full resync, as logged at every checkpoint.
///
/// Passing it back into `sync_all` resumes after that seller. Because syncs
/// are idempotent, resuming from a slightly stale checkpoint only re-copies
/// a few snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SyncCheckpoint {
    pub seller_type: SellerType,
    pub profile_id: Uuid,
}

enum Resume {
    FromStart,
    After(Uuid),
    SkipPhase,
}

/// Keeps every product's cached seller-location snapshot consistent with the
/// canonical seller profile
pub struct LocationSyncEngine {
    directory: Arc<dyn SellerDirectory>,
    catalog: Arc<dyn ProductCatalog>,
    options: SyncOptions,
}

impl LocationSyncEngine {
    pub fn new(
        directory: Arc<dyn SellerDirectory>,
        catalog: Arc<dyn ProductCatalog>,
        options: SyncOptions,
    ) -> Self {
        Self {
            directory,
            catalog,
            options,
        }
    }

    /// Copy the seller's canonical coordinates, address, and delivery radius
    /// onto every product the seller owns.
    ///
    /// A missing profile or a profile without usable coordinates is a logged
    /// no-op, not an error: sellers without a location simply never surface
    /// in location-based search.
    pub async fn sync_seller_products(
        &self,
        user_id: Uuid,
        seller_type: SellerType,
    ) -> AppResult<u64> {
        let Some(profile) = self.directory.get_by_user_id(user_id, seller_type).await? else {
            tracing::warn!(%user_id, %seller_type, "Seller not found, skipping location sync");
            return Ok(0);
        };

        let Some(snapshot) = profile.location_snapshot() else {
            tracing::warn!(
                %user_id,
                %seller_type,
                "Seller profile has no usable coordinates, skipping location sync"
            );
            return Ok(0);
        };

        let affected = self
            .catalog
            .bulk_update_location(user_id, seller_type, &snapshot)
            .await?;

        tracing::info!(%user_id, %seller_type, affected, "Synced product location snapshots");
        Ok(affected)
    }

    /// Entry point for the profile-change event emitted by seller-management
    /// flows
    pub async fn handle_location_changed(&self, event: SellerLocationChanged) -> AppResult<u64> {
        self.sync_seller_products(event.seller_id, event.seller_type)
            .await
    }

    /// Resync every seller's products: all farmers first, then all retailers.
    ///
    /// Per-seller failures are logged, counted, and skipped. `resume_from`
    /// continues a previous run from its last logged checkpoint.
    pub async fn sync_all(&self, resume_from: Option<SyncCheckpoint>) -> AppResult<SyncAllReport> {
        tracing::info!("Starting full product location sync");

        let (farmer_resume, retailer_resume) = match resume_from {
            None => (Resume::FromStart, Resume::FromStart),
            Some(checkpoint) => match checkpoint.seller_type {
                SellerType::Farmer => {
                    (Resume::After(checkpoint.profile_id), Resume::FromStart)
                }
                // Farmers run before retailers, so a retailer checkpoint
                // means the farmer phase already completed.
                SellerType::Retailer => {
                    (Resume::SkipPhase, Resume::After(checkpoint.profile_id))
                }
            },
        };

        let (farmers_updated, farmer_failures) =
            self.sync_seller_kind(SellerType::Farmer, farmer_resume).await?;
        let (retailers_updated, retailer_failures) = self
            .sync_seller_kind(SellerType::Retailer, retailer_resume)
            .await?;

        let report = SyncAllReport {
            farmers_updated,
            retailers_updated,
            total: farmers_updated + retailers_updated,
            failed_sellers: farmer_failures + retailer_failures,
        };

        tracing::info!(
            farmers_updated = report.farmers_updated,
            retailers_updated = report.retailers_updated,
            total = report.total,
            failed_sellers = report.failed_sellers,
            "Full product location sync complete"
        );

        Ok(report)
    }

    async fn sync_seller_kind(
        &self,
        seller_type: SellerType,
        resume: Resume,
    ) -> AppResult<(u64, u64)> {
        let profiles = match resume {
            Resume::SkipPhase => {
                tracing::info!(%seller_type, "Phase already completed, skipping");
                return Ok((0, 0));
            }
            Resume::FromStart => self.directory.list(seller_type).await?,
            Resume::After(profile_id) => {
                let all = self.directory.list(seller_type).await?;
                all.into_iter().filter(|p| p.id > profile_id).collect()
            }
        };

        let total = profiles.len();
        let mut updated: u64 = 0;
        let mut failed: u64 = 0;
        let mut processed: usize = 0;

        // Ordered completion (`buffered`, not `buffer_unordered`) keeps the
        // checkpoint meaningful: every profile at or before it has been
        // processed. In-flight work past the checkpoint is re-done on
        // resume, which is harmless because syncs are idempotent.
        let mut outcomes = stream::iter(profiles.into_iter().map(|profile: SellerProfile| {
            async move {
                let profile_id = profile.id;
                let outcome = match profile.user_id {
                    Some(user_id) => self.sync_seller_products(user_id, seller_type).await,
                    None => {
                        tracing::debug!(%profile_id, %seller_type, "Profile has no owning user, skipping");
                        Ok(0)
                    }
                };
                (profile_id, outcome)
            }
        }))
        .buffered(self.options.parallelism.max(1));

        while let Some((profile_id, outcome)) = outcomes.next().await {
            processed += 1;
            match outcome {
                Ok(count) => updated += count,
                Err(error) => {
                    failed += 1;
                    tracing::error!(
                        %profile_id,
                        %seller_type,
                        %error,
                        "Seller sync failed, continuing batch"
                    );
                }
            }

            if processed % self.options.checkpoint_interval.max(1) == 0 {
                let checkpoint = SyncCheckpoint {
                    seller_type,
                    profile_id,
                };
                tracing::info!(
                    %seller_type,
                    processed,
                    total,
                    checkpoint = %serde_json::to_string(&checkpoint).unwrap_or_default(),
                    "Location sync checkpoint"
                );
            }
        }

        Ok((updated, failed))
    }
}
