//! Summit verifications and the per-user NFT index.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::GpsPoint;
use crate::storage::{KeyValueStore, StorageKey};
use crate::{Clock, Result, StoreError, SummitStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummitVerification {
    pub id: String,
    pub user_id: String,
    pub campaign_id: u32,
    pub mountain_id: u32,
    pub photos: Vec<String>,
    #[serde(default)]
    pub summit: Option<GpsPoint>,
    pub submitted_at: u64,
    pub status: VerificationStatus,
    #[serde(default)]
    pub token_id: Option<u64>,
}

impl<S: KeyValueStore, C: Clock> SummitStore<S, C> {
    pub fn submit_verification(
        &self,
        user: &str,
        campaign_id: u32,
        mountain_id: u32,
        photos: Vec<String>,
        summit: Option<GpsPoint>,
    ) -> Result<SummitVerification> {
        if photos.is_empty() {
            return Err(StoreError::MissingPhotos);
        }

        let now = self.now();
        let mut verifications = self.verifications(user);
        let verification = SummitVerification {
            id: format!("ver-{}-{}-{}-{}", mountain_id, user.to_lowercase(), now, verifications.len()),
            user_id: user.to_string(),
            campaign_id,
            mountain_id,
            photos,
            summit,
            submitted_at: now,
            status: VerificationStatus::Pending,
            token_id: None,
        };

        verifications.push(verification.clone());
        self.records
            .write(StorageKey::SummitVerifications, user, &verifications);

        Ok(verification)
    }

    pub fn verifications(&self, user: &str) -> Vec<SummitVerification> {
        self.records.read_list(StorageKey::SummitVerifications, user)
    }

    pub fn update_verification(
        &self,
        user: &str,
        id: &str,
        status: VerificationStatus,
        token_id: Option<u64>,
    ) -> Result<SummitVerification> {
        let mut verifications = self.verifications(user);
        let verification = verifications
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| StoreError::VerificationNotFound(id.to_string()))?;

        verification.status = status;
        if token_id.is_some() {
            verification.token_id = token_id;
        }
        let updated = verification.clone();

        self.records
            .write(StorageKey::SummitVerifications, user, &verifications);
        if let (VerificationStatus::Approved, Some(token_id)) = (status, updated.token_id) {
            self.add_user_nft(user, token_id);
        }
        debug!(user, id, ?status, "verification updated");

        Ok(updated)
    }

    /// Record that `user` holds `token_id`. Duplicates are ignored.
    pub fn add_user_nft(&self, user: &str, token_id: u64) {
        let mut tokens = self.user_nfts(user);
        if tokens.contains(&token_id) {
            return;
        }
        tokens.push(token_id);
        self.records.write(StorageKey::UserNfts, user, &tokens);
    }

    pub fn user_nfts(&self, user: &str) -> Vec<u64> {
        self.records.read_list(StorageKey::UserNfts, user)
    }
}
