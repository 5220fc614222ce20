//! Campaign reservation state machine.
//!
//! ```text
//! reserved -> in_progress -> verifying -> minting -> completed
//!     \            \              \           \
//!      `------------`--------------`-----------`--> failed
//! ```
//!
//! `minting -> completed` only happens once the ledger reports the NFT as
//! verified; a successful mint transaction alone leaves the reservation in
//! `minting`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::storage::{KeyValueStore, StorageKey};
use crate::{Clock, Result, StoreError, SummitStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Reserved,
    InProgress,
    Verifying,
    Minting,
    Completed,
    Failed,
}

impl ReservationStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Failed)
    }

    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        match (self, next) {
            (from, Failed) => !from.is_terminal(),
            (Reserved, InProgress)
            | (InProgress, Verifying)
            | (Verifying, Minting)
            | (Minting, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReservationStatus::Reserved => "reserved",
            ReservationStatus::InProgress => "in_progress",
            ReservationStatus::Verifying => "verifying",
            ReservationStatus::Minting => "minting",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignReservation {
    pub id: String,
    pub campaign_id: u32,
    pub mountain_id: u32,
    pub user_id: String,
    pub status: ReservationStatus,
    pub created_at: u64,
    pub updated_at: u64,
    #[serde(default)]
    pub started_at: Option<u64>,
    #[serde(default)]
    pub completed_at: Option<u64>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub nft_token_id: Option<u64>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<S: KeyValueStore, C: Clock> SummitStore<S, C> {
    /// Reserve a spot in a campaign. One reservation per (user, campaign).
    pub fn reserve(&self, user: &str, campaign_id: u32, mountain_id: u32) -> Result<CampaignReservation> {
        let mut reservations = self.reservations(user);
        if reservations.iter().any(|r| r.campaign_id == campaign_id) {
            return Err(StoreError::DuplicateReservation { campaign_id });
        }

        let now = self.now();
        let reservation = CampaignReservation {
            id: format!("res-{}-{}-{}", campaign_id, user.to_lowercase(), now),
            campaign_id,
            mountain_id,
            user_id: user.to_string(),
            status: ReservationStatus::Reserved,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            photos: Vec::new(),
            nft_token_id: None,
            tx_hash: None,
            error: None,
        };

        reservations.push(reservation.clone());
        self.records.write(StorageKey::Reservations, user, &reservations);
        debug!(user, campaign_id, id = %reservation.id, "reserved campaign spot");

        Ok(reservation)
    }

    pub fn reservations(&self, user: &str) -> Vec<CampaignReservation> {
        self.records.read_list(StorageKey::Reservations, user)
    }

    pub fn reservation(&self, user: &str, id: &str) -> Option<CampaignReservation> {
        self.reservations(user).into_iter().find(|r| r.id == id)
    }

    pub fn reservation_for_campaign(&self, user: &str, campaign_id: u32) -> Option<CampaignReservation> {
        self.reservations(user)
            .into_iter()
            .find(|r| r.campaign_id == campaign_id)
    }

    pub fn start_climb(&self, user: &str, id: &str) -> Result<CampaignReservation> {
        let now = self.now();
        self.transition(user, id, ReservationStatus::InProgress, |r| {
            r.started_at = Some(now);
        })
    }

    pub fn submit_photos(&self, user: &str, id: &str, photos: Vec<String>) -> Result<CampaignReservation> {
        if photos.is_empty() {
            return Err(StoreError::MissingPhotos);
        }
        self.transition(user, id, ReservationStatus::Verifying, |r| {
            r.photos = photos;
        })
    }

    /// A mint transaction for this reservation was confirmed.
    pub fn record_mint(
        &self,
        user: &str,
        id: &str,
        token_id: u64,
        tx_hash: impl Into<String>,
    ) -> Result<CampaignReservation> {
        let tx_hash = tx_hash.into();
        self.transition(user, id, ReservationStatus::Minting, |r| {
            r.nft_token_id = Some(token_id);
            r.tx_hash = Some(tx_hash);
        })
    }

    /// Feed in the ledger's verified flag for the reservation's NFT.
    ///
    /// Completes the reservation when `verified` is true; otherwise the
    /// reservation is returned untouched and stays in `minting`.
    pub fn observe_verification(&self, user: &str, id: &str, verified: bool) -> Result<CampaignReservation> {
        let current = self
            .reservation(user, id)
            .ok_or_else(|| StoreError::ReservationNotFound(id.to_string()))?;
        if current.status != ReservationStatus::Minting {
            return Err(StoreError::InvalidTransition {
                from: current.status,
                to: ReservationStatus::Completed,
            });
        }
        if !verified {
            return Ok(current);
        }

        let now = self.now();
        let completed = self.transition(user, id, ReservationStatus::Completed, |r| {
            r.completed_at = Some(now);
        })?;
        if let Some(token_id) = completed.nft_token_id {
            self.add_user_nft(user, token_id);
        }
        info!(user, id, "reservation completed after on-chain verification");

        Ok(completed)
    }

    pub fn fail(&self, user: &str, id: &str, error: impl Into<String>) -> Result<CampaignReservation> {
        let error = error.into();
        self.transition(user, id, ReservationStatus::Failed, |r| {
            r.error = Some(error);
        })
    }

    pub fn cancel_reservation(&self, user: &str, id: &str) -> Result<()> {
        let mut reservations = self.reservations(user);
        let before = reservations.len();
        reservations.retain(|r| r.id != id);
        if reservations.len() == before {
            return Err(StoreError::ReservationNotFound(id.to_string()));
        }
        self.records.write(StorageKey::Reservations, user, &reservations);
        Ok(())
    }

    fn transition<F>(&self, user: &str, id: &str, next: ReservationStatus, apply: F) -> Result<CampaignReservation>
    where
        F: FnOnce(&mut CampaignReservation),
    {
        let mut reservations = self.reservations(user);
        let reservation = reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::ReservationNotFound(id.to_string()))?;

        if !reservation.status.can_transition_to(next) {
            return Err(StoreError::InvalidTransition {
                from: reservation.status,
                to: next,
            });
        }

        apply(reservation);
        debug!(user, id, from = %reservation.status, to = %next, "reservation transition");
        reservation.status = next;
        reservation.updated_at = self.now();
        let updated = reservation.clone();

        self.records.write(StorageKey::Reservations, user, &reservations);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_store;

    #[test]
    fn happy_path_requires_onchain_verification() {
        let store = test_store();
        let r = store.reserve("alice", 1, 10).unwrap();
        assert_eq!(r.status, ReservationStatus::Reserved);

        store.start_climb("alice", &r.id).unwrap();
        store.submit_photos("alice", &r.id, vec!["ipfs://a".into()]).unwrap();
        let minting = store.record_mint("alice", &r.id, 7, "0xabc").unwrap();
        assert_eq!(minting.status, ReservationStatus::Minting);
        assert_eq!(minting.nft_token_id, Some(7));

        let still_minting = store.observe_verification("alice", &r.id, false).unwrap();
        assert_eq!(still_minting.status, ReservationStatus::Minting);
        assert!(store.user_nfts("alice").is_empty());

        store.clock().advance(5_000);
        let done = store.observe_verification("alice", &r.id, true).unwrap();
        assert_eq!(done.status, ReservationStatus::Completed);
        assert_eq!(done.completed_at, Some(done.updated_at));
        assert_eq!(store.user_nfts("alice"), vec![7]);
    }

    #[test]
    fn one_reservation_per_user_and_campaign() {
        let store = test_store();
        store.reserve("alice", 1, 10).unwrap();

        assert!(matches!(
            store.reserve("alice", 1, 11),
            Err(StoreError::DuplicateReservation { campaign_id: 1 })
        ));
        store.reserve("alice", 2, 10).unwrap();
        store.reserve("bob", 1, 10).unwrap();

        assert_eq!(store.reservations("alice").len(), 2);
        assert_eq!(store.reservations("bob").len(), 1);
        assert_eq!(store.reservation_for_campaign("alice", 2).unwrap().mountain_id, 10);
    }

    #[test]
    fn cannot_skip_states() {
        let store = test_store();
        let r = store.reserve("alice", 1, 10).unwrap();

        let err = store.record_mint("alice", &r.id, 1, "0x1").unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: ReservationStatus::Reserved,
                to: ReservationStatus::Minting,
            }
        ));
        assert!(matches!(
            store.observe_verification("alice", &r.id, true),
            Err(StoreError::InvalidTransition { .. })
        ));
        assert_eq!(store.reservation("alice", &r.id).unwrap().status, ReservationStatus::Reserved);
    }

    #[test]
    fn failed_from_any_non_terminal_state() {
        let store = test_store();
        let r = store.reserve("alice", 1, 10).unwrap();
        store.start_climb("alice", &r.id).unwrap();

        let failed = store.fail("alice", &r.id, "gps lost").unwrap();
        assert_eq!(failed.status, ReservationStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("gps lost"));

        assert!(matches!(
            store.fail("alice", &r.id, "again"),
            Err(StoreError::InvalidTransition { .. })
        ));
        assert!(!ReservationStatus::Completed.can_transition_to(ReservationStatus::Failed));
    }

    #[test]
    fn photos_required() {
        let store = test_store();
        let r = store.reserve("alice", 1, 10).unwrap();
        store.start_climb("alice", &r.id).unwrap();

        assert!(matches!(
            store.submit_photos("alice", &r.id, Vec::new()),
            Err(StoreError::MissingPhotos)
        ));
    }

    #[test]
    fn cancel_frees_the_campaign_slot() {
        let store = test_store();
        let r = store.reserve("alice", 1, 10).unwrap();
        store.cancel_reservation("alice", &r.id).unwrap();

        assert!(store.reservation_for_campaign("alice", 1).is_none());
        store.reserve("alice", 1, 12).unwrap();
        assert!(matches!(
            store.cancel_reservation("alice", "missing"),
            Err(StoreError::ReservationNotFound(_))
        ));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&ReservationStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
