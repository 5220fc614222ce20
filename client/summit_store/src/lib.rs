//! # summit_store
//!
//! Client-side cache for the Summit hiking ledger.
//!
//! Everything here is a non-authoritative, per-browser mirror of ledger
//! state, keyed by user address. Storage failures are logged and treated as
//! "no data"; only state-machine violations surface as errors.
//!
//! ## Modules
//!
//! - [`storage`]: key-value backends and the namespaced key layout.
//! - [`record`]: versioned JSON envelope for stored values.
//! - [`reservation`]: campaign reservation state machine.
//! - [`session`]: GPS climb session checkpoints and capped history.
//! - [`verification`]: summit verifications and the user NFT index.
//! - [`retry`]: error-boundary retry schedule.
//! - [`config`]: store configuration.

pub mod clock;
pub mod config;
pub mod record;
pub mod reservation;
pub mod retry;
pub mod session;
pub mod storage;
pub mod verification;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use record::RecordStore;
pub use reservation::{CampaignReservation, ReservationStatus};
pub use retry::{RetryDecision, RetryPolicy, RetryState};
pub use session::{ClimbOutcome, ClimbRecord, ClimbSession, GpsPoint, SessionStatus};
pub use storage::{KeyValueStore, MemoryStorage, StorageError, StorageKey};
pub use verification::{SummitVerification, VerificationStatus};

#[cfg(feature = "web")]
pub use storage::LocalStorage;

/// Error types for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The user already holds a reservation for this campaign.
    #[error("reservation already exists for campaign {campaign_id}")]
    DuplicateReservation { campaign_id: u32 },

    /// No reservation with this id for the user.
    #[error("reservation not found: {0}")]
    ReservationNotFound(String),

    /// The reservation cannot move between these states.
    #[error("invalid reservation transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },

    /// No climb session is being tracked for the user.
    #[error("no active climb session")]
    NoActiveSession,

    /// A fresh climb session already exists.
    #[error("climb session already in progress: {0}")]
    SessionInProgress(String),

    /// Summit proof needs at least one photo.
    #[error("at least one photo is required")]
    MissingPhotos,

    /// No verification with this id for the user.
    #[error("verification not found: {0}")]
    VerificationNotFound(String),

    /// Configuration JSON could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// The client store: one backend, one clock, one configuration, shared by
/// every record kind.
///
/// Construct one per user-facing context and pass it to whatever needs it.
#[derive(Debug)]
pub struct SummitStore<S, C> {
    records: RecordStore<S>,
    clock: C,
    config: StoreConfig,
}

impl<S: KeyValueStore, C: Clock> SummitStore<S, C> {
    pub fn new(backend: S, clock: C, config: StoreConfig) -> Self {
        let records = RecordStore::new(backend, config.namespace.clone());
        Self {
            records,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn backend(&self) -> &S {
        self.records.backend()
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }
}

impl<S: KeyValueStore> SummitStore<S, SystemClock> {
    pub fn with_defaults(backend: S) -> Self {
        Self::new(backend, SystemClock, StoreConfig::default())
    }
}

#[cfg(test)]
pub(crate) fn test_store() -> SummitStore<MemoryStorage, ManualClock> {
    SummitStore::new(
        MemoryStorage::new(),
        ManualClock::new(1_700_000_000_000),
        StoreConfig::default(),
    )
}
