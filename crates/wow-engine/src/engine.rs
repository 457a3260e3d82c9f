use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use wow_hub::{BroadcastHub, ObserverId, Subscription};
use wow_ledger::{LedgerClient, LedgerEntry, LedgerMode};
use wow_store::{StoreResult, WishStore};
use wow_types::{
    validate_address, validate_title, validate_wish_id, Donation, FieldError, NewDonation,
    NewUser, NewWish, RowId, Snapshot, TransferStatus, User, Wish,
};

use crate::error::{collect_field_errors, EngineError, EngineResult};
use crate::locks::WishLocks;
use crate::requests::{DonationReceipt, DonationRequest, WishReceipt};

/// Longest accepted username.
const MAX_USERNAME_LEN: usize = 50;

/// Wish and donation use cases over a store, a ledger, and a hub.
///
/// The engine holds no wish or donation state of its own. Every broadcast
/// re-reads the whole snapshot from the store while holding the publish
/// lock, so the snapshots observers see never go backwards, and an observer
/// that joins mid-stream gets a baseline no older than the last broadcast.
pub struct MutationEngine {
    store: Arc<dyn WishStore>,
    ledger: Arc<dyn LedgerClient>,
    hub: Arc<BroadcastHub>,
    publish_lock: Mutex<()>,
    wish_locks: WishLocks,
}

impl MutationEngine {
    pub fn new(
        store: Arc<dyn WishStore>,
        ledger: Arc<dyn LedgerClient>,
        hub: Arc<BroadcastHub>,
    ) -> Self {
        Self {
            store,
            ledger,
            hub,
            publish_lock: Mutex::new(()),
            wish_locks: WishLocks::new(),
        }
    }

    pub fn hub(&self) -> &Arc<BroadcastHub> {
        &self.hub
    }

    pub fn ledger_mode(&self) -> LedgerMode {
        self.ledger.mode()
    }

    // ---- Mutations ----

    /// Record a wish on the ledger, persist it, and broadcast.
    ///
    /// If the ledger cannot record the entry, a placeholder entry is used
    /// and the receipt is marked `degraded`; the wish is stored either way.
    pub async fn create_wish(&self, title: &str, wallet_public_key: &str) -> EngineResult<WishReceipt> {
        collect_field_errors([
            validate_title(title),
            validate_address("walletPublicKey", wallet_public_key),
        ])?;

        let (entry, degraded) = match self.ledger.record_entry(title, wallet_public_key).await {
            Ok(entry) => (entry, false),
            Err(err) => {
                warn!(error = %err, "ledger record failed; using fallback entry");
                (LedgerEntry::fallback(title, wallet_public_key), true)
            }
        };

        let owner = wallet_public_key.to_string();
        let user_id = self
            .with_store(move |store| store.get_user_by_wallet_address(&owner))
            .await?
            .map(|user| user.id);

        let new_wish = NewWish::new(title)
            .pubkey(entry.address.clone())
            .wallet_address(wallet_public_key)
            .signature(entry.reference.clone())
            .status(TransferStatus::Confirmed)
            .user_id(user_id);
        let wish = self.with_store(move |store| store.create_wish(&new_wish)).await?;
        info!(wish_id = wish.id, degraded, "wish created");

        self.publish().await;

        Ok(WishReceipt {
            signature: entry.reference,
            pubkey: entry.address,
            degraded,
        })
    }

    /// Transfer value to a wish's creator and account for it.
    ///
    /// A failed transfer aborts the whole operation: no donation row, no
    /// counter change, no broadcast.
    pub async fn create_donation(&self, request: DonationRequest) -> EngineResult<DonationReceipt> {
        request.validate()?;
        let wish_id = request.wish_id;

        if self
            .with_store(move |store| store.get_wish_by_id(wish_id))
            .await?
            .is_none()
        {
            return Err(EngineError::wish_not_found(wish_id));
        }

        let transaction = self
            .ledger
            .transfer(
                &request.sender_wallet_address,
                &request.recipient_wallet_address,
                request.amount,
            )
            .await
            .map_err(|err| {
                warn!(wish_id, error = %err, "donation transfer failed");
                EngineError::Transfer(err)
            })?;

        let new_donation = NewDonation::new(wish_id, request.sender_wallet_address, request.amount)
            .signature(transaction.reference.clone())
            .status(TransferStatus::Confirmed);
        let (donation, wish) = self.record_donation(new_donation).await?;
        info!(
            wish_id,
            donation_id = donation.id,
            total_donations = wish.total_donations,
            "donation recorded"
        );

        self.publish().await;

        Ok(DonationReceipt {
            donation,
            transaction,
        })
    }

    /// Set a wish's status and broadcast.
    pub async fn update_wish_status(&self, id: RowId, status: TransferStatus) -> EngineResult<Wish> {
        let wish = self
            .with_store(move |store| store.update_wish_status(id, status))
            .await?
            .ok_or_else(|| EngineError::wish_not_found(id))?;
        self.publish().await;
        Ok(wish)
    }

    /// Register a user. Registration changes no wish, so nothing is broadcast.
    pub async fn register_user(&self, user: NewUser) -> EngineResult<User> {
        let username_check = if user.username.trim().is_empty() {
            Err(FieldError::new("username", "Username is required"))
        } else if user.username.chars().count() > MAX_USERNAME_LEN {
            Err(FieldError::new(
                "username",
                format!("Username must be at most {MAX_USERNAME_LEN} characters"),
            ))
        } else {
            Ok(())
        };
        let wallet_check = match &user.wallet_address {
            Some(address) => validate_address("walletAddress", address),
            None => Ok(()),
        };
        collect_field_errors([username_check, wallet_check])?;

        let user = self.with_store(move |store| store.create_user(&user)).await?;
        info!(user_id = user.id, "user registered");
        Ok(user)
    }

    // ---- Queries ----

    /// The current wall, newest first.
    pub async fn get_wishes(&self) -> EngineResult<Snapshot> {
        let rows = self.with_store(|store| store.get_wishes()).await?;
        Ok(Snapshot::new(rows))
    }

    pub async fn get_wish_by_id(&self, id: RowId) -> EngineResult<Wish> {
        self.with_store(move |store| store.get_wish_by_id(id))
            .await?
            .ok_or_else(|| EngineError::wish_not_found(id))
    }

    /// Donations for one wish, newest first.
    pub async fn get_donations(&self, wish_id: RowId) -> EngineResult<Vec<Donation>> {
        collect_field_errors([validate_wish_id(wish_id)])?;
        self.get_wish_by_id(wish_id).await?;
        self.with_store(move |store| store.get_donations_by_wish_id(wish_id))
            .await
    }

    // ---- Observers ----

    /// Join the hub and receive the current snapshot as the first message.
    pub async fn connect_observer(&self) -> EngineResult<Subscription> {
        let _order = self.publish_lock.lock().await;
        let snapshot = self.get_wishes().await?;
        Ok(self.hub.connect(&snapshot)?)
    }

    pub fn disconnect_observer(&self, id: ObserverId) -> bool {
        self.hub.disconnect(id)
    }

    pub fn observer_count(&self) -> usize {
        self.hub.observer_count()
    }

    // ---- Internals ----

    async fn record_donation(&self, donation: NewDonation) -> EngineResult<(Donation, Wish)> {
        let wish_id = donation.wish_id;
        let _serial = if self.store.atomic_increments() {
            None
        } else {
            Some(self.wish_locks.lock(wish_id).await)
        };

        self.with_store(move |store| store.record_donation(&donation))
            .await
            .map_err(|err| {
                error!(wish_id, error = %err, "transfer succeeded but donation was not recorded");
                err
            })
    }

    /// Re-read the snapshot and fan it out.
    ///
    /// Runs after the mutation is committed. Failures are logged and never
    /// reach the caller: the write stands whether or not anyone hears of it.
    async fn publish(&self) {
        let _order = self.publish_lock.lock().await;
        let snapshot = match self.get_wishes().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(error = %err, "snapshot read failed; broadcast skipped");
                return;
            }
        };
        match self.hub.broadcast(&snapshot) {
            Ok(report) => debug!(
                wishes = snapshot.len(),
                delivered = report.delivered,
                skipped = report.skipped,
                "published snapshot"
            ),
            Err(err) => error!(error = %err, "broadcast failed"),
        }
    }

    /// Run a blocking store call off the async workers.
    async fn with_store<T, F>(&self, op: F) -> EngineResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn WishStore) -> StoreResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .map_err(|e| EngineError::Unexpected(format!("store task failed: {e}")))?
            .map_err(EngineError::from)
    }
}

impl std::fmt::Debug for MutationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationEngine")
            .field("ledger", &self.ledger.mode())
            .field("observers", &self.hub.observer_count())
            .finish()
    }
}
