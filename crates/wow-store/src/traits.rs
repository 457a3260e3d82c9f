use tracing::error;
use wow_types::{
    Donation, NewDonation, NewUser, NewWish, RowId, TransferStatus, User, Wish, WishDisplay,
};

use crate::error::{StoreError, StoreResult};

/// Authoritative storage for users, wishes, and donations.
///
/// All implementations must satisfy these invariants:
/// - `id`s are assigned by the store, unique, and never reused.
/// - `timestamp`s are assigned once, at insert.
/// - `get_wishes` is ordered newest-timestamp-first and is idempotent
///   absent writes.
/// - `increment_wish_donations` is the only writer of `total_donations`.
///   When [`WishStore::atomic_increments`] returns `true`, concurrent
///   increments on one wish never lose updates.
pub trait WishStore: Send + Sync {
    // ---- Users ----

    fn create_user(&self, user: &NewUser) -> StoreResult<User>;

    fn get_user(&self, id: RowId) -> StoreResult<Option<User>>;

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;

    fn get_user_by_wallet_address(&self, address: &str) -> StoreResult<Option<User>>;

    // ---- Wishes ----

    fn create_wish(&self, wish: &NewWish) -> StoreResult<Wish>;

    /// Returns `Ok(None)` if the wish does not exist.
    fn get_wish_by_id(&self, id: RowId) -> StoreResult<Option<Wish>>;

    /// All wishes in display shape, newest first.
    fn get_wishes(&self) -> StoreResult<Vec<WishDisplay>>;

    fn update_wish_status(&self, id: RowId, status: TransferStatus) -> StoreResult<Option<Wish>>;

    // ---- Donations ----

    /// Insert a donation. Fails with `MissingReference` if the wish is absent.
    fn create_donation(&self, donation: &NewDonation) -> StoreResult<Donation>;

    /// Donations for one wish, newest first.
    fn get_donations_by_wish_id(&self, wish_id: RowId) -> StoreResult<Vec<Donation>>;

    fn update_donation_status(
        &self,
        id: RowId,
        status: TransferStatus,
    ) -> StoreResult<Option<Donation>>;

    /// Add one to the wish's donation counter and return the updated row.
    ///
    /// Returns `Ok(None)` if the wish vanished.
    fn increment_wish_donations(&self, wish_id: RowId) -> StoreResult<Option<Wish>>;

    /// Insert a donation and count it against its wish.
    ///
    /// Returns the stored donation and the wish with its new counter. The
    /// default runs [`create_donation`](Self::create_donation) then
    /// [`increment_wish_donations`](Self::increment_wish_donations);
    /// backends that can commit both as one unit override it.
    fn record_donation(&self, donation: &NewDonation) -> StoreResult<(Donation, Wish)> {
        let created = self.create_donation(donation)?;
        match self.increment_wish_donations(donation.wish_id)? {
            Some(wish) => Ok((created, wish)),
            None => {
                error!(
                    wish_id = donation.wish_id,
                    donation_id = created.id,
                    "wish vanished before its donation was counted"
                );
                Err(StoreError::MissingReference {
                    entity: "wish",
                    id: donation.wish_id,
                })
            }
        }
    }

    /// Whether `increment_wish_donations` is a single atomic read-modify-write.
    ///
    /// Callers must serialize increments per wish when this is `false`.
    fn atomic_increments(&self) -> bool {
        true
    }
}
