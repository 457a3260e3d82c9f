use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::Utc;
use wow_types::{
    Donation, NewDonation, NewUser, NewWish, RowId, Snapshot, TransferStatus, User, Wish,
    WishDisplay,
};

use crate::error::{StoreError, StoreResult};
use crate::traits::WishStore;

/// In-memory, map-based wish store.
///
/// Intended for tests and embedding. All tables live behind one `RwLock`, so
/// every write (the donation counter included) is a single critical section.
pub struct InMemoryWishStore {
    inner: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<RowId, User>,
    wishes: BTreeMap<RowId, Wish>,
    donations: BTreeMap<RowId, Donation>,
    next_user_id: RowId,
    next_wish_id: RowId,
    next_donation_id: RowId,
}

impl Tables {
    fn insert_donation(&mut self, donation: &NewDonation) -> Donation {
        let id = next_id(&mut self.next_donation_id);
        let created = Donation {
            id,
            wish_id: donation.wish_id,
            sender_wallet_address: donation.sender_wallet_address.clone(),
            amount: donation.amount,
            signature: donation.signature.clone(),
            timestamp: Utc::now(),
            status: donation.status,
        };
        self.donations.insert(id, created.clone());
        created
    }
}

fn next_id(counter: &mut RowId) -> RowId {
    *counter += 1;
    *counter
}

impl InMemoryWishStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tables::default()),
        }
    }

    /// Number of wishes currently stored.
    pub fn wish_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").wishes.len()
    }

    /// Number of donations currently stored.
    pub fn donation_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").donations.len()
    }
}

impl Default for InMemoryWishStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WishStore for InMemoryWishStore {
    fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        let mut tables = self.inner.write().expect("lock poisoned");
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username already taken: {}",
                user.username
            )));
        }
        if let Some(address) = &user.wallet_address {
            if tables
                .users
                .values()
                .any(|u| u.wallet_address.as_ref() == Some(address))
            {
                return Err(StoreError::Conflict(format!(
                    "wallet address already registered: {address}"
                )));
            }
        }
        let id = next_id(&mut tables.next_user_id);
        let created = User {
            id,
            username: user.username.clone(),
            wallet_address: user.wallet_address.clone(),
            created_at: Utc::now(),
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    fn get_user(&self, id: RowId) -> StoreResult<Option<User>> {
        let tables = self.inner.read().expect("lock poisoned");
        Ok(tables.users.get(&id).cloned())
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.inner.read().expect("lock poisoned");
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    fn get_user_by_wallet_address(&self, address: &str) -> StoreResult<Option<User>> {
        let tables = self.inner.read().expect("lock poisoned");
        Ok(tables
            .users
            .values()
            .find(|u| u.wallet_address.as_deref() == Some(address))
            .cloned())
    }

    fn create_wish(&self, wish: &NewWish) -> StoreResult<Wish> {
        let mut tables = self.inner.write().expect("lock poisoned");
        if let Some(user_id) = wish.user_id {
            if !tables.users.contains_key(&user_id) {
                return Err(StoreError::MissingReference {
                    entity: "user",
                    id: user_id,
                });
            }
        }
        let id = next_id(&mut tables.next_wish_id);
        let created = Wish {
            id,
            title: wish.title.clone(),
            timestamp: Utc::now(),
            pubkey: wish.pubkey.clone(),
            wallet_address: wish.wallet_address.clone(),
            signature: wish.signature.clone(),
            status: wish.status,
            total_donations: 0,
            user_id: wish.user_id,
        };
        tables.wishes.insert(id, created.clone());
        Ok(created)
    }

    fn get_wish_by_id(&self, id: RowId) -> StoreResult<Option<Wish>> {
        let tables = self.inner.read().expect("lock poisoned");
        Ok(tables.wishes.get(&id).cloned())
    }

    fn get_wishes(&self) -> StoreResult<Vec<WishDisplay>> {
        let tables = self.inner.read().expect("lock poisoned");
        let rows = tables.wishes.values().map(WishDisplay::from).collect();
        Ok(Snapshot::new(rows).into_wishes())
    }

    fn update_wish_status(&self, id: RowId, status: TransferStatus) -> StoreResult<Option<Wish>> {
        let mut tables = self.inner.write().expect("lock poisoned");
        Ok(tables.wishes.get_mut(&id).map(|wish| {
            wish.status = status;
            wish.clone()
        }))
    }

    fn create_donation(&self, donation: &NewDonation) -> StoreResult<Donation> {
        let mut tables = self.inner.write().expect("lock poisoned");
        if !tables.wishes.contains_key(&donation.wish_id) {
            return Err(StoreError::MissingReference {
                entity: "wish",
                id: donation.wish_id,
            });
        }
        Ok(tables.insert_donation(donation))
    }

    fn get_donations_by_wish_id(&self, wish_id: RowId) -> StoreResult<Vec<Donation>> {
        let tables = self.inner.read().expect("lock poisoned");
        let mut rows: Vec<Donation> = tables
            .donations
            .values()
            .filter(|d| d.wish_id == wish_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn update_donation_status(
        &self,
        id: RowId,
        status: TransferStatus,
    ) -> StoreResult<Option<Donation>> {
        let mut tables = self.inner.write().expect("lock poisoned");
        Ok(tables.donations.get_mut(&id).map(|donation| {
            donation.status = status;
            donation.clone()
        }))
    }

    fn increment_wish_donations(&self, wish_id: RowId) -> StoreResult<Option<Wish>> {
        // Read and write under the same guard.
        let mut tables = self.inner.write().expect("lock poisoned");
        Ok(tables.wishes.get_mut(&wish_id).map(|wish| {
            wish.total_donations += 1;
            wish.clone()
        }))
    }

    fn record_donation(&self, donation: &NewDonation) -> StoreResult<(Donation, Wish)> {
        let mut tables = self.inner.write().expect("lock poisoned");
        let Some(wish) = tables.wishes.get_mut(&donation.wish_id) else {
            return Err(StoreError::MissingReference {
                entity: "wish",
                id: donation.wish_id,
            });
        };
        wish.total_donations += 1;
        let wish = wish.clone();

        Ok((tables.insert_donation(donation), wish))
    }
}

impl std::fmt::Debug for InMemoryWishStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryWishStore")
            .field("wish_count", &self.wish_count())
            .field("donation_count", &self.donation_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const WALLET: &str = "Ab12Cd34Ef56Gh78Ij90Kl12Mn34Op56";

    fn store_with_wish(title: &str) -> (InMemoryWishStore, Wish) {
        let store = InMemoryWishStore::new();
        let wish = store
            .create_wish(&NewWish::new(title).wallet_address(WALLET))
            .unwrap();
        (store, wish)
    }

    // -----------------------------------------------------------------------
    // Wishes
    // -----------------------------------------------------------------------

    #[test]
    fn create_and_read_wish() {
        let (store, wish) = store_with_wish("Peace");
        assert_eq!(wish.id, 1);
        assert_eq!(wish.total_donations, 0);
        assert_eq!(wish.status, TransferStatus::Pending);

        let read_back = store.get_wish_by_id(wish.id).unwrap().expect("should exist");
        assert_eq!(read_back, wish);
    }

    #[test]
    fn missing_wish_is_none() {
        let store = InMemoryWishStore::new();
        assert!(store.get_wish_by_id(42).unwrap().is_none());
        assert!(store.increment_wish_donations(42).unwrap().is_none());
        assert!(store
            .update_wish_status(42, TransferStatus::Failed)
            .unwrap()
            .is_none());
    }

    #[test]
    fn wishes_listed_newest_first() {
        let store = InMemoryWishStore::new();
        for title in ["one", "two", "three"] {
            store.create_wish(&NewWish::new(title)).unwrap();
        }
        let wishes = store.get_wishes().unwrap();
        let titles: Vec<&str> = wishes.iter().map(|w| w.title.as_str()).collect();
        assert_eq!(titles, vec!["three", "two", "one"]);
        assert_eq!(store.get_wishes().unwrap(), wishes);
    }

    #[test]
    fn update_wish_status() {
        let (store, wish) = store_with_wish("Peace");
        let updated = store
            .update_wish_status(wish.id, TransferStatus::Confirmed)
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TransferStatus::Confirmed);
        assert_eq!(updated.timestamp, wish.timestamp);
    }

    #[test]
    fn wish_rejects_unknown_user() {
        let store = InMemoryWishStore::new();
        let err = store
            .create_wish(&NewWish::new("Peace").user_id(Some(9)))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "user", id: 9 }));
    }

    // -----------------------------------------------------------------------
    // Donations
    // -----------------------------------------------------------------------

    #[test]
    fn donation_requires_existing_wish() {
        let store = InMemoryWishStore::new();
        let err = store
            .create_donation(&NewDonation::new(9999, WALLET, 10))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "wish", id: 9999 }));
        assert_eq!(store.donation_count(), 0);
    }

    #[test]
    fn donations_listed_per_wish() {
        let (store, wish) = store_with_wish("Peace");
        let other = store.create_wish(&NewWish::new("Other")).unwrap();
        store
            .create_donation(&NewDonation::new(wish.id, WALLET, 10))
            .unwrap();
        let second = store
            .create_donation(&NewDonation::new(wish.id, WALLET, 20).signature("sig"))
            .unwrap();
        store
            .create_donation(&NewDonation::new(other.id, WALLET, 30))
            .unwrap();

        let rows = store.get_donations_by_wish_id(wish.id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, second.id);
    }

    #[test]
    fn update_donation_status() {
        let (store, wish) = store_with_wish("Peace");
        let d = store
            .create_donation(&NewDonation::new(wish.id, WALLET, 10))
            .unwrap();
        let updated = store
            .update_donation_status(d.id, TransferStatus::Confirmed)
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TransferStatus::Confirmed);
        assert!(store
            .update_donation_status(77, TransferStatus::Confirmed)
            .unwrap()
            .is_none());
    }

    #[test]
    fn record_donation_inserts_and_counts_together() {
        let (store, wish) = store_with_wish("Peace");
        let (donation, counted) = store
            .record_donation(&NewDonation::new(wish.id, WALLET, 500_000))
            .unwrap();
        assert_eq!(donation.wish_id, wish.id);
        assert_eq!(counted.total_donations, 1);
        assert_eq!(store.donation_count(), 1);

        let err = store
            .record_donation(&NewDonation::new(wish.id + 1, WALLET, 1))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingReference { entity: "wish", .. }));
        assert_eq!(store.donation_count(), 1);
    }

    #[test]
    fn concurrent_increments_lose_nothing() {
        let (store, wish) = store_with_wish("Peace");
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..25 {
                        store.increment_wish_donations(wish.id).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        let wish = store.get_wish_by_id(wish.id).unwrap().unwrap();
        assert_eq!(wish.total_donations, 200);
        assert!(store.atomic_increments());
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    #[test]
    fn users_unique_by_name_and_wallet() {
        let store = InMemoryWishStore::new();
        let alice = store
            .create_user(&NewUser::new("alice").with_wallet(WALLET))
            .unwrap();
        assert!(matches!(
            store.create_user(&NewUser::new("alice")),
            Err(StoreError::Conflict(_))
        ));
        assert!(matches!(
            store.create_user(&NewUser::new("bob").with_wallet(WALLET)),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.get_user(alice.id).unwrap(), Some(alice.clone()));
        assert_eq!(store.get_user_by_username("alice").unwrap(), Some(alice.clone()));
        assert_eq!(store.get_user_by_wallet_address(WALLET).unwrap(), Some(alice));
        assert!(store.get_user_by_username("carol").unwrap().is_none());
    }
}
