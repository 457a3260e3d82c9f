use std::path::Path;

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::debug;
use wow_types::{
    Donation, NewDonation, NewUser, NewWish, RowId, TransferStatus, User, Wish, WishDisplay,
};

use crate::error::{StoreError, StoreResult};
use crate::migrations::{initialize_schema, schema_version};
use crate::traits::WishStore;

type ConnectionPool = Pool<SqliteConnectionManager>;
type PooledConn = PooledConnection<SqliteConnectionManager>;

const WISH_COLUMNS: &str =
    "id, title, timestamp, pubkey, wallet_address, signature, status, total_donations, user_id";
const DONATION_COLUMNS: &str =
    "id, wish_id, sender_wallet_address, amount, signature, timestamp, status";
const USER_COLUMNS: &str = "id, username, wallet_address, created_at";

/// Pooled SQLite wish store.
///
/// The donation counter is bumped with a single `UPDATE ... RETURNING`
/// statement, so increments are atomic at the storage layer.
pub struct SqliteWishStore {
    pool: ConnectionPool,
}

impl SqliteWishStore {
    /// Open (or create) a database file and bring its schema up to date.
    pub fn open(path: impl AsRef<Path>, pool_size: u32) -> StoreResult<Self> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA journal_mode = WAL;
                 PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )
        });
        let pool = Pool::builder().max_size(pool_size.max(1)).build(manager)?;
        debug!(path = %path.as_ref().display(), pool_size, "opened sqlite store");
        Self::with_pool(pool)
    }

    /// Open a private in-memory database.
    ///
    /// Every pooled connection to `:memory:` is a separate database, so the
    /// pool holds exactly one connection that never expires.
    pub fn open_in_memory() -> StoreResult<Self> {
        let manager = SqliteConnectionManager::memory()
            .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));
        let pool = Pool::builder()
            .max_size(1)
            .max_lifetime(None)
            .idle_timeout(None)
            .build(manager)?;
        Self::with_pool(pool)
    }

    fn with_pool(pool: ConnectionPool) -> StoreResult<Self> {
        let mut conn = pool.get()?;
        initialize_schema(&mut conn)?;
        drop(conn);
        Ok(Self { pool })
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> StoreResult<i64> {
        schema_version(&*self.conn()?)
    }

    fn conn(&self) -> StoreResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    fn row_to_wish(row: &Row) -> rusqlite::Result<Wish> {
        Ok(Wish {
            id: row.get(0)?,
            title: row.get(1)?,
            timestamp: row.get(2)?,
            pubkey: row.get(3)?,
            wallet_address: row.get(4)?,
            signature: row.get(5)?,
            status: parse_status(row, 6)?,
            total_donations: row.get(7)?,
            user_id: row.get(8)?,
        })
    }

    fn row_to_donation(row: &Row) -> rusqlite::Result<Donation> {
        Ok(Donation {
            id: row.get(0)?,
            wish_id: row.get(1)?,
            sender_wallet_address: row.get(2)?,
            amount: row.get(3)?,
            signature: row.get(4)?,
            timestamp: row.get(5)?,
            status: parse_status(row, 6)?,
        })
    }

    fn row_to_user(row: &Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            wallet_address: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

fn parse_status(row: &Row, idx: usize) -> rusqlite::Result<TransferStatus> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Translate constraint violations into store-level errors.
fn classify(err: rusqlite::Error, entity: &'static str, id: RowId) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, msg) if e.code == ErrorCode::ConstraintViolation => {
            match e.extended_code {
                rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                    StoreError::MissingReference { entity, id }
                }
                rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE => StoreError::Conflict(
                    msg.clone().unwrap_or_else(|| "unique constraint failed".into()),
                ),
                _ => StoreError::Database(err),
            }
        }
        _ => StoreError::Database(err),
    }
}

impl WishStore for SqliteWishStore {
    fn create_user(&self, user: &NewUser) -> StoreResult<User> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "INSERT INTO users (username, wallet_address, created_at)
                 VALUES (?1, ?2, ?3) RETURNING {USER_COLUMNS}"
            ),
            params![user.username, user.wallet_address, Utc::now()],
            Self::row_to_user,
        )
        .map_err(|e| classify(e, "user", 0))
    }

    fn get_user(&self, id: RowId) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn get_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn get_user_by_wallet_address(&self, address: &str) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE wallet_address = ?1"),
                params![address],
                Self::row_to_user,
            )
            .optional()?)
    }

    fn create_wish(&self, wish: &NewWish) -> StoreResult<Wish> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "INSERT INTO wishes (title, timestamp, pubkey, wallet_address, signature, status, user_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING {WISH_COLUMNS}"
            ),
            params![
                wish.title,
                Utc::now(),
                wish.pubkey,
                wish.wallet_address,
                wish.signature,
                wish.status.as_str(),
                wish.user_id,
            ],
            Self::row_to_wish,
        )
        .map_err(|e| classify(e, "user", wish.user_id.unwrap_or_default()))
    }

    fn get_wish_by_id(&self, id: RowId) -> StoreResult<Option<Wish>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("SELECT {WISH_COLUMNS} FROM wishes WHERE id = ?1"),
                params![id],
                Self::row_to_wish,
            )
            .optional()?)
    }

    fn get_wishes(&self) -> StoreResult<Vec<WishDisplay>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WISH_COLUMNS} FROM wishes ORDER BY timestamp DESC, id DESC"
        ))?;
        let rows = stmt.query_map([], Self::row_to_wish)?;

        let mut wishes = Vec::new();
        for wish in rows {
            wishes.push(WishDisplay::from(wish?));
        }
        Ok(wishes)
    }

    fn update_wish_status(&self, id: RowId, status: TransferStatus) -> StoreResult<Option<Wish>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!("UPDATE wishes SET status = ?2 WHERE id = ?1 RETURNING {WISH_COLUMNS}"),
                params![id, status.as_str()],
                Self::row_to_wish,
            )
            .optional()?)
    }

    fn create_donation(&self, donation: &NewDonation) -> StoreResult<Donation> {
        insert_donation(&*self.conn()?, donation)
    }

    fn get_donations_by_wish_id(&self, wish_id: RowId) -> StoreResult<Vec<Donation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {DONATION_COLUMNS} FROM donations WHERE wish_id = ?1
             ORDER BY timestamp DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![wish_id], Self::row_to_donation)?;

        let mut donations = Vec::new();
        for donation in rows {
            donations.push(donation?);
        }
        Ok(donations)
    }

    fn update_donation_status(
        &self,
        id: RowId,
        status: TransferStatus,
    ) -> StoreResult<Option<Donation>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!(
                    "UPDATE donations SET status = ?2 WHERE id = ?1 RETURNING {DONATION_COLUMNS}"
                ),
                params![id, status.as_str()],
                Self::row_to_donation,
            )
            .optional()?)
    }

    fn increment_wish_donations(&self, wish_id: RowId) -> StoreResult<Option<Wish>> {
        bump_donation_count(&*self.conn()?, wish_id)
    }

    /// Insert and count in one transaction; a failure leaves neither behind.
    fn record_donation(&self, donation: &NewDonation) -> StoreResult<(Donation, Wish)> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let created = insert_donation(&tx, donation)?;
        let wish = bump_donation_count(&tx, donation.wish_id)?.ok_or(
            StoreError::MissingReference {
                entity: "wish",
                id: donation.wish_id,
            },
        )?;
        tx.commit()?;
        Ok((created, wish))
    }
}

fn insert_donation(conn: &Connection, donation: &NewDonation) -> StoreResult<Donation> {
    conn.query_row(
        &format!(
            "INSERT INTO donations (wish_id, sender_wallet_address, amount, signature, timestamp, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {DONATION_COLUMNS}"
        ),
        params![
            donation.wish_id,
            donation.sender_wallet_address,
            donation.amount,
            donation.signature,
            Utc::now(),
            donation.status.as_str(),
        ],
        SqliteWishStore::row_to_donation,
    )
    .map_err(|e| classify(e, "wish", donation.wish_id))
}

fn bump_donation_count(conn: &Connection, wish_id: RowId) -> StoreResult<Option<Wish>> {
    Ok(conn
        .query_row(
            &format!(
                "UPDATE wishes SET total_donations = total_donations + 1
                 WHERE id = ?1 RETURNING {WISH_COLUMNS}"
            ),
            params![wish_id],
            SqliteWishStore::row_to_wish,
        )
        .optional()?)
}

impl std::fmt::Debug for SqliteWishStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("SqliteWishStore")
            .field("connections", &state.connections)
            .field("idle", &state.idle_connections)
            .finish()
    }
}
