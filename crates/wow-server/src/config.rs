use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use wow_ledger::LedgerConfig;

use crate::error::{ServerError, ServerResult};

/// Server settings, usually read from a TOML file.
///
/// ```toml
/// bind_addr = "0.0.0.0:5000"
/// observer_buffer = 32
///
/// [database]
/// kind = "sqlite"
/// path = "wishes.db"
///
/// [ledger]
/// mode = "rpc"
/// endpoint = "http://127.0.0.1:8899"
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database: DatabaseConfig,
    pub ledger: LedgerConfig,
    /// Frames queued per observer before further broadcasts skip it.
    pub observer_buffer: usize,
    /// Send permissive CORS headers.
    pub allow_any_origin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            database: DatabaseConfig::default(),
            ledger: LedgerConfig::default(),
            observer_buffer: 16,
            allow_any_origin: true,
        }
    }
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }
}

/// Where wishes live.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Process memory; gone on restart.
    #[default]
    Memory,
    Sqlite {
        path: PathBuf,
        #[serde(default = "default_pool_size")]
        pool_size: u32,
    },
}

impl DatabaseConfig {
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        Self::Sqlite {
            path: path.into(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_pool_size() -> u32 {
    8
}
