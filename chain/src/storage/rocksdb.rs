//! RocksDB-backed block store.
//!
//! Persists headers and bodies in a RocksDB instance with dedicated column
//! families:
//!
//! - `"headers"`: maps a header's content hash -> canonical JSON header bytes,
//! - `"bodies"`: maps the same hash -> canonical JSON transaction list.

use std::{path::Path, sync::Arc};

use crate::block::body::BlockBody;
use crate::block::header::BlockHeader;
use crate::block::store::BlockStore;
use crate::hash::Hash256;

use rocksdb::{BoundColumnFamily, ColumnFamilyDescriptor, DB, Options};

/// Configuration for [`RocksDbBlockStore`].
#[derive(Clone, Debug)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/chain-db".to_string(),
            create_if_missing: true,
        }
    }
}

/// Storage-level error type.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying RocksDB error.
    RocksDb(rocksdb::Error),
    /// Required column family was not found.
    MissingColumnFamily(&'static str),
}

impl From<rocksdb::Error> for StorageError {
    fn from(e: rocksdb::Error) -> Self {
        StorageError::RocksDb(e)
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::RocksDb(e) => write!(f, "rocksdb error: {e}"),
            StorageError::MissingColumnFamily(name) => write!(f, "missing column family: {name}"),
        }
    }
}

impl std::error::Error for StorageError {}

/// RocksDB-backed implementation of [`BlockStore`].
pub struct RocksDbBlockStore {
    db: DB,
}

impl RocksDbBlockStore {
    /// Opens (or creates) a RocksDB-backed block store at the given path.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StorageError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new("headers", Options::default()),
            ColumnFamilyDescriptor::new("bodies", Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self { db })
    }

    fn cf_headers(&self) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle("headers")
            .ok_or(StorageError::MissingColumnFamily("headers"))
    }

    fn cf_bodies(&self) -> Result<Arc<BoundColumnFamily<'_>>, StorageError> {
        self.db
            .cf_handle("bodies")
            .ok_or(StorageError::MissingColumnFamily("bodies"))
    }
}

impl BlockStore for RocksDbBlockStore {
    fn get_header(&self, hash: &Hash256) -> Option<BlockHeader> {
        let cf = self.cf_headers().ok()?;
        let bytes = self.db.get_cf(&cf, hash.as_bytes()).ok()??;
        serde_json::from_slice(&bytes).ok()
    }

    fn put_header(&mut self, hash: Hash256, header: BlockHeader) {
        let Ok(cf) = self.cf_headers() else {
            tracing::error!("RocksDbBlockStore::put_header: missing 'headers' CF");
            return;
        };
        let Ok(bytes) = serde_json::to_vec(&header) else {
            tracing::error!("RocksDbBlockStore::put_header: failed to encode header");
            return;
        };
        if let Err(e) = self.db.put_cf(&cf, hash.as_bytes(), bytes) {
            tracing::error!(error = %e, "RocksDbBlockStore::put_header failed");
        }
    }

    fn get_body(&self, hash: &Hash256) -> Option<BlockBody> {
        let cf = self.cf_bodies().ok()?;
        let bytes = self.db.get_cf(&cf, hash.as_bytes()).ok()??;
        serde_json::from_slice(&bytes).ok()
    }

    fn put_body(&mut self, hash: Hash256, body: BlockBody) {
        let Ok(cf) = self.cf_bodies() else {
            tracing::error!("RocksDbBlockStore::put_body: missing 'bodies' CF");
            return;
        };
        let Ok(bytes) = serde_json::to_vec(&body) else {
            tracing::error!("RocksDbBlockStore::put_body: failed to encode body");
            return;
        };
        if let Err(e) = self.db.put_cf(&cf, hash.as_bytes(), bytes) {
            tracing::error!(error = %e, "RocksDbBlockStore::put_body failed");
        }
    }
}
