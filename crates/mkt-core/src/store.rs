//! Pluggable key-value document store.
//!
//! Two named documents are in use: the listings catalog (key `listings`) and
//! the bot settings (key `config`). The remote backend is optional; writes
//! are best-effort dual writes (remote may fail without blocking the local
//! file write), reads prefer the remote copy.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{catalog::Catalog, settings::BotSettings, Error, Result};

pub const LISTINGS_KEY: &str = "listings";
pub const CONFIG_KEY: &str = "config";

/// Port for loading/saving named JSON documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// `Ok(None)` means the document does not exist yet.
    async fn load(&self, key: &str) -> Result<Option<Value>>;
    async fn save(&self, key: &str, doc: &Value) -> Result<()>;
}

/// Local-file backend: one `<key>.json` file per document under `dir`.
pub struct LocalFileStore {
    dir: PathBuf,
}

impl LocalFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[async_trait]
impl DocumentStore for LocalFileStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn save(&self, key: &str, doc: &Value) -> Result<()> {
        let path = self.path_for(key);
        let pretty = serde_json::to_string_pretty(doc)?;
        tokio::fs::write(&path, pretty).await?;
        Ok(())
    }
}

/// Remote-first store with a local-file fallback.
///
/// Loads try the remote copy and fall back to the local file on error or
/// absence. Saves write the remote copy best-effort (failures logged) and
/// always write the local file, so the fallback stays usable.
pub struct FallbackStore {
    remote: Option<Arc<dyn DocumentStore>>,
    local: LocalFileStore,
}

impl FallbackStore {
    pub fn new(remote: Option<Arc<dyn DocumentStore>>, local: LocalFileStore) -> Self {
        Self { remote, local }
    }
}

#[async_trait]
impl DocumentStore for FallbackStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        if let Some(remote) = &self.remote {
            match remote.load(key).await {
                Ok(Some(doc)) => return Ok(Some(doc)),
                Ok(None) => {}
                Err(e) => eprintln!("[STORE] Remote load failed for {key}: {e}"),
            }
        }
        self.local.load(key).await
    }

    async fn save(&self, key: &str, doc: &Value) -> Result<()> {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.save(key, doc).await {
                eprintln!("[STORE] Remote save failed for {key}: {e}");
            }
        }
        self.local.save(key, doc).await
    }
}

/// Typed wrapper over the two documents the bot uses.
///
/// Absent documents default to their empty shapes; a present-but-corrupt
/// document is an error (never silently emptied).
#[derive(Clone)]
pub struct ShopStore {
    inner: Arc<dyn DocumentStore>,
}

impl ShopStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        Self { inner }
    }

    pub async fn catalog(&self) -> Result<Catalog> {
        match self.inner.load(LISTINGS_KEY).await? {
            Some(doc) => serde_json::from_value(doc).map_err(|e| {
                Error::Store(format!("listings document has an unexpected shape: {e}"))
            }),
            None => Ok(Catalog::default()),
        }
    }

    pub async fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        self.inner
            .save(LISTINGS_KEY, &serde_json::to_value(catalog)?)
            .await
    }

    pub async fn settings(&self) -> Result<BotSettings> {
        match self.inner.load(CONFIG_KEY).await? {
            Some(doc) => serde_json::from_value(doc).map_err(|e| {
                Error::Store(format!("config document has an unexpected shape: {e}"))
            }),
            None => Ok(BotSettings::default()),
        }
    }

    pub async fn save_settings(&self, settings: &BotSettings) -> Result<()> {
        self.inner
            .save(CONFIG_KEY, &serde_json::to_value(settings)?)
            .await
    }
}
