//! JSONBin.io adapter (remote document store).
//!
//! Implements the `mkt-core` DocumentStore over the JSONBin v3 REST API.
//! Each logical document key maps to one bin; reads hit `/b/{bin}/latest`
//! and unwrap the `record` envelope, writes PUT the whole document.

use async_trait::async_trait;

use mkt_core::{
    errors::Error,
    store::{DocumentStore, CONFIG_KEY, LISTINGS_KEY},
    Result,
};

const API_BASE: &str = "https://api.jsonbin.io/v3/b";

#[derive(Clone, Debug)]
pub struct JsonBinStore {
    api_key: String,
    listings_bin: String,
    config_bin: String,
    http: reqwest::Client,
}

impl JsonBinStore {
    pub fn new(
        api_key: impl Into<String>,
        listings_bin: impl Into<String>,
        config_bin: impl Into<String>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("reqwest client build");
        Self {
            api_key: api_key.into(),
            listings_bin: listings_bin.into(),
            config_bin: config_bin.into(),
            http,
        }
    }

    fn bin_for(&self, key: &str) -> Result<&str> {
        match key {
            LISTINGS_KEY => Ok(&self.listings_bin),
            CONFIG_KEY => Ok(&self.config_bin),
            other => Err(Error::Store(format!("no bin configured for key {other:?}"))),
        }
    }
}

#[async_trait]
impl DocumentStore for JsonBinStore {
    async fn load(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let bin = self.bin_for(key)?;
        let resp = self
            .http
            .get(format!("{API_BASE}/{bin}/latest"))
            .header("X-Master-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Store(format!("jsonbin request error: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "jsonbin read failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let envelope: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Store(format!("jsonbin json error: {e}")))?;

        // v3 wraps the stored document in `record` alongside bin metadata.
        match envelope.get("record") {
            Some(record) => Ok(Some(record.clone())),
            None => Err(Error::Store("jsonbin response missing record".to_string())),
        }
    }

    async fn save(&self, key: &str, document: &serde_json::Value) -> Result<()> {
        let bin = self.bin_for(key)?;
        let resp = self
            .http
            .put(format!("{API_BASE}/{bin}"))
            .header("X-Master-Key", &self.api_key)
            .json(document)
            .send()
            .await
            .map_err(|e| Error::Store(format!("jsonbin request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Store(format!(
                "jsonbin write failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }
}
