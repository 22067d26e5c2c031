use serde::{Deserialize, Serialize};
use url::Url;

use crate::{domain::UserId, Error, Result};

/// An item offered for sale.
///
/// Price and stock are free-form display strings; no numeric invariant is
/// enforced on them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleListing {
    pub name: String,
    pub price: String,
    pub stock: String,
    pub seller_id: UserId,
    pub seller_name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// An item offered for trade, with what the owner wants in return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeListing {
    pub item_name: String,
    pub want: String,
    pub user_id: UserId,
    pub user_name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// All active listings. Insertion order doubles as the display index and the
/// removal index, so entries are only ever appended or spliced by true
/// position.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub sell: Vec<SaleListing>,
    /// Reserved in the persisted shape; no current flow reads or writes it.
    #[serde(default)]
    pub trade_looking: Vec<serde_json::Value>,
    #[serde(default)]
    pub trade_offering: Vec<TradeListing>,
}

/// Which backing sequence a listing lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListingKind {
    Sale,
    Trade,
}

impl Catalog {
    pub fn is_empty(&self) -> bool {
        self.sell.is_empty() && self.trade_offering.is_empty()
    }

    /// Append a sale listing, enforcing the image-URL invariant. Returns the
    /// listing's true index.
    pub fn push_sale(&mut self, listing: SaleListing) -> Result<usize> {
        validate_image(listing.image.as_deref())?;
        self.sell.push(listing);
        Ok(self.sell.len() - 1)
    }

    /// Append a trade listing, enforcing the image-URL invariant. Returns the
    /// listing's true index.
    pub fn push_trade(&mut self, listing: TradeListing) -> Result<usize> {
        validate_image(listing.image.as_deref())?;
        self.trade_offering.push(listing);
        Ok(self.trade_offering.len() - 1)
    }
}

/// Syntactic URL check for listing images. `None` is fine (image optional);
/// a present-but-invalid URL rejects the whole submission before any
/// mutation.
pub fn validate_image(image: Option<&str>) -> Result<()> {
    let Some(raw) = image else {
        return Ok(());
    };
    if Url::parse(raw).is_err() {
        return Err(Error::Validation(
            "Invalid image URL! Please provide a valid URL or leave it empty.".to_string(),
        ));
    }
    Ok(())
}

/// Treat blank modal input as "no image".
pub fn normalize_image(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
