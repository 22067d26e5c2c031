//! Listing removal resolution.
//!
//! The numbered view the user sees is a filtered projection (owned-only or
//! admin-all) whose positions do NOT match raw catalog indices. Each entry
//! therefore carries its true index into the backing sequence, and a chosen
//! position is always resolved against a view rebuilt from the current
//! catalog — never against anything cached at render time.

use crate::{
    catalog::{Catalog, ListingKind, SaleListing, TradeListing},
    config::REMOVAL_VIEW_LIMIT,
    domain::UserId,
    Error, Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemovalScope {
    /// Only listings owned by this user.
    Own(UserId),
    /// Every listing, regardless of owner.
    Admin,
}

/// One removable listing: its true index, which sequence it lives in, and
/// the display lines for the numbered panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovableEntry {
    pub true_index: usize,
    pub kind: ListingKind,
    pub title: String,
    pub details: String,
}

/// The listing spliced out by [`resolve_removal`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Removed {
    Sale(SaleListing),
    Trade(TradeListing),
}

impl Removed {
    pub fn display_name(&self) -> &str {
        match self {
            Removed::Sale(item) => &item.name,
            Removed::Trade(item) => &item.item_name,
        }
    }

    pub fn owner(&self) -> &UserId {
        match self {
            Removed::Sale(item) => &item.seller_id,
            Removed::Trade(item) => &item.user_id,
        }
    }

    pub fn kind(&self) -> ListingKind {
        match self {
            Removed::Sale(_) => ListingKind::Sale,
            Removed::Trade(_) => ListingKind::Trade,
        }
    }
}

/// Build the numbered removal view: sale listings first, then trade
/// listings, filtered by scope, capped at the platform's 25-button limit.
/// Entries beyond the cap are simply not offered (degradation, not error).
pub fn removable_view(catalog: &Catalog, scope: &RemovalScope) -> Vec<RemovableEntry> {
    let mut entries = Vec::new();

    for (index, item) in catalog.sell.iter().enumerate() {
        if let RemovalScope::Own(user) = scope {
            if item.seller_id != *user {
                continue;
            }
        }
        let details = match scope {
            RemovalScope::Own(_) => format!(
                "**Type:** For Sale\n**Price:** {}\n**Stock:** {}",
                item.price, item.stock
            ),
            RemovalScope::Admin => format!(
                "**Type:** For Sale\n**Price:** {}\n**Stock:** {}\n**Seller:** {}",
                item.price,
                item.stock,
                item.seller_id.mention()
            ),
        };
        entries.push(RemovableEntry {
            true_index: index,
            kind: ListingKind::Sale,
            title: format!("🛒 {}", item.name),
            details,
        });
    }

    for (index, item) in catalog.trade_offering.iter().enumerate() {
        if let RemovalScope::Own(user) = scope {
            if item.user_id != *user {
                continue;
            }
        }
        let details = match scope {
            RemovalScope::Own(_) => format!("**Type:** Trade Offer\n**Want:** {}", item.want),
            RemovalScope::Admin => format!(
                "**Type:** Trade Offer\n**Want:** {}\n**Owner:** {}",
                item.want,
                item.user_id.mention()
            ),
        };
        entries.push(RemovableEntry {
            true_index: index,
            kind: ListingKind::Trade,
            title: format!("🔄 {}", item.item_name),
            details,
        });
    }

    entries.truncate(REMOVAL_VIEW_LIMIT);
    entries
}

/// Resolve a chosen display position against a freshly rebuilt view and
/// splice the listing out of its backing sequence by true index.
///
/// The caller has already verified the selection token's embedded identity
/// against the current actor for self-scoped removals (Forbidden check);
/// this function owns the NotFound cases: the position may be stale because
/// the catalog mutated since the panel was rendered.
pub fn resolve_removal(
    catalog: &mut Catalog,
    scope: &RemovalScope,
    position: usize,
) -> Result<Removed> {
    let view = removable_view(catalog, scope);
    let entry = view
        .get(position)
        .ok_or_else(|| Error::NotFound("Listing not found!".to_string()))?;

    let removed = match entry.kind {
        ListingKind::Sale => Removed::Sale(catalog.sell.remove(entry.true_index)),
        ListingKind::Trade => Removed::Trade(catalog.trade_offering.remove(entry.true_index)),
    };
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(name: &str, seller: &str) -> SaleListing {
        SaleListing {
            name: name.to_string(),
            price: "1".to_string(),
            stock: "1".to_string(),
            seller_id: UserId::new(seller),
            seller_name: format!("user-{seller}"),
            image: None,
        }
    }

    fn trade(name: &str, owner: &str) -> TradeListing {
        TradeListing {
            item_name: name.to_string(),
            want: "gems".to_string(),
            user_id: UserId::new(owner),
            user_name: format!("user-{owner}"),
            image: None,
        }
    }

    #[test]
    fn own_scope_filters_but_keeps_true_indices() {
        let mut catalog = Catalog::default();
        catalog.sell.push(sale("A", "1"));
        catalog.sell.push(sale("B", "2"));

        let view = removable_view(&catalog, &RemovalScope::Own(UserId::new("1")));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].true_index, 0);

        let removed =
            resolve_removal(&mut catalog, &RemovalScope::Own(UserId::new("1")), 0).unwrap();
        assert_eq!(removed.display_name(), "A");
        assert_eq!(catalog.sell.len(), 1);
        assert_eq!(catalog.sell[0].name, "B");
    }

    #[test]
    fn removal_targets_true_index_despite_lower_foreign_entries() {
        // U2 owns the entry at true index 2; entries from other owners sit
        // below it.
        let mut catalog = Catalog::default();
        catalog.sell.push(sale("A", "1"));
        catalog.sell.push(sale("B", "1"));
        catalog.sell.push(sale("C", "2"));

        let removed =
            resolve_removal(&mut catalog, &RemovalScope::Own(UserId::new("2")), 0).unwrap();
        assert_eq!(removed.display_name(), "C");
        assert_eq!(catalog.sell.len(), 2);
        assert!(catalog.sell.iter().all(|i| i.seller_id == UserId::new("1")));
    }

    #[test]
    fn sequential_removals_against_shrinking_catalog_stay_correct() {
        let mut catalog = Catalog::default();
        catalog.sell.push(sale("X", "5"));
        catalog.sell.push(sale("Y", "5"));
        let scope = RemovalScope::Own(UserId::new("5"));

        let first = resolve_removal(&mut catalog, &scope, 0).unwrap();
        assert_eq!(first.display_name(), "X");

        // The former view-position 1 becomes position 0 and resolves to Y.
        let second = resolve_removal(&mut catalog, &scope, 0).unwrap();
        assert_eq!(second.display_name(), "Y");
        assert!(catalog.sell.is_empty());
    }

    #[test]
    fn admin_scope_spans_both_sequences() {
        let mut catalog = Catalog::default();
        catalog.sell.push(sale("A", "1"));
        catalog.trade_offering.push(trade("T", "2"));

        let view = removable_view(&catalog, &RemovalScope::Admin);
        assert_eq!(view.len(), 2);
        assert_eq!((view[0].true_index, view[0].kind), (0, ListingKind::Sale));
        assert_eq!((view[1].true_index, view[1].kind), (0, ListingKind::Trade));

        // Removing position 1 removes T from trade_offering, sell untouched.
        let removed = resolve_removal(&mut catalog, &RemovalScope::Admin, 1).unwrap();
        assert_eq!(removed.display_name(), "T");
        assert_eq!(catalog.sell.len(), 1);
        assert!(catalog.trade_offering.is_empty());
    }

    #[test]
    fn stale_position_is_not_found() {
        let mut catalog = Catalog::default();
        catalog.sell.push(sale("A", "1"));

        let err = resolve_removal(&mut catalog, &RemovalScope::Admin, 1).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(catalog.sell.len(), 1);
    }

    #[test]
    fn view_is_capped_at_the_platform_limit() {
        let mut catalog = Catalog::default();
        for i in 0..30 {
            catalog.sell.push(sale(&format!("I{i}"), "1"));
        }
        let view = removable_view(&catalog, &RemovalScope::Admin);
        assert_eq!(view.len(), REMOVAL_VIEW_LIMIT);
    }
}
