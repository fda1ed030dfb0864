//! Pure matching rules over inventory entries.

use std::collections::{BTreeSet, HashSet};

use reliefhub_core::types::ItemId;
use reliefhub_entity::inventory::InventoryEntry;
use reliefhub_entity::site::SiteRole;

/// Items a site of `role` may send elsewhere.
///
/// A supply hub offers `Available` and `Oversupply` items; a distribution
/// center offers `Oversupply` only. A site without a role offers nothing.
pub fn eligible_supply(role: Option<SiteRole>, entries: &[InventoryEntry]) -> HashSet<ItemId> {
    let Some(role) = role else {
        return HashSet::new();
    };
    entries
        .iter()
        .filter(|e| role.supplies(e.status))
        .map(|e| e.item_id)
        .collect()
}

/// Names of the receiving site's needed items that are in `supply`,
/// ascending and without duplicates.
pub fn matched_names(supply: &HashSet<ItemId>, demand: &[InventoryEntry]) -> Vec<String> {
    demand
        .iter()
        .filter(|e| e.status.is_need() && supply.contains(&e.item_id))
        .map(|e| e.item_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
