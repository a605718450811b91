//! Sell and buy handlers.
//!
//! High-tier sells require the `confirmed` flag on the command; the
//! guard is enforced here so no caller can bypass it. "Sell all" zeroes
//! every stack atomically and credits the total once.

use bevy::prelude::*;

use super::pricing;
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Sell one
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_sell_item(
    mut sell_events: EventReader<SellItemEvent>,
    mut inventory: ResMut<Inventory>,
    mut currency_events: EventWriter<CurrencyChangeEvent>,
    mut confirm_events: EventWriter<SellConfirmRequiredEvent>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in sell_events.read() {
        let Some((name, rarity, quality)) = Inventory::parse_gitem_key(&event.gitem_key) else {
            warn!("Sell request with malformed key '{}'", event.gitem_key);
            continue;
        };
        if inventory.gitems.get(&event.gitem_key).copied().unwrap_or(0) == 0 {
            continue;
        }

        let category = inventory.item_meta.get(&name).map(|m| m.category);
        let price = pricing::compute_sale_price(category, rarity, quality);

        if pricing::needs_confirmation(rarity, quality) && !event.confirmed {
            confirm_events.send(SellConfirmRequiredEvent {
                gitem_key: event.gitem_key.clone(),
                price,
            });
            continue;
        }

        if inventory.remove_gitem(&event.gitem_key, 1) != 1 {
            continue;
        }
        currency_events.send(CurrencyChangeEvent {
            kind: CurrencyKind::Coins,
            amount: price as i64,
            reason: format!("sold {}", event.gitem_key),
        });
        toast_events.send(ToastEvent {
            message: format!("Sold {} for {} coins", name, price),
            duration_secs: 1.5,
        });
        save_events.send(SaveRequestEvent);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sell everything
// ─────────────────────────────────────────────────────────────────────────────

/// Total coin value of every sellable stack. Per-identity stacks are the
/// priced source of truth; legacy aggregate counts only add value for
/// the excess not mirrored by a per-identity stack (pre-migration
/// leftovers), priced from last-seen meta.
pub fn appraise_all(
    inventory: &Inventory,
    registry: &CropRegistry,
) -> u32 {
    let mut total: u64 = 0;

    for (key, count) in &inventory.gitems {
        let Some((name, rarity, quality)) = Inventory::parse_gitem_key(key) else {
            continue;
        };
        let category = inventory.item_meta.get(&name).map(|m| m.category);
        total += pricing::compute_sale_price(category, rarity, quality) as u64 * *count as u64;
    }

    for (name, legacy_count) in &inventory.items {
        let mirrored: u32 = inventory
            .gitems
            .iter()
            .filter_map(|(key, count)| {
                Inventory::parse_gitem_key(key)
                    .filter(|(n, _, _)| n == name)
                    .map(|_| *count)
            })
            .sum();
        let excess = legacy_count.saturating_sub(mirrored);
        if excess > 0 {
            let meta = inventory.item_meta.get(name);
            let price = pricing::compute_sale_price(
                meta.map(|m| m.category),
                meta.map(|m| m.rarity),
                meta.map(|m| m.quality),
            );
            total += price as u64 * excess as u64;
        }
    }

    for (crop_id, count) in &inventory.crops {
        let each = registry.get(crop_id).map(|d| d.crop_price).unwrap_or(10);
        total += each as u64 * *count as u64;
    }

    // Seeds buy back at half their purchase price.
    for (crop_id, count) in &inventory.seeds {
        let each = registry.get(crop_id).map(|d| d.seed_price / 2).unwrap_or(5);
        total += each as u64 * *count as u64;
    }

    total.min(u32::MAX as u64) as u32
}

pub fn handle_sell_all(
    mut sell_events: EventReader<SellAllEvent>,
    mut inventory: ResMut<Inventory>,
    registry: Res<CropRegistry>,
    mut currency_events: EventWriter<CurrencyChangeEvent>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for _ in sell_events.read() {
        let total = appraise_all(&inventory, &registry);
        if total == 0 {
            toast_events.send(ToastEvent {
                message: "Nothing to sell".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }

        inventory.gitems.clear();
        inventory.items.clear();
        inventory.crops.clear();
        inventory.seeds.clear();

        currency_events.send(CurrencyChangeEvent {
            kind: CurrencyKind::Coins,
            amount: total as i64,
            reason: "sold everything".to_string(),
        });
        toast_events.send(ToastEvent {
            message: format!("Sold everything for {} coins", total),
            duration_secs: 2.0,
        });
        save_events.send(SaveRequestEvent);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Buy seeds
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_buy_seeds(
    mut buy_events: EventReader<BuySeedsEvent>,
    mut inventory: ResMut<Inventory>,
    registry: Res<CropRegistry>,
    currencies: Res<Currencies>,
    mut currency_events: EventWriter<CurrencyChangeEvent>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in buy_events.read() {
        let Some(def) = registry.get(&event.crop_id) else {
            warn!("Buy request for unknown crop '{}'", event.crop_id);
            continue;
        };
        if event.quantity == 0 {
            continue;
        }
        let cost = def.seed_price.saturating_mul(event.quantity);
        if currencies.coins < cost {
            toast_events.send(ToastEvent {
                message: "Not enough coins".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }

        inventory.add_seeds(&event.crop_id, event.quantity);
        currency_events.send(CurrencyChangeEvent {
            kind: CurrencyKind::Coins,
            amount: -(cost as i64),
            reason: format!("bought {} {} seeds", event.quantity, event.crop_id),
        });
        save_events.send(SaveRequestEvent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_carrot() -> CropRegistry {
        let mut registry = CropRegistry::default();
        registry.crops.insert(
            "carrot".to_string(),
            CropDef {
                id: "carrot".to_string(),
                name: "Carrot".to_string(),
                stage_ms: vec![1000.0, 1000.0],
                seed_price: 10,
                crop_price: 24,
            },
        );
        registry
    }

    #[test]
    fn test_appraise_all_counts_each_stack_once() {
        let registry = registry_with_carrot();
        let mut inventory = Inventory::default();
        inventory.add_gathered(&GatheredItem {
            name: "Copper Vein".to_string(),
            rarity: Rarity::Common,
            quality: Quality::Normal,
            category: DecorCategory::Mineral,
            source: "Copper Vein".to_string(),
        });
        inventory.add_crop("carrot", 2);
        inventory.add_seeds("carrot", 4);

        // gitem: 15×1.0×1.0 = 15; legacy mirrors the same unit → no extra.
        // crops: 2×24 = 48; seeds: 4×5 = 20.
        assert_eq!(appraise_all(&inventory, &registry), 15 + 48 + 20);
    }

    #[test]
    fn test_appraise_prices_unmirrored_legacy_excess() {
        let registry = CropRegistry::default();
        let mut inventory = Inventory::default();
        // Pre-migration shape: aggregate count with no per-identity stack.
        inventory.items.insert("Old Relic".to_string(), 3);

        assert_eq!(appraise_all(&inventory, &registry), 30);
    }
}
