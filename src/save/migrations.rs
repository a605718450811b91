//! Linear save-blob migration chain.
//!
//! Migrations run on the raw JSON value before typed parsing, keyed by
//! the blob's schema version. Each step is pure and idempotent; the
//! version bump is what guarantees exactly-once application across
//! repeated boots.

use serde_json::{json, Value};

use super::SAVE_VERSION;
use crate::shared::STARTER_SEED_CROP;

/// Apply every pending step, bumping the version as it goes. Returns the
/// number of steps applied. Blobs without a version field are treated as
/// version 1.
pub fn migrate_to_current(value: &mut Value) -> u32 {
    if !value.is_object() {
        return 0;
    }
    let mut applied = 0;
    loop {
        let version = value
            .get("version")
            .and_then(|v| v.as_u64())
            .unwrap_or(1) as u32;
        if version >= SAVE_VERSION {
            break;
        }
        match version {
            1 => remove_path_tiles(value),
            2 => prune_trees(value),
            3 => zero_starter_seeds(value),
            4 => split_legacy_items(value),
            _ => {}
        }
        value["version"] = json!(version + 1);
        applied += 1;
    }
    applied
}

/// v1 → v2: legacy "Path" tiles become plain walkable grass.
fn remove_path_tiles(value: &mut Value) {
    let Some(tiles) = value.get_mut("tiles").and_then(|t| t.as_array_mut()) else {
        return;
    };
    for tile in tiles {
        if tile.get("id").and_then(|id| id.as_str()) == Some("Path") {
            tile["id"] = json!("Grass");
            tile["walkable"] = json!(true);
        }
    }
}

/// v2 → v3: prune every second tree decoration. Deterministic (keeps
/// even-indexed trees in encounter order) so replays of the same blob
/// agree.
fn prune_trees(value: &mut Value) {
    let Some(decorations) = value.get_mut("decorations").and_then(|d| d.as_array_mut()) else {
        return;
    };
    let mut tree_index = 0usize;
    decorations.retain(|d| {
        if d.get("category").and_then(|c| c.as_str()) == Some("Tree") {
            let keep = tree_index % 2 == 0;
            tree_index += 1;
            keep
        } else {
            true
        }
    });
}

/// v3 → v4: zero the default starter seeds handed out on first run.
fn zero_starter_seeds(value: &mut Value) {
    if let Some(seeds) = value
        .get_mut("inventory")
        .and_then(|i| i.get_mut("seeds"))
        .and_then(|s| s.as_object_mut())
    {
        if seeds.contains_key(STARTER_SEED_CROP) {
            seeds.insert(STARTER_SEED_CROP.to_string(), json!(0));
        }
    }
}

/// v4 → v5: split legacy aggregate gathered-item counts into
/// per-identity stacks. Names with recorded meta split to their
/// last-seen rarity/quality; the remainder buckets under
/// `name__Unknown__Unknown`. The aggregate map is left in place as the
/// mirror of the new stacks.
fn split_legacy_items(value: &mut Value) {
    let Some(inventory) = value.get_mut("inventory") else {
        return;
    };

    let items: Vec<(String, u64)> = inventory
        .get("items")
        .and_then(|i| i.as_object())
        .map(|map| {
            map.iter()
                .filter_map(|(name, count)| count.as_u64().map(|c| (name.clone(), c)))
                .collect()
        })
        .unwrap_or_default();

    let meta_key = |name: &str, inventory: &Value| -> String {
        let meta = inventory.get("item_meta").and_then(|m| m.get(name));
        let rarity = meta
            .and_then(|m| m.get("rarity"))
            .and_then(|r| r.as_str())
            .unwrap_or("Unknown");
        let quality = meta
            .and_then(|m| m.get("quality"))
            .and_then(|q| q.as_str())
            .unwrap_or("Unknown");
        format!("{}__{}__{}", name, rarity, quality)
    };

    let splits: Vec<(String, u64)> = items
        .iter()
        .map(|(name, count)| (meta_key(name, inventory), *count))
        .collect();

    let Some(inventory_obj) = inventory.as_object_mut() else {
        return;
    };
    let gitems = inventory_obj
        .entry("gitems")
        .or_insert_with(|| json!({}));
    let Some(gitems) = gitems.as_object_mut() else {
        return;
    };
    for (key, count) in splits {
        let existing = gitems.get(&key).and_then(|c| c.as_u64()).unwrap_or(0);
        gitems.insert(key, json!(existing + count));
    }
}
