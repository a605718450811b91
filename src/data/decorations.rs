//! Decoration kinds and the catalog entries their gathers resolve to.

use crate::catalog::{make_id, Catalog, CatalogCategory, CatalogEntry};
use crate::shared::DecorCategory;

pub const TREE_KINDS: &[&str] = &[
    "Oak Tree",
    "Birch Tree",
    "Pine Tree",
    "Apple Tree",
    "Orange Tree",
    "Cherry Tree",
    "Sakura Tree",
];

pub const FLOWER_KINDS: &[&str] = &[
    "Rose",
    "Tulip",
    "Daisy",
    "Lavender",
    "Marigold",
    "Bluebell",
];

pub const MINERAL_KINDS: &[&str] = &[
    "Stone Deposit",
    "Copper Vein",
    "Iron Vein",
    "Quartz Cluster",
    "Amethyst Cluster",
];

pub const NPC_NAME: &str = "Rustle the Scrapper";

/// Pre-register the catalog entries every stock node resolves to, so the
/// common case never hits the lazy-materialization path. Unseen names
/// (modded nodes, future kinds) still materialize on demand.
pub fn populate_catalog(catalog: &mut Catalog) {
    for kind in TREE_KINDS {
        if let Ok(name) = crate::catalog::gather_item_name(DecorCategory::Tree, kind) {
            add(catalog, CatalogCategory::Trees, &name);
        }
    }
    for kind in FLOWER_KINDS {
        if let Ok(name) = crate::catalog::gather_item_name(DecorCategory::Flower, kind) {
            add(catalog, CatalogCategory::Flowers, &name);
        }
    }
    for kind in MINERAL_KINDS {
        add(catalog, CatalogCategory::Minerals, kind);
    }
    add(catalog, CatalogCategory::Misc, "Tree Seed");
    add(catalog, CatalogCategory::Misc, "Flower Seed");
}

fn add(catalog: &mut Catalog, category: CatalogCategory, name: &str) {
    let prefix = match category {
        CatalogCategory::Trees => "tree",
        CatalogCategory::Flowers => "flower",
        CatalogCategory::Minerals => "mineral",
        CatalogCategory::Misc => "misc",
    };
    let dir = match category {
        CatalogCategory::Trees => "trees",
        CatalogCategory::Flowers => "flowers",
        CatalogCategory::Minerals => "minerals",
        CatalogCategory::Misc => "misc",
    };
    catalog.add(
        category,
        CatalogEntry {
            id: make_id(prefix, name),
            display_name: name.to_string(),
            icon_path: format!("icons/{}/{}.png", dir, make_id("", name).trim_start_matches('-')),
        },
    );
}
