//! Item catalog — the stable registry mapping category + name to a
//! persistent identity (id, display name, icon path).
//!
//! Gather rolls never invent identities on their own: every item name is
//! resolved through here, and names never seen before are materialized
//! on first encounter so later lookups are stable and idempotent.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::shared::DecorCategory;

/// Catalog section an entry lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CatalogCategory {
    Trees,
    Flowers,
    Minerals,
    Misc,
}

impl CatalogCategory {
    pub fn from_decor(category: DecorCategory) -> Self {
        match category {
            DecorCategory::Tree => CatalogCategory::Trees,
            DecorCategory::Flower => CatalogCategory::Flowers,
            DecorCategory::Mineral => CatalogCategory::Minerals,
            DecorCategory::Npc => CatalogCategory::Misc,
        }
    }

    fn icon_dir(self) -> &'static str {
        match self {
            CatalogCategory::Trees => "trees",
            CatalogCategory::Flowers => "flowers",
            CatalogCategory::Minerals => "minerals",
            CatalogCategory::Misc => "misc",
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            CatalogCategory::Trees => "tree",
            CatalogCategory::Flowers => "flower",
            CatalogCategory::Minerals => "mineral",
            CatalogCategory::Misc => "misc",
        }
    }
}

/// One catalog entry. The id is a stable slug; the icon path is a
/// best-effort guess for lazily materialized entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub display_name: String,
    pub icon_path: String,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<CatalogCategory, HashMap<String, CatalogEntry>>,
}

/// Tree bases that yield their fruit instead of wood.
const KNOWN_FRUITS: &[&str] = &["Apple", "Orange", "Cherry", "Peach", "Pear", "Plum"];

/// Build a stable kebab-case slug: `make_id("mineral", "Copper Vein")`
/// → `"mineral-copper-vein"`.
pub fn make_id(prefix: &str, name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    // Collapse runs of dashes left by spaces/punctuation.
    let mut out = String::with_capacity(prefix.len() + slug.len() + 1);
    out.push_str(prefix);
    let mut prev_dash = true;
    for c in slug.chars() {
        if c == '-' {
            if !prev_dash {
                out.push('-');
            }
            prev_dash = true;
        } else {
            if prev_dash {
                out.push('-');
            }
            out.push(c);
            prev_dash = false;
        }
    }
    out.trim_end_matches('-').to_string()
}

impl Catalog {
    pub fn find_by_name(&self, category: CatalogCategory, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&category)?.get(name)
    }

    pub fn add(&mut self, category: CatalogCategory, entry: CatalogEntry) {
        self.entries
            .entry(category)
            .or_default()
            .insert(entry.display_name.clone(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a name to its entry, materializing a new one with a
    /// guessed icon path if this is the first encounter. Empty names are
    /// programmer errors and fail fast.
    pub fn resolve(
        &mut self,
        category: CatalogCategory,
        name: &str,
    ) -> Result<&CatalogEntry, String> {
        if name.trim().is_empty() {
            return Err(format!("catalog: empty name for {:?}", category));
        }
        let section = self.entries.entry(category).or_default();
        let entry = section.entry(name.to_string()).or_insert_with(|| CatalogEntry {
            id: make_id(category.id_prefix(), name),
            display_name: name.to_string(),
            icon_path: format!(
                "icons/{}/{}.png",
                category.icon_dir(),
                make_id("", name).trim_start_matches('-')
            ),
        });
        Ok(entry)
    }
}

/// Derive the item name a gather on `node_kind` produces.
///
/// Trees strip a trailing "Tree"/"tree" to get the base: known fruits
/// yield the fruit, Sakura yields "Sakura Blossom", anything else yields
/// "{base} Wood". Flowers yield "{name} Petals". Minerals yield their
/// own name unchanged.
pub fn gather_item_name(category: DecorCategory, node_kind: &str) -> Result<String, String> {
    if node_kind.trim().is_empty() {
        return Err(format!("catalog: empty node name for {:?}", category));
    }
    match category {
        DecorCategory::Tree => {
            let base = node_kind
                .trim_end_matches(" Tree")
                .trim_end_matches(" tree")
                .trim();
            if KNOWN_FRUITS.contains(&base) {
                Ok(base.to_string())
            } else if base == "Sakura" {
                Ok("Sakura Blossom".to_string())
            } else {
                Ok(format!("{} Wood", base))
            }
        }
        DecorCategory::Flower => Ok(format!("{} Petals", node_kind)),
        DecorCategory::Mineral => Ok(node_kind.to_string()),
        DecorCategory::Npc => Err("catalog: NPCs are not gatherable".to_string()),
    }
}
