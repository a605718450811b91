//! Gathering domain — the timed Idle → Active → Complete action that
//! rolls an item from a world node.
//!
//! Starting requires stamina and a non-depleted node; completion rolls
//! rarity/quality, resolves the item through the catalog, updates both
//! inventory stacks, may drop a bonus seed, awards skill xp, drains
//! stamina, and depletes (possibly despawning) the node. Any pipeline
//! failure resets the machine to Idle without stopping the loop.

use bevy::prelude::*;
use rand::Rng;

use crate::catalog::{gather_item_name, Catalog, CatalogCategory};
use crate::shared::*;

pub mod rolls;

pub struct GatheringPlugin;

impl Plugin for GatheringPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (handle_start_gather, tick_gather)
                .chain()
                .in_set(SimSet::Gather)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Idle → Active
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_start_gather(
    mut start_events: EventReader<StartGatherEvent>,
    grid: Res<WorldGrid>,
    player: Res<PlayerState>,
    stamina: Res<Stamina>,
    mut gather: ResMut<GatherState>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in start_events.read() {
        if gather.is_locked() {
            continue;
        }

        let (x, y) = (event.grid_x, event.grid_y);
        let (px, py) = player.grid_pos();
        if (x - px).abs().max((y - py).abs()) > 1 {
            continue;
        }

        let Some(decoration) = grid.decoration_at(x, y) else {
            continue;
        };
        if !decoration.category.gatherable() {
            continue;
        }
        if decoration.remaining_harvests == 0 {
            toast_events.send(ToastEvent {
                message: "Nothing left here".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }
        if stamina.current < GATHER_STAMINA_COST {
            toast_events.send(ToastEvent {
                message: "Out of stamina".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }

        gather.active = Some(ActiveGather {
            x,
            y,
            elapsed_ms: 0.0,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Active → Complete
// ─────────────────────────────────────────────────────────────────────────────

pub fn tick_gather(
    time: Res<Time>,
    mut gather: ResMut<GatherState>,
    mut grid: ResMut<WorldGrid>,
    mut catalog: ResMut<Catalog>,
    mut inventory: ResMut<Inventory>,
    mut rng: ResMut<GameRng>,
    mut stamina_events: EventWriter<StaminaDrainEvent>,
    mut xp_events: EventWriter<SkillXpEvent>,
    mut completed_events: EventWriter<GatherCompletedEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    let Some(active) = gather.active.as_mut() else {
        return;
    };
    active.elapsed_ms += time.delta_secs() * 1000.0;
    if active.elapsed_ms < GATHER_DURATION_MS {
        return;
    }

    let (x, y) = (active.x, active.y);
    gather.active = None;

    match complete_gather(&mut grid, &mut catalog, &mut inventory, &mut rng.0, x, y) {
        Ok((item, bonus_seed)) => {
            if let Some(slug) = item.category.skill_slug() {
                xp_events.send(SkillXpEvent {
                    slug: slug.to_string(),
                    amount: 1,
                });
            }
            stamina_events.send(StaminaDrainEvent {
                amount: GATHER_STAMINA_COST,
            });
            toast_events.send(ToastEvent {
                message: format!(
                    "+1 {} ({} / {})",
                    item.name,
                    item.rarity.label(),
                    item.quality.label()
                ),
                duration_secs: 2.0,
            });
            completed_events.send(GatherCompletedEvent { item, bonus_seed });
        }
        Err(err) => {
            warn!("Gather failed at ({}, {}): {}", x, y, err);
            toast_events.send(ToastEvent {
                message: "Gathering failed".to_string(),
                duration_secs: 1.5,
            });
        }
    }
}

/// The synchronous completion pipeline. Mutates inventory and the world
/// only when every fallible step has succeeded up to that point.
pub fn complete_gather(
    grid: &mut WorldGrid,
    catalog: &mut Catalog,
    inventory: &mut Inventory,
    rng: &mut rand::rngs::StdRng,
    x: i32,
    y: i32,
) -> Result<(GatheredItem, Option<String>), String> {
    let (category, kind) = {
        let decoration = grid
            .decoration_at(x, y)
            .ok_or_else(|| format!("no node at ({}, {})", x, y))?;
        if decoration.remaining_harvests == 0 {
            return Err("node already depleted".to_string());
        }
        (decoration.category, decoration.kind.clone())
    };

    let rarity = rolls::roll_rarity(&mut || rng.gen::<f64>());
    let quality = rolls::roll_quality(&mut || rng.gen::<f64>());

    let name = gather_item_name(category, &kind)?;
    catalog.resolve(CatalogCategory::from_decor(category), &name)?;

    let item = GatheredItem {
        name,
        rarity,
        quality,
        category,
        source: kind.clone(),
    };
    inventory.add_gathered(&item);

    // Trees and flowers occasionally drop a seed for their category.
    let bonus_seed = if matches!(category, DecorCategory::Tree | DecorCategory::Flower)
        && rng.gen::<f64>() < BONUS_SEED_CHANCE
    {
        let seed_name = match category {
            DecorCategory::Tree => "Tree Seed",
            _ => "Flower Seed",
        };
        catalog.resolve(CatalogCategory::Misc, seed_name)?;
        inventory.add_gathered(&GatheredItem {
            name: seed_name.to_string(),
            rarity: Rarity::Common,
            quality: Quality::Normal,
            category,
            source: kind.clone(),
        });
        Some(seed_name.to_string())
    } else {
        None
    };

    let depleted = {
        let decoration = grid
            .decoration_at_mut(x, y)
            .ok_or_else(|| format!("node vanished at ({}, {})", x, y))?;
        decoration.remaining_harvests -= 1;
        decoration.remaining_harvests == 0
    };
    if depleted {
        grid.remove_decoration(x, y);
    }

    Ok((item, bonus_seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn grid_with_node(category: DecorCategory, kind: &str, remaining: u8) -> WorldGrid {
        let mut grid = WorldGrid::default();
        grid.decorations.push(Decoration {
            x: 5,
            y: 5,
            category,
            kind: kind.to_string(),
            anim_offset: 0.0,
            max_harvests: remaining,
            remaining_harvests: remaining,
        });
        grid
    }

    #[test]
    fn test_complete_gather_decrements_and_stacks() {
        let mut grid = grid_with_node(DecorCategory::Mineral, "Copper Vein", 2);
        let mut catalog = Catalog::default();
        let mut inventory = Inventory::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);

        let (item, _) =
            complete_gather(&mut grid, &mut catalog, &mut inventory, &mut rng, 5, 5).unwrap();

        assert_eq!(item.name, "Copper Vein");
        assert_eq!(grid.decoration_at(5, 5).unwrap().remaining_harvests, 1);
        let key = Inventory::gitem_key(&item.name, item.rarity, item.quality);
        assert_eq!(inventory.gitems.get(&key), Some(&1));
        assert_eq!(inventory.items.get("Copper Vein"), Some(&1));
        assert!(inventory.item_meta.contains_key("Copper Vein"));
    }

    #[test]
    fn test_last_harvest_despawns_node_and_frees_tile() {
        let mut grid = grid_with_node(DecorCategory::Tree, "Oak Tree", 1);
        assert!(!grid.is_walkable(5, 5));

        let mut catalog = Catalog::default();
        let mut inventory = Inventory::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);

        complete_gather(&mut grid, &mut catalog, &mut inventory, &mut rng, 5, 5).unwrap();

        assert!(grid.decoration_at(5, 5).is_none());
        assert!(grid.is_walkable(5, 5));
    }

    #[test]
    fn test_gather_on_empty_tile_errors() {
        let mut grid = WorldGrid::default();
        let mut catalog = Catalog::default();
        let mut inventory = Inventory::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);

        let result = complete_gather(&mut grid, &mut catalog, &mut inventory, &mut rng, 0, 0);
        assert!(result.is_err());
        assert!(inventory.gitems.is_empty());
    }
}
