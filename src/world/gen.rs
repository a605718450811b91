//! World generation.
//!
//! Pond and farm placement are plain geometry; only the decoration
//! scatter consumes randomness, from a `StdRng` seeded with the save's
//! world seed, so the same seed always reproduces the same layout.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data::decorations::{FLOWER_KINDS, MINERAL_KINDS, NPC_NAME, TREE_KINDS};
use crate::shared::*;

/// Fraction of eligible grass tiles that receive a decoration. The
/// category split below applies to tiles that pass this gate.
const DECOR_DENSITY: f64 = 0.10;

/// Build a fresh world from a seed: carve the pond and farm, scatter
/// decorations, and place the NPC.
pub fn generate_world(seed: u64) -> WorldGrid {
    let mut grid = WorldGrid {
        seed,
        ..Default::default()
    };

    // --- Pond (non-walkable water) ---
    for y in POND_Y..POND_Y + POND_H {
        for x in POND_X..POND_X + POND_W {
            if let Some(tile) = grid.tile_mut(x, y) {
                *tile = Tile::water();
            }
        }
    }

    // --- Farm region (soil) ---
    for y in FARM_Y..FARM_Y + FARM_H {
        for x in FARM_X..FARM_X + FARM_W {
            if let Some(tile) = grid.tile_mut(x, y) {
                *tile = Tile::soil();
            }
        }
    }

    scatter_decorations(&mut grid);
    place_npc(&mut grid);

    grid
}

/// One decoration roll per candidate tile. Candidates are plain grass
/// outside the farm rectangle (expanded by one tile) and not adjacent
/// (Chebyshev radius 1) to water. Trees and minerals block their tile.
fn scatter_decorations(grid: &mut WorldGrid) {
    let mut rng = StdRng::seed_from_u64(grid.seed);

    for y in 0..grid.height {
        for x in 0..grid.width {
            let Some(tile) = grid.tile(x, y) else {
                continue;
            };
            if tile.id != TileId::Grass || tile.tilled {
                continue;
            }
            if in_farm_exclusion(x, y) || touches_water(grid, x, y) {
                continue;
            }
            if rng.gen::<f64>() >= DECOR_DENSITY {
                continue;
            }

            let category_roll: f64 = rng.gen();
            let (category, kinds) = if category_roll < 0.3 {
                (DecorCategory::Tree, TREE_KINDS)
            } else if category_roll < 0.9 {
                (DecorCategory::Flower, FLOWER_KINDS)
            } else {
                (DecorCategory::Mineral, MINERAL_KINDS)
            };
            let kind = kinds[rng.gen_range(0..kinds.len())];

            let max_harvests = match category {
                DecorCategory::Flower => 1,
                DecorCategory::Tree => rng.gen_range(3..=5),
                DecorCategory::Mineral => rng.gen_range(1..=3),
                DecorCategory::Npc => 0,
            };

            grid.decorations.push(Decoration {
                x,
                y,
                category,
                kind: kind.to_string(),
                anim_offset: rng.gen::<f32>(),
                max_harvests,
                remaining_harvests: max_harvests,
            });
        }
    }
}

fn in_farm_exclusion(x: i32, y: i32) -> bool {
    x >= FARM_X - 1 && x < FARM_X + FARM_W + 1 && y >= FARM_Y - 1 && y < FARM_Y + FARM_H + 1
}

fn touches_water(grid: &WorldGrid, x: i32, y: i32) -> bool {
    for dy in -1..=1 {
        for dx in -1..=1 {
            if let Some(t) = grid.tile(x + dx, y + dy) {
                if t.id == TileId::Water {
                    return true;
                }
            }
        }
    }
    false
}

/// The village NPC stands just east of the farm. Static, not gatherable.
fn place_npc(grid: &mut WorldGrid) {
    let (x, y) = (FARM_X + FARM_W + 2, FARM_Y + FARM_H / 2);
    if grid.is_walkable(x, y) && grid.decoration_at(x, y).is_none() {
        grid.decorations.push(Decoration {
            x,
            y,
            category: DecorCategory::Npc,
            kind: NPC_NAME.to_string(),
            anim_offset: 0.0,
            max_harvests: 0,
            remaining_harvests: 0,
        });
    }
}

/// Default spawn sits just south of the farm. If that tile is blocked,
/// search expanding Chebyshev rings for the first walkable tile.
pub fn find_spawn(grid: &WorldGrid) -> (i32, i32) {
    let preferred = (FARM_X + FARM_W / 2, FARM_Y - 2);
    if grid.is_walkable(preferred.0, preferred.1) {
        return preferred;
    }
    for radius in 1..grid.width.max(grid.height) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                // Ring only, not the filled square.
                if dx.abs() != radius && dy.abs() != radius {
                    continue;
                }
                let (x, y) = (preferred.0 + dx, preferred.1 + dy);
                if grid.is_walkable(x, y) {
                    return (x, y);
                }
            }
        }
    }
    preferred
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_layout() {
        let a = generate_world(1234);
        let b = generate_world(1234);
        assert_eq!(a.decorations, b.decorations);
        assert_eq!(a.tiles, b.tiles);
    }

    #[test]
    fn test_different_seed_different_scatter() {
        let a = generate_world(1);
        let b = generate_world(2);
        assert_ne!(a.decorations, b.decorations);
    }

    #[test]
    fn test_pond_is_water_and_blocked() {
        let grid = generate_world(7);
        let tile = grid.tile(POND_X + 1, POND_Y + 1).unwrap();
        assert_eq!(tile.id, TileId::Water);
        assert!(!tile.walkable);
        assert!(!grid.is_walkable(POND_X + 1, POND_Y + 1));
    }

    #[test]
    fn test_farm_is_soil_and_clear_of_decorations() {
        let grid = generate_world(7);
        for y in FARM_Y..FARM_Y + FARM_H {
            for x in FARM_X..FARM_X + FARM_W {
                assert_eq!(grid.tile(x, y).unwrap().id, TileId::Soil);
                assert!(grid
                    .decoration_at(x, y)
                    .map(|d| d.category == DecorCategory::Npc)
                    .unwrap_or(true));
            }
        }
    }

    #[test]
    fn test_harvest_bounds_per_category() {
        let grid = generate_world(99);
        for d in &grid.decorations {
            match d.category {
                DecorCategory::Flower => assert_eq!(d.max_harvests, 1),
                DecorCategory::Tree => assert!((3..=5).contains(&d.max_harvests)),
                DecorCategory::Mineral => assert!((1..=3).contains(&d.max_harvests)),
                DecorCategory::Npc => assert_eq!(d.max_harvests, 0),
            }
            assert_eq!(d.remaining_harvests, d.max_harvests);
        }
    }

    #[test]
    fn test_no_decorations_beside_water() {
        let grid = generate_world(42);
        for d in &grid.decorations {
            assert!(
                !touches_water(&grid, d.x, d.y),
                "decoration at ({}, {}) touches water",
                d.x,
                d.y
            );
        }
    }

    #[test]
    fn test_spawn_relocates_off_blocked_tile() {
        let mut grid = generate_world(5);
        let preferred = (FARM_X + FARM_W / 2, FARM_Y - 2);
        // Block the preferred tile and its ring neighbours partially.
        if let Some(t) = grid.tile_mut(preferred.0, preferred.1) {
            t.walkable = false;
        }
        let spawn = find_spawn(&grid);
        assert_ne!(spawn, preferred);
        assert!(grid.is_walkable(spawn.0, spawn.1));
    }
}
