//! Per-frame world tick: water expiry, then crop growth.
//!
//! Water deadlines live on the wall clock; growth accumulates the frame
//! delta and therefore pauses while the process is closed. The two
//! timers are deliberately decoupled — re-watering extends the deadline
//! without touching growth, and an unwatered plant keeps (but does not
//! bank) its partial stage progress.

use bevy::prelude::*;

use crate::shared::*;

/// Clear `watered` on every tile whose deadline has passed. Returns the
/// number of tiles that dried out.
pub fn expire_water(grid: &mut WorldGrid, now_ms: f64) -> usize {
    let mut dried = 0;
    for tile in grid.tiles.iter_mut() {
        if tile.watered && now_ms >= tile.water_end_at {
            tile.watered = false;
            tile.water_end_at = 0.0;
            dried += 1;
        }
    }
    dried
}

/// Accumulate `delta_ms` of growth on every watered, planted tile and
/// advance stages whose requirement is met. `growth_ms` resets to zero
/// on each advance; mature plants stop. Returns positions that changed
/// stage.
pub fn advance_growth(
    grid: &mut WorldGrid,
    registry: &CropRegistry,
    delta_ms: f64,
) -> Vec<(i32, i32)> {
    let mut advanced = Vec::new();
    let width = grid.width;

    for (idx, tile) in grid.tiles.iter_mut().enumerate() {
        if !tile.watered {
            continue;
        }
        let Some(plant) = tile.plant.as_mut() else {
            continue;
        };
        let Some(def) = registry.get(&plant.kind) else {
            continue;
        };
        if plant.stage >= def.mature_stage() {
            continue;
        }

        plant.growth_ms += delta_ms;
        let required = def.stage_ms[plant.stage as usize];
        if plant.growth_ms >= required {
            plant.stage += 1;
            plant.growth_ms = 0.0;
            let idx = idx as i32;
            advanced.push((idx % width, idx / width));
        }
    }
    advanced
}

/// System wrapper: one consistent wall-clock snapshot per tick, expiry
/// strictly before growth so a just-dried tile doesn't grow this frame.
pub fn tick_world(
    time: Res<Time>,
    clock: Res<WallClock>,
    registry: Res<CropRegistry>,
    mut grid: ResMut<WorldGrid>,
) {
    let now_ms = clock.now_ms();
    expire_water(&mut grid, now_ms);
    advance_growth(&mut grid, &registry, time.delta_secs_f64() * 1000.0);
}
