//! Farming domain — tilling, watering, planting, and crop harvest.
//!
//! Every handler validates against the grid before mutating; invalid
//! targets are ignored or answered with a toast, never an error.

use bevy::prelude::*;

use crate::shared::*;

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                handle_hoe_tool_use,
                handle_watering_can_tool_use,
                handle_plant_seed,
                handle_harvest_attempt,
            )
                .in_set(SimSet::Player)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hoe — till a grass or soil tile
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_hoe_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<WorldGrid>,
    stamina: Res<Stamina>,
    mut stamina_events: EventWriter<StaminaDrainEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::Hoe {
            continue;
        }

        if stamina.current < 1.0 {
            toast_events.send(ToastEvent {
                message: "Too tired to till".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }

        let (x, y) = (event.target_x, event.target_y);
        if grid.decoration_at(x, y).is_some() {
            continue;
        }
        let Some(tile) = grid.tile_mut(x, y) else {
            continue;
        };
        // Water can't be tilled; already-tilled tiles (watered or not)
        // are left alone.
        if tile.id == TileId::Water || tile.tilled {
            continue;
        }

        tile.tilled = true;
        stamina_events.send(StaminaDrainEvent { amount: 1.0 });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Watering can — water a tilled tile
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_watering_can_tool_use(
    mut tool_events: EventReader<ToolUseEvent>,
    mut grid: ResMut<WorldGrid>,
    clock: Res<WallClock>,
    stamina: Res<Stamina>,
    mut stamina_events: EventWriter<StaminaDrainEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in tool_events.read() {
        if event.tool != ToolKind::WateringCan {
            continue;
        }

        if stamina.current < 1.0 {
            toast_events.send(ToastEvent {
                message: "Too tired to water".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }

        let now_ms = clock.now_ms();
        let Some(tile) = grid.tile_mut(event.target_x, event.target_y) else {
            continue;
        };
        // Watering only makes sense on tilled soil. A planted tile is
        // always tilled; an unplanted tilled tile may be watered too —
        // it simply has no growth effect.
        if !tile.tilled {
            continue;
        }

        // Re-watering before expiry extends the deadline.
        tile.watered = true;
        tile.water_end_at = now_ms + WATER_DURATION_MS;

        stamina_events.send(StaminaDrainEvent { amount: 1.0 });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_plant_seed(
    mut plant_events: EventReader<PlantSeedEvent>,
    mut grid: ResMut<WorldGrid>,
    mut inventory: ResMut<Inventory>,
    registry: Res<CropRegistry>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in plant_events.read() {
        if registry.get(&event.crop_id).is_none() {
            warn!("Plant request for unknown crop '{}'", event.crop_id);
            continue;
        }

        let Some(tile) = grid.tile_mut(event.grid_x, event.grid_y) else {
            continue;
        };
        if !tile.tilled || tile.plant.is_some() {
            continue;
        }

        if !inventory.take_seed(&event.crop_id) {
            toast_events.send(ToastEvent {
                message: format!("No {} seeds", event.crop_id),
                duration_secs: 1.5,
            });
            continue;
        }

        tile.plant = Some(Plant {
            kind: event.crop_id.clone(),
            stage: 0,
            growth_ms: 0.0,
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Harvest
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_harvest_attempt(
    mut harvest_events: EventReader<HarvestAttemptEvent>,
    mut grid: ResMut<WorldGrid>,
    mut inventory: ResMut<Inventory>,
    registry: Res<CropRegistry>,
    mut xp_events: EventWriter<SkillXpEvent>,
    mut save_events: EventWriter<SaveRequestEvent>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in harvest_events.read() {
        let Some(tile) = grid.tile_mut(event.grid_x, event.grid_y) else {
            continue;
        };
        let Some(plant) = &tile.plant else {
            continue;
        };
        let Some(def) = registry.get(&plant.kind) else {
            warn!("Harvest found unknown crop '{}'", plant.kind);
            continue;
        };
        if plant.stage < def.mature_stage() {
            toast_events.send(ToastEvent {
                message: "Not ready yet".to_string(),
                duration_secs: 1.5,
            });
            continue;
        }

        let crop_id = plant.kind.clone();
        tile.plant = None;
        inventory.add_crop(&crop_id, 1);

        xp_events.send(SkillXpEvent {
            slug: "harvesting".to_string(),
            amount: 1,
        });
        save_events.send(SaveRequestEvent);

        info!("Harvested {}", crop_id);
    }
}
