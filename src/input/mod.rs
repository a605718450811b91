//! Input domain — translates raw key presses into the typed command
//! events the simulation consumes. Keeps the game logic host-independent:
//! tests drive the same events without a keyboard.

use bevy::prelude::*;

use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (select_tool, dispatch_commands)
                .in_set(SimSet::Player)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// 1 = hoe, 2 = watering can.
fn select_tool(keyboard: Res<ButtonInput<KeyCode>>, mut player: ResMut<PlayerState>) {
    if keyboard.just_pressed(KeyCode::Digit1) {
        player.active_tool = ToolKind::Hoe;
    }
    if keyboard.just_pressed(KeyCode::Digit2) {
        player.active_tool = ToolKind::WateringCan;
    }
}

/// Space applies the active tool to the tile in front of the player.
/// F interacts: gather a node, harvest a mature plant, or plant the
/// equipped seed — whichever the front tile supports.
fn dispatch_commands(
    keyboard: Res<ButtonInput<KeyCode>>,
    player: Res<PlayerState>,
    grid: Res<WorldGrid>,
    registry: Res<CropRegistry>,
    gather: Res<GatherState>,
    mut tool_events: EventWriter<ToolUseEvent>,
    mut gather_events: EventWriter<StartGatherEvent>,
    mut harvest_events: EventWriter<HarvestAttemptEvent>,
    mut plant_events: EventWriter<PlantSeedEvent>,
) {
    if gather.is_locked() {
        return;
    }

    let (tx, ty) = player.front_tile();

    if keyboard.just_pressed(KeyCode::Space) {
        tool_events.send(ToolUseEvent {
            tool: player.active_tool,
            target_x: tx,
            target_y: ty,
        });
    }

    if keyboard.just_pressed(KeyCode::KeyF) {
        if grid
            .decoration_at(tx, ty)
            .map(|d| d.category.gatherable())
            .unwrap_or(false)
        {
            gather_events.send(StartGatherEvent {
                grid_x: tx,
                grid_y: ty,
            });
            return;
        }

        if let Some(tile) = grid.tile(tx, ty) {
            if let Some(plant) = &tile.plant {
                let mature = registry
                    .get(&plant.kind)
                    .map(|def| plant.stage >= def.mature_stage())
                    .unwrap_or(false);
                if mature {
                    harvest_events.send(HarvestAttemptEvent {
                        grid_x: tx,
                        grid_y: ty,
                    });
                    return;
                }
            }

            if tile.tilled && tile.plant.is_none() {
                if let Some(crop_id) = &player.equipped_seed {
                    plant_events.send(PlantSeedEvent {
                        grid_x: tx,
                        grid_y: ty,
                        crop_id: crop_id.clone(),
                    });
                }
            }
        }
    }
}
