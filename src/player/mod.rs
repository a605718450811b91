//! Player domain — movement, facing, and collision against the grid.

use bevy::prelude::*;

use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            player_movement
                .in_set(SimSet::Player)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

/// Core movement system — reads WASD / arrow keys, applies velocity in
/// tile units, updates facing, and checks collisions axis-separated so
/// the player can slide along walls. Movement is locked for the duration
/// of an active gather.
pub fn player_movement(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    grid: Res<WorldGrid>,
    gather: Res<GatherState>,
    mut player: ResMut<PlayerState>,
) {
    if gather.is_locked() {
        player.is_moving = false;
        return;
    }

    let mut dir = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        dir.y += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        dir.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        dir.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        dir.x += 1.0;
    }

    if dir == Vec2::ZERO {
        player.is_moving = false;
        return;
    }

    player.is_moving = true;
    player.facing = Facing::from_delta(dir.x, dir.y);

    let delta = dir.normalize() * player.speed * time.delta_secs();
    let candidate_x = player.x + delta.x;
    let candidate_y = player.y + delta.y;

    if can_stand(&grid, candidate_x, player.y) {
        player.x = candidate_x;
    }
    if can_stand(&grid, player.x, candidate_y) {
        player.y = candidate_y;
    }
}

/// Whether a fractional tile position is standable: the rounded tile
/// must be walkable and in bounds.
pub fn can_stand(grid: &WorldGrid, x: f32, y: f32) -> bool {
    grid.is_walkable(x.round() as i32, y.round() as i32)
}
