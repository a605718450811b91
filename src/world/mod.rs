//! World domain — the tile grid, its generation, and the per-frame tick
//! that advances water expiry and crop growth.
//!
//! Communicates with other domains exclusively through crate::shared
//! resources and events.

use bevy::prelude::*;

use crate::shared::*;

pub mod gen;
pub mod tick;

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            tick::tick_world
                .in_set(SimSet::WorldTick)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
