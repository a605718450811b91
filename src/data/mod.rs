//! Data layer — populates the crop registry and item catalog at startup.
//!
//! Runs in OnEnter(GameState::Loading), fills the registries from the
//! hard-coded game-design data in submodules, then transitions into
//! GameState::Playing. All domain plugins can safely read them once
//! GameState has advanced past Loading.

pub mod crops;
pub mod decorations;

use bevy::prelude::*;

use crate::catalog::Catalog;
use crate::shared::*;

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Loading), load_all_data);
    }
}

fn load_all_data(
    mut crop_registry: ResMut<CropRegistry>,
    mut catalog: ResMut<Catalog>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("DataPlugin: populating registries…");

    crops::populate_crops(&mut crop_registry);
    info!("  Crops loaded: {}", crop_registry.crops.len());

    decorations::populate_catalog(&mut catalog);
    info!("  Catalog entries loaded: {}", catalog.len());

    info!("DataPlugin: all registries populated. Transitioning to Playing.");
    next_state.set(GameState::Playing);
}
