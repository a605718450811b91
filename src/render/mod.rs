//! Render domain — placeholder colored-sprite rendering driven purely by
//! simulation data. Sync systems run in PostUpdate after all state
//! mutations; nothing here feeds back into the simulation.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::net::RemoteViews;
use crate::shared::*;

/// Tracks the sprite entities the render domain manages, keyed by what
/// they visualize.
#[derive(Resource, Default)]
pub struct RenderEntities {
    pub tiles: Vec<Entity>,
    pub plants: HashMap<(i32, i32), Entity>,
    pub decorations: HashMap<(i32, i32), Entity>,
    pub player: Option<Entity>,
    pub remotes: HashMap<String, Entity>,
}

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderEntities>()
            .add_systems(OnEnter(GameState::Playing), spawn_tile_sprites)
            .add_systems(
                PostUpdate,
                (
                    sync_tile_sprites,
                    sync_plant_sprites,
                    sync_decoration_sprites,
                    sync_player_sprite,
                    sync_remote_sprites,
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

pub fn grid_to_world(x: f32, y: f32, z: f32) -> Vec3 {
    Vec3::new(x * TILE_SIZE, y * TILE_SIZE, z)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tiles
// ─────────────────────────────────────────────────────────────────────────────

fn tile_color(tile: &Tile) -> Color {
    match tile.id {
        TileId::Water => Color::srgb(0.22, 0.42, 0.75),
        TileId::Grass if tile.tilled && tile.watered => Color::srgb(0.30, 0.22, 0.15),
        TileId::Grass if tile.tilled => Color::srgb(0.45, 0.32, 0.20),
        TileId::Grass => Color::srgb(0.35, 0.62, 0.32),
        TileId::Soil if tile.watered => Color::srgb(0.30, 0.22, 0.15),
        TileId::Soil if tile.tilled => Color::srgb(0.45, 0.32, 0.20),
        TileId::Soil => Color::srgb(0.55, 0.42, 0.28),
    }
}

fn spawn_tile_sprites(
    mut commands: Commands,
    grid: Res<WorldGrid>,
    mut entities: ResMut<RenderEntities>,
) {
    if !entities.tiles.is_empty() {
        return;
    }
    for y in 0..grid.height {
        for x in 0..grid.width {
            let Some(tile) = grid.tile(x, y) else {
                continue;
            };
            let entity = commands
                .spawn((
                    Sprite {
                        color: tile_color(tile),
                        custom_size: Some(Vec2::splat(TILE_SIZE)),
                        ..default()
                    },
                    Transform::from_translation(grid_to_world(x as f32, y as f32, 0.0)),
                ))
                .id();
            entities.tiles.push(entity);
        }
    }
}

fn sync_tile_sprites(
    grid: Res<WorldGrid>,
    entities: Res<RenderEntities>,
    mut sprites: Query<&mut Sprite>,
) {
    if !grid.is_changed() || entities.tiles.is_empty() {
        return;
    }
    for (idx, tile) in grid.tiles.iter().enumerate() {
        if let Some(&entity) = entities.tiles.get(idx) {
            if let Ok(mut sprite) = sprites.get_mut(entity) {
                sprite.color = tile_color(tile);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plants
// ─────────────────────────────────────────────────────────────────────────────

fn plant_color(stage: u8, total_stages: u8) -> Color {
    let progress = if total_stages == 0 {
        1.0
    } else {
        (stage as f32 / total_stages as f32).clamp(0.0, 1.0)
    };
    // Pale seedling green deepening toward ripe.
    Color::srgb(0.5 - 0.3 * progress, 0.65 + 0.15 * progress, 0.2 * (1.0 - progress))
}

fn sync_plant_sprites(
    mut commands: Commands,
    grid: Res<WorldGrid>,
    registry: Res<CropRegistry>,
    mut entities: ResMut<RenderEntities>,
    mut sprites: Query<&mut Sprite>,
) {
    if !grid.is_changed() {
        return;
    }

    let mut live: HashMap<(i32, i32), (u8, u8)> = HashMap::new();
    for y in 0..grid.height {
        for x in 0..grid.width {
            if let Some(plant) = grid.tile(x, y).and_then(|t| t.plant.as_ref()) {
                let total = registry
                    .get(&plant.kind)
                    .map(|d| d.mature_stage())
                    .unwrap_or(1);
                live.insert((x, y), (plant.stage, total));
            }
        }
    }

    entities.plants.retain(|pos, entity| {
        if live.contains_key(pos) {
            true
        } else {
            commands.entity(*entity).despawn();
            false
        }
    });

    for (pos, (stage, total)) in live {
        match entities.plants.get(&pos) {
            Some(&entity) => {
                if let Ok(mut sprite) = sprites.get_mut(entity) {
                    sprite.color = plant_color(stage, total);
                }
            }
            None => {
                let entity = commands
                    .spawn((
                        Sprite {
                            color: plant_color(stage, total),
                            custom_size: Some(Vec2::splat(TILE_SIZE * 0.7)),
                            ..default()
                        },
                        Transform::from_translation(grid_to_world(
                            pos.0 as f32,
                            pos.1 as f32,
                            2.0,
                        )),
                    ))
                    .id();
                entities.plants.insert(pos, entity);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decorations
// ─────────────────────────────────────────────────────────────────────────────

fn decoration_color(category: DecorCategory) -> Color {
    match category {
        DecorCategory::Tree => Color::srgb(0.13, 0.42, 0.18),
        DecorCategory::Flower => Color::srgb(0.85, 0.45, 0.65),
        DecorCategory::Mineral => Color::srgb(0.55, 0.55, 0.60),
        DecorCategory::Npc => Color::srgb(0.85, 0.75, 0.35),
    }
}

fn sync_decoration_sprites(
    mut commands: Commands,
    grid: Res<WorldGrid>,
    mut entities: ResMut<RenderEntities>,
) {
    if !grid.is_changed() {
        return;
    }

    let live: HashMap<(i32, i32), DecorCategory> = grid
        .decorations
        .iter()
        .map(|d| ((d.x, d.y), d.category))
        .collect();

    entities.decorations.retain(|pos, entity| {
        if live.contains_key(pos) {
            true
        } else {
            commands.entity(*entity).despawn();
            false
        }
    });

    for (pos, category) in live {
        if entities.decorations.contains_key(&pos) {
            continue;
        }
        let entity = commands
            .spawn((
                Sprite {
                    color: decoration_color(category),
                    custom_size: Some(Vec2::splat(TILE_SIZE * 0.9)),
                    ..default()
                },
                Transform::from_translation(grid_to_world(pos.0 as f32, pos.1 as f32, 3.0)),
            ))
            .id();
        entities.decorations.insert(pos, entity);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Player & remote players
// ─────────────────────────────────────────────────────────────────────────────

fn sync_player_sprite(
    mut commands: Commands,
    player: Res<PlayerState>,
    mut entities: ResMut<RenderEntities>,
    mut transforms: Query<&mut Transform>,
) {
    let target = grid_to_world(player.x, player.y, 5.0);
    match entities.player {
        Some(entity) => {
            if let Ok(mut transform) = transforms.get_mut(entity) {
                transform.translation = target;
            }
        }
        None => {
            let entity = commands
                .spawn((
                    Sprite {
                        color: Color::srgb(0.92, 0.88, 0.78),
                        custom_size: Some(Vec2::new(TILE_SIZE * 0.8, TILE_SIZE * 1.1)),
                        ..default()
                    },
                    Transform::from_translation(target),
                ))
                .id();
            entities.player = Some(entity);
        }
    }
}

fn sync_remote_sprites(
    mut commands: Commands,
    remotes: Res<RemoteViews>,
    mut entities: ResMut<RenderEntities>,
    mut transforms: Query<&mut Transform>,
) {
    entities.remotes.retain(|uid, entity| {
        if remotes.views.contains_key(uid) {
            true
        } else {
            commands.entity(*entity).despawn();
            false
        }
    });

    for (uid, view) in &remotes.views {
        let target = grid_to_world(view.rx, view.ry, 4.0);
        match entities.remotes.get(uid) {
            Some(&entity) => {
                if let Ok(mut transform) = transforms.get_mut(entity) {
                    transform.translation = target;
                }
            }
            None => {
                let entity = commands
                    .spawn((
                        Sprite {
                            color: Color::srgb(0.55, 0.75, 0.95),
                            custom_size: Some(Vec2::new(TILE_SIZE * 0.8, TILE_SIZE * 1.1)),
                            ..default()
                        },
                        Transform::from_translation(target),
                    ))
                    .id();
                entities.remotes.insert(uid.clone(), entity);
            }
        }
    }
}
