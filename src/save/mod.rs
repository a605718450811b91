//! Save domain — the versioned persistence codec, autosave cadence, and
//! boot-time load-or-generate.
//!
//! Water deadlines are persisted as *remaining* durations and re-based
//! against the load instant, so crop growth and water never advance for
//! time spent closed. Stamina's `last_regen_at` is persisted as an
//! absolute wall-clock anchor for the opposite reason: it is meant to
//! catch up. That asymmetry is the contract; keep it.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;

use crate::backend::BackendHandle;
use crate::shared::*;
use crate::world::gen;

pub mod migrations;

pub const SAVE_VERSION: u32 = 5;
const SAVE_KEY: &str = "junkora_save";

// ═══════════════════════════════════════════════════════════════════════
// SAVE FILE
// ═══════════════════════════════════════════════════════════════════════

/// Per-tile record. `water_remaining_ms` is a duration, not a deadline:
/// deadlines would silently expire while the save sat on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileRecord {
    pub id: TileId,
    pub tilled: bool,
    pub watered: bool,
    pub water_remaining_ms: f64,
    pub plant: Option<Plant>,
    pub walkable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub currencies: Currencies,
    pub stamina: Stamina,
    pub active_tool: ToolKind,
    pub equipped_seed: Option<CropId>,
    pub inventory: Inventory,
    pub player_x: f32,
    pub player_y: f32,
    pub facing: Facing,
    pub username: String,
    pub world_seed: u64,
    pub world_w: i32,
    pub world_h: i32,
    pub tiles: Vec<TileRecord>,
    pub decorations: Vec<Decoration>,
    pub skills: Skills,
}

/// Capture the full session state. `now_ms` is the single wall-clock
/// snapshot used for every remaining-duration field.
pub fn encode(
    now_ms: f64,
    grid: &WorldGrid,
    inventory: &Inventory,
    stamina: &Stamina,
    currencies: &Currencies,
    skills: &Skills,
    player: &PlayerState,
) -> SaveFile {
    let tiles = grid
        .tiles
        .iter()
        .map(|tile| TileRecord {
            id: tile.id,
            tilled: tile.tilled,
            watered: tile.watered,
            water_remaining_ms: if tile.watered {
                (tile.water_end_at - now_ms).max(0.0)
            } else {
                0.0
            },
            plant: tile.plant.clone(),
            walkable: tile.walkable,
        })
        .collect();

    SaveFile {
        version: SAVE_VERSION,
        currencies: currencies.clone(),
        stamina: stamina.clone(),
        active_tool: player.active_tool,
        equipped_seed: player.equipped_seed.clone(),
        inventory: inventory.clone(),
        player_x: player.x,
        player_y: player.y,
        facing: player.facing,
        username: player.username.clone(),
        world_seed: grid.seed,
        world_w: grid.width,
        world_h: grid.height,
        tiles,
        decorations: grid.decorations.clone(),
        skills: skills.clone(),
    }
}

/// Rebuild session state from a save. Remaining water durations are
/// re-based against `now_ms`; stamina's anchor is left absolute so the
/// regen engine catches up on boot.
pub fn apply(
    file: SaveFile,
    now_ms: f64,
    grid: &mut WorldGrid,
    inventory: &mut Inventory,
    stamina: &mut Stamina,
    currencies: &mut Currencies,
    skills: &mut Skills,
    player: &mut PlayerState,
) {
    *grid = WorldGrid {
        width: file.world_w,
        height: file.world_h,
        seed: file.world_seed,
        decorations: file.decorations,
        tiles: file
            .tiles
            .into_iter()
            .map(|record| Tile {
                id: record.id,
                tilled: record.tilled,
                watered: record.watered,
                water_end_at: if record.watered {
                    now_ms + record.water_remaining_ms
                } else {
                    0.0
                },
                plant: record.plant,
                walkable: record.walkable,
            })
            .collect(),
    };
    *inventory = file.inventory;
    *stamina = file.stamina;
    *currencies = file.currencies;
    *skills = file.skills;
    player.x = file.player_x;
    player.y = file.player_y;
    player.facing = file.facing;
    player.active_tool = file.active_tool;
    player.equipped_seed = file.equipped_seed;
    player.username = file.username;
}

// ═══════════════════════════════════════════════════════════════════════
// BLOB STORAGE
// ═══════════════════════════════════════════════════════════════════════

#[cfg(not(target_arch = "wasm32"))]
fn save_path() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));
    exe_dir.join("saves").join(format!("{}.json", SAVE_KEY))
}

#[cfg(not(target_arch = "wasm32"))]
fn write_blob(json: &str) -> Result<(), String> {
    let path = save_path();
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("Could not create saves directory: {}", e))?;
    }
    // Write to a temp file first, then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)
        .map_err(|e| format!("Write failed for {}: {}", tmp_path.display(), e))?;
    fs::rename(&tmp_path, &path).map_err(|e| format!("Rename failed: {}", e))?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn read_blob() -> Option<String> {
    let path = save_path();
    fs::read_to_string(path).ok()
}

#[cfg(target_arch = "wasm32")]
fn write_blob(json: &str) -> Result<(), String> {
    let storage = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())?;
    storage
        .set_item(SAVE_KEY, json)
        .map_err(|_| "localStorage write failed".to_string())
}

#[cfg(target_arch = "wasm32")]
fn read_blob() -> Option<String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .and_then(|s| s.get_item(SAVE_KEY).ok().flatten())
}

/// Serialize and persist. Idempotent: repeating a save with unchanged
/// state rewrites the same blob.
pub fn save_to_blob(file: &SaveFile) -> Result<(), String> {
    let json = serde_json::to_string(file).map_err(|e| format!("Serialization failed: {}", e))?;
    write_blob(&json)
}

/// Read, migrate, and parse the persisted blob. A missing or corrupt
/// blob is a first run, not an error.
pub fn load_from_blob() -> Option<SaveFile> {
    let json = read_blob()?;
    let mut value: serde_json::Value = match serde_json::from_str(&json) {
        Ok(v) => v,
        Err(e) => {
            warn!("Save blob is corrupt ({}); starting fresh", e);
            return None;
        }
    };
    let applied = migrations::migrate_to_current(&mut value);
    if applied > 0 {
        info!("Applied {} save migration step(s)", applied);
    }
    match serde_json::from_value::<SaveFile>(value) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("Save blob did not parse after migration ({}); starting fresh", e);
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource)]
struct AutosaveTimer(Timer);

impl Default for AutosaveTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            AUTOSAVE_INTERVAL_SECS,
            TimerMode::Repeating,
        ))
    }
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutosaveTimer>()
            .init_resource::<BackendHandle>()
            .add_systems(OnEnter(GameState::Playing), load_or_generate)
            .add_systems(
                Update,
                (autosave, handle_save_request)
                    .after(SimSet::Gather)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

/// Boot: apply the persisted save if one exists, otherwise generate a
/// fresh world seeded from the clock and hand out the starter seeds.
#[allow(clippy::too_many_arguments)]
fn load_or_generate(
    clock: Res<WallClock>,
    mut grid: ResMut<WorldGrid>,
    mut inventory: ResMut<Inventory>,
    mut stamina: ResMut<Stamina>,
    mut currencies: ResMut<Currencies>,
    mut skills: ResMut<Skills>,
    mut player: ResMut<PlayerState>,
    mut rng: ResMut<GameRng>,
) {
    use rand::SeedableRng;

    let now_ms = clock.now_ms();
    match load_from_blob() {
        Some(file) => {
            info!("Loaded save (version {})", file.version);
            apply(
                file,
                now_ms,
                &mut grid,
                &mut inventory,
                &mut stamina,
                &mut currencies,
                &mut skills,
                &mut player,
            );
        }
        None => {
            let seed = now_ms as u64;
            info!("No save found; generating world with seed {}", seed);
            *grid = gen::generate_world(seed);
            inventory.add_seeds(STARTER_SEED_CROP, STARTER_SEED_COUNT);
            let (sx, sy) = gen::find_spawn(&grid);
            player.x = sx as f32;
            player.y = sy as f32;
            stamina.last_regen_at = now_ms;
        }
    }
    rng.0 = rand::rngs::StdRng::seed_from_u64(grid.seed ^ 0x9e37_79b9);
}

#[allow(clippy::too_many_arguments)]
fn do_save(
    clock: &WallClock,
    grid: &WorldGrid,
    inventory: &Inventory,
    stamina: &Stamina,
    currencies: &Currencies,
    skills: &Skills,
    player: &PlayerState,
    backend: &mut BackendHandle,
) {
    let file = encode(
        clock.now_ms(),
        grid,
        inventory,
        stamina,
        currencies,
        skills,
        player,
    );
    let json = match serde_json::to_string(&file) {
        Ok(json) => json,
        Err(e) => {
            warn!("Save serialization failed: {}", e);
            return;
        }
    };
    // Best-effort on both stores: a failed save never interrupts play.
    if let Err(e) = write_blob(&json) {
        warn!("Save failed: {}", e);
    }
    if let Err(e) = backend.0.upsert_named_save("autosave", &json) {
        warn!("Remote save sync failed: {}", e);
    }
}

/// Fixed-cadence autosave, driven by accumulated delta time so it is
/// robust to variable frame rates.
#[allow(clippy::too_many_arguments)]
fn autosave(
    time: Res<Time>,
    mut timer: ResMut<AutosaveTimer>,
    clock: Res<WallClock>,
    grid: Res<WorldGrid>,
    inventory: Res<Inventory>,
    stamina: Res<Stamina>,
    currencies: Res<Currencies>,
    skills: Res<Skills>,
    player: Res<PlayerState>,
    mut backend: ResMut<BackendHandle>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        do_save(
            &clock,
            &grid,
            &inventory,
            &stamina,
            &currencies,
            &skills,
            &player,
            &mut backend,
        );
    }
}

/// Immediate saves requested by economic actions and harvests. Multiple
/// requests in one frame collapse into a single write.
#[allow(clippy::too_many_arguments)]
fn handle_save_request(
    mut save_events: EventReader<SaveRequestEvent>,
    clock: Res<WallClock>,
    grid: Res<WorldGrid>,
    inventory: Res<Inventory>,
    stamina: Res<Stamina>,
    currencies: Res<Currencies>,
    skills: Res<Skills>,
    player: Res<PlayerState>,
    mut backend: ResMut<BackendHandle>,
) {
    if save_events.read().next().is_none() {
        return;
    }
    do_save(
        &clock,
        &grid,
        &inventory,
        &stamina,
        &currencies,
        &skills,
        &player,
        &mut backend,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> (WorldGrid, Inventory, Stamina, Currencies, Skills, PlayerState) {
        let mut grid = WorldGrid::default();
        let tile = grid.tile_mut(2, 2).unwrap();
        tile.id = TileId::Soil;
        tile.tilled = true;
        tile.watered = true;
        tile.water_end_at = 100_000.0;
        tile.plant = Some(Plant {
            kind: "carrot".to_string(),
            stage: 1,
            growth_ms: 420.0,
        });
        grid.seed = 77;

        let mut inventory = Inventory::default();
        inventory.add_seeds("carrot", 3);

        (
            grid,
            inventory,
            Stamina {
                current: 55.0,
                max: MAX_STAMINA,
                last_regen_at: 60_000.0,
            },
            Currencies::default(),
            Skills::default(),
            PlayerState::default(),
        )
    }

    #[test]
    fn test_round_trip_preserves_remaining_water() {
        let (grid, inventory, stamina, currencies, skills, player) = sample_state();
        let save_now = 40_000.0;
        let file = encode(save_now, &grid, &inventory, &stamina, &currencies, &skills, &player);

        // 100_000 − 40_000 = 60_000 ms remaining at save time.
        assert!((file.tiles[(2 * WORLD_W + 2) as usize].water_remaining_ms - 60_000.0).abs() < 1e-6);

        // Load much later: the deadline re-bases, it does not expire.
        let load_now = 900_000.0;
        let mut grid2 = WorldGrid::default();
        let mut inv2 = Inventory::default();
        let mut stam2 = Stamina::default();
        let mut cur2 = Currencies::default();
        let mut skills2 = Skills::default();
        let mut player2 = PlayerState::default();
        apply(
            file,
            load_now,
            &mut grid2,
            &mut inv2,
            &mut stam2,
            &mut cur2,
            &mut skills2,
            &mut player2,
        );

        let tile = grid2.tile(2, 2).unwrap();
        assert!(tile.watered);
        assert!((tile.water_end_at - (load_now + 60_000.0)).abs() < 1e-6);
        let plant = tile.plant.as_ref().unwrap();
        assert_eq!(plant.stage, 1);
        assert!((plant.growth_ms - 420.0).abs() < 1e-6);
    }

    #[test]
    fn test_stamina_anchor_stays_absolute() {
        let (grid, inventory, stamina, currencies, skills, player) = sample_state();
        let file = encode(40_000.0, &grid, &inventory, &stamina, &currencies, &skills, &player);
        // Unlike water, last_regen_at is not re-based: the regen engine
        // uses the absolute anchor to catch up.
        assert_eq!(file.stamina.last_regen_at, 60_000.0);
    }

    #[test]
    fn test_encode_is_side_effect_free() {
        let (grid, inventory, stamina, currencies, skills, player) = sample_state();
        let before = grid.clone();
        let _ = encode(40_000.0, &grid, &inventory, &stamina, &currencies, &skills, &player);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_json_round_trip() {
        let (grid, inventory, stamina, currencies, skills, player) = sample_state();
        let file = encode(40_000.0, &grid, &inventory, &stamina, &currencies, &skills, &player);
        let json = serde_json::to_string(&file).unwrap();
        let parsed: SaveFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, SAVE_VERSION);
        assert_eq!(parsed.world_seed, 77);
        assert_eq!(parsed.inventory.seed_count("carrot"), 3);
    }
}
