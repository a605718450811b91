//! Shared components, resources, events, and states for Junkora.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE — top-level state machine
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

/// Coarse ordering inside one simulation tick: world timers advance first,
/// then the player acts on the updated world, then gather progress is
/// evaluated against the player's (possibly locked) state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum SimSet {
    WorldTick,
    Player,
    Gather,
}

// ═══════════════════════════════════════════════════════════════════════
// TWO TIME DOMAINS
// ═══════════════════════════════════════════════════════════════════════
//
// Wall clock (epoch ms): stamina regen, water deadlines, presence
// timestamps. Persisted fields in this domain either catch up across
// sessions (stamina) or are re-based on load (water deadlines).
//
// Frame clock (bevy Time delta): gather countdown, growth accumulation,
// interpolation, autosave cadence. Pauses while the process is closed.

/// Wall-clock source. `fixed` pins the clock for tests.
#[derive(Resource, Debug, Clone, Default)]
pub struct WallClock {
    pub fixed: Option<f64>,
}

impl WallClock {
    pub fn now_ms(&self) -> f64 {
        if let Some(ms) = self.fixed {
            return ms;
        }
        system_now_ms()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn system_now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

#[cfg(target_arch = "wasm32")]
fn system_now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.time_origin() + p.now())
        .unwrap_or(0.0)
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD GRID
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileId {
    Grass,
    Soil,
    Water,
}

/// Identifier for a crop definition in the `CropRegistry`.
/// String IDs keep the crop set data-driven.
pub type CropId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub kind: CropId,
    /// Current growth stage, `0..stage_count`. The last stage is mature.
    pub stage: u8,
    /// Milliseconds accumulated toward the next stage. Frame-clock domain:
    /// only advances while the tile is watered and the loop is running.
    pub growth_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub tilled: bool,
    pub watered: bool,
    /// Wall-clock deadline (epoch ms) after which `watered` clears.
    /// Persisted as a remaining duration and re-based on load.
    pub water_end_at: f64,
    pub plant: Option<Plant>,
    pub walkable: bool,
}

impl Tile {
    pub fn grass() -> Self {
        Self {
            id: TileId::Grass,
            tilled: false,
            watered: false,
            water_end_at: 0.0,
            plant: None,
            walkable: true,
        }
    }

    pub fn soil() -> Self {
        Self {
            id: TileId::Soil,
            ..Self::grass()
        }
    }

    pub fn water() -> Self {
        Self {
            id: TileId::Water,
            walkable: false,
            ..Self::grass()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// DECORATIONS — gatherable / static world objects
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecorCategory {
    Tree,
    Flower,
    Mineral,
    Npc,
}

impl DecorCategory {
    /// Trees, minerals, and NPCs occupy their tile; flowers can be walked over.
    pub fn blocks_walking(self) -> bool {
        matches!(
            self,
            DecorCategory::Tree | DecorCategory::Mineral | DecorCategory::Npc
        )
    }

    pub fn gatherable(self) -> bool {
        !matches!(self, DecorCategory::Npc)
    }

    /// Skill slug credited when gathering from this category.
    pub fn skill_slug(self) -> Option<&'static str> {
        match self {
            DecorCategory::Mineral => Some("mining"),
            DecorCategory::Flower => Some("flower"),
            DecorCategory::Tree => Some("harvesting"),
            DecorCategory::Npc => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub x: i32,
    pub y: i32,
    pub category: DecorCategory,
    /// Node label, e.g. "Apple Tree", "Rose", "Copper Vein".
    pub kind: String,
    /// Phase offset so identical sprites don't sway in lockstep.
    pub anim_offset: f32,
    pub max_harvests: u8,
    pub remaining_harvests: u8,
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD GRID RESOURCE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGrid {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
    pub decorations: Vec<Decoration>,
    /// Seed used for decoration scatter; persisted so the same save
    /// regenerates the same layout.
    pub seed: u64,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self {
            width: WORLD_W,
            height: WORLD_H,
            tiles: vec![Tile::grass(); (WORLD_W * WORLD_H) as usize],
            decorations: Vec::new(),
            seed: 0,
        }
    }
}

impl WorldGrid {
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    pub fn tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.tiles.get((y * self.width + x) as usize)
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let w = self.width;
        self.tiles.get_mut((y * w + x) as usize)
    }

    pub fn decoration_at(&self, x: i32, y: i32) -> Option<&Decoration> {
        self.decorations.iter().find(|d| d.x == x && d.y == y)
    }

    pub fn decoration_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Decoration> {
        self.decorations.iter_mut().find(|d| d.x == x && d.y == y)
    }

    /// A tile is walkable when the base tile allows it and no blocking
    /// decoration occupies it.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        let Some(tile) = self.tile(x, y) else {
            return false;
        };
        if !tile.walkable {
            return false;
        }
        match self.decoration_at(x, y) {
            Some(d) => !d.category.blocks_walking(),
            None => true,
        }
    }

    /// Remove the decoration at (x, y), restoring tile walkability.
    pub fn remove_decoration(&mut self, x: i32, y: i32) -> Option<Decoration> {
        let idx = self
            .decorations
            .iter()
            .position(|d| d.x == x && d.y == y)?;
        Some(self.decorations.swap_remove(idx))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CROP REGISTRY — loaded from data
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropDef {
    pub id: CropId,
    pub name: String,
    /// Duration of each growth stage in milliseconds; `stage_ms.len()` is
    /// the number of growing stages, and stage `stage_ms.len()` is mature.
    pub stage_ms: Vec<f64>,
    pub seed_price: u32,
    pub crop_price: u32,
}

impl CropDef {
    /// Index of the terminal (mature) stage.
    pub fn mature_stage(&self) -> u8 {
        self.stage_ms.len() as u8
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct CropRegistry {
    pub crops: HashMap<CropId, CropDef>,
}

impl CropRegistry {
    pub fn get(&self, id: &str) -> Option<&CropDef> {
        self.crops.get(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RARITY & QUALITY
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Godlike,
    Mythic,
    Legendary,
    Rare,
    Uncommon,
    Common,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Godlike => "Godlike",
            Rarity::Mythic => "Mythic",
            Rarity::Legendary => "Legendary",
            Rarity::Rare => "Rare",
            Rarity::Uncommon => "Uncommon",
            Rarity::Common => "Common",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Godlike" => Some(Rarity::Godlike),
            "Mythic" => Some(Rarity::Mythic),
            "Legendary" => Some(Rarity::Legendary),
            "Rare" => Some(Rarity::Rare),
            "Uncommon" => Some(Rarity::Uncommon),
            "Common" => Some(Rarity::Common),
            _ => None,
        }
    }

    /// Sale price multiplier, monotone from Common up to Godlike.
    pub fn price_multiplier(self) -> f64 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.5,
            Rarity::Rare => 2.5,
            Rarity::Legendary => 6.0,
            Rarity::Mythic => 15.0,
            Rarity::Godlike => 40.0,
        }
    }

    /// High-tier rarities require explicit confirmation before selling.
    pub fn is_high_tier(self) -> bool {
        matches!(self, Rarity::Legendary | Rarity::Mythic | Rarity::Godlike)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    Dull,
    Normal,
    Refined,
    Pristine,
    Exquisite,
}

impl Quality {
    pub fn label(self) -> &'static str {
        match self {
            Quality::Dull => "Dull",
            Quality::Normal => "Normal",
            Quality::Refined => "Refined",
            Quality::Pristine => "Pristine",
            Quality::Exquisite => "Exquisite",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Dull" => Some(Quality::Dull),
            "Normal" => Some(Quality::Normal),
            "Refined" => Some(Quality::Refined),
            "Pristine" => Some(Quality::Pristine),
            "Exquisite" => Some(Quality::Exquisite),
            _ => None,
        }
    }

    pub fn price_multiplier(self) -> f64 {
        match self {
            Quality::Dull => 0.6,
            Quality::Normal => 1.0,
            Quality::Refined => 1.3,
            Quality::Pristine => 2.0,
            Quality::Exquisite => 3.0,
        }
    }

    pub fn is_high_tier(self) -> bool {
        matches!(self, Quality::Pristine | Quality::Exquisite)
    }
}

/// The outcome of one completed gather roll. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatheredItem {
    pub name: String,
    pub rarity: Rarity,
    pub quality: Quality,
    pub category: DecorCategory,
    /// Node label the item came from, e.g. "Apple Tree".
    pub source: String,
}

// ═══════════════════════════════════════════════════════════════════════
// INVENTORY
// ═══════════════════════════════════════════════════════════════════════

/// Last-seen identity details for an item name; used for tooltip and
/// pricing fallback when only the legacy aggregate count is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub rarity: Rarity,
    pub quality: Quality,
    pub category: DecorCategory,
    pub source: String,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Seed counts per crop id.
    pub seeds: HashMap<CropId, u32>,
    /// Harvested crop counts per crop id.
    pub crops: HashMap<CropId, u32>,
    /// Legacy aggregate gathered-item counts, keyed by item name alone.
    /// Kept in lockstep with `gitems` for older save compatibility.
    pub items: HashMap<String, u32>,
    /// Per-identity gathered-item stacks, keyed `name__rarity__quality`.
    pub gitems: HashMap<String, u32>,
    /// Last-seen meta per item name.
    pub item_meta: HashMap<String, ItemMeta>,
}

impl Inventory {
    pub fn gitem_key(name: &str, rarity: Rarity, quality: Quality) -> String {
        format!("{}__{}__{}", name, rarity.label(), quality.label())
    }

    /// Split a per-identity key back into (name, rarity, quality).
    /// Keys produced by migration may carry "Unknown" in either slot,
    /// which parses as `None`.
    pub fn parse_gitem_key(key: &str) -> Option<(String, Option<Rarity>, Option<Quality>)> {
        let parts: Vec<&str> = key.rsplitn(3, "__").collect();
        if parts.len() != 3 {
            return None;
        }
        // rsplitn yields [quality, rarity, name]
        Some((
            parts[2].to_string(),
            Rarity::from_label(parts[1]),
            Quality::from_label(parts[0]),
        ))
    }

    /// Record a gathered item: bump the legacy aggregate, the
    /// per-identity stack, and the last-seen meta together.
    pub fn add_gathered(&mut self, item: &GatheredItem) {
        *self.items.entry(item.name.clone()).or_insert(0) += 1;
        let key = Self::gitem_key(&item.name, item.rarity, item.quality);
        *self.gitems.entry(key).or_insert(0) += 1;
        self.item_meta.insert(
            item.name.clone(),
            ItemMeta {
                rarity: item.rarity,
                quality: item.quality,
                category: item.category,
                source: item.source.clone(),
            },
        );
    }

    /// Remove up to `quantity` from an exact per-identity stack, mirroring
    /// the decrement into the legacy aggregate. Returns how many were
    /// actually removed.
    pub fn remove_gitem(&mut self, key: &str, quantity: u32) -> u32 {
        let Some(count) = self.gitems.get_mut(key) else {
            return 0;
        };
        let removed = quantity.min(*count);
        *count -= removed;
        if *count == 0 {
            self.gitems.remove(key);
        }
        if let Some((name, _, _)) = Self::parse_gitem_key(key) {
            if let Some(agg) = self.items.get_mut(&name) {
                *agg = agg.saturating_sub(removed);
                if *agg == 0 {
                    self.items.remove(&name);
                }
            }
        }
        removed
    }

    pub fn seed_count(&self, crop_id: &str) -> u32 {
        self.seeds.get(crop_id).copied().unwrap_or(0)
    }

    pub fn add_seeds(&mut self, crop_id: &str, quantity: u32) {
        *self.seeds.entry(crop_id.to_string()).or_insert(0) += quantity;
    }

    /// Consume one seed. Returns false (and mutates nothing) if none held.
    pub fn take_seed(&mut self, crop_id: &str) -> bool {
        match self.seeds.get_mut(crop_id) {
            Some(n) if *n > 0 => {
                *n -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn add_crop(&mut self, crop_id: &str, quantity: u32) {
        *self.crops.entry(crop_id.to_string()).or_insert(0) += quantity;
    }
}

// ═══════════════════════════════════════════════════════════════════════
// STAMINA
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Stamina {
    pub current: f32,
    pub max: f32,
    /// Wall-clock anchor (epoch ms) of the last applied regen interval.
    pub last_regen_at: f64,
}

impl Default for Stamina {
    fn default() -> Self {
        Self {
            current: MAX_STAMINA,
            max: MAX_STAMINA,
            last_regen_at: 0.0,
        }
    }
}

impl Stamina {
    pub fn drain(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn regen(&mut self, amount: f32) {
        self.current = (self.current + amount).min(self.max);
    }

    /// Apply passive regen for every whole interval elapsed since
    /// `last_regen_at`. The anchor advances by exactly the consumed
    /// intervals so partial progress toward the next tick is never lost
    /// and no backlog accumulates. Returns the number of intervals applied.
    pub fn catch_up(&mut self, now_ms: f64) -> u64 {
        if self.last_regen_at <= 0.0 {
            self.last_regen_at = now_ms;
            return 0;
        }
        let elapsed = now_ms - self.last_regen_at;
        if elapsed < STAMINA_REGEN_INTERVAL_MS {
            return 0;
        }
        let intervals = (elapsed / STAMINA_REGEN_INTERVAL_MS).floor() as u64;
        self.regen(intervals as f32 * STAMINA_REGEN_PER_INTERVAL);
        self.last_regen_at += intervals as f64 * STAMINA_REGEN_INTERVAL_MS;
        intervals
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CURRENCIES
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyKind {
    Coins,
    Scrap,
    Gems,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct Currencies {
    pub coins: u32,
    pub scrap: u32,
    pub gems: u32,
}

impl Default for Currencies {
    fn default() -> Self {
        Self {
            coins: STARTING_COINS,
            scrap: 0,
            gems: 0,
        }
    }
}

impl Currencies {
    pub fn balance(&self, kind: CurrencyKind) -> u32 {
        match kind {
            CurrencyKind::Coins => self.coins,
            CurrencyKind::Scrap => self.scrap,
            CurrencyKind::Gems => self.gems,
        }
    }

    fn balance_mut(&mut self, kind: CurrencyKind) -> &mut u32 {
        match kind {
            CurrencyKind::Coins => &mut self.coins,
            CurrencyKind::Scrap => &mut self.scrap,
            CurrencyKind::Gems => &mut self.gems,
        }
    }

    pub fn credit(&mut self, kind: CurrencyKind, amount: u32) {
        let bal = self.balance_mut(kind);
        *bal = bal.saturating_add(amount);
    }

    /// Debit, clamping at zero. Returns false if the balance was short.
    pub fn debit(&mut self, kind: CurrencyKind, amount: u32) -> bool {
        let bal = self.balance_mut(kind);
        if *bal >= amount {
            *bal -= amount;
            true
        } else {
            *bal = 0;
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SKILLS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTrack {
    pub xp: u32,
    pub level: u32,
}

#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skills {
    pub tracks: HashMap<String, SkillTrack>,
}

impl Skills {
    pub const XP_PER_LEVEL: u32 = 25;

    pub fn xp(&self, slug: &str) -> u32 {
        self.tracks.get(slug).map(|t| t.xp).unwrap_or(0)
    }

    pub fn level(&self, slug: &str) -> u32 {
        self.tracks.get(slug).map(|t| t.level).unwrap_or(0)
    }

    /// Add xp and recalculate the level. Returns the new level if a
    /// boundary was crossed.
    pub fn add_xp(&mut self, slug: &str, amount: u32) -> Option<u32> {
        let track = self.tracks.entry(slug.to_string()).or_default();
        let prev = track.level;
        track.xp += amount;
        track.level = track.xp / Self::XP_PER_LEVEL;
        (track.level > prev).then_some(track.level)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Facing::Up => (0, 1),
            Facing::Down => (0, -1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }

    /// Facing derived from the dominant axis of a movement delta.
    /// Ties bias vertical, which reads better for a top-down game.
    pub fn from_delta(dx: f32, dy: f32) -> Self {
        if dy.abs() >= dx.abs() {
            if dy > 0.0 {
                Facing::Up
            } else {
                Facing::Down
            }
        } else if dx > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Hoe,
    WateringCan,
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Position in tile coordinates (fractional while moving).
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    pub is_moving: bool,
    /// Tiles per second.
    pub speed: f32,
    pub active_tool: ToolKind,
    pub equipped_seed: Option<CropId>,
    pub username: String,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            facing: Facing::Down,
            is_moving: false,
            speed: 5.0,
            active_tool: ToolKind::Hoe,
            equipped_seed: None,
            username: String::from("wanderer"),
        }
    }
}

impl PlayerState {
    pub fn grid_pos(&self) -> (i32, i32) {
        (self.x.round() as i32, self.y.round() as i32)
    }

    /// The tile the player's tools and interactions target.
    pub fn front_tile(&self) -> (i32, i32) {
        let (gx, gy) = self.grid_pos();
        let (dx, dy) = self.facing.delta();
        (gx + dx, gy + dy)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// GATHERING STATE
// ═══════════════════════════════════════════════════════════════════════

/// The gathering state machine: `active == None` is Idle; completion is
/// handled synchronously the frame the countdown finishes.
#[derive(Resource, Debug, Clone, Default)]
pub struct GatherState {
    pub active: Option<ActiveGather>,
}

#[derive(Debug, Clone)]
pub struct ActiveGather {
    pub x: i32,
    pub y: i32,
    /// Frame-clock milliseconds elapsed since the gather began.
    pub elapsed_ms: f32,
}

impl ActiveGather {
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / GATHER_DURATION_MS).clamp(0.0, 1.0)
    }
}

impl GatherState {
    pub fn is_locked(&self) -> bool {
        self.active.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SHARED RNG
// ═══════════════════════════════════════════════════════════════════════

/// Single gameplay RNG. Re-seeded from the save's world seed on load so
/// every roll in the game draws from one source.
#[derive(Resource)]
pub struct GameRng(pub rand::rngs::StdRng);

impl Default for GameRng {
    fn default() -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(0x4a55_4e4b))
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — command/intent layer
// ═══════════════════════════════════════════════════════════════════════

/// A tool applied to a target tile. Till and Water flow through here.
#[derive(Event, Debug, Clone)]
pub struct ToolUseEvent {
    pub tool: ToolKind,
    pub target_x: i32,
    pub target_y: i32,
}

#[derive(Event, Debug, Clone)]
pub struct PlantSeedEvent {
    pub grid_x: i32,
    pub grid_y: i32,
    pub crop_id: CropId,
}

#[derive(Event, Debug, Clone)]
pub struct HarvestAttemptEvent {
    pub grid_x: i32,
    pub grid_y: i32,
}

#[derive(Event, Debug, Clone)]
pub struct StartGatherEvent {
    pub grid_x: i32,
    pub grid_y: i32,
}

/// Sell one unit from an exact per-identity stack. High-tier items are
/// refused unless `confirmed` is set; the guard lives in the handler,
/// not the UI.
#[derive(Event, Debug, Clone)]
pub struct SellItemEvent {
    pub gitem_key: String,
    pub confirmed: bool,
}

#[derive(Event, Debug, Clone)]
pub struct SellAllEvent;

#[derive(Event, Debug, Clone)]
pub struct BuySeedsEvent {
    pub crop_id: CropId,
    pub quantity: u32,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — signals
// ═══════════════════════════════════════════════════════════════════════

#[derive(Event, Debug, Clone)]
pub struct CurrencyChangeEvent {
    pub kind: CurrencyKind,
    /// Positive = credit, negative = debit.
    pub amount: i64,
    pub reason: String,
}

#[derive(Event, Debug, Clone)]
pub struct StaminaDrainEvent {
    pub amount: f32,
}

#[derive(Event, Debug, Clone)]
pub struct SkillXpEvent {
    pub slug: String,
    pub amount: u32,
}

/// Transient in-world message near the action location. Resource-state
/// failures (no stamina, no seeds, depleted node) surface here rather
/// than as errors.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

#[derive(Event, Debug, Clone)]
pub struct GatherCompletedEvent {
    pub item: GatheredItem,
    pub bonus_seed: Option<String>,
}

/// A high-tier sell arrived unconfirmed; the UI should prompt and resend
/// with `confirmed: true`.
#[derive(Event, Debug, Clone)]
pub struct SellConfirmRequiredEvent {
    pub gitem_key: String,
    pub price: u32,
}

/// Request an immediate save (economic actions, harvest).
#[derive(Event, Debug, Clone)]
pub struct SaveRequestEvent;

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const WORLD_W: i32 = 64;
pub const WORLD_H: i32 = 48;

pub const TILE_SIZE: f32 = 16.0;
pub const PIXEL_SCALE: f32 = 3.0;
pub const SCREEN_WIDTH: f32 = 960.0;
pub const SCREEN_HEIGHT: f32 = 540.0;

/// Farm rectangle (soil) carved at generation, in tile coordinates.
pub const FARM_X: i32 = 8;
pub const FARM_Y: i32 = 8;
pub const FARM_W: i32 = 12;
pub const FARM_H: i32 = 10;

/// Pond rectangle (water, non-walkable).
pub const POND_X: i32 = 42;
pub const POND_Y: i32 = 30;
pub const POND_W: i32 = 10;
pub const POND_H: i32 = 7;

pub const MAX_STAMINA: f32 = 100.0;
/// One stamina point regenerates per interval.
pub const STAMINA_REGEN_INTERVAL_MS: f64 = 5.0 * 60.0 * 1000.0;
pub const STAMINA_REGEN_PER_INTERVAL: f32 = 1.0;

/// Fixed gather countdown (frame-clock).
pub const GATHER_DURATION_MS: f32 = 1500.0;
pub const GATHER_STAMINA_COST: f32 = 1.0;
/// Chance of a bonus category seed on tree/flower gathers.
pub const BONUS_SEED_CHANCE: f64 = 0.02;

/// How long a watering lasts (wall-clock deadline).
pub const WATER_DURATION_MS: f64 = 10.0 * 60.0 * 1000.0;

pub const AUTOSAVE_INTERVAL_SECS: f32 = 5.0;

/// Remote deltas beyond this many tiles are treated as teleports.
pub const TELEPORT_TILES: f32 = 3.0;
/// Spring constant pulling the rendered position toward the target.
pub const REMOTE_SPRING_RATE: f32 = 10.0;
/// Exponential decay rate for predicted remote velocity.
pub const REMOTE_VELOCITY_DECAY: f32 = 6.0;
/// Cadence for broadcasting the local player's state.
pub const PRESENCE_PUBLISH_SECS: f32 = 0.25;

pub const STARTING_COINS: u32 = 50;
/// Crop id and count of the seeds a fresh save starts with.
pub const STARTER_SEED_CROP: &str = "carrot";
pub const STARTER_SEED_COUNT: u32 = 5;
