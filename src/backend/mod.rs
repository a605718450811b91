//! Backend domain — the remote-store contract and a best-effort sync.
//!
//! The store is an external collaborator: the game only depends on this
//! trait, every call site swallows failures with a warning, and the
//! local save blob remains the source of truth. All upserts are keyed
//! (identity, secondary key) and idempotent.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub zone: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSkill {
    pub slug: String,
    pub level: u32,
    pub xp: u32,
}

pub trait StoreBackend: Send + Sync {
    /// Establish (or recall) the caller's identity. Stable across calls.
    fn ensure_identity(&mut self) -> Result<String, String>;

    fn upsert_profile(&mut self, fields: HashMap<String, String>) -> Result<(), String>;
    fn read_profile(&self) -> Result<Option<HashMap<String, String>>, String>;

    fn upsert_position(&mut self, x: f32, y: f32, z: f32, zone: &str) -> Result<(), String>;
    fn read_position(&self) -> Result<Option<StoredPosition>, String>;

    fn read_skills(&self) -> Result<Vec<StoredSkill>, String>;
    fn upsert_skill(&mut self, slug: &str, level: u32, xp: u32) -> Result<(), String>;

    fn read_inventory(&self) -> Result<HashMap<String, u32>, String>;
    fn upsert_inventory_quantity(&mut self, slug: &str, qty: u32) -> Result<(), String>;

    fn upsert_named_save(&mut self, slot: &str, blob: &str) -> Result<(), String>;
    fn read_save(&self, slot: &str) -> Result<Option<String>, String>;
    fn list_saves(&self) -> Result<Vec<String>, String>;
}

// ─────────────────────────────────────────────────────────────────────────────
// In-memory reference implementation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    identity: Option<String>,
    profile: Option<HashMap<String, String>>,
    position: Option<StoredPosition>,
    skills: HashMap<String, StoredSkill>,
    inventory: HashMap<String, u32>,
    saves: HashMap<String, String>,
}

impl StoreBackend for MemoryStore {
    fn ensure_identity(&mut self) -> Result<String, String> {
        Ok(self
            .identity
            .get_or_insert_with(|| "local-player".to_string())
            .clone())
    }

    fn upsert_profile(&mut self, fields: HashMap<String, String>) -> Result<(), String> {
        self.profile.get_or_insert_with(HashMap::new).extend(fields);
        Ok(())
    }

    fn read_profile(&self) -> Result<Option<HashMap<String, String>>, String> {
        Ok(self.profile.clone())
    }

    fn upsert_position(&mut self, x: f32, y: f32, z: f32, zone: &str) -> Result<(), String> {
        self.position = Some(StoredPosition {
            x,
            y,
            z,
            zone: zone.to_string(),
        });
        Ok(())
    }

    fn read_position(&self) -> Result<Option<StoredPosition>, String> {
        Ok(self.position.clone())
    }

    fn read_skills(&self) -> Result<Vec<StoredSkill>, String> {
        Ok(self.skills.values().cloned().collect())
    }

    fn upsert_skill(&mut self, slug: &str, level: u32, xp: u32) -> Result<(), String> {
        self.skills.insert(
            slug.to_string(),
            StoredSkill {
                slug: slug.to_string(),
                level,
                xp,
            },
        );
        Ok(())
    }

    fn read_inventory(&self) -> Result<HashMap<String, u32>, String> {
        Ok(self.inventory.clone())
    }

    fn upsert_inventory_quantity(&mut self, slug: &str, qty: u32) -> Result<(), String> {
        self.inventory.insert(slug.to_string(), qty);
        Ok(())
    }

    fn upsert_named_save(&mut self, slot: &str, blob: &str) -> Result<(), String> {
        self.saves.insert(slot.to_string(), blob.to_string());
        Ok(())
    }

    fn read_save(&self, slot: &str) -> Result<Option<String>, String> {
        Ok(self.saves.get(slot).cloned())
    }

    fn list_saves(&self) -> Result<Vec<String>, String> {
        let mut slots: Vec<String> = self.saves.keys().cloned().collect();
        slots.sort();
        Ok(slots)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin — periodic best-effort sync of position and skills
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource)]
pub struct BackendHandle(pub Box<dyn StoreBackend>);

impl Default for BackendHandle {
    fn default() -> Self {
        Self(Box::new(MemoryStore::default()))
    }
}

const BACKEND_SYNC_SECS: f32 = 10.0;

#[derive(Resource)]
struct BackendSyncTimer(Timer);

impl Default for BackendSyncTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(BACKEND_SYNC_SECS, TimerMode::Repeating))
    }
}

pub struct BackendPlugin;

impl Plugin for BackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BackendHandle>()
            .init_resource::<BackendSyncTimer>()
            .add_systems(OnEnter(GameState::Playing), establish_identity)
            .add_systems(
                Update,
                sync_to_backend
                    .after(SimSet::Gather)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn establish_identity(mut backend: ResMut<BackendHandle>, player: Res<PlayerState>) {
    match backend.0.ensure_identity() {
        Ok(id) => {
            info!("Backend identity: {}", id);
            let mut fields = HashMap::new();
            fields.insert("username".to_string(), player.username.clone());
            if let Err(e) = backend.0.upsert_profile(fields) {
                warn!("Profile upsert failed: {}", e);
            }
        }
        Err(e) => warn!("Backend identity unavailable: {}", e),
    }
}

fn sync_to_backend(
    time: Res<Time>,
    mut timer: ResMut<BackendSyncTimer>,
    mut backend: ResMut<BackendHandle>,
    player: Res<PlayerState>,
    skills: Res<Skills>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    if let Err(e) = backend.0.upsert_position(player.x, player.y, 0.0, "overworld") {
        warn!("Position sync failed: {}", e);
    }
    for (slug, track) in &skills.tracks {
        if let Err(e) = backend.0.upsert_skill(slug, track.level, track.xp) {
            warn!("Skill sync failed for {}: {}", slug, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_stable() {
        let mut store = MemoryStore::default();
        let a = store.ensure_identity().unwrap();
        let b = store.ensure_identity().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_upserts_are_idempotent() {
        let mut store = MemoryStore::default();
        store.upsert_skill("mining", 2, 55).unwrap();
        store.upsert_skill("mining", 2, 55).unwrap();
        let skills = store.read_skills().unwrap();
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].xp, 55);

        store.upsert_position(1.0, 2.0, 0.0, "overworld").unwrap();
        store.upsert_position(1.0, 2.0, 0.0, "overworld").unwrap();
        assert_eq!(
            store.read_position().unwrap().unwrap(),
            StoredPosition {
                x: 1.0,
                y: 2.0,
                z: 0.0,
                zone: "overworld".to_string()
            }
        );
    }

    #[test]
    fn test_named_saves_round_trip() {
        let mut store = MemoryStore::default();
        store.upsert_named_save("slot-a", "{}").unwrap();
        store.upsert_named_save("slot-b", "{\"v\":2}").unwrap();
        assert_eq!(store.read_save("slot-a").unwrap().unwrap(), "{}");
        assert_eq!(store.list_saves().unwrap(), vec!["slot-a", "slot-b"]);
        assert!(store.read_save("missing").unwrap().is_none());
    }
}
