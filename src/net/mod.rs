//! Net domain — multiplayer presence and remote-player interpolation.
//!
//! Peer positions arrive two ways with no ordering guarantee between
//! them: periodic authoritative `Sync` snapshots and opportunistic
//! `Movement` broadcasts. Both feed the same reconciliation: estimate a
//! velocity from the delta since the last authoritative update, reject
//! teleport-sized deltas by snapping, and let a per-frame spring pull
//! the rendered position toward the target while the predicted velocity
//! decays to zero.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Presence channel contract
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerState {
    pub uid: String,
    pub username: String,
    pub x: f32,
    pub y: f32,
    pub facing: Facing,
    /// Sender's wall-clock timestamp (epoch ms).
    pub ts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresenceMessage {
    /// Authoritative snapshot of every present peer.
    Sync(Vec<PeerState>),
    /// Opportunistic single-peer movement broadcast.
    Movement(PeerState),
    /// A peer's presence was lost.
    Leave(String),
}

/// The named broadcast topic, modeled as message queues. A transport
/// adapter pushes inbound messages and drains outbound ones; tests push
/// inbound directly.
#[derive(Resource, Debug, Default)]
pub struct PresenceBus {
    pub joined: bool,
    pub inbound: VecDeque<PresenceMessage>,
    pub outbound: VecDeque<PeerState>,
}

impl PresenceBus {
    pub fn join(&mut self) {
        self.joined = true;
    }

    pub fn leave(&mut self) {
        self.joined = false;
        self.inbound.clear();
        self.outbound.clear();
    }

    pub fn publish_state(&mut self, state: PeerState) {
        if self.joined {
            self.outbound.push_back(state);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Remote view state
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RemoteView {
    pub username: String,
    /// Rendered position (what the camera shows).
    pub rx: f32,
    pub ry: f32,
    /// Authoritative target from the last update.
    pub tx: f32,
    pub ty: f32,
    /// Estimated velocity, tiles/sec; decays between updates.
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub anim_phase: f32,
    /// Timestamp of the last authoritative update (sender clock, ms).
    pub last_update_ms: f64,
}

impl RemoteView {
    pub fn new(state: &PeerState) -> Self {
        Self {
            username: state.username.clone(),
            rx: state.x,
            ry: state.y,
            tx: state.x,
            ty: state.y,
            vx: 0.0,
            vy: 0.0,
            facing: state.facing,
            anim_phase: 0.0,
            last_update_ms: state.ts,
        }
    }

    /// Reconcile an authoritative update. Deltas beyond the teleport
    /// threshold snap the rendered position instead of smoothing through
    /// an illegal jump.
    pub fn apply_update(&mut self, state: &PeerState) {
        let dx = state.x - self.tx;
        let dy = state.y - self.ty;
        let dist = (dx * dx + dy * dy).sqrt();
        let elapsed_secs = ((state.ts - self.last_update_ms) / 1000.0).max(0.05) as f32;

        if dist > TELEPORT_TILES {
            self.vx = 0.0;
            self.vy = 0.0;
            self.rx = state.x;
            self.ry = state.y;
        } else {
            self.vx = dx / elapsed_secs;
            self.vy = dy / elapsed_secs;
            if dist > 0.01 {
                self.facing = Facing::from_delta(dx, dy);
            }
        }
        self.tx = state.x;
        self.ty = state.y;
        self.username = state.username.clone();
        self.last_update_ms = state.ts;
    }

    /// One frame of smoothing: spring toward the target plus the
    /// predicted velocity, which decays so prediction never diverges
    /// permanently between snapshots.
    pub fn step(&mut self, dt: f32) {
        self.rx += (self.tx - self.rx) * REMOTE_SPRING_RATE * dt + self.vx * dt;
        self.ry += (self.ty - self.ry) * REMOTE_SPRING_RATE * dt + self.vy * dt;

        let decay = (1.0 - REMOTE_VELOCITY_DECAY * dt).clamp(0.0, 1.0);
        self.vx *= decay;
        self.vy *= decay;

        let moving = self.vx.abs() + self.vy.abs() > 0.05
            || (self.tx - self.rx).abs() + (self.ty - self.ry).abs() > 0.05;
        if moving {
            self.anim_phase = (self.anim_phase + dt * 8.0) % 4.0;
        } else {
            self.anim_phase = 0.0;
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct RemoteViews {
    pub views: HashMap<String, RemoteView>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Resource)]
struct PublishTimer(Timer);

impl Default for PublishTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(
            PRESENCE_PUBLISH_SECS,
            TimerMode::Repeating,
        ))
    }
}

pub struct NetPlugin;

impl Plugin for NetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PresenceBus>()
            .init_resource::<RemoteViews>()
            .init_resource::<PublishTimer>()
            .add_systems(OnEnter(GameState::Playing), join_presence)
            .add_systems(
                Update,
                (drain_presence_bus, interpolate_remote_views, publish_local_state)
                    .chain()
                    .after(SimSet::Player)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn join_presence(mut bus: ResMut<PresenceBus>) {
    bus.join();
    info!("Joined presence channel");
}

/// Apply queued presence messages to the remote-view map. Sync and
/// movement run through the same reconciliation; leave garbage-collects.
pub fn drain_presence_bus(mut bus: ResMut<PresenceBus>, mut remotes: ResMut<RemoteViews>) {
    apply_messages(&mut bus, &mut remotes);
}

pub fn apply_messages(bus: &mut PresenceBus, remotes: &mut RemoteViews) {
    while let Some(message) = bus.inbound.pop_front() {
        match message {
            PresenceMessage::Sync(peers) => {
                for peer in &peers {
                    reconcile(remotes, peer);
                }
            }
            PresenceMessage::Movement(peer) => {
                reconcile(remotes, &peer);
            }
            PresenceMessage::Leave(uid) => {
                remotes.views.remove(&uid);
            }
        }
    }
}

fn reconcile(remotes: &mut RemoteViews, peer: &PeerState) {
    match remotes.views.get_mut(&peer.uid) {
        Some(view) => view.apply_update(peer),
        None => {
            remotes.views.insert(peer.uid.clone(), RemoteView::new(peer));
        }
    }
}

pub fn interpolate_remote_views(time: Res<Time>, mut remotes: ResMut<RemoteViews>) {
    let dt = time.delta_secs();
    for view in remotes.views.values_mut() {
        view.step(dt);
    }
}

fn publish_local_state(
    time: Res<Time>,
    clock: Res<WallClock>,
    mut timer: ResMut<PublishTimer>,
    mut bus: ResMut<PresenceBus>,
    player: Res<PlayerState>,
) {
    if !timer.0.tick(time.delta()).just_finished() {
        return;
    }
    let state = PeerState {
        uid: String::new(), // filled in by the transport adapter
        username: player.username.clone(),
        x: player.x,
        y: player.y,
        facing: player.facing,
        ts: clock.now_ms(),
    };
    bus.publish_state(state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer(uid: &str, x: f32, y: f32, ts: f64) -> PeerState {
        PeerState {
            uid: uid.to_string(),
            username: uid.to_string(),
            x,
            y,
            facing: Facing::Down,
            ts,
        }
    }

    #[test]
    fn test_first_sighting_snaps_to_position() {
        let view = RemoteView::new(&peer("a", 4.0, 6.0, 1_000.0));
        assert_eq!((view.rx, view.ry), (4.0, 6.0));
        assert_eq!((view.vx, view.vy), (0.0, 0.0));
    }

    #[test]
    fn test_small_delta_estimates_velocity() {
        let mut view = RemoteView::new(&peer("a", 0.0, 0.0, 1_000.0));
        // 1 tile right over 500 ms → 2 tiles/sec.
        view.apply_update(&peer("a", 1.0, 0.0, 1_500.0));
        assert!((view.vx - 2.0).abs() < 1e-4);
        assert_eq!(view.facing, Facing::Right);
        // Rendered position has not jumped.
        assert_eq!(view.rx, 0.0);
    }

    #[test]
    fn test_teleport_delta_snaps_without_sliding() {
        let mut view = RemoteView::new(&peer("a", 0.0, 0.0, 1_000.0));
        view.apply_update(&peer("a", 20.0, 15.0, 1_200.0));
        assert_eq!((view.rx, view.ry), (20.0, 15.0));
        assert_eq!((view.vx, view.vy), (0.0, 0.0));
    }

    #[test]
    fn test_spring_converges_on_target() {
        let mut view = RemoteView::new(&peer("a", 0.0, 0.0, 1_000.0));
        view.apply_update(&peer("a", 2.0, 0.0, 1_500.0));
        for _ in 0..120 {
            view.step(1.0 / 60.0);
        }
        assert!((view.rx - 2.0).abs() < 0.05, "rx = {}", view.rx);
        // Velocity has decayed away.
        assert!(view.vx.abs() < 0.05);
    }

    #[test]
    fn test_leave_garbage_collects() {
        let mut bus = PresenceBus::default();
        bus.join();
        let mut remotes = RemoteViews::default();
        bus.inbound
            .push_back(PresenceMessage::Sync(vec![peer("a", 1.0, 1.0, 1_000.0)]));
        apply_messages(&mut bus, &mut remotes);
        assert!(remotes.views.contains_key("a"));

        bus.inbound.push_back(PresenceMessage::Leave("a".to_string()));
        apply_messages(&mut bus, &mut remotes);
        assert!(remotes.views.is_empty());
    }

    #[test]
    fn test_sync_and_movement_feed_same_reconciliation() {
        let mut remotes = RemoteViews::default();
        reconcile(&mut remotes, &peer("a", 0.0, 0.0, 1_000.0));
        reconcile(&mut remotes, &peer("a", 1.0, 0.0, 1_500.0));
        let view = remotes.views.get("a").unwrap();
        assert_eq!(view.tx, 1.0);
        assert!(view.vx > 0.0);
    }

    #[test]
    fn test_publish_requires_join() {
        let mut bus = PresenceBus::default();
        bus.publish_state(peer("me", 0.0, 0.0, 0.0));
        assert!(bus.outbound.is_empty());
        bus.join();
        bus.publish_state(peer("me", 0.0, 0.0, 0.0));
        assert_eq!(bus.outbound.len(), 1);

        // Leaving drops queued traffic and stops further publishes.
        bus.leave();
        assert!(bus.outbound.is_empty());
        bus.publish_state(peer("me", 1.0, 1.0, 0.0));
        assert!(bus.outbound.is_empty());
    }
}
