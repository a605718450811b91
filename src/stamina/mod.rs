//! Stamina domain — drain events and wall-clock passive regen.
//!
//! Regen is anchored to `last_regen_at` and applied in whole intervals,
//! so a session that was closed for an hour catches up in one step on
//! boot. A periodic poll re-runs the same catch-up to stay correct
//! through long suspensions (backgrounded tabs).

use bevy::prelude::*;

use crate::shared::*;

/// How often the regen poll re-checks the wall clock.
const REGEN_POLL_SECS: f32 = 10.0;

#[derive(Resource)]
struct RegenPollTimer(Timer);

impl Default for RegenPollTimer {
    fn default() -> Self {
        Self(Timer::from_seconds(REGEN_POLL_SECS, TimerMode::Repeating))
    }
}

pub struct StaminaPlugin;

impl Plugin for StaminaPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RegenPollTimer>()
            .add_systems(OnEnter(GameState::Playing), apply_boot_catch_up)
            .add_systems(
                Update,
                (apply_stamina_drain, poll_regen)
                    .in_set(SimSet::Player)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

fn apply_boot_catch_up(clock: Res<WallClock>, mut stamina: ResMut<Stamina>) {
    let applied = stamina.catch_up(clock.now_ms());
    if applied > 0 {
        info!(
            "Stamina caught up {} interval(s) while away; now {}/{}",
            applied, stamina.current, stamina.max
        );
    }
}

pub fn apply_stamina_drain(
    mut drain_events: EventReader<StaminaDrainEvent>,
    mut stamina: ResMut<Stamina>,
) {
    for event in drain_events.read() {
        stamina.drain(event.amount);
    }
}

fn poll_regen(
    time: Res<Time>,
    clock: Res<WallClock>,
    mut timer: ResMut<RegenPollTimer>,
    mut stamina: ResMut<Stamina>,
) {
    if timer.0.tick(time.delta()).just_finished() {
        stamina.catch_up(clock.now_ms());
    }
}
