//! Skills domain — applies xp awards and announces level-ups.
//!
//! Gathering credits mining/flower/harvesting; crop harvests credit
//! harvesting. Levels are recalculated from total xp after each award.

use bevy::prelude::*;

use crate::shared::*;

pub struct SkillsPlugin;

impl Plugin for SkillsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            apply_skill_xp
                .in_set(SimSet::Gather)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

pub fn apply_skill_xp(
    mut xp_events: EventReader<SkillXpEvent>,
    mut skills: ResMut<Skills>,
    mut toast_events: EventWriter<ToastEvent>,
) {
    for event in xp_events.read() {
        if let Some(new_level) = skills.add_xp(&event.slug, event.amount) {
            toast_events.send(ToastEvent {
                message: format!("{} skill up! Level {}", event.slug, new_level),
                duration_secs: 3.0,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xp_accumulates_per_slug() {
        let mut skills = Skills::default();
        skills.add_xp("mining", 3);
        skills.add_xp("mining", 2);
        skills.add_xp("flower", 1);
        assert_eq!(skills.xp("mining"), 5);
        assert_eq!(skills.xp("flower"), 1);
        assert_eq!(skills.xp("harvesting"), 0);
    }

    #[test]
    fn test_level_boundary_reports_once() {
        let mut skills = Skills::default();
        assert_eq!(skills.add_xp("mining", Skills::XP_PER_LEVEL - 1), None);
        assert_eq!(skills.add_xp("mining", 1), Some(1));
        assert_eq!(skills.add_xp("mining", 1), None);
        assert_eq!(skills.level("mining"), 1);
    }
}
