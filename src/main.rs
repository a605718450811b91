mod shared;
mod catalog;
mod data;
mod world;
mod player;
mod input;
mod farming;
mod gathering;
mod stamina;
mod skills;
mod economy;
mod save;
mod backend;
mod net;
mod render;

use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use shared::*;

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Junkora".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Tick ordering: world timers → player actions → gather progress
        .configure_sets(
            Update,
            (SimSet::WorldTick, SimSet::Player, SimSet::Gather).chain(),
        )
        // Shared resources
        .init_resource::<WallClock>()
        .init_resource::<WorldGrid>()
        .init_resource::<Inventory>()
        .init_resource::<Stamina>()
        .init_resource::<Currencies>()
        .init_resource::<Skills>()
        .init_resource::<PlayerState>()
        .init_resource::<GatherState>()
        .init_resource::<GameRng>()
        .init_resource::<CropRegistry>()
        .init_resource::<catalog::Catalog>()
        // Command events
        .add_event::<ToolUseEvent>()
        .add_event::<PlantSeedEvent>()
        .add_event::<HarvestAttemptEvent>()
        .add_event::<StartGatherEvent>()
        .add_event::<SellItemEvent>()
        .add_event::<SellAllEvent>()
        .add_event::<BuySeedsEvent>()
        // Signal events
        .add_event::<CurrencyChangeEvent>()
        .add_event::<StaminaDrainEvent>()
        .add_event::<SkillXpEvent>()
        .add_event::<ToastEvent>()
        .add_event::<GatherCompletedEvent>()
        .add_event::<SellConfirmRequiredEvent>()
        .add_event::<SaveRequestEvent>()
        // Domain plugins
        .add_plugins(data::DataPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(input::InputPlugin)
        .add_plugins(farming::FarmingPlugin)
        .add_plugins(gathering::GatheringPlugin)
        .add_plugins(stamina::StaminaPlugin)
        .add_plugins(skills::SkillsPlugin)
        .add_plugins(economy::EconomyPlugin)
        .add_plugins(save::SavePlugin)
        .add_plugins(backend::BackendPlugin)
        .add_plugins(net::NetPlugin)
        .add_plugins(render::RenderPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .add_systems(PostUpdate, camera_follow.run_if(in_state(GameState::Playing)))
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_scale(Vec3::splat(1.0 / PIXEL_SCALE)),
    ));
}

fn camera_follow(
    player: Res<PlayerState>,
    mut cameras: Query<&mut Transform, With<Camera2d>>,
) {
    for mut transform in cameras.iter_mut() {
        transform.translation.x = player.x * TILE_SIZE;
        transform.translation.y = player.y * TILE_SIZE;
    }
}
