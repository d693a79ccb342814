//! Hex world viewer.
//!
//! Builds the hex tile terrain from a heightmap (or procedural noise) and
//! shows it from an overview camera. `B` rebuilds, `C` clears, Tab toggles
//! the inspector.

use bevy::app::AppExit;
use bevy::prelude::*;
#[cfg(feature = "native")]
use bevy::remote::{RemotePlugin, http::RemoteHttpPlugin};
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use hex_world::GameState;
use hex_world::camera::{CameraConfig, CameraPlugin};
use hex_world::terrain::{TerrainConfig, TerrainPlugin};

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;
    use hex_world::terrain::{HeightmapSource, TerrainConfig};

    /// Hexagonal tile terrain viewer.
    #[derive(Parser, Debug)]
    #[command(version, about)]
    pub struct Cli {
        /// Heightmap image (red channel), relative to the assets directory.
        /// Without it a noise heightmap is generated.
        #[arg(long)]
        heightmap: Option<String>,
        /// Subtracted from every tile height.
        #[arg(long)]
        sea_level: Option<i32>,
        /// Heightmap values per tile level.
        #[arg(long)]
        height_factor: Option<i32>,
        /// Seed of the noise heightmap and the vertex distortion.
        #[arg(long)]
        seed: Option<u32>,
        /// Columns of the noise heightmap.
        #[arg(long)]
        width: Option<u32>,
        /// Rows of the noise heightmap.
        #[arg(long)]
        height: Option<u32>,
    }

    impl Cli {
        /// Applies the given flags on top of `cfg`.
        pub fn apply(self, cfg: &mut TerrainConfig) {
            if let Some(path) = self.heightmap {
                cfg.heightmap = HeightmapSource::Image(path);
            }
            if let Some(sea_level) = self.sea_level {
                cfg.mesh.sea_level = sea_level;
            }
            if let Some(height_factor) = self.height_factor {
                cfg.mesh.height_factor = height_factor;
            }
            if let Some(seed) = self.seed {
                cfg.mesh.seed = seed;
                cfg.noise_map.seed = seed;
            }
            if let Some(width) = self.width {
                cfg.noise_map.width = width;
            }
            if let Some(height) = self.height {
                cfg.noise_map.height = height;
            }
        }
    }
}

fn main() {
    #[allow(unused_mut)]
    let mut terrain_cfg = TerrainConfig::default();
    #[cfg(feature = "native")]
    {
        use clap::Parser;
        cli::Cli::parse().apply(&mut terrain_cfg);
    }

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Hex World".into(),
            ..default()
        }),
        ..default()
    }))
    .register_type::<GameState>()
    .init_state::<GameState>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(TerrainPlugin(terrain_cfg))
    .add_plugins(CameraPlugin(CameraConfig::default()))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    #[cfg(feature = "native")]
    app.add_plugins(RemotePlugin::default())
        .add_plugins(RemoteHttpPlugin::default());

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
