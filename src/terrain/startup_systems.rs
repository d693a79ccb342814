use bevy::asset::RenderAssetUsages;
use bevy::image::{ImageAddressMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::entities::{BuildRequest, TerrainMaterials};
use super::heightmap::Heightmap;
use super::{HeightmapSource, TerrainConfig};

/// Side length of the grid overlay texture in pixels.
const GRID_TEXTURE_SIZE: u32 = 64;

// ── Startup ─────────────────────────────────────────────────────────

/// Creates the terrain and water materials.
pub fn create_materials(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<TerrainConfig>,
) {
    let grid_texture = images.add(grid_overlay_image());
    let terrain = materials.add(StandardMaterial {
        base_color: cfg.terrain_color,
        base_color_texture: Some(grid_texture),
        perceptual_roughness: 0.9,
        ..default()
    });
    let water = materials.add(StandardMaterial {
        base_color: cfg.water_color,
        alpha_mode: AlphaMode::Blend,
        perceptual_roughness: 0.1,
        reflectance: 0.6,
        ..default()
    });
    commands.insert_resource(TerrainMaterials { terrain, water });
}

/// Starts loading the heightmap image, or generates the noise heightmap
/// right away. Either way a build is requested.
pub fn request_heightmap(
    mut request: ResMut<BuildRequest>,
    asset_server: Res<AssetServer>,
    cfg: Res<TerrainConfig>,
    mut exit: MessageWriter<AppExit>,
) {
    request.pending = true;
    match &cfg.heightmap {
        HeightmapSource::Image(path) => {
            info!("Loading heightmap {path}.");
            request.image = Some(asset_server.load(path.clone()));
        }
        HeightmapSource::Noise => match Heightmap::from_noise(&cfg.noise_map) {
            Ok(heightmap) => request.heightmap = Some(heightmap),
            Err(err) => {
                error!("Could not generate heightmap: {err}");
                exit.write(AppExit::error());
            }
        },
    }
}

/// Light texture with darker lines along the borders of one repetition.
///
/// Repeated by the material tiling, the lines fall on tile columns and on
/// every other tile row.
fn grid_overlay_image() -> Image {
    let size = GRID_TEXTURE_SIZE;
    let data = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            let line = x == 0 || y == 0 || y == size / 2;
            let v = if line { 170 } else { 255 };
            [v, v, v, 255]
        })
        .collect();
    let mut image = Image::new(
        Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    );
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        address_mode_u: ImageAddressMode::Repeat,
        address_mode_v: ImageAddressMode::Repeat,
        ..ImageSamplerDescriptor::linear()
    });
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_overlay_has_full_rgba_data() {
        let image = grid_overlay_image();
        assert_eq!(image.width(), GRID_TEXTURE_SIZE);
        let data = image.data.as_ref().map_or(0, Vec::len);
        assert_eq!(data, (GRID_TEXTURE_SIZE * GRID_TEXTURE_SIZE * 4) as usize);
    }
}
