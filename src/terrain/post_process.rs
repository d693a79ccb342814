use bevy::asset::RenderAssetUsages;
use bevy::math::{DVec2, DVec3};
use bevy::mesh::Indices;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::error::TerrainError;
use super::mesh_data::{MeshBounds, MeshData};
use crate::math;

/// Planar UVs normalized to the mesh bounds.
///
/// An empty mesh yields no UVs; a mesh whose bounds have zero extent on
/// either axis is rejected.
pub fn compute_uvs(mesh: &MeshData) -> Result<Vec<DVec2>, TerrainError> {
    if mesh.vertices().is_empty() {
        return Ok(Vec::new());
    }
    let bounds = mesh.bounds();
    let (width, height) = (bounds.width(), bounds.height());
    if width <= 0.0 || height <= 0.0 {
        return Err(TerrainError::DegenerateBounds { width, height });
    }

    debug!("UV coordinates calculated ({width} x {height})");
    Ok(mesh
        .vertices()
        .iter()
        .map(|v| DVec2::new((v.x - bounds.min_x) / width, (v.y - bounds.min_y) / height))
        .collect())
}

/// Smooth vertex normals: the area-weighted sum of the face normals of every
/// incident triangle, normalized. Vertices without triangles get a zero normal.
pub fn compute_normals(mesh: &MeshData) -> Vec<DVec3> {
    let vertices = mesh.vertices();
    let mut normals = vec![DVec3::ZERO; vertices.len()];
    for [i0, i1, i2] in mesh.triangles() {
        let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
        let normal = math::face_normal(vertices[i0], vertices[i1], vertices[i2]);
        normals[i0] += normal;
        normals[i1] += normal;
        normals[i2] += normal;
    }
    normals.iter_mut().for_each(|n| *n = n.normalize_or_zero());
    normals
}

/// Vertex and index buffers of a completed mesh, ready for rendering.
///
/// Positions and normals are Z-up, as emitted by the synthesizer.
#[derive(Clone, Debug, Default)]
pub struct FinishedMesh {
    /// Vertex positions.
    pub positions: Vec<DVec3>,
    /// Triangle indices, three per triangle.
    pub indices: Vec<u32>,
    /// Per-vertex UVs in `[0, 1]` over the planar bounds.
    pub uvs: Vec<DVec2>,
    /// Per-vertex unit normals.
    pub normals: Vec<DVec3>,
    /// Planar bounds of the undistorted vertices.
    pub bounds: MeshBounds,
}

impl FinishedMesh {
    /// Computes UVs and normals for `mesh` and takes over its buffers.
    pub fn finish(mesh: &MeshData) -> Result<Self, TerrainError> {
        Ok(Self {
            uvs: compute_uvs(mesh)?,
            normals: compute_normals(mesh),
            positions: mesh.vertices().to_vec(),
            indices: mesh.indices().to_vec(),
            bounds: mesh.bounds(),
        })
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Converts to a Bevy [`Mesh`].
    ///
    /// Bevy is Y-up, so `(x, y, z)` becomes `(x, z, y)`. Swapping two axes
    /// mirrors the geometry, which turns the clockwise winding into the
    /// counter-clockwise front faces Bevy expects.
    pub fn to_bevy_mesh(&self) -> Mesh {
        let swizzle = |v: &DVec3| [v.x as f32, v.z as f32, v.y as f32];
        let positions: Vec<[f32; 3]> = self.positions.iter().map(swizzle).collect();
        let normals: Vec<[f32; 3]> = self.normals.iter().map(swizzle).collect();
        let uvs: Vec<[f32; 2]> = self.uvs.iter().map(|uv| uv.as_vec2().to_array()).collect();

        Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(self.indices.clone()))
    }
}
