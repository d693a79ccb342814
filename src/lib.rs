#![warn(missing_docs)]
//! Hexagonal tile terrain generated from a heightmap.
//!
//! Every tile of the heightmap becomes a hexagon subdivided into a fixed
//! sub-grid, stitched seamlessly to its six neighbours, with cliff walls where
//! heights differ and a flat water sheet along coasts. The geometry core
//! ([`terrain::TerrainBuilder`]) is plain Rust over `f64` buffers; the Bevy
//! plugins only load the heightmap and hand the finished buffers to the
//! renderer.

pub mod camera;
pub mod math;
pub mod terrain;

use bevy::prelude::*;

/// Application-wide game state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Normal viewing of the generated terrain.
    #[default]
    Running,
    /// Debug overlay active (Tab to toggle).
    Debugging,
}
