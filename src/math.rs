//! Noise and vector helpers shared by the terrain builder.
//!
//! Nothing here touches the ECS; inputs are plain numbers, `DVec2` and `DVec3`.

use bevy::math::{DVec2, DVec3};
use bevy::prelude::Reflect;
use noise::{NoiseFn, Perlin};

/// Maps a noise value from the standard `[-1, 1]` range into `[min, max]`.
///
/// Noise generators (e.g. `Fbm<Perlin>`) produce values centred around zero.
/// This linearly rescales to an arbitrary output range.
///
/// # Examples
/// ```
/// # use hex_world::math::map_noise_to_range;
/// assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
/// assert_eq!(map_noise_to_range( 1.0, 0.0, 10.0), 10.0);
/// assert_eq!(map_noise_to_range( 0.0, 2.0, 6.0),  4.0);
/// ```
pub fn map_noise_to_range(noise_val: f64, min: f32, max: f32) -> f32 {
    min + ((noise_val as f32 + 1.0) / 2.0) * (max - min)
}

/// Raises `value` to `exponent` while keeping its sign.
///
/// Equivalent to `value.powf(exponent)` for non-negative input; negative input
/// yields `-(|value|^exponent)` instead of NaN.
pub fn signed_pow(value: f64, exponent: f64) -> f64 {
    value.signum() * value.abs().powf(exponent)
}

/// Face normal of a triangle, unnormalized.
///
/// Returns `-((v1 - v0) × (v2 - v0))`: triangles are wound clockwise when seen
/// from their front side, so the plain cross product points inwards. The
/// magnitude is twice the triangle area, which weights the contribution of
/// large faces when normals are accumulated per vertex.
pub fn face_normal(v0: DVec3, v1: DVec3, v2: DVec3) -> DVec3 {
    -(v1 - v0).cross(v2 - v0)
}

/// Per-axis noise configuration for vertex displacement.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct NoiseParameters {
    /// Divisor applied to the sample coordinates.
    pub size: DVec2,
    /// Offset added after dividing by [`size`](Self::size).
    pub offset: DVec2,
    /// Number of octaves, at least one.
    pub octaves: u32,
    /// Base frequency of the first octave; doubles every octave.
    pub frequency: f64,
    /// Scale of the resulting displacement in world units.
    pub amplitude: f64,
    /// Exponent applied to the normalized noise value.
    pub redistribution: f64,
}

impl NoiseParameters {
    /// Parameters that produce no displacement at all.
    pub const FLAT: Self = Self {
        size: DVec2::ONE,
        offset: DVec2::ZERO,
        octaves: 1,
        frequency: 1.0,
        amplitude: 0.0,
        redistribution: 1.0,
    };
}

/// Multi-octave coherent noise at `(px, py)`.
///
/// Octave `o` samples `source` at frequency `frequency * 2^o`; the sum is
/// divided by the summed inverse frequencies, redistributed and scaled by the
/// amplitude. `params.octaves` must be at least one.
pub fn noise1<N>(px: f64, py: f64, params: &NoiseParameters, source: &N) -> f64
where
    N: NoiseFn<f64, 2>,
{
    let nx = px / params.size.x + params.offset.x;
    let ny = py / params.size.y + params.offset.y;

    let mut sum = 0.0;
    let mut weight = 0.0;
    for octave in 0..params.octaves {
        let frequency = params.frequency * 2f64.powi(octave as i32);
        sum += source.get([nx * frequency, ny * frequency]);
        weight += 1.0 / frequency;
    }

    signed_pow(sum / weight, params.redistribution) * params.amplitude
}

/// Displacement vector for `vertex`.
///
/// Each axis is driven by the other two coordinates (X by `(y, z)`, Y by
/// `(x, z)`, Z by `(x, y)`), which avoids banding along the axes.
pub fn noise3<N>(
    vertex: DVec3,
    params_x: &NoiseParameters,
    params_y: &NoiseParameters,
    params_z: &NoiseParameters,
    source: &N,
) -> DVec3
where
    N: NoiseFn<f64, 2>,
{
    DVec3::new(
        noise1(vertex.y, vertex.z, params_x, source),
        noise1(vertex.x, vertex.z, params_y, source),
        noise1(vertex.x, vertex.y, params_z, source),
    )
}

/// Seeded Perlin source plus the per-axis parameters used to distort vertices.
#[derive(Clone)]
pub struct Distortion {
    perlin: Perlin,
    x: NoiseParameters,
    y: NoiseParameters,
    z: NoiseParameters,
}

impl Distortion {
    /// Creates a distortion with a Perlin source for `seed`.
    pub fn new(seed: u32, x: NoiseParameters, y: NoiseParameters, z: NoiseParameters) -> Self {
        Self {
            perlin: Perlin::new(seed),
            x,
            y,
            z,
        }
    }

    /// Displacement to add to `vertex`.
    pub fn displacement(&self, vertex: DVec3) -> DVec3 {
        noise3(vertex, &self.x, &self.y, &self.z, &self.perlin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Constant source, handy to check the octave normalization by hand.
    struct Constant(f64);

    impl NoiseFn<f64, 2> for Constant {
        fn get(&self, _point: [f64; 2]) -> f64 {
            self.0
        }
    }

    fn params(octaves: u32, amplitude: f64, redistribution: f64) -> NoiseParameters {
        NoiseParameters {
            size: DVec2::splat(100.0),
            offset: DVec2::new(0.3, 0.7),
            octaves,
            frequency: 1.0,
            amplitude,
            redistribution,
        }
    }

    // ── map_noise_to_range ──────────────────────────────────────────

    #[test]
    fn noise_min_maps_to_range_min() {
        assert_eq!(map_noise_to_range(-1.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn noise_max_maps_to_range_max() {
        assert_eq!(map_noise_to_range(1.0, 0.0, 255.0), 255.0);
    }

    // ── signed_pow ──────────────────────────────────────────────────

    #[test]
    fn signed_pow_matches_powf_for_positive_input() {
        assert!((signed_pow(0.25, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn signed_pow_keeps_sign_of_negative_input() {
        let v = signed_pow(-0.25, 0.5);
        assert!(!v.is_nan());
        assert!((v + 0.5).abs() < 1e-12);
    }

    // ── face_normal ─────────────────────────────────────────────────

    #[test]
    fn clockwise_triangle_faces_up() {
        // Clockwise when looking down the Z axis.
        let n = face_normal(DVec3::ZERO, DVec3::Y, DVec3::X);
        assert!((n.normalize() - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn degenerate_triangle_has_zero_normal() {
        let n = face_normal(DVec3::ZERO, DVec3::X, DVec3::X * 2.0);
        assert_eq!(n, DVec3::ZERO);
    }

    // ── noise1 / noise3 ─────────────────────────────────────────────

    #[test]
    fn single_octave_returns_scaled_sample() {
        let v = noise1(10.0, 20.0, &params(1, 3.0, 1.0), &Constant(0.5));
        assert!((v - 1.5).abs() < 1e-12);
    }

    #[test]
    fn octaves_are_normalized_by_inverse_frequencies() {
        // Two octaves: sum 2 * 0.5, weight 1 + 1/2.
        let v = noise1(0.0, 0.0, &params(2, 1.0, 1.0), &Constant(0.5));
        assert!((v - 1.0 / 1.5).abs() < 1e-12);
    }

    #[test]
    fn zero_amplitude_yields_no_displacement() {
        let d = Distortion::new(
            7,
            NoiseParameters::FLAT,
            NoiseParameters::FLAT,
            NoiseParameters::FLAT,
        );
        assert_eq!(d.displacement(DVec3::new(12.3, 45.6, 7.8)), DVec3::ZERO);
    }

    #[test]
    fn noise3_uses_the_other_two_axes() {
        // Changing only X must leave the X displacement untouched.
        let perlin = Perlin::new(3);
        let p = params(3, 5.0, 1.0);
        let a = noise3(DVec3::new(1.0, 42.5, 13.25), &p, &p, &p, &perlin);
        let b = noise3(DVec3::new(77.0, 42.5, 13.25), &p, &p, &p, &perlin);
        assert_eq!(a.x, b.x);
    }

    #[test]
    fn distortion_is_deterministic() {
        let p = params(4, 8.0, 1.0);
        let a = Distortion::new(11, p, p, p);
        let b = Distortion::new(11, p, p, p);
        let v = DVec3::new(123.4, 567.8, 9.1);
        assert_eq!(a.displacement(v), b.displacement(v));
    }
}
