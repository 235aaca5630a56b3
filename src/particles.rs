use glam::Vec3;
use rand::Rng;

use crate::geometry::LineVertex;

/// `count` points uniformly distributed in the cube `[-half_extent, half_extent]^3`.
pub fn random_positions(count: usize, half_extent: f32, rng: &mut impl Rng) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-half_extent..=half_extent),
                rng.gen_range(-half_extent..=half_extent),
                rng.gen_range(-half_extent..=half_extent),
            )
        })
        .collect()
}

pub fn point_vertices(positions: &[Vec3], color: Vec3) -> Vec<LineVertex> {
    positions
        .iter()
        .map(|&position| LineVertex::new(position, color))
        .collect()
}
