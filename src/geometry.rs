use std::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use itertools::Itertools;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct LineVertex {
    pub position: Vec3,
    pub color: Vec3,
}

impl LineVertex {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self { position, color }
    }
}

const PHI: f32 = 1.618_034;

#[rustfmt::skip]
const ICOSAHEDRON_VERTICES: [[f32; 3]; 12] = [
    [-1.0, PHI, 0.0], [1.0, PHI, 0.0], [-1.0, -PHI, 0.0], [1.0, -PHI, 0.0],
    [0.0, -1.0, PHI], [0.0, 1.0, PHI], [0.0, -1.0, -PHI], [0.0, 1.0, -PHI],
    [PHI, 0.0, -1.0], [PHI, 0.0, 1.0], [-PHI, 0.0, -1.0], [-PHI, 0.0, 1.0],
];

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// Triangles of a subdivided icosahedron, flat shaded and non-indexed.
pub struct Geometry {
    /// Sphere-projected positions, three per triangle, counter-clockwise.
    pub positions: Vec<Vec3>,
}

impl Geometry {
    /// Icosahedron of `radius` with every face split into `(detail + 1)^2`
    /// triangles before projecting onto the sphere.
    pub fn icosahedron(radius: f32, detail: u32) -> Self {
        let mut positions = Vec::with_capacity(20 * 3 * (detail as usize + 1).pow(2));

        for [a, b, c] in ICOSAHEDRON_FACES {
            subdivide_face(
                Vec3::from(ICOSAHEDRON_VERTICES[a]),
                Vec3::from(ICOSAHEDRON_VERTICES[b]),
                Vec3::from(ICOSAHEDRON_VERTICES[c]),
                detail,
                &mut positions,
            );
        }

        for position in &mut positions {
            *position = position.normalize() * radius;
        }

        Self { positions }
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn shaded_vertices(&self) -> Vec<MeshVertex> {
        let mut vertices = Vec::with_capacity(self.positions.len());

        for (&a, &b, &c) in self.positions.iter().tuples() {
            let normal = (b - a).cross(c - a).normalize();
            let centroid = (a + b + c) / 3.0;

            let mut uvs = [a, b, c].map(|p| sphere_uv(p, centroid));
            correct_seam(&mut uvs);

            for (position, tex_coords) in [a, b, c].into_iter().zip(uvs) {
                vertices.push(MeshVertex {
                    position,
                    normal,
                    tex_coords,
                });
            }
        }

        vertices
    }

    /// Unique triangle edges as a line list in `color`.
    pub fn edge_vertices(&self, color: Vec3) -> Vec<LineVertex> {
        self.positions
            .iter()
            .tuples()
            .flat_map(|(&a, &b, &c)| [(a, b), (b, c), (c, a)])
            .unique_by(|&(from, to)| {
                let (from, to) = (quantize(from), quantize(to));
                if from <= to {
                    (from, to)
                } else {
                    (to, from)
                }
            })
            .flat_map(|(from, to)| [LineVertex::new(from, color), LineVertex::new(to, color)])
            .collect()
    }
}

/// Red, green and blue segments along the positive axes.
pub fn axes_vertices(length: f32) -> Vec<LineVertex> {
    [Vec3::X, Vec3::Y, Vec3::Z]
        .into_iter()
        .flat_map(|axis| {
            [
                LineVertex::new(Vec3::ZERO, axis),
                LineVertex::new(axis * length, axis),
            ]
        })
        .collect()
}

fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: u32, out: &mut Vec<Vec3>) {
    let cols = detail as usize + 1;

    let grid: Vec<Vec<Vec3>> = (0..=cols)
        .map(|i| {
            let t = i as f32 / cols as f32;
            let aj = a.lerp(c, t);
            let bj = b.lerp(c, t);
            let rows = cols - i;

            (0..=rows)
                .map(|j| {
                    if rows == 0 {
                        aj
                    } else {
                        aj.lerp(bj, j as f32 / rows as f32)
                    }
                })
                .collect()
        })
        .collect();

    for i in 0..cols {
        for j in 0..2 * (cols - i) - 1 {
            let k = j / 2;
            if j % 2 == 0 {
                out.extend([grid[i][k + 1], grid[i + 1][k], grid[i][k]]);
            } else {
                out.extend([grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]);
            }
        }
    }
}

fn azimuth(p: Vec3) -> f32 {
    p.z.atan2(-p.x)
}

fn inclination(p: Vec3) -> f32 {
    (-p.y).atan2((p.x * p.x + p.z * p.z).sqrt())
}

// Poles have no azimuth of their own; borrow the face centroid's.
fn sphere_uv(p: Vec3, centroid: Vec3) -> Vec2 {
    let on_pole = p.x.abs() < 1e-6 && p.z.abs() < 1e-6;
    let u_source = if on_pole { centroid } else { p };
    Vec2::new(
        azimuth(u_source) / (2.0 * PI) + 0.5,
        inclination(p) / PI + 0.5,
    )
}

fn correct_seam(uvs: &mut [Vec2; 3]) {
    let max = uvs.iter().map(|uv| uv.x).fold(f32::MIN, f32::max);
    let min = uvs.iter().map(|uv| uv.x).fold(f32::MAX, f32::min);

    if max > 0.9 && min < 0.1 {
        for uv in uvs.iter_mut().filter(|uv| uv.x < 0.2) {
            uv.x += 1.0;
        }
    }
}

fn quantize(p: Vec3) -> (i32, i32, i32) {
    let q = (p * 1.0e4).round();
    (q.x as i32, q.y as i32, q.z as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_one_has_eighty_faces_on_the_sphere() {
        let geometry = Geometry::icosahedron(0.7, 1);

        assert_eq!(geometry.triangle_count(), 80);
        for position in &geometry.positions {
            assert!((position.length() - 0.7).abs() < 1e-5);
        }
    }

    #[test]
    fn normals_are_flat_and_point_outwards() {
        let vertices = Geometry::icosahedron(1.0, 1).shaded_vertices();

        for vertex in &vertices {
            assert!(vertex.normal.dot(vertex.position) > 0.0);
            assert!((vertex.normal.length() - 1.0).abs() < 1e-5);
        }
        for (a, b, c) in vertices.iter().tuples() {
            assert_eq!(a.normal, b.normal);
            assert_eq!(b.normal, c.normal);
        }
    }

    #[test]
    fn uvs_do_not_wrap_inside_a_face() {
        let vertices = Geometry::icosahedron(1.0, 1).shaded_vertices();

        for (a, b, c) in vertices.iter().tuples() {
            let us = [a.tex_coords.x, b.tex_coords.x, c.tex_coords.x];
            let spread = us.iter().fold(f32::MIN, |m, &u| m.max(u))
                - us.iter().fold(f32::MAX, |m, &u| m.min(u));
            assert!(spread < 0.5, "face spans {spread} of the texture");
        }
    }

    #[test]
    fn wireframe_has_each_edge_once() {
        let edges = Geometry::icosahedron(0.7, 1).edge_vertices(Vec3::ONE);

        // 80 triangles sharing every edge with exactly one neighbour.
        assert_eq!(edges.len(), 120 * 2);
        assert_eq!(Geometry::icosahedron(0.7, 0).edge_vertices(Vec3::ONE).len(), 30 * 2);
    }

    #[test]
    fn axes_have_unit_length() {
        let axes = axes_vertices(1.0);

        assert_eq!(axes.len(), 6);
        assert_eq!(axes[1].position, Vec3::X);
        assert_eq!(axes[5].color, Vec3::Z);
    }
}
