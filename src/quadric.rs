//! Tessellated quadrics for the scene demo, in the spirit of
//! `gluCylinder`/`gluSphere`.
//!
//! Both shapes emit one `Quads` primitive whose faces wind counter-clockwise
//! seen from outside, so they survive back-face culling.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::context::{FixedFunctionGl, Primitive};

/// Slices used when none are given.
pub const DEFAULT_SLICES: u32 = 20;

/// Stacks used when none are given.
pub const DEFAULT_STACKS: u32 = 20;

/// A (possibly truncated) cone along +Z, open at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cylinder {
    /// Radius at `z = 0`.
    pub base_radius: f32,
    /// Radius at `z = height`.
    pub top_radius: f32,
    /// Length along +Z.
    pub height: f32,
    /// Subdivisions around Z (at least 3).
    pub slices: u32,
    /// Subdivisions along Z (at least 1).
    pub stacks: u32,
}

impl Cylinder {
    /// A cylinder with default tessellation.
    pub fn new(base_radius: f32, top_radius: f32, height: f32) -> Self {
        Self {
            base_radius,
            top_radius,
            height,
            slices: DEFAULT_SLICES,
            stacks: DEFAULT_STACKS,
        }
    }

    /// Emit the side wall.
    #[expect(clippy::cast_precision_loss)]
    pub fn render(&self, gl: &mut dyn FixedFunctionGl) {
        let slices = self.slices.max(3);
        let stacks = self.stacks.max(1);

        gl.begin(Primitive::Quads);
        for stack in 0..stacks {
            let t0 = stack as f32 / stacks as f32;
            let t1 = (stack + 1) as f32 / stacks as f32;
            let (r0, r1) = (self.radius_at(t0), self.radius_at(t1));
            let (z0, z1) = (t0 * self.height, t1 * self.height);
            for slice in 0..slices {
                let (s0, c0) = (TAU * slice as f32 / slices as f32).sin_cos();
                let (s1, c1) = (TAU * (slice + 1) as f32 / slices as f32).sin_cos();
                gl.vertex(r0 * c0, r0 * s0, z0);
                gl.vertex(r0 * c1, r0 * s1, z0);
                gl.vertex(r1 * c1, r1 * s1, z1);
                gl.vertex(r1 * c0, r1 * s0, z1);
            }
        }
        gl.end();
    }

    fn radius_at(&self, t: f32) -> f32 {
        self.base_radius + (self.top_radius - self.base_radius) * t
    }
}

/// A sphere centred on the origin, poles on the Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// Radius.
    pub radius: f32,
    /// Subdivisions around Z (at least 3).
    pub slices: u32,
    /// Subdivisions from pole to pole (at least 2).
    pub stacks: u32,
}

impl Sphere {
    /// A sphere with default tessellation.
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            slices: DEFAULT_SLICES,
            stacks: DEFAULT_STACKS,
        }
    }

    /// Emit the surface. Quads touching a pole are degenerate triangles.
    #[expect(clippy::cast_precision_loss)]
    pub fn render(&self, gl: &mut dyn FixedFunctionGl) {
        let slices = self.slices.max(3);
        let stacks = self.stacks.max(2);
        let r = self.radius;
        let point = |latitude: f32, longitude: f32| {
            let (sin_lat, cos_lat) = latitude.sin_cos();
            let (sin_lon, cos_lon) = longitude.sin_cos();
            [r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat]
        };

        gl.begin(Primitive::Quads);
        for stack in 0..stacks {
            let lat0 = -FRAC_PI_2 + PI * stack as f32 / stacks as f32;
            let lat1 = -FRAC_PI_2 + PI * (stack + 1) as f32 / stacks as f32;
            for slice in 0..slices {
                let lon0 = TAU * slice as f32 / slices as f32;
                let lon1 = TAU * (slice + 1) as f32 / slices as f32;
                for [x, y, z] in [
                    point(lat0, lon0),
                    point(lat0, lon1),
                    point(lat1, lon1),
                    point(lat1, lon0),
                ] {
                    gl.vertex(x, y, z);
                }
            }
        }
        gl.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{Command, Recorder};

    fn vertices(gl: &Recorder) -> Vec<[f32; 3]> {
        gl.commands()
            .iter()
            .filter_map(|c| match c {
                Command::Vertex(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn cylinder_emits_one_quad_per_slice_and_stack() {
        let mut gl = Recorder::new();
        Cylinder {
            slices: 8,
            stacks: 3,
            ..Cylinder::new(4.0, 4.0, 7.0)
        }
        .render(&mut gl);
        assert_eq!(vertices(&gl).len(), 8 * 3 * 4);
        assert_eq!(gl.triangles(), 8 * 3 * 2);
    }

    #[test]
    fn cylinder_spans_base_to_height() {
        let mut gl = Recorder::new();
        Cylinder::new(4.0, 2.0, 7.0).render(&mut gl);
        for [x, y, z] in vertices(&gl) {
            assert!((-1e-4..=7.0 + 1e-4).contains(&z));
            let expected = 4.0 - 2.0 * z / 7.0;
            assert!(((x * x + y * y).sqrt() - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn sphere_vertices_lie_on_the_surface() {
        let mut gl = Recorder::new();
        Sphere::new(4.0).render(&mut gl);
        let vertices = vertices(&gl);
        assert_eq!(vertices.len(), 20 * 20 * 4);
        for [x, y, z] in vertices {
            assert!(((x * x + y * y + z * z).sqrt() - 4.0).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_tessellation_is_clamped() {
        let mut gl = Recorder::new();
        Sphere {
            radius: 1.0,
            slices: 0,
            stacks: 0,
        }
        .render(&mut gl);
        assert_eq!(vertices(&gl).len(), 3 * 2 * 4);
    }

    #[test]
    fn quads_face_outward() {
        let mut gl = Recorder::new();
        Cylinder::new(1.0, 1.0, 1.0).render(&mut gl);
        for quad in vertices(&gl).chunks_exact(4) {
            let [a, b, c] = [quad[0], quad[1], quad[2]];
            let u = [b[0] - a[0], b[1] - a[1]];
            let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
            // Radial component of the face normal (u has no z component).
            let n = [u[1] * v[2], -u[0] * v[2]];
            assert!(n[0] * a[0] + n[1] * a[1] > 0.0);
        }
    }
}
