//! The vertex dataset every rendering mode draws.
//!
//! A [`Mesh`] carries the same triangle list twice: once flat (three floats
//! per vertex, three vertices per triangle) for the unindexed paths, and once
//! as a deduplicated vertex pool plus `u16` indices for the indexed paths.

use std::collections::HashMap;

use crate::error::MeshError;

/// Floats per vertex in every array of a [`Mesh`].
pub const VERTEX_COMPONENTS: usize = 3;

/// Axis-aligned boxes (min corner, max corner) making up the built-in car.
const CAR_BOXES: [([f32; 3], [f32; 3]); 6] = [
    // body
    ([-1.0, -0.25, -0.45], [1.0, 0.15, 0.45]),
    // cabin
    ([-0.45, 0.15, -0.4], [0.35, 0.5, 0.4]),
    // wheels
    ([-0.8, -0.5, 0.37], [-0.4, -0.1, 0.53]),
    ([0.4, -0.5, 0.37], [0.8, -0.1, 0.53]),
    ([-0.8, -0.5, -0.53], [-0.4, -0.1, -0.37]),
    ([0.4, -0.5, -0.53], [0.8, -0.1, -0.37]),
];

/// An immutable triangle mesh in flat and indexed form.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    unique_vertices: Vec<f32>,
    indices: Vec<u16>,
}

impl Mesh {
    /// Wrap a pre-baked dataset.
    ///
    /// # Errors
    ///
    /// Fails if either float array is not a whole number of triples, if
    /// there is not exactly one index per flat vertex, or if an index
    /// addresses a vertex outside `unique_vertices`.
    pub fn new(
        vertices: Vec<f32>,
        unique_vertices: Vec<f32>,
        indices: Vec<u16>,
    ) -> Result<Self, MeshError> {
        check_stride("vertices", &vertices)?;
        check_stride("unique_vertices", &unique_vertices)?;
        let vertex_count = vertices.len() / VERTEX_COMPONENTS;
        if indices.len() != vertex_count {
            return Err(MeshError::IndexCountMismatch {
                indices: indices.len(),
                vertices: vertex_count,
            });
        }
        let unique = unique_vertices.len() / VERTEX_COMPONENTS;
        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| usize::from(index) >= unique)
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                position,
                unique,
            });
        }
        Ok(Self {
            vertices,
            unique_vertices,
            indices,
        })
    }

    /// Build the indexed form from an unindexed triangle list.
    ///
    /// Vertices are deduplicated by exact bit pattern and numbered in the
    /// order they are first seen.
    ///
    /// # Errors
    ///
    /// Fails if `vertices` is not a whole number of triples or needs more
    /// unique vertices than a `u16` index can address.
    pub fn from_flat(vertices: Vec<f32>) -> Result<Self, MeshError> {
        check_stride("vertices", &vertices)?;

        let mut seen: HashMap<[u32; 3], u16> = HashMap::new();
        let mut unique_vertices = Vec::new();
        let mut indices = Vec::with_capacity(vertices.len() / VERTEX_COMPONENTS);

        for v in vertices.chunks_exact(VERTEX_COMPONENTS) {
            let key = [v[0].to_bits(), v[1].to_bits(), v[2].to_bits()];
            let index = if let Some(&index) = seen.get(&key) {
                index
            } else {
                let next = unique_vertices.len() / VERTEX_COMPONENTS;
                let index = u16::try_from(next).map_err(|_| MeshError::TooManyVertices(next + 1))?;
                unique_vertices.extend_from_slice(v);
                seen.insert(key, index);
                index
            };
            indices.push(index);
        }

        Ok(Self {
            vertices,
            unique_vertices,
            indices,
        })
    }

    /// The built-in low-poly car: a body, a cabin and four wheels, all inside
    /// the unit cube.
    pub fn car() -> Self {
        let mut vertices = Vec::with_capacity(CAR_BOXES.len() * 36 * VERTEX_COMPONENTS);
        for (min, max) in CAR_BOXES {
            push_box(&mut vertices, min, max);
        }
        // 48 distinct corners, well inside the u16 range.
        Self::from_flat(vertices).unwrap_or_else(|_| unreachable!("car mesh is well formed"))
    }

    /// Flat vertex components, three per vertex.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Deduplicated vertex components, three per vertex.
    pub fn unique_vertices(&self) -> &[f32] {
        &self.unique_vertices
    }

    /// Indices into [`unique_vertices`](Self::unique_vertices).
    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    /// Number of vertices in the flat array.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_COMPONENTS
    }

    /// Number of whole triangles in the flat array.
    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }
}

fn check_stride(name: &'static str, data: &[f32]) -> Result<(), MeshError> {
    if data.len() % VERTEX_COMPONENTS == 0 {
        Ok(())
    } else {
        Err(MeshError::BadStride {
            name,
            len: data.len(),
        })
    }
}

/// Append the twelve outward-facing, counter-clockwise triangles of a box.
fn push_box(out: &mut Vec<f32>, [x0, y0, z0]: [f32; 3], [x1, y1, z1]: [f32; 3]) {
    let faces = [
        [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]], // +x
        [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]], // -x
        [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]], // +y
        [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]], // -y
        [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]], // +z
        [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]], // -z
    ];
    for [a, b, c, d] in faces {
        for corner in [a, b, c, a, c, d] {
            out.extend_from_slice(&corner);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    #[test]
    fn from_flat_shares_repeated_vertices() {
        let quad = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0,
        ];
        let mesh = Mesh::from_flat(quad).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.unique_vertices().len(), 12);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn from_flat_rejects_partial_vertex() {
        let err = Mesh::from_flat(vec![0.0; 7]).unwrap_err();
        assert_eq!(
            err,
            MeshError::BadStride {
                name: "vertices",
                len: 7
            }
        );
    }

    #[test]
    fn from_flat_rejects_more_than_u16_vertices() {
        #[allow(clippy::cast_precision_loss)]
        let vertices: Vec<f32> = (0..=65_536).flat_map(|i| [i as f32, 0.0, 0.0]).collect();
        assert_eq!(
            Mesh::from_flat(vertices).unwrap_err(),
            MeshError::TooManyVertices(65_537)
        );
    }

    #[test]
    fn new_rejects_index_past_pool() {
        let err = Mesh::new(vec![0.0; 9], vec![0.0; 6], vec![0, 1, 2]).unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexOutOfRange {
                index: 2,
                position: 2,
                unique: 2
            }
        );
    }

    #[test]
    fn new_rejects_short_index_array() {
        let err = Mesh::new(vec![0.0; 9], vec![0.0; 3], vec![0]).unwrap_err();
        assert_eq!(
            err,
            MeshError::IndexCountMismatch {
                indices: 1,
                vertices: 3
            }
        );
    }

    #[test]
    fn new_accepts_matching_lengths() {
        let mesh = Mesh::new(vec![0.0; 9], vec![0.0; 3], vec![0, 0, 0]).unwrap();
        assert_eq!(mesh.indices().len(), mesh.vertex_count());
    }

    #[test]
    fn car_is_indexed_consistently() {
        let car = Mesh::car();
        assert_eq!(car.triangle_count(), 72);
        assert_eq!(car.indices().len(), car.vertex_count());
        assert_eq!(car.unique_vertices().len() / VERTEX_COMPONENTS, 48);

        for (position, &index) in car.indices().iter().enumerate() {
            let i = usize::from(index) * 3;
            assert_eq!(
                &car.unique_vertices()[i..i + 3],
                &car.vertices()[position * 3..position * 3 + 3]
            );
        }
    }

    #[test]
    fn car_fits_in_unit_cube() {
        assert!(Mesh::car().vertices().iter().all(|c| c.abs() <= 1.0));
    }

    #[test]
    fn box_faces_point_outward() {
        let mut out = Vec::new();
        push_box(&mut out, [-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        for tri in out.chunks_exact(9) {
            let a = [tri[0], tri[1], tri[2]];
            let b = [tri[3], tri[4], tri[5]];
            let c = [tri[6], tri[7], tri[8]];
            let n = cross(
                [b[0] - a[0], b[1] - a[1], b[2] - a[2]],
                [c[0] - a[0], c[1] - a[1], c[2] - a[2]],
            );
            let centroid = [
                (a[0] + b[0] + c[0]) / 3.0,
                (a[1] + b[1] + c[1]) / 3.0,
                (a[2] + b[2] + c[2]) / 3.0,
            ];
            let dot = n[0] * centroid[0] + n[1] * centroid[1] + n[2] * centroid[2];
            assert!(dot > 0.0, "inward triangle {tri:?}");
        }
    }
}
