//! The six ways of submitting the same mesh.
//!
//! [`GpuResources`] creates everything every mode could need up front, so
//! switching [`RenderingMode`] between frames never uploads anything. Each
//! frame the selected mode is turned into a [`Submission`] carrying only the
//! handles that path uses, and [`Submission::submit`] issues the calls.
//!
//! Every path is symmetric: whatever it enables or binds it disables or
//! unbinds before returning. Bindings are global GL state, and a buffer left
//! bound would silently redirect the next unrelated vertex pointer.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::context::{
    BufferHandle, BufferTarget, ClientState, FixedFunctionGl, IndexSource, ListHandle, Primitive,
    VertexSource,
};
use crate::error::GlError;
use crate::mesh::{Mesh, VERTEX_COMPONENTS};

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const COMPONENTS: i32 = VERTEX_COMPONENTS as i32;

/// Mesh submission pathway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderingMode {
    /// `glBegin`/`glVertex`/`glEnd` every frame.
    #[default]
    Immediate,
    /// The immediate-mode sequence compiled once into a display list.
    DisplayList,
    /// A client-memory vertex array drawn with `glDrawArrays`.
    VertexArray,
    /// A client-memory unique-vertex array drawn with a client-memory index
    /// array.
    IndexedVertexArray,
    /// A buffer object holding the flat vertex array.
    VertexBufferObject,
    /// Buffer objects holding the unique-vertex array and the index array.
    IndexedVertexBufferObject,
}

impl RenderingMode {
    /// Every mode, in menu order.
    pub const ALL: [RenderingMode; 6] = [
        RenderingMode::Immediate,
        RenderingMode::DisplayList,
        RenderingMode::VertexArray,
        RenderingMode::IndexedVertexArray,
        RenderingMode::VertexBufferObject,
        RenderingMode::IndexedVertexBufferObject,
    ];

    /// The mode after this one in [`ALL`](Self::ALL), wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        let position = Self::ALL.iter().position(|&m| m == self).unwrap_or(0);
        Self::ALL[(position + 1) % Self::ALL.len()]
    }

    /// Kebab-case name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            RenderingMode::Immediate => "immediate",
            RenderingMode::DisplayList => "display-list",
            RenderingMode::VertexArray => "vertex-array",
            RenderingMode::IndexedVertexArray => "indexed-vertex-array",
            RenderingMode::VertexBufferObject => "vertex-buffer-object",
            RenderingMode::IndexedVertexBufferObject => "indexed-vertex-buffer-object",
        }
    }
}

impl fmt::Display for RenderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown rendering mode name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown rendering mode `{0}`")]
pub struct ParseModeError(pub String);

impl FromStr for RenderingMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseModeError(s.to_owned()))
    }
}

/// One frame's submission path, with the handles it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// See [`RenderingMode::Immediate`].
    Immediate,
    /// See [`RenderingMode::DisplayList`].
    DisplayList(ListHandle),
    /// See [`RenderingMode::VertexArray`].
    VertexArray,
    /// See [`RenderingMode::IndexedVertexArray`].
    IndexedVertexArray,
    /// See [`RenderingMode::VertexBufferObject`].
    VertexBufferObject(BufferHandle),
    /// See [`RenderingMode::IndexedVertexBufferObject`].
    IndexedVertexBufferObject {
        /// Unique-vertex buffer.
        vertices: BufferHandle,
        /// `u16` index buffer.
        indices: BufferHandle,
    },
}

impl Submission {
    /// Submit `mesh` once.
    pub fn submit(self, gl: &mut dyn FixedFunctionGl, mesh: &Mesh) {
        let count = draw_count(mesh);
        match self {
            Submission::Immediate => draw_immediate(gl, mesh),
            Submission::DisplayList(list) => gl.call_list(list),
            Submission::VertexArray => {
                gl.enable_client_state(ClientState::VertexArray);
                gl.vertex_pointer(COMPONENTS, VertexSource::Host(mesh.vertices()));
                gl.draw_arrays(Primitive::Triangles, 0, count);
                gl.disable_client_state(ClientState::VertexArray);
            }
            Submission::IndexedVertexArray => {
                gl.enable_client_state(ClientState::VertexArray);
                gl.vertex_pointer(COMPONENTS, VertexSource::Host(mesh.unique_vertices()));
                gl.draw_elements(Primitive::Triangles, count, IndexSource::Host(mesh.indices()));
                gl.disable_client_state(ClientState::VertexArray);
            }
            Submission::VertexBufferObject(buffer) => {
                gl.enable_client_state(ClientState::VertexArray);
                gl.bind_buffer(BufferTarget::Array, Some(buffer));
                // Offset 0 into the bound buffer replaces any host pointer.
                gl.vertex_pointer(COMPONENTS, VertexSource::Bound { offset: 0 });
                gl.draw_arrays(Primitive::Triangles, 0, count);
                gl.bind_buffer(BufferTarget::Array, None);
                gl.disable_client_state(ClientState::VertexArray);
            }
            Submission::IndexedVertexBufferObject { vertices, indices } => {
                gl.enable_client_state(ClientState::VertexArray);
                gl.bind_buffer(BufferTarget::Array, Some(vertices));
                gl.bind_buffer(BufferTarget::ElementArray, Some(indices));
                gl.vertex_pointer(COMPONENTS, VertexSource::Bound { offset: 0 });
                gl.index_pointer(0);
                gl.draw_elements(Primitive::Triangles, count, IndexSource::Bound { offset: 0 });
                gl.bind_buffer(BufferTarget::Array, None);
                gl.bind_buffer(BufferTarget::ElementArray, None);
                gl.disable_client_state(ClientState::VertexArray);
            }
        }
    }
}

/// Vertex count for array and element draws.
///
/// # Panics
///
/// Panics if the mesh has more than `i32::MAX` vertices.
fn draw_count(mesh: &Mesh) -> i32 {
    i32::try_from(mesh.vertex_count()).expect("vertex count exceeds i32::MAX")
}

/// Emit the flat vertex array between `begin(Triangles)` and `end`.
///
/// The loop stops three floats short of the end, so the last vertex is never
/// emitted. A mesh whose vertex count is a multiple of three therefore loses
/// its final triangle in this path (and in display lists compiled from it).
pub fn draw_immediate(gl: &mut dyn FixedFunctionGl, mesh: &Mesh) {
    let v = mesh.vertices();
    gl.begin(Primitive::Triangles);
    for i in (0..v.len().saturating_sub(VERTEX_COMPONENTS)).step_by(VERTEX_COMPONENTS) {
        gl.vertex(v[i], v[i + 1], v[i + 2]);
    }
    gl.end();
}

/// Every GPU object the six modes draw from.
///
/// Each handle is `None` until created and again after release, which makes
/// [`release`](Self::release) safe after a partial [`create`](Self::create)
/// and a no-op the second time.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GpuResources {
    display_list: Option<ListHandle>,
    vertex_buffer: Option<BufferHandle>,
    indexed_vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
}

impl GpuResources {
    /// Create and fill all four objects.
    ///
    /// Each handle is stored as soon as it exists. On error the ones created
    /// so far stay owned by `self` and must still be released.
    ///
    /// # Errors
    ///
    /// Propagates the first failed list or buffer generation.
    pub fn create(&mut self, gl: &mut dyn FixedFunctionGl, mesh: &Mesh) -> Result<(), GlError> {
        let list = gl.gen_list()?;
        self.display_list = Some(list);
        gl.new_list(list);
        draw_immediate(gl, mesh);
        gl.end_list();
        log::debug!("compiled mesh into {list}");

        let buffer = gl.gen_buffer()?;
        self.vertex_buffer = Some(buffer);
        gl.bind_buffer(BufferTarget::Array, Some(buffer));
        gl.buffer_data(BufferTarget::Array, bytemuck::cast_slice(mesh.vertices()));
        gl.bind_buffer(BufferTarget::Array, None);
        log::debug!("uploaded {} flat vertices to {buffer}", mesh.vertex_count());

        let vertices = gl.gen_buffer()?;
        self.indexed_vertex_buffer = Some(vertices);
        let indices = gl.gen_buffer()?;
        self.index_buffer = Some(indices);
        gl.bind_buffer(BufferTarget::Array, Some(vertices));
        gl.buffer_data(
            BufferTarget::Array,
            bytemuck::cast_slice(mesh.unique_vertices()),
        );
        gl.bind_buffer(BufferTarget::ElementArray, Some(indices));
        gl.buffer_data(BufferTarget::ElementArray, bytemuck::cast_slice(mesh.indices()));
        gl.bind_buffer(BufferTarget::Array, None);
        gl.bind_buffer(BufferTarget::ElementArray, None);
        log::debug!(
            "uploaded {} unique vertices to {vertices} and {} indices to {indices}",
            mesh.unique_vertices().len() / VERTEX_COMPONENTS,
            mesh.indices().len()
        );

        Ok(())
    }

    /// The submission for `mode`, or `None` if a handle it needs was never
    /// created.
    pub fn submission(&self, mode: RenderingMode) -> Option<Submission> {
        Some(match mode {
            RenderingMode::Immediate => Submission::Immediate,
            RenderingMode::DisplayList => Submission::DisplayList(self.display_list?),
            RenderingMode::VertexArray => Submission::VertexArray,
            RenderingMode::IndexedVertexArray => Submission::IndexedVertexArray,
            RenderingMode::VertexBufferObject => {
                Submission::VertexBufferObject(self.vertex_buffer?)
            }
            RenderingMode::IndexedVertexBufferObject => Submission::IndexedVertexBufferObject {
                vertices: self.indexed_vertex_buffer?,
                indices: self.index_buffer?,
            },
        })
    }

    /// Whether no handle is currently held.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Delete every held handle and forget it.
    pub fn release(&mut self, gl: &mut dyn FixedFunctionGl) {
        if let Some(list) = self.display_list.take() {
            gl.delete_list(list);
            log::debug!("deleted {list}");
        }
        for buffer in [
            self.vertex_buffer.take(),
            self.indexed_vertex_buffer.take(),
            self.index_buffer.take(),
        ]
        .into_iter()
        .flatten()
        {
            gl.delete_buffer(buffer);
            log::debug!("deleted {buffer}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::recorder::{Command, RecordedSource, Recorder};

    /// 100 distinct vertices: one more than a whole number of triangles.
    fn hundred_vertex_mesh() -> Mesh {
        #[allow(clippy::cast_precision_loss)]
        let flat = (0..300).map(|i| i as f32).collect();
        Mesh::from_flat(flat).unwrap()
    }

    fn ready(mesh: &Mesh) -> (Recorder, GpuResources) {
        let mut gl = Recorder::new();
        let mut resources = GpuResources::default();
        resources.create(&mut gl, mesh).unwrap();
        gl.clear_log();
        (gl, resources)
    }

    #[test]
    fn every_mode_draws_the_same_triangles() {
        let mesh = hundred_vertex_mesh();
        let (mut gl, resources) = ready(&mesh);
        for mode in RenderingMode::ALL {
            gl.clear_log();
            resources.submission(mode).unwrap().submit(&mut gl, &mesh);
            assert_eq!(gl.triangles(), 33, "{mode}");
        }
    }

    #[test]
    fn immediate_mode_stops_three_floats_short() {
        let mesh = hundred_vertex_mesh();
        let mut gl = Recorder::new();
        draw_immediate(&mut gl, &mesh);

        let vertices: Vec<_> = gl
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::Vertex(_)))
            .collect();
        assert_eq!(vertices.len(), 99);
        assert_eq!(vertices.last(), Some(&&Command::Vertex([294.0, 295.0, 296.0])));
        assert_eq!(gl.triangles(), 33);
    }

    #[test]
    fn immediate_mode_drops_the_last_triangle_of_aligned_meshes() {
        let mesh = Mesh::from_flat(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        let (mut gl, resources) = ready(&mesh);

        Submission::Immediate.submit(&mut gl, &mesh);
        assert_eq!(gl.triangles(), 0);

        gl.clear_log();
        resources
            .submission(RenderingMode::VertexArray)
            .unwrap()
            .submit(&mut gl, &mesh);
        assert_eq!(gl.triangles(), 1);
    }

    #[test]
    fn immediate_mode_tolerates_empty_mesh() {
        let mesh = Mesh::from_flat(Vec::new()).unwrap();
        let mut gl = Recorder::new();
        draw_immediate(&mut gl, &mesh);
        assert_eq!(gl.commands(), &[Command::Begin(Primitive::Triangles), Command::End]);
    }

    #[test]
    fn no_mode_leaves_state_bound() {
        let mesh = Mesh::car();
        let (mut gl, resources) = ready(&mesh);
        for mode in RenderingMode::ALL {
            resources.submission(mode).unwrap().submit(&mut gl, &mesh);
            assert_eq!(gl.bound_buffer(BufferTarget::Array), None, "{mode}");
            assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), None, "{mode}");
            assert!(!gl.client_state_enabled(), "{mode}");
        }
    }

    #[test]
    fn binds_and_unbinds_pair_up() {
        let mesh = Mesh::car();
        let (mut gl, resources) = ready(&mesh);
        resources
            .submission(RenderingMode::IndexedVertexBufferObject)
            .unwrap()
            .submit(&mut gl, &mesh);

        let binds = gl
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::BindBuffer(_, Some(_))))
            .count();
        let unbinds = gl
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::BindBuffer(_, None)))
            .count();
        assert_eq!((binds, unbinds), (2, 2));
    }

    #[test]
    fn indexed_vertex_array_reads_host_indices() {
        let mesh = Mesh::car();
        let (mut gl, resources) = ready(&mesh);
        resources
            .submission(RenderingMode::IndexedVertexArray)
            .unwrap()
            .submit(&mut gl, &mesh);
        assert!(gl.commands().contains(&Command::DrawElements {
            primitive: Primitive::Triangles,
            count: 216,
            indices: RecordedSource::Host { len: 216 },
        }));
        assert!(gl.commands().contains(&Command::VertexPointer {
            components: 3,
            source: RecordedSource::Host { len: 144 },
        }));
    }

    #[test]
    fn create_uploads_every_array_once() {
        let mesh = Mesh::car();
        let mut gl = Recorder::new();
        let mut resources = GpuResources::default();
        resources.create(&mut gl, &mesh).unwrap();

        let uploads: Vec<_> = gl
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::BufferData { target, len } => Some((*target, *len)),
                _ => None,
            })
            .collect();
        assert_eq!(
            uploads,
            [
                (BufferTarget::Array, 216 * 3 * 4),
                (BufferTarget::Array, 48 * 3 * 4),
                (BufferTarget::ElementArray, 216 * 2),
            ]
        );
        assert_eq!(gl.bound_buffer(BufferTarget::Array), None);
        assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), None);
    }

    #[test]
    fn release_after_partial_create_deletes_only_created_handles() {
        let mesh = Mesh::car();
        let mut gl = Recorder::new().fail_after(3);
        let mut resources = GpuResources::default();
        assert!(resources.create(&mut gl, &mesh).is_err());
        assert!(resources.submission(RenderingMode::DisplayList).is_some());
        assert!(resources
            .submission(RenderingMode::IndexedVertexBufferObject)
            .is_none());

        resources.release(&mut gl);
        assert_eq!(gl.deleted_lists().len(), 1);
        assert_eq!(gl.deleted_buffers().len(), 2);
        assert!(resources.is_empty());

        resources.release(&mut gl);
        assert_eq!(gl.deleted_buffers().len(), 2);
    }

    #[test]
    fn mode_names_round_trip_and_cycle() {
        for mode in RenderingMode::ALL {
            assert_eq!(mode.name().parse::<RenderingMode>().unwrap(), mode);
        }
        assert_eq!(
            "Display-List".parse::<RenderingMode>().unwrap(),
            RenderingMode::DisplayList
        );
        assert!("wireframe".parse::<RenderingMode>().is_err());
        assert_eq!(
            RenderingMode::IndexedVertexBufferObject.next(),
            RenderingMode::Immediate
        );
    }
}
