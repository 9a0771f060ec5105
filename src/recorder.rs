//! A headless [`FixedFunctionGl`] that records every call.
//!
//! [`Recorder`] keeps the same process-wide state a real driver would
//! (bindings, client state, matrix depth, display list contents) so tests
//! and hosts can inspect exactly what a world submitted. Lifecycle mistakes
//! a driver would silently tolerate, such as deleting a name twice, panic
//! here.

use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;

use crate::context::{
    BufferHandle, BufferTarget, Capability, ClearMask, ClientState, FixedFunctionGl, IndexSource,
    ListHandle, MatrixMode, Primitive, Shading, VertexSource, Winding,
};
use crate::error::GlError;

/// Where a recorded pointer or index call read from. Host slices are
/// recorded by length only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedSource {
    /// Client memory holding `len` elements.
    Host {
        /// Element count.
        len: usize,
    },
    /// Byte offset into a bound buffer.
    Bound {
        /// Offset in bytes.
        offset: usize,
    },
}

/// One recorded call.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ClearColor([f32; 4]),
    Clear(ClearMask),
    Color([f32; 3]),
    Enable(Capability),
    ShadeModel(Shading),
    FrontFace(Winding),
    Viewport([i32; 4]),
    MatrixMode(MatrixMode),
    LoadIdentity,
    PushMatrix,
    PopMatrix,
    Translate([f32; 3]),
    Rotate { degrees: f32, axis: [f32; 3] },
    Scale([f32; 3]),
    Ortho([f32; 6]),
    Perspective { fovy: f32, aspect: f32, near: f32, far: f32 },
    Begin(Primitive),
    Vertex([f32; 3]),
    End,
    GenList(ListHandle),
    NewList(ListHandle),
    EndList,
    CallList(ListHandle),
    DeleteList(ListHandle),
    GenBuffer(BufferHandle),
    BindBuffer(BufferTarget, Option<BufferHandle>),
    BufferData { target: BufferTarget, len: usize },
    DeleteBuffer(BufferHandle),
    EnableClientState(ClientState),
    DisableClientState(ClientState),
    VertexPointer { components: i32, source: RecordedSource },
    IndexPointer { offset: usize },
    DrawArrays { primitive: Primitive, first: i32, count: i32 },
    DrawElements { primitive: Primitive, count: i32, indices: RecordedSource },
    Flush,
}

impl Command {
    /// Whether this call submits geometry to the rasterizer.
    pub fn is_draw(&self) -> bool {
        matches!(
            self,
            Command::End
                | Command::CallList(_)
                | Command::DrawArrays { .. }
                | Command::DrawElements { .. }
        )
    }
}

/// Recording graphics context. See the [module docs](self).
#[derive(Debug, Default)]
pub struct Recorder {
    commands: Vec<Command>,
    next_name: u32,
    fail_after: Option<usize>,
    generated: usize,

    matrix_mode: Option<MatrixMode>,
    projection_depth: usize,
    modelview_depth: usize,
    projection_set: bool,

    immediate: Option<(Primitive, usize)>,
    compiling: Option<(ListHandle, Vec<Command>)>,
    lists: HashMap<ListHandle, Vec<Command>>,
    deleted_lists: BTreeSet<ListHandle>,

    buffers: BTreeSet<BufferHandle>,
    deleted_buffers: BTreeSet<BufferHandle>,
    array_binding: Option<BufferHandle>,
    element_binding: Option<BufferHandle>,
    vertex_array_enabled: bool,
    /// Vertices readable through a client-memory vertex pointer.
    host_vertices: Option<usize>,

    triangles: usize,
}

impl Recorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every resource generation after the first `successes` fail.
    #[must_use]
    pub fn fail_after(mut self, successes: usize) -> Self {
        self.fail_after = Some(successes);
        self
    }

    /// Every call recorded since creation or the last
    /// [`clear_log`](Self::clear_log). Calls compiled into a display list
    /// appear in the list, not here.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Forget recorded calls and the triangle count. Bindings, handles and
    /// matrix depth are kept.
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.triangles = 0;
    }

    /// Triangles rasterized since the last [`clear_log`](Self::clear_log),
    /// including those replayed from display lists.
    pub fn triangles(&self) -> usize {
        self.triangles
    }

    /// Buffer currently bound to `target`.
    pub fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::Array => self.array_binding,
            BufferTarget::ElementArray => self.element_binding,
        }
    }

    /// Whether `GL_VERTEX_ARRAY` is enabled.
    pub fn client_state_enabled(&self) -> bool {
        self.vertex_array_enabled
    }

    /// Number of pushed matrices on the given stack.
    pub fn matrix_depth(&self, mode: MatrixMode) -> usize {
        match mode {
            MatrixMode::Projection => self.projection_depth,
            MatrixMode::Modelview => self.modelview_depth,
        }
    }

    /// Whether a projection matrix has ever been multiplied onto the
    /// projection stack.
    pub fn projection_set(&self) -> bool {
        self.projection_set
    }

    /// Buffers generated and not yet deleted.
    pub fn live_buffers(&self) -> &BTreeSet<BufferHandle> {
        &self.buffers
    }

    /// Buffers that have been deleted.
    pub fn deleted_buffers(&self) -> &BTreeSet<BufferHandle> {
        &self.deleted_buffers
    }

    /// Display lists generated and not yet deleted.
    pub fn live_lists(&self) -> impl Iterator<Item = ListHandle> + '_ {
        self.lists.keys().copied()
    }

    /// Display lists that have been deleted.
    pub fn deleted_lists(&self) -> &BTreeSet<ListHandle> {
        &self.deleted_lists
    }

    /// The compiled contents of a live list.
    pub fn list_contents(&self, list: ListHandle) -> Option<&[Command]> {
        self.lists.get(&list).map(Vec::as_slice)
    }

    fn record(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Store `command` in the list being compiled. Returns `false` when no
    /// list is open and the call should execute.
    fn compile(&mut self, command: &Command) -> bool {
        match &mut self.compiling {
            Some((_, contents)) => {
                contents.push(command.clone());
                true
            }
            None => false,
        }
    }

    fn next_name(&mut self, kind: &'static str) -> Result<NonZeroU32, GlError> {
        if self.fail_after.is_some_and(|limit| self.generated >= limit) {
            return Err(GlError::creation(kind, "out of names"));
        }
        self.generated += 1;
        self.next_name += 1;
        NonZeroU32::new(self.next_name).ok_or_else(|| GlError::creation(kind, "name overflow"))
    }

    fn depth_mut(&mut self) -> &mut usize {
        match self.matrix_mode.unwrap_or(MatrixMode::Modelview) {
            MatrixMode::Projection => &mut self.projection_depth,
            MatrixMode::Modelview => &mut self.modelview_depth,
        }
    }

    /// Execute a compiled or immediate command that only affects state.
    fn execute(&mut self, command: Command) {
        if self.compile(&command) {
            return;
        }
        match &command {
            Command::PushMatrix => *self.depth_mut() += 1,
            Command::PopMatrix => {
                let depth = self.depth_mut();
                assert!(*depth > 0, "pop_matrix on an empty stack");
                *depth -= 1;
            }
            Command::Begin(primitive) => {
                assert!(self.immediate.is_none(), "begin inside begin/end");
                self.immediate = Some((*primitive, 0));
            }
            Command::Vertex(_) => {
                if let Some((_, count)) = &mut self.immediate {
                    *count += 1;
                }
            }
            Command::End => {
                let (primitive, count) = self.immediate.take().expect("end without begin");
                self.triangles += primitive.triangles(count);
            }
            _ => {}
        }
        self.record(command);
    }

    /// Count the triangles a compiled list produces, without logging its
    /// contents.
    fn replay_triangles(contents: &[Command]) -> usize {
        let mut open = None;
        let mut triangles = 0;
        for command in contents {
            match command {
                Command::Begin(primitive) => open = Some((*primitive, 0)),
                Command::Vertex(_) => {
                    if let Some((_, count)) = &mut open {
                        *count += 1;
                    }
                }
                Command::End => {
                    if let Some((primitive, count)) = open.take() {
                        triangles += primitive.triangles(count);
                    }
                }
                _ => {}
            }
        }
        triangles
    }

    fn assert_live_buffer(&self, buffer: BufferHandle) {
        assert!(
            self.buffers.contains(&buffer),
            "{buffer} is not a live buffer"
        );
    }
}

impl FixedFunctionGl for Recorder {
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.record(Command::ClearColor([r, g, b, a]));
    }

    fn clear(&mut self, mask: ClearMask) {
        self.record(Command::Clear(mask));
    }

    fn color(&mut self, r: f32, g: f32, b: f32) {
        self.execute(Command::Color([r, g, b]));
    }

    fn enable(&mut self, capability: Capability) {
        self.record(Command::Enable(capability));
    }

    fn shade_model(&mut self, shading: Shading) {
        self.record(Command::ShadeModel(shading));
    }

    fn front_face(&mut self, winding: Winding) {
        self.record(Command::FrontFace(winding));
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record(Command::Viewport([x, y, width, height]));
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.matrix_mode = Some(mode);
        self.record(Command::MatrixMode(mode));
    }

    fn load_identity(&mut self) {
        self.execute(Command::LoadIdentity);
    }

    fn push_matrix(&mut self) {
        self.execute(Command::PushMatrix);
    }

    fn pop_matrix(&mut self) {
        self.execute(Command::PopMatrix);
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.execute(Command::Translate([x, y, z]));
    }

    fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) {
        self.execute(Command::Rotate {
            degrees,
            axis: [x, y, z],
        });
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.execute(Command::Scale([x, y, z]));
    }

    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        if self.matrix_mode == Some(MatrixMode::Projection) {
            self.projection_set = true;
        }
        self.record(Command::Ortho([left, right, bottom, top, near, far]));
    }

    fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32) {
        if self.matrix_mode == Some(MatrixMode::Projection) {
            self.projection_set = true;
        }
        self.record(Command::Perspective {
            fovy: fovy_degrees,
            aspect,
            near,
            far,
        });
    }

    fn begin(&mut self, primitive: Primitive) {
        self.execute(Command::Begin(primitive));
    }

    fn vertex(&mut self, x: f32, y: f32, z: f32) {
        self.execute(Command::Vertex([x, y, z]));
    }

    fn end(&mut self) {
        self.execute(Command::End);
    }

    fn gen_list(&mut self) -> Result<ListHandle, GlError> {
        let list = ListHandle(self.next_name("display list")?);
        self.lists.insert(list, Vec::new());
        self.record(Command::GenList(list));
        Ok(list)
    }

    fn new_list(&mut self, list: ListHandle) {
        assert!(self.compiling.is_none(), "new_list inside new_list");
        assert!(self.lists.contains_key(&list), "{list} was never generated");
        self.compiling = Some((list, Vec::new()));
        self.record(Command::NewList(list));
    }

    fn end_list(&mut self) {
        let (list, contents) = self.compiling.take().expect("end_list without new_list");
        self.lists.insert(list, contents);
        self.record(Command::EndList);
    }

    fn call_list(&mut self, list: ListHandle) {
        let contents = self
            .lists
            .get(&list)
            .unwrap_or_else(|| panic!("{list} is not a live display list"));
        self.triangles += Self::replay_triangles(contents);
        self.record(Command::CallList(list));
    }

    fn delete_list(&mut self, list: ListHandle) {
        assert!(
            !self.deleted_lists.contains(&list),
            "{list} deleted twice"
        );
        assert!(
            self.lists.remove(&list).is_some(),
            "{list} was never generated"
        );
        self.deleted_lists.insert(list);
        self.record(Command::DeleteList(list));
    }

    fn gen_buffer(&mut self) -> Result<BufferHandle, GlError> {
        let buffer = BufferHandle(self.next_name("buffer")?);
        self.buffers.insert(buffer);
        self.record(Command::GenBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        if let Some(buffer) = buffer {
            self.assert_live_buffer(buffer);
        }
        match target {
            BufferTarget::Array => self.array_binding = buffer,
            BufferTarget::ElementArray => self.element_binding = buffer,
        }
        self.record(Command::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        assert!(
            self.bound_buffer(target).is_some(),
            "buffer_data with nothing bound to {target:?}"
        );
        self.record(Command::BufferData {
            target,
            len: data.len(),
        });
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        assert!(
            !self.deleted_buffers.contains(&buffer),
            "{buffer} deleted twice"
        );
        assert!(self.buffers.remove(&buffer), "{buffer} was never generated");
        self.deleted_buffers.insert(buffer);
        if self.array_binding == Some(buffer) {
            self.array_binding = None;
        }
        if self.element_binding == Some(buffer) {
            self.element_binding = None;
        }
        self.record(Command::DeleteBuffer(buffer));
    }

    fn enable_client_state(&mut self, state: ClientState) {
        self.vertex_array_enabled = true;
        self.record(Command::EnableClientState(state));
    }

    fn disable_client_state(&mut self, state: ClientState) {
        self.vertex_array_enabled = false;
        self.record(Command::DisableClientState(state));
    }

    fn vertex_pointer(&mut self, components: i32, source: VertexSource<'_>) {
        let source = match source {
            VertexSource::Host(data) => {
                let stride = usize::try_from(components).unwrap_or(0).max(1);
                self.host_vertices = Some(data.len() / stride);
                RecordedSource::Host { len: data.len() }
            }
            VertexSource::Bound { offset } => {
                assert!(
                    self.array_binding.is_some(),
                    "buffer-relative vertex pointer with no array buffer bound"
                );
                self.host_vertices = None;
                RecordedSource::Bound { offset }
            }
        };
        self.record(Command::VertexPointer { components, source });
    }

    fn index_pointer(&mut self, offset: usize) {
        self.record(Command::IndexPointer { offset });
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        assert!(
            self.vertex_array_enabled,
            "draw_arrays with the vertex array disabled"
        );
        if let Some(available) = self.host_vertices {
            let end = usize::try_from(first).unwrap_or(0) + usize::try_from(count).unwrap_or(0);
            assert!(
                end <= available,
                "draw_arrays reads vertices up to {end} from a client array of {available}"
            );
        }
        self.triangles += primitive.triangles(usize::try_from(count).unwrap_or(0));
        self.record(Command::DrawArrays {
            primitive,
            first,
            count,
        });
    }

    fn draw_elements(&mut self, primitive: Primitive, count: i32, indices: IndexSource<'_>) {
        assert!(
            self.vertex_array_enabled,
            "draw_elements with the vertex array disabled"
        );
        let indices = match indices {
            IndexSource::Host(data) => {
                let wanted = usize::try_from(count).unwrap_or(0);
                assert!(
                    wanted <= data.len(),
                    "draw_elements reads {wanted} indices from a client array of {}",
                    data.len()
                );
                RecordedSource::Host { len: data.len() }
            }
            IndexSource::Bound { offset } => {
                assert!(
                    self.element_binding.is_some(),
                    "buffer-relative indices with no element buffer bound"
                );
                RecordedSource::Bound { offset }
            }
        };
        self.triangles += primitive.triangles(usize::try_from(count).unwrap_or(0));
        self.record(Command::DrawElements {
            primitive,
            count,
            indices,
        });
    }

    fn flush(&mut self) {
        self.record(Command::Flush);
    }
}
