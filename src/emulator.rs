//! [`FixedFunctionGl`] on a core-profile context via [glow].
//!
//! Core OpenGL 3.1 has no matrix stacks, immediate mode, display lists or
//! client-memory arrays, so [`GlowContext`] rebuilds them:
//!
//! - matrix stacks live on the CPU ([`MatrixStack`]) and reach the GPU as a
//!   single `u_mvp` uniform per draw;
//! - `begin`/`vertex`/`end` collects vertices and streams them on `end`,
//!   splitting quads into triangle pairs;
//! - display lists are recorded on the CPU and replayed through the same
//!   entry points;
//! - client-memory vertex and index arrays are streamed into scratch buffers
//!   at draw time, while buffer-relative pointers read the application's own
//!   buffer objects.
//!
//! Buffer objects created through [`FixedFunctionGl::gen_buffer`] are real GL
//! buffers, and bind/unbind calls reach the driver, so the bind discipline of
//! the caller is preserved.
//!
//! [glow]: https://docs.rs/glow

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use glow::HasContext;

use crate::context::{
    BufferHandle, BufferTarget, Capability, ClearMask, ClientState, FixedFunctionGl, IndexSource,
    ListHandle, MatrixMode, Primitive, Shading, VertexSource, Winding,
};
use crate::error::GlError;
use crate::matrix::MatrixStack;
use crate::shaders;

/// A call captured while compiling a display list.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ListCommand {
    Color([f32; 3]),
    Begin(Primitive),
    Vertex([f32; 3]),
    End,
    LoadIdentity,
    PushMatrix,
    PopMatrix,
    Translate([f32; 3]),
    Rotate(f32, [f32; 3]),
    Scale([f32; 3]),
}

/// Current `vertex_pointer` source.
#[derive(Debug)]
enum VertexPointer {
    Unset,
    Host(Vec<f32>),
    Bound { buffer: BufferHandle, offset: usize },
}

/// Split independent quads into triangle pairs `(a, b, c)`, `(a, c, d)`.
/// A trailing partial quad is dropped.
fn quads_to_triangles(vertices: &[[f32; 3]]) -> Vec<[f32; 3]> {
    vertices
        .chunks_exact(4)
        .flat_map(|q| [q[0], q[1], q[2], q[0], q[2], q[3]])
        .collect()
}

fn gl_target(target: BufferTarget) -> u32 {
    match target {
        BufferTarget::Array => glow::ARRAY_BUFFER,
        BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
    }
}

/// Convert a byte offset to the `i32` glow expects.
///
/// # Panics
///
/// Panics if `offset > i32::MAX`.
fn gl_offset(offset: usize) -> i32 {
    i32::try_from(offset).expect("buffer offset exceeds i32::MAX")
}

/// Fixed-function emulation over a shared [`glow::Context`].
///
/// # Example
///
/// ```no_run
/// # use glow_render_modes::{GlowContext, Mesh, RenderModeWorld};
/// # use std::sync::Arc;
/// # fn example(gl: Arc<glow::Context>) -> Result<(), glow_render_modes::GlError> {
/// // During setup (with a current GL context):
/// let context = unsafe { GlowContext::new(gl) }?;
/// let mut world = RenderModeWorld::new(Arc::new(Mesh::car()));
/// world.initialize(context)?;
/// world.resize(800, 600);
///
/// // Each frame:
/// world.draw();
///
/// // At shutdown, `into_context` releases the world's handles first:
/// if let Some(mut context) = world.into_context() {
///     unsafe { context.destroy() };
/// }
/// # Ok(())
/// # }
/// ```
pub struct GlowContext {
    gl: Arc<glow::Context>,

    /// Flat-colour program replacing the fixed-function pipeline.
    program: glow::Program,
    /// `u_mvp`: projection × modelview.
    u_mvp: glow::UniformLocation,
    /// `u_color`: the current `color`.
    u_color: glow::UniformLocation,
    /// Location of `a_position`.
    a_position: u32,

    /// Vertex array object, bound for the lifetime of the context. The
    /// element buffer binding lives in it.
    vao: glow::VertexArray,
    /// Scratch vertex buffer for immediate mode and host vertex arrays.
    stream_vbo: glow::Buffer,
    /// Scratch index buffer for host index arrays.
    stream_ebo: glow::Buffer,

    matrix_mode: MatrixMode,
    projection: MatrixStack,
    modelview: MatrixStack,
    color: [f32; 4],

    immediate: Option<(Primitive, Vec<[f32; 3]>)>,
    compiling: Option<(ListHandle, Vec<ListCommand>)>,
    lists: HashMap<ListHandle, Vec<ListCommand>>,

    buffers: HashMap<BufferHandle, glow::Buffer>,
    array_binding: Option<BufferHandle>,
    element_binding: Option<BufferHandle>,
    vertex_array_enabled: bool,
    pointer: VertexPointer,

    next_name: u32,
}

impl GlowContext {
    /// Compile the emulation program and create the scratch objects.
    ///
    /// # Safety
    ///
    /// The `gl` context must be current and valid for as long as this value
    /// is used. The caller must call [`destroy`](Self::destroy) before the
    /// context is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if shader compilation, program linking or object
    /// creation fails.
    ///
    /// # Panics
    ///
    /// Panics if a uniform or attribute is missing from the shader, which
    /// indicates a bug in the shader source.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Result<Self, GlError> {
        let program = unsafe {
            shaders::compile_program(&gl, shaders::FLAT_VERTEX_SRC, shaders::FLAT_FRAGMENT_SRC)?
        };

        let (u_mvp, u_color, a_position) = unsafe {
            (
                gl.get_uniform_location(program, "u_mvp")
                    .expect("u_mvp missing from flat shader"),
                gl.get_uniform_location(program, "u_color")
                    .expect("u_color missing from flat shader"),
                gl.get_attrib_location(program, "a_position")
                    .expect("a_position missing from flat shader"),
            )
        };

        let (vao, stream_vbo, stream_ebo) = unsafe {
            let vao = gl
                .create_vertex_array()
                .map_err(|e| GlError::creation("vertex array", e))?;
            let vbo = gl
                .create_buffer()
                .map_err(|e| GlError::creation("buffer", e))?;
            let ebo = gl
                .create_buffer()
                .map_err(|e| GlError::creation("buffer", e))?;
            gl.bind_vertex_array(Some(vao));
            (vao, vbo, ebo)
        };

        log::debug!("fixed-function emulation ready");

        Ok(Self {
            gl,
            program,
            u_mvp,
            u_color,
            a_position,
            vao,
            stream_vbo,
            stream_ebo,
            matrix_mode: MatrixMode::Modelview,
            projection: MatrixStack::default(),
            modelview: MatrixStack::default(),
            color: [1.0, 1.0, 1.0, 1.0],
            immediate: None,
            compiling: None,
            lists: HashMap::new(),
            buffers: HashMap::new(),
            array_binding: None,
            element_binding: None,
            vertex_array_enabled: false,
            pointer: VertexPointer::Unset,
            next_name: 0,
        })
    }

    /// Delete the emulation objects, and any buffers the application never
    /// deleted.
    ///
    /// # Safety
    ///
    /// Must be called with the same GL context that was used to create this
    /// value, and must be called exactly once.
    pub unsafe fn destroy(&mut self) {
        let gl = &self.gl;
        if !self.buffers.is_empty() {
            log::warn!("deleting {} leaked buffer objects", self.buffers.len());
        }
        unsafe {
            for (_, buffer) in self.buffers.drain() {
                gl.delete_buffer(buffer);
            }
            gl.bind_vertex_array(None);
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.stream_vbo);
            gl.delete_buffer(self.stream_ebo);
            gl.delete_program(self.program);
        }
        self.lists.clear();
    }

    fn stack(&mut self) -> &mut MatrixStack {
        match self.matrix_mode {
            MatrixMode::Projection => &mut self.projection,
            MatrixMode::Modelview => &mut self.modelview,
        }
    }

    /// Capture `command` into the list being compiled. Returns `false` when
    /// no list is open and the call should execute.
    fn compile(&mut self, command: ListCommand) -> bool {
        match &mut self.compiling {
            Some((_, commands)) => {
                commands.push(command);
                true
            }
            None => false,
        }
    }

    fn replay(&mut self, command: ListCommand) {
        match command {
            ListCommand::Color([r, g, b]) => self.color(r, g, b),
            ListCommand::Begin(primitive) => self.begin(primitive),
            ListCommand::Vertex([x, y, z]) => self.vertex(x, y, z),
            ListCommand::End => self.end(),
            ListCommand::LoadIdentity => self.load_identity(),
            ListCommand::PushMatrix => self.push_matrix(),
            ListCommand::PopMatrix => self.pop_matrix(),
            ListCommand::Translate([x, y, z]) => self.translate(x, y, z),
            ListCommand::Rotate(degrees, [x, y, z]) => self.rotate(degrees, x, y, z),
            ListCommand::Scale([x, y, z]) => self.scale(x, y, z),
        }
    }

    fn native(&self, buffer: Option<BufferHandle>) -> Option<glow::Buffer> {
        buffer.and_then(|b| self.buffers.get(&b).copied())
    }

    /// Load the program with the current matrices and colour.
    fn apply_uniforms(&self) {
        let mvp = self.projection.top() * self.modelview.top();
        let [r, g, b, a] = self.color;
        // SAFETY: `new`'s contract keeps the context current.
        unsafe {
            self.gl.use_program(Some(self.program));
            self.gl
                .uniform_matrix_4_f32_slice(Some(&self.u_mvp), false, &mvp.to_cols_array());
            self.gl.uniform_4_f32(Some(&self.u_color), r, g, b, a);
        }
    }

    /// Copy client memory into the scratch vertex buffer and point
    /// `a_position` at it.
    fn stream_vertices(&self, data: &[u8]) {
        // SAFETY: `new`'s contract keeps the context current.
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.stream_vbo));
            self.gl
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STREAM_DRAW);
            self.gl
                .vertex_attrib_pointer_f32(self.a_position, 3, glow::FLOAT, false, 0, 0);
        }
    }

    /// Put the application's array buffer binding back after streaming.
    fn restore_array_binding(&self) {
        let native = self.native(self.array_binding);
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, native) };
    }

    /// Point `a_position` at the current vertex pointer. Returns `false` if
    /// there is nothing to draw from.
    fn apply_vertex_pointer(&self) -> bool {
        match &self.pointer {
            VertexPointer::Unset => {
                log::error!("draw with no vertex pointer set");
                false
            }
            VertexPointer::Host(data) => {
                self.stream_vertices(bytemuck::cast_slice(data));
                true
            }
            VertexPointer::Bound { buffer, offset } => {
                let Some(native) = self.native(Some(*buffer)) else {
                    log::error!("vertex pointer refers to deleted {buffer}");
                    return false;
                };
                // SAFETY: `new`'s contract keeps the context current.
                unsafe {
                    self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(native));
                    self.gl.vertex_attrib_pointer_f32(
                        self.a_position,
                        3,
                        glow::FLOAT,
                        false,
                        0,
                        gl_offset(*offset),
                    );
                }
                true
            }
        }
    }

    /// Enable `a_position` for one emulated draw, then return it to the
    /// state the client array flag implies.
    fn with_position_array(&self, draw: impl FnOnce()) {
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.enable_vertex_attrib_array(self.a_position) };
        draw();
        if !self.vertex_array_enabled {
            // SAFETY: as above.
            unsafe { self.gl.disable_vertex_attrib_array(self.a_position) };
        }
    }

    fn triangles_only(primitive: Primitive, call: &str) -> bool {
        if primitive == Primitive::Triangles {
            true
        } else {
            log::error!("{call} supports only triangles, got {primitive:?}");
            false
        }
    }

    fn mint_name(&mut self, kind: &'static str) -> Result<NonZeroU32, GlError> {
        self.next_name = self
            .next_name
            .checked_add(1)
            .ok_or_else(|| GlError::creation(kind, "name space exhausted"))?;
        NonZeroU32::new(self.next_name).ok_or_else(|| GlError::creation(kind, "name overflow"))
    }
}

impl FixedFunctionGl for GlowContext {
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.clear_color(r, g, b, a) };
    }

    fn clear(&mut self, mask: ClearMask) {
        let mut bits = 0;
        if mask.color {
            bits |= glow::COLOR_BUFFER_BIT;
        }
        if mask.depth {
            bits |= glow::DEPTH_BUFFER_BIT;
        }
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.clear(bits) };
    }

    fn color(&mut self, r: f32, g: f32, b: f32) {
        if !self.compile(ListCommand::Color([r, g, b])) {
            self.color = [r, g, b, 1.0];
        }
    }

    fn enable(&mut self, capability: Capability) {
        let cap = match capability {
            Capability::DepthTest => glow::DEPTH_TEST,
            Capability::CullFace => glow::CULL_FACE,
        };
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.enable(cap) };
    }

    fn shade_model(&mut self, shading: Shading) {
        // The flat program has no per-vertex colour to interpolate.
        if shading == Shading::Smooth {
            log::debug!("smooth shading requested; output stays flat");
        }
    }

    fn front_face(&mut self, winding: Winding) {
        let mode = match winding {
            Winding::Ccw => glow::CCW,
            Winding::Cw => glow::CW,
        };
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.front_face(mode) };
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.matrix_mode = mode;
    }

    fn load_identity(&mut self) {
        if !self.compile(ListCommand::LoadIdentity) {
            self.stack().load_identity();
        }
    }

    fn push_matrix(&mut self) {
        if !self.compile(ListCommand::PushMatrix) {
            self.stack().push();
        }
    }

    fn pop_matrix(&mut self) {
        if !self.compile(ListCommand::PopMatrix) {
            self.stack().pop();
        }
    }

    fn translate(&mut self, x: f32, y: f32, z: f32) {
        if !self.compile(ListCommand::Translate([x, y, z])) {
            self.stack().translate(x, y, z);
        }
    }

    fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) {
        if !self.compile(ListCommand::Rotate(degrees, [x, y, z])) {
            self.stack().rotate(degrees, x, y, z);
        }
    }

    fn scale(&mut self, x: f32, y: f32, z: f32) {
        if !self.compile(ListCommand::Scale([x, y, z])) {
            self.stack().scale(x, y, z);
        }
    }

    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.stack().ortho(left, right, bottom, top, near, far);
    }

    fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.stack().perspective(fovy_degrees, aspect, near, far);
    }

    fn begin(&mut self, primitive: Primitive) {
        if self.compile(ListCommand::Begin(primitive)) {
            return;
        }
        if self.immediate.is_some() {
            log::error!("begin inside begin/end; ignored");
            return;
        }
        self.immediate = Some((primitive, Vec::new()));
    }

    fn vertex(&mut self, x: f32, y: f32, z: f32) {
        if self.compile(ListCommand::Vertex([x, y, z])) {
            return;
        }
        if let Some((_, vertices)) = &mut self.immediate {
            vertices.push([x, y, z]);
        }
    }

    fn end(&mut self) {
        if self.compile(ListCommand::End) {
            return;
        }
        let Some((primitive, vertices)) = self.immediate.take() else {
            log::error!("end without begin; ignored");
            return;
        };
        let triangles = match primitive {
            Primitive::Triangles => {
                let whole = vertices.len() - vertices.len() % 3;
                vertices[..whole].to_vec()
            }
            Primitive::Quads => quads_to_triangles(&vertices),
        };
        if triangles.is_empty() {
            return;
        }
        let count = i32::try_from(triangles.len()).expect("vertex count exceeds i32::MAX");

        self.apply_uniforms();
        self.with_position_array(|| {
            self.stream_vertices(bytemuck::cast_slice(&triangles));
            // SAFETY: `new`'s contract keeps the context current.
            unsafe { self.gl.draw_arrays(glow::TRIANGLES, 0, count) };
        });
        self.restore_array_binding();
    }

    fn gen_list(&mut self) -> Result<ListHandle, GlError> {
        let list = ListHandle(self.mint_name("display list")?);
        self.lists.insert(list, Vec::new());
        Ok(list)
    }

    fn new_list(&mut self, list: ListHandle) {
        if self.compiling.is_some() {
            log::error!("new_list inside new_list; ignored");
            return;
        }
        self.compiling = Some((list, Vec::new()));
    }

    fn end_list(&mut self) {
        match self.compiling.take() {
            Some((list, commands)) => {
                log::debug!("compiled {list}: {} commands", commands.len());
                self.lists.insert(list, commands);
            }
            None => log::error!("end_list without new_list; ignored"),
        }
    }

    fn call_list(&mut self, list: ListHandle) {
        // Lists cannot call lists, so taking the commands out for the replay
        // cannot miss a nested lookup.
        let Some(commands) = self.lists.remove(&list) else {
            log::error!("call_list on unknown {list}");
            return;
        };
        for &command in &commands {
            self.replay(command);
        }
        self.lists.insert(list, commands);
    }

    fn delete_list(&mut self, list: ListHandle) {
        if self.lists.remove(&list).is_none() {
            log::warn!("delete_list on unknown {list}");
        }
    }

    fn gen_buffer(&mut self) -> Result<BufferHandle, GlError> {
        let name = self.mint_name("buffer")?;
        // SAFETY: `new`'s contract keeps the context current.
        let native =
            unsafe { self.gl.create_buffer() }.map_err(|e| GlError::creation("buffer", e))?;
        let buffer = BufferHandle(name);
        self.buffers.insert(buffer, native);
        Ok(buffer)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        let native = match buffer {
            Some(b) => match self.buffers.get(&b) {
                Some(&native) => Some(native),
                None => {
                    log::error!("bind of unknown {b}; ignored");
                    return;
                }
            },
            None => None,
        };
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.bind_buffer(gl_target(target), native) };
        match target {
            BufferTarget::Array => self.array_binding = buffer,
            BufferTarget::ElementArray => self.element_binding = buffer,
        }
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) {
        let bound = match target {
            BufferTarget::Array => self.array_binding,
            BufferTarget::ElementArray => self.element_binding,
        };
        if bound.is_none() {
            log::error!("buffer_data with nothing bound to {target:?}; ignored");
            return;
        }
        // SAFETY: `new`'s contract keeps the context current.
        unsafe {
            self.gl
                .buffer_data_u8_slice(gl_target(target), data, glow::STATIC_DRAW);
        }
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        let Some(native) = self.buffers.remove(&buffer) else {
            log::warn!("delete of unknown {buffer}");
            return;
        };
        if self.array_binding == Some(buffer) {
            self.array_binding = None;
        }
        if self.element_binding == Some(buffer) {
            self.element_binding = None;
        }
        if matches!(self.pointer, VertexPointer::Bound { buffer: b, .. } if b == buffer) {
            self.pointer = VertexPointer::Unset;
        }
        // SAFETY: `new`'s contract keeps the context current. GL unbinds a
        // deleted buffer from every target itself.
        unsafe { self.gl.delete_buffer(native) };
    }

    fn enable_client_state(&mut self, state: ClientState) {
        match state {
            ClientState::VertexArray => {
                self.vertex_array_enabled = true;
                // SAFETY: `new`'s contract keeps the context current.
                unsafe { self.gl.enable_vertex_attrib_array(self.a_position) };
            }
        }
    }

    fn disable_client_state(&mut self, state: ClientState) {
        match state {
            ClientState::VertexArray => {
                self.vertex_array_enabled = false;
                // SAFETY: `new`'s contract keeps the context current.
                unsafe { self.gl.disable_vertex_attrib_array(self.a_position) };
            }
        }
    }

    fn vertex_pointer(&mut self, components: i32, source: VertexSource<'_>) {
        if components != 3 {
            log::error!("vertex_pointer with {components} components; only 3 is supported");
            return;
        }
        self.pointer = match source {
            VertexSource::Host(data) => VertexPointer::Host(data.to_vec()),
            VertexSource::Bound { offset } => match self.array_binding {
                Some(buffer) => VertexPointer::Bound { buffer, offset },
                None => {
                    log::error!("buffer-relative vertex pointer with no array buffer bound");
                    VertexPointer::Unset
                }
            },
        };
    }

    fn index_pointer(&mut self, offset: usize) {
        // Element offsets are passed per draw in the core profile.
        log::trace!("index pointer at byte {offset}");
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32) {
        if !self.vertex_array_enabled {
            log::error!("draw_arrays with the vertex array disabled; ignored");
            return;
        }
        if !Self::triangles_only(primitive, "draw_arrays") {
            return;
        }
        self.apply_uniforms();
        if self.apply_vertex_pointer() {
            // SAFETY: `new`'s contract keeps the context current.
            unsafe { self.gl.draw_arrays(glow::TRIANGLES, first, count) };
        }
        self.restore_array_binding();
    }

    fn draw_elements(&mut self, primitive: Primitive, count: i32, indices: IndexSource<'_>) {
        if !self.vertex_array_enabled {
            log::error!("draw_elements with the vertex array disabled; ignored");
            return;
        }
        if !Self::triangles_only(primitive, "draw_elements") {
            return;
        }
        self.apply_uniforms();
        if !self.apply_vertex_pointer() {
            self.restore_array_binding();
            return;
        }
        match indices {
            IndexSource::Host(data) => {
                // SAFETY: `new`'s contract keeps the context current.
                unsafe {
                    self.gl
                        .bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.stream_ebo));
                    self.gl.buffer_data_u8_slice(
                        glow::ELEMENT_ARRAY_BUFFER,
                        bytemuck::cast_slice(data),
                        glow::STREAM_DRAW,
                    );
                    self.gl
                        .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, 0);
                    self.gl.bind_buffer(
                        glow::ELEMENT_ARRAY_BUFFER,
                        self.native(self.element_binding),
                    );
                }
            }
            IndexSource::Bound { offset } => {
                if self.element_binding.is_none() {
                    log::error!("buffer-relative indices with no element buffer bound");
                } else {
                    // SAFETY: `new`'s contract keeps the context current.
                    unsafe {
                        self.gl.draw_elements(
                            glow::TRIANGLES,
                            count,
                            glow::UNSIGNED_SHORT,
                            gl_offset(offset),
                        );
                    }
                }
            }
        }
        self.restore_array_binding();
    }

    fn flush(&mut self) {
        // SAFETY: `new`'s contract keeps the context current.
        unsafe { self.gl.flush() };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_split_into_two_triangles() {
        let quad = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ];
        assert_eq!(
            quads_to_triangles(&quad),
            vec![quad[0], quad[1], quad[2], quad[0], quad[2], quad[3]]
        );
    }

    #[test]
    fn partial_quad_is_dropped() {
        let vertices = [[0.0; 3]; 6];
        assert_eq!(quads_to_triangles(&vertices).len(), 6);
    }

    #[test]
    fn targets_map_to_gl_enums() {
        assert_eq!(gl_target(BufferTarget::Array), glow::ARRAY_BUFFER);
        assert_eq!(
            gl_target(BufferTarget::ElementArray),
            glow::ELEMENT_ARRAY_BUFFER
        );
    }
}
