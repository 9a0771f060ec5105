//! The fixed-function graphics boundary.
//!
//! Both demo worlds draw exclusively through [`FixedFunctionGl`]. It mirrors
//! the legacy OpenGL 1.x/1.5 entry points the demos need: matrix stacks,
//! immediate mode, display lists, client-side vertex arrays and buffer
//! objects. Implementations are [`Recorder`](crate::Recorder) (headless) and,
//! with the `glow` feature, [`GlowContext`](crate::GlowContext).

use std::fmt;
use std::num::NonZeroU32;

use crate::error::GlError;

/// Name of a compiled display list.
///
/// Zero is never a valid name, so `Option<ListHandle>` is the same size as
/// the raw GL name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListHandle(pub NonZeroU32);

/// Name of a buffer object. Binding `None` is the unbound sentinel `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub NonZeroU32);

impl fmt::Display for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "list#{}", self.0)
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Primitive assembled from vertices between `begin` and `end`, or by a
/// draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    /// Independent triangles, three vertices each.
    Triangles,
    /// Independent quads, four vertices each.
    Quads,
}

impl Primitive {
    /// Number of whole triangles produced from `vertex_count` vertices.
    pub fn triangles(self, vertex_count: usize) -> usize {
        match self {
            Primitive::Triangles => vertex_count / 3,
            Primitive::Quads => vertex_count / 4 * 2,
        }
    }
}

/// Buffer binding point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`: vertex attribute data.
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`: index data.
    ElementArray,
}

/// Which matrix stack subsequent transform calls affect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixMode {
    /// `GL_PROJECTION`
    Projection,
    /// `GL_MODELVIEW`
    Modelview,
}

/// Server-side capability toggled with `enable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// `GL_DEPTH_TEST`
    DepthTest,
    /// `GL_CULL_FACE` (back faces)
    CullFace,
}

/// Colour interpolation across a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// One colour per primitive.
    Flat,
    /// Colours interpolated between vertices (the GL default).
    Smooth,
}

/// Front-face winding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    /// Counter-clockwise (the GL default).
    Ccw,
    /// Clockwise.
    Cw,
}

/// Client-side array enabled with `enable_client_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// `GL_VERTEX_ARRAY`
    VertexArray,
}

/// Buffers cleared by `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearMask {
    /// Clear the colour buffer.
    pub color: bool,
    /// Clear the depth buffer.
    pub depth: bool,
}

impl ClearMask {
    /// Colour and depth, the mask both demos clear with every frame.
    pub const COLOR_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// Where `vertex_pointer` reads vertex positions from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexSource<'a> {
    /// Client memory, read at draw time.
    Host(&'a [f32]),
    /// Byte offset into the buffer currently bound to [`BufferTarget::Array`].
    Bound {
        /// Offset in bytes.
        offset: usize,
    },
}

/// Where `draw_elements` reads `u16` indices from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndexSource<'a> {
    /// Client memory.
    Host(&'a [u16]),
    /// Byte offset into the buffer bound to [`BufferTarget::ElementArray`].
    Bound {
        /// Offset in bytes.
        offset: usize,
    },
}

/// A fixed-function OpenGL context.
///
/// Calls follow legacy GL semantics: binding, client state and the matrix
/// stacks are process-wide state that persists across calls until changed.
/// Only resource generation can fail; everything else is assumed to succeed
/// and errors the driver would flag are handled by the implementation.
///
/// The trait is object safe so scene collaborators can take
/// `&mut dyn FixedFunctionGl`.
pub trait FixedFunctionGl {
    /// Set the colour `clear` fills the colour buffer with.
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    /// Clear the selected buffers.
    fn clear(&mut self, mask: ClearMask);
    /// Set the current draw colour.
    fn color(&mut self, r: f32, g: f32, b: f32);
    /// Enable a capability.
    fn enable(&mut self, capability: Capability);
    /// Select flat or smooth shading.
    fn shade_model(&mut self, shading: Shading);
    /// Select which winding is front-facing.
    fn front_face(&mut self, winding: Winding);
    /// Set the viewport rectangle in window pixels.
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);

    /// Select the matrix stack subsequent transform calls modify.
    fn matrix_mode(&mut self, mode: MatrixMode);
    /// Replace the top of the current stack with the identity.
    fn load_identity(&mut self);
    /// Duplicate the top of the current stack.
    fn push_matrix(&mut self);
    /// Discard the top of the current stack.
    fn pop_matrix(&mut self);
    /// Multiply the current matrix by a translation.
    fn translate(&mut self, x: f32, y: f32, z: f32);
    /// Multiply the current matrix by a rotation of `degrees` around `(x, y, z)`.
    fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32);
    /// Multiply the current matrix by a scale.
    fn scale(&mut self, x: f32, y: f32, z: f32);
    /// Multiply the current matrix by an orthographic projection.
    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32);
    /// Multiply the current matrix by a perspective projection (`gluPerspective`).
    fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32);

    /// Start an immediate-mode primitive.
    fn begin(&mut self, primitive: Primitive);
    /// Emit one vertex of the current primitive.
    fn vertex(&mut self, x: f32, y: f32, z: f32);
    /// Finish the current primitive.
    fn end(&mut self);

    /// Reserve a display list name.
    ///
    /// # Errors
    ///
    /// Returns [`GlError::ResourceCreation`] if no name is available.
    fn gen_list(&mut self) -> Result<ListHandle, GlError>;
    /// Start compiling commands into `list` (`GL_COMPILE`).
    fn new_list(&mut self, list: ListHandle);
    /// Stop compiling the current list.
    fn end_list(&mut self);
    /// Replay a compiled list.
    fn call_list(&mut self, list: ListHandle);
    /// Delete a list.
    fn delete_list(&mut self, list: ListHandle);

    /// Reserve a buffer object name.
    ///
    /// # Errors
    ///
    /// Returns [`GlError::ResourceCreation`] if the buffer cannot be created.
    fn gen_buffer(&mut self) -> Result<BufferHandle, GlError>;
    /// Bind `buffer` to `target`, or unbind with `None`.
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferHandle>);
    /// Upload `data` (`GL_STATIC_DRAW`) into the buffer bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]);
    /// Delete a buffer; deleting a bound buffer unbinds it.
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Enable a client-side array.
    fn enable_client_state(&mut self, state: ClientState);
    /// Disable a client-side array.
    fn disable_client_state(&mut self, state: ClientState);
    /// Point the vertex array at `source`, `components` floats per vertex.
    fn vertex_pointer(&mut self, components: i32, source: VertexSource<'_>);
    /// Point the index array at a byte offset in the bound element buffer.
    fn index_pointer(&mut self, offset: usize);

    /// Draw `count` vertices from the vertex array starting at `first`.
    fn draw_arrays(&mut self, primitive: Primitive, first: i32, count: i32);
    /// Draw `count` indexed vertices from the vertex array.
    fn draw_elements(&mut self, primitive: Primitive, count: i32, indices: IndexSource<'_>);

    /// Flush queued commands to the GPU.
    fn flush(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_yield_two_triangles_per_whole_quad() {
        assert_eq!(Primitive::Quads.triangles(4), 2);
        assert_eq!(Primitive::Quads.triangles(7), 2);
        assert_eq!(Primitive::Quads.triangles(8), 4);
    }

    #[test]
    fn triangles_drop_partial_trailing_vertices() {
        assert_eq!(Primitive::Triangles.triangles(99), 33);
        assert_eq!(Primitive::Triangles.triangles(100), 33);
        assert_eq!(Primitive::Triangles.triangles(2), 0);
    }

    #[test]
    fn optional_handles_are_niche_optimised() {
        assert_eq!(
            std::mem::size_of::<Option<BufferHandle>>(),
            std::mem::size_of::<u32>()
        );
    }
}
