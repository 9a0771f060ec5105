//! Fixed-function OpenGL demos over a pluggable graphics context.
//!
//! The crate draws a 729-instance grid of one mesh through six submission
//! pathways, selectable at runtime, and a small perspective scene of a loaded
//! model on a platform with quadric props and a text overlay.
//!
//! # Rendering modes
//!
//! | Mode                            | Vertex source          | Draw call       |
//! |---------------------------------|------------------------|-----------------|
//! | [`Immediate`]                   | per-vertex calls       | `begin`/`end`   |
//! | [`DisplayList`]                 | compiled list          | `call_list`     |
//! | [`VertexArray`]                 | host memory            | `draw_arrays`   |
//! | [`IndexedVertexArray`]          | host memory, indices   | `draw_elements` |
//! | [`VertexBufferObject`]          | GPU buffer             | `draw_arrays`   |
//! | [`IndexedVertexBufferObject`]   | GPU buffers            | `draw_elements` |
//!
//! Every mode produces the same picture for meshes whose vertex count is not
//! a multiple of three (see [`draw_immediate`](modes::draw_immediate)). GPU
//! resources for all of them are created once, so switching modes never
//! uploads data.
//!
//! # Contexts
//!
//! Everything draws through [`FixedFunctionGl`]. Two implementations ship:
//!
//! - [`Recorder`], a headless context that logs calls and checks handle and
//!   binding discipline, used by the tests;
//! - [`GlowContext`] (feature `glow`, on by default), which emulates the
//!   fixed-function calls on an OpenGL 3.1 core context via [glow].
//!
//! # Safety
//!
//! Creating a [`GlowContext`] requires a valid, current OpenGL context and is
//! `unsafe`. Once created, the context is driven through safe trait methods.
//!
//! [`Immediate`]: RenderingMode::Immediate
//! [`DisplayList`]: RenderingMode::DisplayList
//! [`VertexArray`]: RenderingMode::VertexArray
//! [`IndexedVertexArray`]: RenderingMode::IndexedVertexArray
//! [`VertexBufferObject`]: RenderingMode::VertexBufferObject
//! [`IndexedVertexBufferObject`]: RenderingMode::IndexedVertexBufferObject
//! [glow]: https://docs.rs/glow

pub mod context;
mod error;
pub mod mesh;
pub mod modes;
pub mod quadric;
pub mod recorder;
pub mod scene;
pub mod world;

#[cfg(feature = "glow")]
mod emulator;
#[cfg(feature = "glow")]
mod matrix;
#[cfg(feature = "glow")]
mod shaders;

pub use context::FixedFunctionGl;
#[cfg(feature = "glow")]
pub use emulator::GlowContext;
pub use error::{GlError, MeshError};
pub use mesh::Mesh;
pub use modes::{GpuResources, ParseModeError, RenderingMode, Submission};
pub use recorder::Recorder;
pub use scene::{MeshScene, SceneModel, SceneWorld, TextRenderer};
pub use world::RenderModeWorld;
