//! The rendering-mode demo: a 9×9×9 grid of the same mesh, drawn through
//! whichever [`RenderingMode`] is selected.

use std::sync::Arc;

use crate::context::{ClearMask, FixedFunctionGl, MatrixMode, Shading, Winding};
use crate::error::GlError;
use crate::mesh::Mesh;
use crate::modes::{GpuResources, RenderingMode};

/// Grid cells run from `-GRID_EXTENT` to `GRID_EXTENT` on each axis.
pub const GRID_EXTENT: i32 = 4;

/// Distance between neighbouring instances.
pub const GRID_SPACING: f32 = 20.0;

/// Uniform scale applied to every instance.
pub const INSTANCE_SCALE: f32 = 10.0;

/// Half-extent of the orthographic view volume along the shorter window
/// axis, and of the depth range.
pub const ORTHO_RANGE: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Ready,
    Failed,
    Released,
}

/// Orthographic `[left, right, bottom, top]` for a window, keeping
/// [`ORTHO_RANGE`] along the shorter axis. Zero sizes are treated as 1.
#[expect(clippy::cast_precision_loss)]
pub fn ortho_extents(width: u32, height: u32) -> [f32; 4] {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let r = ORTHO_RANGE;
    if w <= h {
        [-r, r, -r * h / w, r * h / w]
    } else {
        [-r * w / h, r * w / h, -r, r]
    }
}

/// Owns the mesh, the selected mode, the view rotation and every GPU handle
/// the modes draw from.
///
/// Lifecycle: [`initialize`](Self::initialize) once, then any mix of
/// [`resize`](Self::resize) and [`draw`](Self::draw), then
/// [`teardown`](Self::teardown). Drawing before a successful initialization
/// panics. Handles are never released from `Drop`; a world dropped without
/// `teardown` logs the leak.
///
/// # Example
///
/// ```
/// use glow_render_modes::{Mesh, Recorder, RenderModeWorld, RenderingMode};
/// use std::sync::Arc;
///
/// let mut world = RenderModeWorld::new(Arc::new(Mesh::car()));
/// world.initialize(Recorder::new()).unwrap();
/// world.resize(800, 600);
/// world.set_selected_mode(RenderingMode::IndexedVertexBufferObject);
/// world.draw();
/// world.teardown();
/// ```
pub struct RenderModeWorld<G: FixedFunctionGl> {
    mesh: Arc<Mesh>,
    selected_mode: RenderingMode,
    x_rotation: f32,
    y_rotation: f32,
    size: Option<[u32; 2]>,
    gl: Option<G>,
    resources: GpuResources,
    phase: Phase,
}

impl<G: FixedFunctionGl> RenderModeWorld<G> {
    /// A world drawing `mesh`, starting in [`RenderingMode::Immediate`].
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self {
            mesh,
            selected_mode: RenderingMode::default(),
            x_rotation: 0.0,
            y_rotation: 0.0,
            size: None,
            gl: None,
            resources: GpuResources::default(),
            phase: Phase::Created,
        }
    }

    /// Take ownership of the context, set fixed state, and create the
    /// display list and buffers for all six modes.
    ///
    /// # Errors
    ///
    /// Returns the first resource creation failure. The world keeps the
    /// context and whatever was created; [`teardown`](Self::teardown)
    /// releases it.
    ///
    /// # Panics
    ///
    /// Panics if called more than once.
    pub fn initialize(&mut self, gl: G) -> Result<(), GlError> {
        assert_eq!(self.phase, Phase::Created, "world initialized twice");
        let gl = self.gl.insert(gl);

        gl.shade_model(Shading::Flat);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.color(1.0, 0.0, 0.0);
        gl.front_face(Winding::Ccw);

        match self.resources.create(gl, &self.mesh) {
            Ok(()) => {
                self.phase = Phase::Ready;
                log::info!(
                    "render-mode world ready: {} triangles per instance",
                    self.mesh.triangle_count()
                );
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Failed;
                log::error!("render-mode world initialization failed: {err}");
                Err(err)
            }
        }
    }

    /// Set the viewport and an aspect-corrected orthographic projection.
    ///
    /// # Panics
    ///
    /// Panics if the world has no context yet.
    pub fn resize(&mut self, width: u32, height: u32) {
        let gl = self.gl.as_mut().expect("resize before initialize");
        let [left, right, bottom, top] = ortho_extents(width, height);

        gl.viewport(0, 0, gl_size(width), gl_size(height));
        gl.matrix_mode(MatrixMode::Projection);
        gl.load_identity();
        gl.ortho(left, right, bottom, top, -ORTHO_RANGE, ORTHO_RANGE);
        gl.matrix_mode(MatrixMode::Modelview);
        gl.load_identity();

        self.size = Some([width, height]);
    }

    /// Draw one frame: the whole grid, rotated by the current angles.
    ///
    /// Skipped with a warning if [`resize`](Self::resize) has not set a
    /// projection yet.
    ///
    /// # Panics
    ///
    /// Panics unless [`initialize`](Self::initialize) succeeded and
    /// [`teardown`](Self::teardown) has not run.
    pub fn draw(&mut self) {
        assert_eq!(self.phase, Phase::Ready, "draw on a world that is not ready");
        let Some(gl) = self.gl.as_mut() else {
            unreachable!("ready world without a context");
        };
        if self.size.is_none() {
            log::warn!("draw before resize; skipping frame");
            return;
        }
        let submission = self
            .resources
            .submission(self.selected_mode)
            .expect("ready world holds every handle");

        gl.clear(ClearMask::COLOR_DEPTH);
        gl.push_matrix();
        gl.rotate(self.x_rotation, 1.0, 0.0, 0.0);
        gl.rotate(self.y_rotation, 0.0, 1.0, 0.0);

        for i in -GRID_EXTENT..=GRID_EXTENT {
            for j in -GRID_EXTENT..=GRID_EXTENT {
                for k in -GRID_EXTENT..=GRID_EXTENT {
                    #[expect(clippy::cast_precision_loss)]
                    let (x, y, z) = (i as f32, k as f32, j as f32);
                    gl.push_matrix();
                    gl.translate(x * GRID_SPACING, y * GRID_SPACING, z * GRID_SPACING);
                    gl.scale(INSTANCE_SCALE, INSTANCE_SCALE, INSTANCE_SCALE);
                    submission.submit(&mut *gl, &self.mesh);
                    gl.pop_matrix();
                }
            }
        }

        gl.pop_matrix();
        gl.flush();
    }

    /// Release every GPU handle this world created. Safe to call more than
    /// once and before or after a failed initialization.
    pub fn teardown(&mut self) {
        match self.phase {
            Phase::Created | Phase::Released => return,
            Phase::Ready | Phase::Failed => {}
        }
        if let Some(gl) = self.gl.as_mut() {
            self.resources.release(gl);
        }
        self.phase = Phase::Released;
        log::debug!("render-mode world released");
    }

    /// The mode the next [`draw`](Self::draw) uses.
    pub fn selected_mode(&self) -> RenderingMode {
        self.selected_mode
    }

    /// Switch modes. Takes effect on the next frame; nothing is uploaded.
    pub fn set_selected_mode(&mut self, mode: RenderingMode) {
        if mode != self.selected_mode {
            log::info!("rendering mode: {mode}");
        }
        self.selected_mode = mode;
    }

    /// Rotation around the X axis, in degrees.
    pub fn rotation_x(&self) -> f32 {
        self.x_rotation
    }

    /// Set the rotation around the X axis, in degrees.
    pub fn set_rotation_x(&mut self, degrees: f32) {
        self.x_rotation = degrees;
    }

    /// Rotation around the Y axis, in degrees.
    pub fn rotation_y(&self) -> f32 {
        self.y_rotation
    }

    /// Set the rotation around the Y axis, in degrees.
    pub fn set_rotation_y(&mut self, degrees: f32) {
        self.y_rotation = degrees;
    }

    /// Add to both rotation angles.
    pub fn rotate_by(&mut self, dx: f32, dy: f32) {
        self.x_rotation += dx;
        self.y_rotation += dy;
    }

    /// The mesh every instance draws.
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Whether [`draw`](Self::draw) may be called.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// The context, once initialized.
    pub fn context(&self) -> Option<&G> {
        self.gl.as_ref()
    }

    /// The context, once initialized.
    pub fn context_mut(&mut self) -> Option<&mut G> {
        self.gl.as_mut()
    }

    /// Tear down and hand the context back.
    pub fn into_context(mut self) -> Option<G> {
        self.teardown();
        self.gl.take()
    }
}

impl<G: FixedFunctionGl> Drop for RenderModeWorld<G> {
    fn drop(&mut self) {
        if !self.resources.is_empty() {
            log::warn!("render-mode world dropped without teardown; GPU handles leaked");
        }
    }
}

/// Convert a window dimension to the `i32` GL expects.
///
/// # Panics
///
/// Panics if `value > i32::MAX`.
pub(crate) fn gl_size(value: u32) -> i32 {
    i32::try_from(value).expect("dimension exceeds i32::MAX")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::context::BufferTarget;
    use crate::recorder::{Command, Recorder};

    fn ready_world(mode: RenderingMode) -> RenderModeWorld<Recorder> {
        let mut world = RenderModeWorld::new(Arc::new(Mesh::car()));
        world.initialize(Recorder::new()).unwrap();
        world.resize(640, 480);
        world.set_selected_mode(mode);
        world.context_mut().unwrap().clear_log();
        world
    }

    #[test]
    fn grid_pushes_and_pops_balance() {
        let mut world = ready_world(RenderingMode::VertexBufferObject);
        world.draw();
        let gl = world.context().unwrap();

        let pushes = gl.commands().iter().filter(|c| **c == Command::PushMatrix).count();
        let pops = gl.commands().iter().filter(|c| **c == Command::PopMatrix).count();
        assert_eq!(pushes, 9 * 9 * 9 + 1);
        assert_eq!(pops, pushes);
        assert_eq!(gl.matrix_depth(MatrixMode::Modelview), 0);
    }

    #[test]
    fn frame_starts_with_clear_and_rotations_and_ends_with_flush() {
        let mut world = ready_world(RenderingMode::Immediate);
        world.set_rotation_x(30.0);
        world.set_rotation_y(-15.0);
        world.draw();
        let commands = world.context().unwrap().commands();

        assert_eq!(
            &commands[..4],
            &[
                Command::Clear(ClearMask::COLOR_DEPTH),
                Command::PushMatrix,
                Command::Rotate {
                    degrees: 30.0,
                    axis: [1.0, 0.0, 0.0]
                },
                Command::Rotate {
                    degrees: -15.0,
                    axis: [0.0, 1.0, 0.0]
                },
            ]
        );
        assert_eq!(
            &commands[commands.len() - 2..],
            &[Command::PopMatrix, Command::Flush]
        );
    }

    #[test]
    fn first_cell_is_translated_then_scaled() {
        let mut world = ready_world(RenderingMode::DisplayList);
        world.draw();
        let commands = world.context().unwrap().commands();
        assert_eq!(
            &commands[4..7],
            &[
                Command::PushMatrix,
                Command::Translate([-80.0, -80.0, -80.0]),
                Command::Scale([10.0, 10.0, 10.0]),
            ]
        );
        // k varies fastest and maps to Y.
        assert!(commands.contains(&Command::Translate([-80.0, -60.0, -80.0])));
    }

    #[test]
    fn every_mode_draws_the_whole_grid_and_leaves_nothing_bound() {
        let mesh = Mesh::from_flat((0..300u16).map(f32::from).collect()).unwrap();
        for mode in RenderingMode::ALL {
            let mut world = RenderModeWorld::new(Arc::new(mesh.clone()));
            world.initialize(Recorder::new()).unwrap();
            world.resize(100, 100);
            world.set_selected_mode(mode);
            world.context_mut().unwrap().clear_log();
            world.draw();

            let gl = world.context().unwrap();
            assert_eq!(gl.triangles(), 729 * 33, "{mode}");
            assert_eq!(gl.bound_buffer(BufferTarget::Array), None, "{mode}");
            assert_eq!(gl.bound_buffer(BufferTarget::ElementArray), None, "{mode}");
            assert!(!gl.client_state_enabled(), "{mode}");
            world.teardown();
        }
    }

    #[test]
    fn switching_modes_uploads_nothing() {
        let mut world = ready_world(RenderingMode::Immediate);
        for mode in RenderingMode::ALL {
            world.set_selected_mode(mode);
            world.draw();
        }
        let gl = world.context().unwrap();
        assert!(!gl.commands().iter().any(|c| matches!(
            c,
            Command::GenBuffer(_) | Command::GenList(_) | Command::BufferData { .. }
        )));
    }

    #[test]
    fn no_draw_before_projection() {
        let mut world = RenderModeWorld::new(Arc::new(Mesh::car()));
        world.initialize(Recorder::new()).unwrap();
        world.draw();
        assert!(!world
            .context()
            .unwrap()
            .commands()
            .iter()
            .any(|c| c.is_draw() || *c == Command::Clear(ClearMask::COLOR_DEPTH)));

        world.resize(320, 240);
        world.draw();
        let commands = world.context().unwrap().commands();
        let projection = commands
            .iter()
            .position(|c| matches!(c, Command::Ortho(_)))
            .unwrap();
        let first_draw = commands.iter().position(Command::is_draw).unwrap();
        assert!(projection < first_draw);
    }

    #[test]
    fn resize_corrects_for_aspect() {
        assert_eq!(ortho_extents(200, 100), [-200.0, 200.0, -100.0, 100.0]);
        assert_eq!(ortho_extents(100, 200), [-100.0, 100.0, -200.0, 200.0]);
        assert_eq!(ortho_extents(0, 0), [-100.0, 100.0, -100.0, 100.0]);

        let mut world = ready_world(RenderingMode::Immediate);
        world.resize(200, 100);
        assert_eq!(
            world.context().unwrap().commands(),
            &[
                Command::Viewport([0, 0, 200, 100]),
                Command::MatrixMode(MatrixMode::Projection),
                Command::LoadIdentity,
                Command::Ortho([-200.0, 200.0, -100.0, 100.0, -100.0, 100.0]),
                Command::MatrixMode(MatrixMode::Modelview),
                Command::LoadIdentity,
            ]
        );
    }

    #[test]
    fn teardown_deletes_each_handle_once() {
        let mut world = ready_world(RenderingMode::Immediate);
        world.teardown();
        world.teardown();

        let gl = world.context().unwrap();
        assert_eq!(gl.deleted_lists().len(), 1);
        assert_eq!(gl.deleted_buffers().len(), 3);
        assert!(gl.live_buffers().is_empty());
        assert_eq!(gl.live_lists().count(), 0);
        assert!(!world.is_ready());
    }

    #[test]
    fn teardown_after_failed_initialize_releases_partial_handles() {
        let mut world = RenderModeWorld::new(Arc::new(Mesh::car()));
        assert!(world.initialize(Recorder::new().fail_after(2)).is_err());
        assert!(!world.is_ready());

        let gl = world.into_context().unwrap();
        assert_eq!(gl.deleted_lists().len(), 1);
        assert_eq!(gl.deleted_buffers().len(), 1);
        assert!(gl.live_buffers().is_empty());
    }

    #[test]
    fn initialize_selects_flat_shading_first() {
        let mut world = RenderModeWorld::new(Arc::new(Mesh::car()));
        world.initialize(Recorder::new()).unwrap();
        let commands = world.context().unwrap().commands();
        assert_eq!(commands[0], Command::ShadeModel(Shading::Flat));
        assert!(commands.contains(&Command::FrontFace(Winding::Ccw)));
        world.teardown();
    }

    #[test]
    fn teardown_before_initialize_is_a_no_op() {
        let mut world: RenderModeWorld<Recorder> = RenderModeWorld::new(Arc::new(Mesh::car()));
        world.teardown();
        assert!(world.context().is_none());
    }

    #[test]
    #[should_panic(expected = "not ready")]
    fn draw_before_initialize_panics() {
        let mut world: RenderModeWorld<Recorder> = RenderModeWorld::new(Arc::new(Mesh::car()));
        world.draw();
    }

    #[test]
    #[should_panic(expected = "not ready")]
    fn draw_after_teardown_panics() {
        let mut world = ready_world(RenderingMode::Immediate);
        world.teardown();
        world.draw();
    }

    #[test]
    #[should_panic(expected = "initialized twice")]
    fn double_initialize_panics() {
        let mut world = ready_world(RenderingMode::Immediate);
        let _ = world.initialize(Recorder::new());
    }

    #[test]
    fn rotate_by_accumulates() {
        let mut world: RenderModeWorld<Recorder> = RenderModeWorld::new(Arc::new(Mesh::car()));
        world.rotate_by(5.0, -10.0);
        world.rotate_by(5.0, -10.0);
        assert!((world.rotation_x() - 10.0).abs() < f32::EPSILON);
        assert!((world.rotation_y() + 20.0).abs() < f32::EPSILON);
    }
}
