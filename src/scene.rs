//! The scene-viewer demo: an externally loaded model on a ground plane with
//! a platform, a cylinder and a sphere, plus an optional text overlay.
//!
//! Loading the model and rasterizing text belong to the host. They plug in
//! through [`SceneModel`] and [`TextRenderer`].

use std::sync::Arc;

use crate::context::{
    Capability, ClearMask, FixedFunctionGl, ListHandle, MatrixMode, Primitive, Shading, Winding,
};
use crate::error::GlError;
use crate::mesh::Mesh;
use crate::modes::draw_immediate;
use crate::quadric::{Cylinder, Sphere};
use crate::world::gl_size;

/// Vertical field of view, in degrees.
pub const FIELD_OF_VIEW: f32 = 50.0;

/// Near clipping plane.
pub const NEAR_PLANE: f32 = 0.5;

/// Far clipping plane.
pub const FAR_PLANE: f32 = 20_000.0;

/// Initial distance from the eye to the scene origin.
pub const DEFAULT_SCENE_DISTANCE: f32 = 50.0;

const GROUND_COLOR: [f32; 3] = [0.9, 0.95, 1.0];
const GROUND: [[f32; 3]; 4] = [
    [-17.0, 0.0, -10.0],
    [-17.0, 0.0, 13.0],
    [17.0, 0.0, 13.0],
    [17.0, 0.0, -10.0],
];

const PLATFORM_COLOR: [f32; 3] = [0.1, 0.53, 0.9];
const PLATFORM: [[f32; 3]; 4] = [
    [5.0, 0.01, -3.0],
    [5.0, 0.01, 4.0],
    [12.0, 0.01, 4.0],
    [12.0, 0.01, -3.0],
];

const PILLAR_COLOR: [f32; 3] = [0.8, 0.89, 1.0];
const OVERLAY_COLOR: [f32; 3] = [0.3, 0.3, 0.3];

/// Overlay lines occupy a `[0, OVERLAY_EXTENT]²` orthographic space, one
/// unit per line from the top.
const OVERLAY_EXTENT: f32 = 10.0;
const OVERLAY_MARGIN: f32 = 0.2;

/// A model the scene draws at its origin.
pub trait SceneModel {
    /// Create GPU objects. Called once from [`SceneWorld::initialize`].
    ///
    /// # Errors
    ///
    /// Returns the first resource creation failure.
    fn initialize(&mut self, gl: &mut dyn FixedFunctionGl) -> Result<(), GlError>;

    /// Draw at the current transform.
    fn draw(&mut self, gl: &mut dyn FixedFunctionGl);

    /// Delete GPU objects. Called at most once.
    fn release(&mut self, gl: &mut dyn FixedFunctionGl);
}

/// Draws a line of text at the current transform and colour.
pub trait TextRenderer {
    /// Draw `text` with its baseline starting at the local origin.
    fn draw_text(&mut self, gl: &mut dyn FixedFunctionGl, text: &str);
}

/// A [`SceneModel`] that compiles a [`Mesh`] into a display list.
#[derive(Debug)]
pub struct MeshScene {
    mesh: Arc<Mesh>,
    scale: f32,
    list: Option<ListHandle>,
}

impl MeshScene {
    /// Draw `mesh` uniformly scaled by `scale`.
    pub fn new(mesh: Arc<Mesh>, scale: f32) -> Self {
        Self {
            mesh,
            scale,
            list: None,
        }
    }
}

impl SceneModel for MeshScene {
    fn initialize(&mut self, gl: &mut dyn FixedFunctionGl) -> Result<(), GlError> {
        let list = gl.gen_list()?;
        self.list = Some(list);
        gl.new_list(list);
        draw_immediate(gl, &self.mesh);
        gl.end_list();
        Ok(())
    }

    fn draw(&mut self, gl: &mut dyn FixedFunctionGl) {
        let Some(list) = self.list else { return };
        gl.push_matrix();
        gl.scale(self.scale, self.scale, self.scale);
        gl.call_list(list);
        gl.pop_matrix();
    }

    fn release(&mut self, gl: &mut dyn FixedFunctionGl) {
        if let Some(list) = self.list.take() {
            gl.delete_list(list);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Ready,
    Failed,
    Released,
}

/// The scene viewer.
///
/// Same lifecycle as [`RenderModeWorld`](crate::RenderModeWorld):
/// initialize once, resize and draw freely, tear down once.
pub struct SceneWorld<G: FixedFunctionGl, S: SceneModel> {
    scene: S,
    x_rotation: f32,
    y_rotation: f32,
    scene_distance: f32,
    width: u32,
    height: u32,
    overlay: Vec<String>,
    text: Option<Box<dyn TextRenderer>>,
    gl: Option<G>,
    phase: Phase,
}

impl<G: FixedFunctionGl, S: SceneModel> SceneWorld<G, S> {
    /// A viewer for `scene` in a `width`×`height` window.
    pub fn new(scene: S, width: u32, height: u32) -> Self {
        Self {
            scene,
            x_rotation: 0.0,
            y_rotation: 0.0,
            scene_distance: DEFAULT_SCENE_DISTANCE,
            width,
            height,
            overlay: Vec::new(),
            text: None,
            gl: None,
            phase: Phase::Created,
        }
    }

    /// Draw `lines` in the top-left corner every frame using `text`.
    #[must_use]
    pub fn with_overlay(mut self, text: Box<dyn TextRenderer>, lines: Vec<String>) -> Self {
        self.text = Some(text);
        self.overlay = lines;
        self
    }

    /// Take the context, set depth testing and back-face culling, apply the
    /// projection for the size given to [`new`](Self::new), and initialize
    /// the scene model.
    ///
    /// # Errors
    ///
    /// Propagates the scene model's failure; [`teardown`](Self::teardown)
    /// still releases whatever it created.
    ///
    /// # Panics
    ///
    /// Panics if called more than once.
    pub fn initialize(&mut self, gl: G) -> Result<(), GlError> {
        assert_eq!(self.phase, Phase::Created, "scene initialized twice");
        let gl = self.gl.insert(gl);

        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.color(1.0, 0.0, 0.0);
        gl.shade_model(Shading::Flat);
        gl.enable(Capability::DepthTest);
        gl.enable(Capability::CullFace);
        gl.front_face(Winding::Ccw);
        Self::apply_projection(gl, self.width, self.height);

        match self.scene.initialize(gl) {
            Ok(()) => {
                self.phase = Phase::Ready;
                log::info!("scene world ready");
                Ok(())
            }
            Err(err) => {
                self.phase = Phase::Failed;
                log::error!("scene initialization failed: {err}");
                Err(err)
            }
        }
    }

    /// Set the viewport and perspective projection.
    ///
    /// # Panics
    ///
    /// Panics if the world has no context yet.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let gl = self.gl.as_mut().expect("resize before initialize");
        Self::apply_projection(gl, width, height);
    }

    #[expect(clippy::cast_precision_loss)]
    fn apply_projection(gl: &mut G, width: u32, height: u32) {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        gl.matrix_mode(MatrixMode::Projection);
        gl.load_identity();
        gl.perspective(FIELD_OF_VIEW, aspect, NEAR_PLANE, FAR_PLANE);
        gl.viewport(0, 0, gl_size(width), gl_size(height));
        gl.matrix_mode(MatrixMode::Modelview);
        gl.load_identity();
    }

    /// Draw one frame.
    ///
    /// # Panics
    ///
    /// Panics unless [`initialize`](Self::initialize) succeeded and
    /// [`teardown`](Self::teardown) has not run.
    pub fn draw(&mut self) {
        assert_eq!(self.phase, Phase::Ready, "draw on a scene that is not ready");
        let Some(gl) = self.gl.as_mut() else {
            unreachable!("ready scene without a context");
        };

        gl.clear(ClearMask::COLOR_DEPTH);
        gl.push_matrix();
        gl.translate(0.0, -0.01, -self.scene_distance);
        gl.rotate(self.x_rotation, 1.0, 0.0, 0.0);
        gl.rotate(self.y_rotation, 0.0, 1.0, 0.0);

        self.scene.draw(&mut *gl);

        draw_quad(&mut *gl, GROUND_COLOR, &GROUND);
        draw_quad(&mut *gl, PLATFORM_COLOR, &PLATFORM);

        gl.push_matrix();
        gl.rotate(-90.0, 1.0, 0.0, 0.0);
        gl.translate(-12.0, 0.0, 0.0);
        let [r, g, b] = PILLAR_COLOR;
        gl.color(r, g, b);
        Cylinder::new(4.0, 4.0, 7.0).render(&mut *gl);
        gl.pop_matrix();

        gl.push_matrix();
        gl.translate(-12.0, 7.0, 0.0);
        Sphere::new(4.0).render(&mut *gl);
        gl.pop_matrix();

        gl.pop_matrix();

        if let Some(text) = self.text.as_deref_mut() {
            if !self.overlay.is_empty() {
                draw_overlay(&mut *gl, text, &self.overlay);
            }
        }
        gl.flush();
    }

    /// Release the scene model. Safe to call more than once.
    pub fn teardown(&mut self) {
        match self.phase {
            Phase::Created | Phase::Released => return,
            Phase::Ready | Phase::Failed => {}
        }
        if let Some(gl) = self.gl.as_mut() {
            self.scene.release(gl);
        }
        self.phase = Phase::Released;
        log::debug!("scene world released");
    }

    /// Whether [`draw`](Self::draw) may be called.
    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    /// Whether the scene model may still own GPU objects.
    fn needs_teardown(&self) -> bool {
        matches!(self.phase, Phase::Ready | Phase::Failed)
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

    /// Distance from the eye to the scene origin.
    pub fn scene_distance(&self) -> f32 {
        self.scene_distance
    }

    /// Move the eye towards or away from the scene.
    pub fn set_scene_distance(&mut self, distance: f32) {
        self.scene_distance = distance;
    }

    /// Current window size.
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// The scene model.
    pub fn scene(&self) -> &S {
        &self.scene
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

impl<G: FixedFunctionGl, S: SceneModel> Drop for SceneWorld<G, S> {
    fn drop(&mut self) {
        if self.needs_teardown() {
            log::warn!("scene world dropped without teardown; GPU handles leaked");
        }
    }
}

fn draw_quad(gl: &mut dyn FixedFunctionGl, [r, g, b]: [f32; 3], corners: &[[f32; 3]; 4]) {
    gl.push_matrix();
    gl.color(r, g, b);
    gl.begin(Primitive::Quads);
    for &[x, y, z] in corners {
        gl.vertex(x, y, z);
    }
    gl.end();
    gl.pop_matrix();
}

/// Draw `lines` top-down in a temporary orthographic projection, leaving
/// both stacks as they were.
#[expect(clippy::cast_precision_loss)]
fn draw_overlay(gl: &mut dyn FixedFunctionGl, text: &mut dyn TextRenderer, lines: &[String]) {
    gl.matrix_mode(MatrixMode::Projection);
    gl.push_matrix();
    gl.load_identity();
    gl.ortho(0.0, OVERLAY_EXTENT, 0.0, OVERLAY_EXTENT, -1.0, 1.0);
    gl.matrix_mode(MatrixMode::Modelview);
    gl.push_matrix();
    gl.load_identity();

    let [r, g, b] = OVERLAY_COLOR;
    for (i, line) in lines.iter().enumerate() {
        gl.push_matrix();
        gl.translate(OVERLAY_MARGIN, OVERLAY_EXTENT - 1.0 - i as f32, 0.0);
        gl.color(r, g, b);
        text.draw_text(gl, line);
        gl.pop_matrix();
    }

    gl.pop_matrix();
    gl.matrix_mode(MatrixMode::Projection);
    gl.pop_matrix();
    gl.matrix_mode(MatrixMode::Modelview);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::recorder::{Command, Recorder};

    #[derive(Default)]
    struct Lines(Rc<RefCell<Vec<String>>>);

    impl TextRenderer for Lines {
        fn draw_text(&mut self, _gl: &mut dyn FixedFunctionGl, text: &str) {
            self.0.borrow_mut().push(text.to_owned());
        }
    }

    fn ready() -> SceneWorld<Recorder, MeshScene> {
        let scene = MeshScene::new(Arc::new(Mesh::car()), 3.0);
        let mut world = SceneWorld::new(scene, 800, 600);
        world.initialize(Recorder::new()).unwrap();
        world.resize(800, 600);
        world.context_mut().unwrap().clear_log();
        world
    }

    #[test]
    fn initialize_enables_depth_and_culling() {
        let scene = MeshScene::new(Arc::new(Mesh::car()), 1.0);
        let mut world: SceneWorld<Recorder, _> = SceneWorld::new(scene, 10, 10);
        world.initialize(Recorder::new()).unwrap();
        let commands = world.context().unwrap().commands();
        assert!(commands.contains(&Command::Enable(Capability::DepthTest)));
        assert!(commands.contains(&Command::Enable(Capability::CullFace)));
        assert!(commands.contains(&Command::FrontFace(Winding::Ccw)));
        assert!(commands.contains(&Command::ShadeModel(Shading::Flat)));
        assert_eq!(world.context().unwrap().live_lists().count(), 1);
    }

    #[test]
    fn resize_sets_perspective() {
        let mut world = ready();
        world.resize(400, 200);
        assert!(world.context().unwrap().commands().contains(&Command::Perspective {
            fovy: 50.0,
            aspect: 2.0,
            near: 0.5,
            far: 20_000.0,
        }));
        assert_eq!(world.size(), [400, 200]);
    }

    #[test]
    fn frame_is_balanced_and_positions_the_eye() {
        let mut world = ready();
        world.set_scene_distance(80.0);
        world.draw();
        let gl = world.context().unwrap();
        assert_eq!(gl.matrix_depth(MatrixMode::Modelview), 0);
        assert_eq!(
            &gl.commands()[..3],
            &[
                Command::Clear(ClearMask::COLOR_DEPTH),
                Command::PushMatrix,
                Command::Translate([0.0, -0.01, -80.0]),
            ]
        );
        assert_eq!(gl.commands().last(), Some(&Command::Flush));
    }

    #[test]
    fn frame_draws_model_quads_and_quadrics() {
        let mut world = ready();
        world.draw();
        let gl = world.context().unwrap();
        let quads = 2 + 20 * 20 + 20 * 20;
        // The car loses its final triangle to the immediate-mode loop bound.
        assert_eq!(gl.triangles(), 71 + quads * 2);
        assert!(gl.commands().contains(&Command::Color(GROUND_COLOR)));
        assert!(gl.commands().contains(&Command::Color(PLATFORM_COLOR)));
    }

    #[test]
    fn overlay_draws_every_line_and_restores_projection() {
        let drawn = Rc::new(RefCell::new(Vec::new()));
        let scene = MeshScene::new(Arc::new(Mesh::car()), 1.0);
        let lines = vec!["Scene viewer".to_owned(), "Drag to rotate".to_owned()];
        let mut world = SceneWorld::new(scene, 800, 600)
            .with_overlay(Box::new(Lines(Rc::clone(&drawn))), lines.clone());
        world.initialize(Recorder::new()).unwrap();
        world.resize(800, 600);
        world.draw();

        assert_eq!(*drawn.borrow(), lines);
        let gl = world.context().unwrap();
        assert_eq!(gl.matrix_depth(MatrixMode::Projection), 0);
        assert_eq!(gl.matrix_depth(MatrixMode::Modelview), 0);
        assert!(gl.commands().contains(&Command::Translate([0.2, 8.0, 0.0])));
    }

    #[test]
    fn teardown_releases_scene_once() {
        let mut world = ready();
        world.teardown();
        world.teardown();
        let gl = world.into_context().unwrap();
        assert_eq!(gl.deleted_lists().len(), 1);
        assert_eq!(gl.live_lists().count(), 0);
    }

    #[test]
    fn lifecycle_tracks_outstanding_release() {
        let scene = MeshScene::new(Arc::new(Mesh::car()), 1.0);
        let mut world: SceneWorld<Recorder, _> = SceneWorld::new(scene, 10, 10);
        assert!(!world.needs_teardown());
        world.initialize(Recorder::new()).unwrap();
        assert!(world.is_ready());
        assert!(world.needs_teardown());
        world.teardown();
        assert!(!world.is_ready());
        assert!(!world.needs_teardown());
    }

    #[test]
    fn failed_initialize_still_needs_teardown() {
        let scene = MeshScene::new(Arc::new(Mesh::car()), 1.0);
        let mut world: SceneWorld<Recorder, _> = SceneWorld::new(scene, 10, 10);
        assert!(world.initialize(Recorder::new().fail_after(0)).is_err());
        assert!(!world.is_ready());
        assert!(world.needs_teardown());
        let gl = world.into_context().unwrap();
        assert_eq!(gl.live_lists().count(), 0);
    }

    #[test]
    #[should_panic(expected = "not ready")]
    fn draw_before_initialize_panics() {
        let scene = MeshScene::new(Arc::new(Mesh::car()), 1.0);
        let mut world: SceneWorld<Recorder, _> = SceneWorld::new(scene, 10, 10);
        world.draw();
    }
}
