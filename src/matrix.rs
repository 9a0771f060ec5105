//! CPU matrix stacks replacing `glPushMatrix`/`glPopMatrix`.

use glam::{Mat4, Vec3};

/// GL guarantees at least 32 modelview and 2 projection entries; we allow
/// the larger limit on both.
pub const MAX_DEPTH: usize = 32;

/// A matrix stack whose top is the current matrix.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Mat4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self {
            stack: vec![Mat4::IDENTITY],
        }
    }
}

impl MatrixStack {
    /// The current matrix.
    pub fn top(&self) -> Mat4 {
        *self.stack.last().unwrap_or(&Mat4::IDENTITY)
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        if self.stack.is_empty() {
            self.stack.push(Mat4::IDENTITY);
        }
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    /// Entries above the base matrix.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Duplicate the top. Overflow is logged and ignored, as GL ignores it.
    pub fn push(&mut self) {
        if self.depth() >= MAX_DEPTH {
            log::error!("matrix stack overflow; push ignored");
            return;
        }
        let top = self.top();
        self.stack.push(top);
    }

    /// Discard the top. Underflow is logged and ignored.
    pub fn pop(&mut self) {
        if self.depth() == 0 {
            log::error!("matrix stack underflow; pop ignored");
            return;
        }
        self.stack.pop();
    }

    /// Replace the top with the identity.
    pub fn load_identity(&mut self) {
        *self.top_mut() = Mat4::IDENTITY;
    }

    /// Right-multiply the top by `m`, so `m` applies to vertices first.
    pub fn multiply(&mut self, m: Mat4) {
        let top = self.top_mut();
        *top *= m;
    }

    /// `glTranslatef`
    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.multiply(Mat4::from_translation(Vec3::new(x, y, z)));
    }

    /// `glRotatef`. A zero axis leaves the matrix unchanged.
    pub fn rotate(&mut self, degrees: f32, x: f32, y: f32, z: f32) {
        if let Some(axis) = Vec3::new(x, y, z).try_normalize() {
            self.multiply(Mat4::from_axis_angle(axis, degrees.to_radians()));
        }
    }

    /// `glScalef`
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.multiply(Mat4::from_scale(Vec3::new(x, y, z)));
    }

    /// `glOrtho`
    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.multiply(Mat4::orthographic_rh_gl(left, right, bottom, top, near, far));
    }

    /// `gluPerspective`
    pub fn perspective(&mut self, fovy_degrees: f32, aspect: f32, near: f32, far: f32) {
        self.multiply(Mat4::perspective_rh_gl(
            fovy_degrees.to_radians(),
            aspect,
            near,
            far,
        ));
    }
}
