//! GLSL shader sources and compilation helpers for the fixed-function
//! emulation.
//!
//! All shaders target GLSL 1.40 (OpenGL 3.1), which is widely supported on
//! desktop platforms.

use glow::HasContext;

use crate::error::GlError;

/// Vertex shader standing in for the fixed-function transform stage.
///
/// # Uniforms
///
/// | Name    | Type   | Description                                   |
/// |---------|--------|-----------------------------------------------|
/// | `u_mvp` | `mat4` | Projection stack top × modelview stack top    |
pub const FLAT_VERTEX_SRC: &str = r"#version 140

in vec3 a_position;

uniform mat4 u_mvp;

void main() {
    gl_Position = u_mvp * vec4(a_position, 1.0);
}
";

/// Fragment shader standing in for flat, unlit `glColor` shading.
///
/// # Uniforms
///
/// | Name      | Type   | Description           |
/// |-----------|--------|-----------------------|
/// | `u_color` | `vec4` | Current draw colour   |
pub const FLAT_FRAGMENT_SRC: &str = r"#version 140

uniform vec4 u_color;

out vec4 frag_color;

void main() {
    frag_color = u_color;
}
";

/// Compile a shader program from vertex and fragment source strings.
///
/// The compiled shader objects are detached and deleted after successful
/// linking, so only the program handle needs to be cleaned up by the caller.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
///
/// # Errors
///
/// Returns [`GlError::ShaderCompile`] or [`GlError::ProgramLink`] with the
/// driver's info log.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, GlError> {
    let program =
        unsafe { gl.create_program() }.map_err(|e| GlError::creation("program", e))?;

    let vs = match unsafe { compile_shader(gl, glow::VERTEX_SHADER, vertex_src) } {
        Ok(vs) => vs,
        Err(err) => {
            unsafe { gl.delete_program(program) };
            return Err(err);
        }
    };
    let fs = match unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) } {
        Ok(fs) => fs,
        Err(err) => {
            unsafe {
                gl.delete_shader(vs);
                gl.delete_program(program);
            }
            return Err(err);
        }
    };

    unsafe {
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            gl.delete_shader(vs);
            gl.delete_shader(fs);
            return Err(GlError::ProgramLink(log));
        }

        // Shaders can be detached and deleted after successful linking.
        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
    }

    Ok(program)
}

/// Compile a single shader stage (vertex or fragment) from source.
///
/// # Safety
///
/// Requires a valid, current OpenGL context.
unsafe fn compile_shader(
    gl: &glow::Context,
    shader_type: u32,
    source: &str,
) -> Result<glow::Shader, GlError> {
    unsafe {
        let shader = gl
            .create_shader(shader_type)
            .map_err(|e| GlError::creation("shader", e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(GlError::ShaderCompile(log));
        }

        Ok(shader)
    }
}
