//! Shader program compilation, linking, and uniform upload.

use crate::gl::{
    self,
    types::{GLchar, GLenum, GLint, GLsizei, GLuint},
};
use crate::mat::Mat4;
use crate::vec::{Vec3, Vec4};
use crate::NotSync;

/// Failure modes for [`Shader::new`], each carrying the GL info log.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("vertex shader failed to compile: {0}")]
    CompileVertex(String),
    #[error("fragment shader failed to compile: {0}")]
    CompileFragment(String),
    #[error("program failed to link: {0}")]
    Link(String),
}

/// Fetch an info log through the paired `glGet*iv` / `glGet*InfoLog` calls.
///
/// # Safety
/// Crate contract; `name` must be a live object of the kind the two
/// function pointers expect.
unsafe fn info_log(
    name: GLuint,
    get_iv: unsafe fn(GLuint, GLenum, *mut GLint),
    fetch_log: unsafe fn(GLuint, GLsizei, *mut GLsizei, *mut GLchar),
) -> String {
    // Fetch the length of buffer to allocate (includes the nul terminator).
    let mut length: GLint = 0;
    get_iv(name, gl::INFO_LOG_LENGTH, std::ptr::addr_of_mut!(length));
    if length <= 0 {
        return String::new();
    }

    let mut bytes = vec![0u8; length as usize];
    // Out param becomes the written length, sans terminator.
    fetch_log(name, length, std::ptr::addr_of_mut!(length), bytes.as_mut_ptr().cast());
    bytes.truncate(length.max(0) as usize);
    String::from_utf8_lossy(&bytes).into_owned()
}

/// # Safety
/// Crate contract.
unsafe fn compile(stage: GLenum, source: &str) -> Result<GLuint, String> {
    let shader = gl::CreateShader(stage);
    let ptr = source.as_ptr().cast::<GLchar>();
    let len = source.len() as GLint;
    gl::ShaderSource(shader, 1, &ptr, &len);
    gl::CompileShader(shader);

    let mut status: GLint = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);
    if status == 0 {
        let log = info_log(shader, gl::GetShaderiv, gl::GetShaderInfoLog);
        gl::DeleteShader(shader);
        return Err(log);
    }
    Ok(shader)
}

/// A full OpenGL shader program: vertex and fragment stage, linked.
///
/// Construction fails loudly instead of yielding a half-valid program, so a
/// held `Shader` always binds. Move-only; dropped shaders delete both stage
/// objects and the program.
pub struct Shader {
    vertex: GLuint,
    fragment: GLuint,
    program: GLuint,
    log: String,
    _not_sync: NotSync,
}

impl Shader {
    /// Compile and link a program from vertex and fragment source.
    ///
    /// # Errors
    /// On compile or link failure, with the GL info log attached.
    ///
    /// # Safety
    /// Crate contract.
    pub unsafe fn new(vertex_source: &str, fragment_source: &str) -> Result<Self, ShaderError> {
        let vertex = compile(gl::VERTEX_SHADER, vertex_source).map_err(ShaderError::CompileVertex)?;
        let fragment = match compile(gl::FRAGMENT_SHADER, fragment_source) {
            Ok(fragment) => fragment,
            Err(log) => {
                gl::DeleteShader(vertex);
                return Err(ShaderError::CompileFragment(log));
            }
        };

        let program = gl::CreateProgram();
        gl::AttachShader(program, vertex);
        gl::AttachShader(program, fragment);
        gl::LinkProgram(program);

        // Kept even on success; drivers put warnings here.
        let log = info_log(program, gl::GetProgramiv, gl::GetProgramInfoLog);

        let mut status: GLint = 0;
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);
        if status == 0 {
            gl::DeleteShader(vertex);
            gl::DeleteShader(fragment);
            gl::DeleteProgram(program);
            return Err(ShaderError::Link(log));
        }

        gl::ValidateProgram(program);
        gl::DetachShader(program, vertex);
        gl::DetachShader(program, fragment);

        Ok(Self {
            vertex,
            fragment,
            program,
            log,
            _not_sync: std::marker::PhantomData,
        })
    }

    /// Bind this program to the current context for rendering.
    pub fn bind(&self) {
        unsafe { gl::UseProgram(self.program) };
    }

    /// Copy a value to a specific uniform location.
    ///
    /// Uses the `glProgramUniform*` family, so the program need not be
    /// bound.
    pub fn uniform<V: UniformValue>(&self, location: i32, value: &V) {
        value.apply(self.program, location);
    }

    /// Whatever the driver left in the link-time info log (warnings and the
    /// like); empty for a quiet link.
    #[must_use]
    pub fn info_log(&self) -> &str {
        &self.log
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteShader(self.vertex);
            gl::DeleteShader(self.fragment);
            gl::DeleteProgram(self.program);
        }
    }
}

/// Types that can be copied wholesale to a uniform location.
///
/// Sealed; implemented for [`f32`], [`Vec3`], [`Vec4`], and [`Mat4`].
pub trait UniformValue: crate::sealed::Sealed {
    #[doc(hidden)]
    fn apply(&self, program: GLuint, location: i32);
}

impl crate::sealed::Sealed for f32 {}
impl UniformValue for f32 {
    fn apply(&self, program: GLuint, location: i32) {
        unsafe { gl::ProgramUniform1fv(program, location, 1, std::ptr::from_ref(self)) };
    }
}

impl crate::sealed::Sealed for Vec3 {}
impl UniformValue for Vec3 {
    fn apply(&self, program: GLuint, location: i32) {
        unsafe { gl::ProgramUniform3fv(program, location, 1, self.as_array().as_ptr()) };
    }
}

impl crate::sealed::Sealed for Vec4 {}
impl UniformValue for Vec4 {
    fn apply(&self, program: GLuint, location: i32) {
        unsafe { gl::ProgramUniform4fv(program, location, 1, self.as_array().as_ptr()) };
    }
}

impl crate::sealed::Sealed for Mat4 {}
impl UniformValue for Mat4 {
    fn apply(&self, program: GLuint, location: i32) {
        unsafe {
            gl::ProgramUniformMatrix4fv(program, location, 1, gl::FALSE, self.as_array().as_ptr());
        }
    }
}
