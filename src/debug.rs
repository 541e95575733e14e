//! GL debug output, routed into `tracing`.

use crate::gl::{
    self,
    types::{GLchar, GLenum, GLsizei, GLuint},
};

/// Route `GL_DEBUG_OUTPUT` messages into [`tracing`] events.
///
/// Severities map to levels: high is `error`, medium `warn`, low `info`,
/// notification `debug`. Synchronous output is enabled so a message fires
/// on the thread (and under the backtrace) of the offending call.
///
/// Create the context with a debug flag to be guaranteed messages; without
/// one the driver may stay silent.
///
/// # Safety
/// Crate contract.
pub unsafe fn install() {
    gl::Enable(gl::DEBUG_OUTPUT);
    gl::Enable(gl::DEBUG_OUTPUT_SYNCHRONOUS);
    gl::DebugMessageCallback(Some(callback), std::ptr::null());
}

fn source_name(source: GLenum) -> &'static str {
    match source {
        gl::DEBUG_SOURCE_API => "api",
        gl::DEBUG_SOURCE_WINDOW_SYSTEM => "window-system",
        gl::DEBUG_SOURCE_SHADER_COMPILER => "shader-compiler",
        gl::DEBUG_SOURCE_THIRD_PARTY => "third-party",
        gl::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    }
}

extern "system" fn callback(
    source: GLenum,
    _gltype: GLenum,
    id: GLuint,
    severity: GLenum,
    length: GLsizei,
    message: *const GLchar,
    _user_param: *mut std::ffi::c_void,
) {
    let message = if message.is_null() || length < 0 {
        String::new()
    } else {
        // Safety: the GL hands us `length` bytes, valid for the duration of
        // the callback.
        let bytes =
            unsafe { std::slice::from_raw_parts(message.cast::<u8>(), length as usize) };
        String::from_utf8_lossy(bytes).into_owned()
    };
    let source = source_name(source);

    match severity {
        gl::DEBUG_SEVERITY_HIGH => tracing::error!(target: "minigfx::gl", source, id, "{message}"),
        gl::DEBUG_SEVERITY_MEDIUM => tracing::warn!(target: "minigfx::gl", source, id, "{message}"),
        gl::DEBUG_SEVERITY_LOW => tracing::info!(target: "minigfx::gl", source, id, "{message}"),
        _ => tracing::debug!(target: "minigfx::gl", source, id, "{message}"),
    }
}
