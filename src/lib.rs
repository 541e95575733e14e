//! # minigfx
//!
//! RAII companions for the direct-state-access face of OpenGL 4.6: fixed and
//! growable GPU buffers (single and round-robin multi-buffered, persistently
//! mapped, fence-synchronized), shader programs, images and textures, vertex
//! array models, indirect draw plumbing, and the small vector/matrix math
//! needed to feed them.
//!
//! Unlike typestate bindings, this crate leans on plain ownership: every
//! wrapper owns its GL objects outright and releases them on drop, after
//! waiting out any fences it put in flight. The cost of that convenience is
//! one global safety contract, stated once:
//!
//! ## Safety contract
//!
//! Every `unsafe fn` in this crate shares the same precondition, and every
//! safe method on a constructed object inherits it as an invariant the
//! constructor's caller promised to uphold:
//!
//! * A GL 4.6 core context is current on the calling thread, the [`gl`]
//!   module has been initialized against it with `gl::load_with`, and that
//!   same context is current whenever the object is touched - including the
//!   moment it is dropped.
//!
//! Nothing here is `Send` or `Sync`; a GL context isn't either.

#![warn(rustdoc::all)]

pub mod gl {
    #![doc(hidden)]
    #![allow(clippy::all)]
    include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
}

pub mod buffer;
pub mod debug;
pub mod draw;
mod fence;
pub mod image;
pub mod mat;
pub mod model;
pub mod multibuffer;
pub mod shader;
pub mod texture;
pub mod vec;

pub use buffer::{
    BufferTarget, DynamicBuffer, GpuVector, IndexedBufferTarget, MapFlags, StaticBuffer,
    StorageFlags,
};
pub use draw::{IndirectDraw, Topology};
pub use image::{FillPolicy, Image};
pub use mat::Mat4;
pub use model::{GroupEntry, Model, ModelGroup};
pub use multibuffer::{DynamicMultiBuffer, MultiVector, StaticMultiBuffer};
pub use shader::Shader;
pub use texture::{Filtering, Texture1D, Texture2D, Texture3D};
pub use vec::{IVec2, IVec3, IVec4, Vec2, Vec3, Vec4};

mod sealed {
    pub trait Sealed {}
}

/// Trait for rusty `GLenum`s.
///
/// # Safety
/// * Must be implemented only on enums.
/// * The enum must be `#[repr(u32)]`
/// * Every variant must be a correct constant of `GLenum`.
pub unsafe trait GLEnum {
    /// Access the raw `GLenum` value of this enum.
    fn as_gl(&self) -> gl::types::GLenum {
        unsafe { *std::ptr::from_ref(self).cast() }
    }
}

type NotSync = std::marker::PhantomData<std::cell::Cell<()>>;
