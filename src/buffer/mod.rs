//! GPU-backed memory buffers: fixed, growable, and element-typed.
//!
//! Three wrappers share one shape: immutable storage allocated through
//! `glNamedBufferStorage`, a write/read fence pair for frame pipelining,
//! and deletion on drop.
//!
//! * [`StaticBuffer`] - fixed size, written through `glNamedBufferSubData`.
//! * [`DynamicBuffer`] - persistently mapped, grows to fit writes.
//! * [`GpuVector`] - a [`DynamicBuffer`] with an element type instead of
//!   bytes, indexable like a slice.
//!
//! The round-robin variants of all three live in [`crate::multibuffer`].

use crate::fence::SyncPair;
use crate::{gl, GLEnum};

mod dynamic;
mod vector;

pub use dynamic::DynamicBuffer;
pub use vector::GpuVector;

/// Buffer binding targets, for [`StaticBuffer::bind`] and friends.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    Array = gl::ARRAY_BUFFER,
    AtomicCounter = gl::ATOMIC_COUNTER_BUFFER,
    CopyRead = gl::COPY_READ_BUFFER,
    CopyWrite = gl::COPY_WRITE_BUFFER,
    DispatchIndirect = gl::DISPATCH_INDIRECT_BUFFER,
    DrawIndirect = gl::DRAW_INDIRECT_BUFFER,
    ElementArray = gl::ELEMENT_ARRAY_BUFFER,
    PixelPack = gl::PIXEL_PACK_BUFFER,
    PixelUnpack = gl::PIXEL_UNPACK_BUFFER,
    Query = gl::QUERY_BUFFER,
    ShaderStorage = gl::SHADER_STORAGE_BUFFER,
    Texture = gl::TEXTURE_BUFFER,
    TransformFeedback = gl::TRANSFORM_FEEDBACK_BUFFER,
    Uniform = gl::UNIFORM_BUFFER,
}
// Safety: is repr(u32) enum.
unsafe impl GLEnum for BufferTarget {}

/// The subset of targets with numbered binding points, for `bind_base`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexedBufferTarget {
    AtomicCounter = gl::ATOMIC_COUNTER_BUFFER,
    ShaderStorage = gl::SHADER_STORAGE_BUFFER,
    TransformFeedback = gl::TRANSFORM_FEEDBACK_BUFFER,
    Uniform = gl::UNIFORM_BUFFER,
}
// Safety: is repr(u32) enum.
unsafe impl GLEnum for IndexedBufferTarget {}

bitflags::bitflags! {
    /// `glNamedBufferStorage` flags.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StorageFlags: gl::types::GLbitfield {
        /// Allow `glNamedBufferSubData` writes after allocation.
        const DYNAMIC_STORAGE = gl::DYNAMIC_STORAGE_BIT;
        const MAP_READ = gl::MAP_READ_BIT;
        const MAP_WRITE = gl::MAP_WRITE_BIT;
        const MAP_PERSISTENT = gl::MAP_PERSISTENT_BIT;
        const MAP_COHERENT = gl::MAP_COHERENT_BIT;
        /// Prefer host-local over device-local memory.
        const CLIENT_STORAGE = gl::CLIENT_STORAGE_BIT;
    }
}

bitflags::bitflags! {
    /// `glMapNamedBufferRange` flags.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapFlags: gl::types::GLbitfield {
        const READ = gl::MAP_READ_BIT;
        const WRITE = gl::MAP_WRITE_BIT;
        /// Keep the mapping alive while the GL reads from the buffer.
        const PERSISTENT = gl::MAP_PERSISTENT_BIT;
        /// Writes become visible to the GL without an explicit flush.
        const COHERENT = gl::MAP_COHERENT_BIT;
        const INVALIDATE_RANGE = gl::MAP_INVALIDATE_RANGE_BIT;
        const INVALIDATE_BUFFER = gl::MAP_INVALIDATE_BUFFER_BIT;
        const FLUSH_EXPLICIT = gl::MAP_FLUSH_EXPLICIT_BIT;
        const UNSYNCHRONIZED = gl::MAP_UNSYNCHRONIZED_BIT;
    }
}

impl StorageFlags {
    /// The default for fixed-size buffers: plain `glNamedBufferSubData`
    /// writability, no mapping.
    pub const fn dynamic_storage() -> Self {
        Self::DYNAMIC_STORAGE
    }
}

impl MapFlags {
    /// Write-only persistent coherent mapping, the default for every mapped
    /// buffer in this crate.
    pub const fn persistent_write() -> Self {
        Self::WRITE.union(Self::PERSISTENT).union(Self::COHERENT)
    }

    /// The matching storage flags: the map bits themselves, plus
    /// `DYNAMIC_STORAGE` so immediate writes stay legal.
    pub(crate) const fn storage_bits(self) -> gl::types::GLbitfield {
        gl::DYNAMIC_STORAGE_BIT | self.bits()
    }
}

/// Amortized growth target for the growable buffers: the requested range
/// plus slack proportional to the write, so a stream of appends reallocates
/// O(log n) times.
pub(crate) fn grown_capacity(capacity: usize, offset: usize, len: usize) -> usize {
    capacity + offset + len * 2
}

/// `glCreateBuffers` + `glNamedBufferStorage` in one go.
///
/// # Safety
/// Crate contract, and `data` (when non-null) must point at `len` readable
/// bytes.
pub(crate) unsafe fn create_storage(
    len: usize,
    data: *const std::ffi::c_void,
    flags: gl::types::GLbitfield,
) -> gl::types::GLuint {
    let mut name = 0;
    gl::CreateBuffers(1, &mut name);
    gl::NamedBufferStorage(name, len as gl::types::GLsizeiptr, data, flags);
    name
}

/// An OpenGL buffer that is fixed in size.
///
/// Storage is immutable; contents are written with [`Self::write`]. Cloning
/// performs a GPU-side copy into fresh storage.
pub struct StaticBuffer {
    name: gl::types::GLuint,
    len: usize,
    flags: StorageFlags,
    sync: SyncPair,
}

impl StaticBuffer {
    /// Allocate `len` bytes, contents uninitialized.
    ///
    /// # Safety
    /// Crate contract. Additionally, GL reads of never-written ranges yield
    /// garbage - overwrite before sourcing draws from them.
    #[must_use]
    pub unsafe fn uninit(len: usize, flags: StorageFlags) -> Self {
        Self {
            name: create_storage(len, std::ptr::null(), flags.bits()),
            len,
            flags,
            sync: SyncPair::new(),
        }
    }

    /// Allocate and fill from `data`.
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn from_slice<T: bytemuck::Pod>(data: &[T], flags: StorageFlags) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        Self {
            name: create_storage(bytes.len(), bytes.as_ptr().cast(), flags.bits()),
            len: bytes.len(),
            flags,
            sync: SyncPair::new(),
        }
    }

    /// Write `data` to GPU memory at `offset` bytes from the beginning.
    ///
    /// Requires [`StorageFlags::DYNAMIC_STORAGE`].
    ///
    /// # Panics
    /// If the write range falls outside the buffer.
    pub fn write<T: bytemuck::Pod>(&mut self, offset: usize, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        assert!(
            offset + bytes.len() <= self.len,
            "write of {} bytes at {offset} overruns {} byte buffer",
            bytes.len(),
            self.len
        );
        unsafe {
            gl::NamedBufferSubData(
                self.name,
                offset as gl::types::GLintptr,
                bytes.len() as gl::types::GLsizeiptr,
                bytes.as_ptr().cast(),
            );
        }
    }

    /// Bind this buffer to the target specified.
    pub fn bind(&self, target: BufferTarget) {
        unsafe { gl::BindBuffer(target.as_gl(), self.name) };
    }

    /// Bind this buffer to a particular shader binding point.
    pub fn bind_base(&self, target: IndexedBufferTarget, index: u32) {
        unsafe { gl::BindBufferBase(target.as_gl(), index, self.name) };
    }

    /// Prepare this buffer for writing, waiting on any unfinished use.
    pub fn begin_writing(&self) {
        self.sync.begin_writing();
    }
    /// Signal that this buffer is finished being written to.
    pub fn end_writing(&self) {
        self.sync.end_writing();
    }
    /// Signal that this buffer is finished being read from.
    pub fn end_reading(&mut self) {
        self.sync.end_reading();
    }

    /// Size of this buffer in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The raw GL object name, for calls this crate does not wrap.
    #[must_use]
    pub fn name(&self) -> gl::types::GLuint {
        self.name
    }
}

impl Clone for StaticBuffer {
    /// GPU-side copy into fresh storage with the same flags.
    fn clone(&self) -> Self {
        let new = unsafe { Self::uninit(self.len, self.flags) };
        unsafe {
            gl::CopyNamedBufferSubData(
                self.name,
                new.name,
                0,
                0,
                self.len as gl::types::GLsizeiptr,
            );
        }
        new
    }
}

impl Drop for StaticBuffer {
    fn drop(&mut self) {
        unsafe { gl::DeleteBuffers(1, &self.name) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_is_amortized() {
        // Appending right at the boundary leaves slack for twice the write.
        assert_eq!(grown_capacity(256, 256, 64), 256 + 256 + 128);
        // A far-off write reserves through the hole.
        assert_eq!(grown_capacity(0, 1024, 16), 1024 + 32);
    }

    #[test]
    fn persistent_write_flags() {
        let flags = MapFlags::persistent_write();
        assert!(flags.contains(MapFlags::WRITE));
        assert!(flags.contains(MapFlags::PERSISTENT));
        assert!(flags.contains(MapFlags::COHERENT));
        assert!(!flags.contains(MapFlags::READ));
        // Storage derives the map bits plus immediate writability.
        assert_eq!(
            flags.storage_bits(),
            gl::DYNAMIC_STORAGE_BIT | flags.bits()
        );
    }
}
