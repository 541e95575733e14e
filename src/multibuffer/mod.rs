//! Round-robin multi-buffers.
//!
//! Each wrapper here is `COUNT` (default 3) independent copies of a buffer
//! plus a cursor. Writes land in the copy under the cursor while the GPU is
//! still reading the previous ones; [`end_reading`](StaticMultiBuffer::end_reading)
//! fences the current copy and advances the cursor. With three slots the
//! CPU almost never stalls behind the GPU.

use crate::buffer::{BufferTarget, IndexedBufferTarget, MapFlags, StorageFlags};
use crate::fence::SyncPair;
use crate::{gl, GLEnum};

mod dynamic;
mod vector;

pub use dynamic::DynamicMultiBuffer;
pub use vector::MultiVector;

/// The shared plumbing: one GL buffer and fence pair per slot, plus the
/// cursor. Storage and mappings belong to the wrapper types.
struct Ring<const COUNT: usize> {
    names: [gl::types::GLuint; COUNT],
    sync: [SyncPair; COUNT],
    index: usize,
}

impl<const COUNT: usize> Ring<COUNT> {
    /// `glCreateBuffers` for every slot, with identical immutable storage.
    ///
    /// # Safety
    /// Crate contract, and `data` (when non-null) must point at `byte_len`
    /// readable bytes.
    unsafe fn create(
        byte_len: usize,
        data: *const std::ffi::c_void,
        flags: gl::types::GLbitfield,
    ) -> Self {
        let mut names = [0; COUNT];
        gl::CreateBuffers(COUNT as gl::types::GLsizei, names.as_mut_ptr());
        for &name in &names {
            gl::NamedBufferStorage(name, byte_len as gl::types::GLsizeiptr, data, flags);
        }
        Self {
            names,
            sync: std::array::from_fn(|_| SyncPair::new()),
            index: 0,
        }
    }

    fn current(&self) -> gl::types::GLuint {
        self.names[self.index]
    }

    fn begin_writing(&self) {
        self.sync[self.index].begin_writing();
    }
    fn end_writing(&self) {
        self.sync[self.index].end_writing();
    }
    fn end_reading(&mut self) {
        self.sync[self.index].end_reading();
        self.index = (self.index + 1) % COUNT;
    }

    fn bind(&self, target: BufferTarget) {
        unsafe { gl::BindBuffer(target.as_gl(), self.current()) };
    }
    fn bind_base(&self, target: IndexedBufferTarget, index: u32) {
        unsafe { gl::BindBufferBase(target.as_gl(), index, self.current()) };
    }

    /// Wait for every slot to go idle.
    fn wait_all(&self) {
        for sync in &self.sync {
            sync.begin_writing();
        }
    }

    /// Unmap and delete every slot. Callers must have waited first.
    ///
    /// # Safety
    /// Crate contract, and every slot must currently be mapped.
    unsafe fn release_mapped(&mut self) {
        for &name in &self.names {
            gl::UnmapNamedBuffer(name);
        }
        gl::DeleteBuffers(COUNT as gl::types::GLsizei, self.names.as_ptr());
    }
}

/// An OpenGL multi-buffer that is fixed in size.
///
/// Every slot is persistently mapped; [`Self::write`] memcpys into the slot
/// under the cursor.
pub struct StaticMultiBuffer<const COUNT: usize = 3> {
    ring: Ring<COUNT>,
    len: usize,
    ptrs: [*mut u8; COUNT],
}

impl<const COUNT: usize> StaticMultiBuffer<COUNT> {
    const MAP_FLAGS: MapFlags = MapFlags::persistent_write();

    /// Allocate `len` bytes per slot, contents uninitialized.
    ///
    /// # Safety
    /// Crate contract. GL reads of never-written ranges yield garbage.
    #[must_use]
    pub unsafe fn uninit(len: usize, flags: StorageFlags) -> Self {
        Self::with_data(len, std::ptr::null(), flags)
    }

    /// Allocate and fill every slot from `data`.
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn from_slice<T: bytemuck::Pod>(data: &[T], flags: StorageFlags) -> Self {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        Self::with_data(bytes.len(), bytes.as_ptr().cast(), flags)
    }

    unsafe fn with_data(
        len: usize,
        data: *const std::ffi::c_void,
        flags: StorageFlags,
    ) -> Self {
        let ring = Ring::create(len, data, flags.bits() | Self::MAP_FLAGS.bits());
        let ptrs = std::array::from_fn(|slot| unsafe {
            gl::MapNamedBufferRange(
                ring.names[slot],
                0,
                len as gl::types::GLsizeiptr,
                Self::MAP_FLAGS.bits(),
            )
            .cast()
        });
        Self { ring, len, ptrs }
    }

    /// Write `data` at `offset` bytes into the slot under the cursor.
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
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptrs[self.ring.index].add(offset),
                bytes.len(),
            );
        }
    }

    /// Size of each slot in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bind the slot under the cursor to the target specified.
    pub fn bind(&self, target: BufferTarget) {
        self.ring.bind(target);
    }
    /// Bind the slot under the cursor to a shader binding point.
    pub fn bind_base(&self, target: IndexedBufferTarget, index: u32) {
        self.ring.bind_base(target, index);
    }

    /// Prepare the slot under the cursor for writing, waiting on any
    /// unfinished use of it.
    pub fn begin_writing(&self) {
        self.ring.begin_writing();
    }
    /// Signal that the current slot is finished being written to.
    pub fn end_writing(&self) {
        self.ring.end_writing();
    }
    /// Signal that the current slot is finished being read from, and
    /// advance the cursor to the next slot.
    pub fn end_reading(&mut self) {
        self.ring.end_reading();
    }
}

impl<const COUNT: usize> Clone for StaticMultiBuffer<COUNT> {
    /// GPU-side copy, slot for slot.
    fn clone(&self) -> Self {
        let new = unsafe { Self::uninit(self.len, StorageFlags::dynamic_storage()) };
        for slot in 0..COUNT {
            unsafe {
                gl::CopyNamedBufferSubData(
                    self.ring.names[slot],
                    new.ring.names[slot],
                    0,
                    0,
                    self.len as gl::types::GLsizeiptr,
                );
            }
        }
        new
    }
}

impl<const COUNT: usize> Drop for StaticMultiBuffer<COUNT> {
    fn drop(&mut self) {
        self.ring.wait_all();
        unsafe { self.ring.release_mapped() };
    }
}
