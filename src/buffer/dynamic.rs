//! A growable, persistently-mapped buffer.

use super::{grown_capacity, BufferTarget, IndexedBufferTarget, MapFlags};
use crate::fence::SyncPair;
use crate::{gl, GLEnum};

/// An OpenGL memory buffer which can expand in size.
///
/// The buffer is mapped once at creation and stays mapped; [`Self::write`]
/// is a memcpy into GPU-visible memory. Growth replaces the storage: a new
/// buffer is allocated, the old contents are copied GPU-side (after waiting
/// out both fences, since the old mapping dies), and the mapping moves over.
pub struct DynamicBuffer {
    name: gl::types::GLuint,
    capacity: usize,
    map_flags: MapFlags,
    ptr: *mut u8,
    sync: SyncPair,
}

impl DynamicBuffer {
    /// Starting capacity when none is given.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Construct with [`MapFlags::persistent_write`] mapping.
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn new(capacity: usize) -> Self {
        Self::with_flags(capacity, MapFlags::persistent_write())
    }

    /// Construct with explicit map flags.
    ///
    /// # Safety
    /// Crate contract, and `map_flags` must form a valid persistent mapping
    /// (at least one of `READ`/`WRITE`, plus `PERSISTENT`).
    #[must_use]
    pub unsafe fn with_flags(capacity: usize, map_flags: MapFlags) -> Self {
        debug_assert!(capacity > 0, "cannot map a zero-byte buffer");
        let name = super::create_storage(capacity, std::ptr::null(), map_flags.storage_bits());
        let ptr = gl::MapNamedBufferRange(
            name,
            0,
            capacity as gl::types::GLsizeiptr,
            map_flags.bits(),
        )
        .cast();
        Self {
            name,
            capacity,
            map_flags,
            ptr,
            sync: SyncPair::new(),
        }
    }

    /// Write `data` at `offset` bytes through the persistent mapping,
    /// growing first if the range does not fit.
    pub fn write<T: bytemuck::Pod>(&mut self, offset: usize, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.expand_to_fit(offset, bytes.len());
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.ptr.add(offset), bytes.len());
        }
    }

    /// Write `data` at `offset` bytes with `glNamedBufferSubData`, bypassing
    /// the mapping. Growing still applies.
    pub fn write_immediate<T: bytemuck::Pod>(&mut self, offset: usize, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.expand_to_fit(offset, bytes.len());
        unsafe {
            gl::NamedBufferSubData(
                self.name,
                offset as gl::types::GLintptr,
                bytes.len() as gl::types::GLsizeiptr,
                bytes.as_ptr().cast(),
            );
        }
    }

    /// Expand this buffer to fit `len` bytes (if not already larger).
    pub fn set_max_size(&mut self, len: usize) {
        self.expand_to_fit(0, len);
    }

    /// Expand the storage if it can't fit the range to write into.
    ///
    /// Replaces the buffer: stalls on both fences (the old mapping and
    /// object are invalidated), GPU-copies the old contents across, remaps.
    pub fn expand_to_fit(&mut self, offset: usize, len: usize) {
        if offset + len <= self.capacity {
            return;
        }
        let old_capacity = self.capacity;
        self.capacity = grown_capacity(self.capacity, offset, len);

        self.sync.begin_writing();
        unsafe {
            let new_name = super::create_storage(
                self.capacity,
                std::ptr::null(),
                self.map_flags.storage_bits(),
            );
            if old_capacity != 0 {
                gl::CopyNamedBufferSubData(
                    self.name,
                    new_name,
                    0,
                    0,
                    old_capacity as gl::types::GLsizeiptr,
                );
            }
            gl::UnmapNamedBuffer(self.name);
            gl::DeleteBuffers(1, &self.name);

            self.name = new_name;
            self.ptr = gl::MapNamedBufferRange(
                self.name,
                0,
                self.capacity as gl::types::GLsizeiptr,
                self.map_flags.bits(),
            )
            .cast();
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

    /// Capacity of this buffer in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The raw GL object name, for calls this crate does not wrap.
    #[must_use]
    pub fn name(&self) -> gl::types::GLuint {
        self.name
    }
}

impl Clone for DynamicBuffer {
    /// GPU-side copy into a fresh buffer of the same capacity and flags.
    fn clone(&self) -> Self {
        let new = unsafe { Self::with_flags(self.capacity, self.map_flags) };
        unsafe {
            gl::CopyNamedBufferSubData(
                self.name,
                new.name,
                0,
                0,
                self.capacity as gl::types::GLsizeiptr,
            );
        }
        new
    }
}

impl Drop for DynamicBuffer {
    fn drop(&mut self) {
        self.sync.begin_writing();
        unsafe {
            gl::UnmapNamedBuffer(self.name);
            gl::DeleteBuffers(1, &self.name);
        }
    }
}
