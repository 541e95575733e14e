//! An STL-like vector over persistently-mapped GPU memory.

use super::{BufferTarget, IndexedBufferTarget, MapFlags};
use crate::fence::SyncPair;
use crate::{gl, GLEnum};

/// A vector of `T` living in a persistently-mapped GPU buffer.
///
/// Elements are poked directly through [`std::ops::IndexMut`]; the mapping
/// is write-combined, so treat it as write-only (reads come back, but at
/// uncached-memory speeds at best).
///
/// Capacity is in elements and never shrinks. [`Self::resize`] may stall,
/// waiting for outstanding GPU work before the old buffer is replaced.
pub struct GpuVector<T: bytemuck::Pod> {
    name: gl::types::GLuint,
    capacity: usize,
    ptr: *mut T,
    sync: SyncPair,
}

impl<T: bytemuck::Pod> GpuVector<T> {
    const MAP_FLAGS: MapFlags = MapFlags::persistent_write();

    /// Construct with room for `capacity` elements (1 or more; 0 is bumped
    /// to 1).
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let byte_len = std::mem::size_of::<T>() * capacity;
        let name =
            super::create_storage(byte_len, std::ptr::null(), Self::MAP_FLAGS.storage_bits());
        let ptr = gl::MapNamedBufferRange(
            name,
            0,
            byte_len as gl::types::GLsizeiptr,
            Self::MAP_FLAGS.bits(),
        )
        .cast();
        Self {
            name,
            capacity,
            ptr,
            sync: SyncPair::new(),
        }
    }

    /// Grow the capacity of this vector. Does nothing if `new_capacity` is
    /// not larger; never shrinks.
    ///
    /// May stall waiting for old buffers to finish, then invalidates them -
    /// previously returned element references cannot survive this (the
    /// borrow checker agrees).
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity {
            return;
        }
        let old_byte_len = std::mem::size_of::<T>() * self.capacity;
        let new_byte_len = std::mem::size_of::<T>() * new_capacity;
        self.capacity = new_capacity;

        self.sync.begin_writing();
        unsafe {
            let new_name = super::create_storage(
                new_byte_len,
                std::ptr::null(),
                Self::MAP_FLAGS.storage_bits(),
            );
            if old_byte_len != 0 {
                gl::CopyNamedBufferSubData(
                    self.name,
                    new_name,
                    0,
                    0,
                    old_byte_len as gl::types::GLsizeiptr,
                );
            }
            gl::UnmapNamedBuffer(self.name);
            gl::DeleteBuffers(1, &self.name);

            self.name = new_name;
            self.ptr = gl::MapNamedBufferRange(
                self.name,
                0,
                new_byte_len as gl::types::GLsizeiptr,
                Self::MAP_FLAGS.bits(),
            )
            .cast();
        }
    }

    /// The number of elements this vector holds (its capacity - there is no
    /// separate fill count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.capacity
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
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

    /// The raw GL object name, for calls this crate does not wrap.
    #[must_use]
    pub fn name(&self) -> gl::types::GLuint {
        self.name
    }
}

impl<T: bytemuck::Pod> std::ops::Index<usize> for GpuVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        assert!(index < self.capacity, "index {index} out of bounds");
        // Safety: in-bounds within the live mapping.
        unsafe { &*self.ptr.add(index) }
    }
}
impl<T: bytemuck::Pod> std::ops::IndexMut<usize> for GpuVector<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.capacity, "index {index} out of bounds");
        // Safety: in-bounds within the live mapping.
        unsafe { &mut *self.ptr.add(index) }
    }
}

impl<T: bytemuck::Pod> Clone for GpuVector<T> {
    /// GPU-side copy into a fresh vector of the same capacity.
    fn clone(&self) -> Self {
        let new = unsafe { Self::new(self.capacity) };
        unsafe {
            gl::CopyNamedBufferSubData(
                self.name,
                new.name,
                0,
                0,
                (std::mem::size_of::<T>() * self.capacity) as gl::types::GLsizeiptr,
            );
        }
        new
    }
}

impl<T: bytemuck::Pod> Drop for GpuVector<T> {
    fn drop(&mut self) {
        self.sync.begin_writing();
        unsafe {
            gl::UnmapNamedBuffer(self.name);
            gl::DeleteBuffers(1, &self.name);
        }
    }
}
