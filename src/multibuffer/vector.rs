//! An STL-like vector over round-robin multi-buffered GPU memory.

use super::Ring;
use crate::buffer::{BufferTarget, IndexedBufferTarget, MapFlags};
use crate::gl;

/// A [`crate::GpuVector`] with `COUNT` slots: indexing reads and writes the
/// slot under the cursor, so each frame can be built without disturbing the
/// ones the GPU is still drawing.
///
/// Capacity is in elements, minimum 1, and never shrinks.
pub struct MultiVector<T: bytemuck::Pod, const COUNT: usize = 3> {
    ring: Ring<COUNT>,
    capacity: usize,
    ptrs: [*mut T; COUNT],
}

impl<T: bytemuck::Pod, const COUNT: usize> MultiVector<T, COUNT> {
    const MAP_FLAGS: MapFlags = MapFlags::persistent_write();

    /// Construct with room for `capacity` elements per slot (1 or more; 0
    /// is bumped to 1).
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let byte_len = std::mem::size_of::<T>() * capacity;
        let ring = Ring::create(byte_len, std::ptr::null(), Self::MAP_FLAGS.storage_bits());
        let ptrs = std::array::from_fn(|slot| unsafe {
            gl::MapNamedBufferRange(
                ring.names[slot],
                0,
                byte_len as gl::types::GLsizeiptr,
                Self::MAP_FLAGS.bits(),
            )
            .cast()
        });
        Self {
            ring,
            capacity,
            ptrs,
        }
    }

    /// Grow the capacity of every slot. Does nothing if `new_capacity` is
    /// not larger; never shrinks.
    ///
    /// May stall waiting for old buffers to finish, then invalidates them.
    pub fn resize(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity {
            return;
        }
        let old_byte_len = std::mem::size_of::<T>() * self.capacity;
        let new_byte_len = std::mem::size_of::<T>() * new_capacity;
        self.capacity = new_capacity;

        for slot in 0..COUNT {
            self.ring.sync[slot].begin_writing();
            unsafe {
                let new_name = crate::buffer::create_storage(
                    new_byte_len,
                    std::ptr::null(),
                    Self::MAP_FLAGS.storage_bits(),
                );
                if old_byte_len != 0 {
                    gl::CopyNamedBufferSubData(
                        self.ring.names[slot],
                        new_name,
                        0,
                        0,
                        old_byte_len as gl::types::GLsizeiptr,
                    );
                }
                gl::UnmapNamedBuffer(self.ring.names[slot]);
                gl::DeleteBuffers(1, &self.ring.names[slot]);

                self.ring.names[slot] = new_name;
                self.ptrs[slot] = gl::MapNamedBufferRange(
                    self.ring.names[slot],
                    0,
                    new_byte_len as gl::types::GLsizeiptr,
                    Self::MAP_FLAGS.bits(),
                )
                .cast();
            }
        }
    }

    /// The number of elements each slot holds (its capacity - there is no
    /// separate fill count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.capacity
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.capacity == 0
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

impl<T: bytemuck::Pod, const COUNT: usize> std::ops::Index<usize> for MultiVector<T, COUNT> {
    type Output = T;
    fn index(&self, index: usize) -> &T {
        assert!(index < self.capacity, "index {index} out of bounds");
        // Safety: in-bounds within the current slot's live mapping.
        unsafe { &*self.ptrs[self.ring.index].add(index) }
    }
}
impl<T: bytemuck::Pod, const COUNT: usize> std::ops::IndexMut<usize> for MultiVector<T, COUNT> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(index < self.capacity, "index {index} out of bounds");
        // Safety: in-bounds within the current slot's live mapping.
        unsafe { &mut *self.ptrs[self.ring.index].add(index) }
    }
}

impl<T: bytemuck::Pod, const COUNT: usize> Clone for MultiVector<T, COUNT> {
    /// GPU-side copy, slot for slot.
    fn clone(&self) -> Self {
        let new = unsafe { Self::new(self.capacity) };
        for slot in 0..COUNT {
            unsafe {
                gl::CopyNamedBufferSubData(
                    self.ring.names[slot],
                    new.ring.names[slot],
                    0,
                    0,
                    (std::mem::size_of::<T>() * self.capacity) as gl::types::GLsizeiptr,
                );
            }
        }
        new
    }
}

impl<T: bytemuck::Pod, const COUNT: usize> Drop for MultiVector<T, COUNT> {
    fn drop(&mut self) {
        self.ring.wait_all();
        unsafe { self.ring.release_mapped() };
    }
}
