//! A growable round-robin multi-buffer.

use super::Ring;
use crate::buffer::{grown_capacity, BufferTarget, IndexedBufferTarget, MapFlags};
use crate::gl;

/// An OpenGL memory multi-buffer which can expand in size.
///
/// [`crate::DynamicBuffer`], times `COUNT`: every slot is persistently
/// mapped and grows in lockstep. Plain writes land in the slot under the
/// cursor; [`Self::write_immediate`] mirrors the write into every slot.
pub struct DynamicMultiBuffer<const COUNT: usize = 3> {
    ring: Ring<COUNT>,
    capacity: usize,
    map_flags: MapFlags,
    ptrs: [*mut u8; COUNT],
}

impl<const COUNT: usize> DynamicMultiBuffer<COUNT> {
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
        let ring = Ring::create(capacity, std::ptr::null(), map_flags.storage_bits());
        let ptrs = std::array::from_fn(|slot| unsafe {
            gl::MapNamedBufferRange(
                ring.names[slot],
                0,
                capacity as gl::types::GLsizeiptr,
                map_flags.bits(),
            )
            .cast()
        });
        Self {
            ring,
            capacity,
            map_flags,
            ptrs,
        }
    }

    /// Write `data` at `offset` bytes into the slot under the cursor,
    /// growing first if the range does not fit.
    pub fn write<T: bytemuck::Pod>(&mut self, offset: usize, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.expand_to_fit(offset, bytes.len());
        unsafe {
            std::ptr::copy_nonoverlapping(
                bytes.as_ptr(),
                self.ptrs[self.ring.index].add(offset),
                bytes.len(),
            );
        }
    }

    /// Write `data` at `offset` bytes into *every* slot with
    /// `glNamedBufferSubData`. Growing still applies.
    pub fn write_immediate<T: bytemuck::Pod>(&mut self, offset: usize, data: &[T]) {
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.expand_to_fit(offset, bytes.len());
        for &name in &self.ring.names {
            unsafe {
                gl::NamedBufferSubData(
                    name,
                    offset as gl::types::GLintptr,
                    bytes.len() as gl::types::GLsizeiptr,
                    bytes.as_ptr().cast(),
                );
            }
        }
    }

    /// Expand this buffer to fit `len` bytes (if not already larger).
    pub fn set_max_size(&mut self, len: usize) {
        self.expand_to_fit(0, len);
    }

    /// Expand every slot if the range to write into does not fit.
    ///
    /// Replaces each slot's storage in turn: waits out its fences,
    /// GPU-copies the old contents, remaps.
    pub fn expand_to_fit(&mut self, offset: usize, len: usize) {
        if offset + len <= self.capacity {
            return;
        }
        let old_capacity = self.capacity;
        self.capacity = grown_capacity(self.capacity, offset, len);

        for slot in 0..COUNT {
            self.ring.sync[slot].begin_writing();
            unsafe {
                let new_name = crate::buffer::create_storage(
                    self.capacity,
                    std::ptr::null(),
                    self.map_flags.storage_bits(),
                );
                if old_capacity != 0 {
                    gl::CopyNamedBufferSubData(
                        self.ring.names[slot],
                        new_name,
                        0,
                        0,
                        old_capacity as gl::types::GLsizeiptr,
                    );
                }
                gl::UnmapNamedBuffer(self.ring.names[slot]);
                gl::DeleteBuffers(1, &self.ring.names[slot]);

                self.ring.names[slot] = new_name;
                self.ptrs[slot] = gl::MapNamedBufferRange(
                    self.ring.names[slot],
                    0,
                    self.capacity as gl::types::GLsizeiptr,
                    self.map_flags.bits(),
                )
                .cast();
            }
        }
    }

    /// Capacity of each slot in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
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

impl<const COUNT: usize> Clone for DynamicMultiBuffer<COUNT> {
    /// GPU-side copy, slot for slot.
    fn clone(&self) -> Self {
        let new = unsafe { Self::with_flags(self.capacity, self.map_flags) };
        for slot in 0..COUNT {
            unsafe {
                gl::CopyNamedBufferSubData(
                    self.ring.names[slot],
                    new.ring.names[slot],
                    0,
                    0,
                    self.capacity as gl::types::GLsizeiptr,
                );
            }
        }
        new
    }
}

impl<const COUNT: usize> Drop for DynamicMultiBuffer<COUNT> {
    fn drop(&mut self) {
        self.ring.wait_all();
        unsafe { self.ring.release_mapped() };
    }
}
