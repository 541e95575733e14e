//! Draw modes and the indirect draw helper.

use crate::buffer::{BufferTarget, StaticBuffer, StorageFlags};
use crate::{gl, GLEnum};

/// `glDraw*` primitive mode.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points = gl::POINTS,
    LineStrip = gl::LINE_STRIP,
    LineLoop = gl::LINE_LOOP,
    Lines = gl::LINES,
    TriangleStrip = gl::TRIANGLE_STRIP,
    TriangleFan = gl::TRIANGLE_FAN,
    Triangles = gl::TRIANGLES,
}
// Safety: is repr(u32) enum.
unsafe impl GLEnum for Topology {}

// Word offsets within a `glDrawArraysIndirect` command.
const COUNT_OFFSET: usize = 0;
const INSTANCE_COUNT_OFFSET: usize = std::mem::size_of::<u32>();
const FIRST_OFFSET: usize = 2 * std::mem::size_of::<u32>();

/// The data needed to perform an indirect draw call, kept GPU-side.
///
/// Holds a little [`StaticBuffer`] with the `{count, instance_count, first,
/// base_instance}` command words; the setters patch individual words so the
/// draw parameters can be tweaked without touching the rest.
pub struct IndirectDraw {
    buffer: StaticBuffer,
    count: u32,
    instance_count: u32,
    first: u32,
}

impl IndirectDraw {
    /// Construct an indirect draw object.
    ///
    /// `count` vertices, `instance_count` instances, starting at vertex
    /// `first`. The base instance is pinned to zero.
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn new(
        count: u32,
        instance_count: u32,
        first: u32,
        flags: StorageFlags,
    ) -> Self {
        let words: [u32; 4] = [count, instance_count, first, 0];
        Self {
            buffer: StaticBuffer::from_slice(&words, flags),
            count,
            instance_count,
            first,
        }
    }

    /// Bind this draw call to the indirect buffer target.
    pub fn bind(&self) {
        self.buffer.bind(BufferTarget::DrawIndirect);
    }

    /// Bind and issue the indirect draw.
    pub fn draw_call(&self, topology: Topology) {
        self.bind();
        unsafe { gl::DrawArraysIndirect(topology.as_gl(), std::ptr::null()) };
    }

    /// Specify how many vertices will be rendered.
    pub fn set_count(&mut self, count: u32) {
        self.count = count;
        self.buffer.write(COUNT_OFFSET, &[count]);
    }

    /// Specify how many instances will be rendered.
    pub fn set_instance_count(&mut self, instance_count: u32) {
        self.instance_count = instance_count;
        self.buffer.write(INSTANCE_COUNT_OFFSET, &[instance_count]);
    }

    /// Specify the offset to the first vertex to be rendered.
    pub fn set_first(&mut self, first: u32) {
        self.first = first;
        self.buffer.write(FIRST_OFFSET, &[first]);
    }

    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }
    #[must_use]
    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
    #[must_use]
    pub fn first(&self) -> u32 {
        self.first
    }

    /// Prepare the command buffer for writing, waiting on unfinished use.
    pub fn begin_writing(&self) {
        self.buffer.begin_writing();
    }
    /// Signal that the command buffer is finished being written to.
    pub fn end_writing(&self) {
        self.buffer.end_writing();
    }
    /// Signal that the command buffer is finished being read from.
    pub fn end_reading(&mut self) {
        self.buffer.end_reading();
    }
}
