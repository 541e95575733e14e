//! Vertex-array wrappers: a standalone model, and a group that packs many
//! models into one shared buffer.

use crate::draw::Topology;
use crate::fence::Fence;
use crate::vec::Vec3;
use crate::{gl, GLEnum, NotSync};

const STRIDE: i32 = std::mem::size_of::<Vec3>() as i32;

/// Set up attribute 0 as a tightly-packed vec3 stream from `vbo`.
///
/// # Safety
/// Crate contract; `vao` and `vbo` must be live objects.
unsafe fn attach_position_stream(vao: gl::types::GLuint, vbo: gl::types::GLuint) {
    gl::EnableVertexArrayAttrib(vao, 0);
    gl::VertexArrayAttribBinding(vao, 0, 0);
    gl::VertexArrayAttribFormat(vao, 0, 3, gl::FLOAT, gl::FALSE, 0);
    gl::VertexArrayVertexBuffer(vao, 0, vbo, 0, STRIDE);
}

/// A representation of an OpenGL model: one vertex array object over one
/// fixed vertex buffer.
pub struct Model {
    vertex_count: usize,
    vao: gl::types::GLuint,
    vbo: gl::types::GLuint,
    _not_sync: NotSync,
}

impl Model {
    /// Construct a model from a vertex set.
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn new(vertices: &[Vec3]) -> Self {
        let mut vao = 0;
        let mut vbo = 0;
        gl::CreateVertexArrays(1, &mut vao);
        gl::CreateBuffers(1, &mut vbo);

        gl::NamedBufferStorage(
            vbo,
            std::mem::size_of_val(vertices) as gl::types::GLsizeiptr,
            vertices.as_ptr().cast(),
            gl::CLIENT_STORAGE_BIT,
        );
        attach_position_stream(vao, vbo);

        Self {
            vertex_count: vertices.len(),
            vao,
            vbo,
            _not_sync: std::marker::PhantomData,
        }
    }

    /// Bind this model to the current context for rendering.
    pub fn bind(&self) {
        unsafe { gl::BindVertexArray(self.vao) };
    }

    /// Draw this model.
    pub fn draw(&self, topology: Topology) {
        unsafe {
            gl::DrawArrays(topology.as_gl(), 0, self.vertex_count as gl::types::GLsizei);
        }
    }

    /// This model's vertex count.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

/// A range within a [`ModelGroup`]: first vertex and vertex count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupEntry {
    pub first: gl::types::GLsizei,
    pub count: gl::types::GLsizei,
}

/// A vector-like container of models sharing one vertex buffer.
///
/// [`Self::add_model`] appends geometry and hands back the [`GroupEntry`]
/// naming its range; draw any subset of the group without rebinding by
/// passing entries to [`Self::draw`]. Capacity is in vertices and grows as
/// models are added, GPU-copying the old contents under a fence.
pub struct ModelGroup {
    /// Vertices used.
    len: usize,
    /// Vertices allocated.
    capacity: usize,
    vao: gl::types::GLuint,
    vbo: gl::types::GLuint,
    /// Guards the uploads and the grow-copy against each other.
    fence: Fence,
}

impl ModelGroup {
    /// Pre-allocation when none is given, in vertices.
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Construct a group with room for `capacity` vertices.
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn new(capacity: usize) -> Self {
        let mut vao = 0;
        let mut vbo = 0;
        gl::CreateVertexArrays(1, &mut vao);
        gl::CreateBuffers(1, &mut vbo);

        gl::NamedBufferStorage(
            vbo,
            (std::mem::size_of::<Vec3>() * capacity) as gl::types::GLsizeiptr,
            std::ptr::null(),
            gl::DYNAMIC_STORAGE_BIT,
        );
        attach_position_stream(vao, vbo);

        Self {
            len: 0,
            capacity,
            vao,
            vbo,
            fence: Fence::clear(),
        }
    }

    /// Bind this model-group to the current context for rendering.
    pub fn bind(&self) {
        unsafe { gl::BindVertexArray(self.vao) };
    }

    /// Draw one entry of the group. The group must be [bound](Self::bind).
    pub fn draw(topology: Topology, entry: GroupEntry) {
        unsafe { gl::DrawArrays(topology.as_gl(), entry.first, entry.count) };
    }

    /// Expand the container to hold at least `vertex_count` vertices.
    ///
    /// Over-allocates by twice the shortfall, so a stream of `add_model`
    /// calls settles into O(log n) reallocations.
    pub fn resize(&mut self, vertex_count: usize) {
        if vertex_count <= self.capacity {
            return;
        }
        let delta = vertex_count - self.len;
        self.capacity += delta * 2;

        unsafe {
            let mut new_vbo = 0;
            gl::CreateBuffers(1, &mut new_vbo);
            gl::NamedBufferStorage(
                new_vbo,
                (std::mem::size_of::<Vec3>() * self.capacity) as gl::types::GLsizeiptr,
                std::ptr::null(),
                gl::DYNAMIC_STORAGE_BIT,
            );

            // Carry the used range over, then retire the old buffer once
            // the copy (and anything before it) lands.
            self.fence.insert();
            gl::CopyNamedBufferSubData(
                self.vbo,
                new_vbo,
                0,
                0,
                (std::mem::size_of::<Vec3>() * self.len) as gl::types::GLsizeiptr,
            );
            self.fence.wait();
            gl::DeleteBuffers(1, &self.vbo);

            self.vbo = new_vbo;
            gl::VertexArrayVertexBuffer(self.vao, 0, self.vbo, 0, STRIDE);
        }
    }

    /// Add a model to the end of the container.
    ///
    /// Returns the entry tag corresponding to this model.
    pub fn add_model(&mut self, vertices: &[Vec3]) -> GroupEntry {
        // Expand the container and make sure the previous upload or copy
        // has landed before touching the buffer again.
        self.resize(self.len + vertices.len());
        self.fence.wait();

        let first = self.len;
        let count = vertices.len();
        self.len += count;
        unsafe {
            gl::NamedBufferSubData(
                self.vbo,
                (std::mem::size_of::<Vec3>() * first) as gl::types::GLintptr,
                std::mem::size_of_val(vertices) as gl::types::GLsizeiptr,
                vertices.as_ptr().cast(),
            );
        }
        self.fence.insert();

        GroupEntry {
            first: first as gl::types::GLsizei,
            count: count as gl::types::GLsizei,
        }
    }

    /// Vertices currently used.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.len
    }
}

impl Drop for ModelGroup {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}
