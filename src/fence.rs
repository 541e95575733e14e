//! Client/GPU synchronization shared by the buffer wrappers.

use crate::gl;
use std::cell::Cell;

/// A oneshot GPU fence.
///
/// At most one sync object is pending at a time; inserting while one is
/// pending is a no-op, so a fence marks the *oldest* unretired use of the
/// resource it guards.
///
/// Lives in a [`Cell`] so that `&self` methods on the owning buffer can
/// retire it mid-render.
pub(crate) struct Fence(Cell<gl::types::GLsync>);

impl Fence {
    pub const fn clear() -> Self {
        Self(Cell::new(std::ptr::null()))
    }

    /// `glFenceSync`, unless a fence is already pending.
    pub fn insert(&self) {
        if self.0.get().is_null() {
            self.0
                .set(unsafe { gl::FenceSync(gl::SYNC_GPU_COMMANDS_COMPLETE, 0) });
        }
    }

    /// Block until the pending fence (if any) signals, then retire it.
    ///
    /// The first `glClientWaitSync` polls without flushing; only once that
    /// times out is `GL_SYNC_FLUSH_COMMANDS_BIT` raised, so a fence that has
    /// already signaled costs no flush.
    pub fn wait(&self) {
        let sync = self.0.get();
        if sync.is_null() {
            return;
        }
        let mut flags = 0;
        loop {
            match unsafe { gl::ClientWaitSync(sync, flags, 1) } {
                gl::SIGNALED | gl::ALREADY_SIGNALED | gl::CONDITION_SATISFIED => break,
                _ => flags = gl::SYNC_FLUSH_COMMANDS_BIT,
            }
        }
        unsafe { gl::DeleteSync(sync) };
        self.0.set(std::ptr::null());
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        let sync = self.0.get();
        if !sync.is_null() {
            unsafe { gl::DeleteSync(sync) };
        }
    }
}

/// The write/read fence pair every buffer wrapper carries.
pub(crate) struct SyncPair {
    write: Fence,
    read: Fence,
}

impl SyncPair {
    pub const fn new() -> Self {
        Self {
            write: Fence::clear(),
            read: Fence::clear(),
        }
    }

    /// Wait for every pending read and write to retire.
    pub fn begin_writing(&self) {
        self.write.wait();
        self.read.wait();
    }

    /// Mark the end of a batch of writes.
    pub fn end_writing(&self) {
        self.write.insert();
    }

    /// Mark the end of a batch of reads (draws sourcing the buffer).
    pub fn end_reading(&self) {
        self.read.insert();
    }
}
