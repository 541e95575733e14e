//! GPU texture wrappers, one per dimensionality.
//!
//! All three allocate a single level of immutable `GL_RGBA16F` storage and
//! upload `f32` RGBA pixels on construction. They are plain RAII handles:
//! not clonable, deleted on drop.

use crate::image::Image;
use crate::{gl, NotSync};

const MAX_ANISOTROPY: f32 = 16.0;

/// Filter switches shared by the texture constructors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Filtering {
    /// Linear (rather than nearest) min/mag filtering.
    pub linear: bool,
    /// Anisotropic filtering, at the driver maximum of 16x.
    pub anisotropy: bool,
    /// Build a mipmap chain and sample it for minification.
    pub mipmap: bool,
}

/// # Safety
/// Crate contract, and `name` must be a live texture object.
unsafe fn apply_filters(name: gl::types::GLuint, filtering: Filtering) {
    let filter = if filtering.linear {
        gl::LINEAR
    } else {
        gl::NEAREST
    };
    gl::TextureParameteri(name, gl::TEXTURE_MAG_FILTER, filter as gl::types::GLint);
    gl::TextureParameteri(name, gl::TEXTURE_MIN_FILTER, filter as gl::types::GLint);

    if filtering.anisotropy {
        gl::TextureParameterf(name, gl::TEXTURE_MAX_ANISOTROPY, MAX_ANISOTROPY);
    }

    if filtering.mipmap {
        let min_filter = if filtering.linear {
            gl::LINEAR_MIPMAP_LINEAR
        } else {
            gl::LINEAR_MIPMAP_NEAREST
        };
        gl::TextureParameteri(name, gl::TEXTURE_MIN_FILTER, min_filter as gl::types::GLint);
        gl::GenerateTextureMipmap(name);
    }
}

/// A wrapper around a one-dimensional OpenGL texture object.
pub struct Texture1D {
    name: gl::types::GLuint,
    _not_sync: NotSync,
}

impl Texture1D {
    /// Construct a texture with the given width and RGBA `f32` data.
    ///
    /// # Safety
    /// Crate contract, and `pixels` must hold at least `width` RGBA
    /// quadruples.
    #[must_use]
    pub unsafe fn new(pixels: &[f32], width: i32, filtering: Filtering) -> Self {
        let mut name = 0;
        gl::CreateTextures(gl::TEXTURE_1D, 1, &mut name);
        gl::TextureStorage1D(name, 1, gl::RGBA16F, width);
        gl::TextureSubImage1D(
            name,
            0,
            0,
            width,
            gl::RGBA,
            gl::FLOAT,
            pixels.as_ptr().cast(),
        );
        apply_filters(name, filtering);
        Self {
            name,
            _not_sync: std::marker::PhantomData,
        }
    }

    /// Make this texture active at a specific texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe { gl::BindTextureUnit(unit, self.name) };
    }
}

impl Drop for Texture1D {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.name) };
    }
}

/// A wrapper around a two-dimensional OpenGL texture object.
pub struct Texture2D {
    name: gl::types::GLuint,
    _not_sync: NotSync,
}

impl Texture2D {
    /// Construct a texture with the given size and RGBA `f32` data.
    ///
    /// # Safety
    /// Crate contract, and `pixels` must hold at least `width * height`
    /// RGBA quadruples.
    #[must_use]
    pub unsafe fn new(pixels: &[f32], width: i32, height: i32, filtering: Filtering) -> Self {
        let mut name = 0;
        gl::CreateTextures(gl::TEXTURE_2D, 1, &mut name);
        gl::TextureStorage2D(name, 1, gl::RGBA16F, width, height);
        gl::TextureSubImage2D(
            name,
            0,
            0,
            0,
            width,
            height,
            gl::RGBA,
            gl::FLOAT,
            pixels.as_ptr().cast(),
        );
        apply_filters(name, filtering);
        Self {
            name,
            _not_sync: std::marker::PhantomData,
        }
    }

    /// Construct a texture from an [`Image`].
    ///
    /// # Safety
    /// Crate contract.
    #[must_use]
    pub unsafe fn from_image(image: &Image, filtering: Filtering) -> Self {
        Self::new(
            image.data(),
            image.size().x as i32,
            image.size().y as i32,
            filtering,
        )
    }

    /// Make this texture active at a specific texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe { gl::BindTextureUnit(unit, self.name) };
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.name) };
    }
}

/// A wrapper around a three-dimensional OpenGL texture object.
pub struct Texture3D {
    name: gl::types::GLuint,
    _not_sync: NotSync,
}

impl Texture3D {
    /// Construct a texture with the given size and RGBA `f32` data.
    ///
    /// # Safety
    /// Crate contract, and `pixels` must hold at least
    /// `width * height * depth` RGBA quadruples.
    #[must_use]
    pub unsafe fn new(
        pixels: &[f32],
        width: i32,
        height: i32,
        depth: i32,
        filtering: Filtering,
    ) -> Self {
        let mut name = 0;
        gl::CreateTextures(gl::TEXTURE_3D, 1, &mut name);
        gl::TextureStorage3D(name, 1, gl::RGBA16F, width, height, depth);
        gl::TextureSubImage3D(
            name,
            0,
            0,
            0,
            0,
            width,
            height,
            depth,
            gl::RGBA,
            gl::FLOAT,
            pixels.as_ptr().cast(),
        );
        apply_filters(name, filtering);
        Self {
            name,
            _not_sync: std::marker::PhantomData,
        }
    }

    /// Make this texture active at a specific texture unit.
    pub fn bind(&self, unit: u32) {
        unsafe { gl::BindTextureUnit(unit, self.name) };
    }
}

impl Drop for Texture3D {
    fn drop(&mut self) {
        unsafe { gl::DeleteTextures(1, &self.name) };
    }
}
