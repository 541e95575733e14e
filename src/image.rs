//! Host-side pixel rectangles, the staging format for the texture types.

use crate::vec::{Vec2, Vec4};

/// Failure modes for [`Image::new`].
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("pixel buffer holds {actual} floats, but a {width}x{height} RGBA image needs {expected}")]
    SizeMismatch {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },
}

/// Directive for [`Image::generate`] and [`Image::fill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPolicy {
    /// Every pixel is the primary color.
    Solid,
    /// Alternating [`Image::CHECKER_SIZE`] squares of the two colors.
    Checkered,
}

/// A block of RGBA `f32` pixel data and its dimensions.
///
/// Purely host-side; hand it to [`crate::Texture2D::from_image`] to get it
/// on the GPU.
#[derive(Debug)]
pub struct Image {
    pixels: Box<[f32]>,
    size: Vec2,
}

impl Image {
    /// How many pixels wide and tall each checker square is.
    pub const CHECKER_SIZE: usize = 32;

    /// Construct an image with a specific size and pixels.
    ///
    /// # Errors
    /// If `pixels` does not hold exactly `size.x * size.y` RGBA quadruples.
    pub fn new(pixels: Vec<f32>, size: Vec2) -> Result<Self, ImageError> {
        let (width, height) = (size.x as usize, size.y as usize);
        let expected = width * height * 4;
        if pixels.len() != expected {
            return Err(ImageError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels: pixels.into_boxed_slice(),
            size,
        })
    }

    /// Generate an image with pixels of the supplied policy.
    #[must_use]
    pub fn generate(size: Vec2, policy: FillPolicy, primary: Vec4, secondary: Vec4) -> Self {
        let (width, height) = (size.x as usize, size.y as usize);
        let pixel_count = width * height;
        let mut pixels = vec![0.0f32; pixel_count * 4];

        match policy {
            FillPolicy::Solid => {
                for (component, value) in pixels.iter_mut().enumerate() {
                    *value = primary[component % 4];
                }
            }
            FillPolicy::Checkered => {
                let colors = [primary, secondary];
                let mut flip = false;
                // Row counter; starts one below zero so the first row's
                // flip lines up with the first column's.
                let mut depth = usize::MAX;
                for pixel in 0..pixel_count {
                    if pixel % Self::CHECKER_SIZE == 0 {
                        flip = !flip;
                    }
                    if pixel % width == 0 {
                        depth = depth.wrapping_add(1);
                        if depth % Self::CHECKER_SIZE == 0 {
                            flip = !flip;
                        }
                    }
                    pixels[pixel * 4..pixel * 4 + 4].copy_from_slice(colors[flip as usize].as_array());
                }
            }
        }

        Self {
            pixels: pixels.into_boxed_slice(),
            size,
        }
    }

    /// Refill this image in place with pixels of the supplied policy.
    pub fn fill(&mut self, policy: FillPolicy, primary: Vec4, secondary: Vec4) {
        *self = Self::generate(self.size, policy, primary, secondary);
    }

    /// The underlying pixel data, `x`-major RGBA.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.pixels
    }

    /// The image dimensions.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
    const BLUE: Vec4 = Vec4::new(0.0, 0.0, 1.0, 1.0);

    fn pixel(image: &Image, x: usize, y: usize) -> &[f32] {
        let width = image.size().x as usize;
        let base = (y * width + x) * 4;
        &image.data()[base..base + 4]
    }

    #[test]
    fn new_validates_length() {
        assert!(Image::new(vec![0.0; 8 * 4 * 4], Vec2::new(8.0, 4.0)).is_ok());
        let err = Image::new(vec![0.0; 7], Vec2::new(8.0, 4.0)).unwrap_err();
        let ImageError::SizeMismatch {
            expected, actual, ..
        } = err;
        assert_eq!(expected, 128);
        assert_eq!(actual, 7);
    }

    #[test]
    fn solid_fill_repeats_the_primary() {
        let image = Image::generate(Vec2::new(4.0, 2.0), FillPolicy::Solid, RED, BLUE);
        assert_eq!(image.data().len(), 4 * 2 * 4);
        for x in 0..4 {
            for y in 0..2 {
                assert_eq!(pixel(&image, x, y), RED.as_array());
            }
        }
    }

    #[test]
    fn checkered_fill_alternates_squares() {
        let size = Image::CHECKER_SIZE;
        let image = Image::generate(
            Vec2::new((size * 2) as f32, (size * 2) as f32),
            FillPolicy::Checkered,
            RED,
            BLUE,
        );
        // Corner squares of the 2x2 checkerboard.
        assert_eq!(pixel(&image, 0, 0), RED.as_array());
        assert_eq!(pixel(&image, size, 0), BLUE.as_array());
        assert_eq!(pixel(&image, 0, size), BLUE.as_array());
        assert_eq!(pixel(&image, size, size), RED.as_array());
        // Within a square the color holds.
        assert_eq!(pixel(&image, size - 1, size - 1), RED.as_array());
        assert_eq!(pixel(&image, size + 1, size + 1), RED.as_array());
    }

    #[test]
    fn fill_replaces_in_place() {
        let mut image = Image::generate(Vec2::new(2.0, 2.0), FillPolicy::Solid, RED, BLUE);
        image.fill(FillPolicy::Solid, BLUE, RED);
        assert_eq!(pixel(&image, 1, 1), BLUE.as_array());
        assert_eq!(image.size(), Vec2::new(2.0, 2.0));
    }
}
