//! A 4x4 float matrix, just enough for camera and projection transforms.

use crate::vec::{Vec3, Vec4};

/// A 4x4 matrix of floats, stored as four [`Vec4`] columns.
///
/// `#[repr(C)]` and [`bytemuck::Pod`]: [`Self::as_array`] is the
/// column-major layout `glProgramUniformMatrix4fv` expects, no transpose.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4 {
    cols: [Vec4; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            Vec4::new(1.0, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 1.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 1.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ],
    };

    /// Construct an explicit matrix from columns.
    #[must_use]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Flat column-major view of the coefficients.
    #[must_use]
    pub fn as_array(&self) -> &[f32; 16] {
        bytemuck::cast_ref(self)
    }

    /// A view matrix looking at `center` from `eye`.
    #[must_use]
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        let f = (center - eye).normalize();
        let mut u = up.normalize();
        let s = f.cross(u).normalize();
        u = s.cross(f);

        let mut result = Self::IDENTITY;
        result[0].x = s.x;
        result[1].x = s.y;
        result[2].x = s.z;
        result[3].x = -s.dot(eye);
        result[0].y = u.x;
        result[1].y = u.y;
        result[2].y = u.z;
        result[3].y = -u.dot(eye);
        result[0].z = -f.x;
        result[1].z = -f.y;
        result[2].z = -f.z;
        result[3].z = f.dot(eye);
        result
    }

    /// A perspective projection.
    ///
    /// `fov_y` is the vertical field of view in radians.
    #[must_use]
    pub fn perspective(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Self {
        let tan_half_fovy = (fov_y / 2.0).tan();

        let mut result = Self::IDENTITY;
        result[0].x = 1.0 / (aspect * tan_half_fovy);
        result[1].y = 1.0 / tan_half_fovy;
        result[2].z = -(z_far + z_near) / (z_far - z_near);
        result[2].w = -1.0;
        result[3].z = -(2.0 * z_far * z_near) / (z_far - z_near);
        result
    }

    /// An orthographic projection.
    #[must_use]
    pub fn orthographic(
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let mut result = Self::IDENTITY;
        result[0][0] = 2.0 / (right - left);
        result[1][1] = 2.0 / (top - bottom);
        result[2][2] = -2.0 / (z_far - z_near);
        result[3][0] = -(right + left) / (right - left);
        result[3][1] = -(top + bottom) / (top - bottom);
        result[3][2] = -(z_far + z_near) / (z_far - z_near);
        result
    }
}

/// Retrieve the column at the index specified.
impl std::ops::Index<usize> for Mat4 {
    type Output = Vec4;
    fn index(&self, index: usize) -> &Vec4 {
        &self.cols[index]
    }
}
impl std::ops::IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, index: usize) -> &mut Vec4 {
        &mut self.cols[index]
    }
}

#[cfg(feature = "mint")]
impl From<Mat4> for mint::ColumnMatrix4<f32> {
    fn from(m: Mat4) -> Self {
        Self {
            x: m[0].into(),
            y: m[1].into(),
            z: m[2].into(),
            w: m[3].into(),
        }
    }
}
#[cfg(feature = "mint")]
impl From<mint::ColumnMatrix4<f32>> for Mat4 {
    fn from(m: mint::ColumnMatrix4<f32>) -> Self {
        Self::from_cols(m.x.into(), m.y.into(), m.z.into(), m.w.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let m = Mat4::default();
        for col in 0..4 {
            for row in 0..4 {
                let expected = if col == row { 1.0 } else { 0.0 };
                assert_eq!(m[col][row], expected);
            }
        }
    }

    #[test]
    fn flat_view_is_column_major() {
        let mut m = Mat4::IDENTITY;
        m[3].x = 7.0;
        let flat = m.as_array();
        assert_eq!(flat[0], 1.0);
        assert_eq!(flat[12], 7.0);
        assert_eq!(flat[15], 1.0);
    }

    #[test]
    fn look_at_is_orthonormal() {
        let eye = Vec3::new(4.0, 3.0, 8.0);
        let m = Mat4::look_at(eye, Vec3::splat(0.0), Vec3::new(0.0, 1.0, 0.0));

        let s = Vec3::new(m[0].x, m[1].x, m[2].x);
        let u = Vec3::new(m[0].y, m[1].y, m[2].y);
        let f = Vec3::new(-m[0].z, -m[1].z, -m[2].z);
        assert!(s.dot(u).abs() < 1e-5);
        assert!(s.dot(f).abs() < 1e-5);
        assert!((s.length() - 1.0).abs() < 1e-5);
        assert!((f.length() - 1.0).abs() < 1e-5);

        // The eye maps to the origin of view space.
        let view_eye = Vec3::new(
            s.dot(eye) + m[3].x,
            u.dot(eye) + m[3].y,
            -f.dot(eye) + m[3].z,
        );
        assert!(view_eye.length() < 1e-4);
    }

    #[test]
    fn orthographic_maps_corners() {
        let m = Mat4::orthographic(-2.0, 2.0, 1.0, -1.0, 0.0, 10.0);
        // x = right maps to +1, y = top maps to +1.
        assert!((m[0][0] * 2.0 + m[3][0] - 1.0).abs() < 1e-6);
        assert!((m[1][1] * 1.0 + m[3][1] - 1.0).abs() < 1e-6);
        // Depth range [0, 10] maps to [-1, 1] (negative z looks forward).
        assert!((m[2][2] * 0.0 + m[3][2] + 1.0).abs() < 1e-6);
        assert!((m[2][2] * -10.0 + m[3][2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn perspective_coefficients() {
        let m = Mat4::perspective(std::f32::consts::FRAC_PI_2, 2.0, 0.1, 100.0);
        // tan(fov/2) = 1 at 90 degrees.
        assert!((m[0].x - 0.5).abs() < 1e-6);
        assert!((m[1].y - 1.0).abs() < 1e-6);
        assert_eq!(m[2].w, -1.0);
    }
}
