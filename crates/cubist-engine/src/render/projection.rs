use glam::Mat4;

use crate::coords::SurfaceSize;
use crate::model::Transform;

/// Fixed perspective parameters; only the aspect ratio follows the surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    /// 45° vertical field of view, near 0.1, far 100.
    fn default() -> Self {
        Self {
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective with a 0..1 depth range.
    pub fn matrix(&self, size: SurfaceSize) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, size.aspect(), self.near, self.far)
    }
}

/// Matrices for one frame. Computed per draw and discarded afterwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameState {
    pub viewport: SurfaceSize,
    pub projection: Mat4,
    pub model_view: Mat4,
}

impl FrameState {
    pub fn compute(projection: &Projection, viewport: SurfaceSize, transform: &Transform) -> Self {
        Self {
            viewport,
            projection: projection.matrix(viewport),
            model_view: transform.model_view(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    /// Recovers (aspect, fov_y, near, far) from a `perspective_rh` matrix.
    fn decompose(m: Mat4) -> (f32, f32, f32, f32) {
        let f = m.y_axis.y;
        let aspect = f / m.x_axis.x;
        let fov_y = 2.0 * (1.0 / f).atan();
        let (a, b) = (m.z_axis.z, m.w_axis.z);
        // a = far / (near - far), b = near * far / (near - far)
        let near = b / a;
        let far = b / (a + 1.0);
        (aspect, fov_y, near, far)
    }

    #[test]
    fn default_is_45_degrees_near_0_1_far_100() {
        let p = Projection::default();
        let (aspect, fov_y, near, far) = decompose(p.matrix(SurfaceSize::new(800, 600)));
        assert!((aspect - 800.0 / 600.0).abs() < 1e-5);
        assert!((fov_y.to_degrees() - 45.0).abs() < 1e-3);
        assert!((near - 0.1).abs() < 1e-4);
        assert!((far - 100.0).abs() < 1e-1);
    }

    #[test]
    fn zero_height_surface_uses_square_aspect() {
        let m = Projection::default().matrix(SurfaceSize::new(300, 0));
        assert!(m.is_finite());
        let (aspect, ..) = decompose(m);
        assert!((aspect - 1.0).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn only_aspect_follows_the_surface(w in 1u32..4096, h in 1u32..4096) {
            let p = Projection::default();
            let (aspect, fov_y, near, far) = decompose(p.matrix(SurfaceSize::new(w, h)));
            prop_assert!((aspect - w as f32 / h as f32).abs() <= 1e-3 * aspect.max(1.0));
            prop_assert!((fov_y - p.fov_y).abs() < 1e-4);
            prop_assert!((near - p.near).abs() < 1e-4);
            prop_assert!((far - p.far).abs() < 1e-1);
        }
    }
}
