/// Drawable surface size in physical pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; a zero height reports 1.0 so the projection stays finite.
    #[inline]
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for SurfaceSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_landscape_surface() {
        assert!((SurfaceSize::new(800, 600).aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_with_zero_height_is_one() {
        assert_eq!(SurfaceSize::new(640, 0).aspect(), 1.0);
        assert!(SurfaceSize::new(640, 0).is_empty());
    }
}
