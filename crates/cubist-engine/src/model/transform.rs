use glam::{Mat4, Vec3};

/// Offset and per-axis rotation of a model, in radians.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Transform {
    pub offset: Vec3,
    pub rotation: Vec3,
}

impl Transform {
    pub fn at(offset: Vec3) -> Self {
        Self {
            offset,
            rotation: Vec3::ZERO,
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Identity, translated by the offset, then rotated about X, Y and Z in
    /// that order. An axis whose angle is exactly zero is skipped.
    pub fn model_view(&self) -> Mat4 {
        let mut m = Mat4::from_translation(self.offset);
        if self.rotation.x != 0.0 {
            m *= Mat4::from_rotation_x(self.rotation.x);
        }
        if self.rotation.y != 0.0 {
            m *= Mat4::from_rotation_y(self.rotation.y);
        }
        if self.rotation.z != 0.0 {
            m *= Mat4::from_rotation_z(self.rotation.z);
        }
        m
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat3, Vec4};

    use super::*;

    #[test]
    fn unrotated_model_view_is_pure_translation() {
        let mv = Transform::at(Vec3::new(0.0, 0.0, -10.0)).model_view();
        assert_eq!(Mat3::from_mat4(mv), Mat3::IDENTITY);
        assert_eq!(mv.w_axis, Vec4::new(0.0, 0.0, -10.0, 1.0));
    }

    #[test]
    fn rotation_applies_in_object_space() {
        // Rotating first, then translating, keeps the translation column intact.
        let t = Transform::at(Vec3::new(1.0, 2.0, 3.0))
            .with_rotation(Vec3::new(0.3, 0.0, 0.0));
        let mv = t.model_view();
        assert_eq!(mv.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0));

        let expected = Mat4::from_translation(t.offset) * Mat4::from_rotation_x(0.3);
        assert!(mv.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn axes_compose_x_then_y_then_z() {
        let r = Vec3::new(0.4, -1.1, 2.0);
        let mv = Transform::default().with_rotation(r).model_view();
        let expected = Mat4::from_rotation_x(r.x)
            * Mat4::from_rotation_y(r.y)
            * Mat4::from_rotation_z(r.z);
        assert!(mv.abs_diff_eq(expected, 1e-6));
    }
}
