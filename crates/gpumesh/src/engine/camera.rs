use glam::Mat4;

/// View and projection matrices. Nothing here reaches a shader by itself; callers read the
/// matrices when they fill in their own uniforms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    view: Mat4,
    projection: Mat4,
}

impl Camera {
    pub fn new() -> Self {
        Camera {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Right-handed perspective projection with a [0, 1] depth range.
    pub fn set_projection(&mut self, fovy: f32, aspect_ratio: f32, z_near: f32, z_far: f32) {
        self.projection = Mat4::perspective_rh(fovy, aspect_ratio, z_near, z_far);
    }

    /// `view = view * transform`
    pub fn mult_right(&mut self, transform: Mat4) {
        self.view *= transform;
    }

    /// `view = transform * view`
    pub fn mult_left(&mut self, transform: Mat4) {
        self.view = transform * self.view;
    }

    pub fn projection_from_world(&self) -> Mat4 {
        self.projection * self.view
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn multiplication_order() {
        let translate = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let scale = Mat4::from_scale(Vec3::splat(2.0));

        let mut right = Camera::new();
        right.mult_right(translate);
        right.mult_right(scale);
        assert_eq!(right.view(), translate * scale);

        let mut left = Camera::new();
        left.mult_left(translate);
        left.mult_left(scale);
        assert_eq!(left.view(), scale * translate);
    }

    #[test]
    fn projection_is_composed_after_view() {
        let mut camera = Camera::new();
        camera.set_projection(std::f32::consts::FRAC_PI_2, 4.0 / 3.0, 0.1, 100.0);
        camera.mult_left(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
        assert_eq!(camera.projection_from_world(), camera.projection() * camera.view());
        assert_ne!(camera.projection(), Mat4::IDENTITY);
    }
}
