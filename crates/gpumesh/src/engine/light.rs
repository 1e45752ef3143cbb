use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    color: Vec3,
    pub position: Option<Vec3>,
    pub direction: Option<Vec3>,
}

impl Light {
    /// A light with the given color, white if none is given.
    pub fn new(color: Option<Vec3>, position: Option<Vec3>, direction: Option<Vec3>) -> Self {
        Light {
            color: color.unwrap_or(Vec3::ONE),
            position,
            direction,
        }
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_white() {
        let mut light = Light::default();
        assert_eq!(light.color(), Vec3::ONE);
        light.set_color(Vec3::new(1.0, 0.5, 0.0));
        assert_eq!(light.color(), Vec3::new(1.0, 0.5, 0.0));
    }
}
