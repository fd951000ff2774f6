use crate::{core::geo::Size, surface::style::Transform};

/// Smallest uniform scale at which a `size` rectangle, rotated by any
/// angle about its centre, still covers its original bounds.
///
/// A collapsed container has nothing to cover and yields 1.
pub fn covering_scale(size: Size) -> f64 {
    if size.is_empty() {
        return 1.0;
    }
    size.diagonal() / size.max_dimension()
}

/// Transform applied to the map container in track-up mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationTransform {
    /// Map bearing: the negated compass heading
    pub angle_deg: f64,
    pub scale: f64,
}

impl RotationTransform {
    pub fn for_heading(heading: f64, size: Size, margin: f64) -> Self {
        Self {
            angle_deg: -heading,
            scale: covering_scale(size) * margin,
        }
    }

    pub fn identity() -> Self {
        Self {
            angle_deg: 0.0,
            scale: 1.0,
        }
    }

    pub fn transform(&self) -> Transform {
        Transform::new(self.angle_deg, self.scale)
    }

    /// Inverse applied to chrome nested in the rotated container
    pub fn counter(&self) -> Transform {
        Transform::new(-self.angle_deg, 1.0 / self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_needs_root_two() {
        let scale = covering_scale(Size::new(500.0, 500.0));
        assert!((scale - std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_scale_never_under_covers() {
        let sizes: [(f64, f64); 4] = [(800.0, 600.0), (320.0, 640.0), (1.0, 1000.0), (1920.0, 1080.0)];
        for (w, h) in sizes {
            let size = Size::new(w, h);
            let minimum = (w * w + h * h).sqrt() / w.max(h);
            let rotation = RotationTransform::for_heading(33.0, size, 1.2);
            assert!(rotation.scale >= minimum);
            assert!((rotation.scale - minimum * 1.2).abs() < 1e-9);
        }
    }

    #[test]
    fn test_collapsed_container() {
        assert_eq!(covering_scale(Size::new(0.0, 0.0)), 1.0);
        let rotation = RotationTransform::for_heading(90.0, Size::new(0.0, 300.0), 1.2);
        assert_eq!(rotation.scale, 1.2);
    }

    #[test]
    fn test_counter_inverts() {
        let rotation = RotationTransform::for_heading(90.0, Size::new(800.0, 600.0), 1.2);
        assert_eq!(rotation.angle_deg, -90.0);

        let counter = rotation.counter();
        assert_eq!(counter.rotate_deg, 90.0);
        assert!((counter.scale * rotation.scale - 1.0).abs() < 1e-12);
    }
}
