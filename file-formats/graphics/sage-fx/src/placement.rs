//! Where a particle system lives in the world

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use glam::Mat4;

/// Source of the current world transform of a host, such as a model bone
pub trait WorldTransform {
    fn world_matrix(&self) -> Mat4;
}

/// A transform slot the host overwrites every frame
impl WorldTransform for Cell<Mat4> {
    fn world_matrix(&self) -> Mat4 {
        self.get()
    }
}

/// World placement of a particle system
#[derive(Clone)]
pub enum Placement {
    /// Transform captured at creation
    Fixed(Mat4),
    /// Transform read from the host whenever it is needed
    Tracked(Rc<dyn WorldTransform>),
}

impl Placement {
    pub fn world_matrix(&self) -> Mat4 {
        match self {
            Self::Fixed(matrix) => *matrix,
            Self::Tracked(transform) => transform.world_matrix(),
        }
    }

    pub fn is_tracked(&self) -> bool {
        matches!(self, Self::Tracked(_))
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::Fixed(Mat4::IDENTITY)
    }
}

impl From<Mat4> for Placement {
    fn from(matrix: Mat4) -> Self {
        Self::Fixed(matrix)
    }
}

impl fmt::Debug for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(matrix) => f.debug_tuple("Fixed").field(matrix).finish(),
            Self::Tracked(transform) => f
                .debug_tuple("Tracked")
                .field(&transform.world_matrix())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_tracked_follows_host() {
        let bone = Rc::new(Cell::new(Mat4::IDENTITY));
        let placement = Placement::Tracked(bone.clone());
        assert_eq!(placement.world_matrix(), Mat4::IDENTITY);

        let moved = Mat4::from_translation(Vec3::new(10.0, 0.0, 5.0));
        bone.set(moved);
        assert_eq!(placement.world_matrix(), moved);
        assert!(placement.is_tracked());
    }

    #[test]
    fn test_fixed_placement() {
        let matrix = Mat4::from_scale(Vec3::splat(2.0));
        let placement = Placement::from(matrix);
        assert_eq!(placement.world_matrix(), matrix);
        assert!(!placement.is_tracked());
    }
}
