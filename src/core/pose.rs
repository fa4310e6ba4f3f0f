//! Poses, transforms and bounding boxes.

use glam::{Mat4, Quat, Vec3};

/// Rigid pose reported by the AR runtime in the floor-relative space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Decompose a column-major 4x4 matrix (the layout of
    /// `XRRigidTransform.matrix`). Any scale in the matrix is dropped.
    pub fn from_matrix(m: &[f32; 16]) -> Self {
        let (_scale, orientation, position) =
            Mat4::from_cols_array(m).to_scale_rotation_translation();
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    /// The pose's local +Z axis flattened onto the ground plane.
    ///
    /// Falls back to world +Z when the pose looks straight up or down.
    pub fn ground_forward(&self) -> Vec3 {
        let f = self.orientation * Vec3::Z;
        let flat = Vec3::new(f.x, 0.0, f.z);
        if flat.length_squared() < 1e-8 {
            Vec3::Z
        } else {
            flat.normalize()
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

/// One frame's hit-test result; `pose` is `None` when nothing was hit.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HitTestSample {
    pub pose: Option<Pose>,
}

impl HitTestSample {
    pub fn hit(pose: Pose) -> Self {
        Self { pose: Some(pose) }
    }

    pub fn miss() -> Self {
        Self { pose: None }
    }

    /// Keep only the first (nearest) of the ranked results.
    pub fn first_of(ranked: impl IntoIterator<Item = Pose>) -> Self {
        Self {
            pose: ranked.into_iter().next(),
        }
    }
}

/// Translation / rotation / scale, applied scale first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            translation: pose.position,
            rotation: pose.orientation,
            scale: Vec3::ONE,
        }
    }

    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_half_extents(half: Vec3) -> Self {
        Self::new(-half, half)
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        Some(it.fold(Self::new(first, first), |b, p| {
            Self::new(b.min.min(p), b.max.max(p))
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this box after `m` is applied to its corners.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        // eight corners, never empty
        Aabb::from_points(self.corners().iter().map(|c| m.transform_point3(*c)))
            .unwrap_or(*self)
    }
}
