/// Axis-aligned box in world units, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width,
            bottom: y + height,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.right > other.left
            && self.left < other.right
            && self.bottom > other.top
            && self.top < other.bottom
    }

    /// Penetration depth along each axis as `(overlap_x, overlap_y)`.
    ///
    /// Only meaningful when [`Aabb::overlaps`] holds; each component is the
    /// smaller of the two one-sided depths on that axis.
    pub fn overlap_depths(&self, other: &Aabb) -> (f32, f32) {
        let overlap_x = (self.right - other.left).min(other.right - self.left);
        let overlap_y = (self.bottom - other.top).min(other.bottom - self.top);
        (overlap_x, overlap_y)
    }
}
