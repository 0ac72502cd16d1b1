use thiserror::Error;

use super::aabb::Aabb;

pub const DEFAULT_MASS: f32 = 1.0;

/// Per-side horizontal block flags, recomputed every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocked {
    pub left: bool,
    pub right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BodyError {
    #[error("body size must be positive and finite, got {width}x{height}")]
    InvalidSize { width: f32, height: f32 },
    #[error("body mass must be positive and finite, got {mass}")]
    InvalidMass { mass: f32 },
}

/// Rigid axis-aligned body. `x`/`y` is the top-left corner in world units.
///
/// Size and mass are fixed at construction; everything else is tick state
/// owned by the simulation step and the resolvers.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    width: f32,
    height: f32,
    mass: f32,
    pub v_x: f32,
    pub v_y: f32,
    pub is_grounded: bool,
    pub blocked: Blocked,
    alive: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Result<Self, BodyError> {
        Self::with_mass(x, y, width, height, DEFAULT_MASS)
    }

    pub fn with_mass(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        mass: f32,
    ) -> Result<Self, BodyError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(BodyError::InvalidSize { width, height });
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(BodyError::InvalidMass { mass });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
            mass,
            v_x: 0.0,
            v_y: 0.0,
            is_grounded: false,
            blocked: Blocked::default(),
            alive: true,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_rect(self.x, self.y, self.width, self.height)
    }

    /// Adds `force / mass` to the velocity. No time scaling is applied.
    pub fn apply_force(&mut self, force_x: f32, force_y: f32) {
        self.v_x += force_x / self.mass;
        self.v_y += force_y / self.mass;
    }

    /// Explicit Euler step of the position.
    pub fn integrate(&mut self, dt_seconds: f32) {
        self.x += self.v_x * dt_seconds;
        self.y += self.v_y * dt_seconds;
    }

    pub fn reset_horizontal_blocks(&mut self) {
        self.blocked = Blocked::default();
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }
}

impl AsMut<Body> for Body {
    fn as_mut(&mut self) -> &mut Body {
        self
    }
}
