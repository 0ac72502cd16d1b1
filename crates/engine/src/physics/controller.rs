use crate::app::{ActionSource, InputAction};

use super::body::Body;

/// Maps input onto velocity once per tick, before integration.
///
/// Controllers see the freshly computed `blocked` flags and the grounded
/// state carried over from the previous tick.
pub trait MotionController {
    fn drive(&mut self, body: &mut Body, input: &dyn ActionSource);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTuning {
    pub width: f32,
    pub height: f32,
    pub mass: f32,
    /// Horizontal speed in world units per second.
    pub speed: f32,
    /// Vertical velocity set on jump; negative is up.
    pub jump_force: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            mass: 1.0,
            speed: 300.0,
            jump_force: -300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTuning {
    pub width: f32,
    pub height: f32,
    pub mass: f32,
    pub jump_force: f32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            width: 50.0,
            height: 50.0,
            mass: 1.0,
            jump_force: -200.0,
        }
    }
}

/// Left/right walking plus grounded-only jumping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerController {
    speed: f32,
    jump_force: f32,
}

impl PlayerController {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            speed: tuning.speed,
            jump_force: tuning.jump_force,
        }
    }
}

impl MotionController for PlayerController {
    fn drive(&mut self, body: &mut Body, input: &dyn ActionSource) {
        body.v_x = 0.0;
        if input.is_active(InputAction::MoveRight) && !body.blocked.right {
            body.v_x = self.speed;
        }
        if input.is_active(InputAction::MoveLeft) && !body.blocked.left {
            body.v_x = -self.speed;
        }
        if input.is_active(InputAction::Jump) && body.is_grounded {
            body.v_y = self.jump_force;
            body.is_grounded = false;
        }
    }
}

/// Hops in place whenever it touches the ground. Ignores input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceController {
    jump_force: f32,
}

impl BounceController {
    pub fn new(tuning: &EnemyTuning) -> Self {
        Self {
            jump_force: tuning.jump_force,
        }
    }
}

impl MotionController for BounceController {
    fn drive(&mut self, body: &mut Body, _input: &dyn ActionSource) {
        if body.is_grounded {
            body.v_y = self.jump_force;
            body.is_grounded = false;
        }
    }
}

/// Leaves velocity untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Idle;

impl MotionController for Idle {
    fn drive(&mut self, _body: &mut Body, _input: &dyn ActionSource) {}
}

/// Controller variants an actor can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Controller {
    Player(PlayerController),
    Bounce(BounceController),
    Idle(Idle),
}

impl MotionController for Controller {
    fn drive(&mut self, body: &mut Body, input: &dyn ActionSource) {
        match self {
            Controller::Player(controller) => controller.drive(body, input),
            Controller::Bounce(controller) => controller.drive(body, input),
            Controller::Idle(controller) => controller.drive(body, input),
        }
    }
}
