mod aabb;
mod body;
mod controller;
mod entity_contact;
mod step;
mod tile_collision;

pub use aabb::Aabb;
pub use body::{Blocked, Body, BodyError, DEFAULT_MASS};
pub use controller::{
    BounceController, Controller, EnemyTuning, Idle, MotionController, PlayerController,
    PlayerTuning,
};
pub use entity_contact::{ContactOutcome, ContactPolicy, EntityContactResolver};
pub use step::{Controlled, SimConfig, SimulationStep, DEFAULT_GRAVITY};
pub use tile_collision::TileCollisionResolver;
