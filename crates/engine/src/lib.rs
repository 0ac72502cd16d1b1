pub mod app;
pub mod level;
pub mod physics;

pub use app::{
    ActionSource, ActionStates, Actor, ActorKind, EntityId, EntityRoster, FixedTimestep,
    FrameReport, InputAction, LoopConfig, StepReport, TimestepError, World, WorldEvent,
};
pub use level::{Tile, TileGrid, TileGridError, TileId, TileKey, TileKeys, DEFAULT_TILE_SIZE};
pub use physics::{
    Aabb, Body, BodyError, ContactOutcome, ContactPolicy, Controller, EnemyTuning, PlayerTuning,
    SimConfig, SimulationStep,
};
