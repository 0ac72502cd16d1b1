mod input;
mod roster;
mod timestep;
mod world;

pub use input::{ActionSource, ActionStates, InputAction};
pub use roster::{Actor, ActorKind, EntityId, EntityIdAllocator, EntityRoster};
pub use timestep::{FixedTimestep, LoopConfig, StepReport, TimestepError};
pub use world::{FrameReport, World, WorldEvent};
