use std::time::Duration;

use tracing::{debug, info};

use super::input::ActionSource;
use super::roster::{Actor, ActorKind, EntityId, EntityRoster};
use super::timestep::{FixedTimestep, LoopConfig, StepReport, TimestepError};
use crate::level::TileGrid;
use crate::physics::{
    Body, BodyError, BounceController, ContactOutcome, Controller, EnemyTuning, PlayerController,
    PlayerTuning, SimConfig, SimulationStep,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    PlayerDied { player: EntityId, by: EntityId },
    EnemyStomped { enemy: EntityId, by: EntityId },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub step: StepReport,
    pub events: Vec<WorldEvent>,
}

/// One loaded level: grid, actors and the clock that drives them.
#[derive(Debug)]
pub struct World {
    grid: TileGrid,
    roster: EntityRoster,
    config: SimConfig,
    timestep: FixedTimestep,
}

impl World {
    pub fn new(
        grid: TileGrid,
        config: SimConfig,
        loop_config: &LoopConfig,
    ) -> Result<Self, TimestepError> {
        let timestep = FixedTimestep::new(loop_config)?;
        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            gravity = config.gravity,
            contact_policy = ?config.contact_policy,
            fixed_dt_ms = timestep.fixed_dt().as_secs_f64() * 1000.0,
            "world_created"
        );
        Ok(Self {
            grid,
            roster: EntityRoster::default(),
            config,
            timestep,
        })
    }

    /// Queues the player. Spawn it before any enemy so it becomes the
    /// contact primary.
    pub fn spawn_player(
        &mut self,
        x: f32,
        y: f32,
        tuning: &PlayerTuning,
    ) -> Result<EntityId, BodyError> {
        let body = Body::with_mass(x, y, tuning.width, tuning.height, tuning.mass)?;
        let controller = Controller::Player(PlayerController::new(tuning));
        Ok(self.roster.spawn(ActorKind::Player, body, controller))
    }

    pub fn spawn_enemy(
        &mut self,
        x: f32,
        y: f32,
        tuning: &EnemyTuning,
    ) -> Result<EntityId, BodyError> {
        let body = Body::with_mass(x, y, tuning.width, tuning.height, tuning.mass)?;
        let controller = Controller::Bounce(BounceController::new(tuning));
        Ok(self.roster.spawn(ActorKind::Enemy, body, controller))
    }

    pub fn spawn(&mut self, kind: ActorKind, body: Body, controller: Controller) -> EntityId {
        self.roster.spawn(kind, body, controller)
    }

    /// Feeds one frame's wall-clock delta and runs every tick that came due.
    /// `input` is held for all of them.
    pub fn advance(&mut self, frame_dt: Duration, input: &dyn ActionSource) -> FrameReport {
        self.roster.apply_pending();

        let step = self.timestep.advance(frame_dt);
        let dt_seconds = self.timestep.fixed_dt_seconds();
        let mut events = Vec::new();
        for _ in 0..step.ticks_run {
            self.tick(input, dt_seconds, &mut events);
        }

        FrameReport { step, events }
    }

    fn tick(&mut self, input: &dyn ActionSource, dt_seconds: f32, events: &mut Vec<WorldEvent>) {
        let sim = SimulationStep::new(&self.grid, &self.config);

        // With the player gone nothing is left to take the primary role.
        if self.roster.player_is_primary() {
            let outcomes = sim.run(self.roster.actors_mut(), input, dt_seconds);
            let actors = self.roster.actors();
            events.extend(
                outcomes
                    .into_iter()
                    .map(|outcome| contact_event(actors, outcome)),
            );
        } else {
            sim.move_bodies(self.roster.actors_mut(), input, dt_seconds);
        }

        let removed = self.roster.apply_pending();
        if !removed.is_empty() {
            debug!(
                removed = removed.len(),
                remaining = self.roster.len(),
                "dead_actors_removed"
            );
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn actors(&self) -> &[Actor] {
        self.roster.actors()
    }

    pub fn player(&self) -> Option<&Actor> {
        self.roster.player()
    }

    pub fn is_player_alive(&self) -> bool {
        self.roster.player().is_some()
    }

    pub fn enemy_count(&self) -> usize {
        self.roster
            .actors()
            .iter()
            .filter(|actor| actor.kind == ActorKind::Enemy)
            .count()
    }

    pub fn total_ticks(&self) -> u64 {
        self.timestep.total_ticks()
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }
}

fn contact_event(actors: &[Actor], outcome: ContactOutcome) -> WorldEvent {
    let primary = actors[0].id;
    match outcome {
        ContactOutcome::Stomped { index } => {
            let enemy = actors[index].id;
            info!(enemy = ?enemy, by = ?primary, "enemy_stomped");
            WorldEvent::EnemyStomped { enemy, by: primary }
        }
        ContactOutcome::PrimaryKilled { index } => {
            let by = actors[index].id;
            info!(player = ?primary, by = ?by, "player_died");
            WorldEvent::PlayerDied {
                player: primary,
                by,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ActionStates, InputAction};
    use crate::level::{TileId, TileKeys};
    use crate::physics::Idle;

    const FRAME: Duration = Duration::from_micros(16_667);

    fn open_world() -> World {
        let tile_map: Vec<Vec<TileId>> = vec![vec![0; 20]; 20];
        let grid = TileGrid::from_id_map(&tile_map, 32.0, &TileKeys::default()).expect("grid");
        World::new(grid, SimConfig::default(), &LoopConfig::default()).expect("world")
    }

    fn floor_world() -> World {
        let mut tile_map: Vec<Vec<TileId>> = vec![vec![0; 20]; 11];
        tile_map.push(vec![1; 20]);
        let grid = TileGrid::from_id_map(&tile_map, 32.0, &TileKeys::default()).expect("grid");
        World::new(grid, SimConfig::default(), &LoopConfig::default()).expect("world")
    }

    fn spawn_idle(world: &mut World, kind: ActorKind, x: f32, y: f32) -> EntityId {
        let body = Body::new(x, y, 50.0, 50.0).expect("body");
        world.spawn(kind, body, Controller::Idle(Idle))
    }

    #[test]
    fn stomp_removes_enemy_and_reports_it() {
        let mut world = open_world();
        let player = spawn_idle(&mut world, ActorKind::Player, 100.0, 60.0);
        let enemy = spawn_idle(&mut world, ActorKind::Enemy, 100.0, 100.0);

        let report = world.advance(FRAME, &ActionStates::default());

        assert_eq!(report.step.ticks_run, 1);
        assert_eq!(
            report.events,
            vec![WorldEvent::EnemyStomped { enemy, by: player }]
        );
        assert_eq!(world.enemy_count(), 0);
        assert!(world.is_player_alive());
    }

    #[test]
    fn side_contact_kills_player_and_stops_contacts() {
        let mut world = open_world();
        let player = spawn_idle(&mut world, ActorKind::Player, 60.0, 100.0);
        let enemy = spawn_idle(&mut world, ActorKind::Enemy, 100.0, 100.0);
        spawn_idle(&mut world, ActorKind::Enemy, 120.0, 100.0);

        let report = world.advance(FRAME, &ActionStates::default());

        assert_eq!(
            report.events,
            vec![WorldEvent::PlayerDied { player, by: enemy }]
        );
        assert!(!world.is_player_alive());
        assert_eq!(world.enemy_count(), 2);

        // Overlapping enemies never fight each other.
        let later = world.advance(FRAME * 3, &ActionStates::default());
        assert!(later.events.is_empty());
        assert_eq!(world.enemy_count(), 2);
    }

    #[test]
    fn frame_deltas_drive_whole_ticks() {
        let mut world = open_world();
        let input = ActionStates::default();

        let first = world.advance(Duration::from_millis(33), &input);
        assert_eq!(first.step.ticks_run, 2);
        assert_eq!(world.advance(Duration::ZERO, &input).step.ticks_run, 0);
        assert_eq!(world.total_ticks(), 2);
    }

    #[test]
    fn player_lands_and_walks_along_the_floor() {
        let mut world = floor_world();
        world
            .spawn_player(64.0, 302.0, &PlayerTuning::default())
            .expect("player");
        let input = ActionStates::from_actions(&[InputAction::MoveRight]);

        let report = world.advance(Duration::from_millis(100), &input);

        assert_eq!(report.step.ticks_run, 6);
        let player = world.player().expect("player");
        assert!(player.body.is_grounded);
        assert_eq!(player.body.y, 302.0);
        assert!((player.body.x - 94.0).abs() < 1e-3);
    }

    #[test]
    fn bouncing_enemy_leaves_the_floor_again() {
        let mut world = floor_world();
        world
            .spawn_enemy(300.0, 302.0, &EnemyTuning::default())
            .expect("enemy");
        let input = ActionStates::default();

        world.advance(FRAME, &input);
        let enemy = &world.actors()[0];
        assert!(enemy.body.is_grounded);

        world.advance(FRAME, &input);
        let enemy = &world.actors()[0];
        assert!(!enemy.body.is_grounded);
        assert!(enemy.body.y < 302.0);
    }

    #[test]
    fn rejects_invalid_tuning() {
        let mut world = open_world();
        let tuning = PlayerTuning {
            mass: 0.0,
            ..PlayerTuning::default()
        };
        assert_eq!(
            world.spawn_player(0.0, 0.0, &tuning),
            Err(BodyError::InvalidMass { mass: 0.0 })
        );
    }
}
