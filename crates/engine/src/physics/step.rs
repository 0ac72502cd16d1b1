use tracing::debug;

use super::body::Body;
use super::controller::MotionController;
use super::entity_contact::{ContactOutcome, ContactPolicy, EntityContactResolver};
use super::tile_collision::TileCollisionResolver;
use crate::app::ActionSource;
use crate::level::TileGrid;

pub const DEFAULT_GRAVITY: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Velocity added per tick to airborne bodies, divided by mass.
    /// Not scaled by the tick length, so it is tied to the tick rate.
    pub gravity: f32,
    pub contact_policy: ContactPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            contact_policy: ContactPolicy::default(),
        }
    }
}

/// A body together with whatever steers it.
pub trait Controlled: AsMut<Body> {
    fn parts_mut(&mut self) -> (&mut Body, &mut dyn MotionController);
}

/// One fixed tick of movement and collision for a set of bodies.
#[derive(Debug, Clone, Copy)]
pub struct SimulationStep<'a> {
    gravity: f32,
    tiles: TileCollisionResolver<'a>,
    contacts: EntityContactResolver,
}

impl<'a> SimulationStep<'a> {
    pub fn new(grid: &'a TileGrid, config: &SimConfig) -> Self {
        Self {
            gravity: config.gravity,
            tiles: TileCollisionResolver::new(grid),
            contacts: EntityContactResolver::new(config.contact_policy),
        }
    }

    pub fn tiles(&self) -> &TileCollisionResolver<'a> {
        &self.tiles
    }

    /// Advances every live entity in list order, then resolves contacts
    /// between them once.
    pub fn run<T: Controlled>(
        &self,
        entities: &mut [T],
        input: &dyn ActionSource,
        dt_seconds: f32,
    ) -> Vec<ContactOutcome> {
        self.move_bodies(entities, input, dt_seconds);
        let outcomes = self.contacts.resolve(entities);
        if !outcomes.is_empty() {
            debug!(count = outcomes.len(), "entity_contacts_resolved");
        }
        outcomes
    }

    /// Movement and tile collision only, no entity contacts.
    pub fn move_bodies<T: Controlled>(
        &self,
        entities: &mut [T],
        input: &dyn ActionSource,
        dt_seconds: f32,
    ) {
        for entity in entities.iter_mut() {
            let (body, controller) = entity.parts_mut();
            if !body.is_alive() {
                continue;
            }
            self.step_body(body, controller, input, dt_seconds);
        }
    }

    pub fn step_body(
        &self,
        body: &mut Body,
        controller: &mut dyn MotionController,
        input: &dyn ActionSource,
        dt_seconds: f32,
    ) {
        if !body.is_grounded {
            body.apply_force(0.0, self.gravity);
        }

        body.reset_horizontal_blocks();
        self.tiles.check_horizontal_block(body);

        controller.drive(body, input);
        body.integrate(dt_seconds);

        self.tiles.resolve(body);

        // Vertical resolution only ever sets the flag; prove it every tick.
        if body.is_grounded {
            body.is_grounded = self.tiles.revalidate_grounded(body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ActionStates, InputAction};
    use crate::level::{TileId, TileKeys};
    use crate::physics::{Controller, Idle, PlayerController, PlayerTuning};

    const DT: f32 = 1.0 / 60.0;

    struct TestEntity {
        body: Body,
        controller: Controller,
    }

    impl AsMut<Body> for TestEntity {
        fn as_mut(&mut self) -> &mut Body {
            &mut self.body
        }
    }

    impl Controlled for TestEntity {
        fn parts_mut(&mut self) -> (&mut Body, &mut dyn MotionController) {
            (&mut self.body, &mut self.controller)
        }
    }

    fn grid(tile_map: &[Vec<TileId>]) -> TileGrid {
        TileGrid::from_id_map(tile_map, 32.0, &TileKeys::default()).expect("grid")
    }

    fn floor_grid() -> TileGrid {
        let mut tile_map = vec![vec![0; 8]; 5];
        tile_map.push(vec![1; 8]);
        grid(&tile_map)
    }

    fn player() -> Controller {
        Controller::Player(PlayerController::new(&PlayerTuning::default()))
    }

    #[test]
    fn gravity_only_applies_while_airborne() {
        let grid = floor_grid();
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::with_mass(40.0, 20.0, 20.0, 20.0, 3.0).expect("body");

        step.step_body(&mut body, &mut Idle, &ActionStates::default(), DT);

        assert!((body.v_y - 0.5).abs() < 1e-6);
        assert!((body.y - (20.0 + 0.5 * DT)).abs() < 1e-4);
    }

    #[test]
    fn falling_body_lands_and_rests_without_jitter() {
        let grid = floor_grid();
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::new(40.0, 100.0, 20.0, 20.0).expect("body");
        let input = ActionStates::default();

        for _ in 0..200 {
            step.step_body(&mut body, &mut Idle, &input, DT);
        }
        assert!(body.is_grounded);
        assert_eq!(body.y, 140.0);
        assert_eq!(body.v_y, 0.0);

        for _ in 0..30 {
            step.step_body(&mut body, &mut Idle, &input, DT);
            assert_eq!(body.y, 140.0);
            assert!(body.is_grounded);
        }
    }

    #[test]
    fn grounded_flag_clears_when_nothing_is_below() {
        let grid = floor_grid();
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::new(40.0, 40.0, 20.0, 20.0).expect("body");
        body.is_grounded = true;

        step.step_body(&mut body, &mut Idle, &ActionStates::default(), DT);

        assert!(!body.is_grounded);
        assert_eq!(body.y, 40.0);
    }

    #[test]
    fn walking_off_a_ledge_starts_a_fall() {
        let mut tile_map = vec![vec![0; 8]; 3];
        tile_map.push(vec![1, 1, 0, 0, 0, 0, 0, 0]);
        let grid = grid(&tile_map);
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::new(30.0, 76.0, 20.0, 20.0).expect("body");
        body.is_grounded = true;
        let mut controller = player();
        let input = ActionStates::from_actions(&[InputAction::MoveRight]);

        let mut ticks = 0;
        while body.is_grounded && ticks < 60 {
            step.step_body(&mut body, &mut controller, &input, DT);
            ticks += 1;
        }

        assert!(!body.is_grounded);
        assert!(body.x >= 64.0);
    }

    #[test]
    fn blocked_side_keeps_player_against_wall() {
        let mut tile_map = vec![vec![0, 0, 0, 1]; 3];
        tile_map.push(vec![1; 4]);
        let grid = grid(&tile_map);
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::new(76.0, 76.0, 20.0, 20.0).expect("body");
        body.is_grounded = true;
        let mut controller = player();
        let input = ActionStates::from_actions(&[InputAction::MoveRight]);

        step.step_body(&mut body, &mut controller, &input, DT);

        assert!(body.blocked.right);
        assert!(!body.blocked.left);
        assert_eq!(body.v_x, 0.0);
        assert_eq!(body.x, 76.0);
        assert!(body.is_grounded);
    }

    #[test]
    fn blocked_flags_are_recomputed_each_tick() {
        let mut tile_map = vec![vec![0, 0, 0, 1]; 3];
        tile_map.push(vec![1; 4]);
        let grid = grid(&tile_map);
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::new(40.0, 76.0, 20.0, 20.0).expect("body");
        body.is_grounded = true;
        body.blocked.right = true;
        body.blocked.left = true;

        step.step_body(&mut body, &mut Idle, &ActionStates::default(), DT);

        assert!(!body.blocked.right);
        assert!(!body.blocked.left);
    }

    #[test]
    fn jump_lifts_grounded_player() {
        let grid = floor_grid();
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut body = Body::new(40.0, 140.0, 20.0, 20.0).expect("body");
        body.is_grounded = true;
        let mut controller = player();

        step.step_body(
            &mut body,
            &mut controller,
            &ActionStates::from_actions(&[InputAction::Jump]),
            DT,
        );

        assert!(!body.is_grounded);
        assert!(body.y < 140.0);
        assert_eq!(body.v_y, -300.0);
    }

    #[test]
    fn run_steps_all_entities_then_resolves_contacts() {
        let grid = grid(&vec![vec![0; 10]; 10]);
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut entities = vec![
            TestEntity {
                body: Body::new(100.0, 60.0, 50.0, 50.0).expect("player"),
                controller: Controller::Idle(Idle),
            },
            TestEntity {
                body: Body::new(100.0, 100.0, 50.0, 50.0).expect("enemy"),
                controller: Controller::Idle(Idle),
            },
        ];

        let outcomes = step.run(&mut entities, &ActionStates::default(), DT);

        assert_eq!(outcomes, vec![ContactOutcome::Stomped { index: 1 }]);
        assert!(entities[0].body.v_y > 0.0);
        assert!(entities[1].body.v_y > 0.0);
        assert!(!entities[1].body.is_alive());
    }

    #[test]
    fn run_skips_dead_entities() {
        let grid = grid(&vec![vec![0; 4]; 4]);
        let step = SimulationStep::new(&grid, &SimConfig::default());
        let mut dead = Body::new(0.0, 0.0, 10.0, 10.0).expect("body");
        dead.kill();
        let mut entities = vec![TestEntity {
            body: dead,
            controller: Controller::Idle(Idle),
        }];

        step.run(&mut entities, &ActionStates::default(), DT);

        assert_eq!(entities[0].body.v_y, 0.0);
        assert_eq!(entities[0].body.y, 0.0);
    }
}
