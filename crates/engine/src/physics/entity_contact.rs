use serde::Deserialize;
use tracing::debug;

use super::body::Body;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum ContactPolicy {
    /// The primary is tested against every secondary in list order.
    #[default]
    PrimaryVsEach,
    /// Only a lone primary/secondary pair is resolved; any larger list is
    /// skipped entirely.
    SinglePairOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// The primary landed on the secondary at `index`.
    Stomped { index: usize },
    /// The primary ran into the secondary at `index` from the side.
    PrimaryKilled { index: usize },
}

/// Resolves primary-versus-secondary contacts. Index 0 is the primary.
///
/// Only liveness changes; bodies are never pushed apart.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityContactResolver {
    policy: ContactPolicy,
}

impl EntityContactResolver {
    pub fn new(policy: ContactPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ContactPolicy {
        self.policy
    }

    pub fn resolve<T: AsMut<Body>>(&self, entities: &mut [T]) -> Vec<ContactOutcome> {
        let mut outcomes = Vec::new();
        if entities.len() < 2 {
            return outcomes;
        }
        if self.policy == ContactPolicy::SinglePairOnly && entities.len() > 2 {
            debug!(count = entities.len(), "entity_contact_skipped");
            return outcomes;
        }

        let (primary, secondaries) = entities.split_at_mut(1);
        let primary = primary[0].as_mut();
        for (offset, secondary) in secondaries.iter_mut().enumerate() {
            if !primary.is_alive() {
                break;
            }
            let secondary = secondary.as_mut();
            if !secondary.is_alive() {
                continue;
            }
            if let Some(outcome) = resolve_pair(primary, secondary, offset + 1) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }
}

fn resolve_pair(
    primary: &mut Body,
    secondary: &mut Body,
    index: usize,
) -> Option<ContactOutcome> {
    let primary_box = primary.bounding_box();
    let secondary_box = secondary.bounding_box();
    if !primary_box.overlaps(&secondary_box) {
        return None;
    }

    let (overlap_x, overlap_y) = primary_box.overlap_depths(&secondary_box);
    if overlap_x > overlap_y {
        // Vertical contact; only a hit from above counts.
        if primary_box.top < secondary_box.top {
            secondary.kill();
            return Some(ContactOutcome::Stomped { index });
        }
        None
    } else {
        primary.kill();
        Some(ContactOutcome::PrimaryKilled { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32) -> Body {
        Body::new(x, y, 50.0, 50.0).expect("body")
    }

    #[test]
    fn stomp_from_above_kills_secondary() {
        let resolver = EntityContactResolver::default();
        let mut primary = body(100.0, 40.0);
        primary.v_y = 900.0;
        primary.integrate(1.0 / 45.0);
        let mut bodies = vec![primary, body(100.0, 100.0)];

        let outcomes = resolver.resolve(&mut bodies);

        assert_eq!(outcomes, vec![ContactOutcome::Stomped { index: 1 }]);
        assert!(bodies[0].is_alive());
        assert!(!bodies[1].is_alive());
        assert_eq!(bodies[1].y, 100.0);
    }

    #[test]
    fn side_contact_kills_primary() {
        let resolver = EntityContactResolver::default();
        let mut bodies = vec![body(60.0, 100.0), body(100.0, 100.0)];

        let outcomes = resolver.resolve(&mut bodies);

        assert_eq!(outcomes, vec![ContactOutcome::PrimaryKilled { index: 1 }]);
        assert!(!bodies[0].is_alive());
        assert!(bodies[1].is_alive());
        assert_eq!(bodies[0].x, 60.0);
    }

    #[test]
    fn equal_overlap_counts_as_side_contact() {
        let resolver = EntityContactResolver::default();
        let mut bodies = vec![body(80.0, 80.0), body(100.0, 100.0)];

        resolver.resolve(&mut bodies);

        assert!(!bodies[0].is_alive());
        assert!(bodies[1].is_alive());
    }

    #[test]
    fn vertical_contact_from_below_changes_nothing() {
        let resolver = EntityContactResolver::default();
        let mut bodies = vec![body(100.0, 140.0), body(100.0, 100.0)];

        let outcomes = resolver.resolve(&mut bodies);

        assert!(outcomes.is_empty());
        assert!(bodies[0].is_alive());
        assert!(bodies[1].is_alive());
    }

    #[test]
    fn touching_bodies_do_not_interact() {
        let resolver = EntityContactResolver::default();
        let mut bodies = vec![body(50.0, 100.0), body(100.0, 100.0)];

        assert!(resolver.resolve(&mut bodies).is_empty());
        assert!(bodies.iter().all(Body::is_alive));
    }

    #[test]
    fn fewer_than_two_bodies_is_a_no_op() {
        let resolver = EntityContactResolver::default();
        let mut lone = vec![body(0.0, 0.0)];
        assert!(resolver.resolve(&mut lone).is_empty());
        let mut none: Vec<Body> = Vec::new();
        assert!(resolver.resolve(&mut none).is_empty());
    }

    #[test]
    fn primary_vs_each_checks_every_secondary() {
        let resolver = EntityContactResolver::new(ContactPolicy::PrimaryVsEach);
        let mut bodies = vec![body(100.0, 60.0), body(500.0, 500.0), body(100.0, 100.0)];

        let outcomes = resolver.resolve(&mut bodies);

        assert_eq!(outcomes, vec![ContactOutcome::Stomped { index: 2 }]);
        assert!(bodies[1].is_alive());
        assert!(!bodies[2].is_alive());
    }

    #[test]
    fn primary_vs_each_stops_once_primary_dies() {
        let resolver = EntityContactResolver::new(ContactPolicy::PrimaryVsEach);
        let mut bodies = vec![body(60.0, 100.0), body(100.0, 100.0), body(100.0, 140.0)];

        let outcomes = resolver.resolve(&mut bodies);

        assert_eq!(outcomes, vec![ContactOutcome::PrimaryKilled { index: 1 }]);
        assert!(bodies[2].is_alive());
    }

    #[test]
    fn single_pair_policy_skips_crowds() {
        let resolver = EntityContactResolver::new(ContactPolicy::SinglePairOnly);
        let mut crowd = vec![body(60.0, 100.0), body(100.0, 100.0), body(500.0, 500.0)];
        assert!(resolver.resolve(&mut crowd).is_empty());
        assert!(crowd.iter().all(Body::is_alive));

        let mut pair = vec![body(60.0, 100.0), body(100.0, 100.0)];
        assert_eq!(
            resolver.resolve(&mut pair),
            vec![ContactOutcome::PrimaryKilled { index: 1 }]
        );
    }

    #[test]
    fn dead_secondaries_are_ignored() {
        let resolver = EntityContactResolver::default();
        let mut secondary = body(100.0, 100.0);
        secondary.kill();
        let mut bodies = vec![body(60.0, 100.0), secondary];

        assert!(resolver.resolve(&mut bodies).is_empty());
        assert!(bodies[0].is_alive());
    }

    struct Tagged {
        body: Body,
    }

    impl AsMut<Body> for Tagged {
        fn as_mut(&mut self) -> &mut Body {
            &mut self.body
        }
    }

    #[test]
    fn resolves_any_mutable_body_view() {
        let resolver = EntityContactResolver::default();
        let mut tagged = vec![
            Tagged {
                body: body(100.0, 60.0),
            },
            Tagged {
                body: body(100.0, 100.0),
            },
        ];

        let outcomes = resolver.resolve(&mut tagged);

        assert_eq!(outcomes, vec![ContactOutcome::Stomped { index: 1 }]);
        assert!(!tagged[1].body.is_alive());
    }
}
