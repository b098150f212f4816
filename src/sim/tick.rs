//! Per-frame simulation step
//!
//! The host calls [`tick`] once per frame with the elapsed milliseconds.
//! Frame-driven mutations (input, kinematics, patrol playback) run first;
//! the scheduler pass then releases every task due within the frame, FIFO
//! within equal due times. Timer work therefore always observes the frame's
//! state, never the other way around.

use super::state::World;

/// Input signals for a single frame
///
/// Directions are hold-style; the dive signals are edges from the host's
/// input layer.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub dive_start: bool,
    pub dive_stop: bool,
}

/// Advance the world by `dt_ms`
pub fn tick(world: &mut World, input: &TickInput, dt_ms: f32) {
    world.player.tick(dt_ms, input, &world.tuning, &mut world.clock);
    for hostile in world.hostiles.iter_mut() {
        hostile.advance(dt_ms);
    }
    for task in world.clock.advance(dt_ms) {
        world.dispatch(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEATH_SPIN_MS;
    use crate::sim::events::{GameEvent, GameStatus};
    use crate::sim::patrol::{PatrolPattern, PatrolSpec};
    use crate::sim::powerup::PowerUpKind;
    use glam::Vec2;

    fn run_idle(world: &mut World, total_ms: f32, step_ms: f32) {
        let input = TickInput::default();
        let mut remaining = total_ms;
        while remaining > 0.0 {
            let dt = remaining.min(step_ms);
            tick(world, &input, dt);
            remaining -= dt;
        }
    }

    fn game_ended(world: &World) -> Option<GameStatus> {
        world.bus.queued().iter().find_map(|e| match e {
            GameEvent::GameEnded { status } => Some(*status),
            _ => None,
        })
    }

    #[test]
    fn test_frame_mutations_run_before_due_timers() {
        // A hit at t=0 opens the 1000 ms window; the frame that reaches
        // t=1000 moves the player first, then closes the window.
        let mut world = World::new(11);
        world.player.take_damage(1, &mut world.clock, &mut world.bus);
        run_idle(&mut world, 999.0, 111.0);
        assert!(world.player.taking_damage);
        tick(&mut world, &TickInput::default(), 1.0);
        assert!(!world.player.taking_damage);
    }

    #[test]
    fn test_damage_to_death_publishes_lose_after_spin() {
        let mut world = World::new(12);
        world.player.take_damage(1, &mut world.clock, &mut world.bus);
        assert_eq!(world.player.health, 2);
        world.player.take_damage(2, &mut world.clock, &mut world.bus);
        assert_eq!(world.player.health, 0);
        assert!(world.player.is_dead());
        assert!(game_ended(&world).is_none());

        run_idle(&mut world, DEATH_SPIN_MS, 16.0);
        assert_eq!(game_ended(&world), Some(GameStatus::Lose));
        assert_eq!(world.status, Some(GameStatus::Lose));
    }

    #[test]
    fn test_suffocation_follows_the_death_path() {
        let mut world = World::new(13);
        world.player.oxygen = 1;
        world.player.consume_oxygen(&mut world.clock, &mut world.bus);
        assert_eq!(world.player.oxygen, 0);
        assert_eq!(world.player.health, 0);
        assert!(world.player.is_dead());

        run_idle(&mut world, DEATH_SPIN_MS, 16.0);
        assert_eq!(game_ended(&world), Some(GameStatus::Lose));
    }

    #[test]
    fn test_health_events_carry_new_totals() {
        let mut world = World::new(14);
        world.player.take_damage(1, &mut world.clock, &mut world.bus);
        assert!(
            world
                .bus
                .queued()
                .iter()
                .any(|e| matches!(e, GameEvent::HealthChanged { health: 2 }))
        );
    }

    #[test]
    fn test_patrols_advance_while_player_idles() {
        let mut world = World::new(15);
        world.spawn_hostile(
            Vec2::ZERO,
            PatrolSpec {
                pattern: PatrolPattern::Horizontal,
                area: 60.0,
            },
        );
        // Past the inter-leg delay and into the right leg
        run_idle(&mut world, 1_200.0, 16.0);
        assert!(world.hostiles[0].pos.x > 0.0);
    }

    #[test]
    fn test_terrain_contact_freezes_facing() {
        let mut world = World::new(16);
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut world, &input, 16.0);
        let facing = world.player.angle;

        world.on_terrain_contact();
        let input = TickInput {
            down: true,
            ..Default::default()
        };
        tick(&mut world, &input, 16.0);
        assert_eq!(world.player.angle, facing);

        // Past the grace window the facing follows velocity again
        run_idle(&mut world, 200.0, 50.0);
        tick(&mut world, &input, 16.0);
        assert!(world.player.angle > facing);
    }

    #[test]
    fn test_determinism_same_seed_same_run() {
        let build = || {
            let mut world = World::new(99);
            world.spawn_hostile(
                Vec2::new(30.0, 0.0),
                PatrolSpec {
                    pattern: PatrolPattern::Mixed,
                    area: 80.0,
                },
            );
            world.spawn_power_up(Vec2::ZERO, PowerUpKind::Random);
            world
        };
        let mut a = build();
        let mut b = build();

        for world in [&mut a, &mut b] {
            world.on_power_up_contact(2);
            run_idle(world, 5_000.0, 17.0);
        }

        assert_eq!(a.powerups[0].kind, b.powerups[0].kind);
        assert_eq!(a.powerups[0].active, b.powerups[0].active);
        assert_eq!(a.hostiles[0].pos, b.hostiles[0].pos);
        assert_eq!(a.hostiles[0].angle, b.hostiles[0].angle);
    }
}
