//! Deep Reef - gameplay core for a 2D underwater survival action game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (survival resources, hostile patrols,
//!   power-up effects, scheduling, events)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, assets, physics overlap detection, input device polling, and
//! audio live in the host layer. The host drives [`sim::tick`] with elapsed
//! milliseconds, forwards overlap notifications to the [`sim::World`] entry
//! points, and subscribes to the [`sim::EventBus`] for display updates.

pub mod sim;
pub mod tuning;

pub use sim::{EventBus, GameEvent, GameStatus, TickInput, World};
pub use tuning::Tuning;

/// Game design constants
///
/// Fixed by design, as opposed to the balance numbers in [`tuning::Tuning`].
pub mod consts {
    /// Patrol: rotation per rotate leg (radians, a quarter turn)
    pub const PATROL_ROTATE_STEP: f32 = std::f32::consts::FRAC_PI_2;
    /// Patrol: rotate leg duration
    pub const PATROL_ROTATE_MS: f32 = 400.0;
    /// Patrol: translate leg duration
    pub const PATROL_TRANSLATE_MS: f32 = 1000.0;
    /// Patrol: rest before a delayed leg starts moving
    pub const PATROL_LEG_DELAY_MS: f32 = 700.0;
    /// Patrol: vertical float amplitude of the Static pattern (px)
    pub const PATROL_FLOAT_AMPLITUDE: f32 = 5.0;
    /// Hostile attack animation duration
    pub const ATTACK_DURATION_MS: f32 = 500.0;

    /// Power-up regeneration cooldown after use
    pub const POWERUP_REGEN_MS: f32 = 30_000.0;
    /// Lifetime of temporary effects (Size, Gravity) before reversal
    pub const POWERUP_EFFECT_MS: f32 = 7_500.0;
    /// Gamble: spin duration before the outcome is revealed
    pub const GAMBLE_SPIN_MS: f32 = 2_000.0;
    /// Gamble: delay before a successful reroll becomes usable
    pub const GAMBLE_ARM_MS: f32 = 500.0;
    /// Downward acceleration applied by the Gravity effect (px/s²)
    pub const GRAVITY_PULL: f32 = 250.0;

    /// Player: damage tint window
    pub const DAMAGE_TINT_MS: f32 = 100.0;
    /// Player: advisory re-hit window after a hit lands
    pub const HIT_WINDOW_MS: f32 = 1_000.0;
    /// Player: death transition, 90° back to neutral
    pub const DEATH_SPIN_MS: f32 = 500.0;
    /// Player: grace period before stamina regeneration starts
    pub const REGEN_GRACE_MS: f32 = 3_000.0;
    /// Player: stamina regeneration pulse interval
    pub const REGEN_PULSE_MS: f32 = 50.0;
    /// Player: facing is frozen this long after a terrain contact
    pub const TERRAIN_FACING_GRACE_MS: f32 = 150.0;
}

/// Normalize angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
