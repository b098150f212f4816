//! Power-up definitions and effect application
//!
//! Effects are a closed kind set dispatched by exhaustive match, so an
//! unknown kind is unrepresentable. Instant effects mutate the player here;
//! temporary effects hand back a [`Reversal`] for the world to schedule, and
//! the Random kind defers to the gamble sub-state driven by the world's
//! scheduler and RNG.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY_PULL;

use super::events::{EventBus, GameEvent};
use super::player::Player;

/// The closed set of power-up effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Oxygen,
    Random,
    Health,
    Stamina,
    Shield,
    Speed,
    Size,
    Gravity,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 8] = [
        PowerUpKind::Oxygen,
        PowerUpKind::Random,
        PowerUpKind::Health,
        PowerUpKind::Stamina,
        PowerUpKind::Shield,
        PowerUpKind::Speed,
        PowerUpKind::Size,
        PowerUpKind::Gravity,
    ];

    /// Uniform draw from the full kind set
    pub fn roll(rng: &mut Pcg32) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Temporary effect to undo once the effect duration elapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reversal {
    /// Undo the Size growth
    Shrink,
    /// Remove the Gravity pull
    RestoreGravity,
}

/// Result of applying a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutcome {
    /// Effect landed now; `reversal` wants scheduling after the effect
    /// duration
    Applied { reversal: Option<Reversal> },
    /// The Random kind: nothing landed, the gamble sub-state takes over
    Gamble,
}

/// Apply a power-up effect to the player and publish the matching
/// notifications. Exhaustive over [`PowerUpKind`].
pub fn apply_effect(kind: PowerUpKind, player: &mut Player, bus: &mut EventBus) -> EffectOutcome {
    let pos = player.pos;
    let float_text = |bus: &mut EventBus, label: &str| {
        bus.publish(GameEvent::FloatingText {
            label: label.to_owned(),
            pos,
        });
    };

    let outcome = match kind {
        PowerUpKind::Oxygen => {
            player.oxygen += 1;
            float_text(bus, "+1 oxygen");
            EffectOutcome::Applied { reversal: None }
        }
        PowerUpKind::Random => return EffectOutcome::Gamble,
        PowerUpKind::Health => {
            player.health += 1;
            bus.publish(GameEvent::HealthChanged {
                health: player.health,
            });
            float_text(bus, "+1 heart");
            EffectOutcome::Applied { reversal: None }
        }
        PowerUpKind::Stamina => {
            player.max_stamina += 20.0;
            player.stamina = player.max_stamina;
            float_text(bus, "Stamina improved!");
            EffectOutcome::Applied { reversal: None }
        }
        PowerUpKind::Shield => {
            player.has_shield = true;
            float_text(bus, "Shield acquired!");
            EffectOutcome::Applied { reversal: None }
        }
        PowerUpKind::Speed => {
            player.speed_cap += 16.0;
            player.diving_speed_cap += 24.0;
            float_text(bus, "Speed improved!");
            EffectOutcome::Applied { reversal: None }
        }
        PowerUpKind::Size => {
            player.scale *= 1.5;
            float_text(bus, "Growth spurt!");
            EffectOutcome::Applied {
                reversal: Some(Reversal::Shrink),
            }
        }
        PowerUpKind::Gravity => {
            player.gravity_bias = GRAVITY_PULL;
            float_text(bus, "Gravity augmented!");
            EffectOutcome::Applied {
                reversal: Some(Reversal::RestoreGravity),
            }
        }
    };

    bus.publish(GameEvent::UiStateChanged {
        snapshot: player.snapshot(),
    });
    outcome
}

/// Undo a temporary effect after its duration
pub fn revert_effect(reversal: Reversal, player: &mut Player, bus: &mut EventBus) {
    match reversal {
        Reversal::Shrink => {
            player.scale /= 1.5;
        }
        Reversal::RestoreGravity => {
            player.gravity_bias = 0.0;
            bus.publish(GameEvent::FloatingText {
                label: "Gravity restored!".to_owned(),
                pos: player.pos,
            });
        }
    }
    bus.publish(GameEvent::UiStateChanged {
        snapshot: player.snapshot(),
    });
}

/// A collectible power-up instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub pos: Vec2,
    pub kind: PowerUpKind,
    /// False while consumed (regeneration cooldown)
    pub active: bool,
    /// True while the gamble spin runs; the instance is inert
    pub spinning: bool,
    /// Oxygen-only spawns keep their kind across reactivation
    pub oxygen_only: bool,
}

impl PowerUp {
    pub fn new(id: u32, pos: Vec2, kind: PowerUpKind) -> Self {
        Self {
            id,
            pos,
            kind,
            active: true,
            spinning: false,
            oxygen_only: false,
        }
    }

    /// An oxygen bubble: always `Oxygen`, including after cooldown
    pub fn oxygen_spawn(id: u32, pos: Vec2) -> Self {
        Self {
            oxygen_only: true,
            ..Self::new(id, pos, PowerUpKind::Oxygen)
        }
    }

    /// Guard against re-triggering from a persistent overlap
    pub fn usable(&self) -> bool {
        self.active && !self.spinning
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// Come off cooldown with a fresh kind (oxygen bubbles keep theirs)
    pub(crate) fn reactivate(&mut self, rng: &mut Pcg32) {
        if !self.oxygen_only {
            self.kind = PowerUpKind::roll(rng);
        }
        self.active = true;
        log::debug!("power-up {} reactivated as {:?}", self.id, self.kind);
    }
}
