//! World state: entities, scheduler, event bus, and task dispatch
//!
//! The world owns everything the host talks to: the player state machine,
//! hostiles, power-ups, the central scheduler, the event bus, and the seeded
//! RNG. Overlap notifications from the external physics layer arrive through
//! the `on_*` entry points; scheduled work comes back through [`World::dispatch`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::{
    ATTACK_DURATION_MS, GAMBLE_ARM_MS, GAMBLE_SPIN_MS, POWERUP_EFFECT_MS, POWERUP_REGEN_MS,
};
use crate::tuning::Tuning;

use super::clock::Clock;
use super::events::{EventBus, GameEvent, GameStatus};
use super::patrol::{Hostile, PatrolSpec};
use super::player::Player;
use super::powerup::{self, EffectOutcome, PowerUp, PowerUpKind, Reversal};

/// Scheduled work item, dispatched by the world after each scheduler pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    StaminaRegenGrace,
    StaminaRegenPulse,
    DamageTintOver,
    DamageWindowOver,
    DeathSpinOver,
    AttackOver { hostile: u32 },
    Reactivate { powerup: u32 },
    GambleResolve { powerup: u32 },
    GambleArm { powerup: u32 },
    RevertEffect { reversal: Reversal },
}

/// Complete simulation state for one run
#[derive(Debug)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub player: Player,
    pub hostiles: Vec<Hostile>,
    pub powerups: Vec<PowerUp>,
    pub clock: Clock<Task>,
    pub bus: EventBus,
    /// Terminal outcome; set once, never overwritten
    pub status: Option<GameStatus>,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(&tuning),
            tuning,
            hostiles: Vec::new(),
            powerups: Vec::new(),
            clock: Clock::new(),
            bus: EventBus::new(),
            status: None,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_hostile(&mut self, pos: Vec2, spec: PatrolSpec) -> u32 {
        let id = self.next_entity_id();
        self.hostiles.push(Hostile::new(id, pos, spec));
        id
    }

    pub fn spawn_power_up(&mut self, pos: Vec2, kind: PowerUpKind) -> u32 {
        let id = self.next_entity_id();
        self.powerups.push(PowerUp::new(id, pos, kind));
        id
    }

    /// Oxygen-only spawn; keeps its kind across cooldowns
    pub fn spawn_oxygen_bubble(&mut self, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        self.powerups.push(PowerUp::oxygen_spawn(id, pos));
        id
    }

    fn hostile_mut(&mut self, id: u32) -> Option<&mut Hostile> {
        self.hostiles.iter_mut().find(|h| h.id == id)
    }

    fn powerup_index(&self, id: u32) -> Option<usize> {
        self.powerups.iter().position(|p| p.id == id)
    }

    // ---- External overlap / signal entry points ----

    /// Player↔hostile overlap: the hostile snaps into its attack and the
    /// player takes a hit, unless still inside the advisory re-hit window.
    /// Overlap events repeat every frame while the overlap persists; the
    /// window check is what keeps one brush from draining all hearts.
    pub fn on_hostile_contact(&mut self, hostile_id: u32) {
        if self.player.taking_damage {
            return;
        }
        let Some(hostile) = self.hostile_mut(hostile_id) else {
            return;
        };
        if hostile.try_attack() {
            self.clock.after(
                ATTACK_DURATION_MS,
                Task::AttackOver {
                    hostile: hostile_id,
                },
            );
        }
        self.player.take_damage(1, &mut self.clock, &mut self.bus);
    }

    /// Player↔power-up overlap. No-op while the instance is consumed or
    /// mid-gamble.
    pub fn on_power_up_contact(&mut self, powerup_id: u32) {
        let Some(idx) = self.powerup_index(powerup_id) else {
            return;
        };
        if !self.powerups[idx].usable() {
            return;
        }

        let kind = self.powerups[idx].kind;
        match powerup::apply_effect(kind, &mut self.player, &mut self.bus) {
            EffectOutcome::Applied { reversal } => {
                if let Some(reversal) = reversal {
                    self.clock
                        .after(POWERUP_EFFECT_MS, Task::RevertEffect { reversal });
                }
                self.powerups[idx].deactivate();
                self.clock.after(
                    POWERUP_REGEN_MS,
                    Task::Reactivate {
                        powerup: powerup_id,
                    },
                );
            }
            EffectOutcome::Gamble => {
                self.powerups[idx].spinning = true;
                self.clock.after(
                    GAMBLE_SPIN_MS,
                    Task::GambleResolve {
                        powerup: powerup_id,
                    },
                );
            }
        }
    }

    /// Player↔terrain contact; only feeds facing disambiguation
    pub fn on_terrain_contact(&mut self) {
        let now = self.clock.now_ms();
        self.player.note_terrain_contact(now);
    }

    /// Player reached the goal region
    pub fn on_goal_reached(&mut self) {
        self.finish(GameStatus::Win);
    }

    /// Presentation layer finished mounting; answer with an initial snapshot
    pub fn on_ui_ready(&mut self) {
        self.bus.publish(GameEvent::UiReady);
        self.bus.publish(GameEvent::UiStateChanged {
            snapshot: self.player.snapshot(),
        });
    }

    fn finish(&mut self, status: GameStatus) {
        if self.status.is_some() {
            return;
        }
        self.status = Some(status);
        log::info!("game ended: {status:?}");
        self.bus.publish(GameEvent::GameEnded { status });
    }

    /// Route one due task to its owner
    pub(crate) fn dispatch(&mut self, task: Task) {
        match task {
            Task::StaminaRegenGrace => self.player.on_regen_grace(&mut self.clock),
            Task::StaminaRegenPulse => {
                self.player.on_regen_pulse(&mut self.clock, &mut self.bus);
            }
            Task::DamageTintOver => self.player.clear_tint(),
            Task::DamageWindowOver => self.player.close_damage_window(),
            Task::DeathSpinOver => self.finish(GameStatus::Lose),
            Task::AttackOver { hostile } => {
                if let Some(hostile) = self.hostile_mut(hostile) {
                    hostile.finish_attack();
                }
            }
            Task::Reactivate { powerup } => {
                if let Some(idx) = self.powerup_index(powerup) {
                    self.powerups[idx].reactivate(&mut self.rng);
                }
            }
            Task::GambleResolve { powerup } => self.resolve_gamble(powerup),
            Task::GambleArm { powerup } => {
                if let Some(idx) = self.powerup_index(powerup) {
                    self.powerups[idx].spinning = false;
                }
            }
            Task::RevertEffect { reversal } => {
                powerup::revert_effect(reversal, &mut self.player, &mut self.bus);
            }
        }
    }

    /// The spin is over: either reroll to a fresh kind (usable after a short
    /// arm delay) or come up empty and go on the full cooldown. There is no
    /// third outcome.
    fn resolve_gamble(&mut self, powerup_id: u32) {
        let Some(idx) = self.powerup_index(powerup_id) else {
            return;
        };
        let win = self.rng.random::<f32>() < self.tuning.gamble_odds;

        if win {
            let kind = PowerUpKind::roll(&mut self.rng);
            self.powerups[idx].kind = kind;
            self.clock.after(
                GAMBLE_ARM_MS,
                Task::GambleArm {
                    powerup: powerup_id,
                },
            );
            log::debug!("gamble rerolled power-up {powerup_id} to {kind:?}");
        } else {
            let pos = self.powerups[idx].pos;
            self.powerups[idx].spinning = false;
            self.powerups[idx].deactivate();
            self.clock.after(
                POWERUP_REGEN_MS,
                Task::Reactivate {
                    powerup: powerup_id,
                },
            );
            self.bus.publish(GameEvent::FloatingText {
                label: "Nope!".to_owned(),
                pos,
            });
            log::debug!("gamble came up empty for power-up {powerup_id}");
        }
    }
}
