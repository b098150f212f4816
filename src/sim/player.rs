//! Player survival state machine
//!
//! Owns health, oxygen, stamina, shield, movement caps, and the damage and
//! death transitions. All mutation goes through the methods here or the
//! effect dispatch in [`super::powerup`]; nothing else writes player state.
//!
//! Timing (damage windows, stamina regeneration, the death spin) runs on the
//! central [`Clock`](super::clock::Clock); the player keeps the pending
//! handles so stale tasks are cancelled before replacements are installed.
//! At most one stamina-regen task is ever live.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    DAMAGE_TINT_MS, DEATH_SPIN_MS, HIT_WINDOW_MS, REGEN_GRACE_MS, REGEN_PULSE_MS,
    TERRAIN_FACING_GRACE_MS,
};
use crate::normalize_angle;
use crate::tuning::Tuning;

use super::clock::{Clock, TaskHandle};
use super::events::{EventBus, GameEvent, PlayerSnapshot};
use super::state::Task;
use super::tick::TickInput;

/// The player-diver's survival and movement state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle in radians, follows velocity while accelerating
    pub angle: f32,
    /// Vertical sprite flip while swimming left
    pub flip_y: bool,

    pub health: u32,
    pub oxygen: u32,
    pub stamina: f32,
    pub max_stamina: f32,
    pub has_shield: bool,
    pub is_diving: bool,

    /// Speed cap while swimming (px/s); raised by the Speed effect
    pub speed_cap: f32,
    /// Speed cap while diving (px/s); raised by the Speed effect
    pub diving_speed_cap: f32,
    /// Visual/hitbox scale, temporarily altered by the Size effect
    pub scale: f32,
    /// Extra downward acceleration from the Gravity effect (px/s²)
    pub gravity_bias: f32,

    /// Damage tint window is open
    pub tinted: bool,
    /// Advisory re-hit window is open. Checked by the contact layer; direct
    /// `take_damage` calls still land while it is set.
    pub taking_damage: bool,

    accelerating: bool,
    dead: bool,
    death_elapsed_ms: f32,
    regen_task: Option<TaskHandle>,
    tint_task: Option<TaskHandle>,
    window_task: Option<TaskHandle>,
    last_terrain_hit_ms: Option<f64>,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            angle: 0.0,
            flip_y: false,

            health: tuning.start_health,
            oxygen: tuning.start_oxygen,
            stamina: tuning.max_stamina,
            max_stamina: tuning.max_stamina,
            has_shield: false,
            is_diving: false,

            speed_cap: tuning.speed_cap,
            diving_speed_cap: tuning.diving_speed_cap,
            scale: 1.0,
            gravity_bias: 0.0,

            tinted: false,
            taking_damage: false,

            accelerating: false,
            dead: false,
            death_elapsed_ms: 0.0,
            regen_task: None,
            tint_task: None,
            window_task: None,
            last_terrain_hit_ms: None,
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            health: self.health,
            oxygen: self.oxygen,
            stamina: self.stamina,
            max_stamina: self.max_stamina,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// Derived from the open re-hit window
    pub fn invulnerable(&self) -> bool {
        self.taking_damage
    }

    /// Per-frame update: kinematics, facing, stamina decay and the regen
    /// trigger. Dead players only play out the death spin; control input is
    /// disabled.
    pub fn tick(
        &mut self,
        dt_ms: f32,
        input: &TickInput,
        tuning: &Tuning,
        clock: &mut Clock<Task>,
    ) {
        let dt = dt_ms / 1000.0;

        if self.dead {
            if self.death_elapsed_ms < DEATH_SPIN_MS {
                self.death_elapsed_ms = (self.death_elapsed_ms + dt_ms).min(DEATH_SPIN_MS);
                let t = self.death_elapsed_ms / DEATH_SPIN_MS;
                self.angle = FRAC_PI_2 * (1.0 - t);
            }
            return;
        }

        let mut accel = Vec2::ZERO;
        if input.left {
            accel.x -= tuning.accel;
        }
        if input.right {
            accel.x += tuning.accel;
        }
        if input.up {
            accel.y -= tuning.accel;
        }
        if input.down {
            accel.y += tuning.accel;
        }
        self.accelerating = accel != Vec2::ZERO;

        if input.dive_start {
            self.start_diving(tuning, clock);
        }
        if input.dive_stop {
            self.stop_diving();
        }

        accel.y += self.gravity_bias;
        self.vel += accel * dt;
        self.vel *= tuning.drag.powf(dt);
        let cap = if self.is_diving {
            self.diving_speed_cap
        } else {
            self.speed_cap
        };
        if self.vel.length() > cap {
            self.vel = self.vel.normalize() * cap;
        }
        self.pos += self.vel * dt;

        // Facing follows velocity, frozen briefly after terrain contacts so
        // wall scrapes don't spin the sprite
        if self.accelerating && !self.terrain_grace_active(clock.now_ms()) {
            self.angle = normalize_angle(self.vel.y.atan2(self.vel.x));
            self.flip_y = self.vel.x < 0.0;
        }

        if self.is_diving {
            self.stamina = (self.stamina - tuning.stamina_drain * dt).max(0.0);
            if self.stamina == 0.0 {
                self.stop_diving();
            }
        } else if self.stamina < self.max_stamina && self.regen_task.is_none() {
            self.start_regen(clock);
        }
    }

    /// Begin diving. Silently ignored while dead, out of stamina, not
    /// accelerating, or already diving.
    pub fn start_diving(&mut self, tuning: &Tuning, clock: &mut Clock<Task>) {
        if self.dead
            || self.health == 0
            || self.stamina <= 0.0
            || !self.accelerating
            || self.is_diving
        {
            return;
        }
        self.is_diving = true;
        self.vel *= tuning.dive_boost;
        // Spending stamina cancels any pending regeneration
        if let Some(handle) = self.regen_task.take() {
            clock.cancel(handle);
        }
    }

    /// Stop diving and restore the swim speed cap
    pub fn stop_diving(&mut self) {
        if !self.is_diving {
            return;
        }
        self.is_diving = false;
        if self.vel.length() > self.speed_cap {
            self.vel = self.vel.normalize() * self.speed_cap;
        }
    }

    /// Apply a hit. The shield absorbs exactly one hit, whatever its size.
    /// Death is terminal; hits on a dead player are ignored.
    pub fn take_damage(&mut self, amount: u32, clock: &mut Clock<Task>, bus: &mut EventBus) {
        if self.dead {
            return;
        }

        if self.has_shield {
            self.has_shield = false;
            bus.publish(GameEvent::FloatingText {
                label: "Blocked!".to_owned(),
                pos: self.pos,
            });
            self.open_damage_windows(clock);
            return;
        }

        self.health = self.health.saturating_sub(amount);
        bus.publish(GameEvent::HealthChanged {
            health: self.health,
        });
        bus.publish(GameEvent::UiStateChanged {
            snapshot: self.snapshot(),
        });
        self.open_damage_windows(clock);

        if self.health == 0 {
            self.die(clock);
        }
    }

    /// Spend one unit of oxygen. Hitting zero is a hit worth the player's
    /// full current health; the shield blocks it like any other hit.
    pub fn consume_oxygen(&mut self, clock: &mut Clock<Task>, bus: &mut EventBus) {
        if self.dead {
            return;
        }
        self.oxygen = self.oxygen.saturating_sub(1);
        bus.publish(GameEvent::UiStateChanged {
            snapshot: self.snapshot(),
        });
        if self.oxygen == 0 {
            self.take_damage(self.health, clock, bus);
        }
    }

    /// Record a terrain contact; facing holds still for a short grace window
    pub fn note_terrain_contact(&mut self, now_ms: f64) {
        self.last_terrain_hit_ms = Some(now_ms);
    }

    fn terrain_grace_active(&self, now_ms: f64) -> bool {
        self.last_terrain_hit_ms
            .is_some_and(|t| now_ms - t < f64::from(TERRAIN_FACING_GRACE_MS))
    }

    fn open_damage_windows(&mut self, clock: &mut Clock<Task>) {
        self.tinted = true;
        self.taking_damage = true;
        if let Some(handle) = self.tint_task.take() {
            clock.cancel(handle);
        }
        if let Some(handle) = self.window_task.take() {
            clock.cancel(handle);
        }
        self.tint_task = Some(clock.after(DAMAGE_TINT_MS, Task::DamageTintOver));
        self.window_task = Some(clock.after(HIT_WINDOW_MS, Task::DamageWindowOver));
    }

    fn die(&mut self, clock: &mut Clock<Task>) {
        self.dead = true;
        self.is_diving = false;
        self.vel = Vec2::ZERO;
        self.angle = FRAC_PI_2;
        self.death_elapsed_ms = 0.0;
        if let Some(handle) = self.regen_task.take() {
            clock.cancel(handle);
        }
        clock.after(DEATH_SPIN_MS, Task::DeathSpinOver);
        log::info!("player died");
    }

    /// Install the regen grace timer, replacing any stale task so at most
    /// one regen task is ever live
    fn start_regen(&mut self, clock: &mut Clock<Task>) {
        if let Some(handle) = self.regen_task.take() {
            clock.cancel(handle);
        }
        self.regen_task = Some(clock.after(REGEN_GRACE_MS, Task::StaminaRegenGrace));
    }

    /// Grace period elapsed with no stamina spend; begin pulsing
    pub(crate) fn on_regen_grace(&mut self, clock: &mut Clock<Task>) {
        self.regen_task = Some(clock.every(REGEN_PULSE_MS, Task::StaminaRegenPulse));
    }

    /// One regeneration pulse: a hundredth of the maximum per pulse
    pub(crate) fn on_regen_pulse(&mut self, clock: &mut Clock<Task>, bus: &mut EventBus) {
        self.stamina = (self.stamina + self.max_stamina / 100.0).min(self.max_stamina);
        if self.stamina >= self.max_stamina {
            if let Some(handle) = self.regen_task.take() {
                clock.cancel(handle);
            }
        }
        bus.publish(GameEvent::UiStateChanged {
            snapshot: self.snapshot(),
        });
    }

    pub(crate) fn clear_tint(&mut self) {
        self.tinted = false;
        self.tint_task = None;
    }

    pub(crate) fn close_damage_window(&mut self) {
        self.taking_damage = false;
        self.window_task = None;
    }

    #[cfg(test)]
    pub(crate) fn regen_task_handle(&self) -> Option<TaskHandle> {
        self.regen_task
    }
}
