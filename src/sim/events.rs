//! Event bridge between the simulation and the presentation layer
//!
//! The bus is an explicit object owned by the world and handed to operations
//! that publish, so there is no process-wide singleton. Fan-out is read-only:
//! subscribers see `&GameEvent` and can never mutate the simulation. A drain
//! queue is kept alongside the subscribers for hosts that poll instead.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Terminal game outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Win,
    Lose,
}

/// Read-only view of the player's survival resources for display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub health: u32,
    pub oxygen: u32,
    pub stamina: f32,
    pub max_stamina: f32,
}

/// Events published for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Health total changed (damage or pickup)
    HealthChanged { health: u32 },
    /// Survival resource display should refresh
    UiStateChanged { snapshot: PlayerSnapshot },
    /// The run is over; one-shot, Win and Lose are mutually exclusive
    GameEnded { status: GameStatus },
    /// The presentation layer finished mounting
    UiReady,
    /// Transient floating label at a world position, fire-and-forget
    FloatingText { label: String, pos: Vec2 },
}

type Subscriber = Box<dyn FnMut(&GameEvent)>;

/// In-process publish/subscribe fan-out
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
    queue: Vec<GameEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener invoked synchronously on every publish
    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) {
        self.subscribers.push(Box::new(listener));
    }

    /// Publish to all subscribers and append to the drain queue
    pub fn publish(&mut self, event: GameEvent) {
        for listener in &mut self.subscribers {
            listener(&event);
        }
        self.queue.push(event);
    }

    /// Events published since the last drain
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.queue)
    }

    pub fn queued(&self) -> &[GameEvent] {
        &self.queue
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}
