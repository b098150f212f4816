//! Deterministic gameplay simulation
//!
//! All runtime behavior lives here. This module must be pure and deterministic:
//! - Millisecond timestep driven by the host frame loop
//! - Seeded RNG only
//! - Timed behavior runs through the central `Clock` scheduler, never
//!   through wall-clock time
//! - No rendering or platform dependencies

pub mod clock;
pub mod events;
pub mod patrol;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use clock::{Clock, TaskHandle};
pub use events::{EventBus, GameEvent, GameStatus, PlayerSnapshot};
pub use patrol::{Axis, Hostile, Patrol, PatrolPattern, PatrolSpec, Segment};
pub use player::Player;
pub use powerup::{EffectOutcome, PowerUp, PowerUpKind, Reversal, apply_effect, revert_effect};
pub use state::{Task, World};
pub use tick::{TickInput, tick};
