//! Hostile patrol movement
//!
//! Each hostile loops forever through a fixed sequence of timed motion
//! segments expanded from its spawn pattern. Playback pauses while the
//! hostile is attacking and resumes from the paused point, never from the
//! start of the loop.
//!
//! Coordinates are screen-space: +x right, +y down. A "down" leg therefore
//! carries a positive y delta.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{
    PATROL_FLOAT_AMPLITUDE, PATROL_LEG_DELAY_MS, PATROL_ROTATE_MS, PATROL_ROTATE_STEP,
    PATROL_TRANSLATE_MS,
};
use crate::normalize_angle;

/// Which transform channel a segment drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Angle,
}

/// One timed leg of a patrol loop: apply `delta` on `axis` over
/// `duration_ms`, after resting `delay_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub axis: Axis,
    pub delta: f32,
    pub duration_ms: f32,
    pub delay_ms: f32,
}

impl Segment {
    fn slide_x(delta: f32, delay_ms: f32) -> Self {
        Self {
            axis: Axis::X,
            delta,
            duration_ms: PATROL_TRANSLATE_MS,
            delay_ms,
        }
    }

    fn slide_y(delta: f32, delay_ms: f32) -> Self {
        Self {
            axis: Axis::Y,
            delta,
            duration_ms: PATROL_TRANSLATE_MS,
            delay_ms,
        }
    }

    fn turn_left() -> Self {
        Self {
            axis: Axis::Angle,
            delta: -PATROL_ROTATE_STEP,
            duration_ms: PATROL_ROTATE_MS,
            delay_ms: 0.0,
        }
    }

    fn turn_right() -> Self {
        Self {
            axis: Axis::Angle,
            delta: PATROL_ROTATE_STEP,
            duration_ms: PATROL_ROTATE_MS,
            delay_ms: 0.0,
        }
    }
}

/// Movement program tag for a hostile spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PatrolPattern {
    #[default]
    Static,
    Horizontal,
    Vertical,
    Mixed,
}

/// Declarative movement program: pattern plus displacement per leg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolSpec {
    pub pattern: PatrolPattern,
    /// Displacement magnitude per translation leg (px)
    pub area: f32,
}

impl Default for PatrolSpec {
    fn default() -> Self {
        Self {
            pattern: PatrolPattern::Static,
            area: 100.0,
        }
    }
}

/// Expand a spec into its fixed looping segment sequence.
///
/// The sequences are design constants; only translation deltas scale with
/// `area`. Segment count, order, and per-segment delays must not change.
pub fn expand(spec: &PatrolSpec) -> Vec<Segment> {
    let a = spec.area;
    let d = PATROL_LEG_DELAY_MS;
    match spec.pattern {
        // Idle float, the yoyo unrolled into an up leg and a down leg
        PatrolPattern::Static => vec![
            Segment::slide_y(-PATROL_FLOAT_AMPLITUDE, 0.0),
            Segment::slide_y(PATROL_FLOAT_AMPLITUDE, 0.0),
        ],
        PatrolPattern::Horizontal => vec![Segment::slide_x(a, d), Segment::slide_x(-a, d)],
        PatrolPattern::Vertical => vec![
            Segment::turn_right(),
            Segment::slide_y(a, 0.0),
            Segment::turn_left(),
            Segment::turn_left(),
            Segment::slide_y(-a, d),
            Segment::turn_right(),
        ],
        PatrolPattern::Mixed => vec![
            Segment::slide_x(a, d),
            Segment::slide_x(-a, d),
            Segment::turn_left(),
            Segment::slide_y(a, 0.0),
            Segment::turn_right(),
            Segment::turn_right(),
            Segment::slide_y(-a, d),
            Segment::turn_left(),
            Segment::slide_x(-a, 0.0),
            Segment::slide_x(a, d),
            Segment::turn_left(),
            Segment::slide_y(-a, d),
            Segment::turn_right(),
            Segment::turn_right(),
            Segment::slide_y(a, d),
            Segment::turn_left(),
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Phase {
    Patrolling,
    Attacking,
}

/// Looping playback over an expanded segment sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patrol {
    segments: Vec<Segment>,
    index: usize,
    /// Time into the current segment, including its leading delay
    elapsed_ms: f32,
    phase: Phase,
}

impl Patrol {
    pub fn new(spec: &PatrolSpec) -> Self {
        Self {
            segments: expand(spec),
            index: 0,
            elapsed_ms: 0.0,
            phase: Phase::Patrolling,
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.phase == Phase::Attacking
    }

    pub fn segment_index(&self) -> usize {
        self.index
    }

    /// Enter the attack state, freezing playback. Returns false if an attack
    /// is already in progress (overlap events arrive every frame while the
    /// overlap persists).
    pub(crate) fn begin_attack(&mut self) -> bool {
        if self.phase == Phase::Attacking {
            return false;
        }
        self.phase = Phase::Attacking;
        true
    }

    /// Resume playback from the paused point
    pub(crate) fn end_attack(&mut self) {
        self.phase = Phase::Patrolling;
    }

    /// Advance playback by `dt_ms` and return the accumulated
    /// (translation, rotation). Leftover time rolls across segment
    /// boundaries, so one large step behaves like many small ones.
    pub fn advance(&mut self, dt_ms: f32) -> (Vec2, f32) {
        let mut translation = Vec2::ZERO;
        let mut rotation = 0.0;
        if self.phase == Phase::Attacking || self.segments.is_empty() {
            return (translation, rotation);
        }

        let mut remaining = dt_ms;
        while remaining > 0.0 {
            let seg = self.segments[self.index];
            let total = seg.delay_ms + seg.duration_ms;
            let step = remaining.min(total - self.elapsed_ms);

            // Only the active portion past the delay moves the entity
            let active_start = (self.elapsed_ms - seg.delay_ms).max(0.0);
            let active_end = (self.elapsed_ms + step - seg.delay_ms).clamp(0.0, seg.duration_ms);
            if active_end > active_start {
                let frac = (active_end - active_start) / seg.duration_ms;
                match seg.axis {
                    Axis::X => translation.x += seg.delta * frac,
                    Axis::Y => translation.y += seg.delta * frac,
                    Axis::Angle => rotation += seg.delta * frac,
                }
            }

            self.elapsed_ms += step;
            remaining -= step;
            if self.elapsed_ms >= total {
                self.elapsed_ms = 0.0;
                self.index = (self.index + 1) % self.segments.len();
            }
        }

        (translation, rotation)
    }
}

/// A patrolling hostile entity. Owns its transform exclusively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hostile {
    pub id: u32,
    pub pos: Vec2,
    /// Facing angle in radians
    pub angle: f32,
    /// Horizontal sprite flip, follows the current leg's x direction
    pub flip_x: bool,
    pub patrol: Patrol,
}

impl Hostile {
    pub fn new(id: u32, pos: Vec2, spec: PatrolSpec) -> Self {
        Self {
            id,
            pos,
            angle: 0.0,
            flip_x: false,
            patrol: Patrol::new(&spec),
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.patrol.is_attacking()
    }

    /// Advance the patrol loop and apply its motion to the transform
    pub fn advance(&mut self, dt_ms: f32) {
        let (translation, rotation) = self.patrol.advance(dt_ms);
        if translation.x > 0.0 {
            self.flip_x = false;
        } else if translation.x < 0.0 {
            self.flip_x = true;
        }
        self.pos += translation;
        self.angle = normalize_angle(self.angle + rotation);
    }

    /// Returns true if the attack started; false while one is in progress
    pub fn try_attack(&mut self) -> bool {
        self.patrol.begin_attack()
    }

    pub fn finish_attack(&mut self) {
        self.patrol.end_attack();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ATTACK_DURATION_MS;

    #[test]
    fn test_expansion_is_fixed_per_pattern() {
        let spec = |pattern| PatrolSpec {
            pattern,
            area: 100.0,
        };
        assert_eq!(expand(&spec(PatrolPattern::Static)).len(), 2);
        assert_eq!(expand(&spec(PatrolPattern::Horizontal)).len(), 2);
        assert_eq!(expand(&spec(PatrolPattern::Vertical)).len(), 6);
        assert_eq!(expand(&spec(PatrolPattern::Mixed)).len(), 16);

        // Deterministic: two expansions of the same spec are identical
        assert_eq!(
            expand(&spec(PatrolPattern::Mixed)),
            expand(&spec(PatrolPattern::Mixed))
        );
    }

    #[test]
    fn test_delay_produces_no_motion() {
        let mut patrol = Patrol::new(&PatrolSpec {
            pattern: PatrolPattern::Horizontal,
            area: 80.0,
        });
        let (translation, rotation) = patrol.advance(PATROL_LEG_DELAY_MS);
        assert_eq!(translation, Vec2::ZERO);
        assert_eq!(rotation, 0.0);

        // The active leg then covers the full delta
        let (translation, _) = patrol.advance(1000.0);
        assert!((translation.x - 80.0).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_loop_returns_to_origin() {
        let mut hostile = Hostile::new(
            1,
            Vec2::new(10.0, 20.0),
            PatrolSpec {
                pattern: PatrolPattern::Horizontal,
                area: 64.0,
            },
        );
        // Two legs of delay 700 + duration 1000 each
        for _ in 0..200 {
            hostile.advance(17.0);
        }
        assert!((hostile.pos.x - 10.0).abs() < 1.0);
        assert!((hostile.pos.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_vertical_rotations_cancel_over_one_loop() {
        let spec = PatrolSpec {
            pattern: PatrolPattern::Vertical,
            area: 50.0,
        };
        let loop_ms: f32 = expand(&spec)
            .iter()
            .map(|s| s.delay_ms + s.duration_ms)
            .sum();

        let mut hostile = Hostile::new(2, Vec2::ZERO, spec);
        let mut remaining = loop_ms;
        while remaining > 0.0 {
            let step = remaining.min(16.0);
            hostile.advance(step);
            remaining -= step;
        }
        // +90, -90, -90, +90 nets to zero; down then up nets to zero
        assert!(hostile.angle.abs() < 1e-3);
        assert!(hostile.pos.length() < 1e-2);
    }

    #[test]
    fn test_flip_follows_horizontal_direction() {
        let mut hostile = Hostile::new(
            3,
            Vec2::ZERO,
            PatrolSpec {
                pattern: PatrolPattern::Horizontal,
                area: 40.0,
            },
        );
        hostile.advance(PATROL_LEG_DELAY_MS + 100.0);
        assert!(!hostile.flip_x);
        // Finish the right leg, rest, then enter the left leg
        hostile.advance(900.0 + PATROL_LEG_DELAY_MS + 100.0);
        assert!(hostile.flip_x);
    }

    #[test]
    fn test_attack_pauses_and_resumes_from_paused_point() {
        let spec = PatrolSpec {
            pattern: PatrolPattern::Horizontal,
            area: 100.0,
        };

        // Uninterrupted reference run
        let mut reference = Hostile::new(4, Vec2::ZERO, spec);
        reference.advance(PATROL_LEG_DELAY_MS + 500.0);
        reference.advance(300.0);

        // Same playback with an attack pause in the middle
        let mut hostile = Hostile::new(5, Vec2::ZERO, spec);
        hostile.advance(PATROL_LEG_DELAY_MS + 500.0);
        assert!(hostile.try_attack());
        assert!(hostile.is_attacking());
        // Re-entrant attacks are ignored while one is in progress
        assert!(!hostile.try_attack());

        // Frozen during the attack
        let paused_pos = hostile.pos;
        hostile.advance(ATTACK_DURATION_MS);
        assert_eq!(hostile.pos, paused_pos);

        hostile.finish_attack();
        assert!(!hostile.is_attacking());
        hostile.advance(300.0);
        assert!((hostile.pos.x - reference.pos.x).abs() < 1e-3);
        assert_eq!(hostile.patrol.segment_index(), 0);
    }
}
