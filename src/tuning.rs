//! Data-driven game balance
//!
//! Balance numbers the design iterates on. Fixed design constants (patrol
//! tables, timing windows) live in [`crate::consts`] instead.

use serde::{Deserialize, Serialize};

/// Tunable balance values, applied at world construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Survival resources ===
    pub start_health: u32,
    pub start_oxygen: u32,
    pub max_stamina: f32,
    /// Stamina drained per second while diving
    pub stamina_drain: f32,

    // === Movement ===
    /// Acceleration from held direction input (px/s²)
    pub accel: f32,
    /// Fraction of velocity retained per second (exponential damping)
    pub drag: f32,
    /// Speed cap while swimming (px/s)
    pub speed_cap: f32,
    /// Speed cap while diving (px/s)
    pub diving_speed_cap: f32,
    /// Instantaneous velocity multiplier on dive start
    pub dive_boost: f32,

    // === Power-ups ===
    /// Probability that the gamble resolves to a new effect
    pub gamble_odds: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            start_health: 3,
            start_oxygen: 5,
            max_stamina: 100.0,
            stamina_drain: 30.0,

            accel: 320.0,
            drag: 0.01,
            speed_cap: 128.0,
            diving_speed_cap: 256.0,
            dive_boost: 3.0,

            gamble_odds: 0.8,
        }
    }
}

impl Tuning {
    /// Load tuning overrides from a JSON document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize for external balance tooling
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Tuning::default();
        assert_eq!(t.start_health, 3);
        assert_eq!(t.start_oxygen, 5);
        assert_eq!(t.max_stamina, 100.0);
        assert_eq!(t.speed_cap, 128.0);
        assert_eq!(t.diving_speed_cap, 256.0);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let t = Tuning::from_json(r#"{"start_health": 5, "gamble_odds": 0.9}"#).unwrap();
        assert_eq!(t.start_health, 5);
        assert_eq!(t.gamble_odds, 0.9);
        assert_eq!(t.start_oxygen, 5);
        assert_eq!(t.accel, 320.0);
    }

    #[test]
    fn test_json_round_trip() {
        let t = Tuning::default();
        let json = t.to_json().unwrap();
        let back = Tuning::from_json(&json).unwrap();
        assert_eq!(t, back);
    }
}
