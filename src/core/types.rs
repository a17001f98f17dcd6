//! Core type definitions used throughout the combat core

use serde::{Deserialize, Serialize};

/// Identifier for an enemy target. Allocated by the host (scene layer);
/// the core never invents target ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

/// Identifier for a spawned hazard instance. Allocated by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HazardId(pub u64);

/// Wall-clock epoch in milliseconds.
///
/// All timing in the core is "deadline = epoch + duration, compared against
/// now". Nothing accumulates frame deltas, so a fake clock in tests is just
/// an integer.
pub type EpochMs = u64;

/// Boss fight phase. Weakpoint table entries can be restricted to a subset
/// of phases (e.g. a core only exposed in phase two).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossPhase {
    One,
    Two,
    Three,
}

/// Damage value forced when an instant-kill weakpoint is struck.
/// Larger than any health pool the game defines.
pub const INSTANT_KILL_DAMAGE: u32 = 1_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_id_equality() {
        let a = TargetId(1);
        let b = TargetId(1);
        let c = TargetId(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hazard_id_hash() {
        use std::collections::HashMap;
        let mut map: HashMap<HazardId, &str> = HashMap::new();
        map.insert(HazardId(7), "barrel");
        assert_eq!(map.get(&HazardId(7)), Some(&"barrel"));
    }
}
