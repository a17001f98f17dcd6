//! Tuned default weakpoint tables, one per enemy archetype
//!
//! Entry order within a table is load-bearing: classification returns the
//! first match, so high-value regions must be declared before any broader
//! band that overlaps them.

use ahash::AHashMap;

use super::{EnemyArchetype, Weakpoint, WeakpointEffect};
use crate::core::types::BossPhase;

/// Build the default table set
pub fn default_tables() -> AHashMap<EnemyArchetype, Vec<Weakpoint>> {
    let mut tables = AHashMap::new();
    tables.insert(EnemyArchetype::Grunt, grunt());
    tables.insert(EnemyArchetype::Bomber, bomber());
    tables.insert(EnemyArchetype::Drone, drone());
    tables.insert(EnemyArchetype::Heavy, heavy());
    tables.insert(EnemyArchetype::Boss, boss());
    tables
}

fn grunt() -> Vec<Weakpoint> {
    vec![Weakpoint {
        name: "head",
        y_min: 1.5,
        y_max: 2.0,
        radius: 0.45,
        multiplier: 2.5,
        effects: vec![WeakpointEffect::Critical],
        requires_back_hit: false,
        phases: None,
    }]
}

fn bomber() -> Vec<Weakpoint> {
    vec![
        // Tank before head: both bands overlap around y=1.5 and the tank
        // detonation must win on a back shot
        Weakpoint {
            name: "fuel_tank",
            y_min: 0.8,
            y_max: 1.6,
            radius: 0.6,
            multiplier: 3.0,
            effects: vec![WeakpointEffect::Critical, WeakpointEffect::Explosion],
            requires_back_hit: true,
            phases: None,
        },
        Weakpoint {
            name: "head",
            y_min: 1.5,
            y_max: 1.95,
            radius: 0.4,
            multiplier: 2.0,
            effects: vec![WeakpointEffect::Critical],
            requires_back_hit: false,
            phases: None,
        },
    ]
}

fn drone() -> Vec<Weakpoint> {
    vec![
        Weakpoint {
            name: "sensor_eye",
            y_min: 0.4,
            y_max: 0.8,
            radius: 0.3,
            multiplier: 2.5,
            effects: vec![WeakpointEffect::Critical, WeakpointEffect::DisableAbility],
            requires_back_hit: false,
            phases: None,
        },
        Weakpoint {
            name: "rotor",
            y_min: 0.9,
            y_max: 1.3,
            radius: 0.5,
            multiplier: 2.0,
            effects: vec![WeakpointEffect::Stagger],
            requires_back_hit: false,
            phases: None,
        },
    ]
}

fn heavy() -> Vec<Weakpoint> {
    vec![
        Weakpoint {
            name: "armor_gap",
            y_min: 0.9,
            y_max: 1.5,
            radius: 0.55,
            multiplier: 2.0,
            effects: vec![WeakpointEffect::ArmorBreak],
            requires_back_hit: true,
            phases: None,
        },
        Weakpoint {
            name: "faceplate",
            y_min: 1.7,
            y_max: 2.2,
            radius: 0.4,
            multiplier: 1.5,
            effects: vec![WeakpointEffect::Stagger],
            requires_back_hit: false,
            phases: None,
        },
    ]
}

fn boss() -> Vec<Weakpoint> {
    vec![
        // Ruptured core only exists in the final phase
        Weakpoint {
            name: "ruptured_core",
            y_min: 1.2,
            y_max: 2.2,
            radius: 0.7,
            multiplier: 1.0,
            effects: vec![WeakpointEffect::Critical, WeakpointEffect::InstantKill],
            requires_back_hit: false,
            phases: Some(vec![BossPhase::Three]),
        },
        Weakpoint {
            name: "exposed_core",
            y_min: 1.2,
            y_max: 2.2,
            radius: 0.7,
            multiplier: 4.0,
            effects: vec![WeakpointEffect::Critical],
            requires_back_hit: false,
            phases: Some(vec![BossPhase::Two, BossPhase::Three]),
        },
        Weakpoint {
            name: "eye",
            y_min: 2.6,
            y_max: 3.2,
            radius: 0.5,
            multiplier: 2.0,
            effects: vec![WeakpointEffect::Critical],
            requires_back_hit: false,
            phases: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    use crate::weakpoint::WeakpointResolver;

    #[test]
    fn test_every_archetype_has_a_table() {
        let tables = default_tables();
        for archetype in EnemyArchetype::all() {
            assert!(tables.contains_key(&archetype), "missing table for {archetype:?}");
        }
    }

    #[test]
    fn test_bomber_tank_wins_on_back_shot() {
        let resolver = WeakpointResolver::new();

        // y=1.55 sits in both the tank and head bands; the back shot must
        // resolve to the tank because it is declared first
        let hit = resolver.classify(
            EnemyArchetype::Bomber,
            Vec3::new(0.0, 1.55, -0.3),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert_eq!(hit.unwrap().name, "fuel_tank");

        // Same height from the front falls through to the head
        let hit = resolver.classify(
            EnemyArchetype::Bomber,
            Vec3::new(0.0, 1.55, 0.3),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert_eq!(hit.unwrap().name, "head");
    }

    #[test]
    fn test_boss_core_phase_gating() {
        let resolver = WeakpointResolver::new();
        let hit_point = Vec3::new(0.0, 1.8, 0.2);

        let phase_one =
            resolver.classify(EnemyArchetype::Boss, hit_point, Vec3::ZERO, Vec3::Z, Some(BossPhase::One));
        assert!(phase_one.is_none());

        let phase_two =
            resolver.classify(EnemyArchetype::Boss, hit_point, Vec3::ZERO, Vec3::Z, Some(BossPhase::Two));
        assert_eq!(phase_two.unwrap().name, "exposed_core");

        let phase_three =
            resolver.classify(EnemyArchetype::Boss, hit_point, Vec3::ZERO, Vec3::Z, Some(BossPhase::Three));
        assert_eq!(phase_three.unwrap().name, "ruptured_core");
    }

    #[test]
    fn test_boss_eye_available_in_all_phases() {
        let resolver = WeakpointResolver::new();
        let eye = Vec3::new(0.0, 2.9, 0.1);

        for phase in [BossPhase::One, BossPhase::Two, BossPhase::Three] {
            let hit = resolver.classify(EnemyArchetype::Boss, eye, Vec3::ZERO, Vec3::Z, Some(phase));
            assert_eq!(hit.unwrap().name, "eye");
        }
    }
}
