//! Weakpoint geometry resolution
//!
//! Each enemy archetype declares an ordered list of weakpoints. Classification
//! walks the list in declaration order and returns the first entry containing
//! the hit point. Order is a priority rule (a bomber's exposed tank must win
//! over its generic body band), not a best-fit search.

mod tables;

use ahash::AHashMap;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::{BossPhase, INSTANT_KILL_DAMAGE};

pub use tables::default_tables;

/// Enemy archetype, one weakpoint table per variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyArchetype {
    /// Baseline footsoldier
    Grunt,
    /// Carries a volatile fuel tank on its back
    Bomber,
    /// Airborne, kept aloft by a single rotor
    Drone,
    /// Armored, vulnerable only through gaps
    Heavy,
    /// Phase-driven boss
    Boss,
}

impl EnemyArchetype {
    /// Returns all archetypes
    pub fn all() -> [EnemyArchetype; 5] {
        [
            EnemyArchetype::Grunt,
            EnemyArchetype::Bomber,
            EnemyArchetype::Drone,
            EnemyArchetype::Heavy,
            EnemyArchetype::Boss,
        ]
    }

    /// Bosses are immune to grapple pulls and similar displacement
    pub fn is_boss(&self) -> bool {
        matches!(self, EnemyArchetype::Boss)
    }
}

/// Special effects a weakpoint hit applies on top of its damage multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeakpointEffect {
    /// Counts as a critical hit for HUD/scoring purposes
    Critical,
    /// Strips armor on the target
    ArmorBreak,
    /// Interrupts the target's current action
    Stagger,
    /// Damage is overridden to exceed any health pool
    InstantKill,
    /// Triggers a secondary explosion at the hit point
    Explosion,
    /// Disables the target's special ability
    DisableAbility,
}

/// One entry in an archetype's weakpoint table
///
/// Geometry is expressed relative to the target: a vertical band above the
/// feet plus a horizontal radius around the spine axis.
#[derive(Debug, Clone, Serialize)]
pub struct Weakpoint {
    pub name: &'static str,
    /// Vertical band relative to the target's feet
    pub y_min: f32,
    pub y_max: f32,
    /// Horizontal (XZ) radius around the target's position
    pub radius: f32,
    pub multiplier: f32,
    pub effects: Vec<WeakpointEffect>,
    /// Only matches when the shot lands on the target's back side
    pub requires_back_hit: bool,
    /// When set, only matches during the listed boss phases
    pub phases: Option<Vec<BossPhase>>,
}

impl Weakpoint {
    pub fn has_effect(&self, effect: WeakpointEffect) -> bool {
        self.effects.contains(&effect)
    }

    pub fn is_critical(&self) -> bool {
        self.has_effect(WeakpointEffect::Critical)
    }
}

/// Resolves hit points against per-archetype weakpoint tables
#[derive(Debug, Clone)]
pub struct WeakpointResolver {
    tables: AHashMap<EnemyArchetype, Vec<Weakpoint>>,
}

impl WeakpointResolver {
    /// Resolver with the tuned default tables
    pub fn new() -> Self {
        Self { tables: tables::default_tables() }
    }

    /// Resolver with caller-supplied tables (tests, modding)
    pub fn with_tables(tables: AHashMap<EnemyArchetype, Vec<Weakpoint>>) -> Self {
        Self { tables }
    }

    /// Classify a hit point against the archetype's table
    ///
    /// Returns the first entry (declaration order) whose phase filter,
    /// back-hit requirement and bounds all match, or None for a plain
    /// body hit (multiplier 1.0).
    pub fn classify(
        &self,
        archetype: EnemyArchetype,
        hit_point: Vec3,
        target_position: Vec3,
        target_facing: Vec3,
        boss_phase: Option<BossPhase>,
    ) -> Option<&Weakpoint> {
        let table = self.tables.get(&archetype)?;

        let rel_y = hit_point.y - target_position.y;
        let dx = hit_point.x - target_position.x;
        let dz = hit_point.z - target_position.z;
        let horiz_dist = (dx * dx + dz * dz).sqrt();
        let back_hit = is_back_hit(hit_point, target_position, target_facing);

        for wp in table {
            if let Some(phases) = &wp.phases {
                match boss_phase {
                    Some(phase) if phases.contains(&phase) => {}
                    _ => continue,
                }
            }
            if wp.requires_back_hit && !back_hit {
                continue;
            }
            if rel_y < wp.y_min || rel_y > wp.y_max {
                continue;
            }
            if horiz_dist > wp.radius {
                continue;
            }
            return Some(wp);
        }

        None
    }
}

impl Default for WeakpointResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply a weakpoint to a base damage value
///
/// InstantKill overrides the multiplied damage entirely; later pipeline
/// stages must not re-scale it.
pub fn apply_weakpoint(base: f32, wp: &Weakpoint) -> u32 {
    if wp.has_effect(WeakpointEffect::InstantKill) {
        return INSTANT_KILL_DAMAGE;
    }
    (base * wp.multiplier).floor() as u32
}

/// A shot lands on the back side when the XZ angle between the target's
/// facing and the target-to-hit vector falls in (90°, 270°), i.e. their
/// horizontal dot product is negative.
fn is_back_hit(hit_point: Vec3, target_position: Vec3, target_facing: Vec3) -> bool {
    let to_hit_x = hit_point.x - target_position.x;
    let to_hit_z = hit_point.z - target_position.z;
    target_facing.x * to_hit_x + target_facing.z * to_hit_z < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver_with(table: Vec<Weakpoint>) -> WeakpointResolver {
        let mut tables = AHashMap::new();
        tables.insert(EnemyArchetype::Grunt, table);
        WeakpointResolver::with_tables(tables)
    }

    fn plain(name: &'static str, y_min: f32, y_max: f32, radius: f32, mult: f32) -> Weakpoint {
        Weakpoint {
            name,
            y_min,
            y_max,
            radius,
            multiplier: mult,
            effects: vec![],
            requires_back_hit: false,
            phases: None,
        }
    }

    #[test]
    fn test_no_match_returns_none() {
        let resolver = resolver_with(vec![plain("head", 1.5, 2.0, 0.4, 2.5)]);
        let hit = resolver.classify(
            EnemyArchetype::Grunt,
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_vertical_band_and_radius_containment() {
        let resolver = resolver_with(vec![plain("head", 1.5, 2.0, 0.4, 2.5)]);

        let inside = resolver.classify(
            EnemyArchetype::Grunt,
            Vec3::new(0.2, 1.7, 0.0),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert_eq!(inside.unwrap().name, "head");

        // Right height, too far out horizontally
        let outside = resolver.classify(
            EnemyArchetype::Grunt,
            Vec3::new(0.6, 1.7, 0.0),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert!(outside.is_none());
    }

    #[test]
    fn test_declaration_order_wins_over_tighter_fit() {
        // Second entry is geometrically tighter but declared later
        let resolver = resolver_with(vec![
            plain("broad", 0.0, 2.0, 1.0, 1.5),
            plain("tight", 1.5, 1.8, 0.2, 3.0),
        ]);

        let hit = resolver.classify(
            EnemyArchetype::Grunt,
            Vec3::new(0.0, 1.6, 0.1),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert_eq!(hit.unwrap().name, "broad");
    }

    #[test]
    fn test_back_hit_requirement() {
        let mut wp = plain("pack", 0.5, 1.5, 0.6, 3.0);
        wp.requires_back_hit = true;
        let resolver = resolver_with(vec![wp]);

        // Target faces +Z; a hit at -Z is on its back
        let back = resolver.classify(
            EnemyArchetype::Grunt,
            Vec3::new(0.0, 1.0, -0.3),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert_eq!(back.unwrap().name, "pack");

        let front = resolver.classify(
            EnemyArchetype::Grunt,
            Vec3::new(0.0, 1.0, 0.3),
            Vec3::ZERO,
            Vec3::Z,
            None,
        );
        assert!(front.is_none());
    }

    #[test]
    fn test_phase_filter() {
        let mut wp = plain("core", 1.0, 2.0, 0.8, 4.0);
        wp.phases = Some(vec![BossPhase::Two]);
        let resolver = resolver_with(vec![wp]);

        let hit_point = Vec3::new(0.0, 1.5, 0.0);

        assert!(resolver
            .classify(EnemyArchetype::Grunt, hit_point, Vec3::ZERO, Vec3::Z, Some(BossPhase::One))
            .is_none());
        assert!(resolver
            .classify(EnemyArchetype::Grunt, hit_point, Vec3::ZERO, Vec3::Z, None)
            .is_none());
        assert!(resolver
            .classify(EnemyArchetype::Grunt, hit_point, Vec3::ZERO, Vec3::Z, Some(BossPhase::Two))
            .is_some());
    }

    #[test]
    fn test_apply_weakpoint_floors() {
        let wp = plain("head", 1.5, 2.0, 0.4, 2.5);
        assert_eq!(apply_weakpoint(25.0, &wp), 62);
    }

    #[test]
    fn test_instant_kill_overrides_multiplier() {
        let mut wp = plain("heart", 1.0, 1.4, 0.2, 1.0);
        wp.effects.push(WeakpointEffect::InstantKill);
        assert_eq!(apply_weakpoint(5.0, &wp), INSTANT_KILL_DAMAGE);
    }
}
