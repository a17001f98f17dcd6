//! Timed and hit-count-based power-up buffs
//!
//! The ledger owns all active buffs. Timed buffs expire against the epoch;
//! the Shield buff is decremented by explicit hit consumption instead.
//! Aggregate getters compose every active relevant buff multiplicatively.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::CombatConfig;
use crate::core::types::EpochMs;
use crate::events::{CombatEvent, EventQueue};

/// Power-up pickups the level can spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Doubles weapon damage
    DoubleDamage,
    /// Raises fire rate
    TriggerRush,
    /// Shots consume no ammo
    InfiniteAmmo,
    /// Absorbs hits, one per stack (hit-count based, stackable)
    Shield,
    /// Raises rail-cart / dodge speed
    Adrenaline,
    /// Restores health over time (applied externally via `regen_per_sec`)
    Regeneration,
}

impl PowerUpKind {
    pub fn all() -> [PowerUpKind; 6] {
        [
            PowerUpKind::DoubleDamage,
            PowerUpKind::TriggerRush,
            PowerUpKind::InfiniteAmmo,
            PowerUpKind::Shield,
            PowerUpKind::Adrenaline,
            PowerUpKind::Regeneration,
        ]
    }
}

/// Effect values contributed by one buff
///
/// Multipliers default to 1.0 (neutral) so aggregate getters can compose
/// every active buff without special cases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BuffEffects {
    pub damage_multiplier: f32,
    pub fire_rate_multiplier: f32,
    pub speed_multiplier: f32,
    pub infinite_ammo: bool,
    pub regen_per_sec: f32,
}

impl Default for BuffEffects {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            fire_rate_multiplier: 1.0,
            speed_multiplier: 1.0,
            infinite_ammo: false,
            regen_per_sec: 0.0,
        }
    }
}

/// Static configuration for one power-up kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpSpec {
    /// 0 = hit-count based (never expires by time)
    pub duration_ms: EpochMs,
    pub stackable: bool,
    pub max_stacks: u32,
    pub effects: BuffEffects,
}

impl PowerUpSpec {
    fn for_kind(kind: PowerUpKind, config: &CombatConfig) -> Self {
        match kind {
            PowerUpKind::DoubleDamage => Self {
                duration_ms: 10_000,
                stackable: false,
                max_stacks: 1,
                effects: BuffEffects { damage_multiplier: 2.0, ..Default::default() },
            },
            PowerUpKind::TriggerRush => Self {
                duration_ms: 8_000,
                stackable: false,
                max_stacks: 1,
                effects: BuffEffects { fire_rate_multiplier: 1.5, ..Default::default() },
            },
            PowerUpKind::InfiniteAmmo => Self {
                duration_ms: 12_000,
                stackable: false,
                max_stacks: 1,
                effects: BuffEffects { infinite_ammo: true, ..Default::default() },
            },
            PowerUpKind::Shield => Self {
                duration_ms: 0,
                stackable: true,
                max_stacks: config.shield_max_stacks,
                effects: BuffEffects::default(),
            },
            PowerUpKind::Adrenaline => Self {
                duration_ms: 6_000,
                stackable: false,
                max_stacks: 1,
                effects: BuffEffects { speed_multiplier: 1.4, ..Default::default() },
            },
            PowerUpKind::Regeneration => Self {
                duration_ms: 15_000,
                stackable: false,
                max_stacks: 1,
                effects: BuffEffects { regen_per_sec: 5.0, ..Default::default() },
            },
        }
    }
}

/// One active buff instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub activated_at: EpochMs,
    pub duration_ms: EpochMs,
    pub stacks: u32,
    pub effects: BuffEffects,
}

/// Tracks active buffs and exposes composed multipliers
#[derive(Debug)]
pub struct PowerUpLedger {
    specs: AHashMap<PowerUpKind, PowerUpSpec>,
    active: AHashMap<PowerUpKind, ActiveBuff>,
    events: EventQueue,
}

impl PowerUpLedger {
    pub fn new(config: &CombatConfig) -> Self {
        let mut specs = AHashMap::new();
        for kind in PowerUpKind::all() {
            specs.insert(kind, PowerUpSpec::for_kind(kind, config));
        }
        Self { specs, active: AHashMap::new(), events: EventQueue::new() }
    }

    /// Pick up a power-up
    ///
    /// Inactive: activates at one stack. Active and stackable below the cap:
    /// adds a stack and refreshes the epoch. Otherwise: refreshes the epoch
    /// only.
    pub fn activate(&mut self, kind: PowerUpKind, now: EpochMs) {
        let spec = &self.specs[&kind];

        match self.active.get_mut(&kind) {
            None => {
                self.active.insert(kind, ActiveBuff {
                    activated_at: now,
                    duration_ms: spec.duration_ms,
                    stacks: 1,
                    effects: spec.effects,
                });
                self.events.push(CombatEvent::PowerUpActivated { kind });
            }
            Some(buff) if spec.stackable && buff.stacks < spec.max_stacks => {
                buff.stacks += 1;
                buff.activated_at = now;
                self.events.push(CombatEvent::PowerUpStacked { kind, stacks: buff.stacks });
            }
            Some(buff) => {
                buff.activated_at = now;
                self.events.push(CombatEvent::PowerUpRefreshed { kind });
            }
        }
    }

    /// Expire timed buffs whose duration has elapsed
    pub fn tick(&mut self, now: EpochMs) {
        let expired: Vec<PowerUpKind> = self
            .active
            .iter()
            .filter(|(_, buff)| {
                buff.duration_ms > 0 && now.saturating_sub(buff.activated_at) >= buff.duration_ms
            })
            .map(|(kind, _)| *kind)
            .collect();

        for kind in expired {
            self.active.remove(&kind);
            self.events.push(CombatEvent::PowerUpExpired { kind });
        }
    }

    /// Absorb one hit with the shield. Returns true if a stack was consumed.
    pub fn consume_shield_stack(&mut self) -> bool {
        let Some(buff) = self.active.get_mut(&PowerUpKind::Shield) else {
            return false;
        };

        buff.stacks -= 1;
        let stacks_left = buff.stacks;
        self.events.push(CombatEvent::ShieldConsumed { stacks_left });

        if stacks_left == 0 {
            self.active.remove(&PowerUpKind::Shield);
            self.events.push(CombatEvent::PowerUpExpired { kind: PowerUpKind::Shield });
        }
        true
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn stacks(&self, kind: PowerUpKind) -> u32 {
        self.active.get(&kind).map_or(0, |b| b.stacks)
    }

    /// Effects snapshot of one active buff (continuous effects like regen are
    /// read from here each tick and applied outside the ledger)
    pub fn effect(&self, kind: PowerUpKind) -> Option<&BuffEffects> {
        self.active.get(&kind).map(|b| &b.effects)
    }

    pub fn damage_multiplier(&self) -> f32 {
        self.active.values().map(|b| b.effects.damage_multiplier).product()
    }

    pub fn fire_rate_multiplier(&self) -> f32 {
        self.active.values().map(|b| b.effects.fire_rate_multiplier).product()
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.active.values().map(|b| b.effects.speed_multiplier).product()
    }

    pub fn has_infinite_ammo(&self) -> bool {
        self.active.values().any(|b| b.effects.infinite_ammo)
    }

    pub fn has_shield(&self) -> bool {
        self.is_active(PowerUpKind::Shield)
    }

    /// Total regen rate from active buffs (health/sec, applied externally)
    pub fn regen_per_sec(&self) -> f32 {
        self.active.values().map(|b| b.effects.regen_per_sec).sum()
    }

    /// Reset for a level restart (no expiry events)
    pub fn reset(&mut self) {
        self.active.clear();
        self.events.drain();
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> PowerUpLedger {
        PowerUpLedger::new(&CombatConfig::default())
    }

    #[test]
    fn test_activation_and_expiry() {
        let mut l = ledger();
        l.activate(PowerUpKind::DoubleDamage, 1000);
        assert!(l.is_active(PowerUpKind::DoubleDamage));
        assert_eq!(l.damage_multiplier(), 2.0);

        l.tick(10_999);
        assert!(l.is_active(PowerUpKind::DoubleDamage));

        l.tick(11_000);
        assert!(!l.is_active(PowerUpKind::DoubleDamage));
        assert_eq!(l.damage_multiplier(), 1.0);

        let events = l.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::PowerUpExpired { kind: PowerUpKind::DoubleDamage }
        )));
    }

    #[test]
    fn test_nonstackable_reactivation_refreshes_epoch() {
        let mut l = ledger();
        l.activate(PowerUpKind::DoubleDamage, 1000);
        l.activate(PowerUpKind::DoubleDamage, 5000);
        assert_eq!(l.stacks(PowerUpKind::DoubleDamage), 1);

        // Would have expired at 11_000 off the first pickup
        l.tick(12_000);
        assert!(l.is_active(PowerUpKind::DoubleDamage));

        l.tick(15_000);
        assert!(!l.is_active(PowerUpKind::DoubleDamage));
    }

    #[test]
    fn test_shield_stacks_to_cap() {
        let mut l = ledger();
        for t in 0..5 {
            l.activate(PowerUpKind::Shield, t * 100);
        }
        // Cap is 3; extra pickups refresh but do not stack
        assert_eq!(l.stacks(PowerUpKind::Shield), 3);

        let events = l.drain_events();
        let stacked = events.iter().filter(|e| matches!(e, CombatEvent::PowerUpStacked { .. })).count();
        let refreshed = events.iter().filter(|e| matches!(e, CombatEvent::PowerUpRefreshed { .. })).count();
        assert_eq!(stacked, 2);
        assert_eq!(refreshed, 2);
    }

    #[test]
    fn test_shield_never_expires_by_time() {
        let mut l = ledger();
        l.activate(PowerUpKind::Shield, 0);
        l.tick(1_000_000);
        assert!(l.has_shield());
    }

    #[test]
    fn test_shield_consumption() {
        let mut l = ledger();
        l.activate(PowerUpKind::Shield, 0);
        l.activate(PowerUpKind::Shield, 1);
        assert_eq!(l.stacks(PowerUpKind::Shield), 2);

        assert!(l.consume_shield_stack());
        assert_eq!(l.stacks(PowerUpKind::Shield), 1);

        assert!(l.consume_shield_stack());
        assert!(!l.has_shield());

        // Nothing left to consume
        assert!(!l.consume_shield_stack());
    }

    #[test]
    fn test_multipliers_compose_multiplicatively() {
        let mut l = ledger();
        l.activate(PowerUpKind::DoubleDamage, 0);
        l.activate(PowerUpKind::TriggerRush, 0);
        l.activate(PowerUpKind::Adrenaline, 0);

        assert!((l.damage_multiplier() - 2.0).abs() < f32::EPSILON);
        assert!((l.fire_rate_multiplier() - 1.5).abs() < f32::EPSILON);
        assert!((l.speed_multiplier() - 1.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_regen_read_externally() {
        let mut l = ledger();
        assert_eq!(l.regen_per_sec(), 0.0);
        l.activate(PowerUpKind::Regeneration, 0);
        assert_eq!(l.regen_per_sec(), 5.0);
        assert_eq!(l.effect(PowerUpKind::Regeneration).unwrap().regen_per_sec, 5.0);
    }
}
