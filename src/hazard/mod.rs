//! Environmental hazard simulation
//!
//! Every hazard is an independent state machine driven by wall-clock epoch:
//! phase is derived arithmetically from `now`, never from accumulated frame
//! deltas, so irregular or dropped frames produce identical states at
//! identical timestamps.

pub mod config;

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::error::{CombatError, Result};
use crate::core::types::{EpochMs, HazardId, TargetId};
use crate::events::{CombatEvent, EventQueue};

pub use config::{HazardConfig, HazardOverrides};

/// Entity id the host reserves for the player. Hazard proximity damage only
/// targets the player today; the affected set is keyed by entity id so that
/// escorts or decoys can slot in later.
pub const PLAYER: TargetId = TargetId(0);

/// Environmental hazard kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    LaserGrid,
    FlameJet,
    ElectricFloor,
    FloorSpikes,
    ExplosiveBarrel,
    ToxicGas,
    FallingDebris,
}

impl HazardKind {
    pub fn all() -> [HazardKind; 7] {
        [
            HazardKind::LaserGrid,
            HazardKind::FlameJet,
            HazardKind::ElectricFloor,
            HazardKind::FloorSpikes,
            HazardKind::ExplosiveBarrel,
            HazardKind::ToxicGas,
            HazardKind::FallingDebris,
        ]
    }

    /// Kinds that loop a warning/active/inactive duty cycle
    pub fn is_cyclic(&self) -> bool {
        matches!(
            self,
            HazardKind::LaserGrid | HazardKind::FlameJet | HazardKind::ElectricFloor | HazardKind::FloorSpikes
        )
    }

    /// Kinds that damage once per activation instead of on an interval
    fn single_hit_per_activation(&self) -> bool {
        matches!(self, HazardKind::FloorSpikes)
    }
}

/// Duty-cycle phase (also used for the one-shot kinds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardPhase {
    Warning,
    Active,
    Inactive,
}

/// One live hazard instance
#[derive(Debug, Clone)]
pub struct Hazard {
    pub id: HazardId,
    pub kind: HazardKind,
    pub position: Vec3,
    pub config: HazardConfig,
    spawned_at: EpochMs,
    cycle_started_at: EpochMs,
    last_damage_at: Option<EpochMs>,
    health: Option<f32>,
    /// Last phase observed by tick, for edge-triggered transition events
    phase: HazardPhase,
    /// Cycle ordinal the damage state belongs to. Derived from `now` so a
    /// frame gap spanning whole phases still re-arms the hazard.
    cycle_index: u64,
    /// Falling debris resolves its impact check exactly once
    impact_resolved: bool,
    /// Entities damaged during the current activation
    affected: AHashSet<TargetId>,
}

impl Hazard {
    fn new(id: HazardId, kind: HazardKind, position: Vec3, config: HazardConfig, now: EpochMs) -> Self {
        let phase = if kind.is_cyclic() || kind == HazardKind::FallingDebris {
            // Cycles that open on a telegraph start in Warning
            if config.warning_ms > 0 { HazardPhase::Warning } else { HazardPhase::Active }
        } else if kind == HazardKind::ToxicGas {
            HazardPhase::Active
        } else {
            HazardPhase::Inactive
        };
        Self {
            id,
            kind,
            position,
            health: config.health,
            config,
            spawned_at: now,
            cycle_started_at: now,
            last_damage_at: None,
            phase,
            cycle_index: 0,
            impact_resolved: false,
            affected: AHashSet::new(),
        }
    }

    pub fn health(&self) -> Option<f32> {
        self.health
    }

    fn total_cycle_ms(&self) -> EpochMs {
        self.config.warning_ms + self.config.active_ms + self.config.inactive_ms
    }

    /// Phase derived purely from `now` (cyclic kinds)
    fn cyclic_phase(&self, now: EpochMs) -> HazardPhase {
        let c = &self.config;
        let progress = now.saturating_sub(self.cycle_started_at) % self.total_cycle_ms();
        if progress < c.warning_ms {
            HazardPhase::Warning
        } else if progress < c.warning_ms + c.active_ms {
            HazardPhase::Active
        } else {
            HazardPhase::Inactive
        }
    }

    fn derived_phase(&self, now: EpochMs) -> HazardPhase {
        match self.kind {
            k if k.is_cyclic() => self.cyclic_phase(now),
            HazardKind::ToxicGas => HazardPhase::Active,
            HazardKind::FallingDebris => {
                if now.saturating_sub(self.spawned_at) < self.config.warning_ms {
                    HazardPhase::Warning
                } else {
                    HazardPhase::Active
                }
            }
            _ => HazardPhase::Inactive,
        }
    }

    fn damage_interval_elapsed(&self, now: EpochMs) -> bool {
        match self.last_damage_at {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.config.damage_interval_ms,
        }
    }

    /// Advance one frame. Returns true when the hazard should be removed.
    fn tick(&mut self, now: EpochMs, player_position: Vec3, events: &mut EventQueue) -> bool {
        // Lifetime checks first: gas and debris self-remove
        match self.kind {
            HazardKind::ToxicGas => {
                if now.saturating_sub(self.spawned_at) >= self.config.duration_ms {
                    return true;
                }
            }
            HazardKind::FallingDebris => {
                let gone_at = self.config.warning_ms + self.config.duration_ms;
                if now.saturating_sub(self.spawned_at) >= gone_at {
                    return true;
                }
            }
            HazardKind::ExplosiveBarrel => return false, // reactive only
            _ => {}
        }

        // Re-arm from the epoch, not from observed edges: a frame gap can
        // jump straight from one active window into the next without any
        // tick landing on the exit boundary
        if self.kind.is_cyclic() {
            let index = now.saturating_sub(self.cycle_started_at) / self.total_cycle_ms();
            if index != self.cycle_index {
                self.cycle_index = index;
                self.affected.clear();
                self.last_damage_at = None;
            }
        }

        let next = self.derived_phase(now);
        if next != self.phase {
            self.phase = next;
            events.push(match next {
                HazardPhase::Warning => CombatEvent::HazardWarning { id: self.id, kind: self.kind },
                HazardPhase::Active => CombatEvent::HazardActivated { id: self.id, kind: self.kind },
                HazardPhase::Inactive => CombatEvent::HazardDeactivated { id: self.id, kind: self.kind },
            });
        }

        if self.phase == HazardPhase::Active {
            if self.kind == HazardKind::FallingDebris {
                self.resolve_impact(player_position, events);
            } else {
                self.try_damage(now, player_position, events);
            }
        }
        false
    }

    /// One radius check at the moment of impact; entering the zone afterwards
    /// is safe
    fn resolve_impact(&mut self, player_position: Vec3, events: &mut EventQueue) {
        if self.impact_resolved {
            return;
        }
        self.impact_resolved = true;
        if player_position.distance(self.position) <= self.config.radius {
            events.push(CombatEvent::HazardDamage { id: self.id, kind: self.kind, damage: self.config.damage });
        }
    }

    fn try_damage(&mut self, now: EpochMs, player_position: Vec3, events: &mut EventQueue) {
        if self.config.damage == 0 {
            return;
        }
        if player_position.distance(self.position) > self.config.radius {
            return;
        }
        if self.kind.single_hit_per_activation() {
            if self.affected.contains(&PLAYER) {
                return;
            }
        } else if !self.damage_interval_elapsed(now) {
            return;
        }

        self.affected.insert(PLAYER);
        self.last_damage_at = Some(now);
        events.push(CombatEvent::HazardDamage { id: self.id, kind: self.kind, damage: self.config.damage });
    }
}

/// Owns all live hazards in the current room
#[derive(Debug, Default)]
pub struct HazardSimulator {
    hazards: AHashMap<HazardId, Hazard>,
    next_id: u64,
    events: EventQueue,
}

impl HazardSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a hazard. A malformed config rejects this one hazard and leaves
    /// the rest of the simulation untouched.
    pub fn spawn(
        &mut self,
        kind: HazardKind,
        position: Vec3,
        overrides: &HazardOverrides,
        now: EpochMs,
    ) -> Result<HazardId> {
        let config = HazardConfig::merged(kind, overrides);
        if let Err(reason) = config.validate(kind) {
            tracing::warn!(?kind, %reason, "rejecting hazard spawn");
            return Err(CombatError::InvalidConfig(reason));
        }

        self.next_id += 1;
        let id = HazardId(self.next_id);
        self.hazards.insert(id, Hazard::new(id, kind, position, config, now));
        self.events.push(CombatEvent::HazardSpawned { id, kind, position });
        tracing::debug!(?kind, ?id, "hazard spawned");
        Ok(id)
    }

    /// Advance every hazard one frame against the player's position
    pub fn tick(&mut self, now: EpochMs, player_position: Vec3) {
        let mut expired = Vec::new();
        for hazard in self.hazards.values_mut() {
            if hazard.tick(now, player_position, &mut self.events) {
                expired.push(hazard.id);
            }
        }
        for id in expired {
            self.remove(id, now);
        }
    }

    /// Apply weapon damage to a destructible hazard. Returns true when this
    /// call destroys it. Unknown ids and indestructible hazards are no-ops.
    pub fn damage_hazard(&mut self, id: HazardId, amount: u32, now: EpochMs) -> bool {
        let Some(hazard) = self.hazards.get_mut(&id) else {
            tracing::warn!(?id, "damage_hazard on unknown hazard");
            return false;
        };
        let Some(health) = hazard.health.as_mut() else {
            return false;
        };

        *health -= amount as f32;
        if *health > 0.0 {
            return false;
        }

        // Detonation happens exactly once: the hazard leaves the registry
        // before any further call can observe it
        self.events.push(CombatEvent::HazardExploded {
            id,
            position: hazard.position,
            radius: hazard.config.explosion_radius,
            damage: hazard.config.explosion_damage,
        });
        self.remove(id, now);
        true
    }

    /// Remove a hazard. Idempotent: removing an unknown or already-removed id
    /// is a no-op.
    pub fn remove(&mut self, id: HazardId, _now: EpochMs) -> bool {
        match self.hazards.remove(&id) {
            Some(hazard) => {
                self.events.push(CombatEvent::HazardRemoved { id, kind: hazard.kind });
                true
            }
            None => false,
        }
    }

    /// Drop every hazard without events (room unload)
    pub fn clear(&mut self) {
        self.hazards.clear();
    }

    pub fn get(&self, id: HazardId) -> Option<&Hazard> {
        self.hazards.get(&id)
    }

    /// Derived phase for HUD/telegraph display
    pub fn phase(&self, id: HazardId, now: EpochMs) -> Option<HazardPhase> {
        self.hazards.get(&id).map(|h| h.derived_phase(now))
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }
}
