//! Domain events emitted by the combat subsystems
//!
//! Every observable state transition in the core maps to exactly one event
//! variant. Presentation layers (HUD, audio, VFX) consume these instead of
//! reaching into subsystem internals.

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{HazardId, TargetId};
use crate::hazard::HazardKind;
use crate::powerup::PowerUpKind;
use crate::weapon::WeaponKind;

/// A combat domain event
#[derive(Debug, Clone, Serialize)]
pub enum CombatEvent {
    // Weapons
    WeaponFired { weapon: WeaponKind, alt_fire: bool },
    WeaponHit { weapon: WeaponKind, target: TargetId, damage: u32, crit: bool, position: Vec3 },
    WeaponMissed { weapon: WeaponKind },
    AmmoDepleted { weapon: WeaponKind },
    ReloadStarted { weapon: WeaponKind },
    ReloadFinished { weapon: WeaponKind, loaded: u32 },
    Overheated { weapon: WeaponKind },
    OverheatCleared { weapon: WeaponKind },
    ChargeReleased { weapon: WeaponKind, fraction: f32 },
    TargetPulled { target: TargetId, toward: Vec3, distance: f32 },
    SplashDamage { target: TargetId, damage: u32 },
    TargetKilled { target: TargetId, weapon: WeaponKind },

    // Combo
    ComboKill { combo: u32 },
    ComboMilestone { combo: u32, tier_name: &'static str, score_multiplier: f32 },
    ComboBroken { lost: u32 },

    // Power-ups
    PowerUpActivated { kind: PowerUpKind },
    PowerUpRefreshed { kind: PowerUpKind },
    PowerUpStacked { kind: PowerUpKind, stacks: u32 },
    PowerUpExpired { kind: PowerUpKind },
    ShieldConsumed { stacks_left: u32 },

    // Hazards
    HazardSpawned { id: HazardId, kind: HazardKind, position: Vec3 },
    HazardWarning { id: HazardId, kind: HazardKind },
    HazardActivated { id: HazardId, kind: HazardKind },
    HazardDeactivated { id: HazardId, kind: HazardKind },
    HazardDamage { id: HazardId, kind: HazardKind, damage: u32 },
    HazardExploded { id: HazardId, position: Vec3, radius: f32, damage: u32 },
    HazardRemoved { id: HazardId, kind: HazardKind },
}

/// FIFO event queue owned by each subsystem
///
/// Subsystems push as they mutate state; the director drains all queues once
/// per frame into a single ordered log for consumers.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<CombatEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}
