//! Host-facing combat facade
//!
//! Owns one instance of each subsystem and wires them together: fire calls
//! feed kills into the combo tracker, player damage consults the shield
//! before the combo break policy, and every frame drains all subsystem
//! queues into one ordered event log.

use glam::Vec3;

use crate::combo::{ComboBreakPolicy, ComboSnapshot, ComboTracker};
use crate::core::config::CombatConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{EpochMs, HazardId};
use crate::events::CombatEvent;
use crate::hazard::{HazardKind, HazardOverrides, HazardSimulator};
use crate::powerup::{PowerUpKind, PowerUpLedger};
use crate::weapon::{DamageSink, FireRequest, ShotReport, WeaponInfo, WeaponKind, WeaponSystem};

pub struct CombatDirector {
    config: CombatConfig,
    weapons: WeaponSystem,
    combo: ComboTracker,
    powerups: PowerUpLedger,
    hazards: HazardSimulator,
}

impl CombatDirector {
    pub fn new(config: CombatConfig) -> Result<Self> {
        config.validate().map_err(CombatError::InvalidConfig)?;
        Ok(Self {
            weapons: WeaponSystem::new(&config),
            combo: ComboTracker::new(&config),
            powerups: PowerUpLedger::new(&config),
            hazards: HazardSimulator::new(),
            config,
        })
    }

    /// Deterministic spread/jitter for scripted runs and tests
    pub fn with_rng_seed(config: CombatConfig, seed: u64) -> Result<Self> {
        let mut director = Self::new(config)?;
        director.weapons = WeaponSystem::with_rng_seed(&director.config, seed);
        Ok(director)
    }

    // === weapons ===

    /// Resolve one trigger pull; kills feed the combo tracker
    pub fn fire(&mut self, request: &FireRequest, sink: &mut dyn DamageSink, now: EpochMs) -> ShotReport {
        self.weapons.fire(request, &mut self.combo, &self.powerups, sink, now)
    }

    pub fn can_fire(&self, now: EpochMs) -> bool {
        self.weapons.can_fire(&self.powerups, now)
    }

    pub fn reload(&mut self, now: EpochMs) -> bool {
        self.weapons.reload(now)
    }

    pub fn switch_weapon(&mut self, kind: WeaponKind) {
        self.weapons.switch_weapon(kind);
    }

    pub fn set_alt_fire(&mut self, engaged: bool, now: EpochMs) {
        self.weapons.set_alt_fire(engaged, now);
    }

    pub fn fire_direction(&mut self, aim: Vec3) -> Vec3 {
        self.weapons.fire_direction(aim)
    }

    pub fn pellet_directions(&mut self, aim: Vec3) -> Vec<Vec3> {
        self.weapons.pellet_directions(aim)
    }

    pub fn weapon_info(&self, kind: WeaponKind, now: EpochMs) -> WeaponInfo {
        self.weapons.weapon_info(kind, now)
    }

    pub fn active_weapon(&self) -> WeaponKind {
        self.weapons.active_weapon()
    }

    // === combo ===

    pub fn combo_snapshot(&self, now: EpochMs) -> ComboSnapshot {
        self.combo.snapshot(now)
    }

    /// Unlock a combo break-policy upgrade
    pub fn set_combo_break_policy(&mut self, policy: ComboBreakPolicy) {
        self.combo.set_break_policy(policy);
    }

    // === power-ups ===

    pub fn activate_powerup(&mut self, kind: PowerUpKind, now: EpochMs) {
        self.powerups.activate(kind, now);
    }

    /// Movement-speed multiplier for the host's rail/dodge speed
    pub fn speed_multiplier(&self) -> f32 {
        self.powerups.speed_multiplier()
    }

    /// Health regeneration rate for the host to apply (health ownership is
    /// outside the core)
    pub fn regen_per_sec(&self) -> f32 {
        self.powerups.regen_per_sec()
    }

    // === hazards ===

    pub fn spawn_hazard(
        &mut self,
        kind: HazardKind,
        position: Vec3,
        overrides: &HazardOverrides,
        now: EpochMs,
    ) -> Result<HazardId> {
        self.hazards.spawn(kind, position, overrides, now)
    }

    pub fn damage_hazard(&mut self, id: HazardId, amount: u32, now: EpochMs) -> bool {
        self.hazards.damage_hazard(id, amount, now)
    }

    pub fn remove_hazard(&mut self, id: HazardId, now: EpochMs) -> bool {
        self.hazards.remove(id, now)
    }

    // === frame loop ===

    /// The player took a hit. Shield stacks absorb it entirely; otherwise the
    /// combo break policy applies. Returns true when the hit was absorbed.
    pub fn on_player_damaged(&mut self, _now: EpochMs) -> bool {
        if self.powerups.has_shield() {
            self.powerups.consume_shield_stack();
            return true;
        }
        self.combo.on_damage_taken();
        false
    }

    /// Advance every subsystem one frame
    pub fn tick(&mut self, now: EpochMs, player_position: Vec3) {
        self.weapons.tick(now);
        self.combo.tick(now);
        self.powerups.tick(now);
        self.hazards.tick(now, player_position);
    }

    /// Drain all subsystem queues into one ordered log. Within a frame the
    /// order is weapons, combo, power-ups, hazards.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        let mut events = self.weapons.drain_events();
        events.extend(self.combo.drain_events());
        events.extend(self.powerups.drain_events());
        events.extend(self.hazards.drain_events());
        events
    }

    /// Reset per-level state (combo, buffs, hazards); weapon state persists
    /// for the session
    pub fn reset_for_level(&mut self) {
        self.combo.reset();
        self.powerups.reset();
        self.hazards.clear();
    }
}
