//! Per-weapon runtime state machine
//!
//! Ammo, reload, overheat and charge are all epoch-stamped: deadlines are
//! stored as `started_at` and compared against `now`, never decremented per
//! frame.

use serde::{Deserialize, Serialize};

use super::profile::WeaponProfile;
use crate::core::config::CombatConfig;
use crate::core::types::EpochMs;

/// Mutable state for one weapon, owned by the weapon system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponRuntimeState {
    pub current_ammo: u32,
    /// None = unmodeled reserve (reload always refills the magazine)
    pub reserve_ammo: Option<u32>,
    pub last_shot_at: Option<EpochMs>,
    pub reloading: bool,
    pub reload_started_at: EpochMs,
    /// 0.0..=1.0
    pub overheat_level: f32,
    pub overheated: bool,
    pub overheat_locked_at: EpochMs,
    pub alt_fire_engaged: bool,
    /// Pistol charge shot only
    pub charge_started_at: Option<EpochMs>,
}

impl WeaponRuntimeState {
    pub fn new(profile: &WeaponProfile) -> Self {
        Self {
            current_ammo: profile.capacity.unwrap_or(0),
            reserve_ammo: profile.reserve,
            last_shot_at: None,
            reloading: false,
            reload_started_at: 0,
            overheat_level: 0.0,
            overheated: false,
            overheat_locked_at: 0,
            alt_fire_engaged: false,
            charge_started_at: None,
        }
    }

    /// Shot-to-shot cooldown check under the current fire-rate multiplier
    pub fn cooldown_ready(&self, profile: &WeaponProfile, fire_rate_multiplier: f32, now: EpochMs) -> bool {
        match self.last_shot_at {
            None => true,
            Some(last) => (now.saturating_sub(last)) as f32 >= profile.cooldown_ms(fire_rate_multiplier),
        }
    }

    /// Is at least one round available?
    pub fn has_ammo(&self, profile: &WeaponProfile, infinite_ammo: bool) -> bool {
        profile.capacity.is_none() || infinite_ammo || self.current_ammo > 0
    }

    /// Full firing gate: cooldown + not reloading + not overheated + ammo
    pub fn can_fire(
        &self,
        profile: &WeaponProfile,
        fire_rate_multiplier: f32,
        infinite_ammo: bool,
        now: EpochMs,
    ) -> bool {
        self.cooldown_ready(profile, fire_rate_multiplier, now)
            && !self.reloading
            && !self.overheated
            && self.has_ammo(profile, infinite_ammo)
    }

    /// Draw rounds from the magazine. Unbounded weapons and the infinite-ammo
    /// buff consume nothing.
    pub fn consume_ammo(&mut self, profile: &WeaponProfile, rounds: u32, infinite_ammo: bool) {
        if profile.capacity.is_some() && !infinite_ammo {
            self.current_ammo = self.current_ammo.saturating_sub(rounds);
        }
    }

    /// Begin a reload. Rejected while reloading, with unbounded capacity,
    /// with a full magazine, or with an exhausted modeled reserve.
    pub fn start_reload(&mut self, profile: &WeaponProfile, now: EpochMs) -> bool {
        let Some(capacity) = profile.capacity else {
            return false;
        };
        if self.reloading || self.current_ammo >= capacity {
            return false;
        }
        if matches!(self.reserve_ammo, Some(0)) {
            return false;
        }

        self.reloading = true;
        self.reload_started_at = now;
        true
    }

    /// Complete the reload once its deadline passes. Returns rounds loaded.
    pub fn finish_reload_if_due(&mut self, profile: &WeaponProfile, now: EpochMs) -> Option<u32> {
        if !self.reloading || now.saturating_sub(self.reload_started_at) < profile.reload_time_ms {
            return None;
        }
        self.reloading = false;

        let capacity = profile.capacity.unwrap_or(0);
        let missing = capacity.saturating_sub(self.current_ammo);
        let loaded = match self.reserve_ammo.as_mut() {
            Some(reserve) => {
                let take = missing.min(*reserve);
                *reserve -= take;
                take
            }
            None => missing,
        };
        self.current_ammo += loaded;
        Some(loaded)
    }

    /// Fraction of the reload elapsed (0..1), for HUD display
    pub fn reload_progress(&self, profile: &WeaponProfile, now: EpochMs) -> f32 {
        if !self.reloading || profile.reload_time_ms == 0 {
            return 0.0;
        }
        let elapsed = now.saturating_sub(self.reload_started_at) as f32;
        (elapsed / profile.reload_time_ms as f32).min(1.0)
    }

    /// Add heat for one shot. Returns true when this shot tips the weapon
    /// into the overheat lock.
    pub fn add_heat(&mut self, profile: &WeaponProfile, now: EpochMs) -> bool {
        if profile.overheat_per_shot <= 0.0 {
            return false;
        }
        self.overheat_level = (self.overheat_level + profile.overheat_per_shot).min(1.0);
        if self.overheat_level >= 1.0 && !self.overheated {
            self.overheated = true;
            self.overheat_locked_at = now;
            return true;
        }
        false
    }

    /// Clear the overheat lock once its cooldown passes
    pub fn clear_overheat_if_due(&mut self, profile: &WeaponProfile, now: EpochMs) -> bool {
        if self.overheated && now.saturating_sub(self.overheat_locked_at) >= profile.overheat_cooldown_ms {
            self.overheated = false;
            self.overheat_level = 0.0;
            return true;
        }
        false
    }

    /// Charge fraction for the pistol alt-fire (0..1)
    pub fn charge_fraction(&self, config: &CombatConfig, now: EpochMs) -> f32 {
        match self.charge_started_at {
            None => 0.0,
            Some(start) => {
                let elapsed = now.saturating_sub(start) as f32;
                (elapsed / config.charge_window_ms as f32).min(1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weapon::WeaponKind;

    #[test]
    fn test_cooldown_gates_firing() {
        let profile = WeaponProfile::pistol();
        let mut state = WeaponRuntimeState::new(&profile);

        assert!(state.can_fire(&profile, 1.0, false, 0));
        state.last_shot_at = Some(1000);

        // Pistol at 2 shots/sec = 500ms cooldown
        assert!(!state.can_fire(&profile, 1.0, false, 1499));
        assert!(state.can_fire(&profile, 1.0, false, 1500));
    }

    #[test]
    fn test_fire_rate_buff_shortens_cooldown() {
        let profile = WeaponProfile::pistol();
        let mut state = WeaponRuntimeState::new(&profile);
        state.last_shot_at = Some(1000);

        assert!(!state.can_fire(&profile, 1.0, false, 1400));
        assert!(state.can_fire(&profile, 1.5, false, 1400));
    }

    #[test]
    fn test_empty_magazine_blocks_unless_infinite() {
        let profile = WeaponProfile::pistol();
        let mut state = WeaponRuntimeState::new(&profile);
        state.current_ammo = 0;

        assert!(!state.can_fire(&profile, 1.0, false, 0));
        assert!(state.can_fire(&profile, 1.0, true, 0));
    }

    #[test]
    fn test_unbounded_weapon_never_runs_dry() {
        let profile = WeaponProfile::grapple();
        let mut state = WeaponRuntimeState::new(&profile);
        state.consume_ammo(&profile, 10, false);
        assert!(state.has_ammo(&profile, false));
    }

    #[test]
    fn test_reload_rejections() {
        let profile = WeaponProfile::pistol();
        let mut state = WeaponRuntimeState::new(&profile);

        // Full magazine
        assert!(!state.start_reload(&profile, 0));

        state.current_ammo = 3;
        assert!(state.start_reload(&profile, 0));
        // Already reloading
        assert!(!state.start_reload(&profile, 100));

        // Unbounded capacity
        let grapple = WeaponProfile::grapple();
        let mut gstate = WeaponRuntimeState::new(&grapple);
        assert!(!gstate.start_reload(&grapple, 0));

        // Exhausted modeled reserve
        let shotgun = WeaponProfile::shotgun();
        let mut sstate = WeaponRuntimeState::new(&shotgun);
        sstate.current_ammo = 1;
        sstate.reserve_ammo = Some(0);
        assert!(!sstate.start_reload(&shotgun, 0));
    }

    #[test]
    fn test_reload_refills_from_unmodeled_reserve() {
        let profile = WeaponProfile::pistol();
        let mut state = WeaponRuntimeState::new(&profile);
        state.current_ammo = 2;

        assert!(state.start_reload(&profile, 1000));
        assert!(state.finish_reload_if_due(&profile, 1999).is_none());

        let loaded = state.finish_reload_if_due(&profile, 2000);
        assert_eq!(loaded, Some(10));
        assert_eq!(state.current_ammo, 12);
        assert!(!state.reloading);
    }

    #[test]
    fn test_reload_draws_from_finite_reserve() {
        let profile = WeaponProfile::shotgun();
        let mut state = WeaponRuntimeState::new(&profile);
        state.current_ammo = 0;
        state.reserve_ammo = Some(4);

        assert!(state.start_reload(&profile, 0));
        let loaded = state.finish_reload_if_due(&profile, profile.reload_time_ms);
        // Only 4 in reserve for a 6-round magazine
        assert_eq!(loaded, Some(4));
        assert_eq!(state.current_ammo, 4);
        assert_eq!(state.reserve_ammo, Some(0));
    }

    #[test]
    fn test_overheat_locks_and_cools() {
        let profile = WeaponProfile::rapidfire();
        let mut state = WeaponRuntimeState::new(&profile);

        // 0.04 heat per shot: the 25th shot locks the weapon
        let mut locked_on = None;
        for shot in 1..=25 {
            if state.add_heat(&profile, 1000) {
                locked_on = Some(shot);
            }
        }
        assert_eq!(locked_on, Some(25));
        assert!(state.overheated);
        assert_eq!(state.overheat_level, 1.0);
        assert!(!state.can_fire(&profile, 1.0, false, 2000));

        assert!(!state.clear_overheat_if_due(&profile, 3999));
        assert!(state.clear_overheat_if_due(&profile, 4000));
        assert!(!state.overheated);
        assert_eq!(state.overheat_level, 0.0);
    }

    #[test]
    fn test_charge_fraction_ramp() {
        let config = CombatConfig::default();
        let profile = WeaponProfile::pistol();
        let mut state = WeaponRuntimeState::new(&profile);

        assert_eq!(state.charge_fraction(&config, 5000), 0.0);

        state.charge_started_at = Some(1000);
        assert_eq!(state.charge_fraction(&config, 1000), 0.0);
        assert!((state.charge_fraction(&config, 2000) - 0.5).abs() < 1e-6);
        assert_eq!(state.charge_fraction(&config, 3000), 1.0);
        // Clamped past the window
        assert_eq!(state.charge_fraction(&config, 9000), 1.0);
    }

    #[test]
    fn test_state_for_each_kind_constructs() {
        for kind in WeaponKind::all() {
            let profile = WeaponProfile::for_kind(kind);
            let state = WeaponRuntimeState::new(&profile);
            assert_eq!(state.current_ammo, profile.capacity.unwrap_or(0));
        }
    }
}
