//! Per-kind hazard configuration
//!
//! Each kind ships tuned defaults; room definitions may override individual
//! fields. Configs are validated at spawn so a malformed hazard degrades at
//! load time instead of mid-tick.

use serde::{Deserialize, Serialize};

use super::HazardKind;
use crate::core::types::EpochMs;

/// Resolved configuration for one hazard instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardConfig {
    /// Damage per application to an entity in range
    pub damage: u32,
    /// Minimum milliseconds between damage applications while active
    pub damage_interval_ms: EpochMs,
    /// Telegraph window before the active phase (cyclic kinds and debris)
    pub warning_ms: EpochMs,
    /// Active (damaging) window of the duty cycle
    pub active_ms: EpochMs,
    /// Dormant window of the duty cycle
    pub inactive_ms: EpochMs,
    /// Proximity radius for damage checks (world units)
    pub radius: f32,
    /// Total lifetime for self-removing kinds (gas, debris fall); 0 = indefinite
    pub duration_ms: EpochMs,
    /// Destructible health; None = indestructible
    pub health: Option<f32>,
    /// Detonation radius (explosive barrel)
    pub explosion_radius: f32,
    /// Detonation damage at the blast center (explosive barrel)
    pub explosion_damage: u32,
}

/// Sparse per-room overrides merged over the kind defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HazardOverrides {
    pub damage: Option<u32>,
    pub damage_interval_ms: Option<EpochMs>,
    pub warning_ms: Option<EpochMs>,
    pub active_ms: Option<EpochMs>,
    pub inactive_ms: Option<EpochMs>,
    pub radius: Option<f32>,
    pub duration_ms: Option<EpochMs>,
    pub health: Option<f32>,
    pub explosion_radius: Option<f32>,
    pub explosion_damage: Option<u32>,
}

impl HazardConfig {
    /// Tuned defaults for a hazard kind
    pub fn for_kind(kind: HazardKind) -> Self {
        match kind {
            HazardKind::LaserGrid => Self {
                damage: 15,
                damage_interval_ms: 500,
                warning_ms: 0,
                active_ms: 2000,
                inactive_ms: 1500,
                radius: 1.2,
                duration_ms: 0,
                health: None,
                explosion_radius: 0.0,
                explosion_damage: 0,
            },
            HazardKind::FlameJet => Self {
                damage: 10,
                damage_interval_ms: 400,
                warning_ms: 800,
                active_ms: 1500,
                inactive_ms: 2000,
                radius: 2.0,
                duration_ms: 0,
                health: None,
                explosion_radius: 0.0,
                explosion_damage: 0,
            },
            HazardKind::ElectricFloor => Self {
                damage: 8,
                damage_interval_ms: 600,
                warning_ms: 0,
                active_ms: 2500,
                inactive_ms: 2500,
                radius: 2.5,
                duration_ms: 0,
                health: None,
                explosion_radius: 0.0,
                explosion_damage: 0,
            },
            HazardKind::FloorSpikes => Self {
                damage: 20,
                damage_interval_ms: 800,
                warning_ms: 600,
                active_ms: 1200,
                inactive_ms: 1800,
                radius: 1.5,
                duration_ms: 0,
                health: None,
                explosion_radius: 0.0,
                explosion_damage: 0,
            },
            HazardKind::ExplosiveBarrel => Self {
                damage: 0,
                damage_interval_ms: 0,
                warning_ms: 0,
                active_ms: 0,
                inactive_ms: 0,
                radius: 0.8,
                duration_ms: 0,
                health: Some(30.0),
                explosion_radius: 5.0,
                explosion_damage: 60,
            },
            HazardKind::ToxicGas => Self {
                damage: 5,
                damage_interval_ms: 1000,
                warning_ms: 0,
                active_ms: 0,
                inactive_ms: 0,
                radius: 3.5,
                duration_ms: 8000,
                health: None,
                explosion_radius: 0.0,
                explosion_damage: 0,
            },
            HazardKind::FallingDebris => Self {
                damage: 35,
                damage_interval_ms: 0,
                warning_ms: 1200,
                active_ms: 0,
                inactive_ms: 0,
                radius: 2.0,
                // Time from impact until the rubble despawns
                duration_ms: 1500,
                health: None,
                explosion_radius: 0.0,
                explosion_damage: 0,
            },
        }
    }

    /// Kind defaults with room overrides applied on top
    pub fn merged(kind: HazardKind, overrides: &HazardOverrides) -> Self {
        let mut config = Self::for_kind(kind);
        if let Some(v) = overrides.damage {
            config.damage = v;
        }
        if let Some(v) = overrides.damage_interval_ms {
            config.damage_interval_ms = v;
        }
        if let Some(v) = overrides.warning_ms {
            config.warning_ms = v;
        }
        if let Some(v) = overrides.active_ms {
            config.active_ms = v;
        }
        if let Some(v) = overrides.inactive_ms {
            config.inactive_ms = v;
        }
        if let Some(v) = overrides.radius {
            config.radius = v;
        }
        if let Some(v) = overrides.duration_ms {
            config.duration_ms = v;
        }
        if let Some(v) = overrides.health {
            config.health = Some(v);
        }
        if let Some(v) = overrides.explosion_radius {
            config.explosion_radius = v;
        }
        if let Some(v) = overrides.explosion_damage {
            config.explosion_damage = v;
        }
        config
    }

    /// Consistency checks, run once at spawn
    pub fn validate(&self, kind: HazardKind) -> Result<(), String> {
        if self.radius <= 0.0 {
            return Err(format!("{kind:?}: radius must be positive, got {}", self.radius));
        }
        if kind.is_cyclic() {
            if self.active_ms == 0 {
                return Err(format!("{kind:?}: cyclic hazard needs a nonzero active window"));
            }
            if self.active_ms + self.inactive_ms + self.warning_ms == 0 {
                return Err(format!("{kind:?}: cycle length is zero"));
            }
        }
        match kind {
            HazardKind::ExplosiveBarrel => {
                if self.health.unwrap_or(0.0) <= 0.0 {
                    return Err("ExplosiveBarrel: health must be positive".to_string());
                }
                if self.explosion_radius <= 0.0 {
                    return Err("ExplosiveBarrel: explosion_radius must be positive".to_string());
                }
            }
            HazardKind::ToxicGas => {
                if self.duration_ms == 0 {
                    return Err("ToxicGas: duration_ms must be nonzero".to_string());
                }
            }
            HazardKind::FallingDebris => {
                if self.warning_ms == 0 {
                    return Err("FallingDebris: warning_ms must be nonzero".to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate_for_every_kind() {
        for kind in HazardKind::all() {
            let config = HazardConfig::for_kind(kind);
            assert!(config.validate(kind).is_ok(), "default config for {kind:?} invalid");
        }
    }

    #[test]
    fn test_overrides_merge_over_defaults() {
        let overrides = HazardOverrides { damage: Some(99), radius: Some(4.0), ..Default::default() };
        let config = HazardConfig::merged(HazardKind::LaserGrid, &overrides);
        assert_eq!(config.damage, 99);
        assert_eq!(config.radius, 4.0);
        // Untouched fields keep their defaults
        assert_eq!(config.active_ms, 2000);
    }

    #[test]
    fn test_zero_active_window_rejected_for_cyclic() {
        let overrides = HazardOverrides { active_ms: Some(0), ..Default::default() };
        let config = HazardConfig::merged(HazardKind::FloorSpikes, &overrides);
        assert!(config.validate(HazardKind::FloorSpikes).is_err());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let overrides = HazardOverrides { radius: Some(-1.0), ..Default::default() };
        let config = HazardConfig::merged(HazardKind::ToxicGas, &overrides);
        assert!(config.validate(HazardKind::ToxicGas).is_err());
    }

    #[test]
    fn test_barrel_needs_health() {
        let overrides = HazardOverrides { health: Some(0.0), ..Default::default() };
        let config = HazardConfig::merged(HazardKind::ExplosiveBarrel, &overrides);
        assert!(config.validate(HazardKind::ExplosiveBarrel).is_err());
    }
}
