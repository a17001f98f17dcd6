//! Combat tuning with documented constants
//!
//! All cross-subsystem magic numbers are collected here with explanations of
//! their purpose and how they interact with each other. Per-weapon and
//! per-hazard numbers live in their own profile/config structs.

use crate::core::types::EpochMs;

/// Cross-cutting tunables for the combat core
///
/// These values have been tuned against the scripted demo scenarios.
/// Changing them will affect pacing and feel.
#[derive(Debug, Clone)]
pub struct CombatConfig {
    // === COMBO SYSTEM ===
    /// Milliseconds without a kill before the combo resets
    ///
    /// At 5000ms the player must land roughly one kill per five seconds to
    /// hold a streak. The timeout is checked lazily on the next kill and on
    /// every tick so the HUD can show live decay.
    pub combo_timeout_ms: EpochMs,

    // === POWER-UPS ===
    /// Maximum shield stacks
    ///
    /// Shield is the only hit-count-based buff; each stack absorbs one hit.
    /// Re-pickups past the cap refresh the buff but add no stacks.
    pub shield_max_stacks: u32,

    // === PISTOL ALT-FIRE (charge shot) ===
    /// Time to reach full charge (milliseconds)
    ///
    /// The damage multiplier ramps linearly from `charge_min_multiplier` to
    /// `charge_max_multiplier` over this window.
    pub charge_window_ms: EpochMs,

    /// Minimum charge fraction required to release a shot
    ///
    /// Below this fraction the trigger release is a no-op and the charge is
    /// kept. At 0.5 a half-second hold is never enough on the default window.
    pub charge_min_fraction: f32,

    /// Multiplier at the minimum releasable charge
    pub charge_min_multiplier: f32,

    /// Multiplier at full charge
    pub charge_max_multiplier: f32,

    // === GRAPPLE ===
    /// Health below which a non-boss target gets pulled toward the shooter
    pub grapple_pull_health_threshold: f32,

    /// Distance (world units) a pulled target travels toward the shooter
    pub grapple_pull_distance: f32,

    /// Splash radius (world units) of the alt-fire slam around the primary
    /// target
    pub slam_splash_radius: f32,

    // === RAPIDFIRE ALT-FIRE (burst) ===
    /// Rounds per burst
    pub burst_rounds: u32,

    /// Extra ammo consumed by a burst beyond a single shot
    ///
    /// A burst fires `burst_rounds` projectiles but draws
    /// `1 + burst_extra_ammo` from the magazine.
    pub burst_extra_ammo: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            combo_timeout_ms: 5000,
            shield_max_stacks: 3,
            charge_window_ms: 2000,
            charge_min_fraction: 0.5,
            charge_min_multiplier: 2.0,
            charge_max_multiplier: 3.0,
            grapple_pull_health_threshold: 50.0,
            grapple_pull_distance: 4.0,
            slam_splash_radius: 6.0,
            burst_rounds: 3,
            burst_extra_ammo: 2,
        }
    }
}

impl CombatConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.combo_timeout_ms == 0 {
            return Err("combo_timeout_ms must be positive".into());
        }

        if !(0.0..=1.0).contains(&self.charge_min_fraction) {
            return Err(format!(
                "charge_min_fraction ({}) must be in [0, 1]",
                self.charge_min_fraction
            ));
        }

        if self.charge_min_multiplier > self.charge_max_multiplier {
            return Err(format!(
                "charge_min_multiplier ({}) must be <= charge_max_multiplier ({})",
                self.charge_min_multiplier, self.charge_max_multiplier
            ));
        }

        if self.burst_rounds == 0 {
            return Err("burst_rounds must be positive".into());
        }

        if self.slam_splash_radius <= 0.0 || self.grapple_pull_distance <= 0.0 {
            return Err("grapple distances must be positive".into());
        }

        Ok(())
    }
}
