//! Static weapon profiles
//!
//! One profile per weapon kind; runtime state lives in `state.rs`.

use serde::{Deserialize, Serialize};

use crate::core::types::EpochMs;

/// Player weapon kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Pistol,
    Shotgun,
    Rapidfire,
    Grapple,
}

impl WeaponKind {
    pub fn all() -> [WeaponKind; 4] {
        [WeaponKind::Pistol, WeaponKind::Shotgun, WeaponKind::Rapidfire, WeaponKind::Grapple]
    }
}

/// Static per-kind weapon data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub kind: WeaponKind,
    /// Base damage per shot (per pellet for the shotgun)
    pub damage: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub reload_time_ms: EpochMs,
    /// 0..1; drives aim jitter for the rapidfire
    pub accuracy: f32,
    /// Maximum effective distance (world units)
    pub range: f32,
    /// Magazine size; None = unbounded (no ammo, no reload)
    pub capacity: Option<u32>,
    /// Starting reserve; None = unmodeled reserve (reload always refills)
    pub reserve: Option<u32>,
    /// Shotgun pellets per shot
    pub pellet_count: u32,
    /// Shotgun cone half-angle (radians)
    pub spread: f32,
    /// Distance at which shotgun pellet falloff begins
    pub falloff_start: f32,
    /// Heat added per rapidfire shot (weapon locks at 1.0)
    pub overheat_per_shot: f32,
    pub overheat_cooldown_ms: EpochMs,
    /// Whether alt-fire damage passes through the power-up/combo multiplier
    /// pipeline. The pistol charge shot keeps its raw ramp; everything else
    /// composes normally.
    pub alt_fire_uses_pipeline: bool,
}

impl WeaponProfile {
    pub fn pistol() -> Self {
        Self {
            kind: WeaponKind::Pistol,
            damage: 25.0,
            fire_rate: 2.0,
            reload_time_ms: 1000,
            accuracy: 0.95,
            range: 50.0,
            capacity: Some(12),
            reserve: None,
            pellet_count: 1,
            spread: 0.0,
            falloff_start: 0.0,
            overheat_per_shot: 0.0,
            overheat_cooldown_ms: 0,
            alt_fire_uses_pipeline: false,
        }
    }

    pub fn shotgun() -> Self {
        Self {
            kind: WeaponKind::Shotgun,
            damage: 80.0,
            fire_rate: 1.2,
            reload_time_ms: 2200,
            accuracy: 0.85,
            range: 40.0,
            capacity: Some(6),
            reserve: Some(36),
            pellet_count: 8,
            spread: 0.12,
            falloff_start: 15.0,
            overheat_per_shot: 0.0,
            overheat_cooldown_ms: 0,
            alt_fire_uses_pipeline: true,
        }
    }

    pub fn rapidfire() -> Self {
        Self {
            kind: WeaponKind::Rapidfire,
            damage: 8.0,
            fire_rate: 10.0,
            reload_time_ms: 1500,
            accuracy: 0.85,
            range: 60.0,
            capacity: Some(100),
            reserve: Some(300),
            pellet_count: 1,
            spread: 0.0,
            falloff_start: 0.0,
            overheat_per_shot: 0.04,
            overheat_cooldown_ms: 3000,
            alt_fire_uses_pipeline: true,
        }
    }

    pub fn grapple() -> Self {
        Self {
            kind: WeaponKind::Grapple,
            damage: 40.0,
            fire_rate: 0.8,
            reload_time_ms: 0,
            accuracy: 1.0,
            range: 35.0,
            capacity: None,
            reserve: None,
            pellet_count: 1,
            spread: 0.0,
            falloff_start: 0.0,
            overheat_per_shot: 0.0,
            overheat_cooldown_ms: 0,
            alt_fire_uses_pipeline: true,
        }
    }

    pub fn for_kind(kind: WeaponKind) -> Self {
        match kind {
            WeaponKind::Pistol => Self::pistol(),
            WeaponKind::Shotgun => Self::shotgun(),
            WeaponKind::Rapidfire => Self::rapidfire(),
            WeaponKind::Grapple => Self::grapple(),
        }
    }

    /// Cooldown between shots under a fire-rate multiplier (milliseconds)
    pub fn cooldown_ms(&self, fire_rate_multiplier: f32) -> f32 {
        1000.0 / (self.fire_rate * fire_rate_multiplier)
    }

    /// Per-pellet distance falloff factor
    ///
    /// Full damage out to `falloff_start`, then linear decay down to 30% at
    /// `range` and beyond.
    pub fn falloff_factor(&self, distance: f32) -> f32 {
        if distance <= self.falloff_start {
            return 1.0;
        }
        let span = (self.range - self.falloff_start).max(f32::EPSILON);
        let t = ((distance - self.falloff_start) / span).min(1.0);
        1.0 - 0.7 * t
    }
}
