//! Weapon firing and damage resolution
//!
//! The host resolves rays against the scene and hands the core a resolved
//! hit descriptor; the core runs the damage pipeline (power-ups → combo →
//! weakpoint) and applies the result through a caller-supplied sink. Spread
//! and jitter directions are computed here for the host to ray-cast with.

use ahash::{AHashMap, AHashSet};
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::profile::{WeaponKind, WeaponProfile};
use super::state::WeaponRuntimeState;
use crate::combo::ComboTracker;
use crate::core::config::CombatConfig;
use crate::core::types::{BossPhase, EpochMs, TargetId};
use crate::events::{CombatEvent, EventQueue};
use crate::powerup::PowerUpLedger;
use crate::weakpoint::{apply_weakpoint, EnemyArchetype, WeakpointResolver};

/// Hit descriptor resolved by the host's ray-cast
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedHit {
    pub target: TargetId,
    pub archetype: EnemyArchetype,
    pub hit_point: Vec3,
    pub target_position: Vec3,
    pub target_facing: Vec3,
    pub boss_phase: Option<BossPhase>,
    /// Target health before this shot (drives the grapple pull check)
    pub target_health: f32,
}

/// A nearby target eligible for slam splash damage
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplashCandidate {
    pub target: TargetId,
    pub position: Vec3,
}

/// One trigger pull, as resolved by the host
#[derive(Debug, Clone, Default)]
pub struct FireRequest<'a> {
    /// Shooter position (muzzle), for distance falloff and pull direction
    pub origin: Vec3,
    /// Primary resolved hit; None = the shot connected with nothing
    pub hit: Option<&'a ResolvedHit>,
    /// One entry per connecting shotgun pellet (may repeat target ids)
    pub pellet_hits: &'a [ResolvedHit],
    /// Targets near the primary hit, for the grapple slam
    pub splash_candidates: &'a [SplashCandidate],
}

/// Applies computed damage to a target; owned by the host, not the core
pub trait DamageSink {
    /// Returns true if the target died from this damage
    fn apply(&mut self, target: TargetId, amount: u32) -> bool;
}

/// What one `fire` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotReport {
    pub fired: bool,
    pub damage_dealt: u32,
    pub kills: u32,
}

impl ShotReport {
    fn no_effect() -> Self {
        Self::default()
    }
}

/// HUD snapshot for one weapon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponInfo {
    pub kind: WeaponKind,
    pub current_ammo: u32,
    pub capacity: Option<u32>,
    pub reserve_ammo: Option<u32>,
    pub reloading: bool,
    pub reload_progress: f32,
    pub overheat_level: f32,
    pub overheated: bool,
    pub charge_fraction: f32,
}

/// Firing engine for the player's arsenal
pub struct WeaponSystem {
    profiles: AHashMap<WeaponKind, WeaponProfile>,
    states: AHashMap<WeaponKind, WeaponRuntimeState>,
    active: WeaponKind,
    resolver: WeakpointResolver,
    config: CombatConfig,
    rng: ChaCha8Rng,
    events: EventQueue,
}

impl WeaponSystem {
    pub fn new(config: &CombatConfig) -> Self {
        Self::with_rng_seed(config, 0xC0FFEE)
    }

    /// Deterministic RNG for reproducible spread/jitter in tests
    pub fn with_rng_seed(config: &CombatConfig, seed: u64) -> Self {
        let mut profiles = AHashMap::new();
        let mut states = AHashMap::new();
        for kind in WeaponKind::all() {
            let profile = WeaponProfile::for_kind(kind);
            states.insert(kind, WeaponRuntimeState::new(&profile));
            profiles.insert(kind, profile);
        }
        Self {
            profiles,
            states,
            active: WeaponKind::Pistol,
            resolver: WeakpointResolver::new(),
            config: config.clone(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: EventQueue::new(),
        }
    }

    pub fn active_weapon(&self) -> WeaponKind {
        self.active
    }

    pub fn switch_weapon(&mut self, kind: WeaponKind) {
        self.active = kind;
    }

    pub fn resolver(&self) -> &WeakpointResolver {
        &self.resolver
    }

    /// Engage or release alternate fire on the active weapon
    ///
    /// For the pistol, engaging starts the charge timer; the shot is released
    /// by calling `fire` while engaged. Disengaging without firing drops the
    /// charge.
    pub fn set_alt_fire(&mut self, engaged: bool, now: EpochMs) {
        let kind = self.active;
        let state = self.states.get_mut(&kind).expect("state exists for every kind");
        state.alt_fire_engaged = engaged;
        if kind == WeaponKind::Pistol {
            state.charge_started_at = if engaged { Some(now) } else { None };
        }
    }

    /// Firing gate for the active weapon
    pub fn can_fire(&self, buffs: &PowerUpLedger, now: EpochMs) -> bool {
        let profile = &self.profiles[&self.active];
        let state = &self.states[&self.active];
        state.can_fire(profile, buffs.fire_rate_multiplier(), buffs.has_infinite_ammo(), now)
    }

    /// Aim direction with per-weapon jitter applied, for the host's ray-cast
    ///
    /// Rapidfire jitter grows with heat; the alt-fire burst is near-laser.
    pub fn fire_direction(&mut self, aim: Vec3) -> Vec3 {
        let profile = &self.profiles[&self.active];
        let state = &self.states[&self.active];

        let base = (1.0 - profile.accuracy) * 0.15;
        let half_angle = match self.active {
            WeaponKind::Rapidfire if state.alt_fire_engaged => base * 0.05,
            WeaponKind::Rapidfire => base * (1.0 + 3.0 * state.overheat_level),
            _ => base * 0.3,
        };
        sample_cone(&mut self.rng, aim, half_angle)
    }

    /// Per-pellet dispersed directions for the host to resolve, one ray each
    pub fn pellet_directions(&mut self, aim: Vec3) -> Vec<Vec3> {
        let profile = &self.profiles[&WeaponKind::Shotgun];
        let state = &self.states[&WeaponKind::Shotgun];

        // Tight choke narrows the cone to a third
        let spread = if state.alt_fire_engaged { profile.spread / 3.0 } else { profile.spread };
        (0..profile.pellet_count)
            .map(|_| sample_cone(&mut self.rng, aim, spread))
            .collect()
    }

    /// Resolve one trigger pull
    pub fn fire(
        &mut self,
        request: &FireRequest,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> ShotReport {
        let kind = self.active;
        let profile = self.profiles[&kind].clone();
        let infinite_ammo = buffs.has_infinite_ammo();
        let fire_rate_mult = buffs.fire_rate_multiplier();

        let state = self.states.get_mut(&kind).expect("state exists for every kind");
        let alt_fire = state.alt_fire_engaged;

        if !state.can_fire(&profile, fire_rate_mult, infinite_ammo, now) {
            // Exhaustion is UI-visible; reload/overheat/cooldown conflicts
            // are rejected silently
            if !state.reloading
                && !state.overheated
                && state.cooldown_ready(&profile, fire_rate_mult, now)
                && !state.has_ammo(&profile, infinite_ammo)
            {
                self.events.push(CombatEvent::AmmoDepleted { weapon: kind });
            }
            return ShotReport::no_effect();
        }

        // Charge shot releases only past the minimum fraction; an early
        // release keeps the charge building
        let charge_fraction = state.charge_fraction(&self.config, now);
        if kind == WeaponKind::Pistol && alt_fire && charge_fraction < self.config.charge_min_fraction {
            return ShotReport::no_effect();
        }

        // Burst draws more than one round; an underfilled magazine is
        // exhaustion, not a partial burst
        let rounds_needed = if kind == WeaponKind::Rapidfire && alt_fire {
            1 + self.config.burst_extra_ammo
        } else {
            1
        };
        if profile.capacity.is_some() && !infinite_ammo && state.current_ammo < rounds_needed {
            self.events.push(CombatEvent::AmmoDepleted { weapon: kind });
            return ShotReport::no_effect();
        }

        state.last_shot_at = Some(now);
        state.consume_ammo(&profile, rounds_needed, infinite_ammo);
        self.events.push(CombatEvent::WeaponFired { weapon: kind, alt_fire });

        match (kind, alt_fire) {
            (WeaponKind::Pistol, false) => {
                self.single_shot(&profile, request.hit, profile.damage, true, true, combo, buffs, sink, now)
            }
            (WeaponKind::Pistol, true) => self.charge_shot(&profile, request, charge_fraction, combo, buffs, sink, now),
            (WeaponKind::Shotgun, _) => self.pellet_volley(&profile, request, alt_fire, combo, buffs, sink, now),
            (WeaponKind::Rapidfire, false) => {
                self.add_heat_for_shot(&profile, 1, now);
                self.single_shot(&profile, request.hit, profile.damage, true, true, combo, buffs, sink, now)
            }
            (WeaponKind::Rapidfire, true) => self.burst(&profile, request, combo, buffs, sink, now),
            (WeaponKind::Grapple, false) => self.grapple_shot(&profile, request, false, combo, buffs, sink, now),
            (WeaponKind::Grapple, true) => self.grapple_shot(&profile, request, true, combo, buffs, sink, now),
        }
    }

    /// Request a reload on the active weapon
    pub fn reload(&mut self, now: EpochMs) -> bool {
        let kind = self.active;
        let profile = &self.profiles[&kind];
        let state = self.states.get_mut(&kind).expect("state exists for every kind");

        if state.start_reload(profile, now) {
            self.events.push(CombatEvent::ReloadStarted { weapon: kind });
            true
        } else {
            false
        }
    }

    /// Per-frame update: completes due reloads and clears cooled overheats
    pub fn tick(&mut self, now: EpochMs) {
        for kind in WeaponKind::all() {
            let profile = &self.profiles[&kind];
            let state = self.states.get_mut(&kind).expect("state exists for every kind");

            if let Some(loaded) = state.finish_reload_if_due(profile, now) {
                self.events.push(CombatEvent::ReloadFinished { weapon: kind, loaded });
            }
            if state.clear_overheat_if_due(profile, now) {
                self.events.push(CombatEvent::OverheatCleared { weapon: kind });
            }
        }
    }

    /// HUD snapshot
    pub fn weapon_info(&self, kind: WeaponKind, now: EpochMs) -> WeaponInfo {
        let profile = &self.profiles[&kind];
        let state = &self.states[&kind];
        WeaponInfo {
            kind,
            current_ammo: state.current_ammo,
            capacity: profile.capacity,
            reserve_ammo: state.reserve_ammo,
            reloading: state.reloading,
            reload_progress: state.reload_progress(profile, now),
            overheat_level: state.overheat_level,
            overheated: state.overheated,
            charge_fraction: state.charge_fraction(&self.config, now),
        }
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    // === per-weapon branches ===

    #[allow(clippy::too_many_arguments)]
    fn single_shot(
        &mut self,
        profile: &WeaponProfile,
        hit: Option<&ResolvedHit>,
        base_damage: f32,
        use_pipeline: bool,
        miss_breaks_combo: bool,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> ShotReport {
        let Some(hit) = hit else {
            self.events.push(CombatEvent::WeaponMissed { weapon: profile.kind });
            if miss_breaks_combo {
                combo.register_miss();
            }
            return ShotReport { fired: true, ..Default::default() };
        };

        let (damage, died) = self.resolve_and_apply(profile, hit, base_damage, use_pipeline, combo, buffs, sink, now);
        ShotReport { fired: true, damage_dealt: damage, kills: died as u32 }
    }

    #[allow(clippy::too_many_arguments)]
    fn charge_shot(
        &mut self,
        profile: &WeaponProfile,
        request: &FireRequest,
        charge_fraction: f32,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> ShotReport {
        // Multiplier ramps linearly with the charge fraction
        let mult = self.config.charge_min_multiplier
            + (self.config.charge_max_multiplier - self.config.charge_min_multiplier) * charge_fraction;
        self.events.push(CombatEvent::ChargeReleased { weapon: profile.kind, fraction: charge_fraction });

        // Charge resets after firing; the trigger stays engaged
        let state = self.states.get_mut(&profile.kind).expect("state exists for every kind");
        state.charge_started_at = Some(now);

        self.single_shot(
            profile,
            request.hit,
            profile.damage * mult,
            profile.alt_fire_uses_pipeline,
            false,
            combo,
            buffs,
            sink,
            now,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn pellet_volley(
        &mut self,
        profile: &WeaponProfile,
        request: &FireRequest,
        alt_fire: bool,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> ShotReport {
        if request.pellet_hits.is_empty() {
            // Area weapon: a whiffed volley never breaks the combo
            self.events.push(CombatEvent::WeaponMissed { weapon: profile.kind });
            return ShotReport { fired: true, ..Default::default() };
        }

        // Tight choke trades cone width for per-pellet punch
        let per_pellet = if alt_fire { profile.damage * 1.2 } else { profile.damage };
        let use_pipeline = if alt_fire { profile.alt_fire_uses_pipeline } else { true };

        let mut report = ShotReport { fired: true, ..Default::default() };
        let mut struck: AHashSet<TargetId> = AHashSet::new();

        for pellet in request.pellet_hits {
            // One pellet per target per shot
            if !struck.insert(pellet.target) {
                continue;
            }
            let distance = request.origin.distance(pellet.hit_point);
            let base = per_pellet * profile.falloff_factor(distance);
            let (damage, died) = self.resolve_and_apply(profile, pellet, base, use_pipeline, combo, buffs, sink, now);
            report.damage_dealt += damage;
            report.kills += died as u32;
        }
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn burst(
        &mut self,
        profile: &WeaponProfile,
        request: &FireRequest,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> ShotReport {
        let mut report = ShotReport { fired: true, ..Default::default() };
        let rounds = self.config.burst_rounds;
        self.add_heat_for_shot(profile, rounds, now);

        for _ in 0..rounds {
            let round = self.single_shot(profile, request.hit, profile.damage, profile.alt_fire_uses_pipeline, false, combo, buffs, sink, now);
            report.damage_dealt += round.damage_dealt;
            report.kills += round.kills;
        }
        report
    }

    #[allow(clippy::too_many_arguments)]
    fn grapple_shot(
        &mut self,
        profile: &WeaponProfile,
        request: &FireRequest,
        slam: bool,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> ShotReport {
        let Some(hit) = request.hit else {
            self.events.push(CombatEvent::WeaponMissed { weapon: profile.kind });
            return ShotReport { fired: true, ..Default::default() };
        };

        let use_pipeline = if slam { profile.alt_fire_uses_pipeline } else { true };
        let base = if slam { profile.damage * 2.0 } else { profile.damage };
        let (damage, died) = self.resolve_and_apply(profile, hit, base, use_pipeline, combo, buffs, sink, now);
        let mut report = ShotReport { fired: true, damage_dealt: damage, kills: died as u32 };

        if slam {
            // Splash scales down linearly with distance from the primary target
            let pipeline_mult = if use_pipeline {
                buffs.damage_multiplier() * combo.damage_multiplier()
            } else {
                1.0
            };
            let splash_base = base * pipeline_mult;
            let radius = self.config.slam_splash_radius;

            for candidate in request.splash_candidates {
                if candidate.target == hit.target {
                    continue;
                }
                let dist = candidate.position.distance(hit.target_position);
                if dist > radius {
                    continue;
                }
                let splash = (splash_base * (1.0 - dist / radius)).floor() as u32;
                if splash == 0 {
                    continue;
                }
                let splash_died = sink.apply(candidate.target, splash);
                self.events.push(CombatEvent::SplashDamage { target: candidate.target, damage: splash });
                if splash_died {
                    self.events.push(CombatEvent::TargetKilled { target: candidate.target, weapon: profile.kind });
                    combo.register_kill(now);
                    report.kills += 1;
                }
                report.damage_dealt += splash;
            }
        } else if !died && !hit.archetype.is_boss() {
            // Light targets get reeled in
            let remaining = hit.target_health - damage as f32;
            if remaining < self.config.grapple_pull_health_threshold {
                self.events.push(CombatEvent::TargetPulled {
                    target: hit.target,
                    toward: request.origin,
                    distance: self.config.grapple_pull_distance,
                });
            }
        }

        report
    }

    // === pipeline core ===

    /// Damage pipeline, fixed order: power-ups → combo → weakpoint.
    /// Instant-kill overrides rather than composes, so it runs last.
    #[allow(clippy::too_many_arguments)]
    fn resolve_and_apply(
        &mut self,
        profile: &WeaponProfile,
        hit: &ResolvedHit,
        base_damage: f32,
        use_pipeline: bool,
        combo: &mut ComboTracker,
        buffs: &PowerUpLedger,
        sink: &mut dyn DamageSink,
        now: EpochMs,
    ) -> (u32, bool) {
        let mut damage = base_damage;
        if use_pipeline {
            damage *= buffs.damage_multiplier();
            damage *= combo.damage_multiplier();
        }

        let weakpoint = self.resolver.classify(
            hit.archetype,
            hit.hit_point,
            hit.target_position,
            hit.target_facing,
            hit.boss_phase,
        );
        let (final_damage, crit) = match weakpoint {
            Some(wp) => (apply_weakpoint(damage, wp), wp.is_critical()),
            None => (damage.floor() as u32, false),
        };

        let died = sink.apply(hit.target, final_damage);
        tracing::debug!(
            target = hit.target.0,
            damage = final_damage,
            crit,
            weakpoint = weakpoint.map(|w| w.name),
            "hit resolved"
        );
        self.events.push(CombatEvent::WeaponHit {
            weapon: profile.kind,
            target: hit.target,
            damage: final_damage,
            crit,
            position: hit.hit_point,
        });
        if died {
            self.events.push(CombatEvent::TargetKilled { target: hit.target, weapon: profile.kind });
            combo.register_kill(now);
        }
        (final_damage, died)
    }

    fn add_heat_for_shot(&mut self, profile: &WeaponProfile, rounds: u32, now: EpochMs) {
        let state = self.states.get_mut(&profile.kind).expect("state exists for every kind");
        for _ in 0..rounds {
            if state.add_heat(profile, now) {
                self.events.push(CombatEvent::Overheated { weapon: profile.kind });
            }
        }
    }
}

/// Uniform sample within a cone of the given half-angle around `axis`
fn sample_cone(rng: &mut ChaCha8Rng, axis: Vec3, half_angle: f32) -> Vec3 {
    if half_angle <= 0.0 {
        return axis.normalize_or_zero();
    }
    let axis = axis.normalize_or_zero();
    let (u, v) = axis.any_orthonormal_pair();

    let theta = rng.gen::<f32>() * half_angle;
    let phi = rng.gen::<f32>() * std::f32::consts::TAU;
    (axis * theta.cos() + (u * phi.cos() + v * phi.sin()) * theta.sin()).normalize()
}
