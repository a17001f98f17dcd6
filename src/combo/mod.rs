//! Kill-streak tracking with decay and tiered multipliers
//!
//! The combo climbs on kills, decays on a timeout, and breaks on misses or
//! incoming damage (subject to unlocked break-policy upgrades). Multipliers
//! are always derived from the highest tier threshold at or below the
//! current combo.

use serde::{Deserialize, Serialize};

use crate::core::config::CombatConfig;
use crate::core::types::EpochMs;
use crate::events::{CombatEvent, EventQueue};

/// One tier in the streak table (ascending by threshold)
#[derive(Debug, Clone, Serialize)]
pub struct ComboTier {
    /// Kill count at which this tier starts
    pub threshold: u32,
    pub score_multiplier: f32,
    /// Additive bonus: damage multiplier is `1 + damage_bonus`
    pub damage_bonus: f32,
    pub name: &'static str,
    /// HUD color hex
    pub color: &'static str,
}

/// Tuned default tier table
pub fn default_tiers() -> Vec<ComboTier> {
    vec![
        ComboTier { threshold: 2, score_multiplier: 1.2, damage_bonus: 0.05, name: "COMBO", color: "#9acd32" },
        ComboTier { threshold: 5, score_multiplier: 2.0, damage_bonus: 0.15, name: "RAMPAGE!", color: "#ff8c00" },
        ComboTier { threshold: 25, score_multiplier: 3.5, damage_bonus: 0.35, name: "UNSTOPPABLE", color: "#ff3030" },
        ComboTier { threshold: 50, score_multiplier: 5.0, damage_bonus: 0.50, name: "GODLIKE", color: "#ff00ff" },
    ]
}

/// What happens to the combo when the player takes damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComboBreakPolicy {
    /// No upgrade: reset to zero
    #[default]
    Full,
    /// "Iron focus" upgrade: damage never touches the combo
    Preserve,
    /// "Grit" upgrade: lose half the combo (floored) instead of all of it
    HalfLoss,
}

/// Read-only view for the HUD
#[derive(Debug, Clone, Serialize)]
pub struct ComboSnapshot {
    pub combo: u32,
    pub max_combo: u32,
    pub score_multiplier: f32,
    pub damage_multiplier: f32,
    pub tier_name: Option<&'static str>,
    pub tier_color: Option<&'static str>,
    /// Milliseconds left before the streak decays (None when no streak)
    pub decay_remaining_ms: Option<EpochMs>,
}

/// Kill-streak state machine
#[derive(Debug)]
pub struct ComboTracker {
    combo: u32,
    max_combo: u32,
    last_kill_at: EpochMs,
    timeout_ms: EpochMs,
    tiers: Vec<ComboTier>,
    break_policy: ComboBreakPolicy,
    events: EventQueue,
}

impl ComboTracker {
    pub fn new(config: &CombatConfig) -> Self {
        Self::with_tiers(config, default_tiers())
    }

    /// Tracker with a caller-supplied tier table (must be ascending by
    /// threshold)
    pub fn with_tiers(config: &CombatConfig, tiers: Vec<ComboTier>) -> Self {
        Self {
            combo: 0,
            max_combo: 0,
            last_kill_at: 0,
            timeout_ms: config.combo_timeout_ms,
            tiers,
            break_policy: ComboBreakPolicy::default(),
            events: EventQueue::new(),
        }
    }

    /// Unlock a break-policy upgrade
    pub fn set_break_policy(&mut self, policy: ComboBreakPolicy) {
        self.break_policy = policy;
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    /// Highest tier whose threshold is <= the current combo
    pub fn current_tier(&self) -> Option<&ComboTier> {
        self.tiers.iter().rev().find(|t| t.threshold <= self.combo)
    }

    /// Damage multiplier contributed by the streak (1.0 with no tier)
    pub fn damage_multiplier(&self) -> f32 {
        1.0 + self.current_tier().map_or(0.0, |t| t.damage_bonus)
    }

    /// Score multiplier contributed by the streak (1.0 with no tier)
    pub fn score_multiplier(&self) -> f32 {
        self.current_tier().map_or(1.0, |t| t.score_multiplier)
    }

    /// Register a confirmed kill
    pub fn register_kill(&mut self, now: EpochMs) {
        self.expire_if_stale(now);

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.last_kill_at = now;

        self.events.push(CombatEvent::ComboKill { combo: self.combo });

        // Milestone fires exactly when a threshold is crossed, not on every
        // kill inside the tier
        if let Some(tier) = self.tiers.iter().find(|t| t.threshold == self.combo) {
            self.events.push(CombatEvent::ComboMilestone {
                combo: self.combo,
                tier_name: tier.name,
                score_multiplier: tier.score_multiplier,
            });
        }
    }

    /// Register a combo-breaking miss (pistol/rapidfire primary fire)
    pub fn register_miss(&mut self) {
        self.break_combo();
    }

    /// Player took damage; outcome depends on the unlocked break policy
    pub fn on_damage_taken(&mut self) {
        match self.break_policy {
            ComboBreakPolicy::Full => self.break_combo(),
            ComboBreakPolicy::Preserve => {}
            ComboBreakPolicy::HalfLoss => {
                if self.combo > 0 {
                    let lost = self.combo - self.combo / 2;
                    self.combo /= 2;
                    self.events.push(CombatEvent::ComboBroken { lost });
                }
            }
        }
    }

    /// Periodic decay check so the HUD sees the streak expire between kills
    pub fn tick(&mut self, now: EpochMs) {
        self.expire_if_stale(now);
    }

    /// Reset for a level restart (no break event)
    pub fn reset(&mut self) {
        self.combo = 0;
        self.max_combo = 0;
        self.last_kill_at = 0;
        self.events.drain();
    }

    pub fn snapshot(&self, now: EpochMs) -> ComboSnapshot {
        let tier = self.current_tier();
        let decay_remaining_ms = if self.combo > 0 {
            Some((self.last_kill_at + self.timeout_ms).saturating_sub(now))
        } else {
            None
        };
        ComboSnapshot {
            combo: self.combo,
            max_combo: self.max_combo,
            score_multiplier: self.score_multiplier(),
            damage_multiplier: self.damage_multiplier(),
            tier_name: tier.map(|t| t.name),
            tier_color: tier.map(|t| t.color),
            decay_remaining_ms,
        }
    }

    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        self.events.drain()
    }

    fn expire_if_stale(&mut self, now: EpochMs) {
        if self.combo > 0 && now.saturating_sub(self.last_kill_at) > self.timeout_ms {
            self.break_combo();
        }
    }

    fn break_combo(&mut self) {
        if self.combo > 0 {
            self.events.push(CombatEvent::ComboBroken { lost: self.combo });
            self.combo = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ComboTracker {
        ComboTracker::new(&CombatConfig::default())
    }

    fn kill_n(t: &mut ComboTracker, n: u32, now: EpochMs) {
        for _ in 0..n {
            t.register_kill(now);
        }
    }

    #[test]
    fn test_kills_increment_combo() {
        let mut t = tracker();
        kill_n(&mut t, 3, 1000);
        assert_eq!(t.combo(), 3);
        assert_eq!(t.max_combo(), 3);
    }

    #[test]
    fn test_timeout_restarts_at_one() {
        let mut t = tracker();
        kill_n(&mut t, 4, 1000);

        // Past the 5000ms timeout: next kill starts a fresh streak
        t.register_kill(7001);
        assert_eq!(t.combo(), 1);
    }

    #[test]
    fn test_kill_inside_timeout_continues_streak() {
        let mut t = tracker();
        t.register_kill(1000);
        t.register_kill(5999);
        assert_eq!(t.combo(), 2);
    }

    #[test]
    fn test_tick_expires_streak() {
        let mut t = tracker();
        kill_n(&mut t, 6, 1000);

        t.tick(4000);
        assert_eq!(t.combo(), 6);

        t.tick(6001);
        assert_eq!(t.combo(), 0);
        let events = t.drain_events();
        assert!(events.iter().any(|e| matches!(e, CombatEvent::ComboBroken { lost: 6 })));
    }

    #[test]
    fn test_multipliers_from_highest_reached_tier() {
        let mut t = tracker();
        assert_eq!(t.score_multiplier(), 1.0);
        assert_eq!(t.damage_multiplier(), 1.0);

        kill_n(&mut t, 5, 1000);
        assert_eq!(t.current_tier().unwrap().name, "RAMPAGE!");
        assert!((t.score_multiplier() - 2.0).abs() < f32::EPSILON);
        assert!((t.damage_multiplier() - 1.15).abs() < 1e-6);

        // Still RAMPAGE! at 24 (next tier starts at 25)
        kill_n(&mut t, 19, 1000);
        assert_eq!(t.combo(), 24);
        assert_eq!(t.current_tier().unwrap().name, "RAMPAGE!");
    }

    #[test]
    fn test_milestone_fires_exactly_once_per_threshold() {
        let mut t = tracker();
        kill_n(&mut t, 26, 1000);

        let events = t.drain_events();
        let milestones: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, CombatEvent::ComboMilestone { combo: 25, .. }))
            .collect();
        assert_eq!(milestones.len(), 1);
    }

    #[test]
    fn test_miss_breaks_combo() {
        let mut t = tracker();
        kill_n(&mut t, 7, 1000);
        t.register_miss();
        assert_eq!(t.combo(), 0);

        let events = t.drain_events();
        assert!(events.iter().any(|e| matches!(e, CombatEvent::ComboBroken { lost: 7 })));
    }

    #[test]
    fn test_miss_with_no_streak_is_silent() {
        let mut t = tracker();
        t.register_miss();
        assert!(t.drain_events().is_empty());
    }

    #[test]
    fn test_damage_break_policies() {
        let mut t = tracker();
        kill_n(&mut t, 9, 1000);
        t.on_damage_taken();
        assert_eq!(t.combo(), 0);

        let mut t = tracker();
        t.set_break_policy(ComboBreakPolicy::Preserve);
        kill_n(&mut t, 9, 1000);
        t.on_damage_taken();
        assert_eq!(t.combo(), 9);

        let mut t = tracker();
        t.set_break_policy(ComboBreakPolicy::HalfLoss);
        kill_n(&mut t, 9, 1000);
        t.on_damage_taken();
        assert_eq!(t.combo(), 4);
    }

    #[test]
    fn test_max_combo_survives_break() {
        let mut t = tracker();
        kill_n(&mut t, 12, 1000);
        t.register_miss();
        assert_eq!(t.max_combo(), 12);
    }

    #[test]
    fn test_snapshot_decay_countdown() {
        let mut t = tracker();
        t.register_kill(1000);

        let snap = t.snapshot(3000);
        assert_eq!(snap.decay_remaining_ms, Some(3000));
        assert_eq!(snap.combo, 1);
    }
}
