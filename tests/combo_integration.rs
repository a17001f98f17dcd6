//! Integration tests for combo tracking and power-up interplay

use railstorm::combo::{ComboBreakPolicy, ComboTracker};
use railstorm::core::config::CombatConfig;
use railstorm::events::CombatEvent;
use railstorm::powerup::{PowerUpKind, PowerUpLedger};

fn tracker() -> ComboTracker {
    ComboTracker::new(&CombatConfig::default())
}

#[test]
fn test_milestone_at_25_kills() {
    // 24 kills sits in RAMPAGE! (threshold 5); the 25th crosses into
    // UNSTOPPABLE and fires exactly one milestone
    let mut combo = tracker();
    for _ in 0..24 {
        combo.register_kill(1000);
    }
    assert_eq!(combo.current_tier().unwrap().name, "RAMPAGE!");
    assert!((combo.score_multiplier() - 2.0).abs() < f32::EPSILON);
    let _ = combo.drain_events();

    combo.register_kill(1100);
    assert!((combo.score_multiplier() - 3.5).abs() < f32::EPSILON);

    let events = combo.drain_events();
    let milestones: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            CombatEvent::ComboMilestone { combo, tier_name, score_multiplier } => {
                Some((*combo, *tier_name, *score_multiplier))
            }
            _ => None,
        })
        .collect();
    assert_eq!(milestones, vec![(25, "UNSTOPPABLE", 3.5)]);
}

#[test]
fn test_streak_restarts_after_timeout() {
    let mut combo = tracker();
    for t in [1000, 1500, 2000] {
        combo.register_kill(t);
    }
    assert_eq!(combo.combo(), 3);

    // 5000ms timeout measured from the last kill
    combo.register_kill(7001);
    assert_eq!(combo.combo(), 1);
    assert_eq!(combo.max_combo(), 3);
}

#[test]
fn test_kill_at_timeout_boundary_continues() {
    let mut combo = tracker();
    combo.register_kill(1000);
    combo.register_kill(6000);
    assert_eq!(combo.combo(), 2);
}

#[test]
fn test_damage_resets_without_upgrades() {
    let mut combo = tracker();
    for _ in 0..10 {
        combo.register_kill(1000);
    }
    combo.on_damage_taken();
    assert_eq!(combo.combo(), 0);
}

#[test]
fn test_half_loss_upgrade_floors() {
    let mut combo = tracker();
    combo.set_break_policy(ComboBreakPolicy::HalfLoss);
    for _ in 0..7 {
        combo.register_kill(1000);
    }
    combo.on_damage_taken();
    assert_eq!(combo.combo(), 3);
}

#[test]
fn test_preserve_upgrade_ignores_damage() {
    let mut combo = tracker();
    combo.set_break_policy(ComboBreakPolicy::Preserve);
    for _ in 0..7 {
        combo.register_kill(1000);
    }
    combo.on_damage_taken();
    assert_eq!(combo.combo(), 7);
    assert!(combo.drain_events().iter().all(|e| !matches!(e, CombatEvent::ComboBroken { .. })));
}

#[test]
fn test_stackable_buff_caps_but_refreshes() {
    let mut buffs = PowerUpLedger::new(&CombatConfig::default());
    for t in 0..5u64 {
        buffs.activate(PowerUpKind::Shield, t * 10);
    }
    assert_eq!(buffs.stacks(PowerUpKind::Shield), 3);

    // Past-cap pickups still produced refresh events
    let events = buffs.drain_events();
    let refreshed = events.iter().filter(|e| matches!(e, CombatEvent::PowerUpRefreshed { .. })).count();
    assert_eq!(refreshed, 2);
}

#[test]
fn test_expired_buff_stops_contributing() {
    let mut buffs = PowerUpLedger::new(&CombatConfig::default());
    buffs.activate(PowerUpKind::DoubleDamage, 0);
    buffs.activate(PowerUpKind::TriggerRush, 0);
    assert_eq!(buffs.damage_multiplier(), 2.0);

    // DoubleDamage runs 10s, TriggerRush 8s
    buffs.tick(9_000);
    assert_eq!(buffs.damage_multiplier(), 2.0);
    assert_eq!(buffs.fire_rate_multiplier(), 1.0);

    buffs.tick(10_000);
    assert_eq!(buffs.damage_multiplier(), 1.0);
}

#[test]
fn test_snapshot_reflects_tier_and_decay() {
    let mut combo = tracker();
    for _ in 0..5 {
        combo.register_kill(2000);
    }

    let snap = combo.snapshot(4000);
    assert_eq!(snap.combo, 5);
    assert_eq!(snap.tier_name, Some("RAMPAGE!"));
    assert_eq!(snap.decay_remaining_ms, Some(3000));
    assert!((snap.damage_multiplier - 1.15).abs() < 1e-6);
}
