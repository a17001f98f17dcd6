//! Railstorm - Headless Demo
//!
//! Runs a scripted firefight against a fake clock: a corridor of grunts and
//! a bomber, a laser grid and an explosive barrel, a couple of power-up
//! pickups. Prints the resulting event log as JSON so the pipeline can be
//! inspected without a renderer.

use ahash::AHashMap;
use glam::Vec3;

use railstorm::core::config::CombatConfig;
use railstorm::core::error::Result;
use railstorm::core::types::TargetId;
use railstorm::director::CombatDirector;
use railstorm::events::CombatEvent;
use railstorm::hazard::{HazardKind, HazardOverrides};
use railstorm::powerup::PowerUpKind;
use railstorm::weakpoint::EnemyArchetype;
use railstorm::weapon::{DamageSink, FireRequest, ResolvedHit, WeaponKind};

/// Minimal enemy registry standing in for the host's scene
struct Gallery {
    enemies: AHashMap<TargetId, Enemy>,
}

struct Enemy {
    archetype: EnemyArchetype,
    position: Vec3,
    facing: Vec3,
    health: f32,
}

impl Gallery {
    fn hit(&self, id: u64, aim_height: f32) -> Option<ResolvedHit> {
        let target = TargetId(id);
        let enemy = self.enemies.get(&target)?;
        if enemy.health <= 0.0 {
            return None;
        }
        Some(ResolvedHit {
            target,
            archetype: enemy.archetype,
            hit_point: enemy.position + Vec3::new(0.0, aim_height, 0.0),
            target_position: enemy.position,
            target_facing: enemy.facing,
            boss_phase: None,
            target_health: enemy.health,
        })
    }
}

impl DamageSink for Gallery {
    fn apply(&mut self, target: TargetId, amount: u32) -> bool {
        let Some(enemy) = self.enemies.get_mut(&target) else {
            return false;
        };
        if enemy.health <= 0.0 {
            return false;
        }
        enemy.health -= amount as f32;
        enemy.health <= 0.0
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "railstorm=debug".to_string()),
        )
        .init();

    tracing::info!("railstorm demo starting");

    let mut director = CombatDirector::with_rng_seed(CombatConfig::default(), 0xDEAD)?;
    let mut gallery = Gallery {
        enemies: AHashMap::from_iter([
            (
                TargetId(1),
                Enemy {
                    archetype: EnemyArchetype::Grunt,
                    position: Vec3::new(0.0, 0.0, 12.0),
                    facing: Vec3::NEG_Z,
                    health: 60.0,
                },
            ),
            (
                TargetId(2),
                Enemy {
                    archetype: EnemyArchetype::Grunt,
                    position: Vec3::new(2.0, 0.0, 14.0),
                    facing: Vec3::NEG_Z,
                    health: 60.0,
                },
            ),
            (
                TargetId(3),
                Enemy {
                    archetype: EnemyArchetype::Bomber,
                    position: Vec3::new(-2.0, 0.0, 18.0),
                    // Facing away: its fuel tank is exposed
                    facing: Vec3::Z,
                    health: 120.0,
                },
            ),
        ]),
    };

    let mut log: Vec<CombatEvent> = Vec::new();
    let player = Vec3::new(0.0, 1.6, 0.0);

    // Room load: a laser grid across the rail and a barrel by the bomber
    let laser = director.spawn_hazard(HazardKind::LaserGrid, Vec3::new(0.0, 1.0, 6.0), &HazardOverrides::default(), 0)?;
    let barrel =
        director.spawn_hazard(HazardKind::ExplosiveBarrel, Vec3::new(-2.5, 0.0, 17.0), &HazardOverrides::default(), 0)?;

    // Two pistol headshots drop the first grunt
    for (t, id) in [(500u64, 1u64), (1100, 1)] {
        let hit = gallery.hit(id, 1.7);
        let request = FireRequest { origin: player, hit: hit.as_ref(), ..Default::default() };
        let report = director.fire(&request, &mut gallery, t);
        tracing::debug!(?report, t, "pistol shot");
        director.tick(t, player);
        log.extend(director.drain_events());
    }

    // Double damage pickup, then a charged shot finishes the second grunt
    director.activate_powerup(PowerUpKind::DoubleDamage, 1500);
    director.set_alt_fire(true, 1500);
    let hit = gallery.hit(2, 1.0);
    let request = FireRequest { origin: player, hit: hit.as_ref(), ..Default::default() };
    director.fire(&request, &mut gallery, 3600);
    director.set_alt_fire(false, 3600);
    director.tick(3600, player);
    log.extend(director.drain_events());

    // Shotgun volley into the bomber's exposed tank
    director.switch_weapon(WeaponKind::Shotgun);
    let aim = (gallery.enemies[&TargetId(3)].position - player).normalize();
    let pellet_count = director.pellet_directions(aim).len();
    let pellets: Vec<ResolvedHit> = (0..pellet_count).filter_map(|_| gallery.hit(3, 1.2)).collect();
    let request = FireRequest { origin: player, pellet_hits: &pellets, ..Default::default() };
    let report = director.fire(&request, &mut gallery, 4200);
    tracing::info!(?report, "shotgun volley");
    director.tick(4200, player);
    log.extend(director.drain_events());

    // Pop the barrel for good measure
    director.damage_hazard(barrel, 40, 4400);

    // Walk into the laser grid and watch the duty cycle bite
    for t in (4500..9000).step_by(250) {
        let standing_in_laser = Vec3::new(0.0, 1.0, 6.0);
        director.tick(t, standing_in_laser);
        for event in director.drain_events() {
            if matches!(event, CombatEvent::HazardDamage { .. }) && !director.on_player_damaged(t) {
                tracing::debug!(t, "player hit, combo broken");
            }
            log.push(event);
        }
    }
    director.remove_hazard(laser, 9000);
    log.extend(director.drain_events());

    let snapshot = director.combo_snapshot(9000);
    tracing::info!(
        combo = snapshot.combo,
        max_combo = snapshot.max_combo,
        "firefight over"
    );

    println!("{}", serde_json::to_string_pretty(&log)?);
    Ok(())
}
