//! Timers, death, respawn and leaf pickup.

use crate::entity::Player;
use crate::registry::{random_point, Registry};
use log::{debug, info};
use rand::Rng;
use shared::math::distance_sq;
use shared::{EntityId, RESPAWN_INVULN_TICKS, RESPAWN_TICKS, SPAWN_MARGIN};
use std::collections::HashSet;

/// Puts a player into the dead state and starts the respawn countdown.
pub fn kill_player(player: &mut Player) {
    player.alive = false;
    player.hp = 0;
    player.vx = 0.0;
    player.vy = 0.0;
    player.invuln_ticks = 0;
    player.attack_cooldown_ticks = 0;
    player.respawn_ticks = RESPAWN_TICKS;
    info!("Player {} died", player.id);
}

/// Brings a dead player back at a fresh spawn point with full health and a
/// short grace period.
pub fn respawn_player(player: &mut Player, x: f32, y: f32) {
    player.alive = true;
    player.hp = player.max_hp;
    player.x = x;
    player.y = y;
    player.vx = 0.0;
    player.vy = 0.0;
    player.respawn_ticks = 0;
    player.invuln_ticks = RESPAWN_INVULN_TICKS;
    info!("Player {} respawned at ({:.0}, {:.0})", player.id, x, y);
}

/// Counts down invulnerability and attack cooldown for living players.
pub fn tick_timers(registry: &mut Registry) {
    for player in registry.players.values_mut().filter(|p| p.alive) {
        player.invuln_ticks = player.invuln_ticks.saturating_sub(1);
        player.attack_cooldown_ticks = player.attack_cooldown_ticks.saturating_sub(1);
    }
}

/// Counts down dead players and respawns those whose timer ran out.
/// Returns the players that came back this tick.
pub fn step_respawns<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R) -> Vec<EntityId> {
    let world = registry.world();
    let mut respawned = Vec::new();

    for player in registry.players.values_mut().filter(|p| !p.alive) {
        player.respawn_ticks = player.respawn_ticks.saturating_sub(1);
        if player.respawn_ticks == 0 {
            let (x, y) = random_point(world, SPAWN_MARGIN, rng);
            respawn_player(player, x, y);
            respawned.push(player.id);
        }
    }

    respawned
}

/// Awards leaves to the living players touching them and replaces every
/// consumed leaf. A leaf is consumed at most once per tick, by whichever
/// overlapping player is visited first. Returns how many were collected.
pub fn collect_leaves<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R) -> usize {
    let mut consumed = HashSet::new();
    let mut awards: Vec<(EntityId, EntityId)> = Vec::new();

    for player in registry.players.values().filter(|p| p.alive) {
        for leaf in registry.leaves.values() {
            if consumed.contains(&leaf.id) {
                continue;
            }
            let reach = player.r + leaf.r;
            if distance_sq(player.x, player.y, leaf.x, leaf.y) < reach * reach {
                consumed.insert(leaf.id);
                awards.push((player.id, leaf.id));
            }
        }
    }

    for (player_id, leaf_id) in &awards {
        let Some(leaf) = registry.replace_leaf(leaf_id, rng) else {
            continue;
        };
        if let Some(player) = registry.player_mut(player_id) {
            player.gain_xp(leaf.kind.xp());
            debug!(
                "Player {} picked up {:?} leaf {} (xp {})",
                player_id, leaf.kind, leaf_id, player.xp
            );
        }
    }

    awards.len()
}
