//! Melee cone attacks and spider contact damage.
//!
//! Players only ever hit spiders and spiders only ever hit players.

use crate::registry::{random_point, Registry};
use crate::systems::lifecycle::kill_player;
use log::debug;
use rand::Rng;
use shared::math::{distance_sq, normalize, wrap_angle};
use shared::{
    EntityId, ATTACK_ARC, ATTACK_COOLDOWN_TICKS, ATTACK_RANGE, CONTACT_BUFFER, HIT_INVULN_TICKS,
    KNOCKBACK_DISTANCE, SPAWN_MARGIN, SPIDER_CONTACT_DAMAGE, SPIDER_KILL_XP,
};

/// Spiders touched by an accepted attack.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttackOutcome {
    pub hits: Vec<EntityId>,
    /// Spiders that dropped to zero and were relocated.
    pub kills: Vec<EntityId>,
}

/// Whether a target circle lies inside the attacker's reach and cone.
pub fn in_attack_cone(
    attacker: (f32, f32),
    facing: f32,
    target: (f32, f32),
    target_radius: f32,
) -> bool {
    let reach = ATTACK_RANGE + target_radius;
    if distance_sq(attacker.0, attacker.1, target.0, target.1) > reach * reach {
        return false;
    }

    let angle = (target.1 - attacker.1).atan2(target.0 - attacker.0);
    let offset = wrap_angle(angle - facing);
    offset.abs() <= ATTACK_ARC / 2.0
}

/// Damage a spider deals on contact after flat defense, never below 1.
pub fn contact_damage(defense: u32) -> u32 {
    SPIDER_CONTACT_DAMAGE.saturating_sub(defense).max(1)
}

/// Resolves a melee swing by `attacker`.
///
/// Returns `None` without touching any state when the attacker is unknown,
/// dead or still cooling down.
pub fn resolve_attack<R: Rng + ?Sized>(
    registry: &mut Registry,
    attacker: &EntityId,
    rng: &mut R,
) -> Option<AttackOutcome> {
    let world = registry.world();
    let player = registry.players.get_mut(attacker)?;
    if !player.can_attack() {
        return None;
    }
    player.attack_cooldown_ticks = ATTACK_COOLDOWN_TICKS;

    let mut outcome = AttackOutcome::default();
    for spider in registry.spiders.values_mut() {
        if !in_attack_cone((player.x, player.y), player.facing, (spider.x, spider.y), spider.r) {
            continue;
        }

        spider.hp = spider.hp.saturating_sub(player.damage);
        outcome.hits.push(spider.id);

        if spider.hp == 0 {
            let (x, y) = random_point(world, SPAWN_MARGIN, rng);
            spider.respawn_at(x, y);
            player.gain_xp(SPIDER_KILL_XP);
            outcome.kills.push(spider.id);
            debug!(
                "Player {} killed spider {} (xp {}, level {})",
                player.id,
                spider.id,
                player.xp,
                player.level()
            );
        }
    }

    Some(outcome)
}

/// Applies spider contact damage to every overlapping, vulnerable player.
/// Returns the players killed this tick.
pub fn apply_contact_damage(registry: &mut Registry) -> Vec<EntityId> {
    let world = registry.world();
    let mut killed = Vec::new();

    for spider in registry.spiders.values() {
        for player in registry.players.values_mut() {
            if !player.alive || player.is_invulnerable() {
                continue;
            }

            let reach = spider.r + player.r + CONTACT_BUFFER;
            if distance_sq(spider.x, spider.y, player.x, player.y) >= reach * reach {
                continue;
            }

            player.hp = player.hp.saturating_sub(contact_damage(player.defense));
            player.invuln_ticks = HIT_INVULN_TICKS;

            if player.hp == 0 {
                kill_player(player);
                killed.push(player.id);
                continue;
            }

            let (nx, ny) = normalize(player.x - spider.x, player.y - spider.y);
            let (x, y) = world.clamp_circle(
                player.x + nx * KNOCKBACK_DISTANCE,
                player.y + ny * KNOCKBACK_DISTANCE,
                player.r,
            );
            player.x = x;
            player.y = y;
        }
    }

    killed
}
