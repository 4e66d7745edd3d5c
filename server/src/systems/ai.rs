//! Spider behaviour: chase the nearest living player inside the aggro
//! radius, otherwise wander on a timer.

use crate::entity::Spider;
use crate::registry::Registry;
use crate::systems::movement::{integrate, velocity_for};
use rand::Rng;
use shared::math::distance_sq;
use shared::{
    SPIDER_AGGRO_RADIUS, SPIDER_SPEED, SPIDER_WANDER_MAX_TICKS, SPIDER_WANDER_MIN_TICKS,
    SPIDER_WANDER_MULTIPLIER,
};
use std::f32::consts::TAU;

/// What a spider decided to do this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Head straight for the point.
    Chase { x: f32, y: f32 },
    Wander,
}

/// Nearest target position and its squared distance. Ties go to whichever
/// candidate comes first.
pub fn nearest_target(spider: &Spider, targets: &[(f32, f32)]) -> Option<((f32, f32), f32)> {
    targets
        .iter()
        .map(|&(x, y)| ((x, y), distance_sq(spider.x, spider.y, x, y)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn decide(spider: &Spider, targets: &[(f32, f32)]) -> Intent {
    match nearest_target(spider, targets) {
        Some(((x, y), dist_sq)) if dist_sq <= SPIDER_AGGRO_RADIUS * SPIDER_AGGRO_RADIUS => {
            Intent::Chase { x, y }
        }
        _ => Intent::Wander,
    }
}

/// Counts down the wander timer, rolling a new heading and duration when
/// it runs out.
fn advance_wander<R: Rng + ?Sized>(spider: &mut Spider, rng: &mut R) {
    if spider.wander_ticks == 0 {
        spider.direction = rng.gen_range(0.0..TAU);
        spider.wander_ticks = rng.gen_range(SPIDER_WANDER_MIN_TICKS..=SPIDER_WANDER_MAX_TICKS);
    }
    spider.wander_ticks -= 1;
}

/// Decides and moves every spider for one tick.
pub fn step_spiders<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R, dt: f32) {
    let world = registry.world();
    let targets: Vec<(f32, f32)> = registry
        .players
        .values()
        .filter(|player| player.alive)
        .map(|player| (player.x, player.y))
        .collect();

    for spider in registry.spiders.values_mut() {
        let (vx, vy) = match decide(spider, &targets) {
            Intent::Chase { x, y } => velocity_for(x - spider.x, y - spider.y, SPIDER_SPEED),
            Intent::Wander => {
                advance_wander(spider, rng);
                velocity_for(
                    spider.direction.cos(),
                    spider.direction.sin(),
                    SPIDER_SPEED * SPIDER_WANDER_MULTIPLIER,
                )
            }
        };

        spider.vx = vx;
        spider.vy = vy;
        let (x, y) = integrate(&world, spider.x, spider.y, vx, vy, spider.r, dt);
        spider.x = x;
        spider.y = y;
    }
}
