//! Turns intent into velocity and position, keeping every circle inside the
//! world.

use crate::registry::Registry;
use shared::math::normalize;
use shared::{World, PLAYER_SPEED};

/// Advances a circle by one step of velocity and clamps it to the world.
pub fn integrate(world: &World, x: f32, y: f32, vx: f32, vy: f32, r: f32, dt: f32) -> (f32, f32) {
    world.clamp_circle(x + vx * dt, y + vy * dt, r)
}

/// Velocity for a raw intent vector: normalised, then scaled to `speed`.
pub fn velocity_for(dx: f32, dy: f32, speed: f32) -> (f32, f32) {
    let (nx, ny) = normalize(dx, dy);
    (nx * speed, ny * speed)
}

/// Moves every living player according to their last input.
///
/// Dead players are left untouched so they do not drift while waiting to
/// respawn. Without an explicit aim, a moving player faces where it goes.
pub fn step_players(registry: &mut Registry, dt: f32) {
    let world = registry.world();

    for player in registry.players.values_mut() {
        if !player.alive {
            continue;
        }

        let (dx, dy) = player.input.direction();
        let (vx, vy) = velocity_for(dx, dy, PLAYER_SPEED);
        player.vx = vx;
        player.vy = vy;

        match player.input.facing {
            Some(facing) => player.facing = facing,
            None if vx != 0.0 || vy != 0.0 => player.facing = vy.atan2(vx),
            None => {}
        }

        let (x, y) = integrate(&world, player.x, player.y, vx, vy, player.r, dt);
        player.x = x;
        player.y = y;
    }
}
