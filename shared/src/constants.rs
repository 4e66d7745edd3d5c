//! Gameplay tuning shared by the server and any client that predicts or
//! renders server state. Durations are expressed in simulation ticks.

use std::f32::consts::PI;

pub const TICK_HZ: u32 = 30;
pub const SNAPSHOT_HZ: u32 = 15;
pub const DT: f32 = 1.0 / TICK_HZ as f32;

pub const WORLD_WIDTH: f32 = 4000.0;
pub const WORLD_HEIGHT: f32 = 4000.0;
/// Distance from every world edge that spawn positions keep clear of.
pub const SPAWN_MARGIN: f32 = 200.0;

pub const PLAYER_SPEED: f32 = 300.0;
pub const MAX_NAME_LEN: usize = 16;
pub const PLAYER_COLORS: [&str; 4] = ["#6cc644", "#ff6b6b", "#ffd93d", "#4dabf7"];

pub const SPIDER_COUNT: usize = 10;
pub const SPIDER_RADIUS: f32 = 22.0;
pub const SPIDER_MAX_HP: u32 = 100;
pub const SPIDER_SPEED: f32 = 220.0;
pub const SPIDER_WANDER_MULTIPLIER: f32 = 0.4;
pub const SPIDER_AGGRO_RADIUS: f32 = 450.0;
pub const SPIDER_WANDER_MIN_TICKS: u32 = 30;
pub const SPIDER_WANDER_MAX_TICKS: u32 = 90;
pub const SPIDER_CONTACT_DAMAGE: u32 = 25;
pub const SPIDER_COLOR: &str = "#2b2b2b";
/// Extra slack added to the radius sum when testing spider/player contact.
pub const CONTACT_BUFFER: f32 = 2.0;

pub const HIT_INVULN_TICKS: u32 = 30;
pub const RESPAWN_INVULN_TICKS: u32 = 20;
pub const RESPAWN_TICKS: u32 = 90;
pub const KNOCKBACK_DISTANCE: f32 = 40.0;

pub const ATTACK_COOLDOWN_TICKS: u32 = 15;
/// Reach of a melee swing measured from the attacker's centre to the
/// target's edge, so the target radius is added on top.
pub const ATTACK_RANGE: f32 = 60.0;
/// Full width of the melee cone in radians.
pub const ATTACK_ARC: f32 = PI * 2.0 / 3.0;
pub const SPIDER_KILL_XP: u32 = 25;

pub const LEAF_COUNT: usize = 80;
pub const LEAF_RADIUS: f32 = 10.0;
pub const LEAF_SPAWN_MARGIN: f32 = 50.0;

/// Scale of the logarithmic level curve. Clients drawing level progress
/// must use the same value.
pub const LEVEL_SCALE: f64 = 0.9;
