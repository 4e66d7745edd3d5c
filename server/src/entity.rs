//! Server-side entity state for players, spiders and leaves.

use shared::{
    level_for_xp, ClassStats, EntityId, InputState, LeafKind, LeafSnapshot, PlayerClass,
    PlayerSnapshot, SpiderSnapshot, DEFAULT_STATS, LEAF_RADIUS, SPIDER_COLOR, SPIDER_MAX_HP,
    SPIDER_RADIUS,
};

/// A connected player.
///
/// `hp` always stays within `0..=max_hp`, a dead player never carries
/// velocity, and `level` is only ever written from `xp`.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    pub name: Option<String>,
    pub class: Option<PlayerClass>,
    pub color: &'static str,

    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    /// Aim direction in radians, used by the melee cone.
    pub facing: f32,

    pub hp: u32,
    pub max_hp: u32,
    pub alive: bool,
    pub invuln_ticks: u32,
    pub attack_cooldown_ticks: u32,
    pub defense: u32,
    pub damage: u32,
    pub respawn_ticks: u32,

    pub xp: u32,
    level: u32,

    pub input: InputState,
}

impl Player {
    /// Creates a player with unselected-class stats at the given position.
    pub fn new(id: EntityId, x: f32, y: f32, color: &'static str) -> Self {
        Self {
            id,
            name: None,
            class: None,
            color,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            r: DEFAULT_STATS.radius,
            facing: 0.0,
            hp: DEFAULT_STATS.max_hp,
            max_hp: DEFAULT_STATS.max_hp,
            alive: true,
            invuln_ticks: 0,
            attack_cooldown_ticks: 0,
            defense: DEFAULT_STATS.defense,
            damage: DEFAULT_STATS.damage,
            respawn_ticks: 0,
            xp: 0,
            level: 1,
            input: InputState::default(),
        }
    }

    fn apply_stats(&mut self, stats: ClassStats) {
        self.max_hp = stats.max_hp;
        self.defense = stats.defense;
        self.damage = stats.damage;
        self.r = stats.radius;
        self.hp = self.hp.min(self.max_hp);
    }

    /// Locks in `class` and applies its stat table entry.
    ///
    /// Only the first valid pick takes effect. Repeating the same class
    /// re-applies the table and any other class is refused. A player at full
    /// health stays at full health; a damaged one is never healed.
    pub fn apply_class(&mut self, class: PlayerClass) -> bool {
        if matches!(self.class, Some(current) if current != class) {
            return false;
        }
        let at_full_hp = self.alive && self.hp == self.max_hp;
        self.class = Some(class);
        self.apply_stats(class.stats());
        if at_full_hp {
            self.hp = self.max_hp;
        }
        true
    }

    pub fn gain_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
        self.level = level_for_xp(self.xp);
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_ticks > 0
    }

    pub fn can_attack(&self) -> bool {
        self.alive && self.attack_cooldown_ticks == 0
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            r: self.r,
            color: self.color.to_string(),
            hp: self.hp,
            max_hp: self.max_hp,
            alive: self.alive,
            respawn_timer: self.respawn_ticks,
            invuln_timer: self.invuln_ticks,
            attack_cooldown: self.attack_cooldown_ticks,
            defense: self.defense,
            damage: self.damage,
            name: self.name.clone(),
            cls: self.class,
            xp: self.xp,
            level: self.level,
            facing: self.facing,
        }
    }
}

/// Roaming enemy. Spiders never leave the registry; a killed spider is
/// relocated and healed instead.
#[derive(Debug, Clone)]
pub struct Spider {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub hp: u32,
    pub max_hp: u32,
    /// Heading while wandering, radians.
    pub direction: f32,
    /// Ticks until a new wander heading is picked.
    pub wander_ticks: u32,
}

impl Spider {
    pub fn new(id: EntityId, x: f32, y: f32) -> Self {
        Self {
            id,
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            r: SPIDER_RADIUS,
            hp: SPIDER_MAX_HP,
            max_hp: SPIDER_MAX_HP,
            direction: 0.0,
            wander_ticks: 0,
        }
    }

    /// Moves the spider to `(x, y)` at full health with a fresh wander cycle.
    pub fn respawn_at(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
        self.hp = self.max_hp;
        self.wander_ticks = 0;
    }

    pub fn snapshot(&self) -> SpiderSnapshot {
        SpiderSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            vx: self.vx,
            vy: self.vy,
            r: self.r,
            color: SPIDER_COLOR.to_string(),
            hp: self.hp,
            max_hp: self.max_hp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Leaf {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub kind: LeafKind,
}

impl Leaf {
    pub fn new(id: EntityId, x: f32, y: f32, kind: LeafKind) -> Self {
        Self {
            id,
            x,
            y,
            r: LEAF_RADIUS,
            kind,
        }
    }

    pub fn snapshot(&self) -> LeafSnapshot {
        LeafSnapshot {
            id: self.id,
            x: self.x,
            y: self.y,
            r: self.r,
            kind: self.kind,
            xp: self.kind.xp(),
        }
    }
}
