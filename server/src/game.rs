//! The simulation context.
//!
//! [`GameState`] owns the registry, the RNG and the queue of commands that
//! arrived since the last tick. Nothing outside the simulation task holds a
//! reference to it.

use crate::config::SimConfig;
use crate::registry::Registry;
use crate::systems::{ai, combat, lifecycle, movement};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Command, EntityId, LeafSnapshot, PlayerSnapshot, Snapshot, SpiderSnapshot, World};
use std::collections::VecDeque;

pub struct GameState {
    pub tick: u64,
    registry: Registry,
    config: SimConfig,
    rng: StdRng,
    pending: VecDeque<Command>,
}

impl GameState {
    /// Creates a populated world. A seeded config always produces the same
    /// world and, given the same commands, the same ticks.
    pub fn new(config: SimConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut registry = Registry::new(config.world);
        registry.populate(config.spider_count, config.leaf_count, &mut rng);

        Self {
            tick: 0,
            registry,
            config,
            rng,
            pending: VecDeque::new(),
        }
    }

    pub fn world(&self) -> World {
        self.config.world
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn player_count(&self) -> usize {
        self.registry.players.len()
    }

    pub fn spider_count(&self) -> usize {
        self.registry.spiders.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.registry.leaves.len()
    }

    /// Spawns a player for a new session. Takes effect immediately rather
    /// than at the next tick so the welcome message can carry the id.
    pub fn add_player(&mut self) -> EntityId {
        self.registry.add_player(&mut self.rng)
    }

    pub fn remove_player(&mut self, id: &EntityId) -> bool {
        self.registry.remove_player(id).is_some()
    }

    /// Queues a command for the start of the next tick.
    pub fn queue_command(&mut self, command: Command) {
        self.pending.push_back(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.pending.len()
    }

    /// Applies one command right away. Commands for unknown players are
    /// ignored.
    pub fn apply_command(&mut self, command: Command) {
        let id = command.entity_id();
        if self.registry.player(&id).is_none() {
            debug!("Ignoring command for unknown player {}", id);
            return;
        }

        match command {
            Command::Input { id, input } => {
                if let Some(player) = self.registry.player_mut(&id) {
                    if let Some(facing) = input.facing {
                        player.facing = facing;
                    }
                    player.input = input;
                }
            }
            Command::Join { id, name, class } => {
                let world = self.config.world;
                if let Some(player) = self.registry.player_mut(&id) {
                    if name.is_some() {
                        player.name = name;
                    }
                    if let Some(class) = class {
                        if player.apply_class(class) {
                            let (x, y) = world.clamp_circle(player.x, player.y, player.r);
                            player.x = x;
                            player.y = y;
                        } else {
                            debug!(
                                "Player {} already plays {:?}, ignoring switch to {:?}",
                                id, player.class, class
                            );
                        }
                    }
                    debug!(
                        "Player {} joined as {:?} ({:?})",
                        id, player.name, player.class
                    );
                }
            }
            Command::Attack { id } => {
                if let Some(outcome) =
                    combat::resolve_attack(&mut self.registry, &id, &mut self.rng)
                {
                    if !outcome.hits.is_empty() {
                        debug!(
                            "Player {} hit {} spiders, killed {}",
                            id,
                            outcome.hits.len(),
                            outcome.kills.len()
                        );
                    }
                }
            }
        }
    }

    /// Advances the simulation by one fixed step.
    pub fn step(&mut self) {
        while let Some(command) = self.pending.pop_front() {
            self.apply_command(command);
        }

        let dt = self.config.dt;
        lifecycle::tick_timers(&mut self.registry);
        lifecycle::step_respawns(&mut self.registry, &mut self.rng);
        movement::step_players(&mut self.registry, dt);
        ai::step_spiders(&mut self.registry, &mut self.rng, dt);
        combat::apply_contact_damage(&mut self.registry);
        lifecycle::collect_leaves(&mut self.registry, &mut self.rng);

        self.tick += 1;
    }

    /// Full world state. Entities are listed in id order.
    pub fn snapshot(&self, t: u64) -> Snapshot {
        let players: Vec<PlayerSnapshot> =
            self.registry.players.values().map(|p| p.snapshot()).collect();
        let spiders: Vec<SpiderSnapshot> =
            self.registry.spiders.values().map(|s| s.snapshot()).collect();
        let leaves: Vec<LeafSnapshot> =
            self.registry.leaves.values().map(|l| l.snapshot()).collect();

        Snapshot {
            t,
            tick: self.tick,
            players,
            spiders,
            leaves,
        }
    }
}
