//! Entity registry: the single owner of every player, spider and leaf.
//!
//! Systems borrow the registry for the duration of one call and never keep
//! references across ticks. Sessions refer to players by [`EntityId`] only.
//! Collections are ordered by id so a seeded simulation replays identically.

use crate::entity::{Leaf, Player, Spider};
use log::{debug, info};
use rand::Rng;
use shared::{EntityId, LeafKind, World, LEAF_SPAWN_MARGIN, PLAYER_COLORS, SPAWN_MARGIN};
use std::collections::BTreeMap;

/// Uniform random point keeping `margin` from every edge of `world`.
///
/// The margin shrinks to half the world size for worlds too small to
/// honour it, so the range is never empty.
pub fn random_point<R: Rng + ?Sized>(world: World, margin: f32, rng: &mut R) -> (f32, f32) {
    let margin_x = margin.min(world.w / 2.0);
    let margin_y = margin.min(world.h / 2.0);
    (
        rng.gen_range(margin_x..=world.w - margin_x),
        rng.gen_range(margin_y..=world.h - margin_y),
    )
}

#[derive(Debug, Clone)]
pub struct Registry {
    world: World,
    next_id: u32,
    pub players: BTreeMap<EntityId, Player>,
    pub spiders: BTreeMap<EntityId, Spider>,
    pub leaves: BTreeMap<EntityId, Leaf>,
}

impl Registry {
    pub fn new(world: World) -> Self {
        Self {
            world,
            next_id: 1,
            players: BTreeMap::new(),
            spiders: BTreeMap::new(),
            leaves: BTreeMap::new(),
        }
    }

    pub fn world(&self) -> World {
        self.world
    }

    /// Allocates an id that has never been handed out by this registry.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fills the world with its fixed NPC and collectible populations.
    pub fn populate<R: Rng + ?Sized>(&mut self, spiders: usize, leaves: usize, rng: &mut R) {
        for _ in 0..spiders {
            self.add_spider(rng);
        }
        for _ in 0..leaves {
            self.add_leaf(rng);
        }
        info!(
            "Populated world {}x{} with {} spiders and {} leaves",
            self.world.w, self.world.h, spiders, leaves
        );
    }

    pub fn add_player<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EntityId {
        let id = self.next_id();
        let (x, y) = random_point(self.world, SPAWN_MARGIN, rng);
        let color = PLAYER_COLORS[rng.gen_range(0..PLAYER_COLORS.len())];

        info!("Added player {} at ({:.0}, {:.0})", id, x, y);
        self.players.insert(id, Player::new(id, x, y, color));
        id
    }

    pub fn remove_player(&mut self, id: &EntityId) -> Option<Player> {
        let removed = self.players.remove(id);
        if removed.is_some() {
            info!("Removed player {}", id);
        }
        removed
    }

    pub fn add_spider<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EntityId {
        let id = self.next_id();
        let (x, y) = random_point(self.world, SPAWN_MARGIN, rng);
        self.spiders.insert(id, Spider::new(id, x, y));
        id
    }

    pub fn add_leaf<R: Rng + ?Sized>(&mut self, rng: &mut R) -> EntityId {
        let id = self.next_id();
        let (x, y) = random_point(self.world, LEAF_SPAWN_MARGIN, rng);
        let kind = LeafKind::from_roll(rng.gen_range(0..LeafKind::total_weight()));
        self.leaves.insert(id, Leaf::new(id, x, y, kind));
        id
    }

    /// Removes a leaf and immediately inserts its replacement, so the leaf
    /// population never changes size. Returns the consumed leaf.
    pub fn replace_leaf<R: Rng + ?Sized>(&mut self, id: &EntityId, rng: &mut R) -> Option<Leaf> {
        let consumed = self.leaves.remove(id)?;
        let replacement = self.add_leaf(rng);
        debug!("Leaf {} consumed, replaced by {}", id, replacement);
        Some(consumed)
    }

    pub fn player(&self, id: &EntityId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &EntityId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_registry() -> Registry {
        Registry::new(World::new(1000.0, 800.0))
    }

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let mut registry = test_registry();
        let mut rng = StdRng::seed_from_u64(1);

        let player = registry.add_player(&mut rng);
        let spider = registry.add_spider(&mut rng);
        let leaf = registry.add_leaf(&mut rng);

        assert_eq!(player, EntityId(1));
        assert_eq!(spider, EntityId(2));
        assert_eq!(leaf, EntityId(3));
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut registry = test_registry();
        let mut rng = StdRng::seed_from_u64(2);

        let first = registry.add_player(&mut rng);
        assert!(registry.remove_player(&first).is_some());
        let second = registry.add_player(&mut rng);
        assert_ne!(first, second);
    }

    #[test]
    fn test_remove_nonexistent_player() {
        let mut registry = test_registry();
        assert!(registry.remove_player(&EntityId(99)).is_none());
    }

    #[test]
    fn test_players_spawn_inside_margin() {
        let mut registry = test_registry();
        let mut rng = StdRng::seed_from_u64(3);
        let world = registry.world();

        for _ in 0..200 {
            let id = registry.add_player(&mut rng);
            let player = registry.player(&id).unwrap();
            assert!(world.within_margin(player.x, player.y, SPAWN_MARGIN));
            assert!(PLAYER_COLORS.contains(&player.color));
        }
    }

    #[test]
    fn test_populate_counts() {
        let mut registry = test_registry();
        let mut rng = StdRng::seed_from_u64(4);
        registry.populate(10, 80, &mut rng);

        assert_eq!(registry.spiders.len(), 10);
        assert_eq!(registry.leaves.len(), 80);
        assert!(registry.players.is_empty());
    }

    #[test]
    fn test_replace_leaf_keeps_population() {
        let mut registry = test_registry();
        let mut rng = StdRng::seed_from_u64(5);
        registry.populate(0, 5, &mut rng);

        let target = *registry.leaves.keys().next().unwrap();
        let consumed = registry.replace_leaf(&target, &mut rng).unwrap();

        assert_eq!(consumed.id, target);
        assert_eq!(registry.leaves.len(), 5);
        assert!(!registry.leaves.contains_key(&target));
        assert!(registry.replace_leaf(&target, &mut rng).is_none());
        assert_eq!(registry.leaves.len(), 5);
    }

    #[test]
    fn test_random_point_in_tiny_world() {
        let mut rng = StdRng::seed_from_u64(6);
        let world = World::new(100.0, 50.0);

        for _ in 0..50 {
            let (x, y) = random_point(world, SPAWN_MARGIN, &mut rng);
            assert_eq!(x, 50.0);
            assert_eq!(y, 25.0);
        }
    }
}
