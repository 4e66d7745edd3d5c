//! Per-tick simulation systems.
//!
//! Each system is a free function over `&mut Registry`. [`crate::game::GameState::step`]
//! runs them in a fixed order: timers, lifecycle, player movement, spider
//! behaviour, contact damage, leaf pickup.

pub mod ai;
pub mod combat;
pub mod lifecycle;
pub mod movement;
