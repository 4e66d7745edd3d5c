//! Command-line configuration.
//!
//! [`ServerConfig`] is what the operator types; [`SimConfig`] is the subset
//! the simulation needs, with rates already turned into a fixed step.

use crate::error::ServerError;
use clap::Parser;
use shared::{World, LEAF_COUNT, SNAPSHOT_HZ, SPIDER_COUNT, TICK_HZ};
use std::time::Duration;

/// Authoritative arena server
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about)]
pub struct ServerConfig {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    pub host: String,
    /// Server port to listen on (0 picks a free port)
    #[arg(short, long, default_value_t = 8081)]
    pub port: u16,
    /// Simulation ticks per second
    #[arg(short, long, default_value_t = TICK_HZ)]
    pub tick_rate: u32,
    /// Snapshots broadcast per second
    #[arg(short, long, default_value_t = SNAPSHOT_HZ)]
    pub snapshot_rate: u32,
    /// Maximum number of concurrent sessions
    #[arg(short, long, default_value_t = 64)]
    pub max_clients: usize,
    /// Number of spiders roaming the world
    #[arg(long, default_value_t = SPIDER_COUNT)]
    pub spiders: usize,
    /// Number of leaves kept on the ground
    #[arg(long, default_value_t = LEAF_COUNT)]
    pub leaves: usize,
    /// Seed for the simulation RNG; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8081,
            tick_rate: TICK_HZ,
            snapshot_rate: SNAPSHOT_HZ,
            max_clients: 64,
            spiders: SPIDER_COUNT,
            leaves: LEAF_COUNT,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.host.trim().is_empty() {
            return Err(ServerError::Config("host must not be empty".to_string()));
        }
        if self.tick_rate == 0 || self.tick_rate > 1000 {
            return Err(ServerError::Config(format!(
                "tick rate must be within 1..=1000, got {}",
                self.tick_rate
            )));
        }
        if self.snapshot_rate == 0 || self.snapshot_rate > self.tick_rate {
            return Err(ServerError::Config(format!(
                "snapshot rate must be within 1..={}, got {}",
                self.tick_rate, self.snapshot_rate
            )));
        }
        if self.max_clients == 0 {
            return Err(ServerError::Config(
                "max clients must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate.max(1)))
    }

    pub fn snapshot_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.snapshot_rate.max(1)))
    }

    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            spider_count: self.spiders,
            leaf_count: self.leaves,
            dt: 1.0 / self.tick_rate.max(1) as f32,
            seed: self.seed,
            ..SimConfig::default()
        }
    }
}

/// Parameters of one simulation instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    pub world: World,
    pub spider_count: usize,
    pub leaf_count: usize,
    /// Fixed step in seconds. Every tick advances by exactly this much.
    pub dt: f32,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world: World::default(),
            spider_count: SPIDER_COUNT,
            leaf_count: LEAF_COUNT,
            dt: shared::DT,
            seed: None,
        }
    }
}
