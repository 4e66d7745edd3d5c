//! Closed tables of player classes and leaf kinds.

use serde::{Deserialize, Serialize};

/// Combat and size stats a player carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassStats {
    pub max_hp: u32,
    pub defense: u32,
    pub damage: u32,
    pub radius: f32,
}

/// Stats of a player who has not picked a class yet.
pub const DEFAULT_STATS: ClassStats = ClassStats {
    max_hp: 100,
    defense: 0,
    damage: 25,
    radius: 18.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerClass {
    Beetle,
    Ant,
    Mantis,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 3] = [PlayerClass::Beetle, PlayerClass::Ant, PlayerClass::Mantis];

    pub fn key(self) -> &'static str {
        match self {
            PlayerClass::Beetle => "beetle",
            PlayerClass::Ant => "ant",
            PlayerClass::Mantis => "mantis",
        }
    }

    /// Looks up a class by its exact wire key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.key() == key)
    }

    pub const fn stats(self) -> ClassStats {
        match self {
            // Slow to kill, weak swing.
            PlayerClass::Beetle => ClassStats {
                max_hp: 160,
                defense: 4,
                damage: 20,
                radius: 22.0,
            },
            PlayerClass::Ant => ClassStats {
                max_hp: 110,
                defense: 2,
                damage: 25,
                radius: 16.0,
            },
            // Glass cannon.
            PlayerClass::Mantis => ClassStats {
                max_hp: 90,
                defense: 0,
                damage: 40,
                radius: 17.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafKind {
    Common,
    Uncommon,
    Rare,
}

impl LeafKind {
    pub const ALL: [LeafKind; 3] = [LeafKind::Common, LeafKind::Uncommon, LeafKind::Rare];

    pub const fn xp(self) -> u32 {
        match self {
            LeafKind::Common => 1,
            LeafKind::Uncommon => 3,
            LeafKind::Rare => 8,
        }
    }

    /// Relative spawn frequency.
    pub const fn weight(self) -> u32 {
        match self {
            LeafKind::Common => 70,
            LeafKind::Uncommon => 25,
            LeafKind::Rare => 5,
        }
    }

    /// Maps a roll in `0..LeafKind::total_weight()` onto a kind.
    pub fn from_roll(roll: u32) -> Self {
        let mut remaining = roll;
        for kind in Self::ALL {
            if remaining < kind.weight() {
                return kind;
            }
            remaining -= kind.weight();
        }
        LeafKind::Common
    }

    pub fn total_weight() -> u32 {
        Self::ALL.iter().map(|kind| kind.weight()).sum()
    }
}
