//! JSON wire protocol.
//!
//! Every message is a JSON object discriminated by its `"type"` field.
//! Inbound text is decoded in two stages: serde parses the loose wire shape,
//! then [`Command::decode`] validates it into a strongly typed command.
//! Unknown fields are ignored at both stages.

use crate::catalog::{LeafKind, PlayerClass};
use crate::constants::MAX_NAME_LEN;
use crate::World;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid entity id {0:?}")]
    InvalidId(String),
    #[error("failed to encode message: {0}")]
    Encode(serde_json::Error),
}

/// Identifier shared by every entity kind. Sent as a JSON string; a JSON
/// number is accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "WireId")]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u32),
}

impl TryFrom<WireId> for EntityId {
    type Error = ProtocolError;

    fn try_from(raw: WireId) -> Result<Self, Self::Error> {
        match raw {
            WireId::Number(id) => Ok(EntityId(id)),
            WireId::Text(text) => text
                .trim()
                .parse()
                .map(EntityId)
                .map_err(|_| ProtocolError::InvalidId(text)),
        }
    }
}

/// Directional intent last reported by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Aim direction in radians, only ever finite.
    pub facing: Option<f32>,
}

impl InputState {
    /// Un-normalised direction implied by the pressed keys. Screen
    /// coordinates: `up` is negative y.
    pub fn direction(&self) -> (f32, f32) {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.up {
            dy -= 1.0;
        }
        if self.down {
            dy += 1.0;
        }
        if self.left {
            dx -= 1.0;
        }
        if self.right {
            dx += 1.0;
        }
        (dx, dy)
    }
}

/// Validated client request, ready to be queued for the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Input {
        id: EntityId,
        input: InputState,
    },
    Join {
        id: EntityId,
        name: Option<String>,
        /// `None` when the requested class key is unknown.
        class: Option<PlayerClass>,
    },
    Attack {
        id: EntityId,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireClientMessage {
    Input {
        id: EntityId,
        #[serde(default)]
        input: Value,
        #[serde(default)]
        facing: Value,
    },
    Join {
        id: EntityId,
        #[serde(default)]
        username: Value,
        #[serde(default)]
        cls: Value,
    },
    Attack {
        id: EntityId,
    },
}

fn flag(input: &Value, key: &str) -> bool {
    input.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn finite_angle(value: Option<&Value>) -> Option<f32> {
    value
        .and_then(Value::as_f64)
        .map(|angle| angle as f32)
        .filter(|angle| angle.is_finite())
}

/// Trims and truncates a display name to `MAX_NAME_LEN` characters.
pub fn sanitize_name(raw: &str) -> Option<String> {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

impl Command {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let wire: WireClientMessage = serde_json::from_str(text)?;
        Ok(match wire {
            WireClientMessage::Input { id, input, facing } => Command::Input {
                id,
                input: InputState {
                    up: flag(&input, "up"),
                    down: flag(&input, "down"),
                    left: flag(&input, "left"),
                    right: flag(&input, "right"),
                    facing: finite_angle(Some(&facing)).or_else(|| finite_angle(input.get("facing"))),
                },
            },
            WireClientMessage::Join { id, username, cls } => Command::Join {
                id,
                name: username.as_str().and_then(sanitize_name),
                class: cls.as_str().and_then(PlayerClass::from_key),
            },
            WireClientMessage::Attack { id } => Command::Attack { id },
        })
    }

    /// Wire form of the command, as a client would send it.
    pub fn encode(&self) -> String {
        let value = match self {
            Command::Input { id, input } => {
                let mut message = serde_json::json!({
                    "type": "input",
                    "id": String::from(*id),
                    "input": {
                        "up": input.up,
                        "down": input.down,
                        "left": input.left,
                        "right": input.right,
                    },
                });
                if let Some(facing) = input.facing {
                    message["facing"] = Value::from(facing);
                }
                message
            }
            Command::Join { id, name, class } => serde_json::json!({
                "type": "join",
                "id": String::from(*id),
                "username": name.clone().unwrap_or_default(),
                "cls": class.map(PlayerClass::key).unwrap_or_default(),
            }),
            Command::Attack { id } => serde_json::json!({
                "type": "attack",
                "id": String::from(*id),
            }),
        };
        value.to_string()
    }

    pub fn entity_id(&self) -> EntityId {
        match self {
            Command::Input { id, .. } | Command::Join { id, .. } | Command::Attack { id } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub color: String,
    pub hp: u32,
    pub max_hp: u32,
    pub alive: bool,
    pub respawn_timer: u32,
    pub invuln_timer: u32,
    pub attack_cooldown: u32,
    pub defense: u32,
    pub damage: u32,
    pub name: Option<String>,
    pub cls: Option<PlayerClass>,
    pub xp: u32,
    pub level: u32,
    pub facing: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiderSnapshot {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub color: String,
    pub hp: u32,
    pub max_hp: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafSnapshot {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub r: f32,
    #[serde(rename = "type")]
    pub kind: LeafKind,
    pub xp: u32,
}

/// Complete world state at one instant. Clients replace, never merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Wall-clock time in unix milliseconds.
    pub t: u64,
    pub tick: u64,
    pub players: Vec<PlayerSnapshot>,
    pub spiders: Vec<SpiderSnapshot>,
    pub leaves: Vec<LeafSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Welcome { id: EntityId, world: World },
    Snapshot(Snapshot),
}

impl ServerMessage {
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}
