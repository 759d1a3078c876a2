use serde::{Deserialize, Serialize};

/// Stable identifier used across WorldDef references.
pub type Id = String;

/// Top-level world data loaded by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldDef {
    pub game: GameDef,
    #[serde(default)]
    pub rooms: Vec<RoomDef>,
}

/// Game-level metadata and startup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameDef {
    pub title: String,
    #[serde(default)]
    pub blurb: String,
    pub player: PlayerDef,
}

/// Player definition: who the player is and where they wake up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDef {
    pub name: String,
    pub start_room: Id,
    #[serde(default = "default_health")]
    pub health: u32,
}

impl Default for PlayerDef {
    fn default() -> Self {
        Self {
            name: String::new(),
            start_room: String::new(),
            health: default_health(),
        }
    }
}

fn default_health() -> u32 {
    100
}

/// Room definition used by the engine at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDef {
    pub id: Id,
    pub name: String,
    pub desc: String,
    #[serde(default)]
    pub visited: bool,
    #[serde(default)]
    pub exits: Vec<ExitDef>,
    #[serde(default)]
    pub items: Vec<Id>,
    #[serde(default)]
    pub npcs: Vec<Id>,
    #[serde(default)]
    pub dialogue: Option<DialogueDef>,
}

/// Directed exit for room navigation. Exits need not be symmetric; an
/// authored one-way passage is map design, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitDef {
    pub direction: String,
    pub to: Id,
}

/// A dialogue tree attached to a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueDef {
    #[serde(default = "default_start_node")]
    pub start: Id,
    pub nodes: Vec<DialogueNodeDef>,
}

fn default_start_node() -> Id {
    "start".into()
}

/// One step of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueNodeDef {
    pub id: Id,
    pub text: String,
    pub kind: NodeKindDef,
    #[serde(default)]
    pub consequences: Vec<ConsequenceDef>,
}

/// Discriminant of a dialogue node. The successor data lives inside the
/// variant, so a linear node can never carry choices and vice versa.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKindDef {
    /// Linear exposition; `next` may be absent for a hanging line the
    /// front end is expected to close out itself.
    Normal {
        #[serde(default)]
        next: Option<Id>,
    },
    /// Player decision point. Option order is display order.
    Choice { options: Vec<ChoiceDef> },
    /// Terminal node; no successor.
    End,
}

/// A single selectable option on a choice node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceDef {
    pub label: String,
    pub to: Id,
}

/// Side effects a dialogue node may carry, applied to the player by the
/// session when the node is left (choices) or reached (terminals).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ConsequenceDef {
    GrantItem { item: Id },
    SetFlag { name: String, value: String },
    AdjustHealth { delta: i32 },
}
