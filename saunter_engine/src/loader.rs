//! Loader utilities for building a [`GameSession`] from serialized data.
//!
//! World content arrives as a [`WorldDef`] (built in code by a front end or
//! read from a RON file), is validated as a whole, and only then turned
//! into live rooms, trees, and a player. A malformed definition never
//! produces a session.

use std::fs;
use std::path::Path;

use crate::consequence::Consequence;
use crate::dialogue::{DialogueNode, DialogueTree, DialogueTreeError, NodeKind};
use crate::player::Player;
use crate::room::{Room, RoomGraph};
use crate::session::GameSession;
use anyhow::{Context, Result, bail};
use log::info;
use saunter_data::{ConsequenceDef, DialogueDef, DialogueNodeDef, NodeKindDef, WorldDef};

/// Read a world definition from a RON file and build a session from it.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, validation, or session
/// construction.
pub fn load_session(path: &Path) -> Result<GameSession> {
    let text = fs::read_to_string(path).with_context(|| format!("while reading world file {}", path.display()))?;
    let def: WorldDef = ron::from_str(&text).context("while parsing world definition (RON)")?;
    build_session(&def)
}

/// Build a running session from an in-memory world definition.
///
/// # Errors
/// Fails fast with every validation problem aggregated into one error, or
/// with the construction failure that slipped past validation.
pub fn build_session(def: &WorldDef) -> Result<GameSession> {
    validate_worlddef(def)?;

    let mut graph = RoomGraph::new();
    for room_def in &def.rooms {
        let mut room = Room::new(&room_def.id, &room_def.name, &room_def.desc);
        room.visited = room_def.visited;
        room.items = room_def.items.clone();
        room.npcs = room_def.npcs.clone();
        if let Some(dialogue_def) = &room_def.dialogue {
            let tree = build_tree(dialogue_def)
                .with_context(|| format!("while building dialogue tree for room '{}'", room_def.id))?;
            room.dialogue = Some(tree);
        }
        graph.insert(room);
    }
    for room_def in &def.rooms {
        for exit in &room_def.exits {
            graph
                .connect(&room_def.id, &exit.direction, &exit.to)
                .with_context(|| format!("while connecting room '{}' exit '{}'", room_def.id, exit.direction))?;
        }
    }
    info!("{} rooms added to the world", graph.len());

    let player_def = &def.game.player;
    let mut player = Player::new(&player_def.name, &player_def.start_room);
    player.health = player_def.health;
    info!("player \"{}\" starts in '{}'", player.name, player.location);

    let session = GameSession::new(graph, player).context("while starting game session")?;
    Ok(session)
}

/// Validate the world definition and return a single aggregated error.
fn validate_worlddef(def: &WorldDef) -> Result<()> {
    let errors = saunter_data::validate_world(def);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("world definition validation failed:\n{details}");
}

fn build_tree(def: &DialogueDef) -> Result<DialogueTree, DialogueTreeError> {
    let nodes = def.nodes.iter().map(node_from_def).collect();
    DialogueTree::build(def.start.clone(), nodes)
}

fn node_from_def(def: &DialogueNodeDef) -> DialogueNode {
    let kind = match &def.kind {
        NodeKindDef::Normal { next } => NodeKind::Normal { next: next.clone() },
        NodeKindDef::Choice { options } => NodeKind::Choice {
            options: options
                .iter()
                .map(|option| (option.label.clone(), option.to.clone()))
                .collect(),
        },
        NodeKindDef::End => NodeKind::End,
    };
    let consequences = def.consequences.iter().map(consequence_from_def).collect();
    DialogueNode::new(&def.id, &def.text, kind).with_consequences(consequences)
}

fn consequence_from_def(def: &ConsequenceDef) -> Consequence {
    match def {
        ConsequenceDef::GrantItem { item } => Consequence::GrantItem { item: item.clone() },
        ConsequenceDef::SetFlag { name, value } => Consequence::SetFlag {
            name: name.clone(),
            value: value.clone(),
        },
        ConsequenceDef::AdjustHealth { delta } => Consequence::AdjustHealth { delta: *delta },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saunter_data::{ChoiceDef, ExitDef, GameDef, PlayerDef, RoomDef};

    fn create_test_def() -> WorldDef {
        WorldDef {
            game: GameDef {
                title: "Manor".into(),
                blurb: String::new(),
                player: PlayerDef {
                    name: "Wanderer".into(),
                    start_room: "hall".into(),
                    health: 100,
                },
            },
            rooms: vec![
                RoomDef {
                    id: "hall".into(),
                    name: "Hall".into(),
                    desc: "An echoing hall.".into(),
                    visited: false,
                    exits: vec![ExitDef {
                        direction: "north".into(),
                        to: "library".into(),
                    }],
                    items: vec!["rusty key".into()],
                    npcs: Vec::new(),
                    dialogue: None,
                },
                RoomDef {
                    id: "library".into(),
                    name: "Library".into(),
                    desc: "Dust and candlelight.".into(),
                    visited: false,
                    exits: Vec::new(),
                    items: Vec::new(),
                    npcs: vec!["ghost".into()],
                    dialogue: Some(DialogueDef {
                        start: "start".into(),
                        nodes: vec![
                            DialogueNodeDef {
                                id: "start".into(),
                                text: "What do you seek?".into(),
                                kind: NodeKindDef::Choice {
                                    options: vec![ChoiceDef {
                                        label: "Answers".into(),
                                        to: "gift".into(),
                                    }],
                                },
                                consequences: Vec::new(),
                            },
                            DialogueNodeDef {
                                id: "gift".into(),
                                text: "Take this.".into(),
                                kind: NodeKindDef::End,
                                consequences: vec![ConsequenceDef::GrantItem {
                                    item: "amulet".into(),
                                }],
                            },
                        ],
                    }),
                },
            ],
        }
    }

    #[test]
    fn build_session_produces_playable_world() {
        let mut session = build_session(&create_test_def()).unwrap();

        assert_eq!(session.current_room_key(), "hall");
        assert_eq!(session.graph().get("hall").unwrap().items, vec!["rusty key"]);

        session.handle_move("north").unwrap();
        session.handle_talk().unwrap();
        session.respond(crate::session::DialogueResponse::Choose(0)).unwrap();
        assert_eq!(session.inventory(), ["amulet"]);
    }

    #[test]
    fn build_session_rejects_invalid_world() {
        let mut def = create_test_def();
        def.rooms[0].exits.push(ExitDef {
            direction: "down".into(),
            to: "cellar".into(),
        });

        let err = build_session(&def).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("validation failed"));
        assert!(message.contains("cellar"));
    }

    #[test]
    fn build_session_aggregates_all_validation_errors() {
        let mut def = create_test_def();
        def.rooms[0].exits.push(ExitDef {
            direction: "down".into(),
            to: "cellar".into(),
        });
        def.game.player.start_room = "attic".into();

        let message = format!("{:#}", build_session(&def).unwrap_err());
        assert!(message.contains("cellar"));
        assert!(message.contains("attic"));
    }

    #[test]
    fn worlddef_survives_a_json_round_trip() {
        let def = create_test_def();
        let value = serde_json::to_value(&def).unwrap();
        let back: WorldDef = serde_json::from_value(value).unwrap();

        let session = build_session(&back).unwrap();
        assert_eq!(session.graph().len(), 2);
    }
}
