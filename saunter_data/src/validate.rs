use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a WorldDef.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a WorldDef.
///
/// Every exit target, dialogue successor, and the player start room must
/// resolve; a dangling key anywhere is a construction-time error, never a
/// runtime dead-end.
///
/// ```
/// use saunter_data::{GameDef, PlayerDef, RoomDef, WorldDef, validate_world};
///
/// let world = WorldDef {
///     game: GameDef {
///         title: "Demo".into(),
///         blurb: String::new(),
///         player: PlayerDef {
///             name: "Player".into(),
///             start_room: "start".into(),
///             health: 100,
///         },
///     },
///     rooms: vec![RoomDef {
///         id: "start".into(),
///         name: "Start".into(),
///         desc: "A room.".into(),
///         visited: false,
///         exits: Vec::new(),
///         items: Vec::new(),
///         npcs: Vec::new(),
///         dialogue: None,
///     }],
/// };
/// assert!(validate_world(&world).is_empty());
/// ```
pub fn validate_world(world: &WorldDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut rooms = HashSet::new();
    track_ids(
        "room",
        world.rooms.iter().map(|r| r.id.as_str()),
        &mut rooms,
        &mut errors,
    );

    if world.game.player.start_room.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "game player start room missing".to_string(),
        });
    } else {
        check_ref(
            "room",
            &world.game.player.start_room,
            &rooms,
            "game player start room".to_string(),
            &mut errors,
        );
    }

    for room in &world.rooms {
        if room.id.trim().is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("room '{}' has a blank id", room.name),
            });
        }
        for exit in &room.exits {
            if exit.direction.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    context: format!("room '{}' has an exit with a blank direction", room.id),
                });
            }
            check_ref(
                "room",
                &exit.to,
                &rooms,
                format!("room '{}' exit '{}'", room.id, exit.direction),
                &mut errors,
            );
        }
        if let Some(dialogue) = &room.dialogue {
            validate_dialogue(dialogue, &room.id, &mut errors);
        }
    }

    errors
}

/// Check one room's dialogue tree for closure: the start key and every
/// successor referenced by a linear node or a choice must exist in the
/// same tree, and a choice node must actually offer options.
fn validate_dialogue(dialogue: &DialogueDef, room_id: &str, errors: &mut Vec<ValidationError>) {
    let mut nodes = HashSet::new();
    track_ids(
        "dialogue node",
        dialogue.nodes.iter().map(|n| n.id.as_str()),
        &mut nodes,
        errors,
    );

    check_ref(
        "dialogue node",
        &dialogue.start,
        &nodes,
        format!("room '{room_id}' dialogue start"),
        errors,
    );

    for node in &dialogue.nodes {
        match &node.kind {
            NodeKindDef::Normal { next: Some(next) } => {
                check_ref(
                    "dialogue node",
                    next,
                    &nodes,
                    format!("room '{room_id}' dialogue node '{}' next", node.id),
                    errors,
                );
            },
            NodeKindDef::Normal { next: None } | NodeKindDef::End => {},
            NodeKindDef::Choice { options } => {
                if options.is_empty() {
                    errors.push(ValidationError::InvalidValue {
                        context: format!("room '{room_id}' dialogue node '{}' has no options", node.id),
                    });
                }
                for option in options {
                    if option.label.trim().is_empty() {
                        errors.push(ValidationError::InvalidValue {
                            context: format!(
                                "room '{room_id}' dialogue node '{}' has an option with a blank label",
                                node.id
                            ),
                        });
                    }
                    check_ref(
                        "dialogue node",
                        &option.to,
                        &nodes,
                        format!("room '{room_id}' dialogue node '{}' option '{}'", node.id, option.label),
                        errors,
                    );
                }
            },
        }
    }
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: String, errors: &mut Vec<ValidationError>) {
    if !set.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(id: &str) -> RoomDef {
        RoomDef {
            id: id.to_string(),
            name: format!("Room {id}"),
            desc: "Test room".into(),
            visited: false,
            exits: Vec::new(),
            items: Vec::new(),
            npcs: Vec::new(),
            dialogue: None,
        }
    }

    fn base_world() -> WorldDef {
        WorldDef {
            game: GameDef {
                title: "Demo".into(),
                blurb: String::new(),
                player: PlayerDef {
                    name: "Player".into(),
                    start_room: "start".into(),
                    health: 100,
                },
            },
            rooms: vec![room("start")],
        }
    }

    fn node(id: &str, kind: NodeKindDef) -> DialogueNodeDef {
        DialogueNodeDef {
            id: id.to_string(),
            text: format!("Node {id}"),
            kind,
            consequences: Vec::new(),
        }
    }

    #[test]
    fn valid_world_passes() {
        assert!(validate_world(&base_world()).is_empty());
    }

    #[test]
    fn duplicate_room_ids_are_reported() {
        let mut world = base_world();
        world.rooms = vec![room("same"), room("same")];

        let errors = validate_world(&world);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::DuplicateId { kind, id } if *kind == "room" && id == "same"))
        );
    }

    #[test]
    fn missing_exit_target_is_reported() {
        let mut world = base_world();
        world.rooms[0].exits.push(ExitDef {
            direction: "north".into(),
            to: "nowhere".into(),
        });

        let errors = validate_world(&world);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "room" && id == "nowhere")
        ));
    }

    #[test]
    fn missing_start_room_is_reported() {
        let mut world = base_world();
        world.game.player.start_room = "attic".into();

        let errors = validate_world(&world);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "room" && id == "attic")
        ));
    }

    #[test]
    fn blank_start_room_is_reported() {
        let mut world = base_world();
        world.game.player.start_room = "  ".into();

        let errors = validate_world(&world);
        assert!(errors.iter().any(|err| matches!(err, ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn dangling_normal_successor_is_reported() {
        let mut world = base_world();
        world.rooms[0].dialogue = Some(DialogueDef {
            start: "start".into(),
            nodes: vec![node(
                "start",
                NodeKindDef::Normal {
                    next: Some("gone".into()),
                },
            )],
        });

        let errors = validate_world(&world);
        assert!(errors.iter().any(|err| matches!(
            err,
            ValidationError::MissingReference { kind, id, .. } if *kind == "dialogue node" && id == "gone"
        )));
    }

    #[test]
    fn dangling_choice_target_is_reported() {
        let mut world = base_world();
        world.rooms[0].dialogue = Some(DialogueDef {
            start: "start".into(),
            nodes: vec![node(
                "start",
                NodeKindDef::Choice {
                    options: vec![ChoiceDef {
                        label: "Ask".into(),
                        to: "gone".into(),
                    }],
                },
            )],
        });

        let errors = validate_world(&world);
        assert!(errors.iter().any(|err| matches!(
            err,
            ValidationError::MissingReference { kind, id, .. } if *kind == "dialogue node" && id == "gone"
        )));
    }

    #[test]
    fn missing_dialogue_start_is_reported() {
        let mut world = base_world();
        world.rooms[0].dialogue = Some(DialogueDef {
            start: "opening".into(),
            nodes: vec![node("start", NodeKindDef::End)],
        });

        let errors = validate_world(&world);
        assert!(errors.iter().any(|err| matches!(
            err,
            ValidationError::MissingReference { kind, id, .. } if *kind == "dialogue node" && id == "opening"
        )));
    }

    #[test]
    fn duplicate_dialogue_node_ids_are_reported() {
        let mut world = base_world();
        world.rooms[0].dialogue = Some(DialogueDef {
            start: "start".into(),
            nodes: vec![node("start", NodeKindDef::End), node("start", NodeKindDef::End)],
        });

        let errors = validate_world(&world);
        assert!(errors.iter().any(|err| matches!(
            err,
            ValidationError::DuplicateId { kind, id } if *kind == "dialogue node" && id == "start"
        )));
    }

    #[test]
    fn choice_without_options_is_reported() {
        let mut world = base_world();
        world.rooms[0].dialogue = Some(DialogueDef {
            start: "start".into(),
            nodes: vec![node("start", NodeKindDef::Choice { options: Vec::new() })],
        });

        let errors = validate_world(&world);
        assert!(errors.iter().any(|err| matches!(err, ValidationError::InvalidValue { .. })));
    }

    #[test]
    fn one_way_exits_are_not_an_error() {
        let mut world = base_world();
        world.rooms.push(room("library"));
        world.rooms[0].exits.push(ExitDef {
            direction: "north".into(),
            to: "library".into(),
        });
        // no return exit from the library, deliberately

        assert!(validate_world(&world).is_empty());
    }
}
