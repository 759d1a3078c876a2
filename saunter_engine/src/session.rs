//! Game session orchestration.
//!
//! [`GameSession`] is the composition root: it owns the [`RoomGraph`] and
//! the [`Player`] and routes front-end intents (move, talk, dialogue
//! responses) to the right component, applying dialogue consequences to the
//! player as they fall out. Front ends never touch the tree cursor
//! directly; they hold a session, submit intents, and render the typed
//! prompts and snapshots that come back.

use crate::Id;
use crate::consequence::apply_consequences;
use crate::dialogue::{DialogueError, DialogueTree, NodeKind};
use crate::player::Player;
use crate::room::{Room, RoomGraph, RoomGraphError};
use log::{info, warn};
use thiserror::Error;
use uuid::Uuid;

/// Recoverable failures reported back to a front end. None of these are
/// fatal; each is an outcome for the player to read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("you can't go '{0}' from here")]
    InvalidDirection(String),
    #[error("there's nothing to talk to here")]
    NothingToTalkTo,
    #[error("room '{0}' not found in graph")]
    RoomNotFound(Id),
    #[error(transparent)]
    Dialogue(#[from] DialogueError),
}

/// Result of a successful move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Key of the room the player now occupies.
    pub room: Id,
    /// True if this was the room's first visit (front ends typically show
    /// the full description only then).
    pub first_visit: bool,
}

/// One step of a conversation as presented to a front end: exactly the
/// affordance to render, nothing more.
#[derive(Debug, Clone, PartialEq, Eq, variantly::Variantly)]
pub enum DialoguePrompt {
    /// Exposition; offer a "continue".
    Text { text: String },
    /// Decision point; offer a numbered menu of `options` in order.
    Choice { text: String, options: Vec<String> },
    /// Terminal line; offer a "close".
    End { text: String },
    /// The conversation is over and no prompt is pending.
    Finished,
}

/// A front end's answer to the current prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueResponse {
    /// Advance past exposition.
    Continue,
    /// Pick an option by zero-based index into the prompt's list.
    Choose(usize),
    /// End the conversation.
    Close,
}

/// A running game: one room graph, one player, at most one active dialogue.
#[derive(Debug)]
pub struct GameSession {
    id: Uuid,
    graph: RoomGraph,
    player: Player,
    /// Key of the room whose tree currently holds the cursor.
    active_dialogue: Option<Id>,
}

/// One row of the world map: every room's identity and whether the player
/// has been there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    pub key: Id,
    pub name: String,
    pub visited: bool,
}

impl GameSession {
    /// Start a session with the player standing in their declared room,
    /// which is marked visited immediately.
    ///
    /// # Errors
    /// - [`SessionError::RoomNotFound`] if the player's room isn't in the
    ///   graph.
    pub fn new(mut graph: RoomGraph, player: Player) -> Result<Self, SessionError> {
        let start = player.location.clone();
        let room = graph
            .get_mut(&start)
            .ok_or_else(|| SessionError::RoomNotFound(start.clone()))?;
        room.visited = true;
        let id = Uuid::new_v4();
        info!("session {id}: {} begins in '{start}'", player.name);
        Ok(Self {
            id,
            graph,
            player,
            active_dialogue: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn graph(&self) -> &RoomGraph {
        &self.graph
    }

    pub fn current_room_key(&self) -> &str {
        &self.player.location
    }

    /// The room the player occupies.
    ///
    /// # Errors
    /// - [`SessionError::RoomNotFound`] if the player's key dangles, which
    ///   indicates a corrupted graph rather than a player mistake.
    pub fn current_room(&self) -> Result<&Room, SessionError> {
        self.graph
            .get(&self.player.location)
            .ok_or_else(|| SessionError::RoomNotFound(self.player.location.clone()))
    }

    /// Outgoing direction labels from the player's room, in registration
    /// order, for legend rendering.
    ///
    /// # Errors
    /// - [`SessionError::RoomNotFound`] if the player's key dangles.
    pub fn available_directions(&self) -> Result<Vec<&str>, SessionError> {
        Ok(self.current_room()?.available_directions())
    }

    pub fn inventory(&self) -> &[Id] {
        &self.player.inventory
    }

    pub fn in_dialogue(&self) -> bool {
        self.active_dialogue.is_some()
    }

    /// Every room with its visited status, sorted by key for stable
    /// display.
    pub fn world_map(&self) -> Vec<MapEntry> {
        let mut entries: Vec<MapEntry> = self
            .graph
            .iter()
            .map(|room| MapEntry {
                key: room.id.clone(),
                name: room.name.clone(),
                visited: room.visited,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Move the player along a registered direction.
    ///
    /// On success the destination becomes the player's room and is marked
    /// visited (idempotently). On an unregistered label the player stays
    /// put -- the normal "you can't go that way" outcome, not a fault.
    ///
    /// # Errors
    /// - [`SessionError::InvalidDirection`] if the label isn't registered
    ///   on the current room.
    /// - [`SessionError::RoomNotFound`] on a dangling key (corrupt graph).
    pub fn handle_move(&mut self, direction: &str) -> Result<MoveOutcome, SessionError> {
        let from = self.player.location.clone();
        let destination = match self.graph.destination_for(&from, direction) {
            Ok(key) => key.clone(),
            Err(RoomGraphError::NoExit { .. }) => {
                warn!("{} tried to go '{direction}' from '{from}'", self.player.name);
                return Err(SessionError::InvalidDirection(direction.to_string()));
            },
            Err(RoomGraphError::RoomNotFound(key)) => return Err(SessionError::RoomNotFound(key)),
        };

        let dest_room = self
            .graph
            .get_mut(&destination)
            .ok_or_else(|| SessionError::RoomNotFound(destination.clone()))?;
        let first_visit = !dest_room.visited;
        dest_room.visited = true;
        self.player.location = destination.clone();
        info!("{} moved '{direction}' from '{from}' to '{destination}'", self.player.name);
        Ok(MoveOutcome {
            room: destination,
            first_visit,
        })
    }

    /// Open a conversation in the player's room.
    ///
    /// Requires an NPC present and an attached dialogue tree; starts the
    /// tree at its declared start node and returns the first prompt. Only
    /// one dialogue may be active across the whole session.
    ///
    /// # Errors
    /// - [`SessionError::NothingToTalkTo`] if the room has no NPC or no
    ///   tree.
    /// - [`DialogueError::AlreadyActive`] if a conversation is already in
    ///   progress somewhere.
    pub fn handle_talk(&mut self) -> Result<DialoguePrompt, SessionError> {
        if self.active_dialogue.is_some() {
            return Err(DialogueError::AlreadyActive.into());
        }
        let room_key = self.player.location.clone();
        let room = self
            .graph
            .get_mut(&room_key)
            .ok_or_else(|| SessionError::RoomNotFound(room_key.clone()))?;
        if room.npcs.is_empty() {
            return Err(SessionError::NothingToTalkTo);
        }
        let Some(tree) = room.dialogue.as_mut() else {
            return Err(SessionError::NothingToTalkTo);
        };
        tree.start()?;
        self.active_dialogue = Some(room_key.clone());
        info!("{} started a conversation in '{room_key}'", self.player.name);
        self.apply_arrival(&room_key);
        self.prompt(&room_key)
    }

    /// Answer the pending prompt and receive the next one.
    ///
    /// `Continue` follows linear exposition (a no-op re-prompt where there
    /// is nothing to follow), `Choose` resolves a decision point and
    /// applies the consequences of the node being left, `Close` ends the
    /// conversation from any prompt and yields `Finished`.
    ///
    /// # Errors
    /// - [`DialogueError::NotActive`] if no conversation is in progress.
    /// - [`DialogueError::InvalidChoice`] on an out-of-range or mismatched
    ///   option; the prompt is unchanged and should be re-presented.
    pub fn respond(&mut self, response: DialogueResponse) -> Result<DialoguePrompt, SessionError> {
        let room_key = self.active_dialogue.clone().ok_or(DialogueError::NotActive)?;
        match response {
            DialogueResponse::Close => {
                self.tree_mut(&room_key)?.stop()?;
                self.active_dialogue = None;
                info!("conversation in '{room_key}' closed");
                Ok(DialoguePrompt::Finished)
            },
            DialogueResponse::Continue => {
                let tree = self.tree_mut(&room_key)?;
                let before = tree.cursor().cloned();
                tree.advance()?;
                let moved = tree.cursor().cloned() != before;
                if moved {
                    self.apply_arrival(&room_key);
                }
                self.prompt(&room_key)
            },
            DialogueResponse::Choose(index) => {
                let tree = self.tree_mut(&room_key)?;
                let label = {
                    let node = tree.current_node().ok_or(DialogueError::NotActive)?;
                    match node.choice_labels().get(index) {
                        Some(label) => (*label).to_string(),
                        None => return Err(DialogueError::InvalidChoice(index.to_string()).into()),
                    }
                };
                let consequences = tree.resolve_choice(&label)?;
                apply_consequences(&mut self.player, &consequences);
                self.apply_arrival(&room_key);
                self.prompt(&room_key)
            },
        }
    }

    /// Re-derive the pending prompt without transitioning, or `None` when
    /// no conversation is active.
    pub fn current_prompt(&self) -> Option<DialoguePrompt> {
        self.active_dialogue
            .as_ref()
            .and_then(|key| self.graph.get(key))
            .and_then(|room| room.dialogue.as_ref())
            .map(Self::prompt_for)
    }

    fn tree_mut(&mut self, room_key: &str) -> Result<&mut DialogueTree, SessionError> {
        self.graph
            .get_mut(room_key)
            .ok_or_else(|| SessionError::RoomNotFound(room_key.to_string()))?
            .dialogue
            .as_mut()
            .ok_or(SessionError::NothingToTalkTo)
    }

    /// Apply the consequences of a terminal node the cursor just arrived
    /// at. Called once per transition, so each arrival applies exactly
    /// once.
    fn apply_arrival(&mut self, room_key: &str) {
        let consequences = match self
            .graph
            .get(room_key)
            .and_then(|room| room.dialogue.as_ref())
            .and_then(DialogueTree::current_node)
        {
            Some(node) if matches!(node.kind, NodeKind::End) && !node.consequences.is_empty() => {
                node.consequences.clone()
            },
            _ => return,
        };
        apply_consequences(&mut self.player, &consequences);
    }

    fn prompt(&self, room_key: &str) -> Result<DialoguePrompt, SessionError> {
        let tree = self
            .graph
            .get(room_key)
            .ok_or_else(|| SessionError::RoomNotFound(room_key.to_string()))?
            .dialogue
            .as_ref()
            .ok_or(SessionError::NothingToTalkTo)?;
        Ok(Self::prompt_for(tree))
    }

    fn prompt_for(tree: &DialogueTree) -> DialoguePrompt {
        match tree.current_node() {
            None => DialoguePrompt::Finished,
            Some(node) => match &node.kind {
                NodeKind::Normal { .. } => DialoguePrompt::Text {
                    text: node.text.clone(),
                },
                NodeKind::Choice { options } => DialoguePrompt::Choice {
                    text: node.text.clone(),
                    options: options.iter().map(|(label, _)| label.clone()).collect(),
                },
                NodeKind::End => DialoguePrompt::End {
                    text: node.text.clone(),
                },
            },
        }
    }
}
