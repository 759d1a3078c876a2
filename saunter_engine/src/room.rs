//! Room definitions and graph utilities.
//!
//! Any location the player can occupy is a "Room". Rooms live in a
//! [`RoomGraph`] arena keyed by stable string ids; exits store keys rather
//! than references, so ownership stays acyclic even when the logical map
//! loops back on itself.

use crate::Id;
use crate::dialogue::DialogueTree;
use crate::player::ItemHolder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Failed lookups against a [`RoomGraph`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomGraphError {
    #[error("room '{0}' not found in graph")]
    RoomNotFound(Id),
    #[error("no '{direction}' exit from room '{room}'")]
    NoExit { room: Id, direction: String },
}

/// Any visitable location in the game world.
///
/// Exits are directed and need not be symmetric: a "north" edge from A to B
/// without a "south" edge back is legal map design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub visited: bool,
    exits: Vec<(String, Id)>,
    pub items: Vec<Id>,
    pub npcs: Vec<Id>,
    pub dialogue: Option<DialogueTree>,
}

impl Room {
    /// Create a room with no exits, contents, or dialogue.
    pub fn new(id: impl Into<Id>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            visited: false,
            exits: Vec::new(),
            items: Vec::new(),
            npcs: Vec::new(),
            dialogue: None,
        }
    }

    /// Register a directed exit. Re-registering a direction already present
    /// (compared case-insensitively) overwrites the destination in place,
    /// keeping the original list position: last write wins.
    pub fn set_exit(&mut self, direction: impl Into<String>, to: impl Into<Id>) {
        let direction = direction.into();
        let to = to.into();
        let folded = direction.to_lowercase();
        if let Some(slot) = self.exits.iter_mut().find(|(dir, _)| dir.to_lowercase() == folded) {
            slot.1 = to;
        } else {
            self.exits.push((direction, to));
        }
    }

    /// Outgoing direction labels, in the order they were registered.
    pub fn available_directions(&self) -> Vec<&str> {
        self.exits.iter().map(|(dir, _)| dir.as_str()).collect()
    }

    /// Destination room key for a direction, matched case-insensitively
    /// against the registered labels.
    pub fn destination_for(&self, direction: &str) -> Option<&Id> {
        let folded = direction.to_lowercase();
        self.exits
            .iter()
            .find(|(dir, _)| dir.to_lowercase() == folded)
            .map(|(_, to)| to)
    }

    /// All exits as (direction, destination key) pairs in registration order.
    pub fn exits(&self) -> &[(String, Id)] {
        &self.exits
    }
}

impl ItemHolder for Room {
    fn add_item(&mut self, item_id: Id) {
        self.items.push(item_id);
    }

    fn remove_item(&mut self, item_id: &str) {
        if let Some(pos) = self.items.iter().position(|id| id == item_id) {
            self.items.remove(pos);
        }
    }

    fn contains_item(&self, item_id: &str) -> bool {
        self.items.iter().any(|id| id == item_id)
    }
}

/// Arena owning every [`Room`] for a session, keyed by room id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomGraph {
    rooms: HashMap<Id, Room>,
}

impl RoomGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self { rooms: HashMap::new() }
    }

    /// Add a room to the graph, replacing any room with the same id.
    pub fn insert(&mut self, room: Room) -> Option<Room> {
        self.rooms.insert(room.id.clone(), room)
    }

    pub fn get(&self, key: &str) -> Option<&Room> {
        self.rooms.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Room> {
        self.rooms.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rooms.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Iterate over all rooms, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    /// Register a one-directional edge between two existing rooms.
    ///
    /// Direction labels are free-form; nothing restricts them to compass
    /// points. Re-connecting an existing direction overwrites it (see
    /// [`Room::set_exit`]).
    ///
    /// # Errors
    /// - [`RoomGraphError::RoomNotFound`] if either endpoint is absent.
    pub fn connect(&mut self, from: &str, direction: impl Into<String>, to: &str) -> Result<(), RoomGraphError> {
        if !self.rooms.contains_key(to) {
            return Err(RoomGraphError::RoomNotFound(to.to_string()));
        }
        let from_room = self
            .rooms
            .get_mut(from)
            .ok_or_else(|| RoomGraphError::RoomNotFound(from.to_string()))?;
        from_room.set_exit(direction, to);
        Ok(())
    }

    /// Outgoing direction labels from a room, in registration order.
    ///
    /// # Errors
    /// - [`RoomGraphError::RoomNotFound`] if the room is absent.
    pub fn available_directions(&self, room: &str) -> Result<Vec<&str>, RoomGraphError> {
        self.rooms
            .get(room)
            .map(Room::available_directions)
            .ok_or_else(|| RoomGraphError::RoomNotFound(room.to_string()))
    }

    /// Destination key for a direction out of a room, matched
    /// case-insensitively.
    ///
    /// # Errors
    /// - [`RoomGraphError::RoomNotFound`] if the room is absent.
    /// - [`RoomGraphError::NoExit`] if the label isn't registered there.
    pub fn destination_for(&self, room: &str, direction: &str) -> Result<&Id, RoomGraphError> {
        let from_room = self
            .rooms
            .get(room)
            .ok_or_else(|| RoomGraphError::RoomNotFound(room.to_string()))?;
        from_room
            .destination_for(direction)
            .ok_or_else(|| RoomGraphError::NoExit {
                room: room.to_string(),
                direction: direction.to_string(),
            })
    }
}
