//! Player -- module for the player character in Saunter.

use crate::Id;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Health every player starts a session with.
pub const STARTING_HEALTH: u32 = 100;

/// Methods common to anything that can hold items.
pub trait ItemHolder {
    fn add_item(&mut self, item_id: Id);
    fn remove_item(&mut self, item_id: &str);
    fn contains_item(&self, item_id: &str) -> bool;
}

/// The player character: a display name, a current room key, and the state
/// that gameplay mutates.
///
/// The inventory is an ordered list rather than a set: acquisition order is
/// preserved and picking up the same item twice yields two entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub location: Id,
    pub inventory: Vec<Id>,
    pub health: u32,
    pub flags: HashMap<String, String>,
}

impl Player {
    /// Create a player standing in the given start room.
    pub fn new(name: impl Into<String>, start_room: impl Into<Id>) -> Self {
        Self {
            name: name.into(),
            location: start_room.into(),
            inventory: Vec::new(),
            health: STARTING_HEALTH,
            flags: HashMap::new(),
        }
    }

    /// Set (or overwrite) a named game flag.
    pub fn set_flag(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.flags.insert(name.into(), value.into());
    }

    /// Read a game flag, if set.
    pub fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    /// Apply a signed health change, saturating at zero.
    pub fn adjust_health(&mut self, delta: i32) {
        if delta >= 0 {
            self.health = self.health.saturating_add(delta.unsigned_abs());
        } else {
            self.health = self.health.saturating_sub(delta.unsigned_abs());
        }
    }
}

impl ItemHolder for Player {
    fn add_item(&mut self, item_id: Id) {
        self.inventory.push(item_id);
    }

    fn remove_item(&mut self, item_id: &str) {
        if let Some(pos) = self.inventory.iter().position(|id| id == item_id) {
            self.inventory.remove(pos);
        }
    }

    fn contains_item(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|id| id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_with_full_health_and_empty_bags() {
        let player = Player::new("Ravencroft", "hall");
        assert_eq!(player.health, STARTING_HEALTH);
        assert_eq!(player.location, "hall");
        assert!(player.inventory.is_empty());
        assert!(player.flags.is_empty());
    }

    #[test]
    fn inventory_allows_duplicates_in_acquisition_order() {
        let mut player = Player::new("Ravencroft", "hall");
        player.add_item("candle".into());
        player.add_item("key".into());
        player.add_item("candle".into());

        assert_eq!(player.inventory, vec!["candle", "key", "candle"]);
        assert!(player.contains_item("key"));
        assert!(!player.contains_item("amulet"));
    }

    #[test]
    fn remove_item_drops_first_occurrence_only() {
        let mut player = Player::new("Ravencroft", "hall");
        player.add_item("candle".into());
        player.add_item("candle".into());
        player.remove_item("candle");

        assert_eq!(player.inventory, vec!["candle"]);
    }

    #[test]
    fn flags_overwrite_on_reset() {
        let mut player = Player::new("Ravencroft", "hall");
        player.set_flag("met_ghost", "true");
        player.set_flag("met_ghost", "twice");

        assert_eq!(player.flag("met_ghost"), Some("twice"));
        assert_eq!(player.flag("unset"), None);
    }

    #[test]
    fn health_saturates_at_zero() {
        let mut player = Player::new("Ravencroft", "hall");
        player.adjust_health(-50);
        assert_eq!(player.health, 50);
        player.adjust_health(-200);
        assert_eq!(player.health, 0);
        player.adjust_health(25);
        assert_eq!(player.health, 25);
    }
}
