//! Consequence module --
//!
//! Dialogue nodes may carry consequences: side effects applied to the
//! [`Player`] when the node is left by a choice or reached as a terminal.
//! The dialogue tree itself never touches the player; the session applies
//! these, keeping the two halves independently testable.

use crate::Id;
use crate::player::{ItemHolder, Player};
use log::info;
use serde::{Deserialize, Serialize};

/// A typed side effect attached to a dialogue node.
///
/// The set is closed but meant to grow: a new effect kind is a new variant,
/// not a new stringly-keyed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Consequence {
    /// Add a named item to the player's inventory.
    GrantItem { item: Id },
    /// Set a named game flag on the player.
    SetFlag { name: String, value: String },
    /// Raise or lower the player's health, saturating at zero.
    AdjustHealth { delta: i32 },
}

/// Apply a batch of consequences to the player, in order.
pub fn apply_consequences(player: &mut Player, consequences: &[Consequence]) {
    for consequence in consequences {
        match consequence {
            Consequence::GrantItem { item } => {
                player.add_item(item.clone());
                info!("{} received '{item}'", player.name);
            },
            Consequence::SetFlag { name, value } => {
                player.set_flag(name.clone(), value.clone());
                info!("flag '{name}' set to '{value}' for {}", player.name);
            },
            Consequence::AdjustHealth { delta } => {
                player.adjust_health(*delta);
                info!("{} health adjusted by {delta} to {}", player.name, player.health);
            },
        }
    }
}
