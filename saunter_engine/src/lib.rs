#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const SAUNTER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod consequence;
pub mod dialogue;
pub mod loader;
pub mod player;
pub mod room;
pub mod session;

// Re-exports for convenience
pub use consequence::Consequence;
pub use dialogue::{DialogueError, DialogueNode, DialogueState, DialogueTree, DialogueTreeError, NodeKind};
pub use loader::{build_session, load_session};
pub use player::{ItemHolder, Player};
pub use room::{Room, RoomGraph, RoomGraphError};
pub use saunter_data::Id;
pub use session::{DialoguePrompt, DialogueResponse, GameSession, MapEntry, MoveOutcome, SessionError};
