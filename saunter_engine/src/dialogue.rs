//! Dialogue trees and the conversation state machine.
//!
//! A [`DialogueTree`] is an arena of [`DialogueNode`]s addressed by string
//! key, plus a single cursor marking the active node. Nodes are linear
//! exposition, decision points, or terminals; the discriminant tells a front
//! end exactly which affordance to render (a continue prompt, a numbered
//! menu, or a close action) without poking at node internals.
//!
//! Trees are only obtainable through [`DialogueTree::build`], which checks
//! the full closure of the node set up front: a successor key that resolves
//! nowhere is a construction-time error, never a runtime dead-end.

use crate::Id;
use crate::consequence::Consequence;
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Structural problems found while building a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueTreeError {
    #[error("duplicate dialogue node id '{0}'")]
    DuplicateNode(Id),
    #[error("dialogue node '{referenced}' (referenced from '{from}') does not exist")]
    MissingNode { referenced: Id, from: Id },
    #[error("declared start node '{0}' does not exist")]
    MissingStart(Id),
    #[error("choice node '{0}' has no options")]
    EmptyChoices(Id),
}

/// Recoverable failures while traversing an already-built tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialogueError {
    #[error("a dialogue is already active")]
    AlreadyActive,
    #[error("no dialogue is active")]
    NotActive,
    #[error("dialogue node '{0}' not found")]
    NodeNotFound(Id),
    #[error("'{0}' is not one of the current choices")]
    InvalidChoice(String),
}

/// What kind of step a node is. Successor data lives inside the variant, so
/// exposition with choices (or a decision point without them) cannot be
/// expressed at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Linear exposition. `next` may be absent; advancing such a node is a
    /// no-op and the caller decides when to close out.
    Normal { next: Option<Id> },
    /// Player decision point; option order is display order.
    Choice { options: Vec<(String, Id)> },
    /// Terminal. The only way on from here is stopping the dialogue.
    End,
}

/// One step of a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: Id,
    pub text: String,
    pub kind: NodeKind,
    pub consequences: Vec<Consequence>,
}

impl DialogueNode {
    /// Create a node with no consequences attached.
    pub fn new(id: impl Into<Id>, text: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            consequences: Vec::new(),
        }
    }

    /// Attach consequences, builder style.
    pub fn with_consequences(mut self, consequences: Vec<Consequence>) -> Self {
        self.consequences = consequences;
        self
    }

    /// Option labels in display order; empty for non-choice nodes.
    pub fn choice_labels(&self) -> Vec<&str> {
        match &self.kind {
            NodeKind::Choice { options } => options.iter().map(|(label, _)| label.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Externally observable state of a tree, derived from the cursor and the
/// active node's kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, variantly::Variantly, Serialize, Deserialize)]
pub enum DialogueState {
    Inactive,
    AtNormal,
    AtChoice,
    AtEnd,
}

/// A conversation: an arena of nodes, a declared start key, the cursor, and
/// a transcript of choices made during the current run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueTree {
    nodes: HashMap<Id, DialogueNode>,
    start: Id,
    cursor: Option<Id>,
    transcript: Vec<String>,
}

impl DialogueTree {
    /// Build a tree from its nodes, verifying closure up front: the start
    /// key and every successor referenced by a node must exist, node ids
    /// must be unique, and a choice node must offer at least one option.
    ///
    /// # Errors
    /// The first structural defect found, as a [`DialogueTreeError`].
    pub fn build(start: impl Into<Id>, node_list: Vec<DialogueNode>) -> Result<Self, DialogueTreeError> {
        let start = start.into();
        let mut nodes: HashMap<Id, DialogueNode> = HashMap::with_capacity(node_list.len());
        for node in node_list {
            let id = node.id.clone();
            if nodes.insert(id.clone(), node).is_some() {
                return Err(DialogueTreeError::DuplicateNode(id));
            }
        }

        if !nodes.contains_key(&start) {
            return Err(DialogueTreeError::MissingStart(start));
        }

        for node in nodes.values() {
            match &node.kind {
                NodeKind::Normal { next: Some(next) } => {
                    if !nodes.contains_key(next) {
                        return Err(DialogueTreeError::MissingNode {
                            referenced: next.clone(),
                            from: node.id.clone(),
                        });
                    }
                },
                NodeKind::Normal { next: None } | NodeKind::End => {},
                NodeKind::Choice { options } => {
                    if options.is_empty() {
                        return Err(DialogueTreeError::EmptyChoices(node.id.clone()));
                    }
                    for (_, target) in options {
                        if !nodes.contains_key(target) {
                            return Err(DialogueTreeError::MissingNode {
                                referenced: target.clone(),
                                from: node.id.clone(),
                            });
                        }
                    }
                },
            }
        }

        Ok(Self {
            nodes,
            start,
            cursor: None,
            transcript: Vec::new(),
        })
    }

    /// The declared entry node key.
    pub fn start_key(&self) -> &str {
        &self.start
    }

    /// Begin a run at the declared start node.
    ///
    /// # Errors
    /// See [`DialogueTree::start_at`].
    pub fn start(&mut self) -> Result<(), DialogueError> {
        let key = self.start.clone();
        self.start_at(&key)
    }

    /// Begin a run at an arbitrary node. The only entry point into the
    /// active states; the previous run's transcript is cleared.
    ///
    /// # Errors
    /// - [`DialogueError::AlreadyActive`] if a cursor is already set.
    /// - [`DialogueError::NodeNotFound`] if the key is absent (cursor stays
    ///   unset).
    pub fn start_at(&mut self, key: &str) -> Result<(), DialogueError> {
        if self.cursor.is_some() {
            return Err(DialogueError::AlreadyActive);
        }
        if !self.nodes.contains_key(key) {
            return Err(DialogueError::NodeNotFound(key.to_string()));
        }
        self.transcript.clear();
        self.cursor = Some(key.to_string());
        info!("dialogue started at node '{key}'");
        Ok(())
    }

    /// Follow a linear node's declared successor. A `Normal` node without
    /// one keeps the cursor where it is (callers detect the lack of
    /// progress); choice and terminal nodes have nothing to follow and are
    /// also left in place.
    ///
    /// # Errors
    /// - [`DialogueError::NotActive`] if no dialogue is in progress.
    pub fn advance(&mut self) -> Result<(), DialogueError> {
        let current = self.current_node().ok_or(DialogueError::NotActive)?;
        if let NodeKind::Normal { next: Some(next) } = &current.kind {
            let next = next.clone();
            self.cursor = Some(next);
        }
        Ok(())
    }

    /// Resolve a decision point. The label must exactly match one of the
    /// current node's options; on success it is appended to the transcript,
    /// the cursor moves to the mapped successor, and the consequences of
    /// the node being *left* are returned for the caller to apply.
    ///
    /// # Errors
    /// - [`DialogueError::NotActive`] if no dialogue is in progress.
    /// - [`DialogueError::InvalidChoice`] if the label isn't an option here
    ///   (including any label offered at a non-choice node); the cursor is
    ///   unchanged and the caller should re-prompt.
    pub fn resolve_choice(&mut self, label: &str) -> Result<Vec<Consequence>, DialogueError> {
        let current = self.current_node().ok_or(DialogueError::NotActive)?;
        let NodeKind::Choice { options } = &current.kind else {
            return Err(DialogueError::InvalidChoice(label.to_string()));
        };
        let Some((_, target)) = options.iter().find(|(option, _)| option == label) else {
            return Err(DialogueError::InvalidChoice(label.to_string()));
        };
        let target = target.clone();
        let consequences = current.consequences.clone();
        self.transcript.push(label.to_string());
        info!("choice '{label}' resolved; cursor now at '{target}'");
        self.cursor = Some(target);
        Ok(consequences)
    }

    /// Clear the cursor, returning the tree to inactive. Valid from any
    /// active state; from a terminal it is the only meaningful operation.
    ///
    /// # Errors
    /// - [`DialogueError::NotActive`] if nothing was in progress.
    pub fn stop(&mut self) -> Result<(), DialogueError> {
        if self.cursor.take().is_none() {
            return Err(DialogueError::NotActive);
        }
        info!("dialogue stopped");
        Ok(())
    }

    /// The node under the cursor, or `None` when inactive.
    pub fn current_node(&self) -> Option<&DialogueNode> {
        self.cursor.as_ref().and_then(|key| self.nodes.get(key))
    }

    /// The cursor key itself, or `None` when inactive.
    pub fn cursor(&self) -> Option<&Id> {
        self.cursor.as_ref()
    }

    /// Derived state of the machine.
    pub fn state(&self) -> DialogueState {
        match self.current_node() {
            None => DialogueState::Inactive,
            Some(node) => match &node.kind {
                NodeKind::Normal { .. } => DialogueState::AtNormal,
                NodeKind::Choice { .. } => DialogueState::AtChoice,
                NodeKind::End => DialogueState::AtEnd,
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.cursor.is_some()
    }

    /// Choice labels recorded during the current run, oldest first.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Look up a node by key.
    pub fn node(&self, key: &str) -> Option<&DialogueNode> {
        self.nodes.get(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
