use antics_core::{GameState, Move};
use std::iter;

/// A node of a search tree.
///
/// Children borrow their parent, so a tree lives on the stack of the search
/// call that built it and cannot form cycles.
#[derive(Debug)]
pub struct TreeNode<'p> {
    /// The move that produced `state`; None at the root.
    pub mv: Option<Move>,
    pub state: GameState,
    pub value: f64,
    pub parent: Option<&'p TreeNode<'p>>,
}

impl<'p> TreeNode<'p> {
    pub fn root(state: GameState, value: f64) -> Self {
        Self {
            mv: None,
            state,
            value,
            parent: None,
        }
    }

    pub fn child(parent: &'p TreeNode<'p>, mv: Move, state: GameState, value: f64) -> Self {
        Self {
            mv: Some(mv),
            state,
            value,
            parent: Some(parent),
        }
    }

    /// Number of plies between this node and the root.
    pub fn depth(&self) -> u8 {
        self.ancestors().count() as u8
    }

    fn ancestors(&self) -> impl Iterator<Item = &'p TreeNode<'p>> {
        iter::successors(self.parent, |node| node.parent)
    }

    /// Moves from the root down to this node.
    pub fn line(&self) -> Vec<&Move> {
        let mut line: Vec<&Move> = self.mv.iter().collect();
        for node in self.ancestors() {
            if let Some(mv) = &node.mv {
                line.push(mv);
            }
        }
        line.reverse();
        line
    }
}
