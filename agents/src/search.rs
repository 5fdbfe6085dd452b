use crate::evaluation::Evaluator;
use antics_core::{GameState, Move, PlayerId, RulesEngine};
use log::warn;
use rand::RngCore;
use std::time::{Duration, Instant};

const TIME_CHECK_INTERVAL: u64 = 64; // Check the clock every 64 nodes

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: f64,
    pub depth: u8,
    pub nodes: u64,
    pub stopped: bool,
}

impl SearchResult {
    pub(crate) fn empty(depth: u8) -> Self {
        Self {
            best_move: None,
            score: 0.0,
            depth,
            nodes: 0,
            stopped: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchLimits {
    pub max_depth: u8,
    pub move_time: Option<Duration>,
    pub nodes: Option<u64>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> Self {
        Self {
            max_depth: depth,
            move_time: None,
            nodes: None,
        }
    }

    pub fn with_move_time(mut self, millis: u64) -> Self {
        self.move_time = Some(Duration::from_millis(millis));
        self
    }

    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.nodes = Some(nodes);
        self
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(2)
    }
}

/// Per-search bookkeeping: node count and budget checks.
pub struct SearchInfo {
    start_time: Instant,
    pub limits: SearchLimits,
    pub nodes: u64,
    pub stopped: bool,
}

impl SearchInfo {
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            start_time: Instant::now(),
            limits,
            nodes: 0,
            stopped: false,
        }
    }

    /// Checked before each expansion. Once true, stays true.
    pub fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }

        // Check node limit
        if let Some(max_nodes) = self.limits.nodes {
            if self.nodes >= max_nodes {
                self.stopped = true;
                return true;
            }
        }

        // Check time limit periodically
        if self.nodes % TIME_CHECK_INTERVAL == 0 {
            if let Some(move_time) = self.limits.move_time {
                if self.start_time.elapsed() >= move_time {
                    self.stopped = true;
                    return true;
                }
            }
        }

        false
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// How search updates turn flags between simulated moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bookkeeping {
    /// Mark the moved ant after MOVE_ANT; clear every flag after END.
    FullTurn,
    /// Keep the given player to move and clear every flag after each move.
    Pinned(PlayerId),
}

/// Applies `mv` and the search-side turn bookkeeping.
///
/// Returns None when the rules engine produced a move the state cannot take.
pub fn simulate(
    state: &GameState,
    mv: &Move,
    rng: &mut dyn RngCore,
    bookkeeping: Bookkeeping,
) -> Option<GameState> {
    let mut next = match state.apply_move(mv, rng) {
        Ok(next) => next,
        Err(err) => {
            warn!("skipping move '{}': {}", mv, err);
            return None;
        }
    };

    match bookkeeping {
        Bookkeeping::FullTurn => match mv {
            Move::MoveAnt { .. } => {
                if let Some(to) = mv.to() {
                    let mover = state.whose_turn;
                    if let Some(ant) = next
                        .inventory_mut(mover)
                        .ants
                        .iter_mut()
                        .find(|ant| ant.coords == to)
                    {
                        ant.has_moved = true;
                    }
                }
            }
            Move::End => next.clear_moved_flags(),
            Move::Build { .. } => {}
        },
        Bookkeeping::Pinned(player) => {
            next.whose_turn = player;
            next.clear_moved_flags();
        }
    }

    Some(next)
}

/// Returns true for a MOVE_ANT of the mover's queen while she stands on no
/// construction; search skips these since the queen is already safe.
pub fn is_safe_queen_move(state: &GameState, mv: &Move) -> bool {
    let (Some(from), Some(queen)) = (mv.from(), state.mover().queen()) else {
        return false;
    };
    queen.coords == from && state.constr_at(from).is_none()
}

/// A move-selection strategy over a shared evaluator and rules engine.
pub trait SearchStrategy {
    fn search(
        &mut self,
        state: &GameState,
        rules: &dyn RulesEngine,
        evaluator: &dyn Evaluator,
        rng: &mut dyn RngCore,
    ) -> SearchResult;

    fn name(&self) -> String;
}
