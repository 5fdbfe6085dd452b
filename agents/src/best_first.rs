use crate::evaluation::{Evaluator, LOSS, WIN};
use crate::search::*;
use crate::tree::TreeNode;
use antics_core::{GameState, Move, PlayerId, RulesEngine};
use log::debug;
use rand::RngCore;

pub const DEFAULT_EXPANSION_THRESHOLD: f64 = 0.98;

/// Depth-limited best-first search.
///
/// Every simulated move keeps the searching player to move, so the tree
/// explores sequences of own moves. Below the depth limit only children
/// scoring at least `expansion_threshold` times the best sibling are
/// searched further; the rest are dropped.
#[derive(Debug, Clone)]
pub struct BestFirst {
    limits: SearchLimits,
    expansion_threshold: f64,
    prune_safe_queen: bool,
}

struct Context<'a> {
    me: PlayerId,
    rules: &'a dyn RulesEngine,
    evaluator: &'a dyn Evaluator,
    rng: &'a mut dyn RngCore,
    info: SearchInfo,
}

impl BestFirst {
    pub fn new(limits: SearchLimits) -> Self {
        Self {
            limits,
            expansion_threshold: DEFAULT_EXPANSION_THRESHOLD,
            prune_safe_queen: true,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.expansion_threshold = threshold;
        self
    }

    pub fn with_queen_pruning(mut self, prune: bool) -> Self {
        self.prune_safe_queen = prune;
        self
    }

    fn candidates(&self, state: &GameState, rules: &dyn RulesEngine) -> Vec<Move> {
        let moves = rules.legal_moves(state);
        if !self.prune_safe_queen {
            return moves;
        }
        let kept: Vec<Move> = moves
            .iter()
            .filter(|mv| !is_safe_queen_move(state, mv))
            .cloned()
            .collect();
        if kept.is_empty() {
            moves
        } else {
            kept
        }
    }

    /// Returns the node's value and the move leading to its best child.
    fn explore(&self, node: &TreeNode<'_>, ctx: &mut Context<'_>) -> (f64, Option<Move>) {
        ctx.info.nodes += 1;

        let mut children = Vec::new();
        for mv in self.candidates(&node.state, ctx.rules) {
            let Some(next) = simulate(&node.state, &mv, ctx.rng, Bookkeeping::Pinned(ctx.me))
            else {
                continue;
            };
            let value = ctx.evaluator.evaluate(&next, ctx.rules);
            if value == WIN {
                return (WIN, Some(mv));
            }
            children.push(TreeNode::child(node, mv, next, value));
        }

        // The first child with the highest one-ply value.
        let mut best_one_ply: Option<&TreeNode> = None;
        for child in &children {
            if best_one_ply.map_or(true, |best| child.value > best.value) {
                best_one_ply = Some(child);
            }
        }
        let Some(best_one_ply) = best_one_ply else {
            return (LOSS, None);
        };

        let leaves = node.depth() + 1 >= self.limits.max_depth;
        if leaves || ctx.info.should_stop() {
            return (best_one_ply.value.max(LOSS), best_one_ply.mv.clone());
        }

        let cutoff = self.expansion_threshold * best_one_ply.value;
        let mut best_value = LOSS;
        let mut best_move = best_one_ply.mv.clone();
        for child in children.iter().filter(|child| child.value >= cutoff) {
            let value = if child.state.is_terminal() {
                child.value
            } else {
                self.explore(child, ctx).0
            };
            if value > best_value {
                best_value = value;
                best_move = child.mv.clone();
            }
            if ctx.info.should_stop() {
                break;
            }
        }
        (best_value, best_move)
    }
}

impl SearchStrategy for BestFirst {
    fn search(
        &mut self,
        state: &GameState,
        rules: &dyn RulesEngine,
        evaluator: &dyn Evaluator,
        rng: &mut dyn RngCore,
    ) -> SearchResult {
        let me = state.whose_turn;
        let root = TreeNode::root(state.clone(), evaluator.evaluate(state, rules));
        let mut ctx = Context {
            me,
            rules,
            evaluator,
            rng,
            info: SearchInfo::new(self.limits.clone()),
        };

        let (score, best_move) = self.explore(&root, &mut ctx);
        debug!(
            "best-first: {} scored {:.4} ({} nodes, {:?})",
            best_move.as_ref().map_or("no move".to_string(), |mv| mv.to_string()),
            score,
            ctx.info.nodes,
            ctx.info.elapsed()
        );

        SearchResult {
            best_move,
            score,
            depth: self.limits.max_depth,
            nodes: ctx.info.nodes,
            stopped: ctx.info.stopped,
        }
    }

    fn name(&self) -> String {
        format!("BestFirst(depth={})", self.limits.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antics_core::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    /// Offers each of the mover's ants a step right or down, then END.
    struct Steps;

    impl RulesEngine for Steps {
        fn legal_moves(&self, state: &GameState) -> Vec<Move> {
            let mut moves = Vec::new();
            for ant in &state.mover().ants {
                let from = ant.coords;
                for (dx, dy) in [(1i16, 0i16), (0, 1)] {
                    let x = from.x as i16 + dx;
                    let y = from.y as i16 + dy;
                    if let Some(to) = Coord::checked(x as u8, y as u8) {
                        if state.ant_at(to).is_none() {
                            moves.push(Move::move_ant(vec![from, to]));
                        }
                    }
                }
            }
            moves.push(Move::End);
            moves
        }
    }

    /// Looks up the worker's cell in a table; 0.3 elsewhere.
    struct Table(HashMap<Coord, f64>);

    impl Evaluator for Table {
        fn evaluate_for(&self, state: &GameState, player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
            state
                .inventory(player)
                .workers()
                .next()
                .and_then(|w| self.0.get(&w.coords).copied())
                .unwrap_or(0.3)
        }
    }

    fn setup() -> GameState {
        StateBuilder::new()
            .ant(PlayerId::One, AntType::Queen, Coord::new(9, 0))
            .ant(PlayerId::One, AntType::Worker, Coord::new(0, 0))
            .ant(PlayerId::Two, AntType::Queen, Coord::new(9, 9))
            .build()
    }

    fn run(table: Vec<(Coord, f64)>, depth: u8) -> SearchResult {
        let eval = Table(table.into_iter().collect());
        let mut rng = StdRng::seed_from_u64(5);
        BestFirst::new(SearchLimits::depth(depth)).search(&setup(), &Steps, &eval, &mut rng)
    }

    #[test]
    fn test_lookahead_beats_one_ply() {
        // (1,0) looks best now, but only (0,1) leads on to (0,2).
        let table = vec![
            (Coord::new(1, 0), 0.6),
            (Coord::new(0, 1), 0.595),
            (Coord::new(0, 2), 0.9),
        ];
        let one_ply = run(table.clone(), 1);
        assert_eq!(
            one_ply.best_move,
            Some(Move::move_ant(vec![Coord::new(0, 0), Coord::new(1, 0)]))
        );

        let two_ply = run(table, 2);
        assert_eq!(
            two_ply.best_move,
            Some(Move::move_ant(vec![Coord::new(0, 0), Coord::new(0, 1)]))
        );
        assert!((two_ply.score - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_drops_weak_children() {
        // (0,1) is under 98% of 0.6, so (0,2) is never seen.
        let table = vec![
            (Coord::new(1, 0), 0.6),
            (Coord::new(0, 1), 0.5),
            (Coord::new(0, 2), 0.95),
        ];
        let result = run(table, 2);
        assert_eq!(
            result.best_move,
            Some(Move::move_ant(vec![Coord::new(0, 0), Coord::new(1, 0)]))
        );
        assert!((result.score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_win_short_circuits() {
        let table = vec![(Coord::new(0, 1), 1.0), (Coord::new(1, 0), 0.7)];
        let result = run(table, 3);
        assert_eq!(result.score, 1.0);
        assert_eq!(
            result.best_move,
            Some(Move::move_ant(vec![Coord::new(0, 0), Coord::new(0, 1)]))
        );
        assert_eq!(result.nodes, 1);
    }

    #[test]
    fn test_safe_queen_moves_pruned() {
        let table = vec![(Coord::new(1, 0), 0.4)];
        let result = run(table, 1);
        let best = result.best_move.unwrap();
        assert_ne!(best.from(), Some(Coord::new(9, 0)));
    }

    struct Zero;

    impl Evaluator for Zero {
        fn evaluate_for(&self, _state: &GameState, _player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_all_floor_still_moves() {
        let rules = FixedMoves::new(vec![Move::End]);
        let mut rng = StdRng::seed_from_u64(5);
        let result = BestFirst::new(SearchLimits::depth(2)).search(&setup(), &rules, &Zero, &mut rng);
        assert_eq!(result.best_move, Some(Move::End));
        assert_eq!(result.score, 0.0);
    }
}
