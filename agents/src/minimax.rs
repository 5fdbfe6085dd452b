use crate::evaluation::{Evaluator, LOSS, WIN};
use crate::search::*;
use crate::tree::TreeNode;
use antics_core::{GameState, Move, PlayerId, RulesEngine};
use log::debug;
use rand::RngCore;

const INFINITY: f64 = f64::INFINITY;

/// Default number of ants past which BUILD moves are not searched.
pub const DEFAULT_BUILD_ANT_CAP: usize = 3;

/// Minimax with alpha-beta pruning over whole turns.
///
/// A node is MAX when the searching player is to move in it. Every value is
/// kept from the searching player's point of view: states where the
/// opponent is to move are scored as `1 - evaluate(state)`.
#[derive(Debug, Clone)]
pub struct AlphaBeta {
    limits: SearchLimits,
    prune_safe_queen: bool,
    build_ant_cap: Option<usize>,
    branch_limit: Option<usize>,
}

struct Context<'a> {
    me: PlayerId,
    rules: &'a dyn RulesEngine,
    evaluator: &'a dyn Evaluator,
    rng: &'a mut dyn RngCore,
    info: SearchInfo,
}

impl Context<'_> {
    fn score(&self, state: &GameState) -> f64 {
        let value = self.evaluator.evaluate(state, self.rules);
        if state.whose_turn == self.me {
            value
        } else {
            1.0 - value
        }
    }
}

impl AlphaBeta {
    pub fn new(limits: SearchLimits) -> Self {
        AlphaBeta {
            limits,
            prune_safe_queen: true,
            build_ant_cap: Some(DEFAULT_BUILD_ANT_CAP),
            branch_limit: None,
        }
    }

    pub fn with_queen_pruning(mut self, prune: bool) -> Self {
        self.prune_safe_queen = prune;
        self
    }

    pub fn with_build_ant_cap(mut self, cap: Option<usize>) -> Self {
        self.build_ant_cap = cap;
        self
    }

    /// Only search the best `limit` children of each node.
    pub fn with_branch_limit(mut self, limit: Option<usize>) -> Self {
        self.branch_limit = limit;
        self
    }

    fn candidates(&self, state: &GameState, rules: &dyn RulesEngine) -> Vec<Move> {
        let moves = rules.legal_moves(state);
        let crowded = self
            .build_ant_cap
            .is_some_and(|cap| state.mover().ants.len() >= cap);

        let kept: Vec<Move> = moves
            .iter()
            .filter(|mv| !(self.prune_safe_queen && is_safe_queen_move(state, mv)))
            .filter(|mv| !(crowded && mv.is_build()))
            .cloned()
            .collect();

        if kept.is_empty() {
            moves
        } else {
            kept
        }
    }

    fn alpha_beta(
        &self,
        node: &TreeNode<'_>,
        mut alpha: f64,
        mut beta: f64,
        ctx: &mut Context<'_>,
    ) -> (f64, Option<Move>) {
        ctx.info.nodes += 1;

        let depth = node.depth();
        if depth > 0 && (depth >= self.limits.max_depth || node.state.is_terminal()) {
            return (node.value, None);
        }

        let maximizing = node.state.whose_turn == ctx.me;
        let mut children = Vec::new();
        for mv in self.candidates(&node.state, ctx.rules) {
            let Some(next) = simulate(&node.state, &mv, ctx.rng, Bookkeeping::FullTurn) else {
                continue;
            };
            let value = ctx.score(&next);

            // A decided game cannot be improved on for the side to move.
            if (maximizing && value == WIN) || (!maximizing && value == LOSS) {
                return (value, Some(mv));
            }
            children.push(TreeNode::child(node, mv, next, value));
        }

        if children.is_empty() {
            return (node.value, None);
        }

        // Move ordering: most promising first for whoever is to move.
        if maximizing {
            children.sort_by(|a, b| b.value.total_cmp(&a.value));
        } else {
            children.sort_by(|a, b| a.value.total_cmp(&b.value));
        }
        if let Some(limit) = self.branch_limit {
            children.truncate(limit.max(1));
        }

        let mut best_move = children[0].mv.clone();
        let mut best_score = if maximizing { -INFINITY } else { INFINITY };

        for child in &children {
            if ctx.info.should_stop() {
                break;
            }

            let (score, _) = self.alpha_beta(child, alpha, beta, ctx);

            if maximizing {
                if score > best_score {
                    best_score = score;
                    best_move = child.mv.clone();
                }
                alpha = alpha.max(score);
            } else {
                if score < best_score {
                    best_score = score;
                    best_move = child.mv.clone();
                }
                beta = beta.min(score);
            }

            if alpha >= beta {
                break;
            }
        }

        // Stopped before any child was searched.
        if best_score.is_infinite() {
            best_score = children[0].value;
        }

        (best_score, best_move)
    }
}

impl SearchStrategy for AlphaBeta {
    fn search(
        &mut self,
        state: &GameState,
        rules: &dyn RulesEngine,
        evaluator: &dyn Evaluator,
        rng: &mut dyn RngCore,
    ) -> SearchResult {
        let mut ctx = Context {
            me: state.whose_turn,
            rules,
            evaluator,
            rng,
            info: SearchInfo::new(self.limits.clone()),
        };
        let root = TreeNode::root(state.clone(), ctx.score(state));

        let (score, best_move) = self.alpha_beta(&root, -INFINITY, INFINITY, &mut ctx);
        debug!(
            "alpha-beta: {} scored {:.4} ({} nodes, {:?}{})",
            best_move.as_ref().map_or("no move".to_string(), |mv| mv.to_string()),
            score,
            ctx.info.nodes,
            ctx.info.elapsed(),
            if ctx.info.stopped { ", stopped" } else { "" }
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
        format!("AlphaBeta(depth={})", self.limits.max_depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antics_core::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> GameState {
        StateBuilder::new()
            .ant(PlayerId::One, AntType::Queen, Coord::new(0, 0))
            .ant(PlayerId::One, AntType::Worker, Coord::new(2, 2))
            .constr(PlayerId::One, ConstrType::Anthill, Coord::new(0, 0))
            .ant(PlayerId::Two, AntType::Queen, Coord::new(9, 9))
            .build()
    }

    /// Rewards the mover's worker for standing further right.
    struct Rightward;

    impl Evaluator for Rightward {
        fn evaluate_for(&self, state: &GameState, player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
            state
                .inventory(player)
                .workers()
                .next()
                .map_or(0.2, |w| 0.3 + w.coords.x as f64 / 20.0)
        }
    }

    #[test]
    fn test_build_moves_pruned_when_crowded() {
        let mut state = setup();
        state.inventory_mut(PlayerId::One).food_count = 5;
        let build = Move::build_ant(AntType::Worker, Coord::new(0, 0));
        let step = Move::move_ant(vec![Coord::new(2, 2), Coord::new(3, 2)]);
        let rules = FixedMoves::new(vec![build.clone(), step.clone(), Move::End]);

        let search = AlphaBeta::new(SearchLimits::depth(1)).with_build_ant_cap(Some(2));
        let kept = search.candidates(&state, &rules);
        assert!(!kept.contains(&build));
        assert!(kept.contains(&step));

        let open = AlphaBeta::new(SearchLimits::depth(1)).with_build_ant_cap(Some(3));
        assert!(open.candidates(&state, &rules).contains(&build));
    }

    #[test]
    fn test_pruning_falls_back_to_all_moves() {
        let state = StateBuilder::new()
            .ant(PlayerId::One, AntType::Queen, Coord::new(4, 4))
            .ant(PlayerId::Two, AntType::Queen, Coord::new(9, 9))
            .build();
        let queen_step = Move::move_ant(vec![Coord::new(4, 4), Coord::new(4, 5)]);
        let rules = FixedMoves::new(vec![queen_step.clone()]);
        let search = AlphaBeta::new(SearchLimits::depth(1));
        assert_eq!(search.candidates(&state, &rules), vec![queen_step]);
    }

    #[test]
    fn test_one_ply_picks_best_child() {
        let moves = vec![
            Move::move_ant(vec![Coord::new(2, 2), Coord::new(1, 2)]),
            Move::move_ant(vec![Coord::new(2, 2), Coord::new(4, 2)]),
            Move::move_ant(vec![Coord::new(2, 2), Coord::new(3, 2)]),
        ];
        let rules = FixedMoves::new(moves.clone());
        let mut rng = StdRng::seed_from_u64(11);
        let result = AlphaBeta::new(SearchLimits::depth(1)).search(&setup(), &rules, &Rightward, &mut rng);
        assert_eq!(result.best_move, Some(moves[1].clone()));
        assert!((result.score - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_end_scored_from_opponent_view() {
        // After END the opponent moves; their worker-less view scores 0.2,
        // which is 0.8 for us and beats any one-ply step.
        let step = Move::move_ant(vec![Coord::new(2, 2), Coord::new(3, 2)]);
        let rules = FixedMoves::new(vec![step, Move::End]);
        let mut rng = StdRng::seed_from_u64(11);
        let result = AlphaBeta::new(SearchLimits::depth(1)).search(&setup(), &rules, &Rightward, &mut rng);
        assert_eq!(result.best_move, Some(Move::End));
        assert!((result.score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_node_budget_still_returns_move() {
        let moves = vec![
            Move::move_ant(vec![Coord::new(2, 2), Coord::new(3, 2)]),
            Move::End,
        ];
        let rules = FixedMoves::new(moves);
        let mut rng = StdRng::seed_from_u64(11);
        let limits = SearchLimits::depth(4).with_nodes(1);
        let result = AlphaBeta::new(limits).search(&setup(), &rules, &Rightward, &mut rng);
        assert!(result.stopped);
        assert_eq!(result.best_move, Some(Move::End));
    }
}
