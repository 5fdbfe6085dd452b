use antics_agents::{
    simulate, AlphaBeta, BestFirst, Bookkeeping, Evaluator, Greedy, SearchLimits, SearchStrategy,
};
use antics_core::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::cell::RefCell;
use std::collections::HashSet;

const P1_START: Coord = Coord::new(1, 1);
const P2_START: Coord = Coord::new(8, 8);

/// Each turn the mover's worker takes one step of 1-3 cells, along x on
/// its first turn and along y on its second, then ends the turn.
/// Every line of play reaches a different position.
struct Script;

impl RulesEngine for Script {
    fn legal_moves(&self, state: &GameState) -> Vec<Move> {
        let Some(worker) = state.mover().workers().next() else {
            return vec![Move::End];
        };
        let (start, dir) = match state.whose_turn {
            PlayerId::One => (P1_START, 1i16),
            _ => (P2_START, -1i16),
        };
        let at = worker.coords;
        let step = |k: i16| -> Option<Coord> {
            if at.x == start.x {
                Some(Coord::new((at.x as i16 + dir * k) as u8, at.y))
            } else if at.y == start.y {
                Some(Coord::new(at.x, (at.y as i16 + dir * k) as u8))
            } else {
                None
            }
        };

        if worker.has_moved || step(1).is_none() {
            return vec![Move::End];
        }
        (1..=3)
            .filter_map(step)
            .map(|to| Move::move_ant(vec![at, to]))
            .collect()
    }
}

type Seen = (Coord, Coord, PlayerId, bool);

/// Gives every position its own value in [0.05, 0.95) and records what
/// it was asked about.
#[derive(Default)]
struct Recorder {
    seen: RefCell<HashSet<Seen>>,
}

impl Recorder {
    fn workers(state: &GameState) -> (Coord, Coord) {
        let at = |player| {
            state
                .inventory(player)
                .workers()
                .next()
                .map_or(Coord::new(0, 0), |w| w.coords)
        };
        (at(PlayerId::One), at(PlayerId::Two))
    }
}

impl Evaluator for Recorder {
    fn evaluate_for(&self, state: &GameState, player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
        let (one, two) = Self::workers(state);
        let moved = state.mover().workers().any(|w| w.has_moved);
        self.seen
            .borrow_mut()
            .insert((one, two, state.whose_turn, moved));

        let cells = [one.x, one.y, two.x, two.y]
            .iter()
            .fold(0u64, |acc, &c| acc * 10 + c as u64);
        let code = cells * 4 + (player == PlayerId::Two) as u64 * 2 + moved as u64;
        // 100003 is prime and above every code, so no two codes collide.
        0.05 + 0.9 * ((code * 7919) % 100003) as f64 / 100003.0
    }
}

fn start() -> GameState {
    StateBuilder::new()
        .ant(PlayerId::One, AntType::Queen, Coord::new(0, 0))
        .ant(PlayerId::One, AntType::Worker, P1_START)
        .ant(PlayerId::Two, AntType::Queen, Coord::new(9, 9))
        .ant(PlayerId::Two, AntType::Worker, P2_START)
        .build()
}

struct Exhaustive {
    value: f64,
    best_move: Option<Move>,
    nodes: u64,
    seen: HashSet<Seen>,
}

/// Plain minimax over every line, scoring the root and every child the
/// way alpha-beta does.
fn exhaustive(max_depth: u8) -> Exhaustive {
    let evaluator = Recorder::default();
    let mut rng = StdRng::seed_from_u64(1);
    let mut nodes = 0;
    let root = start();
    evaluator.evaluate(&root, &Script);
    let (value, best_move) = minimax(
        &root,
        0,
        max_depth,
        PlayerId::One,
        &evaluator,
        &mut rng,
        &mut nodes,
    );
    Exhaustive {
        value,
        best_move,
        nodes,
        seen: evaluator.seen.into_inner(),
    }
}

fn minimax(
    state: &GameState,
    depth: u8,
    max_depth: u8,
    me: PlayerId,
    evaluator: &Recorder,
    rng: &mut dyn RngCore,
    nodes: &mut u64,
) -> (f64, Option<Move>) {
    *nodes += 1;
    let score = |s: &GameState| {
        let v = evaluator.evaluate(s, &Script);
        if s.whose_turn == me {
            v
        } else {
            1.0 - v
        }
    };
    if depth >= max_depth {
        return (score(state), None);
    }

    let maximizing = state.whose_turn == me;
    let mut best: Option<(f64, Move)> = None;
    for mv in Script.legal_moves(state) {
        let Some(next) = simulate(state, &mv, rng, Bookkeeping::FullTurn) else {
            continue;
        };
        // Alpha-beta scores every child for move ordering.
        score(&next);
        let (value, _) = minimax(&next, depth + 1, max_depth, me, evaluator, rng, nodes);
        let better = match &best {
            None => true,
            Some((top, _)) if maximizing => value > *top,
            Some((top, _)) => value < *top,
        };
        if better {
            best = Some((value, mv));
        }
    }
    match best {
        Some((value, mv)) => (value, Some(mv)),
        None => (score(state), None),
    }
}

#[test]
fn test_script_offers_one_step_per_turn() {
    let moves = Script.legal_moves(&start());
    assert_eq!(moves.len(), 3);
    assert!(moves.iter().all(|mv| !mv.is_end()));
}

#[test]
fn test_recorder_tells_positions_apart() {
    let base = start();
    let mut moved_two = base.clone();
    for ant in moved_two.inventory_mut(PlayerId::Two).ants.iter_mut() {
        if ant.ant_type == AntType::Worker {
            ant.coords = Coord::new(8, 5);
        }
    }
    let recorder = Recorder::default();
    let before = recorder.evaluate(&base, &Script);
    let after = recorder.evaluate(&moved_two, &Script);
    assert_ne!(before, after);
    assert_eq!(recorder.seen.borrow().len(), 2);
}

#[test]
fn test_alpha_beta_matches_exhaustive_minimax() {
    for max_depth in [2u8, 4, 6] {
        let full = exhaustive(max_depth);

        let pruned = Recorder::default();
        let mut rng = StdRng::seed_from_u64(1);
        let result = AlphaBeta::new(SearchLimits::depth(max_depth)).search(
            &start(),
            &Script,
            &pruned,
            &mut rng,
        );

        assert_eq!(result.best_move, full.best_move, "depth {}", max_depth);
        assert!((result.score - full.value).abs() < 1e-12, "depth {}", max_depth);
        assert!(result.nodes <= full.nodes);
        assert!(
            pruned.seen.borrow().is_subset(&full.seen),
            "depth {}",
            max_depth
        );
    }
}

#[test]
fn test_alpha_beta_prunes_deep_trees() {
    let full = exhaustive(6);
    let mut rng = StdRng::seed_from_u64(1);
    let result =
        AlphaBeta::new(SearchLimits::depth(6)).search(&start(), &Script, &Recorder::default(), &mut rng);
    assert!(result.nodes < full.nodes, "{} vs {}", result.nodes, full.nodes);
}

struct Floor;

impl Evaluator for Floor {
    fn evaluate_for(&self, _state: &GameState, _player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
        0.0
    }
}

#[test]
fn test_every_strategy_moves_when_all_scores_are_floor() {
    let moves = vec![
        Move::move_ant(vec![P1_START, Coord::new(1, 2)]),
        Move::move_ant(vec![P1_START, Coord::new(2, 1)]),
    ];
    let rules = FixedMoves::new(moves.clone());
    let mut strategies: Vec<Box<dyn SearchStrategy>> = vec![
        Box::new(Greedy::new()),
        Box::new(BestFirst::new(SearchLimits::depth(2))),
        Box::new(AlphaBeta::new(SearchLimits::depth(2))),
    ];

    for strategy in strategies.iter_mut() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = strategy.search(&start(), &rules, &Floor, &mut rng);
        let chosen = result.best_move.expect("a move is always returned");
        assert!(moves.contains(&chosen), "{} chose {}", strategy.name(), chosen);
    }
}

/// Scores 1.0 once the mover's worker reaches (1, 3).
struct Goal;

impl Evaluator for Goal {
    fn evaluate_for(&self, state: &GameState, player: PlayerId, _rules: &dyn RulesEngine) -> f64 {
        let reached = state
            .inventory(player)
            .workers()
            .any(|w| w.coords == Coord::new(1, 3));
        if reached {
            1.0
        } else {
            0.5
        }
    }
}

#[test]
fn test_every_strategy_takes_an_immediate_win() {
    let winning = Move::move_ant(vec![P1_START, Coord::new(1, 3)]);
    let moves = vec![
        Move::move_ant(vec![P1_START, Coord::new(2, 1)]),
        winning.clone(),
        Move::move_ant(vec![P1_START, Coord::new(1, 2)]),
    ];
    let rules = FixedMoves::new(moves);
    let mut strategies: Vec<Box<dyn SearchStrategy>> = vec![
        Box::new(Greedy::new()),
        Box::new(BestFirst::new(SearchLimits::depth(3))),
        Box::new(AlphaBeta::new(SearchLimits::depth(3))),
    ];

    for strategy in strategies.iter_mut() {
        let mut rng = StdRng::seed_from_u64(2);
        let result = strategy.search(&start(), &rules, &Goal, &mut rng);
        assert_eq!(result.best_move, Some(winning.clone()), "{}", strategy.name());
        assert_eq!(result.score, 1.0);
    }
}

#[test]
fn test_alpha_beta_win_stops_at_root() {
    let winning = Move::move_ant(vec![P1_START, Coord::new(1, 3)]);
    let rules = FixedMoves::new(vec![
        winning.clone(),
        Move::move_ant(vec![P1_START, Coord::new(2, 1)]),
    ]);
    let mut rng = StdRng::seed_from_u64(2);
    let result = AlphaBeta::new(SearchLimits::depth(4)).search(&start(), &rules, &Goal, &mut rng);
    assert_eq!(result.best_move, Some(winning));
    assert_eq!(result.nodes, 1);
}
