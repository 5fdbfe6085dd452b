use antics_core::*;
use serde::{Deserialize, Serialize};

/// Score of a state the player has won.
pub const WIN: f64 = 1.0;
/// Score of a state the player has lost.
pub const LOSS: f64 = 0.0;
/// Starting point of every heuristic sum.
pub const NEUTRAL: f64 = 0.5;

/// Distance from either terminal value that non-terminal scores never cross.
pub(crate) const OPEN_MARGIN: f64 = 1e-9;

/// Maps a state to a desirability in [0, 1].
///
/// Exactly 0.0 and 1.0 are reserved for lost and won states.
pub trait Evaluator {
    /// Scores `state` from `player`'s point of view.
    fn evaluate_for(&self, state: &GameState, player: PlayerId, rules: &dyn RulesEngine) -> f64;

    /// Scores `state` from the point of view of the player to move.
    fn evaluate(&self, state: &GameState, rules: &dyn RulesEngine) -> f64 {
        self.evaluate_for(state, state.whose_turn, rules)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate_for(&self, state: &GameState, player: PlayerId, rules: &dyn RulesEngine) -> f64 {
        (**self).evaluate_for(state, player, rules)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate_for(&self, state: &GameState, player: PlayerId, rules: &dyn RulesEngine) -> f64 {
        (**self).evaluate_for(state, player, rules)
    }
}

/// Pulls a non-terminal score off the reserved 0.0 and 1.0.
fn open(value: f64) -> f64 {
    value.clamp(OPEN_MARGIN, 1.0 - OPEN_MARGIN)
}

/// Returns 1.0 or 0.0 if the game is decided for `player`.
pub fn terminal_value(state: &GameState, player: PlayerId) -> Option<f64> {
    state.outcome_for(player).map(|outcome| match outcome {
        Outcome::Won => WIN,
        Outcome::Lost => LOSS,
    })
}

/// How a heuristic measures distance between two cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// The rules engine's path cost.
    Steps,
    Manhattan,
}

/// What happens when a penalised condition holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    /// Stop scoring and return this value.
    Floor(f64),
    /// Subtract this amount (per offending unit where a count applies).
    Subtract(f64),
}

/// Which tiles count as "the queen is standing on a construction".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueenTiles {
    AnyConstruction,
    OwnAnthill,
    DropOffsAndFood,
}

/// Where attackers are drawn towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackTarget {
    EnemyQueen,
    NearestEnemy,
}

/// Remaps out-of-range sums into the open interval (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampBand {
    /// Negative sums become `floor + sum * floor_scale`.
    pub floor: f64,
    pub floor_scale: f64,
    /// Sums above 1.0 become this.
    pub ceiling: f64,
}

impl Default for ClampBand {
    fn default() -> Self {
        Self {
            floor: 0.001,
            floor_scale: 0.0001,
            ceiling: 0.999,
        }
    }
}

impl ClampBand {
    pub fn apply(&self, value: f64) -> f64 {
        let value = if value < 0.0 {
            self.floor + value * self.floor_scale
        } else if value > 1.0 {
            self.ceiling
        } else {
            value
        };
        open(value)
    }
}

/// Weights for the player's queen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueenWeights {
    /// Added per point of own queen health.
    pub health: f64,
    pub tiles: QueenTiles,
    /// Applied when the queen stands on one of `tiles`.
    pub on_tile: Option<Penalty>,
    /// Added per cell between the queen and the nearest board edge.
    pub edge_distance: f64,
    /// Added per cell between the queen and the nearest enemy ant.
    pub enemy_distance: f64,
}

impl Default for QueenWeights {
    fn default() -> Self {
        Self {
            health: 0.0,
            tiles: QueenTiles::AnyConstruction,
            on_tile: Some(Penalty::Floor(0.001)),
            edge_distance: 0.0,
            enemy_distance: 0.0,
        }
    }
}

/// A cap on the number of workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerCap {
    pub max: usize,
    /// Added per worker while at or under the cap.
    pub bonus: f64,
    /// `Subtract` is charged per worker once over the cap.
    pub over: Penalty,
}

/// Weights for workers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerWeights {
    /// When false, workers are scored like attackers.
    pub forage: bool,
    pub cap: Option<WorkerCap>,
    pub carrying_bonus: f64,
    /// Subtracted per cell to the nearest drop-off while carrying.
    pub drop_off_distance: f64,
    /// Subtracted per cell to the nearest food while empty-handed.
    pub food_distance: f64,
    /// Cells deducted from each distance before weighting.
    pub distance_offset: f64,
    /// Distance used when there is nothing to walk to.
    pub missing_distance: f64,
    /// Only consider food on the player's own half of the board.
    pub home_food_only: bool,
}

impl Default for WorkerWeights {
    fn default() -> Self {
        Self {
            forage: true,
            cap: Some(WorkerCap {
                max: 1,
                bonus: 0.0,
                over: Penalty::Floor(0.001),
            }),
            carrying_bonus: 0.015,
            drop_off_distance: 0.001,
            food_distance: 0.001,
            distance_offset: 1.0,
            missing_distance: 99.0,
            home_food_only: true,
        }
    }
}

/// Weights for drones, soldiers and ranged soldiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerWeights {
    /// Added per attacker.
    pub bonus: f64,
    /// Subtracted per cell to the target.
    pub distance: f64,
    pub target: AttackTarget,
}

impl Default for AttackerWeights {
    fn default() -> Self {
        Self {
            bonus: 0.05,
            distance: 0.02,
            target: AttackTarget::EnemyQueen,
        }
    }
}

/// Every tunable constant of the heuristic. The default is the forager preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Added per unit of food lead over the enemy.
    pub food_difference: f64,
    /// Added per unit of own food.
    pub own_food: f64,
    /// Added per point of damage on the enemy queen.
    pub enemy_queen_damage: f64,
    /// Added per point of remaining enemy queen health.
    pub enemy_queen_health: f64,
    /// Added per point of health summed over every enemy ant.
    pub enemy_health_total: f64,
    pub queen: QueenWeights,
    pub workers: WorkerWeights,
    pub attackers: AttackerWeights,
    pub metric: DistanceMetric,
    pub clamp: ClampBand,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self::forager()
    }
}

impl HeuristicWeights {
    /// One worker shuttling food from the home half, attackers marching on
    /// the enemy queen. Distances come from the rules engine.
    pub fn forager() -> Self {
        Self {
            food_difference: 0.04,
            own_food: 0.0,
            enemy_queen_damage: 0.1,
            enemy_queen_health: 0.0,
            enemy_health_total: 0.0,
            queen: QueenWeights::default(),
            workers: WorkerWeights::default(),
            attackers: AttackerWeights::default(),
            metric: DistanceMetric::Steps,
            clamp: ClampBand::default(),
        }
    }

    /// Every non-queen ant heads for the enemy queen.
    pub fn raider() -> Self {
        Self {
            food_difference: 0.0,
            own_food: 0.0,
            enemy_queen_damage: 0.025,
            enemy_queen_health: 0.0,
            enemy_health_total: 0.0,
            queen: QueenWeights {
                tiles: QueenTiles::OwnAnthill,
                ..QueenWeights::default()
            },
            workers: WorkerWeights {
                forage: false,
                cap: None,
                ..WorkerWeights::default()
            },
            attackers: AttackerWeights {
                bonus: 0.01,
                distance: 0.005,
                target: AttackTarget::EnemyQueen,
            },
            metric: DistanceMetric::Manhattan,
            clamp: ClampBand::default(),
        }
    }

    /// Small weights around a food economy of up to three workers,
    /// with the queen keeping clear of busy tiles and of enemies.
    pub fn hoarder() -> Self {
        Self {
            food_difference: 0.0,
            own_food: 0.0035,
            enemy_queen_damage: 0.0,
            enemy_queen_health: -0.0025,
            enemy_health_total: -0.005,
            queen: QueenWeights {
                health: 0.0026,
                tiles: QueenTiles::DropOffsAndFood,
                on_tile: Some(Penalty::Subtract(0.2)),
                edge_distance: 0.0,
                enemy_distance: 0.00005,
            },
            workers: WorkerWeights {
                forage: true,
                cap: Some(WorkerCap {
                    max: 3,
                    bonus: 0.001,
                    over: Penalty::Subtract(0.005),
                }),
                carrying_bonus: 0.003,
                drop_off_distance: 0.00005,
                food_distance: 0.00005,
                distance_offset: 0.0,
                missing_distance: 99.0,
                home_food_only: false,
            },
            attackers: AttackerWeights {
                bonus: 0.005,
                distance: 0.00005,
                target: AttackTarget::NearestEnemy,
            },
            metric: DistanceMetric::Manhattan,
            clamp: ClampBand::default(),
        }
    }

    pub fn preset(preset: HeuristicPreset) -> Self {
        match preset {
            HeuristicPreset::Forager => Self::forager(),
            HeuristicPreset::Raider => Self::raider(),
            HeuristicPreset::Hoarder => Self::hoarder(),
        }
    }
}

/// Named weight sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicPreset {
    #[default]
    Forager,
    Raider,
    Hoarder,
}

impl std::str::FromStr for HeuristicPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forager" => Ok(Self::Forager),
            "raider" => Ok(Self::Raider),
            "hoarder" => Ok(Self::Hoarder),
            other => Err(format!("unknown heuristic preset '{}'", other)),
        }
    }
}

/// Weighted-feature evaluator.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEvaluator {
    pub weights: HeuristicWeights,
}

/// Per-ant contribution: either a term to add or a value to return at once.
enum Term {
    Add(f64),
    Floor(f64),
}

/// Measures distances with the configured metric.
struct Ruler<'a> {
    metric: DistanceMetric,
    state: &'a GameState,
    rules: &'a dyn RulesEngine,
}

impl Ruler<'_> {
    fn between(&self, from: Coord, to: Coord) -> f64 {
        match self.metric {
            DistanceMetric::Steps => self.rules.steps_to_reach(self.state, from, to) as f64,
            DistanceMetric::Manhattan => from.manhattan(to) as f64,
        }
    }

    fn nearest(&self, from: Coord, targets: impl Iterator<Item = Coord>) -> Option<f64> {
        targets
            .map(|to| self.between(from, to))
            .fold(None, |best, d| Some(best.map_or(d, |b: f64| b.min(d))))
    }
}

impl HeuristicEvaluator {
    pub fn new(weights: HeuristicWeights) -> Self {
        Self { weights }
    }

    pub fn preset(preset: HeuristicPreset) -> Self {
        Self::new(HeuristicWeights::preset(preset))
    }

    fn queen_term(&self, state: &GameState, own: &Inventory, enemy: &Inventory, queen: &Ant, ruler: &Ruler) -> Term {
        let w = &self.weights.queen;
        let mut term = w.health * queen.health as f64;
        term += w.edge_distance * queen.coords.edge_distance() as f64;
        if w.enemy_distance != 0.0 {
            let enemies = enemy.ants.iter().map(|a| a.coords);
            if let Some(d) = ruler.nearest(queen.coords, enemies) {
                term += w.enemy_distance * d;
            }
        }

        let at = queen.coords;
        let on_tile = match w.tiles {
            QueenTiles::AnyConstruction => state.constr_at(at).is_some(),
            QueenTiles::OwnAnthill => own.anthill().is_some_and(|hill| hill.coords == at),
            QueenTiles::DropOffsAndFood => {
                own.drop_offs().any(|c| c.coords == at) || state.food().any(|c| c.coords == at)
            }
        };
        match (on_tile, w.on_tile) {
            (true, Some(Penalty::Floor(value))) => Term::Floor(value),
            (true, Some(Penalty::Subtract(amount))) => Term::Add(term - amount),
            _ => Term::Add(term),
        }
    }

    fn worker_term(&self, state: &GameState, player: PlayerId, own: &Inventory, ant: &Ant, ruler: &Ruler) -> f64 {
        let w = &self.weights.workers;
        if ant.carrying {
            let d = ruler
                .nearest(ant.coords, own.drop_offs().map(|c| c.coords))
                .unwrap_or(w.missing_distance);
            w.carrying_bonus - w.drop_off_distance * (d - w.distance_offset)
        } else {
            let (low, high) = player.home_rows();
            let food = state
                .food()
                .map(|c| c.coords)
                .filter(|c| !w.home_food_only || (low..=high).contains(&c.y));
            let d = ruler.nearest(ant.coords, food).unwrap_or(w.missing_distance);
            -w.food_distance * (d - w.distance_offset)
        }
    }

    fn attacker_term(&self, enemy: &Inventory, enemy_queen: &Ant, ant: &Ant, ruler: &Ruler) -> f64 {
        let w = &self.weights.attackers;
        let d = match w.target {
            AttackTarget::EnemyQueen => Some(ruler.between(ant.coords, enemy_queen.coords)),
            AttackTarget::NearestEnemy => ruler.nearest(ant.coords, enemy.ants.iter().map(|a| a.coords)),
        };
        w.bonus - w.distance * d.unwrap_or(0.0)
    }
}

impl Evaluator for HeuristicEvaluator {
    fn evaluate_for(&self, state: &GameState, player: PlayerId, rules: &dyn RulesEngine) -> f64 {
        if let Some(value) = terminal_value(state, player) {
            return value;
        }

        let w = &self.weights;
        let own = state.inventory(player);
        let enemy = state.inventory(player.opponent());
        let Some(enemy_queen) = enemy.queen() else {
            return WIN;
        };
        let ruler = Ruler {
            metric: w.metric,
            state,
            rules,
        };

        let mut value = NEUTRAL;
        value += w.food_difference * (own.food_count - enemy.food_count) as f64;
        value += w.own_food * own.food_count as f64;
        value += w.enemy_queen_damage * QUEEN_MAX_HEALTH.saturating_sub(enemy_queen.health) as f64;
        value += w.enemy_queen_health * enemy_queen.health as f64;
        value += w.enemy_health_total * enemy.total_health() as f64;

        let mut workers = 0;
        for ant in &own.ants {
            let term = match ant.ant_type {
                AntType::Queen => self.queen_term(state, own, enemy, ant, &ruler),
                AntType::Worker if w.workers.forage => {
                    workers += 1;
                    match &w.workers.cap {
                        Some(cap) if workers > cap.max => match cap.over {
                            Penalty::Floor(floor) => Term::Floor(floor),
                            Penalty::Subtract(_) => Term::Add(self.worker_term(state, player, own, ant, &ruler)),
                        },
                        _ => Term::Add(self.worker_term(state, player, own, ant, &ruler)),
                    }
                }
                _ => Term::Add(self.attacker_term(enemy, enemy_queen, ant, &ruler)),
            };
            match term {
                Term::Add(delta) => value += delta,
                Term::Floor(floor) => return open(floor),
            }
        }

        if let Some(cap) = &w.workers.cap {
            if workers <= cap.max {
                value += cap.bonus * workers as f64;
            } else if let Penalty::Subtract(amount) = cap.over {
                value -= amount * workers as f64;
            }
        }

        w.clamp.apply(value)
    }
}
