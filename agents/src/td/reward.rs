use super::compress::{FeatureValue, StateKey};
use antics_core::QUEEN_MAX_HEALTH;
use serde::{Deserialize, Serialize};

/// Reward of a state that is won or lost.
pub const TERMINAL_REWARD: f64 = 1.0;

/// Reward R(s) of a compressed state.
///
/// Won and lost keys are always worth +1 and -1; the variants only differ
/// in how the rest are shaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardShaping {
    /// Every other state costs the same small amount.
    StepCost { reward: f64 },
    /// Pay for enemy queen health left, own queen damage taken and distance
    /// from own ants to the enemy queen.
    Raider {
        enemy_queen_health: f64,
        queen_damage: f64,
        ant_distance: f64,
        /// Distances are measured against this.
        max_distance: i32,
    },
}

impl Default for RewardShaping {
    fn default() -> Self {
        RewardShaping::StepCost { reward: -0.01 }
    }
}

impl RewardShaping {
    pub fn raider() -> Self {
        RewardShaping::Raider {
            enemy_queen_health: 0.1,
            queen_damage: 0.01,
            ant_distance: 0.001,
            max_distance: 20,
        }
    }

    pub fn reward(&self, key: &StateKey) -> f64 {
        if key.is_won() {
            return TERMINAL_REWARD;
        }
        if key.is_lost() {
            return -TERMINAL_REWARD;
        }

        match *self {
            RewardShaping::StepCost { reward } => reward,
            RewardShaping::Raider {
                enemy_queen_health,
                queen_damage,
                ant_distance,
                max_distance,
            } => {
                let mut reward = 0.0;
                if let Some(health) = key.int("enemy_queen_health") {
                    reward -= enemy_queen_health * health as f64;
                }
                if let Some(health) = key.int("queen_health") {
                    reward -= queen_damage * (QUEEN_MAX_HEALTH as i32 - health) as f64;
                }
                for (name, value) in key.features() {
                    let FeatureValue::Int(d) = value else {
                        continue;
                    };
                    if name.starts_with("ant") && name.ends_with("_distance") {
                        reward += ant_distance * (max_distance - d) as f64;
                    }
                }
                reward
            }
        }
    }
}
