use serde::{Deserialize, Serialize};

/// How the learning rate shrinks after each completed game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecaySchedule {
    /// `alpha -= (1 - 1/e^(alpha^rate)) * amount`: large rates shrink
    /// slowly at first and fast near 1.
    Exponential { rate: f64, amount: f64, floor: f64 },
    /// `alpha -= step` while above `floor`.
    Linear { step: f64, floor: f64 },
}

impl Default for DecaySchedule {
    fn default() -> Self {
        DecaySchedule::Exponential {
            rate: 3.0,
            amount: 0.1,
            floor: 0.0,
        }
    }
}

impl DecaySchedule {
    /// Learning rate for the next game.
    pub fn next(&self, alpha: f64) -> f64 {
        match *self {
            DecaySchedule::Exponential { rate, amount, floor } => {
                let decrease = (1.0 - 1.0 / alpha.powf(rate).exp()) * amount;
                (alpha - decrease).max(floor)
            }
            DecaySchedule::Linear { step, floor } => {
                if alpha > floor {
                    (alpha - step).max(floor)
                } else {
                    alpha
                }
            }
        }
    }

    /// Short tag naming the schedule and its parameters, used in file names.
    pub fn fingerprint(&self) -> String {
        let tag = |value: f64| value.to_string().replace(['.', '-'], "");
        match *self {
            DecaySchedule::Exponential { rate, amount, floor } => {
                format!("exp{}_{}_{}", tag(rate), tag(amount), tag(floor))
            }
            DecaySchedule::Linear { step, floor } => format!("lin{}_{}", tag(step), tag(floor)),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match *self {
            DecaySchedule::Exponential { rate, amount, floor } => {
                if rate <= 0.0 {
                    return Err("decay rate must be > 0".into());
                }
                if !(0.0..=1.0).contains(&amount) {
                    return Err("decay amount must be in [0, 1]".into());
                }
                if !(0.0..=1.0).contains(&floor) {
                    return Err("decay floor must be in [0, 1]".into());
                }
            }
            DecaySchedule::Linear { step, floor } => {
                if step < 0.0 {
                    return Err("decay step must be >= 0".into());
                }
                if !(0.0..=1.0).contains(&floor) {
                    return Err("decay floor must be in [0, 1]".into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_step() {
        let schedule = DecaySchedule::default();
        let expected = 0.99 - (1.0 - 1.0 / 0.99f64.powi(3).exp()) * 0.1;
        assert!((schedule.next(0.99) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_exponential_slows_down() {
        let schedule = DecaySchedule::default();
        let mut alpha = 0.99;
        let mut last_drop = f64::INFINITY;
        for _ in 0..50 {
            let next = schedule.next(alpha);
            let drop = alpha - next;
            assert!(drop > 0.0 && drop <= last_drop);
            last_drop = drop;
            alpha = next;
        }
    }

    #[test]
    fn test_linear_stops_at_floor() {
        let schedule = DecaySchedule::Linear {
            step: 0.001,
            floor: 0.1,
        };
        assert!((schedule.next(0.5) - 0.499).abs() < 1e-12);
        assert_eq!(schedule.next(0.1005), 0.1);
        assert_eq!(schedule.next(0.1), 0.1);
    }

    #[test]
    fn test_fingerprint() {
        assert_eq!(DecaySchedule::default().fingerprint(), "exp3_01_0");
        let linear = DecaySchedule::Linear {
            step: 0.001,
            floor: 0.1,
        };
        assert_eq!(linear.fingerprint(), "lin0001_01");
    }

    #[test]
    fn test_validate() {
        assert!(DecaySchedule::default().validate().is_ok());
        let bad = DecaySchedule::Linear {
            step: -1.0,
            floor: 0.1,
        };
        assert!(bad.validate().is_err());
    }
}
