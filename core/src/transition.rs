//! The state transition engine: applies one move to a state.

use crate::error::{Result, TransitionError};
use crate::game_state::GameState;
use crate::inventory::*;
use crate::moves::*;
use crate::types::*;
use log::trace;
use rand::seq::SliceRandom;
use rand::Rng;

impl GameState {
    /// Applies a move, returning the resulting state. `self` is left untouched.
    ///
    /// Legality is the rules engine's job; only violations that would leave
    /// the state inconsistent are reported. Food costs are deducted without
    /// checking the balance. The rng only picks among attack targets.
    pub fn apply_move<R: Rng + ?Sized>(&self, mv: &Move, rng: &mut R) -> Result<GameState> {
        let mut next = self.clone();
        let mover = self.whose_turn;

        match mv {
            Move::Build { build, coord } => next.apply_build(mover, *build, *coord)?,
            Move::MoveAnt { path } => {
                let (from, to) = match (path.first(), path.last()) {
                    (Some(from), Some(to)) => (*from, *to),
                    _ => return Err(TransitionError::EmptyPath),
                };
                next.apply_ant_move(mover, from, to, rng)?;
            }
            Move::End => next.whose_turn = mover.opponent(),
        }

        Ok(next)
    }

    fn apply_build(&mut self, mover: PlayerId, build: BuildType, coord: Coord) -> Result<()> {
        let cost = build.cost().ok_or(TransitionError::Unbuildable(build))?;
        let id = self.next_ant_id();
        let inv = self.inventory_mut(mover);
        inv.food_count -= cost as i32;

        match build {
            BuildType::Ant(ant_type) => inv.ants.push(Ant::new(id, ant_type, coord, mover)),
            BuildType::Construction(constr_type) => {
                inv.constrs
                    .push(Construction::new(constr_type, coord, Some(mover)))
            }
        }
        Ok(())
    }

    fn apply_ant_move<R: Rng + ?Sized>(
        &mut self,
        mover: PlayerId,
        from: Coord,
        to: Coord,
        rng: &mut R,
    ) -> Result<()> {
        let landing = self.constr_at(to).map(|c| c.constr_type);

        let position = self
            .inventory(mover)
            .ants
            .iter()
            .position(|ant| ant.coords == from);
        let Some(idx) = position else {
            return Err(match self.ant_at(from) {
                Some(ant) => TransitionError::NotOwned {
                    coord: from,
                    owner: ant.owner,
                },
                None => TransitionError::NoAntAt(from),
            });
        };

        let inv = self.inventory_mut(mover);
        let ant = &mut inv.ants[idx];
        ant.coords = to;

        if ant.ant_type == AntType::Worker {
            match landing {
                Some(ConstrType::Food) => ant.carrying = true,
                Some(constr) if constr.is_drop_off() && ant.carrying => {
                    ant.carrying = false;
                    inv.food_count += 1;
                }
                _ => {}
            }
        }

        let attacker = inv.ants[idx].clone();
        self.resolve_attack(&attacker, rng);
        Ok(())
    }

    /// Hits one enemy in range, picked uniformly at random. No-op when none is.
    fn resolve_attack<R: Rng + ?Sized>(&mut self, attacker: &Ant, rng: &mut R) {
        let enemy = self.inventory_mut(attacker.owner.opponent());
        let targets: Vec<usize> = enemy
            .ants
            .iter()
            .enumerate()
            .filter(|(_, target)| attacker.in_range(target.coords))
            .map(|(i, _)| i)
            .collect();

        let Some(&target) = targets.choose(rng) else {
            return;
        };

        let strength = attacker.stats().attack;
        let victim = &mut enemy.ants[target];
        if victim.health <= strength {
            trace!(
                "{:?} at {} kills {:?} at {}",
                attacker.ant_type,
                attacker.coords,
                victim.ant_type,
                victim.coords
            );
            enemy.ants.remove(target);
        } else {
            victim.health -= strength;
            trace!(
                "{:?} at {} hits {:?} at {} ({} left)",
                attacker.ant_type,
                attacker.coords,
                victim.ant_type,
                victim.coords,
                victim.health
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::StateBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn base() -> StateBuilder {
        StateBuilder::new()
            .ant(PlayerId::One, AntType::Queen, Coord::new(1, 1))
            .ant(PlayerId::Two, AntType::Queen, Coord::new(8, 8))
    }

    #[test]
    fn test_worker_move_without_construction() {
        let state = base()
            .ant(PlayerId::One, AntType::Worker, Coord::new(0, 0))
            .build();
        let mv = Move::move_ant(vec![Coord::new(0, 0), Coord::new(0, 1)]);

        let next = state.apply_move(&mv, &mut rng()).unwrap();
        let worker = next.ant_at(Coord::new(0, 1)).unwrap();
        assert_eq!(worker.ant_type, AntType::Worker);
        assert!(!worker.carrying);
        assert!(next.ant_at(Coord::new(0, 0)).is_none());
        // The input is untouched.
        assert!(state.ant_at(Coord::new(0, 0)).is_some());
    }

    #[test]
    fn test_food_conservation() {
        let state = base()
            .ant(PlayerId::One, AntType::Worker, Coord::new(4, 4))
            .constr(PlayerId::Neutral, ConstrType::Food, Coord::new(4, 5))
            .constr(PlayerId::Neutral, ConstrType::Food, Coord::new(4, 6))
            .constr(PlayerId::One, ConstrType::Tunnel, Coord::new(4, 3))
            .build();
        let mut rng = rng();

        let s1 = state
            .apply_move(&Move::move_ant(vec![Coord::new(4, 4), Coord::new(4, 5)]), &mut rng)
            .unwrap();
        assert!(s1.ant_at(Coord::new(4, 5)).unwrap().carrying);

        // Passing over more food while carrying changes nothing.
        let s2 = s1
            .apply_move(&Move::move_ant(vec![Coord::new(4, 5), Coord::new(4, 6)]), &mut rng)
            .unwrap();
        assert!(s2.ant_at(Coord::new(4, 6)).unwrap().carrying);
        assert_eq!(s2.inventory(PlayerId::One).food_count, 0);

        let s3 = s2
            .apply_move(
                &Move::move_ant(vec![Coord::new(4, 6), Coord::new(4, 4), Coord::new(4, 3)]),
                &mut rng,
            )
            .unwrap();
        assert!(!s3.ant_at(Coord::new(4, 3)).unwrap().carrying);
        assert_eq!(s3.inventory(PlayerId::One).food_count, 1);

        // Dropping off again without food does nothing.
        let s4 = s3
            .apply_move(&Move::move_ant(vec![Coord::new(4, 3), Coord::new(4, 3)]), &mut rng)
            .unwrap();
        assert_eq!(s4.inventory(PlayerId::One).food_count, 1);
    }

    #[test]
    fn test_queen_ignores_food() {
        let state = base()
            .constr(PlayerId::Neutral, ConstrType::Food, Coord::new(1, 2))
            .build();
        let next = state
            .apply_move(&Move::move_ant(vec![Coord::new(1, 1), Coord::new(1, 2)]), &mut rng())
            .unwrap();
        assert!(!next.ant_at(Coord::new(1, 2)).unwrap().carrying);
    }

    #[test]
    fn test_single_target_attack_is_deterministic() {
        let state = base()
            .ant(PlayerId::One, AntType::Soldier, Coord::new(5, 5))
            .ant(PlayerId::Two, AntType::Soldier, Coord::new(6, 7))
            .build();
        let mv = Move::move_ant(vec![Coord::new(5, 5), Coord::new(6, 6)]);

        let a = state.apply_move(&mv, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = state.apply_move(&mv, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.ant_at(Coord::new(6, 7)).unwrap().health, 2);
    }

    #[test]
    fn test_no_target_leaves_health() {
        let state = base()
            .ant(PlayerId::One, AntType::Soldier, Coord::new(2, 2))
            .ant(PlayerId::Two, AntType::Drone, Coord::new(6, 6))
            .build();
        let next = state
            .apply_move(&Move::move_ant(vec![Coord::new(2, 2), Coord::new(3, 3)]), &mut rng())
            .unwrap();
        assert_eq!(next.inventory(PlayerId::Two), state.inventory(PlayerId::Two));
    }

    #[test]
    fn test_lethal_attack_removes_target() {
        let state = base()
            .ant(PlayerId::One, AntType::Soldier, Coord::new(2, 2))
            .ant(PlayerId::Two, AntType::Worker, Coord::new(2, 4))
            .build();
        let next = state
            .apply_move(&Move::move_ant(vec![Coord::new(2, 2), Coord::new(2, 3)]), &mut rng())
            .unwrap();
        assert!(next.ant_at(Coord::new(2, 4)).is_none());
        assert_eq!(next.inventory(PlayerId::Two).ants.len(), 1);
    }

    #[test]
    fn test_ranged_attack_hits_exactly_one() {
        let state = base()
            .ant(PlayerId::One, AntType::RangedSoldier, Coord::new(0, 5))
            .ant(PlayerId::Two, AntType::Soldier, Coord::new(3, 5))
            .ant(PlayerId::Two, AntType::Soldier, Coord::new(2, 6))
            .build();
        let next = state
            .apply_move(&Move::move_ant(vec![Coord::new(0, 5), Coord::new(1, 5)]), &mut rng())
            .unwrap();
        let damage: u32 = state.inventory(PlayerId::Two).total_health()
            - next.inventory(PlayerId::Two).total_health();
        assert_eq!(damage, 1);
    }

    #[test]
    fn test_build_ant_deducts_cost() {
        let state = base()
            .constr(PlayerId::One, ConstrType::Anthill, Coord::new(1, 1))
            .food(PlayerId::One, 3)
            .build();
        let next = state
            .apply_move(&Move::build_ant(AntType::Soldier, Coord::new(1, 1)), &mut rng())
            .unwrap();
        let inv = next.inventory(PlayerId::One);
        assert_eq!(inv.food_count, 1);
        let soldier = inv.ants_of(AntType::Soldier).next().unwrap();
        assert_eq!(soldier.health, 4);
        assert_eq!(soldier.owner, PlayerId::One);
        assert_eq!(soldier.id, 2);
    }

    #[test]
    fn test_build_does_not_clamp_food() {
        let state = base().food(PlayerId::One, 1).build();
        let next = state
            .apply_move(&Move::build_constr(ConstrType::Tunnel, Coord::new(3, 2)), &mut rng())
            .unwrap();
        let inv = next.inventory(PlayerId::One);
        assert_eq!(inv.food_count, -2);
        assert_eq!(inv.tunnels().count(), 1);
    }

    #[test]
    fn test_end_toggles_turn_only() {
        let state = base().build();
        let next = state.apply_move(&Move::End, &mut rng()).unwrap();
        assert_eq!(next.whose_turn, PlayerId::Two);
        assert_eq!(next.inventories, state.inventories);
        let back = next.apply_move(&Move::End, &mut rng()).unwrap();
        assert_eq!(back.whose_turn, PlayerId::One);
    }

    #[test]
    fn test_precondition_errors() {
        let state = base().build();
        let mut rng = rng();
        assert_eq!(
            state.apply_move(&Move::move_ant(vec![Coord::new(5, 5)]), &mut rng),
            Err(TransitionError::NoAntAt(Coord::new(5, 5)))
        );
        assert_eq!(
            state.apply_move(&Move::move_ant(Vec::new()), &mut rng),
            Err(TransitionError::EmptyPath)
        );
        assert_eq!(
            state.apply_move(&Move::build_ant(AntType::Queen, Coord::new(0, 0)), &mut rng),
            Err(TransitionError::Unbuildable(BuildType::Ant(AntType::Queen)))
        );
        assert!(matches!(
            state.apply_move(&Move::move_ant(vec![Coord::new(8, 8), Coord::new(8, 7)]), &mut rng),
            Err(TransitionError::NotOwned { .. })
        ));
    }
}
