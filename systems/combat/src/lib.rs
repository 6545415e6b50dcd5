#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Move legality and combat resolution.
//!
//! [`perform_move`] takes a board and a move order and answers with a new
//! board plus a report of what happened. The input board is never touched, so
//! a rejected order simply leaves the caller holding the state it started with.
//!
//! Outcomes depend on who holds the destination:
//!
//! * a friendly cell absorbs the battalion into its stack at the path cost;
//! * an empty cell is seized and the battalion arrives with no movement left;
//! * an enemy cell triggers an engagement. Attack power is the attacker's
//!   soldiers times attack times a fortune roll, defense power is the
//!   garrison's soldiers times defense times an independent fortune roll.
//!   Strictly greater attack wins the cell; anything else repels the attacker.

use grid_conquest_core::{
    Battalion, BattalionId, Board, Cell, CellId, Chance, Faction, LastAction, MoveError,
    SteadyChance,
};
use grid_conquest_system_movement::find_path;

/// Instruction to move one battalion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOrder {
    /// Cell the battalion currently occupies.
    pub from: CellId,
    /// Destination cell.
    pub to: CellId,
    /// Faction issuing the order.
    pub faction: Faction,
    /// Battalion being moved.
    pub battalion: BattalionId,
}

/// How a resolved move ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The battalion joined a friendly stack.
    Relocated,
    /// The battalion occupied an empty cell.
    Seized,
    /// The battalion defeated the garrison and took the cell.
    Conquered,
    /// The garrison held and the battalion stayed at its origin.
    Repelled,
}

/// Power figures of an engagement after fortune was applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Engagement {
    /// Attacker power including fortune.
    pub attack_power: f64,
    /// Garrison power including fortune.
    pub defense_power: f64,
    /// Fortune rolled for the attacker.
    pub attack_fortune: f64,
    /// Fortune rolled for the garrison.
    pub defense_fortune: f64,
}

impl Engagement {
    fn roll<C>(attacker: &Battalion, defenders: &[Battalion], chance: &mut C) -> Self
    where
        C: Chance + ?Sized,
    {
        let attack_fortune = chance.fortune();
        let defense_fortune = chance.fortune();
        Self {
            attack_power: attacker.attack_strength() * attack_fortune,
            defense_power: defense_power(defenders) * defense_fortune,
            attack_fortune,
            defense_fortune,
        }
    }

    /// Reports whether the attacker prevails. Ties favour the garrison.
    #[must_use]
    pub fn attacker_wins(&self) -> bool {
        self.attack_power > self.defense_power
    }

    /// Fortune of the side that won the engagement.
    #[must_use]
    pub fn winning_fortune(&self) -> f64 {
        if self.attacker_wins() {
            self.attack_fortune
        } else {
            self.defense_fortune
        }
    }
}

/// Everything the resolver decided about one move.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveReport {
    /// Order that was resolved.
    pub order: MoveOrder,
    /// How the move ended.
    pub outcome: MoveOutcome,
    /// Owner of the destination after resolution.
    pub conquered_owner: Option<Faction>,
    /// Engagement figures, when the destination was contested.
    pub engagement: Option<Engagement>,
    /// One-time resource reward granted, if any.
    pub reward: Option<u32>,
    /// Movement points the route consumed.
    pub cost: u32,
}

impl MoveReport {
    /// Fortune of the winning side, when combat took place.
    #[must_use]
    pub fn fortune(&self) -> Option<f64> {
        self.engagement.map(|engagement| engagement.winning_fortune())
    }

    /// Presentation record of the move stamped with `timestamp`.
    #[must_use]
    pub fn stamp(&self, timestamp: u64) -> LastAction {
        LastAction {
            from: self.order.from,
            to: self.order.to,
            conquered_owner: self.conquered_owner,
            timestamp,
            fortune: self.fortune(),
            reward: self.reward,
        }
    }
}

/// Combined attack weight of a set of battalions, before fortune.
#[must_use]
pub fn attack_power(battalions: &[Battalion]) -> f64 {
    battalions.iter().map(Battalion::attack_strength).sum()
}

/// Combined defense weight of a set of battalions, before fortune.
#[must_use]
pub fn defense_power(battalions: &[Battalion]) -> f64 {
    battalions.iter().map(Battalion::defense_strength).sum()
}

/// Resolves `order` against `board`, drawing fortune and rewards from `chance`.
///
/// Returns the updated board and a report, or the reason the order is illegal.
/// Illegal orders consume no randomness.
pub fn perform_move<C>(
    board: &Board,
    order: MoveOrder,
    chance: &mut C,
) -> Result<(Board, MoveReport), MoveError>
where
    C: Chance + ?Sized,
{
    let mover = check_order(board, order)?;
    let path = find_path(board, order.from, order.to, &mover)
        .ok_or(MoveError::Unreachable(order.to))?;

    let mut next = board.clone();
    let defenders = next
        .cell(order.to)
        .map(|cell| (cell.owner(), cell.battalions().to_vec()))
        .ok_or(MoveError::UnknownCell(order.to))?;

    let report = match defenders {
        (Some(owner), _) if owner == order.faction => {
            let mut mover = withdraw(&mut next, order)?;
            mover.spend_movement(path.cost());
            garrison(cell_of(&mut next, order.to)?, mover, order.to)?;
            MoveReport {
                order,
                outcome: MoveOutcome::Relocated,
                conquered_owner: Some(order.faction),
                engagement: None,
                reward: None,
                cost: path.cost(),
            }
        }
        (None, _) => {
            let mut mover = withdraw(&mut next, order)?;
            mover.exhaust();
            let destination = cell_of(&mut next, order.to)?;
            garrison(destination, mover, order.to)?;
            let reward = claim_reward(destination, order.faction, chance);
            MoveReport {
                order,
                outcome: MoveOutcome::Seized,
                conquered_owner: Some(order.faction),
                engagement: None,
                reward,
                cost: path.cost(),
            }
        }
        (Some(enemy), garrison_roster) => {
            let engagement = Engagement::roll(&mover, &garrison_roster, chance);
            tracing::debug!(
                from = %order.from,
                to = %order.to,
                attack = engagement.attack_power,
                defense = engagement.defense_power,
                "engagement"
            );

            if engagement.attacker_wins() {
                let mut mover = withdraw(&mut next, order)?;
                mover.soldiers = attacker_survivors(mover.soldiers, &engagement);
                mover.exhaust();
                let destination = cell_of(&mut next, order.to)?;
                let _ = destination.evacuate();
                garrison(destination, mover, order.to)?;
                let reward = claim_reward(destination, order.faction, chance);
                MoveReport {
                    order,
                    outcome: MoveOutcome::Conquered,
                    conquered_owner: Some(order.faction),
                    engagement: Some(engagement),
                    reward,
                    cost: path.cost(),
                }
            } else {
                let destination = cell_of(&mut next, order.to)?;
                hold_ground(destination, &engagement);
                MoveReport {
                    order,
                    outcome: MoveOutcome::Repelled,
                    conquered_owner: Some(enemy),
                    engagement: Some(engagement),
                    reward: None,
                    cost: 0,
                }
            }
        }
    };

    Ok((next, report))
}

/// Resolves `order` with neutral fortune and the mean reward.
///
/// Used to evaluate candidate moves without consuming real randomness.
pub fn preview(board: &Board, order: MoveOrder) -> Result<(Board, MoveReport), MoveError> {
    perform_move(board, order, &mut SteadyChance::neutral())
}

fn check_order(board: &Board, order: MoveOrder) -> Result<Battalion, MoveError> {
    let origin = board
        .cell(order.from)
        .ok_or(MoveError::UnknownCell(order.from))?;
    if !board.contains(order.to) {
        return Err(MoveError::UnknownCell(order.to));
    }
    if order.from == order.to {
        return Err(MoveError::SameCell);
    }

    let battalion = origin
        .battalion(order.battalion)
        .ok_or(MoveError::MissingBattalion {
            battalion: order.battalion,
            cell: order.from,
        })?;
    if battalion.owner != order.faction {
        return Err(MoveError::NotOwned(order.battalion));
    }
    if !battalion.can_move() {
        return Err(MoveError::Exhausted(order.battalion));
    }
    Ok(battalion.clone())
}

fn cell_of(board: &mut Board, id: CellId) -> Result<&mut Cell, MoveError> {
    board.cell_mut(id).ok_or(MoveError::UnknownCell(id))
}

fn withdraw(board: &mut Board, order: MoveOrder) -> Result<Battalion, MoveError> {
    cell_of(board, order.from)?
        .withdraw(order.battalion)
        .ok_or(MoveError::MissingBattalion {
            battalion: order.battalion,
            cell: order.from,
        })
}

fn garrison(cell: &mut Cell, battalion: Battalion, id: CellId) -> Result<(), MoveError> {
    cell.station(battalion).map_err(|refused| {
        tracing::error!(cell = %id, battalion = %refused.id, "destination refused battalion");
        MoveError::Unreachable(id)
    })
}

fn claim_reward<C>(cell: &mut Cell, faction: Faction, chance: &mut C) -> Option<u32>
where
    C: Chance + ?Sized,
{
    cell.claim_resource(faction).then(|| chance.reward())
}

fn attacker_survivors(soldiers: u32, engagement: &Engagement) -> u32 {
    let ratio = (engagement.defense_power / engagement.attack_power).min(1.0);
    scaled_survivors(soldiers, 1.0 - ratio)
}

fn hold_ground(cell: &mut Cell, engagement: &Engagement) {
    let ratio = if engagement.defense_power > 0.0 {
        (engagement.attack_power / engagement.defense_power).min(1.0)
    } else {
        0.0
    };
    let defenders = cell.battalions().len().max(1);
    let share = ratio / defenders as f64;
    for defender in cell.battalions_mut() {
        defender.soldiers = scaled_survivors(defender.soldiers, 1.0 - share);
        defender.restore_movement();
    }
}

fn scaled_survivors(soldiers: u32, keep: f64) -> u32 {
    let survivors = (f64::from(soldiers) * keep.clamp(0.0, 1.0)).round();
    // `keep` is clamped, so the product never exceeds the original count.
    (survivors as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engagement(attack_power: f64, defense_power: f64) -> Engagement {
        Engagement {
            attack_power,
            defense_power,
            attack_fortune: 1.05,
            defense_fortune: 0.95,
        }
    }

    #[test]
    fn survivors_round_and_keep_at_least_one() {
        assert_eq!(attacker_survivors(10, &engagement(80.0, 35.0)), 6);
        assert_eq!(attacker_survivors(10, &engagement(80.0, 79.9)), 1);
        assert_eq!(scaled_survivors(7, 0.0), 1);
        assert_eq!(scaled_survivors(7, 1.0), 7);
    }

    #[test]
    fn winning_fortune_follows_the_winner() {
        assert_eq!(engagement(50.0, 40.0).winning_fortune(), 1.05);
        assert_eq!(engagement(40.0, 40.0).winning_fortune(), 0.95);
        assert!(!engagement(40.0, 40.0).attacker_wins());
    }
}
