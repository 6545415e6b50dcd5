#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted opponent that takes one production step and one move per turn.
//!
//! Move selection follows a fixed doctrine. Candidate moves are sorted into
//! tiers and only the most urgent non-empty tier is considered:
//!
//! 1. strike enemy cells touching one of our bases,
//! 2. seize resource sites we have not yet collected,
//! 3. attack enemy cells or take bases,
//! 4. expand into unowned territory.
//!
//! Within the tier every candidate is simulated with neutral fortune and
//! scored; the single best move is returned. The opponent never mutates the
//! board itself: callers execute the decision through the combat resolver.

use std::fmt;

use grid_conquest_core::{
    cheapest_unlock_free, Board, Cell, CellId, CellKind, Chance, Faction, UnitType,
};
use grid_conquest_system_combat::{preview, MoveOrder, MoveReport};
use grid_conquest_system_movement::reachable;

/// Score added for taking a specialized base the faction does not hold yet.
pub const SPECIALIZED_BASE_BONUS: f64 = 500.0;

/// Priority class of a candidate move, most urgent first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// Strike an enemy cell adjacent to one of our bases.
    DefendBase,
    /// Seize a resource site whose reward we have not collected.
    Economy,
    /// Attack an enemy cell or take any base.
    Aggression,
    /// Move into unowned territory.
    Expansion,
}

impl Tier {
    /// Dominant scoring term of the tier.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::DefendBase => 4_000.0,
            Self::Economy => 3_000.0,
            Self::Aggression => 2_000.0,
            Self::Expansion => 1_000.0,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DefendBase => "defend-base",
            Self::Economy => "economy",
            Self::Aggression => "aggression",
            Self::Expansion => "expansion",
        };
        f.write_str(label)
    }
}

/// Move the opponent settled on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    /// Order to execute through the combat resolver.
    pub order: MoveOrder,
    /// Tier the order was drawn from.
    pub tier: Tier,
    /// Score of the order within its tier.
    pub score: f64,
}

/// Battalion the opponent wants to train this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductionPlan {
    /// Base that trains the battalion.
    pub cell: CellId,
    /// Unit type to train.
    pub unit: UnitType,
    /// Resources the battalion costs.
    pub cost: u32,
}

/// Heuristic opponent bound to one faction.
#[derive(Clone, Debug)]
pub struct Opponent {
    faction: Faction,
    candidates: Vec<(MoveOrder, Tier)>,
}

impl Default for Opponent {
    fn default() -> Self {
        Self::new(Faction::Ai)
    }
}

impl Opponent {
    /// Creates an opponent commanding `faction` with empty scratch buffers.
    #[must_use]
    pub fn new(faction: Faction) -> Self {
        Self {
            faction,
            candidates: Vec::new(),
        }
    }

    /// Faction the opponent commands.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Picks a base to train the cheapest unlock-free unit at, if affordable.
    ///
    /// The base is drawn uniformly from the bases the faction holds.
    pub fn plan_production<C>(
        &self,
        board: &Board,
        budget: u32,
        chance: &mut C,
    ) -> Option<ProductionPlan>
    where
        C: Chance + ?Sized,
    {
        let blueprint = cheapest_unlock_free();
        if budget < blueprint.cost {
            return None;
        }

        let bases: Vec<CellId> = board
            .cells_owned_by(self.faction)
            .filter(|cell| cell.is_base())
            .map(Cell::id)
            .collect();
        if bases.is_empty() {
            return None;
        }

        let cell = bases.get(chance.index(bases.len())).copied()?;
        Some(ProductionPlan {
            cell,
            unit: blueprint.unit,
            cost: blueprint.cost,
        })
    }

    /// Chooses the single best move for this turn, or `None` to pass.
    pub fn select_move(&mut self, board: &Board) -> Option<Decision> {
        self.collect_candidates(board);

        let tier = self.candidates.iter().map(|(_, tier)| *tier).min()?;
        let mut best: Option<Decision> = None;
        for (order, _) in self.candidates.iter().filter(|(_, t)| *t == tier) {
            let Ok((after, report)) = preview(board, *order) else {
                continue;
            };
            let score = tier.weight() + self.evaluate(board, &after, &report);
            if best.map_or(true, |current| score > current.score) {
                best = Some(Decision {
                    order: *order,
                    tier,
                    score,
                });
            }
        }

        if let Some(decision) = best {
            tracing::debug!(
                faction = %self.faction,
                tier = %decision.tier,
                score = decision.score,
                from = %decision.order.from,
                to = %decision.order.to,
                "opponent chose move"
            );
        }
        best
    }

    fn collect_candidates(&mut self, board: &Board) {
        self.candidates.clear();
        for (origin, battalion) in board.battalions_of(self.faction) {
            if !battalion.can_move() {
                continue;
            }
            for target in reachable(board, origin, battalion).cells() {
                if let Some(tier) = self.classify(board, target) {
                    self.candidates.push((
                        MoveOrder {
                            from: origin,
                            to: target,
                            faction: self.faction,
                            battalion: battalion.id,
                        },
                        tier,
                    ));
                }
            }
        }
    }

    fn classify(&self, board: &Board, target: CellId) -> Option<Tier> {
        let cell = board.cell(target)?;
        let enemy = self.faction.opponent();
        let ours = cell.is_owned_by(self.faction);

        if cell.is_owned_by(enemy) && self.touches_our_base(board, target) {
            return Some(Tier::DefendBase);
        }
        if cell.kind() == CellKind::Resource
            && !ours
            && !cell.claims().is_claimed_by(self.faction)
        {
            return Some(Tier::Economy);
        }
        if cell.is_owned_by(enemy) || (cell.is_base() && !ours) {
            return Some(Tier::Aggression);
        }
        if cell.owner().is_none() {
            return Some(Tier::Expansion);
        }
        None
    }

    fn touches_our_base(&self, board: &Board, target: CellId) -> bool {
        board.neighbors(target).any(|neighbor| {
            board
                .cell(neighbor)
                .is_some_and(|cell| cell.is_base() && cell.is_owned_by(self.faction))
        })
    }

    fn evaluate(&self, before: &Board, after: &Board, report: &MoveReport) -> f64 {
        let enemy = self.faction.opponent();
        let own_change =
            f64::from(after.soldier_total(self.faction)) - f64::from(before.soldier_total(self.faction));
        let enemy_change = f64::from(after.soldier_total(enemy)) - f64::from(before.soldier_total(enemy));
        let mut score = own_change - enemy_change;

        if let Some(engagement) = report.engagement {
            score += engagement.attack_power - engagement.defense_power;
        }

        let takes_specialized_base = before.cell(report.order.to).is_some_and(|cell| {
            cell.specialization().is_some() && !cell.is_owned_by(self.faction)
        }) && report.conquered_owner == Some(self.faction);
        if takes_specialized_base {
            score += SPECIALIZED_BASE_BONUS;
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_sort_by_urgency() {
        assert!(Tier::DefendBase < Tier::Economy);
        assert!(Tier::Aggression < Tier::Expansion);
        assert!(Tier::DefendBase.weight() > Tier::Expansion.weight());
        assert_eq!(Tier::Economy.to_string(), "economy");
    }

    #[test]
    fn default_opponent_commands_the_ai() {
        assert_eq!(Opponent::default().faction(), Faction::Ai);
    }
}
