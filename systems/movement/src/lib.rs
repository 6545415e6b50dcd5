#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reachability and path search under per-battalion movement budgets.
//!
//! Battalions travel across the four orthogonal neighbours of a cell. Each
//! step into territory held by the battalion's own faction costs one movement
//! point and the search may continue from there. Stepping onto any other cell
//! (enemy, neutral or empty) spends every remaining point at once and ends the
//! path, so a battalion can cross its own territory freely but commits itself
//! the moment it leaves friendly soil.

use std::collections::{BTreeMap, HashMap, VecDeque};

use grid_conquest_core::{Battalion, Board, CellId};

/// Cells a battalion can reach this turn together with the movement left on arrival.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reachability {
    movement_left: BTreeMap<CellId, u32>,
}

impl Reachability {
    /// Reports whether `cell` can be reached this turn.
    #[must_use]
    pub fn contains(&self, cell: CellId) -> bool {
        self.movement_left.contains_key(&cell)
    }

    /// Best movement left on arrival at `cell`, if it is reachable.
    #[must_use]
    pub fn movement_left(&self, cell: CellId) -> Option<u32> {
        self.movement_left.get(&cell).copied()
    }

    /// Reachable cells in identifier order with their movement left on arrival.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, u32)> + '_ {
        self.movement_left
            .iter()
            .map(|(cell, left)| (*cell, *left))
    }

    /// Reachable cell identifiers in identifier order.
    pub fn cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.movement_left.keys().copied()
    }

    /// Number of reachable cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.movement_left.len()
    }

    /// Reports whether no cell can be reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.movement_left.is_empty()
    }
}

/// Cheapest route between two cells and the movement it consumes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovementPath {
    cells: Vec<CellId>,
    cost: u32,
}

impl MovementPath {
    /// Every cell on the route, origin first and destination last.
    #[must_use]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }

    /// Movement points consumed by following the route.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of steps along the route.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// Final cell of the route.
    #[must_use]
    pub fn destination(&self) -> Option<CellId> {
        self.cells.last().copied()
    }
}

/// Computes every cell `battalion`, standing on `origin`, can reach this turn.
///
/// The origin itself is never part of the result.
#[must_use]
pub fn reachable(board: &Board, origin: CellId, battalion: &Battalion) -> Reachability {
    let mut best: BTreeMap<CellId, u32> = BTreeMap::new();
    if !board.contains(origin) {
        return Reachability::default();
    }

    let mut queue = VecDeque::from([(origin, battalion.movement_left)]);
    while let Some((cell, left)) = queue.pop_front() {
        for neighbor in board.neighbors(cell) {
            if neighbor == origin {
                continue;
            }
            let Some(step) = step_into(board, neighbor, battalion, left) else {
                continue;
            };
            if best.get(&neighbor).is_some_and(|known| *known >= step.remaining) {
                continue;
            }

            let _ = best.insert(neighbor, step.remaining);
            if step.continues() {
                queue.push_back((neighbor, step.remaining));
            }
        }
    }

    Reachability {
        movement_left: best,
    }
}

/// Finds the cheapest route for `battalion` from `origin` to `destination`.
///
/// Returns `None` when the destination lies out of reach this turn or is the
/// origin itself.
#[must_use]
pub fn find_path(
    board: &Board,
    origin: CellId,
    destination: CellId,
    battalion: &Battalion,
) -> Option<MovementPath> {
    if origin == destination || !board.contains(origin) || !board.contains(destination) {
        return None;
    }

    let budget = battalion.movement_left;
    let mut best: HashMap<CellId, u32> = HashMap::from([(origin, budget)]);
    let mut parents: HashMap<CellId, CellId> = HashMap::new();
    let mut queue = VecDeque::from([(origin, budget)]);

    while let Some((cell, left)) = queue.pop_front() {
        for neighbor in board.neighbors(cell) {
            let Some(step) = step_into(board, neighbor, battalion, left) else {
                continue;
            };

            if neighbor == destination {
                let _ = parents.insert(neighbor, cell);
                return Some(MovementPath {
                    cells: trace_back(&parents, origin, destination),
                    cost: budget - step.remaining,
                });
            }

            if !step.continues() {
                continue;
            }
            if best.get(&neighbor).is_some_and(|known| *known >= step.remaining) {
                continue;
            }

            let _ = best.insert(neighbor, step.remaining);
            let _ = parents.insert(neighbor, cell);
            queue.push_back((neighbor, step.remaining));
        }
    }

    None
}

#[derive(Clone, Copy, Debug)]
struct Step {
    remaining: u32,
    friendly: bool,
}

impl Step {
    fn continues(self) -> bool {
        self.friendly && self.remaining > 0
    }
}

fn step_into(board: &Board, cell: CellId, battalion: &Battalion, left: u32) -> Option<Step> {
    let target = board.cell(cell)?;
    let friendly = target.is_owned_by(battalion.owner);
    if friendly {
        let remaining = left.checked_sub(1)?;
        Some(Step {
            remaining,
            friendly,
        })
    } else if left == 0 {
        None
    } else {
        Some(Step {
            remaining: 0,
            friendly,
        })
    }
}

fn trace_back(parents: &HashMap<CellId, CellId>, origin: CellId, destination: CellId) -> Vec<CellId> {
    let mut cells = vec![destination];
    let mut cursor = destination;
    while cursor != origin {
        match parents.get(&cursor) {
            Some(parent) => {
                cursor = *parent;
                cells.push(cursor);
            }
            None => break,
        }
    }
    cells.reverse();
    cells
}
