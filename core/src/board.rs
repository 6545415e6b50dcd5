//! Square board of cells and the battalions stationed on them.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
    Battalion, BattalionId, CellCoord, CellId, CellKind, Faction, SnapshotError, Specialization,
};

/// Records which factions already collected a cell's one-time resource reward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimLedger {
    /// Whether the player collected the reward.
    pub player: bool,
    /// Whether the opponent collected the reward.
    pub ai: bool,
}

impl ClaimLedger {
    /// Reports whether `faction` already collected the reward.
    #[must_use]
    pub const fn is_claimed_by(&self, faction: Faction) -> bool {
        match faction {
            Faction::Player => self.player,
            Faction::Ai => self.ai,
        }
    }

    /// Marks the reward as collected by `faction`.
    ///
    /// Returns `true` when this is the faction's first claim.
    pub fn claim(&mut self, faction: Faction) -> bool {
        let slot = match faction {
            Faction::Player => &mut self.player,
            Faction::Ai => &mut self.ai,
        };
        let first = !*slot;
        *slot = true;
        first
    }
}

/// A single grid position together with its garrison.
///
/// Ownership is never stored: it is derived from the stationed battalions, so
/// an empty cell is unowned and an occupied cell belongs to its occupants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    id: CellId,
    kind: CellKind,
    specialization: Option<Specialization>,
    battalions: Vec<Battalion>,
    claims: ClaimLedger,
}

impl Cell {
    /// Creates an empty cell. Specializations are only retained on bases.
    #[must_use]
    pub fn new(id: CellId, kind: CellKind, specialization: Option<Specialization>) -> Self {
        Self {
            id,
            kind,
            specialization: specialization.filter(|_| kind == CellKind::Base),
            battalions: Vec::new(),
            claims: ClaimLedger::default(),
        }
    }

    /// Creates a cell carrying an existing claim ledger.
    #[must_use]
    pub fn with_claims(mut self, claims: ClaimLedger) -> Self {
        self.claims = claims;
        self
    }

    /// Identifier derived from the cell's coordinates.
    #[must_use]
    pub const fn id(&self) -> CellId {
        self.id
    }

    /// Coordinates of the cell.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.id.coord()
    }

    /// Role the cell plays on the board.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Specialization fixed at creation, for bases.
    #[must_use]
    pub const fn specialization(&self) -> Option<Specialization> {
        self.specialization
    }

    /// Reports whether the cell is a base.
    #[must_use]
    pub fn is_base(&self) -> bool {
        self.kind == CellKind::Base
    }

    /// Faction holding the cell, derived from its battalions.
    #[must_use]
    pub fn owner(&self) -> Option<Faction> {
        self.battalions.first().map(|battalion| battalion.owner)
    }

    /// Reports whether `faction` holds the cell.
    #[must_use]
    pub fn is_owned_by(&self, faction: Faction) -> bool {
        self.owner() == Some(faction)
    }

    /// Battalions stationed on the cell.
    #[must_use]
    pub fn battalions(&self) -> &[Battalion] {
        &self.battalions
    }

    /// Mutable access to the stationed battalions without changing the roster.
    pub fn battalions_mut(&mut self) -> &mut [Battalion] {
        &mut self.battalions
    }

    /// Looks up a stationed battalion.
    #[must_use]
    pub fn battalion(&self, id: BattalionId) -> Option<&Battalion> {
        self.battalions.iter().find(|battalion| battalion.id == id)
    }

    /// Total soldiers stationed on the cell.
    #[must_use]
    pub fn soldier_total(&self) -> u32 {
        self.battalions
            .iter()
            .map(|battalion| battalion.soldiers)
            .sum()
    }

    /// Stations a battalion on the cell.
    ///
    /// The battalion is handed back when it belongs to a different faction
    /// than the current occupants or carries no soldiers.
    pub fn station(&mut self, battalion: Battalion) -> Result<(), Battalion> {
        if battalion.soldiers == 0 {
            return Err(battalion);
        }
        if let Some(owner) = self.owner() {
            if owner != battalion.owner {
                return Err(battalion);
            }
        }
        self.battalions.push(battalion);
        Ok(())
    }

    /// Removes a battalion from the cell.
    pub fn withdraw(&mut self, id: BattalionId) -> Option<Battalion> {
        let index = self
            .battalions
            .iter()
            .position(|battalion| battalion.id == id)?;
        Some(self.battalions.remove(index))
    }

    /// Removes every battalion from the cell.
    pub fn evacuate(&mut self) -> Vec<Battalion> {
        std::mem::take(&mut self.battalions)
    }

    /// Drops battalions that no longer carry soldiers.
    pub fn bury_fallen(&mut self) {
        self.battalions.retain(|battalion| battalion.soldiers > 0);
    }

    /// Claim ledger of the one-time resource reward.
    #[must_use]
    pub const fn claims(&self) -> ClaimLedger {
        self.claims
    }

    /// Marks the resource reward as collected by `faction`.
    ///
    /// Returns `true` when the cell is a resource site that `faction` had not
    /// claimed before.
    pub fn claim_resource(&mut self, faction: Faction) -> bool {
        self.kind == CellKind::Resource && self.claims.claim(faction)
    }
}

/// Square grid of cells stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Assembles a board from cells listed in row-major order.
    pub fn from_cells(size: u32, cells: Vec<Cell>) -> Result<Self, SnapshotError> {
        let expected = usize::try_from(size)
            .ok()
            .and_then(|side| side.checked_mul(side));
        if expected != Some(cells.len()) {
            return Err(SnapshotError::CellCount {
                size,
                cells: cells.len(),
            });
        }

        let board = Self { size, cells };
        for (index, cell) in board.cells.iter().enumerate() {
            if board.index(cell.id()) != Some(index) {
                return Err(SnapshotError::Misplaced {
                    cell: cell.id(),
                    index,
                });
            }
        }
        Ok(board)
    }

    /// Side length of the board.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Every cell in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Identifiers of every cell in row-major order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().map(Cell::id)
    }

    /// Looks up a cell.
    #[must_use]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.index(id).and_then(|index| self.cells.get(index))
    }

    /// Looks up a cell for mutation.
    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        let index = self.index(id)?;
        self.cells.get_mut(index)
    }

    /// Reports whether the identifier lies on the board.
    #[must_use]
    pub fn contains(&self, id: CellId) -> bool {
        self.index(id).is_some()
    }

    /// Orthogonal neighbours of a cell in the order east, west, south, north.
    pub fn neighbors(&self, id: CellId) -> impl Iterator<Item = CellId> {
        let size = self.size;
        let column = id.column();
        let row = id.row();
        let inside = column < size && row < size;
        let candidates = [
            column.checked_add(1).map(|c| CellId::new(c, row)),
            column.checked_sub(1).map(|c| CellId::new(c, row)),
            row.checked_add(1).map(|r| CellId::new(column, r)),
            row.checked_sub(1).map(|r| CellId::new(column, r)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |cell| inside && cell.column() < size && cell.row() < size)
    }

    /// Reports whether two cells share an edge.
    #[must_use]
    pub fn are_neighbors(&self, a: CellId, b: CellId) -> bool {
        self.contains(a) && self.contains(b) && a.coord().manhattan_distance(b.coord()) == 1
    }

    /// Finds the cell hosting a battalion.
    #[must_use]
    pub fn locate_battalion(&self, id: BattalionId) -> Option<CellId> {
        self.cells
            .iter()
            .find(|cell| cell.battalion(id).is_some())
            .map(Cell::id)
    }

    /// Cells held by `faction`.
    pub fn cells_owned_by(&self, faction: Faction) -> impl Iterator<Item = &Cell> + '_ {
        self.cells
            .iter()
            .filter(move |cell| cell.is_owned_by(faction))
    }

    /// Battalions commanded by `faction` together with their cells.
    pub fn battalions_of(
        &self,
        faction: Faction,
    ) -> impl Iterator<Item = (CellId, &Battalion)> + '_ {
        self.cells_owned_by(faction).flat_map(|cell| {
            cell.battalions()
                .iter()
                .map(move |battalion| (cell.id(), battalion))
        })
    }

    /// Mutable access to every battalion commanded by `faction`.
    pub fn battalions_of_mut(&mut self, faction: Faction) -> impl Iterator<Item = &mut Battalion> {
        self.cells
            .iter_mut()
            .flat_map(|cell| cell.battalions.iter_mut())
            .filter(move |battalion| battalion.owner == faction)
    }

    /// Number of bases held by `faction`.
    #[must_use]
    pub fn base_count(&self, faction: Faction) -> usize {
        self.cells_owned_by(faction)
            .filter(|cell| cell.is_base())
            .count()
    }

    /// Number of resource sites held by `faction`.
    #[must_use]
    pub fn resource_count(&self, faction: Faction) -> usize {
        self.cells_owned_by(faction)
            .filter(|cell| cell.kind() == CellKind::Resource)
            .count()
    }

    /// Total soldiers commanded by `faction`.
    #[must_use]
    pub fn soldier_total(&self, faction: Faction) -> u32 {
        self.cells_owned_by(faction).map(Cell::soldier_total).sum()
    }

    /// Specializations of the bases held by `faction`.
    #[must_use]
    pub fn owned_specializations(&self, faction: Faction) -> BTreeSet<Specialization> {
        self.cells_owned_by(faction)
            .filter(|cell| cell.is_base())
            .filter_map(Cell::specialization)
            .collect()
    }

    /// Checks the cell invariants: single-faction garrisons, positive
    /// soldier counts, bounded movement and unique battalion identifiers.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            let owner = cell.owner();
            for battalion in cell.battalions() {
                if Some(battalion.owner) != owner {
                    return Err(SnapshotError::MixedOccupants(cell.id()));
                }
                if battalion.soldiers == 0 {
                    return Err(SnapshotError::EmptyBattalion {
                        cell: cell.id(),
                        battalion: battalion.id,
                    });
                }
                if battalion.movement_left > battalion.max_movement {
                    return Err(SnapshotError::MovementOverflow(battalion.id));
                }
                if !seen.insert(battalion.id) {
                    return Err(SnapshotError::DuplicateBattalion(battalion.id));
                }
            }
        }
        Ok(())
    }

    fn index(&self, id: CellId) -> Option<usize> {
        if id.column() >= self.size || id.row() >= self.size {
            return None;
        }
        let width = usize::try_from(self.size).ok()?;
        let column = usize::try_from(id.column()).ok()?;
        let row = usize::try_from(id.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}
