#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomised board generation.
//!
//! Each faction starts from a fixed home base in opposite corners, garrisoned
//! by a single infantry battalion that cannot move on the turn it appears.
//! Every other cell independently rolls into a specialized neutral base, a
//! resource site, or plain territory.

use grid_conquest_core::{
    is_valid_grid_size, Battalion, BattalionIds, Board, Cell, CellId, CellKind, Chance, Faction,
    SnapshotError, Specialization, UnitType, DEFAULT_GRID_SIZE, MAX_GRID_SIZE, MIN_GRID_SIZE,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Probability that a non-home cell becomes a neutral base.
pub const DEFAULT_NEUTRAL_BASE_CHANCE: f64 = 0.08;
/// Probability that a non-home cell becomes a resource site.
pub const DEFAULT_RESOURCE_CHANCE: f64 = 0.2;

/// Parameters controlling board generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Side length of the square board.
    pub size: u32,
    /// Probability that a non-home cell becomes a neutral base.
    pub neutral_base_chance: f64,
    /// Probability that a non-home cell becomes a resource site.
    pub resource_chance: f64,
}

impl MapConfig {
    /// Default probabilities on a board of the provided size.
    #[must_use]
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            neutral_base_chance: DEFAULT_NEUTRAL_BASE_CHANCE,
            resource_chance: DEFAULT_RESOURCE_CHANCE,
        }
    }
}

/// Errors raised while generating a board.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// The requested side length lies outside the supported range.
    #[error("grid size {0} is outside {MIN_GRID_SIZE}..={MAX_GRID_SIZE}")]
    InvalidSize(u32),
    /// A probability was negative or not a number.
    #[error("probability {0} must be a finite, non-negative number")]
    InvalidProbability(f64),
    /// The generated cells did not assemble into a board.
    #[error(transparent)]
    Board(#[from] SnapshotError),
}

/// Home base of `faction` on a board with side length `size`.
#[must_use]
pub const fn home_base(faction: Faction, size: u32) -> CellId {
    match faction {
        Faction::Player => CellId::new(0, 0),
        Faction::Ai => CellId::new(size.saturating_sub(1), size.saturating_sub(1)),
    }
}

/// Pure system that lays out a fresh board.
#[derive(Clone, Copy, Debug, Default)]
pub struct MapGenerator {
    config: MapConfig,
}

impl MapGenerator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub const fn new(config: MapConfig) -> Self {
        Self { config }
    }

    /// Configuration the generator was built with.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Generates a board, allocating starting battalion identifiers from `ids`.
    pub fn generate<C>(&self, ids: &mut BattalionIds, chance: &mut C) -> Result<Board, GenerationError>
    where
        C: Chance + ?Sized,
    {
        let MapConfig {
            size,
            neutral_base_chance,
            resource_chance,
        } = self.config;

        if !is_valid_grid_size(size) {
            return Err(GenerationError::InvalidSize(size));
        }
        for probability in [neutral_base_chance, resource_chance] {
            if !probability.is_finite() || probability < 0.0 {
                return Err(GenerationError::InvalidProbability(probability));
            }
        }

        let mut cells = Vec::with_capacity(usize::try_from(size * size).unwrap_or(0));
        for row in 0..size {
            for column in 0..size {
                let id = CellId::new(column, row);
                let cell = match home_faction(id, size) {
                    Some(faction) => garrisoned_home(id, faction, ids),
                    None => self.roll_cell(id, chance),
                };
                cells.push(cell);
            }
        }

        let board = Board::from_cells(size, cells)?;
        tracing::debug!(
            size,
            bases = board.cells().iter().filter(|cell| cell.is_base()).count(),
            resources = board
                .cells()
                .iter()
                .filter(|cell| cell.kind() == CellKind::Resource)
                .count(),
            "generated board"
        );
        Ok(board)
    }

    fn roll_cell<C>(&self, id: CellId, chance: &mut C) -> Cell
    where
        C: Chance + ?Sized,
    {
        let roll = chance.unit();
        if roll < self.config.neutral_base_chance {
            let specialization = Specialization::ALL[chance.index(Specialization::ALL.len())];
            Cell::new(id, CellKind::Base, Some(specialization))
        } else if roll < self.config.neutral_base_chance + self.config.resource_chance {
            Cell::new(id, CellKind::Resource, None)
        } else {
            Cell::new(id, CellKind::Neutral, None)
        }
    }
}

fn home_faction(id: CellId, size: u32) -> Option<Faction> {
    Faction::ALL
        .into_iter()
        .find(|faction| home_base(*faction, size) == id)
}

fn garrisoned_home(id: CellId, faction: Faction, ids: &mut BattalionIds) -> Cell {
    let mut cell = Cell::new(id, CellKind::Base, None);
    let garrison = Battalion::from_blueprint(ids.allocate(), faction, UnitType::Infantry, 0);
    if cell.station(garrison).is_err() {
        tracing::warn!(cell = %id, "home garrison was refused");
    }
    cell
}
