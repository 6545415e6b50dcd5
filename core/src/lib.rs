#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Conquest engine.
//!
//! This crate defines the data model and message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired state transitions, the world executes
//! those commands via its `apply` entry point and publishes a new
//! [`GameSnapshot`], then broadcasts [`Event`] values describing what happened.
//! Systems only read boards and snapshots and answer with new values; they
//! never mutate published state in place.

mod board;
mod catalog;
mod chance;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use board::{Board, Cell, ClaimLedger};
pub use catalog::{
    affordable_blueprints, available_blueprints, blueprint, catalog, cheapest_unlock_free,
    UnitBlueprint, UnitType,
};
pub use chance::{
    Chance, SeededChance, SteadyChance, FORTUNE_MAX, FORTUNE_MIN, REWARD_MAX, REWARD_MIN,
};

/// Smallest square board the engine accepts.
pub const MIN_GRID_SIZE: u32 = 4;
/// Largest square board the engine accepts.
pub const MAX_GRID_SIZE: u32 = 12;
/// Board size used when no explicit size has been requested.
pub const DEFAULT_GRID_SIZE: u32 = 8;

/// Reports whether the provided side length lies within the supported bounds.
#[must_use]
pub const fn is_valid_grid_size(size: u32) -> bool {
    size >= MIN_GRID_SIZE && size <= MAX_GRID_SIZE
}

/// One of the two sides competing for the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// The human commander.
    Player,
    /// The scripted opponent.
    Ai,
}

impl Faction {
    /// Both factions in turn order.
    pub const ALL: [Faction; 2] = [Faction::Player, Faction::Ai];

    /// Returns the faction opposing `self`.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Ai,
            Self::Ai => Self::Player,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Ai => f.write_str("ai"),
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }
}

/// Unique identifier of a cell, derived from its coordinates.
///
/// Identifiers render as `"x-y"` and are serialised in that form so that saved
/// games stay readable by presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CellId(CellCoord);

impl CellId {
    /// Creates the identifier of the cell at the provided column and row.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self(CellCoord::new(column, row))
    }

    /// Creates the identifier of the cell located at `coord`.
    #[must_use]
    pub const fn from_coord(coord: CellCoord) -> Self {
        Self(coord)
    }

    /// Coordinates the identifier was derived from.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.0
    }

    /// Zero-based column of the identified cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.0.column()
    }

    /// Zero-based row of the identified cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.0.row()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.column(), self.row())
    }
}

impl FromStr for CellId {
    type Err = CellIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || CellIdError::Malformed(value.to_owned());
        let (column, row) = value.trim().split_once('-').ok_or_else(malformed)?;
        let column = column.parse::<u32>().map_err(|_| malformed())?;
        let row = row.parse::<u32>().map_err(|_| malformed())?;
        Ok(Self::new(column, row))
    }
}

impl From<CellId> for String {
    fn from(id: CellId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CellId {
    type Error = CellIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Error produced when parsing a textual cell identifier.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CellIdError {
    /// The text was not two unsigned integers joined by a dash.
    #[error("cell id `{0}` is not of the form x-y")]
    Malformed(String),
}

/// Role a cell plays on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    /// Plain territory without special properties.
    Neutral,
    /// A base that produces income and can train battalions.
    Base,
    /// A resource site paying a one-time reward to each faction that seizes it.
    Resource,
}

/// Production trait attached to a base when the map is generated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialization {
    /// Raises standard income and unlocks the assault vanguard.
    Barracks,
    /// Levies artillery and unlocks the artillery battery.
    Forge,
    /// Levies guardians and unlocks the sanctuary guardians.
    Sanctuary,
}

impl Specialization {
    /// Every specialization in a stable order.
    pub const ALL: [Specialization; 3] = [
        Specialization::Barracks,
        Specialization::Forge,
        Specialization::Sanctuary,
    ];
}

/// Unique identifier assigned to a battalion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BattalionId(u32);

impl BattalionId {
    /// Creates a new battalion identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for BattalionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic allocator handing out battalion identifiers.
///
/// The allocator lives inside the snapshot so identifiers remain unique after
/// a game is saved and restored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattalionIds {
    next: u32,
}

impl BattalionIds {
    /// Creates an allocator whose first identifier is `next`.
    #[must_use]
    pub const fn starting_at(next: u32) -> Self {
        Self { next }
    }

    /// Value the next allocated identifier will carry.
    #[must_use]
    pub const fn peek(&self) -> u32 {
        self.next
    }

    /// Allocates a fresh identifier.
    pub fn allocate(&mut self) -> BattalionId {
        let id = BattalionId::new(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

impl Default for BattalionIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

/// A stack of same-type soldiers belonging to one faction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battalion {
    /// Identifier unique across the whole game.
    pub id: BattalionId,
    /// Faction commanding the battalion.
    pub owner: Faction,
    /// Catalog type the battalion was trained as.
    pub unit: UnitType,
    /// Number of soldiers; strictly positive while the battalion exists.
    pub soldiers: u32,
    /// Attack rating per soldier.
    pub attack: u32,
    /// Defense rating per soldier.
    pub defense: u32,
    /// Movement points restored at the start of each of the owner's turns.
    pub max_movement: u32,
    /// Movement points still available this turn.
    pub movement_left: u32,
}

impl Battalion {
    /// Creates a battalion from the catalog entry for `unit`.
    ///
    /// `movement_left` is clamped to the blueprint's movement allowance.
    #[must_use]
    pub fn from_blueprint(
        id: BattalionId,
        owner: Faction,
        unit: UnitType,
        movement_left: u32,
    ) -> Self {
        let blueprint = unit.blueprint();
        Self {
            id,
            owner,
            unit,
            soldiers: blueprint.soldiers,
            attack: blueprint.attack,
            defense: blueprint.defense,
            max_movement: blueprint.movement,
            movement_left: movement_left.min(blueprint.movement),
        }
    }

    /// Total offensive weight of the stack (soldiers × attack).
    #[must_use]
    pub fn attack_strength(&self) -> f64 {
        f64::from(self.soldiers) * f64::from(self.attack)
    }

    /// Total defensive weight of the stack (soldiers × defense).
    #[must_use]
    pub fn defense_strength(&self) -> f64 {
        f64::from(self.soldiers) * f64::from(self.defense)
    }

    /// Reports whether the battalion may still act this turn.
    #[must_use]
    pub const fn can_move(&self) -> bool {
        self.movement_left > 0
    }

    /// Consumes up to `cost` movement points.
    pub fn spend_movement(&mut self, cost: u32) {
        self.movement_left = self.movement_left.saturating_sub(cost);
    }

    /// Consumes every remaining movement point.
    pub fn exhaust(&mut self) {
        self.movement_left = 0;
    }

    /// Restores the full movement allowance.
    pub fn restore_movement(&mut self) {
        self.movement_left = self.max_movement;
    }
}

/// Overall state of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    /// The match is in progress.
    Playing,
    /// The opponent lost its last base.
    PlayerVictory,
    /// The player lost its last base.
    AiVictory,
    /// The player held the base majority long enough.
    PlayerMajority,
    /// The opponent held the base majority long enough.
    AiMajority,
}

impl GameStatus {
    /// Reports whether the status ends the match.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Playing)
    }

    /// Terminal status awarded when `winner` eliminates the other side's bases.
    #[must_use]
    pub const fn conquest_by(winner: Faction) -> Self {
        match winner {
            Faction::Player => Self::PlayerVictory,
            Faction::Ai => Self::AiVictory,
        }
    }

    /// Terminal status awarded when `holder` keeps the majority long enough.
    #[must_use]
    pub const fn majority_by(holder: Faction) -> Self {
        match holder {
            Faction::Player => Self::PlayerMajority,
            Faction::Ai => Self::AiMajority,
        }
    }

    /// Faction that won the match, if it is over.
    #[must_use]
    pub const fn winner(self) -> Option<Faction> {
        match self {
            Self::Playing => None,
            Self::PlayerVictory | Self::PlayerMajority => Some(Faction::Player),
            Self::AiVictory | Self::AiMajority => Some(Faction::Ai),
        }
    }
}

/// Presentation record of the most recent resolved move.
///
/// The record is not authoritative; it exists so adapters can highlight and
/// animate the last action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LastAction {
    /// Cell the battalion moved from.
    pub from: CellId,
    /// Cell the battalion moved toward.
    pub to: CellId,
    /// Owner of the destination once the move resolved.
    pub conquered_owner: Option<Faction>,
    /// Logical timestamp taken from the snapshot's action sequence.
    pub timestamp: u64,
    /// Fortune rolled by the winning side, when combat took place.
    pub fortune: Option<f64>,
    /// One-time resource reward granted by the move, if any.
    pub reward: Option<u32>,
}

/// Per-faction resource balances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    /// Balance available to the player.
    pub player: u32,
    /// Balance available to the opponent.
    pub ai: u32,
}

impl Resources {
    /// Creates a ledger where both factions hold `amount`.
    #[must_use]
    pub const fn splat(amount: u32) -> Self {
        Self {
            player: amount,
            ai: amount,
        }
    }

    /// Balance held by `faction`.
    #[must_use]
    pub const fn of(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Player => self.player,
            Faction::Ai => self.ai,
        }
    }

    /// Adds `amount` to the balance of `faction`.
    pub fn credit(&mut self, faction: Faction, amount: u32) {
        let balance = self.balance_mut(faction);
        *balance = balance.saturating_add(amount);
    }

    /// Removes `amount` from the balance of `faction` if it can be afforded.
    ///
    /// Returns `false` and leaves the ledger untouched otherwise.
    pub fn try_debit(&mut self, faction: Faction, amount: u32) -> bool {
        let balance = self.balance_mut(faction);
        match balance.checked_sub(amount) {
            Some(remaining) => {
                *balance = remaining;
                true
            }
            None => false,
        }
    }

    fn balance_mut(&mut self, faction: Faction) -> &mut u32 {
        match faction {
            Faction::Player => &mut self.player,
            Faction::Ai => &mut self.ai,
        }
    }
}

/// Complete persistable state of a match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Square board holding every cell.
    pub board: Board,
    /// Faction whose phase is active.
    pub current_turn: Faction,
    /// Round counter starting at 1.
    pub turn_number: u32,
    /// Faction currently holding strictly more bases, if any.
    pub majority_owner: Option<Faction>,
    /// Consecutive post-opponent evaluations the majority has held.
    pub majority_streak: u32,
    /// Whether the match is in progress or which terminal outcome it reached.
    pub status: GameStatus,
    /// Most recent resolved move, for presentation.
    pub last_action: Option<LastAction>,
    /// Resource balances of both factions.
    pub resources: Resources,
    /// Allocator for new battalion identifiers.
    pub battalion_ids: BattalionIds,
    /// Logical clock used to stamp action records.
    pub action_sequence: u64,
}

impl GameSnapshot {
    /// Side length of the board.
    #[must_use]
    pub fn grid_size(&self) -> u32 {
        self.board.size()
    }

    /// Advances the logical clock and returns the new timestamp.
    pub fn next_timestamp(&mut self) -> u64 {
        self.action_sequence = self.action_sequence.saturating_add(1);
        self.action_sequence
    }

    /// Verifies that the snapshot is internally consistent.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        self.board.validate()?;

        if self.turn_number == 0 {
            return Err(SnapshotError::TurnNumber);
        }

        if let Some(highest) = self
            .board
            .cells()
            .iter()
            .flat_map(|cell| cell.battalions())
            .map(|battalion| battalion.id.get())
            .max()
        {
            if highest >= self.battalion_ids.peek() {
                return Err(SnapshotError::StaleAllocator {
                    next: self.battalion_ids.peek(),
                    highest,
                });
            }
        }

        Ok(())
    }
}

/// Commands that express all permissible state transitions.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Toggles selection of a player-owned cell.
    SelectCell {
        /// Cell to select or deselect.
        cell: CellId,
    },
    /// Selects a specific player battalion and the cell it occupies.
    SelectBattalion {
        /// Battalion to select.
        battalion: BattalionId,
    },
    /// Drops any current selection.
    ClearSelection,
    /// Moves the selected battalion toward the provided cell.
    MoveSelectedTo {
        /// Destination of the move.
        cell: CellId,
    },
    /// Ends the player's phase and runs the opponent's phase.
    EndTurn,
    /// Trains a battalion at a player-owned base.
    ProduceAt {
        /// Base that trains the battalion.
        cell: CellId,
        /// Chosen unit type, or `None` when the choice was cancelled.
        unit: Option<UnitType>,
    },
    /// Starts a fresh match.
    NewGame {
        /// Board size for the new match; the current size when absent.
        size: Option<u32>,
    },
    /// Starts a fresh match with a different board size.
    SetGridSize {
        /// Requested board size.
        size: u32,
    },
    /// Marks the session as hydrated, optionally restoring a saved snapshot.
    Hydrate {
        /// Snapshot recovered from storage, if any.
        snapshot: Option<Box<GameSnapshot>>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new match was generated.
    GameStarted {
        /// Side length of the generated board.
        size: u32,
    },
    /// The session finished hydrating from storage.
    Hydrated {
        /// Whether a stored snapshot replaced the current game.
        restored: bool,
    },
    /// A cell became the active selection.
    CellSelected {
        /// Selected cell.
        cell: CellId,
        /// Battalion preselected within the cell.
        battalion: BattalionId,
    },
    /// A battalion became the active selection.
    BattalionSelected {
        /// Cell hosting the battalion.
        cell: CellId,
        /// Selected battalion.
        battalion: BattalionId,
    },
    /// The selection was dropped.
    SelectionCleared,
    /// A move was resolved and published.
    MoveResolved {
        /// Faction that issued the move.
        faction: Faction,
        /// Presentation record of the move.
        action: LastAction,
    },
    /// A move order was rejected and the game left unchanged.
    MoveRejected {
        /// Faction that issued the move.
        faction: Faction,
        /// Specific reason the move failed.
        reason: MoveError,
    },
    /// A battalion was trained at a base.
    BattalionTrained {
        /// Faction that paid for the battalion.
        faction: Faction,
        /// Base hosting the new battalion.
        cell: CellId,
        /// Identifier of the new battalion.
        battalion: BattalionId,
        /// Unit type trained.
        unit: UnitType,
        /// Resources deducted.
        cost: u32,
    },
    /// A production request was rejected and the game left unchanged.
    ProductionRejected {
        /// Specific reason the request failed.
        reason: ProductionError,
    },
    /// Bases paid out income at the start of a faction's phase.
    IncomeCollected {
        /// Faction receiving the income.
        faction: Faction,
        /// Total resources credited.
        amount: u32,
    },
    /// A specialized base levied a free battalion.
    ReinforcementsArrived {
        /// Faction receiving the battalion.
        faction: Faction,
        /// Base hosting the battalion.
        cell: CellId,
        /// Identifier of the levied battalion.
        battalion: BattalionId,
        /// Unit type levied.
        unit: UnitType,
    },
    /// The opponent found no legal move this turn.
    OpponentPassed,
    /// A faction's phase began.
    TurnStarted {
        /// Faction whose phase began.
        faction: Faction,
        /// Round counter.
        turn: u32,
    },
    /// The majority holder or its streak changed.
    MajorityChanged {
        /// Faction holding strictly more bases, if any.
        owner: Option<Faction>,
        /// Consecutive evaluations the majority has held.
        streak: u32,
    },
    /// The match reached a terminal status.
    GameOver {
        /// Terminal status reached.
        status: GameStatus,
    },
    /// A command was not accepted in the current state.
    CommandIgnored {
        /// Specific reason the command was ignored.
        reason: CommandError,
    },
}

/// Reasons a move order may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum MoveError {
    /// Either endpoint does not exist on the board.
    #[error("cell {0} does not exist")]
    UnknownCell(CellId),
    /// Origin and destination are the same cell.
    #[error("a battalion cannot move onto its own cell")]
    SameCell,
    /// The battalion is not stationed at the origin.
    #[error("battalion {battalion} is not stationed at {cell}")]
    MissingBattalion {
        /// Battalion named in the order.
        battalion: BattalionId,
        /// Origin named in the order.
        cell: CellId,
    },
    /// The battalion belongs to the other faction.
    #[error("battalion {0} is commanded by the other faction")]
    NotOwned(BattalionId),
    /// The battalion has no movement left this turn.
    #[error("battalion {0} has no movement left")]
    Exhausted(BattalionId),
    /// No path within the movement budget reaches the destination.
    #[error("cell {0} is out of reach this turn")]
    Unreachable(CellId),
}

/// Reasons a production request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum ProductionError {
    /// The cell does not exist on the board.
    #[error("cell {0} does not exist")]
    UnknownCell(CellId),
    /// The cell is not a base held by the producing faction.
    #[error("cell {0} is not a base held by the producing faction")]
    NotOwnedBase(CellId),
    /// The faction does not hold the specialization unlocking the unit.
    #[error("{0:?} is locked until the matching specialization is held")]
    Locked(UnitType),
    /// The faction cannot afford the unit.
    #[error("training costs {needed} but only {available} is available")]
    InsufficientResources {
        /// Cost of the requested unit.
        needed: u32,
        /// Balance of the producing faction.
        available: u32,
    },
    /// The unit chooser returned no choice.
    #[error("production was cancelled")]
    Cancelled,
}

/// Reasons a command may be ignored outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum CommandError {
    /// The match already reached a terminal status.
    #[error("the match is over")]
    GameOver,
    /// The command may only be issued during the player's phase.
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    /// A move was requested without a selected battalion.
    #[error("no battalion is selected")]
    NoSelection,
    /// The named cell does not exist or cannot be selected.
    #[error("cell {0} cannot be selected")]
    UnselectableCell(CellId),
    /// The named battalion does not exist or cannot be selected.
    #[error("battalion {0} cannot be selected")]
    UnselectableBattalion(BattalionId),
    /// The requested board size lies outside the supported bounds.
    #[error("grid size {0} is outside the supported range")]
    InvalidGridSize(u32),
    /// The requested board size matches the current one.
    #[error("grid size {0} is already in use")]
    UnchangedGridSize(u32),
    /// The resulting state failed validation and was discarded.
    #[error("the resulting state was inconsistent and has been rolled back")]
    Inconsistent,
}

/// Invariant violations detected while validating a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The board does not hold exactly `size × size` cells.
    #[error("board of size {size} holds {cells} cells")]
    CellCount {
        /// Declared side length.
        size: u32,
        /// Number of cells present.
        cells: usize,
    },
    /// A cell is stored out of row-major order.
    #[error("cell {cell} is stored at index {index}")]
    Misplaced {
        /// Identifier of the misplaced cell.
        cell: CellId,
        /// Index the cell was found at.
        index: usize,
    },
    /// A cell hosts battalions of both factions.
    #[error("cell {0} hosts battalions of both factions")]
    MixedOccupants(CellId),
    /// A battalion without soldiers remained on the board.
    #[error("battalion {battalion} on {cell} has no soldiers")]
    EmptyBattalion {
        /// Cell hosting the battalion.
        cell: CellId,
        /// Offending battalion.
        battalion: BattalionId,
    },
    /// A battalion has more movement left than its allowance.
    #[error("battalion {0} exceeds its movement allowance")]
    MovementOverflow(BattalionId),
    /// A battalion identifier appears more than once.
    #[error("battalion {0} appears more than once")]
    DuplicateBattalion(BattalionId),
    /// The battalion allocator would hand out an identifier already in use.
    #[error("next battalion id {next} does not exceed the highest id {highest}")]
    StaleAllocator {
        /// Next identifier the allocator would hand out.
        next: u32,
        /// Highest identifier present on the board.
        highest: u32,
    },
    /// The turn counter is zero.
    #[error("turn numbers start at 1")]
    TurnNumber,
}
