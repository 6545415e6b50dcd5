//! Stored representation of a snapshot and its upgrade into the current model.
//!
//! The stored form uses the camelCase field names presentation layers read.
//! Every field is optional on the way in so that saves written by earlier
//! schema versions, including the flat unit counts of version 1, still load.

use std::collections::{BTreeMap, BTreeSet};

use grid_conquest_core::{
    is_valid_grid_size, Battalion, BattalionId, BattalionIds, Board, Cell, CellId, CellKind,
    ClaimLedger, Faction, GameSnapshot, GameStatus, LastAction, Resources, Specialization,
    UnitType,
};
use serde::{Deserialize, Serialize};

use crate::CodecError;

/// Placeholder carried by battalions whose stored id was unusable.
const PENDING_ID: BattalionId = BattalionId::new(0);

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredSnapshot {
    #[serde(default)]
    grid_size: Option<u32>,
    #[serde(default)]
    cells: Vec<StoredCell>,
    #[serde(default)]
    current_turn: Option<Faction>,
    #[serde(default)]
    turn_number: Option<u32>,
    #[serde(default)]
    majority_owner: Option<Faction>,
    #[serde(default)]
    majority_streak: Option<u32>,
    #[serde(default)]
    status: Option<StoredStatus>,
    #[serde(default)]
    last_action: Option<StoredLastAction>,
    #[serde(default)]
    resources: Option<StoredResources>,
    #[serde(default)]
    next_battalion_id: Option<u32>,
    #[serde(default)]
    action_sequence: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredStatus {
    Known(GameStatus),
    Unknown(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCell {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    x: u32,
    y: u32,
    #[serde(rename = "type", default)]
    kind: Option<CellKind>,
    #[serde(default)]
    specialization: Option<Specialization>,
    #[serde(default)]
    owner: Option<Faction>,
    #[serde(default, alias = "resourceClaimedBy")]
    claimed_by: Option<ClaimLedger>,
    #[serde(default)]
    battalions: Vec<StoredBattalion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    special_units: Option<LegacySpecialUnits>,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct LegacySpecialUnits {
    #[serde(default)]
    elite: u32,
    #[serde(default)]
    guardian: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredBattalion {
    #[serde(default)]
    id: Option<StoredBattalionId>,
    #[serde(default)]
    owner: Option<Faction>,
    #[serde(rename = "type", default)]
    unit: Option<UnitType>,
    #[serde(default)]
    soldiers: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attack: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    defense: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_movement: Option<u32>,
    #[serde(default)]
    movement_left: Option<u32>,
}

/// Balances may be missing per faction; gaps take the starting amount.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct StoredResources {
    #[serde(default)]
    player: Option<u32>,
    #[serde(default)]
    ai: Option<u32>,
}

impl StoredResources {
    fn capture(resources: Resources) -> Self {
        Self {
            player: Some(resources.player),
            ai: Some(resources.ai),
        }
    }

    fn restore(self, starting_resources: u32) -> Resources {
        Resources {
            player: self.player.unwrap_or(starting_resources),
            ai: self.ai.unwrap_or(starting_resources),
        }
    }
}

/// Battalion ids were once strings such as `"infantry-12"`.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredBattalionId {
    Number(u32),
    Text(String),
}

impl StoredBattalionId {
    fn numeric(&self) -> Option<u32> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.rsplit('-').next()?.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLastAction {
    from_id: String,
    to_id: String,
    #[serde(default)]
    conquered_owner: Option<Faction>,
    #[serde(default)]
    timestamp: u64,
    #[serde(default)]
    fortune: Option<f64>,
    #[serde(default)]
    reward: Option<u32>,
}

impl StoredSnapshot {
    pub(crate) fn capture(snapshot: &GameSnapshot) -> Self {
        Self {
            grid_size: Some(snapshot.grid_size()),
            cells: snapshot.board.cells().iter().map(StoredCell::capture).collect(),
            current_turn: Some(snapshot.current_turn),
            turn_number: Some(snapshot.turn_number),
            majority_owner: snapshot.majority_owner,
            majority_streak: Some(snapshot.majority_streak),
            status: Some(StoredStatus::Known(snapshot.status)),
            last_action: snapshot.last_action.as_ref().map(StoredLastAction::capture),
            resources: Some(StoredResources::capture(snapshot.resources)),
            next_battalion_id: Some(snapshot.battalion_ids.peek()),
            action_sequence: Some(snapshot.action_sequence),
        }
    }

    /// Upgrades the stored form into a validated snapshot.
    pub(crate) fn restore(self, starting_resources: u32) -> Result<GameSnapshot, CodecError> {
        let size = self
            .grid_size
            .or_else(|| infer_size(&self.cells))
            .ok_or(CodecError::UnknownGridSize)?;
        if !is_valid_grid_size(size) {
            return Err(CodecError::InvalidGridSize(size));
        }

        let mut stored = BTreeMap::new();
        for cell in self.cells {
            if cell.x >= size || cell.y >= size {
                tracing::warn!(x = cell.x, y = cell.y, size, "dropped cell outside the board");
                continue;
            }
            let id = CellId::new(cell.x, cell.y);
            if stored.insert(id, cell).is_some() {
                tracing::warn!(cell = %id, "duplicate cell in save, keeping the last copy");
            }
        }

        let mut ledger = IdLedger::default();
        let mut cells = Vec::with_capacity(stored.len());
        for row in 0..size {
            for column in 0..size {
                let id = CellId::new(column, row);
                let cell = match stored.remove(&id) {
                    Some(cell) => cell.restore(id, &mut ledger),
                    None => {
                        tracing::debug!(cell = %id, "filled missing cell");
                        Cell::new(id, CellKind::Neutral, None)
                    }
                };
                cells.push(cell);
            }
        }
        let battalion_ids = ledger.settle(&mut cells, self.next_battalion_id);

        let status = match self.status {
            None => GameStatus::Playing,
            Some(StoredStatus::Known(status)) => status,
            Some(StoredStatus::Unknown(value)) => {
                tracing::warn!(%value, "unknown status in save, resuming play");
                GameStatus::Playing
            }
        };
        let last_action = self.last_action.and_then(StoredLastAction::restore);
        let action_sequence = self
            .action_sequence
            .unwrap_or_else(|| last_action.as_ref().map_or(0, |action| action.timestamp));
        let majority_owner = self.majority_owner;

        let snapshot = GameSnapshot {
            board: Board::from_cells(size, cells)?,
            current_turn: self.current_turn.unwrap_or(Faction::Player),
            turn_number: self.turn_number.filter(|turn| *turn > 0).unwrap_or(1),
            majority_owner,
            majority_streak: majority_owner.and(self.majority_streak).unwrap_or(0),
            status,
            last_action,
            resources: self
                .resources
                .unwrap_or_default()
                .restore(starting_resources),
            battalion_ids,
            action_sequence,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Side length implied by the furthest stored coordinate.
fn infer_size(cells: &[StoredCell]) -> Option<u32> {
    cells
        .iter()
        .map(|cell| cell.x.max(cell.y).saturating_add(1))
        .max()
}

impl StoredCell {
    fn capture(cell: &Cell) -> Self {
        Self {
            id: Some(cell.id().to_string()),
            x: cell.id().column(),
            y: cell.id().row(),
            kind: Some(cell.kind()),
            specialization: cell.specialization(),
            owner: cell.owner(),
            claimed_by: Some(cell.claims()),
            battalions: cell
                .battalions()
                .iter()
                .map(StoredBattalion::capture)
                .collect(),
            units: None,
            special_units: None,
        }
    }

    fn restore(self, id: CellId, ledger: &mut IdLedger) -> Cell {
        let kind = self.kind.unwrap_or(CellKind::Neutral);
        let mut cell = Cell::new(id, kind, self.specialization)
            .with_claims(self.claimed_by.unwrap_or_default());

        let battalions = if self.battalions.is_empty() {
            legacy_battalions(self.owner, self.units, self.special_units)
        } else {
            let owner = self.owner;
            self.battalions
                .into_iter()
                .filter_map(|battalion| battalion.restore(owner, ledger))
                .collect()
        };

        for battalion in battalions {
            if let Err(refused) = cell.station(battalion) {
                tracing::warn!(cell = %id, battalion = %refused.id, "dropped battalion of a second faction");
            }
        }
        cell
    }
}

/// Version 1 cells stored an owner and plain soldier counts.
fn legacy_battalions(
    owner: Option<Faction>,
    units: Option<u32>,
    special: Option<LegacySpecialUnits>,
) -> Vec<Battalion> {
    let Some(owner) = owner else {
        return Vec::new();
    };
    let special = special.unwrap_or_default();
    [
        (UnitType::Infantry, units.unwrap_or(0)),
        (UnitType::Vanguard, special.elite),
        (UnitType::Guardian, special.guardian),
    ]
    .into_iter()
    .filter(|(_, soldiers)| *soldiers > 0)
    .map(|(unit, soldiers)| {
        let mut battalion = Battalion::from_blueprint(PENDING_ID, owner, unit, u32::MAX);
        battalion.soldiers = soldiers;
        battalion
    })
    .collect()
}

impl StoredBattalion {
    fn capture(battalion: &Battalion) -> Self {
        Self {
            id: Some(StoredBattalionId::Number(battalion.id.get())),
            owner: Some(battalion.owner),
            unit: Some(battalion.unit),
            soldiers: battalion.soldiers,
            attack: Some(battalion.attack),
            defense: Some(battalion.defense),
            max_movement: Some(battalion.max_movement),
            movement_left: Some(battalion.movement_left),
        }
    }

    /// Rebuilds the battalion from its blueprint. Stored ratings are ignored.
    fn restore(self, cell_owner: Option<Faction>, ledger: &mut IdLedger) -> Option<Battalion> {
        if self.soldiers == 0 {
            return None;
        }
        let Some(owner) = self.owner.or(cell_owner) else {
            tracing::warn!("dropped battalion without an owner");
            return None;
        };
        let id = ledger.claim(self.id.as_ref().and_then(StoredBattalionId::numeric));
        let unit = self.unit.unwrap_or(UnitType::Infantry);
        let mut battalion =
            Battalion::from_blueprint(id, owner, unit, self.movement_left.unwrap_or(u32::MAX));
        battalion.soldiers = self.soldiers;
        Some(battalion)
    }
}

impl StoredLastAction {
    fn capture(action: &LastAction) -> Self {
        Self {
            from_id: action.from.to_string(),
            to_id: action.to.to_string(),
            conquered_owner: action.conquered_owner,
            timestamp: action.timestamp,
            fortune: action.fortune,
            reward: action.reward,
        }
    }

    fn restore(self) -> Option<LastAction> {
        Some(LastAction {
            from: self.from_id.parse().ok()?,
            to: self.to_id.parse().ok()?,
            conquered_owner: self.conquered_owner,
            timestamp: self.timestamp,
            fortune: self.fortune,
            reward: self.reward,
        })
    }
}

/// Keeps stored battalion ids unique, reassigning duplicates and unusable ids.
#[derive(Debug, Default)]
struct IdLedger {
    seen: BTreeSet<u32>,
}

impl IdLedger {
    fn claim(&mut self, stored: Option<u32>) -> BattalionId {
        match stored.filter(|id| *id > 0) {
            Some(id) if self.seen.insert(id) => BattalionId::new(id),
            _ => PENDING_ID,
        }
    }

    fn settle(self, cells: &mut [Cell], stored_next: Option<u32>) -> BattalionIds {
        let highest = self.seen.last().copied().unwrap_or(0);
        let mut allocator = BattalionIds::starting_at(highest.saturating_add(1));
        for cell in cells.iter_mut() {
            for battalion in cell.battalions_mut() {
                if battalion.id == PENDING_ID {
                    battalion.id = allocator.allocate();
                }
            }
        }
        BattalionIds::starting_at(allocator.peek().max(stored_next.unwrap_or(0)))
    }
}
