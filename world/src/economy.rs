//! Phase-start income, levies and battalion training.

use grid_conquest_core::{
    Battalion, CellId, Event, Faction, GameSnapshot, ProductionError, UnitType,
};

use crate::EconomyTable;

/// Runs the start of `faction`'s phase on a candidate snapshot.
///
/// Movement is restored first when `restore_movement` is set, then income is
/// credited and, on levy turns, specialized bases raise free battalions.
pub(crate) fn begin_phase(
    snapshot: &mut GameSnapshot,
    faction: Faction,
    table: &EconomyTable,
    restore_movement: bool,
    out: &mut Vec<Event>,
) {
    if restore_movement {
        for battalion in snapshot.board.battalions_of_mut(faction) {
            battalion.restore_movement();
        }
    }

    let amount = table.income(&snapshot.board, faction);
    if amount > 0 {
        snapshot.resources.credit(faction, amount);
        out.push(Event::IncomeCollected { faction, amount });
    }

    if table.is_levy_turn(snapshot.turn_number) {
        raise_levies(snapshot, faction, out);
    }
}

fn raise_levies(snapshot: &mut GameSnapshot, faction: Faction, out: &mut Vec<Event>) {
    let levies: Vec<(CellId, UnitType)> = snapshot
        .board
        .cells_owned_by(faction)
        .filter(|cell| cell.is_base())
        .filter_map(|cell| EconomyTable::levy(cell.specialization()).map(|unit| (cell.id(), unit)))
        .collect();

    for (cell, unit) in levies {
        let Some(base) = snapshot.board.cell_mut(cell) else {
            continue;
        };
        let id = snapshot.battalion_ids.allocate();
        match base.station(Battalion::from_blueprint(id, faction, unit, 0)) {
            Ok(()) => {
                tracing::debug!(%faction, %cell, ?unit, "levy raised");
                out.push(Event::ReinforcementsArrived {
                    faction,
                    cell,
                    battalion: id,
                    unit,
                });
            }
            Err(_) => tracing::warn!(%faction, %cell, "levy refused by base"),
        }
    }
}

/// Trains a battalion of `unit` for `faction` at `cell` on a candidate snapshot.
///
/// The snapshot may be partially updated when an error is returned, so callers
/// must discard it in that case.
pub(crate) fn train(
    snapshot: &mut GameSnapshot,
    faction: Faction,
    cell: CellId,
    unit: UnitType,
) -> Result<Event, ProductionError> {
    let base = snapshot
        .board
        .cell(cell)
        .ok_or(ProductionError::UnknownCell(cell))?;
    if !base.is_base() || !base.is_owned_by(faction) {
        return Err(ProductionError::NotOwnedBase(cell));
    }

    let blueprint = unit.blueprint();
    if !blueprint.is_unlocked(&snapshot.board.owned_specializations(faction)) {
        return Err(ProductionError::Locked(unit));
    }

    let available = snapshot.resources.of(faction);
    if !snapshot.resources.try_debit(faction, blueprint.cost) {
        return Err(ProductionError::InsufficientResources {
            needed: blueprint.cost,
            available,
        });
    }

    let id = snapshot.battalion_ids.allocate();
    snapshot
        .board
        .cell_mut(cell)
        .ok_or(ProductionError::UnknownCell(cell))?
        .station(Battalion::from_blueprint(id, faction, unit, 0))
        .map_err(|_| ProductionError::NotOwnedBase(cell))?;

    Ok(Event::BattalionTrained {
        faction,
        cell,
        battalion: id,
        unit,
        cost: blueprint.cost,
    })
}
