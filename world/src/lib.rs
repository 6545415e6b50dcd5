#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative match state for Grid Conquest.
//!
//! The world owns the single published [`GameSnapshot`] together with the
//! session-only selection. Every [`Command`] runs as a transaction: it is
//! applied to a copy of the snapshot, the copy is validated, and only then is
//! it published and its events broadcast. Rejected commands publish nothing
//! and report a rejection event instead, so callers can always compare the
//! snapshot before and after to learn whether anything changed.

mod config;
mod economy;
mod victory;

use grid_conquest_core::{
    BattalionId, BattalionIds, CellId, Chance, Command, CommandError, Event, Faction,
    GameSnapshot, GameStatus, ProductionError, Resources, UnitBlueprint, UnitType,
};
use grid_conquest_system_combat::{perform_move, MoveOrder};
use grid_conquest_system_map_generation::{GenerationError, MapConfig, MapGenerator};
use grid_conquest_system_opponent::Opponent;

pub use config::{EconomyTable, RulesConfig, DEFAULT_MAJORITY_TURNS, DEFAULT_STARTING_RESOURCES};

/// Battalion the player has picked for the next move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Cell hosting the selected battalion.
    pub cell: CellId,
    /// Selected battalion.
    pub battalion: BattalionId,
}

/// Authoritative Grid Conquest session.
#[derive(Clone, Debug)]
pub struct Game {
    snapshot: GameSnapshot,
    selection: Option<Selection>,
    hydrated: bool,
    rules: RulesConfig,
    opponent: Opponent,
}

impl Game {
    /// Generates a fresh match on a board of `rules.map.size`.
    pub fn new<C>(rules: RulesConfig, chance: &mut C) -> Result<Self, GenerationError>
    where
        C: Chance + ?Sized,
    {
        let mut discarded = Vec::new();
        let snapshot = fresh_snapshot(&rules, rules.map.size, chance, &mut discarded)?;
        Ok(Self {
            snapshot,
            selection: None,
            hydrated: false,
            rules,
            opponent: Opponent::new(Faction::Ai),
        })
    }

    fn ensure_player_turn(&self) -> Result<(), CommandError> {
        if self.snapshot.status.is_terminal() {
            return Err(CommandError::GameOver);
        }
        if self.snapshot.current_turn != Faction::Player {
            return Err(CommandError::NotPlayerTurn);
        }
        Ok(())
    }

    /// Publishes `candidate` if it passes validation. Returns whether it was published.
    fn commit(
        &mut self,
        candidate: GameSnapshot,
        staged: Vec<Event>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        match candidate.validate() {
            Ok(()) => {
                self.snapshot = candidate;
                out_events.extend(staged);
                true
            }
            Err(error) => {
                tracing::error!(%error, "rolled back inconsistent snapshot");
                out_events.push(Event::CommandIgnored {
                    reason: CommandError::Inconsistent,
                });
                false
            }
        }
    }
}

/// Applies `command` to the game, drawing randomness from `chance`.
pub fn apply<C>(game: &mut Game, command: Command, chance: &mut C, out_events: &mut Vec<Event>)
where
    C: Chance + ?Sized,
{
    let outcome = match command {
        Command::SelectCell { cell } => select_cell(game, cell, out_events),
        Command::SelectBattalion { battalion } => select_battalion(game, battalion, out_events),
        Command::ClearSelection => {
            game.selection = None;
            out_events.push(Event::SelectionCleared);
            Ok(())
        }
        Command::MoveSelectedTo { cell } => move_selected(game, cell, chance, out_events),
        Command::EndTurn => end_turn(game, chance, out_events),
        Command::ProduceAt { cell, unit } => {
            produce(game, cell, unit, out_events);
            Ok(())
        }
        Command::NewGame { size } => {
            let size = size.unwrap_or_else(|| game.snapshot.grid_size());
            start_new_game(game, size, chance, out_events)
        }
        Command::SetGridSize { size } => {
            if size == game.snapshot.grid_size() {
                Err(CommandError::UnchangedGridSize(size))
            } else {
                start_new_game(game, size, chance, out_events)
            }
        }
        Command::Hydrate { snapshot } => {
            hydrate(game, snapshot.map(|snapshot| *snapshot), out_events);
            Ok(())
        }
    };

    if let Err(reason) = outcome {
        tracing::debug!(%reason, "command ignored");
        out_events.push(Event::CommandIgnored { reason });
    }
}

/// Applies `command` to a copy of `game`, leaving the original untouched.
#[must_use]
pub fn reduce<C>(game: &Game, command: Command, chance: &mut C) -> (Game, Vec<Event>)
where
    C: Chance + ?Sized,
{
    let mut next = game.clone();
    let mut events = Vec::new();
    apply(&mut next, command, chance, &mut events);
    (next, events)
}

/// Runs the production prompt for `cell` through `chooser` and applies its answer.
///
/// The chooser receives the blueprints the player may train there right now;
/// returning `None` cancels without touching the game.
pub fn produce_with<F>(game: &mut Game, cell: CellId, chooser: F, out_events: &mut Vec<Event>)
where
    F: FnOnce(&[&'static UnitBlueprint]) -> Option<UnitType>,
{
    let options = query::production_options(game, cell);
    let unit = chooser(&options);
    produce(game, cell, unit, out_events);
}

fn select_cell(game: &mut Game, cell: CellId, out_events: &mut Vec<Event>) -> Result<(), CommandError> {
    game.ensure_player_turn()?;

    if game.selection.is_some_and(|selection| selection.cell == cell) {
        game.selection = None;
        out_events.push(Event::SelectionCleared);
        return Ok(());
    }

    let target = game
        .snapshot
        .board
        .cell(cell)
        .filter(|target| target.is_owned_by(Faction::Player))
        .ok_or(CommandError::UnselectableCell(cell))?;
    let battalion = target
        .battalions()
        .iter()
        .find(|battalion| battalion.can_move())
        .or_else(|| target.battalions().first())
        .map(|battalion| battalion.id)
        .ok_or(CommandError::UnselectableCell(cell))?;

    game.selection = Some(Selection { cell, battalion });
    out_events.push(Event::CellSelected { cell, battalion });
    Ok(())
}

fn select_battalion(
    game: &mut Game,
    battalion: BattalionId,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError> {
    game.ensure_player_turn()?;

    let board = &game.snapshot.board;
    let cell = board
        .locate_battalion(battalion)
        .filter(|cell| board.cell(*cell).is_some_and(|host| host.is_owned_by(Faction::Player)))
        .ok_or(CommandError::UnselectableBattalion(battalion))?;

    game.selection = Some(Selection { cell, battalion });
    out_events.push(Event::BattalionSelected { cell, battalion });
    Ok(())
}

fn move_selected<C>(
    game: &mut Game,
    destination: CellId,
    chance: &mut C,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError>
where
    C: Chance + ?Sized,
{
    game.ensure_player_turn()?;
    let selection = game.selection.ok_or(CommandError::NoSelection)?;

    let order = MoveOrder {
        from: selection.cell,
        to: destination,
        faction: Faction::Player,
        battalion: selection.battalion,
    };
    let mut candidate = game.snapshot.clone();
    let mut staged = Vec::new();
    if !execute_move(&mut candidate, order, chance, &mut staged) {
        out_events.extend(staged);
        return Ok(());
    }
    let _ = victory::settle_conquest(&mut candidate, &mut staged);

    if game.commit(candidate, staged, out_events) {
        game.selection = None;
    }
    Ok(())
}

/// Resolves `order` on the candidate snapshot. Returns whether the move was legal.
fn execute_move<C>(
    snapshot: &mut GameSnapshot,
    order: MoveOrder,
    chance: &mut C,
    staged: &mut Vec<Event>,
) -> bool
where
    C: Chance + ?Sized,
{
    match perform_move(&snapshot.board, order, chance) {
        Ok((board, report)) => {
            snapshot.board = board;
            if let Some(reward) = report.reward {
                snapshot.resources.credit(order.faction, reward);
            }
            let action = report.stamp(snapshot.next_timestamp());
            tracing::debug!(
                faction = %order.faction,
                from = %order.from,
                to = %order.to,
                outcome = ?report.outcome,
                "move resolved"
            );
            snapshot.last_action = Some(action.clone());
            staged.push(Event::MoveResolved {
                faction: order.faction,
                action,
            });
            true
        }
        Err(reason) => {
            tracing::debug!(faction = %order.faction, %reason, "move rejected");
            staged.push(Event::MoveRejected {
                faction: order.faction,
                reason,
            });
            false
        }
    }
}

fn end_turn<C>(game: &mut Game, chance: &mut C, out_events: &mut Vec<Event>) -> Result<(), CommandError>
where
    C: Chance + ?Sized,
{
    game.ensure_player_turn()?;

    let rules = game.rules;
    let mut candidate = game.snapshot.clone();
    let mut staged = Vec::new();

    if !victory::settle_conquest(&mut candidate, &mut staged) {
        run_opponent_phase(&mut game.opponent, &mut candidate, &rules, chance, &mut staged);
    }

    if game.commit(candidate, staged, out_events) {
        game.selection = None;
    }
    Ok(())
}

fn run_opponent_phase<C>(
    opponent: &mut Opponent,
    snapshot: &mut GameSnapshot,
    rules: &RulesConfig,
    chance: &mut C,
    staged: &mut Vec<Event>,
) where
    C: Chance + ?Sized,
{
    let faction = opponent.faction();
    snapshot.current_turn = faction;
    tracing::info!(%faction, turn = snapshot.turn_number, "phase started");
    staged.push(Event::TurnStarted {
        faction,
        turn: snapshot.turn_number,
    });
    economy::begin_phase(snapshot, faction, &rules.economy, true, staged);

    let budget = snapshot.resources.of(faction);
    if let Some(plan) = opponent.plan_production(&snapshot.board, budget, chance) {
        let mut trial = snapshot.clone();
        match economy::train(&mut trial, faction, plan.cell, plan.unit) {
            Ok(event) => {
                *snapshot = trial;
                staged.push(event);
            }
            Err(reason) => tracing::warn!(%reason, "opponent production failed"),
        }
    }

    match opponent.select_move(&snapshot.board) {
        Some(decision) => {
            let _ = execute_move(snapshot, decision.order, chance, staged);
        }
        None => staged.push(Event::OpponentPassed),
    }

    if victory::settle_conquest(snapshot, staged) {
        return;
    }
    if victory::advance_majority(snapshot, rules.majority_turns, staged) {
        return;
    }

    snapshot.turn_number = snapshot.turn_number.saturating_add(1);
    snapshot.current_turn = Faction::Player;
    tracing::info!(faction = %Faction::Player, turn = snapshot.turn_number, "phase started");
    staged.push(Event::TurnStarted {
        faction: Faction::Player,
        turn: snapshot.turn_number,
    });
    economy::begin_phase(snapshot, Faction::Player, &rules.economy, true, staged);
}

fn produce(game: &mut Game, cell: CellId, unit: Option<UnitType>, out_events: &mut Vec<Event>) {
    if let Err(reason) = game.ensure_player_turn() {
        out_events.push(Event::CommandIgnored { reason });
        return;
    }
    let Some(unit) = unit else {
        out_events.push(Event::ProductionRejected {
            reason: ProductionError::Cancelled,
        });
        return;
    };

    let mut candidate = game.snapshot.clone();
    match economy::train(&mut candidate, Faction::Player, cell, unit) {
        Ok(event) => {
            let _ = game.commit(candidate, vec![event], out_events);
        }
        Err(reason) => {
            tracing::debug!(%reason, "production rejected");
            out_events.push(Event::ProductionRejected { reason });
        }
    }
}

fn start_new_game<C>(
    game: &mut Game,
    size: u32,
    chance: &mut C,
    out_events: &mut Vec<Event>,
) -> Result<(), CommandError>
where
    C: Chance + ?Sized,
{
    if !grid_conquest_core::is_valid_grid_size(size) {
        return Err(CommandError::InvalidGridSize(size));
    }

    let mut staged = Vec::new();
    let rules = game.rules;
    match fresh_snapshot(&rules, size, chance, &mut staged) {
        Ok(snapshot) => {
            if game.commit(snapshot, staged, out_events) {
                game.selection = None;
            }
            Ok(())
        }
        Err(error) => {
            tracing::error!(%error, size, "board generation failed");
            Err(CommandError::InvalidGridSize(size))
        }
    }
}

fn hydrate(game: &mut Game, snapshot: Option<GameSnapshot>, out_events: &mut Vec<Event>) {
    game.hydrated = true;
    let restored = match snapshot {
        Some(snapshot) => match snapshot.validate() {
            Ok(()) => {
                game.snapshot = snapshot;
                game.selection = None;
                true
            }
            Err(error) => {
                tracing::warn!(%error, "stored snapshot is inconsistent, keeping current game");
                false
            }
        },
        None => false,
    };
    tracing::info!(restored, "session hydrated");
    out_events.push(Event::Hydrated { restored });
}

/// Generates a new snapshot and runs the player's opening phase.
///
/// Starting garrisons keep their zero movement through the opening phase.
fn fresh_snapshot<C>(
    rules: &RulesConfig,
    size: u32,
    chance: &mut C,
    staged: &mut Vec<Event>,
) -> Result<GameSnapshot, GenerationError>
where
    C: Chance + ?Sized,
{
    let mut battalion_ids = BattalionIds::default();
    let config = MapConfig {
        size,
        ..rules.map
    };
    let board = MapGenerator::new(config).generate(&mut battalion_ids, chance)?;

    let mut snapshot = GameSnapshot {
        board,
        current_turn: Faction::Player,
        turn_number: 1,
        majority_owner: None,
        majority_streak: 0,
        status: GameStatus::Playing,
        last_action: None,
        resources: Resources::splat(rules.starting_resources),
        battalion_ids,
        action_sequence: 0,
    };

    tracing::info!(size, "new match");
    staged.push(Event::GameStarted { size });
    staged.push(Event::TurnStarted {
        faction: Faction::Player,
        turn: 1,
    });
    economy::begin_phase(&mut snapshot, Faction::Player, &rules.economy, false, staged);
    Ok(snapshot)
}

/// Query functions that provide read-only access to the game state.
pub mod query {
    use grid_conquest_core::{
        affordable_blueprints, Battalion, Board, CellId, CellKind, Faction, GameSnapshot,
        GameStatus, LastAction, Resources, UnitBlueprint,
    };
    use grid_conquest_system_movement::{reachable, Reachability};

    use super::{Game, RulesConfig, Selection};

    /// Published snapshot of the match.
    #[must_use]
    pub fn snapshot(game: &Game) -> &GameSnapshot {
        &game.snapshot
    }

    /// Board of the published snapshot.
    #[must_use]
    pub fn board(game: &Game) -> &Board {
        &game.snapshot.board
    }

    /// Whether the match is running or how it ended.
    #[must_use]
    pub fn status(game: &Game) -> GameStatus {
        game.snapshot.status
    }

    /// Faction whose phase is active.
    #[must_use]
    pub fn current_turn(game: &Game) -> Faction {
        game.snapshot.current_turn
    }

    /// Round counter.
    #[must_use]
    pub fn turn_number(game: &Game) -> u32 {
        game.snapshot.turn_number
    }

    /// Resource balances of both factions.
    #[must_use]
    pub fn resources(game: &Game) -> Resources {
        game.snapshot.resources
    }

    /// Most recent resolved move, for presentation.
    #[must_use]
    pub fn last_action(game: &Game) -> Option<&LastAction> {
        game.snapshot.last_action.as_ref()
    }

    /// Battalion the player has picked, if any.
    #[must_use]
    pub fn selection(game: &Game) -> Option<Selection> {
        game.selection
    }

    /// The selected battalion itself.
    #[must_use]
    pub fn selected_battalion(game: &Game) -> Option<&Battalion> {
        let selection = game.selection?;
        game.snapshot
            .board
            .cell(selection.cell)?
            .battalion(selection.battalion)
    }

    /// Cells the selected battalion can reach this turn.
    #[must_use]
    pub fn selection_reach(game: &Game) -> Reachability {
        match (game.selection, selected_battalion(game)) {
            (Some(selection), Some(battalion)) => {
                reachable(&game.snapshot.board, selection.cell, battalion)
            }
            _ => Reachability::default(),
        }
    }

    /// Whether the session has finished loading from storage.
    #[must_use]
    pub fn is_hydrated(game: &Game) -> bool {
        game.hydrated
    }

    /// Rules the match is played with.
    #[must_use]
    pub fn rules(game: &Game) -> &RulesConfig {
        &game.rules
    }

    /// Blueprints the player may train at `cell` right now.
    ///
    /// Empty unless it is the player's phase of a running match and `cell` is
    /// a base the player holds.
    #[must_use]
    pub fn production_options(game: &Game, cell: CellId) -> Vec<&'static UnitBlueprint> {
        if game.ensure_player_turn().is_err() {
            return Vec::new();
        }
        let board = &game.snapshot.board;
        let held_base = board
            .cell(cell)
            .is_some_and(|host| host.is_base() && host.is_owned_by(Faction::Player));
        if !held_base {
            return Vec::new();
        }
        affordable_blueprints(
            &board.owned_specializations(Faction::Player),
            game.snapshot.resources.of(Faction::Player),
        )
    }

    /// Aggregated counters of both factions.
    #[must_use]
    pub fn stats(game: &Game) -> GameStats {
        let board = &game.snapshot.board;
        let tally = |faction: Faction| FactionStats {
            cells: board.cells_owned_by(faction).count(),
            bases: board.base_count(faction),
            resources: board
                .cells_owned_by(faction)
                .filter(|cell| cell.kind() == CellKind::Resource)
                .count(),
            soldiers: board.soldier_total(faction),
        };
        GameStats {
            player: tally(Faction::Player),
            ai: tally(Faction::Ai),
        }
    }

    /// Holdings of a single faction.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct FactionStats {
        /// Cells held.
        pub cells: usize,
        /// Bases held.
        pub bases: usize,
        /// Resource sites held.
        pub resources: usize,
        /// Soldiers commanded.
        pub soldiers: u32,
    }

    /// Holdings of both factions.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct GameStats {
        /// Player holdings.
        pub player: FactionStats,
        /// Opponent holdings.
        pub ai: FactionStats,
    }

    impl GameStats {
        /// Holdings of `faction`.
        #[must_use]
        pub const fn of(&self, faction: Faction) -> FactionStats {
            match faction {
                Faction::Player => self.player,
                Faction::Ai => self.ai,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_conquest_core::SteadyChance;

    #[test]
    fn opening_phase_pays_income_without_moving_garrisons() {
        let game = Game::new(RulesConfig::default(), &mut SteadyChance::neutral().with_unit(0.9))
            .expect("default rules");
        let snapshot = query::snapshot(&game);
        assert_eq!(snapshot.resources.player, DEFAULT_STARTING_RESOURCES + 1);
        assert_eq!(snapshot.resources.ai, DEFAULT_STARTING_RESOURCES);
        assert!(snapshot
            .board
            .battalions_of(Faction::Player)
            .all(|(_, battalion)| battalion.movement_left == 0));
        assert!(!query::is_hydrated(&game));
    }

    #[test]
    fn out_of_range_rules_fail_to_start() {
        let result = Game::new(RulesConfig::with_size(2), &mut SteadyChance::neutral());
        assert!(matches!(result, Err(GenerationError::InvalidSize(2))));
    }
}
