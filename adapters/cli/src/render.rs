//! Plain-text presentation of the board and the event log.

use std::fmt::Write as _;

use grid_conquest_core::{Cell, CellKind, Event, Faction, GameStatus, Specialization};
use grid_conquest_world::{query, Game};

pub(crate) const LEGEND: &str =
    "legend: P/A owner, # base, $ resource, b/f/s specialization, * selected, + reachable";

/// Renders the board with the status line underneath.
pub(crate) fn render_board(game: &Game) -> String {
    let board = query::board(game);
    let selection = query::selection(game);
    let reach = query::selection_reach(game);
    let mut out = String::new();

    out.push_str("   ");
    for column in 0..board.size() {
        let _ = write!(out, "{column:^7}");
    }
    out.push('\n');

    for row in 0..board.size() {
        let _ = write!(out, "{row:>2} ");
        for cell in &board.cells()[(row * board.size()) as usize..((row + 1) * board.size()) as usize] {
            let marker = if selection.is_some_and(|selection| selection.cell == cell.id()) {
                '*'
            } else if reach.contains(cell.id()) {
                '+'
            } else {
                ' '
            };
            let _ = write!(out, "{marker}{} ", cell_token(cell));
        }
        out.push('\n');
    }

    out.push_str(&status_line(game));
    out
}

fn cell_token(cell: &Cell) -> String {
    let owner = match cell.owner() {
        Some(Faction::Player) => 'P',
        Some(Faction::Ai) => 'A',
        None => '.',
    };
    let kind = match cell.kind() {
        CellKind::Base => '#',
        CellKind::Resource => '$',
        CellKind::Neutral => '.',
    };
    let specialization = match cell.specialization() {
        Some(Specialization::Barracks) => 'b',
        Some(Specialization::Forge) => 'f',
        Some(Specialization::Sanctuary) => 's',
        None => ' ',
    };
    match cell.soldier_total() {
        0 => format!("{owner}{kind}{specialization}  -"),
        soldiers => format!("{owner}{kind}{specialization}{soldiers:>3}"),
    }
}

fn status_line(game: &Game) -> String {
    let snapshot = query::snapshot(game);
    let stats = query::stats(game);
    let majority = match snapshot.majority_owner {
        Some(owner) => format!("{owner} for {}", snapshot.majority_streak),
        None => "none".to_owned(),
    };
    let mut line = format!(
        "turn {} ({} phase) | resources player {} ai {} | bases player {} ai {} | majority {majority}",
        snapshot.turn_number,
        snapshot.current_turn,
        snapshot.resources.player,
        snapshot.resources.ai,
        stats.player.bases,
        stats.ai.bases,
    );
    if let Some(battalion) = query::selected_battalion(game) {
        let _ = write!(
            line,
            "\nselected battalion {} ({}, {} soldiers, {}/{} movement)",
            battalion.id,
            battalion.unit.blueprint().name,
            battalion.soldiers,
            battalion.movement_left,
            battalion.max_movement,
        );
    }
    if snapshot.status.is_terminal() {
        let _ = write!(line, "\ngame over: {}", status_name(snapshot.status));
    }
    line
}

fn status_name(status: GameStatus) -> &'static str {
    match status {
        GameStatus::Playing => "playing",
        GameStatus::PlayerVictory => "player conquered every enemy base",
        GameStatus::AiVictory => "opponent conquered every player base",
        GameStatus::PlayerMajority => "player held the base majority",
        GameStatus::AiMajority => "opponent held the base majority",
    }
}

/// One log line for `event`, or `None` for events the board already shows.
pub(crate) fn describe_event(event: &Event) -> Option<String> {
    let text = match event {
        Event::GameStarted { size } => format!("new {size}x{size} match"),
        Event::Hydrated { restored: true } => "restored the saved match".to_owned(),
        Event::Hydrated { restored: false } => return None,
        Event::CellSelected { .. } | Event::BattalionSelected { .. } | Event::SelectionCleared => {
            return None
        }
        Event::MoveResolved { faction, action } => {
            let mut text = format!("{faction} moved {} -> {}", action.from, action.to);
            if let Some(owner) = action.conquered_owner {
                let _ = write!(text, ", held by {owner}");
            }
            if let Some(fortune) = action.fortune {
                let _ = write!(text, " (fortune {fortune:.2})");
            }
            if let Some(reward) = action.reward {
                let _ = write!(text, ", +{reward} resources");
            }
            text
        }
        Event::MoveRejected { reason, .. } => format!("move rejected: {reason}"),
        Event::BattalionTrained {
            faction,
            cell,
            unit,
            cost,
            ..
        } => format!("{faction} trained {} at {cell} for {cost}", unit.blueprint().name),
        Event::ProductionRejected { reason } => format!("production rejected: {reason}"),
        Event::IncomeCollected { faction, amount } => format!("{faction} collected {amount}"),
        Event::ReinforcementsArrived {
            faction, cell, unit, ..
        } => format!("{} levied for {faction} at {cell}", unit.blueprint().name),
        Event::OpponentPassed => "opponent passed".to_owned(),
        Event::TurnStarted { faction, turn } => format!("turn {turn}: {faction} phase"),
        Event::MajorityChanged {
            owner: Some(owner),
            streak,
        } => format!("{owner} holds the base majority ({streak})"),
        Event::MajorityChanged { owner: None, .. } => "base majority lost".to_owned(),
        Event::GameOver { status } => format!("game over: {}", status_name(*status)),
        Event::CommandIgnored { reason } => format!("ignored: {reason}"),
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_conquest_core::{CellId, Command, SteadyChance};
    use grid_conquest_world::{self as world, RulesConfig};

    #[test]
    fn home_bases_are_drawn_in_their_corners() {
        let game = Game::new(RulesConfig::with_size(4), &mut SteadyChance::neutral().with_unit(0.9))
            .expect("default rules");
        let rendered = render_board(&game);
        let rows: Vec<&str> = rendered.lines().collect();

        assert!(rows[1].starts_with(" 0  P#  10"), "{rendered}");
        assert!(rows[4].ends_with("A#  10 "), "{rendered}");
        assert!(rendered.contains("turn 1 (player phase)"));
    }

    #[test]
    fn selection_is_marked() {
        let mut game = Game::new(RulesConfig::default(), &mut SteadyChance::neutral().with_unit(0.9))
            .expect("default rules");
        let mut events = Vec::new();
        world::apply(
            &mut game,
            Command::SelectCell {
                cell: CellId::new(0, 0),
            },
            &mut SteadyChance::neutral(),
            &mut events,
        );
        let rendered = render_board(&game);
        assert!(rendered.contains("*P#"));
        assert!(rendered.contains("selected battalion 1"));
    }

    #[test]
    fn rejections_are_logged_with_their_reason() {
        let event = Event::CommandIgnored {
            reason: grid_conquest_core::CommandError::NoSelection,
        };
        assert_eq!(
            describe_event(&event).as_deref(),
            Some("ignored: no battalion is selected")
        );
        assert_eq!(describe_event(&Event::SelectionCleared), None);
    }
}
