//! Base-count victory and majority tracking.

use grid_conquest_core::{Board, Event, Faction, GameSnapshot, GameStatus};

/// Terminal status reached when a faction holds no base, if any.
///
/// The player's bases are checked first.
pub(crate) fn conquest_status(board: &Board) -> Option<GameStatus> {
    if board.base_count(Faction::Player) == 0 {
        return Some(GameStatus::conquest_by(Faction::Ai));
    }
    if board.base_count(Faction::Ai) == 0 {
        return Some(GameStatus::conquest_by(Faction::Player));
    }
    None
}

/// Ends the match if a faction lost its last base. Returns whether it ended.
///
/// A conquest overrides any majority in progress.
pub(crate) fn settle_conquest(snapshot: &mut GameSnapshot, out: &mut Vec<Event>) -> bool {
    let Some(status) = conquest_status(&snapshot.board) else {
        return false;
    };
    if snapshot.majority_owner.is_some() || snapshot.majority_streak != 0 {
        snapshot.majority_owner = None;
        snapshot.majority_streak = 0;
        out.push(Event::MajorityChanged {
            owner: None,
            streak: 0,
        });
    }
    finish(snapshot, status, out);
    true
}

/// Faction holding strictly more bases, if any.
pub(crate) fn majority_contender(board: &Board) -> Option<Faction> {
    let player = board.base_count(Faction::Player);
    let ai = board.base_count(Faction::Ai);
    match player.cmp(&ai) {
        std::cmp::Ordering::Greater => Some(Faction::Player),
        std::cmp::Ordering::Less => Some(Faction::Ai),
        std::cmp::Ordering::Equal => None,
    }
}

/// Advances the majority streak after the opponent's phase. Returns whether
/// the streak ended the match.
pub(crate) fn advance_majority(
    snapshot: &mut GameSnapshot,
    majority_turns: u32,
    out: &mut Vec<Event>,
) -> bool {
    let (owner, streak) = match majority_contender(&snapshot.board) {
        None => (None, 0),
        Some(contender) if snapshot.majority_owner == Some(contender) => {
            (Some(contender), snapshot.majority_streak.saturating_add(1))
        }
        Some(contender) => (Some(contender), 1),
    };

    if owner != snapshot.majority_owner || streak != snapshot.majority_streak {
        snapshot.majority_owner = owner;
        snapshot.majority_streak = streak;
        out.push(Event::MajorityChanged { owner, streak });
    }

    match owner {
        Some(holder) if streak >= majority_turns => {
            finish(snapshot, GameStatus::majority_by(holder), out);
            true
        }
        _ => false,
    }
}

fn finish(snapshot: &mut GameSnapshot, status: GameStatus, out: &mut Vec<Event>) {
    tracing::info!(?status, turn = snapshot.turn_number, "match ended");
    snapshot.status = status;
    out.push(Event::GameOver { status });
}
