//! Interactive and automated play on top of a persisted game.

use std::io::{BufRead, Write};

use anyhow::Context;
use grid_conquest_core::{
    BattalionId, CellId, CellIdError, Command, Event, Faction, GameSnapshot, GameStatus,
    SeededChance, UnitBlueprint, UnitType,
};
use grid_conquest_persistence::{Persistence, SnapshotStore};
use grid_conquest_system_opponent::Opponent;
use grid_conquest_world::{self as world, query, Game, RulesConfig};
use thiserror::Error;

use crate::{render, share};

const HELP: &str = "\
commands:
  select x-y      select one of your cells (again to deselect)
  battalion <id>  select a battalion by id
  move x-y        move the selected battalion
  train x-y       train a battalion at one of your bases
  clear           drop the selection
  end             end your turn
  new [size]      start a new match
  size <n>        start a new match on an n by n board
  board           redraw the board
  export          print a share code for this match
  import <code>   load a match from a share code
  quit            leave (the match is saved)";

/// A line typed at the prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Toggle selection of a cell.
    Select(CellId),
    /// Select a battalion by id.
    Battalion(BattalionId),
    /// Move the selection.
    Move(CellId),
    /// Open the training prompt for a base.
    Train(CellId),
    /// Drop the selection.
    Clear,
    /// End the player's phase.
    End,
    /// New match, optionally with a new size.
    New(Option<u32>),
    /// New match with a different size.
    Size(u32),
    /// Redraw the board.
    Board,
    /// Print a share code.
    Export,
    /// Load a share code.
    Import(String),
    /// Show the command list.
    Help,
    /// Leave the session.
    Quit,
}

/// Reasons a prompt line could not be understood.
#[derive(Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    /// Nothing was typed.
    #[error("type a command, or `help` for the list")]
    Empty,
    /// The first word is not a command.
    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),
    /// The command needs an argument that was not given.
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    /// A cell argument was not of the form x-y.
    #[error(transparent)]
    Cell(#[from] CellIdError),
    /// A numeric argument did not parse.
    #[error("`{0}` is not a number")]
    NotANumber(String),
}

/// Parses one prompt line.
pub(crate) fn parse_input(line: &str) -> Result<Input, InputError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(InputError::Empty);
    };
    let argument = words.next();

    let cell = |name: &'static str| -> Result<CellId, InputError> {
        Ok(argument.ok_or(InputError::MissingArgument(name))?.parse()?)
    };
    let number = |name: &'static str| -> Result<u32, InputError> {
        let text = argument.ok_or(InputError::MissingArgument(name))?;
        text.parse()
            .map_err(|_| InputError::NotANumber(text.to_owned()))
    };

    match verb.to_ascii_lowercase().as_str() {
        "select" | "s" => Ok(Input::Select(cell("select")?)),
        "battalion" | "b" => Ok(Input::Battalion(BattalionId::new(number("battalion")?))),
        "move" | "m" => Ok(Input::Move(cell("move")?)),
        "train" | "t" => Ok(Input::Train(cell("train")?)),
        "clear" | "c" => Ok(Input::Clear),
        "end" | "e" => Ok(Input::End),
        "new" => match argument {
            None => Ok(Input::New(None)),
            Some(_) => Ok(Input::New(Some(number("new")?))),
        },
        "size" => Ok(Input::Size(number("size")?)),
        "board" => Ok(Input::Board),
        "export" => Ok(Input::Export),
        "import" => Ok(Input::Import(
            argument.ok_or(InputError::MissingArgument("import"))?.to_owned(),
        )),
        "help" | "?" => Ok(Input::Help),
        "quit" | "exit" | "q" => Ok(Input::Quit),
        other => Err(InputError::Unknown(other.to_owned())),
    }
}

/// A game bound to its randomness and save slot.
#[derive(Debug)]
pub(crate) struct Session<S> {
    game: Game,
    chance: SeededChance,
    persistence: Persistence<S>,
}

impl<S> Session<S>
where
    S: SnapshotStore,
{
    /// Generates an opening board, then hydrates it from the save slot.
    pub(crate) fn start(
        rules: RulesConfig,
        mut chance: SeededChance,
        persistence: Persistence<S>,
    ) -> anyhow::Result<Self> {
        let game = Game::new(rules, &mut chance).context("could not generate the opening board")?;
        let mut session = Self {
            game,
            chance,
            persistence,
        };
        let hydrate = session.persistence.hydrate_command();
        let _ = session.dispatch(hydrate);
        Ok(session)
    }

    /// The game being played.
    pub(crate) fn game(&self) -> &Game {
        &self.game
    }

    /// The save slot the session writes to.
    pub(crate) fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// Applies `command`, saving afterwards if the published state changed.
    pub(crate) fn dispatch(&mut self, command: Command) -> Vec<Event> {
        let before = query::snapshot(&self.game).clone();
        let mut events = Vec::new();
        world::apply(&mut self.game, command, &mut self.chance, &mut events);
        self.save_if_changed(&before, &events);
        events
    }

    /// Runs the training prompt for `cell` through `chooser`.
    pub(crate) fn train<F>(&mut self, cell: CellId, chooser: F) -> Vec<Event>
    where
        F: FnOnce(&[&'static UnitBlueprint]) -> Option<UnitType>,
    {
        let before = query::snapshot(&self.game).clone();
        let mut events = Vec::new();
        world::produce_with(&mut self.game, cell, chooser, &mut events);
        self.save_if_changed(&before, &events);
        events
    }

    /// Replaces the match with `snapshot`.
    pub(crate) fn import(&mut self, snapshot: GameSnapshot) -> Vec<Event> {
        self.dispatch(Command::Hydrate {
            snapshot: Some(Box::new(snapshot)),
        })
    }

    fn save_if_changed(&mut self, before: &GameSnapshot, events: &[Event]) {
        let hydrated = events
            .iter()
            .any(|event| matches!(event, Event::Hydrated { .. }));
        if !hydrated && query::snapshot(&self.game) == before {
            return;
        }
        if let Err(error) = self.persistence.publish(&self.game) {
            tracing::warn!(%error, "could not save the match");
        }
    }
}

/// Reads prompt lines from `input` until `quit` or end of input.
pub(crate) fn run_interactive<S, R, W>(
    session: &mut Session<S>,
    mut input: R,
    output: &mut W,
) -> anyhow::Result<()>
where
    S: SnapshotStore,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}\n{}", render::render_board(session.game()), render::LEGEND)?;
    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let parsed = match parse_input(&line) {
            Ok(parsed) => parsed,
            Err(error) => {
                writeln!(output, "{error}")?;
                continue;
            }
        };
        let events = match parsed {
            Input::Quit => break,
            Input::Help => {
                writeln!(output, "{HELP}")?;
                continue;
            }
            Input::Board => {
                writeln!(output, "{}", render::render_board(session.game()))?;
                continue;
            }
            Input::Export => {
                let code = share::encode_share_code(query::snapshot(session.game()))?;
                writeln!(output, "{code}")?;
                continue;
            }
            Input::Import(code) => {
                let starting = query::rules(session.game()).starting_resources;
                match share::decode_share_code(&code, starting) {
                    Ok(snapshot) => session.import(snapshot),
                    Err(error) => {
                        writeln!(output, "{error}")?;
                        continue;
                    }
                }
            }
            Input::Train(cell) => session.train(cell, |options| prompt_unit(options, &mut input, output)),
            Input::Select(cell) => session.dispatch(Command::SelectCell { cell }),
            Input::Battalion(battalion) => session.dispatch(Command::SelectBattalion { battalion }),
            Input::Move(cell) => session.dispatch(Command::MoveSelectedTo { cell }),
            Input::Clear => session.dispatch(Command::ClearSelection),
            Input::End => session.dispatch(Command::EndTurn),
            Input::New(size) => session.dispatch(Command::NewGame { size }),
            Input::Size(size) => session.dispatch(Command::SetGridSize { size }),
        };

        for event in &events {
            if let Some(text) = render::describe_event(event) {
                writeln!(output, "{text}")?;
            }
        }
        if events.iter().any(|event| !is_rejection(event)) {
            writeln!(output, "{}", render::render_board(session.game()))?;
        }
    }
    Ok(())
}

fn is_rejection(event: &Event) -> bool {
    matches!(
        event,
        Event::MoveRejected { .. } | Event::ProductionRejected { .. } | Event::CommandIgnored { .. }
    )
}

/// Numbered unit prompt; a blank or invalid answer cancels.
fn prompt_unit<R, W>(options: &[&'static UnitBlueprint], input: &mut R, output: &mut W) -> Option<UnitType>
where
    R: BufRead,
    W: Write,
{
    if options.is_empty() {
        let _ = writeln!(output, "nothing can be trained there right now");
        return None;
    }
    for (index, blueprint) in options.iter().enumerate() {
        let _ = writeln!(
            output,
            "  {}) {} - cost {}, {} soldiers, attack {}, defense {}, movement {}",
            index + 1,
            blueprint.name,
            blueprint.cost,
            blueprint.soldiers,
            blueprint.attack,
            blueprint.defense,
            blueprint.movement,
        );
    }
    let _ = write!(output, "unit (blank to cancel)> ");
    let _ = output.flush();

    let mut answer = String::new();
    let _ = input.read_line(&mut answer).ok()?;
    let choice: usize = answer.trim().parse().ok()?;
    options.get(choice.checked_sub(1)?).map(|blueprint| blueprint.unit)
}

/// Result of an automated match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Simulation {
    /// Rounds completed.
    pub(crate) rounds: u32,
    /// Status when the simulation stopped.
    pub(crate) status: GameStatus,
}

/// Plays the player's side with the opponent heuristic for up to `rounds` rounds.
pub(crate) fn simulate<S>(session: &mut Session<S>, rounds: u32) -> Simulation
where
    S: SnapshotStore,
{
    let mut commander = Opponent::new(Faction::Player);
    let mut played = 0;

    while played < rounds && !query::status(&session.game).is_terminal() {
        let budget = query::resources(&session.game).player;
        if let Some(plan) =
            commander.plan_production(query::board(&session.game), budget, &mut session.chance)
        {
            let _ = session.dispatch(Command::ProduceAt {
                cell: plan.cell,
                unit: Some(plan.unit),
            });
        }

        if let Some(decision) = commander.select_move(query::board(&session.game)) {
            tracing::debug!(tier = %decision.tier, score = decision.score, "player heuristic move");
            let _ = session.dispatch(Command::SelectBattalion {
                battalion: decision.order.battalion,
            });
            let _ = session.dispatch(Command::MoveSelectedTo {
                cell: decision.order.to,
            });
        }

        let _ = session.dispatch(Command::EndTurn);
        played += 1;
    }

    Simulation {
        rounds: played,
        status: query::status(&session.game),
    }
}
